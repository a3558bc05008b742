//! Per-feature standardization
//!
//! The scaler is fit once on the training split and persisted next to the
//! model; serving only ever calls [`Scaler::transform`].

use crate::error::{HeartError, Result};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

/// Parameters for one fitted feature
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct ScalerParams {
    center: f64,
    scale: f64,
}

/// Standard scaler: `(x - mean) / std`, columns in fixed order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scaler {
    params: Vec<ScalerParams>,
    is_fitted: bool,
}

impl Scaler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Learn per-column mean and population standard deviation.
    ///
    /// A constant column gets scale 1 so it maps to zero instead of NaN.
    pub fn fit(&mut self, x: &Array2<f64>) -> Result<&mut Self> {
        if x.nrows() == 0 || x.ncols() == 0 {
            return Err(HeartError::DataFormat(
                "cannot fit scaler on an empty matrix".to_string(),
            ));
        }

        self.params = x
            .axis_iter(Axis(1))
            .map(|col| {
                let mean = col.mean().unwrap_or(0.0);
                let std = col.std(0.0);
                ScalerParams {
                    center: mean,
                    scale: if std == 0.0 || !std.is_finite() { 1.0 } else { std },
                }
            })
            .collect();
        self.is_fitted = true;
        Ok(self)
    }

    /// Fit on `x` and return it standardized
    pub fn fit_transform(&mut self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.fit(x)?;
        self.transform(x)
    }

    /// Standardize every row of `x`
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.check_width(x.ncols())?;

        let mut out = x.to_owned();
        for (mut col, p) in out.axis_iter_mut(Axis(1)).zip(self.params.iter()) {
            col.mapv_inplace(|v| (v - p.center) / p.scale);
        }
        Ok(out)
    }

    /// Standardize a single feature vector
    pub fn transform_row(&self, row: ArrayView1<f64>) -> Result<Array1<f64>> {
        self.check_width(row.len())?;

        Ok(row
            .iter()
            .zip(self.params.iter())
            .map(|(v, p)| (v - p.center) / p.scale)
            .collect())
    }

    /// Number of features the scaler was fit on
    pub fn n_features(&self) -> Option<usize> {
        self.is_fitted.then_some(self.params.len())
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    pub fn means(&self) -> Vec<f64> {
        self.params.iter().map(|p| p.center).collect()
    }

    pub fn scales(&self) -> Vec<f64> {
        self.params.iter().map(|p| p.scale).collect()
    }

    fn check_width(&self, actual: usize) -> Result<()> {
        if !self.is_fitted {
            return Err(HeartError::ModelNotFitted);
        }
        if actual != self.params.len() {
            return Err(HeartError::SchemaMismatch {
                expected: self.params.len(),
                actual,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_standardizes_to_zero_mean_unit_variance() {
        let x = array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0], [4.0, 40.0]];
        let mut scaler = Scaler::new();
        let scaled = scaler.fit_transform(&x).unwrap();

        for col in scaled.axis_iter(Axis(1)) {
            assert!(col.mean().unwrap().abs() < 1e-12);
            assert!((col.std(0.0) - 1.0).abs() < 1e-12);
        }
        assert_eq!(scaler.n_features(), Some(2));
    }

    #[test]
    fn test_constant_column_maps_to_zero() {
        let x = array![[5.0, 1.0], [5.0, 2.0]];
        let mut scaler = Scaler::new();
        let scaled = scaler.fit_transform(&x).unwrap();
        assert_eq!(scaled.column(0).to_vec(), vec![0.0, 0.0]);
        assert_eq!(scaler.scales()[0], 1.0);
    }

    #[test]
    fn test_row_matches_matrix_transform() {
        let x = array![[1.0, 4.0, 9.0], [2.0, 6.0, 3.0], [0.0, 5.0, 6.0]];
        let mut scaler = Scaler::new();
        let scaled = scaler.fit_transform(&x).unwrap();
        let row = scaler.transform_row(x.row(1)).unwrap();
        assert_eq!(row, scaled.row(1).to_owned());
    }

    #[test]
    fn test_width_mismatch() {
        let mut scaler = Scaler::new();
        scaler.fit(&array![[1.0, 2.0], [3.0, 4.0]]).unwrap();
        let err = scaler.transform_row(array![1.0, 2.0, 3.0].view()).unwrap_err();
        assert!(matches!(err, HeartError::SchemaMismatch { expected: 2, actual: 3 }));
    }

    #[test]
    fn test_unfitted() {
        let err = Scaler::new().transform(&array![[1.0]]).unwrap_err();
        assert!(matches!(err, HeartError::ModelNotFitted));
    }
}
