//! Most-frequent-value imputation

use crate::error::{HeartError, Result};
use ndarray::{Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

/// Fills missing (`NaN`) cells of selected columns with that column's mode
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModeImputer {
    /// (column index, fill value)
    fill_values: Vec<(usize, f64)>,
    is_fitted: bool,
}

impl ModeImputer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Learn the mode of each listed column, ignoring missing cells
    pub fn fit(&mut self, x: &Array2<f64>, columns: &[usize]) -> Result<&mut Self> {
        let mut fill_values = Vec::with_capacity(columns.len());
        for &col in columns {
            if col >= x.ncols() {
                return Err(HeartError::SchemaMismatch {
                    expected: col + 1,
                    actual: x.ncols(),
                });
            }
            let mode = column_mode(x.column(col)).ok_or_else(|| {
                HeartError::DataFormat(format!("column {} has no observed values to impute from", col))
            })?;
            fill_values.push((col, mode));
        }

        self.fill_values = fill_values;
        self.is_fitted = true;
        Ok(self)
    }

    /// Replace missing cells in the fitted columns, in place
    pub fn transform(&self, x: &mut Array2<f64>) -> Result<usize> {
        if !self.is_fitted {
            return Err(HeartError::ModelNotFitted);
        }

        let mut filled = 0;
        for &(col, value) in &self.fill_values {
            for cell in x.column_mut(col).iter_mut() {
                if cell.is_nan() {
                    *cell = value;
                    filled += 1;
                }
            }
        }
        Ok(filled)
    }

    /// Fitted (column, value) pairs
    pub fn fill_values(&self) -> &[(usize, f64)] {
        &self.fill_values
    }
}

/// Mode of the non-missing values; ties resolve to the smallest value
pub fn column_mode(column: ArrayView1<f64>) -> Option<f64> {
    let mut values: Vec<f64> = column.iter().copied().filter(|v| !v.is_nan()).collect();
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));

    let mut best = values[0];
    let mut best_count = 0usize;
    let mut i = 0;
    while i < values.len() {
        let mut j = i;
        while j < values.len() && values[j] == values[i] {
            j += 1;
        }
        // strict comparison keeps the smaller value on ties
        if j - i > best_count {
            best_count = j - i;
            best = values[i];
        }
        i = j;
    }
    Some(best)
}

/// Count of missing cells per column
pub fn missing_per_column(x: &Array2<f64>) -> Vec<usize> {
    x.axis_iter(Axis(1))
        .map(|col| col.iter().filter(|v| v.is_nan()).count())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_mode_ignores_missing() {
        let col = array![1.0, f64::NAN, 2.0, 2.0, f64::NAN, f64::NAN];
        assert_eq!(column_mode(col.view()), Some(2.0));
    }

    #[test]
    fn test_mode_tie_picks_smallest() {
        let col = array![7.0, 3.0, 7.0, 3.0, 6.0];
        assert_eq!(column_mode(col.view()), Some(3.0));
    }

    #[test]
    fn test_mode_all_missing() {
        let col = array![f64::NAN, f64::NAN];
        assert_eq!(column_mode(col.view()), None);
    }

    #[test]
    fn test_fit_transform_fills_only_selected_columns() {
        let mut x = array![
            [1.0, f64::NAN, 3.0],
            [f64::NAN, 0.0, 3.0],
            [1.0, 0.0, 7.0],
        ];
        let mut imputer = ModeImputer::new();
        imputer.fit(&x, &[1, 2]).unwrap();
        let filled = imputer.transform(&mut x).unwrap();

        assert_eq!(filled, 1);
        assert_eq!(x[[0, 1]], 0.0);
        assert!(x[[1, 0]].is_nan());
        assert_eq!(missing_per_column(&x), vec![1, 0, 0]);
    }

    #[test]
    fn test_unfitted_transform() {
        let mut x = array![[1.0]];
        assert!(matches!(
            ModeImputer::new().transform(&mut x),
            Err(HeartError::ModelNotFitted)
        ));
    }
}
