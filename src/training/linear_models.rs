//! L2-regularized logistic regression

use super::models::{check_training_data, check_width, Classifier};
use crate::error::{HeartError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Logistic regression fit by batch gradient descent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// Fitted coefficients
    pub coefficients: Option<Array1<f64>>,
    /// Fitted intercept
    pub intercept: Option<f64>,
    pub fit_intercept: bool,
    /// Regularization strength (L2)
    pub alpha: f64,
    /// Maximum iterations
    pub max_iter: usize,
    /// Convergence tolerance on the gradient norm
    pub tol: f64,
    pub learning_rate: f64,
    /// Iterations actually run by the last fit
    n_iter: usize,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LogisticRegression {
    pub fn new() -> Self {
        Self {
            coefficients: None,
            intercept: None,
            fit_intercept: true,
            alpha: 0.01,
            max_iter: 1000,
            tol: 1e-6,
            learning_rate: 0.1,
            n_iter: 0,
        }
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    pub fn n_iter(&self) -> usize {
        self.n_iter
    }

    fn sigmoid(z: &Array1<f64>) -> Array1<f64> {
        z.mapv(|v| 1.0 / (1.0 + (-v).exp()))
    }

    fn decision(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        check_width(self.n_features(), x)?;
        let coefficients = self.coefficients.as_ref().ok_or(HeartError::ModelNotFitted)?;
        Ok(x.dot(coefficients) + self.intercept.unwrap_or(0.0))
    }
}

impl Classifier for LogisticRegression {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_training_data(x, y)?;
        let n_samples = x.nrows() as f64;

        let mut weights = Array1::<f64>::zeros(x.ncols());
        let mut bias = 0.0;
        let lr = self.learning_rate;
        let alpha = self.alpha;

        self.n_iter = 0;
        for _ in 0..self.max_iter {
            self.n_iter += 1;
            let predictions = Self::sigmoid(&(x.dot(&weights) + bias));

            let errors = &predictions - y;
            let dw = (x.t().dot(&errors) / n_samples) + (alpha * &weights);
            let db = if self.fit_intercept { errors.mean().unwrap_or(0.0) } else { 0.0 };

            let grad_norm = (dw.mapv(|v| v * v).sum() + db * db).sqrt();
            if grad_norm < self.tol {
                break;
            }

            weights = weights - lr * dw;
            bias -= lr * db;
        }

        if weights.iter().any(|w| !w.is_finite()) || !bias.is_finite() {
            return Err(HeartError::Training("logistic regression diverged".to_string()));
        }

        self.coefficients = Some(weights);
        self.intercept = Some(bias);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let proba = Self::sigmoid(&self.decision(x)?);
        Ok(proba.mapv(|p| if p >= 0.5 { 1.0 } else { 0.0 }))
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let positive = Self::sigmoid(&self.decision(x)?);
        let mut proba = Array2::zeros((x.nrows(), 2));
        for (i, p) in positive.iter().enumerate() {
            proba[[i, 0]] = 1.0 - p;
            proba[[i, 1]] = *p;
        }
        Ok(proba)
    }

    fn get_params(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("alpha".to_string(), self.alpha.to_string()),
            ("fit_intercept".to_string(), self.fit_intercept.to_string()),
            ("learning_rate".to_string(), self.learning_rate.to_string()),
            ("max_iter".to_string(), self.max_iter.to_string()),
            ("penalty".to_string(), "l2".to_string()),
            ("tol".to_string(), self.tol.to_string()),
        ])
    }

    fn n_features(&self) -> Option<usize> {
        self.coefficients.as_ref().map(|c| c.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_logistic_separable() {
        let x = array![[-2.0, -1.0], [-1.5, -0.5], [-1.0, -1.2], [1.0, 1.1], [1.5, 0.7], [2.0, 1.3]];
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];

        let mut model = LogisticRegression::new();
        model.fit(&x, &y).unwrap();
        assert_eq!(model.predict(&x).unwrap(), y);

        let p = model.predict_positive_proba(&x).unwrap();
        assert!(p[0] < 0.5 && p[5] > 0.5);
        assert!(p.iter().all(|v| (0.0..=1.0).contains(v)));
        assert!(model.n_iter() <= 1000);
    }

    #[test]
    fn test_proba_rows_sum_to_one() {
        let x = array![[0.0], [1.0], [2.0], [3.0]];
        let y = array![0.0, 0.0, 1.0, 1.0];
        let mut model = LogisticRegression::new().with_max_iter(200);
        model.fit(&x, &y).unwrap();
        let proba = model.predict_proba(&x).unwrap();
        for row in proba.rows() {
            assert!((row.sum() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_unfitted_and_width_errors() {
        let model = LogisticRegression::new();
        assert!(matches!(model.predict(&array![[1.0]]), Err(HeartError::ModelNotFitted)));

        let mut model = LogisticRegression::new().with_max_iter(10);
        model.fit(&array![[0.0, 1.0], [1.0, 0.0]], &array![0.0, 1.0]).unwrap();
        assert!(matches!(
            model.predict(&array![[1.0, 2.0, 3.0]]),
            Err(HeartError::SchemaMismatch { expected: 2, actual: 3 })
        ));
    }

    #[test]
    fn test_params() {
        let params = LogisticRegression::new().get_params();
        assert_eq!(params["max_iter"], "1000");
        assert_eq!(params["penalty"], "l2");
    }
}
