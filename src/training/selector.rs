//! Pick the winning candidate by ROC-AUC

use crate::error::{HeartError, Result};

/// Stable argmax over `(label, score)` pairs
pub struct ModelSelector;

impl ModelSelector {
    /// Index of the highest score; ties keep the earliest entry.
    ///
    /// Empty input or any NaN score is an error.
    pub fn select<L: AsRef<str>>(scores: &[(L, f64)]) -> Result<usize> {
        if scores.is_empty() {
            return Err(HeartError::Training("no candidate scores to select from".to_string()));
        }
        if let Some((label, _)) = scores.iter().find(|(_, s)| s.is_nan()) {
            return Err(HeartError::Training(format!(
                "candidate '{}' has a NaN score",
                label.as_ref()
            )));
        }

        let mut best = 0;
        for (i, (_, score)) in scores.iter().enumerate().skip(1) {
            if *score > scores[best].1 {
                best = i;
            }
        }
        Ok(best)
    }

    /// Label of the winning entry
    pub fn select_label<L: AsRef<str>>(scores: &[(L, f64)]) -> Result<&str> {
        let idx = Self::select(scores)?;
        Ok(scores[idx].0.as_ref())
    }
}
