//! Seeded stratified train/test split

use crate::error::{HeartError, Result};
use ndarray::Array1;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;

/// Row indices of each side of a split, both sorted ascending
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Split row indices so each class keeps its share in both halves.
///
/// Every class contributes `round(n_class * test_size)` rows to the test side,
/// clamped so both sides keep at least one row of it. The same labels, ratio
/// and seed always produce the same split.
pub fn stratified_split(y: &Array1<f64>, test_size: f64, seed: u64) -> Result<SplitIndices> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(HeartError::DataFormat(format!(
            "test size must be in (0, 1), got {}",
            test_size
        )));
    }

    let mut by_class: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (i, &label) in y.iter().enumerate() {
        by_class.entry(label.round() as i64).or_default().push(i);
    }

    if by_class.len() < 2 {
        return Err(HeartError::DataFormat(
            "stratified split needs at least two classes".to_string(),
        ));
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(y.len());
    let mut test = Vec::new();

    for (class, mut indices) in by_class {
        let n = indices.len();
        if n < 2 {
            return Err(HeartError::DataFormat(format!(
                "class {} has {} row(s); at least 2 are needed to stratify",
                class, n
            )));
        }
        indices.shuffle(&mut rng);

        let n_test = ((n as f64 * test_size).round() as usize).clamp(1, n - 1);
        test.extend_from_slice(&indices[..n_test]);
        train.extend_from_slice(&indices[n_test..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    Ok(SplitIndices { train, test })
}
