//! Data preparation
//!
//! - CSV validation and target binarization ([`FeaturePreparer`])
//! - Seeded stratified splitting
//! - Mode imputation for the sparse columns
//! - Standardization persisted with the model ([`Scaler`])

mod imputer;
mod preparer;
mod scaler;
mod split;

pub use imputer::{column_mode, missing_per_column, ModeImputer};
pub use preparer::{FeaturePreparer, ImputationScope, PreparedData, RawDataset};
pub use scaler::Scaler;
pub use split::{stratified_split, SplitIndices};
