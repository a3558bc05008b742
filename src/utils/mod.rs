//! Utility helpers

mod data_loader;

pub use data_loader::{numeric_column, DataLoader, MISSING_TOKEN};
