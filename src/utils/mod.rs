//! Utility functions and types

pub mod data_loader;

pub use data_loader::{infer_column_types, strip_whitespace, train_test_split, DataLoader, DataSaver};
