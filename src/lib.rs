//! Census pipeline - salary classification on the US census dataset
//!
//! This crate provides the complete workflow around one model:
//! - Cleaning of the raw census CSV
//! - Feature processing with a one-hot encoder and a label binarizer
//! - Random forest training with k-fold cross-validation
//! - Per-slice scoring of the trained model
//! - Single-record inference over HTTP and from the CLI
//!
//! # Modules
//!
//! ## Data
//! - [`schema`] - Feature columns and categorical vocabularies
//! - [`cleaning`] - Raw to clean CSV
//! - [`preprocessing`] - Encoders and feature matrix assembly
//!
//! ## Model
//! - [`training`] - Decision trees, random forest, cross-validation, metrics
//! - [`evaluation`] - Slice metrics and the slice report
//! - [`artifacts`] - Model and encoder persistence
//! - [`inference`] - Request records and prediction
//!
//! ## Services
//! - [`pipeline`] - Pipeline actions
//! - [`server`] - HTTP server with REST API
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Data
pub mod schema;
pub mod cleaning;
pub mod preprocessing;
pub mod utils;

// Model
pub mod training;
pub mod evaluation;
pub mod artifacts;
pub mod inference;

// Services
pub mod config;
pub mod pipeline;
pub mod server;
pub mod cli;

pub use error::{PipelineError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{PipelineError, Result};

    // Preprocessing
    pub use crate::preprocessing::{process_apply, process_fit, LabelBinarizer, OneHotEncoder};

    // Training
    pub use crate::training::{train_model, CrossValidator, RandomForest, Scoring, TrainerConfig};

    // Evaluation and inference
    pub use crate::artifacts::{ArtifactStore, Artifacts};
    pub use crate::evaluation::{evaluate_slices, SliceMetrics};
    pub use crate::inference::{CensusRecord, Predictor};

    // Pipeline
    pub use crate::config::PipelineConfig;
    pub use crate::pipeline::{execute, Action};
}
