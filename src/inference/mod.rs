//! Inference module
//!
//! Validates a single request record against the schema vocabularies and
//! predicts its label with the persisted model and encoders.

mod predictor;
mod record;

pub use predictor::Predictor;
pub use record::CensusRecord;
