//! Data preprocessing module
//!
//! Turns cleaned census records into the numeric matrix the classifier
//! consumes:
//! - One-hot encoding of categorical columns ([`OneHotEncoder`])
//! - Label binarization ([`LabelBinarizer`])
//! - FIT and APPLY entry points that assemble the feature matrix

mod binarizer;
mod encoder;
mod processor;

pub use binarizer::LabelBinarizer;
pub use encoder::OneHotEncoder;
pub(crate) use encoder::string_values;
pub use processor::{process_apply, process_fit, FittedFeatures, ProcessedData};
