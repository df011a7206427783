use thiserror::Error;

/// Domain failures raised by the dataset and its configuration.
///
/// Functions in this crate return `anyhow::Result`; when the root cause is
/// one of these conditions it can be recovered with
/// `err.downcast_ref::<PairError>()`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PairError {
    #[error("Index {index} out of bounds for dataset of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Path and label sequences differ in length ({paths} paths, {labels} labels)")]
    LengthMismatch { paths: usize, labels: usize },

    #[error("Unknown transform preset '{0}' (expected 'train' or 'val')")]
    UnknownPreset(String),

    #[error("No {kind} pipeline registered for preset '{key}'")]
    MissingPreset { kind: &'static str, key: String },

    #[error("Label is not convertible to a numeric array: {0}")]
    LabelConversion(String),
}
