//! Error types for the review pipeline
//!
//! Coercion fallbacks are not errors: the encoder degrades to defaults and
//! logs. Everything below reaches the caller synchronously and is never
//! retried.

use thiserror::Error;

/// The fitted transform rejected the constructed feature record.
#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("column '{0}' is not part of the feature layout")]
    UnknownColumn(String),

    #[error("column '{column}' expects a numeric feature")]
    NotNumeric { column: String },

    #[error("found unknown category '{value}' in column '{column}' during transform")]
    UnknownCategory { column: String, value: String },

    #[error("transform produced {actual} columns, classifier expects {expected}")]
    WidthMismatch { expected: usize, actual: usize },

    #[error("invalid transform parameters: {0}")]
    InvalidParameters(String),
}

/// The classifier failed or returned something outside its contract.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("classifier returned no prediction")]
    EmptyPrediction,

    #[error("classifier returned label {0}, expected 0 or 1")]
    NonBinaryLabel(i64),

    #[error("classifier expects {expected} input columns, got {actual}")]
    InputWidth { expected: usize, actual: usize },

    #[error("probability estimates are not supported by this classifier")]
    ProbabilityUnsupported,

    #[error("onnx runtime: {0}")]
    Runtime(String),
}

/// The audit append failed. The verdict must not be released.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("audit log I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("audit log CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("audit log header does not match the schema (found {found:?})")]
    SchemaMismatch { found: Vec<String> },
}

/// Loading the model bundle at startup failed.
#[derive(Debug, Error)]
pub enum BundleError {
    #[error("failed to read model bundle: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid model bundle manifest: {0}")]
    Json(#[from] serde_json::Error),

    #[error("feature layout mismatch: bundle pins {expected:08x}, runtime layout is {actual:08x}")]
    LayoutMismatch { expected: u32, actual: u32 },

    #[error("invalid model bundle: {0}")]
    Invalid(String),

    #[error("failed to load onnx classifier: {0}")]
    Onnx(String),
}

/// Any failure of a single review request.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}
