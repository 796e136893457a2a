//! Error types for TherapEase

use thiserror::Error;

/// Errors that can occur while turning a submission into a suggestion
#[derive(Debug, Error)]
pub enum SuggestError {
    #[error("Unknown {table} category: {label:?}")]
    UnknownCategory { table: &'static str, label: String },

    #[error("Predictor invocation failed: {0}")]
    PredictorInvocation(String),

    #[error("Activity list is empty")]
    EmptyActivityList,

    #[error("Failed to load model: {0}")]
    ModelLoad(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
