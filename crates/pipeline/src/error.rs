//! Detection error types

use inference_engine::{InferenceError, ModelKey};
use thiserror::Error;

/// Which side of the request a failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Bad parameters or unreadable upload
    Client,
    /// Missing model or failed inference
    Server,
}

/// Terminal failure of one detection request
#[derive(Debug, Error)]
pub enum DetectError {
    /// Bad mode, model id, media type, threshold, or upload
    #[error("{reason} ({field}: {value})")]
    InvalidInput {
        field: &'static str,
        value: String,
        reason: String,
    },

    /// Waste model slot is empty
    #[error("Model not loaded. Check if the model file exists at {path} and the model can be loaded correctly.")]
    ModelUnavailable { model: ModelKey, path: String },

    /// Unexpected failure while running a model or aggregating results
    #[error("{0}")]
    InferenceFailure(String),
}

impl DetectError {
    pub fn invalid(
        field: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        DetectError::InvalidInput {
            field,
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            DetectError::InvalidInput { .. } => ErrorClass::Client,
            DetectError::ModelUnavailable { .. } | DetectError::InferenceFailure(_) => {
                ErrorClass::Server
            }
        }
    }

    /// Short kind label for error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            DetectError::InvalidInput { .. } => "Invalid input",
            DetectError::ModelUnavailable { .. } => "Model unavailable",
            DetectError::InferenceFailure(_) => "Inference failed",
        }
    }
}

impl From<InferenceError> for DetectError {
    fn from(e: InferenceError) -> Self {
        match e {
            InferenceError::InvalidInputShape { expected, actual } => DetectError::InvalidInput {
                field: "file",
                value: actual,
                reason: format!("image dimensions must be {}", expected),
            },
            other => DetectError::InferenceFailure(other.to_string()),
        }
    }
}
