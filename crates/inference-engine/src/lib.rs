//! ONNX Detection Engine
//!
//! Provides object detection models using tract-onnx and the registry
//! that owns them for the lifetime of the process.

mod detector;
mod registry;
mod yolo;

pub use detector::Detector;
pub use registry::{ModelKey, ModelPaths, ModelRegistry, ModelStatus};
pub use yolo::{YoloConfig, YoloDetector};

use thiserror::Error;

/// Errors during model loading or inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Invalid input shape: expected {expected}, got {actual}")]
    InvalidInputShape { expected: String, actual: String },
}
