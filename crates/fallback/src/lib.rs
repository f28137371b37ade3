//! Synthetic Fallback Detections
//!
//! Provides randomized space detections when no space model is loaded,
//! behind the same `Detector` interface as the real models.

mod mock;

pub use mock::{MockSpaceDetector, MOCK_SPACE_CLASSES};
