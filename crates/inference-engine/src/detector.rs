//! Detector capability

use detection_core::RawDetection;
use image::DynamicImage;

use crate::InferenceError;

/// An object detection model
///
/// Implementations must be safe to share between concurrent requests.
pub trait Detector: Send + Sync {
    /// Run detection on one image, keeping results at or above `confidence_threshold`
    fn infer(
        &self,
        image: &DynamicImage,
        confidence_threshold: f32,
    ) -> Result<Vec<RawDetection>, InferenceError>;

    /// Class names indexed by class id
    fn names(&self) -> &[String];

    /// Detector name (for logging)
    fn name(&self) -> &str;
}
