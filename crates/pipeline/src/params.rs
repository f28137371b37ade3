//! Request parameter validation

use detection_core::{MediaType, Mode};

use crate::DetectError;

/// Confidence threshold used when the client sends none
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.25;

/// Validated detection request parameters
#[derive(Debug, Clone, PartialEq)]
pub struct DetectParams {
    pub mode: Mode,
    pub model_id: String,
    pub media_type: MediaType,
    /// Minimum confidence kept (0.0 to 1.0)
    pub confidence_threshold: f32,
}

impl DetectParams {
    /// Validate raw form values
    pub fn parse(
        mode: &str,
        model_id: &str,
        media_type: &str,
        confidence_threshold: &str,
    ) -> Result<Self, DetectError> {
        let mode = Mode::from_name(mode)
            .ok_or_else(|| DetectError::invalid("mode", mode, "Unknown mode"))?;

        let media_type = MediaType::from_name(media_type).ok_or_else(|| {
            DetectError::invalid("media_type", media_type, "Unsupported media type")
        })?;

        let confidence_threshold = confidence_threshold
            .trim()
            .parse::<f32>()
            .ok()
            .filter(|t| t.is_finite() && (0.0..=1.0).contains(t))
            .ok_or_else(|| {
                DetectError::invalid(
                    "confidence_threshold",
                    confidence_threshold,
                    "Confidence threshold must be a number between 0 and 1",
                )
            })?;

        Ok(Self {
            mode,
            model_id: model_id.to_string(),
            media_type,
            confidence_threshold,
        })
    }
}
