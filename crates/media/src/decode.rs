//! Still image decoding

use image::DynamicImage;
use tracing::debug;

use crate::MediaError;

/// Decode an uploaded still image, detecting its format from content
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, MediaError> {
    if bytes.is_empty() {
        return Err(MediaError::Decode("empty upload".to_string()));
    }

    let image = image::load_from_memory(bytes).map_err(|e| MediaError::Decode(e.to_string()))?;
    debug!("Decoded {}x{} image", image.width(), image.height());
    Ok(image)
}
