//! Randomized space detector

use detection_core::RawDetection;
use image::{DynamicImage, GenericImageView};
use inference_engine::{Detector, InferenceError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::{Range, RangeInclusive};
use std::sync::Mutex;
use tracing::{debug, info};

/// Space taxonomy used for synthetic detections
pub const MOCK_SPACE_CLASSES: [&str; 7] = [
    "star",
    "planet",
    "galaxy",
    "nebula",
    "asteroid",
    "comet",
    "blackhole",
];

const DETECTION_COUNT: RangeInclusive<usize> = 3..=7;
const MIN_BOX_SIZE: u32 = 50;
const MAX_BOX_SIZE: u32 = 200;
const CONFIDENCE: Range<f32> = 0.6..0.98;

/// Detector that fabricates plausible space detections
///
/// Used only when the requested space model is not loaded. Never used for
/// waste classification.
pub struct MockSpaceDetector<R = StdRng> {
    rng: Mutex<R>,
    names: Vec<String>,
}

impl MockSpaceDetector<StdRng> {
    /// Create a mock detector seeded from OS entropy
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl Default for MockSpaceDetector<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng + Send> MockSpaceDetector<R> {
    /// Create a mock detector drawing from the given random source
    pub fn with_rng(rng: R) -> Self {
        info!("Creating mock space detector");
        Self {
            rng: Mutex::new(rng),
            names: MOCK_SPACE_CLASSES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl<R: Rng + Send> Detector for MockSpaceDetector<R> {
    fn infer(
        &self,
        image: &DynamicImage,
        _confidence_threshold: f32,
    ) -> Result<Vec<RawDetection>, InferenceError> {
        let (width, height) = image.dimensions();
        let max_width = MAX_BOX_SIZE.min(width / 2);
        let max_height = MAX_BOX_SIZE.min(height / 2);

        if max_width <= MIN_BOX_SIZE || max_height <= MIN_BOX_SIZE {
            let min_side = 2 * (MIN_BOX_SIZE + 1);
            return Err(InferenceError::InvalidInputShape {
                expected: format!("at least {}x{}", min_side, min_side),
                actual: format!("{}x{}", width, height),
            });
        }

        let mut rng = self
            .rng
            .lock()
            .map_err(|e| InferenceError::InferenceFailed(format!("Lock error: {}", e)))?;

        let count = rng.gen_range(DETECTION_COUNT);
        let detections: Vec<RawDetection> = (0..count)
            .map(|_| {
                let class_index = rng.gen_range(0..MOCK_SPACE_CLASSES.len());
                let box_width = rng.gen_range(MIN_BOX_SIZE..max_width);
                let box_height = rng.gen_range(MIN_BOX_SIZE..max_height);
                let x = rng.gen_range(0..width - box_width);
                let y = rng.gen_range(0..height - box_height);

                RawDetection {
                    x1: x as f32,
                    y1: y as f32,
                    x2: (x + box_width) as f32,
                    y2: (y + box_height) as f32,
                    confidence: rng.gen_range(CONFIDENCE),
                    class_index,
                }
            })
            .collect();

        debug!("Generated {} mock space detections", detections.len());
        Ok(detections)
    }

    fn names(&self) -> &[String] {
        &self.names
    }

    fn name(&self) -> &str {
        "mock-space"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn seeded(seed: u64) -> MockSpaceDetector<StdRng> {
        MockSpaceDetector::with_rng(StdRng::seed_from_u64(seed))
    }

    #[test]
    fn test_output_ranges() {
        let detector = seeded(7);
        let image = DynamicImage::new_rgb8(640, 480);

        for _ in 0..50 {
            let detections = detector.infer(&image, 0.25).unwrap();
            assert!(DETECTION_COUNT.contains(&detections.len()));

            for d in &detections {
                let w = d.x2 - d.x1;
                let h = d.y2 - d.y1;
                assert!((50.0..200.0).contains(&w));
                assert!((50.0..200.0).contains(&h));
                assert!(d.x1 >= 0.0 && d.x2 < 640.0);
                assert!(d.y1 >= 0.0 && d.y2 < 480.0);
                assert!((0.6..0.98).contains(&d.confidence));
                assert!(d.class_index < MOCK_SPACE_CLASSES.len());
            }
        }
    }

    #[test]
    fn test_small_image_caps_box_size() {
        let detector = seeded(1);
        let image = DynamicImage::new_rgb8(120, 300);

        for d in detector.infer(&image, 0.25).unwrap() {
            // max width is min(200, 120 / 2) = 60, exclusive
            assert!(d.x2 - d.x1 < 60.0);
        }
    }

    #[test]
    fn test_too_small_image() {
        let detector = seeded(1);
        let image = DynamicImage::new_rgb8(100, 400);

        let result = detector.infer(&image, 0.25);
        assert!(matches!(
            result,
            Err(InferenceError::InvalidInputShape { .. })
        ));
    }

    #[test]
    fn test_same_seed_is_reproducible() {
        let image = DynamicImage::new_rgb8(800, 600);
        let a = seeded(42).infer(&image, 0.25).unwrap();
        let b = seeded(42).infer(&image, 0.25).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_names() {
        let detector = MockSpaceDetector::new();
        assert_eq!(detector.names().len(), 7);
        assert_eq!(detector.names()[6], "blackhole");
    }

    proptest! {
        #[test]
        fn prop_boxes_stay_inside_image(
            seed in any::<u64>(),
            w in 102u32..2000,
            h in 102u32..2000,
        ) {
            let detector = seeded(seed);
            let image = DynamicImage::new_luma8(w, h);
            for d in detector.infer(&image, 0.0).unwrap() {
                prop_assert!(d.x1 >= 0.0 && d.y1 >= 0.0);
                prop_assert!(d.x2 < w as f32 && d.y2 < h as f32);
            }
        }
    }
}
