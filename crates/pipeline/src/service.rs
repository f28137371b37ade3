//! Per-request detection orchestration

use detection_core::{
    Aggregator, DetectionNormalizer, DetectionResponse, Extent, FrameSampler, MediaType,
};
use fallback::MockSpaceDetector;
use image::GenericImageView;
use inference_engine::{Detector, ModelRegistry};
use media::{decode_image, DefaultVideoOpener, StagedUpload, VideoOpener};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::{DetectError, DetectParams, ModelRouter, Route};

/// Runs one detection request end to end
///
/// Holds only read-only state, so one instance serves concurrent requests.
pub struct DetectionService {
    router: ModelRouter,
    mock: Arc<dyn Detector>,
    sampler: FrameSampler,
    opener: Arc<dyn VideoOpener>,
}

impl DetectionService {
    /// Create a service over a loaded registry
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self {
            router: ModelRouter::new(registry),
            mock: Arc::new(MockSpaceDetector::new()),
            sampler: FrameSampler::default(),
            opener: Arc::new(DefaultVideoOpener),
        }
    }

    /// Replace the space fallback detector
    pub fn with_mock(mut self, mock: Arc<dyn Detector>) -> Self {
        self.mock = mock;
        self
    }

    pub fn with_sampler(mut self, sampler: FrameSampler) -> Self {
        self.sampler = sampler;
        self
    }

    pub fn with_video_opener(mut self, opener: Arc<dyn VideoOpener>) -> Self {
        self.opener = opener;
        self
    }

    pub fn registry(&self) -> &ModelRegistry {
        self.router.registry()
    }

    /// Run detection on an uploaded image or video
    pub fn detect(
        &self,
        params: &DetectParams,
        upload: &[u8],
    ) -> Result<DetectionResponse, DetectError> {
        let route = self.router.resolve(params.mode, &params.model_id)?;

        match (route, params.media_type) {
            (Route::Model { detector, .. }, MediaType::Image) => {
                self.process_image(detector.as_ref(), params, upload)
            }
            (Route::Model { detector, .. }, MediaType::Video) => {
                self.process_video(detector.as_ref(), params, upload)
            }
            (Route::Mock { .. }, MediaType::Image) => {
                self.process_image(self.mock.as_ref(), params, upload)
            }
            (Route::Mock { .. }, MediaType::Video) => Err(DetectError::invalid(
                "media_type",
                "video",
                "Video processing not supported for mock space data",
            )),
        }
    }

    fn process_image(
        &self,
        detector: &dyn Detector,
        params: &DetectParams,
        upload: &[u8],
    ) -> Result<DetectionResponse, DetectError> {
        let image = decode_image(upload)
            .map_err(|e| DetectError::invalid("file", "image", format!("Invalid image: {}", e)))?;
        let (width, height) = image.dimensions();

        let start = Instant::now();
        let raw = detector.infer(&image, params.confidence_threshold)?;
        let processing_time = start.elapsed();

        let normalizer = DetectionNormalizer::new(detector.names(), params.mode);
        let mut aggregator = Aggregator::new();
        aggregator.extend(raw.iter().map(|r| normalizer.normalize(r, None)));
        aggregator.finish_frame();

        let response = aggregator.finish(
            params.mode,
            Extent::Image { width, height },
            processing_time,
        );

        info!(
            "Processed {} image with {} detections in {:.2}s",
            params.mode.as_str(),
            response.detections.len(),
            response.processing_time
        );
        Ok(response)
    }

    fn process_video(
        &self,
        detector: &dyn Detector,
        params: &DetectParams,
        upload: &[u8],
    ) -> Result<DetectionResponse, DetectError> {
        // dropped after `source`, on every return path
        let staged = StagedUpload::write(upload)
            .map_err(|e| DetectError::InferenceFailure(format!("Failed to stage video: {}", e)))?;

        let mut source = self
            .opener
            .open(staged.path())
            .map_err(|e| DetectError::invalid("file", "video", e.to_string()))?;

        let frame_count = source.frame_count();
        let extent = Extent::Video {
            width: source.width(),
            height: source.height(),
            frame_count,
            fps: source.fps(),
        };

        let normalizer = DetectionNormalizer::new(detector.names(), params.mode);
        let mut aggregator = Aggregator::new();
        let schedule = self.sampler.schedule(frame_count);
        let scheduled = schedule.len();

        let start = Instant::now();
        for frame_index in schedule {
            let frame = match source.seek_and_read(frame_index) {
                Ok(frame) => frame,
                Err(e) => {
                    debug!("Skipping frame {}: {}", frame_index, e);
                    continue;
                }
            };

            let raw = detector.infer(&frame, params.confidence_threshold)?;
            aggregator.extend(raw.iter().map(|r| normalizer.normalize(r, Some(frame_index))));
            aggregator.finish_frame();
        }
        let processing_time = start.elapsed();

        let processed = aggregator.frames_processed();
        if (processed as usize) < scheduled {
            warn!("Read {} of {} sampled frames", processed, scheduled);
        }

        let response = aggregator.finish(params.mode, extent, processing_time);
        info!(
            "Processed {} video with {} detections across {} frames in {:.2}s",
            params.mode.as_str(),
            response.detections.len(),
            processed,
            response.processing_time
        );
        Ok(response)
    }
}
