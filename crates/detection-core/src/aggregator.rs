//! Detection aggregation across an image or sampled video frames

use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

use crate::{Detection, DetectionResponse, Mode};

/// Pixel extent the detections were found in
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Extent {
    /// Single still image
    Image { width: u32, height: u32 },
    /// Video whose sampled frames were aggregated
    Video {
        width: u32,
        height: u32,
        frame_count: u64,
        fps: f64,
    },
}

/// Running totals for one unit of work
#[derive(Debug, Default)]
pub struct Aggregator {
    detections: Vec<Detection>,
    class_counts: BTreeMap<String, usize>,
    /// Sum of box areas (pixels)
    total_area: f64,
    frames_processed: u64,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one normalized detection
    pub fn push(&mut self, detection: Detection) {
        *self
            .class_counts
            .entry(detection.class_name.clone())
            .or_insert(0) += 1;
        self.total_area += detection.area();
        self.detections.push(detection);
    }

    /// Mark the end of one processed image or frame
    pub fn finish_frame(&mut self) {
        self.frames_processed += 1;
    }

    pub fn detections(&self) -> &[Detection] {
        &self.detections
    }

    pub fn class_counts(&self) -> &BTreeMap<String, usize> {
        &self.class_counts
    }

    pub fn total_area(&self) -> f64 {
        self.total_area
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    /// Percentage of the covered area, 0 when the denominator is empty
    pub fn density(&self, extent: &Extent) -> f64 {
        let covered = match *extent {
            Extent::Image { width, height } => width as f64 * height as f64,
            Extent::Video { width, height, .. } => {
                width as f64 * height as f64 * self.frames_processed as f64
            }
        };

        if covered > 0.0 {
            100.0 * self.total_area / covered
        } else {
            0.0
        }
    }

    /// Build the response for the given mode
    pub fn finish(
        self,
        mode: Mode,
        extent: Extent,
        processing_time: Duration,
    ) -> DetectionResponse {
        let waste_density = match mode {
            Mode::Waste => Some(self.density(&extent)),
            Mode::Space => None,
        };

        let (frame_count, fps) = match extent {
            Extent::Image { .. } => (None, None),
            Extent::Video {
                frame_count, fps, ..
            } => (Some(frame_count), Some(fps)),
        };

        debug!(
            "Aggregated {} detections over {} frames",
            self.detections.len(),
            self.frames_processed
        );

        DetectionResponse {
            detections: self.detections,
            processing_time: processing_time.as_secs_f64(),
            class_counts: self.class_counts,
            waste_density,
            frame_count,
            fps,
        }
    }
}

impl Extend<Detection> for Aggregator {
    fn extend<I: IntoIterator<Item = Detection>>(&mut self, iter: I) {
        for detection in iter {
            self.push(detection);
        }
    }
}
