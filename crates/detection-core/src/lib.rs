//! Detection Result Aggregation
//!
//! Turns raw detector output into client-facing summaries:
//! - Corner-pair to top-left/size box normalization
//! - Biodegradability lookup for waste classes
//! - Evenly spaced video frame sampling
//! - Class counts and area density across images or sampled frames

mod aggregator;
mod biodegradable;
mod normalizer;
mod sampler;
mod types;

pub use aggregator::{Aggregator, Extent};
pub use biodegradable::{Biodegradability, BIODEGRADABLE_CLASSES};
pub use normalizer::DetectionNormalizer;
pub use sampler::{FrameSampler, FrameSchedule, DEFAULT_SAMPLE_TARGET};
pub use types::{Detection, DetectionResponse, MediaType, Mode, RawDetection};
