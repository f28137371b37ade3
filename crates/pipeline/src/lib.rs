//! Detection Request Pipeline
//!
//! Resolves the requested model, dispatches uploads to the image, video, or
//! mock path, and shapes the aggregated response or a classified error.

mod error;
mod params;
mod router;
mod service;

pub use error::{DetectError, ErrorClass};
pub use params::{DetectParams, DEFAULT_CONFIDENCE_THRESHOLD};
pub use router::{ModelRouter, Route};
pub use service::DetectionService;
