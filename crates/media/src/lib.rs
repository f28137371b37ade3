//! Media Decoding for Detection Requests
//!
//! Provides decoding for uploaded media:
//! - Still images (PNG, JPEG, GIF, BMP, WebP, ...)
//! - Animated GIF videos, streamed in-process
//! - Container videos through FFmpeg (feature `ffmpeg`)
//! - Temp-file staging with cleanup on drop

mod decode;
mod gif;
mod staging;
mod video;

#[cfg(feature = "ffmpeg")]
mod ffmpeg;

pub use decode::decode_image;
pub use gif::GifVideoSource;
pub use staging::StagedUpload;
pub use video::{DefaultVideoOpener, FrameBuffer, VideoOpener, VideoSource};

#[cfg(feature = "ffmpeg")]
pub use ffmpeg::FfmpegVideoSource;

use thiserror::Error;

/// Media error types
#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Could not open video file: {0}")]
    Open(String),

    #[error("Failed to read frame {0}")]
    Seek(u64),

    #[error("Unsupported media: {0}")]
    Unsupported(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
