//! Video source capabilities

use image::DynamicImage;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::MediaError;

/// A seekable decoded video
pub trait VideoSource {
    /// Total frames reported by the container
    fn frame_count(&self) -> u64;

    /// Frames per second
    fn fps(&self) -> f64;

    /// Frame width (pixels)
    fn width(&self) -> u32;

    /// Frame height (pixels)
    fn height(&self) -> u32;

    /// Decode the frame at `frame_index`
    fn seek_and_read(&mut self, frame_index: u64) -> Result<DynamicImage, MediaError>;
}

/// Opens staged video files
pub trait VideoOpener: Send + Sync {
    fn open(&self, path: &Path) -> Result<Box<dyn VideoSource>, MediaError>;
}

/// Decoded frames held in memory
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    frames: Vec<DynamicImage>,
    fps: f64,
    reported_frames: u64,
}

impl FrameBuffer {
    /// Create a buffer reporting exactly the frames it holds
    pub fn new(frames: Vec<DynamicImage>, fps: f64) -> Self {
        let reported_frames = frames.len() as u64;
        Self {
            frames,
            fps,
            reported_frames,
        }
    }

    /// Override the container frame count
    ///
    /// Indices past the held frames then fail to read, as with truncated files.
    pub fn with_reported_frames(mut self, reported_frames: u64) -> Self {
        self.reported_frames = reported_frames;
        self
    }
}

impl VideoSource for FrameBuffer {
    fn frame_count(&self) -> u64 {
        self.reported_frames
    }

    fn fps(&self) -> f64 {
        self.fps
    }

    fn width(&self) -> u32 {
        self.frames.first().map(|f| f.width()).unwrap_or(0)
    }

    fn height(&self) -> u32 {
        self.frames.first().map(|f| f.height()).unwrap_or(0)
    }

    fn seek_and_read(&mut self, frame_index: u64) -> Result<DynamicImage, MediaError> {
        usize::try_from(frame_index)
            .ok()
            .and_then(|index| self.frames.get(index))
            .cloned()
            .ok_or(MediaError::Seek(frame_index))
    }
}

/// GIF in-process, everything else through FFmpeg when enabled
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultVideoOpener;

impl VideoOpener for DefaultVideoOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn VideoSource>, MediaError> {
        let mut magic = Vec::with_capacity(6);
        File::open(path)?.take(6).read_to_end(&mut magic)?;

        if has_gif_magic(&magic) {
            debug!("Opening {} as animated GIF", path.display());
            return Ok(Box::new(crate::gif::GifVideoSource::open(path)?));
        }

        #[cfg(feature = "ffmpeg")]
        {
            debug!("Opening {} with ffmpeg", path.display());
            Ok(Box::new(crate::ffmpeg::FfmpegVideoSource::open(path)?))
        }

        #[cfg(not(feature = "ffmpeg"))]
        {
            Err(MediaError::Unsupported(
                "only animated GIF videos can be decoded without the ffmpeg feature".to_string(),
            ))
        }
    }
}

pub(crate) fn has_gif_magic(bytes: &[u8]) -> bool {
    bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a")
}
