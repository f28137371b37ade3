//! Animated GIF decoding
//!
//! Frames are decoded forward only and one at a time. Only the frame handed
//! back by `seek_and_read` outlives its decode step.

use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, DynamicImage, Frame, Frames, ImageDecoder};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

use crate::{MediaError, VideoSource};

/// Frame rate assumed when a GIF declares no frame delay
const DEFAULT_GIF_FPS: f64 = 10.0;

/// Largest decoded RGBA canvas accepted for one frame (bytes)
const MAX_FRAME_BYTES: u64 = 256 * 1024 * 1024;

/// Streaming animated GIF source
pub struct GifVideoSource {
    frames: Frames<'static>,
    frame_count: u64,
    fps: f64,
    width: u32,
    height: u32,
    /// Index of the next frame the decoder will produce
    position: u64,
}

impl GifVideoSource {
    /// Open a GIF, counting its frames without keeping them
    pub fn open(path: &Path) -> Result<Self, MediaError> {
        let header = decoder(path)?;
        let (width, height) = header.dimensions();

        let frame_bytes = u64::from(width) * u64::from(height) * 4;
        if frame_bytes > MAX_FRAME_BYTES {
            return Err(MediaError::Open(format!(
                "GIF canvas {}x{} exceeds the decode limit",
                width, height
            )));
        }

        let mut frame_count = 0u64;
        let mut fps = DEFAULT_GIF_FPS;
        for frame in header.into_frames() {
            match frame {
                Ok(frame) => {
                    if frame_count == 0 {
                        fps = frame_rate(&frame);
                    }
                    frame_count += 1;
                }
                Err(e) if frame_count > 0 => {
                    debug!("GIF truncated after {} frames: {}", frame_count, e);
                    break;
                }
                Err(e) => return Err(MediaError::Open(e.to_string())),
            }
        }

        debug!(
            "Opened {}x{} GIF with {} frames at {:.2} fps",
            width, height, frame_count, fps
        );

        Ok(Self {
            frames: decoder(path)?.into_frames(),
            frame_count,
            fps,
            width,
            height,
            position: 0,
        })
    }
}

impl VideoSource for GifVideoSource {
    fn frame_count(&self) -> u64 {
        self.frame_count
    }

    fn fps(&self) -> f64 {
        self.fps
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn seek_and_read(&mut self, frame_index: u64) -> Result<DynamicImage, MediaError> {
        if frame_index < self.position {
            return Err(MediaError::Seek(frame_index));
        }

        for frame in self.frames.by_ref() {
            let current = self.position;
            self.position += 1;
            let frame = frame.map_err(|e| MediaError::Decode(e.to_string()))?;
            if current == frame_index {
                return Ok(DynamicImage::ImageRgba8(frame.into_buffer()));
            }
        }

        Err(MediaError::Seek(frame_index))
    }
}

fn decoder(path: &Path) -> Result<GifDecoder<BufReader<File>>, MediaError> {
    let file = File::open(path)?;
    GifDecoder::new(BufReader::new(file)).map_err(|e| MediaError::Open(e.to_string()))
}

fn frame_rate(frame: &Frame) -> f64 {
    let (numer, denom) = frame.delay().numer_denom_ms();
    if numer == 0 || denom == 0 {
        DEFAULT_GIF_FPS
    } else {
        1000.0 * denom as f64 / numer as f64
    }
}
