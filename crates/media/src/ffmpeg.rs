//! Container video decoding through FFmpeg
//!
//! Frames are decoded forward only. Requests for an index behind the current
//! position fail like any other unreadable frame.

use ffmpeg_next as ffmpeg;
use image::{DynamicImage, RgbImage};
use std::path::Path;
use tracing::{debug, info};

use crate::{MediaError, VideoSource};

pub struct FfmpegVideoSource {
    input: ffmpeg::format::context::Input,
    stream_index: usize,
    decoder: ffmpeg::codec::decoder::Video,
    scaler: ffmpeg::software::scaling::Context,
    frame_count: u64,
    fps: f64,
    /// Index of the next frame the decoder will produce
    position: u64,
    eof_sent: bool,
}

impl FfmpegVideoSource {
    pub fn open(path: &Path) -> Result<Self, MediaError> {
        ffmpeg::init().map_err(|e| MediaError::Open(format!("initialize ffmpeg: {}", e)))?;

        let input = ffmpeg::format::input(&path).map_err(|e| MediaError::Open(e.to_string()))?;
        let (stream_index, parameters, reported_frames, fps) = {
            let stream = input
                .streams()
                .best(ffmpeg::media::Type::Video)
                .ok_or_else(|| MediaError::Open("file has no video track".to_string()))?;
            (
                stream.index(),
                stream.parameters(),
                stream.frames(),
                f64::from(stream.avg_frame_rate()),
            )
        };

        let context = ffmpeg::codec::context::Context::from_parameters(parameters)
            .map_err(|e| MediaError::Open(format!("load decoder parameters: {}", e)))?;
        let decoder = context
            .decoder()
            .video()
            .map_err(|e| MediaError::Open(format!("open video decoder: {}", e)))?;

        let scaler = ffmpeg::software::scaling::Context::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            ffmpeg::util::format::pixel::Pixel::RGB24,
            decoder.width(),
            decoder.height(),
            ffmpeg::software::scaling::flag::Flags::BILINEAR,
        )
        .map_err(|e| MediaError::Open(format!("create scaler: {}", e)))?;

        let fps = if fps.is_finite() { fps } else { 0.0 };
        let frame_count = estimate_frame_count(reported_frames, input.duration(), fps);

        info!(
            "Video properties: {} frames at {:.2} FPS, dimensions: {}x{}",
            frame_count,
            fps,
            decoder.width(),
            decoder.height()
        );

        Ok(Self {
            input,
            stream_index,
            decoder,
            scaler,
            frame_count,
            fps,
            position: 0,
            eof_sent: false,
        })
    }

    fn decode_next(&mut self) -> Result<Option<ffmpeg::frame::Video>, MediaError> {
        let mut decoded = ffmpeg::frame::Video::empty();
        loop {
            if self.decoder.receive_frame(&mut decoded).is_ok() {
                return Ok(Some(decoded));
            }
            if self.eof_sent {
                return Ok(None);
            }

            let next = self
                .input
                .packets()
                .next()
                .map(|(stream, packet)| (stream.index(), packet));

            match next {
                Some((index, packet)) if index == self.stream_index => {
                    self.decoder
                        .send_packet(&packet)
                        .map_err(|e| MediaError::Decode(e.to_string()))?;
                }
                Some(_) => {}
                None => {
                    self.decoder
                        .send_eof()
                        .map_err(|e| MediaError::Decode(e.to_string()))?;
                    self.eof_sent = true;
                }
            }
        }
    }

    fn to_image(&mut self, decoded: &ffmpeg::frame::Video) -> Result<DynamicImage, MediaError> {
        let mut rgb_frame = ffmpeg::frame::Video::empty();
        self.scaler
            .run(decoded, &mut rgb_frame)
            .map_err(|e| MediaError::Decode(format!("scale frame to RGB: {}", e)))?;

        let width = rgb_frame.width();
        let height = rgb_frame.height();
        let row_bytes = width as usize * 3;
        let stride = rgb_frame.stride(0);
        let data = rgb_frame.data(0);

        let mut pixels = Vec::with_capacity(row_bytes * height as usize);
        for row in 0..height as usize {
            let start = row * stride;
            let line = data
                .get(start..start + row_bytes)
                .ok_or_else(|| MediaError::Decode("frame row is out of bounds".to_string()))?;
            pixels.extend_from_slice(line);
        }

        RgbImage::from_raw(width, height, pixels)
            .map(DynamicImage::ImageRgb8)
            .ok_or_else(|| MediaError::Decode("frame buffer size mismatch".to_string()))
    }
}

/// Container frame count, or duration times frame rate when none is stored
///
/// `duration` is in `AV_TIME_BASE` units (microseconds).
fn estimate_frame_count(reported_frames: i64, duration: i64, fps: f64) -> u64 {
    if reported_frames > 0 {
        return reported_frames as u64;
    }
    if !fps.is_finite() || fps <= 0.0 {
        return 0;
    }

    let duration_secs = duration.max(0) as f64 / f64::from(ffmpeg::ffi::AV_TIME_BASE);
    (duration_secs * fps).round() as u64
}

impl VideoSource for FfmpegVideoSource {
    fn frame_count(&self) -> u64 {
        self.frame_count
    }

    fn fps(&self) -> f64 {
        self.fps
    }

    fn width(&self) -> u32 {
        self.decoder.width()
    }

    fn height(&self) -> u32 {
        self.decoder.height()
    }

    fn seek_and_read(&mut self, frame_index: u64) -> Result<DynamicImage, MediaError> {
        if frame_index < self.position {
            return Err(MediaError::Seek(frame_index));
        }

        while let Some(decoded) = self.decode_next()? {
            let current = self.position;
            self.position += 1;
            if current == frame_index {
                return self.to_image(&decoded);
            }
        }

        debug!("Video ended before frame {}", frame_index);
        Err(MediaError::Seek(frame_index))
    }
}
