//! Evenly spaced video frame sampling

/// Number of frames sampled per video
pub const DEFAULT_SAMPLE_TARGET: u64 = 10;

/// Selects which frame indices of a video to run inference on
#[derive(Debug, Clone, Copy)]
pub struct FrameSampler {
    target: u64,
}

impl FrameSampler {
    /// Create a sampler aiming for `target` frames per video
    pub fn new(target: u64) -> Self {
        Self {
            target: target.max(1),
        }
    }

    pub fn target(&self) -> u64 {
        self.target
    }

    /// Distance between sampled frames
    pub fn interval(&self, total_frames: u64) -> u64 {
        (total_frames / self.target).max(1)
    }

    /// Sampled indices `0, interval, 2 * interval, ...` below `total_frames`
    pub fn schedule(&self, total_frames: u64) -> FrameSchedule {
        FrameSchedule {
            next: 0,
            interval: self.interval(total_frames),
            total_frames,
        }
    }
}

impl Default for FrameSampler {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_TARGET)
    }
}

/// Iterator over sampled frame indices
#[derive(Debug, Clone)]
pub struct FrameSchedule {
    next: u64,
    interval: u64,
    total_frames: u64,
}

impl Iterator for FrameSchedule {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        if self.next >= self.total_frames {
            return None;
        }
        let current = self.next;
        self.next = self.next.saturating_add(self.interval);
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.next >= self.total_frames {
            0
        } else {
            ((self.total_frames - self.next - 1) / self.interval + 1) as usize
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for FrameSchedule {}
