/// Maps a target processing rate onto a fixed stride over the source frames.
///
/// The sampler is a pure function of `(native_rate, total_frames,
/// target_rate)`: identical inputs always produce identical indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSampler {
    stride: u64,
    total_frames: u64,
}

impl FrameSampler {
    pub fn new(native_rate: f64, total_frames: u64, target_rate: f64) -> Self {
        Self {
            stride: stride_for(native_rate, target_rate),
            total_frames,
        }
    }

    pub fn stride(&self) -> u64 {
        self.stride
    }

    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Number of indices the sampler will yield
    pub fn len(&self) -> u64 {
        self.total_frames.div_ceil(self.stride)
    }

    pub fn is_empty(&self) -> bool {
        self.total_frames == 0
    }

    /// `0, stride, 2 * stride, ...` strictly below the total frame count
    pub fn indices(&self) -> impl Iterator<Item = u64> + use<> {
        let stride = self.stride;
        let total = self.total_frames;
        (0..)
            .map(move |step: u64| step.saturating_mul(stride))
            .take_while(move |&index| index < total)
    }
}

/// Frames to advance between samples; never below one
pub fn stride_for(native_rate: f64, target_rate: f64) -> u64 {
    if native_rate > target_rate {
        // `as` saturates on overflow
        ((native_rate / target_rate).round() as u64).max(1)
    } else {
        1
    }
}
