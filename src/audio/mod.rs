pub mod loading;

/// Header-level description of an audio file.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AudioInfo {
    pub sampling_rate: u32,
    /// Samples per channel.
    pub num_frames: u64,
    pub num_channels: usize,
}

impl AudioInfo {
    pub fn duration(&self) -> f64 {
        compute_duration(self.num_frames, self.sampling_rate)
    }
}

/// Duration in seconds of `num_samples` samples at `sampling_rate` Hz.
pub fn compute_duration(num_samples: u64, sampling_rate: u32) -> f64 {
    if sampling_rate == 0 {
        return 0.0;
    }
    num_samples as f64 / sampling_rate as f64
}
