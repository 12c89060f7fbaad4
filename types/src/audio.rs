//! Audio buffer layout shared with the host's mixing engine.

use serde::{Deserialize, Serialize};

/// Number of output mixer buses (tracks) the host renders.
pub const MAX_AUDIO_MIXES: usize = 6;
/// Maximum channel count per bus.
pub const MAX_AUDIO_CHANNELS: usize = 8;
/// Samples per channel in one audio frame.
pub const AUDIO_OUTPUT_FRAMES: usize = 1024;

/// Planar float samples of one mixer bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioBus {
    /// One buffer of `AUDIO_OUTPUT_FRAMES` samples per channel
    pub data: Vec<Vec<f32>>,
}

impl AudioBus {
    pub fn silent(channels: usize) -> Self {
        Self {
            data: vec![vec![0.0; AUDIO_OUTPUT_FRAMES]; channels],
        }
    }
}

/// One audio frame across every mixer bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioMix {
    pub output: Vec<AudioBus>,
}

impl AudioMix {
    /// A zeroed mix with `channels` channels on every bus.
    pub fn silent(channels: usize) -> Self {
        let channels = channels.min(MAX_AUDIO_CHANNELS);
        Self {
            output: (0..MAX_AUDIO_MIXES)
                .map(|_| AudioBus::silent(channels))
                .collect(),
        }
    }

    /// Number of channels carried per bus.
    pub fn channels(&self) -> usize {
        self.output.first().map(|bus| bus.data.len()).unwrap_or(0)
    }

    /// Fill every sample of every bus with `value`.
    pub fn fill(&mut self, value: f32) {
        for bus in &mut self.output {
            for channel in &mut bus.data {
                channel.iter_mut().for_each(|s| *s = value);
            }
        }
    }
}

/// Whether bus `mix` is enabled in the host's `mixers` bitmask.
pub fn mixer_enabled(mixers: u32, mix: usize) -> bool {
    mix < 32 && mixers & (1 << mix) != 0
}
