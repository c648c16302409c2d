#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{chip::NUM_CHANNELS, error::ChipError};

/// What `note_on` does with a pitch above `MAX_PITCH`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PitchPolicy {
    /// Allocate and key off the channel, then stop without producing a tone.
    /// This is how existing hardware rigs behave, so it is the default.
    #[default]
    Silent,
    /// Refuse the note with `ChipError::InvalidPitch` before touching any channel.
    Strict,
}

/// Startup configuration for a `NoteDispatcher`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChipConfig {
    /// How many of the chip's channels the allocator may use (1..=9).
    pub channels: usize,
    pub pitch_policy: PitchPolicy,
    /// Enable non-sine waveforms on reset.
    pub wave_select: bool,
}

impl ChipConfig {
    pub fn channels(mut self, channels: usize) -> Self {
        self.channels = channels;
        self
    }

    pub fn pitch_policy(mut self, policy: PitchPolicy) -> Self {
        self.pitch_policy = policy;
        self
    }

    pub fn wave_select(mut self, enabled: bool) -> Self {
        self.wave_select = enabled;
        self
    }

    pub fn validate(&self) -> Result<(), ChipError> {
        if self.channels == 0 || self.channels > NUM_CHANNELS {
            return Err(ChipError::InvalidConfig(format!(
                "channels must be 1..={NUM_CHANNELS}, got {}",
                self.channels
            )));
        }
        Ok(())
    }
}

impl Default for ChipConfig {
    fn default() -> Self {
        Self {
            channels: NUM_CHANNELS,
            pitch_policy: PitchPolicy::Silent,
            wave_select: true,
        }
    }
}
