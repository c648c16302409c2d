use thiserror::Error;

use crate::{chip::frequency::MAX_PITCH, patch::bank::PatchId};

/// Errors surfaced by the note dispatcher and its configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChipError {
    /// Only raised under `PitchPolicy::Strict`.
    #[error("pitch {pitch} is out of range (max {max})", max = MAX_PITCH)]
    InvalidPitch { pitch: u8 },

    #[error("no patch registered for {0}")]
    UnknownPatch(PatchId),

    #[error("invalid chip configuration: {0}")]
    InvalidConfig(String),
}
