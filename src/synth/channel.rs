use crate::patch::bank::PatchId;

/// What one physical channel is doing.
///
/// There is no releasing state: after key-off the chip runs the release
/// envelope on its own, and the channel counts as idle immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChannelState {
    patch: Option<PatchId>, // kept after note-off until the channel is reassigned
    pitch: u8,
    sounding: bool,
    changed_at: u64, // clock time of the last on/off transition
}

impl ChannelState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Note-on: take the patch and pitch and start sounding.
    pub fn start(&mut self, patch: PatchId, pitch: u8, now: u64) {
        self.patch = Some(patch);
        self.pitch = pitch;
        self.sounding = true;
        self.changed_at = now;
    }

    /// Note-off: stop sounding but remember the patch.
    pub fn release(&mut self, now: u64) {
        self.sounding = false;
        self.changed_at = now;
    }

    pub fn patch(&self) -> Option<PatchId> {
        self.patch
    }

    pub fn pitch(&self) -> u8 {
        self.pitch
    }

    pub fn is_sounding(&self) -> bool {
        self.sounding
    }

    pub fn is_idle(&self) -> bool {
        !self.sounding
    }

    pub fn changed_at(&self) -> u64 {
        self.changed_at
    }

    pub fn holds(&self, patch: PatchId) -> bool {
        self.patch == Some(patch)
    }

    pub fn plays(&self, patch: PatchId, pitch: u8) -> bool {
        self.holds(patch) && self.pitch == pitch
    }
}
