use tracing::{debug, info, warn};

use crate::{
    chip::{
        frequency::{tuning, MAX_PITCH},
        registers::ChipRegisters,
        RegisterWriter,
    },
    config::{ChipConfig, PitchPolicy},
    error::ChipError,
    patch::{
        bank::{PatchId, PatchSource},
        encoder::encode_channel,
        Patch,
    },
};

use super::{
    allocator::{OldestFirst, VoiceAllocator},
    channel::ChannelState,
    clock::Clock,
};

/// Routes note requests for patches onto physical channels.
///
/// Owns the channel table and the register cache. Patches stay with the
/// caller: every call that needs parameter values borrows a `PatchSource`.
///
/// Not reentrant and not synchronized. Drive it from one control loop, or
/// hand it to a `PolyChip` and talk to that through its message queue.
pub struct NoteDispatcher<W: RegisterWriter, C: Clock> {
    channels: Vec<ChannelState>,
    registers: ChipRegisters<W>,
    clock: C,
    allocator: Box<dyn VoiceAllocator + Send>,
    config: ChipConfig,
}

impl<W: RegisterWriter, C: Clock> NoteDispatcher<W, C> {
    pub fn new(writer: W, clock: C, config: ChipConfig) -> Result<Self, ChipError> {
        config.validate()?;

        Ok(Self {
            channels: vec![ChannelState::new(); config.channels],
            registers: ChipRegisters::new(writer),
            clock,
            allocator: Box::new(OldestFirst),
            config,
        })
    }

    /// Swap in a different allocation policy.
    pub fn with_allocator(mut self, allocator: Box<dyn VoiceAllocator + Send>) -> Self {
        self.allocator = allocator;
        self
    }

    /// Key off every channel, then return them to idle and clear the register cache.
    ///
    /// The key-offs go out first: once the table is cleared nothing can
    /// release a note still held by the chip.
    pub fn reset(&mut self) {
        for channel in 0..self.channels.len() {
            self.registers.key_on(channel, false);
        }
        self.channels.fill(ChannelState::new());
        self.registers.reset(self.config.wave_select);
        info!(channels = self.channels.len(), "chip state reset");
    }

    /// Play `pitch` with `patch` on whichever channel the allocator picks.
    ///
    /// Returns the channel used. Under `PitchPolicy::Silent` a pitch above
    /// `MAX_PITCH` still takes a channel and silences it, but produces no tone.
    pub fn note_on<P>(&mut self, patches: &P, patch: PatchId, pitch: u8) -> Result<usize, ChipError>
    where
        P: PatchSource + ?Sized,
    {
        if self.config.pitch_policy == PitchPolicy::Strict && pitch > MAX_PITCH {
            return Err(ChipError::InvalidPitch { pitch });
        }
        if patches.patch(patch).is_none() {
            return Err(ChipError::UnknownPatch(patch));
        }

        let channel = self.allocator.select(&self.channels);
        let stolen = self.channels[channel].is_sounding();
        let now = self.clock.now();
        self.channels[channel].start(patch, pitch, now);

        debug!(channel, pitch, %patch, stolen, "note on");
        self.play_pitch(patches, channel, pitch);
        Ok(channel)
    }

    /// Release every channel playing `pitch` with `patch`. Returns how many were released.
    pub fn note_off(&mut self, patch: PatchId, pitch: u8) -> usize {
        let now = self.clock.now();
        let mut released = 0;
        for channel in 0..self.channels.len() {
            if self.channels[channel].plays(patch, pitch) {
                self.release_channel(channel, now);
                released += 1;
            }
        }
        debug!(pitch, %patch, released, "note off");
        released
    }

    /// Release every channel holding `patch`, whatever its pitch.
    pub fn all_off(&mut self, patch: PatchId) -> usize {
        let now = self.clock.now();
        let mut released = 0;
        for channel in 0..self.channels.len() {
            if self.channels[channel].holds(patch) {
                self.release_channel(channel, now);
                released += 1;
            }
        }
        debug!(%patch, released, "all off");
        released
    }

    /// Re-send `patch` to every channel that holds it, sounding or not.
    ///
    /// Pitch and key state are left alone, so edits are heard live on held notes.
    pub fn patch_update<P>(&mut self, patches: &P, patch: PatchId) -> usize
    where
        P: PatchSource + ?Sized,
    {
        let Some(values) = patches.patch(patch) else {
            warn!(%patch, "patch update for a patch that no longer exists");
            return 0;
        };

        let mut updated = 0;
        for channel in 0..self.channels.len() {
            if self.channels[channel].holds(patch) {
                self.send_patch(channel, values);
                updated += 1;
            }
        }
        debug!(%patch, updated, "patch update");
        updated
    }

    /// Trigger a percussion patch at its own drum note number.
    pub fn drum_hit<P>(&mut self, patches: &P, patch: PatchId) -> Result<usize, ChipError>
    where
        P: PatchSource + ?Sized,
    {
        let pitch = patches
            .patch(patch)
            .map(|p| p.note_number)
            .ok_or(ChipError::UnknownPatch(patch))?;
        self.note_on(patches, patch, pitch)
    }

    /// Sound `pitch` on `channel` using the channel's current patch.
    ///
    /// Always keys the channel off first. Pitches above `MAX_PITCH` stop
    /// there, leaving the channel silent. `channel` must be below `config.channels`.
    pub(crate) fn play_pitch<P>(&mut self, patches: &P, channel: usize, pitch: u8)
    where
        P: PatchSource + ?Sized,
    {
        self.registers.key_on(channel, false);

        let Some(tuning) = tuning(pitch) else {
            debug!(channel, pitch, "pitch out of range, channel left silent");
            return;
        };

        match self.channels[channel].patch() {
            Some(id) => match patches.patch(id) {
                Some(values) => self.send_patch(channel, values),
                None => warn!(channel, patch = %id, "patch missing, keeping previous timbre"),
            },
            None => warn!(channel, "no patch assigned, keeping previous timbre"),
        }

        self.registers.tune(channel, tuning);
        self.registers.key_on(channel, true);
    }

    /// Encode `patch` for `channel` and write it out.
    pub(crate) fn send_patch(&mut self, channel: usize, patch: &Patch) {
        for (address, value) in encode_channel(channel, patch).writes() {
            self.registers.write(address, value);
        }
    }

    fn release_channel(&mut self, channel: usize, now: u64) {
        self.channels[channel].release(now);
        self.registers.key_on(channel, false);
    }

    pub fn channels(&self) -> &[ChannelState] {
        &self.channels
    }

    pub fn config(&self) -> &ChipConfig {
        &self.config
    }

    /// Register cache, for global settings like tremolo and vibrato depth.
    pub fn registers(&self) -> &ChipRegisters<W> {
        &self.registers
    }

    pub fn registers_mut(&mut self) -> &mut ChipRegisters<W> {
        &mut self.registers
    }

    pub fn writer(&self) -> &W {
        self.registers.writer()
    }

    pub fn writer_mut(&mut self) -> &mut W {
        self.registers.writer_mut()
    }
}
