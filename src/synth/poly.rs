use tracing::warn;

use crate::{
    chip::RegisterWriter,
    config::ChipConfig,
    error::ChipError,
    patch::{
        bank::{PatchBank, PatchId},
        Patch,
    },
    synth::{
        clock::Clock,
        dispatcher::NoteDispatcher,
        message::{ChipMessage, MessageReceiver},
    },
};

/// A dispatcher bundled with the patches it plays.
///
/// This is the single owner the control loop talks to: other threads push
/// `ChipMessage`s into a queue and the loop calls `process_messages`.
pub struct PolyChip<W: RegisterWriter, C: Clock> {
    patches: PatchBank,
    dispatcher: NoteDispatcher<W, C>,
}

impl<W: RegisterWriter, C: Clock> PolyChip<W, C> {
    pub fn new(writer: W, clock: C, config: ChipConfig) -> Result<Self, ChipError> {
        Ok(Self {
            patches: PatchBank::new(),
            dispatcher: NoteDispatcher::new(writer, clock, config)?,
        })
    }

    /// Build around an existing bank, e.g. one imported from an OP2 file.
    pub fn with_bank(mut self, patches: PatchBank) -> Self {
        self.patches = patches;
        self
    }

    pub fn add_patch(&mut self, patch: Patch) -> PatchId {
        self.patches.insert(patch)
    }

    /// Drain every pending message. Returns how many were handled.
    ///
    /// Failures are logged and skipped so one bad message never stalls the loop.
    pub fn process_messages<R: MessageReceiver + ?Sized>(&mut self, rx: &mut R) -> usize {
        let mut handled = 0;
        while let Some(msg) = rx.pop() {
            if let Err(err) = self.handle(msg) {
                warn!(?msg, %err, "message dropped");
            }
            handled += 1;
        }
        handled
    }

    pub fn handle(&mut self, msg: ChipMessage) -> Result<(), ChipError> {
        match msg {
            ChipMessage::NoteOn { patch, pitch } => {
                self.dispatcher.note_on(&self.patches, patch, pitch)?;
            }
            ChipMessage::NoteOff { patch, pitch } => {
                self.dispatcher.note_off(patch, pitch);
            }
            ChipMessage::AllOff { patch } => {
                self.dispatcher.all_off(patch);
            }
            ChipMessage::PatchUpdate { patch } => {
                self.dispatcher.patch_update(&self.patches, patch);
            }
            ChipMessage::SetParam {
                patch,
                index,
                value,
            } => {
                let target = self
                    .patches
                    .get_mut(patch)
                    .ok_or(ChipError::UnknownPatch(patch))?;
                if !target.set(index, value) {
                    warn!(%patch, index, "parameter index out of range");
                    return Ok(());
                }
                self.dispatcher.patch_update(&self.patches, patch);
            }
            ChipMessage::DrumHit { patch } => {
                self.dispatcher.drum_hit(&self.patches, patch)?;
            }
            ChipMessage::Reset => self.dispatcher.reset(),
        }
        Ok(())
    }

    pub fn patches(&self) -> &PatchBank {
        &self.patches
    }

    /// Direct bank access. Follow edits with a `PatchUpdate` to hear them.
    pub fn patches_mut(&mut self) -> &mut PatchBank {
        &mut self.patches
    }

    pub fn dispatcher(&self) -> &NoteDispatcher<W, C> {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut NoteDispatcher<W, C> {
        &mut self.dispatcher
    }
}
