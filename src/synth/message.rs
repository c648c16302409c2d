#[cfg(feature = "rtrb")]
use rtrb::Consumer;

use crate::patch::bank::PatchId;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ChipMessage {
    NoteOn { patch: PatchId, pitch: u8 },
    NoteOff { patch: PatchId, pitch: u8 },
    AllOff { patch: PatchId },
    PatchUpdate { patch: PatchId },
    /// Change one generalized field, then push the patch to its channels.
    SetParam { patch: PatchId, index: usize, value: u8 },
    DrumHit { patch: PatchId },
    Reset,
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<ChipMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<ChipMessage> {
    fn pop(&mut self) -> Option<ChipMessage> {
        Consumer::pop(self).ok()
    }
}

impl MessageReceiver for std::collections::VecDeque<ChipMessage> {
    fn pop(&mut self) -> Option<ChipMessage> {
        self.pop_front()
    }
}

/// A single-producer, single-consumer queue for feeding a `PolyChip` from another thread.
#[cfg(feature = "rtrb")]
pub fn message_queue(capacity: usize) -> (rtrb::Producer<ChipMessage>, Consumer<ChipMessage>) {
    rtrb::RingBuffer::new(capacity)
}
