use super::channel::ChannelState;

/*
Voice Allocation
================

A new note always gets a channel - voices are stolen, never queued.

  1. If any channel is idle, reuse the one that has been idle the longest.
     Its release tail has had the most time to fade.
  2. Otherwise steal the channel that has been sounding the longest.

Both searches scan channels in index order and only replace the candidate on
a strictly older timestamp, so ties go to the lowest index. Right after
reset every channel is idle at time zero, which makes the first N notes fill
channels 0, 1, 2, ... in order.
*/

/// Picks the channel that receives the next note.
///
/// Implementations only read the table; the dispatcher performs the writes.
pub trait VoiceAllocator {
    /// `channels` is never empty.
    fn select(&self, channels: &[ChannelState]) -> usize;
}

/// Oldest idle channel first, otherwise the longest-sounding one.
#[derive(Debug, Clone, Copy, Default)]
pub struct OldestFirst;

impl VoiceAllocator for OldestFirst {
    fn select(&self, channels: &[ChannelState]) -> usize {
        select_channel(channels)
    }
}

pub fn select_channel(channels: &[ChannelState]) -> usize {
    let mut oldest_idle: Option<(usize, u64)> = None;
    let mut oldest_sounding: Option<(usize, u64)> = None;

    for (idx, ch) in channels.iter().enumerate() {
        let slot = if ch.is_sounding() {
            &mut oldest_sounding
        } else {
            &mut oldest_idle
        };
        if slot.map_or(true, |(_, t)| ch.changed_at() < t) {
            *slot = Some((idx, ch.changed_at()));
        }
    }

    oldest_idle
        .or(oldest_sounding)
        .map(|(idx, _)| idx)
        .unwrap_or(0)
}
