use std::collections::{BTreeMap, BTreeSet};

use crate::{
    io::midi::{MidiEvent, CC_ALL_NOTES_OFF, PERCUSSION_CHANNEL},
    patch::bank::PatchId,
    synth::message::ChipMessage,
};

/// First and last GM percussion keys.
pub const FIRST_DRUM_KEY: u8 = 35;
pub const LAST_DRUM_KEY: u8 = 81;

/// Maps incoming MIDI onto patches.
///
/// Melodic channels play whichever program they last selected. Held keys
/// remember the patch they started with, so a program change between
/// note-on and note-off still releases the right voice. The GM percussion
/// channel plays one patch per key, each at its own drum pitch.
#[derive(Debug, Clone)]
pub struct MidiRouter {
    programs: Vec<PatchId>,
    drums: Vec<PatchId>, // index = key - FIRST_DRUM_KEY
    current: [u8; 16],
    held: BTreeMap<(u8, u8), PatchId>, // (midi channel, key)
}

impl MidiRouter {
    /// `programs[n]` answers program change `n`; `drums[k]` plays key `35 + k`.
    pub fn new(programs: Vec<PatchId>, drums: Vec<PatchId>) -> Self {
        Self {
            programs,
            drums,
            current: [0; 16],
            held: BTreeMap::new(),
        }
    }

    /// Route every channel to a single patch.
    pub fn single(patch: PatchId) -> Self {
        Self::new(vec![patch], Vec::new())
    }

    /// Patch currently selected on a melodic MIDI channel.
    pub fn program_patch(&self, channel: u8) -> Option<PatchId> {
        let program = self.current[(channel & 0x0F) as usize] as usize;
        self.programs
            .get(program)
            .or_else(|| self.programs.first())
            .copied()
    }

    pub fn drum_patch(&self, key: u8) -> Option<PatchId> {
        if !(FIRST_DRUM_KEY..=LAST_DRUM_KEY).contains(&key) {
            return None;
        }
        self.drums.get((key - FIRST_DRUM_KEY) as usize).copied()
    }

    /// Patch sounding `key` on a melodic MIDI channel, if it is held.
    pub fn held_patch(&self, channel: u8, key: u8) -> Option<PatchId> {
        self.held.get(&(channel & 0x0F, key)).copied()
    }

    /// Convert one event. Program changes update routing and produce no messages.
    pub fn route(&mut self, event: MidiEvent) -> Vec<ChipMessage> {
        midi_to_message(event, self)
    }
}

/// Translate a MIDI event into dispatcher messages, updating `router`'s
/// program selection and held keys.
pub fn midi_to_message(midi: MidiEvent, router: &mut MidiRouter) -> Vec<ChipMessage> {
    match midi {
        MidiEvent::ProgramChange { channel, program } => {
            router.current[(channel & 0x0F) as usize] = program;
            Vec::new()
        }
        MidiEvent::NoteOn { channel, key, .. } if channel == PERCUSSION_CHANNEL => router
            .drum_patch(key)
            .map(|patch| ChipMessage::DrumHit { patch })
            .into_iter()
            .collect(),
        // Drum voices are not tracked per key. They stay sounding until the
        // allocator steals them.
        MidiEvent::NoteOff { channel, .. } if channel == PERCUSSION_CHANNEL => Vec::new(),
        MidiEvent::NoteOn { channel, key, .. } => {
            let Some(patch) = router.program_patch(channel) else {
                return Vec::new();
            };
            let mut messages = Vec::with_capacity(2);
            // Retrigger under a new program: release the old voice first
            if let Some(previous) = router.held.insert((channel & 0x0F, key), patch) {
                if previous != patch {
                    messages.push(ChipMessage::NoteOff {
                        patch: previous,
                        pitch: key,
                    });
                }
            }
            messages.push(ChipMessage::NoteOn { patch, pitch: key });
            messages
        }
        MidiEvent::NoteOff { channel, key, .. } => router
            .held
            .remove(&(channel & 0x0F, key))
            .map(|patch| ChipMessage::NoteOff { patch, pitch: key })
            .into_iter()
            .collect(),
        MidiEvent::ControlChange {
            channel,
            controller: CC_ALL_NOTES_OFF,
            ..
        } => {
            let channel = channel & 0x0F;
            let mut patches = BTreeSet::new();
            router.held.retain(|&(ch, _), patch| {
                if ch == channel {
                    patches.insert(*patch);
                    false
                } else {
                    true
                }
            });
            patches
                .into_iter()
                .map(|patch| ChipMessage::AllOff { patch })
                .collect()
        }
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::{bank::PatchBank, Patch};

    fn ids(bank: &mut PatchBank, n: usize) -> Vec<PatchId> {
        (0..n).map(|_| bank.insert(Patch::default())).collect()
    }

    #[test]
    fn program_change_applies_to_new_notes_only() {
        let mut bank = PatchBank::new();
        let programs = ids(&mut bank, 3);
        let mut router = MidiRouter::new(programs.clone(), Vec::new());

        assert_eq!(
            router.route(MidiEvent::NoteOn { channel: 2, key: 60, velocity: 90 }),
            vec![ChipMessage::NoteOn { patch: programs[0], pitch: 60 }]
        );

        assert!(router.route(MidiEvent::ProgramChange { channel: 2, program: 2 }).is_empty());
        // The held key is released with the patch that started it
        assert_eq!(
            router.route(MidiEvent::NoteOff { channel: 2, key: 60, velocity: 0 }),
            vec![ChipMessage::NoteOff { patch: programs[0], pitch: 60 }]
        );
        assert_eq!(
            router.route(MidiEvent::NoteOn { channel: 2, key: 62, velocity: 90 }),
            vec![ChipMessage::NoteOn { patch: programs[2], pitch: 62 }]
        );
        // Other channels keep their own program
        assert_eq!(router.program_patch(0), Some(programs[0]));
    }

    #[test]
    fn note_off_for_an_unheld_key_is_dropped() {
        let mut bank = PatchBank::new();
        let programs = ids(&mut bank, 1);
        let mut router = MidiRouter::single(programs[0]);

        assert!(router.route(MidiEvent::NoteOff { channel: 0, key: 60, velocity: 0 }).is_empty());
    }

    #[test]
    fn retrigger_under_a_new_program_releases_the_old_voice() {
        let mut bank = PatchBank::new();
        let programs = ids(&mut bank, 2);
        let mut router = MidiRouter::new(programs.clone(), Vec::new());

        router.route(MidiEvent::NoteOn { channel: 0, key: 64, velocity: 90 });
        router.route(MidiEvent::ProgramChange { channel: 0, program: 1 });

        assert_eq!(
            router.route(MidiEvent::NoteOn { channel: 0, key: 64, velocity: 90 }),
            vec![
                ChipMessage::NoteOff { patch: programs[0], pitch: 64 },
                ChipMessage::NoteOn { patch: programs[1], pitch: 64 },
            ]
        );
        assert_eq!(router.held_patch(0, 64), Some(programs[1]));
    }

    #[test]
    fn missing_program_falls_back_to_the_first() {
        let mut bank = PatchBank::new();
        let programs = ids(&mut bank, 2);
        let mut router = MidiRouter::new(programs.clone(), Vec::new());
        router.route(MidiEvent::ProgramChange { channel: 0, program: 99 });

        assert_eq!(router.program_patch(0), Some(programs[0]));
    }

    #[test]
    fn percussion_channel_maps_keys_to_drum_patches() {
        let mut bank = PatchBank::new();
        let drums = ids(&mut bank, 47);
        let mut router = MidiRouter::new(Vec::new(), drums.clone());

        assert_eq!(
            router.route(MidiEvent::NoteOn { channel: 9, key: 38, velocity: 100 }),
            vec![ChipMessage::DrumHit { patch: drums[3] }]
        );
        assert!(router.route(MidiEvent::NoteOn { channel: 9, key: 20, velocity: 100 }).is_empty());
        assert!(router.route(MidiEvent::NoteOff { channel: 9, key: 38, velocity: 0 }).is_empty());
    }

    #[test]
    fn all_notes_off_releases_every_held_patch_on_the_channel() {
        let mut bank = PatchBank::new();
        let programs = ids(&mut bank, 3);
        let mut router = MidiRouter::new(programs.clone(), Vec::new());

        router.route(MidiEvent::NoteOn { channel: 4, key: 60, velocity: 90 });
        router.route(MidiEvent::ProgramChange { channel: 4, program: 1 });
        router.route(MidiEvent::NoteOn { channel: 4, key: 64, velocity: 90 });
        router.route(MidiEvent::NoteOn { channel: 4, key: 67, velocity: 90 });
        router.route(MidiEvent::NoteOn { channel: 5, key: 72, velocity: 90 });

        assert_eq!(
            midi_to_message(
                MidiEvent::ControlChange { channel: 4, controller: CC_ALL_NOTES_OFF, value: 0 },
                &mut router
            ),
            vec![
                ChipMessage::AllOff { patch: programs[0] },
                ChipMessage::AllOff { patch: programs[1] },
            ]
        );
        assert_eq!(router.held_patch(4, 64), None);
        // Channel 5 is untouched
        assert_eq!(router.held_patch(5, 72), Some(programs[0]));
        assert!(midi_to_message(MidiEvent::PitchBend { channel: 0, value: 100 }, &mut router)
            .is_empty());
    }
}
