#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    PitchBend { channel: u8, value: i16 },
    ProgramChange { channel: u8, program: u8 },
}

/// Channel mode message: all notes off.
pub const CC_ALL_NOTES_OFF: u8 = 123;

/// GM percussion lives on MIDI channel 10 (index 9).
pub const PERCUSSION_CHANNEL: u8 = 9;

impl MidiEvent {
    /// Decode one channel voice message. Running status is not supported;
    /// `bytes` must start with a status byte.
    ///
    /// A note-on with velocity 0 is reported as a note-off.
    pub fn parse(bytes: &[u8]) -> Option<MidiEvent> {
        let (&status, data) = bytes.split_first()?;
        if status & 0x80 == 0 {
            return None;
        }
        let channel = status & 0x0F;
        let data1 = || data.first().map(|b| b & 0x7F);
        let data2 = || data.get(1).map(|b| b & 0x7F);

        match status & 0xF0 {
            0x80 => Some(MidiEvent::NoteOff {
                channel,
                key: data1()?,
                velocity: data2()?,
            }),
            0x90 => {
                let (key, velocity) = (data1()?, data2()?);
                if velocity == 0 {
                    Some(MidiEvent::NoteOff {
                        channel,
                        key,
                        velocity,
                    })
                } else {
                    Some(MidiEvent::NoteOn {
                        channel,
                        key,
                        velocity,
                    })
                }
            }
            0xB0 => Some(MidiEvent::ControlChange {
                channel,
                controller: data1()?,
                value: data2()?,
            }),
            0xC0 => Some(MidiEvent::ProgramChange {
                channel,
                program: data1()?,
            }),
            0xE0 => {
                let raw = (data2()? as i16) << 7 | data1()? as i16;
                Some(MidiEvent::PitchBend {
                    channel,
                    value: raw - 0x2000,
                })
            }
            _ => None,
        }
    }

    pub fn channel(&self) -> u8 {
        match *self {
            MidiEvent::NoteOn { channel, .. }
            | MidiEvent::NoteOff { channel, .. }
            | MidiEvent::ControlChange { channel, .. }
            | MidiEvent::PitchBend { channel, .. }
            | MidiEvent::ProgramChange { channel, .. } => channel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_note_messages() {
        assert_eq!(
            MidiEvent::parse(&[0x91, 60, 100]),
            Some(MidiEvent::NoteOn { channel: 1, key: 60, velocity: 100 })
        );
        assert_eq!(
            MidiEvent::parse(&[0x80, 60, 64]),
            Some(MidiEvent::NoteOff { channel: 0, key: 60, velocity: 64 })
        );
    }

    #[test]
    fn zero_velocity_note_on_is_note_off() {
        assert_eq!(
            MidiEvent::parse(&[0x99, 38, 0]),
            Some(MidiEvent::NoteOff { channel: 9, key: 38, velocity: 0 })
        );
    }

    #[test]
    fn parses_program_change_and_control_change() {
        assert_eq!(
            MidiEvent::parse(&[0xC3, 19]),
            Some(MidiEvent::ProgramChange { channel: 3, program: 19 })
        );
        assert_eq!(
            MidiEvent::parse(&[0xB0, CC_ALL_NOTES_OFF, 0]),
            Some(MidiEvent::ControlChange { channel: 0, controller: 123, value: 0 })
        );
    }

    #[test]
    fn pitch_bend_is_centered_on_zero() {
        assert_eq!(
            MidiEvent::parse(&[0xE0, 0x00, 0x40]),
            Some(MidiEvent::PitchBend { channel: 0, value: 0 })
        );
        assert_eq!(
            MidiEvent::parse(&[0xE0, 0x7F, 0x7F]),
            Some(MidiEvent::PitchBend { channel: 0, value: 8191 })
        );
    }

    #[test]
    fn rejects_truncated_and_running_status_messages() {
        assert_eq!(MidiEvent::parse(&[]), None);
        assert_eq!(MidiEvent::parse(&[0x90, 60]), None);
        assert_eq!(MidiEvent::parse(&[60, 100]), None);
        assert_eq!(MidiEvent::parse(&[0xF8]), None);
    }
}
