/*
Pitch -> Block / F-Number
=========================

The YM3812 tunes a channel with two numbers:

  block   3-bit octave exponent (0-7). Each step doubles the frequency.
  fnum    10-bit frequency number within the block.

The table below holds 31 F-numbers. Entries 0-18 cover the lowest notes,
which all live in block 0. From note 19 up, only entries 19-30 (one octave)
are reused: the block field climbs one step every 12 notes and shifts the
same twelve F-numbers up an octave.

  pitch    block  table index
  0..=18     0     pitch
  19..=30    0     pitch
  31..=42    1     19 + (pitch - 19) % 12
  ...
  103..=114  7     19 + (pitch - 19) % 12

Pitch 114 is the top of block 7. Anything higher has no encoding.
*/

/// F-numbers for the bottom 31 notes.
pub const FREQUENCY_TABLE: [u16; 31] = [
    0x0AD, 0x0B7, 0x0C2, 0x0CD, 0x0D9, 0x0E6, 0x0F4, 0x102, 0x112, 0x122, 0x133, 0x145,
    0x159, 0x16D, 0x183, 0x19A, 0x1B2, 0x1CC, 0x1E8, 0x205, 0x224, 0x244, 0x267, 0x28B,
    0x2B2, 0x2DB, 0x306, 0x334, 0x365, 0x399, 0x3CF,
];

/// Highest pitch with a block/F-number encoding.
pub const MAX_PITCH: u8 = 114;

/// Below this pitch everything is block 0 with a direct table lookup.
pub const LOW_PITCH_THRESHOLD: u8 = 19;

const NOTES_PER_BLOCK: u8 = 12;

/// A channel's tuning code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tuning {
    pub block: u8, // 0-7
    pub fnum: u16, // 0-1023
}

impl Tuning {
    /// Low 8 bits of the F-number (register 0xA0+ch).
    pub fn fnum_low(&self) -> u8 {
        (self.fnum & 0xFF) as u8
    }

    /// High 2 bits of the F-number (register 0xB0+ch, bits 0-1).
    pub fn fnum_high(&self) -> u8 {
        ((self.fnum >> 8) & 0x03) as u8
    }
}

/// Map a pitch to its block and F-number, or `None` above `MAX_PITCH`.
pub fn tuning(pitch: u8) -> Option<Tuning> {
    if pitch > MAX_PITCH {
        return None;
    }

    if pitch < LOW_PITCH_THRESHOLD {
        return Some(Tuning {
            block: 0,
            fnum: FREQUENCY_TABLE[pitch as usize],
        });
    }

    let steps = pitch - LOW_PITCH_THRESHOLD;
    let index = (LOW_PITCH_THRESHOLD + steps % NOTES_PER_BLOCK) as usize;
    Some(Tuning {
        block: steps / NOTES_PER_BLOCK,
        fnum: FREQUENCY_TABLE[index],
    })
}
