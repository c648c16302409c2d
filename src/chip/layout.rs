use super::{NUM_CHANNELS, NUM_OPERATORS, OPERATORS_PER_CHANNEL};

/*
Channel / Operator Register Map
===============================

The YM3812 does not number its operator registers contiguously. Each operator
register bank (0x20, 0x40, 0x60, 0x80, 0xE0) has 22 slots, but only 18 of
them are wired to operators - slots 6, 7, 14 and 15 are holes.

  operator index   0  1  2  3  4  5  6  7  8  9 10 11 12 13 14 15 16 17
  memory offset    0  1  2  3  4  5  8  9 10 11 12 13 16 17 18 19 20 21

Channels pair operators three apart: channel 0 uses operators 0 and 3,
channel 1 uses 1 and 4, channel 3 uses 6 and 9, and so on.

  channel          0  1  2  3  4  5  6  7  8
  first operator   0  1  2  6  7  8 12 13 14
  second operator  3  4  5  9 10 11 15 16 17

So the register address for operator `op` of channel `ch` is

    base + OPERATOR_OFFSETS[CHANNEL_OPERATORS[ch] + op * OPERATOR_STRIDE]
*/

/// Operator index -> memory offset within an operator register bank.
pub const OPERATOR_OFFSETS: [u8; NUM_OPERATORS] =
    [0, 1, 2, 3, 4, 5, 8, 9, 10, 11, 12, 13, 16, 17, 18, 19, 20, 21];

/// Channel index -> index of the channel's first operator.
pub const CHANNEL_OPERATORS: [usize; NUM_CHANNELS] = [0, 1, 2, 6, 7, 8, 12, 13, 14];

/// Distance between a channel's first and second operator.
pub const OPERATOR_STRIDE: usize = 3;

/// Memory offset of operator `op` (0 or 1) of `channel`.
///
/// Panics if `channel >= NUM_CHANNELS` or `op >= OPERATORS_PER_CHANNEL`.
pub const fn operator_offset(channel: usize, op: usize) -> u8 {
    assert!(op < OPERATORS_PER_CHANNEL);
    OPERATOR_OFFSETS[CHANNEL_OPERATORS[channel] + op * OPERATOR_STRIDE]
}

/// Memory offsets of both operators of `channel`.
pub const fn channel_offsets(channel: usize) -> [u8; OPERATORS_PER_CHANNEL] {
    [operator_offset(channel, 0), operator_offset(channel, 1)]
}
