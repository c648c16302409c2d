// Purpose: Hardware-facing layer - register map, tuning tables, register cache
// Everything here is specific to the YM3812 (OPL2) register layout

pub mod frequency;
pub mod layout;
pub mod registers;

/// Number of voice channels on the YM3812.
pub const NUM_CHANNELS: usize = 9;

/// Number of operator slots on the YM3812.
pub const NUM_OPERATORS: usize = 18;

/// Operators consumed per channel in two-operator mode.
pub const OPERATORS_PER_CHANNEL: usize = 2;

// Register base addresses. Channel registers add the channel index,
// operator registers add the operator's memory offset (see `layout`).
pub const REG_WAVE_SELECT_ENABLE: u8 = 0x01;
pub const REG_CSM_KEY_SPLIT: u8 = 0x08;
pub const REG_OP_CHARACTER: u8 = 0x20;
pub const REG_OP_LEVEL: u8 = 0x40;
pub const REG_OP_ATTACK_DECAY: u8 = 0x60;
pub const REG_OP_SUSTAIN_RELEASE: u8 = 0x80;
pub const REG_FNUM_LOW: u8 = 0xA0;
pub const REG_KEY_BLOCK_FNUM: u8 = 0xB0;
pub const REG_DEPTH_RHYTHM: u8 = 0xBD;
pub const REG_FEEDBACK_CONNECTION: u8 = 0xC0;
pub const REG_OP_WAVEFORM: u8 = 0xE0;

/// The one thing this crate needs from the transport: push a byte to an address.
///
/// Bus timing, chip select and latching all live behind this call. Writes are
/// assumed to succeed and are never retried.
pub trait RegisterWriter {
    fn write_register(&mut self, address: u8, value: u8);
}

impl<F> RegisterWriter for F
where
    F: FnMut(u8, u8),
{
    fn write_register(&mut self, address: u8, value: u8) {
        self(address, value)
    }
}

/// A register writer that records every write in order.
///
/// Used by the tests, the benchmarks and the dump binary in place of real hardware.
#[derive(Debug, Default, Clone)]
pub struct RegisterLog {
    writes: Vec<(u8, u8)>,
}

impl RegisterLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> &[(u8, u8)] {
        &self.writes
    }

    /// Take the recorded writes, leaving the log empty.
    pub fn drain(&mut self) -> Vec<(u8, u8)> {
        std::mem::take(&mut self.writes)
    }

    pub fn clear(&mut self) {
        self.writes.clear();
    }

    /// Every value written to `address`, oldest first.
    pub fn values_at(&self, address: u8) -> impl Iterator<Item = u8> + '_ {
        self.writes
            .iter()
            .filter(move |(a, _)| *a == address)
            .map(|(_, v)| *v)
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }
}

impl RegisterWriter for RegisterLog {
    fn write_register(&mut self, address: u8, value: u8) {
        self.writes.push((address, value));
    }
}
