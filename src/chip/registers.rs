use super::{
    frequency::Tuning, RegisterWriter, NUM_CHANNELS, REG_CSM_KEY_SPLIT, REG_DEPTH_RHYTHM,
    REG_FNUM_LOW, REG_KEY_BLOCK_FNUM, REG_WAVE_SELECT_ENABLE,
};

/*
Register Cache
==============

Several YM3812 registers pack unrelated fields into one byte:

  0xB0+ch   [ - | - | KEY | BLOCK (3) | FNUM hi (2) ]
  0x08      [ CSM | KEY SPLIT | - - - - - - ]
  0xBD      [ AM DEPTH | VIB DEPTH | rhythm bits... ]

The chip is write-only, so to flip key-on without losing the block and
F-number we keep a shadow copy of every shared register. Each setter
rewrites only its own field in the shadow and then sends the whole byte.

Operator registers (0x20, 0x40, 0x60, 0x80, 0xE0) and 0xC0 are always written
whole by the patch encoder, so they pass straight through without a shadow.
*/

/// Replace the bits selected by `mask << offset` in `reg` with `value`.
///
/// `mask` is right-aligned: `set_bits(&mut r, 0b111, 2, block)` writes bits 2-4.
/// Bits of `value` outside `mask` are dropped.
pub fn set_bits(reg: &mut u8, mask: u8, offset: u8, value: u8) -> u8 {
    *reg = (*reg & !(mask << offset)) | ((value & mask) << offset);
    *reg
}

/// Read the bits selected by `mask << offset` from `reg`, right-aligned.
pub fn get_bits(reg: u8, mask: u8, offset: u8) -> u8 {
    (reg >> offset) & mask
}

pub struct ChipRegisters<W: RegisterWriter> {
    writer: W,

    // Global shadows
    reg_01: u8, // wave select enable
    reg_08: u8, // CSM speech synthesis / key split
    reg_bd: u8, // tremolo depth, vibrato depth, rhythm

    // Per-channel shadows
    reg_a0: [u8; NUM_CHANNELS], // F-number low byte
    reg_b0: [u8; NUM_CHANNELS], // key on, block, F-number high bits
}

impl<W: RegisterWriter> ChipRegisters<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            reg_01: 0,
            reg_08: 0,
            reg_bd: 0,
            reg_a0: [0; NUM_CHANNELS],
            reg_b0: [0; NUM_CHANNELS],
        }
    }

    /// Clear every shadow register and set the wave-select flag.
    ///
    /// This does not touch the hardware reset line. That belongs to the transport.
    pub fn reset(&mut self, wave_select: bool) {
        self.reg_01 = 0;
        self.reg_08 = 0;
        self.reg_bd = 0;
        self.reg_a0 = [0; NUM_CHANNELS];
        self.reg_b0 = [0; NUM_CHANNELS];
        self.wave_select(wave_select);
    }

    /// Unbuffered write. Used for registers that are always written whole.
    pub fn write(&mut self, address: u8, value: u8) {
        self.writer.write_register(address, value);
    }

    // --- Global settings ---

    /// Allow all four waveforms (true) or sine only (false).
    pub fn wave_select(&mut self, enabled: bool) {
        let value = set_bits(&mut self.reg_01, 0b1, 5, enabled as u8);
        self.write(REG_WAVE_SELECT_ENABLE, value);
    }

    pub fn speech_synthesis(&mut self, enabled: bool) {
        let value = set_bits(&mut self.reg_08, 0b1, 7, enabled as u8);
        self.write(REG_CSM_KEY_SPLIT, value);
    }

    pub fn key_split(&mut self, enabled: bool) {
        let value = set_bits(&mut self.reg_08, 0b1, 6, enabled as u8);
        self.write(REG_CSM_KEY_SPLIT, value);
    }

    /// Deep (true, 4.8 dB) or normal (false, 1 dB) tremolo.
    pub fn tremolo_depth(&mut self, deep: bool) {
        let value = set_bits(&mut self.reg_bd, 0b1, 7, deep as u8);
        self.write(REG_DEPTH_RHYTHM, value);
    }

    /// Deep (true, 14 cents) or normal (false, 7 cents) vibrato.
    pub fn vibrato_depth(&mut self, deep: bool) {
        let value = set_bits(&mut self.reg_bd, 0b1, 6, deep as u8);
        self.write(REG_DEPTH_RHYTHM, value);
    }

    // --- Channel frequency / key ---

    pub fn key_on(&mut self, channel: usize, on: bool) {
        let value = set_bits(&mut self.reg_b0[channel], 0b1, 5, on as u8);
        self.write(REG_KEY_BLOCK_FNUM + channel as u8, value);
    }

    pub fn block(&mut self, channel: usize, block: u8) {
        let value = set_bits(&mut self.reg_b0[channel], 0b111, 2, block);
        self.write(REG_KEY_BLOCK_FNUM + channel as u8, value);
    }

    /// Write a 10-bit F-number: low byte to 0xA0+ch, top two bits into 0xB0+ch.
    pub fn fnum(&mut self, channel: usize, fnum: u16) {
        let low = set_bits(&mut self.reg_a0[channel], 0xFF, 0, (fnum & 0xFF) as u8);
        self.write(REG_FNUM_LOW + channel as u8, low);
        let high = set_bits(&mut self.reg_b0[channel], 0b11, 0, (fnum >> 8) as u8);
        self.write(REG_KEY_BLOCK_FNUM + channel as u8, high);
    }

    /// Block then F-number, in the order the hardware expects before a key-on.
    pub fn tune(&mut self, channel: usize, tuning: Tuning) {
        self.block(channel, tuning.block);
        self.fnum(channel, tuning.fnum);
    }

    pub fn is_keyed_on(&self, channel: usize) -> bool {
        get_bits(self.reg_b0[channel], 0b1, 5) == 1
    }

    pub fn current_block(&self, channel: usize) -> u8 {
        get_bits(self.reg_b0[channel], 0b111, 2)
    }

    pub fn current_fnum(&self, channel: usize) -> u16 {
        let high = get_bits(self.reg_b0[channel], 0b11, 0) as u16;
        (high << 8) | self.reg_a0[channel] as u16
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}
