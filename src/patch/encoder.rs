use crate::chip::{
    layout::operator_offset, OPERATORS_PER_CHANNEL, REG_FEEDBACK_CONNECTION,
    REG_OP_ATTACK_DECAY, REG_OP_CHARACTER, REG_OP_LEVEL, REG_OP_SUSTAIN_RELEASE,
    REG_OP_WAVEFORM,
};

use super::{OperatorParams, Patch};

/*
Patch -> YM3812 Registers
=========================

Every generalized field is 7 bits wide. Register fields are narrower, so each
value is quantized by dropping low-order bits:

    register_field = (value & 0x7F) >> (7 - field_width)

This is truncation, not rescaling. 127 becomes all ones and 0 stays zero,
and every 2^(7 - width) neighbouring values collapse onto the same code.
Reference hardware behaves exactly like this, so do not "improve" it.

Register layouts (one channel register, five per operator):

  0xC0+ch   [ - - - - | FB (3) | CON ]
  0x20+op   [ AM | VIB | EGT | KSR | MULT (4) ]
  0x40+op   [ KSL (2) | TL (6) ]
  0x60+op   [ AR (4) | DR (4) ]
  0x80+op   [ SL (4) | RR (4) ]
  0xE0+op   [ - - - - - - | WS (2) ]

Sustain level is inverted: on the chip SL=0 is the loudest sustain, while a
generalized patch uses 127 for loudest. So SL = 0xF - (sustain >> 3).
*/

/// Writes produced for one channel: the channel register plus five per operator.
pub const WRITES_PER_CHANNEL: usize = 1 + 5 * OPERATORS_PER_CHANNEL;

/// Quantize a 7-bit generalized value down to a `width`-bit register field.
pub fn quantize(value: u8, width: u8) -> u8 {
    (value & 0x7F) >> (7 - width)
}

/// 0xC0: feedback and connection (algorithm).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedbackConnection {
    pub feedback: u8,  // 3 bits
    pub additive: bool, // 0 = FM, 1 = additive
}

/// 0x20: tremolo, vibrato, sustaining envelope, key scale rate, multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorCharacter {
    pub tremolo: bool,
    pub vibrato: bool,
    pub sustaining: bool,
    pub key_scale_rate: bool,
    pub multiple: u8, // 4 bits
}

/// 0x40: key scale level and total level (attenuation).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorLevel {
    pub key_scale_level: u8, // 2 bits
    pub total_level: u8,     // 6 bits
}

/// 0x60
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackDecay {
    pub attack: u8, // 4 bits
    pub decay: u8,  // 4 bits
}

/// 0x80: sustain level holds the already-inverted chip value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SustainRelease {
    pub sustain: u8, // 4 bits
    pub release: u8, // 4 bits
}

/// 0xE0
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveSelect {
    pub waveform: u8, // 2 bits
}

impl FeedbackConnection {
    pub fn from_patch(patch: &Patch) -> Self {
        Self {
            feedback: quantize(patch.feedback, 3),
            additive: quantize(patch.algorithm, 1) == 1,
        }
    }

    pub fn to_byte(self) -> u8 {
        ((self.feedback & 0b111) << 1) | self.additive as u8
    }
}

impl OperatorCharacter {
    pub fn from_params(op: &OperatorParams) -> Self {
        Self {
            tremolo: quantize(op.tremolo, 1) == 1,
            vibrato: quantize(op.vibrato, 1) == 1,
            sustaining: quantize(op.percussive_env, 1) == 1,
            key_scale_rate: quantize(op.env_scaling, 1) == 1,
            multiple: quantize(op.frequency_mult, 4),
        }
    }

    pub fn to_byte(self) -> u8 {
        (self.tremolo as u8) << 7
            | (self.vibrato as u8) << 6
            | (self.sustaining as u8) << 5
            | (self.key_scale_rate as u8) << 4
            | (self.multiple & 0x0F)
    }
}

impl OperatorLevel {
    pub fn from_params(op: &OperatorParams) -> Self {
        Self {
            key_scale_level: quantize(op.level_scaling, 2),
            total_level: quantize(op.level, 6),
        }
    }

    pub fn to_byte(self) -> u8 {
        (self.key_scale_level & 0b11) << 6 | (self.total_level & 0x3F)
    }
}

impl AttackDecay {
    pub fn from_params(op: &OperatorParams) -> Self {
        Self {
            attack: quantize(op.attack, 4),
            decay: quantize(op.decay, 4),
        }
    }

    pub fn to_byte(self) -> u8 {
        (self.attack & 0x0F) << 4 | (self.decay & 0x0F)
    }
}

impl SustainRelease {
    pub fn from_params(op: &OperatorParams) -> Self {
        Self {
            sustain: 0x0F - quantize(op.sustain_level, 4),
            release: quantize(op.release_rate, 4),
        }
    }

    pub fn to_byte(self) -> u8 {
        (self.sustain & 0x0F) << 4 | (self.release & 0x0F)
    }
}

impl WaveSelect {
    pub fn from_params(op: &OperatorParams) -> Self {
        Self {
            waveform: quantize(op.waveform, 2),
        }
    }

    pub fn to_byte(self) -> u8 {
        self.waveform & 0b11
    }
}

/// The five operator registers, already quantized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorRegisters {
    pub character: OperatorCharacter,
    pub level: OperatorLevel,
    pub attack_decay: AttackDecay,
    pub sustain_release: SustainRelease,
    pub wave: WaveSelect,
}

impl OperatorRegisters {
    pub fn from_params(op: &OperatorParams) -> Self {
        Self {
            character: OperatorCharacter::from_params(op),
            level: OperatorLevel::from_params(op),
            attack_decay: AttackDecay::from_params(op),
            sustain_release: SustainRelease::from_params(op),
            wave: WaveSelect::from_params(op),
        }
    }

    /// Serialize to (address, value) pairs for the operator at memory `offset`.
    pub fn writes(&self, offset: u8) -> [(u8, u8); 5] {
        [
            (REG_OP_CHARACTER + offset, self.character.to_byte()),
            (REG_OP_LEVEL + offset, self.level.to_byte()),
            (REG_OP_ATTACK_DECAY + offset, self.attack_decay.to_byte()),
            (REG_OP_SUSTAIN_RELEASE + offset, self.sustain_release.to_byte()),
            (REG_OP_WAVEFORM + offset, self.wave.to_byte()),
        ]
    }
}

/// Everything a channel needs to take on a patch's timbre.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedChannel {
    pub channel: usize,
    pub feedback_connection: FeedbackConnection,
    pub operators: [OperatorRegisters; OPERATORS_PER_CHANNEL],
}

impl EncodedChannel {
    /// Register writes in send order: channel register, then each operator.
    pub fn writes(&self) -> [(u8, u8); WRITES_PER_CHANNEL] {
        let mut out = [(0u8, 0u8); WRITES_PER_CHANNEL];
        out[0] = (
            REG_FEEDBACK_CONNECTION + self.channel as u8,
            self.feedback_connection.to_byte(),
        );
        for (op, regs) in self.operators.iter().enumerate() {
            let start = 1 + op * 5;
            out[start..start + 5].copy_from_slice(&regs.writes(operator_offset(self.channel, op)));
        }
        out
    }
}

/// Encode `patch` for `channel`. Pure and total: any byte values are accepted.
///
/// Panics if `channel` is not a YM3812 channel index (0..9).
pub fn encode_channel(channel: usize, patch: &Patch) -> EncodedChannel {
    EncodedChannel {
        channel,
        feedback_connection: FeedbackConnection::from_patch(patch),
        operators: std::array::from_fn(|op| OperatorRegisters::from_params(&patch.operators[op])),
    }
}
