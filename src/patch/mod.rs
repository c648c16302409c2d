// Purpose: Chip-agnostic instrument definitions
// A patch describes a timbre once; the encoder turns it into chip registers

pub mod bank;
pub mod encoder;
pub mod proc_conf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Generalized Patch Layout
========================

Patches are stored as a flat array of 7-bit values (0-127) so the same
instrument can drive any Yamaha FM chip. Each chip reads the fields it
understands and ignores the rest; the YM3812 uses the channel fields and the
first two operator blocks.

  [ 0..10 )   general / channel settings
  [10..27 )   operator 0
  [27..44 )   operator 1
  [44..61 )   operator 2
  [61..78 )   operator 3

Operator field N of operator `op` lives at `N + op * PATCH_OP_SETTINGS`,
where N is one of the PATCH_* operator constants (10-26).

All values use the full 7-bit range regardless of the target register width.
The encoder drops low-order bits to fit; it never rescales.
*/

pub const PATCH_GEN_SETTINGS: usize = 10;
pub const PATCH_OP_SETTINGS: usize = 17;
pub const PATCH_OPERATORS: usize = 4;
pub const PATCH_SIZE: usize = PATCH_GEN_SETTINGS + PATCH_OP_SETTINGS * PATCH_OPERATORS;

// Instrument level
pub const PATCH_PROC_CONF: usize = 0;
pub const PATCH_NOTE_NUMBER: usize = 1;
pub const PATCH_PEG_INIT_LEVEL: usize = 2;
pub const PATCH_PEG_ATTACK: usize = 3;
pub const PATCH_PEG_RELEASE: usize = 4;
pub const PATCH_PEG_REL_LEVEL: usize = 5;

// Channel level
pub const PATCH_FEEDBACK: usize = 6;
pub const PATCH_ALGORITHM: usize = 7;
pub const PATCH_TREMOLO_SENS: usize = 8;
pub const PATCH_VIBRATO_SENS: usize = 9;

// Operator level (add `op * PATCH_OP_SETTINGS`)
pub const PATCH_WAVEFORM: usize = 10;
pub const PATCH_LEVEL: usize = 11;
pub const PATCH_LEVEL_SCALING: usize = 12;
pub const PATCH_ENV_SCALING: usize = 13;
pub const PATCH_PERCUSSIVE_ENV: usize = 14;
pub const PATCH_ATTACK: usize = 15;
pub const PATCH_DECAY: usize = 16;
pub const PATCH_SUSTAIN_LEVEL: usize = 17;
pub const PATCH_SUSTAIN_DECAY: usize = 18;
pub const PATCH_RELEASE_RATE: usize = 19;
pub const PATCH_TREMOLO: usize = 20;
pub const PATCH_VIBRATO: usize = 21;
pub const PATCH_FREQUENCY_MULT: usize = 22;
pub const PATCH_DETUNE_FINE: usize = 23;
pub const PATCH_DETUNE_GROSS: usize = 24;
pub const PATCH_SSGENV_ENABLE: usize = 25;
pub const PATCH_SSGENV_WAVEFORM: usize = 26;

pub type PatchBytes = [u8; PATCH_SIZE];

/// Index of operator field `field` for operator `op`.
pub const fn operator_index(op: usize, field: usize) -> usize {
    field + op * PATCH_OP_SETTINGS
}

/// Pitch envelope fields. No YM chip implements these in hardware.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PitchEnvelope {
    pub init_level: u8,
    pub attack: u8,
    pub release: u8,
    pub release_level: u8,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OperatorParams {
    pub waveform: u8,
    pub level: u8,
    pub level_scaling: u8,
    pub env_scaling: u8,
    pub percussive_env: u8,
    pub attack: u8,
    pub decay: u8,
    pub sustain_level: u8,
    pub sustain_decay: u8,
    pub release_rate: u8,
    pub tremolo: u8,
    pub vibrato: u8,
    pub frequency_mult: u8,
    pub detune_fine: u8,
    pub detune_gross: u8,
    pub ssg_env_enable: u8,
    pub ssg_env_waveform: u8,
}

impl OperatorParams {
    fn read(bytes: &PatchBytes, op: usize) -> Self {
        let at = |field: usize| bytes[operator_index(op, field)];
        Self {
            waveform: at(PATCH_WAVEFORM),
            level: at(PATCH_LEVEL),
            level_scaling: at(PATCH_LEVEL_SCALING),
            env_scaling: at(PATCH_ENV_SCALING),
            percussive_env: at(PATCH_PERCUSSIVE_ENV),
            attack: at(PATCH_ATTACK),
            decay: at(PATCH_DECAY),
            sustain_level: at(PATCH_SUSTAIN_LEVEL),
            sustain_decay: at(PATCH_SUSTAIN_DECAY),
            release_rate: at(PATCH_RELEASE_RATE),
            tremolo: at(PATCH_TREMOLO),
            vibrato: at(PATCH_VIBRATO),
            frequency_mult: at(PATCH_FREQUENCY_MULT),
            detune_fine: at(PATCH_DETUNE_FINE),
            detune_gross: at(PATCH_DETUNE_GROSS),
            ssg_env_enable: at(PATCH_SSGENV_ENABLE),
            ssg_env_waveform: at(PATCH_SSGENV_WAVEFORM),
        }
    }

    fn write(&self, bytes: &mut PatchBytes, op: usize) {
        let fields = [
            (PATCH_WAVEFORM, self.waveform),
            (PATCH_LEVEL, self.level),
            (PATCH_LEVEL_SCALING, self.level_scaling),
            (PATCH_ENV_SCALING, self.env_scaling),
            (PATCH_PERCUSSIVE_ENV, self.percussive_env),
            (PATCH_ATTACK, self.attack),
            (PATCH_DECAY, self.decay),
            (PATCH_SUSTAIN_LEVEL, self.sustain_level),
            (PATCH_SUSTAIN_DECAY, self.sustain_decay),
            (PATCH_RELEASE_RATE, self.release_rate),
            (PATCH_TREMOLO, self.tremolo),
            (PATCH_VIBRATO, self.vibrato),
            (PATCH_FREQUENCY_MULT, self.frequency_mult),
            (PATCH_DETUNE_FINE, self.detune_fine),
            (PATCH_DETUNE_GROSS, self.detune_gross),
            (PATCH_SSGENV_ENABLE, self.ssg_env_enable),
            (PATCH_SSGENV_WAVEFORM, self.ssg_env_waveform),
        ];
        for (field, value) in fields {
            bytes[operator_index(op, field)] = value;
        }
    }
}

/// A generalized FM instrument.
///
/// Equality here is value equality. Voice tracking never uses it - channels
/// remember which `PatchId` they play, so two identical patches stay distinct.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Patch {
    pub proc_conf: u8,
    pub note_number: u8,
    pub pitch_envelope: PitchEnvelope,
    pub feedback: u8,
    pub algorithm: u8,
    pub tremolo_sensitivity: u8,
    pub vibrato_sensitivity: u8,
    pub operators: [OperatorParams; PATCH_OPERATORS],
}

impl Patch {
    pub fn from_bytes(bytes: &PatchBytes) -> Self {
        Self {
            proc_conf: bytes[PATCH_PROC_CONF],
            note_number: bytes[PATCH_NOTE_NUMBER],
            pitch_envelope: PitchEnvelope {
                init_level: bytes[PATCH_PEG_INIT_LEVEL],
                attack: bytes[PATCH_PEG_ATTACK],
                release: bytes[PATCH_PEG_RELEASE],
                release_level: bytes[PATCH_PEG_REL_LEVEL],
            },
            feedback: bytes[PATCH_FEEDBACK],
            algorithm: bytes[PATCH_ALGORITHM],
            tremolo_sensitivity: bytes[PATCH_TREMOLO_SENS],
            vibrato_sensitivity: bytes[PATCH_VIBRATO_SENS],
            operators: std::array::from_fn(|op| OperatorParams::read(bytes, op)),
        }
    }

    pub fn to_bytes(&self) -> PatchBytes {
        let mut bytes = [0u8; PATCH_SIZE];
        bytes[PATCH_PROC_CONF] = self.proc_conf;
        bytes[PATCH_NOTE_NUMBER] = self.note_number;
        bytes[PATCH_PEG_INIT_LEVEL] = self.pitch_envelope.init_level;
        bytes[PATCH_PEG_ATTACK] = self.pitch_envelope.attack;
        bytes[PATCH_PEG_RELEASE] = self.pitch_envelope.release;
        bytes[PATCH_PEG_REL_LEVEL] = self.pitch_envelope.release_level;
        bytes[PATCH_FEEDBACK] = self.feedback;
        bytes[PATCH_ALGORITHM] = self.algorithm;
        bytes[PATCH_TREMOLO_SENS] = self.tremolo_sensitivity;
        bytes[PATCH_VIBRATO_SENS] = self.vibrato_sensitivity;
        for (op, params) in self.operators.iter().enumerate() {
            params.write(&mut bytes, op);
        }
        bytes
    }

    /// Read one field by its flat index.
    pub fn get(&self, index: usize) -> Option<u8> {
        self.to_bytes().get(index).copied()
    }

    /// Overwrite one field by its flat index. Returns false if `index` is out of range.
    pub fn set(&mut self, index: usize, value: u8) -> bool {
        if index >= PATCH_SIZE {
            return false;
        }
        let mut bytes = self.to_bytes();
        bytes[index] = value;
        *self = Self::from_bytes(&bytes);
        true
    }

    pub fn proc_conf(&self) -> proc_conf::ProcConf {
        proc_conf::ProcConf::decode(self.proc_conf)
    }
}

/// A plain two-operator FM tone: full-level carrier, modulator at half level.
///
/// Used by the dump binary and the benchmarks when no bank is loaded.
pub fn default_patch() -> Patch {
    let modulator = OperatorParams {
        level: 64,
        attack: 120,
        decay: 40,
        sustain_level: 96,
        release_rate: 48,
        frequency_mult: 8,
        env_scaling: 64,
        ..Default::default()
    };
    let carrier = OperatorParams {
        level: 0,
        attack: 120,
        decay: 32,
        sustain_level: 112,
        release_rate: 40,
        frequency_mult: 8,
        env_scaling: 64,
        ..Default::default()
    };

    Patch {
        proc_conf: proc_conf::ProcConf::new(
            proc_conf::Processor::Ym3812,
            proc_conf::VoiceConfig::TwoOp,
        )
        .encode(),
        feedback: 48,
        operators: [modulator, carrier, OperatorParams::default(), OperatorParams::default()],
        ..Default::default()
    }
}
