use std::{fs, path::Path};

use thiserror::Error;
use tracing::info;

use crate::patch::{
    bank::{PatchBank, PatchId},
    proc_conf::{ProcConf, Processor, VoiceConfig},
    OperatorParams, Patch,
};

/*
GENMIDI.op2 Layout
==================

The DMX sound library bank used by Doom-era games. Everything is
little-endian and fixed-size:

  offset     size          contents
  0          8             "#OPL_II#"
  8          175 * 36      instrument records
  6308       175 * 32      NUL-padded names

  record:  flags u16 | fine tune u8 | note number u8 | voice 1 (16) | voice 2 (16)

  voice:   modulator  0x20 0x60 0x80 wave ksl level
           feedback/connection
           carrier    0x20 0x60 0x80 wave ksl level
           unused
           note offset i16

Instruments 0-127 are the GM melodic programs, 128-174 the percussion keys
35-81. Register bytes are raw chip values; conversion widens each field back
into the 7-bit generalized range.
*/

pub const OP2_MAGIC: &[u8; 8] = b"#OPL_II#";
pub const OP2_INSTRUMENTS: usize = 175;
pub const OP2_FIRST_DRUM: usize = 128;

const RECORD_SIZE: usize = 36;
const VOICE_SIZE: usize = 16;
const NAME_SIZE: usize = 32;
const RECORDS_START: usize = OP2_MAGIC.len();
const NAMES_START: usize = RECORDS_START + OP2_INSTRUMENTS * RECORD_SIZE;
pub const OP2_FILE_SIZE: usize = NAMES_START + OP2_INSTRUMENTS * NAME_SIZE;

const FLAG_FIXED_PITCH: u16 = 0b001;
const FLAG_DOUBLE_VOICE: u16 = 0b100;

#[derive(Debug, Error)]
pub enum Op2Error {
    #[error("bank is {len} bytes, expected at least {expected}")]
    TooSmall { len: usize, expected: usize },

    #[error("missing #OPL_II# header")]
    InvalidMagic,

    #[error("failed to read bank: {0}")]
    Io(#[from] std::io::Error),
}

/// One operator as stored in the bank: raw register bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Op2Operator {
    pub character: u8,
    pub attack_decay: u8,
    pub sustain_release: u8,
    pub waveform: u8,
    pub key_scale: u8,
    pub level: u8,
}

impl Op2Operator {
    fn read(bytes: &[u8]) -> Self {
        Self {
            character: bytes[0],
            attack_decay: bytes[1],
            sustain_release: bytes[2],
            waveform: bytes[3],
            key_scale: bytes[4],
            level: bytes[5],
        }
    }

    /// Widen raw register fields into generalized 7-bit values.
    pub fn to_params(&self) -> OperatorParams {
        let bit = |value: u8, shift: u8| ((value >> shift) & 1) << 6;
        OperatorParams {
            waveform: (self.waveform & 0x03) << 5,
            level: (self.level & 0x3F) << 1,
            level_scaling: ((self.key_scale >> 6) & 0x03) << 5,
            env_scaling: bit(self.character, 4),
            percussive_env: bit(self.character, 5),
            attack: ((self.attack_decay >> 4) & 0x0F) << 3,
            decay: (self.attack_decay & 0x0F) << 3,
            // Stored as attenuation, generalized as level
            sustain_level: ((0x0F - (self.sustain_release >> 4)) & 0x0F) << 3,
            release_rate: (self.sustain_release & 0x0F) << 3,
            tremolo: bit(self.character, 7),
            vibrato: bit(self.character, 6),
            frequency_mult: (self.character & 0x0F) << 3,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Op2Voice {
    pub modulator: Op2Operator,
    pub feedback: u8,
    pub carrier: Op2Operator,
    pub note_offset: i16,
}

impl Op2Voice {
    fn read(bytes: &[u8]) -> Self {
        Self {
            modulator: Op2Operator::read(&bytes[0..6]),
            feedback: bytes[6],
            carrier: Op2Operator::read(&bytes[7..13]),
            note_offset: i16::from_le_bytes([bytes[14], bytes[15]]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Op2Instrument {
    pub name: String,
    pub flags: u16,
    pub fine_tune: u8,
    pub note_number: u8,
    pub voices: [Op2Voice; 2],
}

impl Op2Instrument {
    fn read(record: &[u8], name: &[u8]) -> Self {
        let end = name.iter().position(|&b| b == 0).unwrap_or(name.len());
        Self {
            name: String::from_utf8_lossy(&name[..end]).into_owned(),
            flags: u16::from_le_bytes([record[0], record[1]]),
            fine_tune: record[2],
            note_number: record[3],
            voices: [
                Op2Voice::read(&record[4..4 + VOICE_SIZE]),
                Op2Voice::read(&record[4 + VOICE_SIZE..RECORD_SIZE]),
            ],
        }
    }

    pub fn is_fixed_pitch(&self) -> bool {
        self.flags & FLAG_FIXED_PITCH != 0
    }

    pub fn is_double_voice(&self) -> bool {
        self.flags & FLAG_DOUBLE_VOICE != 0
    }

    /// Convert to a generalized patch.
    ///
    /// Voice 1 fills operators 0 and 1, voice 2 operators 2 and 3. Only the
    /// first voice's feedback survives since a patch carries one channel setting.
    pub fn to_patch(&self) -> Patch {
        let [first, second] = self.voices;
        let config = if self.is_double_voice() {
            VoiceConfig::DualTwoOp
        } else {
            VoiceConfig::TwoOp
        };

        let mut detuned = second.modulator.to_params();
        detuned.detune_fine = (self.fine_tune & 0x0F) << 3;

        Patch {
            proc_conf: ProcConf::new(Processor::Ym3812, config).encode(),
            note_number: self.note_number & 0x7F,
            feedback: ((first.feedback >> 1) & 0x07) << 4,
            algorithm: (first.feedback & 0x01) << 6,
            operators: [
                first.modulator.to_params(),
                first.carrier.to_params(),
                detuned,
                second.carrier.to_params(),
            ],
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Op2Bank {
    pub instruments: Vec<Op2Instrument>,
}

impl Op2Bank {
    pub fn melodic(&self) -> &[Op2Instrument] {
        &self.instruments[..OP2_FIRST_DRUM.min(self.instruments.len())]
    }

    /// Percussion instruments, indexed by GM key minus 35.
    pub fn percussion(&self) -> &[Op2Instrument] {
        &self.instruments[OP2_FIRST_DRUM.min(self.instruments.len())..]
    }
}

pub fn parse(data: &[u8]) -> Result<Op2Bank, Op2Error> {
    if data.len() < OP2_FILE_SIZE {
        return Err(Op2Error::TooSmall {
            len: data.len(),
            expected: OP2_FILE_SIZE,
        });
    }
    if &data[..RECORDS_START] != OP2_MAGIC {
        return Err(Op2Error::InvalidMagic);
    }

    let records = data[RECORDS_START..NAMES_START].chunks_exact(RECORD_SIZE);
    let names = data[NAMES_START..OP2_FILE_SIZE].chunks_exact(NAME_SIZE);
    let instruments = records
        .zip(names)
        .map(|(record, name)| Op2Instrument::read(record, name))
        .collect();

    Ok(Op2Bank { instruments })
}

pub fn load(path: impl AsRef<Path>) -> Result<Op2Bank, Op2Error> {
    let path = path.as_ref();
    let data = fs::read(path)?;
    let bank = parse(&data)?;
    info!(path = %path.display(), instruments = bank.instruments.len(), "loaded OP2 bank");
    Ok(bank)
}

/// Ids handed out by `PatchBank::import_op2`, ready for a `MidiRouter`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Op2Programs {
    pub melodic: Vec<PatchId>,
    pub percussion: Vec<PatchId>,
}

impl PatchBank {
    pub fn import_op2(&mut self, bank: &Op2Bank) -> Op2Programs {
        let programs = Op2Programs {
            melodic: bank
                .melodic()
                .iter()
                .map(|inst| self.insert(inst.to_patch()))
                .collect(),
            percussion: bank
                .percussion()
                .iter()
                .map(|inst| self.insert(inst.to_patch()))
                .collect(),
        };
        info!(
            melodic = programs.melodic.len(),
            percussion = programs.percussion.len(),
            "imported OP2 instruments"
        );
        programs
    }
}
