/*
Processor / Config Selector
===========================

Field 0 of a patch says which chip the instrument was designed for and how
its operators are arranged:

  bits 7-4  processor id   (0 = any chip that can render the config)
  bits 3-0  voice config   (1 op, 2 op, dual 2 op, 4 op)

This crate only renders two-operator voices on the YM3812, but the selector
is decoded so bank tooling can inspect and filter instruments.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Processor {
    Any,     // 0x0
    Ym3526,  // 0x1 OPL:  1op, 2op, 2x2op
    Ym3812,  // 0x2 OPL2: 1op, 2op, 2x2op
    Ymf262,  // 0x3 OPL3: 1op, 2op, 2x2op, 4op
    Ym2151,  // 0x4 OPM:  4op
    Ym2612,  // 0x5 OPN2: 4op
    Ym2149,  // 0x6 SSG:  1op
    Sn76489, // 0x7       1op
    Unknown(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceConfig {
    OneOp,
    TwoOp,
    DualTwoOp,
    FourOp,
    Unknown(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcConf {
    pub processor: Processor,
    pub voice_config: VoiceConfig,
}

impl Processor {
    fn from_nibble(nibble: u8) -> Self {
        match nibble {
            0x0 => Processor::Any,
            0x1 => Processor::Ym3526,
            0x2 => Processor::Ym3812,
            0x3 => Processor::Ymf262,
            0x4 => Processor::Ym2151,
            0x5 => Processor::Ym2612,
            0x6 => Processor::Ym2149,
            0x7 => Processor::Sn76489,
            other => Processor::Unknown(other),
        }
    }

    fn nibble(self) -> u8 {
        match self {
            Processor::Any => 0x0,
            Processor::Ym3526 => 0x1,
            Processor::Ym3812 => 0x2,
            Processor::Ymf262 => 0x3,
            Processor::Ym2151 => 0x4,
            Processor::Ym2612 => 0x5,
            Processor::Ym2149 => 0x6,
            Processor::Sn76489 => 0x7,
            Processor::Unknown(n) => n & 0x0F,
        }
    }
}

impl VoiceConfig {
    fn from_nibble(nibble: u8) -> Self {
        match nibble {
            0b0001 => VoiceConfig::OneOp,
            0b0010 => VoiceConfig::TwoOp,
            0b0011 => VoiceConfig::DualTwoOp,
            0b0100 => VoiceConfig::FourOp,
            other => VoiceConfig::Unknown(other),
        }
    }

    fn nibble(self) -> u8 {
        match self {
            VoiceConfig::OneOp => 0b0001,
            VoiceConfig::TwoOp => 0b0010,
            VoiceConfig::DualTwoOp => 0b0011,
            VoiceConfig::FourOp => 0b0100,
            VoiceConfig::Unknown(n) => n & 0x0F,
        }
    }

    /// Operators this config occupies.
    pub fn operators(self) -> Option<usize> {
        match self {
            VoiceConfig::OneOp => Some(1),
            VoiceConfig::TwoOp => Some(2),
            VoiceConfig::DualTwoOp | VoiceConfig::FourOp => Some(4),
            VoiceConfig::Unknown(_) => None,
        }
    }
}

impl ProcConf {
    pub fn new(processor: Processor, voice_config: VoiceConfig) -> Self {
        Self {
            processor,
            voice_config,
        }
    }

    pub fn decode(byte: u8) -> Self {
        Self {
            processor: Processor::from_nibble(byte >> 4),
            voice_config: VoiceConfig::from_nibble(byte & 0x0F),
        }
    }

    pub fn encode(&self) -> u8 {
        (self.processor.nibble() << 4) | self.voice_config.nibble()
    }

    /// Whether a YM3812 can render this instrument.
    pub fn fits_ym3812(&self) -> bool {
        matches!(
            self.processor,
            Processor::Any | Processor::Ym3526 | Processor::Ym3812
        ) && matches!(
            self.voice_config,
            VoiceConfig::OneOp | VoiceConfig::TwoOp | VoiceConfig::DualTwoOp
        )
    }
}
