pub mod chip; // YM3812 register map, frequency table, register cache
pub mod config;
pub mod error;
pub mod io;
pub mod patch; // Generalized instruments and their register encoding
pub mod synth; // Channel allocation and note dispatch

pub use chip::{RegisterLog, RegisterWriter};
pub use config::{ChipConfig, PitchPolicy};
pub use error::ChipError;
pub use patch::{
    bank::{PatchBank, PatchId, PatchSource},
    Patch,
};
pub use synth::{dispatcher::NoteDispatcher, message::ChipMessage, poly::PolyChip};
