// Purpose - external interfaces, format conversions
// MIDI in, OP2 banks in; register writes go out through chip::RegisterWriter

pub mod converter;
pub mod midi;
pub mod op2;
