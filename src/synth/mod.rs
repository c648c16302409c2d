// Purpose: Voice management - which channel plays which note
// This layer sits above the chip registers and tracks channel ownership

pub mod allocator;
pub mod channel;
pub mod clock;
pub mod dispatcher;
pub mod message;
pub mod poly;
