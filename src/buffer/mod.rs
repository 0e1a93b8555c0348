//! Binary read/write utilities
//!
//! AMF3 is big-endian throughout and leans on one unusual primitive: the
//! U29 variable-length integer. Both halves of the codec go through the
//! cursor-based [`ByteReader`] and the growable [`ByteWriter`] defined here,
//! which keep the endian discipline and length-prefix framing in one place.

pub mod reader;
pub mod writer;

pub use reader::{ByteReader, Length};
pub use writer::ByteWriter;

/// Largest value representable by the U29 variable-length encoding
pub const U29_MAX: u32 = (1 << 29) - 1;

/// Smallest signed integer encodable as an AMF3 INTEGER
pub const I29_MIN: i32 = -(1 << 28);

/// Largest signed integer encodable as an AMF3 INTEGER
pub const I29_MAX: i32 = (1 << 28) - 1;
