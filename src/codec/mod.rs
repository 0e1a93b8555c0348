//! AMF3 codec
//!
//! AMF3 is the ActionScript 3.0 revision of Adobe's Action Message Format,
//! a compact tag-prefixed binary serialization. Compared to AMF0 it adds
//! the U29 variable-length integer and three per-message reference tables
//! (strings, complex values, object traits) so shared substructure is
//! written once and restored with identity intact.
//!
//! The encoder and decoder are symmetric: for any value tree `x`,
//! `decode(encode(x))` preserves structure, sharing, and cycles.

pub mod decoder;
pub mod encoder;
pub mod infer;
pub mod marker;

pub use decoder::Amf3Decoder;
pub use encoder::{Amf3Encoder, FieldFilter};
pub use marker::TypeMarker;

use bytes::Bytes;

use crate::error::Result;
use crate::value::AmfCell;

/// Convenience function to encode a single value
pub fn encode(value: &AmfCell) -> Result<Bytes> {
    let mut encoder = Amf3Encoder::new();
    encoder.encode(value)?;
    Ok(encoder.finish())
}

/// Convenience function to encode multiple values into one message
pub fn encode_all(values: &[AmfCell]) -> Result<Bytes> {
    let mut encoder = Amf3Encoder::new();
    encoder.encode_all(values)?;
    Ok(encoder.finish())
}

/// Convenience function to decode a single value
pub fn decode(data: &[u8]) -> Result<AmfCell> {
    Amf3Decoder::new(Bytes::copy_from_slice(data)).decode()
}

/// Convenience function to decode all values in a message
pub fn decode_all(data: &[u8]) -> Result<Vec<AmfCell>> {
    Amf3Decoder::new(Bytes::copy_from_slice(data)).decode_all()
}
