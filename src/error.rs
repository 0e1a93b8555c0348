//! Unified error types for amf3-rs

use std::fmt;

/// Result type alias using the library's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for all AMF3 encode/decode operations
///
/// Errors are terminal for the in-flight operation: the encoder or decoder
/// that produced one should be cleared or discarded, since its reference
/// tables may be partially populated.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Read past the end of the input buffer
    UnexpectedEnd,
    /// Integer outside the 29-bit range accepted by the U29 codec
    OutOfRange(i64),
    /// Unknown type marker on decode, or a forced wire type the encoder
    /// does not emit
    UnsupportedType(u8),
    /// A value that cannot be mapped onto the requested wire type
    UnsupportedValue(&'static str),
    /// A reference index pointing outside its table
    InvalidReference(usize),
    /// Externalizable class name with no registered handler
    UnregisteredExternalizable(String),
    /// Trait bits inconsistent with the data that follows
    MalformedTrait,
    /// Invalid UTF-8 in a string body
    InvalidUtf8,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnexpectedEnd => write!(f, "Unexpected end of AMF3 data"),
            Error::OutOfRange(v) => write!(f, "Value out of U29 range: {}", v),
            Error::UnsupportedType(m) => write!(f, "Unsupported AMF3 type marker: 0x{:02x}", m),
            Error::UnsupportedValue(what) => write!(f, "Unsupported value for encoding: {}", what),
            Error::InvalidReference(idx) => write!(f, "Invalid AMF3 reference: {}", idx),
            Error::UnregisteredExternalizable(name) => {
                write!(f, "No externalizable handler registered for class: {}", name)
            }
            Error::MalformedTrait => write!(f, "Malformed object trait"),
            Error::InvalidUtf8 => write!(f, "Invalid UTF-8 in AMF3 string"),
        }
    }
}

impl std::error::Error for Error {}
