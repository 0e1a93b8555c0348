//! amf3-rs: AMF3 (Action Message Format 3) codec
//!
//! This library reads and writes AMF3, the binary serialization format
//! used by Flash Player and Flex to exchange structured values. It
//! supports:
//! - The full scalar set plus dates, byte arrays, dense and associative
//!   arrays, typed/dynamic objects, the four vector types, and dictionaries
//! - Per-message reference tables for strings, complex values, and object
//!   traits, so shared substructure and cycles round-trip with identity
//!   preserved
//! - Externalizable objects via a process-wide class-name registry, with
//!   built-in handling for `flex.messaging.io.ArrayCollection`
//!
//! # Example
//!
//! ```
//! use amf3_rs::{Amf3Decoder, Amf3Encoder, AmfObject, AmfValue};
//!
//! fn main() -> amf3_rs::Result<()> {
//!     let mut object = AmfObject::anonymous();
//!     object.push_dynamic("app", AmfValue::from("live").into_cell());
//!     object.push_dynamic("count", AmfValue::Integer(3).into_cell());
//!
//!     let mut encoder = Amf3Encoder::new();
//!     encoder.encode_value(AmfValue::Object(object))?;
//!     let bytes = encoder.finish();
//!
//!     let mut decoder = Amf3Decoder::new(bytes);
//!     let decoded = decoder.decode()?;
//!     assert_eq!(decoded.borrow().get_string("app"), Some("live".to_string()));
//!     Ok(())
//! }
//! ```

pub mod buffer;
pub mod codec;
pub mod error;
pub mod registry;
pub mod value;

// Re-export main types for convenience
pub use buffer::{ByteReader, ByteWriter, Length};
pub use codec::decoder::Amf3Decoder;
pub use codec::encoder::{Amf3Encoder, FieldFilter};
pub use codec::marker::TypeMarker;
pub use error::{Error, Result};
pub use registry::{ExternalReader, ExternalWriter};
pub use value::{AmfCell, AmfObject, AmfValue, ClassDefinition};
