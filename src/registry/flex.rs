//! flex.messaging.io wrapper classes
//!
//! Flex servers wrap plain arrays and objects in externalizable proxy
//! classes whose body is just one nested value. `ArrayCollection` is
//! handled natively by the decoder; the handlers here cover the other
//! common wrappers and the encode direction, and must be registered
//! explicitly via [`register_handlers`].

use std::sync::Arc;

use super::{register_reader, register_writer};
use crate::codec::decoder::Amf3Decoder;
use crate::codec::encoder::Amf3Encoder;
use crate::error::Error;
use crate::value::AmfObject;

/// Handled natively by the decoder: the body is one wrapped value
pub const ARRAY_COLLECTION: &str = "flex.messaging.io.ArrayCollection";

pub const ARRAY_LIST: &str = "flex.messaging.io.ArrayList";
pub const OBJECT_PROXY: &str = "flex.messaging.io.ObjectProxy";

/// Register readers and writers for the Flex wrapper classes
///
/// Readers decode the single wrapped value and return it unwrapped.
/// Writers emit the object's first field as the wrapped value.
pub fn register_handlers() {
    for class in [ARRAY_COLLECTION, ARRAY_LIST, OBJECT_PROXY] {
        register_reader(class, Arc::new(|decoder: &mut Amf3Decoder| decoder.decode()));
        register_writer(
            class,
            Arc::new(|encoder: &mut Amf3Encoder, object: &AmfObject| {
                let payload = object
                    .static_fields
                    .first()
                    .or_else(|| object.dynamic_fields.first())
                    .map(|(_, value)| value.clone())
                    .ok_or(Error::UnsupportedValue("flex wrapper without a payload"))?;
                encoder.encode(&payload)
            }),
        );
    }
}
