//! Externalizable handler registry
//!
//! An externalizable object's body is opaque to the generic object path:
//! it is written and read by user-supplied callbacks keyed by class name.
//! The registry is shared process-wide, so handlers registered once serve
//! every encoder and decoder. Complete registration before decoding
//! begins; mutation is guarded by a `RwLock` and safe to repeat.
//!
//! Readers should construct a fresh value for their result. The decoder
//! copies the reader's result into the reference slot it reserved for the
//! enclosing object, so returning an interior cell (one the reader decoded
//! and that is already in the object table) yields two allocations with
//! equal content, and back-references to the interior cell no longer share
//! identity with the returned slot.

pub mod flex;

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use crate::codec::decoder::Amf3Decoder;
use crate::codec::encoder::Amf3Encoder;
use crate::error::Result;
use crate::value::{AmfCell, AmfObject};

/// Reader callback: consumes an externalizable body, produces a value
///
/// The result should be a freshly constructed cell. Returning a cell that
/// is already registered in the decoder's object table (for example a
/// nested complex value returned directly) breaks identity: its content is
/// copied into the enclosing object's slot, and the two cells diverge
/// under mutation.
pub type ExternalReader = Arc<dyn Fn(&mut Amf3Decoder) -> Result<AmfCell> + Send + Sync>;

/// Writer callback: emits the externalizable body for an object
pub type ExternalWriter = Arc<dyn Fn(&mut Amf3Encoder, &AmfObject) -> Result<()> + Send + Sync>;

#[derive(Default)]
struct Registry {
    readers: HashMap<String, ExternalReader>,
    writers: HashMap<String, ExternalWriter>,
}

fn registry() -> &'static RwLock<Registry> {
    static REGISTRY: OnceLock<RwLock<Registry>> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(Registry::default()))
}

/// Register a reader for an externalizable class name
///
/// Last write wins per name, so repeated registration is harmless.
pub fn register_reader(class_name: impl Into<String>, reader: ExternalReader) {
    let class_name = class_name.into();
    tracing::debug!(class = %class_name, "Registering externalizable reader");
    registry()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .readers
        .insert(class_name, reader);
}

/// Register a writer for an externalizable class name
pub fn register_writer(class_name: impl Into<String>, writer: ExternalWriter) {
    let class_name = class_name.into();
    tracing::debug!(class = %class_name, "Registering externalizable writer");
    registry()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .writers
        .insert(class_name, writer);
}

/// Look up the reader for a class name
pub fn reader(class_name: &str) -> Option<ExternalReader> {
    registry()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .readers
        .get(class_name)
        .cloned()
}

/// Look up the writer for a class name
pub fn writer(class_name: &str) -> Option<ExternalWriter> {
    registry()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .writers
        .get(class_name)
        .cloned()
}
