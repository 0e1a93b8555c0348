//! AMF3 encoder
//!
//! The encoder appends fully tagged values (marker byte + body) to a
//! growable buffer while maintaining three reference tables:
//!
//! - `string_refs`: non-empty strings already written, compared by value
//! - `object_refs`: complex values already written, compared by handle
//!   identity (`Rc::ptr_eq`)
//! - `trait_refs`: object traits already written, compared structurally
//!
//! A table hit replaces the body with a one-to-four byte U29 reference, so
//! shared substructure is written exactly once and cycles terminate. The
//! tables span the lifetime of one message: `finish` and `clear` drop them.

use std::rc::Rc;

use bytes::Bytes;

use crate::buffer::{ByteWriter, I29_MAX, I29_MIN};
use crate::codec::infer;
use crate::codec::marker::TypeMarker;
use crate::error::{Error, Result};
use crate::registry;
use crate::value::{AmfCell, AmfObject, AmfValue, ClassDefinition};

/// Hook selecting which fields of an object participate in serialization,
/// in emission order. Double-underscore names are dropped after the hook
/// runs, so a filter cannot re-admit them.
pub type FieldFilter = Box<dyn Fn(&AmfObject) -> Vec<String>>;

/// Fields whose names start with this prefix never serialize
const PRIVATE_FIELD_PREFIX: &str = "__";

/// U29 body of an inline empty string, also the associative terminator
const EMPTY_STRING: u8 = 0x01;

enum ArrayBody {
    Dense(Vec<AmfCell>),
    Assoc(Vec<(String, AmfCell)>),
}

enum VectorBody {
    Int(Vec<i32>, bool),
    Uint(Vec<u32>, bool),
    Double(Vec<f64>, bool),
    Object(Vec<AmfCell>, bool),
}

/// AMF3 encoder with per-message reference tables
pub struct Amf3Encoder {
    writer: ByteWriter,
    string_refs: Vec<String>,
    object_refs: Vec<AmfCell>,
    trait_refs: Vec<ClassDefinition>,
    field_filter: Option<FieldFilter>,
}

impl Amf3Encoder {
    /// Create a new encoder with empty buffer and reference tables
    pub fn new() -> Self {
        Self {
            writer: ByteWriter::new(),
            string_refs: Vec::new(),
            object_refs: Vec::new(),
            trait_refs: Vec::new(),
            field_filter: None,
        }
    }

    /// Install a field filter for typed objects
    pub fn set_field_filter(&mut self, filter: FieldFilter) {
        self.field_filter = Some(filter);
    }

    /// Current encoded length
    pub fn len(&self) -> usize {
        self.writer.len()
    }

    /// Check if nothing has been encoded yet
    pub fn is_empty(&self) -> bool {
        self.writer.is_empty()
    }

    /// Copy of the accumulated bytes; encoder state is untouched
    pub fn buffer(&self) -> Bytes {
        self.writer.buffer()
    }

    /// Take the accumulated bytes and reset the encoder for a new message
    pub fn finish(&mut self) -> Bytes {
        self.string_refs.clear();
        self.object_refs.clear();
        self.trait_refs.clear();
        self.writer.finish()
    }

    /// Reset buffer and reference tables without producing bytes
    pub fn clear(&mut self) {
        self.string_refs.clear();
        self.object_refs.clear();
        self.trait_refs.clear();
        self.writer.clear();
    }

    /// Append one tagged value
    pub fn encode(&mut self, value: &AmfCell) -> Result<()> {
        let (marker, cell) = infer::resolve(value)?;
        self.write_value(marker, &cell)
    }

    /// Append one tagged value without sharing its handle
    ///
    /// Convenience for values built inline; a value encoded this way can
    /// never be the target of an object reference.
    pub fn encode_value(&mut self, value: AmfValue) -> Result<()> {
        self.encode(&value.into_cell())
    }

    /// Append several tagged values
    pub fn encode_all(&mut self, values: &[AmfCell]) -> Result<()> {
        for value in values {
            self.encode(value)?;
        }
        Ok(())
    }

    fn write_value(&mut self, marker: TypeMarker, cell: &AmfCell) -> Result<()> {
        match marker {
            TypeMarker::Undefined
            | TypeMarker::Null
            | TypeMarker::False
            | TypeMarker::True => {
                self.writer.write_u8(marker.to_byte());
                Ok(())
            }
            TypeMarker::Integer => self.write_integer(cell),
            TypeMarker::Double => self.write_double(cell),
            TypeMarker::String => self.write_string(cell),
            TypeMarker::Date => self.write_date(cell),
            TypeMarker::Array => self.write_array(cell),
            TypeMarker::Object => self.write_object(cell),
            TypeMarker::ByteArray => self.write_byte_array(cell),
            TypeMarker::VectorInt
            | TypeMarker::VectorUint
            | TypeMarker::VectorDouble
            | TypeMarker::VectorObject => self.write_vector(marker, cell),
            TypeMarker::Dictionary => self.write_dictionary(cell),
        }
    }

    /// Emit a back-reference if this handle was already encoded; otherwise
    /// register it and leave the body to the caller
    fn try_reference(&mut self, marker: TypeMarker, cell: &AmfCell) -> Result<bool> {
        if let Some(index) = self
            .object_refs
            .iter()
            .position(|seen| Rc::ptr_eq(seen, cell))
        {
            self.writer.write_u8(marker.to_byte());
            self.writer.write_reference(index)?;
            return Ok(true);
        }
        self.object_refs.push(cell.clone());
        self.writer.write_u8(marker.to_byte());
        Ok(false)
    }

    /// Write a string body with reference handling (no marker byte).
    /// The empty string is always the literal `0x01` and never registers.
    fn write_string_body(&mut self, s: &str) -> Result<()> {
        if s.is_empty() {
            self.writer.write_u8(EMPTY_STRING);
            return Ok(());
        }
        if let Some(index) = self.string_refs.iter().position(|seen| seen == s) {
            return self.writer.write_reference(index);
        }
        self.string_refs.push(s.to_string());
        self.writer.write_size(s.len() as u32)?;
        self.writer.write_bytes(s.as_bytes());
        Ok(())
    }

    fn write_integer(&mut self, cell: &AmfCell) -> Result<()> {
        let value = match &*cell.borrow() {
            AmfValue::Integer(i) => *i,
            // reachable only through a forced INTEGER marker
            AmfValue::Number(n)
                if n.fract() == 0.0 && (I29_MIN as f64..=I29_MAX as f64).contains(n) =>
            {
                *n as i32
            }
            _ => return Err(Error::UnsupportedValue("integer")),
        };
        self.writer.write_u8(TypeMarker::Integer.to_byte());
        self.writer.write_i29(value)
    }

    fn write_double(&mut self, cell: &AmfCell) -> Result<()> {
        let value = match &*cell.borrow() {
            AmfValue::Number(n) => *n,
            AmfValue::Integer(i) => *i as f64,
            _ => return Err(Error::UnsupportedValue("double")),
        };
        self.writer.write_u8(TypeMarker::Double.to_byte());
        self.writer.write_f64(value);
        Ok(())
    }

    fn write_string(&mut self, cell: &AmfCell) -> Result<()> {
        let borrowed = cell.borrow();
        let s = borrowed.as_str().ok_or(Error::UnsupportedValue("string"))?;
        self.writer.write_u8(TypeMarker::String.to_byte());
        self.write_string_body(s)
    }

    fn write_date(&mut self, cell: &AmfCell) -> Result<()> {
        if self.try_reference(TypeMarker::Date, cell)? {
            return Ok(());
        }
        let millis = match &*cell.borrow() {
            AmfValue::Date(ms) => *ms,
            _ => return Err(Error::UnsupportedValue("date")),
        };
        self.writer.write_u8(EMPTY_STRING); // U29 0x01: inline, no payload
        self.writer.write_f64(millis);
        Ok(())
    }

    fn write_array(&mut self, cell: &AmfCell) -> Result<()> {
        if self.try_reference(TypeMarker::Array, cell)? {
            return Ok(());
        }
        let body = match &*cell.borrow() {
            AmfValue::Array(elements) => ArrayBody::Dense(elements.clone()),
            AmfValue::EcmaArray(pairs) => ArrayBody::Assoc(pairs.clone()),
            _ => return Err(Error::UnsupportedValue("array")),
        };
        match body {
            ArrayBody::Dense(elements) => {
                self.writer.write_size(elements.len() as u32)?;
                self.writer.write_u8(EMPTY_STRING);
                for element in &elements {
                    self.encode(element)?;
                }
            }
            ArrayBody::Assoc(pairs) => {
                // zero dense length; everything rides the named part
                self.writer.write_u8(EMPTY_STRING);
                for (name, value) in &pairs {
                    if name.starts_with(PRIVATE_FIELD_PREFIX) {
                        continue;
                    }
                    self.write_string_body(name)?;
                    self.encode(value)?;
                }
                self.writer.write_u8(EMPTY_STRING);
            }
        }
        Ok(())
    }

    fn write_object(&mut self, cell: &AmfCell) -> Result<()> {
        if self.try_reference(TypeMarker::Object, cell)? {
            return Ok(());
        }
        let object = match &*cell.borrow() {
            AmfValue::Object(object) => object.clone(),
            _ => return Err(Error::UnsupportedValue("object")),
        };
        match object.effective_class_name() {
            None => self.write_anonymous_object(&object),
            Some(name) => {
                let name = name.to_string();
                self.write_typed_object(&name, &object)
            }
        }
    }

    fn write_anonymous_object(&mut self, object: &AmfObject) -> Result<()> {
        let definition = ClassDefinition {
            name: String::new(),
            dynamic: object.dynamic,
            externalizable: false,
            static_properties: Vec::new(),
        };
        self.write_trait(&definition)?;
        if !object.dynamic {
            // static trait with no fields: the body is empty
            return Ok(());
        }
        for (name, value) in object
            .static_fields
            .iter()
            .chain(object.dynamic_fields.iter())
        {
            if name.starts_with(PRIVATE_FIELD_PREFIX) {
                continue;
            }
            self.write_string_body(name)?;
            self.encode(value)?;
        }
        self.writer.write_u8(EMPTY_STRING);
        Ok(())
    }

    fn write_typed_object(&mut self, name: &str, object: &AmfObject) -> Result<()> {
        if object.externalizable {
            // resolve the writer before the trait goes out so a missing
            // handler does not leave a half-written trait behind
            let write_body = registry::writer(name)
                .ok_or_else(|| Error::UnregisteredExternalizable(name.to_string()))?;
            let definition = ClassDefinition {
                name: name.to_string(),
                dynamic: false,
                externalizable: true,
                static_properties: Vec::new(),
            };
            self.write_trait(&definition)?;
            return write_body(self, object);
        }

        let fields = self.serializable_fields(object);
        let definition = ClassDefinition {
            name: name.to_string(),
            // dynamic fields of typed objects are not emitted
            dynamic: false,
            externalizable: false,
            static_properties: fields.clone(),
        };
        self.write_trait(&definition)?;
        for field in &fields {
            let value = object
                .get(field)
                .unwrap_or_else(|| AmfValue::Undefined.into_cell());
            self.encode(&value)?;
        }
        Ok(())
    }

    /// Emit a trait reference if an equal definition was already written,
    /// otherwise the inline form: header, class name, static field names.
    /// Inline definitions register in the trait table.
    fn write_trait(&mut self, definition: &ClassDefinition) -> Result<()> {
        if let Some(index) = self.trait_refs.iter().position(|seen| seen == definition) {
            // bit 0: value inline, bit 1: trait reference
            return self.writer.write_u29(((index as u32) << 2) | 0b01);
        }
        let mut header = ((definition.static_properties.len() as u32) << 4) | 0b11;
        if definition.externalizable {
            header |= 1 << 2;
        }
        if definition.dynamic {
            header |= 1 << 3;
        }
        self.writer.write_u29(header)?;
        self.write_string_body(&definition.name)?;
        for property in &definition.static_properties {
            self.write_string_body(property)?;
        }
        self.trait_refs.push(definition.clone());
        Ok(())
    }

    fn serializable_fields(&self, object: &AmfObject) -> Vec<String> {
        let names = match &self.field_filter {
            Some(filter) => filter(object),
            None => object
                .static_fields
                .iter()
                .map(|(name, _)| name.clone())
                .collect(),
        };
        names
            .into_iter()
            .filter(|name| !name.starts_with(PRIVATE_FIELD_PREFIX))
            .collect()
    }

    fn write_byte_array(&mut self, cell: &AmfCell) -> Result<()> {
        if self.try_reference(TypeMarker::ByteArray, cell)? {
            return Ok(());
        }
        let bytes = match &*cell.borrow() {
            AmfValue::ByteArray(bytes) => bytes.clone(),
            _ => return Err(Error::UnsupportedValue("byte array")),
        };
        self.writer.write_size(bytes.len() as u32)?;
        self.writer.write_bytes(&bytes);
        Ok(())
    }

    fn write_vector(&mut self, marker: TypeMarker, cell: &AmfCell) -> Result<()> {
        if self.try_reference(marker, cell)? {
            return Ok(());
        }
        let body = match &*cell.borrow() {
            AmfValue::VectorInt { elements, fixed } => VectorBody::Int(elements.clone(), *fixed),
            AmfValue::VectorUint { elements, fixed } => VectorBody::Uint(elements.clone(), *fixed),
            AmfValue::VectorDouble { elements, fixed } => {
                VectorBody::Double(elements.clone(), *fixed)
            }
            AmfValue::VectorObject { elements, fixed } => {
                VectorBody::Object(elements.clone(), *fixed)
            }
            _ => return Err(Error::UnsupportedValue("vector")),
        };
        match body {
            VectorBody::Int(elements, fixed) => {
                self.writer.write_size(elements.len() as u32)?;
                self.writer.write_u8(fixed as u8);
                for element in elements {
                    self.writer.write_i32(element);
                }
            }
            VectorBody::Uint(elements, fixed) => {
                self.writer.write_size(elements.len() as u32)?;
                self.writer.write_u8(fixed as u8);
                for element in elements {
                    self.writer.write_u32(element);
                }
            }
            VectorBody::Double(elements, fixed) => {
                self.writer.write_size(elements.len() as u32)?;
                self.writer.write_u8(fixed as u8);
                for element in elements {
                    self.writer.write_f64(element);
                }
            }
            VectorBody::Object(elements, fixed) => {
                self.writer.write_size(elements.len() as u32)?;
                self.writer.write_u8(fixed as u8);
                for element in &elements {
                    self.encode(element)?;
                }
            }
        }
        Ok(())
    }

    fn write_dictionary(&mut self, cell: &AmfCell) -> Result<()> {
        if self.try_reference(TypeMarker::Dictionary, cell)? {
            return Ok(());
        }
        let (entries, weak_keys) = match &*cell.borrow() {
            AmfValue::Dictionary { entries, weak_keys } => (entries.clone(), *weak_keys),
            _ => return Err(Error::UnsupportedValue("dictionary")),
        };
        self.writer.write_size(entries.len() as u32)?;
        self.writer.write_u8(weak_keys as u8);
        for (key, value) in &entries {
            self.encode(key)?;
            self.encode(value)?;
        }
        Ok(())
    }
}

impl Default for Amf3Encoder {
    fn default() -> Self {
        Self::new()
    }
}
