//! AMF3 decoder
//!
//! Reads one tagged value per `decode` call, maintaining the same three
//! reference tables as the encoder. Complex values register their slot
//! *before* the body is parsed: the slot is a mutable cell, so a
//! back-reference read mid-body (including a self-reference) resolves to
//! the value under construction.
//!
//! Externalizable objects delegate their body to a reader registered under
//! the trait's class name; `flex.messaging.io.ArrayCollection` is handled
//! natively as a single wrapped value.

use std::rc::Rc;

use bytes::Bytes;

use crate::buffer::{ByteReader, Length};
use crate::codec::marker::TypeMarker;
use crate::error::{Error, Result};
use crate::registry::{self, flex, ExternalReader};
use crate::value::{AmfCell, AmfObject, AmfValue, ClassDefinition};

/// AMF3 decoder with per-message reference tables
pub struct Amf3Decoder {
    reader: ByteReader,
    string_refs: Vec<String>,
    object_refs: Vec<AmfCell>,
    trait_refs: Vec<Rc<ClassDefinition>>,
}

impl Amf3Decoder {
    /// Wrap a buffer with the cursor at position 0
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            reader: ByteReader::new(data),
            string_refs: Vec::new(),
            object_refs: Vec::new(),
            trait_refs: Vec::new(),
        }
    }

    /// Current cursor position
    pub fn position(&self) -> usize {
        self.reader.position()
    }

    /// Move the cursor to an absolute position
    pub fn set_position(&mut self, pos: usize) {
        self.reader.set_position(pos);
    }

    /// Number of unread bytes
    pub fn remaining(&self) -> usize {
        self.reader.remaining()
    }

    /// Register an externalizable reader for a class name (process-wide)
    pub fn register(class_name: impl Into<String>, reader: ExternalReader) {
        registry::register_reader(class_name, reader);
    }

    /// Read and return one tagged value
    pub fn decode(&mut self) -> Result<AmfCell> {
        let marker_byte = self.reader.read_u8()?;
        let marker =
            TypeMarker::from_byte(marker_byte).ok_or(Error::UnsupportedType(marker_byte))?;
        match marker {
            TypeMarker::Undefined => Ok(AmfValue::Undefined.into_cell()),
            TypeMarker::Null => Ok(AmfValue::Null.into_cell()),
            TypeMarker::False => Ok(AmfValue::Boolean(false).into_cell()),
            TypeMarker::True => Ok(AmfValue::Boolean(true).into_cell()),
            TypeMarker::Integer => Ok(AmfValue::Integer(self.reader.read_i29()?).into_cell()),
            TypeMarker::Double => Ok(AmfValue::Number(self.reader.read_f64()?).into_cell()),
            TypeMarker::String => Ok(AmfValue::String(self.read_string_body()?).into_cell()),
            TypeMarker::Date => self.decode_date(),
            TypeMarker::Array => self.decode_array(),
            TypeMarker::Object => self.decode_object(),
            TypeMarker::ByteArray => self.decode_byte_array(),
            TypeMarker::VectorInt
            | TypeMarker::VectorUint
            | TypeMarker::VectorDouble
            | TypeMarker::VectorObject => self.decode_vector(marker),
            TypeMarker::Dictionary => self.decode_dictionary(),
        }
    }

    /// Decode values until the buffer is exhausted
    pub fn decode_all(&mut self) -> Result<Vec<AmfCell>> {
        let mut values = Vec::new();
        while self.reader.remaining() > 0 {
            values.push(self.decode()?);
        }
        Ok(values)
    }

    /// Read a string body with reference handling (no marker byte).
    /// The empty string is never registered and never a reference.
    fn read_string_body(&mut self) -> Result<String> {
        match self.reader.read_length()? {
            Length::Reference(index) => self
                .string_refs
                .get(index)
                .cloned()
                .ok_or(Error::InvalidReference(index)),
            Length::Size(0) => Ok(String::new()),
            Length::Size(n) => {
                let s = self.reader.read_utf8(n as usize)?;
                self.string_refs.push(s.clone());
                Ok(s)
            }
        }
    }

    fn object_reference(&self, index: usize) -> Result<AmfCell> {
        self.object_refs
            .get(index)
            .cloned()
            .ok_or(Error::InvalidReference(index))
    }

    /// Append a fresh cell to the object table before its body is read
    fn register_slot(&mut self, value: AmfValue) -> AmfCell {
        let cell = value.into_cell();
        self.object_refs.push(cell.clone());
        cell
    }

    fn decode_date(&mut self) -> Result<AmfCell> {
        match self.reader.read_length()? {
            Length::Reference(index) => self.object_reference(index),
            Length::Size(_) => {
                let cell = self.register_slot(AmfValue::Date(0.0));
                let millis = self.reader.read_f64()?;
                *cell.borrow_mut() = AmfValue::Date(millis);
                Ok(cell)
            }
        }
    }

    fn decode_array(&mut self) -> Result<AmfCell> {
        let dense_len = match self.reader.read_length()? {
            Length::Reference(index) => return self.object_reference(index),
            Length::Size(n) => n,
        };
        let cell = self.register_slot(AmfValue::Array(Vec::new()));

        let mut pairs: Vec<(String, AmfCell)> = Vec::new();
        loop {
            let key = self.read_string_body()?;
            if key.is_empty() {
                break;
            }
            let value = self.decode()?;
            pairs.push((key, value));
        }
        if !pairs.is_empty() {
            // associative form wins; the announced dense part is skipped
            *cell.borrow_mut() = AmfValue::EcmaArray(pairs);
            return Ok(cell);
        }

        let mut elements = Vec::with_capacity((dense_len as usize).min(1024));
        for _ in 0..dense_len {
            elements.push(self.decode()?);
        }
        *cell.borrow_mut() = AmfValue::Array(elements);
        Ok(cell)
    }

    fn decode_object(&mut self) -> Result<AmfCell> {
        let trait_bits = match self.reader.read_length()? {
            Length::Reference(index) => return self.object_reference(index),
            Length::Size(bits) => bits,
        };
        let cell = self.register_slot(AmfValue::Null);
        let definition = self.read_trait(trait_bits)?;

        if definition.externalizable {
            let produced = if definition.name == flex::ARRAY_COLLECTION {
                self.decode()?
            } else {
                let read_body = registry::reader(&definition.name).ok_or_else(|| {
                    tracing::debug!(
                        class = %definition.name,
                        "Externalizable class has no registered reader"
                    );
                    Error::UnregisteredExternalizable(definition.name.clone())
                })?;
                read_body(self)?
            };
            let value = produced.borrow().clone();
            *cell.borrow_mut() = value;
            return Ok(cell);
        }

        *cell.borrow_mut() = AmfValue::Object(AmfObject {
            class_name: (!definition.name.is_empty()).then(|| definition.name.clone()),
            dynamic: definition.dynamic,
            externalizable: false,
            static_fields: Vec::new(),
            dynamic_fields: Vec::new(),
        });

        for property in definition.static_properties.iter() {
            let value = self.decode()?;
            if let AmfValue::Object(object) = &mut *cell.borrow_mut() {
                object.static_fields.push((property.clone(), value));
            }
        }
        if definition.dynamic {
            loop {
                let key = self.read_string_body()?;
                if key.is_empty() {
                    break;
                }
                let value = self.decode()?;
                if let AmfValue::Object(object) = &mut *cell.borrow_mut() {
                    object.dynamic_fields.push((key, value));
                }
            }
        }
        Ok(cell)
    }

    /// Resolve the trait for an object header: either an index into the
    /// trait table or an inline definition that registers itself
    fn read_trait(&mut self, bits: u32) -> Result<Rc<ClassDefinition>> {
        if bits & 1 == 0 {
            let index = (bits >> 1) as usize;
            return self
                .trait_refs
                .get(index)
                .cloned()
                .ok_or(Error::InvalidReference(index));
        }
        let externalizable = (bits >> 1) & 1 == 1;
        let dynamic = (bits >> 2) & 1 == 1;
        let field_count = (bits >> 3) as usize;
        if externalizable && field_count != 0 {
            // externalizable traits carry no field list
            return Err(Error::MalformedTrait);
        }
        let name = self.read_string_body()?;
        let mut static_properties = Vec::with_capacity(field_count.min(1024));
        for _ in 0..field_count {
            static_properties.push(self.read_string_body()?);
        }
        let definition = Rc::new(ClassDefinition {
            name,
            dynamic,
            externalizable,
            static_properties,
        });
        self.trait_refs.push(definition.clone());
        Ok(definition)
    }

    fn decode_byte_array(&mut self) -> Result<AmfCell> {
        let len = match self.reader.read_length()? {
            Length::Reference(index) => return self.object_reference(index),
            Length::Size(n) => n,
        };
        let cell = self.register_slot(AmfValue::ByteArray(Vec::new()));
        let bytes = self.reader.read_bytes(len as usize)?;
        *cell.borrow_mut() = AmfValue::ByteArray(bytes.to_vec());
        Ok(cell)
    }

    fn decode_vector(&mut self, marker: TypeMarker) -> Result<AmfCell> {
        let count = match self.reader.read_length()? {
            Length::Reference(index) => return self.object_reference(index),
            Length::Size(n) => n,
        };
        let fixed = self.reader.read_u8()? != 0;
        let cell = self.register_slot(match marker {
            TypeMarker::VectorInt => AmfValue::VectorInt {
                elements: Vec::new(),
                fixed,
            },
            TypeMarker::VectorUint => AmfValue::VectorUint {
                elements: Vec::new(),
                fixed,
            },
            TypeMarker::VectorDouble => AmfValue::VectorDouble {
                elements: Vec::new(),
                fixed,
            },
            _ => AmfValue::VectorObject {
                elements: Vec::new(),
                fixed,
            },
        });
        for _ in 0..count {
            match marker {
                TypeMarker::VectorInt => {
                    let element = self.reader.read_i32()?;
                    if let AmfValue::VectorInt { elements, .. } = &mut *cell.borrow_mut() {
                        elements.push(element);
                    }
                }
                TypeMarker::VectorUint => {
                    let element = self.reader.read_u32()?;
                    if let AmfValue::VectorUint { elements, .. } = &mut *cell.borrow_mut() {
                        elements.push(element);
                    }
                }
                TypeMarker::VectorDouble => {
                    let element = self.reader.read_f64()?;
                    if let AmfValue::VectorDouble { elements, .. } = &mut *cell.borrow_mut() {
                        elements.push(element);
                    }
                }
                _ => {
                    let element = self.decode()?;
                    if let AmfValue::VectorObject { elements, .. } = &mut *cell.borrow_mut() {
                        elements.push(element);
                    }
                }
            }
        }
        Ok(cell)
    }

    fn decode_dictionary(&mut self) -> Result<AmfCell> {
        let count = match self.reader.read_length()? {
            Length::Reference(index) => return self.object_reference(index),
            Length::Size(n) => n,
        };
        let weak_keys = self.reader.read_u8()? != 0;
        let cell = self.register_slot(AmfValue::Dictionary {
            entries: Vec::new(),
            weak_keys,
        });
        for _ in 0..count {
            let key = self.decode()?;
            let value = self.decode()?;
            if let AmfValue::Dictionary { entries, .. } = &mut *cell.borrow_mut() {
                entries.push((key, value));
            }
        }
        Ok(cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encoder::Amf3Encoder;
    use std::sync::Arc;

    fn decode_bytes(data: &[u8]) -> AmfCell {
        Amf3Decoder::new(Bytes::copy_from_slice(data))
            .decode()
            .unwrap()
    }

    fn roundtrip(value: AmfValue) -> AmfCell {
        let mut encoder = Amf3Encoder::new();
        encoder.encode_value(value).unwrap();
        Amf3Decoder::new(encoder.finish()).decode().unwrap()
    }

    #[test]
    fn test_decode_scalars() {
        assert_eq!(*decode_bytes(&[0x00]).borrow(), AmfValue::Undefined);
        assert_eq!(*decode_bytes(&[0x01]).borrow(), AmfValue::Null);
        assert_eq!(*decode_bytes(&[0x02]).borrow(), AmfValue::Boolean(false));
        assert_eq!(*decode_bytes(&[0x03]).borrow(), AmfValue::Boolean(true));
        assert_eq!(*decode_bytes(&[0x04, 0x05]).borrow(), AmfValue::Integer(5));
        assert_eq!(
            *decode_bytes(&[0x04, 0x81, 0x00]).borrow(),
            AmfValue::Integer(128)
        );
        assert_eq!(
            *decode_bytes(&[0x04, 0xFF, 0xFF, 0xFF, 0xFF]).borrow(),
            AmfValue::Integer(-1)
        );
        assert_eq!(
            *decode_bytes(&[0x05, 0x3F, 0xF8, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]).borrow(),
            AmfValue::Number(1.5)
        );
    }

    #[test]
    fn test_decode_string_with_reference() {
        let cell = decode_bytes(&[0x09, 0x05, 0x01, 0x06, 0x05, 0x61, 0x62, 0x06, 0x00]);
        let borrowed = cell.borrow();
        let elements = borrowed.as_array().unwrap();
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].borrow().as_str(), Some("ab"));
        assert_eq!(elements[1].borrow().as_str(), Some("ab"));
    }

    #[test]
    fn test_empty_string_never_references() {
        let mut decoder = Amf3Decoder::new(Bytes::copy_from_slice(&[0x06, 0x01, 0x06, 0x01]));
        assert_eq!(*decoder.decode().unwrap().borrow(), AmfValue::String(String::new()));
        assert_eq!(*decoder.decode().unwrap().borrow(), AmfValue::String(String::new()));

        // the table stayed empty, so any string reference is invalid
        let mut decoder = Amf3Decoder::new(Bytes::copy_from_slice(&[0x06, 0x01, 0x06, 0x00]));
        decoder.decode().unwrap();
        assert_eq!(decoder.decode(), Err(Error::InvalidReference(0)));
    }

    #[test]
    fn test_decode_anonymous_object() {
        let cell = decode_bytes(&[0x0A, 0x0B, 0x01, 0x03, 0x78, 0x04, 0x01, 0x01]);
        let borrowed = cell.borrow();
        let object = borrowed.as_object().unwrap();
        assert_eq!(object.class_name, None);
        assert!(object.dynamic);
        assert_eq!(object.dynamic_fields.len(), 1);
        assert_eq!(object.dynamic_fields[0].0, "x");
        assert_eq!(*object.dynamic_fields[0].1.borrow(), AmfValue::Integer(1));
    }

    #[test]
    fn test_decode_cyclic_object() {
        let cell = decode_bytes(&[
            0x0A, 0x0B, 0x01, 0x09, 0x73, 0x65, 0x6C, 0x66, 0x0A, 0x00, 0x01,
        ]);
        let inner = cell.borrow().get("self").unwrap();
        assert!(Rc::ptr_eq(&cell, &inner));
    }

    #[test]
    fn test_decode_object_identity() {
        let cell = decode_bytes(&[0x09, 0x05, 0x01, 0x0A, 0x0B, 0x01, 0x01, 0x0A, 0x02]);
        let borrowed = cell.borrow();
        let elements = borrowed.as_array().unwrap();
        assert!(Rc::ptr_eq(&elements[0], &elements[1]));
    }

    #[test]
    fn test_associative_part_skips_dense() {
        // dense length 1 is announced, but a named field is present, so the
        // dense part is never read
        let cell = decode_bytes(&[0x09, 0x03, 0x03, 0x6B, 0x04, 0x01, 0x01]);
        let borrowed = cell.borrow();
        match &*borrowed {
            AmfValue::EcmaArray(pairs) => {
                assert_eq!(pairs.len(), 1);
                assert_eq!(pairs[0].0, "k");
                assert_eq!(*pairs[0].1.borrow(), AmfValue::Integer(1));
            }
            other => panic!("Expected EcmaArray, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_typed_object_and_trait_reference() {
        let mut first = AmfObject::typed("com.Point");
        first.push_static("x", AmfValue::Integer(1).into_cell());
        let mut second = AmfObject::typed("com.Point");
        second.push_static("x", AmfValue::Integer(3).into_cell());

        let mut encoder = Amf3Encoder::new();
        encoder.encode_value(AmfValue::Object(first)).unwrap();
        encoder.encode_value(AmfValue::Object(second)).unwrap();

        let mut decoder = Amf3Decoder::new(encoder.finish());
        let values = decoder.decode_all().unwrap();
        assert_eq!(values.len(), 2);
        for (cell, expected) in values.iter().zip([1, 3]) {
            let borrowed = cell.borrow();
            let object = borrowed.as_object().unwrap();
            assert_eq!(object.class_name.as_deref(), Some("com.Point"));
            assert!(!object.dynamic);
            assert_eq!(object.static_fields[0].0, "x");
            assert_eq!(
                *object.static_fields[0].1.borrow(),
                AmfValue::Integer(expected)
            );
        }
    }

    #[test]
    fn test_decode_date() {
        let mut expected_bytes: Vec<u8> = vec![0x08, 0x01];
        expected_bytes.extend_from_slice(&1000.0f64.to_be_bytes());
        let cell = decode_bytes(&expected_bytes);
        assert_eq!(*cell.borrow(), AmfValue::Date(1000.0));
    }

    #[test]
    fn test_decode_byte_array() {
        let cell = decode_bytes(&[0x0C, 0x07, 0x01, 0x02, 0x03]);
        assert_eq!(cell.borrow().as_bytes(), Some(&[1u8, 2, 3][..]));
    }

    #[test]
    fn test_vector_roundtrips() {
        let decoded = roundtrip(AmfValue::VectorInt {
            elements: vec![1, -2, 3],
            fixed: true,
        });
        assert_eq!(
            *decoded.borrow(),
            AmfValue::VectorInt {
                elements: vec![1, -2, 3],
                fixed: true,
            }
        );

        let decoded = roundtrip(AmfValue::VectorUint {
            elements: vec![0, u32::MAX],
            fixed: false,
        });
        assert_eq!(
            *decoded.borrow(),
            AmfValue::VectorUint {
                elements: vec![0, u32::MAX],
                fixed: false,
            }
        );

        let decoded = roundtrip(AmfValue::VectorDouble {
            elements: vec![1.5, -0.25],
            fixed: false,
        });
        assert_eq!(
            *decoded.borrow(),
            AmfValue::VectorDouble {
                elements: vec![1.5, -0.25],
                fixed: false,
            }
        );

        let decoded = roundtrip(AmfValue::VectorObject {
            elements: vec![AmfValue::from("a").into_cell(), AmfValue::Null.into_cell()],
            fixed: false,
        });
        match &*decoded.borrow() {
            AmfValue::VectorObject { elements, fixed } => {
                assert!(!fixed);
                assert_eq!(elements.len(), 2);
                assert_eq!(elements[0].borrow().as_str(), Some("a"));
            }
            other => panic!("Expected VectorObject, got {:?}", other),
        };
    }

    #[test]
    fn test_dictionary_preserves_value_keys() {
        let entries = vec![
            (
                AmfValue::Integer(1).into_cell(),
                AmfValue::from("one").into_cell(),
            ),
            (
                AmfValue::from("two").into_cell(),
                AmfValue::Integer(2).into_cell(),
            ),
        ];
        let decoded = roundtrip(AmfValue::Dictionary {
            entries,
            weak_keys: true,
        });
        match &*decoded.borrow() {
            AmfValue::Dictionary { entries, weak_keys } => {
                assert!(weak_keys);
                assert_eq!(entries.len(), 2);
                assert_eq!(*entries[0].0.borrow(), AmfValue::Integer(1));
                assert_eq!(entries[1].0.borrow().as_str(), Some("two"));
            }
            other => panic!("Expected Dictionary, got {:?}", other),
        };
    }

    #[test]
    fn test_primitive_roundtrips() {
        for value in [
            AmfValue::Undefined,
            AmfValue::Null,
            AmfValue::Boolean(false),
            AmfValue::Boolean(true),
            AmfValue::Integer(0),
            AmfValue::Integer(crate::buffer::I29_MAX),
            AmfValue::Integer(crate::buffer::I29_MIN),
            AmfValue::Number(f64::INFINITY),
            AmfValue::Number(f64::NEG_INFINITY),
            AmfValue::Number(-0.0),
            AmfValue::String("héllo wörld".into()),
            AmfValue::String("x".repeat(4096)),
        ] {
            assert_eq!(*roundtrip(value.clone()).borrow(), value);
        }

        // NaN compares unequal; check the variant explicitly
        let decoded = roundtrip(AmfValue::Number(f64::NAN));
        match &*decoded.borrow() {
            AmfValue::Number(n) => assert!(n.is_nan()),
            other => panic!("Expected Number, got {:?}", other),
        };
    }

    #[test]
    fn test_unknown_marker() {
        let mut decoder = Amf3Decoder::new(Bytes::copy_from_slice(&[0x07]));
        assert_eq!(decoder.decode(), Err(Error::UnsupportedType(0x07)));
    }

    #[test]
    fn test_truncated_input() {
        let mut decoder = Amf3Decoder::new(Bytes::copy_from_slice(&[0x05, 0x3F, 0xF8]));
        assert_eq!(decoder.decode(), Err(Error::UnexpectedEnd));

        let mut decoder = Amf3Decoder::new(Bytes::copy_from_slice(&[0x06, 0x0B, 0x61]));
        assert_eq!(decoder.decode(), Err(Error::UnexpectedEnd));
    }

    #[test]
    fn test_invalid_object_reference() {
        let mut decoder = Amf3Decoder::new(Bytes::copy_from_slice(&[0x0A, 0x04]));
        assert_eq!(decoder.decode(), Err(Error::InvalidReference(2)));
    }

    #[test]
    fn test_invalid_trait_reference() {
        // inline value bit set, trait bit clear, trait index 1 on an empty table
        let mut decoder = Amf3Decoder::new(Bytes::copy_from_slice(&[0x0A, 0x05]));
        assert_eq!(decoder.decode(), Err(Error::InvalidReference(1)));
    }

    #[test]
    fn test_malformed_externalizable_trait() {
        // externalizable with a nonzero field count
        // header bits: inline(1) | ext(2) | count 1 << 3 = 0x0B, u29 = 0x17
        let mut decoder = Amf3Decoder::new(Bytes::copy_from_slice(&[0x0A, 0x17, 0x01]));
        assert_eq!(decoder.decode(), Err(Error::MalformedTrait));
    }

    #[test]
    fn test_unregistered_externalizable() {
        let mut bytes: Vec<u8> = vec![0x0A, 0x07];
        let name = b"test.decoder.NeverRegistered";
        bytes.push(((name.len() as u8) << 1) | 1);
        bytes.extend_from_slice(name);
        let mut decoder = Amf3Decoder::new(Bytes::copy_from_slice(&bytes));
        assert_eq!(
            decoder.decode(),
            Err(Error::UnregisteredExternalizable(
                "test.decoder.NeverRegistered".to_string()
            ))
        );
    }

    #[test]
    fn test_registered_externalizable_roundtrip() {
        let class = "test.decoder.Wrapped";
        registry::register_reader(class, Arc::new(|decoder: &mut Amf3Decoder| decoder.decode()));
        registry::register_writer(
            class,
            Arc::new(|encoder: &mut Amf3Encoder, object: &AmfObject| {
                let payload = object
                    .get("payload")
                    .ok_or(Error::UnsupportedValue("missing payload"))?;
                encoder.encode(&payload)
            }),
        );

        let mut object = AmfObject::typed(class);
        object.externalizable = true;
        object.push_static("payload", AmfValue::from("inner").into_cell());

        let decoded = roundtrip(AmfValue::Object(object));
        assert_eq!(decoded.borrow().as_str(), Some("inner"));
    }

    #[test]
    fn test_array_collection_unwraps() {
        // hand-built: externalizable object of class
        // flex.messaging.io.ArrayCollection wrapping a dense array [1]
        let mut bytes: Vec<u8> = vec![0x0A, 0x07];
        let name = flex::ARRAY_COLLECTION.as_bytes();
        bytes.push(((name.len() as u8) << 1) | 1);
        bytes.extend_from_slice(name);
        bytes.extend_from_slice(&[0x09, 0x03, 0x01, 0x04, 0x01]);

        let cell = decode_bytes(&bytes);
        let borrowed = cell.borrow();
        let elements = borrowed.as_array().unwrap();
        assert_eq!(elements.len(), 1);
        assert_eq!(*elements[0].borrow(), AmfValue::Integer(1));
    }

    #[test]
    fn test_decode_all() {
        let mut decoder =
            Amf3Decoder::new(Bytes::copy_from_slice(&[0x04, 0x01, 0x01, 0x03]));
        let values = decoder.decode_all().unwrap();
        assert_eq!(values.len(), 3);
        assert_eq!(*values[0].borrow(), AmfValue::Integer(1));
        assert_eq!(*values[1].borrow(), AmfValue::Null);
        assert_eq!(*values[2].borrow(), AmfValue::Boolean(true));
    }

    #[test]
    fn test_position_surface() {
        let mut decoder = Amf3Decoder::new(Bytes::copy_from_slice(&[0x04, 0x05, 0x01]));
        assert_eq!(decoder.position(), 0);
        assert_eq!(decoder.remaining(), 3);
        decoder.decode().unwrap();
        assert_eq!(decoder.position(), 2);
        assert_eq!(decoder.remaining(), 1);
        decoder.set_position(0);
        assert_eq!(*decoder.decode().unwrap().borrow(), AmfValue::Integer(5));
    }

    #[test]
    fn test_cyclic_roundtrip_through_encoder() {
        let cell = AmfValue::Object(AmfObject::anonymous()).into_cell();
        if let AmfValue::Object(object) = &mut *cell.borrow_mut() {
            object.push_dynamic("self", cell.clone());
        }
        let mut encoder = Amf3Encoder::new();
        encoder.encode(&cell).unwrap();
        let decoded = Amf3Decoder::new(encoder.finish()).decode().unwrap();
        let inner = decoded.borrow().get("self").unwrap();
        assert!(Rc::ptr_eq(&decoded, &inner));
    }

    #[test]
    fn test_cyclic_vector_object_roundtrip() {
        let cell = AmfValue::VectorObject {
            elements: Vec::new(),
            fixed: false,
        }
        .into_cell();
        if let AmfValue::VectorObject { elements, .. } = &mut *cell.borrow_mut() {
            elements.push(cell.clone());
        }
        let mut encoder = Amf3Encoder::new();
        encoder.encode(&cell).unwrap();
        let decoded = Amf3Decoder::new(encoder.finish()).decode().unwrap();
        let inner = match &*decoded.borrow() {
            AmfValue::VectorObject { elements, .. } => elements[0].clone(),
            other => panic!("Expected VectorObject, got {:?}", other),
        };
        assert!(Rc::ptr_eq(&decoded, &inner));
    }

    #[test]
    fn test_cyclic_dictionary_roundtrip() {
        let cell = AmfValue::Dictionary {
            entries: Vec::new(),
            weak_keys: false,
        }
        .into_cell();
        if let AmfValue::Dictionary { entries, .. } = &mut *cell.borrow_mut() {
            entries.push((AmfValue::from("self").into_cell(), cell.clone()));
        }
        let mut encoder = Amf3Encoder::new();
        encoder.encode(&cell).unwrap();
        let decoded = Amf3Decoder::new(encoder.finish()).decode().unwrap();
        let inner = match &*decoded.borrow() {
            AmfValue::Dictionary { entries, .. } => entries[0].1.clone(),
            other => panic!("Expected Dictionary, got {:?}", other),
        };
        assert!(Rc::ptr_eq(&decoded, &inner));
    }
}
