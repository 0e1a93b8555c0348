//! Wire-type inference
//!
//! Maps a host value onto the AMF3 wire type it will be emitted as. The
//! only non-obvious rule is the integer range: values outside the signed
//! 29-bit range cannot ride the INTEGER encoding and fall back to DOUBLE.
//! A `Forced` wrapper short-circuits inference with its declared marker and
//! is transparent afterwards.

use crate::buffer::{I29_MAX, I29_MIN};
use crate::codec::marker::TypeMarker;
use crate::error::{Error, Result};
use crate::value::{AmfCell, AmfValue};

/// Check whether an integer fits the 29-bit signed wire range
pub fn fits_i29(value: i32) -> bool {
    (I29_MIN..=I29_MAX).contains(&value)
}

/// Select the wire type for a value
pub fn wire_type(value: &AmfValue) -> Result<TypeMarker> {
    let marker = match value {
        AmfValue::Undefined => TypeMarker::Undefined,
        AmfValue::Null => TypeMarker::Null,
        AmfValue::Boolean(false) => TypeMarker::False,
        AmfValue::Boolean(true) => TypeMarker::True,
        AmfValue::Integer(i) if fits_i29(*i) => TypeMarker::Integer,
        AmfValue::Integer(_) => TypeMarker::Double,
        AmfValue::Number(_) => TypeMarker::Double,
        AmfValue::String(_) => TypeMarker::String,
        AmfValue::Date(_) => TypeMarker::Date,
        AmfValue::Array(_) | AmfValue::EcmaArray(_) => TypeMarker::Array,
        AmfValue::Object(_) => TypeMarker::Object,
        AmfValue::ByteArray(_) => TypeMarker::ByteArray,
        AmfValue::VectorInt { .. } => TypeMarker::VectorInt,
        AmfValue::VectorUint { .. } => TypeMarker::VectorUint,
        AmfValue::VectorDouble { .. } => TypeMarker::VectorDouble,
        AmfValue::VectorObject { .. } => TypeMarker::VectorObject,
        AmfValue::Dictionary { .. } => TypeMarker::Dictionary,
        AmfValue::Forced(marker, _) => forced_marker(*marker)?,
    };
    Ok(marker)
}

/// Validate a forced marker against the set the encoder can emit
///
/// Vector and dictionary markers cannot be forced; values of those shapes
/// still encode through normal inference.
pub fn forced_marker(marker: TypeMarker) -> Result<TypeMarker> {
    match marker {
        TypeMarker::VectorInt
        | TypeMarker::VectorUint
        | TypeMarker::VectorDouble
        | TypeMarker::VectorObject
        | TypeMarker::Dictionary => Err(Error::UnsupportedType(marker.to_byte())),
        other => Ok(other),
    }
}

/// Resolve a cell to the marker it encodes as and the cell that supplies
/// the body, unwrapping any chain of `Forced` wrappers (outermost wins)
pub fn resolve(cell: &AmfCell) -> Result<(TypeMarker, AmfCell)> {
    match &*cell.borrow() {
        AmfValue::Forced(marker, inner) => {
            let declared = forced_marker(*marker)?;
            let (_, innermost) = resolve(inner)?;
            Ok((declared, innermost))
        }
        value => Ok((wire_type(value)?, cell.clone())),
    }
}
