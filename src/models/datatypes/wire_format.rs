//! Wire format encoding/decoding for logical types.
//!
//! Format: one tag byte per type, with the high bit marking non-nullable,
//! followed by a kind-specific payload:
//!
//! - decimal: `[precision u8][scale i8]`
//! - timestamp: `[has_tz u8]` then `[len u16 LE][utf8]` when a timezone is set
//! - array: the element type, recursively
//! - map: the key type then the value type
//! - struct: `[field count u16 LE]` then per field `[name len u16 LE][utf8][type]`
//!
//! Primitive kinds are a single byte. Schemas reuse the struct field layout
//! through the crate-internal string helpers below.

use std::io::{Read, Write};
use thiserror::Error;

use super::data_type::{DataType, TypeKind};

const TAG_BOOLEAN: u8 = 0x01;
const TAG_INT8: u8 = 0x02;
const TAG_INT16: u8 = 0x03;
const TAG_INT32: u8 = 0x04;
const TAG_INT64: u8 = 0x05;
const TAG_UINT8: u8 = 0x06;
const TAG_UINT16: u8 = 0x07;
const TAG_UINT32: u8 = 0x08;
const TAG_UINT64: u8 = 0x09;
const TAG_FLOAT32: u8 = 0x0A;
const TAG_FLOAT64: u8 = 0x0B;
const TAG_DECIMAL: u8 = 0x0C;
const TAG_STRING: u8 = 0x0D;
const TAG_BINARY: u8 = 0x0E;
const TAG_DATE: u8 = 0x0F;
const TAG_TIME: u8 = 0x10;
const TAG_TIMESTAMP: u8 = 0x11;
const TAG_ARRAY: u8 = 0x12;
const TAG_MAP: u8 = 0x13;
const TAG_STRUCT: u8 = 0x14;

/// High bit of the tag byte. Set when the type is non-nullable.
const FLAG_NON_NULLABLE: u8 = 0x80;
const TAG_MASK: u8 = 0x7F;

#[derive(Error, Debug)]
pub enum WireFormatError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid type tag: {0:#x}")]
    InvalidTag(u8),

    #[error("Length {0} does not fit the wire format")]
    InvalidLength(usize),

    #[error("Invalid UTF-8 in encoded name")]
    InvalidUtf8,

    #[error("Decoded value is invalid: {0}")]
    InvalidValue(String),

    #[error("Unexpected end of data")]
    UnexpectedEof,
}

/// Trait for types that can be serialized to wire format
pub trait WireFormat: Sized {
    /// Encode this type to wire format
    fn encode<W: Write>(&self, writer: &mut W) -> Result<(), WireFormatError>;

    /// Decode this type from wire format
    fn decode<R: Read>(reader: &mut R) -> Result<Self, WireFormatError>;

    /// Exact encoded size in bytes
    fn encoded_size(&self) -> usize;
}

impl WireFormat for DataType {
    fn encode<W: Write>(&self, writer: &mut W) -> Result<(), WireFormatError> {
        let mut tag = kind_tag(self.kind());
        if !self.nullable() {
            tag |= FLAG_NON_NULLABLE;
        }
        writer.write_all(&[tag])?;

        match self.kind() {
            TypeKind::Decimal { precision, scale } => {
                writer.write_all(&[*precision, *scale as u8])?;
            }
            TypeKind::Timestamp { timezone } => match timezone {
                Some(tz) => {
                    writer.write_all(&[1])?;
                    write_name(writer, tz)?;
                }
                None => writer.write_all(&[0])?,
            },
            TypeKind::Array(element) => element.encode(writer)?,
            TypeKind::Map { key, value } => {
                key.encode(writer)?;
                value.encode(writer)?;
            }
            TypeKind::Struct(fields) => {
                let count = u16::try_from(fields.len())
                    .map_err(|_| WireFormatError::InvalidLength(fields.len()))?;
                writer.write_all(&count.to_le_bytes())?;
                for (name, dtype) in fields {
                    write_name(writer, name)?;
                    dtype.encode(writer)?;
                }
            }
            _ => {}
        }

        Ok(())
    }

    fn decode<R: Read>(reader: &mut R) -> Result<Self, WireFormatError> {
        let mut tag_buf = [0u8; 1];
        reader
            .read_exact(&mut tag_buf)
            .map_err(|_| WireFormatError::UnexpectedEof)?;
        let nullable = tag_buf[0] & FLAG_NON_NULLABLE == 0;
        let tag = tag_buf[0] & TAG_MASK;

        let kind = match tag {
            TAG_BOOLEAN => TypeKind::Boolean,
            TAG_INT8 => TypeKind::Int8,
            TAG_INT16 => TypeKind::Int16,
            TAG_INT32 => TypeKind::Int32,
            TAG_INT64 => TypeKind::Int64,
            TAG_UINT8 => TypeKind::UInt8,
            TAG_UINT16 => TypeKind::UInt16,
            TAG_UINT32 => TypeKind::UInt32,
            TAG_UINT64 => TypeKind::UInt64,
            TAG_FLOAT32 => TypeKind::Float32,
            TAG_FLOAT64 => TypeKind::Float64,
            TAG_DECIMAL => {
                let mut buf = [0u8; 2];
                reader
                    .read_exact(&mut buf)
                    .map_err(|_| WireFormatError::UnexpectedEof)?;
                TypeKind::Decimal {
                    precision: buf[0],
                    scale: buf[1] as i8,
                }
            }
            TAG_STRING => TypeKind::String,
            TAG_BINARY => TypeKind::Binary,
            TAG_DATE => TypeKind::Date,
            TAG_TIME => TypeKind::Time,
            TAG_TIMESTAMP => {
                let mut flag = [0u8; 1];
                reader
                    .read_exact(&mut flag)
                    .map_err(|_| WireFormatError::UnexpectedEof)?;
                let timezone = if flag[0] == 0 {
                    None
                } else {
                    Some(read_name(reader)?)
                };
                TypeKind::Timestamp { timezone }
            }
            TAG_ARRAY => TypeKind::Array(Box::new(DataType::decode(reader)?)),
            TAG_MAP => {
                let key = DataType::decode(reader)?;
                let value = DataType::decode(reader)?;
                TypeKind::Map {
                    key: Box::new(key),
                    value: Box::new(value),
                }
            }
            TAG_STRUCT => {
                let mut count_buf = [0u8; 2];
                reader
                    .read_exact(&mut count_buf)
                    .map_err(|_| WireFormatError::UnexpectedEof)?;
                let count = u16::from_le_bytes(count_buf);
                let mut fields = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    let name = read_name(reader)?;
                    let dtype = DataType::decode(reader)?;
                    fields.push((name, dtype));
                }
                TypeKind::Struct(fields)
            }
            other => return Err(WireFormatError::InvalidTag(other)),
        };

        Ok(DataType::new(kind).with_nullable(nullable))
    }

    fn encoded_size(&self) -> usize {
        1 + match self.kind() {
            TypeKind::Decimal { .. } => 2,
            TypeKind::Timestamp { timezone } => {
                1 + timezone.as_ref().map_or(0, |tz| 2 + tz.len())
            }
            TypeKind::Array(element) => element.encoded_size(),
            TypeKind::Map { key, value } => key.encoded_size() + value.encoded_size(),
            TypeKind::Struct(fields) => {
                2 + fields
                    .iter()
                    .map(|(name, dtype)| 2 + name.len() + dtype.encoded_size())
                    .sum::<usize>()
            }
            _ => 0,
        }
    }
}

/// Tag byte for a kind, without the nullability flag. Inverse of the tag
/// match in [`WireFormat::decode`].
fn kind_tag(kind: &TypeKind) -> u8 {
    match kind {
        TypeKind::Boolean => TAG_BOOLEAN,
        TypeKind::Int8 => TAG_INT8,
        TypeKind::Int16 => TAG_INT16,
        TypeKind::Int32 => TAG_INT32,
        TypeKind::Int64 => TAG_INT64,
        TypeKind::UInt8 => TAG_UINT8,
        TypeKind::UInt16 => TAG_UINT16,
        TypeKind::UInt32 => TAG_UINT32,
        TypeKind::UInt64 => TAG_UINT64,
        TypeKind::Float32 => TAG_FLOAT32,
        TypeKind::Float64 => TAG_FLOAT64,
        TypeKind::Decimal { .. } => TAG_DECIMAL,
        TypeKind::String => TAG_STRING,
        TypeKind::Binary => TAG_BINARY,
        TypeKind::Date => TAG_DATE,
        TypeKind::Time => TAG_TIME,
        TypeKind::Timestamp { .. } => TAG_TIMESTAMP,
        TypeKind::Array(_) => TAG_ARRAY,
        TypeKind::Map { .. } => TAG_MAP,
        TypeKind::Struct(_) => TAG_STRUCT,
    }
}

/// Writes a length-prefixed UTF-8 string. Shared with the schema encoding.
pub(crate) fn write_name<W: Write>(writer: &mut W, name: &str) -> Result<(), WireFormatError> {
    let len =
        u16::try_from(name.len()).map_err(|_| WireFormatError::InvalidLength(name.len()))?;
    writer.write_all(&len.to_le_bytes())?;
    writer.write_all(name.as_bytes())?;
    Ok(())
}

/// Reads a length-prefixed UTF-8 string. Shared with the schema encoding.
pub(crate) fn read_name<R: Read>(reader: &mut R) -> Result<String, WireFormatError> {
    let mut len_buf = [0u8; 2];
    reader
        .read_exact(&mut len_buf)
        .map_err(|_| WireFormatError::UnexpectedEof)?;
    let len = u16::from_le_bytes(len_buf) as usize;
    let mut bytes = vec![0u8; len];
    reader
        .read_exact(&mut bytes)
        .map_err(|_| WireFormatError::UnexpectedEof)?;
    String::from_utf8(bytes).map_err(|_| WireFormatError::InvalidUtf8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_primitive_round_trip() {
        let types = vec![
            DataType::boolean(),
            DataType::int8(),
            DataType::int16(),
            DataType::int32(),
            DataType::int64(),
            DataType::uint8(),
            DataType::uint64(),
            DataType::float32(),
            DataType::float64(),
            DataType::string(),
            DataType::binary(),
            DataType::date(),
            DataType::time(),
        ];

        for original in types {
            let mut buffer = Vec::new();
            original.encode(&mut buffer).unwrap();
            assert_eq!(buffer.len(), original.encoded_size());

            let mut cursor = Cursor::new(buffer);
            let decoded = DataType::decode(&mut cursor).unwrap();
            assert_eq!(original, decoded);
        }
    }

    #[test]
    fn test_nullability_travels_in_tag() {
        let original = DataType::int64().non_nullable();
        let mut buffer = Vec::new();
        original.encode(&mut buffer).unwrap();
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer[0] & FLAG_NON_NULLABLE, FLAG_NON_NULLABLE);

        let mut cursor = Cursor::new(buffer);
        let decoded = DataType::decode(&mut cursor).unwrap();
        assert_eq!(original, decoded);
        assert!(!decoded.nullable());
    }

    #[test]
    fn test_decimal_round_trip() {
        let original = DataType::decimal(38, 10);
        let mut buffer = Vec::new();
        original.encode(&mut buffer).unwrap();
        assert_eq!(buffer.len(), 3);

        let mut cursor = Cursor::new(buffer);
        assert_eq!(DataType::decode(&mut cursor).unwrap(), original);
    }

    #[test]
    fn test_timestamp_round_trip() {
        for original in [DataType::timestamp(), DataType::timestamp_tz("America/New_York")] {
            let mut buffer = Vec::new();
            original.encode(&mut buffer).unwrap();
            assert_eq!(buffer.len(), original.encoded_size());

            let mut cursor = Cursor::new(buffer);
            assert_eq!(DataType::decode(&mut cursor).unwrap(), original);
        }
    }

    #[test]
    fn test_nested_round_trip() {
        let original = DataType::struct_of(vec![
            ("id", DataType::int64().non_nullable()),
            ("tags", DataType::array(DataType::string())),
            (
                "metrics",
                DataType::map(DataType::string(), DataType::decimal(18, 4)),
            ),
        ]);
        let mut buffer = Vec::new();
        original.encode(&mut buffer).unwrap();
        assert_eq!(buffer.len(), original.encoded_size());

        let mut cursor = Cursor::new(buffer);
        assert_eq!(DataType::decode(&mut cursor).unwrap(), original);
    }

    #[test]
    fn test_invalid_tag() {
        let buffer = vec![0x7F];
        let mut cursor = Cursor::new(buffer);
        assert!(matches!(
            DataType::decode(&mut cursor),
            Err(WireFormatError::InvalidTag(0x7F))
        ));
    }

    #[test]
    fn test_truncated_input() {
        let mut buffer = Vec::new();
        DataType::decimal(10, 2).encode(&mut buffer).unwrap();
        buffer.truncate(2);

        let mut cursor = Cursor::new(buffer);
        assert!(matches!(
            DataType::decode(&mut cursor),
            Err(WireFormatError::UnexpectedEof)
        ));
    }
}
