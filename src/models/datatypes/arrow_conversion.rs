//! Conversion between logical types and Arrow types.
//!
//! The mapping is asymmetric by design. `to_arrow_type` is total except for
//! out-of-range decimals: every logical kind has exactly one Arrow rendering
//! (timestamps and times always use microsecond resolution, arrays become
//! `List`, strings become `Utf8`). `from_arrow_type` is partial: it accepts
//! the canonical renderings plus a few wider spellings (`LargeUtf8`,
//! `LargeList`, any timestamp unit) and rejects everything else with
//! [`ArrowConversionError::UnsupportedArrowType`].
//!
//! Nullability of nested children travels on the Arrow `Field`, so element
//! and value nullability survive a round trip. Map keys are always rendered
//! non-nullable, matching the Arrow convention.

use arrow_schema::{DataType as ArrowDataType, Field, Fields, TimeUnit};
use std::sync::Arc;
use thiserror::Error;

use super::data_type::{DataType, TypeKind};

/// Errors produced when translating between logical and Arrow types.
#[derive(Debug, Error)]
pub enum ArrowConversionError {
    #[error("unsupported arrow type: {0:?}")]
    UnsupportedArrowType(ArrowDataType),

    #[error("decimal precision {precision} with scale {scale} is out of range")]
    InvalidDecimal { precision: u8, scale: i8 },

    #[error("type conversion failed: {0}")]
    ConversionFailed(String),
}

/// Types that can be rendered as an Arrow [`ArrowDataType`].
pub trait ToArrowType {
    fn to_arrow_type(&self) -> Result<ArrowDataType, ArrowConversionError>;
}

/// Types that can be recovered from an Arrow [`ArrowDataType`].
pub trait FromArrowType: Sized {
    fn from_arrow_type(arrow_type: &ArrowDataType) -> Result<Self, ArrowConversionError>;
}

impl ToArrowType for DataType {
    fn to_arrow_type(&self) -> Result<ArrowDataType, ArrowConversionError> {
        match self.kind() {
            TypeKind::Boolean => Ok(ArrowDataType::Boolean),
            TypeKind::Int8 => Ok(ArrowDataType::Int8),
            TypeKind::Int16 => Ok(ArrowDataType::Int16),
            TypeKind::Int32 => Ok(ArrowDataType::Int32),
            TypeKind::Int64 => Ok(ArrowDataType::Int64),
            TypeKind::UInt8 => Ok(ArrowDataType::UInt8),
            TypeKind::UInt16 => Ok(ArrowDataType::UInt16),
            TypeKind::UInt32 => Ok(ArrowDataType::UInt32),
            TypeKind::UInt64 => Ok(ArrowDataType::UInt64),
            TypeKind::Float32 => Ok(ArrowDataType::Float32),
            TypeKind::Float64 => Ok(ArrowDataType::Float64),
            TypeKind::Decimal { precision, scale } => {
                validate_decimal(*precision, *scale)?;
                Ok(ArrowDataType::Decimal128(*precision, *scale))
            }
            TypeKind::String => Ok(ArrowDataType::Utf8),
            TypeKind::Binary => Ok(ArrowDataType::Binary),
            TypeKind::Date => Ok(ArrowDataType::Date32),
            TypeKind::Time => Ok(ArrowDataType::Time64(TimeUnit::Microsecond)),
            TypeKind::Timestamp { timezone } => Ok(ArrowDataType::Timestamp(
                TimeUnit::Microsecond,
                timezone.as_deref().map(Arc::from),
            )),
            TypeKind::Array(element) => Ok(ArrowDataType::List(Arc::new(Field::new(
                "item",
                element.to_arrow_type()?,
                element.nullable(),
            )))),
            TypeKind::Map { key, value } => {
                let entries = Fields::from(vec![
                    Field::new("keys", key.to_arrow_type()?, false),
                    Field::new("values", value.to_arrow_type()?, value.nullable()),
                ]);
                Ok(ArrowDataType::Map(
                    Arc::new(Field::new("entries", ArrowDataType::Struct(entries), false)),
                    false,
                ))
            }
            TypeKind::Struct(fields) => {
                let arrow_fields = fields
                    .iter()
                    .map(|(name, dtype)| {
                        Ok(Field::new(name, dtype.to_arrow_type()?, dtype.nullable()))
                    })
                    .collect::<Result<Vec<Field>, ArrowConversionError>>()?;
                Ok(ArrowDataType::Struct(Fields::from(arrow_fields)))
            }
        }
    }
}

impl FromArrowType for DataType {
    fn from_arrow_type(arrow_type: &ArrowDataType) -> Result<Self, ArrowConversionError> {
        match arrow_type {
            ArrowDataType::Boolean => Ok(DataType::boolean()),
            ArrowDataType::Int8 => Ok(DataType::int8()),
            ArrowDataType::Int16 => Ok(DataType::int16()),
            ArrowDataType::Int32 => Ok(DataType::int32()),
            ArrowDataType::Int64 => Ok(DataType::int64()),
            ArrowDataType::UInt8 => Ok(DataType::uint8()),
            ArrowDataType::UInt16 => Ok(DataType::uint16()),
            ArrowDataType::UInt32 => Ok(DataType::uint32()),
            ArrowDataType::UInt64 => Ok(DataType::uint64()),
            ArrowDataType::Float32 => Ok(DataType::float32()),
            ArrowDataType::Float64 => Ok(DataType::float64()),
            ArrowDataType::Decimal128(precision, scale) => {
                validate_decimal(*precision, *scale)?;
                Ok(DataType::decimal(*precision, *scale))
            }
            ArrowDataType::Utf8 | ArrowDataType::LargeUtf8 => Ok(DataType::string()),
            ArrowDataType::Binary | ArrowDataType::LargeBinary => Ok(DataType::binary()),
            ArrowDataType::Date32 | ArrowDataType::Date64 => Ok(DataType::date()),
            ArrowDataType::Time64(TimeUnit::Microsecond) => Ok(DataType::time()),
            // Resolution is not tracked on the logical side, so any unit maps
            // to the single timestamp kind.
            ArrowDataType::Timestamp(_, timezone) => Ok(match timezone {
                Some(tz) => DataType::timestamp_tz(tz.to_string()),
                None => DataType::timestamp(),
            }),
            ArrowDataType::List(field) | ArrowDataType::LargeList(field) => {
                let element = DataType::from_arrow_type(field.data_type())?
                    .with_nullable(field.is_nullable());
                Ok(DataType::array(element))
            }
            ArrowDataType::Map(entries, _) => match entries.data_type() {
                ArrowDataType::Struct(fields) if fields.len() == 2 => {
                    let key = DataType::from_arrow_type(fields[0].data_type())?;
                    let value = DataType::from_arrow_type(fields[1].data_type())?
                        .with_nullable(fields[1].is_nullable());
                    Ok(DataType::map(key, value))
                }
                other => Err(ArrowConversionError::ConversionFailed(format!(
                    "map entries must be a two-field struct, got {other:?}"
                ))),
            },
            ArrowDataType::Struct(fields) => {
                let pairs = fields
                    .iter()
                    .map(|field| {
                        let dtype = DataType::from_arrow_type(field.data_type())?
                            .with_nullable(field.is_nullable());
                        Ok((field.name().clone(), dtype))
                    })
                    .collect::<Result<Vec<(String, DataType)>, ArrowConversionError>>()?;
                Ok(DataType::struct_of(pairs))
            }
            other => Err(ArrowConversionError::UnsupportedArrowType(other.clone())),
        }
    }
}

fn validate_decimal(precision: u8, scale: i8) -> Result<(), ArrowConversionError> {
    if precision == 0 || precision > 38 || scale.unsigned_abs() > precision {
        return Err(ArrowConversionError::InvalidDecimal { precision, scale });
    }
    Ok(())
}
