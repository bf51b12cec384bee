//! Column conversion registry keyed by (source, target) type pairs.
//!
//! Conversions are plain functions looked up in a process-wide registry. The
//! key pairs a [`SourcePattern`] (an exact Arrow source type, or the `Any`
//! wildcard) with a [`TypeTag`] (the target's logical kind, parameters
//! stripped). Lookup tries the exact source first and falls back to the
//! wildcard, so a registered specific conversion always beats the generic
//! cast.
//!
//! The registry is populated once with a standard table: generic Arrow casts
//! for scalar, temporal, decimal and array targets, plus a lenient
//! string-to-boolean parser. Map and struct targets have no generic entry
//! and fail with `NoConversion` until someone registers one through
//! [`register_conversion`].

use arrow::array::{Array, ArrayRef, BooleanArray, StringArray};
use arrow::compute::{cast_with_options, CastOptions};
use arrow::util::display::FormatOptions;
use arrow_schema::DataType as ArrowDataType;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::sync::Arc;

use crate::errors::ConversionError;
use crate::models::datatypes::{DataType, ToArrowType, TypeKind};

/// Converts one column toward a target logical type. The target carries its
/// full parameters (precision, element type, nullability); the registry key
/// only sees its kind.
pub type ColumnConversionFn = fn(&ArrayRef, &DataType) -> Result<ArrayRef, ConversionError>;

/// Source side of a registry key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourcePattern {
    /// Matches columns with exactly this Arrow type.
    Exact(ArrowDataType),
    /// Matches any source. Consulted only when no exact entry exists.
    Any,
}

/// Target side of a registry key: a logical kind with parameters stripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Boolean,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Decimal,
    String,
    Binary,
    Date,
    Time,
    Timestamp,
    Array,
    Map,
    Struct,
}

impl TypeTag {
    pub fn of(kind: &TypeKind) -> TypeTag {
        match kind {
            TypeKind::Boolean => TypeTag::Boolean,
            TypeKind::Int8 => TypeTag::Int8,
            TypeKind::Int16 => TypeTag::Int16,
            TypeKind::Int32 => TypeTag::Int32,
            TypeKind::Int64 => TypeTag::Int64,
            TypeKind::UInt8 => TypeTag::UInt8,
            TypeKind::UInt16 => TypeTag::UInt16,
            TypeKind::UInt32 => TypeTag::UInt32,
            TypeKind::UInt64 => TypeTag::UInt64,
            TypeKind::Float32 => TypeTag::Float32,
            TypeKind::Float64 => TypeTag::Float64,
            TypeKind::Decimal { .. } => TypeTag::Decimal,
            TypeKind::String => TypeTag::String,
            TypeKind::Binary => TypeTag::Binary,
            TypeKind::Date => TypeTag::Date,
            TypeKind::Time => TypeTag::Time,
            TypeKind::Timestamp { .. } => TypeTag::Timestamp,
            TypeKind::Array(_) => TypeTag::Array,
            TypeKind::Map { .. } => TypeTag::Map,
            TypeKind::Struct(_) => TypeTag::Struct,
        }
    }
}

/// Targets the generic cast handles out of the box.
const CASTABLE_TAGS: [TypeTag; 17] = [
    TypeTag::Boolean,
    TypeTag::Int8,
    TypeTag::Int16,
    TypeTag::Int32,
    TypeTag::Int64,
    TypeTag::UInt8,
    TypeTag::UInt16,
    TypeTag::UInt32,
    TypeTag::UInt64,
    TypeTag::Float32,
    TypeTag::Float64,
    TypeTag::Decimal,
    TypeTag::String,
    TypeTag::Binary,
    TypeTag::Date,
    TypeTag::Time,
    TypeTag::Timestamp,
];

static CONVERSIONS: Lazy<DashMap<(SourcePattern, TypeTag), ColumnConversionFn>> =
    Lazy::new(|| {
        let registry = DashMap::new();
        for tag in CASTABLE_TAGS {
            registry.insert((SourcePattern::Any, tag), cast_to_target as ColumnConversionFn);
        }
        registry.insert(
            (SourcePattern::Any, TypeTag::Array),
            cast_to_target as ColumnConversionFn,
        );
        registry.insert(
            (SourcePattern::Exact(ArrowDataType::Utf8), TypeTag::Boolean),
            parse_utf8_boolean as ColumnConversionFn,
        );
        log::debug!("registered {} standard column conversions", registry.len());
        registry
    });

/// Registers (or replaces) a conversion for a source/target pair.
pub fn register_conversion(source: SourcePattern, target: TypeTag, conversion: ColumnConversionFn) {
    CONVERSIONS.insert((source, target), conversion);
}

/// Converts a column toward the target type.
///
/// Dispatch is most-specific-first: an entry for the column's exact Arrow
/// type wins over an `Any` entry. Pairs with no entry at all fail with
/// [`ConversionError::NoConversion`].
pub fn convert_column(column: &ArrayRef, target: &DataType) -> Result<ArrayRef, ConversionError> {
    let tag = TypeTag::of(target.kind());
    let exact_key = (SourcePattern::Exact(column.data_type().clone()), tag);
    if let Some(conversion) = CONVERSIONS.get(&exact_key).map(|entry| *entry.value()) {
        return conversion(column, target);
    }
    if let Some(conversion) = CONVERSIONS
        .get(&(SourcePattern::Any, tag))
        .map(|entry| *entry.value())
    {
        return conversion(column, target);
    }
    Err(ConversionError::no_conversion(
        column.data_type().clone(),
        target.clone(),
    ))
}

/// Generic conversion: render the target as an Arrow type and cast.
///
/// Runs with `safe: false` so unconvertible values fail the conversion
/// instead of turning into nulls.
fn cast_to_target(column: &ArrayRef, target: &DataType) -> Result<ArrayRef, ConversionError> {
    let arrow_type = target.to_arrow_type()?;
    if column.data_type() == &arrow_type {
        return Ok(Arc::clone(column));
    }
    let options = CastOptions {
        safe: false,
        format_options: FormatOptions::default(),
    };
    Ok(cast_with_options(column, &arrow_type, &options)?)
}

/// String-to-boolean parser, more lenient than the Arrow cast: trims
/// whitespace and accepts y/n style spellings. Nulls stay null; anything
/// unparseable is an error rather than a silent null.
fn parse_utf8_boolean(column: &ArrayRef, target: &DataType) -> Result<ArrayRef, ConversionError> {
    let strings = column
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| {
            ConversionError::no_conversion(column.data_type().clone(), target.clone())
        })?;

    let mut values: Vec<Option<bool>> = Vec::with_capacity(strings.len());
    for i in 0..strings.len() {
        if strings.is_null(i) {
            values.push(None);
            continue;
        }
        let text = strings.value(i);
        match text.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "yes" | "y" | "1" => values.push(Some(true)),
            "false" | "f" | "no" | "n" | "0" => values.push(Some(false)),
            _ => {
                return Err(ConversionError::InvalidValue {
                    value: text.to_string(),
                    to: target.clone(),
                })
            }
        }
    }
    Ok(Arc::new(BooleanArray::from(values)))
}
