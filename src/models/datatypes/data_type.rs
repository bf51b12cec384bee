//! Logical data types for schema and expression construction.
//!
//! A [`DataType`] pairs a [`TypeKind`] with a nullability flag. The kind is a
//! closed enum: every logical type the system understands is a variant here,
//! and matches over it are exhaustive. Parameterized kinds (decimal, timestamp,
//! array, map, struct) carry their parameters in the variant itself, so two
//! types are interchangeable exactly when they compare equal.
//!
//! Nullability defaults to `true` everywhere. A non-nullable type is the
//! annotated exception, and rendering reflects that: `int64` vs
//! `int64[non-nullable]`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A logical type together with its nullability.
///
/// Construction goes through the factory methods (`DataType::int64()`,
/// `DataType::array(..)`, ...) which default to nullable. Use
/// [`DataType::with_nullable`] or [`DataType::non_nullable`] to flip the flag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataType {
    kind: TypeKind,
    nullable: bool,
}

/// The closed set of logical type kinds.
///
/// Nested kinds hold full [`DataType`] children so element nullability is
/// tracked independently of the container's own nullability.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
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
    /// Fixed-point decimal with explicit precision and scale.
    Decimal { precision: u8, scale: i8 },
    String,
    Binary,
    /// Calendar date without a time component.
    Date,
    /// Time of day with microsecond resolution.
    Time,
    /// Instant with microsecond resolution and an optional timezone name.
    Timestamp { timezone: Option<String> },
    /// Variable-length list of a single element type.
    Array(Box<DataType>),
    /// Key/value mapping. Keys are implicitly non-nullable.
    Map {
        key: Box<DataType>,
        value: Box<DataType>,
    },
    /// Ordered named fields.
    Struct(Vec<(String, DataType)>),
}

impl DataType {
    /// Creates a type from a kind, nullable by default.
    pub fn new(kind: TypeKind) -> Self {
        DataType {
            kind,
            nullable: true,
        }
    }

    pub fn boolean() -> Self {
        Self::new(TypeKind::Boolean)
    }

    pub fn int8() -> Self {
        Self::new(TypeKind::Int8)
    }

    pub fn int16() -> Self {
        Self::new(TypeKind::Int16)
    }

    pub fn int32() -> Self {
        Self::new(TypeKind::Int32)
    }

    pub fn int64() -> Self {
        Self::new(TypeKind::Int64)
    }

    pub fn uint8() -> Self {
        Self::new(TypeKind::UInt8)
    }

    pub fn uint16() -> Self {
        Self::new(TypeKind::UInt16)
    }

    pub fn uint32() -> Self {
        Self::new(TypeKind::UInt32)
    }

    pub fn uint64() -> Self {
        Self::new(TypeKind::UInt64)
    }

    pub fn float32() -> Self {
        Self::new(TypeKind::Float32)
    }

    pub fn float64() -> Self {
        Self::new(TypeKind::Float64)
    }

    /// Decimal with the given precision and scale. Precision bounds are
    /// enforced at the Arrow boundary, not here.
    pub fn decimal(precision: u8, scale: i8) -> Self {
        Self::new(TypeKind::Decimal { precision, scale })
    }

    pub fn string() -> Self {
        Self::new(TypeKind::String)
    }

    pub fn binary() -> Self {
        Self::new(TypeKind::Binary)
    }

    pub fn date() -> Self {
        Self::new(TypeKind::Date)
    }

    pub fn time() -> Self {
        Self::new(TypeKind::Time)
    }

    /// Timezone-naive timestamp.
    pub fn timestamp() -> Self {
        Self::new(TypeKind::Timestamp { timezone: None })
    }

    /// Timestamp carrying a timezone name such as `"UTC"`.
    pub fn timestamp_tz<S: Into<String>>(timezone: S) -> Self {
        Self::new(TypeKind::Timestamp {
            timezone: Some(timezone.into()),
        })
    }

    pub fn array(element: DataType) -> Self {
        Self::new(TypeKind::Array(Box::new(element)))
    }

    pub fn map(key: DataType, value: DataType) -> Self {
        Self::new(TypeKind::Map {
            key: Box::new(key),
            value: Box::new(value),
        })
    }

    pub fn struct_of<N: Into<String>>(fields: Vec<(N, DataType)>) -> Self {
        Self::new(TypeKind::Struct(
            fields
                .into_iter()
                .map(|(name, dtype)| (name.into(), dtype))
                .collect(),
        ))
    }

    /// Returns the same type with nullability set to `nullable`.
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Shorthand for `with_nullable(false)`.
    pub fn non_nullable(self) -> Self {
        self.with_nullable(false)
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    pub fn nullable(&self) -> bool {
        self.nullable
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self.kind, TypeKind::Boolean)
    }

    pub fn is_signed_integer(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::Int8 | TypeKind::Int16 | TypeKind::Int32 | TypeKind::Int64
        )
    }

    pub fn is_unsigned_integer(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::UInt8 | TypeKind::UInt16 | TypeKind::UInt32 | TypeKind::UInt64
        )
    }

    /// True for the signed and unsigned integer kinds.
    pub fn is_integer(&self) -> bool {
        self.is_signed_integer() || self.is_unsigned_integer()
    }

    pub fn is_floating(&self) -> bool {
        matches!(self.kind, TypeKind::Float32 | TypeKind::Float64)
    }

    pub fn is_decimal(&self) -> bool {
        matches!(self.kind, TypeKind::Decimal { .. })
    }

    /// Integers, floats and decimals.
    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_floating() || self.is_decimal()
    }

    pub fn is_string(&self) -> bool {
        matches!(self.kind, TypeKind::String)
    }

    pub fn is_binary(&self) -> bool {
        matches!(self.kind, TypeKind::Binary)
    }

    pub fn is_temporal(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::Date | TypeKind::Time | TypeKind::Timestamp { .. }
        )
    }

    pub fn is_timestamp(&self) -> bool {
        matches!(self.kind, TypeKind::Timestamp { .. })
    }

    pub fn is_array(&self) -> bool {
        matches!(self.kind, TypeKind::Array(_))
    }

    pub fn is_map(&self) -> bool {
        matches!(self.kind, TypeKind::Map { .. })
    }

    pub fn is_struct(&self) -> bool {
        matches!(self.kind, TypeKind::Struct(_))
    }

    /// True for the container kinds: array, map and struct.
    pub fn is_nested(&self) -> bool {
        self.is_array() || self.is_map() || self.is_struct()
    }

    /// True for every scalar kind, the complement of [`DataType::is_nested`].
    pub fn is_primitive(&self) -> bool {
        !self.is_nested()
    }

    /// Stable lowercase name of the kind, without parameters.
    pub fn kind_name(&self) -> &'static str {
        self.kind.name()
    }
}

impl TypeKind {
    /// Stable lowercase name of the kind, without parameters.
    pub fn name(&self) -> &'static str {
        match self {
            TypeKind::Boolean => "boolean",
            TypeKind::Int8 => "int8",
            TypeKind::Int16 => "int16",
            TypeKind::Int32 => "int32",
            TypeKind::Int64 => "int64",
            TypeKind::UInt8 => "uint8",
            TypeKind::UInt16 => "uint16",
            TypeKind::UInt32 => "uint32",
            TypeKind::UInt64 => "uint64",
            TypeKind::Float32 => "float32",
            TypeKind::Float64 => "float64",
            TypeKind::Decimal { .. } => "decimal",
            TypeKind::String => "string",
            TypeKind::Binary => "binary",
            TypeKind::Date => "date",
            TypeKind::Time => "time",
            TypeKind::Timestamp { .. } => "timestamp",
            TypeKind::Array(_) => "array",
            TypeKind::Map { .. } => "map",
            TypeKind::Struct(_) => "struct",
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeKind::Decimal { precision, scale } => {
                write!(f, "decimal({precision}, {scale})")
            }
            TypeKind::Timestamp { timezone: None } => write!(f, "timestamp"),
            TypeKind::Timestamp {
                timezone: Some(tz),
            } => write!(f, "timestamp('{tz}')"),
            TypeKind::Array(element) => write!(f, "array<{element}>"),
            TypeKind::Map { key, value } => write!(f, "map<{key}, {value}>"),
            TypeKind::Struct(fields) => {
                write!(f, "struct<")?;
                for (i, (name, dtype)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {dtype}")?;
                }
                write!(f, ">")
            }
            other => f.write_str(other.name()),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if !self.nullable {
            write!(f, "[non-nullable]")?;
        }
        Ok(())
    }
}
