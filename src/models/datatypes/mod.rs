//! Logical type system - single source of truth for column types.
//!
//! # Architecture
//!
//! The type system provides bidirectional conversion between the logical
//! type representation and Apache Arrow's type system:
//!
//! ```text
//! DataType (TypeKind + nullability)
//!       ↕
//! Arrow DataType
//!       ↕
//! Physical column data (RecordBatch)
//! ```
//!
//! # Core Types
//!
//! - **`DataType`**: a [`TypeKind`] plus a nullability flag. Nullable by
//!   default; `[non-nullable]` is the rendered exception.
//! - **`TypeKind`**: closed enum of every logical kind
//!   - Primitive: Boolean, Int8..Int64, UInt8..UInt64, Float32, Float64
//!   - Parameterized: Decimal(precision, scale), Timestamp(timezone)
//!   - Variable-length: String, Binary
//!   - Temporal: Date, Time, Timestamp
//!   - Nested: Array(element), Map(key, value), Struct(fields)
//! - **`ToArrowType`** / **`FromArrowType`**: Arrow conversion trait pair
//! - **`WireFormat`**: compact tagged binary encoding
//!
//! # Type Mappings
//!
//! | DataType        | Arrow DataType                  | Display            |
//! |-----------------|---------------------------------|--------------------|
//! | boolean         | Boolean                         | `boolean`          |
//! | int64           | Int64                           | `int64`            |
//! | float64         | Float64                         | `float64`          |
//! | decimal(p, s)   | Decimal128(p, s)                | `decimal(p, s)`    |
//! | string          | Utf8                            | `string`           |
//! | date            | Date32                          | `date`             |
//! | time            | Time64(Microsecond)             | `time`             |
//! | timestamp('Z')  | Timestamp(Microsecond, Some)    | `timestamp('Z')`   |
//! | array<T>        | List(item: T)                   | `array<T>`         |
//! | map<K, V>       | Map(entries: {keys, values})    | `map<K, V>`        |
//! | struct<...>     | Struct(fields)                  | `struct<...>`      |
//!
//! # Related Modules
//!
//! - `crate::models::schemas` - ordered column collections over these types
//! - `crate::conversions` - column data coercion toward a target type
//! - `crate::nodes` - validated operation nodes carrying types as field values

pub mod arrow_conversion;
pub mod data_type;
pub mod wire_format;

pub use arrow_conversion::{ArrowConversionError, FromArrowType, ToArrowType};
pub use data_type::{DataType, TypeKind};
pub use wire_format::{WireFormat, WireFormatError};
