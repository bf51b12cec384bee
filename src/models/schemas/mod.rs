//! Schema models - ordered column collections over the logical type system.
//!
//! # Architecture
//!
//! ```text
//! Column pairs (names + DataTypes)
//!       ↓
//! Schema (validated, ordered, unique names)
//!       ↓
//! Arrow Schema / RecordBatch application
//! ```
//!
//! # Core Types
//!
//! - **`Schema`**: immutable ordered `name -> DataType` mapping with O(1)
//!   name lookup and construction-time uniqueness validation
//! - **`HasSchema`**: trait for values that carry a schema
//!
//! # Key Features
//!
//! - **Order-sensitive equality**, order-insensitive subset/superset checks
//! - **Bidirectional conversion**: `Schema ↔ Arrow Schema`
//! - **Binary persistence** through the shared wire format
//! - **Serde integrity**: deserialization re-runs construction validation
//!
//! # Related Modules
//!
//! - `crate::models::datatypes` - the logical types columns are made of
//! - `crate::conversions` - applying a schema to in-memory column data

pub mod schema;

pub use schema::{HasSchema, Schema};
