//! # lattix
//!
//! Typed schema model and validated expression-node framework for query
//! compilation layers.
//!
//! The crate has three pillars, layered bottom-up:
//!
//! - **Types and schemas** (`models`): a closed logical [`DataType`] enum
//!   with nullability, and [`Schema`], an immutable ordered column mapping
//!   whose name uniqueness is enforced by every constructor. Both convert to
//!   and from Apache Arrow and carry a compact binary wire format.
//! - **Validated nodes** (`nodes`): runtime-declared [`NodeType`]s with
//!   ordered, inheritable parameter signatures. Construction binds
//!   positional and keyword arguments, runs per-field validators in order
//!   with cross-field visibility, then an optional whole-node check. The
//!   resulting [`Node`] is immutable, hashable and cheap to clone.
//! - **Column conversion** (`conversions`): a process-wide registry of
//!   conversion functions keyed by (source Arrow type, target kind) with
//!   most-specific-first dispatch, and [`Schema::apply_to`] which coerces a
//!   `RecordBatch` onto a schema positionally.
//!
//! The `ops` module ships a standard catalog of operation node types (
//! literals, column references, map and array operations) built entirely on
//! the public declaration API.
//!
//! ## Example Usage
//!
//! ```rust
//! use lattix::{DataType, Schema};
//!
//! let schema = Schema::from_pairs(vec![
//!     ("id", DataType::int64().non_nullable()),
//!     ("name", DataType::string()),
//! ]).unwrap();
//!
//! assert_eq!(schema.field_type("id").unwrap(), &DataType::int64().non_nullable());
//! assert!(schema.is_superset(&schema));
//! ```

pub mod conversions;
pub mod errors;
pub mod models;
pub mod nodes;
pub mod ops;

// Re-export commonly used types at crate root
pub use conversions::{convert_column, register_conversion, SourcePattern, TypeTag};
pub use errors::{BindError, ConversionError, SchemaError};
pub use models::datatypes::{
    DataType, FromArrowType, ToArrowType, TypeKind, WireFormat, WireFormatError,
};
pub use models::schemas::{HasSchema, Schema};
pub use nodes::{
    lookup_node_type, BindContext, DefaultValue, FieldKind, FieldValue, Node, NodeType,
    Parameter, Signature, SignatureBuilder, Validator,
};
