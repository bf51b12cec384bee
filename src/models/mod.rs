//! Core data models: logical types and schemas.

pub mod datatypes;
pub mod schemas;

pub use datatypes::{DataType, FromArrowType, ToArrowType, TypeKind, WireFormat};
pub use schemas::{HasSchema, Schema};
