//! Shared error types for schema construction, node binding and column
//! conversion.
//!
//! Each surface gets its own enum so callers can match on the failures they
//! can actually handle: [`SchemaError`] for schema integrity and lookup,
//! [`BindError`] for argument binding and validation, [`ConversionError`] for
//! column data coercion. They nest through `#[from]` where one operation
//! drives another (applying a schema to data runs conversions underneath).

use arrow_schema::{ArrowError, DataType as ArrowDataType};
use thiserror::Error;

use crate::models::datatypes::{ArrowConversionError, DataType};
use crate::nodes::field_value::FieldKind;

/// Errors raised by schema construction and column lookup.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// Construction saw at least one column name more than once. Names are
    /// listed in first-seen order.
    #[error("duplicate column name(s): {}", .names.join(", "))]
    DuplicateColumnNames { names: Vec<String> },

    #[error("column '{name}' is not in the schema")]
    UnknownColumn { name: String },

    #[error("column index {index} is out of range for a schema with {len} column(s)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("schema has {names} name(s) but {types} type(s)")]
    NameTypeLengthMismatch { names: usize, types: usize },

    #[error("schema has {expected} column(s) but the data has {actual}")]
    ColumnCountMismatch { expected: usize, actual: usize },

    #[error("conversion error: {0}")]
    Conversion(#[from] ConversionError),

    #[error("arrow error: {0}")]
    Arrow(#[from] ArrowError),
}

impl SchemaError {
    /// Creates an UnknownColumn error for the given name.
    pub fn unknown_column<S: Into<String>>(name: S) -> Self {
        SchemaError::UnknownColumn { name: name.into() }
    }

    /// Creates a DuplicateColumnNames error, preserving the given order.
    pub fn duplicate_column_names(names: Vec<String>) -> Self {
        SchemaError::DuplicateColumnNames { names }
    }
}

impl From<ArrowConversionError> for SchemaError {
    fn from(err: ArrowConversionError) -> Self {
        SchemaError::Conversion(ConversionError::Target(err))
    }
}

/// Errors raised while binding and validating node arguments.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BindError {
    #[error("missing required argument '{name}'")]
    MissingArgument { name: String },

    #[error("unexpected keyword argument '{name}'")]
    UnexpectedArgument { name: String },

    #[error("argument '{name}' bound more than once")]
    DuplicateBinding { name: String },

    #[error("too many positional arguments: expected at most {expected}, got {actual}")]
    TooManyArguments { expected: usize, actual: usize },

    #[error("argument '{parameter}' must be {expected}, got {actual}")]
    TypeMismatch {
        parameter: String,
        expected: FieldKind,
        actual: FieldKind,
    },

    /// Produced by custom validator functions. The message is passed through
    /// verbatim.
    #[error("invalid argument '{parameter}': {message}")]
    Validation { parameter: String, message: String },

    /// Produced by a node type's whole-node check after all fields validated.
    #[error("invalid {node_type} node: {message}")]
    PostCondition { node_type: String, message: String },
}

impl BindError {
    /// Creates a MissingArgument error for the given parameter name.
    pub fn missing_argument<S: Into<String>>(name: S) -> Self {
        BindError::MissingArgument { name: name.into() }
    }

    /// Creates a Validation error for the given parameter.
    pub fn validation<S: Into<String>, M: Into<String>>(parameter: S, message: M) -> Self {
        BindError::Validation {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Creates a PostCondition error for the given node type.
    pub fn post_condition<S: Into<String>, M: Into<String>>(node_type: S, message: M) -> Self {
        BindError::PostCondition {
            node_type: node_type.into(),
            message: message.into(),
        }
    }
}

/// Errors raised while coercing column data toward a target type.
#[derive(Error, Debug)]
pub enum ConversionError {
    /// No conversion function is registered for this source/target pair.
    #[error("no conversion registered from {from} to {to}")]
    NoConversion { from: ArrowDataType, to: DataType },

    /// The target type cannot be rendered as an Arrow type.
    #[error("target type error: {0}")]
    Target(#[from] ArrowConversionError),

    #[error("arrow compute error: {0}")]
    Arrow(#[from] ArrowError),

    /// A cell-level parse failure inside a conversion function.
    #[error("cannot parse '{value}' as {to}")]
    InvalidValue { value: String, to: DataType },
}

impl ConversionError {
    /// Creates a NoConversion error for the given pair.
    pub fn no_conversion(from: ArrowDataType, to: DataType) -> Self {
        ConversionError::NoConversion { from, to }
    }
}
