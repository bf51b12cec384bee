//! Dynamic values carried by node fields.
//!
//! Node construction is dynamically typed at the binding surface: arguments
//! arrive as [`FieldValue`] and validators narrow them. The enum is closed
//! over everything a field can hold: scalars, logical types, schemas, child
//! nodes and lists of any of these.
//!
//! `FieldValue` implements full `Eq` and `Hash` so nodes can sit in maps and
//! sets. Floats compare and hash by bit pattern: `NaN == NaN` holds and
//! `0.0 != -0.0`, trading IEEE comparison semantics for identity semantics,
//! which is what node deduplication needs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::models::datatypes::DataType;
use crate::models::schemas::Schema;
use crate::nodes::annotable::Node;

/// A value bound to a node field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FieldValue {
    /// The absent value. Unbound optional parameters hold this.
    None,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    DataType(DataType),
    Schema(Schema),
    Node(Node),
    List(Vec<FieldValue>),
}

/// Discriminant-level classification of a [`FieldValue`], used by type
/// validators and mismatch errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    None,
    Boolean,
    Integer,
    Float,
    Text,
    DataType,
    Schema,
    Node,
    List,
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::None => FieldKind::None,
            FieldValue::Boolean(_) => FieldKind::Boolean,
            FieldValue::Integer(_) => FieldKind::Integer,
            FieldValue::Float(_) => FieldKind::Float,
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::DataType(_) => FieldKind::DataType,
            FieldValue::Schema(_) => FieldKind::Schema,
            FieldValue::Node(_) => FieldKind::Node,
            FieldValue::List(_) => FieldKind::List,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, FieldValue::None)
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            FieldValue::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            FieldValue::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_datatype(&self) -> Option<&DataType> {
        match self {
            FieldValue::DataType(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_schema(&self) -> Option<&Schema> {
        match self {
            FieldValue::Schema(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            FieldValue::Node(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FieldValue::None, FieldValue::None) => true,
            (FieldValue::Boolean(a), FieldValue::Boolean(b)) => a == b,
            (FieldValue::Integer(a), FieldValue::Integer(b)) => a == b,
            (FieldValue::Float(a), FieldValue::Float(b)) => a.to_bits() == b.to_bits(),
            (FieldValue::Text(a), FieldValue::Text(b)) => a == b,
            (FieldValue::DataType(a), FieldValue::DataType(b)) => a == b,
            (FieldValue::Schema(a), FieldValue::Schema(b)) => a == b,
            (FieldValue::Node(a), FieldValue::Node(b)) => a == b,
            (FieldValue::List(a), FieldValue::List(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for FieldValue {}

impl Hash for FieldValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            FieldValue::None => {}
            FieldValue::Boolean(value) => value.hash(state),
            FieldValue::Integer(value) => value.hash(state),
            FieldValue::Float(value) => value.to_bits().hash(state),
            FieldValue::Text(value) => value.hash(state),
            FieldValue::DataType(value) => value.hash(state),
            FieldValue::Schema(value) => value.hash(state),
            FieldValue::Node(value) => value.hash(state),
            FieldValue::List(items) => items.hash(state),
        }
    }
}

impl FieldKind {
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::None => "none",
            FieldKind::Boolean => "boolean",
            FieldKind::Integer => "integer",
            FieldKind::Float => "float",
            FieldKind::Text => "text",
            FieldKind::DataType => "datatype",
            FieldKind::Schema => "schema",
            FieldKind::Node => "node",
            FieldKind::List => "list",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<DataType> for FieldValue {
    fn from(value: DataType) -> Self {
        FieldValue::DataType(value)
    }
}

impl From<Schema> for FieldValue {
    fn from(value: Schema) -> Self {
        FieldValue::Schema(value)
    }
}

impl From<Node> for FieldValue {
    fn from(value: Node) -> Self {
        FieldValue::Node(value)
    }
}

impl From<Vec<FieldValue>> for FieldValue {
    fn from(items: Vec<FieldValue>) -> Self {
        FieldValue::List(items)
    }
}
