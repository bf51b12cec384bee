//! Standard operation node catalog.
//!
//! Each operation is a registered [`NodeType`] declared once in a lazy
//! static. The catalog is deliberately layered: `VALUE` is the root every
//! expression-producing operation extends, `UNARY` adds the single `arg`
//! field the one-input collection operations share, and the concrete map and
//! array operations extend those.
//!
//! ```text
//! VALUE
//!  ├── LITERAL (value, dtype)
//!  ├── TABLE_COLUMN (schema, name)        whole-node: name must be in schema
//!  └── UNARY (arg)
//!       ├── MAP_LENGTH / MAP_KEYS / MAP_VALUES
//!       └── ARRAY_LENGTH
//! ```
//!
//! Nothing here is special-cased by the framework. The catalog is ordinary
//! registration-time declaration, and downstream crates extend it the same
//! way with their own `NodeType::builder` calls.

use once_cell::sync::Lazy;
use std::sync::Arc;

use crate::errors::BindError;
use crate::models::datatypes::DataType;
use crate::models::schemas::Schema;
use crate::nodes::{
    BindContext, DefaultValue, FieldKind, FieldValue, Node, NodeType, Validator,
};

fn column_in_schema(ctx: &BindContext) -> Result<(), BindError> {
    let schema = ctx.field("schema").and_then(FieldValue::as_schema);
    let name = ctx.field("name").and_then(FieldValue::as_text);
    match (schema, name) {
        (Some(schema), Some(name)) if !schema.contains(name) => Err(BindError::post_condition(
            ctx.node_type(),
            format!("column '{name}' is not in the schema"),
        )),
        _ => Ok(()),
    }
}

fn non_negative_times(value: FieldValue, _ctx: &BindContext) -> Result<FieldValue, BindError> {
    match value.as_integer() {
        Some(times) if times >= 0 => Ok(value),
        Some(times) => Err(BindError::validation(
            "times",
            format!("repeat count must be non-negative, got {times}"),
        )),
        None => Err(BindError::TypeMismatch {
            parameter: "times".to_string(),
            expected: FieldKind::Integer,
            actual: value.kind(),
        }),
    }
}

/// Root of every expression-producing operation.
pub static VALUE: Lazy<Arc<NodeType>> = Lazy::new(|| NodeType::builder("Value").build());

/// A constant with an explicit logical type.
pub static LITERAL: Lazy<Arc<NodeType>> = Lazy::new(|| {
    NodeType::builder("Literal")
        .extend(&VALUE)
        .field("value", Validator::Any)
        .field("dtype", Validator::IsType(FieldKind::DataType))
        .build()
});

/// A column reference into a schema. The whole-node check rejects names the
/// schema does not contain.
pub static TABLE_COLUMN: Lazy<Arc<NodeType>> = Lazy::new(|| {
    NodeType::builder("TableColumn")
        .extend(&VALUE)
        .field("schema", Validator::IsType(FieldKind::Schema))
        .field("name", Validator::IsType(FieldKind::Text))
        .post_validate(column_in_schema)
        .build()
});

/// Shared shape of the one-input operations.
pub static UNARY: Lazy<Arc<NodeType>> = Lazy::new(|| {
    NodeType::builder("Unary")
        .extend(&VALUE)
        .field("arg", Validator::IsType(FieldKind::Node))
        .build()
});

/// Number of entries in a map.
pub static MAP_LENGTH: Lazy<Arc<NodeType>> =
    Lazy::new(|| NodeType::builder("MapLength").extend(&UNARY).build());

/// The keys of a map as an array.
pub static MAP_KEYS: Lazy<Arc<NodeType>> =
    Lazy::new(|| NodeType::builder("MapKeys").extend(&UNARY).build());

/// The values of a map as an array.
pub static MAP_VALUES: Lazy<Arc<NodeType>> =
    Lazy::new(|| NodeType::builder("MapValues").extend(&UNARY).build());

/// Value stored under a key. Missing keys are the backend's problem.
pub static MAP_VALUE_FOR_KEY: Lazy<Arc<NodeType>> = Lazy::new(|| {
    NodeType::builder("MapValueForKey")
        .extend(&VALUE)
        .field("map", Validator::IsType(FieldKind::Node))
        .field("key", Validator::IsType(FieldKind::Node))
        .build()
});

/// Value stored under a key, falling back to a default expression when the
/// key is absent. The default is optional and stays absent when not given.
pub static MAP_VALUE_OR_DEFAULT_FOR_KEY: Lazy<Arc<NodeType>> = Lazy::new(|| {
    NodeType::builder("MapValueOrDefaultForKey")
        .extend(&VALUE)
        .field("map", Validator::IsType(FieldKind::Node))
        .field("key", Validator::IsType(FieldKind::Node))
        .optional(
            "default",
            Validator::IsType(FieldKind::Node),
            DefaultValue::None,
        )
        .build()
});

/// Concatenation of two maps. Later keys win.
pub static MAP_CONCAT: Lazy<Arc<NodeType>> = Lazy::new(|| {
    NodeType::builder("MapConcat")
        .extend(&VALUE)
        .field("left", Validator::IsType(FieldKind::Node))
        .field("right", Validator::IsType(FieldKind::Node))
        .build()
});

/// Number of elements in an array.
pub static ARRAY_LENGTH: Lazy<Arc<NodeType>> =
    Lazy::new(|| NodeType::builder("ArrayLength").extend(&UNARY).build());

/// Element at a zero-based index.
pub static ARRAY_INDEX: Lazy<Arc<NodeType>> = Lazy::new(|| {
    NodeType::builder("ArrayIndex")
        .extend(&VALUE)
        .field("array", Validator::IsType(FieldKind::Node))
        .field("index", Validator::IsType(FieldKind::Integer))
        .build()
});

/// Slice of an array. `start` defaults to 0; an absent `stop` means the end
/// of the array.
pub static ARRAY_SLICE: Lazy<Arc<NodeType>> = Lazy::new(|| {
    NodeType::builder("ArraySlice")
        .extend(&VALUE)
        .field("array", Validator::IsType(FieldKind::Node))
        .optional(
            "start",
            Validator::IsType(FieldKind::Integer),
            DefaultValue::Literal(FieldValue::Integer(0)),
        )
        .optional(
            "stop",
            Validator::IsType(FieldKind::Integer),
            DefaultValue::None,
        )
        .build()
});

/// Concatenation of two arrays.
pub static ARRAY_CONCAT: Lazy<Arc<NodeType>> = Lazy::new(|| {
    NodeType::builder("ArrayConcat")
        .extend(&VALUE)
        .field("left", Validator::IsType(FieldKind::Node))
        .field("right", Validator::IsType(FieldKind::Node))
        .build()
});

/// An array repeated a non-negative number of times.
pub static ARRAY_REPEAT: Lazy<Arc<NodeType>> = Lazy::new(|| {
    NodeType::builder("ArrayRepeat")
        .extend(&VALUE)
        .field("array", Validator::IsType(FieldKind::Node))
        .field("times", Validator::Func(non_negative_times))
        .build()
});

/// An array assembled from a list of element expressions.
pub static ARRAY_COLUMN: Lazy<Arc<NodeType>> = Lazy::new(|| {
    NodeType::builder("ArrayColumn")
        .extend(&VALUE)
        .field("items", Validator::IsType(FieldKind::List))
        .build()
});

/// Forces every catalog type to register. Deserializing stored nodes needs
/// their types present in the registry beforehand.
pub fn register_standard_ops() {
    let catalog: [&Lazy<Arc<NodeType>>; 16] = [
        &VALUE,
        &LITERAL,
        &TABLE_COLUMN,
        &UNARY,
        &MAP_LENGTH,
        &MAP_KEYS,
        &MAP_VALUES,
        &MAP_VALUE_FOR_KEY,
        &MAP_VALUE_OR_DEFAULT_FOR_KEY,
        &MAP_CONCAT,
        &ARRAY_LENGTH,
        &ARRAY_INDEX,
        &ARRAY_SLICE,
        &ARRAY_CONCAT,
        &ARRAY_REPEAT,
        &ARRAY_COLUMN,
    ];
    for node_type in catalog {
        Lazy::force(node_type);
    }
}

/// Constructs a literal node.
pub fn literal<V: Into<FieldValue>>(value: V, dtype: DataType) -> Result<Node, BindError> {
    LITERAL.construct(vec![value.into(), FieldValue::DataType(dtype)])
}

/// Constructs a column reference, checking the name against the schema.
pub fn table_column<S: Into<String>>(schema: Schema, name: S) -> Result<Node, BindError> {
    TABLE_COLUMN.construct(vec![
        FieldValue::Schema(schema),
        FieldValue::Text(name.into()),
    ])
}
