//! Node types, validated nodes and the process-wide type registry.
//!
//! A [`NodeType`] is a runtime value describing one kind of operation node:
//! its name, its parameter [`Signature`] and an optional whole-node check.
//! Node types are declared once, at module definition time, through
//! [`NodeType::builder`] and live in a global registry keyed by name. The
//! registry is what makes serialized nodes recoverable: a record stores the
//! type name, deserialization looks the type back up.
//!
//! A [`Node`] is an immutable, validated instance of a node type. The field
//! values behind it are shared through an `Arc`, so clones are cheap and
//! identical references short-circuit equality before any field comparison.
//!
//! ```text
//! NodeType::builder("ArraySlice")
//!     .extend(&ops::VALUE)
//!     .field("array", Validator::IsType(FieldKind::Node))
//!     .optional("start", ..., DefaultValue::Literal(0.into()))
//!     .build()
//!         ↓ construct(args)
//! Node { array: .., start: 0, stop: None }
//! ```

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use thiserror::Error;

use crate::errors::BindError;
use crate::nodes::field_value::FieldValue;
use crate::nodes::signature::{Signature, SignatureBuilder};
use crate::nodes::validators::{BindContext, DefaultValue, Validator};

/// Whole-node check run after every field has validated. Sees all fields
/// through the context.
pub type PostValidateFn = fn(&BindContext) -> Result<(), BindError>;

/// Errors raised when registering a node type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("node type '{0}' is already registered")]
    DuplicateNodeType(String),
}

static NODE_TYPES: Lazy<DashMap<String, Arc<NodeType>>> = Lazy::new(DashMap::new);

/// Looks up a registered node type by name.
pub fn lookup_node_type(name: &str) -> Option<Arc<NodeType>> {
    NODE_TYPES.get(name).map(|entry| Arc::clone(entry.value()))
}

/// A named, registered node type: signature plus optional whole-node check.
#[derive(Debug)]
pub struct NodeType {
    name: String,
    signature: Signature,
    post_validate: Option<PostValidateFn>,
}

impl NodeType {
    /// Starts declaring a node type with the given unique name.
    pub fn builder<S: Into<String>>(name: S) -> NodeTypeBuilder {
        NodeTypeBuilder {
            name: name.into(),
            signature: SignatureBuilder::new(),
            post_validate: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Constructs a node from positional arguments.
    pub fn construct(self: &Arc<Self>, args: Vec<FieldValue>) -> Result<Node, BindError> {
        self.construct_with(args, Vec::new())
    }

    /// Constructs a node from positional and keyword arguments.
    ///
    /// Binding happens first: every mandatory parameter must end up bound,
    /// optional ones fall back to their defaults. Validators then run in
    /// signature order, each seeing the already-validated prefix, and the
    /// whole-node check runs last. Any failure aborts construction; there is
    /// no partially built node.
    pub fn construct_with(
        self: &Arc<Self>,
        args: Vec<FieldValue>,
        kwargs: Vec<(String, FieldValue)>,
    ) -> Result<Node, BindError> {
        let raw = self.signature.bind(args, kwargs)?;

        let mut values: Vec<FieldValue> = Vec::with_capacity(raw.len());
        for (param, value) in self.signature.params().iter().zip(raw) {
            let ctx = BindContext::new(&self.name, &self.signature, &values);
            let validated = param.validator().apply(param.name(), value, &ctx)?;
            values.push(validated);
        }

        if let Some(check) = self.post_validate {
            let ctx = BindContext::new(&self.name, &self.signature, &values);
            check(&ctx)?;
        }

        Ok(Node {
            inner: Arc::new(NodeInner {
                node_type: Arc::clone(self),
                values,
            }),
        })
    }

    /// Rebuilds a node from a stored field record without re-running
    /// validators. The record must bind every parameter exactly once; order
    /// does not matter.
    ///
    /// Records come from [`Node::to_record`] on a node that already passed
    /// validation, so only structural integrity is checked here.
    pub fn restore(
        self: &Arc<Self>,
        record: Vec<(String, FieldValue)>,
    ) -> Result<Node, BindError> {
        let mut slots: Vec<Option<FieldValue>> = Vec::with_capacity(self.signature.len());
        slots.resize_with(self.signature.len(), || None);

        for (name, value) in record {
            let position = self
                .signature
                .position(&name)
                .ok_or_else(|| BindError::UnexpectedArgument { name: name.clone() })?;
            if slots[position].is_some() {
                return Err(BindError::DuplicateBinding { name });
            }
            slots[position] = Some(value);
        }

        let mut values = Vec::with_capacity(self.signature.len());
        for (param, slot) in self.signature.params().iter().zip(slots) {
            match slot {
                Some(value) => values.push(value),
                None => return Err(BindError::missing_argument(param.name())),
            }
        }
        Ok(self.adopt(values))
    }

    /// Wraps already-ordered field values without validation. Callers must
    /// have checked arity.
    fn adopt(self: &Arc<Self>, values: Vec<FieldValue>) -> Node {
        Node {
            inner: Arc::new(NodeInner {
                node_type: Arc::clone(self),
                values,
            }),
        }
    }

    fn adopt_checked(self: &Arc<Self>, values: Vec<FieldValue>) -> Result<Node, BindError> {
        if values.len() > self.signature.len() {
            return Err(BindError::TooManyArguments {
                expected: self.signature.len(),
                actual: values.len(),
            });
        }
        if values.len() < self.signature.len() {
            let first_missing = self.signature.params()[values.len()].name();
            return Err(BindError::missing_argument(first_missing));
        }
        Ok(self.adopt(values))
    }
}

/// Declares and registers a [`NodeType`].
pub struct NodeTypeBuilder {
    name: String,
    signature: SignatureBuilder,
    post_validate: Option<PostValidateFn>,
}

impl NodeTypeBuilder {
    /// Inherits the ancestor's parameters (and its whole-node check, when
    /// this builder has not set one). Later `field`/`optional` calls with an
    /// inherited name override the validator but keep the position.
    pub fn extend(mut self, ancestor: &NodeType) -> Self {
        self.signature = self.signature.inherit(ancestor.signature());
        if self.post_validate.is_none() {
            self.post_validate = ancestor.post_validate;
        }
        self
    }

    /// Declares a mandatory field.
    pub fn field<S: Into<String>>(mut self, name: S, validator: Validator) -> Self {
        self.signature = self.signature.param(name, validator);
        self
    }

    /// Declares an optional field with a default.
    pub fn optional<S: Into<String>>(
        mut self,
        name: S,
        inner: Validator,
        default: DefaultValue,
    ) -> Self {
        self.signature = self.signature.optional(name, inner, default);
        self
    }

    /// Sets the whole-node check, replacing an inherited one.
    pub fn post_validate(mut self, check: PostValidateFn) -> Self {
        self.post_validate = Some(check);
        self
    }

    /// Builds and registers the node type.
    ///
    /// # Panics
    ///
    /// Panics if the name is already registered. Use `try_build` for
    /// fallible registration.
    pub fn build(self) -> Arc<NodeType> {
        self.try_build().expect("Duplicate node type registration")
    }

    /// Builds and registers the node type, failing on a duplicate name.
    pub fn try_build(self) -> Result<Arc<NodeType>, RegistrationError> {
        let node_type = Arc::new(NodeType {
            name: self.name,
            signature: self.signature.build(),
            post_validate: self.post_validate,
        });
        match NODE_TYPES.entry(node_type.name.clone()) {
            Entry::Occupied(_) => Err(RegistrationError::DuplicateNodeType(
                node_type.name.clone(),
            )),
            Entry::Vacant(vacant) => {
                vacant.insert(Arc::clone(&node_type));
                log::debug!("registered node type {}", node_type.name);
                Ok(node_type)
            }
        }
    }
}

/// An immutable, validated operation node.
///
/// Cheap to clone: the payload sits behind an `Arc`. Equality is defined
/// over `(node type, field values)` with a reference-identity fast path, and
/// `Hash` is consistent with it, so nodes work as map keys and in dedup
/// sets.
#[derive(Debug, Clone)]
pub struct Node {
    inner: Arc<NodeInner>,
}

#[derive(Debug)]
struct NodeInner {
    node_type: Arc<NodeType>,
    values: Vec<FieldValue>,
}

impl Node {
    pub fn node_type(&self) -> &Arc<NodeType> {
        &self.inner.node_type
    }

    pub fn type_name(&self) -> &str {
        self.inner.node_type.name()
    }

    /// Field values in signature order.
    pub fn fields(&self) -> &[FieldValue] {
        &self.inner.values
    }

    /// Value of the named field.
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        let position = self.inner.node_type.signature().position(name)?;
        self.inner.values.get(position)
    }

    /// The node's fields as an ordered `(name, value)` record, suitable for
    /// persistence and for [`NodeType::restore`].
    pub fn to_record(&self) -> Vec<(String, FieldValue)> {
        self.inner
            .node_type
            .signature()
            .names()
            .map(str::to_string)
            .zip(self.inner.values.iter().cloned())
            .collect()
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        if Arc::ptr_eq(&self.inner, &other.inner) {
            return true;
        }
        Arc::ptr_eq(&self.inner.node_type, &other.inner.node_type)
            && self.inner.values == other.inner.values
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.node_type.name().hash(state);
        self.inner.values.hash(state);
    }
}

/// Serialized shape of a [`Node`]: type name plus field values in signature
/// order.
#[derive(Serialize)]
struct NodeRepr<'a> {
    node_type: &'a str,
    fields: &'a [FieldValue],
}

#[derive(Deserialize)]
struct NodeReprOwned {
    node_type: String,
    fields: Vec<FieldValue>,
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        NodeRepr {
            node_type: self.type_name(),
            fields: self.fields(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = NodeReprOwned::deserialize(deserializer)?;
        let node_type = lookup_node_type(&repr.node_type).ok_or_else(|| {
            D::Error::custom(format!("unknown node type '{}'", repr.node_type))
        })?;
        node_type
            .adopt_checked(repr.fields)
            .map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::field_value::FieldKind;
    use std::collections::HashSet;

    fn positive(value: FieldValue, _ctx: &BindContext) -> Result<FieldValue, BindError> {
        match value.as_integer() {
            Some(i) if i > 0 => Ok(value),
            _ => Err(BindError::validation("count", "must be a positive integer")),
        }
    }

    fn stop_after_start(ctx: &BindContext) -> Result<(), BindError> {
        let start = ctx.field("start").and_then(FieldValue::as_integer);
        let stop = ctx.field("stop").and_then(FieldValue::as_integer);
        if let (Some(start), Some(stop)) = (start, stop) {
            if stop < start {
                return Err(BindError::post_condition(
                    ctx.node_type(),
                    format!("stop {stop} precedes start {start}"),
                ));
            }
        }
        Ok(())
    }

    #[test]
    fn test_construct_and_field_access() {
        let window = NodeType::builder("TestWindow")
            .field("name", Validator::IsType(FieldKind::Text))
            .optional(
                "start",
                Validator::IsType(FieldKind::Integer),
                DefaultValue::Literal(FieldValue::from(0i64)),
            )
            .build();

        let node = window.construct(vec![FieldValue::from("w")]).unwrap();
        assert_eq!(node.type_name(), "TestWindow");
        assert_eq!(node.field("name"), Some(&FieldValue::from("w")));
        assert_eq!(node.field("start"), Some(&FieldValue::from(0i64)));
        assert_eq!(node.field("absent"), None);
    }

    #[test]
    fn test_construct_rejects_bad_field() {
        let counted = NodeType::builder("TestCounted")
            .field("count", Validator::Func(positive))
            .build();

        assert!(counted.construct(vec![FieldValue::from(3i64)]).is_ok());
        let err = counted
            .construct(vec![FieldValue::from(0i64)])
            .unwrap_err();
        assert_eq!(err, BindError::validation("count", "must be a positive integer"));
    }

    #[test]
    fn test_post_validate_runs_last() {
        let span = NodeType::builder("TestSpan")
            .field("start", Validator::IsType(FieldKind::Integer))
            .field("stop", Validator::IsType(FieldKind::Integer))
            .post_validate(stop_after_start)
            .build();

        assert!(span
            .construct(vec![FieldValue::from(1i64), FieldValue::from(5i64)])
            .is_ok());
        let err = span
            .construct(vec![FieldValue::from(5i64), FieldValue::from(1i64)])
            .unwrap_err();
        assert_eq!(
            err,
            BindError::post_condition("TestSpan", "stop 1 precedes start 5")
        );
    }

    #[test]
    fn test_extend_inherits_fields_and_check() {
        let base = NodeType::builder("TestSpanBase")
            .field("start", Validator::IsType(FieldKind::Integer))
            .field("stop", Validator::IsType(FieldKind::Integer))
            .post_validate(stop_after_start)
            .build();
        let derived = NodeType::builder("TestSpanDerived")
            .extend(&base)
            .field("label", Validator::IsType(FieldKind::Text))
            .build();

        let names: Vec<&str> = derived.signature().names().collect();
        assert_eq!(names, vec!["start", "stop", "label"]);

        // Inherited whole-node check still runs.
        let err = derived
            .construct(vec![
                FieldValue::from(5i64),
                FieldValue::from(1i64),
                FieldValue::from("x"),
            ])
            .unwrap_err();
        assert!(matches!(err, BindError::PostCondition { .. }));
    }

    #[test]
    fn test_equality_and_identity() {
        let pair = NodeType::builder("TestPair")
            .field("left", Validator::Any)
            .field("right", Validator::Any)
            .build();

        let a = pair
            .construct(vec![FieldValue::from(1i64), FieldValue::from(2i64)])
            .unwrap();
        let b = pair
            .construct(vec![FieldValue::from(1i64), FieldValue::from(2i64)])
            .unwrap();
        let c = pair
            .construct(vec![FieldValue::from(1i64), FieldValue::from(3i64)])
            .unwrap();

        // Clone shares the payload; equality short-circuits on identity.
        assert_eq!(a, a.clone());
        // Separately built nodes with equal fields are equal too.
        assert_eq!(a, b);
        assert_ne!(a, c);

        let mut set = HashSet::new();
        set.insert(a.clone());
        set.insert(b);
        set.insert(c);
        assert_eq!(set.len(), 2);
        assert!(set.contains(&a));
    }

    #[test]
    fn test_same_fields_different_type_not_equal() {
        let first = NodeType::builder("TestUnaryA")
            .field("arg", Validator::Any)
            .build();
        let second = NodeType::builder("TestUnaryB")
            .field("arg", Validator::Any)
            .build();

        let a = first.construct(vec![FieldValue::from(1i64)]).unwrap();
        let b = second.construct(vec![FieldValue::from(1i64)]).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_duplicate_registration() {
        let _first = NodeType::builder("TestDuplicate")
            .field("arg", Validator::Any)
            .build();
        let err = NodeType::builder("TestDuplicate")
            .field("arg", Validator::Any)
            .try_build()
            .unwrap_err();
        assert_eq!(
            err,
            RegistrationError::DuplicateNodeType("TestDuplicate".to_string())
        );
    }

    #[test]
    fn test_lookup_returns_registered_type() {
        let built = NodeType::builder("TestLookup")
            .field("arg", Validator::Any)
            .build();
        let found = lookup_node_type("TestLookup").unwrap();
        assert!(Arc::ptr_eq(&built, &found));
        assert!(lookup_node_type("TestNeverRegistered").is_none());
    }

    #[test]
    fn test_record_round_trip() {
        let labeled = NodeType::builder("TestLabeled")
            .field("value", Validator::IsType(FieldKind::Integer))
            .field("label", Validator::IsType(FieldKind::Text))
            .build();
        let node = labeled
            .construct(vec![FieldValue::from(7i64), FieldValue::from("seven")])
            .unwrap();

        let record = node.to_record();
        assert_eq!(record[0].0, "value");
        assert_eq!(record[1].0, "label");

        let restored = labeled.restore(record).unwrap();
        assert_eq!(restored, node);
    }

    #[test]
    fn test_restore_accepts_any_record_order() {
        let labeled = NodeType::builder("TestLabeledReorder")
            .field("value", Validator::Any)
            .field("label", Validator::Any)
            .build();
        let node = labeled
            .construct(vec![FieldValue::from(7i64), FieldValue::from("seven")])
            .unwrap();

        let mut record = node.to_record();
        record.reverse();
        assert_eq!(labeled.restore(record).unwrap(), node);
    }

    #[test]
    fn test_restore_rejects_wrong_names() {
        let single = NodeType::builder("TestSingle")
            .field("arg", Validator::Any)
            .build();

        let err = single
            .restore(vec![("other".to_string(), FieldValue::None)])
            .unwrap_err();
        assert!(matches!(err, BindError::UnexpectedArgument { .. }));

        let err = single.restore(vec![]).unwrap_err();
        assert_eq!(err, BindError::missing_argument("arg"));

        let err = single
            .restore(vec![
                ("arg".to_string(), FieldValue::None),
                ("arg".to_string(), FieldValue::None),
            ])
            .unwrap_err();
        assert!(matches!(err, BindError::DuplicateBinding { .. }));
    }

    #[test]
    fn test_restore_skips_validators() {
        let counted = NodeType::builder("TestCountedRestore")
            .field("count", Validator::Func(positive))
            .build();

        // Construction rejects the value, restore does not re-validate.
        assert!(counted.construct(vec![FieldValue::from(-5i64)]).is_err());
        let restored = counted
            .restore(vec![("count".to_string(), FieldValue::from(-5i64))])
            .unwrap();
        assert_eq!(restored.field("count"), Some(&FieldValue::from(-5i64)));
    }

    #[test]
    fn test_serde_round_trip_with_child() {
        let leaf = NodeType::builder("TestLeaf")
            .field("value", Validator::IsType(FieldKind::Integer))
            .build();
        let wrapper = NodeType::builder("TestWrapper")
            .field("child", Validator::IsType(FieldKind::Node))
            .build();

        let child = leaf.construct(vec![FieldValue::from(42i64)]).unwrap();
        let node = wrapper.construct(vec![FieldValue::from(child)]).unwrap();

        let json = serde_json::to_string(&node).unwrap();
        let back: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn test_deserialize_unknown_type_fails() {
        let json = r#"{"node_type":"TestNoSuchType","fields":[]}"#;
        let err = serde_json::from_str::<Node>(json).unwrap_err();
        assert!(err.to_string().contains("unknown node type"));
    }
}
