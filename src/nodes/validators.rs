//! Field validators and the binding context they run in.
//!
//! A [`Validator`] is a closed enum: the framework knows every validation
//! strategy it supports. Custom logic plugs in through [`Validator::Func`]
//! with a plain function pointer, so validators stay `Clone` and cheap to
//! store in signatures.
//!
//! Validation runs in declaration order. The [`BindContext`] handed to each
//! validator exposes the fields validated so far, which lets later fields be
//! checked against earlier ones (a column name against a schema, a stop index
//! against a start index).

use crate::errors::BindError;
use crate::nodes::field_value::{FieldKind, FieldValue};
use crate::nodes::signature::Signature;

/// A custom validation function. Receives the raw value and the context of
/// previously validated fields; returns the value to store, possibly
/// normalized. Errors pass through to the caller verbatim.
pub type ValidatorFn = fn(FieldValue, &BindContext) -> Result<FieldValue, BindError>;

/// Produces a fresh default value each time an optional parameter is left
/// unbound.
pub type DefaultFn = fn() -> FieldValue;

/// Validation strategy for a single parameter.
#[derive(Debug, Clone)]
pub enum Validator {
    /// Accepts any value unchanged.
    Any,
    /// Accepts values of exactly one [`FieldKind`].
    IsType(FieldKind),
    /// Delegates to a custom function.
    Func(ValidatorFn),
    /// Marks the parameter optional. When the bound value is absent the
    /// default is substituted; see [`DefaultValue`] for how.
    Optional {
        inner: Box<Validator>,
        default: DefaultValue,
    },
}

/// Default for an unbound optional parameter.
#[derive(Debug, Clone)]
pub enum DefaultValue {
    /// Stay absent: the field holds `FieldValue::None` and the inner
    /// validator is skipped entirely.
    None,
    /// A fixed value, cloned and then run through the inner validator.
    Literal(FieldValue),
    /// A function producing a fresh value, run through the inner validator.
    Producer(DefaultFn),
}

impl Validator {
    /// Optional parameter that stays absent when unbound.
    pub fn optional(inner: Validator) -> Self {
        Validator::Optional {
            inner: Box::new(inner),
            default: DefaultValue::None,
        }
    }

    /// Optional parameter with an explicit default.
    pub fn optional_with(inner: Validator, default: DefaultValue) -> Self {
        Validator::Optional {
            inner: Box::new(inner),
            default,
        }
    }

    /// A parameter has a default exactly when its validator is `Optional`.
    pub fn has_default(&self) -> bool {
        matches!(self, Validator::Optional { .. })
    }

    /// Validates `value` for the parameter `name`.
    pub fn apply(
        &self,
        name: &str,
        value: FieldValue,
        ctx: &BindContext<'_>,
    ) -> Result<FieldValue, BindError> {
        match self {
            Validator::Any => Ok(value),
            Validator::IsType(expected) => {
                let actual = value.kind();
                if actual == *expected {
                    Ok(value)
                } else {
                    Err(BindError::TypeMismatch {
                        parameter: name.to_string(),
                        expected: *expected,
                        actual,
                    })
                }
            }
            Validator::Func(func) => func(value, ctx),
            Validator::Optional { inner, default } => {
                if value.is_none() {
                    match default {
                        DefaultValue::None => Ok(FieldValue::None),
                        DefaultValue::Literal(literal) => {
                            inner.apply(name, literal.clone(), ctx)
                        }
                        DefaultValue::Producer(producer) => inner.apply(name, producer(), ctx),
                    }
                } else {
                    inner.apply(name, value, ctx)
                }
            }
        }
    }
}

/// Read access to the fields validated so far, plus the node type name for
/// error messages.
///
/// During field validation only earlier fields are visible; a whole-node
/// check after binding sees all of them.
pub struct BindContext<'a> {
    node_type: &'a str,
    signature: &'a Signature,
    values: &'a [FieldValue],
}

impl<'a> BindContext<'a> {
    pub(crate) fn new(node_type: &'a str, signature: &'a Signature, values: &'a [FieldValue]) -> Self {
        BindContext {
            node_type,
            signature,
            values,
        }
    }

    /// Name of the node type being constructed.
    pub fn node_type(&self) -> &str {
        self.node_type
    }

    /// Value of a previously validated field, or `None` when the field does
    /// not exist or has not been validated yet.
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        let position = self.signature.position(name)?;
        self.values.get(position)
    }
}
