//! Parameter signatures and argument binding.
//!
//! A [`Signature`] is the ordered list of named parameters a node type
//! accepts. Signatures are assembled once, at type definition time, through
//! [`SignatureBuilder`]: inherit the parameters of ancestor signatures, add
//! or override your own, then `build()`.
//!
//! Two ordering rules, both inherited from how parameter merging behaves in
//! practice:
//!
//! - overriding an inherited parameter keeps its first-seen position, it is
//!   not moved to the end;
//! - `build()` stably partitions parameters so every mandatory one precedes
//!   every optional one, which keeps positional binding callable when an
//!   ancestor declared optional parameters before a descendant's mandatory
//!   ones.

use std::collections::HashMap;

use crate::errors::BindError;
use crate::nodes::field_value::FieldValue;
use crate::nodes::validators::{DefaultValue, Validator};

/// A named parameter with its validation strategy.
#[derive(Debug, Clone)]
pub struct Parameter {
    name: String,
    validator: Validator,
}

impl Parameter {
    pub fn new<S: Into<String>>(name: S, validator: Validator) -> Self {
        Parameter {
            name: name.into(),
            validator,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// A parameter is optional exactly when its validator is `Optional`.
    pub fn has_default(&self) -> bool {
        self.validator.has_default()
    }
}

/// An immutable, ordered parameter list with O(1) name lookup.
#[derive(Debug, Clone)]
pub struct Signature {
    params: Vec<Parameter>,
    positions: HashMap<String, usize>,
}

impl Signature {
    fn from_params(params: Vec<Parameter>) -> Self {
        let positions = params
            .iter()
            .enumerate()
            .map(|(i, p)| (p.name().to_string(), i))
            .collect();
        Signature { params, positions }
    }

    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    /// Parameter names in signature order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(Parameter::name)
    }

    /// Binds positional and keyword arguments to parameter slots.
    ///
    /// Returns raw values in signature order. Unbound optional parameters
    /// hold [`FieldValue::None`]; defaults are substituted later, during
    /// validation. Unbound mandatory parameters, unknown keywords, double
    /// bindings and positional overflow are errors.
    pub fn bind(
        &self,
        args: Vec<FieldValue>,
        kwargs: Vec<(String, FieldValue)>,
    ) -> Result<Vec<FieldValue>, BindError> {
        if args.len() > self.params.len() {
            return Err(BindError::TooManyArguments {
                expected: self.params.len(),
                actual: args.len(),
            });
        }

        let mut slots: Vec<Option<FieldValue>> = Vec::with_capacity(self.params.len());
        slots.resize_with(self.params.len(), || None);
        for (position, value) in args.into_iter().enumerate() {
            slots[position] = Some(value);
        }

        for (name, value) in kwargs {
            let position = self
                .position(&name)
                .ok_or_else(|| BindError::UnexpectedArgument { name: name.clone() })?;
            if slots[position].is_some() {
                return Err(BindError::DuplicateBinding { name });
            }
            slots[position] = Some(value);
        }

        let mut bound = Vec::with_capacity(self.params.len());
        for (param, slot) in self.params.iter().zip(slots) {
            match slot {
                Some(value) => bound.push(value),
                None if param.has_default() => bound.push(FieldValue::None),
                None => return Err(BindError::missing_argument(param.name())),
            }
        }
        Ok(bound)
    }
}

/// Assembles a [`Signature`] at type definition time.
#[derive(Debug, Clone, Default)]
pub struct SignatureBuilder {
    params: Vec<Parameter>,
    positions: HashMap<String, usize>,
}

impl SignatureBuilder {
    pub fn new() -> Self {
        SignatureBuilder::default()
    }

    fn insert(&mut self, param: Parameter) {
        match self.positions.get(param.name()) {
            // An override replaces the validator but keeps the position the
            // name first appeared at.
            Some(&position) => self.params[position] = param,
            None => {
                self.positions
                    .insert(param.name().to_string(), self.params.len());
                self.params.push(param);
            }
        }
    }

    /// Copies every parameter of an ancestor signature, in order. Call this
    /// before declaring your own parameters so overrides resolve against the
    /// inherited ones.
    pub fn inherit(mut self, ancestor: &Signature) -> Self {
        for param in ancestor.params() {
            self.insert(param.clone());
        }
        self
    }

    /// Declares a mandatory parameter, or overrides an inherited one.
    pub fn param<S: Into<String>>(mut self, name: S, validator: Validator) -> Self {
        self.insert(Parameter::new(name, validator));
        self
    }

    /// Declares an optional parameter with an explicit default.
    pub fn optional<S: Into<String>>(
        mut self,
        name: S,
        inner: Validator,
        default: DefaultValue,
    ) -> Self {
        self.insert(Parameter::new(
            name,
            Validator::optional_with(inner, default),
        ));
        self
    }

    /// Finalizes the signature. Mandatory parameters are stably moved ahead
    /// of optional ones; relative order within each group is preserved.
    pub fn build(mut self) -> Signature {
        self.params.sort_by_key(Parameter::has_default);
        Signature::from_params(self.params)
    }
}
