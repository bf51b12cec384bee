//! Validated operation nodes.
//!
//! # Architecture
//!
//! ```text
//! NodeType declaration (builder, once per type)
//!       ↓
//! Signature (ordered parameters + validators)
//!       ↓ bind / validate
//! Node (immutable, hashable, Arc-shared)
//!       ↓ to_record / restore
//! Persistence record (name -> value pairs)
//! ```
//!
//! # Core Types
//!
//! - **`FieldValue`** / **`FieldKind`**: dynamic values node fields hold
//! - **`Validator`** / **`DefaultValue`**: per-field validation strategies
//! - **`Parameter`** / **`Signature`** / **`SignatureBuilder`**: ordered
//!   parameter lists with inheritance and argument binding
//! - **`NodeType`** / **`NodeTypeBuilder`**: registered node declarations
//! - **`Node`**: validated instances with value equality and identity
//!   fast-path
//! - **`BindContext`**: cross-field visibility during validation
//!
//! # Related Modules
//!
//! - `crate::ops` - the standard node type catalog built on this framework
//! - `crate::errors` - [`crate::errors::BindError`] raised here

pub mod annotable;
pub mod field_value;
pub mod signature;
pub mod validators;

pub use annotable::{
    lookup_node_type, Node, NodeType, NodeTypeBuilder, PostValidateFn, RegistrationError,
};
pub use field_value::{FieldKind, FieldValue};
pub use signature::{Parameter, Signature, SignatureBuilder};
pub use validators::{BindContext, DefaultValue, Validator, ValidatorFn};
