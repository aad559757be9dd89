//! Data model shared by every pipeline stage.
//!
//! ```text
//! SymbolTree → [TypeRegistry] → [TableTopology] → [BehaviorEntry]
//! ```
//!
//! The types here are plain data. Serialization derives are gated behind the
//! `serde` feature and produce the registry and behavior file shapes directly.

mod behavior;
mod oid;
mod types;
mod value;

pub use behavior::{BehaviorEntry, DynamicFunction};
pub use oid::Oid;
pub use types::{
    Access, BaseKind, ConstraintSpec, EnumMember, Primitive, RangeBound, SizeRange, SizeSpec,
    TypeEntry, TypeSummary,
};
pub use value::Value;
