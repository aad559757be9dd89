//! Hand-off to an external protocol engine.
//!
//! The core never serves requests. Once a module's object tree is built it
//! is described as a [`ModuleRegistration`] and passed to whatever engine
//! the host provides.

use crate::model::{Access, DynamicFunction, Oid, Primitive, Value};
use crate::tree::ModuleBuild;
use alloc::string::String;
use alloc::vec::Vec;

/// A scalar ready to serve.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScalarRegistration {
    /// Symbol name.
    pub name: String,
    /// Object OID.
    pub oid: Oid,
    /// Instance OID (`oid.0`).
    pub instance: Oid,
    /// Initial value.
    pub value: Value,
    /// Declared syntax class name.
    pub type_name: String,
    /// Primitive the value is encoded as.
    pub base_type: Primitive,
    /// Maximum access.
    pub access: Access,
    /// Live value strategy.
    pub dynamic_function: Option<DynamicFunction>,
}

/// One column value of a representative row.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnValue {
    /// Column symbol name.
    pub name: String,
    /// Column OID.
    pub oid: Oid,
    /// Coerced value.
    pub value: Value,
    /// Declared syntax class name.
    pub type_name: String,
    /// Primitive the value is encoded as.
    pub base_type: Primitive,
    /// Maximum access.
    pub access: Access,
}

/// One representative table row.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RowRegistration {
    /// Table symbol name.
    pub table: String,
    /// Table OID.
    pub table_oid: Oid,
    /// Entry OID.
    pub entry_oid: Oid,
    /// Encoded instance suffix.
    pub instance: Vec<u32>,
    /// Columns that were accepted.
    pub columns: Vec<ColumnValue>,
}

impl RowRegistration {
    /// Full instance OID of a column in this row.
    #[must_use]
    pub fn instance_oid(&self, column: &ColumnValue) -> Oid {
        column.oid.join(&self.instance)
    }
}

/// Everything one module contributes to the engine.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModuleRegistration {
    /// Module name.
    pub module: String,
    /// Scalars in symbol order.
    pub scalars: Vec<ScalarRegistration>,
    /// Representative rows in table order.
    pub rows: Vec<RowRegistration>,
}

/// An external serving engine.
pub trait ProtocolEngine {
    /// Engine-specific error.
    type Error;

    /// Register one module's scalars and rows.
    ///
    /// # Errors
    ///
    /// Engine-defined. A failure affects only this module.
    fn register_module(
        &mut self,
        module: &str,
        registration: &ModuleRegistration,
    ) -> Result<(), Self::Error>;
}

/// A module the engine refused.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineFailure<E> {
    /// Module name.
    pub module: String,
    /// Engine error.
    pub error: E,
}

/// Register every module, continuing past failures.
pub fn register_all<'a, E: ProtocolEngine>(
    engine: &mut E,
    builds: impl IntoIterator<Item = &'a ModuleBuild>,
) -> Vec<EngineFailure<E::Error>> {
    let mut failures = Vec::new();
    for build in builds {
        if let Err(error) = engine.register_module(&build.module, &build.registration) {
            failures.push(EngineFailure {
                module: build.module.clone(),
                error,
            });
        }
    }
    failures
}
