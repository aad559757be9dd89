//! Persisted runtime records for scalars and columns.

use super::oid::Oid;
use super::types::{Access, TypeSummary};
use super::value::Value;
use alloc::string::String;
use core::fmt;

/// Live value strategy evaluated at read time instead of `initial`/`current`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DynamicFunction {
    /// Elapsed time since start, in hundredths of a second.
    Uptime,
    /// Monotonic counter incremented on each read.
    Counter,
}

impl DynamicFunction {
    /// Get a string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uptime => "uptime",
            Self::Counter => "counter",
        }
    }

    /// Parse a dynamic function marker.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "uptime" => Some(Self::Uptime),
            "counter" => Some(Self::Counter),
            _ => None,
        }
    }
}

impl fmt::Display for DynamicFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One scalar or column record.
///
/// `initial` is fixed at synthesis time. `current` is only ever set by an
/// explicit write and cleared by a reset.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BehaviorEntry {
    /// Object OID (without instance suffix).
    pub oid: Oid,
    /// Declared syntax class name.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub type_name: String,
    /// Shape of the declared type, when the registry knows it.
    #[cfg_attr(feature = "serde", serde(default))]
    pub type_info: Option<TypeSummary>,
    /// Maximum access.
    pub access: Access,
    /// Synthesized default.
    pub initial: Option<Value>,
    /// Last written value.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub current: Option<Value>,
    /// Live value strategy.
    #[cfg_attr(feature = "serde", serde(default))]
    pub dynamic_function: Option<DynamicFunction>,
}

impl BehaviorEntry {
    /// Create an entry with no current value.
    #[must_use]
    pub fn new(oid: Oid, type_name: impl Into<String>, access: Access, initial: Option<Value>) -> Self {
        Self {
            oid,
            type_name: type_name.into(),
            type_info: None,
            access,
            initial,
            current: None,
            dynamic_function: None,
        }
    }

    /// The stored value: `current` if written, else `initial`.
    #[must_use]
    pub fn stored_value(&self) -> Option<&Value> {
        self.current.as_ref().or(self.initial.as_ref())
    }

    /// Record a write. `initial` is untouched.
    pub fn set_current(&mut self, value: Value) {
        self.current = Some(value);
    }

    /// Drop the written value so reads fall back to `initial`.
    pub fn reset(&mut self) {
        self.current = None;
    }
}
