//! Compiled symbol model and loading.
//!
//! An external SMI compiler turns MIB source into one [`ModuleSymbols`] per
//! module. The pipeline only ever sees this shape: a flat map of symbol name
//! to [`SymbolDescriptor`], with OIDs already absolute and every syntax
//! carrying its declared parent type.
//!
//! Loading is non-fatal per module. [`SymbolTree::load`] keeps going after a
//! failure and records it as a [`LoadFailure`].

mod base_modules;
mod lineage;

pub use base_modules::{is_base_module, BaseModule};
pub use lineage::TypeLineage;

use crate::model::{Access, ConstraintSpec, EnumMember, Oid, Value};
use crate::trace_event;
use crate::tracing::{Phase, TraceEvent, TraceLevel, Tracer};
use alloc::boxed::Box;
use alloc::collections::{BTreeMap, BTreeSet, VecDeque};
use alloc::string::String;
use alloc::vec::Vec;

/// Declared role of a symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum SymbolKind {
    /// TEXTUAL-CONVENTION or type assignment.
    TypeDefinition,
    /// Scalar OBJECT-TYPE.
    Scalar,
    /// Table container (SEQUENCE OF).
    Table,
    /// Conceptual row (has INDEX or AUGMENTS).
    Row,
    /// Column of a row.
    Column,
    /// Anything else with an OID (identities, groups, notifications).
    Node,
}

/// A syntax reference as emitted by the compiler.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Syntax {
    /// Syntax class name (`DisplayString`, `Integer32`, ...).
    pub type_name: String,
    /// Declared parent type.
    #[cfg_attr(feature = "serde", serde(default))]
    pub parent: Option<String>,
    /// DISPLAY-HINT text.
    #[cfg_attr(feature = "serde", serde(default))]
    pub display_hint: Option<String>,
    /// Full constraint expression, inherited restatements included.
    #[cfg_attr(feature = "serde", serde(default))]
    pub constraints: Vec<ConstraintSpec>,
    /// Named numbers.
    #[cfg_attr(feature = "serde", serde(default))]
    pub enums: Vec<EnumMember>,
    /// Narrower instance this syntax wraps, one level down.
    #[cfg_attr(feature = "serde", serde(default))]
    pub underlying: Option<Box<Syntax>>,
}

impl Syntax {
    /// Create a bare syntax reference.
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            ..Self::default()
        }
    }

    /// Set the declared parent.
    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Set the display hint.
    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.display_hint = Some(hint.into());
        self
    }

    /// Append a constraint.
    #[must_use]
    pub fn with_constraint(mut self, constraint: ConstraintSpec) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Set the named numbers.
    #[must_use]
    pub fn with_enums(mut self, enums: Vec<EnumMember>) -> Self {
        self.enums = enums;
        self
    }

    /// Set the wrapped instance.
    #[must_use]
    pub fn with_underlying(mut self, underlying: Syntax) -> Self {
        self.underlying = Some(Box::new(underlying));
        self
    }

    /// Trimmed display hint, if non-empty.
    #[must_use]
    pub fn hint(&self) -> Option<&str> {
        self.display_hint
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
    }
}

/// One compiled symbol.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SymbolDescriptor {
    /// Declared role.
    pub kind: SymbolKind,
    /// Absolute OID.
    #[cfg_attr(feature = "serde", serde(default))]
    pub oid: Option<Oid>,
    /// Syntax reference.
    #[cfg_attr(feature = "serde", serde(default))]
    pub syntax: Option<Syntax>,
    /// MAX-ACCESS.
    #[cfg_attr(feature = "serde", serde(default))]
    pub access: Option<Access>,
    /// INDEX object names (rows only).
    #[cfg_attr(feature = "serde", serde(default))]
    pub index: Vec<String>,
    /// AUGMENTS target row (rows only).
    #[cfg_attr(feature = "serde", serde(default))]
    pub augments: Option<String>,
    /// DEFVAL, with enumeration labels left as text.
    #[cfg_attr(feature = "serde", serde(default))]
    pub defval: Option<Value>,
}

impl SymbolDescriptor {
    fn with_kind(kind: SymbolKind) -> Self {
        Self {
            kind,
            oid: None,
            syntax: None,
            access: None,
            index: Vec::new(),
            augments: None,
            defval: None,
        }
    }

    /// A type definition.
    #[must_use]
    pub fn type_definition(syntax: Syntax) -> Self {
        Self {
            syntax: Some(syntax),
            ..Self::with_kind(SymbolKind::TypeDefinition)
        }
    }

    /// A scalar object.
    #[must_use]
    pub fn scalar(oid: Oid, syntax: Syntax, access: Access) -> Self {
        Self {
            oid: Some(oid),
            syntax: Some(syntax),
            access: Some(access),
            ..Self::with_kind(SymbolKind::Scalar)
        }
    }

    /// A table container.
    #[must_use]
    pub fn table(oid: Oid) -> Self {
        Self {
            oid: Some(oid),
            access: Some(Access::NotAccessible),
            ..Self::with_kind(SymbolKind::Table)
        }
    }

    /// A row with its INDEX names.
    #[must_use]
    pub fn row(oid: Oid, index: Vec<String>) -> Self {
        Self {
            oid: Some(oid),
            access: Some(Access::NotAccessible),
            index,
            ..Self::with_kind(SymbolKind::Row)
        }
    }

    /// A column object.
    #[must_use]
    pub fn column(oid: Oid, syntax: Syntax, access: Access) -> Self {
        Self {
            oid: Some(oid),
            syntax: Some(syntax),
            access: Some(access),
            ..Self::with_kind(SymbolKind::Column)
        }
    }

    /// A plain OID node.
    #[must_use]
    pub fn node(oid: Oid) -> Self {
        Self {
            oid: Some(oid),
            ..Self::with_kind(SymbolKind::Node)
        }
    }

    /// Set the AUGMENTS target.
    #[must_use]
    pub fn with_augments(mut self, target: impl Into<String>) -> Self {
        self.augments = Some(target.into());
        self
    }

    /// Set the DEFVAL.
    #[must_use]
    pub fn with_defval(mut self, value: impl Into<Value>) -> Self {
        self.defval = Some(value.into());
        self
    }

    /// Declared access, `read-only` when absent.
    #[must_use]
    pub fn access(&self) -> Access {
        self.access.unwrap_or_default()
    }
}

/// Every symbol of one compiled module.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModuleSymbols {
    /// Declared module name.
    pub module: String,
    /// Imported module names.
    #[cfg_attr(feature = "serde", serde(default))]
    pub imports: Vec<String>,
    /// Symbols by name.
    #[cfg_attr(feature = "serde", serde(default))]
    pub symbols: BTreeMap<String, SymbolDescriptor>,
}

impl ModuleSymbols {
    /// Create an empty module.
    #[must_use]
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            ..Self::default()
        }
    }

    /// Add an import.
    #[must_use]
    pub fn with_import(mut self, module: impl Into<String>) -> Self {
        self.imports.push(module.into());
        self
    }

    /// Add a symbol.
    #[must_use]
    pub fn with_symbol(mut self, name: impl Into<String>, symbol: SymbolDescriptor) -> Self {
        self.symbols.insert(name.into(), symbol);
        self
    }

    /// Look up a symbol.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SymbolDescriptor> {
        self.symbols.get(name)
    }
}

/// Error loading a compiled module.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    /// No compiled file declares this module.
    #[error("module {module} not found")]
    NotFound {
        /// Requested module.
        module: String,
    },
    /// Imports that no compiled file provides.
    #[error("module {module} has missing dependencies: {}", .missing.join(", "))]
    MissingDependencies {
        /// Module being loaded.
        module: String,
        /// Imported modules that could not be found.
        missing: Vec<String>,
    },
    /// The compiled file could not be decoded.
    #[error("module {module} is malformed: {message}")]
    Malformed {
        /// Module being loaded.
        module: String,
        /// Decoder message.
        message: String,
    },
}

impl LoadError {
    /// Missing module names, for dependency errors.
    #[must_use]
    pub fn missing_dependencies(&self) -> &[String] {
        match self {
            Self::MissingDependencies { missing, .. } => missing,
            _ => &[],
        }
    }
}

/// A module that failed to load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadFailure {
    /// Requested module.
    pub module: String,
    /// Why it failed.
    pub error: LoadError,
}

/// Source of compiled modules.
pub trait SymbolLoader {
    /// Load one module by name.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] when the module is absent, malformed, or
    /// imports modules that cannot be found.
    fn load_module(&mut self, name: &str) -> Result<ModuleSymbols, LoadError>;
}

impl<L: SymbolLoader + ?Sized> SymbolLoader for &mut L {
    fn load_module(&mut self, name: &str) -> Result<ModuleSymbols, LoadError> {
        (**self).load_module(name)
    }
}

/// In-memory loader over already compiled modules.
#[derive(Clone, Debug, Default)]
pub struct MemoryLoader {
    modules: BTreeMap<String, ModuleSymbols>,
}

impl MemoryLoader {
    /// Create an empty loader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a module.
    #[must_use]
    pub fn with_module(mut self, module: ModuleSymbols) -> Self {
        self.insert(module);
        self
    }

    /// Add a module.
    pub fn insert(&mut self, module: ModuleSymbols) {
        self.modules.insert(module.module.clone(), module);
    }
}

impl SymbolLoader for MemoryLoader {
    fn load_module(&mut self, name: &str) -> Result<ModuleSymbols, LoadError> {
        self.modules
            .get(name)
            .cloned()
            .ok_or_else(|| LoadError::NotFound {
                module: name.into(),
            })
    }
}

/// Loaded modules keyed by declared name.
#[derive(Clone, Debug, Default)]
pub struct SymbolTree {
    modules: BTreeMap<String, ModuleSymbols>,
    failures: Vec<LoadFailure>,
}

impl SymbolTree {
    /// Build a tree directly from modules.
    pub fn from_modules(modules: impl IntoIterator<Item = ModuleSymbols>) -> Self {
        Self {
            modules: modules
                .into_iter()
                .map(|m| (m.module.clone(), m))
                .collect(),
            failures: Vec::new(),
        }
    }

    /// Load the named modules and, transitively, their non-base imports.
    ///
    /// Failures are recorded and traced; loading continues with the rest.
    pub fn load<L: SymbolLoader, T: Tracer>(mut loader: L, names: &[String], tracer: &mut T) -> Self {
        trace_event!(tracer, TraceLevel::Info, TraceEvent::PhaseStart { phase: Phase::Load });

        let mut tree = Self::default();
        let mut seen: BTreeSet<String> = BTreeSet::new();
        let mut queue: VecDeque<String> = names.iter().cloned().collect();

        while let Some(name) = queue.pop_front() {
            if !seen.insert(name.clone()) {
                continue;
            }
            match loader.load_module(&name) {
                Ok(module) => {
                    for import in &module.imports {
                        if !is_base_module(import) && !seen.contains(import) {
                            queue.push_back(import.clone());
                        }
                    }
                    seen.insert(module.module.clone());
                    tree.modules.insert(module.module.clone(), module);
                }
                Err(error) => {
                    trace_event!(
                        tracer,
                        TraceLevel::Warn,
                        TraceEvent::ModuleLoadFailed {
                            module: &name,
                            error: &error,
                        }
                    );
                    tree.failures.push(LoadFailure {
                        module: name,
                        error,
                    });
                }
            }
        }

        trace_event!(tracer, TraceLevel::Info, TraceEvent::PhaseEnd { phase: Phase::Load });
        tree
    }

    /// Look up a module.
    #[must_use]
    pub fn module(&self, name: &str) -> Option<&ModuleSymbols> {
        self.modules.get(name)
    }

    /// Iterate modules in name order.
    pub fn modules(&self) -> impl Iterator<Item = &ModuleSymbols> {
        self.modules.values()
    }

    /// Modules that failed to load.
    #[must_use]
    pub fn failures(&self) -> &[LoadFailure] {
        &self.failures
    }

    /// Iterate `(module, symbol, descriptor)` in module then symbol order.
    pub fn symbols(&self) -> impl Iterator<Item = (&str, &str, &SymbolDescriptor)> {
        self.modules.values().flat_map(|m| {
            m.symbols
                .iter()
                .map(move |(name, desc)| (m.module.as_str(), name.as_str(), desc))
        })
    }

    /// Find a symbol, preferring `module` and then searching every module.
    #[must_use]
    pub fn find(&self, module: &str, name: &str) -> Option<&SymbolDescriptor> {
        self.modules
            .get(module)
            .and_then(|m| m.get(name))
            .or_else(|| self.modules.values().find_map(|m| m.get(name)))
    }

    /// Check if no modules are loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
