//! Canonical type registry.
//!
//! The registry is keyed by syntax class name and starts out with one seed
//! entry per primitive. Every symbol that carries a syntax is then folded in:
//!
//! 1. Resolve the base type: one level of unwrap if the syntax wraps a
//!    narrower instance, otherwise the first primitive ancestor from the
//!    [`TypeLineage`].
//! 2. Decide whether the occurrence may contribute shape metadata. Object
//!    instances of a primitive never may, so a narrow scalar cannot tighten
//!    the primitive's entry.
//! 3. Extract and canonicalize constraints.
//! 4. Merge: each field is filled only while empty; `used_by` always grows.
//!
//! Type definitions are folded before object instances so a textual
//! convention's own shape takes precedence over its usages.

mod builtins;
mod constraints;

pub use builtins::{primitive_constraints, seed_entry};

use crate::model::{EnumMember, Primitive, TypeEntry};
use crate::symbol::{SymbolDescriptor, SymbolKind, SymbolTree, Syntax, TypeLineage};
use crate::trace_event;
use crate::tracing::{Phase, TraceEvent, TraceLevel, Tracer};
use alloc::collections::BTreeMap;
use alloc::collections::BTreeSet;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use constraints::{
    canonicalize, drop_base_range_for_enums, drop_dominated_ranges, drop_redundant_base_range,
    extract, Extracted,
};

/// Upper bound on `base_type` hops when resolving a primitive.
const MAX_BASE_DEPTH: usize = 32;

/// Canonical type registry.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct TypeRegistry {
    types: BTreeMap<String, TypeEntry>,
}

/// Outcome of resolving a symbol's type for value synthesis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedType<'a> {
    /// Registry entry for the declared type, if any.
    pub entry: Option<&'a TypeEntry>,
    /// Primitive the value must be assignable to.
    pub primitive: Primitive,
    /// Set when neither the registry nor the raw base name resolved,
    /// naming what was used instead.
    pub fallback: Option<&'static str>,
}

/// Shape metadata extracted from one occurrence.
struct Shape {
    display_hint: Option<String>,
    extracted: Extracted,
    enums: Option<Vec<EnumMember>>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::seeded()
    }
}

impl TypeRegistry {
    /// A registry holding only the primitive seeds.
    #[must_use]
    pub fn seeded() -> Self {
        Self {
            types: Primitive::all()
                .map(|p| (String::from(p.name()), seed_entry(p)))
                .collect(),
        }
    }

    /// Build the registry for every symbol in the tree.
    pub fn build<T: Tracer>(tree: &SymbolTree, tracer: &mut T) -> Self {
        trace_event!(tracer, TraceLevel::Info, TraceEvent::PhaseStart { phase: Phase::Types });

        let lineage = TypeLineage::from_tree(tree);
        let mut registry = Self::seeded();

        let (definitions, instances): (Vec<_>, Vec<_>) = tree
            .symbols()
            .filter(|(_, _, desc)| desc.syntax.is_some())
            .partition(|(_, _, desc)| desc.kind == SymbolKind::TypeDefinition);

        for (module, symbol, desc) in definitions.into_iter().chain(instances) {
            let Some(syntax) = &desc.syntax else {
                continue;
            };
            let contributed = registry.record(&lineage, module, symbol, desc, syntax);
            trace_event!(
                tracer,
                TraceLevel::Trace,
                TraceEvent::TypeRecorded {
                    type_name: &syntax.type_name,
                    module,
                    symbol,
                    contributed,
                }
            );
        }

        trace_event!(tracer, TraceLevel::Info, TraceEvent::PhaseEnd { phase: Phase::Types });
        registry
    }

    /// Fold one occurrence into the registry.
    ///
    /// Returns whether the occurrence was allowed to supply shape metadata.
    fn record(
        &mut self,
        lineage: &TypeLineage,
        module: &str,
        symbol: &str,
        desc: &SymbolDescriptor,
        syntax: &Syntax,
    ) -> bool {
        let type_name = syntax.type_name.as_str();
        let (base_raw, base_syntax) = match &syntax.underlying {
            Some(u) => (u.type_name.as_str(), &**u),
            None => match lineage.base_of(type_name) {
                Some(p) => (p.name(), syntax),
                None => (type_name, syntax),
            },
        };
        let base_type = (base_raw != type_name).then(|| String::from(base_raw));

        let is_type_def = desc.kind == SymbolKind::TypeDefinition;
        let allow = is_type_def || Primitive::from_name(type_name).is_none();
        let shape = allow.then(|| self.shape(syntax, base_syntax, base_type.as_deref()));

        let entry = self
            .types
            .entry(String::from(type_name))
            .or_insert_with(|| TypeEntry {
                base_type,
                ..TypeEntry::default()
            });

        if let Some(shape) = shape {
            if entry.display_hint.is_none() {
                entry.display_hint = shape.display_hint;
            }
            if entry.size.is_none() {
                entry.size = shape.extracted.size;
            }
            if entry.enums.is_none() {
                entry.enums = shape.enums;
            }
            if entry.constraints_repr.is_none() {
                entry.constraints_repr = shape.extracted.repr;
            }
            if entry.constraints.is_empty() {
                entry.constraints = shape.extracted.constraints;
            }
        }
        entry.used_by.push(format!("{module}::{symbol}"));
        allow
    }

    fn shape(&self, syntax: &Syntax, base: &Syntax, base_type: Option<&str>) -> Shape {
        let wraps = !core::ptr::eq(syntax, base);

        let Some(base_type) = base_type else {
            let extracted = canonicalize(extract(&syntax.constraints), None, false);
            return Shape {
                display_hint: None,
                extracted,
                enums: None,
            };
        };

        let mut extracted = extract(&syntax.constraints);
        if wraps && extracted.constraints.is_empty() {
            let inner = extract(&base.constraints);
            if !inner.constraints.is_empty() {
                extracted = inner;
            }
        }

        let enums = sorted_enums(syntax).or_else(|| wraps.then(|| sorted_enums(base)).flatten());
        let mut extracted = canonicalize(extracted, enums.as_deref(), true);

        if !extracted.constraints.is_empty() {
            let base_constraints = self
                .types
                .get(base_type)
                .map(|e| e.constraints.as_slice())
                .unwrap_or_default();
            let c = drop_redundant_base_range(extracted.constraints, base_constraints);
            let c = drop_dominated_ranges(c);
            extracted.constraints = drop_base_range_for_enums(c, enums.as_deref(), base_constraints);
        }

        Shape {
            display_hint: syntax.hint().map(String::from),
            extracted,
            enums,
        }
    }

    /// Look up an entry by type name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TypeEntry> {
        self.types.get(name)
    }

    /// Follow `base_type` links from `name` to a primitive.
    #[must_use]
    pub fn primitive_of(&self, name: &str) -> Option<Primitive> {
        let mut visited: BTreeSet<&str> = BTreeSet::new();
        let mut current = name;
        for _ in 0..MAX_BASE_DEPTH {
            if let Some(p) = Primitive::from_name(current) {
                return Some(p);
            }
            if !visited.insert(current) {
                return None;
            }
            current = self.types.get(current)?.base_type.as_deref()?;
        }
        None
    }

    /// Resolve a declared type for value synthesis.
    ///
    /// Falls back from the registry to `raw_base` (the base name seen on the
    /// syntax itself) and finally to `OctetString`.
    #[must_use]
    pub fn resolve(&self, type_name: &str, raw_base: Option<&str>) -> ResolvedType<'_> {
        let entry = self.types.get(type_name);
        if let Some(p) = self.primitive_of(type_name) {
            return ResolvedType {
                entry,
                primitive: p,
                fallback: None,
            };
        }
        if let Some(p) = raw_base.and_then(|b| self.primitive_of(b)) {
            return ResolvedType {
                entry,
                primitive: p,
                fallback: Some(p.name()),
            };
        }
        ResolvedType {
            entry,
            primitive: Primitive::OctetString,
            fallback: Some(Primitive::OctetString.name()),
        }
    }

    /// Iterate entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypeEntry)> {
        self.types.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

pub(crate) fn sorted_enums(syntax: &Syntax) -> Option<Vec<EnumMember>> {
    if syntax.enums.is_empty() {
        return None;
    }
    let mut enums = syntax.enums.clone();
    enums.sort_by_key(|m| m.value);
    Some(enums)
}
