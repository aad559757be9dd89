//! Parent-pointer map for base type inference.

use super::{Syntax, SymbolTree};
use crate::model::Primitive;
use alloc::collections::{BTreeMap, BTreeSet};
use alloc::string::String;

/// Declared type inheritance, one parent per type name.
///
/// Built once from every syntax in a [`SymbolTree`]. The first parent fact
/// seen for a name wins.
#[derive(Clone, Debug, Default)]
pub struct TypeLineage {
    parents: BTreeMap<String, String>,
}

impl TypeLineage {
    /// Collect parent facts from every symbol in the tree.
    #[must_use]
    pub fn from_tree(tree: &SymbolTree) -> Self {
        let mut lineage = Self::default();
        for (_, _, desc) in tree.symbols() {
            if let Some(syntax) = &desc.syntax {
                lineage.record(syntax);
            }
        }
        lineage
    }

    /// Record the parent facts carried by a syntax and its wrapped instances.
    pub fn record(&mut self, syntax: &Syntax) {
        let parent = syntax
            .parent
            .as_deref()
            .or_else(|| syntax.underlying.as_ref().map(|u| u.type_name.as_str()));
        if let Some(parent) = parent {
            if parent != syntax.type_name {
                self.parents
                    .entry(syntax.type_name.clone())
                    .or_insert_with(|| parent.into());
            }
        }
        if let Some(underlying) = &syntax.underlying {
            self.record(underlying);
        }
    }

    /// Immediate parent of a type.
    #[must_use]
    pub fn parent_of(&self, name: &str) -> Option<&str> {
        self.parents.get(name).map(String::as_str)
    }

    /// First primitive among the ancestors of `name`, excluding `name` itself.
    ///
    /// The walk is bounded by the map size and stops on cycles.
    #[must_use]
    pub fn base_of(&self, name: &str) -> Option<Primitive> {
        let mut visited: BTreeSet<&str> = BTreeSet::new();
        visited.insert(name);
        let mut current = self.parent_of(name)?;
        for _ in 0..=self.parents.len() {
            if let Some(p) = Primitive::from_name(current) {
                return Some(p);
            }
            if !visited.insert(current) {
                return None;
            }
            current = self.parent_of(current)?;
        }
        None
    }

    /// Number of recorded parent facts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    /// Check if no parent facts were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }
}
