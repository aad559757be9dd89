//! Index classification.
//!
//! Each declared index name is either local (one of the table's own
//! columns) or inherited (defined by the row this table augments). Only two
//! shapes can produce a representative row: all local, or all inherited
//! with no local not-accessible columns. Anything mixing the two would need
//! a type-accurate multi-part instance identifier and is rejected.

use super::{SkipReason, TableTopology};
use crate::model::Access;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

/// How the representative row's instance identifier is built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IndexPlan {
    /// Index columns are this table's own.
    Local {
        /// Index columns, in declared order.
        columns: Vec<String>,
        /// The column treated as the primary key.
        primary: String,
    },
    /// Index is defined elsewhere; a single synthetic `1` is used.
    Inherited {
        /// Inherited index names.
        names: Vec<String>,
    },
}

impl IndexPlan {
    /// Check if a column is part of a local index.
    #[must_use]
    pub fn is_index_column(&self, name: &str) -> bool {
        match self {
            Self::Local { columns, .. } => columns.iter().any(|c| c == name),
            Self::Inherited { .. } => false,
        }
    }
}

/// Classify a table's index.
///
/// # Errors
///
/// Returns [`SkipReason::CompoundIndex`] when inherited index names are
/// mixed with local index names or local not-accessible columns.
pub fn resolve_index(topology: &TableTopology) -> Result<IndexPlan, SkipReason> {
    let (local, inherited): (Vec<&String>, Vec<&String>) = topology
        .index_columns
        .iter()
        .partition(|n| topology.has_column(n));

    if !topology.index_inherited {
        let candidates: Vec<&str> = if local.is_empty() {
            topology.columns.iter().map(|c| c.name.as_str()).collect()
        } else {
            local.iter().map(|n| n.as_str()).collect()
        };
        let primary = String::from(pick_primary(topology, &candidates));
        let columns = if local.is_empty() {
            vec![primary.clone()]
        } else {
            local.into_iter().cloned().collect()
        };
        return Ok(IndexPlan::Local { columns, primary });
    }

    let hidden: Vec<&String> = topology
        .columns
        .iter()
        .filter(|c| c.access == Access::NotAccessible)
        .map(|c| &c.name)
        .collect();

    if local.is_empty() && hidden.is_empty() {
        return Ok(IndexPlan::Inherited {
            names: inherited.into_iter().cloned().collect(),
        });
    }

    let mut local_parts: Vec<String> = local.into_iter().cloned().collect();
    for name in hidden {
        if !local_parts.contains(name) {
            local_parts.push(name.clone());
        }
    }
    Err(SkipReason::CompoundIndex {
        inherited: inherited.into_iter().cloned().collect(),
        local: local_parts,
    })
}

/// First candidate whose name mentions `Index` or that is not accessible,
/// else the first candidate.
fn pick_primary<'a>(topology: &TableTopology, candidates: &[&'a str]) -> &'a str {
    candidates
        .iter()
        .copied()
        .find(|name| {
            name.contains("Index")
                || topology
                    .column(name)
                    .is_some_and(|c| c.access == Access::NotAccessible)
        })
        .or_else(|| candidates.first().copied())
        .unwrap_or_default()
}
