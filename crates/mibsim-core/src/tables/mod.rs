//! Table topology discovery.
//!
//! Tables are found from a flat symbol map: a not-accessible table symbol,
//! its entry by the `...Table` → `...Entry` naming convention, and every
//! symbol whose OID is exactly one arc below the entry. Column membership
//! is decided by OID alone.

mod index;

pub use index::{resolve_index, IndexPlan};

use crate::model::{Access, Oid};
use crate::symbol::{SymbolDescriptor, SymbolKind, SymbolTree};
use alloc::collections::{BTreeMap, BTreeSet};
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

/// Upper bound on AUGMENTS hops.
const MAX_AUGMENTS_DEPTH: usize = 16;

/// One column of a discovered table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// Column symbol name.
    pub name: String,
    /// Column OID.
    pub oid: Oid,
    /// Declared syntax class name.
    pub type_name: String,
    /// Declared access.
    pub access: Access,
}

/// A discovered table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableTopology {
    /// Table symbol name.
    pub name: String,
    /// Entry symbol name.
    pub entry_name: String,
    /// Table OID.
    pub table_oid: Oid,
    /// Entry OID.
    pub entry_oid: Oid,
    /// Columns in OID order.
    pub columns: Vec<ColumnDescriptor>,
    /// Declared index names, or the augmented row's.
    pub index_columns: Vec<String>,
    /// True when some index column lives outside this table.
    pub index_inherited: bool,
    /// AUGMENTS target row, if any.
    pub augments: Option<String>,
}

impl TableTopology {
    /// Look up a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Check if a name is one of this table's columns.
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }
}

/// Why a table was left out of the object tree.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum SkipReason {
    /// The table or its entry has no OID.
    MissingOid,
    /// No entry symbol matches the naming convention.
    MissingEntry {
        /// Expected entry name, when the table name has the `Table` suffix.
        expected: Option<String>,
    },
    /// No symbol sits one arc below the entry.
    NoColumns,
    /// The index mixes inherited and local components.
    CompoundIndex {
        /// Index names defined by another table.
        inherited: Vec<String>,
        /// Local index names and not-accessible columns.
        local: Vec<String>,
    },
    /// An index value could not be encoded as an instance identifier.
    InvalidIndex {
        /// Index column.
        column: String,
        /// Encoding failure.
        message: String,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingOid => f.write_str("table or entry has no OID"),
            Self::MissingEntry { expected: Some(e) } => write!(f, "entry {e} not found"),
            Self::MissingEntry { expected: None } => {
                f.write_str("table name has no Table suffix")
            }
            Self::NoColumns => f.write_str("no columns under entry"),
            Self::CompoundIndex { inherited, local } => write!(
                f,
                "compound index (inherited: {}; local: {})",
                inherited.join(", "),
                local.join(", ")
            ),
            Self::InvalidIndex { column, message } => {
                write!(f, "index column {column} cannot be encoded: {message}")
            }
        }
    }
}

/// A table omitted from the object tree.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkippedTable {
    /// Module of the table.
    pub module: String,
    /// Table symbol name.
    pub table: String,
    /// Table OID, when known.
    pub oid: Option<Oid>,
    /// Why it was omitted.
    pub reason: SkipReason,
}

/// Index facts for every row in a tree, used to follow AUGMENTS across
/// modules.
#[derive(Clone, Debug, Default)]
pub struct IndexCatalog {
    rows: BTreeMap<String, (Vec<String>, Option<String>)>,
}

impl IndexCatalog {
    /// Collect INDEX and AUGMENTS facts from every row.
    #[must_use]
    pub fn from_tree(tree: &SymbolTree) -> Self {
        let mut rows = BTreeMap::new();
        for (_, name, desc) in tree.symbols() {
            if desc.kind == SymbolKind::Row {
                rows.entry(String::from(name))
                    .or_insert_with(|| (desc.index.clone(), desc.augments.clone()));
            }
        }
        Self { rows }
    }

    /// Index names of a row, following AUGMENTS.
    ///
    /// `None` when the row (or a row it augments) is unknown or the chain
    /// loops.
    #[must_use]
    pub fn index_of(&self, row: &str) -> Option<&[String]> {
        let mut visited: BTreeSet<&str> = BTreeSet::new();
        let mut current = row;
        for _ in 0..MAX_AUGMENTS_DEPTH {
            if !visited.insert(current) {
                return None;
            }
            let (index, augments) = self.rows.get(current)?;
            if !index.is_empty() {
                return Some(index.as_slice());
            }
            match augments {
                Some(target) => current = target,
                None => return Some(index.as_slice()),
            }
        }
        None
    }
}

/// Result of scanning one module.
#[derive(Clone, Debug, Default)]
pub struct Discovery {
    /// Tables with an entry and at least one column.
    pub tables: Vec<TableTopology>,
    /// Candidates that were left out.
    pub skipped: Vec<SkippedTable>,
}

/// Find every table in a flat symbol map.
///
/// `module` only labels skip records. `catalog` supplies the index names
/// of rows this module augments.
#[must_use]
pub fn discover(
    module: &str,
    symbols: &BTreeMap<String, SymbolDescriptor>,
    catalog: &IndexCatalog,
) -> Discovery {
    let mut out = Discovery::default();

    for (name, desc) in symbols {
        if desc.kind != SymbolKind::Table || desc.access() != Access::NotAccessible {
            continue;
        }
        let skip = |reason| SkippedTable {
            module: String::from(module),
            table: name.clone(),
            oid: desc.oid.clone(),
            reason,
        };

        let Some(prefix) = name.strip_suffix("Table") else {
            out.skipped.push(skip(SkipReason::MissingEntry { expected: None }));
            continue;
        };
        let entry_name = format!("{prefix}Entry");
        let Some(entry) = symbols.get(&entry_name) else {
            out.skipped.push(skip(SkipReason::MissingEntry {
                expected: Some(entry_name),
            }));
            continue;
        };
        let (Some(table_oid), Some(entry_oid)) = (&desc.oid, &entry.oid) else {
            out.skipped.push(skip(SkipReason::MissingOid));
            continue;
        };

        let mut columns: Vec<ColumnDescriptor> = symbols
            .iter()
            .filter(|(n, _)| *n != name && **n != entry_name)
            .filter_map(|(n, d)| {
                let oid = d.oid.as_ref()?;
                oid.is_child_of(entry_oid).then(|| ColumnDescriptor {
                    name: n.clone(),
                    oid: oid.clone(),
                    type_name: d
                        .syntax
                        .as_ref()
                        .map(|s| s.type_name.clone())
                        .unwrap_or_default(),
                    access: d.access(),
                })
            })
            .collect();
        if columns.is_empty() {
            out.skipped.push(skip(SkipReason::NoColumns));
            continue;
        }
        columns.sort_by(|a, b| a.oid.cmp(&b.oid));

        let index_columns: Vec<String> = if entry.index.is_empty() {
            entry
                .augments
                .as_deref()
                .and_then(|target| catalog.index_of(target))
                .map(<[String]>::to_vec)
                .unwrap_or_default()
        } else {
            entry.index.clone()
        };

        let mut topology = TableTopology {
            name: name.clone(),
            entry_name,
            table_oid: table_oid.clone(),
            entry_oid: entry_oid.clone(),
            columns,
            index_columns,
            index_inherited: false,
            augments: entry.augments.clone(),
        };
        topology.index_inherited = topology
            .index_columns
            .iter()
            .any(|n| !topology.has_column(n))
            || (topology.augments.is_some() && topology.index_columns.is_empty());
        out.tables.push(topology);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::{ModuleSymbols, Syntax};
    use alloc::vec;

    fn oid(arcs: &[u32]) -> Oid {
        Oid::from_slice(arcs)
    }

    fn column(arcs: &[u32], type_name: &str, access: Access) -> SymbolDescriptor {
        SymbolDescriptor::column(oid(arcs), Syntax::new(type_name), access)
    }

    fn if_mib() -> ModuleSymbols {
        ModuleSymbols::new("IF-MIB")
            .with_symbol("ifTable", SymbolDescriptor::table(oid(&[1, 3, 6, 1, 2, 1, 2, 2])))
            .with_symbol(
                "ifEntry",
                SymbolDescriptor::row(oid(&[1, 3, 6, 1, 2, 1, 2, 2, 1]), vec!["ifIndex".into()]),
            )
            .with_symbol(
                "ifIndex",
                column(&[1, 3, 6, 1, 2, 1, 2, 2, 1, 1], "InterfaceIndex", Access::ReadOnly),
            )
            .with_symbol(
                "ifDescr",
                column(&[1, 3, 6, 1, 2, 1, 2, 2, 1, 2], "DisplayString", Access::ReadOnly),
            )
            .with_symbol("ifXTable", SymbolDescriptor::table(oid(&[1, 3, 6, 1, 2, 1, 31, 1, 1])))
            .with_symbol(
                "ifXEntry",
                SymbolDescriptor::row(oid(&[1, 3, 6, 1, 2, 1, 31, 1, 1, 1]), vec![])
                    .with_augments("ifEntry"),
            )
            .with_symbol(
                "ifName",
                column(&[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 1], "DisplayString", Access::ReadOnly),
            )
            .with_symbol(
                "ifAlias",
                column(&[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 18], "DisplayString", Access::ReadWrite),
            )
    }

    fn run(module: &ModuleSymbols) -> Discovery {
        let tree = SymbolTree::from_modules(vec![module.clone()]);
        discover(&module.module, &module.symbols, &IndexCatalog::from_tree(&tree))
    }

    #[test]
    fn test_discovers_local_and_augmenting_tables() {
        let found = run(&if_mib());
        assert!(found.skipped.is_empty());
        assert_eq!(found.tables.len(), 2);

        let if_table = found.tables.iter().find(|t| t.name == "ifTable").unwrap();
        assert_eq!(if_table.entry_name, "ifEntry");
        assert_eq!(if_table.columns.len(), 2);
        assert_eq!(if_table.columns[0].name, "ifIndex");
        assert_eq!(if_table.index_columns, vec!["ifIndex"]);
        assert!(!if_table.index_inherited);

        let ifx = found.tables.iter().find(|t| t.name == "ifXTable").unwrap();
        assert_eq!(ifx.index_columns, vec!["ifIndex"]);
        assert!(ifx.index_inherited);
        assert!(!ifx.has_column("ifIndex"));
    }

    #[test]
    fn test_columns_by_oid_not_name() {
        let module = ModuleSymbols::new("X-MIB")
            .with_symbol("fooTable", SymbolDescriptor::table(oid(&[1, 5])))
            .with_symbol("fooEntry", SymbolDescriptor::row(oid(&[1, 5, 1]), vec!["x".into()]))
            .with_symbol("x", column(&[1, 5, 1, 1], "Integer32", Access::NotAccessible))
            .with_symbol("unrelated", column(&[1, 5, 1, 2, 7], "Integer32", Access::ReadOnly))
            .with_symbol("elsewhere", column(&[1, 6, 1, 2], "Integer32", Access::ReadOnly));
        let found = run(&module);
        let cols: Vec<&str> = found.tables[0].columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(cols, vec!["x"]);
    }

    #[test]
    fn test_skips_missing_entry_and_empty_tables() {
        let module = ModuleSymbols::new("X-MIB")
            .with_symbol("lonelyTable", SymbolDescriptor::table(oid(&[1, 7])))
            .with_symbol("emptyTable", SymbolDescriptor::table(oid(&[1, 8])))
            .with_symbol("emptyEntry", SymbolDescriptor::row(oid(&[1, 8, 1]), vec![]))
            .with_symbol("oddContainer", SymbolDescriptor::table(oid(&[1, 9])));
        let found = run(&module);
        assert!(found.tables.is_empty());

        let reasons: Vec<(&str, &SkipReason)> = found
            .skipped
            .iter()
            .map(|s| (s.table.as_str(), &s.reason))
            .collect();
        assert!(reasons.contains(&("emptyTable", &SkipReason::NoColumns)));
        assert!(reasons.contains(&(
            "lonelyTable",
            &SkipReason::MissingEntry {
                expected: Some("lonelyEntry".into())
            }
        )));
        assert!(reasons.contains(&("oddContainer", &SkipReason::MissingEntry { expected: None })));
        assert!(found.skipped.iter().all(|s| s.module == "X-MIB"));
    }

    #[test]
    fn test_accessible_table_symbol_ignored() {
        let mut table = SymbolDescriptor::table(oid(&[1, 5]));
        table.access = Some(Access::ReadOnly);
        let module = ModuleSymbols::new("X-MIB").with_symbol("fooTable", table);
        let found = run(&module);
        assert!(found.tables.is_empty());
        assert!(found.skipped.is_empty());
    }

    #[test]
    fn test_catalog_follows_augments_chain() {
        let tree = SymbolTree::from_modules(vec![ModuleSymbols::new("A")
            .with_symbol("aEntry", SymbolDescriptor::row(oid(&[1]), vec!["aIndex".into()]))
            .with_symbol("bEntry", SymbolDescriptor::row(oid(&[2]), vec![]).with_augments("aEntry"))
            .with_symbol("cEntry", SymbolDescriptor::row(oid(&[3]), vec![]).with_augments("bEntry"))
            .with_symbol("loopEntry", SymbolDescriptor::row(oid(&[4]), vec![]).with_augments("loopEntry"))]);
        let catalog = IndexCatalog::from_tree(&tree);
        assert_eq!(catalog.index_of("cEntry"), Some(&[String::from("aIndex")][..]));
        assert_eq!(catalog.index_of("loopEntry"), None);
        assert_eq!(catalog.index_of("nope"), None);
    }
}
