//! Object tree assembly.
//!
//! One behavior entry per readable scalar and one representative row per
//! table. Rows are written as a batch first; if any column is rejected the
//! row is retried column by column and built from the columns that pass.

mod coerce;

pub use coerce::{coerce, encode_instance, CoerceError};

use crate::defaults::synthesize;
use crate::engine::{ColumnValue, ModuleRegistration, RowRegistration, ScalarRegistration};
use crate::model::{
    Access, BaseKind, BehaviorEntry, DynamicFunction, Oid, Primitive, SizeSpec, TypeEntry, Value,
};
use crate::registry::{sorted_enums, ResolvedType, TypeRegistry};
use crate::symbol::{ModuleSymbols, SymbolDescriptor, SymbolKind, Syntax, TypeLineage};
use crate::tables::{IndexPlan, SkipReason, SkippedTable, TableTopology};
use crate::trace_event;
use crate::tracing::{TraceEvent, TraceLevel, Tracer};
use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;

/// A column dropped from its representative row.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FailedColumn {
    /// Module of the table.
    pub module: String,
    /// Table symbol name.
    pub table: String,
    /// Column symbol name.
    pub column: String,
    /// Column OID.
    pub oid: Oid,
    /// Why the value was rejected.
    pub error: CoerceError,
}

/// Object tree of one module.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModuleBuild {
    /// Module name.
    pub module: String,
    /// Behavior entries by symbol name.
    pub entries: BTreeMap<String, BehaviorEntry>,
    /// Engine registration.
    pub registration: ModuleRegistration,
    /// Tables left out.
    pub skipped_tables: Vec<SkippedTable>,
    /// Columns dropped from their rows.
    pub failed_columns: Vec<FailedColumn>,
}

/// A table ready for row synthesis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedTable {
    /// Discovered topology.
    pub topology: TableTopology,
    /// Index classification.
    pub plan: IndexPlan,
}

/// Synthesized value for one column before coercion.
struct Candidate<'t> {
    name: &'t str,
    oid: &'t Oid,
    type_name: &'t str,
    access: Access,
    primitive: Primitive,
    entry: Option<TypeEntry>,
    value: Value,
    dynamic: Option<DynamicFunction>,
}

/// Builds object trees from a finished registry.
pub struct TreeBuilder<'a> {
    registry: &'a TypeRegistry,
    lineage: &'a TypeLineage,
    dynamic: Option<&'a BTreeMap<String, DynamicFunction>>,
}

impl<'a> TreeBuilder<'a> {
    /// Create a builder.
    #[must_use]
    pub fn new(registry: &'a TypeRegistry, lineage: &'a TypeLineage) -> Self {
        Self {
            registry,
            lineage,
            dynamic: None,
        }
    }

    /// Apply per-symbol dynamic function overrides.
    #[must_use]
    pub fn with_dynamic(mut self, overrides: &'a BTreeMap<String, DynamicFunction>) -> Self {
        self.dynamic = Some(overrides);
        self
    }

    /// Build one module's scalars and representative rows.
    ///
    /// `skipped` carries tables already rejected during discovery so the
    /// result lists every omission.
    pub fn build_module<T: Tracer>(
        &self,
        module: &ModuleSymbols,
        tables: &[PlannedTable],
        skipped: Vec<SkippedTable>,
        tracer: &mut T,
    ) -> ModuleBuild {
        let mut build = ModuleBuild {
            module: module.module.clone(),
            entries: BTreeMap::new(),
            registration: ModuleRegistration {
                module: module.module.clone(),
                ..ModuleRegistration::default()
            },
            skipped_tables: skipped,
            failed_columns: Vec::new(),
        };

        for (name, desc) in &module.symbols {
            if desc.kind != SymbolKind::Scalar || !desc.access().is_readable() {
                continue;
            }
            let Some(oid) = &desc.oid else {
                continue;
            };
            if tables.iter().any(|t| t.topology.entry_oid.is_prefix_of(oid)) {
                continue;
            }
            self.add_scalar(&mut build, name, oid, desc, tracer);
        }

        for table in tables {
            self.add_row(&mut build, module, table, tracer);
        }

        trace_event!(
            tracer,
            TraceLevel::Info,
            TraceEvent::ModuleBuilt {
                module: &build.module,
                scalars: build.registration.scalars.len(),
                rows: build.registration.rows.len(),
            }
        );
        build
    }

    fn add_scalar<T: Tracer>(
        &self,
        build: &mut ModuleBuild,
        name: &str,
        oid: &Oid,
        desc: &SymbolDescriptor,
        tracer: &mut T,
    ) {
        let type_name = type_name_of(desc);
        let syntax = desc.syntax.as_ref();
        let resolved = self.resolve(&build.module, name, syntax, type_name, tracer);
        let entry = narrowed(resolved.entry, syntax);
        let (value, dynamic) = self.synthesize(
            &build.module,
            name,
            type_name,
            entry.as_ref(),
            resolved.primitive,
            desc.defval.as_ref(),
            tracer,
        );

        build.entries.insert(
            String::from(name),
            behavior_entry(oid, type_name, desc.access(), entry.as_ref(), &value, dynamic),
        );
        build.registration.scalars.push(ScalarRegistration {
            name: String::from(name),
            oid: oid.clone(),
            instance: oid.child(0),
            value,
            type_name: String::from(type_name),
            base_type: resolved.primitive,
            access: desc.access(),
            dynamic_function: dynamic,
        });
    }

    fn add_row<T: Tracer>(
        &self,
        build: &mut ModuleBuild,
        module: &ModuleSymbols,
        table: &PlannedTable,
        tracer: &mut T,
    ) {
        let topology = &table.topology;
        let mut candidates: Vec<Candidate<'_>> = Vec::with_capacity(topology.columns.len());
        for column in &topology.columns {
            let desc = module.get(&column.name);
            let syntax = desc.and_then(|d| d.syntax.as_ref());
            let resolved = self.resolve(&build.module, &column.name, syntax, &column.type_name, tracer);
            let entry = narrowed(resolved.entry, syntax);
            let (value, dynamic) = if table.plan.is_index_column(&column.name) {
                (index_value(entry.as_ref(), resolved.primitive), None)
            } else {
                self.synthesize(
                    &build.module,
                    &column.name,
                    &column.type_name,
                    entry.as_ref(),
                    resolved.primitive,
                    desc.and_then(|d| d.defval.as_ref()),
                    tracer,
                )
            };
            candidates.push(Candidate {
                name: &column.name,
                oid: &column.oid,
                type_name: &column.type_name,
                access: column.access,
                primitive: resolved.primitive,
                entry,
                value,
                dynamic,
            });
        }

        // Index values are coerced before the instance is encoded from them.
        for c in candidates.iter_mut().filter(|c| table.plan.is_index_column(c.name)) {
            match coerce(&c.value, c.primitive, c.entry.as_ref()) {
                Ok(value) => c.value = value,
                Err(error) => {
                    let reason = SkipReason::InvalidIndex {
                        column: String::from(c.name),
                        message: error.to_string(),
                    };
                    skip_table(build, topology, reason, tracer);
                    return;
                }
            }
        }

        let instance = match row_instance(&table.plan, &candidates) {
            Ok(instance) => instance,
            Err((column, error)) => {
                let reason = SkipReason::InvalidIndex {
                    column,
                    message: error.to_string(),
                };
                skip_table(build, topology, reason, tracer);
                return;
            }
        };

        let batch: Result<Vec<Value>, CoerceError> = candidates
            .iter()
            .map(|c| coerce(&c.value, c.primitive, c.entry.as_ref()))
            .collect();
        let accepted: Vec<(&Candidate<'_>, Value)> = match batch {
            Ok(values) => candidates.iter().zip(values).collect(),
            Err(_) => {
                trace_event!(
                    tracer,
                    TraceLevel::Debug,
                    TraceEvent::RowBatchRetry {
                        module: &build.module,
                        table: &topology.name,
                    }
                );
                let mut accepted = Vec::new();
                for c in &candidates {
                    match coerce(&c.value, c.primitive, c.entry.as_ref()) {
                        Ok(value) => accepted.push((c, value)),
                        Err(error) => {
                            trace_event!(
                                tracer,
                                TraceLevel::Warn,
                                TraceEvent::ColumnRejected {
                                    module: &build.module,
                                    table: &topology.name,
                                    column: c.name,
                                    oid: c.oid,
                                    error: &error,
                                }
                            );
                            build.failed_columns.push(FailedColumn {
                                module: build.module.clone(),
                                table: topology.name.clone(),
                                column: String::from(c.name),
                                oid: c.oid.clone(),
                                error,
                            });
                        }
                    }
                }
                accepted
            }
        };

        let mut columns = Vec::with_capacity(accepted.len());
        for (c, value) in accepted {
            build.entries.insert(
                String::from(c.name),
                behavior_entry(c.oid, c.type_name, c.access, c.entry.as_ref(), &value, c.dynamic),
            );
            columns.push(ColumnValue {
                name: String::from(c.name),
                oid: c.oid.clone(),
                value,
                type_name: String::from(c.type_name),
                base_type: c.primitive,
                access: c.access,
            });
        }
        build.registration.rows.push(RowRegistration {
            table: topology.name.clone(),
            table_oid: topology.table_oid.clone(),
            entry_oid: topology.entry_oid.clone(),
            instance,
            columns,
        });
    }

    /// Resolve a declared type, tracing any fallback.
    fn resolve<T: Tracer>(
        &self,
        module: &str,
        symbol: &str,
        syntax: Option<&Syntax>,
        type_name: &str,
        tracer: &mut T,
    ) -> ResolvedType<'a> {
        let raw_base = syntax
            .and_then(|s| s.underlying.as_deref().map(|u| u.type_name.as_str()))
            .or_else(|| syntax.and_then(|s| s.parent.as_deref()))
            .or_else(|| self.lineage.base_of(type_name).map(Primitive::name));
        let resolved = self.registry.resolve(type_name, raw_base);
        if let Some(fallback) = resolved.fallback {
            trace_event!(
                tracer,
                TraceLevel::Warn,
                TraceEvent::TypeFallback {
                    module,
                    symbol,
                    type_name,
                    fallback,
                }
            );
        }
        resolved
    }

    fn synthesize<T: Tracer>(
        &self,
        module: &str,
        symbol: &str,
        type_name: &str,
        entry: Option<&TypeEntry>,
        primitive: Primitive,
        declared: Option<&Value>,
        tracer: &mut T,
    ) -> (Value, Option<DynamicFunction>) {
        let synth = synthesize(symbol, type_name, entry, Some(primitive), declared);
        if synth.fallback {
            trace_event!(
                tracer,
                TraceLevel::Warn,
                TraceEvent::DefaultFallback {
                    module,
                    symbol,
                    base_type: primitive.name(),
                }
            );
        }
        let dynamic = self
            .dynamic
            .and_then(|d| d.get(symbol).copied())
            .or(synth.dynamic);
        (synth.value, dynamic)
    }
}

fn skip_table<T: Tracer>(
    build: &mut ModuleBuild,
    topology: &TableTopology,
    reason: SkipReason,
    tracer: &mut T,
) {
    trace_event!(
        tracer,
        TraceLevel::Warn,
        TraceEvent::TableSkipped {
            module: &build.module,
            table: &topology.name,
            oid: Some(&topology.table_oid),
            reason: &reason,
        }
    );
    build.skipped_tables.push(SkippedTable {
        module: build.module.clone(),
        table: topology.name.clone(),
        oid: Some(topology.table_oid.clone()),
        reason,
    });
}

fn type_name_of(desc: &SymbolDescriptor) -> &str {
    desc.syntax.as_ref().map_or("", |s| s.type_name.as_str())
}

fn behavior_entry(
    oid: &Oid,
    type_name: &str,
    access: Access,
    entry: Option<&TypeEntry>,
    value: &Value,
    dynamic: Option<DynamicFunction>,
) -> BehaviorEntry {
    let mut behavior = BehaviorEntry::new(oid.clone(), type_name, access, Some(value.clone()));
    behavior.type_info = entry.map(TypeEntry::summary);
    behavior.dynamic_function = dynamic;
    behavior
}

/// Registry shape narrowed by the object's own inline enumeration.
///
/// Primitives never take shape from instances in the registry, so an
/// `INTEGER { up(1), down(2) }` object only carries its labels here.
fn narrowed(entry: Option<&TypeEntry>, syntax: Option<&Syntax>) -> Option<TypeEntry> {
    let Some(enums) = syntax.and_then(sorted_enums) else {
        return entry.cloned();
    };
    let mut narrowed = entry.cloned().unwrap_or_default();
    narrowed.enums = Some(enums);
    Some(narrowed)
}

/// Representative value for a local index column.
fn index_value(entry: Option<&TypeEntry>, primitive: Primitive) -> Value {
    match primitive.kind() {
        BaseKind::Integer | BaseKind::Unsigned => {
            if let Some(first) = entry.and_then(|e| e.enums.as_ref()).and_then(|e| e.first()) {
                return Value::Integer(first.value);
            }
            if let Some(values) = entry.and_then(TypeEntry::single_values) {
                let value = if values.contains(&1) {
                    1
                } else {
                    values.first().copied().unwrap_or(1)
                };
                return Value::Integer(value);
            }
            let range = entry.and_then(|e| e.constraints.iter().find_map(|c| c.value_range()));
            match range {
                Some((min, max)) if !(min..=max).contains(&1) => Value::from_i128(min),
                _ => Value::Integer(1),
            }
        }
        BaseKind::Address => Value::text("127.0.0.1"),
        BaseKind::Text => Value::Text(text_index(entry.and_then(|e| e.size.as_ref()))),
        BaseKind::ObjectIdentifier => Value::text("0.0"),
    }
}

/// Placeholder text index cut or padded to a length the size admits.
fn text_index(size: Option<&SizeSpec>) -> String {
    const PLACEHOLDER: &str = "default";
    let Some(size) = size else {
        return String::from(PLACEHOLDER);
    };
    let len = (0..=PLACEHOLDER.len())
        .rev()
        .find(|len| size.admits(*len))
        .unwrap_or_else(|| usize::try_from(size.min_len()).unwrap_or(0));
    PLACEHOLDER
        .chars()
        .chain(core::iter::repeat('0'))
        .take(len)
        .collect()
}

/// Instance suffix for the representative row.
fn row_instance(plan: &IndexPlan, candidates: &[Candidate<'_>]) -> Result<Vec<u32>, (String, CoerceError)> {
    let IndexPlan::Local { columns, .. } = plan else {
        return Ok(vec![1]);
    };
    let mut instance = Vec::new();
    for name in columns {
        let Some(c) = candidates.iter().find(|c| c.name == name) else {
            continue;
        };
        let arcs = encode_instance(&c.value, c.primitive).map_err(|e| (name.clone(), e))?;
        instance.extend(arcs);
    }
    Ok(instance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConstraintSpec, EnumMember, SizeSpec};
    use crate::pipeline::plan_tables;
    use crate::symbol::SymbolTree;
    use crate::tables::IndexCatalog;
    use crate::tracing::tests::TestTracer;
    use crate::tracing::NoopTracer;

    fn oid(arcs: &[u32]) -> Oid {
        Oid::from_slice(arcs)
    }

    fn plan(module: &ModuleSymbols) -> (Vec<PlannedTable>, Vec<SkippedTable>) {
        let tree = SymbolTree::from_modules(vec![module.clone()]);
        plan_tables(module, &IndexCatalog::from_tree(&tree), &mut NoopTracer)
    }

    fn build<T: Tracer>(module: &ModuleSymbols, tracer: &mut T) -> ModuleBuild {
        let tree = SymbolTree::from_modules(vec![module.clone()]);
        let registry = TypeRegistry::build(&tree, tracer);
        let lineage = TypeLineage::from_tree(&tree);
        let (tables, skipped) = plan(module);
        TreeBuilder::new(&registry, &lineage).build_module(module, &tables, skipped, tracer)
    }

    fn system_module() -> ModuleSymbols {
        let display = Syntax::new("DisplayString")
            .with_parent("OctetString")
            .with_hint("255a")
            .with_constraint(ConstraintSpec::size(0, 255));
        ModuleSymbols::new("SNMPv2-MIB")
            .with_symbol("DisplayString", SymbolDescriptor::type_definition(display.clone()))
            .with_symbol(
                "sysDescr",
                SymbolDescriptor::scalar(oid(&[1, 3, 6, 1, 2, 1, 1, 1]), display.clone(), Access::ReadOnly),
            )
            .with_symbol(
                "sysUpTime",
                SymbolDescriptor::scalar(
                    oid(&[1, 3, 6, 1, 2, 1, 1, 3]),
                    Syntax::new("TimeTicks"),
                    Access::ReadOnly,
                ),
            )
            .with_symbol(
                "sysName",
                SymbolDescriptor::scalar(oid(&[1, 3, 6, 1, 2, 1, 1, 5]), display, Access::ReadWrite),
            )
            .with_symbol(
                "snmpTrapOID",
                SymbolDescriptor::scalar(
                    oid(&[1, 3, 6, 1, 6, 3, 1, 1, 4, 1]),
                    Syntax::new("ObjectIdentifier"),
                    Access::AccessibleForNotify,
                ),
            )
    }

    #[test]
    fn test_scalars() {
        let build = build(&system_module(), &mut NoopTracer);

        assert_eq!(build.registration.scalars.len(), 3);
        assert!(!build.entries.contains_key("snmpTrapOID"));

        let uptime = &build.entries["sysUpTime"];
        assert_eq!(uptime.dynamic_function, Some(DynamicFunction::Uptime));

        let name = &build.entries["sysName"];
        assert_eq!(name.initial, Some(Value::text("mibsim-agent")));
        assert_eq!(name.access, Access::ReadWrite);
        assert_eq!(
            name.type_info.as_ref().and_then(|t| t.display_hint.as_deref()),
            Some("255a")
        );

        let scalar = build
            .registration
            .scalars
            .iter()
            .find(|s| s.name == "sysName")
            .unwrap();
        assert_eq!(scalar.instance.to_dotted(), "1.3.6.1.2.1.1.5.0");
        assert_eq!(scalar.base_type, Primitive::OctetString);
    }

    #[test]
    fn test_dynamic_override() {
        let module = system_module();
        let tree = SymbolTree::from_modules(vec![module.clone()]);
        let registry = TypeRegistry::build(&tree, &mut NoopTracer);
        let lineage = TypeLineage::from_tree(&tree);
        let overrides: BTreeMap<String, DynamicFunction> =
            [(String::from("sysDescr"), DynamicFunction::Counter)].into_iter().collect();

        let build = TreeBuilder::new(&registry, &lineage)
            .with_dynamic(&overrides)
            .build_module(&module, &[], Vec::new(), &mut NoopTracer);
        assert_eq!(build.entries["sysDescr"].dynamic_function, Some(DynamicFunction::Counter));
    }

    fn status_table() -> ModuleSymbols {
        let status = Syntax::new("EntryStatus")
            .with_parent("Integer32")
            .with_enums(vec![
                EnumMember::new("active", 1),
                EnumMember::new("notInService", 2),
                EnumMember::new("unknown", 1),
            ]);
        let fixed = Syntax::new("FixedTag")
            .with_parent("OctetString")
            .with_constraint(ConstraintSpec::size(6, 6));
        ModuleSymbols::new("TEST-MIB")
            .with_symbol("EntryStatus", SymbolDescriptor::type_definition(status.clone()))
            .with_symbol("FixedTag", SymbolDescriptor::type_definition(fixed.clone()))
            .with_symbol("peerTable", SymbolDescriptor::table(oid(&[1, 3, 6, 1, 4, 1, 9, 1])))
            .with_symbol(
                "peerEntry",
                SymbolDescriptor::row(oid(&[1, 3, 6, 1, 4, 1, 9, 1, 1]), vec!["peerAddress".into()]),
            )
            .with_symbol(
                "peerAddress",
                SymbolDescriptor::column(
                    oid(&[1, 3, 6, 1, 4, 1, 9, 1, 1, 1]),
                    Syntax::new("IpAddress"),
                    Access::NotAccessible,
                ),
            )
            .with_symbol(
                "peerStatus",
                SymbolDescriptor::column(oid(&[1, 3, 6, 1, 4, 1, 9, 1, 1, 2]), status, Access::ReadCreate),
            )
            .with_symbol(
                "peerTag",
                SymbolDescriptor::column(oid(&[1, 3, 6, 1, 4, 1, 9, 1, 1, 3]), fixed, Access::ReadCreate),
            )
    }

    #[test]
    fn test_row_with_address_index_and_failed_column() {
        let mut tracer = TestTracer::new(TraceLevel::Debug);
        let build = build(&status_table(), &mut tracer);

        assert_eq!(build.registration.rows.len(), 1);
        let row = &build.registration.rows[0];
        assert_eq!(row.instance, vec![127, 0, 0, 1]);

        let names: Vec<&str> = row.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["peerAddress", "peerStatus"]);

        assert_eq!(build.entries["peerStatus"].initial, Some(Value::Integer(1)));
        assert!(!build.entries.contains_key("peerTag"));

        assert_eq!(build.failed_columns.len(), 1);
        assert_eq!(build.failed_columns[0].column, "peerTag");
        assert_eq!(build.failed_columns[0].error, CoerceError::BadSize { len: 0 });
        assert!(tracer.contains("RowBatchRetry"));
        assert!(tracer.contains("ColumnRejected"));

        let tag = build
            .entries
            .get("peerAddress")
            .and_then(|e| e.type_info.as_ref())
            .and_then(|t| t.size.clone());
        assert_eq!(tag, Some(SizeSpec::Set { allowed: vec![4] }));
    }

    #[test]
    fn test_inherited_row_uses_synthetic_index() {
        let module = ModuleSymbols::new("IF-MIB")
            .with_symbol("ifTable", SymbolDescriptor::table(oid(&[1, 3, 6, 1, 2, 1, 2, 2])))
            .with_symbol(
                "ifEntry",
                SymbolDescriptor::row(oid(&[1, 3, 6, 1, 2, 1, 2, 2, 1]), vec!["ifIndex".into()]),
            )
            .with_symbol(
                "ifIndex",
                SymbolDescriptor::column(
                    oid(&[1, 3, 6, 1, 2, 1, 2, 2, 1, 1]),
                    Syntax::new("InterfaceIndex")
                        .with_parent("Integer32")
                        .with_constraint(ConstraintSpec::range(1, 2_147_483_647)),
                    Access::ReadOnly,
                ),
            )
            .with_symbol("ifXTable", SymbolDescriptor::table(oid(&[1, 3, 6, 1, 2, 1, 31, 1, 1])))
            .with_symbol(
                "ifXEntry",
                SymbolDescriptor::row(oid(&[1, 3, 6, 1, 2, 1, 31, 1, 1, 1]), vec![])
                    .with_augments("ifEntry"),
            )
            .with_symbol(
                "ifHCInOctets",
                SymbolDescriptor::column(
                    oid(&[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 6]),
                    Syntax::new("Counter64"),
                    Access::ReadOnly,
                ),
            );
        let build = build(&module, &mut NoopTracer);

        assert_eq!(build.registration.rows.len(), 2);
        for row in &build.registration.rows {
            assert_eq!(row.instance, vec![1]);
        }
        let ifx = build
            .registration
            .rows
            .iter()
            .find(|r| r.table == "ifXTable")
            .unwrap();
        assert_eq!(ifx.columns.len(), 1);
        assert_eq!(ifx.instance_oid(&ifx.columns[0]).to_dotted(), "1.3.6.1.2.1.31.1.1.1.6.1");
        assert_eq!(build.entries["ifIndex"].initial, Some(Value::Integer(1)));
    }

    fn site_table(index_syntax: Syntax) -> ModuleSymbols {
        ModuleSymbols::new("SITE-MIB")
            .with_symbol(
                index_syntax.type_name.clone(),
                SymbolDescriptor::type_definition(index_syntax.clone()),
            )
            .with_symbol("siteTable", SymbolDescriptor::table(oid(&[1, 3, 6, 1, 4, 1, 9, 5])))
            .with_symbol(
                "siteEntry",
                SymbolDescriptor::row(oid(&[1, 3, 6, 1, 4, 1, 9, 5, 1]), vec!["siteCode".into()]),
            )
            .with_symbol(
                "siteCode",
                SymbolDescriptor::column(
                    oid(&[1, 3, 6, 1, 4, 1, 9, 5, 1, 1]),
                    index_syntax,
                    Access::NotAccessible,
                ),
            )
            .with_symbol(
                "siteLoad",
                SymbolDescriptor::column(
                    oid(&[1, 3, 6, 1, 4, 1, 9, 5, 1, 2]),
                    Syntax::new("Gauge32"),
                    Access::ReadOnly,
                ),
            )
    }

    #[test]
    fn test_text_index_fits_size() {
        let code = Syntax::new("SiteCode")
            .with_parent("OctetString")
            .with_constraint(ConstraintSpec::size(4, 4));
        let build = build(&site_table(code), &mut NoopTracer);

        assert!(build.failed_columns.is_empty());
        assert!(build.skipped_tables.is_empty());
        let row = &build.registration.rows[0];
        assert_eq!(row.instance, vec![4, 100, 101, 102, 97]);
        let names: Vec<&str> = row.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["siteCode", "siteLoad"]);
        assert_eq!(build.entries["siteCode"].initial, Some(Value::text("defa")));
    }

    #[test]
    fn test_text_index_padded_to_minimum() {
        let code = Syntax::new("LongCode")
            .with_parent("OctetString")
            .with_constraint(ConstraintSpec::size(9, 12));
        let build = build(&site_table(code), &mut NoopTracer);

        assert_eq!(build.entries["siteCode"].initial, Some(Value::text("default00")));
        assert_eq!(build.registration.rows[0].instance.first(), Some(&9));
    }

    #[test]
    fn test_single_value_index() {
        let code = Syntax::new("SiteClass")
            .with_parent("Integer32")
            .with_constraint(ConstraintSpec::single(vec![2, 4]));
        let build = build(&site_table(code), &mut NoopTracer);

        assert_eq!(build.registration.rows[0].instance, vec![2]);
        assert_eq!(build.entries["siteCode"].initial, Some(Value::Integer(2)));
    }

    #[test]
    fn test_rejected_index_skips_table() {
        let code = Syntax::new("SiteOffset")
            .with_parent("Gauge32")
            .with_constraint(ConstraintSpec::range(-10, -5));
        let mut tracer = TestTracer::new(TraceLevel::Warn);
        let build = build(&site_table(code), &mut tracer);

        assert!(build.registration.rows.is_empty());
        assert!(!build.entries.contains_key("siteLoad"));
        assert!(build.failed_columns.is_empty());
        assert_eq!(build.skipped_tables.len(), 1);
        assert_eq!(
            build.skipped_tables[0].reason,
            SkipReason::InvalidIndex {
                column: "siteCode".into(),
                message: "-5 is out of range".into(),
            }
        );
        assert!(tracer.contains("TableSkipped"));
    }

    #[test]
    fn test_compound_index_table_omitted() {
        let module = ModuleSymbols::new("X-MIB")
            .with_symbol("subTable", SymbolDescriptor::table(oid(&[1, 3, 6, 1, 4, 1, 9, 2])))
            .with_symbol(
                "subEntry",
                SymbolDescriptor::row(
                    oid(&[1, 3, 6, 1, 4, 1, 9, 2, 1]),
                    vec!["ifIndex".into(), "subIndex".into()],
                ),
            )
            .with_symbol(
                "subIndex",
                SymbolDescriptor::column(
                    oid(&[1, 3, 6, 1, 4, 1, 9, 2, 1, 1]),
                    Syntax::new("Integer32"),
                    Access::NotAccessible,
                ),
            )
            .with_symbol(
                "subValue",
                SymbolDescriptor::column(
                    oid(&[1, 3, 6, 1, 4, 1, 9, 2, 1, 2]),
                    Syntax::new("Integer32"),
                    Access::ReadOnly,
                ),
            );
        let build = build(&module, &mut NoopTracer);

        assert!(build.registration.rows.is_empty());
        assert!(!build.entries.contains_key("subValue"));
        assert_eq!(build.skipped_tables.len(), 1);
        assert!(matches!(
            build.skipped_tables[0].reason,
            SkipReason::CompoundIndex { .. }
        ));
    }

    #[test]
    fn test_inline_enumeration_on_primitive() {
        let module = ModuleSymbols::new("X-MIB").with_symbol(
            "ifOperStatus",
            SymbolDescriptor::scalar(
                oid(&[1, 3, 6, 1, 4, 1, 9, 4]),
                Syntax::new("Integer").with_enums(vec![
                    EnumMember::new("up", 1),
                    EnumMember::new("down", 2),
                    EnumMember::new("unknown", 4),
                ]),
                Access::ReadOnly,
            )
            .with_defval(Value::text("down")),
        );
        let build = build(&module, &mut NoopTracer);

        let entry = &build.entries["ifOperStatus"];
        assert_eq!(entry.initial, Some(Value::Integer(2)));
        let labels = entry.type_info.as_ref().and_then(|t| t.enums.as_ref()).map(Vec::len);
        assert_eq!(labels, Some(3));
    }

    #[test]
    fn test_unresolved_type_falls_back_to_text() {
        let module = ModuleSymbols::new("X-MIB").with_symbol(
            "oddThing",
            SymbolDescriptor::scalar(oid(&[1, 3, 6, 1, 4, 1, 9, 3]), Syntax::new("Mystery"), Access::ReadOnly),
        );
        let mut tracer = TestTracer::new(TraceLevel::Warn);
        let build = build(&module, &mut tracer);

        assert_eq!(build.entries["oddThing"].initial, Some(Value::text("")));
        assert_eq!(build.registration.scalars[0].base_type, Primitive::OctetString);
        assert!(tracer.contains("TypeFallback"));
    }
}
