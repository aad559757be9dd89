//! End-to-end driver.
//!
//! ```text
//! SymbolTree → TypeRegistry → TableTopology + IndexPlan → ModuleBuild
//! ```
//!
//! Stages run strictly in order and each reads only the finished output of
//! the previous one. Running twice on the same tree gives equal output.

use crate::model::DynamicFunction;
use crate::registry::TypeRegistry;
use crate::symbol::{ModuleSymbols, SymbolTree, TypeLineage};
use crate::tables::{discover, resolve_index, IndexCatalog, SkippedTable};
use crate::trace_event;
use crate::tracing::{Phase, TraceEvent, TraceLevel, Tracer};
use crate::tree::{FailedColumn, ModuleBuild, PlannedTable, TreeBuilder};
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

/// Pipeline settings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Dynamic functions to attach by symbol name, overriding the built-in
    /// identity scalars.
    pub dynamic: BTreeMap<String, DynamicFunction>,
}

/// Everything the pipeline produces.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PipelineOutput {
    /// Canonical type registry.
    pub registry: TypeRegistry,
    /// Object trees by module name.
    pub modules: BTreeMap<String, ModuleBuild>,
}

impl PipelineOutput {
    /// Look up one module's object tree.
    #[must_use]
    pub fn module(&self, name: &str) -> Option<&ModuleBuild> {
        self.modules.get(name)
    }

    /// Every omitted table, across modules.
    pub fn skipped_tables(&self) -> impl Iterator<Item = &SkippedTable> {
        self.modules.values().flat_map(|m| m.skipped_tables.iter())
    }

    /// Every dropped column, across modules.
    pub fn failed_columns(&self) -> impl Iterator<Item = &FailedColumn> {
        self.modules.values().flat_map(|m| m.failed_columns.iter())
    }
}

/// The build pipeline.
#[derive(Clone, Debug, Default)]
pub struct Pipeline {
    options: PipelineOptions,
}

impl Pipeline {
    /// Create a pipeline.
    #[must_use]
    pub fn new(options: PipelineOptions) -> Self {
        Self { options }
    }

    /// Run every stage over a loaded tree.
    pub fn run<T: Tracer>(&self, tree: &SymbolTree, tracer: &mut T) -> PipelineOutput {
        let registry = TypeRegistry::build(tree, tracer);
        let lineage = TypeLineage::from_tree(tree);
        let catalog = IndexCatalog::from_tree(tree);

        trace_event!(tracer, TraceLevel::Info, TraceEvent::PhaseStart { phase: Phase::Topology });
        let planned: Vec<(&ModuleSymbols, Vec<PlannedTable>, Vec<SkippedTable>)> = tree
            .modules()
            .map(|module| {
                let (tables, skipped) = plan_tables(module, &catalog, tracer);
                (module, tables, skipped)
            })
            .collect();
        trace_event!(tracer, TraceLevel::Info, TraceEvent::PhaseEnd { phase: Phase::Topology });

        trace_event!(tracer, TraceLevel::Info, TraceEvent::PhaseStart { phase: Phase::Tree });
        let modules = {
            let builder = TreeBuilder::new(&registry, &lineage).with_dynamic(&self.options.dynamic);
            planned
                .into_iter()
                .map(|(module, tables, skipped)| {
                    let build = builder.build_module(module, &tables, skipped, tracer);
                    (module.module.clone(), build)
                })
                .collect()
        };
        trace_event!(tracer, TraceLevel::Info, TraceEvent::PhaseEnd { phase: Phase::Tree });

        PipelineOutput { registry, modules }
    }
}

/// Discover one module's tables and classify their indexes.
///
/// Returns the tables that can carry a representative row and the ones
/// that were omitted, each omission traced as a warning.
pub fn plan_tables<T: Tracer>(
    module: &ModuleSymbols,
    catalog: &IndexCatalog,
    tracer: &mut T,
) -> (Vec<PlannedTable>, Vec<SkippedTable>) {
    let found = discover(&module.module, &module.symbols, catalog);
    let mut skipped = found.skipped;
    let mut planned = Vec::with_capacity(found.tables.len());

    for topology in found.tables {
        trace_event!(
            tracer,
            TraceLevel::Debug,
            TraceEvent::TableDiscovered {
                module: &module.module,
                table: &topology.name,
                columns: topology.columns.len(),
            }
        );
        match resolve_index(&topology) {
            Ok(plan) => planned.push(PlannedTable { topology, plan }),
            Err(reason) => skipped.push(SkippedTable {
                module: module.module.clone(),
                table: topology.name.clone(),
                oid: Some(topology.table_oid.clone()),
                reason,
            }),
        }
    }

    for s in &skipped {
        trace_event!(
            tracer,
            TraceLevel::Warn,
            TraceEvent::TableSkipped {
                module: &s.module,
                table: &s.table,
                oid: s.oid.as_ref(),
                reason: &s.reason,
            }
        );
    }
    (planned, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Access, ConstraintSpec, Oid, Value};
    use crate::symbol::{SymbolDescriptor, Syntax};
    use crate::tracing::tests::TestTracer;
    use crate::tracing::NoopTracer;
    use alloc::vec;

    fn oid(arcs: &[u32]) -> Oid {
        Oid::from_slice(arcs)
    }

    fn tree() -> SymbolTree {
        let display = Syntax::new("DisplayString")
            .with_parent("OctetString")
            .with_constraint(ConstraintSpec::size(0, 255));
        SymbolTree::from_modules(vec![
            ModuleSymbols::new("IF-MIB")
                .with_symbol("ifNumber", SymbolDescriptor::scalar(oid(&[1, 3, 6, 1, 2, 1, 2, 1]), Syntax::new("Integer32"), Access::ReadOnly))
                .with_symbol("ifTable", SymbolDescriptor::table(oid(&[1, 3, 6, 1, 2, 1, 2, 2])))
                .with_symbol("ifEntry", SymbolDescriptor::row(oid(&[1, 3, 6, 1, 2, 1, 2, 2, 1]), vec!["ifIndex".into()]))
                .with_symbol("ifIndex", SymbolDescriptor::column(oid(&[1, 3, 6, 1, 2, 1, 2, 2, 1, 1]), Syntax::new("Integer32"), Access::ReadOnly))
                .with_symbol("ifDescr", SymbolDescriptor::column(oid(&[1, 3, 6, 1, 2, 1, 2, 2, 1, 2]), display.clone(), Access::ReadOnly)),
            // Augments a row defined in another module.
            ModuleSymbols::new("VENDOR-IF-MIB")
                .with_import("IF-MIB")
                .with_symbol("vendorIfTable", SymbolDescriptor::table(oid(&[1, 3, 6, 1, 4, 1, 9, 5])))
                .with_symbol("vendorIfEntry", SymbolDescriptor::row(oid(&[1, 3, 6, 1, 4, 1, 9, 5, 1]), vec![]).with_augments("ifEntry"))
                .with_symbol("vendorIfLabel", SymbolDescriptor::column(oid(&[1, 3, 6, 1, 4, 1, 9, 5, 1, 1]), display, Access::ReadWrite)),
        ])
    }

    #[test]
    fn test_run_across_modules() {
        let mut tracer = TestTracer::new(TraceLevel::Info);
        let output = Pipeline::default().run(&tree(), &mut tracer);

        let if_mib = output.module("IF-MIB").unwrap();
        assert_eq!(if_mib.registration.scalars.len(), 1);
        assert_eq!(if_mib.registration.rows.len(), 1);

        let vendor = output.module("VENDOR-IF-MIB").unwrap();
        assert_eq!(vendor.registration.rows.len(), 1);
        assert_eq!(vendor.registration.rows[0].instance, vec![1]);
        assert_eq!(vendor.entries["vendorIfLabel"].initial, Some(Value::text("")));

        assert_eq!(output.skipped_tables().count(), 0);
        assert!(tracer.contains("Topology"));
        assert!(tracer.contains("ModuleBuilt"));
    }

    #[test]
    fn test_run_is_idempotent() {
        let t = tree();
        let a = Pipeline::default().run(&t, &mut NoopTracer);
        let b = Pipeline::default().run(&t, &mut NoopTracer);
        assert_eq!(a, b);
    }

    #[test]
    fn test_dynamic_options() {
        let options = PipelineOptions {
            dynamic: [(String::from("ifNumber"), DynamicFunction::Counter)]
                .into_iter()
                .collect(),
        };
        let output = Pipeline::new(options).run(&tree(), &mut NoopTracer);
        let entry = &output.module("IF-MIB").unwrap().entries["ifNumber"];
        assert_eq!(entry.dynamic_function, Some(DynamicFunction::Counter));
    }
}
