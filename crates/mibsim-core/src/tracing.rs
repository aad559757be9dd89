//! Pipeline tracing support.
//!
//! Every skip and fallback in the pipeline is reported as a structured
//! [`TraceEvent`] so that callers can reproduce it (module, symbol, OID).
//! The core never logs on its own; hosts plug in a [`Tracer`].

use crate::model::Oid;
use crate::symbol::LoadError;
use crate::tables::SkipReason;
use crate::tree::CoerceError;

/// Trace verbosity level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum TraceLevel {
    /// Critical errors only.
    Error,
    /// Warnings and errors.
    Warn,
    /// Informational messages (phase boundaries, summary stats).
    Info,
    /// Detailed debugging (individual decisions).
    Debug,
    /// Verbose tracing (every operation).
    Trace,
}

/// Pipeline stage identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Symbol loading.
    Load,
    /// Type canonicalization.
    Types,
    /// Table discovery and index resolution.
    Topology,
    /// Default synthesis and object tree assembly.
    Tree,
}

impl core::fmt::Display for Phase {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Phase::Load => write!(f, "load"),
            Phase::Types => write!(f, "types"),
            Phase::Topology => write!(f, "topology"),
            Phase::Tree => write!(f, "tree"),
        }
    }
}

/// Structured trace events emitted by the pipeline.
#[derive(Clone, Debug)]
pub enum TraceEvent<'a> {
    /// A stage is starting.
    PhaseStart {
        /// The stage.
        phase: Phase,
    },
    /// A stage has ended.
    PhaseEnd {
        /// The stage.
        phase: Phase,
    },

    // === Load events ===
    /// A module could not be loaded; the pipeline continues without it.
    ModuleLoadFailed {
        /// Requested module name.
        module: &'a str,
        /// Loader error.
        error: &'a LoadError,
    },

    // === Type events ===
    /// A symbol was folded into the registry.
    TypeRecorded {
        /// Syntax class name.
        type_name: &'a str,
        /// Defining module.
        module: &'a str,
        /// Symbol using the type.
        symbol: &'a str,
        /// Whether the occurrence was allowed to supply shape metadata.
        contributed: bool,
    },
    /// A type name could not be resolved and a fallback was used.
    TypeFallback {
        /// Module of the symbol.
        module: &'a str,
        /// Symbol using the type.
        symbol: &'a str,
        /// Requested type name.
        type_name: &'a str,
        /// Name actually used.
        fallback: &'a str,
    },

    // === Topology events ===
    /// A table was discovered.
    TableDiscovered {
        /// Module of the table.
        module: &'a str,
        /// Table symbol.
        table: &'a str,
        /// Number of columns found.
        columns: usize,
    },
    /// A table was omitted.
    TableSkipped {
        /// Module of the table.
        module: &'a str,
        /// Table symbol.
        table: &'a str,
        /// Table OID, when known.
        oid: Option<&'a Oid>,
        /// Why it was omitted.
        reason: &'a SkipReason,
    },

    // === Tree events ===
    /// No default could be derived from the type; a zero value was used.
    DefaultFallback {
        /// Module of the symbol.
        module: &'a str,
        /// Symbol name.
        symbol: &'a str,
        /// Unrecognized base type.
        base_type: &'a str,
    },
    /// A row batch write failed and is being retried column by column.
    RowBatchRetry {
        /// Module of the table.
        module: &'a str,
        /// Table symbol.
        table: &'a str,
    },
    /// A column value was rejected during a row write.
    ColumnRejected {
        /// Module of the table.
        module: &'a str,
        /// Table symbol.
        table: &'a str,
        /// Column symbol.
        column: &'a str,
        /// Column OID.
        oid: &'a Oid,
        /// Coercion failure.
        error: &'a CoerceError,
    },
    /// A module's object tree is complete.
    ModuleBuilt {
        /// Module name.
        module: &'a str,
        /// Scalar entries emitted.
        scalars: usize,
        /// Representative rows emitted.
        rows: usize,
    },
}

/// Trait for receiving trace events from the pipeline.
///
/// The tracer can filter events by returning a minimum trace level
/// from `level()`.
pub trait Tracer {
    /// Returns the minimum trace level to emit.
    ///
    /// Events below this level will not be passed to `trace()`.
    /// Default: `TraceLevel::Info`.
    fn level(&self) -> TraceLevel {
        TraceLevel::Info
    }

    /// Called for each trace event at or above the configured level.
    fn trace(&mut self, level: TraceLevel, event: TraceEvent<'_>);
}

/// A no-op tracer that discards all events.
#[derive(Default, Clone, Copy, Debug)]
pub struct NoopTracer;

impl Tracer for NoopTracer {
    fn level(&self) -> TraceLevel {
        TraceLevel::Error
    }

    fn trace(&mut self, _level: TraceLevel, _event: TraceEvent<'_>) {}
}

impl<T: Tracer + ?Sized> Tracer for &mut T {
    fn level(&self) -> TraceLevel {
        (**self).level()
    }

    fn trace(&mut self, level: TraceLevel, event: TraceEvent<'_>) {
        (**self).trace(level, event);
    }
}

/// Emit a trace event if the tracer level permits.
///
/// The level is checked before the event is constructed.
#[macro_export]
macro_rules! trace_event {
    ($tracer:expr, $level:expr, $event:expr) => {
        if $level <= $tracer.level() {
            $tracer.trace($level, $event);
        }
    };
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use alloc::format;
    use alloc::string::String;
    use alloc::vec::Vec;

    /// Collects formatted events for assertions.
    pub(crate) struct TestTracer {
        pub(crate) events: Vec<(TraceLevel, String)>,
        min_level: TraceLevel,
    }

    impl TestTracer {
        pub(crate) fn new(level: TraceLevel) -> Self {
            Self {
                events: Vec::new(),
                min_level: level,
            }
        }

        pub(crate) fn contains(&self, needle: &str) -> bool {
            self.events.iter().any(|(_, e)| e.contains(needle))
        }
    }

    impl Tracer for TestTracer {
        fn level(&self) -> TraceLevel {
            self.min_level
        }

        fn trace(&mut self, level: TraceLevel, event: TraceEvent<'_>) {
            self.events.push((level, format!("{event:?}")));
        }
    }

    #[test]
    fn test_trace_level_ordering() {
        assert!(TraceLevel::Error < TraceLevel::Warn);
        assert!(TraceLevel::Warn < TraceLevel::Info);
        assert!(TraceLevel::Info < TraceLevel::Debug);
        assert!(TraceLevel::Debug < TraceLevel::Trace);
    }

    #[test]
    fn test_trace_event_macro_filters() {
        let mut tracer = TestTracer::new(TraceLevel::Info);

        trace_event!(tracer, TraceLevel::Info, TraceEvent::PhaseStart { phase: Phase::Types });
        assert_eq!(tracer.events.len(), 1);

        trace_event!(tracer, TraceLevel::Debug, TraceEvent::PhaseEnd { phase: Phase::Types });
        assert_eq!(tracer.events.len(), 1);
    }

    #[test]
    fn test_tracer_by_mut_ref() {
        let mut tracer = TestTracer::new(TraceLevel::Trace);
        {
            let borrowed = &mut tracer;
            trace_event!(borrowed, TraceLevel::Warn, TraceEvent::PhaseStart { phase: Phase::Tree });
        }
        assert!(tracer.contains("Tree"));
    }
}
