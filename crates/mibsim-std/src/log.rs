//! Bridge from pipeline trace events to the `tracing` crate.

use mibsim_core::{TraceEvent, TraceLevel, Tracer};
use tracing::level_filters::LevelFilter;

/// Dispatch to the `tracing` macro matching a runtime level.
macro_rules! emit {
    ($level:expr, $($arg:tt)+) => {
        match $level {
            TraceLevel::Error => tracing::error!($($arg)+),
            TraceLevel::Warn => tracing::warn!($($arg)+),
            TraceLevel::Info => tracing::info!($($arg)+),
            TraceLevel::Debug => tracing::debug!($($arg)+),
            TraceLevel::Trace => tracing::trace!($($arg)+),
        }
    };
}

/// Forwards every [`TraceEvent`] to `tracing` with structured fields.
#[derive(Clone, Copy, Debug)]
pub struct TracingTracer {
    level: TraceLevel,
}

impl Default for TracingTracer {
    fn default() -> Self {
        Self::from_current_filter()
    }
}

impl TracingTracer {
    /// Forward events at or above `level`.
    #[must_use]
    pub fn new(level: TraceLevel) -> Self {
        Self { level }
    }

    /// Follow the most verbose level any installed subscriber accepts.
    #[must_use]
    pub fn from_current_filter() -> Self {
        Self::new(level_from_filter(LevelFilter::current()))
    }
}

fn level_from_filter(filter: LevelFilter) -> TraceLevel {
    if filter >= LevelFilter::TRACE {
        TraceLevel::Trace
    } else if filter >= LevelFilter::DEBUG {
        TraceLevel::Debug
    } else if filter >= LevelFilter::INFO {
        TraceLevel::Info
    } else if filter >= LevelFilter::WARN {
        TraceLevel::Warn
    } else {
        TraceLevel::Error
    }
}

impl Tracer for TracingTracer {
    fn level(&self) -> TraceLevel {
        self.level
    }

    fn trace(&mut self, level: TraceLevel, event: TraceEvent<'_>) {
        match event {
            TraceEvent::PhaseStart { phase } => emit!(level, %phase, "phase started"),
            TraceEvent::PhaseEnd { phase } => emit!(level, %phase, "phase finished"),
            TraceEvent::ModuleLoadFailed { module, error } => {
                emit!(level, module, %error, "module not loaded");
            }
            TraceEvent::TypeRecorded {
                type_name,
                module,
                symbol,
                contributed,
            } => emit!(level, type_name, module, symbol, contributed, "type recorded"),
            TraceEvent::TypeFallback {
                module,
                symbol,
                type_name,
                fallback,
            } => emit!(level, module, symbol, type_name, fallback, "type not resolved, using fallback"),
            TraceEvent::TableDiscovered {
                module,
                table,
                columns,
            } => emit!(level, module, table, columns, "table discovered"),
            TraceEvent::TableSkipped {
                module,
                table,
                oid,
                reason,
            } => {
                let oid = oid.map(mibsim_core::model::Oid::to_dotted).unwrap_or_default();
                emit!(level, module, table, %oid, %reason, "table skipped");
            }
            TraceEvent::DefaultFallback {
                module,
                symbol,
                base_type,
            } => emit!(level, module, symbol, base_type, "no default for base type, using zero"),
            TraceEvent::RowBatchRetry { module, table } => {
                emit!(level, module, table, "row write failed, retrying column by column");
            }
            TraceEvent::ColumnRejected {
                module,
                table,
                column,
                oid,
                error,
            } => {
                let oid = oid.to_dotted();
                emit!(level, module, table, column, %oid, %error, "column dropped from row");
            }
            TraceEvent::ModuleBuilt {
                module,
                scalars,
                rows,
            } => emit!(level, module, scalars, rows, "module built"),
        }
    }
}
