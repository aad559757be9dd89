//! mibsim-core: MIB type canonicalization and object tree synthesis
//!
//! This crate turns resolved MIB symbols into the data an SNMP simulator
//! serves: a canonical type registry, table topologies with index plans,
//! synthesized default values and per-module behavior entries.
//! It is `no_std` compatible and IO-free. Loading from disk, persistence
//! and the pipeline cache live in `mibsim-std`.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod defaults;
pub mod engine;
pub mod model;
pub mod pipeline;
pub mod registry;
pub mod symbol;
pub mod tables;
pub mod tracing;
pub mod tree;

pub use engine::{ModuleRegistration, ProtocolEngine};
pub use pipeline::{Pipeline, PipelineOptions, PipelineOutput};
pub use registry::TypeRegistry;
pub use symbol::{SymbolLoader, SymbolTree};
pub use tracing::{NoopTracer, TraceEvent, TraceLevel, Tracer};
