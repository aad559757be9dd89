//! mibsim-std: Filesystem loader, behavior store and generator
//!
//! This crate wires `mibsim-core` to the filesystem: compiled modules are
//! read from a directory, behavior entries persist as one JSON file per
//! module, pipeline output can be cached, and pipeline trace events are
//! forwarded to `tracing`.

pub mod cache;
pub mod config;
pub mod dynamic;
pub mod error;
pub mod generate;
pub mod loader;
pub mod log;
pub mod store;

pub use config::Config;
pub use error::{Error, Result};
pub use generate::{Generated, Generator};
pub use loader::DirSymbolLoader;
pub use log::TracingTracer;
pub use store::BehaviorStore;

pub use mibsim_core;
