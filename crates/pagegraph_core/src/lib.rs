//! Core page graph logic: pages, labels and note associations.
//! This crate is the single source of truth for graph invariants.

pub mod convert;
pub mod graph;
pub mod logging;
pub mod model;
pub mod service;

pub use convert::{Converter, SchemaConverter, CURRENT_SCHEMA_VERSION};
pub use graph::{GraphError, GraphResult, GraphView, PageGraph, SchemaError};
pub use logging::{default_log_level, init_logging, logging_status, LogConfig, LoggingError};
pub use model::page::{DisplayName, PageRecord, PageUpdate};
pub use service::graph_service::{GraphInput, GraphService, IntegrityCheck, LoadOptions};

/// Minimal health-check API for integration smoke tests.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
