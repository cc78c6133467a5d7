//! Core use-case services.
//!
//! # Responsibility
//! - Wrap the page graph with loading, conversion and serialization.
//! - Keep CLI/UI layers decoupled from record decoding details.

pub mod graph_service;
