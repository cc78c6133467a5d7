//! Page graph use-case service.
//!
//! # Responsibility
//! - Load a graph from JSON text or a structured record through a converter.
//! - Apply the configured integrity policy at load time.
//! - Delegate queries/mutations and serialize back to JSON text.
//!
//! # Invariants
//! - The service never bypasses `PageGraph` mutation APIs.
//! - Diagnostic events carry counts and durations only, never urls or labels.

use crate::convert::{Converter, SchemaConverter};
use crate::graph::{GraphError, GraphResult, GraphView, PageGraph, SchemaError};
use crate::model::page::{DisplayName, PageRecord};
use log::{error, info, warn};
use serde_json::Value;
use std::borrow::Cow;
use std::time::Instant;

/// Raw input accepted by [`GraphService::open`].
#[derive(Debug, Clone, PartialEq)]
pub enum GraphInput<'a> {
    /// Serialized JSON text, parsed before conversion.
    Text(&'a str),
    /// Already-parsed record.
    Record(Value),
}

impl<'a> From<&'a str> for GraphInput<'a> {
    fn from(value: &'a str) -> Self {
        Self::Text(value)
    }
}

impl<'a> From<&'a String> for GraphInput<'a> {
    fn from(value: &'a String) -> Self {
        Self::Text(value.as_str())
    }
}

impl From<Value> for GraphInput<'_> {
    fn from(value: Value) -> Self {
        Self::Record(value)
    }
}

/// What to do when a loaded record breaks label/note symmetry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IntegrityCheck {
    /// Adopt the record without checking.
    Skip,
    /// Adopt the record and log a warning.
    #[default]
    Warn,
    /// Fail loading with `SchemaError::IntegrityViolation`.
    Reject,
}

/// Load-time options for [`GraphService::open_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    pub integrity: IntegrityCheck,
}

/// Owns one page graph for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphService {
    graph: PageGraph,
}

impl GraphService {
    /// Wraps an existing graph.
    pub fn new(graph: PageGraph) -> Self {
        Self { graph }
    }

    /// Loads a graph with the built-in schema converter and default options.
    pub fn open<'a>(input: impl Into<GraphInput<'a>>) -> GraphResult<Self> {
        Self::open_with(input, &SchemaConverter, LoadOptions::default())
    }

    /// Loads a graph through `converter`, then applies `options`.
    ///
    /// # Side effects
    /// - Emits `graph_open` logging events with duration and status.
    ///
    /// # Errors
    /// - `GraphError::Parse` for invalid JSON text.
    /// - `GraphError::Schema` for malformed records, or integrity violations
    ///   under `IntegrityCheck::Reject`.
    pub fn open_with<'a>(
        input: impl Into<GraphInput<'a>>,
        converter: &impl Converter,
        options: LoadOptions,
    ) -> GraphResult<Self> {
        let started_at = Instant::now();
        let input = input.into();
        let mode = match &input {
            GraphInput::Text(_) => "text",
            GraphInput::Record(_) => "record",
        };
        info!("event=graph_open module=service status=start mode={mode}");

        let loaded = match input {
            GraphInput::Text(text) => PageGraph::from_json(text, converter),
            GraphInput::Record(record) => PageGraph::from_value(record, converter),
        }
        .and_then(|graph| apply_integrity_check(graph, options.integrity));

        match loaded {
            Ok(graph) => {
                info!(
                    "event=graph_open module=service status=ok mode={} duration_ms={} pages={} labels={} notes={}",
                    mode,
                    started_at.elapsed().as_millis(),
                    graph.page_count(),
                    graph.labels().count(),
                    graph.notes().len()
                );
                Ok(Self { graph })
            }
            Err(err) => {
                error!(
                    "event=graph_open module=service status=error mode={} duration_ms={} error_code={}",
                    mode,
                    started_at.elapsed().as_millis(),
                    error_code(&err)
                );
                Err(err)
            }
        }
    }

    pub fn graph(&self) -> &PageGraph {
        &self.graph
    }

    pub fn into_graph(self) -> PageGraph {
        self.graph
    }

    /// Serializes the graph to compact JSON text.
    pub fn stringify(&self) -> GraphResult<String> {
        let encoded = self.graph.to_json_string();
        match &encoded {
            Ok(text) => info!(
                "event=graph_stringify module=service status=ok bytes={}",
                text.len()
            ),
            Err(err) => error!(
                "event=graph_stringify module=service status=error error_code={}",
                error_code(err)
            ),
        }
        encoded
    }

    /// Returns the persisted record shape as a JSON value.
    pub fn to_value(&self) -> GraphResult<Value> {
        self.graph.to_value()
    }

    pub fn get_page(&self, url: &str) -> Cow<'_, PageRecord> {
        self.graph.get_page(url)
    }

    pub fn get_label(&self, label: &str) -> &[String] {
        self.graph.get_label(label)
    }

    pub fn version(&self) -> u32 {
        self.graph.version()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.graph.labels()
    }

    pub fn notes(&self) -> &[String] {
        self.graph.notes()
    }

    pub fn set_display(&mut self, url: &str, display: impl Into<DisplayName>) {
        self.graph.set_display(url, display);
    }

    pub fn set_note(&mut self, url: &str, note_url: &str) {
        self.graph.set_note(url, note_url);
    }

    pub fn add_label(&mut self, url: &str, label: &str) {
        self.graph.add_label(url, label);
    }

    pub fn rem_label(&mut self, url: &str, label: &str) {
        self.graph.rem_label(url, label);
    }

    pub fn delete_note(&mut self, note_url: &str) {
        self.graph.delete_note(note_url);
    }

    pub fn delete_label(&mut self, label: &str) {
        self.graph.delete_label(label);
    }

    pub fn verify_integrity(&self) -> Result<(), SchemaError> {
        self.graph.verify_integrity()
    }
}

impl GraphView for GraphService {
    fn get_page(&self, url: &str) -> Cow<'_, PageRecord> {
        self.graph.get_page(url)
    }

    fn get_label(&self, label: &str) -> &[String] {
        self.graph.get_label(label)
    }

    fn version(&self) -> u32 {
        self.graph.version()
    }

    fn labels(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        Box::new(self.graph.labels())
    }

    fn notes(&self) -> &[String] {
        self.graph.notes()
    }
}

fn apply_integrity_check(graph: PageGraph, check: IntegrityCheck) -> GraphResult<PageGraph> {
    if check == IntegrityCheck::Skip {
        return Ok(graph);
    }
    match graph.verify_integrity() {
        Ok(()) => Ok(graph),
        Err(_) if check == IntegrityCheck::Warn => {
            warn!("event=graph_integrity module=service status=warn error_code=integrity_violation");
            Ok(graph)
        }
        Err(err) => Err(err.into()),
    }
}

fn error_code(err: &GraphError) -> &'static str {
    match err {
        GraphError::Parse(_) => "parse_failed",
        GraphError::Schema(SchemaError::UnsupportedVersion { .. }) => "unsupported_version",
        GraphError::Schema(SchemaError::IntegrityViolation(_)) => "integrity_violation",
        GraphError::Schema(_) => "schema_invalid",
        GraphError::Encode(_) => "encode_failed",
    }
}

#[cfg(test)]
mod tests {
    use super::{error_code, GraphInput};
    use crate::graph::{GraphError, SchemaError};
    use serde_json::json;

    #[test]
    fn input_conversions_pick_the_right_variant() {
        let text = String::from("{}");
        assert_eq!(GraphInput::from(&text), GraphInput::Text("{}"));
        assert_eq!(GraphInput::from(json!({})), GraphInput::Record(json!({})));
    }

    #[test]
    fn error_codes_distinguish_schema_failures() {
        let err = GraphError::Schema(SchemaError::UnsupportedVersion {
            version: 9,
            latest_supported: 2,
        });
        assert_eq!(error_code(&err), "unsupported_version");
        let err = GraphError::Schema(SchemaError::MissingField("pages"));
        assert_eq!(error_code(&err), "schema_invalid");
    }
}
