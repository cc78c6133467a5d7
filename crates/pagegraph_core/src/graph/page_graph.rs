//! In-memory page graph: page table, label index and note listing.
//!
//! # Responsibility
//! - Own the page table and keep the label index consistent with it.
//! - Maintain the two-sided note relation (`note_url` / `linked_pages`).
//! - Serialize to the persisted record shape, omitting empty pages.
//!
//! # Invariants
//! - Every label carried by a page lists that page exactly once in the
//!   label index, and every index entry points back at a carrying page.
//! - A page with a non-empty `note_url` appears exactly once in its note
//!   target's `linked_pages`, and every linked page points back.
//! - Mutations are total: no-op conditions return silently.
//! - Reads never insert pages.

use super::wire::{decode_record, GraphRecordRef, LabelIndexRef};
use super::{GraphError, GraphResult, SchemaError};
use crate::convert::Converter;
use crate::model::page::{DisplayName, PageRecord, PageUpdate};
use log::debug;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Mutable page store plus its derived indexes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageGraph {
    version: u32,
    pages: BTreeMap<String, PageRecord>,
    labels: BTreeMap<String, Vec<String>>,
    /// Label names in first-seen order; mirrors the keys of `labels`.
    label_order: Vec<String>,
    notes: Vec<String>,
}

impl PageGraph {
    /// Creates an empty graph stamped with `version`.
    pub fn new(version: u32) -> Self {
        Self {
            version,
            pages: BTreeMap::new(),
            labels: BTreeMap::new(),
            label_order: Vec::new(),
            notes: Vec::new(),
        }
    }

    /// Builds a graph from a structured record after running `converter`.
    ///
    /// # Errors
    /// - Returns `GraphError::Schema` when the converted record is malformed.
    pub fn from_value(raw: Value, converter: &impl Converter) -> GraphResult<Self> {
        let converted = converter.convert(raw)?;
        let decoded = decode_record(converted)?;
        Ok(Self {
            version: decoded.version,
            pages: decoded.pages,
            labels: decoded.labels,
            label_order: decoded.label_order,
            notes: decoded.notes,
        })
    }

    /// Parses serialized JSON text, then behaves like [`PageGraph::from_value`].
    ///
    /// # Errors
    /// - Returns `GraphError::Parse` when `input` is not valid JSON.
    /// - Returns `GraphError::Schema` when the record is malformed.
    pub fn from_json(input: &str, converter: &impl Converter) -> GraphResult<Self> {
        let raw: Value = serde_json::from_str(input).map_err(GraphError::Parse)?;
        Self::from_value(raw, converter)
    }

    /// Returns the persisted record shape as a JSON value.
    pub fn to_value(&self) -> GraphResult<Value> {
        serde_json::to_value(self).map_err(GraphError::Encode)
    }

    /// Returns the persisted record shape as compact JSON text.
    pub fn to_json_string(&self) -> GraphResult<String> {
        serde_json::to_string(self).map_err(GraphError::Encode)
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Returns the stored record, or a synthetic empty one for unknown urls.
    pub fn get_page(&self, url: &str) -> Cow<'_, PageRecord> {
        match self.pages.get(url) {
            Some(page) => Cow::Borrowed(page),
            None => Cow::Owned(PageRecord::new(url)),
        }
    }

    /// Returns whether `url` has a stored record (synthetic reads excluded).
    pub fn contains_page(&self, url: &str) -> bool {
        self.pages.contains_key(url)
    }

    /// Returns member urls of `label`, empty for unknown labels.
    pub fn get_label(&self, label: &str) -> &[String] {
        self.labels.get(label).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns every known label name in the order it was first added.
    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.label_order.iter().map(String::as_str)
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    /// Replaces the display label of a stored page.
    ///
    /// Unknown urls are ignored; this never creates a page.
    pub fn set_display(&mut self, url: &str, display: impl Into<DisplayName>) {
        let Some(page) = self.pages.get(url) else {
            debug!("event=set_display module=graph status=noop reason=unknown_page");
            return;
        };
        let next = page.with(PageUpdate::new().display(display));
        self.replace_page(next);
        debug!("event=set_display module=graph status=ok");
    }

    /// Files `url` under `note_url`, or detaches it when `note_url` is empty.
    ///
    /// Creates the page and the note target on demand. A non-empty target is
    /// also recorded in the note listing.
    pub fn set_note(&mut self, url: &str, note_url: &str) {
        let page = self.get_or_insert_page(url);
        if page.note_url() == note_url {
            debug!("event=set_note module=graph status=noop reason=unchanged");
            return;
        }
        let old_note = page.note_url().to_string();
        let next = page.with(PageUpdate::new().note_url(note_url));
        self.replace_page(next);

        if !old_note.is_empty() {
            if let Some(old_target) = self.pages.get(&old_note) {
                let linked = without(old_target.linked_pages(), url);
                let next = old_target.with(PageUpdate::new().linked_pages(linked));
                self.replace_page(next);
            }
        }

        if !note_url.is_empty() {
            let next = match self.pages.get(note_url) {
                None => PageRecord::new(note_url)
                    .with(PageUpdate::new().linked_pages(vec![url.to_string()])),
                Some(target) => {
                    let mut linked = target.linked_pages().to_vec();
                    if !linked.iter().any(|member| member == url) {
                        linked.push(url.to_string());
                    }
                    target.with(PageUpdate::new().linked_pages(linked))
                }
            };
            self.replace_page(next);

            if !self.notes.iter().any(|note| note == note_url) {
                self.notes.push(note_url.to_string());
            }
        }

        debug!(
            "event=set_note module=graph status=ok detached_old={} attached_new={}",
            !old_note.is_empty(),
            !note_url.is_empty()
        );
    }

    /// Appends `label` to `url` and to the label index.
    ///
    /// Empty labels are ignored. The page is created on demand.
    pub fn add_label(&mut self, url: &str, label: &str) {
        if label.is_empty() {
            debug!("event=add_label module=graph status=noop reason=empty_label");
            return;
        }
        let page = self.get_or_insert_page(url);
        if page.has_label(label) {
            debug!("event=add_label module=graph status=noop reason=already_present");
            return;
        }
        let mut labels = page.labels().to_vec();
        labels.push(label.to_string());
        let next = page.with(PageUpdate::new().labels(labels));
        self.replace_page(next);

        if !self.labels.contains_key(label) {
            self.label_order.push(label.to_string());
        }
        let members = self.labels.entry(label.to_string()).or_default();
        if !members.iter().any(|member| member == url) {
            members.push(url.to_string());
        }
        debug!(
            "event=add_label module=graph status=ok label_members={}",
            members.len()
        );
    }

    /// Removes `label` from `url` and from the label index.
    ///
    /// The label key stays in the index even when its last member leaves.
    pub fn rem_label(&mut self, url: &str, label: &str) {
        if label.is_empty() {
            debug!("event=rem_label module=graph status=noop reason=empty_label");
            return;
        }
        let Some(page) = self.pages.get(url) else {
            debug!("event=rem_label module=graph status=noop reason=unknown_page");
            return;
        };
        if !page.has_label(label) {
            debug!("event=rem_label module=graph status=noop reason=not_present");
            return;
        }
        let next = page.with(PageUpdate::new().labels(without(page.labels(), label)));
        self.replace_page(next);

        if let Some(members) = self.labels.get_mut(label) {
            members.retain(|member| member != url);
        }
        debug!("event=rem_label module=graph status=ok");
    }

    /// Detaches every page filed under `note_url` and drops it from the note
    /// listing.
    ///
    /// Linked pages keep their labels; the note page keeps its own note.
    pub fn delete_note(&mut self, note_url: &str) {
        let linked = match self.pages.get(note_url) {
            Some(note) if !note.linked_pages().is_empty() => note.linked_pages().to_vec(),
            _ => {
                debug!("event=delete_note module=graph status=noop reason=no_linked_pages");
                return;
            }
        };

        for member in &linked {
            if let Some(page) = self.pages.get(member) {
                let next = page.with(PageUpdate::new().note_url(""));
                self.replace_page(next);
            }
        }
        // Re-read: a self-linked note was just detached inside the loop.
        if let Some(note) = self.pages.get(note_url) {
            let next = note.with(PageUpdate::new().linked_pages(Vec::new()));
            self.replace_page(next);
        }
        self.notes.retain(|note| note != note_url);

        debug!(
            "event=delete_note module=graph status=ok detached={}",
            linked.len()
        );
    }

    /// Removes `label` from every carrying page and from the index.
    pub fn delete_label(&mut self, label: &str) {
        let Some(members) = self.labels.remove(label) else {
            debug!("event=delete_label module=graph status=noop reason=unknown_label");
            return;
        };
        self.label_order.retain(|name| name != label);

        for member in &members {
            if let Some(page) = self.pages.get(member) {
                let next = page.with(PageUpdate::new().labels(without(page.labels(), label)));
                self.replace_page(next);
            }
        }
        debug!(
            "event=delete_label module=graph status=ok detached={}",
            members.len()
        );
    }

    /// Checks the page table against the label index and the note relation.
    ///
    /// # Errors
    /// - Returns `SchemaError::IntegrityViolation` describing the first
    ///   inconsistency found.
    pub fn verify_integrity(&self) -> Result<(), SchemaError> {
        for (url, page) in &self.pages {
            if page.url() != url {
                return Err(violation(format!(
                    "page stored under `{url}` has url `{}`",
                    page.url()
                )));
            }
            if let Some(label) = first_duplicate(page.labels()) {
                return Err(violation(format!("page `{url}` carries `{label}` twice")));
            }
            if let Some(member) = first_duplicate(page.linked_pages()) {
                return Err(violation(format!("note `{url}` links `{member}` twice")));
            }

            for label in page.labels() {
                let listed = occurrences(self.get_label(label), url);
                if listed != 1 {
                    return Err(violation(format!(
                        "label `{label}` lists page `{url}` {listed} times"
                    )));
                }
            }

            if page.has_note() {
                let linked = self
                    .pages
                    .get(page.note_url())
                    .map_or(0, |note| occurrences(note.linked_pages(), url));
                if linked != 1 {
                    return Err(violation(format!(
                        "note `{}` links page `{url}` {linked} times",
                        page.note_url()
                    )));
                }
            }

            for member in page.linked_pages() {
                if self.get_page(member).note_url() != url {
                    return Err(violation(format!(
                        "page `{member}` is linked from `{url}` but is not filed under it"
                    )));
                }
            }
        }

        for (label, members) in &self.labels {
            if let Some(member) = first_duplicate(members) {
                return Err(violation(format!("label `{label}` lists `{member}` twice")));
            }
            for member in members {
                if !self.get_page(member).has_label(label) {
                    return Err(violation(format!(
                        "label `{label}` lists `{member}` which does not carry it"
                    )));
                }
            }
        }

        Ok(())
    }

    /// Number of stored pages, including empty ones not yet serialized away.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn get_or_insert_page(&mut self, url: &str) -> &PageRecord {
        self.pages
            .entry(url.to_string())
            .or_insert_with(|| PageRecord::new(url))
    }

    fn replace_page(&mut self, page: PageRecord) {
        self.pages.insert(page.url().to_string(), page);
    }
}

impl Serialize for PageGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        GraphRecordRef {
            version: self.version,
            pages: self
                .pages
                .iter()
                .filter(|(_, page)| !page.is_empty())
                .map(|(url, page)| (url.as_str(), page))
                .collect(),
            labels: LabelIndexRef {
                order: &self.label_order,
                index: &self.labels,
            },
            notes: &self.notes,
        }
        .serialize(serializer)
    }
}

fn without(values: &[String], value: &str) -> Vec<String> {
    values
        .iter()
        .filter(|current| current.as_str() != value)
        .cloned()
        .collect()
}

fn occurrences(values: &[String], value: &str) -> usize {
    values.iter().filter(|current| current.as_str() == value).count()
}

fn first_duplicate(values: &[String]) -> Option<&str> {
    values
        .iter()
        .enumerate()
        .find(|(index, value)| values[..*index].contains(*value))
        .map(|(_, value)| value.as_str())
}

fn violation(details: String) -> SchemaError {
    SchemaError::IntegrityViolation(details)
}
