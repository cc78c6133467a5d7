//! Persisted record shape and its strict decoder.
//!
//! # Responsibility
//! - Decode a converted JSON record into normalized page records and indexes.
//! - Reject structurally invalid records with a `SchemaError`.
//!
//! # Invariants
//! - Every decoded page's `url` equals the key it is stored under.
//! - Decoded page sequences are duplicate-free.

use super::SchemaError;
use crate::model::page::{DisplayName, PageRecord};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Raw page entry; every field except the key is optional on the wire.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPage {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    display: Option<DisplayName>,
    #[serde(default)]
    note_url: Option<String>,
    #[serde(default)]
    labels: Option<Vec<String>>,
    #[serde(default)]
    linked_pages: Option<Vec<String>>,
}

/// Normalized contents of a record, ready to be adopted by `PageGraph`.
#[derive(Debug)]
pub(crate) struct DecodedGraph {
    pub version: u32,
    pub pages: BTreeMap<String, PageRecord>,
    pub labels: BTreeMap<String, Vec<String>>,
    /// Label names in the order the record listed them.
    pub label_order: Vec<String>,
    pub notes: Vec<String>,
}

/// Borrowed view written out by `PageGraph`'s `Serialize` impl.
#[derive(Serialize)]
pub(crate) struct GraphRecordRef<'a> {
    pub version: u32,
    pub pages: BTreeMap<&'a str, &'a PageRecord>,
    pub labels: LabelIndexRef<'a>,
    pub notes: &'a [String],
}

/// Label index written in `order` rather than map order.
pub(crate) struct LabelIndexRef<'a> {
    pub order: &'a [String],
    pub index: &'a BTreeMap<String, Vec<String>>,
}

impl Serialize for LabelIndexRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.order.len()))?;
        for name in self.order {
            let members = self.index.get(name).map(Vec::as_slice).unwrap_or(&[]);
            map.serialize_entry(name, members)?;
        }
        map.end()
    }
}

pub(crate) fn decode_record(raw: Value) -> Result<DecodedGraph, SchemaError> {
    let Value::Object(mut record) = raw else {
        return Err(SchemaError::NotAnObject("record"));
    };

    let version = take_field(&mut record, "version")?;
    let version = version
        .as_u64()
        .and_then(|value| u32::try_from(value).ok())
        .ok_or_else(|| {
            invalid(
                "version",
                format!("expected a non-negative integer, got `{version}`"),
            )
        })?;

    let Value::Object(raw_pages) = take_field(&mut record, "pages")? else {
        return Err(SchemaError::NotAnObject("pages"));
    };
    let mut pages = BTreeMap::new();
    for (key, value) in raw_pages {
        let page = decode_page(&key, value)?;
        pages.insert(key, page);
    }

    let Value::Object(raw_labels) = take_field(&mut record, "labels")? else {
        return Err(SchemaError::NotAnObject("labels"));
    };
    let mut labels = BTreeMap::new();
    let mut label_order = Vec::with_capacity(raw_labels.len());
    for (name, members) in raw_labels {
        let members: Vec<String> = serde_json::from_value(members)
            .map_err(|err| invalid(format!("labels.{name}"), err.to_string()))?;
        label_order.push(name.clone());
        labels.insert(name, members);
    }

    let notes: Vec<String> = serde_json::from_value(take_field(&mut record, "notes")?)
        .map_err(|err| invalid("notes", err.to_string()))?;

    Ok(DecodedGraph {
        version,
        pages,
        labels,
        label_order,
        notes,
    })
}

fn decode_page(key: &str, value: Value) -> Result<PageRecord, SchemaError> {
    if !value.is_object() {
        return Err(invalid(format!("pages.{key}"), "expected an object".to_string()));
    }
    let raw: RawPage = serde_json::from_value(value)
        .map_err(|err| invalid(format!("pages.{key}"), err.to_string()))?;

    if let Some(url) = raw.url.as_deref() {
        if url != key {
            return Err(SchemaError::PageKeyMismatch {
                key: key.to_string(),
                url: url.to_string(),
            });
        }
    }

    let labels = raw.labels.unwrap_or_default();
    ensure_unique(key, "labels", &labels)?;
    let linked_pages = raw.linked_pages.unwrap_or_default();
    ensure_unique(key, "linkedPages", &linked_pages)?;

    Ok(PageRecord::from_parts(
        key,
        raw.display,
        raw.note_url.unwrap_or_default(),
        labels,
        linked_pages,
    ))
}

fn take_field(record: &mut Map<String, Value>, field: &'static str) -> Result<Value, SchemaError> {
    record.remove(field).ok_or(SchemaError::MissingField(field))
}

fn ensure_unique(page: &str, field: &'static str, values: &[String]) -> Result<(), SchemaError> {
    for (index, value) in values.iter().enumerate() {
        if values[..index].contains(value) {
            return Err(SchemaError::DuplicateEntry {
                page: page.to_string(),
                field,
                value: value.clone(),
            });
        }
    }
    Ok(())
}

fn invalid(field: impl Into<String>, message: String) -> SchemaError {
    SchemaError::InvalidField {
        field: field.into(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::decode_record;
    use crate::graph::SchemaError;
    use serde_json::json;

    #[test]
    fn missing_page_fields_take_defaults() {
        let decoded = decode_record(json!({
            "version": 2,
            "pages": {"a": {}, "b": {"display": null, "noteUrl": "a"}},
            "labels": {},
            "notes": []
        }))
        .unwrap();

        let a = &decoded.pages["a"];
        assert_eq!(a.url(), "a");
        assert!(a.is_empty());
        assert_eq!(decoded.pages["b"].display().as_text(), "b");
        assert_eq!(decoded.pages["b"].note_url(), "a");
    }

    #[test]
    fn non_object_pages_is_a_schema_error() {
        let err = decode_record(json!({
            "version": 2,
            "pages": ["a"],
            "labels": {},
            "notes": []
        }))
        .unwrap_err();
        assert_eq!(err, SchemaError::NotAnObject("pages"));
    }

    #[test]
    fn page_url_must_match_key() {
        let err = decode_record(json!({
            "version": 2,
            "pages": {"a": {"url": "b"}},
            "labels": {},
            "notes": []
        }))
        .unwrap_err();
        assert_eq!(
            err,
            SchemaError::PageKeyMismatch {
                key: "a".to_string(),
                url: "b".to_string(),
            }
        );
    }

    #[test]
    fn duplicate_labels_are_rejected() {
        let err = decode_record(json!({
            "version": 2,
            "pages": {"a": {"labels": ["x", "x"]}},
            "labels": {"x": ["a"]},
            "notes": []
        }))
        .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateEntry { field: "labels", .. }));
    }

    #[test]
    fn wrongly_typed_fields_are_rejected() {
        let err = decode_record(json!({
            "version": 2,
            "pages": {"a": {"labels": "x"}},
            "labels": {},
            "notes": []
        }))
        .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidField { ref field, .. } if field == "pages.a"));

        let err = decode_record(json!({
            "version": 2,
            "pages": {},
            "labels": {},
            "notes": "a"
        }))
        .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidField { ref field, .. } if field == "notes"));
    }

    #[test]
    fn label_order_follows_the_record() {
        let decoded = decode_record(json!({
            "version": 2,
            "pages": {},
            "labels": {"Zeta": [], "Alpha": [], "Mid": []},
            "notes": []
        }))
        .unwrap();
        assert_eq!(decoded.label_order, ["Zeta", "Alpha", "Mid"]);
    }
}
