//! Schema upgrade registry applied to raw records before adoption.
//!
//! # Responsibility
//! - Define the `Converter` contract consumed by graph construction.
//! - Upgrade older record versions to the current shape in ascending order.
//!
//! # Invariants
//! - Upgrade steps are registered with strictly increasing source versions.
//! - Records newer than `CURRENT_SCHEMA_VERSION` are rejected, never guessed.
//! - A converted record always carries `version == CURRENT_SCHEMA_VERSION`.
//!
//! `SchemaConverter` only accepts versions it knows how to upgrade. Callers
//! that treat `version` as an opaque value pass their own `Converter`; an
//! identity implementation (`Ok(raw)`) keeps any version untouched.

use crate::graph::SchemaError;
use log::{debug, warn};
use serde_json::{Map, Value};

/// Schema version produced by this crate.
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

/// Maps a raw record of any supported shape to the current shape.
pub trait Converter {
    fn convert(&self, raw: Value) -> Result<Value, SchemaError>;
}

type UpgradeFn = fn(&mut Map<String, Value>) -> Result<(), SchemaError>;

#[derive(Clone, Copy)]
struct Upgrade {
    /// Version this step upgrades from; the step produces `from_version + 1`.
    from_version: u32,
    apply: UpgradeFn,
}

const UPGRADES: &[Upgrade] = &[Upgrade {
    from_version: 1,
    apply: derive_missing_indexes,
}];

/// Returns the oldest record version this binary can upgrade.
pub fn oldest_supported_version() -> u32 {
    UPGRADES
        .first()
        .map_or(CURRENT_SCHEMA_VERSION, |upgrade| upgrade.from_version)
}

/// Default converter backed by the built-in upgrade registry.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaConverter;

impl Converter for SchemaConverter {
    fn convert(&self, raw: Value) -> Result<Value, SchemaError> {
        let Value::Object(mut record) = raw else {
            return Err(SchemaError::NotAnObject("record"));
        };

        let version = read_version(&record)?;
        if version > CURRENT_SCHEMA_VERSION {
            warn!(
                "event=schema_convert module=convert status=error error_code=unsupported_version version={}",
                version
            );
            return Err(SchemaError::UnsupportedVersion {
                version,
                latest_supported: CURRENT_SCHEMA_VERSION,
            });
        }
        if version < oldest_supported_version() {
            return Err(SchemaError::InvalidField {
                field: "version".to_string(),
                message: format!(
                    "version {version} predates oldest supported {}",
                    oldest_supported_version()
                ),
            });
        }
        if version == CURRENT_SCHEMA_VERSION {
            return Ok(Value::Object(record));
        }

        for upgrade in UPGRADES {
            if upgrade.from_version < version {
                continue;
            }
            (upgrade.apply)(&mut record)?;
        }
        record.insert("version".to_string(), Value::from(CURRENT_SCHEMA_VERSION));

        debug!(
            "event=schema_convert module=convert status=ok from_version={} to_version={}",
            version, CURRENT_SCHEMA_VERSION
        );
        Ok(Value::Object(record))
    }
}

fn read_version(record: &Map<String, Value>) -> Result<u32, SchemaError> {
    let value = record
        .get("version")
        .ok_or(SchemaError::MissingField("version"))?;
    value
        .as_u64()
        .and_then(|version| u32::try_from(version).ok())
        .ok_or_else(|| SchemaError::InvalidField {
            field: "version".to_string(),
            message: format!("expected a non-negative integer, got `{value}`"),
        })
}

/// Version 1 records only stored the page table; rebuild the label index
/// and the note listing from it when they are absent.
fn derive_missing_indexes(record: &mut Map<String, Value>) -> Result<(), SchemaError> {
    let pages = match record
        .entry("pages")
        .or_insert_with(|| Value::Object(Map::new()))
    {
        Value::Object(pages) => pages.clone(),
        _ => return Err(SchemaError::NotAnObject("pages")),
    };

    if !record.contains_key("labels") {
        let mut labels: Map<String, Value> = Map::new();
        for (url, page) in &pages {
            for label in string_items(page.get("labels")) {
                let members = labels
                    .entry(label.to_string())
                    .or_insert_with(|| Value::Array(Vec::new()));
                if let Value::Array(members) = members {
                    if !members.iter().any(|member| member.as_str() == Some(url.as_str())) {
                        members.push(Value::from(url.as_str()));
                    }
                }
            }
        }
        record.insert("labels".to_string(), Value::Object(labels));
    }

    if !record.contains_key("notes") {
        let notes = pages
            .iter()
            .filter(|(_, page)| string_items(page.get("linkedPages")).next().is_some())
            .map(|(url, _)| Value::from(url.as_str()))
            .collect();
        record.insert("notes".to_string(), Value::Array(notes));
    }

    Ok(())
}

fn string_items(value: Option<&Value>) -> impl Iterator<Item = &str> {
    value
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
}
