//! Error taxonomy for graph construction and serialization.
//!
//! Mutations never fail; only loading (parse/convert/validate) and encoding
//! return errors.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub type GraphResult<T> = Result<T, GraphError>;

/// Structurally invalid record, detected after conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// The record (or a nested value that must be a mapping) is not an object.
    NotAnObject(&'static str),
    MissingField(&'static str),
    InvalidField {
        field: String,
        message: String,
    },
    UnsupportedVersion {
        version: u32,
        latest_supported: u32,
    },
    /// A page entry's `url` disagrees with the key it is stored under.
    PageKeyMismatch {
        key: String,
        url: String,
    },
    /// A page sequence contains the same value twice.
    DuplicateEntry {
        page: String,
        field: &'static str,
        value: String,
    },
    /// Page table and derived indexes disagree.
    IntegrityViolation(String),
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnObject(what) => write!(f, "{what} must be a JSON object"),
            Self::MissingField(field) => write!(f, "missing required field `{field}`"),
            Self::InvalidField { field, message } => {
                write!(f, "invalid field `{field}`: {message}")
            }
            Self::UnsupportedVersion {
                version,
                latest_supported,
            } => write!(
                f,
                "record schema version {version} is newer than supported {latest_supported}"
            ),
            Self::PageKeyMismatch { key, url } => {
                write!(f, "page stored under `{key}` declares url `{url}`")
            }
            Self::DuplicateEntry { page, field, value } => {
                write!(f, "page `{page}` lists `{value}` twice in `{field}`")
            }
            Self::IntegrityViolation(details) => write!(f, "integrity violation: {details}"),
        }
    }
}

impl Error for SchemaError {}

/// Failure while loading or encoding a page graph.
#[derive(Debug)]
pub enum GraphError {
    /// Input text is not valid JSON.
    Parse(serde_json::Error),
    Schema(SchemaError),
    Encode(serde_json::Error),
}

impl Display for GraphError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "failed to parse page graph: {err}"),
            Self::Schema(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode page graph: {err}"),
        }
    }
}

impl Error for GraphError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Schema(err) => Some(err),
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<SchemaError> for GraphError {
    fn from(value: SchemaError) -> Self {
        Self::Schema(value)
    }
}
