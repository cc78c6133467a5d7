//! Page record domain model.
//!
//! # Responsibility
//! - Define the canonical attributes of one page.
//! - Provide the copy-with-overrides constructor used by graph mutations.
//!
//! # Invariants
//! - `url` is fixed for the lifetime of a record and equals its map key.
//! - `labels` and `linked_pages` keep insertion order and hold no duplicates.
//! - An empty `note_url` means "not filed under any note".

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt::{Display, Formatter};

/// Human-readable page label.
///
/// The wire format allows either a string or a number here, so both are kept
/// verbatim to make serialization lossless.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DisplayName {
    Text(String),
    Number(serde_json::Number),
}

impl DisplayName {
    /// Returns the textual form used for comparisons and rendering.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Text(value) => Cow::Borrowed(value.as_str()),
            Self::Number(value) => Cow::Owned(value.to_string()),
        }
    }

    /// Loose equality against a url.
    ///
    /// Text compares verbatim. A number compares by value against the url
    /// read as a finite decimal, so `1.0` matches `"1"`.
    pub fn matches(&self, url: &str) -> bool {
        match self {
            Self::Text(value) => value == url,
            Self::Number(value) => {
                let Some(number) = value.as_f64() else {
                    return false;
                };
                url.trim()
                    .parse::<f64>()
                    .is_ok_and(|parsed| parsed.is_finite() && parsed == number)
            }
        }
    }
}

impl Display for DisplayName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(value) => f.write_str(value),
            Self::Number(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for DisplayName {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for DisplayName {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for DisplayName {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<u64> for DisplayName {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

impl From<serde_json::Number> for DisplayName {
    fn from(value: serde_json::Number) -> Self {
        Self::Number(value)
    }
}

/// Immutable attributes of one page.
///
/// Serialized with the camelCase wire names (`noteUrl`, `linkedPages`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRecord {
    url: String,
    display: DisplayName,
    note_url: String,
    labels: Vec<String>,
    linked_pages: Vec<String>,
}

impl PageRecord {
    /// Creates the default record for `url`.
    ///
    /// This is also the synthetic shape returned for pages the graph has
    /// never stored: display equals url and every other field is empty.
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            display: DisplayName::Text(url.clone()),
            url,
            note_url: String::new(),
            labels: Vec::new(),
            linked_pages: Vec::new(),
        }
    }

    /// Builds a record from already-normalized parts.
    ///
    /// `display` falls back to `url` when absent. Callers are responsible for
    /// duplicate-free sequences; the graph loader checks this before calling.
    pub fn from_parts(
        url: impl Into<String>,
        display: Option<DisplayName>,
        note_url: impl Into<String>,
        labels: Vec<String>,
        linked_pages: Vec<String>,
    ) -> Self {
        let url = url.into();
        Self {
            display: display.unwrap_or_else(|| DisplayName::Text(url.clone())),
            url,
            note_url: note_url.into(),
            labels,
            linked_pages,
        }
    }

    /// Returns a copy of this record with the fields named in `update`
    /// replaced and every other field carried over.
    pub fn with(&self, update: PageUpdate) -> Self {
        Self {
            url: self.url.clone(),
            display: update.display.unwrap_or_else(|| self.display.clone()),
            note_url: update.note_url.unwrap_or_else(|| self.note_url.clone()),
            labels: update.labels.unwrap_or_else(|| self.labels.clone()),
            linked_pages: update
                .linked_pages
                .unwrap_or_else(|| self.linked_pages.clone()),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn display(&self) -> &DisplayName {
        &self.display
    }

    /// Url of the note this page is filed under, or `""`.
    pub fn note_url(&self) -> &str {
        &self.note_url
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Urls of pages filed under this page as a note.
    pub fn linked_pages(&self) -> &[String] {
        &self.linked_pages
    }

    pub fn has_note(&self) -> bool {
        !self.note_url.is_empty()
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|value| value == label)
    }

    /// Returns whether this record carries no information beyond its url.
    ///
    /// Empty records are omitted from serialized output; reads synthesize
    /// them back unchanged.
    pub fn is_empty(&self) -> bool {
        self.display.matches(&self.url)
            && self.note_url.is_empty()
            && self.labels.is_empty()
            && self.linked_pages.is_empty()
    }
}

/// Partial override set applied by [`PageRecord::with`].
///
/// Unset fields keep the base record's value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageUpdate {
    display: Option<DisplayName>,
    note_url: Option<String>,
    labels: Option<Vec<String>>,
    linked_pages: Option<Vec<String>>,
}

impl PageUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn display(mut self, display: impl Into<DisplayName>) -> Self {
        self.display = Some(display.into());
        self
    }

    pub fn note_url(mut self, note_url: impl Into<String>) -> Self {
        self.note_url = Some(note_url.into());
        self
    }

    pub fn labels(mut self, labels: Vec<String>) -> Self {
        self.labels = Some(labels);
        self
    }

    pub fn linked_pages(mut self, linked_pages: Vec<String>) -> Self {
        self.linked_pages = Some(linked_pages);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{DisplayName, PageRecord, PageUpdate};

    #[test]
    fn new_record_is_empty() {
        let page = PageRecord::new("https://a.example");
        assert!(page.is_empty());
        assert_eq!(page.display(), &DisplayName::from("https://a.example"));
    }

    #[test]
    fn with_replaces_only_named_fields() {
        let base = PageRecord::new("a").with(PageUpdate::new().labels(vec!["red".to_string()]));
        let next = base.with(PageUpdate::new().note_url("n"));

        assert_eq!(next.url(), "a");
        assert_eq!(next.note_url(), "n");
        assert_eq!(next.labels(), ["red".to_string()]);
        assert_eq!(base.note_url(), "");
    }

    #[test]
    fn numeric_display_matching_url_counts_as_empty() {
        let page = PageRecord::new("42").with(PageUpdate::new().display(42_i64));
        assert!(page.is_empty());

        let renamed = page.with(PageUpdate::new().display(7_i64));
        assert!(!renamed.is_empty());
    }

    #[test]
    fn integral_float_display_matches_integer_url() {
        let one: serde_json::Number = serde_json::from_str("1.0").unwrap();
        let page = PageRecord::new("1").with(PageUpdate::new().display(one.clone()));
        assert!(page.is_empty());
        assert_eq!(page.display().as_text(), "1.0");

        assert!(DisplayName::from(1_i64).matches("1.0"));
        assert!(!DisplayName::Number(one).matches("1.5"));
        assert!(!DisplayName::from(1_i64).matches("one"));
        assert!(!DisplayName::from("1.0").matches("1"));
    }
}
