//! Read-only access used by rendering layers.

use super::PageGraph;
use crate::model::page::PageRecord;
use std::borrow::Cow;

/// Query surface of a page graph without any way to mutate it.
///
/// Renderers take `&impl GraphView`; all writes go through the owner.
pub trait GraphView {
    fn get_page(&self, url: &str) -> Cow<'_, PageRecord>;
    fn get_label(&self, label: &str) -> &[String];
    fn version(&self) -> u32;
    fn labels(&self) -> Box<dyn Iterator<Item = &str> + '_>;
    fn notes(&self) -> &[String];
}

impl GraphView for PageGraph {
    fn get_page(&self, url: &str) -> Cow<'_, PageRecord> {
        PageGraph::get_page(self, url)
    }

    fn get_label(&self, label: &str) -> &[String] {
        PageGraph::get_label(self, label)
    }

    fn version(&self) -> u32 {
        PageGraph::version(self)
    }

    fn labels(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        Box::new(PageGraph::labels(self))
    }

    fn notes(&self) -> &[String] {
        PageGraph::notes(self)
    }
}
