//! Page graph aggregate and its persisted record format.
//!
//! # Responsibility
//! - Own pages, the label index and the note listing in memory.
//! - Expose total query/mutation APIs that keep derived indexes consistent.
//! - Decode and encode the JSON record shape.
//!
//! # Invariants
//! - Access is single-threaded; mutators take `&mut self` and run to
//!   completion, so no caller observes a partial update.
//! - Only loading and encoding can fail.

mod error;
mod page_graph;
mod view;
mod wire;

pub use error::{GraphError, GraphResult, SchemaError};
pub use page_graph::PageGraph;
pub use view::GraphView;
