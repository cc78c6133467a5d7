//! Value types shared by the page graph and its callers.
//!
//! # Responsibility
//! - Define the immutable per-page record and its display label type.
//! - Provide the duplicate-with-replace update used by every graph mutation.
//!
//! # Invariants
//! - A `PageRecord` is never mutated in place; changes build a new record.
//! - `url` is the identity key and never changes through an update.

pub mod page;
