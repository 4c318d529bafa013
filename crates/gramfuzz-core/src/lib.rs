//! Data model for the grammar-to-fuzzer compiler.
//!
//! This crate owns no parsing and no I/O. It provides the structures that
//! live for the duration of one compilation:
//!
//! - [`graph`] — the grammar graph and its minimum-derivation-depth solver.
//! - [`placeholders`] — the deferred-substitution placeholder table.
//! - [`error`] — the error types the graph and placeholder table can raise.
//! - [`utils`] — small naming-convention helpers shared by the emitter.

pub mod error;
pub mod graph;
pub mod placeholders;
pub mod utils;

pub use error::{GraphError, SubstitutionError};
pub use graph::{Depth, GrammarGraph, NodeId, VertexKind};
pub use placeholders::PlaceholderTable;
