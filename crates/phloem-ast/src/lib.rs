//! Arena-allocated PHP syntax tree model and traversal framework.
//!
//! This crate holds the language-independent half of the analyzer:
//! - `node` - the closed set of AST variants and their field lists
//! - `arena` - index-based node storage shared across files
//! - `visit` - the visitor protocol and the namespace stack
//! - `traverse` - breadth-first and depth-first walkers
//!
//! Parsing PHP sources into this model and everything file-system aware
//! (resource trees, dependency resolution, finders) lives in
//! `phloem-analysis`.

pub mod arena;
pub mod node;
pub mod traverse;
pub mod visit;

#[cfg(test)]
mod node_tests;

pub use arena::{Ast, NodeData, NodeId};
pub use node::{CallTarget, FieldValue, NodeKind, UseKind};
pub use traverse::{BfTraverser, DfTraverser, TraverseError};
pub use visit::{NamespaceStack, Visitor};
