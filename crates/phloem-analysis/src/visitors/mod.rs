//! Visitors that expand, index, and query the syntax trees.

pub mod find;
pub mod output;
pub mod resolve;
pub mod tables;

#[cfg(test)]
mod find_tests;
#[cfg(test)]
mod output_tests;
#[cfg(test)]
mod resolve_tests;

pub use find::{CallSite, Found, FoundKind, FoundName, NameFinder, NodeFinder, ResourceCallsFinder};
pub use output::{Graph, GraphBuilder, NameHighlighter, Printer};
pub use resolve::{DependencyResolver, FoldFailure, IncludeFailure, ResourceDependencyResolver};
pub use tables::TablesBuilder;
