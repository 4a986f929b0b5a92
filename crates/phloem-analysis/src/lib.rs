//! PHP project analysis on top of the `phloem-ast` node model.
//!
//! The pipeline: `parse` wraps the generated tree-sitter grammar and
//! lowers files into the arena; `resource` collects a project's files and
//! derives symbol tables; `visitors` hosts the dependency resolvers and
//! the query visitors; `diagnostics` accumulates and renders recoverable
//! defects.
//!
//! # Example
//!
//! ```no_run
//! use phloem_analysis::build_resolved_resource_tree;
//!
//! let tree = build_resolved_resource_tree("path/to/project")?;
//! for (file, definition) in tree.function_finder("handler", false, None) {
//!     println!("{}: {:?}", file.display(), tree.ast.line(definition));
//! }
//! # Ok::<(), phloem_analysis::Error>(())
//! ```

use std::path::{Path, PathBuf};

use phloem_ast::Ast;

pub mod builtins;
pub mod diagnostics;
pub mod parse;
pub mod resource;
pub mod util;
pub mod visitors;


pub use diagnostics::{Diagnostic, Diagnostics, DiagnosticsPrinter, Severity};
pub use parse::{ParseError, ParsedFile, SourceParser};
pub use resource::{MethodEntry, ResourceTree, Tables};

/// Errors surfaced by the facade entry points.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The project root handed to the resource tree does not exist.
    #[error("invalid path: {}", .0.display())]
    InvalidPath(PathBuf),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Parse a single file into `ast`, returning the root of its tree.
pub fn build_syntax_tree(
    ast: &mut Ast,
    path: impl AsRef<Path>,
) -> Result<ParsedFile, ParseError> {
    SourceParser::new().parse_file(ast, path.as_ref())
}

/// Build a resource tree in one call: collect files, parse them, and
/// derive the definition tables. Include expansion is left to the caller.
pub fn build_resource_tree(path: impl AsRef<Path>) -> Result<ResourceTree, Error> {
    let mut tree = ResourceTree::new(path)?;
    tree.build_trees();
    tree.build_tables();
    Ok(tree)
}

/// Like [`build_resource_tree`], but expands include/require edges before
/// table construction so dependency edges are populated.
pub fn build_resolved_resource_tree(path: impl AsRef<Path>) -> Result<ResourceTree, Error> {
    let mut tree = ResourceTree::new(path)?;
    tree.build_trees();
    tree.resolve_dependencies();
    tree.build_tables();
    Ok(tree)
}
