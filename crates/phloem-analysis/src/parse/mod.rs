//! Parser adapter around the generated tree-sitter PHP grammar.
//!
//! The grammar is an external collaborator: it hands us a concrete syntax
//! tree, and `lower` maps that tree into the closed node model. Syntax
//! errors are per-file fatal; lowering gaps are surfaced as diagnostics on
//! the returned [`ParsedFile`].

mod lower;


use std::path::{Path, PathBuf};

use phloem_ast::{Ast, NodeId};

use crate::diagnostics::Diagnostics;
use crate::util;
use lower::Lowerer;

/// A file that failed to parse: path, 1-based line, and reason.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}:{line}: {message}", path.display())]
pub struct ParseError {
    pub path: PathBuf,
    pub line: u32,
    pub message: String,
}

/// Result of parsing one source file.
#[derive(Debug)]
pub struct ParsedFile {
    /// Root of the freshly built `SyntaxTree`.
    pub root: NodeId,
    /// Lowering diagnostics (unknown grammar contexts, odd literals).
    pub diagnostics: Diagnostics,
}

/// Reusable parser handle. Construction configures the PHP grammar once;
/// every parse allocates into the caller's arena.
pub struct SourceParser {
    parser: tree_sitter::Parser,
}

impl SourceParser {
    pub fn new() -> Self {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_php::LANGUAGE_PHP.into())
            .expect("failed to set PHP grammar");
        Self { parser }
    }

    /// Parse the file at `path` into `ast`.
    pub fn parse_file(&mut self, ast: &mut Ast, path: &Path) -> Result<ParsedFile, ParseError> {
        let source = std::fs::read_to_string(path).map_err(|err| ParseError {
            path: util::absolute_path(path),
            line: 1,
            message: err.to_string(),
        })?;
        self.parse_source(ast, &source, path)
    }

    /// Parse in-memory source as if it lived at `path`. The path decides
    /// the tree's `file_path`/`file_location`/`file_name` and the base
    /// directory for include resolution; it does not have to exist.
    pub fn parse_source(
        &mut self,
        ast: &mut Ast,
        source: &str,
        path: &Path,
    ) -> Result<ParsedFile, ParseError> {
        let abs = util::absolute_path(path);
        let tree = self
            .parser
            .parse(source, None)
            .expect("tree-sitter returned no tree");

        if tree.root_node().has_error() {
            return Err(syntax_error(tree.root_node(), source, &abs));
        }

        let mut lowerer = Lowerer::new(source.as_bytes());
        let root = lowerer.lower_file(ast, tree.root_node(), &abs);
        Ok(ParsedFile {
            root,
            diagnostics: lowerer.into_diagnostics(),
        })
    }
}

impl Default for SourceParser {
    fn default() -> Self {
        Self::new()
    }
}

fn syntax_error(root: tree_sitter::Node<'_>, source: &str, path: &Path) -> ParseError {
    let node = find_error_node(root).unwrap_or(root);
    let line = node.start_position().row as u32 + 1;
    let excerpt: String = source
        .get(node.byte_range())
        .unwrap_or("")
        .chars()
        .take(24)
        .collect();
    let message = if node.is_missing() {
        format!("syntax error: missing `{}`", node.kind())
    } else if excerpt.is_empty() {
        "syntax error".to_string()
    } else {
        format!("syntax error near `{}`", excerpt.trim())
    };
    ParseError {
        path: path.to_path_buf(),
        line,
        message,
    }
}

fn find_error_node(node: tree_sitter::Node<'_>) -> Option<tree_sitter::Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = find_error_node(child) {
            return Some(found);
        }
    }
    Some(node)
}
