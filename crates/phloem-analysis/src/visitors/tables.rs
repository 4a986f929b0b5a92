//! Symbol table construction.

use std::path::Path;

use phloem_ast::{Ast, NamespaceStack, NodeId, NodeKind, Visitor};

use crate::resource::{MethodEntry, Tables};

/// Collects function and method definitions (and dependency edges for
/// already-resolved includes) per file. Runs against each tree of a
/// resource tree; the accumulated tables are merged back afterwards, so
/// the visitor never aliases the resource tree it is indexing.
#[derive(Debug, Default)]
pub struct TablesBuilder {
    tables: Tables,
}

impl TablesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_tables(self) -> Tables {
        self.tables
    }
}

impl Visitor for TablesBuilder {
    fn visit(&mut self, ast: &mut Ast, node: NodeId, stack: &NamespaceStack) {
        // Nothing to index until the walk is inside a file.
        let Some(file) = stack.last_file(ast) else {
            return;
        };
        let Some(file_path) = ast.file_path(file).map(Path::to_path_buf) else {
            return;
        };

        match ast.kind(node) {
            NodeKind::Function { name, .. } => {
                self.tables
                    .functions
                    .entry(file_path)
                    .or_default()
                    .insert(name.clone(), node);
            }
            NodeKind::Method { name, .. } => {
                // Only methods of a class are indexed; the innermost scope
                // of a method node is its owner.
                if let Some(&owner) = stack.ids().last()
                    && matches!(ast.kind(owner), NodeKind::Class { .. })
                {
                    self.tables.methods.entry(file_path).or_default().insert(
                        name.clone(),
                        MethodEntry {
                            method: node,
                            class: owner,
                        },
                    );
                }
            }
            NodeKind::Include { .. } | NodeKind::Require { .. } => {
                if let Some(body) = ast.include_body(node)
                    && ast.file_path(body).is_some()
                {
                    self.tables.deps.entry(file_path).or_default().push(body);
                }
            }
            _ => {}
        }
    }
}
