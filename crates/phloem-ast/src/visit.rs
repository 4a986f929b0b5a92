//! Visitor protocol and the namespace stack.
//!
//! # Usage
//!
//! Implement [`Visitor`] for your struct, overriding only the hooks you
//! need. Register it with a traverser and run the walk; results accumulate
//! on the visitor itself.
//!
//! ```ignore
//! struct CountEchoes(usize);
//!
//! impl Visitor for CountEchoes {
//!     fn visit(&mut self, ast: &mut Ast, node: NodeId, _stack: &NamespaceStack) {
//!         if matches!(ast.kind(node), NodeKind::Echo { .. }) {
//!             self.0 += 1;
//!         }
//!     }
//! }
//! ```

use crate::arena::{Ast, NodeId};

/// The chain of scope-defining ancestors of the node currently being
/// visited, in root-to-leaf order. The current node itself is never on the
/// stack.
///
/// Visitors receive a shared reference for the duration of one `visit`
/// call; anything stored for later must be a [`snapshot`](Self::snapshot).
#[derive(Debug, Clone, Default)]
pub struct NamespaceStack {
    ids: Vec<NodeId>,
}

impl NamespaceStack {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, id: NodeId) {
        self.ids.push(id);
    }

    pub(crate) fn pop(&mut self) {
        self.ids.pop();
    }

    pub(crate) fn clear(&mut self) {
        self.ids.clear();
    }

    pub(crate) fn replace(&mut self, ids: Vec<NodeId>) {
        self.ids = ids;
    }

    pub fn ids(&self) -> &[NodeId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.ids.iter().copied()
    }

    /// Deep copy of the stack for storing in query results.
    pub fn snapshot(&self) -> Vec<NodeId> {
        self.ids.clone()
    }

    /// The `SyntaxTree` entries on the stack, outermost first. More than
    /// one appears when traversal has descended through resolved includes.
    pub fn files<'a>(&'a self, ast: &'a Ast) -> impl Iterator<Item = NodeId> + 'a {
        self.iter().filter(|id| ast.file_path(*id).is_some())
    }

    /// The innermost enclosing file.
    pub fn last_file(&self, ast: &Ast) -> Option<NodeId> {
        self.files(ast).last()
    }
}

/// Hooks dispatched by the traversers. All default to no-ops.
///
/// Hooks take `&mut Ast` because resolver-style visitors extend the arena
/// and attach include bodies mid-walk; the walkers re-read a node's
/// children after `visit`, so freshly attached subtrees join the walk.
pub trait Visitor {
    /// Called once when the visitor is added to a traverser.
    fn register_with(&mut self, _ast: &Ast, _root: NodeId) {}

    /// Called before any structural processing of `node`.
    fn enter(&mut self, _ast: &mut Ast, _node: NodeId) {}

    /// Called after the namespace stack has been brought up to date for
    /// `node`. The stack holds the scope-defining ancestors of `node`,
    /// excluding `node` itself.
    fn visit(&mut self, _ast: &mut Ast, _node: NodeId, _stack: &NamespaceStack) {}

    /// Called after `node`'s subtree has been handled (depth-first) or
    /// after its children were enqueued (breadth-first).
    fn leave(&mut self, _ast: &mut Ast, _node: NodeId) {}
}
