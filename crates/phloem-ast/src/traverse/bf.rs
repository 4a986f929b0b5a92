//! Breadth-first traversal.

use std::collections::VecDeque;

use indexmap::IndexMap;

use crate::arena::{Ast, NodeId};
use crate::traverse::TraverseError;
use crate::visit::{NamespaceStack, Visitor};

/// Queue-based breadth-first walker.
///
/// A queue discards the nesting context that a recursive walker gets for
/// free, so the walker tracks each node's *nearest namespace parent*: its
/// closest scope-defining ancestor, assigned when the node is enqueued.
/// The namespace stack for the current node is rebuilt by chasing that
/// chain back to the root. The map is per-walk scratch owned by the
/// walker; nodes themselves are never annotated, so shared subtrees stay
/// immutable.
pub struct BfTraverser<'v> {
    root: NodeId,
    visitors: Vec<&'v mut dyn Visitor>,
    ns_parent: IndexMap<NodeId, NodeId>,
    stack: NamespaceStack,
}

impl<'v> BfTraverser<'v> {
    pub fn new(root: NodeId) -> Self {
        Self {
            root,
            visitors: Vec::new(),
            ns_parent: IndexMap::new(),
            stack: NamespaceStack::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Add a visitor. Dispatch order is registration order.
    pub fn register_visitor(
        &mut self,
        ast: &Ast,
        visitor: &'v mut dyn Visitor,
    ) -> Result<(), TraverseError> {
        let candidate: *const dyn Visitor = &*visitor;
        if self
            .visitors
            .iter()
            .any(|existing| std::ptr::addr_eq(&**existing, candidate))
        {
            return Err(TraverseError::DuplicateVisitor);
        }
        visitor.register_with(ast, self.root);
        self.visitors.push(visitor);
        Ok(())
    }

    pub fn traverse(&mut self, ast: &mut Ast) {
        self.ns_parent.clear();
        self.stack.clear();

        let mut queue = VecDeque::from([self.root]);
        while let Some(node) = queue.pop_front() {
            for visitor in self.visitors.iter_mut() {
                visitor.enter(ast, node);
            }

            self.resolve_namespace(node);

            // Scope-defining nodes become the nearest namespace parent of
            // their children; everything else passes its own through.
            let child_parent = if ast.kind(node).is_scope_defining() {
                Some(node)
            } else {
                self.ns_parent.get(&node).copied()
            };

            for visitor in self.visitors.iter_mut() {
                visitor.visit(ast, node, &self.stack);
            }

            // Children are read after `visit` so that bodies attached by a
            // resolver visitor join this walk.
            for child in ast.children(node) {
                if let Some(parent) = child_parent {
                    self.ns_parent.insert(child, parent);
                }
                queue.push_back(child);
            }

            for visitor in self.visitors.iter_mut() {
                visitor.leave(ast, node);
            }
        }
    }

    /// Rebuild the namespace stack for `node` from the nearest-namespace-
    /// parent chain, root first.
    fn resolve_namespace(&mut self, node: NodeId) {
        let mut chain = Vec::new();
        let mut current = self.ns_parent.get(&node).copied();
        while let Some(parent) = current {
            chain.push(parent);
            current = self.ns_parent.get(&parent).copied();
        }
        chain.reverse();
        self.stack.replace(chain);
    }
}
