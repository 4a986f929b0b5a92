//! Depth-first traversal.

use crate::arena::{Ast, NodeId};
use crate::traverse::TraverseError;
use crate::visit::{NamespaceStack, Visitor};

/// Recursive pre-order walker.
///
/// The namespace stack is maintained directly: a scope-defining node is
/// pushed after its `visit` and popped after its children, so the stack a
/// visitor sees never contains the visited node itself. Push and pop use
/// the same scope test.
pub struct DfTraverser<'v> {
    root: NodeId,
    visitors: Vec<&'v mut dyn Visitor>,
    stack: NamespaceStack,
}

impl<'v> DfTraverser<'v> {
    pub fn new(root: NodeId) -> Self {
        Self {
            root,
            visitors: Vec::new(),
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
        self.stack.clear();
        self.walk(ast, self.root);
    }

    fn walk(&mut self, ast: &mut Ast, node: NodeId) {
        for visitor in self.visitors.iter_mut() {
            visitor.enter(ast, node);
        }

        for visitor in self.visitors.iter_mut() {
            visitor.visit(ast, node, &self.stack);
        }

        let scope_defining = ast.kind(node).is_scope_defining();
        if scope_defining {
            self.stack.push(node);
        }

        // Children are read after `visit` so that bodies attached by a
        // resolver visitor are recursed into.
        for child in ast.children(node) {
            self.walk(ast, child);
        }

        if scope_defining {
            self.stack.pop();
        }

        for visitor in self.visitors.iter_mut() {
            visitor.leave(ast, node);
        }
    }
}
