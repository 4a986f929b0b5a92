//! Arena storage for syntax tree nodes.
//!
//! All nodes of a parse session live in one [`Ast`] arena and refer to each
//! other by [`NodeId`]. Cross-file references created by dependency
//! resolution (include bodies, circular-import back-pointers) are plain
//! indices into the same arena, so shared subtrees are shared by
//! construction and cannot outlive their storage.

use std::fmt;
use std::path::Path;

use crate::node::{FieldValue, NodeKind};

/// Index of a node in its [`Ast`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N{}", self.0)
    }
}

/// A node: its variant payload plus the 1-based source line, when known.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeData {
    pub kind: NodeKind,
    pub line: Option<u32>,
}

/// Append-only node arena. One arena backs a whole analysis session: a
/// single parsed file plus everything its includes pull in, or every file
/// of a resource tree.
#[derive(Debug, Default)]
pub struct Ast {
    nodes: Vec<NodeData>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: NodeKind, line: Option<u32>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData { kind, line });
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    pub fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.nodes[id.index()].kind
    }

    pub fn line(&self, id: NodeId) -> Option<u32> {
        self.nodes[id.index()].line
    }

    /// All node ids in allocation order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    /// Child ids of a node, flattened from its field list in declared
    /// order. Sequence slots contribute their members in sequence order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        for (_, value) in self.kind(id).fields() {
            match value {
                FieldValue::Node(child) => out.push(child),
                FieldValue::Seq(children) => out.extend_from_slice(children),
            }
        }
        out
    }

    // -----------------------------------------------------------------
    // SyntaxTree accessors
    // -----------------------------------------------------------------

    pub fn file_path(&self, id: NodeId) -> Option<&Path> {
        match self.kind(id) {
            NodeKind::SyntaxTree { file_path, .. } => Some(file_path),
            _ => None,
        }
    }

    pub fn file_location(&self, id: NodeId) -> Option<&Path> {
        match self.kind(id) {
            NodeKind::SyntaxTree { file_location, .. } => Some(file_location),
            _ => None,
        }
    }

    pub fn file_name(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::SyntaxTree { file_name, .. } => Some(file_name),
            _ => None,
        }
    }

    // -----------------------------------------------------------------
    // Include/Require accessors
    // -----------------------------------------------------------------

    pub fn is_include(&self, id: NodeId) -> bool {
        matches!(
            self.kind(id),
            NodeKind::Include { .. } | NodeKind::Require { .. }
        )
    }

    pub fn include_expr(&self, id: NodeId) -> Option<NodeId> {
        match self.kind(id) {
            NodeKind::Include { expr, .. } | NodeKind::Require { expr, .. } => Some(*expr),
            _ => None,
        }
    }

    pub fn include_body(&self, id: NodeId) -> Option<NodeId> {
        match self.kind(id) {
            NodeKind::Include { body, .. } | NodeKind::Require { body, .. } => *body,
            _ => None,
        }
    }

    /// Attach a resolved body to an include/require node. No-op on other
    /// variants.
    pub fn set_include_body(&mut self, id: NodeId, new_body: NodeId) {
        if let NodeKind::Include { body, .. } | NodeKind::Require { body, .. } = self.kind_mut(id) {
            *body = Some(new_body);
        }
    }
}
