//! Visitors for rendering trees: a Graphviz-style graph builder and a
//! plain-text printer for debugging.

use std::fmt::Write;

use indexmap::IndexMap;
use phloem_ast::{Ast, FieldValue, NamespaceStack, NodeId, NodeKind, Visitor};

/// A vertex of the rendered graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vertex {
    pub label: String,
    pub color: Option<String>,
}

/// Graph description decoupled from any rendering backend. Vertices are
/// keyed by node id, so a second walk over the same tree (a highlighter,
/// say) addresses exactly the vertices the builder created.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    vertices: IndexMap<NodeId, Vertex>,
    edges: Vec<(NodeId, NodeId, &'static str)>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_vertex(&mut self, id: NodeId, label: &str) {
        self.vertices.entry(id).or_insert_with(|| Vertex {
            label: label.to_string(),
            color: None,
        });
    }

    pub fn add_edge(&mut self, from: NodeId, to: NodeId, label: &'static str) {
        self.edges.push((from, to, label));
    }

    /// Decorate an existing vertex. Returns false when the vertex is not
    /// part of the graph.
    pub fn set_color(&mut self, id: NodeId, color: &str) -> bool {
        match self.vertices.get_mut(&id) {
            Some(vertex) => {
                vertex.color = Some(color.to_string());
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.vertices.contains_key(&id)
    }

    pub fn vertex(&self, id: NodeId) -> Option<&Vertex> {
        self.vertices.get(&id)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self) -> &[(NodeId, NodeId, &'static str)] {
        &self.edges
    }

    /// Render as Graphviz DOT.
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph ast {\n");
        for (id, vertex) in &self.vertices {
            match &vertex.color {
                Some(color) => {
                    writeln!(
                        out,
                        "    {id} [label=\"{}\", color=\"{color}\"];",
                        vertex.label
                    )
                }
                None => writeln!(out, "    {id} [label=\"{}\"];", vertex.label),
            }
            .expect("String write never fails");
        }
        for (from, to, label) in &self.edges {
            if label.is_empty() {
                writeln!(out, "    {from} -> {to};")
            } else {
                writeln!(out, "    {from} -> {to} [label=\"{label}\"];")
            }
            .expect("String write never fails");
        }
        out.push_str("}\n");
        out
    }
}

/// Builds a [`Graph`] while walking: one vertex per node, labeled with the
/// variant name, and one edge per parent-child field link. Sequence
/// members get unlabeled edges.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    pub graph: Graph,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_graph(self) -> Graph {
        self.graph
    }
}

impl Visitor for GraphBuilder {
    fn register_with(&mut self, ast: &Ast, root: NodeId) {
        self.graph.add_vertex(root, ast.kind(root).kind_name());
    }

    fn visit(&mut self, ast: &mut Ast, node: NodeId, _stack: &NamespaceStack) {
        for (field, value) in ast.kind(node).fields() {
            match value {
                FieldValue::Node(child) => {
                    self.graph.add_vertex(child, ast.kind(child).kind_name());
                    self.graph.add_edge(node, child, field);
                }
                FieldValue::Seq(children) => {
                    for &child in children {
                        self.graph.add_vertex(child, ast.kind(child).kind_name());
                        self.graph.add_edge(node, child, "");
                    }
                }
            }
        }
    }
}

/// Highlights function declarations and variable assignments matching the
/// given names on an already-built [`Graph`]. Run it as a second walk over
/// the same tree the builder walked.
pub struct NameHighlighter<'g> {
    names: Vec<String>,
    graph: &'g mut Graph,
    greedy: bool,
}

impl<'g> NameHighlighter<'g> {
    pub fn new<I, S>(names: I, graph: &'g mut Graph, greedy: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            graph,
            greedy,
        }
    }
}

impl Visitor for NameHighlighter<'_> {
    fn visit(&mut self, ast: &mut Ast, node: NodeId, _stack: &NamespaceStack) {
        let matched = match ast.kind(node) {
            NodeKind::Function { name, .. } => self
                .names
                .iter()
                .position(|candidate| candidate == name),
            NodeKind::Assignment { target, .. } => match ast.kind(*target) {
                NodeKind::Variable { name } => {
                    let bare = name.trim_start_matches('$');
                    self.names.iter().position(|candidate| candidate.as_str() == bare)
                }
                _ => None,
            },
            _ => None,
        };

        if let Some(index) = matched {
            self.graph.set_color(node, "red");
            if !self.greedy {
                self.names.remove(index);
            }
        }
    }
}

/// Writes one line per visited node with the namespace stack alongside.
#[derive(Debug, Default)]
pub struct Printer {
    pub out: String,
}

impl Printer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Visitor for Printer {
    fn visit(&mut self, ast: &mut Ast, node: NodeId, stack: &NamespaceStack) {
        let entries: Vec<String> = stack
            .iter()
            .map(|entry| match ast.kind(entry) {
                NodeKind::SyntaxTree { file_name, .. } => file_name.clone(),
                kind => match kind.name() {
                    Some(name) => format!("{}({})", kind.kind_name(), name),
                    None => kind.kind_name().to_string(),
                },
            })
            .collect();
        writeln!(
            self.out,
            "{}  [{}]",
            ast.kind(node).kind_name(),
            entries.join(", ")
        )
        .expect("String write never fails");
    }
}
