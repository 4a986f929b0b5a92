//! Query visitors: name lookup, predicate search, and cross-file call
//! resolution.

use std::path::PathBuf;

use indexmap::IndexMap;
use phloem_ast::{Ast, NamespaceStack, NodeId, NodeKind, Visitor};

use crate::builtins::is_builtin;
use crate::resource::{Tables, declared_params};

/// What a [`NameFinder`] hit refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoundKind {
    FunctionDecl,
    VarDecl,
}

/// One [`NameFinder`] hit. The stack is a snapshot taken at visit time.
#[derive(Debug, Clone)]
pub struct FoundName {
    pub node: NodeId,
    pub kind: FoundKind,
    pub namespace_stack: Vec<NodeId>,
}

/// Searches for function declarations and variable assignments with the
/// given names. With `greedy` unset, the search stops at the first hit.
#[derive(Debug)]
pub struct NameFinder {
    /// Results per requested name; empty lists mean no match.
    pub names: IndexMap<String, Vec<FoundName>>,
    greedy: bool,
    finished: bool,
}

impl NameFinder {
    pub fn new<I, S>(names: I, greedy: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(|name| (name.into(), Vec::new())).collect(),
            greedy,
            finished: false,
        }
    }
}

impl Visitor for NameFinder {
    fn visit(&mut self, ast: &mut Ast, node: NodeId, stack: &NamespaceStack) {
        if self.finished {
            return;
        }
        match ast.kind(node) {
            NodeKind::Function { name, .. } => {
                if let Some(hits) = self.names.get_mut(name.as_str()) {
                    hits.push(FoundName {
                        node,
                        kind: FoundKind::FunctionDecl,
                        namespace_stack: stack.snapshot(),
                    });
                    if !self.greedy {
                        self.finished = true;
                    }
                }
            }
            NodeKind::Assignment { target, .. } => {
                // Only simple assignments to a bare variable count as a
                // declaration; the sigil is stripped for matching.
                if let NodeKind::Variable { name } = ast.kind(*target) {
                    let bare = name.trim_start_matches('$');
                    if let Some(hits) = self.names.get_mut(bare) {
                        hits.push(FoundName {
                            node,
                            kind: FoundKind::VarDecl,
                            namespace_stack: stack.snapshot(),
                        });
                        if !self.greedy {
                            self.finished = true;
                        }
                    }
                }
            }
            _ => {}
        }
    }
}

/// One [`NodeFinder`] hit.
#[derive(Debug, Clone)]
pub struct Found {
    pub node: NodeId,
    pub namespace_stack: Vec<NodeId>,
}

/// General-purpose finder: records every node the predicate accepts,
/// together with a deep copy of the namespace stack at that point.
pub struct NodeFinder {
    predicate: Box<dyn Fn(&Ast, NodeId) -> bool>,
    pub found: Vec<Found>,
}

impl NodeFinder {
    pub fn new(predicate: impl Fn(&Ast, NodeId) -> bool + 'static) -> Self {
        Self {
            predicate: Box::new(predicate),
            found: Vec::new(),
        }
    }
}

impl Visitor for NodeFinder {
    fn visit(&mut self, ast: &mut Ast, node: NodeId, stack: &NamespaceStack) {
        if (self.predicate)(ast, node) {
            self.found.push(Found {
                node,
                namespace_stack: stack.snapshot(),
            });
        }
    }
}

/// A call site paired with the definitions that could answer it.
#[derive(Debug, Clone)]
pub struct CallSite {
    /// Namespace stack snapshot with the call node appended.
    pub stack: Vec<NodeId>,
    pub found_definitions: Vec<(PathBuf, NodeId)>,
}

/// Pairs every function and method call with candidate definitions from
/// the resource tree's tables.
///
/// Calls whose name is an expression rather than a bare name cannot be
/// looked up and are skipped silently. Builtin filtering applies to
/// function calls only.
pub struct ResourceCallsFinder<'t> {
    tables: &'t Tables,
    ignore_builtins: bool,
    match_params: bool,
    pub bound_calls: Vec<CallSite>,
    pub unbound_calls: Vec<CallSite>,
}

impl<'t> ResourceCallsFinder<'t> {
    pub fn new(tables: &'t Tables, ignore_builtins: bool, match_params: bool) -> Self {
        Self {
            tables,
            ignore_builtins,
            match_params,
            bound_calls: Vec::new(),
            unbound_calls: Vec::new(),
        }
    }
}

impl Visitor for ResourceCallsFinder<'_> {
    fn visit(&mut self, ast: &mut Ast, node: NodeId, stack: &NamespaceStack) {
        let ast: &Ast = ast;
        let (name, bound) = match ast.kind(node) {
            NodeKind::FunctionCall { name, .. } => match name.as_name() {
                Some(name) => (name, false),
                None => return,
            },
            NodeKind::MethodCall { name, .. } => match name.as_name() {
                Some(name) => (name, true),
                None => return,
            },
            _ => return,
        };

        if !bound && self.ignore_builtins && is_builtin(name) {
            return;
        }

        let argc = call_argc(ast, node);
        let found_definitions: Vec<(PathBuf, NodeId)> = self
            .tables
            .function_finder(ast, name, bound, None)
            .filter(|(_, definition)| {
                !self.match_params || params_are_compatible(ast, *definition, argc)
            })
            .map(|(path, definition)| (path.to_path_buf(), definition))
            .collect();

        let mut call_stack = stack.snapshot();
        call_stack.push(node);
        let site = CallSite {
            stack: call_stack,
            found_definitions,
        };
        if bound {
            self.bound_calls.push(site);
        } else {
            self.unbound_calls.push(site);
        }
    }
}

/// Whether a definition's declared parameter range admits a call with
/// `argc` arguments: `required <= argc <= total`, where `required` counts
/// parameters without a default.
pub fn params_are_compatible(ast: &Ast, definition: NodeId, argc: usize) -> bool {
    let params = declared_params(ast, definition);
    let required = params
        .iter()
        .filter(|param| {
            matches!(
                ast.kind(**param),
                NodeKind::FormalParameter { default: None, .. }
            )
        })
        .count();
    required <= argc && argc <= params.len()
}

fn call_argc(ast: &Ast, call: NodeId) -> usize {
    match ast.kind(call) {
        NodeKind::FunctionCall { args, .. }
        | NodeKind::MethodCall { args, .. }
        | NodeKind::StaticCall { args, .. }
        | NodeKind::New { args, .. } => args.len(),
        _ => 0,
    }
}
