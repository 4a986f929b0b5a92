//! Dependency resolution: expanding include/require nodes into cross-file
//! links.
//!
//! Two modes share the folding and cycle machinery. The single-file
//! [`DependencyResolver`] parses target files on demand into the same
//! arena; the resource-tree [`ResourceDependencyResolver`] attaches trees
//! that were already parsed by the project build. Either must be
//! registered before any visitor that relies on includes being expanded,
//! since registration order is dispatch order.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use phloem_ast::{Ast, CallTarget, NamespaceStack, NodeId, NodeKind, Visitor};

use crate::parse::{ParseError, SourceParser};
use crate::util;

/// Stand-in path for include expressions that cannot be folded.
pub const UNFOLDABLE_PATH: &str = "[PATH]";

/// An include whose resolved target does not exist (or is not part of the
/// project, in resource mode).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeFailure {
    /// The resolved path that was looked up.
    pub path: PathBuf,
    /// Line of the include node.
    pub line: Option<u32>,
    /// File containing the include.
    pub from_file: PathBuf,
}

/// An include expression (or part of one) that could not be reduced to a
/// string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldFailure {
    /// The unfoldable expression node.
    pub node: NodeId,
    pub line: Option<u32>,
    pub from_file: PathBuf,
}

/// Failure lists and dependency edges accumulated by a resolver run.
#[derive(Debug, Default)]
pub struct ResolveReport {
    pub deps: IndexMap<PathBuf, Vec<NodeId>>,
    pub not_found: Vec<IncludeFailure>,
    pub expr_fails: Vec<FoldFailure>,
}

/// Reduce an include expression to a path string.
///
/// Handles string literals, `.` concatenation, and constants previously
/// seen in a `define`. Everything else folds to [`UNFOLDABLE_PATH`] and is
/// recorded, unresolved constants included.
fn fold_include_expr(
    ast: &Ast,
    expr: NodeId,
    constants: &IndexMap<String, String>,
    expr_fails: &mut Vec<FoldFailure>,
    from_file: &Path,
) -> String {
    match ast.kind(expr) {
        NodeKind::StringLit { value } => value.clone(),
        NodeKind::BinaryOp { op, left, right } if op == "." => {
            let left = fold_include_expr(ast, *left, constants, expr_fails, from_file);
            let right = fold_include_expr(ast, *right, constants, expr_fails, from_file);
            left + &right
        }
        NodeKind::Constant { name } => match constants.get(name) {
            Some(value) => value.clone(),
            None => {
                expr_fails.push(FoldFailure {
                    node: expr,
                    line: ast.line(expr),
                    from_file: from_file.to_path_buf(),
                });
                UNFOLDABLE_PATH.to_string()
            }
        },
        _ => {
            expr_fails.push(FoldFailure {
                node: expr,
                line: ast.line(expr),
                from_file: from_file.to_path_buf(),
            });
            UNFOLDABLE_PATH.to_string()
        }
    }
}

/// Record a `define(name, value)` call. The name may be written as a
/// string literal or a bare constant; the value must be a string literal.
/// Anything else is ignored without complaint.
fn track_define(ast: &Ast, args: &[NodeId], constants: &mut IndexMap<String, String>) {
    let (Some(&name_arg), Some(&value_arg)) = (args.first(), args.get(1)) else {
        return;
    };
    let name = match ast.kind(name_arg) {
        NodeKind::StringLit { value } => value.clone(),
        NodeKind::Constant { name } => name.clone(),
        _ => return,
    };
    let NodeKind::StringLit { value } = ast.kind(value_arg) else {
        return;
    };
    constants.insert(name, value.clone());
}

/// Shared front half of include handling: fold the expression, join it
/// against the including file's directory, and break cycles.
///
/// Returns `(resolved_path, including_file_path)` when attachment should
/// proceed, `None` when there is nothing left to do: the body is already
/// attached, there is no file context yet, or the target was on the file
/// stack and a `CircularImport` has been attached in its place.
fn resolve_target(
    ast: &mut Ast,
    node: NodeId,
    stack: &NamespaceStack,
    constants: &IndexMap<String, String>,
    expr_fails: &mut Vec<FoldFailure>,
) -> Option<(PathBuf, PathBuf)> {
    if ast.include_body(node).is_some() {
        return None;
    }
    let current_file = stack.last_file(ast)?;
    let expr = ast.include_expr(node)?;

    let from_file = ast.file_path(current_file)?.to_path_buf();
    let base_dir = ast.file_location(current_file)?.to_path_buf();

    let folded = fold_include_expr(ast, expr, constants, expr_fails, &from_file);
    let dep_path = util::normalize_path(&base_dir.join(folded));

    // A target already on the file stack would loop the walk forever; a
    // CircularImport node has no child slots, so attaching it ends the
    // cycle right here.
    let looping = stack
        .files(ast)
        .find(|file| ast.file_path(*file) == Some(&dep_path));
    if let Some(looping) = looping {
        let file_name = dep_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let line = ast.line(node);
        let circular = ast.push(
            NodeKind::CircularImport {
                file_name,
                looped_tree: looping,
            },
            line,
        );
        ast.set_include_body(node, circular);
        return None;
    }

    Some((dep_path, from_file))
}

fn is_define_call(ast: &Ast, node: NodeId) -> Option<Vec<NodeId>> {
    match ast.kind(node) {
        NodeKind::FunctionCall {
            name: CallTarget::Name(name),
            args,
        } if name == "define" => Some(args.clone()),
        _ => None,
    }
}

/// Single-file mode: parses include targets on demand into the same arena.
/// Targets are deduplicated by absolute path, so two includes of one file
/// share one tree.
pub struct DependencyResolver {
    parser: SourceParser,
    constants: IndexMap<String, String>,
    parsed: IndexMap<PathBuf, NodeId>,
    pub not_found: Vec<IncludeFailure>,
    pub expr_fails: Vec<FoldFailure>,
    /// Include targets that exist but failed to parse.
    pub parse_errors: IndexMap<PathBuf, ParseError>,
}

impl DependencyResolver {
    pub fn new() -> Self {
        Self {
            parser: SourceParser::new(),
            constants: IndexMap::new(),
            parsed: IndexMap::new(),
            not_found: Vec::new(),
            expr_fails: Vec::new(),
            parse_errors: IndexMap::new(),
        }
    }

    fn follow(&mut self, ast: &mut Ast, node: NodeId, dep_path: &Path, from_file: &Path) {
        if let Some(&cached) = self.parsed.get(dep_path) {
            ast.set_include_body(node, cached);
            return;
        }
        if !dep_path.is_file() {
            self.not_found.push(IncludeFailure {
                path: dep_path.to_path_buf(),
                line: ast.line(node),
                from_file: from_file.to_path_buf(),
            });
            return;
        }
        match self.parser.parse_file(ast, dep_path) {
            Ok(parsed) => {
                self.parsed.insert(dep_path.to_path_buf(), parsed.root);
                ast.set_include_body(node, parsed.root);
            }
            Err(err) => {
                self.parse_errors.insert(dep_path.to_path_buf(), err);
            }
        }
    }
}

impl Default for DependencyResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Visitor for DependencyResolver {
    fn visit(&mut self, ast: &mut Ast, node: NodeId, stack: &NamespaceStack) {
        if ast.is_include(node) {
            if let Some((dep_path, from_file)) =
                resolve_target(ast, node, stack, &self.constants, &mut self.expr_fails)
            {
                self.follow(ast, node, &dep_path, &from_file);
            }
        } else if let Some(args) = is_define_call(ast, node) {
            track_define(ast, &args, &mut self.constants);
        }
    }
}

/// Resource mode: attaches trees already parsed by the resource tree and
/// records a dependency edge per attachment. Targets outside the project
/// land in `not_found`.
pub struct ResourceDependencyResolver<'t> {
    trees: &'t IndexMap<PathBuf, NodeId>,
    constants: IndexMap<String, String>,
    deps: IndexMap<PathBuf, Vec<NodeId>>,
    pub not_found: Vec<IncludeFailure>,
    pub expr_fails: Vec<FoldFailure>,
}

impl<'t> ResourceDependencyResolver<'t> {
    pub fn new(trees: &'t IndexMap<PathBuf, NodeId>) -> Self {
        Self {
            trees,
            constants: IndexMap::new(),
            deps: IndexMap::new(),
            not_found: Vec::new(),
            expr_fails: Vec::new(),
        }
    }

    pub fn into_report(self) -> ResolveReport {
        ResolveReport {
            deps: self.deps,
            not_found: self.not_found,
            expr_fails: self.expr_fails,
        }
    }

    fn follow(&mut self, ast: &mut Ast, node: NodeId, dep_path: &Path, from_file: &Path) {
        match self.trees.get(dep_path) {
            Some(&root) => {
                ast.set_include_body(node, root);
                self.deps
                    .entry(from_file.to_path_buf())
                    .or_default()
                    .push(root);
            }
            None => self.not_found.push(IncludeFailure {
                path: dep_path.to_path_buf(),
                line: ast.line(node),
                from_file: from_file.to_path_buf(),
            }),
        }
    }
}

impl Visitor for ResourceDependencyResolver<'_> {
    fn visit(&mut self, ast: &mut Ast, node: NodeId, stack: &NamespaceStack) {
        if ast.is_include(node) {
            if let Some((dep_path, from_file)) =
                resolve_target(ast, node, stack, &self.constants, &mut self.expr_fails)
            {
                self.follow(ast, node, &dep_path, &from_file);
            }
        } else if let Some(args) = is_define_call(ast, node) {
            track_define(ast, &args, &mut self.constants);
        }
    }
}
