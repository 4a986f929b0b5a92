//! The resource tree: every PHP file of a project, parsed into one arena,
//! with derived symbol and dependency tables.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use phloem_ast::{Ast, BfTraverser, NodeId, NodeKind};
use walkdir::WalkDir;

use crate::parse::{ParseError, SourceParser};
use crate::util;
use crate::visitors::resolve::{FoldFailure, IncludeFailure, ResourceDependencyResolver};
use crate::visitors::tables::TablesBuilder;
use crate::Error;

const SOURCE_EXTENSION: &str = "php";

/// A method definition together with its enclosing class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodEntry {
    pub method: NodeId,
    pub class: NodeId,
}

/// Definition and dependency tables, keyed by absolute file path. Kept as
/// one struct so callers can borrow the tables while a traverser holds the
/// arena mutably.
#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub functions: IndexMap<PathBuf, IndexMap<String, NodeId>>,
    pub methods: IndexMap<PathBuf, IndexMap<String, MethodEntry>>,
    /// Resolved include targets per file, in attachment order.
    pub deps: IndexMap<PathBuf, Vec<NodeId>>,
}

impl Tables {
    /// Lazily yields `(file, definition)` pairs for every definition named
    /// `name`. `bound` selects the method table over the function table.
    /// With `param_count`, only definitions declaring exactly that many
    /// parameters are yielded. The iterator does no work beyond what the
    /// caller consumes.
    pub fn function_finder<'a>(
        &'a self,
        ast: &'a Ast,
        name: &'a str,
        bound: bool,
        param_count: Option<usize>,
    ) -> Box<dyn Iterator<Item = (&'a Path, NodeId)> + 'a> {
        let arity_matches = move |definition: NodeId| match param_count {
            Some(count) => declared_params(ast, definition).len() == count,
            None => true,
        };

        if bound {
            Box::new(self.methods.iter().filter_map(move |(path, table)| {
                let entry = table.get(name)?;
                arity_matches(entry.method).then_some((path.as_path(), entry.method))
            }))
        } else {
            Box::new(self.functions.iter().filter_map(move |(path, table)| {
                let definition = *table.get(name)?;
                arity_matches(definition).then_some((path.as_path(), definition))
            }))
        }
    }
}

/// Declared parameters of a function, method, or closure definition.
pub fn declared_params(ast: &Ast, definition: NodeId) -> &[NodeId] {
    match ast.kind(definition) {
        NodeKind::Function { params, .. }
        | NodeKind::Method { params, .. }
        | NodeKind::Closure { params, .. } => params,
        _ => &[],
    }
}

/// All source files of a project, their per-file syntax trees, and the
/// tables derived from them. Fields are public so user code can borrow
/// `tables` immutably while traversing `ast` mutably.
#[derive(Debug)]
pub struct ResourceTree {
    pub ast: Ast,
    /// Absolute paths of every collected source file.
    pub files: Vec<PathBuf>,
    /// Parsed tree roots, keyed by absolute path.
    pub trees: IndexMap<PathBuf, NodeId>,
    pub tables: Tables,
    /// Files that failed to parse; they stay out of `trees`.
    pub parse_errors: IndexMap<PathBuf, ParseError>,
    /// Includes whose target file is not part of the project.
    pub not_found: Vec<IncludeFailure>,
    /// Include expressions that could not be folded to a path.
    pub expr_fails: Vec<FoldFailure>,
}

impl ResourceTree {
    /// Collect the source files under `path`: the file itself when it
    /// names a `.php` file, otherwise every `.php` file below it.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = util::absolute_path(path.as_ref());
        if !path.exists() {
            return Err(Error::InvalidPath(path));
        }

        let mut files = Vec::new();
        if path.is_file() {
            if has_source_extension(&path) {
                files.push(path);
            }
        } else {
            for entry in WalkDir::new(&path)
                .sort_by_file_name()
                .into_iter()
                .filter_map(Result::ok)
            {
                if entry.file_type().is_file() && has_source_extension(entry.path()) {
                    files.push(util::absolute_path(entry.path()));
                }
            }
        }

        Ok(Self {
            ast: Ast::new(),
            files,
            trees: IndexMap::new(),
            tables: Tables::default(),
            parse_errors: IndexMap::new(),
            not_found: Vec::new(),
            expr_fails: Vec::new(),
        })
    }

    /// Parse every collected file. Files that fail to parse are recorded
    /// and skipped; the rest of the project is unaffected. Calling this
    /// again rebuilds everything from scratch.
    pub fn build_trees(&mut self) {
        self.ast = Ast::new();
        self.trees.clear();
        self.tables = Tables::default();
        self.parse_errors.clear();
        self.not_found.clear();
        self.expr_fails.clear();

        let mut parser = SourceParser::new();
        for file in &self.files {
            match parser.parse_file(&mut self.ast, file) {
                Ok(parsed) => {
                    self.trees.insert(file.clone(), parsed.root);
                }
                Err(err) => {
                    self.parse_errors.insert(file.clone(), err);
                }
            }
        }
    }

    /// Expand include/require nodes across the project, attaching the
    /// already-parsed target trees and recording failures.
    pub fn resolve_dependencies(&mut self) {
        let mut resolver = ResourceDependencyResolver::new(&self.trees);
        for root in self.trees.values().copied().collect::<Vec<_>>() {
            let mut traverser = BfTraverser::new(root);
            traverser
                .register_visitor(&self.ast, &mut resolver)
                .expect("resolver registered once per traverser");
            traverser.traverse(&mut self.ast);
        }

        let report = resolver.into_report();
        for (path, deps) in report.deps {
            self.tables.deps.entry(path).or_default().extend(deps);
        }
        self.not_found.extend(report.not_found);
        self.expr_fails.extend(report.expr_fails);
    }

    /// Populate the function and method tables (and dependency edges for
    /// includes that are already resolved).
    pub fn build_tables(&mut self) {
        self.tables.functions.clear();
        self.tables.methods.clear();

        let mut builder = TablesBuilder::new();
        for root in self.trees.values().copied().collect::<Vec<_>>() {
            let mut traverser = BfTraverser::new(root);
            traverser
                .register_visitor(&self.ast, &mut builder)
                .expect("builder registered once per traverser");
            traverser.traverse(&mut self.ast);
        }

        let built = builder.into_tables();
        self.tables.functions = built.functions;
        self.tables.methods = built.methods;
        for (path, deps) in built.deps {
            let entry = self.tables.deps.entry(path).or_default();
            for dep in deps {
                if !entry.contains(&dep) {
                    entry.push(dep);
                }
            }
        }
    }

    /// See [`Tables::function_finder`].
    pub fn function_finder<'a>(
        &'a self,
        name: &'a str,
        bound: bool,
        param_count: Option<usize>,
    ) -> impl Iterator<Item = (&'a Path, NodeId)> + 'a {
        self.tables.function_finder(&self.ast, name, bound, param_count)
    }
}

fn has_source_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case(SOURCE_EXTENSION))
        .unwrap_or(false)
}
