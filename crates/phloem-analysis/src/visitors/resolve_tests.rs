use std::fs;
use std::path::{Path, PathBuf};

use indoc::indoc;
use phloem_ast::{Ast, BfTraverser, NodeId, NodeKind};

use crate::parse::SourceParser;
use crate::visitors::resolve::DependencyResolver;

fn parse(ast: &mut Ast, source: &str, path: &Path) -> NodeId {
    SourceParser::new()
        .parse_source(ast, source, path)
        .expect("fixture parses")
        .root
}

fn resolve(ast: &mut Ast, root: NodeId) -> DependencyResolver {
    let mut resolver = DependencyResolver::new();
    let mut traverser = BfTraverser::new(root);
    traverser
        .register_visitor(ast, &mut resolver)
        .expect("fresh visitor");
    traverser.traverse(ast);
    resolver
}

fn include_nodes(ast: &Ast) -> Vec<NodeId> {
    ast.ids().filter(|id| ast.is_include(*id)).collect()
}

#[test]
fn folds_defined_constants_into_paths() {
    let source = indoc! {r#"
        <?php
        define('BASE', '/lib/');
        require BASE . 'b.php';
    "#};
    let mut ast = Ast::new();
    let root = parse(&mut ast, source, Path::new("/proj/a.php"));
    let resolver = resolve(&mut ast, root);

    // The fold itself succeeded; only the lookup on disk fails.
    assert!(resolver.expr_fails.is_empty());
    assert_eq!(resolver.not_found.len(), 1);
    assert_eq!(resolver.not_found[0].path, PathBuf::from("/lib/b.php"));
    assert_eq!(resolver.not_found[0].from_file, PathBuf::from("/proj/a.php"));
    assert_eq!(ast.include_body(include_nodes(&ast)[0]), None);
}

#[test]
fn relative_paths_join_against_the_including_file() {
    let source = indoc! {r#"
        <?php
        require './sub/../missing.php';
    "#};
    let mut ast = Ast::new();
    let root = parse(&mut ast, source, Path::new("/proj/src/a.php"));
    let resolver = resolve(&mut ast, root);

    assert_eq!(resolver.not_found[0].path, PathBuf::from("/proj/src/missing.php"));
}

#[test]
fn unresolved_constants_are_recorded_and_fold_to_marker() {
    let source = indoc! {r#"
        <?php
        require MISSING . '/x.php';
    "#};
    let mut ast = Ast::new();
    let root = parse(&mut ast, source, Path::new("/proj/a.php"));
    let resolver = resolve(&mut ast, root);

    assert_eq!(resolver.expr_fails.len(), 1);
    assert_eq!(resolver.expr_fails[0].from_file, PathBuf::from("/proj/a.php"));
    assert_eq!(resolver.not_found.len(), 1);
    assert!(
        resolver.not_found[0]
            .path
            .to_string_lossy()
            .contains("[PATH]")
    );
}

#[test]
fn unfoldable_expressions_are_recorded() {
    let source = indoc! {r#"
        <?php
        require $dir . '/x.php';
    "#};
    let mut ast = Ast::new();
    let root = parse(&mut ast, source, Path::new("/proj/a.php"));
    let resolver = resolve(&mut ast, root);

    assert_eq!(resolver.expr_fails.len(), 1);
    let failed = resolver.expr_fails[0].node;
    assert!(matches!(ast.kind(failed), NodeKind::Variable { name } if name == "$dir"));
}

#[test]
fn attaches_existing_files_on_demand() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("b.php"), "<?php function helper() {}\n").expect("write b.php");
    fs::write(
        dir.path().join("a.php"),
        "<?php define('LIB', './'); require LIB . 'b.php';\n",
    )
    .expect("write a.php");

    let mut ast = Ast::new();
    let root = SourceParser::new()
        .parse_file(&mut ast, &dir.path().join("a.php"))
        .expect("fixture parses")
        .root;
    let resolver = resolve(&mut ast, root);

    assert!(resolver.expr_fails.is_empty());
    assert!(resolver.not_found.is_empty());

    let includes = include_nodes(&ast);
    assert_eq!(includes.len(), 1);
    let body = ast.include_body(includes[0]).expect("body attached");
    assert_eq!(ast.file_name(body), Some("b.php"));
}

#[test]
fn repeated_includes_share_one_tree() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("lib.php"), "<?php function lib() {}\n").expect("write lib.php");
    fs::write(
        dir.path().join("a.php"),
        "<?php require 'lib.php'; require 'lib.php';\n",
    )
    .expect("write a.php");

    let mut ast = Ast::new();
    let root = SourceParser::new()
        .parse_file(&mut ast, &dir.path().join("a.php"))
        .expect("fixture parses")
        .root;
    resolve(&mut ast, root);

    let includes = include_nodes(&ast);
    assert_eq!(includes.len(), 2);
    let bodies: Vec<_> = includes
        .iter()
        .filter_map(|include| ast.include_body(*include))
        .collect();
    assert_eq!(bodies.len(), 2);
    assert_eq!(bodies[0], bodies[1]);
}

#[test]
fn include_cycles_break_with_a_circular_import() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("a.php"), "<?php require 'b.php';\n").expect("write a.php");
    fs::write(dir.path().join("b.php"), "<?php require 'a.php';\n").expect("write b.php");

    let mut ast = Ast::new();
    let a_root = SourceParser::new()
        .parse_file(&mut ast, &dir.path().join("a.php"))
        .expect("fixture parses")
        .root;
    resolve(&mut ast, a_root);

    // A's require points at B's tree.
    let includes = include_nodes(&ast);
    let a_include = includes
        .iter()
        .copied()
        .find(|include| ast.include_body(*include).map(|body| ast.file_name(body)) == Some(Some("b.php")))
        .expect("a.php's require resolved");
    let b_root = ast.include_body(a_include).expect("attached");

    // B's require points back at A and resolves to a CircularImport.
    let b_include = includes
        .iter()
        .copied()
        .find(|include| *include != a_include)
        .expect("b.php's require visited");
    let body = ast.include_body(b_include).expect("cycle body attached");
    let NodeKind::CircularImport {
        file_name,
        looped_tree,
    } = ast.kind(body)
    else {
        panic!("expected a CircularImport, got {}", ast.kind(body).kind_name());
    };
    assert_eq!(file_name, "a.php");
    assert_eq!(*looped_tree, a_root);
    assert_ne!(b_root, a_root);
}

#[test]
fn self_include_loops_onto_itself() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("a.php"), "<?php require 'a.php';\n").expect("write a.php");

    let mut ast = Ast::new();
    let root = SourceParser::new()
        .parse_file(&mut ast, &dir.path().join("a.php"))
        .expect("fixture parses")
        .root;
    resolve(&mut ast, root);

    let includes = include_nodes(&ast);
    let body = ast.include_body(includes[0]).expect("body attached");
    assert!(matches!(
        ast.kind(body),
        NodeKind::CircularImport { looped_tree, .. } if *looped_tree == root
    ));
}

#[test]
fn missing_targets_leave_body_unset_and_continue() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(
        dir.path().join("a.php"),
        "<?php require 'gone.php'; function still_indexed() {}\n",
    )
    .expect("write a.php");

    let mut ast = Ast::new();
    let root = SourceParser::new()
        .parse_file(&mut ast, &dir.path().join("a.php"))
        .expect("fixture parses")
        .root;
    let resolver = resolve(&mut ast, root);

    assert_eq!(resolver.not_found.len(), 1);
    assert!(resolver.not_found[0].path.ends_with("gone.php"));
    assert_eq!(ast.include_body(include_nodes(&ast)[0]), None);
    // The walk carried on past the failure.
    assert!(
        ast.ids()
            .any(|id| matches!(ast.kind(id), NodeKind::Function { name, .. } if name == "still_indexed"))
    );
}
