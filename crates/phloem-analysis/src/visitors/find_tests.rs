use std::path::Path;

use indoc::indoc;
use phloem_ast::{Ast, BfTraverser, NodeId, NodeKind};

use crate::parse::SourceParser;
use crate::visitors::find::{FoundKind, NameFinder, NodeFinder};

fn parse(ast: &mut Ast, source: &str) -> NodeId {
    SourceParser::new()
        .parse_source(ast, source, Path::new("/proj/a.php"))
        .expect("fixture parses")
        .root
}

fn run(ast: &mut Ast, root: NodeId, visitor: &mut dyn phloem_ast::Visitor) {
    let mut traverser = BfTraverser::new(root);
    traverser
        .register_visitor(ast, visitor)
        .expect("fresh visitor");
    traverser.traverse(ast);
}

#[test]
fn finds_try_blocks_with_empty_catches() {
    let source = indoc! {r#"
        <?php
        try {
            foo();
        } catch (E $e) {
        } catch (F $e) {
            bar();
        }
        try {
            baz();
        } catch (G $e) {
            log_it();
        }
    "#};
    let mut ast = Ast::new();
    let root = parse(&mut ast, source);

    let mut finder = NodeFinder::new(|ast, node| match ast.kind(node) {
        NodeKind::Try { catches, .. } => catches.iter().any(|catch| {
            matches!(ast.kind(*catch), NodeKind::Catch { nodes, .. } if nodes.is_empty())
        }),
        _ => false,
    });
    run(&mut ast, root, &mut finder);

    assert_eq!(finder.found.len(), 1);
    let NodeKind::Try { catches, .. } = ast.kind(finder.found[0].node) else {
        panic!("hit is not a try");
    };
    assert!(
        matches!(ast.kind(catches[0]), NodeKind::Catch { class_name, .. } if class_name == "E")
    );
}

#[test]
fn finds_sql_sinks_in_source_order() {
    let source = indoc! {r#"
        <?php
        mysql_query($q);
        mysqli_query($c, $q);
        safe_helper($q);
    "#};
    let mut ast = Ast::new();
    let root = parse(&mut ast, source);

    const SINKS: [&str; 4] = ["mysql_query", "mysqli_query", "pg_query", "mssql_query"];
    let mut finder = NodeFinder::new(|ast, node| {
        matches!(
            ast.kind(node),
            NodeKind::FunctionCall { name, .. }
                if name.as_name().is_some_and(|name| SINKS.contains(&name))
        )
    });
    run(&mut ast, root, &mut finder);

    assert_eq!(finder.found.len(), 2);
    let names: Vec<&str> = finder
        .found
        .iter()
        .map(|hit| match ast.kind(hit.node) {
            NodeKind::FunctionCall { name, .. } => name.as_name().expect("bare name"),
            other => panic!("hit is {}", other.kind_name()),
        })
        .collect();
    assert_eq!(names, ["mysql_query", "mysqli_query"]);
}

#[test]
fn hit_stacks_chain_through_namespaces() {
    let source = indoc! {r#"
        <?php
        namespace N;
        class C {
            public function m() {
                echo 1;
            }
        }
    "#};
    let mut ast = Ast::new();
    let root = parse(&mut ast, source);

    let mut finder =
        NodeFinder::new(|ast, node| matches!(ast.kind(node), NodeKind::Echo { .. }));
    run(&mut ast, root, &mut finder);

    assert_eq!(finder.found.len(), 1);
    let kinds: Vec<&str> = finder.found[0]
        .namespace_stack
        .iter()
        .map(|id| ast.kind(*id).kind_name())
        .collect();
    assert_eq!(kinds, ["SyntaxTree", "Namespace", "Class", "Method"]);
}

#[test]
fn name_finder_matches_functions_and_variables() {
    let source = indoc! {r#"
        <?php
        function handler() {}
        $counter = 0;
        $other = 1;
    "#};
    let mut ast = Ast::new();
    let root = parse(&mut ast, source);

    let mut finder = NameFinder::new(["handler", "counter"], true);
    run(&mut ast, root, &mut finder);

    let handler = &finder.names["handler"];
    assert_eq!(handler.len(), 1);
    assert_eq!(handler[0].kind, FoundKind::FunctionDecl);

    let counter = &finder.names["counter"];
    assert_eq!(counter.len(), 1);
    assert_eq!(counter[0].kind, FoundKind::VarDecl);
}

#[test]
fn non_greedy_name_finder_stops_at_first_hit() {
    let source = indoc! {r#"
        <?php
        $needle = 1;
        $needle = 2;
    "#};
    let mut ast = Ast::new();
    let root = parse(&mut ast, source);

    let mut finder = NameFinder::new(["needle"], false);
    run(&mut ast, root, &mut finder);
    assert_eq!(finder.names["needle"].len(), 1);

    let mut greedy = NameFinder::new(["needle"], true);
    run(&mut ast, root, &mut greedy);
    assert_eq!(greedy.names["needle"].len(), 2);
}
