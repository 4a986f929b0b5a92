use phloem_ast::{Ast, BfTraverser, NodeId, NodeKind};

use crate::visitors::output::{GraphBuilder, NameHighlighter, Printer};

/// `function foo() { echo 1; }` built by hand for stable node ids.
fn small_tree(ast: &mut Ast) -> NodeId {
    let one = ast.push(NodeKind::IntLit { value: 1 }, Some(2));
    let echo = ast.push(NodeKind::Echo { exprs: vec![one] }, Some(2));
    let func = ast.push(
        NodeKind::Function {
            name: "foo".into(),
            params: vec![],
            nodes: vec![echo],
            by_ref: false,
        },
        Some(1),
    );
    ast.push(
        NodeKind::SyntaxTree {
            nodes: vec![func],
            file_path: "/proj/a.php".into(),
            file_location: "/proj".into(),
            file_name: "a.php".into(),
        },
        None,
    )
}

#[test]
fn graph_covers_every_visited_node_and_link() {
    let mut ast = Ast::new();
    let root = small_tree(&mut ast);

    let mut builder = GraphBuilder::new();
    let mut traverser = BfTraverser::new(root);
    traverser
        .register_visitor(&ast, &mut builder)
        .expect("fresh visitor");
    traverser.traverse(&mut ast);

    let graph = builder.into_graph();
    assert_eq!(graph.vertex_count(), 4);
    assert_eq!(graph.edge_count(), 3);
    for id in ast.ids() {
        assert!(graph.contains(id));
        assert_eq!(
            graph.vertex(id).map(|vertex| vertex.label.as_str()),
            Some(ast.kind(id).kind_name())
        );
    }
}

#[test]
fn dot_output_is_stable() {
    let mut ast = Ast::new();
    let root = small_tree(&mut ast);

    let mut builder = GraphBuilder::new();
    let mut traverser = BfTraverser::new(root);
    traverser
        .register_visitor(&ast, &mut builder)
        .expect("fresh visitor");
    traverser.traverse(&mut ast);

    let dot = builder.into_graph().to_dot();
    let expected = "digraph ast {\n    N3 [label=\"SyntaxTree\"];\n    N2 [label=\"Function\"];\n    N1 [label=\"Echo\"];\n    N0 [label=\"IntLit\"];\n    N3 -> N2;\n    N2 -> N1;\n    N1 -> N0;\n}\n";
    assert_eq!(dot, expected);
}

#[test]
fn highlighter_decorates_matching_vertices() {
    let mut ast = Ast::new();
    let root = small_tree(&mut ast);

    let mut builder = GraphBuilder::new();
    let mut traverser = BfTraverser::new(root);
    traverser
        .register_visitor(&ast, &mut builder)
        .expect("fresh visitor");
    traverser.traverse(&mut ast);
    let mut graph = builder.into_graph();

    // Second walk over the same tree decorates the built graph.
    let mut highlighter = NameHighlighter::new(["foo"], &mut graph, true);
    let mut traverser = BfTraverser::new(root);
    traverser
        .register_visitor(&ast, &mut highlighter)
        .expect("fresh visitor");
    traverser.traverse(&mut ast);

    let function = ast
        .ids()
        .find(|id| matches!(ast.kind(*id), NodeKind::Function { .. }))
        .expect("function vertex");
    assert_eq!(
        graph.vertex(function).and_then(|vertex| vertex.color.as_deref()),
        Some("red")
    );
    assert_eq!(graph.vertex(root).and_then(|vertex| vertex.color.as_deref()), None);

    assert!(graph.to_dot().contains("color=\"red\""));
}

#[test]
fn printer_lists_nodes_with_their_stacks() {
    let mut ast = Ast::new();
    let root = small_tree(&mut ast);

    let mut printer = Printer::new();
    let mut traverser = BfTraverser::new(root);
    traverser
        .register_visitor(&ast, &mut printer)
        .expect("fresh visitor");
    traverser.traverse(&mut ast);

    insta::assert_snapshot!(printer.out, @r"
    SyntaxTree  []
    Function  [a.php]
    Echo  [a.php, Function(foo)]
    IntLit  [a.php, Function(foo)]
    ");
}
