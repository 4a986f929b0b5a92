use crate::arena::{Ast, NodeId};
use crate::node::NodeKind;
use crate::traverse::DfTraverser;
use crate::visit::{NamespaceStack, Visitor};

fn interface_tree(ast: &mut Ast) -> NodeId {
    let ret = ast.push(NodeKind::Return { expr: None }, Some(3));
    let method = ast.push(
        NodeKind::Method {
            name: "m".into(),
            modifiers: vec!["public".into()],
            params: vec![],
            nodes: vec![ret],
            by_ref: false,
        },
        Some(3),
    );
    let interface = ast.push(
        NodeKind::Interface {
            name: "I".into(),
            extends: vec![],
            nodes: vec![method],
        },
        Some(2),
    );
    let func_echo = ast.push(NodeKind::Echo { exprs: vec![] }, Some(6));
    let func = ast.push(
        NodeKind::Function {
            name: "f".into(),
            params: vec![],
            nodes: vec![func_echo],
            by_ref: false,
        },
        Some(6),
    );
    ast.push(
        NodeKind::SyntaxTree {
            nodes: vec![interface, func],
            file_path: "/proj/i.php".into(),
            file_location: "/proj".into(),
            file_name: "i.php".into(),
        },
        None,
    )
}

#[derive(Default)]
struct Preorder {
    kinds: Vec<&'static str>,
    stacks: Vec<Vec<NodeId>>,
}

impl Visitor for Preorder {
    fn visit(&mut self, ast: &mut Ast, node: NodeId, stack: &NamespaceStack) {
        self.kinds.push(ast.kind(node).kind_name());
        self.stacks.push(stack.snapshot());
    }
}

#[test]
fn visits_in_preorder() {
    let mut ast = Ast::new();
    let root = interface_tree(&mut ast);

    let mut visitor = Preorder::default();
    let mut traverser = DfTraverser::new(root);
    traverser
        .register_visitor(&ast, &mut visitor)
        .expect("fresh visitor");
    traverser.traverse(&mut ast);

    assert_eq!(
        visitor.kinds,
        ["SyntaxTree", "Interface", "Method", "Return", "Function", "Echo"]
    );
}

#[test]
fn interface_scope_is_pushed_and_popped() {
    let mut ast = Ast::new();
    let root = interface_tree(&mut ast);

    let mut visitor = Preorder::default();
    let mut traverser = DfTraverser::new(root);
    traverser
        .register_visitor(&ast, &mut visitor)
        .expect("fresh visitor");
    traverser.traverse(&mut ast);

    // At the Return inside I::m, the stack chains file, interface, method.
    let return_stack: Vec<&str> = visitor.stacks[3]
        .iter()
        .map(|id| ast.kind(*id).kind_name())
        .collect();
    assert_eq!(return_stack, ["SyntaxTree", "Interface", "Method"]);

    // The interface was popped before its sibling function: at the Echo
    // inside f, the stack is file then function only.
    let echo_stack: Vec<&str> = visitor.stacks[5]
        .iter()
        .map(|id| ast.kind(*id).kind_name())
        .collect();
    assert_eq!(echo_stack, ["SyntaxTree", "Function"]);
}

#[test]
fn stack_excludes_the_visited_node() {
    let mut ast = Ast::new();
    let root = interface_tree(&mut ast);

    let mut visitor = Preorder::default();
    let mut traverser = DfTraverser::new(root);
    traverser
        .register_visitor(&ast, &mut visitor)
        .expect("fresh visitor");
    traverser.traverse(&mut ast);

    // The root sees an empty stack; the interface sees only the file.
    assert!(visitor.stacks[0].is_empty());
    assert_eq!(visitor.stacks[1], vec![root]);
}

#[test]
fn repeated_walks_share_a_traverser_cleanly() {
    let mut ast = Ast::new();
    let root = interface_tree(&mut ast);

    let mut visitor = Preorder::default();
    let mut traverser = DfTraverser::new(root);
    traverser
        .register_visitor(&ast, &mut visitor)
        .expect("fresh visitor");
    traverser.traverse(&mut ast);
    traverser.traverse(&mut ast);

    // A symmetric push/pop leaves no residue: the second walk records
    // exactly the same stacks as the first.
    let half = visitor.stacks.len() / 2;
    assert_eq!(visitor.stacks[..half], visitor.stacks[half..]);
    assert_eq!(visitor.kinds[..half], visitor.kinds[half..]);
}
