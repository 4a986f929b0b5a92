use crate::arena::Ast;
use crate::node::{CallTarget, FieldValue, NodeKind};

#[test]
fn kind_names_match_variants() {
    assert_eq!(NodeKind::NullLit.kind_name(), "NullLit");
    assert_eq!(
        NodeKind::Echo { exprs: vec![] }.kind_name(),
        "Echo"
    );
    assert_eq!(
        NodeKind::Unknown {
            kind: "heredoc".into(),
            children: vec![]
        }
        .kind_name(),
        "Unknown"
    );
}

#[test]
fn scope_defining_set() {
    let mut ast = Ast::new();
    let id = ast.push(NodeKind::NullLit, None);

    let scoped = [
        NodeKind::SyntaxTree {
            nodes: vec![],
            file_path: "/a.php".into(),
            file_location: "/".into(),
            file_name: "a.php".into(),
        },
        NodeKind::Class {
            name: "C".into(),
            modifier: None,
            extends: None,
            implements: vec![],
            nodes: vec![],
        },
        NodeKind::Function {
            name: "f".into(),
            params: vec![],
            nodes: vec![],
            by_ref: false,
        },
        NodeKind::Method {
            name: "m".into(),
            modifiers: vec![],
            params: vec![],
            nodes: vec![],
            by_ref: false,
        },
        NodeKind::Namespace {
            name: None,
            nodes: vec![],
        },
        NodeKind::Interface {
            name: "I".into(),
            extends: vec![],
            nodes: vec![],
        },
    ];
    for kind in scoped {
        assert!(kind.is_scope_defining(), "{}", kind.kind_name());
    }

    assert!(
        !NodeKind::Trait {
            name: "T".into(),
            nodes: vec![]
        }
        .is_scope_defining()
    );
    assert!(!NodeKind::Block { nodes: vec![id] }.is_scope_defining());
}

#[test]
fn if_field_order() {
    let mut ast = Ast::new();
    let cond = ast.push(NodeKind::BoolLit { value: true }, Some(1));
    let then = ast.push(NodeKind::Block { nodes: vec![] }, Some(1));
    let elif_cond = ast.push(NodeKind::BoolLit { value: false }, Some(2));
    let elif_body = ast.push(NodeKind::Block { nodes: vec![] }, Some(2));
    let elif = ast.push(
        NodeKind::ElseIf {
            cond: elif_cond,
            body: elif_body,
        },
        Some(2),
    );
    let else_body = ast.push(NodeKind::Block { nodes: vec![] }, Some(3));
    let else_ = ast.push(NodeKind::Else { body: else_body }, Some(3));
    let if_ = NodeKind::If {
        cond,
        then,
        elseifs: vec![elif],
        else_: Some(else_),
    };

    let names: Vec<&str> = if_.fields().iter().map(|(name, _)| *name).collect();
    assert_eq!(names, ["cond", "then", "elseifs", "else"]);
}

#[test]
fn optional_fields_appear_only_when_present() {
    let mut ast = Ast::new();
    let expr = ast.push(NodeKind::StringLit { value: "b.php".into() }, Some(1));
    let include = ast.push(
        NodeKind::Include {
            expr,
            once: false,
            body: None,
        },
        Some(1),
    );

    let names: Vec<&str> = ast.kind(include).fields().iter().map(|(n, _)| *n).collect();
    assert_eq!(names, ["expr"]);

    let tree = ast.push(
        NodeKind::SyntaxTree {
            nodes: vec![],
            file_path: "/b.php".into(),
            file_location: "/".into(),
            file_name: "b.php".into(),
        },
        None,
    );
    ast.set_include_body(include, tree);

    let names: Vec<&str> = ast.kind(include).fields().iter().map(|(n, _)| *n).collect();
    assert_eq!(names, ["expr", "body"]);
    assert_eq!(ast.include_body(include), Some(tree));
}

#[test]
fn circular_import_has_no_child_slots() {
    let mut ast = Ast::new();
    let tree = ast.push(
        NodeKind::SyntaxTree {
            nodes: vec![],
            file_path: "/a.php".into(),
            file_location: "/".into(),
            file_name: "a.php".into(),
        },
        None,
    );
    let circular = NodeKind::CircularImport {
        file_name: "a.php".into(),
        looped_tree: tree,
    };
    assert!(circular.fields().is_empty());
}

#[test]
fn dynamic_call_name_is_a_child() {
    let mut ast = Ast::new();
    let callee = ast.push(NodeKind::Variable { name: "$fn".into() }, Some(1));
    let arg = ast.push(NodeKind::IntLit { value: 1 }, Some(1));

    let bare = NodeKind::FunctionCall {
        name: CallTarget::Name("strlen".into()),
        args: vec![arg],
    };
    let names: Vec<&str> = bare.fields().iter().map(|(n, _)| *n).collect();
    assert_eq!(names, ["args"]);

    let dynamic = NodeKind::FunctionCall {
        name: CallTarget::Expr(callee),
        args: vec![arg],
    };
    let names: Vec<&str> = dynamic.fields().iter().map(|(n, _)| *n).collect();
    assert_eq!(names, ["name", "args"]);
    assert_eq!(
        dynamic.fields()[0].1,
        FieldValue::Node(callee)
    );
}

#[test]
fn children_flatten_sequences_in_order() {
    let mut ast = Ast::new();
    let stmt = ast.push(NodeKind::NullLit, Some(2));
    let catch_a = ast.push(
        NodeKind::Catch {
            class_name: "E".into(),
            var: Some("$e".into()),
            nodes: vec![],
        },
        Some(3),
    );
    let catch_b = ast.push(
        NodeKind::Catch {
            class_name: "F".into(),
            var: Some("$e".into()),
            nodes: vec![],
        },
        Some(4),
    );
    let finally_ = ast.push(NodeKind::Finally { nodes: vec![] }, Some(5));
    let try_ = ast.push(
        NodeKind::Try {
            nodes: vec![stmt],
            catches: vec![catch_a, catch_b],
            finally: Some(finally_),
        },
        Some(1),
    );

    assert_eq!(ast.children(try_), vec![stmt, catch_a, catch_b, finally_]);
}

#[test]
fn syntax_tree_accessors() {
    let mut ast = Ast::new();
    let tree = ast.push(
        NodeKind::SyntaxTree {
            nodes: vec![],
            file_path: "/proj/src/a.php".into(),
            file_location: "/proj/src".into(),
            file_name: "a.php".into(),
        },
        None,
    );
    let other = ast.push(NodeKind::NullLit, Some(1));

    assert_eq!(ast.file_path(tree).unwrap().to_str(), Some("/proj/src/a.php"));
    assert_eq!(ast.file_location(tree).unwrap().to_str(), Some("/proj/src"));
    assert_eq!(ast.file_name(tree), Some("a.php"));
    assert_eq!(ast.file_path(other), None);
}
