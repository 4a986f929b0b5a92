//! Concrete-syntax-tree to AST lowering.
//!
//! Maps tree-sitter's grammar contexts onto the closed node model.
//! Pass-through wrappers are elided to their meaningful child; contexts
//! with no first-class variant become `Unknown` nodes with a recorded
//! warning, keeping their children traversable.

use std::path::Path;

use phloem_ast::{Ast, CallTarget, NodeId, NodeKind, UseKind};

use crate::diagnostics::Diagnostics;

type TsNode<'t> = tree_sitter::Node<'t>;

pub(crate) struct Lowerer<'s> {
    src: &'s [u8],
    diagnostics: Diagnostics,
}

impl<'s> Lowerer<'s> {
    pub(crate) fn new(src: &'s [u8]) -> Self {
        Self {
            src,
            diagnostics: Diagnostics::new(),
        }
    }

    pub(crate) fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }

    /// Lower a whole `program` node and wrap it in a `SyntaxTree`.
    pub(crate) fn lower_file(&mut self, ast: &mut Ast, root: TsNode<'_>, path: &Path) -> NodeId {
        let nodes = self.lower_program(ast, root);
        let file_location = path.parent().unwrap_or_else(|| Path::new("/")).to_path_buf();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        ast.push(
            NodeKind::SyntaxTree {
                nodes,
                file_path: path.to_path_buf(),
                file_location,
                file_name,
            },
            None,
        )
    }

    /// Top-level statements. A braceless `namespace N;` owns everything
    /// that follows it (up to the next such declaration), which the
    /// grammar leaves as siblings.
    fn lower_program(&mut self, ast: &mut Ast, root: TsNode<'_>) -> Vec<NodeId> {
        let mut top = Vec::new();
        let mut open_namespace: Option<NodeId> = None;

        for child in named_children(root) {
            if child.kind() == "namespace_definition" && child.child_by_field_name("body").is_none()
            {
                let name = child
                    .child_by_field_name("name")
                    .map(|name| self.text(name).to_string());
                let id = ast.push(
                    NodeKind::Namespace {
                        name,
                        nodes: Vec::new(),
                    },
                    self.line(child),
                );
                top.push(id);
                open_namespace = Some(id);
                continue;
            }

            let Some(stmt) = self.lower(ast, child) else {
                continue;
            };
            match open_namespace {
                Some(ns) => {
                    if let NodeKind::Namespace { nodes, .. } = ast.kind_mut(ns) {
                        nodes.push(stmt);
                    }
                }
                None => top.push(stmt),
            }
        }
        top
    }

    // -----------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------

    fn lower(&mut self, ast: &mut Ast, node: TsNode<'_>) -> Option<NodeId> {
        let line = self.line(node);
        let kind = match node.kind() {
            // trivia and wrappers
            "php_tag" | "comment" | "empty_statement" | "attribute_list" => return None,
            "expression_statement" => {
                let inner = named_children(node).into_iter().next()?;
                return self.lower(ast, inner);
            }
            "parenthesized_expression" => {
                let inner = named_children(node).into_iter().next()?;
                return self.lower(ast, inner);
            }
            "text" => NodeKind::InlineHtml {
                text: self.text(node).to_string(),
            },
            "text_interpolation" => NodeKind::InlineHtml {
                text: self.text(node).to_string(),
            },

            // literals and references
            "integer" => self.lower_integer(node),
            "float" => self.lower_float(node),
            "boolean" => NodeKind::BoolLit {
                value: self.text(node).eq_ignore_ascii_case("true"),
            },
            "null" => NodeKind::NullLit,
            "string" => NodeKind::StringLit {
                value: strip_quotes(self.text(node)).to_string(),
            },
            "encapsed_string" => return Some(self.lower_encapsed(ast, node)),
            "variable_name" => NodeKind::Variable {
                name: self.text(node).to_string(),
            },
            "name" | "relative_scope" => NodeKind::Constant {
                name: self.text(node).to_string(),
            },
            "qualified_name" => NodeKind::QualifiedName {
                parts: self
                    .text(node)
                    .split('\\')
                    .filter(|part| !part.is_empty())
                    .map(str::to_string)
                    .collect(),
            },
            "array_creation_expression" => {
                let elements = named_children(node)
                    .into_iter()
                    .map(|init| self.lower_array_element(ast, init))
                    .collect();
                NodeKind::ArrayLit { elements }
            }
            "list_literal" => {
                let values = self.lower_all(ast, named_children(node));
                let elements = values
                    .into_iter()
                    .map(|value| {
                        let value_line = ast.line(value);
                        ast.push(
                            NodeKind::ArrayElement {
                                key: None,
                                value,
                                by_ref: false,
                            },
                            value_line,
                        )
                    })
                    .collect();
                NodeKind::ArrayLit { elements }
            }
            "subscript_expression" => return Some(self.lower_subscript(ast, node)),
            "class_constant_access_expression" => {
                let named = named_children(node);
                let class = self.lower_call_target(ast, named.first().copied());
                let name = named
                    .get(1)
                    .map(|name| self.text(*name).to_string())
                    .unwrap_or_else(|| "class".to_string());
                NodeKind::ClassConstant { class, name }
            }

            // expressions
            "binary_expression" => return Some(self.lower_binary(ast, node)),
            "unary_op_expression" => {
                let op = node
                    .child(0)
                    .filter(|child| !child.is_named())
                    .map(|child| self.text(child).to_string())
                    .unwrap_or_default();
                let expr = self.lower_first_named(ast, node);
                NodeKind::UnaryOp { op, expr }
            }
            "error_suppression_expression" => NodeKind::UnaryOp {
                op: "@".to_string(),
                expr: self.lower_first_named(ast, node),
            },
            "update_expression" => return Some(self.lower_update(ast, node)),
            "assignment_expression" => return Some(self.lower_assignment(ast, node, false)),
            "reference_assignment_expression" => {
                return Some(self.lower_assignment(ast, node, true));
            }
            "augmented_assignment_expression" => {
                let op = node
                    .child_by_field_name("operator")
                    .map(|op| self.text(op).to_string())
                    .unwrap_or_default();
                let target = self.lower_field(ast, node, "left");
                let value = self.lower_field(ast, node, "right");
                NodeKind::AssignOp { op, target, value }
            }
            "conditional_expression" => {
                let cond = self.lower_field(ast, node, "condition");
                let then = node
                    .child_by_field_name("body")
                    .and_then(|body| self.lower(ast, body));
                let else_ = self.lower_field(ast, node, "alternative");
                NodeKind::Ternary { cond, then, else_ }
            }
            "cast_expression" => {
                let kind = node
                    .child_by_field_name("type")
                    .map(|ty| self.text(ty).to_string())
                    .unwrap_or_default();
                let expr = self.lower_field(ast, node, "value");
                NodeKind::Cast { kind, expr }
            }
            "clone_expression" => NodeKind::Clone {
                expr: self.lower_first_named(ast, node),
            },
            "object_creation_expression" => return Some(self.lower_new(ast, node)),
            "function_call_expression" => return self.lower_function_call(ast, node),
            "member_call_expression" | "nullsafe_member_call_expression" => {
                let receiver = self.lower_field(ast, node, "object");
                let name = self.lower_call_target(ast, node.child_by_field_name("name"));
                let args = self.lower_arguments(ast, node.child_by_field_name("arguments"));
                NodeKind::MethodCall {
                    receiver,
                    name,
                    args,
                }
            }
            "scoped_call_expression" => {
                let class = self.lower_call_target(ast, node.child_by_field_name("scope"));
                let name = self.lower_call_target(ast, node.child_by_field_name("name"));
                let args = self.lower_arguments(ast, node.child_by_field_name("arguments"));
                NodeKind::StaticCall { class, name, args }
            }
            "member_access_expression" | "nullsafe_member_access_expression" => {
                let receiver = node
                    .child_by_field_name("object")
                    .and_then(|object| self.lower(ast, object));
                let name = self.lower_call_target(ast, node.child_by_field_name("name"));
                NodeKind::ObjectProperty { receiver, name }
            }
            "yield_expression" => return Some(self.lower_yield(ast, node)),
            "print_intrinsic" => NodeKind::Print {
                expr: self.lower_first_named(ast, node),
            },
            "anonymous_function_creation_expression" | "anonymous_function" => {
                return Some(self.lower_closure(ast, node));
            }
            "arrow_function" => return Some(self.lower_arrow(ast, node)),

            // statements
            "compound_statement" => NodeKind::Block {
                nodes: self.lower_all(ast, named_children(node)),
            },
            "echo_statement" => NodeKind::Echo {
                exprs: self.lower_all(ast, named_children(node)),
            },
            "return_statement" => NodeKind::Return {
                expr: self.lower_opt_first_named(ast, node),
            },
            "break_statement" => NodeKind::Break {
                level: self.lower_opt_first_named(ast, node),
            },
            "continue_statement" => NodeKind::Continue {
                level: self.lower_opt_first_named(ast, node),
            },
            "goto_statement" => NodeKind::Goto {
                label: named_children(node)
                    .first()
                    .map(|label| self.text(*label).to_string())
                    .unwrap_or_default(),
            },
            "throw_expression" | "throw_statement" => NodeKind::Throw {
                expr: self.lower_first_named(ast, node),
            },
            "unset_statement" => NodeKind::Unset {
                exprs: self.lower_all(ast, named_children(node)),
            },
            "exit_statement" => NodeKind::Exit {
                expr: self.lower_opt_first_named(ast, node),
            },
            "global_declaration" => NodeKind::GlobalVariables {
                variables: self.lower_all(ast, named_children(node)),
            },
            "include_expression" | "include_once_expression" => NodeKind::Include {
                expr: self.lower_first_named(ast, node),
                once: node.kind().contains("once"),
                body: None,
            },
            "require_expression" | "require_once_expression" => NodeKind::Require {
                expr: self.lower_first_named(ast, node),
                once: node.kind().contains("once"),
                body: None,
            },

            // control flow
            "if_statement" => return Some(self.lower_if(ast, node)),
            "while_statement" => NodeKind::While {
                cond: self.lower_field(ast, node, "condition"),
                body: self.lower_field(ast, node, "body"),
            },
            "do_statement" => NodeKind::DoWhile {
                body: self.lower_field(ast, node, "body"),
                cond: self.lower_field(ast, node, "condition"),
            },
            "for_statement" => return Some(self.lower_for(ast, node)),
            "foreach_statement" => return Some(self.lower_foreach(ast, node)),
            "switch_statement" => return Some(self.lower_switch(ast, node)),
            "try_statement" => return Some(self.lower_try(ast, node)),

            // declarations
            "function_definition" => return Some(self.lower_function(ast, node)),
            "method_declaration" => return Some(self.lower_method(ast, node)),
            "class_declaration" => return Some(self.lower_class(ast, node)),
            "interface_declaration" => {
                let name = self.field_text(node, "name");
                let extends = find_child(node, "base_clause")
                    .map(|clause| {
                        named_children(clause)
                            .into_iter()
                            .map(|base| self.text(base).to_string())
                            .collect()
                    })
                    .unwrap_or_default();
                let nodes = self.lower_body_field(ast, node);
                NodeKind::Interface {
                    name,
                    extends,
                    nodes,
                }
            }
            "trait_declaration" => NodeKind::Trait {
                name: self.field_text(node, "name"),
                nodes: self.lower_body_field(ast, node),
            },
            "namespace_definition" => {
                let name = node
                    .child_by_field_name("name")
                    .map(|name| self.text(name).to_string());
                NodeKind::Namespace {
                    name,
                    nodes: self.lower_body_field(ast, node),
                }
            }
            "namespace_use_declaration" => return Some(self.lower_namespace_use(ast, node)),
            "use_declaration" => {
                // `use TraitA, TraitB;` inside a class body
                let chains = named_children(node)
                    .into_iter()
                    .filter(|child| matches!(child.kind(), "name" | "qualified_name"))
                    .map(|child| {
                        let line = self.line(child);
                        let path = self.text(child).to_string();
                        ast.push(NodeKind::UseClause { path, alias: None }, line)
                    })
                    .collect();
                NodeKind::UseDeclaration {
                    kind: UseKind::Plain,
                    chains,
                }
            }
            "const_declaration" => {
                let elements = named_children(node)
                    .into_iter()
                    .filter(|child| child.kind() == "const_element")
                    .map(|element| self.lower_const_element(ast, element))
                    .collect();
                NodeKind::ConstDeclaration { elements }
            }
            "property_declaration" => {
                let modifiers = self.modifier_texts(node);
                let properties = named_children(node)
                    .into_iter()
                    .filter(|child| child.kind() == "property_element")
                    .map(|element| self.lower_property_element(ast, element))
                    .collect();
                NodeKind::PropertyDeclaration {
                    modifiers,
                    properties,
                }
            }

            _ => return Some(self.unknown(ast, node)),
        };
        Some(ast.push(kind, line))
    }

    // -----------------------------------------------------------------
    // Expression helpers
    // -----------------------------------------------------------------

    fn lower_integer(&mut self, node: TsNode<'_>) -> NodeKind {
        let text = self.text(node);
        match parse_php_int(text) {
            Some(value) => NodeKind::IntLit { value },
            None => match text.replace('_', "").parse::<f64>() {
                Ok(value) => NodeKind::FloatLit { value },
                Err(_) => {
                    self.warn(node, format!("unparseable integer literal `{text}`"));
                    NodeKind::IntLit { value: 0 }
                }
            },
        }
    }

    fn lower_float(&mut self, node: TsNode<'_>) -> NodeKind {
        let text = self.text(node).replace('_', "");
        match text.parse::<f64>() {
            Ok(value) => NodeKind::FloatLit { value },
            Err(_) => {
                self.warn(node, format!("unparseable float literal `{text}`"));
                NodeKind::FloatLit { value: 0.0 }
            }
        }
    }

    /// Double-quoted strings lower to their cooked text; interpolated
    /// parts become a `.` concatenation chain, mirroring evaluation.
    fn lower_encapsed(&mut self, ast: &mut Ast, node: TsNode<'_>) -> NodeId {
        let line = self.line(node);
        let mut parts = Vec::new();
        for part in named_children(node) {
            let lowered = match part.kind() {
                "string_content" => ast.push(
                    NodeKind::StringLit {
                        value: self.text(part).to_string(),
                    },
                    self.line(part),
                ),
                "escape_sequence" => ast.push(
                    NodeKind::StringLit {
                        value: unescape(self.text(part)),
                    },
                    self.line(part),
                ),
                _ => match self.lower(ast, part) {
                    Some(id) => id,
                    None => continue,
                },
            };
            parts.push(lowered);
        }

        match parts.len() {
            0 => ast.push(
                NodeKind::StringLit {
                    value: strip_quotes(self.text(node)).to_string(),
                },
                line,
            ),
            1 => parts[0],
            _ => {
                let mut iter = parts.into_iter();
                let mut acc = iter.next().expect("len checked above");
                for next in iter {
                    acc = ast.push(
                        NodeKind::BinaryOp {
                            op: ".".to_string(),
                            left: acc,
                            right: next,
                        },
                        line,
                    );
                }
                acc
            }
        }
    }

    fn lower_binary(&mut self, ast: &mut Ast, node: TsNode<'_>) -> NodeId {
        let op = node
            .child_by_field_name("operator")
            .or_else(|| node.child(1))
            .map(|op| self.text(op).to_string())
            .unwrap_or_default();
        let left = self.lower_field(ast, node, "left");
        let right = self.lower_field(ast, node, "right");
        ast.push(NodeKind::BinaryOp { op, left, right }, self.line(node))
    }

    fn lower_update(&mut self, ast: &mut Ast, node: TsNode<'_>) -> NodeId {
        let prefix = node.child(0).map(|first| !first.is_named()).unwrap_or(false);
        let op = if prefix {
            node.child(0)
        } else {
            node.child(node.child_count().saturating_sub(1))
        }
        .map(|op| self.text(op).to_string())
        .unwrap_or_default();
        let var = self.lower_first_named(ast, node);
        let kind = if prefix {
            NodeKind::PreIncDec { op, var }
        } else {
            NodeKind::PostIncDec { op, var }
        };
        ast.push(kind, self.line(node))
    }

    fn lower_assignment(&mut self, ast: &mut Ast, node: TsNode<'_>, by_ref: bool) -> NodeId {
        let left = node.child_by_field_name("left");
        let value = self.lower_field(ast, node, "right");
        let line = self.line(node);

        if let Some(left) = left
            && left.kind() == "list_literal"
        {
            let targets = self.lower_all(ast, named_children(left));
            return ast.push(NodeKind::ListAssignment { targets, value }, line);
        }

        let target = match left {
            Some(left) => self.lower_or_missing(ast, left),
            None => self.missing(ast, node),
        };
        ast.push(
            NodeKind::Assignment {
                target,
                value,
                by_ref,
            },
            line,
        )
    }

    fn lower_subscript(&mut self, ast: &mut Ast, node: TsNode<'_>) -> NodeId {
        let named = named_children(node);
        let base = match named.first() {
            Some(base) => self.lower_or_missing(ast, *base),
            None => self.missing(ast, node),
        };
        let index = named.get(1).and_then(|index| self.lower(ast, *index));
        let line = self.line(node);

        // Legacy `{}` indexing reads single characters out of strings.
        let curly = self.has_token(node, "{");
        match (curly, index) {
            (true, Some(index)) => ast.push(NodeKind::StringOffset { base, index }, line),
            (_, index) => ast.push(NodeKind::ArrayOffset { base, index }, line),
        }
    }

    fn lower_array_element(&mut self, ast: &mut Ast, init: TsNode<'_>) -> NodeId {
        let line = self.line(init);
        if init.kind() != "array_element_initializer" {
            let value = self.lower_or_missing(ast, init);
            return ast.push(
                NodeKind::ArrayElement {
                    key: None,
                    value,
                    by_ref: false,
                },
                line,
            );
        }

        let by_ref = self.has_token(init, "&");
        let named = named_children(init);
        let has_arrow = self.has_token(init, "=>");
        let (key, value) = if has_arrow && named.len() >= 2 {
            let key = self.lower(ast, named[0]);
            let value = self.lower_or_missing(ast, named[1]);
            (key, value)
        } else {
            let value = match named.first() {
                Some(value) => self.lower_or_missing(ast, *value),
                None => self.missing(ast, init),
            };
            (None, value)
        };
        ast.push(NodeKind::ArrayElement { key, value, by_ref }, line)
    }

    fn lower_new(&mut self, ast: &mut Ast, node: TsNode<'_>) -> NodeId {
        let line = self.line(node);
        let designator = named_children(node)
            .into_iter()
            .find(|child| !matches!(child.kind(), "arguments" | "attribute_list"));
        if designator.map(|d| d.kind()) == Some("declaration_list") {
            // anonymous class
            return self.unknown(ast, node);
        }
        let class = self.lower_call_target(ast, designator);
        let args = self.lower_arguments(ast, node.child_by_field_name("arguments"));
        ast.push(NodeKind::New { class, args }, line)
    }

    fn lower_function_call(&mut self, ast: &mut Ast, node: TsNode<'_>) -> Option<NodeId> {
        let line = self.line(node);
        let function = node.child_by_field_name("function");
        let args = self.lower_arguments(ast, node.child_by_field_name("arguments"));

        // Language constructs that parse as plain calls.
        if let Some(function) = function
            && function.kind() == "name"
        {
            let kind = match self.text(function) {
                "isset" => Some(NodeKind::IsSet { exprs: args.clone() }),
                "empty" if args.len() == 1 => Some(NodeKind::Empty { expr: args[0] }),
                "eval" if args.len() == 1 => Some(NodeKind::Eval { expr: args[0] }),
                "exit" | "die" => Some(NodeKind::Exit {
                    expr: args.first().copied(),
                }),
                _ => None,
            };
            if let Some(kind) = kind {
                return Some(ast.push(kind, line));
            }
        }

        let name = self.lower_call_target(ast, function);
        Some(ast.push(NodeKind::FunctionCall { name, args }, line))
    }

    fn lower_yield(&mut self, ast: &mut Ast, node: TsNode<'_>) -> NodeId {
        let line = self.line(node);
        if self.has_token(node, "from") {
            let expr = self.lower_first_named(ast, node);
            return ast.push(NodeKind::YieldFrom { expr }, line);
        }
        let expr = self.lower_opt_first_named(ast, node);
        ast.push(NodeKind::Yield { expr }, line)
    }

    fn lower_closure(&mut self, ast: &mut Ast, node: TsNode<'_>) -> NodeId {
        let line = self.line(node);
        let is_static = self.has_token(node, "static");
        let by_ref = self.direct_by_ref(node);
        let params = self.lower_params(ast, find_child(node, "formal_parameters"));

        let mut uses = Vec::new();
        if let Some(clause) = find_child(node, "anonymous_function_use_clause") {
            for captured in named_children(clause) {
                if captured.kind() == "variable_name" {
                    let name = self.text(captured).to_string();
                    uses.push(ast.push(
                        NodeKind::LexicalVariable {
                            name,
                            by_ref: false,
                        },
                        self.line(captured),
                    ));
                } else if let Some(inner) = named_children(captured)
                    .into_iter()
                    .find(|inner| inner.kind() == "variable_name")
                {
                    // a wrapper (by_ref) around the captured variable
                    let name = self.text(inner).to_string();
                    uses.push(ast.push(
                        NodeKind::LexicalVariable { name, by_ref: true },
                        self.line(captured),
                    ));
                }
            }
        }

        let nodes = find_child(node, "compound_statement")
            .map(|body| self.lower_all(ast, named_children(body)))
            .unwrap_or_default();
        ast.push(
            NodeKind::Closure {
                params,
                uses,
                nodes,
                by_ref,
                is_static,
            },
            line,
        )
    }

    fn lower_arrow(&mut self, ast: &mut Ast, node: TsNode<'_>) -> NodeId {
        let line = self.line(node);
        let is_static = self.has_token(node, "static");
        let by_ref = self.direct_by_ref(node);
        let params = self.lower_params(ast, find_child(node, "formal_parameters"));
        let nodes = node
            .child_by_field_name("body")
            .and_then(|body| self.lower(ast, body))
            .into_iter()
            .collect();
        ast.push(
            NodeKind::Closure {
                params,
                uses: Vec::new(),
                nodes,
                by_ref,
                is_static,
            },
            line,
        )
    }

    // -----------------------------------------------------------------
    // Control flow helpers
    // -----------------------------------------------------------------

    fn lower_if(&mut self, ast: &mut Ast, node: TsNode<'_>) -> NodeId {
        let line = self.line(node);
        let cond = self.lower_field(ast, node, "condition");
        let then = self.lower_field(ast, node, "body");

        let mut elseifs = Vec::new();
        let mut else_ = None;
        let mut cursor = node.walk();
        for alternative in node.children_by_field_name("alternative", &mut cursor) {
            match alternative.kind() {
                "else_if_clause" => {
                    let cond = self.lower_field(ast, alternative, "condition");
                    let body = self.lower_field(ast, alternative, "body");
                    elseifs.push(ast.push(NodeKind::ElseIf { cond, body }, self.line(alternative)));
                }
                "else_clause" => {
                    let body = self.lower_field(ast, alternative, "body");
                    else_ = Some(ast.push(NodeKind::Else { body }, self.line(alternative)));
                }
                _ => {}
            }
        }
        ast.push(
            NodeKind::If {
                cond,
                then,
                elseifs,
                else_,
            },
            line,
        )
    }

    fn lower_for(&mut self, ast: &mut Ast, node: TsNode<'_>) -> NodeId {
        let line = self.line(node);
        let init = self.lower_field_list(ast, node, "initialize");
        let cond = self.lower_field_list(ast, node, "condition");
        let step = self.lower_field_list(ast, node, "update");
        let body = match node.child_by_field_name("body") {
            Some(body) => self.lower_or_missing(ast, body),
            None => match named_children(node).last() {
                Some(last) => self.lower_or_missing(ast, *last),
                None => self.missing(ast, node),
            },
        };
        ast.push(
            NodeKind::For {
                init,
                cond,
                step,
                body,
            },
            line,
        )
    }

    fn lower_foreach(&mut self, ast: &mut Ast, node: TsNode<'_>) -> NodeId {
        let line = self.line(node);
        let body_node = node
            .child_by_field_name("body")
            .or_else(|| named_children(node).last().copied());
        let named: Vec<TsNode<'_>> = named_children(node)
            .into_iter()
            .filter(|child| Some(child.id()) != body_node.map(|body| body.id()))
            .collect();

        let iterable = match named.first() {
            Some(iterable) => self.lower_or_missing(ast, *iterable),
            None => self.missing(ast, node),
        };

        let mut key = None;
        let mut by_ref = false;
        let value = match named.get(1) {
            Some(binding) if binding.kind() == "pair" => {
                let parts = named_children(*binding);
                key = parts.first().and_then(|part| self.lower(ast, *part));
                by_ref = self.has_token(*binding, "&");
                match parts.get(1) {
                    Some(value) => self.lower_or_missing(ast, *value),
                    None => self.missing(ast, *binding),
                }
            }
            Some(binding) if binding.kind() == "by_ref" => {
                by_ref = true;
                match named_children(*binding).first() {
                    Some(value) => self.lower_or_missing(ast, *value),
                    None => self.missing(ast, *binding),
                }
            }
            Some(binding) => self.lower_or_missing(ast, *binding),
            None => self.missing(ast, node),
        };

        let body = match body_node {
            Some(body) => self.lower_or_missing(ast, body),
            None => self.missing(ast, node),
        };
        ast.push(
            NodeKind::Foreach {
                iterable,
                key,
                value,
                by_ref,
                body,
            },
            line,
        )
    }

    fn lower_switch(&mut self, ast: &mut Ast, node: TsNode<'_>) -> NodeId {
        let line = self.line(node);
        let cond = self.lower_field(ast, node, "condition");
        let mut cases = Vec::new();
        if let Some(block) = node.child_by_field_name("body") {
            for arm in named_children(block) {
                match arm.kind() {
                    "case_statement" => {
                        let named = named_children(arm);
                        let expr = match named.first() {
                            Some(value) => self.lower_or_missing(ast, *value),
                            None => self.missing(ast, arm),
                        };
                        let nodes = self.lower_all(ast, named.into_iter().skip(1).collect());
                        cases.push(ast.push(NodeKind::Case { expr, nodes }, self.line(arm)));
                    }
                    "default_statement" => {
                        let nodes = self.lower_all(ast, named_children(arm));
                        cases.push(ast.push(NodeKind::Default { nodes }, self.line(arm)));
                    }
                    _ => {}
                }
            }
        }
        ast.push(NodeKind::Switch { cond, cases }, line)
    }

    fn lower_try(&mut self, ast: &mut Ast, node: TsNode<'_>) -> NodeId {
        let line = self.line(node);
        let nodes = self.lower_body_field(ast, node);

        let mut catches = Vec::new();
        let mut finally = None;
        for clause in named_children(node) {
            match clause.kind() {
                "catch_clause" => {
                    let class_name = clause
                        .child_by_field_name("type")
                        .map(|types| {
                            named_children(types)
                                .into_iter()
                                .map(|ty| self.text(ty))
                                .collect::<Vec<_>>()
                                .join("|")
                        })
                        .unwrap_or_default();
                    let var = clause
                        .child_by_field_name("name")
                        .map(|name| self.text(name).to_string());
                    let body = clause
                        .child_by_field_name("body")
                        .map(|body| self.lower_all(ast, named_children(body)))
                        .unwrap_or_default();
                    catches.push(ast.push(
                        NodeKind::Catch {
                            class_name,
                            var,
                            nodes: body,
                        },
                        self.line(clause),
                    ));
                }
                "finally_clause" => {
                    let body = clause
                        .child_by_field_name("body")
                        .map(|body| self.lower_all(ast, named_children(body)))
                        .unwrap_or_default();
                    finally = Some(ast.push(NodeKind::Finally { nodes: body }, self.line(clause)));
                }
                _ => {}
            }
        }
        ast.push(
            NodeKind::Try {
                nodes,
                catches,
                finally,
            },
            line,
        )
    }

    // -----------------------------------------------------------------
    // Declaration helpers
    // -----------------------------------------------------------------

    fn lower_function(&mut self, ast: &mut Ast, node: TsNode<'_>) -> NodeId {
        let line = self.line(node);
        let name = self.field_text(node, "name");
        let by_ref = self.direct_by_ref(node);
        let params = self.lower_params(ast, node.child_by_field_name("parameters"));
        let nodes = self.lower_body_field(ast, node);
        ast.push(
            NodeKind::Function {
                name,
                params,
                nodes,
                by_ref,
            },
            line,
        )
    }

    fn lower_method(&mut self, ast: &mut Ast, node: TsNode<'_>) -> NodeId {
        let line = self.line(node);
        let name = self.field_text(node, "name");
        let modifiers = self.modifier_texts(node);
        let by_ref = self.direct_by_ref(node);
        let params = self.lower_params(ast, node.child_by_field_name("parameters"));
        let nodes = self.lower_body_field(ast, node);
        ast.push(
            NodeKind::Method {
                name,
                modifiers,
                params,
                nodes,
                by_ref,
            },
            line,
        )
    }

    fn lower_class(&mut self, ast: &mut Ast, node: TsNode<'_>) -> NodeId {
        let line = self.line(node);
        let name = self.field_text(node, "name");
        let modifier = self.modifier_texts(node).into_iter().next();
        let mut extends = None;
        let mut implements = Vec::new();
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "base_clause" => {
                    extends = named_children(child)
                        .first()
                        .map(|base| self.text(*base).to_string());
                }
                "class_interface_clause" => {
                    implements = named_children(child)
                        .into_iter()
                        .map(|interface| self.text(interface).to_string())
                        .collect();
                }
                _ => {}
            }
        }
        let nodes = self.lower_body_field(ast, node);
        ast.push(
            NodeKind::Class {
                name,
                modifier,
                extends,
                implements,
                nodes,
            },
            line,
        )
    }

    fn lower_params(&mut self, ast: &mut Ast, params: Option<TsNode<'_>>) -> Vec<NodeId> {
        let Some(params) = params else {
            return Vec::new();
        };
        named_children(params)
            .into_iter()
            .filter_map(|param| match param.kind() {
                "simple_parameter" | "variadic_parameter" | "property_promotion_parameter" => {
                    let name = param
                        .child_by_field_name("name")
                        .map(|name| self.text(name).to_string())
                        .unwrap_or_default();
                    let type_hint = param
                        .child_by_field_name("type")
                        .map(|ty| self.text(ty).to_string());
                    let by_ref = self.direct_by_ref(param);
                    let default = param
                        .child_by_field_name("default_value")
                        .and_then(|default| self.lower(ast, default));
                    Some(ast.push(
                        NodeKind::FormalParameter {
                            name,
                            type_hint,
                            by_ref,
                            default,
                        },
                        self.line(param),
                    ))
                }
                _ => self.lower(ast, param),
            })
            .collect()
    }

    fn lower_namespace_use(&mut self, ast: &mut Ast, node: TsNode<'_>) -> NodeId {
        let line = self.line(node);
        let mut kind = UseKind::Plain;
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if !child.is_named() {
                match self.text(child) {
                    "function" => kind = UseKind::Function,
                    "const" => kind = UseKind::Const,
                    _ => {}
                }
            }
        }

        let chains = named_children(node)
            .into_iter()
            .filter(|clause| clause.kind() == "namespace_use_clause")
            .map(|clause| {
                let path = named_children(clause)
                    .first()
                    .map(|name| self.text(*name).to_string())
                    .unwrap_or_default();
                let alias = find_child(clause, "namespace_aliasing_clause")
                    .and_then(|aliasing| named_children(aliasing).first().copied())
                    .map(|alias| self.text(alias).to_string());
                ast.push(NodeKind::UseClause { path, alias }, self.line(clause))
            })
            .collect();
        ast.push(NodeKind::UseDeclaration { kind, chains }, line)
    }

    fn lower_const_element(&mut self, ast: &mut Ast, element: TsNode<'_>) -> NodeId {
        let named = named_children(element);
        let name = named
            .first()
            .map(|name| self.text(*name).to_string())
            .unwrap_or_default();
        let value = match named.get(1) {
            Some(value) => self.lower_or_missing(ast, *value),
            None => self.missing(ast, element),
        };
        ast.push(NodeKind::ConstElement { name, value }, self.line(element))
    }

    fn lower_property_element(&mut self, ast: &mut Ast, element: TsNode<'_>) -> NodeId {
        let named = named_children(element);
        let name = named
            .first()
            .map(|name| self.text(*name).to_string())
            .unwrap_or_default();
        let default = named.get(1).and_then(|default| self.lower(ast, *default));
        ast.push(
            NodeKind::PropertyElement { name, default },
            self.line(element),
        )
    }

    // -----------------------------------------------------------------
    // Small shared helpers
    // -----------------------------------------------------------------

    fn text(&self, node: TsNode<'_>) -> &'s str {
        node.utf8_text(self.src).unwrap_or_default()
    }

    fn line(&self, node: TsNode<'_>) -> Option<u32> {
        Some(node.start_position().row as u32 + 1)
    }

    fn field_text(&self, node: TsNode<'_>, field: &str) -> String {
        node.child_by_field_name(field)
            .map(|child| self.text(child).to_string())
            .unwrap_or_default()
    }

    fn lower_all(&mut self, ast: &mut Ast, children: Vec<TsNode<'_>>) -> Vec<NodeId> {
        children
            .into_iter()
            .filter_map(|child| self.lower(ast, child))
            .collect()
    }

    fn lower_first_named(&mut self, ast: &mut Ast, node: TsNode<'_>) -> NodeId {
        match named_children(node).first() {
            Some(child) => self.lower_or_missing(ast, *child),
            None => self.missing(ast, node),
        }
    }

    fn lower_opt_first_named(&mut self, ast: &mut Ast, node: TsNode<'_>) -> Option<NodeId> {
        named_children(node)
            .first()
            .and_then(|child| self.lower(ast, *child))
    }

    fn lower_field(&mut self, ast: &mut Ast, node: TsNode<'_>, field: &str) -> NodeId {
        match node.child_by_field_name(field) {
            Some(child) => self.lower_or_missing(ast, child),
            None => self.missing(ast, node),
        }
    }

    fn lower_field_list(&mut self, ast: &mut Ast, node: TsNode<'_>, field: &str) -> Vec<NodeId> {
        let mut cursor = node.walk();
        let children: Vec<TsNode<'_>> = node.children_by_field_name(field, &mut cursor).collect();
        self.lower_all(ast, children)
    }

    fn lower_or_missing(&mut self, ast: &mut Ast, node: TsNode<'_>) -> NodeId {
        match self.lower(ast, node) {
            Some(id) => id,
            None => self.missing(ast, node),
        }
    }

    /// Placeholder for a grammar slot the CST did not fill.
    fn missing(&mut self, ast: &mut Ast, node: TsNode<'_>) -> NodeId {
        ast.push(
            NodeKind::Unknown {
                kind: format!("{}<incomplete>", node.kind()),
                children: Vec::new(),
            },
            self.line(node),
        )
    }

    fn unknown(&mut self, ast: &mut Ast, node: TsNode<'_>) -> NodeId {
        let children = self.lower_all(ast, named_children(node));
        self.warn(
            node,
            format!("no dedicated syntax node for `{}`", node.kind()),
        );
        ast.push(
            NodeKind::Unknown {
                kind: node.kind().to_string(),
                children,
            },
            self.line(node),
        )
    }

    fn warn(&mut self, node: TsNode<'_>, message: String) {
        let line = node.start_position().row as u32 + 1;
        self.diagnostics.warning(message, line, node.byte_range());
    }

    fn lower_call_target(&mut self, ast: &mut Ast, node: Option<TsNode<'_>>) -> CallTarget {
        match node {
            Some(node) if matches!(node.kind(), "name" | "qualified_name" | "relative_scope") => {
                CallTarget::Name(self.text(node).to_string())
            }
            Some(node) => match self.lower(ast, node) {
                Some(id) => CallTarget::Expr(id),
                None => CallTarget::Expr(self.missing(ast, node)),
            },
            None => CallTarget::Name(String::new()),
        }
    }

    fn lower_arguments(&mut self, ast: &mut Ast, arguments: Option<TsNode<'_>>) -> Vec<NodeId> {
        let Some(arguments) = arguments else {
            return Vec::new();
        };
        named_children(arguments)
            .into_iter()
            .filter_map(|argument| match argument.kind() {
                // named arguments carry a label first; the value is last
                "argument" => named_children(argument)
                    .last()
                    .and_then(|value| self.lower(ast, *value)),
                "variadic_unpacking" => named_children(argument)
                    .first()
                    .and_then(|value| self.lower(ast, *value)),
                _ => self.lower(ast, argument),
            })
            .collect()
    }

    fn lower_body_field(&mut self, ast: &mut Ast, node: TsNode<'_>) -> Vec<NodeId> {
        node.child_by_field_name("body")
            .map(|body| self.lower_all(ast, named_children(body)))
            .unwrap_or_default()
    }

    fn modifier_texts(&self, node: TsNode<'_>) -> Vec<String> {
        let mut cursor = node.walk();
        node.children(&mut cursor)
            .filter(|child| {
                child.kind().ends_with("_modifier") && child.kind() != "reference_modifier"
            })
            .map(|modifier| self.text(modifier).to_string())
            .collect()
    }

    fn direct_by_ref(&self, node: TsNode<'_>) -> bool {
        let mut cursor = node.walk();
        node.children(&mut cursor)
            .any(|child| child.kind() == "reference_modifier" || child.kind() == "&")
    }

    fn has_token(&self, node: TsNode<'_>, token: &str) -> bool {
        let mut cursor = node.walk();
        node.children(&mut cursor)
            .any(|child| !child.is_named() && self.text(child) == token)
    }
}

fn named_children<'t>(node: TsNode<'t>) -> Vec<TsNode<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

fn find_child<'t>(node: TsNode<'t>, kind: &str) -> Option<TsNode<'t>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).find(|child| child.kind() == kind)
}

/// Decimal, hex, octal, and binary integer literals, with `_` separators.
fn parse_php_int(text: &str) -> Option<i64> {
    let text = text.replace('_', "");
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        return i64::from_str_radix(hex, 16).ok();
    }
    if let Some(bin) = text.strip_prefix("0b").or_else(|| text.strip_prefix("0B")) {
        return i64::from_str_radix(bin, 2).ok();
    }
    if let Some(oct) = text.strip_prefix("0o").or_else(|| text.strip_prefix("0O")) {
        return i64::from_str_radix(oct, 8).ok();
    }
    if text.len() > 1 && text.starts_with('0') && text.bytes().all(|b| (b'0'..=b'7').contains(&b)) {
        return i64::from_str_radix(&text[1..], 8).ok();
    }
    text.parse().ok()
}

fn strip_quotes(text: &str) -> &str {
    let bytes = text.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'\'' || first == b'"') && first == last {
            return &text[1..text.len() - 1];
        }
    }
    text
}

fn unescape(escape: &str) -> String {
    let Some(rest) = escape.strip_prefix('\\') else {
        return escape.to_string();
    };
    match rest {
        "n" => "\n".to_string(),
        "t" => "\t".to_string(),
        "r" => "\r".to_string(),
        "0" => "\0".to_string(),
        _ => rest.to_string(),
    }
}
