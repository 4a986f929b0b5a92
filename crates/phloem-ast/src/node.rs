//! The closed set of PHP syntax tree node variants.
//!
//! Every variant stores its scalar payload (names, operators, flags) inline
//! and its children as [`NodeId`] indices into the owning [`crate::Ast`]
//! arena. The reflective contract used by the traversers is
//! [`NodeKind::fields`]: the ordered list of child slots, by name. Scalar
//! payloads are not child slots, so walkers never see non-node values.

use std::path::PathBuf;

use crate::arena::NodeId;

/// A call, `new`, or property name position: either a bare name known at
/// parse time or an arbitrary expression evaluated at runtime.
///
/// The model is deliberately untyped at the semantic level; consumers
/// pattern-match on this (and on the variants themselves) instead of
/// relying on a typed API.
#[derive(Debug, Clone, PartialEq)]
pub enum CallTarget {
    Name(String),
    Expr(NodeId),
}

impl CallTarget {
    pub fn as_name(&self) -> Option<&str> {
        match self {
            CallTarget::Name(name) => Some(name),
            CallTarget::Expr(_) => None,
        }
    }

    fn as_node(&self) -> Option<NodeId> {
        match self {
            CallTarget::Name(_) => None,
            CallTarget::Expr(id) => Some(*id),
        }
    }
}

/// Flavor of a `use` declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UseKind {
    Plain,
    Function,
    Const,
}

/// A single named child slot of a node: either one child or a sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Node(NodeId),
    Seq(&'a [NodeId]),
}

/// The closed node sum. Adding a variant means touching this file only.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Per-file root. Participates in traversal like any other node.
    SyntaxTree {
        nodes: Vec<NodeId>,
        file_path: PathBuf,
        file_location: PathBuf,
        file_name: String,
    },

    // ---------------------------------------------------------------------
    // Literals and references
    // ---------------------------------------------------------------------
    IntLit {
        value: i64,
    },
    FloatLit {
        value: f64,
    },
    BoolLit {
        value: bool,
    },
    StringLit {
        value: String,
    },
    NullLit,
    /// Bare constant reference (`FOO`), also `self`/`parent`/`static`.
    Constant {
        name: String,
    },
    /// Variable reference; the name keeps its `$` sigil.
    Variable {
        name: String,
    },
    ArrayLit {
        elements: Vec<NodeId>,
    },
    ArrayElement {
        key: Option<NodeId>,
        value: NodeId,
        by_ref: bool,
    },
    ArrayOffset {
        base: NodeId,
        index: Option<NodeId>,
    },
    /// Legacy curly-brace string indexing (`$s{0}`).
    StringOffset {
        base: NodeId,
        index: NodeId,
    },
    /// Namespace-qualified name chain (`A\B\c`).
    QualifiedName {
        parts: Vec<String>,
    },
    /// `Class::NAME` access.
    ClassConstant {
        class: CallTarget,
        name: String,
    },

    // ---------------------------------------------------------------------
    // Expressions
    // ---------------------------------------------------------------------
    BinaryOp {
        op: String,
        left: NodeId,
        right: NodeId,
    },
    UnaryOp {
        op: String,
        expr: NodeId,
    },
    PreIncDec {
        op: String,
        var: NodeId,
    },
    PostIncDec {
        op: String,
        var: NodeId,
    },
    Assignment {
        target: NodeId,
        value: NodeId,
        by_ref: bool,
    },
    AssignOp {
        op: String,
        target: NodeId,
        value: NodeId,
    },
    Ternary {
        cond: NodeId,
        then: Option<NodeId>,
        else_: NodeId,
    },
    Cast {
        kind: String,
        expr: NodeId,
    },
    Clone {
        expr: NodeId,
    },
    New {
        class: CallTarget,
        args: Vec<NodeId>,
    },
    FunctionCall {
        name: CallTarget,
        args: Vec<NodeId>,
    },
    MethodCall {
        receiver: NodeId,
        name: CallTarget,
        args: Vec<NodeId>,
    },
    StaticCall {
        class: CallTarget,
        name: CallTarget,
        args: Vec<NodeId>,
    },
    ObjectProperty {
        receiver: Option<NodeId>,
        name: CallTarget,
    },
    ListAssignment {
        targets: Vec<NodeId>,
        value: NodeId,
    },
    Yield {
        expr: Option<NodeId>,
    },
    YieldFrom {
        expr: NodeId,
    },
    Print {
        expr: NodeId,
    },

    // ---------------------------------------------------------------------
    // Statements
    // ---------------------------------------------------------------------
    Block {
        nodes: Vec<NodeId>,
    },
    Echo {
        exprs: Vec<NodeId>,
    },
    Return {
        expr: Option<NodeId>,
    },
    Break {
        level: Option<NodeId>,
    },
    Continue {
        level: Option<NodeId>,
    },
    Goto {
        label: String,
    },
    Throw {
        expr: NodeId,
    },
    /// `body` is attached by the dependency resolver; `None` until then.
    Include {
        expr: NodeId,
        once: bool,
        body: Option<NodeId>,
    },
    Require {
        expr: NodeId,
        once: bool,
        body: Option<NodeId>,
    },
    Eval {
        expr: NodeId,
    },
    Exit {
        expr: Option<NodeId>,
    },
    IsSet {
        exprs: Vec<NodeId>,
    },
    Unset {
        exprs: Vec<NodeId>,
    },
    Empty {
        expr: NodeId,
    },
    InlineHtml {
        text: String,
    },

    // ---------------------------------------------------------------------
    // Control flow
    // ---------------------------------------------------------------------
    If {
        cond: NodeId,
        then: NodeId,
        elseifs: Vec<NodeId>,
        else_: Option<NodeId>,
    },
    ElseIf {
        cond: NodeId,
        body: NodeId,
    },
    Else {
        body: NodeId,
    },
    While {
        cond: NodeId,
        body: NodeId,
    },
    DoWhile {
        body: NodeId,
        cond: NodeId,
    },
    For {
        init: Vec<NodeId>,
        cond: Vec<NodeId>,
        step: Vec<NodeId>,
        body: NodeId,
    },
    Foreach {
        iterable: NodeId,
        key: Option<NodeId>,
        value: NodeId,
        by_ref: bool,
        body: NodeId,
    },
    Switch {
        cond: NodeId,
        cases: Vec<NodeId>,
    },
    Case {
        expr: NodeId,
        nodes: Vec<NodeId>,
    },
    Default {
        nodes: Vec<NodeId>,
    },
    Try {
        nodes: Vec<NodeId>,
        catches: Vec<NodeId>,
        finally: Option<NodeId>,
    },
    /// `class_name` is the caught type as written; multi-catch types are
    /// joined with `|`. `var` keeps its `$` sigil.
    Catch {
        class_name: String,
        var: Option<String>,
        nodes: Vec<NodeId>,
    },
    Finally {
        nodes: Vec<NodeId>,
    },

    // ---------------------------------------------------------------------
    // Declarations
    // ---------------------------------------------------------------------
    Function {
        name: String,
        params: Vec<NodeId>,
        nodes: Vec<NodeId>,
        by_ref: bool,
    },
    FormalParameter {
        name: String,
        type_hint: Option<String>,
        by_ref: bool,
        default: Option<NodeId>,
    },
    Method {
        name: String,
        modifiers: Vec<String>,
        params: Vec<NodeId>,
        nodes: Vec<NodeId>,
        by_ref: bool,
    },
    Class {
        name: String,
        modifier: Option<String>,
        extends: Option<String>,
        implements: Vec<String>,
        nodes: Vec<NodeId>,
    },
    Interface {
        name: String,
        extends: Vec<String>,
        nodes: Vec<NodeId>,
    },
    Trait {
        name: String,
        nodes: Vec<NodeId>,
    },
    Closure {
        params: Vec<NodeId>,
        uses: Vec<NodeId>,
        nodes: Vec<NodeId>,
        by_ref: bool,
        is_static: bool,
    },
    /// A `use (...)` capture of a closure.
    LexicalVariable {
        name: String,
        by_ref: bool,
    },
    GlobalVariables {
        variables: Vec<NodeId>,
    },
    PropertyDeclaration {
        modifiers: Vec<String>,
        properties: Vec<NodeId>,
    },
    PropertyElement {
        name: String,
        default: Option<NodeId>,
    },
    ConstDeclaration {
        elements: Vec<NodeId>,
    },
    ConstElement {
        name: String,
        value: NodeId,
    },
    UseDeclaration {
        kind: UseKind,
        chains: Vec<NodeId>,
    },
    UseClause {
        path: String,
        alias: Option<String>,
    },
    Namespace {
        name: Option<String>,
        nodes: Vec<NodeId>,
    },

    // ---------------------------------------------------------------------
    // Injected by the dependency resolver
    // ---------------------------------------------------------------------
    /// Replaces an include `body` when the target is already on the current
    /// file stack. `looped_tree` is reachable through the accessor but is
    /// not a child slot, which is what terminates traversal of the cycle.
    CircularImport {
        file_name: String,
        looped_tree: NodeId,
    },

    /// Grammar context without a first-class variant. Children stay
    /// traversable; the adapter records a diagnostic when it emits one.
    Unknown {
        kind: String,
        children: Vec<NodeId>,
    },
}

impl NodeKind {
    /// Variant name, used as graph labels and in debug output.
    pub fn kind_name(&self) -> &'static str {
        match self {
            NodeKind::SyntaxTree { .. } => "SyntaxTree",
            NodeKind::IntLit { .. } => "IntLit",
            NodeKind::FloatLit { .. } => "FloatLit",
            NodeKind::BoolLit { .. } => "BoolLit",
            NodeKind::StringLit { .. } => "StringLit",
            NodeKind::NullLit => "NullLit",
            NodeKind::Constant { .. } => "Constant",
            NodeKind::Variable { .. } => "Variable",
            NodeKind::ArrayLit { .. } => "ArrayLit",
            NodeKind::ArrayElement { .. } => "ArrayElement",
            NodeKind::ArrayOffset { .. } => "ArrayOffset",
            NodeKind::StringOffset { .. } => "StringOffset",
            NodeKind::QualifiedName { .. } => "QualifiedName",
            NodeKind::ClassConstant { .. } => "ClassConstant",
            NodeKind::BinaryOp { .. } => "BinaryOp",
            NodeKind::UnaryOp { .. } => "UnaryOp",
            NodeKind::PreIncDec { .. } => "PreIncDec",
            NodeKind::PostIncDec { .. } => "PostIncDec",
            NodeKind::Assignment { .. } => "Assignment",
            NodeKind::AssignOp { .. } => "AssignOp",
            NodeKind::Ternary { .. } => "Ternary",
            NodeKind::Cast { .. } => "Cast",
            NodeKind::Clone { .. } => "Clone",
            NodeKind::New { .. } => "New",
            NodeKind::FunctionCall { .. } => "FunctionCall",
            NodeKind::MethodCall { .. } => "MethodCall",
            NodeKind::StaticCall { .. } => "StaticCall",
            NodeKind::ObjectProperty { .. } => "ObjectProperty",
            NodeKind::ListAssignment { .. } => "ListAssignment",
            NodeKind::Yield { .. } => "Yield",
            NodeKind::YieldFrom { .. } => "YieldFrom",
            NodeKind::Print { .. } => "Print",
            NodeKind::Block { .. } => "Block",
            NodeKind::Echo { .. } => "Echo",
            NodeKind::Return { .. } => "Return",
            NodeKind::Break { .. } => "Break",
            NodeKind::Continue { .. } => "Continue",
            NodeKind::Goto { .. } => "Goto",
            NodeKind::Throw { .. } => "Throw",
            NodeKind::Include { .. } => "Include",
            NodeKind::Require { .. } => "Require",
            NodeKind::Eval { .. } => "Eval",
            NodeKind::Exit { .. } => "Exit",
            NodeKind::IsSet { .. } => "IsSet",
            NodeKind::Unset { .. } => "Unset",
            NodeKind::Empty { .. } => "Empty",
            NodeKind::InlineHtml { .. } => "InlineHtml",
            NodeKind::If { .. } => "If",
            NodeKind::ElseIf { .. } => "ElseIf",
            NodeKind::Else { .. } => "Else",
            NodeKind::While { .. } => "While",
            NodeKind::DoWhile { .. } => "DoWhile",
            NodeKind::For { .. } => "For",
            NodeKind::Foreach { .. } => "Foreach",
            NodeKind::Switch { .. } => "Switch",
            NodeKind::Case { .. } => "Case",
            NodeKind::Default { .. } => "Default",
            NodeKind::Try { .. } => "Try",
            NodeKind::Catch { .. } => "Catch",
            NodeKind::Finally { .. } => "Finally",
            NodeKind::Function { .. } => "Function",
            NodeKind::FormalParameter { .. } => "FormalParameter",
            NodeKind::Method { .. } => "Method",
            NodeKind::Class { .. } => "Class",
            NodeKind::Interface { .. } => "Interface",
            NodeKind::Trait { .. } => "Trait",
            NodeKind::Closure { .. } => "Closure",
            NodeKind::LexicalVariable { .. } => "LexicalVariable",
            NodeKind::GlobalVariables { .. } => "GlobalVariables",
            NodeKind::PropertyDeclaration { .. } => "PropertyDeclaration",
            NodeKind::PropertyElement { .. } => "PropertyElement",
            NodeKind::ConstDeclaration { .. } => "ConstDeclaration",
            NodeKind::ConstElement { .. } => "ConstElement",
            NodeKind::UseDeclaration { .. } => "UseDeclaration",
            NodeKind::UseClause { .. } => "UseClause",
            NodeKind::Namespace { .. } => "Namespace",
            NodeKind::CircularImport { .. } => "CircularImport",
            NodeKind::Unknown { .. } => "Unknown",
        }
    }

    /// Whether this variant bounds the namespace stack.
    pub fn is_scope_defining(&self) -> bool {
        matches!(
            self,
            NodeKind::SyntaxTree { .. }
                | NodeKind::Class { .. }
                | NodeKind::Function { .. }
                | NodeKind::Method { .. }
                | NodeKind::Namespace { .. }
                | NodeKind::Interface { .. }
        )
    }

    /// The declared name of a scope-defining or declaration variant.
    pub fn name(&self) -> Option<&str> {
        match self {
            NodeKind::SyntaxTree { file_name, .. } => Some(file_name),
            NodeKind::Function { name, .. }
            | NodeKind::Method { name, .. }
            | NodeKind::Class { name, .. }
            | NodeKind::Interface { name, .. }
            | NodeKind::Trait { name, .. }
            | NodeKind::Constant { name, .. }
            | NodeKind::Variable { name, .. } => Some(name),
            NodeKind::Namespace { name, .. } => name.as_deref(),
            _ => None,
        }
    }

    /// Ordered child slots. This is the reflective contract the traversers
    /// walk; `Option` slots appear only when present, and scalar payloads
    /// never appear at all.
    pub fn fields(&self) -> Vec<(&'static str, FieldValue<'_>)> {
        use FieldValue::{Node, Seq};

        let mut out: Vec<(&'static str, FieldValue<'_>)> = Vec::new();
        match self {
            NodeKind::SyntaxTree { nodes, .. } => out.push(("nodes", Seq(nodes))),

            NodeKind::IntLit { .. }
            | NodeKind::FloatLit { .. }
            | NodeKind::BoolLit { .. }
            | NodeKind::StringLit { .. }
            | NodeKind::NullLit
            | NodeKind::Constant { .. }
            | NodeKind::Variable { .. }
            | NodeKind::QualifiedName { .. }
            | NodeKind::Goto { .. }
            | NodeKind::InlineHtml { .. }
            | NodeKind::LexicalVariable { .. }
            | NodeKind::UseClause { .. }
            | NodeKind::CircularImport { .. } => {}

            NodeKind::ArrayLit { elements } => out.push(("elements", Seq(elements))),
            NodeKind::ArrayElement { key, value, .. } => {
                if let Some(key) = key {
                    out.push(("key", Node(*key)));
                }
                out.push(("value", Node(*value)));
            }
            NodeKind::ArrayOffset { base, index } => {
                out.push(("base", Node(*base)));
                if let Some(index) = index {
                    out.push(("index", Node(*index)));
                }
            }
            NodeKind::StringOffset { base, index } => {
                out.push(("base", Node(*base)));
                out.push(("index", Node(*index)));
            }
            NodeKind::ClassConstant { class, .. } => {
                if let Some(class) = class.as_node() {
                    out.push(("class", Node(class)));
                }
            }

            NodeKind::BinaryOp { left, right, .. } => {
                out.push(("left", Node(*left)));
                out.push(("right", Node(*right)));
            }
            NodeKind::UnaryOp { expr, .. }
            | NodeKind::Cast { expr, .. }
            | NodeKind::Clone { expr }
            | NodeKind::Throw { expr }
            | NodeKind::Eval { expr }
            | NodeKind::Empty { expr }
            | NodeKind::YieldFrom { expr }
            | NodeKind::Print { expr } => out.push(("expr", Node(*expr))),
            NodeKind::PreIncDec { var, .. } | NodeKind::PostIncDec { var, .. } => {
                out.push(("var", Node(*var)));
            }
            NodeKind::Assignment { target, value, .. }
            | NodeKind::AssignOp { target, value, .. } => {
                out.push(("target", Node(*target)));
                out.push(("value", Node(*value)));
            }
            NodeKind::Ternary { cond, then, else_ } => {
                out.push(("cond", Node(*cond)));
                if let Some(then) = then {
                    out.push(("then", Node(*then)));
                }
                out.push(("else", Node(*else_)));
            }
            NodeKind::New { class, args } => {
                if let Some(class) = class.as_node() {
                    out.push(("class", Node(class)));
                }
                out.push(("args", Seq(args)));
            }
            NodeKind::FunctionCall { name, args } => {
                if let Some(name) = name.as_node() {
                    out.push(("name", Node(name)));
                }
                out.push(("args", Seq(args)));
            }
            NodeKind::MethodCall {
                receiver,
                name,
                args,
            } => {
                out.push(("receiver", Node(*receiver)));
                if let Some(name) = name.as_node() {
                    out.push(("name", Node(name)));
                }
                out.push(("args", Seq(args)));
            }
            NodeKind::StaticCall { class, name, args } => {
                if let Some(class) = class.as_node() {
                    out.push(("class", Node(class)));
                }
                if let Some(name) = name.as_node() {
                    out.push(("name", Node(name)));
                }
                out.push(("args", Seq(args)));
            }
            NodeKind::ObjectProperty { receiver, name } => {
                if let Some(receiver) = receiver {
                    out.push(("receiver", Node(*receiver)));
                }
                if let Some(name) = name.as_node() {
                    out.push(("name", Node(name)));
                }
            }
            NodeKind::ListAssignment { targets, value } => {
                out.push(("targets", Seq(targets)));
                out.push(("value", Node(*value)));
            }
            NodeKind::Yield { expr } | NodeKind::Return { expr } | NodeKind::Exit { expr } => {
                if let Some(expr) = expr {
                    out.push(("expr", Node(*expr)));
                }
            }

            NodeKind::Block { nodes }
            | NodeKind::Default { nodes }
            | NodeKind::Finally { nodes }
            | NodeKind::Catch { nodes, .. }
            | NodeKind::Trait { nodes, .. }
            | NodeKind::Class { nodes, .. }
            | NodeKind::Interface { nodes, .. }
            | NodeKind::Namespace { nodes, .. } => out.push(("nodes", Seq(nodes))),
            NodeKind::Echo { exprs } | NodeKind::IsSet { exprs } | NodeKind::Unset { exprs } => {
                out.push(("exprs", Seq(exprs)));
            }
            NodeKind::Break { level } | NodeKind::Continue { level } => {
                if let Some(level) = level {
                    out.push(("level", Node(*level)));
                }
            }
            NodeKind::Include { expr, body, .. } | NodeKind::Require { expr, body, .. } => {
                out.push(("expr", Node(*expr)));
                if let Some(body) = body {
                    out.push(("body", Node(*body)));
                }
            }

            NodeKind::If {
                cond,
                then,
                elseifs,
                else_,
            } => {
                out.push(("cond", Node(*cond)));
                out.push(("then", Node(*then)));
                out.push(("elseifs", Seq(elseifs)));
                if let Some(else_) = else_ {
                    out.push(("else", Node(*else_)));
                }
            }
            NodeKind::ElseIf { cond, body } | NodeKind::While { cond, body } => {
                out.push(("cond", Node(*cond)));
                out.push(("body", Node(*body)));
            }
            NodeKind::Else { body } => out.push(("body", Node(*body))),
            NodeKind::DoWhile { body, cond } => {
                out.push(("body", Node(*body)));
                out.push(("cond", Node(*cond)));
            }
            NodeKind::For {
                init,
                cond,
                step,
                body,
            } => {
                out.push(("init", Seq(init)));
                out.push(("cond", Seq(cond)));
                out.push(("step", Seq(step)));
                out.push(("body", Node(*body)));
            }
            NodeKind::Foreach {
                iterable,
                key,
                value,
                body,
                ..
            } => {
                out.push(("iterable", Node(*iterable)));
                if let Some(key) = key {
                    out.push(("key", Node(*key)));
                }
                out.push(("value", Node(*value)));
                out.push(("body", Node(*body)));
            }
            NodeKind::Switch { cond, cases } => {
                out.push(("cond", Node(*cond)));
                out.push(("cases", Seq(cases)));
            }
            NodeKind::Case { expr, nodes } => {
                out.push(("expr", Node(*expr)));
                out.push(("nodes", Seq(nodes)));
            }
            NodeKind::Try {
                nodes,
                catches,
                finally,
            } => {
                out.push(("nodes", Seq(nodes)));
                out.push(("catches", Seq(catches)));
                if let Some(finally) = finally {
                    out.push(("finally", Node(*finally)));
                }
            }

            NodeKind::Function { params, nodes, .. } | NodeKind::Method { params, nodes, .. } => {
                out.push(("params", Seq(params)));
                out.push(("nodes", Seq(nodes)));
            }
            NodeKind::FormalParameter { default, .. } => {
                if let Some(default) = default {
                    out.push(("default", Node(*default)));
                }
            }
            NodeKind::Closure {
                params,
                uses,
                nodes,
                ..
            } => {
                out.push(("params", Seq(params)));
                out.push(("uses", Seq(uses)));
                out.push(("nodes", Seq(nodes)));
            }
            NodeKind::GlobalVariables { variables } => out.push(("variables", Seq(variables))),
            NodeKind::PropertyDeclaration { properties, .. } => {
                out.push(("properties", Seq(properties)));
            }
            NodeKind::PropertyElement { default, .. } => {
                if let Some(default) = default {
                    out.push(("default", Node(*default)));
                }
            }
            NodeKind::ConstDeclaration { elements } => out.push(("elements", Seq(elements))),
            NodeKind::ConstElement { value, .. } => out.push(("value", Node(*value))),
            NodeKind::UseDeclaration { chains, .. } => out.push(("chains", Seq(chains))),
            NodeKind::Unknown { children, .. } => out.push(("children", Seq(children))),
        }
        out
    }
}
