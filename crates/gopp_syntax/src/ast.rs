//! Abstract Syntax Tree definitions for gopp.
//!
//! The tree has two layers:
//! - **Containers**: [`Project`] → [`Package`] → [`File`]. A File is one logical output unit.
//! - **Nodes**: closed families [`Decl`], [`Stmt`] and [`Expr`], each wrapped in [`Spanned`] so every node carries
//!   its byte span, an optional remapped position and optional attached comments.
//!
//! Type syntax is part of [`Expr`], as in the base language: `[]int`, `map[K]V` and `chan T` are expressions.

use std::collections::{BTreeMap, BTreeSet};

use gopp_core::lang::operators::OperatorId;

use crate::source::Position;

/// Source location span (byte offsets)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, PartialOrd, Ord, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn contains(self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// A node with source location, optional remapped position and optional comments.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
    /// Position after `//line` remapping, when a directive applies.
    pub remap: Option<Position>,
    pub comments: Option<Box<CommentGroup>>,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self {
            node,
            span,
            remap: None,
            comments: None,
        }
    }

    /// Replace the node, keeping location and comments.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Spanned<U> {
        Spanned {
            node: f(self.node),
            span: self.span,
            remap: self.remap,
            comments: self.comments,
        }
    }
}

/// Identifier
pub type Ident = String;

// ============================================================================
// Comments
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Full comment text including the `//` or `/* */` markers.
    pub text: String,
    pub span: Span,
}

/// A run of adjacent comments.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommentGroup {
    pub comments: Vec<Comment>,
}

impl CommentGroup {
    pub fn span(&self) -> Span {
        match (self.comments.first(), self.comments.last()) {
            (Some(first), Some(last)) => first.span.merge(last.span),
            _ => Span::default(),
        }
    }

    /// Comment text with markers stripped, one line per comment line.
    pub fn text(&self) -> String {
        let mut lines = Vec::new();
        for c in &self.comments {
            if let Some(rest) = c.text.strip_prefix("//") {
                lines.push(rest.strip_prefix(' ').unwrap_or(rest).to_string());
            } else if let Some(body) = c.text.strip_prefix("/*").and_then(|t| t.strip_suffix("*/")) {
                lines.extend(body.lines().map(|l| l.trim().to_string()));
            }
        }
        lines.join("\n")
    }
}

// ============================================================================
// Containers
// ============================================================================

/// Root of one parse.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Project {
    /// Name from the `project` header, if any.
    pub name: Option<Ident>,
    /// Output root: the project name, or the caller-supplied root.
    pub root: String,
    pub packages: Vec<Package>,
    /// Argument imports waiting for instantiation.
    pub pending: Vec<ArgImport>,
    pub doc: Vec<CommentGroup>,
}

impl Project {
    pub fn package(&self, name: &str) -> Option<&Package> {
        self.packages.iter().find(|p| p.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Package {
    pub name: Ident,
    /// Type parameters; non-empty makes this a template that is only emitted through instantiations.
    pub type_params: Vec<Ident>,
    /// Directory relative to the project root.
    pub dir: String,
    pub files: Vec<File>,
    /// Identifiers declared at package scope.
    pub bound: BTreeSet<Ident>,
    /// The package had no `package` header.
    pub headerless: bool,
    /// Kept out of normal build selection.
    pub excluded: bool,
}

impl Package {
    pub fn is_template(&self) -> bool {
        !self.type_params.is_empty()
    }
}

/// How a section was introduced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionKind {
    /// `section name`
    Named(Ident),
    /// `main`
    Main,
    /// `testcode`
    TestCode,
}

/// One logical output unit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct File {
    pub package: Ident,
    pub section: Option<SectionKind>,
    /// Output file name without directory or `.go` suffix.
    pub name: String,
    /// Name of the input this file came from.
    pub source: String,
    pub decls: Vec<Spanned<Decl>>,
    /// Inferred imports in encounter order.
    pub inferred: Vec<InferredImport>,
    /// Alias → path for every inferred import.
    pub aliases: BTreeMap<Ident, String>,
    pub has_entry: bool,
    pub has_bare_stmts: bool,
    pub excluded: bool,
    /// Comment groups not attached to any node.
    pub comments: Vec<CommentGroup>,
    /// At least one diagnostic was reported while building this file.
    pub had_errors: bool,
}

impl File {
    pub fn imports(&self) -> impl Iterator<Item = &ImportSpec> {
        self.decls.iter().filter_map(|d| match &d.node {
            Decl::Import(spec) => Some(spec),
            _ => None,
        })
    }

    pub fn funcs(&self) -> impl Iterator<Item = &FuncDecl> {
        self.decls.iter().filter_map(|d| match &d.node {
            Decl::Func(f) => Some(f),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferredImport {
    pub alias: Ident,
    pub path: String,
}

/// An import that supplies type arguments to a parameterized package.
#[derive(Debug, Clone, PartialEq)]
pub struct ArgImport {
    /// Index of the importing package in [`Project::packages`].
    pub package: usize,
    /// Index of the importing file in [`Package::files`].
    pub file: usize,
    /// Index of the import in [`File::decls`].
    pub decl: usize,
    pub span: Span,
    pub position: Position,
}

/// Identity shared by the specs of one parenthesized declaration group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclGroup(pub u32);

// ============================================================================
// Declarations
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    Import(ImportSpec),
    Const(ValueSpec),
    Var(ValueSpec),
    Type(TypeSpec),
    Func(FuncDecl),
    /// Placeholder left behind by error recovery.
    Bad,
}

impl Decl {
    pub fn group(&self) -> Option<DeclGroup> {
        match self {
            Decl::Import(s) => s.group,
            Decl::Const(s) | Decl::Var(s) => s.group,
            Decl::Type(s) => s.group,
            Decl::Func(_) | Decl::Bad => None,
        }
    }
}

/// `import [alias] "path" [(TypeArgs)]`
#[derive(Debug, Clone, PartialEq)]
pub struct ImportSpec {
    /// `None`, a name, `_` or `.`.
    pub alias: Option<Ident>,
    /// Unquoted import path.
    pub path: String,
    /// Type arguments of an argument import.
    pub args: Vec<Spanned<Expr>>,
    pub group: Option<DeclGroup>,
}

impl ImportSpec {
    /// Name this import binds in the importing file.
    pub fn local_name(&self) -> &str {
        match &self.alias {
            Some(alias) => alias,
            None => last_segment(&self.path),
        }
    }
}

/// Last `/`-separated segment of an import path.
pub fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// `const`/`var` spec: `a, b T = x, y`.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueSpec {
    pub names: Vec<Spanned<Ident>>,
    pub ty: Option<Spanned<Expr>>,
    pub values: Vec<Spanned<Expr>>,
    pub group: Option<DeclGroup>,
}

/// `type Name T` or `type Name = T`.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSpec {
    pub name: Spanned<Ident>,
    pub alias: bool,
    pub ty: Spanned<Expr>,
    pub group: Option<DeclGroup>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncDecl {
    pub recv: Option<Field>,
    pub name: Spanned<Ident>,
    pub ty: FuncType,
    pub body: Option<Block>,
}

impl FuncDecl {
    /// `func main()` with no receiver, parameters or results.
    pub fn is_entry(&self) -> bool {
        self.recv.is_none() && self.name.node == "main" && self.ty.params.is_empty() && self.ty.results.is_empty()
    }
}

/// A parameter, result, receiver, struct field or interface method.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Empty for anonymous parameters and embedded fields.
    pub names: Vec<Spanned<Ident>>,
    pub ty: Spanned<Expr>,
    /// Struct tag, raw literal text.
    pub tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FuncType {
    pub params: Vec<Field>,
    pub results: Vec<Field>,
}

// ============================================================================
// Statements
// ============================================================================

/// `{ ... }`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub stmts: Vec<Spanned<Stmt>>,
    pub span: Span,
}

impl Block {
    pub fn new(stmts: Vec<Spanned<Stmt>>, span: Span) -> Self {
        Self { stmts, span }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchKind {
    Break,
    Continue,
    Goto,
    Fallthrough,
}

impl BranchKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BranchKind::Break => "break",
            BranchKind::Continue => "continue",
            BranchKind::Goto => "goto",
            BranchKind::Fallthrough => "fallthrough",
        }
    }
}

/// `go f()` or `defer f()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Go,
    Defer,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Empty,
    Labeled {
        label: Spanned<Ident>,
        stmt: Box<Spanned<Stmt>>,
    },
    Block(Block),
    Expr(Spanned<Expr>),
    Send {
        chan: Spanned<Expr>,
        value: Spanned<Expr>,
    },
    IncDec {
        x: Spanned<Expr>,
        op: OperatorId,
    },
    /// Local `const`, `var` or `type`; a parenthesized group yields one entry per spec.
    Decl(Vec<Spanned<Decl>>),
    /// `=`, `:=` or `op=`.
    Assign {
        lhs: Vec<Spanned<Expr>>,
        op: OperatorId,
        rhs: Vec<Spanned<Expr>>,
    },
    Branch {
        kind: BranchKind,
        label: Option<Spanned<Ident>>,
    },
    Call {
        kind: CallKind,
        call: Spanned<Expr>,
    },
    Return(Vec<Spanned<Expr>>),
    If {
        init: Option<Box<Spanned<Stmt>>>,
        cond: Spanned<Expr>,
        then: Block,
        els: Option<Box<Spanned<Stmt>>>,
    },
    For {
        init: Option<Box<Spanned<Stmt>>>,
        cond: Option<Spanned<Expr>>,
        post: Option<Box<Spanned<Stmt>>>,
        body: Block,
    },
    /// `for k, v := range x { ... }`
    Range {
        key: Option<Spanned<Expr>>,
        value: Option<Spanned<Expr>>,
        define: bool,
        x: Spanned<Expr>,
        body: Block,
    },
    /// Expression switch; `body` holds [`Stmt::Case`] clauses.
    Switch {
        init: Option<Box<Spanned<Stmt>>>,
        tag: Option<Spanned<Expr>>,
        body: Block,
    },
    /// Type switch; `assign` is `x := y.(type)` or `y.(type)`.
    TypeSwitch {
        init: Option<Box<Spanned<Stmt>>>,
        assign: Box<Spanned<Stmt>>,
        body: Block,
    },
    /// `case a, b:` or `default:` (`list == None`).
    Case {
        list: Option<Vec<Spanned<Expr>>>,
        body: Vec<Spanned<Stmt>>,
    },
    /// `body` holds [`Stmt::Comm`] clauses.
    Select {
        body: Block,
    },
    /// `case <send-or-recv>:` or `default:` (`comm == None`).
    Comm {
        comm: Option<Box<Spanned<Stmt>>>,
        body: Vec<Spanned<Stmt>>,
    },
    /// Placeholder left behind by error recovery.
    Bad,
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LitKind {
    Int,
    Float,
    Imag,
    Rune,
    String,
    /// `2024.01.15`
    Date,
}

/// A literal as written. `raw` keeps quotes and escapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicLit {
    pub kind: LitKind,
    pub raw: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Name(Ident),
    Lit(BasicLit),
    /// `T{elts}`; `ty` is absent for elided inner literals.
    Composite {
        ty: Option<Box<Spanned<Expr>>>,
        elts: Vec<Spanned<Expr>>,
    },
    KeyValue {
        key: Box<Spanned<Expr>>,
        value: Box<Spanned<Expr>>,
    },
    FuncLit {
        ty: FuncType,
        body: Block,
    },
    Paren(Box<Spanned<Expr>>),
    Selector {
        x: Box<Spanned<Expr>>,
        sel: Spanned<Ident>,
    },
    Index {
        x: Box<Spanned<Expr>>,
        index: Box<Spanned<Expr>>,
    },
    Slice {
        x: Box<Spanned<Expr>>,
        low: Option<Box<Spanned<Expr>>>,
        high: Option<Box<Spanned<Expr>>>,
        max: Option<Box<Spanned<Expr>>>,
    },
    /// `x.(T)`; `ty == None` is `x.(type)`.
    TypeAssert {
        x: Box<Spanned<Expr>>,
        ty: Option<Box<Spanned<Expr>>>,
    },
    /// `*x`: pointer type or dereference.
    Star(Box<Spanned<Expr>>),
    Unary {
        op: OperatorId,
        x: Box<Spanned<Expr>>,
    },
    Binary {
        op: OperatorId,
        x: Box<Spanned<Expr>>,
        y: Box<Spanned<Expr>>,
    },
    Call {
        fun: Box<Spanned<Expr>>,
        args: Vec<Spanned<Expr>>,
        /// Trailing `...` on the last argument.
        spread: bool,
    },
    /// Comma-separated expressions in a single-expression slot.
    List(Vec<Spanned<Expr>>),

    // Type forms
    /// `[N]T`, `[...]T` (`len` is [`Expr::Ellipsis`]) or `[]T` (`len == None`).
    Array {
        len: Option<Box<Spanned<Expr>>>,
        elem: Box<Spanned<Expr>>,
    },
    /// `...T` in a parameter list, or bare `...` as an array length.
    Ellipsis(Option<Box<Spanned<Expr>>>),
    Struct(Vec<Field>),
    Func(FuncType),
    Interface(Vec<Field>),
    Map {
        key: Box<Spanned<Expr>>,
        value: Box<Spanned<Expr>>,
    },
    Chan {
        dir: ChanDir,
        value: Box<Spanned<Expr>>,
    },
    /// Placeholder left behind by error recovery.
    Bad,
}

impl Expr {
    pub fn name(name: impl Into<Ident>) -> Expr {
        Expr::Name(name.into())
    }

    /// Interpreted string literal holding `text` verbatim.
    pub fn string(text: &str) -> Expr {
        Expr::Lit(BasicLit {
            kind: LitKind::String,
            raw: format!("{text:?}"),
        })
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            Expr::Name(n) => Some(n),
            _ => None,
        }
    }

    /// Unquoted value of a string literal.
    pub fn string_value(&self) -> Option<String> {
        match self {
            Expr::Lit(BasicLit {
                kind: LitKind::String,
                raw,
            }) => Some(unquote(raw)),
            _ => None,
        }
    }

    /// `true` for syntax that can only denote a type.
    pub fn is_type_form(&self) -> bool {
        matches!(
            self,
            Expr::Array { .. }
                | Expr::Struct(_)
                | Expr::Func(_)
                | Expr::Interface(_)
                | Expr::Map { .. }
                | Expr::Chan { .. }
        )
    }
}

/// Strip quotes from a string literal and decode the simple escapes.
///
/// Numeric escapes are kept as written: import paths and directive arguments never need them.
pub fn unquote(raw: &str) -> String {
    if let Some(inner) = raw.strip_prefix('`').and_then(|r| r.strip_suffix('`')) {
        return inner.to_string();
    }
    let inner = raw
        .strip_prefix('"')
        .and_then(|r| r.strip_suffix('"'))
        .unwrap_or(raw);
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
