//! Tree traversal.
//!
//! Two traversals over the closed node families:
//! - [`Visitor`] borrows the tree; `inspect_*` functions visit children in source order.
//! - [`Rewriter`] owns it; `walk_*` functions rebuild each node after its children, giving the rewriter a chance to
//!   return a replacement.
//!
//! The rewriters the front end itself needs live at the bottom of this module: anonymous-parameter numbering for
//! function literals and name substitution for package instantiation.

use std::collections::BTreeMap;

use crate::ast::*;

// ============================================================================
// Read-only traversal
// ============================================================================

pub trait Visitor<'ast> {
    fn visit_decl(&mut self, decl: &'ast Spanned<Decl>) {
        inspect_decl(self, decl);
    }

    fn visit_stmt(&mut self, stmt: &'ast Spanned<Stmt>) {
        inspect_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &'ast Spanned<Expr>) {
        inspect_expr(self, expr);
    }
}

pub fn inspect_decl<'ast, V: Visitor<'ast> + ?Sized>(v: &mut V, decl: &'ast Spanned<Decl>) {
    match &decl.node {
        Decl::Import(spec) => spec.args.iter().for_each(|a| v.visit_expr(a)),
        Decl::Const(spec) | Decl::Var(spec) => {
            if let Some(ty) = &spec.ty {
                v.visit_expr(ty);
            }
            spec.values.iter().for_each(|e| v.visit_expr(e));
        }
        Decl::Type(spec) => v.visit_expr(&spec.ty),
        Decl::Func(f) => {
            if let Some(recv) = &f.recv {
                v.visit_expr(&recv.ty);
            }
            inspect_func_type(v, &f.ty);
            if let Some(body) = &f.body {
                inspect_block(v, body);
            }
        }
        Decl::Bad => {}
    }
}

pub fn inspect_block<'ast, V: Visitor<'ast> + ?Sized>(v: &mut V, block: &'ast Block) {
    block.stmts.iter().for_each(|s| v.visit_stmt(s));
}

fn inspect_func_type<'ast, V: Visitor<'ast> + ?Sized>(v: &mut V, ty: &'ast FuncType) {
    for field in ty.params.iter().chain(&ty.results) {
        v.visit_expr(&field.ty);
    }
}

fn inspect_opt_stmt<'ast, V: Visitor<'ast> + ?Sized>(v: &mut V, stmt: &'ast Option<Box<Spanned<Stmt>>>) {
    if let Some(s) = stmt {
        v.visit_stmt(s);
    }
}

pub fn inspect_stmt<'ast, V: Visitor<'ast> + ?Sized>(v: &mut V, stmt: &'ast Spanned<Stmt>) {
    match &stmt.node {
        Stmt::Empty | Stmt::Bad | Stmt::Branch { .. } => {}
        Stmt::Labeled { stmt, .. } => v.visit_stmt(stmt),
        Stmt::Block(block) | Stmt::Select { body: block } => inspect_block(v, block),
        Stmt::Expr(e) | Stmt::IncDec { x: e, .. } | Stmt::Call { call: e, .. } => v.visit_expr(e),
        Stmt::Send { chan, value } => {
            v.visit_expr(chan);
            v.visit_expr(value);
        }
        Stmt::Decl(decls) => decls.iter().for_each(|d| v.visit_decl(d)),
        Stmt::Assign { lhs, rhs, .. } => {
            lhs.iter().chain(rhs).for_each(|e| v.visit_expr(e));
        }
        Stmt::Return(results) => results.iter().for_each(|e| v.visit_expr(e)),
        Stmt::If { init, cond, then, els } => {
            inspect_opt_stmt(v, init);
            v.visit_expr(cond);
            inspect_block(v, then);
            inspect_opt_stmt(v, els);
        }
        Stmt::For { init, cond, post, body } => {
            inspect_opt_stmt(v, init);
            if let Some(cond) = cond {
                v.visit_expr(cond);
            }
            inspect_opt_stmt(v, post);
            inspect_block(v, body);
        }
        Stmt::Range { key, value, x, body, .. } => {
            key.iter().chain(value).for_each(|e| v.visit_expr(e));
            v.visit_expr(x);
            inspect_block(v, body);
        }
        Stmt::Switch { init, tag, body } => {
            inspect_opt_stmt(v, init);
            if let Some(tag) = tag {
                v.visit_expr(tag);
            }
            inspect_block(v, body);
        }
        Stmt::TypeSwitch { init, assign, body } => {
            inspect_opt_stmt(v, init);
            v.visit_stmt(assign);
            inspect_block(v, body);
        }
        Stmt::Case { list, body } => {
            list.iter().flatten().for_each(|e| v.visit_expr(e));
            body.iter().for_each(|s| v.visit_stmt(s));
        }
        Stmt::Comm { comm, body } => {
            inspect_opt_stmt(v, comm);
            body.iter().for_each(|s| v.visit_stmt(s));
        }
    }
}

pub fn inspect_expr<'ast, V: Visitor<'ast> + ?Sized>(v: &mut V, expr: &'ast Spanned<Expr>) {
    match &expr.node {
        Expr::Name(_) | Expr::Lit(_) | Expr::Bad | Expr::Ellipsis(None) => {}
        Expr::Composite { ty, elts } => {
            if let Some(ty) = ty {
                v.visit_expr(ty);
            }
            elts.iter().for_each(|e| v.visit_expr(e));
        }
        Expr::KeyValue { key, value } => {
            v.visit_expr(key);
            v.visit_expr(value);
        }
        Expr::FuncLit { ty, body } => {
            inspect_func_type(v, ty);
            inspect_block(v, body);
        }
        Expr::Paren(x)
        | Expr::Selector { x, .. }
        | Expr::Star(x)
        | Expr::Unary { x, .. }
        | Expr::Ellipsis(Some(x))
        | Expr::Chan { value: x, .. } => v.visit_expr(x),
        Expr::Index { x, index } => {
            v.visit_expr(x);
            v.visit_expr(index);
        }
        Expr::Slice { x, low, high, max } => {
            v.visit_expr(x);
            for part in [low, high, max].into_iter().flatten() {
                v.visit_expr(part);
            }
        }
        Expr::TypeAssert { x, ty } => {
            v.visit_expr(x);
            if let Some(ty) = ty {
                v.visit_expr(ty);
            }
        }
        Expr::Binary { x, y, .. } => {
            v.visit_expr(x);
            v.visit_expr(y);
        }
        Expr::Call { fun, args, .. } => {
            v.visit_expr(fun);
            args.iter().for_each(|a| v.visit_expr(a));
        }
        Expr::List(items) => items.iter().for_each(|e| v.visit_expr(e)),
        Expr::Array { len, elem } => {
            if let Some(len) = len {
                v.visit_expr(len);
            }
            v.visit_expr(elem);
        }
        Expr::Struct(fields) | Expr::Interface(fields) => fields.iter().for_each(|f| v.visit_expr(&f.ty)),
        Expr::Func(ty) => inspect_func_type(v, ty),
        Expr::Map { key, value } => {
            v.visit_expr(key);
            v.visit_expr(value);
        }
    }
}

// ============================================================================
// Owned rewrite
// ============================================================================

/// A bottom-up tree rewriter.
///
/// `enter_*` runs before a node's children; returning `false` leaves the subtree untouched (its `rewrite_*` hook
/// still runs). `rewrite_*` runs after the children and returns the replacement.
pub trait Rewriter {
    fn enter_decl(&mut self, _decl: &Spanned<Decl>) -> bool {
        true
    }

    fn enter_stmt(&mut self, _stmt: &Spanned<Stmt>) -> bool {
        true
    }

    fn enter_expr(&mut self, _expr: &Spanned<Expr>) -> bool {
        true
    }

    fn rewrite_decl(&mut self, decl: Spanned<Decl>) -> Spanned<Decl> {
        decl
    }

    fn rewrite_stmt(&mut self, stmt: Spanned<Stmt>) -> Spanned<Stmt> {
        stmt
    }

    fn rewrite_expr(&mut self, expr: Spanned<Expr>) -> Spanned<Expr> {
        expr
    }

    /// Whether assignment targets (and range keys) are rewritten like any other expression.
    fn rewrite_targets(&self) -> bool {
        true
    }
}

pub fn walk_decl<R: Rewriter + ?Sized>(r: &mut R, decl: Spanned<Decl>) -> Spanned<Decl> {
    if !r.enter_decl(&decl) {
        return r.rewrite_decl(decl);
    }
    let decl = decl.map(|node| match node {
        Decl::Import(mut spec) => {
            spec.args = walk_exprs(r, spec.args);
            Decl::Import(spec)
        }
        Decl::Const(spec) => Decl::Const(walk_value_spec(r, spec)),
        Decl::Var(spec) => Decl::Var(walk_value_spec(r, spec)),
        Decl::Type(mut spec) => {
            spec.ty = walk_expr(r, spec.ty);
            Decl::Type(spec)
        }
        Decl::Func(mut f) => {
            f.recv = f.recv.map(|recv| walk_field(r, recv));
            f.ty = walk_func_type(r, f.ty);
            f.body = f.body.map(|body| walk_block(r, body));
            Decl::Func(f)
        }
        Decl::Bad => Decl::Bad,
    });
    r.rewrite_decl(decl)
}

fn walk_value_spec<R: Rewriter + ?Sized>(r: &mut R, mut spec: ValueSpec) -> ValueSpec {
    spec.ty = spec.ty.map(|ty| walk_expr(r, ty));
    spec.values = walk_exprs(r, spec.values);
    spec
}

pub fn walk_block<R: Rewriter + ?Sized>(r: &mut R, block: Block) -> Block {
    Block {
        stmts: walk_stmts(r, block.stmts),
        span: block.span,
    }
}

fn walk_stmts<R: Rewriter + ?Sized>(r: &mut R, stmts: Vec<Spanned<Stmt>>) -> Vec<Spanned<Stmt>> {
    stmts.into_iter().map(|s| walk_stmt(r, s)).collect()
}

fn walk_exprs<R: Rewriter + ?Sized>(r: &mut R, exprs: Vec<Spanned<Expr>>) -> Vec<Spanned<Expr>> {
    exprs.into_iter().map(|e| walk_expr(r, e)).collect()
}

fn walk_targets<R: Rewriter + ?Sized>(r: &mut R, exprs: Vec<Spanned<Expr>>) -> Vec<Spanned<Expr>> {
    if r.rewrite_targets() { walk_exprs(r, exprs) } else { exprs }
}

fn walk_boxed<R: Rewriter + ?Sized>(r: &mut R, expr: Box<Spanned<Expr>>) -> Box<Spanned<Expr>> {
    Box::new(walk_expr(r, *expr))
}

fn walk_opt_stmt<R: Rewriter + ?Sized>(r: &mut R, stmt: Option<Box<Spanned<Stmt>>>) -> Option<Box<Spanned<Stmt>>> {
    stmt.map(|s| Box::new(walk_stmt(r, *s)))
}

fn walk_field<R: Rewriter + ?Sized>(r: &mut R, mut field: Field) -> Field {
    field.ty = walk_expr(r, field.ty);
    field
}

fn walk_func_type<R: Rewriter + ?Sized>(r: &mut R, ty: FuncType) -> FuncType {
    FuncType {
        params: ty.params.into_iter().map(|f| walk_field(r, f)).collect(),
        results: ty.results.into_iter().map(|f| walk_field(r, f)).collect(),
    }
}

pub fn walk_stmt<R: Rewriter + ?Sized>(r: &mut R, stmt: Spanned<Stmt>) -> Spanned<Stmt> {
    if !r.enter_stmt(&stmt) {
        return r.rewrite_stmt(stmt);
    }
    let stmt = stmt.map(|node| match node {
        Stmt::Labeled { label, stmt } => Stmt::Labeled {
            label,
            stmt: Box::new(walk_stmt(r, *stmt)),
        },
        Stmt::Block(block) => Stmt::Block(walk_block(r, block)),
        Stmt::Expr(e) => Stmt::Expr(walk_expr(r, e)),
        Stmt::Send { chan, value } => Stmt::Send {
            chan: walk_expr(r, chan),
            value: walk_expr(r, value),
        },
        Stmt::IncDec { x, op } => Stmt::IncDec { x: walk_expr(r, x), op },
        Stmt::Decl(decls) => Stmt::Decl(decls.into_iter().map(|d| walk_decl(r, d)).collect()),
        Stmt::Assign { lhs, op, rhs } => Stmt::Assign {
            lhs: walk_targets(r, lhs),
            op,
            rhs: walk_exprs(r, rhs),
        },
        Stmt::Call { kind, call } => Stmt::Call {
            kind,
            call: walk_expr(r, call),
        },
        Stmt::Return(results) => Stmt::Return(walk_exprs(r, results)),
        Stmt::If { init, cond, then, els } => Stmt::If {
            init: walk_opt_stmt(r, init),
            cond: walk_expr(r, cond),
            then: walk_block(r, then),
            els: walk_opt_stmt(r, els),
        },
        Stmt::For { init, cond, post, body } => Stmt::For {
            init: walk_opt_stmt(r, init),
            cond: cond.map(|c| walk_expr(r, c)),
            post: walk_opt_stmt(r, post),
            body: walk_block(r, body),
        },
        Stmt::Range {
            key,
            value,
            define,
            x,
            body,
        } => {
            let (key, value) = if r.rewrite_targets() {
                (key.map(|e| walk_expr(r, e)), value.map(|e| walk_expr(r, e)))
            } else {
                (key, value)
            };
            Stmt::Range {
                key,
                value,
                define,
                x: walk_expr(r, x),
                body: walk_block(r, body),
            }
        }
        Stmt::Switch { init, tag, body } => Stmt::Switch {
            init: walk_opt_stmt(r, init),
            tag: tag.map(|t| walk_expr(r, t)),
            body: walk_block(r, body),
        },
        Stmt::TypeSwitch { init, assign, body } => Stmt::TypeSwitch {
            init: walk_opt_stmt(r, init),
            assign: Box::new(walk_stmt(r, *assign)),
            body: walk_block(r, body),
        },
        Stmt::Case { list, body } => Stmt::Case {
            list: list.map(|l| walk_exprs(r, l)),
            body: walk_stmts(r, body),
        },
        Stmt::Select { body } => Stmt::Select {
            body: walk_block(r, body),
        },
        Stmt::Comm { comm, body } => Stmt::Comm {
            comm: walk_opt_stmt(r, comm),
            body: walk_stmts(r, body),
        },
        other @ (Stmt::Empty | Stmt::Branch { .. } | Stmt::Bad) => other,
    });
    r.rewrite_stmt(stmt)
}

pub fn walk_expr<R: Rewriter + ?Sized>(r: &mut R, expr: Spanned<Expr>) -> Spanned<Expr> {
    if !r.enter_expr(&expr) {
        return r.rewrite_expr(expr);
    }
    let expr = expr.map(|node| match node {
        Expr::Composite { ty, elts } => Expr::Composite {
            ty: ty.map(|t| walk_boxed(r, t)),
            elts: walk_exprs(r, elts),
        },
        Expr::KeyValue { key, value } => Expr::KeyValue {
            key: walk_boxed(r, key),
            value: walk_boxed(r, value),
        },
        Expr::FuncLit { ty, body } => Expr::FuncLit {
            ty: walk_func_type(r, ty),
            body: walk_block(r, body),
        },
        Expr::Paren(x) => Expr::Paren(walk_boxed(r, x)),
        Expr::Selector { x, sel } => Expr::Selector {
            x: walk_boxed(r, x),
            sel,
        },
        Expr::Index { x, index } => Expr::Index {
            x: walk_boxed(r, x),
            index: walk_boxed(r, index),
        },
        Expr::Slice { x, low, high, max } => Expr::Slice {
            x: walk_boxed(r, x),
            low: low.map(|e| walk_boxed(r, e)),
            high: high.map(|e| walk_boxed(r, e)),
            max: max.map(|e| walk_boxed(r, e)),
        },
        Expr::TypeAssert { x, ty } => Expr::TypeAssert {
            x: walk_boxed(r, x),
            ty: ty.map(|t| walk_boxed(r, t)),
        },
        Expr::Star(x) => Expr::Star(walk_boxed(r, x)),
        Expr::Unary { op, x } => Expr::Unary {
            op,
            x: walk_boxed(r, x),
        },
        Expr::Binary { op, x, y } => Expr::Binary {
            op,
            x: walk_boxed(r, x),
            y: walk_boxed(r, y),
        },
        Expr::Call { fun, args, spread } => Expr::Call {
            fun: walk_boxed(r, fun),
            args: walk_exprs(r, args),
            spread,
        },
        Expr::List(items) => Expr::List(walk_exprs(r, items)),
        Expr::Array { len, elem } => Expr::Array {
            len: len.map(|l| walk_boxed(r, l)),
            elem: walk_boxed(r, elem),
        },
        Expr::Ellipsis(elem) => Expr::Ellipsis(elem.map(|e| walk_boxed(r, e))),
        Expr::Struct(fields) => Expr::Struct(fields.into_iter().map(|f| walk_field(r, f)).collect()),
        Expr::Func(ty) => Expr::Func(walk_func_type(r, ty)),
        Expr::Interface(fields) => Expr::Interface(fields.into_iter().map(|f| walk_field(r, f)).collect()),
        Expr::Map { key, value } => Expr::Map {
            key: walk_boxed(r, key),
            value: walk_boxed(r, value),
        },
        Expr::Chan { dir, value } => Expr::Chan {
            dir,
            value: walk_boxed(r, value),
        },
        other @ (Expr::Name(_) | Expr::Lit(_) | Expr::Bad) => other,
    });
    r.rewrite_expr(expr)
}

// ============================================================================
// Built-in rewriters
// ============================================================================

/// Numbers `_` placeholders read inside one function literal body: `_1`, `_2`, ... in use order.
///
/// Nested literals are skipped; each was numbered when it was parsed.
#[derive(Debug, Default)]
struct AnonymousParams {
    count: usize,
}

impl Rewriter for AnonymousParams {
    fn enter_expr(&mut self, expr: &Spanned<Expr>) -> bool {
        !matches!(expr.node, Expr::FuncLit { .. })
    }

    fn rewrite_expr(&mut self, expr: Spanned<Expr>) -> Spanned<Expr> {
        if expr.node.as_name() != Some("_") {
            return expr;
        }
        self.count += 1;
        let numbered = format!("_{}", self.count);
        expr.map(|_| Expr::Name(numbered))
    }

    fn rewrite_targets(&self) -> bool {
        false
    }
}

/// Rewrite `_` placeholders in a function literal body and rename its blank parameters to match.
///
/// Returns the number of placeholders rewritten. A body without placeholders is returned unchanged.
pub fn number_anonymous_params(ty: &mut FuncType, body: Block) -> (Block, usize) {
    let mut numbering = AnonymousParams::default();
    let body = walk_block(&mut numbering, body);
    if numbering.count == 0 {
        return (body, 0);
    }
    let mut next = 0;
    for name in ty.params.iter_mut().flat_map(|f| f.names.iter_mut()) {
        if name.node == "_" {
            next += 1;
            name.node = format!("_{next}");
        }
    }
    (body, numbering.count)
}

/// Replaces names bound in a substitution table, e.g. type parameters with type arguments.
#[derive(Debug)]
pub struct Substitute<'m> {
    table: &'m BTreeMap<Ident, Expr>,
}

impl<'m> Substitute<'m> {
    pub fn new(table: &'m BTreeMap<Ident, Expr>) -> Self {
        Self { table }
    }
}

impl Rewriter for Substitute<'_> {
    fn rewrite_expr(&mut self, expr: Spanned<Expr>) -> Spanned<Expr> {
        match expr.node.as_name().and_then(|n| self.table.get(n)) {
            Some(replacement) => {
                let replacement = replacement.clone();
                expr.map(|_| replacement)
            }
            None => expr,
        }
    }
}

/// Apply a substitution table to one expression.
pub fn substitute(expr: Spanned<Expr>, table: &BTreeMap<Ident, Expr>) -> Spanned<Expr> {
    walk_expr(&mut Substitute::new(table), expr)
}
