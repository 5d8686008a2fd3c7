//! Built-in macro expansions.
//!
//! Every expansion is written against [`MacroContext`] only, the same surface a registered closure gets.

use gopp_core::lang::libraries::{self, LibraryId};
use gopp_core::lang::operators::OperatorId;
use gopp_core::lang::permits::{self, PermitId};
use gopp_core::lang::punctuation::PunctuationId;

use super::{BuiltinMacro, BuiltinUse, MacroContext, PResult, UseDirective};
use crate::ast::{Block, Expr, Span, Spanned, Stmt};
use crate::diagnostics::Diagnostic;

// ============================================================================
// Statement / expression macros
// ============================================================================

pub(crate) fn expand_stmt(builtin: BuiltinMacro, ctx: &mut MacroContext<'_, '_>) -> PResult<Spanned<Stmt>> {
    match builtin {
        BuiltinMacro::Command(method) => {
            let call = command(ctx, method)?;
            let span = call.span;
            Ok(Spanned::new(Stmt::Expr(call), span))
        }
        BuiltinMacro::Assert => assert(ctx),
        BuiltinMacro::Let => let_block(ctx),
    }
}

pub(crate) fn expand_expr(builtin: BuiltinMacro, ctx: &mut MacroContext<'_, '_>) -> PResult<Spanned<Expr>> {
    match builtin {
        BuiltinMacro::Command(method) => command(ctx, method),
        BuiltinMacro::Assert | BuiltinMacro::Let => {
            let trigger = ctx.trigger();
            Err(Diagnostic::syntax(
                format!("{} cannot be used as an expression", trigger.node),
                trigger.span,
            ))
        }
    }
}

/// `prepare "a", b` or `prepare("a", b)` → `system.Prepare("a", b)`.
fn command(ctx: &mut MacroContext<'_, '_>, method: &str) -> PResult<Spanned<Expr>> {
    let trigger = ctx.trigger().clone();
    let args = if ctx.eat_punct(PunctuationId::LParen) {
        let args = if ctx.check_punct(PunctuationId::RParen) {
            Vec::new()
        } else {
            ctx.parse_expr_list()?
        };
        ctx.expect_punct(PunctuationId::RParen)?;
        args
    } else if ctx.at_stmt_end() {
        Vec::new()
    } else {
        ctx.parse_expr_list()?
    };
    let system = ctx.library(LibraryId::System, trigger.span);
    let span = ctx.span_from(trigger.span.start);
    Ok(method_call(system, method, args, span))
}

/// `assert cond` → `assert.True(cond, "file:line:col")`; `assert (a, b)` → one call per element.
fn assert(ctx: &mut MacroContext<'_, '_>) -> PResult<Spanned<Stmt>> {
    let trigger = ctx.trigger().clone();
    let conds = if ctx.eat_punct(PunctuationId::LParen) {
        let conds = ctx.parse_expr_list()?;
        ctx.expect_punct(PunctuationId::RParen)?;
        conds
    } else {
        vec![ctx.parse_expr()?]
    };

    let library = ctx.library(LibraryId::Assert, trigger.span);
    let mut calls: Vec<Spanned<Stmt>> = conds
        .into_iter()
        .map(|cond| {
            let at = ctx.position(cond.span).to_string();
            let span = cond.span;
            let location = Spanned::new(Expr::string(&at), span);
            let call = method_call(library.clone(), libraries::ASSERT_METHOD, vec![cond, location], span);
            Spanned::new(Stmt::Expr(call), span)
        })
        .collect();

    let span = ctx.span_from(trigger.span.start);
    if calls.len() == 1 {
        if let Some(mut only) = calls.pop() {
            only.span = span;
            return Ok(only);
        }
    }
    Ok(Spanned::new(Stmt::Block(Block::new(calls, span)), span))
}

/// `let a, b = x, y; rest...` → `{ a, b := x, y; rest... }`.
fn let_block(ctx: &mut MacroContext<'_, '_>) -> PResult<Spanned<Stmt>> {
    let trigger = ctx.trigger().clone();
    let lhs = ctx.parse_expr_list()?;
    if !ctx.peek().kind.is_operator(OperatorId::Assign) {
        return Err(Diagnostic::syntax(
            format!("unexpected {}, expected = in let", ctx.peek().kind),
            ctx.peek().span,
        ));
    }
    ctx.advance();
    let rhs = ctx.parse_expr_list()?;
    let define = Spanned::new(
        Stmt::Assign {
            lhs,
            op: OperatorId::Define,
            rhs,
        },
        ctx.span_from(trigger.span.start),
    );

    let mut stmts = vec![define];
    if ctx.eat_semi() {
        stmts.extend(ctx.parse_rest());
    }
    let span = ctx.span_from(trigger.span.start);
    Ok(Spanned::new(Stmt::Block(Block::new(stmts, span)), span))
}

fn method_call(receiver: Spanned<Expr>, method: &str, args: Vec<Spanned<Expr>>, span: Span) -> Spanned<Expr> {
    let sel_span = receiver.span;
    let fun = Spanned::new(
        Expr::Selector {
            x: Box::new(receiver),
            sel: Spanned::new(method.to_string(), sel_span),
        },
        sel_span,
    );
    Spanned::new(
        Expr::Call {
            fun: Box::new(fun),
            args,
            spread: false,
        },
        span,
    )
}

// ============================================================================
// `use` directives
// ============================================================================

pub(crate) fn apply_use(
    builtin: BuiltinUse,
    ctx: &mut MacroContext<'_, '_>,
    directive: &UseDirective,
) -> PResult<()> {
    match builtin {
        BuiltinUse::Blacklist | BuiltinUse::Whitelist => {
            for (index, arg) in directive.args.iter().enumerate() {
                let Some(name) = directive.arg_text(index) else {
                    ctx.report(Diagnostic::syntax(
                        format!("use \"{}\" expects permit names", directive.name),
                        arg.span,
                    ));
                    continue;
                };
                match permits::from_str(&name) {
                    Some(id) if builtin == BuiltinUse::Blacklist => ctx.unset_permit(id),
                    Some(id) => ctx.set_permit(id),
                    None => ctx.report(Diagnostic::semantic(format!("unknown permit \"{name}\""), arg.span)),
                }
            }
            Ok(())
        }
        BuiltinUse::Dynamic => {
            ctx.require(PermitId::Dynamic, directive.span)?;
            let name = directive
                .rets
                .first()
                .map(|r| r.node.clone())
                .unwrap_or_else(|| libraries::alias(LibraryId::Dynamic).to_string());
            let path = directive
                .arg_text(0)
                .unwrap_or_else(|| libraries::path(LibraryId::Dynamic).to_string());
            ctx.set_dynamic(name, path);
            Ok(())
        }
        BuiltinUse::Generics => {
            ctx.set_permit(PermitId::Generics);
            Ok(())
        }
        BuiltinUse::LineDirectives => {
            ctx.set_permit(PermitId::LineDirectives);
            Ok(())
        }
    }
}
