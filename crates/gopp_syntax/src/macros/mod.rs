//! Macro registry.
//!
//! Three name-keyed tables: statement macros, expression macros and `use`-directive macros. Each entry is either a
//! built-in (an enum variant expanded by [`builtins`]) or a registered closure. Handlers of both kinds receive a
//! [`MacroContext`], the capability-scoped parser handle, and consume the tokens after the trigger themselves.
//!
//! ## Examples
//! ```rust
//! use gopp_syntax::ast::{Expr, Spanned, Stmt};
//! use gopp_syntax::macros::MacroRegistry;
//!
//! let mut macros = MacroRegistry::default();
//! macros.register_stmt("todo", |ctx| {
//!     let span = ctx.trigger().span;
//!     Ok(Spanned::new(Stmt::Expr(Spanned::new(Expr::name("panic"), span)), span))
//! });
//! assert!(macros.is_stmt_macro("todo"));
//! assert!(macros.is_stmt_macro("assert"));
//! ```

pub(crate) mod builtins;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use gopp_core::lang::libraries;

use crate::ast::{Expr, Ident, Span, Spanned, Stmt};

pub use crate::parser::{MacroContext, PResult};

/// Handler for a statement macro.
pub type StmtMacroFn = Arc<dyn Fn(&mut MacroContext<'_, '_>) -> PResult<Spanned<Stmt>> + Send + Sync>;

/// Handler for an expression macro.
pub type ExprMacroFn = Arc<dyn Fn(&mut MacroContext<'_, '_>) -> PResult<Spanned<Expr>> + Send + Sync>;

/// Handler for a `use "name"` directive.
pub type UseMacroFn = Arc<dyn Fn(&mut MacroContext<'_, '_>, &UseDirective) -> PResult<()> + Send + Sync>;

/// Statement/expression macros shipped with the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinMacro {
    /// `prepare`, `exec`, `cd`: a call to the given `system` method.
    Command(&'static str),
    /// `assert cond` or `assert (a, b, ...)`.
    Assert,
    /// `let a = b; <rest>`.
    Let,
}

/// `use` directives shipped with the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinUse {
    Blacklist,
    Whitelist,
    Dynamic,
    Generics,
    LineDirectives,
}

#[derive(Clone)]
pub enum StmtMacro {
    Builtin(BuiltinMacro),
    Custom(StmtMacroFn),
}

#[derive(Clone)]
pub enum ExprMacro {
    Builtin(BuiltinMacro),
    Custom(ExprMacroFn),
}

#[derive(Clone)]
pub enum UseMacro {
    Builtin(BuiltinUse),
    Custom(UseMacroFn),
}

/// A parsed `use "name" (args) -> rets` directive.
#[derive(Debug, Clone, PartialEq)]
pub struct UseDirective {
    pub name: String,
    pub args: Vec<Spanned<Expr>>,
    pub rets: Vec<Spanned<Ident>>,
    pub span: Span,
}

impl UseDirective {
    /// The argument at `index` as text: a string literal's value or a bare name.
    pub fn arg_text(&self, index: usize) -> Option<String> {
        let arg = self.args.get(index)?;
        arg.node
            .string_value()
            .or_else(|| arg.node.as_name().map(str::to_string))
    }
}

/// Name-to-handler tables consulted by the parser.
///
/// Cloning is cheap: handlers are reference counted, so one registry can be shared by parallel parses.
#[derive(Clone)]
pub struct MacroRegistry {
    stmt: BTreeMap<String, StmtMacro>,
    expr: BTreeMap<String, ExprMacro>,
    uses: BTreeMap<String, UseMacro>,
}

impl MacroRegistry {
    /// A registry with no macros at all.
    pub fn empty() -> Self {
        Self {
            stmt: BTreeMap::new(),
            expr: BTreeMap::new(),
            uses: BTreeMap::new(),
        }
    }

    /// A registry with the built-in macros and `use` directives.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        for (name, method) in libraries::COMMAND_MACROS {
            let builtin = BuiltinMacro::Command(method);
            registry.stmt.insert(name.to_string(), StmtMacro::Builtin(builtin));
            registry.expr.insert(name.to_string(), ExprMacro::Builtin(builtin));
        }
        registry
            .stmt
            .insert("assert".to_string(), StmtMacro::Builtin(BuiltinMacro::Assert));
        registry.stmt.insert("let".to_string(), StmtMacro::Builtin(BuiltinMacro::Let));
        for (name, builtin) in [
            ("blacklist", BuiltinUse::Blacklist),
            ("whitelist", BuiltinUse::Whitelist),
            ("dynamic", BuiltinUse::Dynamic),
            ("generics", BuiltinUse::Generics),
            ("linedirectives", BuiltinUse::LineDirectives),
        ] {
            registry.uses.insert(name.to_string(), UseMacro::Builtin(builtin));
        }
        registry
    }

    /// Register (or replace) a statement macro.
    pub fn register_stmt<F>(&mut self, name: impl Into<String>, handler: F)
    where
        F: Fn(&mut MacroContext<'_, '_>) -> PResult<Spanned<Stmt>> + Send + Sync + 'static,
    {
        self.stmt.insert(name.into(), StmtMacro::Custom(Arc::new(handler)));
    }

    /// Register (or replace) an expression macro.
    pub fn register_expr<F>(&mut self, name: impl Into<String>, handler: F)
    where
        F: Fn(&mut MacroContext<'_, '_>) -> PResult<Spanned<Expr>> + Send + Sync + 'static,
    {
        self.expr.insert(name.into(), ExprMacro::Custom(Arc::new(handler)));
    }

    /// Register (or replace) a `use` directive.
    pub fn register_use<F>(&mut self, name: impl Into<String>, handler: F)
    where
        F: Fn(&mut MacroContext<'_, '_>, &UseDirective) -> PResult<()> + Send + Sync + 'static,
    {
        self.uses.insert(name.into(), UseMacro::Custom(Arc::new(handler)));
    }

    pub fn stmt_macro(&self, name: &str) -> Option<&StmtMacro> {
        self.stmt.get(name)
    }

    pub fn expr_macro(&self, name: &str) -> Option<&ExprMacro> {
        self.expr.get(name)
    }

    pub fn use_macro(&self, name: &str) -> Option<&UseMacro> {
        self.uses.get(name)
    }

    pub fn is_stmt_macro(&self, name: &str) -> bool {
        self.stmt.contains_key(name)
    }

    pub fn is_expr_macro(&self, name: &str) -> bool {
        self.expr.contains_key(name)
    }
}

impl Default for MacroRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for MacroRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MacroRegistry")
            .field("stmt", &self.stmt.keys().collect::<Vec<_>>())
            .field("expr", &self.expr.keys().collect::<Vec<_>>())
            .field("uses", &self.uses.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_registered_in_the_right_tables() {
        let registry = MacroRegistry::default();
        for name in ["prepare", "exec", "cd"] {
            assert!(registry.is_stmt_macro(name), "{name}");
            assert!(registry.is_expr_macro(name), "{name}");
        }
        assert!(registry.is_stmt_macro("assert"));
        assert!(!registry.is_expr_macro("assert"));
        assert!(registry.is_stmt_macro("let"));
        assert!(matches!(
            registry.use_macro("blacklist"),
            Some(UseMacro::Builtin(BuiltinUse::Blacklist))
        ));
        assert!(registry.use_macro("nope").is_none());
    }

    #[test]
    fn registration_replaces_builtins() {
        let mut registry = MacroRegistry::default();
        registry.register_expr("exec", |ctx| Ok(Spanned::new(Expr::name("replaced"), ctx.trigger().span)));
        assert!(matches!(registry.expr_macro("exec"), Some(ExprMacro::Custom(_))));
        assert!(matches!(registry.stmt_macro("exec"), Some(StmtMacro::Builtin(_))));
        assert!(MacroRegistry::empty().stmt_macro("let").is_none());
    }

    #[test]
    fn use_directive_args_accept_strings_and_names() {
        let directive = UseDirective {
            name: "blacklist".into(),
            args: vec![
                Spanned::new(Expr::string("goto"), Span::default()),
                Spanned::new(Expr::name("labels"), Span::default()),
            ],
            rets: vec![],
            span: Span::default(),
        };
        assert_eq!(directive.arg_text(0).as_deref(), Some("goto"));
        assert_eq!(directive.arg_text(1).as_deref(), Some("labels"));
        assert_eq!(directive.arg_text(2), None);
    }
}
