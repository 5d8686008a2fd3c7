/// Macro invocation and the capability-scoped parser handle given to macro handlers.
///
/// A handler never sees [`Parser`] itself. [`MacroContext`] exposes what an expansion needs (token access,
/// sub-parsers, permit changes, library references, diagnostics) and nothing that would let it corrupt package or
/// project state.
impl<'a> Parser<'a> {
    // ========================================================================
    // Macro triggers
    // ========================================================================

    /// Name of the macro the current identifier triggers, if any.
    ///
    /// An ASCII trigger is ignored when the name is bound at package scope or when the next token shows the name is
    /// used as a value (selector, assignment, binary operand, list element). An ideographic trigger always fires.
    fn macro_trigger(&self, stmt: bool) -> PResult<Option<Ident>> {
        let token = self.peek();
        let TokenKind::Ident(name) = &token.kind else {
            return Ok(None);
        };
        let registry = &self.session.macros;
        let registered = if stmt {
            registry.is_stmt_macro(name)
        } else {
            registry.is_expr_macro(name)
        };
        if !registered {
            return Ok(None);
        }
        if !token.ideograph && (self.bound.contains(name) || blocks_macro_trigger(&self.peek_nth(1).kind)) {
            return Ok(None);
        }
        if !self.permits.is_permit(PermitId::Macros) {
            if token.ideograph || matches!(self.peek_nth(1).kind, TokenKind::Literal(_) | TokenKind::Ident(_)) {
                return Err(not_permitted(PermitId::Macros, token.span));
            }
            return Ok(None);
        }
        Ok(Some(name.clone()))
    }

    /// Expand a statement macro at the current token, if one triggers.
    fn stmt_macro(&mut self) -> PResult<Option<Spanned<Stmt>>> {
        let Some(name) = self.macro_trigger(true)? else {
            return Ok(None);
        };
        let registry = Arc::clone(&self.session.macros);
        let span = self.advance().span;
        tracing::trace!(name = %name, "expanding statement macro");
        let trigger = Spanned::new(name, span);
        let stmt = match registry.stmt_macro(&trigger.node) {
            Some(StmtMacro::Builtin(builtin)) => {
                let builtin = *builtin;
                builtins::expand_stmt(builtin, &mut MacroContext::new(self, trigger))?
            }
            Some(StmtMacro::Custom(handler)) => {
                let handler = Arc::clone(handler);
                handler(&mut MacroContext::new(self, trigger))?
            }
            None => return Ok(None),
        };
        Ok(Some(stmt))
    }

    /// Expand an expression macro at the current token, if one triggers.
    fn expr_macro(&mut self) -> PResult<Option<Spanned<Expr>>> {
        let Some(name) = self.macro_trigger(false)? else {
            return Ok(None);
        };
        let registry = Arc::clone(&self.session.macros);
        let span = self.advance().span;
        tracing::trace!(name = %name, "expanding expression macro");
        let trigger = Spanned::new(name, span);
        let expr = match registry.expr_macro(&trigger.node) {
            Some(ExprMacro::Builtin(builtin)) => {
                let builtin = *builtin;
                builtins::expand_expr(builtin, &mut MacroContext::new(self, trigger))?
            }
            Some(ExprMacro::Custom(handler)) => {
                let handler = Arc::clone(handler);
                handler(&mut MacroContext::new(self, trigger))?
            }
            None => return Ok(None),
        };
        Ok(Some(expr))
    }
}

/// Tokens after a macro name that show the name is used as an ordinary identifier.
fn blocks_macro_trigger(next: &TokenKind) -> bool {
    match next {
        TokenKind::Eof => true,
        TokenKind::Punctuation(id) => matches!(
            id,
            PunctuationId::Dot
                | PunctuationId::Colon
                | PunctuationId::Comma
                | PunctuationId::RParen
                | PunctuationId::RBracket
                | PunctuationId::RBrace
        ),
        TokenKind::Operator(id) => {
            operators::is_assign(*id)
                || matches!(id, OperatorId::Inc | OperatorId::Dec)
                || operators::precedence(*id) > 0
        }
        _ => false,
    }
}

// ============================================================================
// MacroContext
// ============================================================================

/// Parser handle passed to macro and `use`-directive handlers.
///
/// The trigger token has already been consumed; the handler consumes its own arguments.
pub struct MacroContext<'p, 'a> {
    parser: &'p mut Parser<'a>,
    trigger: Spanned<Ident>,
}

impl<'p, 'a> MacroContext<'p, 'a> {
    pub(crate) fn new(parser: &'p mut Parser<'a>, trigger: Spanned<Ident>) -> Self {
        Self { parser, trigger }
    }

    /// The macro or directive name and its span.
    pub fn trigger(&self) -> &Spanned<Ident> {
        &self.trigger
    }

    /// Name of the input being parsed.
    pub fn file_name(&self) -> &str {
        &self.parser.name
    }

    // Tokens

    pub fn peek(&self) -> &Token {
        self.parser.peek()
    }

    pub fn peek_nth(&self, n: usize) -> &Token {
        self.parser.peek_nth(n)
    }

    pub fn advance(&mut self) -> Token {
        self.parser.advance()
    }

    pub fn check_punct(&self, id: PunctuationId) -> bool {
        self.parser.check_punct(id)
    }

    /// Consume `id` if it is next.
    pub fn eat_punct(&mut self, id: PunctuationId) -> bool {
        self.parser.match_punct(id)
    }

    pub fn expect_punct(&mut self, id: PunctuationId) -> PResult<Span> {
        self.parser.expect_punct(id)
    }

    /// Consume a statement terminator if it is next.
    pub fn eat_semi(&mut self) -> bool {
        if self.parser.at_semi() {
            self.parser.advance();
            true
        } else {
            false
        }
    }

    /// `true` at a terminator, closing bracket or end of input.
    pub fn at_stmt_end(&self) -> bool {
        self.parser.at_stmt_end()
    }

    // Sub-parsers

    pub fn parse_expr(&mut self) -> PResult<Spanned<Expr>> {
        self.parser.expr()
    }

    pub fn parse_expr_list(&mut self) -> PResult<Vec<Spanned<Expr>>> {
        self.parser.expr_list()
    }

    pub fn parse_type(&mut self) -> PResult<Spanned<Expr>> {
        self.parser.type_()
    }

    pub fn parse_stmt(&mut self) -> PResult<Spanned<Stmt>> {
        self.parser.stmt()
    }

    pub fn parse_block(&mut self) -> PResult<Block> {
        self.parser.block()
    }

    /// Parse the remaining statements of the enclosing list.
    pub fn parse_rest(&mut self) -> Vec<Spanned<Stmt>> {
        let ctx = self.parser.list_stack.last().copied().unwrap_or(ListContext::Block);
        self.parser.stmt_list(ctx)
    }

    // Locations and diagnostics

    /// Span from `start` to the end of the last consumed token.
    pub fn span_from(&self, start: usize) -> Span {
        self.parser.span_from(start)
    }

    /// Source position of `span`, remapped when line directives are active.
    pub fn position(&self, span: Span) -> Position {
        self.parser.position_of(span.start)
    }

    /// Report a diagnostic without failing the expansion.
    pub fn report(&mut self, diag: Diagnostic) {
        self.parser.report(diag);
    }

    // Permits and libraries

    pub fn is_permit(&self, id: PermitId) -> bool {
        self.parser.permits.is_permit(id)
    }

    pub fn set_permit(&mut self, id: PermitId) {
        self.parser.permits.set_permit(id);
    }

    pub fn unset_permit(&mut self, id: PermitId) {
        self.parser.permits.unset_permit(id);
    }

    /// Fail with `"<permit> is not permitted"` unless `id` is enabled.
    pub fn require(&self, id: PermitId, span: Span) -> PResult<()> {
        self.parser.require(id, span)
    }

    /// A reference to a support library, importing it into the current file.
    pub fn library(&mut self, id: LibraryId, span: Span) -> Spanned<Expr> {
        let alias = libraries::alias(id);
        if let Err(diag) = self.parser.infer_import(alias.to_string(), libraries::path(id).to_string(), span) {
            self.parser.report(diag);
        }
        Spanned::new(Expr::name(alias), span)
    }

    /// Turn on dynamic mode: operators become calls on `name`, imported from `path`.
    ///
    /// Inside a section this lasts until the section ends; before the first section it covers the whole input.
    pub fn set_dynamic(&mut self, name: Ident, path: String) {
        let block = DynamicBlock { name, path };
        if !self.parser.in_section {
            self.parser.input_dynamic = Some(block.clone());
        }
        self.parser.dynamic = Some(block);
    }
}
