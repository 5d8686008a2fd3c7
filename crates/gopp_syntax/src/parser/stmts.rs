/// Statement parsing methods.
///
/// This chunk parses statement lists and every statement form: simple statements (expression, send, inc/dec,
/// assignment), control flow (`if`, `for`, `switch`, `select`), branches, `go`/`defer`, labels, local declarations,
/// and statement-macro invocations.
///
/// ## Notes
/// - `expr_lev` is set to `-1` while parsing control clause headers so `T{` is read as the start of the body, not as a
///   composite literal.
/// - A statement that fails to parse becomes [`Stmt::Bad`]; the list resynchronizes at the next statement boundary.
impl<'a> Parser<'a> {
    // ========================================================================
    // Statement lists
    // ========================================================================

    /// Parse statements until the end of the list described by `ctx`.
    fn stmt_list(&mut self, ctx: ListContext) -> Vec<Spanned<Stmt>> {
        self.list_stack.push(ctx);
        let top_level = ctx == ListContext::TopLevel;
        let mut stmts = Vec::new();
        while !self.at_list_end(ctx) && !self.aborted() {
            if self.at_semi() {
                self.advance();
                continue;
            }
            let start = self.current_span().start;
            match self.stmt() {
                Ok(stmt) => {
                    stmts.push(stmt);
                    if self.at_list_end(ctx) {
                        break;
                    }
                    if self.at_semi() {
                        self.advance();
                        continue;
                    }
                    let diag = Diagnostic::syntax(
                        format!("unexpected {} at end of statement", self.peek().kind),
                        self.current_span(),
                    );
                    self.report(diag);
                    self.sync_stmt(top_level);
                }
                Err(diag) => {
                    self.report(diag);
                    stmts.push(Spanned::new(Stmt::Bad, self.span_from(start)));
                    self.sync_stmt(top_level);
                }
            }
        }
        self.list_stack.pop();
        stmts
    }

    fn at_list_end(&self, ctx: ListContext) -> bool {
        if self.is_at_end() {
            return true;
        }
        match ctx {
            ListContext::Block => self.check_punct(PunctuationId::RBrace),
            ListContext::Clause => {
                self.check_punct(PunctuationId::RBrace)
                    || self.check_keyword(KeywordId::Case)
                    || self.check_keyword(KeywordId::Default)
            }
            ListContext::TopLevel => {
                matches!(
                    self.peek().kind.keyword_id(),
                    Some(KeywordId::Package | KeywordId::Import | KeywordId::Const | KeywordId::Var | KeywordId::Type)
                ) || self.at_section_header()
                    || self.at_directive("use")
                    || self.at_directive("include")
                    || self.at_func_decl()
            }
        }
    }

    /// `true` where a statement may end: terminator, closing bracket or end of input.
    fn at_stmt_end(&self) -> bool {
        self.at_semi()
            || self.is_at_end()
            || self.check_punct(PunctuationId::RBrace)
            || self.check_punct(PunctuationId::RParen)
    }

    /// Run `f` with `expr_lev` set to `lev`, restoring it afterwards.
    fn with_expr_lev<T>(&mut self, lev: i32, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = self.expr_lev;
        self.expr_lev = lev;
        let result = f(self);
        self.expr_lev = saved;
        result
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn stmt(&mut self) -> PResult<Spanned<Stmt>> {
        let lead = self.take_lead();
        let mut stmt = self.stmt_inner()?;
        if stmt.comments.is_none() {
            stmt.comments = lead;
        }
        Ok(stmt)
    }

    fn stmt_inner(&mut self) -> PResult<Spanned<Stmt>> {
        let token = self.peek().clone();
        let start = token.span.start;
        match &token.kind {
            TokenKind::Punctuation(PunctuationId::LBrace) => {
                let block = self.block()?;
                let span = block.span;
                Ok(Spanned::new(Stmt::Block(block), span))
            }
            TokenKind::Punctuation(PunctuationId::RBrace) | TokenKind::Semi { .. } => {
                Ok(Spanned::new(Stmt::Empty, Span::new(start, start)))
            }
            TokenKind::Keyword(id) => match id {
                KeywordId::Var | KeywordId::Const | KeywordId::Type => {
                    let decls = self.keyword_decl(*id)?;
                    Ok(Spanned::new(Stmt::Decl(decls), self.span_from(start)))
                }
                KeywordId::Go | KeywordId::Defer => self.call_stmt(*id),
                KeywordId::Return => {
                    self.advance();
                    let results = if self.at_stmt_end() { Vec::new() } else { self.expr_list()? };
                    Ok(Spanned::new(Stmt::Return(results), self.span_from(start)))
                }
                KeywordId::Break | KeywordId::Continue => {
                    self.advance();
                    let kind = if *id == KeywordId::Break {
                        BranchKind::Break
                    } else {
                        BranchKind::Continue
                    };
                    let label = if matches!(self.peek().kind, TokenKind::Ident(_)) {
                        Some(self.ident()?)
                    } else {
                        None
                    };
                    Ok(Spanned::new(Stmt::Branch { kind, label }, self.span_from(start)))
                }
                KeywordId::Goto => {
                    self.advance();
                    self.require(PermitId::Goto, token.span)?;
                    let label = Some(self.ident()?);
                    Ok(Spanned::new(
                        Stmt::Branch {
                            kind: BranchKind::Goto,
                            label,
                        },
                        self.span_from(start),
                    ))
                }
                KeywordId::Fallthrough => {
                    self.advance();
                    self.require(PermitId::Fallthrough, token.span)?;
                    Ok(Spanned::new(
                        Stmt::Branch {
                            kind: BranchKind::Fallthrough,
                            label: None,
                        },
                        token.span,
                    ))
                }
                KeywordId::If => self.if_stmt(),
                KeywordId::For => self.for_stmt(),
                KeywordId::Switch => self.switch_stmt(),
                KeywordId::Select => self.select_stmt(),
                _ => self.simple_stmt(false),
            },
            TokenKind::Ident(_) => {
                if let Some(stmt) = self.stmt_macro()? {
                    return Ok(stmt);
                }
                if self.peek_nth(1).kind.is_punctuation(PunctuationId::Colon) {
                    return self.labeled_stmt();
                }
                self.simple_stmt(false)
            }
            _ => self.simple_stmt(false),
        }
    }

    /// `go f()` / `defer f()`
    fn call_stmt(&mut self, id: KeywordId) -> PResult<Spanned<Stmt>> {
        let keyword = self.advance();
        let (kind, permit) = if id == KeywordId::Go {
            (CallKind::Go, PermitId::GoStmt)
        } else {
            (CallKind::Defer, PermitId::DeferStmt)
        };
        self.require(permit, keyword.span)?;
        let call = self.expr()?;
        if !matches!(call.node, Expr::Call { .. }) {
            return Err(Diagnostic::syntax(
                format!(
                    "expression in {} must be function call",
                    gopp_core::lang::keywords::as_str(id)
                ),
                call.span,
            ));
        }
        Ok(Spanned::new(Stmt::Call { kind, call }, self.span_from(keyword.span.start)))
    }

    /// `Label: stmt`
    fn labeled_stmt(&mut self) -> PResult<Spanned<Stmt>> {
        let label = self.ident()?;
        self.advance();
        self.require(PermitId::Labels, label.span)?;
        let stmt = if self.check_punct(PunctuationId::RBrace) {
            let at = self.current_span().start;
            Spanned::new(Stmt::Empty, Span::new(at, at))
        } else {
            self.stmt()?
        };
        let span = label.span.merge(stmt.span);
        Ok(Spanned::new(
            Stmt::Labeled {
                label,
                stmt: Box::new(stmt),
            },
            span,
        ))
    }

    /// Expression, send, inc/dec or assignment statement.
    ///
    /// With `range_ok`, `[k, v :=] range x` is accepted and returned as [`Stmt::Range`] with an empty body.
    fn simple_stmt(&mut self, range_ok: bool) -> PResult<Spanned<Stmt>> {
        let start = self.current_span().start;
        if range_ok && self.check_keyword(KeywordId::Range) {
            return self.range_clause(start, Vec::new(), false);
        }

        let lhs = self.expr_list()?;
        let token = self.peek().clone();
        match &token.kind {
            TokenKind::Operator(op) if operators::is_assign(*op) => {
                let op = *op;
                self.advance();
                if op == OperatorId::Define {
                    self.require(PermitId::ShortVarDecl, token.span)?;
                }
                if range_ok && self.check_keyword(KeywordId::Range) && matches!(op, OperatorId::Assign | OperatorId::Define)
                {
                    return self.range_clause(start, lhs, op == OperatorId::Define);
                }
                let rhs = self.expr_list()?;
                Ok(Spanned::new(Stmt::Assign { lhs, op, rhs }, self.span_from(start)))
            }
            TokenKind::Operator(op @ (OperatorId::Inc | OperatorId::Dec)) => {
                let op = *op;
                self.advance();
                self.require(PermitId::IncDec, token.span)?;
                let x = single(lhs, "inc/dec statement")?;
                Ok(Spanned::new(Stmt::IncDec { x, op }, self.span_from(start)))
            }
            TokenKind::Operator(OperatorId::Arrow) => {
                self.advance();
                self.require(PermitId::Channels, token.span)?;
                let chan = single(lhs, "send statement")?;
                let value = self.expr()?;
                Ok(Spanned::new(Stmt::Send { chan, value }, self.span_from(start)))
            }
            _ => {
                let x = single(lhs, "statement")?;
                let span = x.span;
                Ok(Spanned::new(Stmt::Expr(x), span))
            }
        }
    }

    /// `range x` after the optional `k, v :=` prefix.
    fn range_clause(&mut self, start: usize, lhs: Vec<Spanned<Expr>>, define: bool) -> PResult<Spanned<Stmt>> {
        let keyword = self.advance();
        self.require(PermitId::RangeLoops, keyword.span)?;
        if lhs.len() > 2 {
            return Err(Diagnostic::syntax(
                "range clause permits at most two iteration variables",
                lhs[2].span,
            ));
        }
        let x = self.expr()?;
        let mut vars = lhs.into_iter();
        Ok(Spanned::new(
            Stmt::Range {
                key: vars.next(),
                value: vars.next(),
                define,
                x,
                body: Block::default(),
            },
            self.span_from(start),
        ))
    }

    // ========================================================================
    // Control flow
    // ========================================================================

    /// `{ stmts }`
    fn block(&mut self) -> PResult<Block> {
        self.nested(|p| {
            let open = p.expect_punct(PunctuationId::LBrace)?;
            let stmts = p.stmt_list(ListContext::Block);
            p.expect_punct(PunctuationId::RBrace)?;
            Ok(Block::new(stmts, p.span_from(open.start)))
        })
    }

    /// Parse a control clause header (`init; cond` or `cond`) at `expr_lev == -1`.
    fn clause_header(&mut self, range_ok: bool) -> PResult<(Option<Spanned<Stmt>>, Option<Spanned<Stmt>>)> {
        self.with_expr_lev(-1, |p| {
            if p.check_punct(PunctuationId::LBrace) {
                return Ok((None, None));
            }
            let first = if p.at_semi() { None } else { Some(p.simple_stmt(range_ok)?) };
            if !p.at_semi() || matches!(first.as_ref().map(|s| &s.node), Some(Stmt::Range { .. })) {
                return Ok((None, first));
            }
            p.advance();
            let second = if p.check_punct(PunctuationId::LBrace) || p.at_semi() {
                None
            } else {
                Some(p.simple_stmt(false)?)
            };
            Ok((first, second))
        })
    }

    /// `if [init;] cond { } [else if ... | else { }]`
    fn if_stmt(&mut self) -> PResult<Spanned<Stmt>> {
        let keyword = self.advance();
        let (init, cond) = self.clause_header(false)?;
        let cond = match cond {
            Some(Spanned {
                node: Stmt::Expr(cond), ..
            }) => cond,
            Some(other) => {
                return Err(Diagnostic::syntax(
                    "cannot use statement as value in if condition",
                    other.span,
                ));
            }
            None => return Err(Diagnostic::syntax("missing condition in if statement", keyword.span)),
        };
        let then = self.block()?;
        let els = if self.match_keyword(KeywordId::Else) {
            if self.check_keyword(KeywordId::If) {
                Some(Box::new(self.if_stmt()?))
            } else if self.check_punct(PunctuationId::LBrace) {
                let block = self.block()?;
                let span = block.span;
                Some(Box::new(Spanned::new(Stmt::Block(block), span)))
            } else {
                return Err(Diagnostic::syntax(
                    "else must be followed by if or statement block",
                    self.current_span(),
                ));
            }
        } else {
            None
        };
        Ok(Spanned::new(
            Stmt::If {
                init: init.map(Box::new),
                cond,
                then,
                els,
            },
            self.span_from(keyword.span.start),
        ))
    }

    /// `for { }`, `for cond { }`, `for init; cond; post { }` or `for k, v := range x { }`.
    fn for_stmt(&mut self) -> PResult<Spanned<Stmt>> {
        let keyword = self.advance();
        let start = keyword.span.start;

        let (init, cond, post) = self.with_expr_lev(-1, |p| -> PResult<_> {
            if p.check_punct(PunctuationId::LBrace) {
                return Ok((None, None, None));
            }
            let first = if p.at_semi() { None } else { Some(p.simple_stmt(true)?) };
            let is_range = matches!(first.as_ref().map(|s| &s.node), Some(Stmt::Range { .. }));
            if is_range || !p.at_semi() {
                return Ok((None, first, None));
            }
            p.advance();
            let cond = if p.at_semi() { None } else { Some(p.simple_stmt(false)?) };
            if !p.at_semi() {
                return Err(p.unexpected("for loop condition"));
            }
            p.advance();
            let post = if p.check_punct(PunctuationId::LBrace) {
                None
            } else {
                Some(p.simple_stmt(false)?)
            };
            Ok((first, cond, post))
        })?;

        let body = self.block()?;

        if let Some(Spanned {
            node: Stmt::Range {
                key, value, define, x, ..
            },
            ..
        }) = cond
        {
            return Ok(Spanned::new(
                Stmt::Range {
                    key,
                    value,
                    define,
                    x,
                    body,
                },
                self.span_from(start),
            ));
        }

        let cond = match cond {
            Some(Spanned {
                node: Stmt::Expr(cond), ..
            }) => Some(cond),
            Some(other) => {
                return Err(Diagnostic::syntax(
                    "cannot use statement as value in for loop condition",
                    other.span,
                ));
            }
            None => None,
        };
        if let Some(post) = &post {
            if matches!(post.node, Stmt::Assign { op: OperatorId::Define, .. }) {
                return Err(Diagnostic::syntax("cannot declare in post statement of for loop", post.span));
            }
        }
        Ok(Spanned::new(
            Stmt::For {
                init: init.map(Box::new),
                cond,
                post: post.map(Box::new),
                body,
            },
            self.span_from(start),
        ))
    }

    /// Expression switch or type switch.
    fn switch_stmt(&mut self) -> PResult<Spanned<Stmt>> {
        let keyword = self.advance();
        let (init, tag) = self.clause_header(false)?;
        let type_switch = tag.as_ref().is_some_and(|t| is_type_switch_guard(&t.node));
        let permit = if type_switch {
            PermitId::TypeSwitch
        } else {
            PermitId::SwitchStmt
        };
        self.require(permit, keyword.span)?;

        let open = self.expect_punct(PunctuationId::LBrace)?;
        let mut clauses = Vec::new();
        loop {
            self.skip_semis();
            if self.check_punct(PunctuationId::RBrace) || self.is_at_end() {
                break;
            }
            let clause_start = self.current_span().start;
            let list = if self.match_keyword(KeywordId::Default) {
                None
            } else if self.match_keyword(KeywordId::Case) {
                Some(self.with_expr_lev(0, |p| p.expr_list())?)
            } else {
                return Err(self.unexpected("case or default or }"));
            };
            self.expect_punct(PunctuationId::Colon)?;
            let body = self.stmt_list(ListContext::Clause);
            clauses.push(Spanned::new(Stmt::Case { list, body }, self.span_from(clause_start)));
        }
        self.expect_punct(PunctuationId::RBrace)?;
        let body = Block::new(clauses, self.span_from(open.start));

        let init = init.map(Box::new);
        let node = match tag {
            Some(assign) if type_switch => Stmt::TypeSwitch {
                init,
                assign: Box::new(assign),
                body,
            },
            Some(Spanned {
                node: Stmt::Expr(tag), ..
            }) => Stmt::Switch {
                init,
                tag: Some(tag),
                body,
            },
            Some(other) => {
                return Err(Diagnostic::syntax("switch expression must be an expression", other.span));
            }
            None => Stmt::Switch { init, tag: None, body },
        };
        Ok(Spanned::new(node, self.span_from(keyword.span.start)))
    }

    /// `select { case comm: ... default: ... }`
    fn select_stmt(&mut self) -> PResult<Spanned<Stmt>> {
        let keyword = self.advance();
        self.require(PermitId::Select, keyword.span)?;
        let open = self.expect_punct(PunctuationId::LBrace)?;
        let mut clauses = Vec::new();
        loop {
            self.skip_semis();
            if self.check_punct(PunctuationId::RBrace) || self.is_at_end() {
                break;
            }
            let clause_start = self.current_span().start;
            let comm = if self.match_keyword(KeywordId::Default) {
                None
            } else if self.match_keyword(KeywordId::Case) {
                let comm = self.simple_stmt(false)?;
                let valid = match &comm.node {
                    Stmt::Send { .. } => true,
                    Stmt::Expr(x) => is_receive(&x.node),
                    Stmt::Assign { rhs, op, .. } => {
                        matches!(op, OperatorId::Assign | OperatorId::Define)
                            && rhs.len() == 1
                            && is_receive(&rhs[0].node)
                    }
                    _ => false,
                };
                if !valid {
                    return Err(Diagnostic::syntax(
                        "select case must be receive, send or assign recv",
                        comm.span,
                    ));
                }
                Some(Box::new(comm))
            } else {
                return Err(self.unexpected("case or default or }"));
            };
            self.expect_punct(PunctuationId::Colon)?;
            let body = self.stmt_list(ListContext::Clause);
            clauses.push(Spanned::new(Stmt::Comm { comm, body }, self.span_from(clause_start)));
        }
        self.expect_punct(PunctuationId::RBrace)?;
        let body = Block::new(clauses, self.span_from(open.start));
        Ok(Spanned::new(Stmt::Select { body }, self.span_from(keyword.span.start)))
    }
}

/// Unwrap a one-element expression list, or fail naming `what`.
fn single(mut list: Vec<Spanned<Expr>>, what: &str) -> PResult<Spanned<Expr>> {
    if list.len() == 1 {
        if let Some(x) = list.pop() {
            return Ok(x);
        }
    }
    let span = list
        .iter()
        .map(|x| x.span)
        .reduce(Span::merge)
        .unwrap_or_default();
    Err(Diagnostic::syntax(format!("expected 1 expression in {what}"), span))
}

/// `x.(type)` or `v := x.(type)`.
fn is_type_switch_guard(stmt: &Stmt) -> bool {
    let is_guard = |x: &Expr| matches!(x, Expr::TypeAssert { ty: None, .. });
    match stmt {
        Stmt::Expr(x) => is_guard(&x.node),
        Stmt::Assign {
            lhs,
            op: OperatorId::Define,
            rhs,
        } => lhs.len() == 1 && rhs.len() == 1 && is_guard(&rhs[0].node),
        _ => false,
    }
}

fn is_receive(expr: &Expr) -> bool {
    match expr {
        Expr::Unary {
            op: OperatorId::Arrow, ..
        } => true,
        Expr::Paren(inner) => is_receive(&inner.node),
        _ => false,
    }
}
