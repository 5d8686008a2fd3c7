/// Expression parsing methods.
///
/// This chunk implements expression parsing with precedence climbing:
/// - `||` (1), `&&` (2), comparisons (3), additive (4), multiplicative (5), from the operator registry
/// - unary operators, including `<-` with its channel-type reassociation
/// - postfix forms: selectors, type assertions, index/slice, calls, composite literals
/// - operands: names, literals, parenthesized expressions, function literals and type literals
///
/// ## Notes
/// - Binary and unary nodes are built through `make_binary` / `make_unary` (see `dynamic.rs`) so dynamic mode can
///   replace them with method calls.
/// - Expression macros are tried before an identifier is taken as a plain name.
impl<'a> Parser<'a> {
    // ========================================================================
    // Expressions
    // ========================================================================

    fn expr(&mut self) -> PResult<Spanned<Expr>> {
        self.binary_expr(1)
    }

    fn expr_list(&mut self) -> PResult<Vec<Spanned<Expr>>> {
        let mut list = vec![self.expr()?];
        while self.match_punct(PunctuationId::Comma) {
            list.push(self.expr()?);
        }
        Ok(list)
    }

    /// Parse binary operators of precedence `prec1` or higher.
    fn binary_expr(&mut self, prec1: u8) -> PResult<Spanned<Expr>> {
        let mut x = self.unary_expr()?;
        loop {
            let Some(op) = self.peek().kind.operator_id() else {
                return Ok(x);
            };
            let prec = operators::precedence(op);
            if prec == 0 || prec < prec1 {
                return Ok(x);
            }
            let op_span = self.advance().span;
            let y = self.binary_expr(prec + 1)?;
            x = self.make_binary(op, x, y, op_span)?;
        }
    }

    fn unary_expr(&mut self) -> PResult<Spanned<Expr>> {
        let token = self.peek().clone();
        let start = token.span.start;
        let TokenKind::Operator(op) = token.kind else {
            return self.primary_expr();
        };
        match op {
            OperatorId::Add | OperatorId::Sub | OperatorId::Not | OperatorId::Xor => {
                self.advance();
                let x = self.nested(Self::unary_expr)?;
                let span = self.span_from(start);
                self.make_unary(op, x, span)
            }
            OperatorId::And => {
                self.advance();
                self.require(PermitId::Pointers, token.span)?;
                let x = self.nested(Self::unary_expr)?;
                Ok(Spanned::new(Expr::Unary { op, x: Box::new(x) }, self.span_from(start)))
            }
            OperatorId::Mul => {
                self.advance();
                self.require(PermitId::Pointers, token.span)?;
                let x = self.nested(Self::unary_expr)?;
                Ok(Spanned::new(Expr::Star(Box::new(x)), self.span_from(start)))
            }
            OperatorId::Arrow => {
                self.advance();
                self.require(PermitId::Channels, token.span)?;
                let mut x = self.nested(Self::unary_expr)?;
                if matches!(x.node, Expr::Chan { .. }) {
                    // `<-chan T` is a receive-only channel type, not a receive from `chan T`.
                    reassociate_recv(&mut x.node, token.span)?;
                    x.span = self.span_from(start);
                    return Ok(x);
                }
                Ok(Spanned::new(Expr::Unary { op, x: Box::new(x) }, self.span_from(start)))
            }
            _ => self.primary_expr(),
        }
    }

    /// An operand followed by any number of postfix forms.
    fn primary_expr(&mut self) -> PResult<Spanned<Expr>> {
        let mut x = self.operand()?;
        loop {
            let token = self.peek().clone();
            match &token.kind {
                TokenKind::Punctuation(PunctuationId::Dot) => {
                    self.advance();
                    x = self.selector_or_assert(x, token.span)?;
                }
                TokenKind::Punctuation(PunctuationId::LBracket) => {
                    x = self.index_or_slice(x)?;
                }
                TokenKind::Punctuation(PunctuationId::LParen) => {
                    x = self.call(x)?;
                }
                TokenKind::Punctuation(PunctuationId::LBrace) => {
                    let literal_type = match &x.node {
                        Expr::Name(_) | Expr::Selector { .. } | Expr::Index { .. } => self.expr_lev >= 0,
                        Expr::Array { .. } | Expr::Struct(_) | Expr::Map { .. } => true,
                        _ => false,
                    };
                    if !literal_type {
                        return Ok(x);
                    }
                    x = self.composite_lit(Some(x))?;
                }
                _ => return Ok(x),
            }
        }
    }

    /// `.Name`, `.(T)` or `.(type)` after the dot.
    fn selector_or_assert(&mut self, x: Spanned<Expr>, dot: Span) -> PResult<Spanned<Expr>> {
        let start = x.span.start;
        if matches!(self.peek().kind, TokenKind::Ident(_)) {
            let sel = self.ident()?;
            return Ok(Spanned::new(
                Expr::Selector {
                    x: Box::new(x),
                    sel,
                },
                self.span_from(start),
            ));
        }
        if !self.check_punct(PunctuationId::LParen) {
            return Err(self.unexpected("name or ("));
        }
        self.advance();
        self.require(PermitId::TypeAssertions, dot)?;
        let ty = if self.match_keyword(KeywordId::Type) {
            None
        } else {
            Some(Box::new(self.type_()?))
        };
        self.expect_punct(PunctuationId::RParen)?;
        Ok(Spanned::new(
            Expr::TypeAssert { x: Box::new(x), ty },
            self.span_from(start),
        ))
    }

    /// `x[i]`, `x[lo:hi]` or `x[lo:hi:max]`.
    fn index_or_slice(&mut self, x: Spanned<Expr>) -> PResult<Spanned<Expr>> {
        let start = x.span.start;
        let open = self.advance().span;
        let lev = self.expr_lev + 1;
        let (colons, parts) = self.with_expr_lev(lev, |p| -> PResult<_> {
            if p.check_punct(PunctuationId::RBracket) {
                return Err(p.unexpected("operand"));
            }
            let mut parts: [Option<Box<Spanned<Expr>>>; 3] = [None, None, None];
            if !p.check_punct(PunctuationId::Colon) {
                parts[0] = Some(Box::new(p.expr()?));
            }
            let mut colons = 0;
            while colons < 2 && p.match_punct(PunctuationId::Colon) {
                colons += 1;
                if !p.check_punct(PunctuationId::Colon) && !p.check_punct(PunctuationId::RBracket) {
                    parts[colons] = Some(Box::new(p.expr()?));
                }
            }
            Ok((colons, parts))
        })?;
        self.expect_punct(PunctuationId::RBracket)?;

        let [low, high, max] = parts;
        if colons == 0 {
            let Some(index) = low else {
                return Err(Diagnostic::syntax("expected operand", open));
            };
            return Ok(Spanned::new(Expr::Index { x: Box::new(x), index }, self.span_from(start)));
        }
        if colons == 2 {
            self.require(PermitId::FullSlices, open)?;
            if high.is_none() {
                return Err(Diagnostic::syntax("middle index required in 3-index slice", self.span_from(open.start)));
            }
            if max.is_none() {
                return Err(Diagnostic::syntax("final index required in 3-index slice", self.span_from(open.start)));
            }
        }
        Ok(Spanned::new(
            Expr::Slice {
                x: Box::new(x),
                low,
                high,
                max,
            },
            self.span_from(start),
        ))
    }

    /// `f(args)` or `f(args...)`.
    fn call(&mut self, fun: Spanned<Expr>) -> PResult<Spanned<Expr>> {
        let start = fun.span.start;
        self.advance();
        let lev = self.expr_lev + 1;
        let (args, spread) = self.with_expr_lev(lev, |p| -> PResult<_> {
            let mut args = Vec::new();
            let mut spread = false;
            while !p.check_punct(PunctuationId::RParen) && !p.is_at_end() {
                args.push(p.expr()?);
                if p.check_punct(PunctuationId::Ellipsis) {
                    let span = p.advance().span;
                    p.require(PermitId::Variadics, span)?;
                    spread = true;
                }
                if spread || !p.match_punct(PunctuationId::Comma) {
                    p.match_punct(PunctuationId::Comma);
                    break;
                }
            }
            Ok((args, spread))
        })?;
        self.expect_punct(PunctuationId::RParen)?;
        Ok(Spanned::new(
            Expr::Call {
                fun: Box::new(fun),
                args,
                spread,
            },
            self.span_from(start),
        ))
    }

    /// `T{elts}`, or `{elts}` for an elided inner literal (`ty == None`).
    fn composite_lit(&mut self, ty: Option<Spanned<Expr>>) -> PResult<Spanned<Expr>> {
        let open = self.current_span();
        self.require(PermitId::CompositeLiterals, open)?;
        self.advance();
        let start = ty.as_ref().map_or(open.start, |t| t.span.start);
        let lev = self.expr_lev + 1;
        let elts = self.with_expr_lev(lev, |p| {
            p.nested(|p| {
                let mut elts = Vec::new();
                while !p.check_punct(PunctuationId::RBrace) && !p.is_at_end() {
                    elts.push(p.element()?);
                    if !p.match_punct(PunctuationId::Comma) {
                        break;
                    }
                }
                Ok(elts)
            })
        })?;
        self.expect_punct(PunctuationId::RBrace)?;
        Ok(Spanned::new(
            Expr::Composite {
                ty: ty.map(Box::new),
                elts,
            },
            self.span_from(start),
        ))
    }

    /// `value` or `key: value`; either side may be an elided `{...}` literal.
    fn element(&mut self) -> PResult<Spanned<Expr>> {
        let key = self.element_value()?;
        if !self.match_punct(PunctuationId::Colon) {
            return Ok(key);
        }
        let value = self.element_value()?;
        let span = key.span.merge(value.span);
        Ok(Spanned::new(
            Expr::KeyValue {
                key: Box::new(key),
                value: Box::new(value),
            },
            span,
        ))
    }

    fn element_value(&mut self) -> PResult<Spanned<Expr>> {
        if self.check_punct(PunctuationId::LBrace) {
            self.composite_lit(None)
        } else {
            self.expr()
        }
    }

    // ========================================================================
    // Operands
    // ========================================================================

    fn operand(&mut self) -> PResult<Spanned<Expr>> {
        let token = self.peek().clone();
        match &token.kind {
            TokenKind::Ident(name) => {
                if let Some(x) = self.expr_macro()? {
                    return Ok(x);
                }
                self.advance();
                Ok(Spanned::new(Expr::name(name.clone()), token.span))
            }
            TokenKind::Literal(lit) => {
                self.advance();
                self.check_literal(lit, token.span);
                if lit.kind == LitKind::String
                    && self.check_punct(PunctuationId::Dot)
                    && matches!(self.peek_nth(1).kind, TokenKind::Ident(_))
                    && self.gate(PermitId::InferredImports, token.span)
                {
                    let path = unquote(&lit.raw);
                    let alias = import_alias(&path);
                    self.infer_import(alias.clone(), path, token.span)?;
                    return Ok(Spanned::new(Expr::name(alias), token.span));
                }
                Ok(Spanned::new(
                    Expr::Lit(BasicLit {
                        kind: lit.kind,
                        raw: lit.raw.clone(),
                    }),
                    token.span,
                ))
            }
            TokenKind::Punctuation(PunctuationId::LParen) => {
                self.advance();
                let lev = self.expr_lev + 1;
                let inner = self.with_expr_lev(lev, |p| p.nested(Self::expr))?;
                self.expect_punct(PunctuationId::RParen)?;
                Ok(Spanned::new(Expr::Paren(Box::new(inner)), self.span_from(token.span.start)))
            }
            TokenKind::Keyword(KeywordId::Func) => self.func_lit_or_type(),
            TokenKind::Punctuation(PunctuationId::LBracket)
            | TokenKind::Keyword(KeywordId::Chan | KeywordId::Map | KeywordId::Struct | KeywordId::Interface) => {
                self.type_()
            }
            _ => Err(self.unexpected("expression")),
        }
    }

    /// Report literal forms whose permit is off. Parsing continues either way.
    fn check_literal(&mut self, lit: &Lit, span: Span) {
        let permit = match lit.kind {
            LitKind::Imag => Some(PermitId::ImaginaryLiterals),
            LitKind::Rune => Some(PermitId::RuneLiterals),
            LitKind::Date => Some(PermitId::DateLiterals),
            LitKind::String if lit.is_raw_string() => Some(PermitId::RawStrings),
            _ => None,
        };
        if let Some(id) = permit {
            self.gate(id, span);
        }
        if lit.escape_e {
            self.gate(PermitId::EscapeEscapeInStrings, span);
        }
    }

    /// `func(params) results { body }` or, without a body, a function type.
    fn func_lit_or_type(&mut self) -> PResult<Spanned<Expr>> {
        let keyword = self.advance();
        let start = keyword.span.start;
        let mut ty = self.signature()?;
        if !self.check_punct(PunctuationId::LBrace) {
            return Ok(Spanned::new(Expr::Func(ty), self.span_from(start)));
        }
        self.require(PermitId::FuncLiterals, keyword.span)?;
        let mut body = self.with_expr_lev(0, |p| p.block())?;
        if self.permits.is_permit(PermitId::AnonymousParams) {
            let (numbered, count) = walk::number_anonymous_params(&mut ty, body);
            if count > 0 {
                tracing::trace!(count, "numbered anonymous parameters");
            }
            body = numbered;
        }
        Ok(Spanned::new(Expr::FuncLit { ty, body }, self.span_from(start)))
    }
}

/// Turn `<-` applied to a channel type into the receive-only direction, recursing through `chan<-` values.
fn reassociate_recv(ty: &mut Expr, arrow: Span) -> PResult<()> {
    let Expr::Chan { dir, value } = ty else {
        return Ok(());
    };
    match *dir {
        ChanDir::Recv => Err(Diagnostic::syntax("unexpected <-, expected chan", arrow)),
        ChanDir::Both => {
            *dir = ChanDir::Recv;
            Ok(())
        }
        ChanDir::Send => {
            *dir = ChanDir::Recv;
            if matches!(value.node, Expr::Chan { .. }) {
                reassociate_recv(&mut value.node, arrow)
            } else {
                Err(Diagnostic::syntax("expected channel type", value.span))
            }
        }
    }
}
