/// Token-stream helpers and error recovery.
///
/// This chunk contains the low-level primitives used throughout parsing:
/// - Peeking/consuming tokens (`peek`, `peek_nth`, `advance`)
/// - Matching / expecting keywords, operators, and punctuation
/// - Statement terminators (`at_semi`, `expect_semi`)
/// - Error recovery (`sync_stmt`)
///
/// Most functions in this file are internal (`fn`) and are documented primarily
/// to aid maintenance and onboarding.
impl<'a> Parser<'a> {
    // ========================================================================
    // Helpers
    // ========================================================================

    /// Return `true` if the current token is [`TokenKind::Eof`].
    fn is_at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    /// Return the current token without consuming it.
    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    /// Return the token `n` positions ahead (`peek_nth(0) == peek()`), clamped to `Eof`.
    fn peek_nth(&self, n: usize) -> &Token {
        &self.tokens[(self.pos + n).min(self.tokens.len() - 1)]
    }

    /// Advance to the next token and return the token we just consumed.
    ///
    /// Lexical errors inside the consumed token are reported here, as is an ideographic spelling used while
    /// `ideographs` is off.
    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !self.is_at_end() {
            self.pos += 1;
        }
        let next_start = self.peek().span.start;
        self.flush_lex_errors(next_start.max(token.span.end));
        if token.ideograph {
            self.gate(PermitId::Ideographs, token.span);
        }
        token
    }

    fn check_keyword(&self, id: KeywordId) -> bool {
        self.peek().kind.is_keyword(id)
    }

    fn check_punct(&self, id: PunctuationId) -> bool {
        self.peek().kind.is_punctuation(id)
    }

    fn check_op(&self, id: OperatorId) -> bool {
        self.peek().kind.is_operator(id)
    }

    fn match_keyword(&mut self, id: KeywordId) -> bool {
        if self.check_keyword(id) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn match_punct(&mut self, id: PunctuationId) -> bool {
        if self.check_punct(id) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn match_op(&mut self, id: OperatorId) -> bool {
        if self.check_op(id) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// `unexpected <current token>, expected <what>`
    fn unexpected(&self, what: &str) -> Diagnostic {
        Diagnostic::syntax(
            format!("unexpected {}, expected {what}", self.peek().kind),
            self.current_span(),
        )
    }

    fn expect_keyword(&mut self, id: KeywordId) -> PResult<Span> {
        if self.check_keyword(id) {
            Ok(self.advance().span)
        } else {
            Err(self.unexpected(gopp_core::lang::keywords::as_str(id)))
        }
    }

    fn expect_punct(&mut self, id: PunctuationId) -> PResult<Span> {
        if self.check_punct(id) {
            Ok(self.advance().span)
        } else {
            Err(self.unexpected(gopp_core::lang::punctuation::as_str(id)))
        }
    }

    /// Return `true` at a statement terminator (`;` or an inserted newline).
    fn at_semi(&self) -> bool {
        self.peek().kind.is_semi()
    }

    fn skip_semis(&mut self) {
        while self.at_semi() {
            self.advance();
        }
    }

    /// Require a terminator after a declaration or directive. `)` and `}` close the construct and need none.
    fn expect_semi(&mut self, after: &str) -> PResult<()> {
        if self.at_semi() {
            self.advance();
            Ok(())
        } else if self.is_at_end() || self.check_punct(PunctuationId::RParen) || self.check_punct(PunctuationId::RBrace)
        {
            Ok(())
        } else {
            Err(Diagnostic::syntax(
                format!("unexpected {} {after}", self.peek().kind),
                self.current_span(),
            ))
        }
    }

    /// Skip to the next statement boundary.
    ///
    /// Stops after a `;` or before a `}` at nesting depth zero, or before a statement keyword once at least one token
    /// was skipped. At file scope `func`, `import` and `package` are boundaries too, and a stray `}` is skipped.
    fn sync_stmt(&mut self, top_level: bool) {
        let start = self.pos;
        let mut depth = 0usize;
        loop {
            match &self.peek().kind {
                TokenKind::Eof => return,
                TokenKind::Punctuation(PunctuationId::LBrace) => depth += 1,
                TokenKind::Punctuation(PunctuationId::RBrace) => {
                    if depth == 0 {
                        if top_level && self.pos == start {
                            self.advance();
                        }
                        return;
                    }
                    depth -= 1;
                }
                TokenKind::Semi { .. } if depth == 0 => {
                    self.advance();
                    return;
                }
                TokenKind::Keyword(id) if depth == 0 && self.pos > start && is_sync_keyword(*id, top_level) => {
                    return;
                }
                _ => {}
            }
            self.advance();
        }
    }

    fn current_span(&self) -> Span {
        self.peek().span
    }

    /// End offset of the most recently consumed token.
    fn prev_end(&self) -> usize {
        match self.pos.checked_sub(1) {
            Some(prev) => self.tokens[prev].span.end,
            None => self.current_span().start,
        }
    }

    /// Span from `start` to the end of the most recently consumed token.
    fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.prev_end().max(start))
    }

    /// Take the doc-comment candidate of the current token.
    fn take_lead(&mut self) -> Option<Box<CommentGroup>> {
        self.leads.remove(&self.pos).map(Box::new)
    }
}

fn is_sync_keyword(id: KeywordId, top_level: bool) -> bool {
    match id {
        KeywordId::Break
        | KeywordId::Const
        | KeywordId::Continue
        | KeywordId::Defer
        | KeywordId::Fallthrough
        | KeywordId::For
        | KeywordId::Go
        | KeywordId::Goto
        | KeywordId::If
        | KeywordId::Return
        | KeywordId::Select
        | KeywordId::Switch
        | KeywordId::Type
        | KeywordId::Var
        | KeywordId::Case
        | KeywordId::Default => true,
        KeywordId::Func | KeywordId::Import | KeywordId::Package => top_level,
        _ => false,
    }
}
