/// Declaration parsing methods.
///
/// This chunk parses `import`, `const`, `var`, `type` and `func` declarations. The first four share
/// [`Parser::decl_group`], which handles both the single form and the parenthesized group form; the same entry point
/// serves local declarations inside function bodies.
///
/// ## Notes
/// - Every spec of one parenthesized group carries the same [`DeclGroup`], fresh per group across the whole parse.
/// - Package-scope bookkeeping (bound names, argument imports, entry points) happens in `structure.rs` once a
///   declaration is accepted.
impl<'a> Parser<'a> {
    // ========================================================================
    // Declarations
    // ========================================================================

    /// Parse a package-level declaration.
    fn top_level_decl(&mut self) -> PResult<Vec<Spanned<Decl>>> {
        match self.peek().kind.keyword_id() {
            Some(KeywordId::Func) => Ok(vec![self.func_decl()?]),
            Some(id) => self.keyword_decl(id),
            None => Err(self.unexpected("declaration")),
        }
    }

    /// `import`, `const`, `var` or `type` declaration, single or grouped.
    fn keyword_decl(&mut self, id: KeywordId) -> PResult<Vec<Spanned<Decl>>> {
        match id {
            KeywordId::Import => self.decl_group(PermitId::Imports, Self::import_spec),
            KeywordId::Const => self.decl_group(PermitId::ConstDecls, Self::const_spec),
            KeywordId::Var => self.decl_group(PermitId::VarDecls, Self::var_spec),
            KeywordId::Type => self.decl_group(PermitId::TypeDecls, Self::type_spec),
            _ => Err(self.unexpected("declaration")),
        }
    }

    /// `keyword spec` or `keyword ( spec; spec; ... )`.
    fn decl_group(
        &mut self,
        permit: PermitId,
        spec: fn(&mut Self, Option<DeclGroup>) -> PResult<Decl>,
    ) -> PResult<Vec<Spanned<Decl>>> {
        let lead = self.take_lead();
        let keyword = self.advance();
        self.require(permit, keyword.span)?;

        if !self.match_punct(PunctuationId::LParen) {
            let node = spec(self, None)?;
            let mut decl = Spanned::new(node, self.span_from(keyword.span.start));
            decl.comments = lead;
            return Ok(vec![decl]);
        }

        let group = Some(DeclGroup(self.session.next_group()));
        let mut decls = Vec::new();
        loop {
            self.skip_semis();
            if self.check_punct(PunctuationId::RParen) || self.is_at_end() {
                break;
            }
            let spec_lead = self.take_lead();
            let start = self.current_span().start;
            let node = spec(self, group)?;
            let mut decl = Spanned::new(node, self.span_from(start));
            decl.comments = spec_lead;
            decls.push(decl);
            self.expect_semi("in declaration list")?;
        }
        self.expect_punct(PunctuationId::RParen)?;

        if let Some(first) = decls.first_mut() {
            if first.comments.is_none() {
                first.comments = lead;
            }
        }
        Ok(decls)
    }

    /// `[alias | .] "path" [(TypeArgs)]`
    fn import_spec(&mut self, group: Option<DeclGroup>) -> PResult<Decl> {
        let alias = match &self.peek().kind {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance();
                Some(name)
            }
            TokenKind::Punctuation(PunctuationId::Dot) => {
                self.advance();
                Some(".".to_string())
            }
            _ => None,
        };
        let (raw, span) = self.string_lit("import path")?;
        let path = unquote(&raw);
        if path.is_empty() {
            return Err(Diagnostic::syntax("invalid import path", span));
        }

        let mut args = Vec::new();
        if self.check_punct(PunctuationId::LParen) {
            self.require(PermitId::Generics, self.current_span())?;
            self.advance();
            while !self.check_punct(PunctuationId::RParen) && !self.is_at_end() {
                args.push(self.type_()?);
                if !self.match_punct(PunctuationId::Comma) {
                    break;
                }
            }
            self.expect_punct(PunctuationId::RParen)?;
            if args.is_empty() {
                return Err(Diagnostic::syntax("empty type argument list", self.span_from(span.start)));
            }
        }

        Ok(Decl::Import(ImportSpec {
            alias,
            path,
            args,
            group,
        }))
    }

    fn const_spec(&mut self, group: Option<DeclGroup>) -> PResult<Decl> {
        Ok(Decl::Const(self.value_spec(group, true)?))
    }

    fn var_spec(&mut self, group: Option<DeclGroup>) -> PResult<Decl> {
        Ok(Decl::Var(self.value_spec(group, false)?))
    }

    /// `a, b [T] [= x, y]`
    ///
    /// Constants inside a group may omit both type and values (implicit repetition of the previous spec).
    fn value_spec(&mut self, group: Option<DeclGroup>, constant: bool) -> PResult<ValueSpec> {
        let names = self.ident_list()?;
        let ty = if self.check_op(OperatorId::Assign) || self.at_stmt_end() {
            None
        } else {
            Some(self.type_()?)
        };
        let values = if self.match_op(OperatorId::Assign) {
            self.expr_list()?
        } else {
            Vec::new()
        };
        if values.is_empty() {
            if ty.is_none() && !(constant && group.is_some()) {
                return Err(self.unexpected("type"));
            }
            if constant && ty.is_some() {
                return Err(Diagnostic::syntax("missing init expr for const declaration", self.current_span()));
            }
        }
        Ok(ValueSpec {
            names,
            ty,
            values,
            group,
        })
    }

    /// `Name T` or `Name = T`.
    fn type_spec(&mut self, group: Option<DeclGroup>) -> PResult<Decl> {
        let name = self.ident()?;
        let alias = self.match_op(OperatorId::Assign);
        let ty = self.type_()?;
        Ok(Decl::Type(TypeSpec { name, alias, ty, group }))
    }

    /// `func [(recv)] Name(params) [results] [{ body }]`
    fn func_decl(&mut self) -> PResult<Spanned<Decl>> {
        let lead = self.take_lead();
        let keyword = self.advance();
        self.require(PermitId::FuncDecls, keyword.span)?;

        let recv = if self.check_punct(PunctuationId::LParen) {
            let span = self.current_span();
            self.require(PermitId::Methods, span)?;
            let mut fields = self.parameters()?;
            let span = self.span_from(span.start);
            if fields.is_empty() {
                return Err(Diagnostic::syntax("method has no receiver", span));
            }
            if fields.len() > 1 || fields[0].names.len() > 1 {
                return Err(Diagnostic::syntax("method has multiple receivers", span));
            }
            fields.pop()
        } else {
            None
        };

        let name = self.ident()?;
        let ty = self.signature()?;
        let body = if self.check_punct(PunctuationId::LBrace) {
            Some(self.with_expr_lev(0, |p| p.block())?)
        } else {
            None
        };

        let mut decl = Spanned::new(
            Decl::Func(FuncDecl { recv, name, ty, body }),
            self.span_from(keyword.span.start),
        );
        decl.comments = lead;
        Ok(decl)
    }

    /// `true` at `func Name` or `func (recv) Name(`, as opposed to a function literal.
    fn at_func_decl(&self) -> bool {
        if !self.check_keyword(KeywordId::Func) {
            return false;
        }
        match &self.peek_nth(1).kind {
            TokenKind::Ident(_) => true,
            TokenKind::Punctuation(PunctuationId::LParen) => {
                let mut depth = 0usize;
                let mut n = 1;
                loop {
                    match &self.peek_nth(n).kind {
                        TokenKind::Punctuation(PunctuationId::LParen) => depth += 1,
                        TokenKind::Punctuation(PunctuationId::RParen) => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        TokenKind::Eof => return false,
                        _ => {}
                    }
                    n += 1;
                }
                matches!(self.peek_nth(n + 1).kind, TokenKind::Ident(_))
                    && self.peek_nth(n + 2).kind.is_punctuation(PunctuationId::LParen)
            }
            _ => false,
        }
    }
}
