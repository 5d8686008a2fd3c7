/// Type parsing methods.
///
/// Types are ordinary [`Expr`] nodes (`Name`, `Selector`, `Array`, `Map`, `Chan`, `Func`, `Struct`, `Interface`,
/// `Star`). This chunk parses them in type position, plus parameter lists and function signatures.
impl<'a> Parser<'a> {
    // ========================================================================
    // Types
    // ========================================================================

    /// Parse a type, failing when none starts here.
    fn type_(&mut self) -> PResult<Spanned<Expr>> {
        match self.nested(Self::type_or_nil)? {
            Some(ty) => Ok(ty),
            None => Err(self.unexpected("type")),
        }
    }

    /// Parse a type if the current token can start one.
    fn type_or_nil(&mut self) -> PResult<Option<Spanned<Expr>>> {
        let token = self.peek().clone();
        let start = token.span.start;
        let node = match &token.kind {
            TokenKind::Ident(name) => {
                self.advance();
                let mut ty = Spanned::new(Expr::name(name.clone()), token.span);
                if self.match_punct(PunctuationId::Dot) {
                    let sel = self.ident()?;
                    ty = Spanned::new(Expr::Selector { x: Box::new(ty), sel }, self.span_from(start));
                }
                return Ok(Some(ty));
            }
            TokenKind::Punctuation(PunctuationId::LParen) => {
                self.advance();
                let inner = self.type_()?;
                self.expect_punct(PunctuationId::RParen)?;
                Expr::Paren(Box::new(inner))
            }
            TokenKind::Punctuation(PunctuationId::LBracket) => self.array_type()?,
            TokenKind::Operator(OperatorId::Mul) => {
                self.advance();
                self.require(PermitId::Pointers, token.span)?;
                Expr::Star(Box::new(self.type_()?))
            }
            TokenKind::Operator(OperatorId::Arrow) => {
                self.advance();
                self.require(PermitId::Channels, token.span)?;
                self.expect_keyword(KeywordId::Chan)?;
                Expr::Chan {
                    dir: ChanDir::Recv,
                    value: Box::new(self.type_()?),
                }
            }
            TokenKind::Keyword(KeywordId::Chan) => {
                self.advance();
                self.require(PermitId::Channels, token.span)?;
                let dir = if self.match_op(OperatorId::Arrow) {
                    ChanDir::Send
                } else {
                    ChanDir::Both
                };
                Expr::Chan {
                    dir,
                    value: Box::new(self.type_()?),
                }
            }
            TokenKind::Keyword(KeywordId::Func) => {
                self.advance();
                Expr::Func(self.signature()?)
            }
            TokenKind::Keyword(KeywordId::Map) => {
                self.advance();
                self.require(PermitId::MapTypes, token.span)?;
                self.expect_punct(PunctuationId::LBracket)?;
                let key = self.type_()?;
                self.expect_punct(PunctuationId::RBracket)?;
                let value = self.type_()?;
                Expr::Map {
                    key: Box::new(key),
                    value: Box::new(value),
                }
            }
            TokenKind::Keyword(KeywordId::Struct) => self.struct_type()?,
            TokenKind::Keyword(KeywordId::Interface) => self.interface_type()?,
            _ => return Ok(None),
        };
        Ok(Some(Spanned::new(node, self.span_from(start))))
    }

    /// `[]T`, `[N]T` or `[...]T`.
    fn array_type(&mut self) -> PResult<Expr> {
        self.advance();
        let len = if self.match_punct(PunctuationId::RBracket) {
            None
        } else {
            let len = if self.check_punct(PunctuationId::Ellipsis) {
                let span = self.advance().span;
                Spanned::new(Expr::Ellipsis(None), span)
            } else {
                let lev = self.expr_lev + 1;
                self.with_expr_lev(lev, |p| p.expr())?
            };
            self.expect_punct(PunctuationId::RBracket)?;
            Some(Box::new(len))
        };
        let elem = self.type_()?;
        Ok(Expr::Array {
            len,
            elem: Box::new(elem),
        })
    }

    /// `struct { a, b T "tag"; Embedded; *pkg.Embedded }`
    fn struct_type(&mut self) -> PResult<Expr> {
        let keyword = self.advance();
        self.require(PermitId::StructTypes, keyword.span)?;
        self.expect_punct(PunctuationId::LBrace)?;
        let mut fields = Vec::new();
        loop {
            self.skip_semis();
            if self.check_punct(PunctuationId::RBrace) || self.is_at_end() {
                break;
            }
            fields.push(self.field_decl()?);
            self.expect_semi("in struct type")?;
        }
        self.expect_punct(PunctuationId::RBrace)?;
        Ok(Expr::Struct(fields))
    }

    fn field_decl(&mut self) -> PResult<Field> {
        let embedded = match &self.peek().kind {
            TokenKind::Ident(_) => matches!(
                self.peek_nth(1).kind,
                TokenKind::Punctuation(PunctuationId::Dot | PunctuationId::RBrace)
                    | TokenKind::Semi { .. }
                    | TokenKind::Literal(_)
                    | TokenKind::Eof
            ),
            TokenKind::Operator(OperatorId::Mul) => true,
            _ => false,
        };
        let names = if embedded { Vec::new() } else { self.ident_list()? };
        let ty = self.type_()?;
        let tag = match &self.peek().kind {
            TokenKind::Literal(lit) if lit.kind == LitKind::String => {
                let raw = lit.raw.clone();
                self.advance();
                Some(raw)
            }
            _ => None,
        };
        Ok(Field { names, ty, tag })
    }

    /// `interface { Method(params) results; Embedded }`
    fn interface_type(&mut self) -> PResult<Expr> {
        let keyword = self.advance();
        self.require(PermitId::InterfaceTypes, keyword.span)?;
        self.expect_punct(PunctuationId::LBrace)?;
        let mut methods = Vec::new();
        loop {
            self.skip_semis();
            if self.check_punct(PunctuationId::RBrace) || self.is_at_end() {
                break;
            }
            let is_method = matches!(self.peek().kind, TokenKind::Ident(_))
                && self.peek_nth(1).kind.is_punctuation(PunctuationId::LParen);
            let field = if is_method {
                let name = self.ident()?;
                let start = name.span.start;
                let sig = self.signature()?;
                Field {
                    names: vec![name],
                    ty: Spanned::new(Expr::Func(sig), self.span_from(start)),
                    tag: None,
                }
            } else {
                Field {
                    names: Vec::new(),
                    ty: self.type_()?,
                    tag: None,
                }
            };
            methods.push(field);
            self.expect_semi("in interface type")?;
        }
        self.expect_punct(PunctuationId::RBrace)?;
        Ok(Expr::Interface(methods))
    }

    // ========================================================================
    // Signatures
    // ========================================================================

    /// `(params) [results]`
    fn signature(&mut self) -> PResult<FuncType> {
        let params = self.parameters()?;
        let results = if self.check_punct(PunctuationId::LParen) {
            self.parameters()?
        } else {
            match self.nested(Self::type_or_nil)? {
                Some(ty) => vec![Field {
                    names: Vec::new(),
                    ty,
                    tag: None,
                }],
                None => Vec::new(),
            }
        };
        Ok(FuncType { params, results })
    }

    /// `(a, b int, c string)`, `(int, string)` or `(xs ...T)`.
    ///
    /// Names are grouped onto the type that follows them; a list is either fully named or fully anonymous.
    fn parameters(&mut self) -> PResult<Vec<Field>> {
        self.expect_punct(PunctuationId::LParen)?;
        let mut entries = Vec::new();
        while !self.check_punct(PunctuationId::RParen) && !self.is_at_end() {
            entries.push(self.param_entry()?);
            if !self.match_punct(PunctuationId::Comma) {
                break;
            }
        }
        self.expect_punct(PunctuationId::RParen)?;
        group_params(entries)
    }

    fn param_entry(&mut self) -> PResult<ParamEntry> {
        if matches!(self.peek().kind, TokenKind::Ident(_)) {
            let lone = matches!(
                self.peek_nth(1).kind,
                TokenKind::Punctuation(PunctuationId::Comma | PunctuationId::RParen | PunctuationId::Dot)
            );
            if !lone {
                let name = self.ident()?;
                let ty = self.param_type()?;
                return Ok(ParamEntry::Named(name, ty));
            }
        }
        Ok(ParamEntry::Bare(self.param_type()?))
    }

    fn param_type(&mut self) -> PResult<Spanned<Expr>> {
        if self.check_punct(PunctuationId::Ellipsis) {
            let span = self.advance().span;
            self.require(PermitId::Variadics, span)?;
            let elem = self.type_()?;
            return Ok(Spanned::new(
                Expr::Ellipsis(Some(Box::new(elem))),
                self.span_from(span.start),
            ));
        }
        self.type_()
    }
}

/// One comma-separated entry of a parameter list before grouping.
enum ParamEntry {
    Named(Spanned<Ident>, Spanned<Expr>),
    Bare(Spanned<Expr>),
}

fn group_params(entries: Vec<ParamEntry>) -> PResult<Vec<Field>> {
    if entries.iter().all(|e| matches!(e, ParamEntry::Bare(_))) {
        return Ok(entries
            .into_iter()
            .filter_map(|e| match e {
                ParamEntry::Bare(ty) => Some(Field {
                    names: Vec::new(),
                    ty,
                    tag: None,
                }),
                ParamEntry::Named(..) => None,
            })
            .collect());
    }

    let mut fields = Vec::new();
    let mut pending: Vec<Spanned<Ident>> = Vec::new();
    for entry in entries {
        match entry {
            ParamEntry::Bare(ty) => match ty.node {
                Expr::Name(name) => pending.push(Spanned::new(name, ty.span)),
                _ => return Err(Diagnostic::syntax("mixed named and unnamed parameters", ty.span)),
            },
            ParamEntry::Named(name, ty) => {
                pending.push(name);
                fields.push(Field {
                    names: std::mem::take(&mut pending),
                    ty,
                    tag: None,
                });
            }
        }
    }
    if let Some(last) = pending.last() {
        return Err(Diagnostic::syntax("mixed named and unnamed parameters", last.span));
    }
    Ok(fields)
}
