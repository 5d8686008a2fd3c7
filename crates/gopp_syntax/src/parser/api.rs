/// Fragment entry points.
///
/// Whole inputs go through [`crate::api::parse_bytes`]. These parse one expression, statement, declaration or type
/// from a string, under the same options, for tools and tests that work below file level.
///
/// ## Errors
/// The first diagnostic, including scanner errors and trailing input. With an error handler installed, only the
/// error that stopped the fragment is returned; the rest went to the handler.

/// Parse one expression. A comma-separated list yields [`Expr::List`].
#[tracing::instrument(skip_all, fields(len = source.len()))]
pub fn parse_expression(source: &str, options: ParseOptions) -> Result<Spanned<Expr>, Diagnostic> {
    with_parser(source, options, "expression", |p| {
        let mut list = p.expr_list()?;
        if list.len() == 1 {
            if let Some(only) = list.pop() {
                return Ok(only);
            }
        }
        let span = list
            .iter()
            .map(|x| x.span)
            .reduce(Span::merge)
            .unwrap_or_default();
        Ok(Spanned::new(Expr::List(list), span))
    })
}

/// Parse one statement, including statement macros.
#[tracing::instrument(skip_all, fields(len = source.len()))]
pub fn parse_statement(source: &str, options: ParseOptions) -> Result<Spanned<Stmt>, Diagnostic> {
    with_parser(source, options, "statement", |p| p.stmt())
}

/// Parse one package-level declaration. A parenthesized group yields one entry per spec.
#[tracing::instrument(skip_all, fields(len = source.len()))]
pub fn parse_declaration(source: &str, options: ParseOptions) -> Result<Vec<Spanned<Decl>>, Diagnostic> {
    with_parser(source, options, "declaration", |p| p.top_level_decl())
}

/// Parse one type.
#[tracing::instrument(skip_all, fields(len = source.len()))]
pub fn parse_type(source: &str, options: ParseOptions) -> Result<Spanned<Expr>, Diagnostic> {
    with_parser(source, options, "type", |p| p.type_())
}

fn with_parser<T>(
    source: &str,
    options: ParseOptions,
    what: &str,
    f: impl FnOnce(&mut Parser<'_>) -> PResult<T>,
) -> Result<T, Diagnostic> {
    let mut session = Session::new(options);
    let result = {
        let mut parser = Parser::new(&mut session, "<input>", source);
        parser.in_section = true;
        parser.skip_semis();
        let result = f(&mut parser).and_then(|value| {
            parser.skip_semis();
            if parser.is_at_end() {
                Ok(value)
            } else {
                Err(Diagnostic::syntax(
                    format!("unexpected {} after {what}", parser.peek().kind),
                    parser.current_span(),
                ))
            }
        });
        parser.flush_lex_errors(usize::MAX);
        result.map_err(|diag| {
            let diag = if diag.position.is_valid() {
                diag
            } else {
                let position = parser.position_of(diag.span.start);
                diag.at(position)
            };
            parser.report(diag.clone());
            diag
        })
    };

    match result {
        Ok(value) if session.sink.has_handler() => Ok(value),
        Ok(value) => match session.sink.take_first() {
            Some(first) => Err(first),
            None => Ok(value),
        },
        Err(diag) if session.sink.has_handler() => Err(diag),
        Err(diag) => Err(session.sink.take_first().unwrap_or(diag)),
    }
}
