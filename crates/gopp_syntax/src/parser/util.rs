/// Small shared parsing utilities.
impl<'a> Parser<'a> {
    /// Parse an identifier.
    fn ident(&mut self) -> PResult<Spanned<Ident>> {
        match &self.peek().kind {
            TokenKind::Ident(name) => {
                let name = name.clone();
                let span = self.advance().span;
                Ok(Spanned::new(name, span))
            }
            _ => Err(self.unexpected("name")),
        }
    }

    /// `a, b, c`
    fn ident_list(&mut self) -> PResult<Vec<Spanned<Ident>>> {
        let mut names = vec![self.ident()?];
        while self.match_punct(PunctuationId::Comma) {
            names.push(self.ident()?);
        }
        Ok(names)
    }

    /// Parse a string literal, returning its raw text and span.
    fn string_lit(&mut self, what: &str) -> PResult<(String, Span)> {
        let token = self.peek().clone();
        match &token.kind {
            TokenKind::Literal(lit) if lit.kind == LitKind::String => {
                self.advance();
                self.check_literal(lit, token.span);
                Ok((lit.raw.clone(), token.span))
            }
            _ => Err(self.unexpected(what)),
        }
    }
}

/// Identifier an inferred import binds for `path`: the last segment with every character that cannot appear in an
/// identifier replaced by `_`.
///
/// ```text
/// "strings"          -> strings
/// "golang.org/x/mod" -> mod
/// "gopkg.in/yaml.v3" -> yaml_v3
/// "9fans.net/go"     -> go
/// ```
fn import_alias(path: &str) -> Ident {
    let segment = last_segment(path);
    let mut alias: String = segment
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if alias.is_empty() || alias.starts_with(|c: char| c.is_numeric()) {
        alias.insert(0, '_');
    }
    alias
}
