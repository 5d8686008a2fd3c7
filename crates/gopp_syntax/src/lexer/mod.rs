//! Scanner for gopp source text.
//!
//! Handles tokenization including:
//! - Keywords, identifiers and single-code-point ideographic aliases
//! - Numeric, rune and string literals (including the date and `\e` extensions)
//! - Operators and punctuation (longest match)
//! - Automatic semicolon insertion at newlines and EOF
//! - Comment capture with doc-comment grouping, and `//line` / `//word:` directives
//!
//! ## Module Structure
//!
//! - `tokens` - Token types (TokenKind, Token, Lit)
//! - `numbers` - Numeric literal scanning
//! - `strings` - String, raw string and rune scanning
//! - `comments` - Comment grouping and directive recognition

mod comments;
mod numbers;
mod strings;
pub mod tokens;

use std::collections::BTreeMap;

pub use comments::Directive;
pub use tokens::{Lit, Token, TokenKind, keyword_id};

use crate::ast::{CommentGroup, Span};
use crate::diagnostics::Diagnostic;
use gopp_core::lang::keywords::{self, Ideograph};
use gopp_core::lang::operators::OperatorId;
use gopp_core::lang::punctuation::PunctuationId;

// ============================================================================
// SCANNER STATE
// ----------------------------------------------------------------------------
// Semicolon insertion (simplified):
//
// [token that can end a statement] → insert_semi = true
//                                       ↓
//                                      see '\n' or EOF → emit Semi { implicit }
//                                       ↓
//                                      see '//' → emit Semi, comment scanned next call
//                                       ↓
//                                      any other token → insert_semi = false
// ============================================================================

/// Scanner for gopp source code.
///
/// `Scanner::new` initializes the scanner over one input; [`Scanner::next`] advances one token. Lexical errors,
/// directives and comment groups are buffered on the scanner for the caller to drain.
pub struct Scanner<'a> {
    source: &'a str,
    current_pos: usize,
    line: u32,
    insert_semi: bool,
    last_token_line: u32,

    // Comment grouping
    pending: Vec<comments::PendingComment>,
    lead: Option<CommentGroup>,

    pub(crate) errors: Vec<Diagnostic>,
    pub(crate) directives: Vec<Directive>,
    pub(crate) floating: Vec<CommentGroup>,
}

/// Everything a full scan produces.
#[derive(Debug, Clone, Default)]
pub struct Lexed {
    /// Token stream, always ending with `Eof`.
    pub tokens: Vec<Token>,
    /// Doc-comment candidates keyed by the index of the token they precede.
    pub leads: BTreeMap<usize, CommentGroup>,
    /// Comment groups not adjacent to a following token.
    pub floating: Vec<CommentGroup>,
    pub directives: Vec<Directive>,
    pub errors: Vec<Diagnostic>,
}

impl<'a> Scanner<'a> {
    /// Create a new scanner for the given source code.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            current_pos: 0,
            line: 1,
            insert_semi: false,
            last_token_line: 0,
            pending: Vec::new(),
            lead: None,
            errors: Vec::new(),
            directives: Vec::new(),
            floating: Vec::new(),
        }
    }

    /// Take the doc-comment candidate of the token most recently returned by [`Scanner::next`].
    pub fn take_lead(&mut self) -> Option<CommentGroup> {
        self.lead.take()
    }

    /// Tokenize the entire source code.
    pub fn tokenize(mut self) -> Lexed {
        let mut out = Lexed::default();
        loop {
            let token = self.next();
            if let Some(group) = self.take_lead() {
                out.leads.insert(out.tokens.len(), group);
            }
            let done = matches!(token.kind, TokenKind::Eof);
            out.tokens.push(token);
            if done {
                break;
            }
        }
        out.floating = self.floating;
        out.directives = self.directives;
        out.errors = self.errors;
        out
    }

    // ========================================================================
    // Core character handling
    // ========================================================================

    fn is_at_end(&self) -> bool {
        self.current_pos >= self.source.len()
    }

    fn peek(&self) -> Option<char> {
        self.source[self.current_pos..].chars().next()
    }

    fn peek_next(&self) -> Option<char> {
        let mut iter = self.source[self.current_pos..].chars();
        iter.next();
        iter.next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.current_pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn error(&mut self, message: impl Into<String>, start: usize) {
        let end = self.current_pos.max(start);
        self.errors.push(Diagnostic::lexical(message, Span::new(start, end)));
    }

    // ========================================================================
    // Main scanning dispatch
    // ========================================================================

    /// Advance one token.
    ///
    /// At end of input every call returns `Eof`. Invalid characters are reported and skipped.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Token {
        loop {
            if let Some(semi) = self.skip_trivia() {
                return semi;
            }

            let start = self.current_pos;
            if self.is_at_end() {
                self.flush_pending();
                return Token::new(TokenKind::Eof, Span::new(start, start));
            }
            self.attach_pending(self.line);

            let Some(c) = self.advance() else {
                return Token::new(TokenKind::Eof, Span::new(start, start));
            };

            let mut ideograph = false;
            let kind = match c {
                c if c.is_ascii_alphabetic() || c == '_' => self.scan_identifier(start),
                '0'..='9' => TokenKind::Literal(self.scan_number(start, c)),
                '.' if self.peek().is_some_and(|n| n.is_ascii_digit()) => {
                    TokenKind::Literal(self.scan_number(start, c))
                }
                '"' => TokenKind::Literal(self.scan_string(start)),
                '`' => TokenKind::Literal(self.scan_raw_string(start)),
                '\'' => TokenKind::Literal(self.scan_rune(start)),
                c if !c.is_ascii() => match keywords::ideograph(c) {
                    Some(Ideograph::Keyword(id)) => {
                        ideograph = true;
                        TokenKind::Keyword(id)
                    }
                    Some(Ideograph::Macro(name)) => {
                        ideograph = true;
                        TokenKind::Ident(name.to_string())
                    }
                    None if is_letter(c) => self.scan_identifier(start),
                    None => {
                        self.error(format!("invalid character {c:?} in source"), start);
                        continue;
                    }
                },
                c => match self.scan_operator(c) {
                    Some(kind) => kind,
                    None => {
                        self.error(format!("invalid character {c:?} in source"), start);
                        continue;
                    }
                },
            };

            self.insert_semi = kind.ends_statement();
            self.last_token_line = self.line;
            return Token {
                kind,
                span: Span::new(start, self.current_pos),
                ideograph,
            };
        }
    }

    /// Skip whitespace and comments, returning an inserted semicolon when one is due.
    fn skip_trivia(&mut self) -> Option<Token> {
        loop {
            let pos = self.current_pos;
            match self.peek() {
                None => {
                    if self.insert_semi {
                        self.insert_semi = false;
                        return Some(implicit_semi(pos, pos));
                    }
                    return None;
                }
                Some('\n') => {
                    self.advance();
                    if self.insert_semi {
                        self.insert_semi = false;
                        return Some(implicit_semi(pos, pos + 1));
                    }
                }
                Some(' ' | '\t' | '\r' | '\u{feff}') => {
                    self.advance();
                }
                Some('/') if self.peek_next() == Some('/') => {
                    if self.insert_semi {
                        // The comment runs to end of line: the statement ends here.
                        self.insert_semi = false;
                        return Some(implicit_semi(pos, pos));
                    }
                    self.scan_line_comment();
                }
                Some('/') if self.peek_next() == Some('*') => {
                    let spans_lines = self.scan_block_comment();
                    if spans_lines && self.insert_semi {
                        self.insert_semi = false;
                        return Some(implicit_semi(pos, self.current_pos));
                    }
                }
                Some(_) => return None,
            }
        }
    }

    fn scan_identifier(&mut self, start: usize) -> TokenKind {
        // ASCII fast path
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.advance();
            } else if !c.is_ascii() && (is_letter(c) || c.is_numeric()) && keywords::ideograph(c).is_none() {
                self.advance();
            } else {
                break;
            }
        }
        let text = &self.source[start..self.current_pos];
        match keywords::KEYWORD_TABLE.get(text) {
            Some(id) => TokenKind::Keyword(*id),
            None => TokenKind::Ident(text.to_string()),
        }
    }

    /// Longest-match operator/punctuation scan. `c` is already consumed.
    fn scan_operator(&mut self, c: char) -> Option<TokenKind> {
        use OperatorId as O;
        use PunctuationId as P;

        let op = |id| Some(TokenKind::Operator(id));
        let punct = |id| Some(TokenKind::Punctuation(id));

        match c {
            '(' => punct(P::LParen),
            ')' => punct(P::RParen),
            '[' => punct(P::LBracket),
            ']' => punct(P::RBracket),
            '{' => punct(P::LBrace),
            '}' => punct(P::RBrace),
            ',' => punct(P::Comma),
            ';' => Some(TokenKind::Semi { implicit: false }),
            '.' => {
                if self.peek() == Some('.') && self.peek_next() == Some('.') {
                    self.advance();
                    self.advance();
                    punct(P::Ellipsis)
                } else {
                    punct(P::Dot)
                }
            }
            ':' => {
                if self.match_char('=') {
                    op(O::Define)
                } else {
                    punct(P::Colon)
                }
            }
            '+' => {
                if self.match_char('+') {
                    op(O::Inc)
                } else if self.match_char('=') {
                    op(O::AddAssign)
                } else {
                    op(O::Add)
                }
            }
            '-' => {
                if self.match_char('-') {
                    op(O::Dec)
                } else if self.match_char('=') {
                    op(O::SubAssign)
                } else if self.match_char('>') {
                    punct(P::Arrow)
                } else {
                    op(O::Sub)
                }
            }
            '*' => self.with_assign(O::Mul, O::MulAssign),
            '/' => self.with_assign(O::Quo, O::QuoAssign),
            '%' => self.with_assign(O::Rem, O::RemAssign),
            '^' => self.with_assign(O::Xor, O::XorAssign),
            '&' => {
                if self.match_char('&') {
                    op(O::LogicalAnd)
                } else if self.match_char('^') {
                    self.with_assign(O::AndNot, O::AndNotAssign)
                } else {
                    self.with_assign(O::And, O::AndAssign)
                }
            }
            '|' => {
                if self.match_char('|') {
                    op(O::LogicalOr)
                } else {
                    self.with_assign(O::Or, O::OrAssign)
                }
            }
            '<' => {
                if self.match_char('-') {
                    op(O::Arrow)
                } else if self.match_char('<') {
                    self.with_assign(O::Shl, O::ShlAssign)
                } else {
                    self.with_assign(O::Lss, O::Leq)
                }
            }
            '>' => {
                if self.match_char('>') {
                    self.with_assign(O::Shr, O::ShrAssign)
                } else {
                    self.with_assign(O::Gtr, O::Geq)
                }
            }
            '=' => self.with_assign(O::Assign, O::Eql),
            '!' => self.with_assign(O::Not, O::Neq),
            _ => None,
        }
    }

    /// `plain` or, if followed by `=`, `with_eq`.
    fn with_assign(&mut self, plain: OperatorId, with_eq: OperatorId) -> Option<TokenKind> {
        if self.match_char('=') {
            Some(TokenKind::Operator(with_eq))
        } else {
            Some(TokenKind::Operator(plain))
        }
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }
}

fn implicit_semi(start: usize, end: usize) -> Token {
    Token::new(TokenKind::Semi { implicit: true }, Span::new(start, end))
}

fn is_letter(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

/// Tokenize a whole input.
///
/// ## Notes
/// - Scanning never fails: lexical errors are collected in [`Lexed::errors`] and the stream still ends with `Eof`.
#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn lex(source: &str) -> Lexed {
    Scanner::new(source).tokenize()
}
