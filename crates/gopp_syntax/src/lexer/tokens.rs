//! Token types for the gopp scanner.
//!
//! The scanner uses **registry-backed IDs** for language vocabulary:
//! - `Keyword(KeywordId)` for reserved words (ASCII or ideographic spelling)
//! - `Operator(OperatorId)` for operators; precedence and identity come from the registry
//! - `Punctuation(PunctuationId)` for punctuation tokens
//!
//! ## Notes
//! - ID-bearing tokens avoid stringly-typed checks in the parser.
//! - Use `crate::token_helpers` for ergonomic token matching at call sites.

use std::fmt;

use crate::ast::{LitKind, Span};
use gopp_core::lang::keywords::{self, KeywordId};
use gopp_core::lang::operators::{self, OperatorId};
use gopp_core::lang::punctuation::{self, PunctuationId};

// ============================================================================
// TOKEN TYPES
// ============================================================================

/// A literal as scanned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lit {
    pub kind: LitKind,
    /// Source text with quotes. A `\e` escape is already rewritten to `\x1b`.
    pub raw: String,
    /// The literal used the `\e` escape.
    pub escape_e: bool,
}

impl Lit {
    pub fn is_raw_string(&self) -> bool {
        self.kind == LitKind::String && self.raw.starts_with('`')
    }
}

/// Kind of token produced by the scanner.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // ========== Keyword / operator / punctuation (ID-based) ==========
    Keyword(KeywordId),
    Operator(OperatorId),
    Punctuation(PunctuationId),

    // ========== Identifiers and Literals ==========
    Ident(String),
    Literal(Lit),

    // ========== Terminators ==========
    /// `;`, either written or inserted at a newline.
    Semi {
        implicit: bool,
    },
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Keyword(id) => write!(f, "{}", keywords::as_str(*id)),
            TokenKind::Operator(id) => write!(f, "{}", operators::as_str(*id)),
            TokenKind::Punctuation(id) => write!(f, "{}", punctuation::as_str(*id)),
            TokenKind::Ident(name) => write!(f, "name {name}"),
            TokenKind::Literal(lit) => write!(f, "literal {}", lit.raw),
            TokenKind::Semi { implicit: true } => write!(f, "newline"),
            TokenKind::Semi { implicit: false } => write!(f, ";"),
            TokenKind::Eof => write!(f, "EOF"),
        }
    }
}

/// A token with its kind and source span.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// Spelled with a single-code-point alias.
    pub ideograph: bool,
}

impl Token {
    /// Construct a new token.
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self {
            kind,
            span,
            ideograph: false,
        }
    }
}

/// Resolve an identifier spelling to a keyword id, if reserved.
pub fn keyword_id(name: &str) -> Option<KeywordId> {
    keywords::from_str(name)
}
