//! Punctuation vocabulary.
//!
//! This module defines the canonical set of non-operator punctuation tokens used by the scanner/parser: delimiters,
//! separators and a few structural markers.
//!
//! ## Notes
//! - `;` is not listed here: statement terminators are a dedicated token kind because most of them are inserted
//!   automatically by the scanner.
//! - `->` only appears in `use "name" (args) -> rets` directives.
//!
//! ## Examples
//! ```rust
//! use gopp_core::lang::punctuation::{self, PunctuationId};
//!
//! assert_eq!(punctuation::from_str("..."), Some(PunctuationId::Ellipsis));
//! assert_eq!(punctuation::as_str(PunctuationId::LBrace), "{");
//! ```

use super::registry::Origin;

/// Broad syntactic grouping for punctuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PunctuationCategory {
    /// Brackets and braces.
    Delimiter,
    /// Separators like `,` and `:`.
    Separator,
    /// Access markers like `.`.
    Access,
    /// Misc markers like `...` and `->`.
    Marker,
}

/// Stable identifier for punctuation tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PunctuationId {
    Comma,
    Colon,
    Dot,
    Ellipsis,
    Arrow,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
}

/// Metadata for a punctuation token.
#[derive(Debug, Clone, Copy)]
pub struct PunctuationInfo {
    pub id: PunctuationId,
    pub canonical: &'static str,
    pub category: PunctuationCategory,
    /// A newline after this token inserts an automatic semicolon.
    pub ends_statement: bool,
    pub origin: Origin,
}

/// Registry of all punctuation.
pub const PUNCTUATION: &[PunctuationInfo] = &[
    info(PunctuationId::Comma, ",", PunctuationCategory::Separator, false, Origin::Go),
    info(PunctuationId::Colon, ":", PunctuationCategory::Separator, false, Origin::Go),
    info(PunctuationId::Dot, ".", PunctuationCategory::Access, false, Origin::Go),
    info(PunctuationId::Ellipsis, "...", PunctuationCategory::Marker, false, Origin::Go),
    info(PunctuationId::Arrow, "->", PunctuationCategory::Marker, false, Origin::Gopp),
    info(PunctuationId::LParen, "(", PunctuationCategory::Delimiter, false, Origin::Go),
    info(PunctuationId::RParen, ")", PunctuationCategory::Delimiter, true, Origin::Go),
    info(PunctuationId::LBracket, "[", PunctuationCategory::Delimiter, false, Origin::Go),
    info(PunctuationId::RBracket, "]", PunctuationCategory::Delimiter, true, Origin::Go),
    info(PunctuationId::LBrace, "{", PunctuationCategory::Delimiter, false, Origin::Go),
    info(PunctuationId::RBrace, "}", PunctuationCategory::Delimiter, true, Origin::Go),
];

/// Return the canonical spelling for a punctuation token.
pub fn as_str(id: PunctuationId) -> &'static str {
    info_for(id).canonical
}

/// Return the category for a punctuation token.
pub fn category(id: PunctuationId) -> PunctuationCategory {
    info_for(id).category
}

/// Return the full metadata entry for a punctuation token.
///
/// ## Panics
/// - If the registry is missing an entry for `id` (this indicates a programming error).
pub fn info_for(id: PunctuationId) -> &'static PunctuationInfo {
    PUNCTUATION
        .iter()
        .find(|p| p.id == id)
        .expect("punctuation info missing")
}

/// Resolve a punctuation spelling to its identifier.
pub fn from_str(s: &str) -> Option<PunctuationId> {
    PUNCTUATION.iter().find(|p| p.canonical == s).map(|p| p.id)
}

const fn info(
    id: PunctuationId,
    canonical: &'static str,
    category: PunctuationCategory,
    ends_statement: bool,
    origin: Origin,
) -> PunctuationInfo {
    PunctuationInfo {
        id,
        canonical,
        category,
        ends_statement,
        origin,
    }
}
