//! Define the reserved keyword vocabulary for gopp.
//!
//! This module is the single source of truth for reserved words: a stable identifier ([`KeywordId`]) plus a const
//! metadata table ([`KEYWORDS`]) that records canonical spellings, ideographic aliases and categories.
//!
//! ## Notes
//! - Lookup via [`from_str`] is **case-sensitive** and backed by a perfect-hash table ([`KEYWORD_TABLE`]).
//! - Aliases are single code points (“ideographs”). The scanner treats every ideograph as a self-delimiting token,
//!   so `如x>0{` scans as `if x > 0 {`.
//! - Some ideographs are not keywords but macro triggers; see [`ideograph`].
//! - Structural words of the superset (`project`, `section`, `use`, `include`, ...) are *contextual*: they are
//!   identifiers to the scanner so that plain Go sources keep using them as names.
//!
//! ## Examples
//! ```rust
//! use gopp_core::lang::keywords::{self, KeywordId};
//!
//! assert_eq!(keywords::from_str("if"), Some(KeywordId::If));
//! assert_eq!(keywords::from_str("如"), Some(KeywordId::If));
//! assert_eq!(keywords::as_str(KeywordId::If), "if");
//! ```

use super::registry::{Origin, Stability};

/// Stable identifier for every reserved keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordId {
    // Declarations
    Package,
    Import,
    Const,
    Var,
    Type,
    Func,

    // Type constructors
    Chan,
    Interface,
    Map,
    Struct,

    // Control flow
    If,
    Else,
    For,
    Range,
    Switch,
    Case,
    Default,
    Select,
    Go,
    Defer,
    Return,
    Break,
    Continue,
    Goto,
    Fallthrough,
}

/// High-level grouping for documentation and tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordCategory {
    Declaration,
    TypeConstructor,
    ControlFlow,
}

/// Metadata for a keyword.
///
/// ## Notes
/// - `canonical` is the spelling emitted to the base language.
/// - `aliases` are the ideographic spellings accepted by the scanner (gated by the `ideographs` permit).
/// - `ends_statement` marks keywords after which a newline inserts an automatic semicolon.
#[derive(Debug, Clone, Copy)]
pub struct KeywordInfo {
    pub id: KeywordId,
    pub canonical: &'static str,
    pub aliases: &'static [&'static str],
    pub category: KeywordCategory,
    pub ends_statement: bool,
    pub origin: Origin,
    pub stability: Stability,
}

/// Registry of all keywords.
pub const KEYWORDS: &[KeywordInfo] = &[
    // Declarations
    info(KeywordId::Package, "package", &["包"], KeywordCategory::Declaration, false),
    info(KeywordId::Import, "import", &["导"], KeywordCategory::Declaration, false),
    info(KeywordId::Const, "const", &["常"], KeywordCategory::Declaration, false),
    info(KeywordId::Var, "var", &["变"], KeywordCategory::Declaration, false),
    info(KeywordId::Type, "type", &["类"], KeywordCategory::Declaration, false),
    info(KeywordId::Func, "func", &["函"], KeywordCategory::Declaration, false),
    // Type constructors
    info(KeywordId::Chan, "chan", &["道"], KeywordCategory::TypeConstructor, false),
    info(KeywordId::Interface, "interface", &["接"], KeywordCategory::TypeConstructor, false),
    info(KeywordId::Map, "map", &["映"], KeywordCategory::TypeConstructor, false),
    info(KeywordId::Struct, "struct", &["构"], KeywordCategory::TypeConstructor, false),
    // Control flow
    info(KeywordId::If, "if", &["如"], KeywordCategory::ControlFlow, false),
    info(KeywordId::Else, "else", &["否"], KeywordCategory::ControlFlow, false),
    info(KeywordId::For, "for", &["循"], KeywordCategory::ControlFlow, false),
    info(KeywordId::Range, "range", &["历"], KeywordCategory::ControlFlow, false),
    info(KeywordId::Switch, "switch", &["分"], KeywordCategory::ControlFlow, false),
    info(KeywordId::Case, "case", &["例"], KeywordCategory::ControlFlow, false),
    info(KeywordId::Default, "default", &["默"], KeywordCategory::ControlFlow, false),
    info(KeywordId::Select, "select", &["择"], KeywordCategory::ControlFlow, false),
    info(KeywordId::Go, "go", &["启"], KeywordCategory::ControlFlow, false),
    info(KeywordId::Defer, "defer", &["延"], KeywordCategory::ControlFlow, false),
    info(KeywordId::Return, "return", &["返"], KeywordCategory::ControlFlow, true),
    info(KeywordId::Break, "break", &["断"], KeywordCategory::ControlFlow, true),
    info(KeywordId::Continue, "continue", &["续"], KeywordCategory::ControlFlow, true),
    info(KeywordId::Goto, "goto", &["跳"], KeywordCategory::ControlFlow, false),
    info(KeywordId::Fallthrough, "fallthrough", &["穿"], KeywordCategory::ControlFlow, true),
];

/// Perfect-hash lookup table from spelling (canonical or alias) to keyword id.
///
/// The duplication between [`KEYWORDS`] and this table is intentional: the const table carries metadata, this one
/// gives the scanner O(1) lookup with no runtime initialization. The registry guardrail tests keep them in sync.
pub static KEYWORD_TABLE: phf::Map<&'static str, KeywordId> = phf::phf_map! {
    "package" => KeywordId::Package,
    "import" => KeywordId::Import,
    "const" => KeywordId::Const,
    "var" => KeywordId::Var,
    "type" => KeywordId::Type,
    "func" => KeywordId::Func,
    "chan" => KeywordId::Chan,
    "interface" => KeywordId::Interface,
    "map" => KeywordId::Map,
    "struct" => KeywordId::Struct,
    "if" => KeywordId::If,
    "else" => KeywordId::Else,
    "for" => KeywordId::For,
    "range" => KeywordId::Range,
    "switch" => KeywordId::Switch,
    "case" => KeywordId::Case,
    "default" => KeywordId::Default,
    "select" => KeywordId::Select,
    "go" => KeywordId::Go,
    "defer" => KeywordId::Defer,
    "return" => KeywordId::Return,
    "break" => KeywordId::Break,
    "continue" => KeywordId::Continue,
    "goto" => KeywordId::Goto,
    "fallthrough" => KeywordId::Fallthrough,
    "包" => KeywordId::Package,
    "导" => KeywordId::Import,
    "常" => KeywordId::Const,
    "变" => KeywordId::Var,
    "类" => KeywordId::Type,
    "函" => KeywordId::Func,
    "道" => KeywordId::Chan,
    "接" => KeywordId::Interface,
    "映" => KeywordId::Map,
    "构" => KeywordId::Struct,
    "如" => KeywordId::If,
    "否" => KeywordId::Else,
    "循" => KeywordId::For,
    "历" => KeywordId::Range,
    "分" => KeywordId::Switch,
    "例" => KeywordId::Case,
    "默" => KeywordId::Default,
    "择" => KeywordId::Select,
    "启" => KeywordId::Go,
    "延" => KeywordId::Defer,
    "返" => KeywordId::Return,
    "断" => KeywordId::Break,
    "续" => KeywordId::Continue,
    "跳" => KeywordId::Goto,
    "穿" => KeywordId::Fallthrough,
};

/// Ideographs that trigger a macro instead of naming a keyword.
///
/// The scanner turns these into an identifier token spelled like the macro, flagged as ideographic.
pub const MACRO_IDEOGRAPHS: &[(char, &str)] = &[('令', "let"), ('验', "assert"), ('备', "prepare"), ('执', "exec")];

/// What a single ideographic code point stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ideograph {
    Keyword(KeywordId),
    Macro(&'static str),
}

/// Resolve a code point to its ideographic meaning, if it is one.
///
/// ## Examples
/// ```rust
/// use gopp_core::lang::keywords::{self, Ideograph, KeywordId};
///
/// assert_eq!(keywords::ideograph('函'), Some(Ideograph::Keyword(KeywordId::Func)));
/// assert_eq!(keywords::ideograph('令'), Some(Ideograph::Macro("let")));
/// assert_eq!(keywords::ideograph('x'), None);
/// ```
pub fn ideograph(c: char) -> Option<Ideograph> {
    if c.is_ascii() {
        return None;
    }
    if let Some((_, name)) = MACRO_IDEOGRAPHS.iter().find(|(m, _)| *m == c) {
        return Some(Ideograph::Macro(name));
    }
    let mut buf = [0u8; 4];
    let spelling: &str = c.encode_utf8(&mut buf);
    KEYWORD_TABLE.get(spelling).copied().map(Ideograph::Keyword)
}

/// Canonical spelling.
pub fn as_str(id: KeywordId) -> &'static str {
    info_for(id).canonical
}

/// Accepted ideographic aliases.
pub fn aliases(id: KeywordId) -> &'static [&'static str] {
    info_for(id).aliases
}

/// Category.
pub fn category(id: KeywordId) -> KeywordCategory {
    info_for(id).category
}

/// Full metadata.
///
/// ## Panics
/// - If the registry is missing an entry for `id` (this indicates a programming error).
pub fn info_for(id: KeywordId) -> &'static KeywordInfo {
    KEYWORDS.iter().find(|k| k.id == id).expect("keyword info missing")
}

/// Lookup by spelling (canonical or alias).
///
/// ## Returns
/// - `Some(KeywordId)` if the spelling is reserved.
/// - `None` otherwise.
pub fn from_str(s: &str) -> Option<KeywordId> {
    KEYWORD_TABLE.get(s).copied()
}

// --- helpers -----------------------------------------------------------------

const fn info(
    id: KeywordId,
    canonical: &'static str,
    aliases: &'static [&'static str],
    category: KeywordCategory,
    ends_statement: bool,
) -> KeywordInfo {
    KeywordInfo {
        id,
        canonical,
        aliases,
        category,
        ends_statement,
        origin: Origin::Go,
        stability: Stability::Stable,
    }
}
