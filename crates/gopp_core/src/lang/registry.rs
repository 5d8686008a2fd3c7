//! Shareable metadata for `gopp_core::lang` registries.
//!
//! The `gopp_core::lang` module is a set of **registry-first** vocabularies: keywords, operators, punctuation and
//! permits. This submodule provides the small, dependency-free metadata types reused across all of them.
//!
//! ## Notes
//! - These types are intentionally lightweight and `Copy`-friendly so registries can live in `const` tables.
//! - Metadata is meant for tooling/docs/diagnostics; enforcement of syntax rules still lives in the scanner/parser.

/// Identify which language layer introduced a vocabulary item.
///
/// ## Notes
/// - Layers mirror the permit profiles (see [`crate::lang::permits::Dialect`]): base-language vocabulary is
///   [`Origin::Go`], everything the superset adds is [`Origin::Gopp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Part of the standard base language.
    Go,
    /// Added by the gopp superset.
    Gopp,
}

/// Describe the lifecycle status of a language vocabulary item.
///
/// ## Notes
/// - This is intended for docs/tooling (e.g. to flag experimental spellings), not for feature-gating by itself.
///   Gating is done through permits.
///
/// ## Examples
/// ```rust
/// use gopp_core::lang::registry::Stability;
///
/// let s = Stability::Stable;
/// assert_eq!(format!("{s:?}"), "Stable");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stability {
    Stable,
    Experimental,
    Deprecated,
}

/// Represent a small example snippet for documentation.
///
/// ## Examples
/// ```rust
/// use gopp_core::lang::registry::Example;
///
/// let ex = Example {
///     code: "if ok { return }",
///     note: Some("Minimal conditional."),
/// };
/// assert!(ex.code.contains("if"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Example {
    pub code: &'static str,
    pub note: Option<&'static str>,
}
