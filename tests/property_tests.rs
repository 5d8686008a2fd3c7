//! Property-based tests for the gopp front end
//!
//! These tests use proptest to check invariants across many generated inputs: small programs in the most restrictive
//! dialect always parse, disabled features are always named in a diagnostic, and no input makes the parser panic.

use std::cell::RefCell;
use std::rc::Rc;

use gopp::{ParseOptions, parse_bytes};
use gopp_core::lang::keywords;
use gopp_core::lang::permits::Dialect;
use proptest::prelude::*;

/// Words the parser treats specially at the start of a line even though they are not keywords.
const CONTEXTUAL: &[&str] = &["section", "main", "testcode", "project", "include", "use", "init"];

fn ident_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,8}".prop_filter("not a keyword", |s| {
        keywords::from_str(s).is_none() && !CONTEXTUAL.contains(&s.as_str())
    })
}

fn minimal_body_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just(""), Just("return"), Just("println(1)"), Just("if true {\n\t}"), Just("x = y + 1")]
}

/// Minimal-dialect programs: a package clause and one function.
fn minimal_program_strategy() -> impl Strategy<Value = (String, String)> {
    (ident_strategy(), ident_strategy(), minimal_body_strategy()).prop_map(|(pkg, func, body)| {
        let source = format!("package {pkg}\n\nfunc {func}() {{\n\t{body}\n}}\n");
        (pkg, source)
    })
}

/// Source fragments paired with the permit each one needs.
const GATED: &[(&str, &str)] = &[
    ("goto", "goto L\nL:"),
    ("shortVarDecl", "x := 1\n\t_ = x"),
    ("incDec", "x++"),
    ("deferStmt", "defer g()"),
    ("goStmt", "go g()"),
    ("select", "select {}"),
    ("pointers", "var p *int\n\t_ = p"),
    ("mapTypes", "var m map[string]int\n\t_ = m"),
    ("structTypes", "var s struct{}\n\t_ = s"),
    ("interfaceTypes", "var i interface{}\n\t_ = i"),
    ("funcLiterals", "_ = func() {}"),
    ("runeLiterals", "_ = 'a'"),
    ("rawStrings", "_ = `raw`"),
    ("compositeLiterals", "_ = []int{1}"),
];

/// Vocabulary for token-soup inputs.
const SOUP: &[&str] = &[
    "package", "func", "section", "use", "\"dynamic\"", "{", "}", "(", ")", "\n", "x", "+", "&&", ":=", "goto", "L:",
    "assert", "let", "import", "\"p\"", "[]", "令", "2024.01.15",
];

fn collect(name: &str, source: &[u8], options: ParseOptions) -> Vec<String> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let options = options.with_error_handler(move |d| sink.borrow_mut().push(d.message.clone()));
    let _ = parse_bytes(name, source, options);
    seen.take()
}

proptest! {
    /// Property: small programs in the minimal dialect parse to exactly one file.
    #[test]
    fn minimal_programs_yield_one_file((pkg, source) in minimal_program_strategy()) {
        let options = ParseOptions::default().with_dialect(Dialect::Minimal);
        let parsed = parse_bytes("m.go", source.as_bytes(), options);
        prop_assert!(parsed.is_ok(), "{source:?}: {:?}", parsed.as_ref().err());
        let parsed = parsed.unwrap();
        prop_assert_eq!(parsed.files.len(), 1);
        let key = format!("{pkg}/m.go");
        prop_assert!(parsed.files.contains_key(&key));
    }

    /// Property: a blacklisted feature is always reported by name.
    #[test]
    fn blacklisted_features_are_named(index in 0..GATED.len(), func in ident_strategy()) {
        let (permit, body) = GATED[index];
        let source = format!("package p\nuse \"blacklist\" ({permit})\nfunc {func}() {{\n\t{body}\n}}\n");
        let messages = collect("x.gopp", source.as_bytes(), ParseOptions::default());
        let expected = format!("{permit} is not permitted");
        prop_assert!(messages.contains(&expected), "{source:?}: {messages:?}");
    }

    /// Property: the minimal dialect rejects the same fragments without crashing.
    #[test]
    fn minimal_dialect_rejects_go_features(index in 0..GATED.len()) {
        let (_, body) = GATED[index];
        let source = format!("package p\nfunc f() {{\n\t{body}\n}}\n");
        let messages = collect("x.go", source.as_bytes(), ParseOptions::default().with_dialect(Dialect::Minimal));
        prop_assert!(messages.iter().any(|m| m.ends_with("is not permitted")), "{source:?}: {messages:?}");
    }

    /// Property: arbitrary bytes never panic, with or without an error handler.
    #[test]
    fn arbitrary_input_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
        let _ = parse_bytes("fuzz.goppx", &bytes, ParseOptions::default());
        let _ = collect("fuzz.goppx", &bytes, ParseOptions::default());
    }

    /// Property: token soup built from gopp vocabulary never panics.
    #[test]
    fn vocabulary_soup_never_panics(words in proptest::collection::vec(proptest::sample::select(SOUP), 0..48)) {
        let source = words.join(" ");
        let _ = collect("soup.goppx", source.as_bytes(), ParseOptions::default());
    }
}
