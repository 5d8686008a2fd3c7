//! Integration tests for the gopp front end
//!
//! Each test drives the public entry points end to end: scanning, parsing, package composition, branch checking and
//! finalization into output files.

use std::cell::RefCell;
use std::rc::Rc;

use gopp::ast::{Decl, Expr, File, Stmt};
use gopp::{Diagnostic, Mode, ParseOptions, Parsed, parse_bytes};

/// Parse with an error handler installed, returning the result and every diagnostic seen.
fn parse_collecting(name: &str, source: &str, options: ParseOptions) -> (Parsed, Vec<Diagnostic>) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let options = options.with_error_handler(move |d| sink.borrow_mut().push(d.clone()));
    let parsed = parse_bytes(name, source.as_bytes(), options).expect("handler keeps the parse going");
    let diags = seen.take();
    (parsed, diags)
}

fn branch_messages(source: &str) -> Vec<String> {
    let options = ParseOptions::default().with_mode(Mode::CHECK_BRANCHES);
    let (_, diags) = parse_collecting("t.go", source, options);
    diags.into_iter().map(|d| d.message).collect()
}

fn first_body(file: &File) -> &[gopp::ast::Spanned<Stmt>] {
    let func = file.funcs().next().expect("a function");
    &func.body.as_ref().expect("a body").stmts
}

// ============================================================================
// Packages and output files
// ============================================================================

#[test]
fn test_package_clause_alone() {
    let (parsed, diags) = parse_collecting("p.go", "package p\n", ParseOptions::default());
    assert!(diags.is_empty(), "{diags:?}");
    assert!(parsed.first_error.is_none());
    assert_eq!(parsed.files.len(), 1);
    let file = &parsed.files["p/p.go"];
    assert_eq!(file.package, "p");
    assert!(file.decls.is_empty());
}

#[test]
fn test_headerless_script_gets_main() {
    let parsed = parse_bytes("hello.gopp", b"println(\"hi\")\n", ParseOptions::default()).unwrap();
    let file = &parsed.files["hello.go"];
    assert_eq!(file.package, "main");
    assert!(file.has_entry);
}

#[test]
fn test_files_with_errors_are_dropped() {
    let source = "package p\nsection ok\nfunc f() {}\nsection broken\nfunc g() { continue }\n";
    let options = ParseOptions::default().with_mode(Mode::CHECK_BRANCHES);
    let (parsed, diags) = parse_collecting("x.gopp", source, options);
    assert_eq!(diags.len(), 1);
    assert!(parsed.files.contains_key("p/ok.go"));
    assert!(!parsed.files.contains_key("p/broken.go"));
}

// ============================================================================
// Branch checking
// ============================================================================

#[test]
fn test_continue_outside_loop_is_reported_once() {
    let messages = branch_messages("package p\nfunc f() { continue }\n");
    assert_eq!(messages, ["continue is not in a loop"]);
}

#[test]
fn test_continue_outside_loop_diagnostic() {
    let options = ParseOptions::default().with_mode(Mode::CHECK_BRANCHES);
    let err = parse_bytes("t.go", b"package p\nfunc f() { continue }\n", options).unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"t.go:2:12: continue is not in a loop");
}

#[test]
fn test_undefined_goto_label_is_reported_once() {
    let messages = branch_messages("package p\nfunc f() {\n\tgoto L\n}\n");
    assert_eq!(messages, ["label L not defined"]);
}

#[test]
fn test_unused_label_is_reported_once() {
    let messages = branch_messages("package p\nfunc f() {\nL:\n\tfor {\n\t}\n}\n");
    assert_eq!(messages, ["label L defined and not used"]);
}

#[test]
fn test_branches_are_not_checked_by_default() {
    let (parsed, diags) = parse_collecting("t.go", "package p\nfunc f() { continue }\n", ParseOptions::default());
    assert!(diags.is_empty());
    assert!(parsed.files.contains_key("p/t.go"));
}

// ============================================================================
// Parameterized packages
// ============================================================================

#[test]
fn test_generic_package_instantiation() {
    let source = "package set (T)\ntype Set map[T]bool\n\
                  package main\nimport \"set\" (int)\nfunc main() { _ = set.Set{} }\n";
    let parsed = parse_bytes("app.goppx", source.as_bytes(), ParseOptions::default()).unwrap();

    let args = &parsed.files["generics/set_int/set_args.go"];
    assert_eq!(args.package, "set");
    let Decl::Type(alias) = &args.decls[0].node else {
        panic!("expected a type alias, got {:?}", args.decls[0].node);
    };
    assert!(alias.alias);
    assert_eq!(alias.name.node, "T");
    assert_eq!(alias.ty.node.as_name(), Some("int"));

    let import = parsed.files["main/app.go"].imports().next().expect("an import");
    assert_eq!(import.path, "generics/set_int");
    assert_eq!(import.alias.as_deref(), Some("set"));
    assert!(import.args.is_empty());

    assert!(!parsed.files.keys().any(|k| k.starts_with("set/")), "templates are not emitted");
}

#[test]
fn test_generics_need_the_experimental_dialect() {
    let err = parse_bytes("app.gopp", b"package set (T)\n", ParseOptions::default()).unwrap_err();
    insta::assert_snapshot!(err.message, @"generics is not permitted");
}

// ============================================================================
// Dynamic mode
// ============================================================================

#[test]
fn test_dynamic_block_rewrites_operators() {
    let source = "package p\nuse \"dynamic\" -> d\nfunc f() {\n\t_ = a + b\n\t_ = a && b\n}\n";
    let parsed = parse_bytes("calc.goppx", source.as_bytes(), ParseOptions::default()).unwrap();
    let file = &parsed.files["p/calc.go"];
    let stmts = first_body(file);

    let rhs = |i: usize| match &stmts[i].node {
        Stmt::Assign { rhs, .. } => rhs[0].node.clone(),
        other => panic!("expected assignment, got {other:?}"),
    };
    let method_of = |call: &Expr| -> (String, String, usize) {
        let Expr::Call { fun, args, .. } = call else {
            panic!("expected call, got {call:?}");
        };
        let Expr::Selector { x, sel } = &fun.node else {
            panic!("expected selector, got {:?}", fun.node);
        };
        (x.node.as_name().unwrap_or_default().to_string(), sel.node.to_string(), args.len())
    };

    let plus = rhs(0);
    assert_eq!(method_of(&plus), ("d".to_string(), "Plus".to_string(), 2));

    let and = rhs(1);
    assert_eq!(method_of(&and).1, "And");
    let Expr::Call { args, .. } = &and else { unreachable!() };
    let Expr::FuncLit { ty, .. } = &args[1].node else {
        panic!("expected a closure around the right operand, got {:?}", args[1].node);
    };
    assert!(ty.params.is_empty());

    let import = file.imports().next().expect("inferred import");
    assert_eq!(import.path, "gopp/lib/dynamic");
    assert_eq!(import.alias.as_deref(), Some("d"));
}

// ============================================================================
// Permits
// ============================================================================

#[test]
fn test_plain_go_rejects_extensions() {
    let err = parse_bytes("x.go", b"package p\nsection a\n", ParseOptions::default()).unwrap_err();
    assert_eq!(err.position.line, 2);
    assert!(err.message.ends_with("is not permitted"), "{}", err.message);
}

#[test]
fn test_blacklisted_feature_is_named() {
    let source = "package p\nuse \"blacklist\" (deferStmt)\nfunc f() { defer g() }\n";
    let (_, diags) = parse_collecting("x.gopp", source, ParseOptions::default());
    let messages: Vec<_> = diags.iter().map(|d| d.message.as_str()).collect();
    assert_eq!(messages.first(), Some(&"deferStmt is not permitted"), "{messages:?}");
}
