#[cfg(test)]
/// Parser unit tests.
///
/// These tests focus on specific syntactic forms, permit gating, macro expansion and the parser's error recovery
/// behavior (one diagnostic per mistake, no cascades).
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::api::{self, Parsed};

    fn expr(source: &str) -> Expr {
        parse_expression(source, ParseOptions::default()).unwrap().node
    }

    fn stmt(source: &str) -> Stmt {
        parse_statement(source, ParseOptions::default()).unwrap().node
    }

    fn parse(name: &str, source: &str) -> Parsed {
        api::parse_bytes(name, source.as_bytes(), ParseOptions::default()).unwrap()
    }

    fn parse_err(name: &str, source: &str) -> Diagnostic {
        api::parse_bytes(name, source.as_bytes(), ParseOptions::default()).unwrap_err()
    }

    fn collecting() -> (ParseOptions, Rc<RefCell<Vec<String>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let options = ParseOptions::default().with_error_handler(move |d| sink.borrow_mut().push(d.message.clone()));
        (options, seen)
    }

    /// Body of the first function declared in `file`.
    fn body<'f>(parsed: &'f Parsed, file: &str) -> &'f [Spanned<Stmt>] {
        let file = &parsed.files[file];
        let func = file.funcs().next().expect("a function");
        &func.body.as_ref().expect("a body").stmts
    }

    fn call_parts(expr: &Expr) -> (&str, &str, &[Spanned<Expr>]) {
        let Expr::Call { fun, args, .. } = expr else {
            panic!("expected call, got {expr:?}");
        };
        let Expr::Selector { x, sel } = &fun.node else {
            panic!("expected selector, got {:?}", fun.node);
        };
        (x.node.as_name().expect("receiver name"), sel.node.as_str(), args)
    }

    // ------------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------------

    #[test]
    fn test_binary_precedence() {
        let Expr::Binary { op, x, y } = expr("a + b*c") else {
            panic!("expected binary");
        };
        assert_eq!(op, OperatorId::Add);
        assert_eq!(x.node.as_name(), Some("a"));
        assert!(matches!(y.node, Expr::Binary { op: OperatorId::Mul, .. }));
    }

    #[test]
    fn test_logical_operators_bind_loosest() {
        let Expr::Binary { op, y, .. } = expr("a == b || c && d") else {
            panic!("expected binary");
        };
        assert_eq!(op, OperatorId::LogicalOr);
        assert!(matches!(y.node, Expr::Binary { op: OperatorId::LogicalAnd, .. }));
    }

    #[test]
    fn test_receive_of_chan_type_becomes_recv_only_type() {
        assert!(matches!(expr("<-chan int"), Expr::Chan { dir: ChanDir::Recv, .. }));
        assert!(matches!(expr("<-ch"), Expr::Unary { op: OperatorId::Arrow, .. }));
    }

    #[test]
    fn test_postfix_forms() {
        assert!(matches!(expr("a.b.c"), Expr::Selector { .. }));
        assert!(matches!(expr("x.(T)"), Expr::TypeAssert { ty: Some(_), .. }));
        assert!(matches!(expr("xs[1]"), Expr::Index { .. }));
        assert!(matches!(expr("xs[1:]"), Expr::Slice { high: None, .. }));
        assert!(matches!(expr("xs[1:2:3]"), Expr::Slice { max: Some(_), .. }));
        assert!(matches!(expr("f(xs...)"), Expr::Call { spread: true, .. }));
    }

    #[test]
    fn test_three_index_slice_requires_all_indices() {
        let err = parse_expression("xs[1::3]", ParseOptions::default()).unwrap_err();
        assert_eq!(err.message, "middle index required in 3-index slice");
    }

    #[test]
    fn test_composite_literals() {
        let Expr::Composite { ty, elts } = expr("Point{X: 1, Y: 2}") else {
            panic!("expected composite");
        };
        assert!(ty.is_some());
        assert!(elts.iter().all(|e| matches!(e.node, Expr::KeyValue { .. })));
        let Expr::Composite { elts, .. } = expr("[][]int{{1}, {2, 3}}") else {
            panic!("expected composite");
        };
        assert!(matches!(elts[1].node, Expr::Composite { ty: None, .. }));
    }

    #[test]
    fn test_composite_literal_not_taken_in_control_header() {
        let Stmt::If { cond, then, .. } = stmt("if ok { done() }") else {
            panic!("expected if");
        };
        assert_eq!(cond.node.as_name(), Some("ok"));
        assert_eq!(then.stmts.len(), 1);
    }

    #[test]
    fn test_func_literal_numbers_anonymous_params() {
        let Expr::FuncLit { ty, body } = expr("func(_, _ int) int { return _ + _ }") else {
            panic!("expected func literal");
        };
        let names: Vec<_> = ty.params[0].names.iter().map(|n| n.node.as_str()).collect();
        assert_eq!(names, ["_1", "_2"]);
        let Stmt::Return(results) = &body.stmts[0].node else {
            panic!("expected return");
        };
        let Expr::Binary { x, y, .. } = &results[0].node else {
            panic!("expected binary");
        };
        assert_eq!(x.node.as_name(), Some("_1"));
        assert_eq!(y.node.as_name(), Some("_2"));
    }

    #[test]
    fn test_type_forms() {
        let ty = parse_type("map[string][]*T", ParseOptions::default()).unwrap();
        let Expr::Map { value, .. } = ty.node else {
            panic!("expected map");
        };
        assert!(matches!(value.node, Expr::Array { len: None, .. }));
        let ty = parse_type("func(a, b int, s ...string) (int, error)", ParseOptions::default()).unwrap();
        let Expr::Func(sig) = ty.node else {
            panic!("expected func type");
        };
        assert_eq!(sig.params.len(), 2);
        assert_eq!(sig.params[0].names.len(), 2);
        assert!(matches!(sig.params[1].ty.node, Expr::Ellipsis(Some(_))));
        assert_eq!(sig.results.len(), 2);
    }

    #[test]
    fn test_mixed_parameters_are_rejected() {
        let err = parse_type("func(a int, string)", ParseOptions::default()).unwrap_err();
        assert_eq!(err.message, "mixed named and unnamed parameters");
    }

    // ------------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------------

    #[test]
    fn test_for_forms() {
        assert!(matches!(stmt("for { }"), Stmt::For { cond: None, .. }));
        assert!(matches!(
            stmt("for i := 0; i < n; i++ { }"),
            Stmt::For {
                init: Some(_),
                cond: Some(_),
                post: Some(_),
                ..
            }
        ));
        let Stmt::Range { key, value, define, .. } = stmt("for k, v := range m { }") else {
            panic!("expected range");
        };
        assert!(define);
        assert_eq!(key.map(|k| k.node), Some(Expr::name("k")));
        assert_eq!(value.map(|v| v.node), Some(Expr::name("v")));
        assert!(matches!(stmt("for range ch { }"), Stmt::Range { key: None, .. }));
    }

    #[test]
    fn test_switch_forms() {
        let Stmt::Switch { tag, body, .. } = stmt("switch x { case 1, 2: a()\ncase 3: b()\ndefault: }") else {
            panic!("expected switch");
        };
        assert!(tag.is_some());
        assert_eq!(body.stmts.len(), 3);
        assert!(matches!(&body.stmts[2].node, Stmt::Case { list: None, .. }));
        assert!(matches!(
            stmt("switch v := x.(type) { case int: }"),
            Stmt::TypeSwitch { .. }
        ));
    }

    #[test]
    fn test_select_clauses() {
        let Stmt::Select { body } = stmt("select { case v := <-ch: use(v)\ncase out <- 1:\ndefault: }") else {
            panic!("expected select");
        };
        assert_eq!(body.stmts.len(), 3);
    }

    #[test]
    fn test_labeled_statement() {
        let Stmt::Labeled { label, stmt: inner } = stmt("outer: for { break outer }") else {
            panic!("expected labeled statement");
        };
        assert_eq!(label.node, "outer");
        assert!(matches!(inner.node, Stmt::For { .. }));
    }

    #[test]
    fn test_else_must_be_if_or_block() {
        let err = parse_statement("if a { } else b()", ParseOptions::default()).unwrap_err();
        assert_eq!(err.message, "else must be followed by if or statement block");
    }

    #[test]
    fn test_go_requires_call() {
        let err = parse_statement("go x", ParseOptions::default()).unwrap_err();
        assert_eq!(err.message, "expression in go must be function call");
    }

    #[test]
    fn test_recovery_reports_each_bad_statement_once() {
        let (options, seen) = collecting();
        let block = parse_statement("{\n\tx := )\n\ty := 2\n\tz := )\n}", options).unwrap();
        let Stmt::Block(block) = block.node else {
            panic!("expected block");
        };
        assert_eq!(seen.borrow().len(), 2, "{:?}", seen.borrow());
        assert!(matches!(block.stmts[0].node, Stmt::Bad));
        assert!(matches!(block.stmts[1].node, Stmt::Assign { .. }));
        assert!(matches!(block.stmts[2].node, Stmt::Bad));
    }

    // ------------------------------------------------------------------------
    // Permits
    // ------------------------------------------------------------------------

    #[test]
    fn test_disabled_permit_names_the_feature() {
        let options = ParseOptions::default().with_dialect(Dialect::Minimal);
        let err = parse_statement("x := 1", options).unwrap_err();
        assert_eq!(err.message, "shortVarDecl is not permitted");
    }

    #[test]
    fn test_go_dialect_rejects_macros() {
        let err = parse_err("x.go", "package p\nfunc f() { assert x }\n");
        assert_eq!(err.message, "macros is not permitted");
        assert_eq!(err.position.line, 2);
    }

    #[test]
    fn test_go_dialect_treats_macro_names_as_identifiers() {
        let parsed = parse("x.go", "package p\nfunc f() { exec(cmd); cd := 1; _ = cd }\n");
        let stmts = body(&parsed, "p/x.go");
        let Stmt::Expr(call) = &stmts[0].node else {
            panic!("expected call statement");
        };
        assert!(matches!(&call.node, Expr::Call { fun, .. } if fun.node.as_name() == Some("exec")));
    }

    #[test]
    fn test_blacklist_turns_permits_off() {
        let err = parse_err("x.gopp", "package p\nuse \"blacklist\" (goto)\nfunc f() { goto L\nL: }\n");
        assert_eq!(err.message, "goto is not permitted");
    }

    #[test]
    fn test_unknown_use_directive() {
        let err = parse_err("x.gopp", "use \"teleport\"\npackage p\n");
        assert_eq!(err.message, "unknown use directive \"teleport\"");
    }

    // ------------------------------------------------------------------------
    // Macros
    // ------------------------------------------------------------------------

    #[test]
    fn test_assert_records_its_position() {
        let parsed = parse("t.gopp", "package p\nfunc f() {\n\tassert x > 0\n}\n");
        let file = &parsed.files["p/t.go"];
        assert_eq!(file.inferred[0].alias, "assert");
        let Stmt::Expr(call) = &body(&parsed, "p/t.go")[0].node else {
            panic!("expected call statement");
        };
        let (receiver, method, args) = call_parts(&call.node);
        assert_eq!((receiver, method), ("assert", "True"));
        assert_eq!(args[1].node.string_value().as_deref(), Some("t.gopp:3:9"));
    }

    #[test]
    fn test_assert_list_expands_to_block() {
        let parsed = parse("t.gopp", "package p\nfunc f() {\n\tassert (a, b)\n}\n");
        let Stmt::Block(block) = &body(&parsed, "p/t.go")[0].node else {
            panic!("expected block");
        };
        assert_eq!(block.stmts.len(), 2);
    }

    #[test]
    fn test_command_macro_in_expression_position() {
        let parsed = parse("t.gopp", "package p\nfunc f() {\n\tout := exec \"ls\", dir\n\t_ = out\n}\n");
        let Stmt::Assign { rhs, .. } = &body(&parsed, "p/t.go")[0].node else {
            panic!("expected assignment");
        };
        let (receiver, method, args) = call_parts(&rhs[0].node);
        assert_eq!((receiver, method, args.len()), ("system", "Exec", 2));
        assert_eq!(parsed.files["p/t.go"].inferred[0].path, "gopp/lib/system");
    }

    #[test]
    fn test_let_scopes_the_rest_of_the_block() {
        let parsed = parse("t.gopp", "package p\nfunc f() {\n\tlet a = 1\n\tuse(a)\n\tuse(a)\n}\n");
        let stmts = body(&parsed, "p/t.go");
        assert_eq!(stmts.len(), 1);
        let Stmt::Block(block) = &stmts[0].node else {
            panic!("expected block");
        };
        assert_eq!(block.stmts.len(), 3);
        assert!(matches!(block.stmts[0].node, Stmt::Assign { op: OperatorId::Define, .. }));
    }

    #[test]
    fn test_bound_name_shadows_macro() {
        let parsed = parse("t.gopp", "package p\nfunc prepare(s string) {}\nfunc f() { prepare(\"x\") }\n");
        assert!(parsed.files["p/t.go"].inferred.is_empty());
    }

    #[test]
    fn test_custom_statement_macro() {
        let mut macros = MacroRegistry::default();
        macros.register_stmt("todo", |ctx| {
            let span = ctx.trigger().span;
            let call = Expr::Call {
                fun: Box::new(Spanned::new(Expr::name("panic"), span)),
                args: vec![Spanned::new(Expr::string("todo"), span)],
                spread: false,
            };
            Ok(Spanned::new(Stmt::Expr(Spanned::new(call, span)), span))
        });
        let options = ParseOptions::default().with_macros(macros);
        let parsed = api::parse_bytes("t.gopp", b"package p\nfunc f() {\n\ttodo\n}\n", options).unwrap();
        let Stmt::Expr(call) = &body(&parsed, "p/t.go")[0].node else {
            panic!("expected call");
        };
        assert!(matches!(&call.node, Expr::Call { fun, .. } if fun.node.as_name() == Some("panic")));
    }

    // ------------------------------------------------------------------------
    // Dynamic mode and inferred imports
    // ------------------------------------------------------------------------

    #[test]
    fn test_dynamic_operators_become_calls() {
        let parsed = parse("d.goppx", "package p\nuse \"dynamic\"\nfunc f() { _ = a + b; _ = a && b; _ = -a }\n");
        let stmts = body(&parsed, "p/d.go");
        let rhs = |i: usize| match &stmts[i].node {
            Stmt::Assign { rhs, .. } => rhs[0].node.clone(),
            other => panic!("expected assignment, got {other:?}"),
        };

        let plus = rhs(0);
        let (receiver, method, args) = call_parts(&plus);
        assert_eq!((receiver, method, args.len()), ("dyn", "Plus", 2));

        let and = rhs(1);
        let (_, method, args) = call_parts(&and);
        assert_eq!(method, "And");
        assert!(matches!(args[1].node, Expr::FuncLit { .. }));

        let negate = rhs(2);
        assert_eq!(call_parts(&negate).1, "Negate");

        let file = &parsed.files["p/d.go"];
        assert_eq!(file.inferred.len(), 1);
        assert_eq!(file.inferred[0].path, "gopp/lib/dynamic");
    }

    #[test]
    fn test_dynamic_mode_ends_with_the_section() {
        let source = "package p\nsection a\nuse \"dynamic\"\nvar x = a + b\nsection b\nvar y = a + b\n";
        let parsed = parse("d.goppx", source);
        let Decl::Var(spec) = &parsed.files["p/b.go"].decls[0].node else {
            panic!("expected var");
        };
        assert!(matches!(spec.values[0].node, Expr::Binary { .. }));
    }

    #[test]
    fn test_inferred_import_from_string_selector() {
        let parsed = parse("t.gopp", "package p\nfunc f() { \"gopkg.in/yaml.v3\".Marshal(v) }\n");
        let file = &parsed.files["p/t.go"];
        assert_eq!(file.inferred, vec![InferredImport {
            alias: "yaml_v3".into(),
            path: "gopkg.in/yaml.v3".into(),
        }]);
    }

    #[test]
    fn test_inferred_import_alias_collision() {
        let err = parse_err(
            "t.gopp",
            "package p\nimport strings \"example.com/strings\"\nfunc f() { \"strings\".ToUpper(s) }\n",
        );
        assert!(err.message.contains("already refers to"), "{}", err.message);
    }

    #[test]
    fn test_import_alias_sanitizes_segment() {
        assert_eq!(import_alias("strings"), "strings");
        assert_eq!(import_alias("golang.org/x/mod"), "mod");
        assert_eq!(import_alias("example.com/9p"), "_9p");
        assert_eq!(import_alias("example.com/go-yaml"), "go_yaml");
    }

    // ------------------------------------------------------------------------
    // Packages, sections and includes
    // ------------------------------------------------------------------------

    #[test]
    fn test_package_clause_only() {
        let parsed = parse("p.go", "package p\n");
        assert_eq!(parsed.files.len(), 1);
        assert!(parsed.files["p/p.go"].decls.is_empty());
    }

    #[test]
    fn test_sections_become_files() {
        let parsed = parse("x.gopp", "package p\nsection a\nfunc f() {}\nsection b\nfunc g() {}\ntestcode\nfunc h() {}\n");
        let keys: Vec<_> = parsed.files.keys().map(String::as_str).collect();
        assert_eq!(keys, ["p/a.go", "p/b.go", "p/p_test.go"]);
    }

    #[test]
    fn test_headerless_bare_statements_host_in_main() {
        let parsed = parse("tool.gopp", "x := 1\nprintln(x)\n");
        let file = &parsed.files["tool.go"];
        assert_eq!(file.package, "main");
        let main = file.funcs().find(|f| f.name.node == "main").expect("func main");
        assert_eq!(main.body.as_ref().map(|b| b.stmts.len()), Some(2));
    }

    #[test]
    fn test_named_package_bare_statements_host_in_init() {
        let parsed = parse("x.gopp", "package p\nvar x int\nx = 2\n");
        assert!(parsed.files["p/x.go"].funcs().any(|f| f.name.node == "init"));
    }

    #[test]
    fn test_bare_statements_conflict_with_main() {
        let err = parse_err("tool.gopp", "println(1)\nfunc main() {}\n");
        assert_eq!(err.message, "bare statements cannot be combined with func main");
    }

    #[test]
    fn test_imports_must_come_first() {
        let err = parse_err("x.go", "package p\nvar x int\nimport \"fmt\"\n");
        assert_eq!(err.message, "imports must appear before other declarations");
    }

    #[test]
    fn test_grouped_decls_share_a_group() {
        let decls = parse_declaration("const (\n\ta = iota\n\tb\n)", ParseOptions::default()).unwrap();
        assert_eq!(decls.len(), 2);
        assert!(decls[0].node.group().is_some());
        assert_eq!(decls[0].node.group(), decls[1].node.group());
    }

    #[test]
    fn test_include_adds_packages() {
        let options = ParseOptions::default().with_include_resolver(|path| {
            assert_eq!(path, "lib.gopp");
            Ok(b"package q\nfunc g() {}\n".to_vec())
        });
        let parsed = api::parse_bytes("main.gopp", b"package p\ninclude \"lib.gopp\"\nfunc f() {}\n", options).unwrap();
        assert!(parsed.files.contains_key("p/main.go"));
        assert!(parsed.files.contains_key("q/lib.go"));
    }

    #[test]
    fn test_include_depth_is_bounded() {
        let options = ParseOptions::default()
            .with_max_include_depth(3)
            .with_include_resolver(|_| Ok(b"include \"self.gopp\"\n".to_vec()));
        let err = api::parse_bytes("self.gopp", b"include \"self.gopp\"\n", options).unwrap_err();
        assert!(err.message.contains("nesting exceeds"), "{}", err.message);
    }

    #[test]
    fn test_directive_handler_sees_directives() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let options = ParseOptions::default()
            .with_directive_handler(move |pos, text| sink.borrow_mut().push((pos.line, text.to_string())));
        api::parse_bytes("x.go", b"//go:build linux\n\npackage p\n", options).unwrap();
        assert_eq!(*seen.borrow(), vec![(1, "go:build linux".to_string())]);
    }

    #[test]
    fn test_project_header_sets_root() {
        let parsed = parse("x.gopp", "project demo\npackage p\nfunc f() {}\n");
        assert!(parsed.files.contains_key("demo/p/x.go"));
    }

    // ------------------------------------------------------------------------
    // Lexical gates and positions
    // ------------------------------------------------------------------------

    #[test]
    fn test_long_invalid_run_reports_each_character() {
        let (options, seen) = collecting();
        let source = format!("package p\n{}\nfunc f() {{}}\n", "@".repeat(300_000));
        let parsed = api::parse_bytes("x.go", source.as_bytes(), options).unwrap();
        assert_eq!(seen.borrow().len(), 300_000);
        assert!(parsed.files.is_empty());
    }

    #[test]
    fn test_date_literal_needs_experimental_dialect() {
        let source = "package p\nvar d = 2024.01.15\n";
        let err = parse_err("x.gopp", source);
        assert_eq!(err.message, "dateLiterals is not permitted");
        assert_eq!(err.position.to_string(), "x.gopp:2:9");
        assert!(parse("x.goppx", source).files.contains_key("p/x.go"));
    }

    #[test]
    fn test_escape_e_needs_experimental_dialect() {
        let source = "package p\nvar s = \"\\e[0m\"\n";
        assert_eq!(parse_err("x.gopp", source).message, "escapeEscapeInStrings is not permitted");
        assert!(parse("x.goppx", source).files.contains_key("p/x.go"));
    }

    #[test]
    fn test_ideographic_keyword_rejected_in_plain_go() {
        let err = parse_err("x.go", "package p\n函 f() {}\n");
        assert_eq!(err.message, "ideographs is not permitted");
        assert_eq!((err.position.line, err.position.column), (2, 1));

        let parsed = parse("x.gopp", "package p\n函 f() {}\n");
        assert!(parsed.files["p/x.go"].funcs().any(|f| f.name.node == "f"));
    }

    #[test]
    fn test_line_directives_remap_diagnostics_when_used() {
        let body = "//line gen.y:10\nvar d = 2024.01.15\n";
        let plain = parse_err("x.gopp", &format!("package p\n{body}"));
        assert_eq!(plain.position.to_string(), "x.gopp:3:9");

        let remapped = parse_err("x.gopp", &format!("package p\nuse \"linedirectives\"\n{body}"));
        assert_eq!(remapped.message, "dateLiterals is not permitted");
        assert_eq!(remapped.position.to_string(), "gen.y:10:9");
    }

    #[test]
    fn test_headerless_package_with_func_main_is_excluded() {
        let parsed = parse("tool.gopp", "func main() {\n\tprintln(1)\n}\n");
        let file = &parsed.files["tool.go"];
        assert!(file.has_entry);
        assert!(file.excluded);

        let script = parse("script.gopp", "println(1)\n");
        assert!(!script.files["script.go"].excluded);
    }

    // ------------------------------------------------------------------------
    // Nesting
    // ------------------------------------------------------------------------

    /// First diagnostic message for `source`, parsed on a thread with a main-thread sized stack.
    fn first_error_on_main_stack(name: &'static str, source: String) -> Option<String> {
        std::thread::Builder::new()
            .stack_size(8 << 20)
            .spawn(move || {
                api::parse_bytes(name, source.as_bytes(), ParseOptions::default())
                    .err()
                    .map(|d| d.message)
            })
            .unwrap()
            .join()
            .unwrap()
    }

    #[test]
    fn test_deep_parentheses_are_rejected() {
        let depth = 50_000;
        let source = format!("package p\nvar x = {}1{}\n", "(".repeat(depth), ")".repeat(depth));
        let message = first_error_on_main_stack("x.go", source);
        assert_eq!(message.as_deref(), Some("exceeded max nesting depth"));
    }

    #[test]
    fn test_deep_blocks_literals_unary_and_types_are_rejected() {
        let n = 20_000;
        let sources = [
            format!("package p\nfunc f() {}{}\n", "{".repeat(n), "}".repeat(n)),
            format!("package p\nvar x = [][]int{}{}\n", "{".repeat(n), "}".repeat(n)),
            format!("package p\nvar x = {}y\n", "!".repeat(n)),
            format!("package p\nvar x {}int\n", "*".repeat(n)),
        ];
        for source in sources {
            let prefix: String = source.chars().take(24).collect();
            let message = first_error_on_main_stack("x.go", source);
            assert_eq!(message.as_deref(), Some("exceeded max nesting depth"), "{prefix:?}");
        }
    }

    #[test]
    fn test_moderate_nesting_still_parses() {
        let source = format!("package p\nvar x = {}1{}\n", "(".repeat(40), ")".repeat(40));
        assert_eq!(first_error_on_main_stack("x.go", source), None);
    }
}
