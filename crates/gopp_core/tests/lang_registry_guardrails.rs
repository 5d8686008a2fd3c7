use std::collections::HashMap;

use gopp_core::lang::keywords::{self, Ideograph};
use gopp_core::lang::libraries;
use gopp_core::lang::operators::{self, OperatorKind};
use gopp_core::lang::permits::{self, Dialect};
use gopp_core::lang::punctuation;

#[test]
fn keywords_spellings_unique_and_resolvable() {
    let mut seen: HashMap<&'static str, keywords::KeywordId> = HashMap::new();

    for info in keywords::KEYWORDS {
        assert_eq!(
            keywords::from_str(info.canonical),
            Some(info.id),
            "keyword canonical spelling not resolvable: {}",
            info.canonical
        );
        assert_eq!(
            keywords::as_str(info.id),
            info.canonical,
            "keyword as_str mismatch for {:?}",
            info.id
        );

        if let Some(prev) = seen.insert(info.canonical, info.id) {
            panic!(
                "duplicate keyword spelling {:?}: {:?} and {:?}",
                info.canonical, prev, info.id
            );
        }

        for &alias in info.aliases {
            assert_eq!(
                keywords::from_str(alias),
                Some(info.id),
                "keyword alias not resolvable: {}",
                alias
            );
            if let Some(prev) = seen.insert(alias, info.id) {
                panic!(
                    "duplicate keyword alias spelling {:?}: {:?} and {:?}",
                    alias, prev, info.id
                );
            }
        }
    }

    assert_eq!(
        seen.len(),
        keywords::KEYWORD_TABLE.len(),
        "perfect-hash table and KEYWORDS registry disagree"
    );
}

#[test]
fn keyword_aliases_are_single_code_points() {
    for info in keywords::KEYWORDS {
        for &alias in info.aliases {
            let mut chars = alias.chars();
            let c = chars.next().expect("alias must not be empty");
            assert!(chars.next().is_none(), "alias {alias:?} is more than one code point");
            assert_eq!(keywords::ideograph(c), Some(Ideograph::Keyword(info.id)));
        }
    }
}

#[test]
fn macro_ideographs_do_not_shadow_keywords() {
    for &(c, name) in keywords::MACRO_IDEOGRAPHS {
        let mut buf = [0u8; 4];
        assert_eq!(keywords::from_str(c.encode_utf8(&mut buf)), None, "{c} is also a keyword alias");
        assert_eq!(keywords::ideograph(c), Some(Ideograph::Macro(name)));
    }
}

#[test]
fn operators_spellings_unique_and_resolvable() {
    let mut seen: HashMap<&'static str, operators::OperatorId> = HashMap::new();

    for info in operators::OPERATORS {
        assert_eq!(
            operators::from_str(info.spelling),
            Some(info.id),
            "operator spelling not resolvable: {}",
            info.spelling
        );
        assert_eq!(operators::as_str(info.id), info.spelling);
        if let Some(prev) = seen.insert(info.spelling, info.id) {
            panic!("duplicate operator spelling {:?}: {:?} and {:?}", info.spelling, prev, info.id);
        }
    }
}

#[test]
fn binary_operators_have_precedence_and_dynamic_methods() {
    for info in operators::OPERATORS {
        match info.kind {
            OperatorKind::Binary | OperatorKind::BinaryOrUnary => {
                assert!(
                    (1..=5).contains(&info.precedence),
                    "binary operator {} has precedence {}",
                    info.spelling,
                    info.precedence
                );
                assert!(info.dynamic.is_some(), "binary operator {} lacks a dynamic method", info.spelling);
            }
            _ => assert_eq!(info.precedence, 0, "{} is not infix", info.spelling),
        }
    }
}

#[test]
fn compound_assignments_point_at_binary_operators() {
    for info in operators::OPERATORS {
        if let Some(base) = info.assign_base {
            let base = operators::info_for(base);
            assert!(base.precedence > 0, "{} maps to non-binary {}", info.spelling, base.spelling);
            if info.kind == OperatorKind::Assign {
                assert_eq!(format!("{}=", base.spelling), info.spelling);
            }
        }
    }
}

#[test]
fn punctuation_spellings_unique_and_resolvable() {
    let mut seen: HashMap<&'static str, punctuation::PunctuationId> = HashMap::new();

    for info in punctuation::PUNCTUATION {
        assert_eq!(punctuation::from_str(info.canonical), Some(info.id));
        assert_eq!(punctuation::as_str(info.id), info.canonical);
        if let Some(prev) = seen.insert(info.canonical, info.id) {
            panic!(
                "duplicate punctuation spelling {:?}: {:?} and {:?}",
                info.canonical, prev, info.id
            );
        }
        assert!(
            operators::from_str(info.canonical).is_none(),
            "{} is both punctuation and an operator",
            info.canonical
        );
    }
}

#[test]
fn permits_names_unique_and_fit_in_a_word() {
    let mut seen: HashMap<&'static str, permits::PermitId> = HashMap::new();

    for info in permits::PERMITS {
        assert!(info.id.bit() < 64, "{} does not fit a u64 permit set", info.name);
        assert_eq!(permits::from_str(info.name), Some(info.id));
        assert_eq!(permits::as_str(info.id), info.name);
        let first = info.name.chars().next().expect("permit name must not be empty");
        assert!(first.is_ascii_lowercase(), "{} is not camelCase", info.name);
        if let Some(prev) = seen.insert(info.name, info.id) {
            panic!("duplicate permit name {:?}: {:?} and {:?}", info.name, prev, info.id);
        }
    }
}

#[test]
fn permit_layers_are_cumulative() {
    let mut previous = 0usize;
    for dialect in Dialect::ALL {
        let enabled = permits::enabled_by(dialect).count();
        let own = permits::layer(dialect).count();
        assert!(own > 0, "layer {dialect} is empty");
        assert_eq!(enabled, previous + own, "layer {dialect} is not cumulative");
        previous = enabled;
    }
    assert_eq!(previous, permits::PERMITS.len());
}

#[test]
fn minimal_layer_is_package_and_functions_only() {
    let minimal: Vec<_> = permits::enabled_by(Dialect::Minimal).map(permits::as_str).collect();
    assert_eq!(minimal, ["packageClause", "funcDecls"]);
}

#[test]
fn dialect_from_extension() {
    assert_eq!(Dialect::from_extension("a/b/main.go"), Dialect::Go);
    assert_eq!(Dialect::from_extension("main.gopp"), Dialect::Extended);
    assert_eq!(Dialect::from_extension("main.goppx"), Dialect::Experimental);
    assert_eq!(Dialect::from_extension("script"), Dialect::Extended);
    assert_eq!(Dialect::from_extension("notes.txt"), Dialect::Extended);
    for dialect in Dialect::ALL {
        assert_eq!(Dialect::from_name(dialect.as_str()), Some(dialect));
    }
}

#[test]
fn libraries_have_unique_aliases() {
    let mut seen: HashMap<&'static str, libraries::LibraryId> = HashMap::new();
    for info in libraries::LIBRARIES {
        assert!(info.path.ends_with(info.alias) || info.id == libraries::LibraryId::Dynamic);
        if let Some(prev) = seen.insert(info.alias, info.id) {
            panic!("duplicate library alias {:?}: {:?} and {:?}", info.alias, prev, info.id);
        }
    }
    for &(name, _) in libraries::COMMAND_MACROS {
        assert!(libraries::command_method(name).is_some());
    }
}
