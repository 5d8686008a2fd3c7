//! Project finalization.
//!
//! After every input has been parsed, the collected [`Project`] is turned into an [`OutputMap`]:
//! 1. Argument imports (`import "p" (int)`) instantiate their parameterized package under
//!    `<root>/generics/<template>_<mangled args>`, and the importing spec is rewritten to point there. Imports
//!    naming the same template with the same canonical arguments share one instantiation.
//! 2. Each file of a non-template package gets its inferred imports as a synthetic import group.
//! 3. Files are keyed by `<root>/<dir>/<name>.go`; a collision appends `_2`, `_3`, ...
//!
//! Files that had errors are left out, so a caller with an error handler still receives every good file.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use gopp_core::lang::operators;

use crate::api::OutputMap;
use crate::ast::*;
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::walk::{self, Visitor};

/// Directory instantiations are placed under, relative to the project root.
pub const GENERICS_DIR: &str = "generics";

/// Group id shared by the synthetic import specs of inferred imports.
pub const INFERRED_IMPORT_GROUP: DeclGroup = DeclGroup(u32::MAX);

/// Instantiate templates, attach inferred imports and key every emitted file by output path.
#[tracing::instrument(skip_all, fields(packages = project.packages.len(), pending = project.pending.len()))]
pub fn finalize(project: &mut Project, sink: &mut DiagnosticSink) -> OutputMap {
    let created = instantiate_pending(project, sink);

    let mut out = OutputMap::new();
    let packages = std::mem::take(&mut project.packages);
    for package in packages.into_iter().chain(created) {
        if package.is_template() {
            tracing::trace!(package = %package.name, "template package is only emitted through instantiations");
            continue;
        }
        for mut file in package.files {
            if file.had_errors {
                tracing::debug!(package = %package.name, file = %file.name, "dropping file with errors");
                continue;
            }
            attach_inferred_imports(&mut file);
            if file.name.is_empty() {
                file.name = package.name.clone();
            }
            let key = unique_key(&out, &project.root, &package.dir, &mut file.name);
            out.insert(key, file);
        }
    }
    out
}

// ============================================================================
// Instantiation
// ============================================================================

fn instantiate_pending(project: &mut Project, sink: &mut DiagnosticSink) -> Vec<Package> {
    let pending = std::mem::take(&mut project.pending);
    if pending.is_empty() {
        return Vec::new();
    }

    let templates: BTreeMap<Ident, Package> = project
        .packages
        .iter()
        .filter(|p| p.is_template())
        .map(|p| (p.name.clone(), p.clone()))
        .collect();
    let plain: BTreeSet<Ident> = project
        .packages
        .iter()
        .filter(|p| !p.is_template())
        .map(|p| p.name.clone())
        .collect();
    let mut inst = Instantiator {
        templates: &templates,
        plain: &plain,
        root: project.root.clone(),
        done: HashMap::new(),
        claimed: HashMap::new(),
        active: Vec::new(),
        created: Vec::new(),
    };

    for arg in pending {
        if sink.aborted() {
            break;
        }
        let Some(package) = project.packages.get(arg.package) else {
            continue;
        };
        // A template's own argument imports are resolved per instantiation.
        if package.is_template() {
            continue;
        }
        let Some(file) = package.files.get(arg.file) else {
            continue;
        };
        let Some(Decl::Import(spec)) = file.decls.get(arg.decl).map(|d| &d.node) else {
            continue;
        };

        let result = inst.instantiate(&spec.path, &spec.args, &[file], arg.span);
        let file = &mut project.packages[arg.package].files[arg.file];
        match result {
            Ok((template, dir)) => {
                if let Decl::Import(spec) = &mut file.decls[arg.decl].node {
                    inst.rewrite(spec, template, &dir);
                }
            }
            Err(diag) => {
                file.had_errors = true;
                sink.report(diag.at(arg.position), false);
            }
        }
    }
    inst.created
}

struct Instantiator<'t> {
    templates: &'t BTreeMap<Ident, Package>,
    plain: &'t BTreeSet<Ident>,
    root: String,
    /// Instantiation identity → directory.
    done: HashMap<String, String>,
    /// Directory key → the identity it was handed out to.
    claimed: HashMap<String, String>,
    /// (template, key) of instantiations in progress, outermost first.
    active: Vec<(Ident, String)>,
    created: Vec<Package>,
}

impl Instantiator<'_> {
    /// Instantiate the template named by `path` with `args`, returning the template name and instantiation dir.
    ///
    /// `scopes` are the files whose imports qualified names in `args` may refer to, innermost first.
    fn instantiate(
        &mut self,
        path: &str,
        args: &[Spanned<Expr>],
        scopes: &[&File],
        span: Span,
    ) -> Result<(Ident, String), Diagnostic> {
        let name = last_segment(path);
        let templates = self.templates;
        let Some(template) = templates.get(name) else {
            let message = if self.plain.contains(name) {
                format!("package {name} is not parameterized")
            } else {
                format!("template package {name} not found")
            };
            return Err(Diagnostic::semantic(message, span));
        };
        if args.len() != template.type_params.len() {
            return Err(Diagnostic::semantic(
                format!(
                    "wrong number of type arguments for {name}: have {}, want {}",
                    args.len(),
                    template.type_params.len()
                ),
                span,
            ));
        }

        let identity = instantiation_identity(name, args, scopes);
        if let Some(dir) = self.done.get(&identity) {
            return Ok((name.to_string(), dir.clone()));
        }
        let key = instantiation_key(name, args);
        if let Some(start) = self.active.iter().position(|(t, _)| t == name) {
            let mut chain: Vec<&str> = self.active[start..].iter().map(|(_, k)| k.as_str()).collect();
            chain.push(&key);
            return Err(Diagnostic::semantic(
                format!("instantiation cycle: {}", chain.join(" -> ")),
                span,
            ));
        }

        let key = claim_key(&mut self.claimed, key, &identity);
        tracing::debug!(template = %name, key = %key, identity = %identity, "instantiating package");
        self.active.push((name.to_string(), key.clone()));
        let result = self.build(template, &key, args, scopes);
        self.active.pop();
        let package = result?;

        let dir = package.dir.clone();
        self.done.insert(identity, dir.clone());
        self.created.push(package);
        Ok((name.to_string(), dir))
    }

    /// Copy `template`'s files for one set of arguments and add the `<template>_args` file.
    fn build(
        &mut self,
        template: &Package,
        key: &str,
        args: &[Spanned<Expr>],
        scopes: &[&File],
    ) -> Result<Package, Diagnostic> {
        let table: BTreeMap<Ident, Expr> = template
            .type_params
            .iter()
            .cloned()
            .zip(args.iter().map(|a| a.node.clone()))
            .collect();

        let mut files = Vec::with_capacity(template.files.len() + 1);
        for file in &template.files {
            let mut copy = file.clone();
            for index in 0..copy.decls.len() {
                let Decl::Import(spec) = &copy.decls[index].node else {
                    continue;
                };
                if spec.args.is_empty() {
                    continue;
                }
                let inner_args: Vec<_> = spec.args.iter().cloned().map(|a| walk::substitute(a, &table)).collect();
                let path = spec.path.clone();
                let span = copy.decls[index].span;
                let mut inner_scopes = vec![file];
                inner_scopes.extend_from_slice(scopes);
                let (inner, dir) = self.instantiate(&path, &inner_args, &inner_scopes, span)?;
                if let Decl::Import(spec) = &mut copy.decls[index].node {
                    self.rewrite(spec, inner, &dir);
                }
            }
            files.push(copy);
        }
        files.push(args_file(template, args, scopes));

        Ok(Package {
            name: template.name.clone(),
            type_params: Vec::new(),
            dir: format!("{GENERICS_DIR}/{key}"),
            files,
            bound: template.bound.clone(),
            headerless: false,
            excluded: template.excluded,
        })
    }

    /// Point an argument import at its instantiation.
    fn rewrite(&self, spec: &mut ImportSpec, template: Ident, dir: &str) {
        spec.path = join_segments(&[self.root.as_str(), dir]);
        spec.alias.get_or_insert(template);
        spec.args.clear();
    }
}

/// `<template>_args`: `type P = Arg` per parameter, plus the imports the arguments' qualifiers need.
fn args_file(template: &Package, args: &[Spanned<Expr>], scopes: &[&File]) -> File {
    let mut qualifiers = Qualifiers::default();
    args.iter().for_each(|a| qualifiers.visit_expr(a));

    let mut decls = Vec::new();
    for qualifier in qualifiers.names {
        if let Some(spec) = resolve_qualifier(qualifier, scopes) {
            decls.push(Spanned::new(Decl::Import(spec), Span::default()));
        }
    }
    for (param, arg) in template.type_params.iter().zip(args) {
        decls.push(Spanned::new(
            Decl::Type(TypeSpec {
                name: Spanned::new(param.clone(), arg.span),
                alias: true,
                ty: arg.clone(),
                group: None,
            }),
            arg.span,
        ));
    }

    File {
        package: template.name.clone(),
        name: format!("{}_args", template.name),
        source: template.files.first().map(|f| f.source.clone()).unwrap_or_default(),
        decls,
        ..File::default()
    }
}

/// Package qualifiers (`pkg` in `pkg.T`) used by type arguments, in first-use order.
#[derive(Default)]
struct Qualifiers<'ast> {
    names: Vec<&'ast str>,
}

impl<'ast> Visitor<'ast> for Qualifiers<'ast> {
    fn visit_expr(&mut self, expr: &'ast Spanned<Expr>) {
        if let Expr::Selector { x, .. } = &expr.node {
            if let Some(name) = x.node.as_name() {
                if !self.names.contains(&name) {
                    self.names.push(name);
                }
                return;
            }
        }
        walk::inspect_expr(self, expr);
    }
}

/// The import binding `qualifier` in the first scope that has one.
fn resolve_qualifier(qualifier: &str, scopes: &[&File]) -> Option<ImportSpec> {
    scopes.iter().find_map(|file| {
        if let Some(spec) = file.imports().find(|s| s.local_name() == qualifier) {
            return Some(ImportSpec {
                args: Vec::new(),
                group: None,
                ..spec.clone()
            });
        }
        file.aliases.get(qualifier).map(|path| ImportSpec {
            alias: (last_segment(path) != qualifier).then(|| qualifier.to_string()),
            path: path.clone(),
            args: Vec::new(),
            group: None,
        })
    })
}

/// `<template>_<mangled args>`, restricted to identifier characters.
///
/// When an argument's spelling leaves out part of its type (struct, func and interface types, computed array
/// lengths), a hash of the arguments' canonical text is appended.
pub fn instantiation_key(template: &str, args: &[Spanned<Expr>]) -> String {
    let mut key = template.to_string();
    let mut exact = true;
    for arg in args {
        key.push('_');
        exact &= mangle_into(&arg.node, &mut key);
    }
    if !exact {
        let text: Vec<String> = args.iter().map(|a| canonical(&a.node, &[])).collect();
        key.push_str(&format!("_{:08x}", fnv1a(&text.join(", "))));
    }
    key.chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Spell a type argument as an identifier fragment.
///
/// ```text
/// []T         -> slice_T
/// [4]T        -> array4_T
/// *T          -> ptr_T
/// map[K]V     -> map_K_V
/// chan T      -> chan_T
/// <-chan T    -> recvchan_T
/// chan<- T    -> sendchan_T
/// pkg.T       -> pkg_T
/// struct{...} -> struct
/// ```
pub fn mangle(ty: &Expr) -> String {
    let mut out = String::new();
    mangle_into(ty, &mut out);
    out
}

/// Append the spelling of `ty` to `out`; `false` when the spelling drops detail of the type.
fn mangle_into(ty: &Expr, out: &mut String) -> bool {
    match ty {
        Expr::Name(name) => {
            out.push_str(name);
            true
        }
        Expr::Paren(x) => mangle_into(&x.node, out),
        Expr::Selector { x, sel } => {
            let exact = mangle_into(&x.node, out);
            out.push('_');
            out.push_str(&sel.node);
            exact
        }
        Expr::Star(x) => {
            out.push_str("ptr_");
            mangle_into(&x.node, out)
        }
        Expr::Array { len: None, elem } => {
            out.push_str("slice_");
            mangle_into(&elem.node, out)
        }
        Expr::Array { len: Some(len), elem } => {
            let exact = match &len.node {
                Expr::Lit(lit) if lit.raw.bytes().all(|b| b.is_ascii_digit()) => {
                    out.push_str("array");
                    out.push_str(&lit.raw);
                    true
                }
                _ => {
                    out.push_str("array");
                    false
                }
            };
            out.push('_');
            mangle_into(&elem.node, out) && exact
        }
        Expr::Map { key, value } => {
            out.push_str("map_");
            let exact = mangle_into(&key.node, out);
            out.push('_');
            mangle_into(&value.node, out) && exact
        }
        Expr::Chan { dir, value } => {
            out.push_str(match dir {
                ChanDir::Both => "chan_",
                ChanDir::Recv => "recvchan_",
                ChanDir::Send => "sendchan_",
            });
            mangle_into(&value.node, out)
        }
        Expr::Struct(fields) => {
            out.push_str("struct");
            fields.is_empty()
        }
        Expr::Interface(methods) => {
            out.push_str("interface");
            methods.is_empty()
        }
        Expr::Func(_) => {
            out.push_str("func");
            false
        }
        _ => {
            out.push_str("type");
            false
        }
    }
}

/// The identity of an instantiation: the template and its arguments' canonical text.
fn instantiation_identity(template: &str, args: &[Spanned<Expr>], scopes: &[&File]) -> String {
    let args: Vec<String> = args.iter().map(|a| canonical(&a.node, scopes)).collect();
    format!("{template}({})", args.join(", "))
}

/// Go spelling of a type without positions.
///
/// Qualifiers that resolve through an import in `scopes` are replaced by the quoted import path, so `big.Int`
/// from two different `big` packages spells differently. Parentheses are dropped except where they change
/// the meaning.
fn canonical(ty: &Expr, scopes: &[&File]) -> String {
    match ty {
        Expr::Name(name) => name.to_string(),
        Expr::Lit(lit) => lit.raw.clone(),
        Expr::Paren(x) => canonical(&x.node, scopes),
        Expr::Selector { x, sel } => {
            if let Expr::Name(qualifier) = &x.node {
                if let Some(spec) = resolve_qualifier(qualifier, scopes) {
                    return format!("{:?}.{}", spec.path, sel.node);
                }
            }
            format!("{}.{}", canonical(&x.node, scopes), sel.node)
        }
        Expr::Star(x) => format!("*{}", canonical(&x.node, scopes)),
        Expr::Array { len, elem } => {
            let len = len.as_ref().map(|l| canonical(&l.node, scopes)).unwrap_or_default();
            format!("[{len}]{}", canonical(&elem.node, scopes))
        }
        Expr::Ellipsis(elem) => match elem {
            Some(elem) => format!("...{}", canonical(&elem.node, scopes)),
            None => "...".to_string(),
        },
        Expr::Map { key, value } => format!("map[{}]{}", canonical(&key.node, scopes), canonical(&value.node, scopes)),
        Expr::Chan { dir, value } => {
            let inner = canonical(&value.node, scopes);
            match dir {
                ChanDir::Both if matches!(strip_parens(&value.node), Expr::Chan { dir: ChanDir::Recv, .. }) => {
                    format!("chan ({inner})")
                }
                ChanDir::Both => format!("chan {inner}"),
                ChanDir::Recv => format!("<-chan {inner}"),
                ChanDir::Send => format!("chan<- {inner}"),
            }
        }
        Expr::Struct(fields) => format!("struct{{{}}}", canonical_fields(fields, scopes)),
        Expr::Interface(methods) => format!("interface{{{}}}", canonical_fields(methods, scopes)),
        Expr::Func(sig) => format!("func{}", canonical_signature(sig, scopes)),
        Expr::Unary { op, x } => format!("{}{}", operators::as_str(*op), canonical(&x.node, scopes)),
        Expr::Binary { op, x, y } => format!(
            "({} {} {})",
            canonical(&x.node, scopes),
            operators::as_str(*op),
            canonical(&y.node, scopes)
        ),
        Expr::Call { fun, args, spread } => {
            let args: Vec<String> = args.iter().map(|a| canonical(&a.node, scopes)).collect();
            let dots = if *spread { "..." } else { "" };
            format!("{}({}{dots})", canonical(&fun.node, scopes), args.join(", "))
        }
        Expr::Index { x, index } => format!("{}[{}]", canonical(&x.node, scopes), canonical(&index.node, scopes)),
        // Anything else keeps its positions, which can only split instantiations apart.
        other => format!("{other:?}"),
    }
}

fn canonical_fields(fields: &[Field], scopes: &[&File]) -> String {
    let fields: Vec<String> = fields
        .iter()
        .map(|field| {
            let mut text = field.names.iter().map(|n| n.node.to_string()).collect::<Vec<_>>().join(", ");
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(&canonical(&field.ty.node, scopes));
            if let Some(tag) = &field.tag {
                text.push(' ');
                text.push_str(tag);
            }
            text
        })
        .collect();
    fields.join("; ")
}

fn canonical_signature(sig: &FuncType, scopes: &[&File]) -> String {
    let params = canonical_fields(&sig.params, scopes).replace("; ", ", ");
    let results = canonical_fields(&sig.results, scopes).replace("; ", ", ");
    if results.is_empty() {
        format!("({params})")
    } else {
        format!("({params}) ({results})")
    }
}

fn strip_parens(ty: &Expr) -> &Expr {
    match ty {
        Expr::Paren(x) => strip_parens(&x.node),
        other => other,
    }
}

/// 32-bit FNV-1a, stable across builds and platforms.
fn fnv1a(text: &str) -> u32 {
    text.bytes()
        .fold(0x811c_9dc5, |hash, b| (hash ^ u32::from(b)).wrapping_mul(0x0100_0193))
}

/// Reserve the directory key `key` for `identity`.
///
/// A key already held by a different identity gets a hash of `identity` appended (and a counter after that, should
/// the hashed key be taken as well), so two instantiations never share a directory.
fn claim_key(claimed: &mut HashMap<String, String>, key: String, identity: &str) -> String {
    let hashed = format!("{key}_{:08x}", fnv1a(identity));
    let mut candidate = key;
    let mut n = 1;
    loop {
        match claimed.get(&candidate) {
            Some(owner) if owner == identity => return candidate,
            Some(_) => {
                candidate = if n == 1 { hashed.clone() } else { format!("{hashed}_{n}") };
                n += 1;
            }
            None => {
                claimed.insert(candidate.clone(), identity.to_string());
                return candidate;
            }
        }
    }
}

// ============================================================================
// Emission
// ============================================================================

/// Prepend one import spec per inferred import, in reverse encounter order.
fn attach_inferred_imports(file: &mut File) {
    for inferred in std::mem::take(&mut file.inferred) {
        let alias = (last_segment(&inferred.path) != inferred.alias).then_some(inferred.alias);
        let spec = ImportSpec {
            alias,
            path: inferred.path,
            args: Vec::new(),
            group: Some(INFERRED_IMPORT_GROUP),
        };
        file.decls.insert(0, Spanned::new(Decl::Import(spec), Span::default()));
    }
}

/// Join path segments with `/`, leaving out empty ones.
fn join_segments(segments: &[&str]) -> String {
    segments
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("/")
}

/// The output key for `name` in `dir`, renaming `name` with `_2`, `_3`, ... until the key is free.
fn unique_key(out: &OutputMap, root: &str, dir: &str, name: &mut String) -> String {
    let key = format!("{}.go", join_segments(&[root, dir, name.as_str()]));
    if !out.contains_key(&key) {
        return key;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{name}_{n}");
        let key = format!("{}.go", join_segments(&[root, dir, candidate.as_str()]));
        if !out.contains_key(&key) {
            tracing::debug!(key = %key, "renamed colliding output file");
            *name = candidate;
            return key;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{self, ParseOptions, Parsed};
    use crate::parser::parse_type;
    use proptest::prelude::*;

    fn parse(name: &str, source: &str) -> Parsed {
        api::parse_bytes(name, source.as_bytes(), ParseOptions::default()).unwrap()
    }

    fn parse_err(name: &str, source: &str) -> Diagnostic {
        api::parse_bytes(name, source.as_bytes(), ParseOptions::default()).unwrap_err()
    }

    fn imports(file: &File) -> Vec<&ImportSpec> {
        file.imports().collect()
    }

    const GENERIC_ID: &str = "package p (T)\nfunc Id(x T) T { return x }\n";

    #[test]
    fn argument_import_instantiates_template() {
        let source = format!("{GENERIC_ID}package main\nimport \"p\" (int)\nfunc main() {{ _ = p.Id(1) }}\n");
        let parsed = parse("x.goppx", &source);

        let keys: Vec<_> = parsed.files.keys().map(String::as_str).collect();
        assert_eq!(keys, ["generics/p_int/p_args.go", "generics/p_int/x.go", "main/x.go"]);

        let args = &parsed.files["generics/p_int/p_args.go"];
        let Decl::Type(spec) = &args.decls[0].node else {
            panic!("expected type alias, got {:?}", args.decls[0].node);
        };
        assert_eq!(spec.name.node, "T");
        assert!(spec.alias);
        assert_eq!(spec.ty.node.as_name(), Some("int"));

        let main = &parsed.files["main/x.go"];
        let import = imports(main)[0];
        assert_eq!(import.path, "generics/p_int");
        assert_eq!(import.alias.as_deref(), Some("p"));
        assert!(import.args.is_empty());
    }

    #[test]
    fn instantiations_are_shared_and_rooted() {
        let source = format!(
            "project demo\n{GENERIC_ID}package a\nimport \"p\" (int)\npackage b\nimport q \"p\" (int)\n"
        );
        let parsed = parse("x.goppx", &source);
        let a = imports(&parsed.files["demo/a/x.go"])[0].clone();
        let b = imports(&parsed.files["demo/b/x.go"])[0].clone();
        assert_eq!(a.path, "demo/generics/p_int");
        assert_eq!(b.path, a.path);
        assert_eq!(b.alias.as_deref(), Some("q"));
        let instantiated = parsed
            .files
            .keys()
            .filter(|k| k.starts_with("demo/generics/"))
            .count();
        assert_eq!(instantiated, 2);
    }

    #[test]
    fn qualified_arguments_re_export_their_imports() {
        let source = format!("{GENERIC_ID}package main\nimport \"math/big\"\nimport \"p\" (*big.Int)\n");
        let parsed = parse("x.goppx", &source);
        let args = &parsed.files["generics/p_ptr_big_Int/p_args.go"];
        assert_eq!(imports(args)[0].path, "math/big");
        assert!(matches!(args.decls[1].node, Decl::Type(TypeSpec { alias: true, .. })));
    }

    #[test]
    fn template_argument_imports_are_instantiated_recursively() {
        let source = "package box (T)\ntype Box struct { v T }\n\
                      package list (E)\nimport \"box\" ([]E)\ntype List []box.Box\n\
                      package main\nimport \"list\" (string)\n";
        let parsed = parse("x.goppx", source);
        let list = &parsed.files["generics/list_string/x.go"];
        let import = imports(list)[0];
        assert_eq!(import.path, "generics/box_slice_string");
        assert_eq!(import.alias.as_deref(), Some("box"));
        let boxed = &parsed.files["generics/box_slice_string/box_args.go"];
        let Decl::Type(spec) = &boxed.decls[0].node else {
            panic!("expected type alias");
        };
        assert!(matches!(spec.ty.node, Expr::Array { len: None, .. }));
    }

    #[test]
    fn wrong_argument_count() {
        let err = parse_err("x.goppx", "package p (K, V)\npackage main\nimport \"p\" (int)\n");
        assert_eq!(err.message, "wrong number of type arguments for p: have 1, want 2");
        assert_eq!(err.position.line, 3);
    }

    #[test]
    fn plain_package_with_arguments() {
        let err = parse_err("x.goppx", "package q\npackage main\nimport \"q\" (int)\n");
        assert_eq!(err.message, "package q is not parameterized");
    }

    #[test]
    fn missing_template() {
        let err = parse_err("x.goppx", "package main\nimport \"lib/zz\" (int)\n");
        assert_eq!(err.message, "template package zz not found");
    }

    #[test]
    fn self_instantiation_is_a_cycle() {
        let source = "package p (T)\nimport \"p\" ([]T)\npackage main\nimport \"p\" (int)\n";
        let err = parse_err("x.goppx", source);
        insta::assert_snapshot!(err.message, @"instantiation cycle: p_int -> p_slice_int");
    }

    #[test]
    fn inferred_imports_are_prepended_in_reverse_order() {
        let source = "package p\nfunc f() {\n\t_ = \"strings\".ToUpper(\"a\")\n\t_ = \"gopkg.in/yaml.v3\".Marshal(1)\n}\n";
        let parsed = parse("x.gopp", source);
        let file = &parsed.files["p/x.go"];
        let specs = imports(file);
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].path, "gopkg.in/yaml.v3");
        assert_eq!(specs[0].alias.as_deref(), Some("yaml_v3"));
        assert_eq!(specs[1].path, "strings");
        assert_eq!(specs[1].alias, None);
        assert!(specs.iter().all(|s| s.group == Some(INFERRED_IMPORT_GROUP)));
        assert!(file.inferred.is_empty());
    }

    #[test]
    fn colliding_names_get_numbered() {
        let parsed = parse("x.gopp", "package p\nsection a\nfunc f() {}\nsection a\nfunc g() {}\n");
        let keys: Vec<_> = parsed.files.keys().map(String::as_str).collect();
        assert_eq!(keys, ["p/a.go", "p/a_2.go"]);
        assert_eq!(parsed.files["p/a_2.go"].name, "a_2");
    }

    #[test]
    fn mangling_spells_type_structure() {
        let ty = parse_type("map[string][]*pkg.T", ParseOptions::default()).unwrap();
        assert_eq!(mangle(&ty.node), "map_string_slice_ptr_pkg_T");
        let ty = parse_type("[4]chan int", ParseOptions::default()).unwrap();
        assert_eq!(mangle(&ty.node), "array4_chan_int");
        let ty = parse_type("[n]<-chan int", ParseOptions::default()).unwrap();
        assert_eq!(mangle(&ty.node), "array_recvchan_int");
        assert_eq!(mangle(&Expr::Struct(Vec::new())), "struct");
    }

    #[test]
    fn lossy_spellings_get_a_hash_suffix() {
        let arg = |text: &str| parse_type(text, ParseOptions::default()).unwrap();
        let a = instantiation_key("p", &[arg("struct{A int}")]);
        let b = instantiation_key("p", &[arg("struct{B string}")]);
        assert!(a.starts_with("p_struct_"), "{a}");
        assert_ne!(a, b);
        assert_ne!(instantiation_key("p", &[arg("[n]int")]), instantiation_key("p", &[arg("[m]int")]));
        assert_eq!(instantiation_key("p", &[arg("[4]int")]), "p_array4_int");
    }

    #[test]
    fn differently_shaped_struct_arguments_instantiate_separately() {
        let source = format!(
            "{GENERIC_ID}package a\nimport \"p\" (struct{{A int}})\n\
             package b\nimport \"p\" (struct{{B string}})\n\
             package c\nimport \"p\" (struct{{A int}})\n"
        );
        let parsed = parse("x.goppx", &source);
        let path = |file: &str| imports(&parsed.files[file])[0].path.clone();
        let (a, b, c) = (path("a/x.go"), path("b/x.go"), path("c/x.go"));
        assert!(a.starts_with("generics/p_struct_"), "{a}");
        assert_ne!(a, b);
        assert_eq!(a, c);

        let args_files = parsed.files.keys().filter(|k| k.ends_with("/p_args.go")).count();
        assert_eq!(args_files, 2);
        let Decl::Type(spec) = &parsed.files[&format!("{b}/p_args.go")].decls[0].node else {
            panic!("expected type alias");
        };
        let Expr::Struct(fields) = &spec.ty.node else {
            panic!("expected struct, got {:?}", spec.ty.node);
        };
        assert_eq!(fields[0].names[0].node, "B");
    }

    #[test]
    fn channel_directions_instantiate_separately() {
        let source = format!(
            "{GENERIC_ID}package main\nimport c \"p\" (chan int)\nimport r \"p\" (<-chan int)\nimport s \"p\" (chan<- int)\n"
        );
        let parsed = parse("x.goppx", &source);
        let paths: Vec<_> = imports(&parsed.files["main/x.go"]).into_iter().map(|s| s.path.as_str()).collect();
        insta::assert_snapshot!(paths.join(" "), @"generics/p_chan_int generics/p_recvchan_int generics/p_sendchan_int");
    }

    #[test]
    fn qualified_and_underscored_names_do_not_share_instantiations() {
        let source = format!(
            "{GENERIC_ID}package a\nimport \"lib/pkg\"\nimport x \"p\" (pkg.T)\nimport y \"p\" (pkg_T)\n\
             package b\nimport pkg \"other/lib\"\nimport \"p\" (pkg.T)\n"
        );
        let parsed = parse("x.goppx", &source);
        let a = imports(&parsed.files["a/x.go"]);
        let b = imports(&parsed.files["b/x.go"]);
        let dirs: BTreeSet<&str> = [a[1].path.as_str(), a[2].path.as_str(), b[1].path.as_str()].into_iter().collect();
        assert_eq!(dirs.len(), 3, "{dirs:?}");
        assert!(dirs.iter().all(|d| d.starts_with("generics/p_pkg_T")), "{dirs:?}");
    }

    #[test]
    fn canonical_text_keeps_channel_nesting() {
        let ty = parse_type("chan (<-chan int)", ParseOptions::default()).unwrap();
        assert_eq!(canonical(&ty.node, &[]), "chan (<-chan int)");
        let ty = parse_type("chan<- chan int", ParseOptions::default()).unwrap();
        assert_eq!(canonical(&ty.node, &[]), "chan<- chan int");
    }

    /// Type texts already in canonical spelling.
    fn type_text() -> impl Strategy<Value = String> {
        let leaf = prop_oneof![Just("int".to_string()), Just("string".to_string()), Just("big.Int".to_string())];
        leaf.prop_recursive(4, 24, 2, |inner| {
            prop_oneof![
                inner.clone().prop_map(|t| format!("[]{t}")),
                inner.clone().prop_map(|t| format!("*{t}")),
                inner.clone().prop_map(|t| format!("[4]{t}")),
                (inner.clone(), inner.clone()).prop_map(|(k, v)| format!("map[{k}]{v}")),
                inner.clone().prop_map(|t| {
                    if t.starts_with("<-chan") {
                        format!("chan ({t})")
                    } else {
                        format!("chan {t}")
                    }
                }),
                inner.clone().prop_map(|t| format!("<-chan {t}")),
                inner.clone().prop_map(|t| format!("chan<- {t}")),
                inner.prop_map(|t| format!("struct{{A {t}}}")),
            ]
        })
    }

    proptest! {
        /// Property: canonical text spells a parsed type back exactly, so distinct types never share an identity.
        #[test]
        fn canonical_text_reproduces_the_type(text in type_text()) {
            let ty = parse_type(&text, ParseOptions::default()).unwrap();
            prop_assert_eq!(canonical(&ty.node, &[]), text);
        }

        /// Property: each identity keeps one directory, and no two identities share one.
        #[test]
        fn claimed_keys_are_one_to_one(ids in proptest::collection::vec(0..6u8, 1..32)) {
            let mut claimed = HashMap::new();
            let mut dirs: BTreeMap<u8, String> = BTreeMap::new();
            for id in ids {
                let identity = format!("p(T{id})");
                let dir = claim_key(&mut claimed, format!("p_{}", id % 2), &identity);
                if let Some(previous) = dirs.get(&id) {
                    prop_assert_eq!(previous, &dir);
                }
                dirs.insert(id, dir);
            }
            let distinct: BTreeSet<&String> = dirs.values().collect();
            prop_assert_eq!(distinct.len(), dirs.len());
        }
    }

    #[test]
    fn key_segments_skip_empty_parts() {
        assert_eq!(join_segments(&["", "generics/p_int"]), "generics/p_int");
        let mut out = OutputMap::new();
        let mut name = "tool".to_string();
        let key = unique_key(&out, "", "", &mut name);
        assert_eq!(key, "tool.go");
        out.insert(key, File::default());
        assert_eq!(unique_key(&out, "", "", &mut name), "tool_2.go");
        assert_eq!(name, "tool_2");
    }
}
