/// Project, package and section structure.
///
/// This chunk parses the outer layers of an input (`project` header, `package` headers, sections and the
/// directives between them) and composes finished packages: output file names, hosting of bare statements,
/// branch checking and hand-off to the session.
impl<'a> Parser<'a> {
    // ========================================================================
    // Project
    // ========================================================================

    /// Parse a whole input: optional `project` header, top directives and packages.
    pub(crate) fn pkgs(&mut self) {
        self.skip_semis();
        if self.peek().kind.is_ident("project") && matches!(self.peek_nth(1).kind, TokenKind::Ident(_)) {
            self.project_header();
        }
        loop {
            self.skip_semis();
            if self.is_at_end() || self.aborted() {
                break;
            }
            if self.at_directive("use") {
                self.in_section = false;
                self.use_directive();
            } else if self.at_directive("include") {
                self.include();
            } else if !self.pkg_or_nil() {
                // No progress: skip the offending token so the loop terminates.
                let diag = self.unexpected("package clause");
                self.report(diag);
                self.sync_stmt(true);
            }
        }
        self.flush_lex_errors(usize::MAX);
    }

    fn project_header(&mut self) {
        let span = self.advance().span;
        let permitted = self.gate(PermitId::ProjectHeader, span);
        let name = match self.ident() {
            Ok(name) => name,
            Err(diag) => {
                self.report(diag);
                self.sync_stmt(true);
                return;
            }
        };
        if permitted {
            let project = &mut self.session.project;
            match &project.name {
                Some(existing) if *existing != name.node => {
                    let message = format!("project {} conflicts with project {existing}", name.node);
                    self.report(Diagnostic::semantic(message, name.span));
                }
                Some(_) => {}
                None => {
                    project.root = name.node.clone();
                    project.name = Some(name.node);
                }
            }
        }
        if let Err(diag) = self.expect_semi("after project header") {
            self.report(diag);
            self.sync_stmt(true);
        }
    }

    /// `true` at `<word> "string"`, the shape of `use` and `include` directives.
    fn at_directive(&self, word: &str) -> bool {
        self.peek().kind.is_ident(word)
            && matches!(&self.peek_nth(1).kind, TokenKind::Literal(lit) if lit.kind == LitKind::String)
    }

    // ========================================================================
    // Packages
    // ========================================================================

    /// Parse one package: an optional header followed by its sections.
    ///
    /// Returns `false` when no token was consumed.
    pub(crate) fn pkg_or_nil(&mut self) -> bool {
        let start = self.pos;
        let mut pkg = Package::default();
        let mut header_dir = None;

        if self.check_keyword(KeywordId::Package) {
            if let Err(diag) = self.package_header(&mut pkg, &mut header_dir) {
                self.report(diag);
                self.sync_stmt(true);
            }
        } else {
            let span = self.current_span();
            self.gate(PermitId::HeaderlessPackages, span);
            pkg.headerless = true;
        }

        self.bound.clear();
        self.bare.clear();
        self.bare_file = None;
        self.arg_imports.clear();

        while !self.is_at_end() && !self.check_keyword(KeywordId::Package) && !self.aborted() {
            let before = self.pos;
            let file = self.section_or_nil(&pkg.name, pkg.files.len());
            pkg.files.push(file);
            if self.pos == before {
                break;
            }
        }
        if pkg.files.is_empty() {
            let mut file = File {
                package: pkg.name.clone(),
                source: self.name.clone(),
                ..File::default()
            };
            file.comments.extend(self.floating.drain(..));
            pkg.files.push(file);
        }

        self.finish_package(&mut pkg, header_dir);
        let arg_imports = std::mem::take(&mut self.arg_imports);
        self.session.add_package(pkg, arg_imports);
        self.pos > start
    }

    /// `package name [(T, U)] ["dir"]`
    fn package_header(&mut self, pkg: &mut Package, dir: &mut Option<String>) -> PResult<()> {
        let span = self.advance().span;
        self.gate(PermitId::PackageClause, span);
        pkg.name = self.ident()?.node;
        if self.check_punct(PunctuationId::LParen) {
            self.require(PermitId::Generics, self.current_span())?;
            self.advance();
            while !self.check_punct(PunctuationId::RParen) {
                pkg.type_params.push(self.ident()?.node);
                if !self.match_punct(PunctuationId::Comma) {
                    break;
                }
            }
            self.expect_punct(PunctuationId::RParen)?;
        }
        if matches!(&self.peek().kind, TokenKind::Literal(lit) if lit.kind == LitKind::String) {
            let (raw, _) = self.string_lit("package directory")?;
            *dir = Some(unquote(&raw));
        }
        self.expect_semi("after package clause")
    }

    // ========================================================================
    // Sections
    // ========================================================================

    /// `true` at `section name`, `main` or `testcode` followed by a terminator.
    fn at_section_header(&self) -> bool {
        match &self.peek().kind {
            TokenKind::Ident(word) if word == "section" => {
                matches!(self.peek_nth(1).kind, TokenKind::Ident(_)) && self.peek_nth(2).kind.is_semi()
            }
            TokenKind::Ident(word) if word == "main" || word == "testcode" => self.peek_nth(1).kind.is_semi(),
            _ => false,
        }
    }

    /// Parse one section into a [`File`]: optional header, then directives, imports, declarations and bare
    /// statements up to the next section header, package header or end of input.
    pub(crate) fn section_or_nil(&mut self, package: &str, index: usize) -> File {
        self.in_section = true;
        self.dynamic = self.input_dynamic.clone();
        self.file = File {
            package: package.to_string(),
            source: self.name.clone(),
            ..File::default()
        };

        self.skip_semis();
        if self.at_section_header() {
            self.section_header();
        }

        let mut seen_decl = false;
        while !self.is_at_end() && !self.check_keyword(KeywordId::Package) && !self.at_section_header() {
            if self.aborted() {
                break;
            }
            self.skip_semis();
            if self.is_at_end() || self.check_keyword(KeywordId::Package) || self.at_section_header() {
                break;
            }
            self.section_item(index, &mut seen_decl);
        }

        self.in_section = false;
        self.file.comments.extend(self.floating.drain(..));
        let pos = self.pos;
        let stale: Vec<usize> = self.leads.range(..pos).map(|(k, _)| *k).collect();
        for key in stale {
            if let Some(group) = self.leads.remove(&key) {
                self.file.comments.push(group);
            }
        }
        std::mem::take(&mut self.file)
    }

    fn section_header(&mut self) {
        let token = self.advance();
        self.gate(PermitId::Sections, token.span);
        let kind = match &token.kind {
            TokenKind::Ident(word) if word == "main" => SectionKind::Main,
            TokenKind::Ident(word) if word == "testcode" => SectionKind::TestCode,
            _ => match self.ident() {
                Ok(name) => SectionKind::Named(name.node),
                Err(diag) => {
                    self.report(diag);
                    SectionKind::Named(String::new())
                }
            },
        };
        self.file.section = Some(kind);
        self.skip_semis();
    }

    /// One directive, declaration or run of bare statements.
    fn section_item(&mut self, index: usize, seen_decl: &mut bool) {
        if self.at_directive("use") {
            self.use_directive();
            return;
        }
        if self.at_directive("include") {
            self.include();
            return;
        }

        let start = self.current_span().start;
        let is_decl = matches!(
            self.peek().kind.keyword_id(),
            Some(KeywordId::Import | KeywordId::Const | KeywordId::Var | KeywordId::Type)
        ) || self.at_func_decl();

        if !is_decl {
            let span = self.current_span();
            let permitted = self.gate(PermitId::TopLevelStatements, span);
            let stmts = self.stmt_list(ListContext::TopLevel);
            if permitted && !stmts.is_empty() {
                self.file.has_bare_stmts = true;
                self.bare_file.get_or_insert(index);
                self.bare.extend(stmts);
            }
            return;
        }

        if self.check_keyword(KeywordId::Import) && *seen_decl {
            let span = self.current_span();
            self.report(Diagnostic::syntax("imports must appear before other declarations", span));
        }
        match self.top_level_decl() {
            Ok(decls) => {
                for decl in decls {
                    let is_import = matches!(decl.node, Decl::Import(_));
                    *seen_decl |= !is_import;
                    self.add_file_decl(index, decl);
                }
                if let Err(diag) = self.expect_semi("after top level declaration") {
                    self.report(diag);
                    self.sync_stmt(true);
                }
            }
            Err(diag) => {
                self.report(diag);
                self.file.decls.push(Spanned::new(Decl::Bad, self.span_from(start)));
                self.sync_stmt(true);
            }
        }
    }

    /// Record a package-level declaration in the current file.
    fn add_file_decl(&mut self, index: usize, decl: Spanned<Decl>) {
        match &decl.node {
            Decl::Import(spec) => {
                let local = spec.local_name();
                if local != "_" && local != "." {
                    self.bound.insert(local.to_string());
                }
                if !spec.args.is_empty() {
                    let position = self.position_of(decl.span.start);
                    self.arg_imports.push((index, self.file.decls.len(), decl.span, position));
                }
            }
            Decl::Const(spec) | Decl::Var(spec) => {
                self.bound.extend(spec.names.iter().map(|n| n.node.clone()));
            }
            Decl::Type(spec) => {
                self.bound.insert(spec.name.node.clone());
            }
            Decl::Func(func) => {
                if func.recv.is_none() {
                    self.bound.insert(func.name.node.clone());
                }
                if func.is_entry() {
                    self.file.has_entry = true;
                }
            }
            Decl::Bad => {}
        }
        self.file.decls.push(decl);
    }

    // ========================================================================
    // Directives
    // ========================================================================

    /// `use "name" [(args)] [-> rets]`
    fn use_directive(&mut self) {
        let start = self.current_span().start;
        if let Err(diag) = self.use_directive_inner(start) {
            self.report(diag);
            self.sync_stmt(true);
        }
    }

    fn use_directive_inner(&mut self, start: usize) -> PResult<()> {
        let keyword = self.advance();
        self.require(PermitId::UseDirectives, keyword.span)?;
        let (raw, name_span) = self.string_lit("directive name")?;
        let name = unquote(&raw);

        let mut args = Vec::new();
        if self.match_punct(PunctuationId::LParen) {
            while !self.check_punct(PunctuationId::RParen) && !self.is_at_end() {
                args.push(self.directive_arg()?);
                if !self.match_punct(PunctuationId::Comma) {
                    break;
                }
            }
            self.expect_punct(PunctuationId::RParen)?;
        }
        let mut rets = Vec::new();
        if self.match_punct(PunctuationId::Arrow) {
            rets.push(self.ident()?);
            while self.match_punct(PunctuationId::Comma) {
                rets.push(self.ident()?);
            }
        }
        let directive = UseDirective {
            name,
            args,
            rets,
            span: self.span_from(start),
        };
        self.expect_semi("after use directive")?;

        let registry = Arc::clone(&self.session.macros);
        let trigger = Spanned::new(directive.name.clone(), name_span);
        tracing::debug!(directive = %directive.name, "applying use directive");
        match registry.use_macro(&directive.name) {
            Some(UseMacro::Builtin(builtin)) => {
                let builtin = *builtin;
                builtins::apply_use(builtin, &mut MacroContext::new(self, trigger), &directive)
            }
            Some(UseMacro::Custom(handler)) => {
                let handler = Arc::clone(handler);
                handler(&mut MacroContext::new(self, trigger), &directive)
            }
            None => Err(Diagnostic::semantic(
                format!("unknown use directive \"{}\"", directive.name),
                name_span,
            )),
        }
    }

    /// A directive argument: an expression, or a keyword spelled as a name (`use "blacklist" (goto)`).
    fn directive_arg(&mut self) -> PResult<Spanned<Expr>> {
        if let Some(id) = self.peek().kind.keyword_id() {
            let span = self.advance().span;
            return Ok(Spanned::new(Expr::name(gopp_core::lang::keywords::as_str(id)), span));
        }
        self.expr()
    }

    /// `include "path"`: parse another input into the same project.
    fn include(&mut self) {
        let keyword = self.advance();
        let permitted = self.gate(PermitId::Include, keyword.span);
        let (raw, span) = match self.string_lit("include path") {
            Ok(lit) => lit,
            Err(diag) => {
                self.report(diag);
                self.sync_stmt(true);
                return;
            }
        };
        if let Err(diag) = self.expect_semi("after include directive") {
            self.report(diag);
            self.sync_stmt(true);
        }
        if !permitted {
            return;
        }
        let path = unquote(&raw);
        let span = keyword.span.merge(span);

        if self.session.depth >= self.session.max_include_depth {
            let message = format!(
                "include {path:?}: nesting exceeds the limit of {}",
                self.session.max_include_depth
            );
            self.report(Diagnostic::io(message, span));
            return;
        }
        let fetched = match self.session.include_resolver.as_mut() {
            Some(resolver) => resolver(&path).map_err(|e| e.to_string()),
            None => Err("no include resolver".to_string()),
        };
        let text = match fetched.and_then(|bytes| String::from_utf8(bytes).map_err(|_| "invalid UTF-8".to_string())) {
            Ok(text) => text,
            Err(e) => {
                self.report(Diagnostic::io(format!("include {path:?}: {e}"), span));
                return;
            }
        };

        tracing::debug!(path = %path, depth = self.session.depth + 1, "including");
        self.session.depth += 1;
        {
            let mut nested = Parser::new(&mut *self.session, &path, &text);
            nested.pkgs();
        }
        self.session.depth -= 1;
    }

    // ========================================================================
    // Package composition
    // ========================================================================

    /// Name files, host bare statements, check branches and settle the package's name and directory.
    fn finish_package(&mut self, pkg: &mut Package, header_dir: Option<String>) {
        let has_entry = pkg.files.iter().any(|f| f.has_entry);
        if pkg.headerless {
            pkg.name = "main".to_string();
            pkg.excluded = has_entry;
        }
        pkg.dir = match header_dir {
            Some(dir) => dir,
            None if pkg.headerless => String::new(),
            None => pkg.name.clone(),
        };

        let stem = source_stem(&self.name);
        for (index, file) in pkg.files.iter_mut().enumerate() {
            file.package = pkg.name.clone();
            file.excluded = pkg.excluded;
            file.name = match &file.section {
                Some(SectionKind::Named(name)) if !name.is_empty() => name.clone(),
                Some(SectionKind::Main) => "main".to_string(),
                Some(SectionKind::TestCode) => format!("{}_test", pkg.name),
                _ if index == 0 && !stem.is_empty() => stem.to_string(),
                _ => pkg.name.clone(),
            };
        }

        self.host_bare_stmts(pkg, has_entry);

        if self.session.mode.contains(Mode::CHECK_BRANCHES) {
            self.check_branches(pkg);
        }
        pkg.bound = std::mem::take(&mut self.bound);
    }

    /// Move the package's bare statements into a synthesized `main` or `init`.
    fn host_bare_stmts(&mut self, pkg: &mut Package, has_entry: bool) {
        let stmts = std::mem::take(&mut self.bare);
        let index = self.bare_file.take().unwrap_or(0);
        if stmts.is_empty() {
            if pkg.headerless && !has_entry {
                if let Some(file) = pkg.files.first_mut() {
                    file.decls.push(Spanned::new(Decl::Func(synthesized_func("main", Block::default())), Span::default()));
                    file.has_entry = true;
                }
            }
            return;
        }
        let span = stmts
            .iter()
            .map(|s| s.span)
            .reduce(Span::merge)
            .unwrap_or_default();

        if has_entry {
            let position = self.position_of(span.start);
            self.report(
                Diagnostic::semantic("bare statements cannot be combined with func main", span)
                    .at(position)
                    .with_hint("move the statements into func main"),
            );
            if let Some(file) = pkg.files.get_mut(index) {
                file.had_errors = true;
            }
            return;
        }

        let host = if pkg.headerless || pkg.name == "main" { "main" } else { "init" };
        if let Some(file) = pkg.files.get_mut(index) {
            let func = synthesized_func(host, Block::new(stmts, span));
            file.decls.push(Spanned::new(Decl::Func(func), span));
            file.has_entry |= host == "main";
        }
    }

    /// Run the branch checker over every function body of the package.
    fn check_branches(&mut self, pkg: &mut Package) {
        let mut found = Vec::new();
        for (index, file) in pkg.files.iter().enumerate() {
            for decl in &file.decls {
                let diags = branches::check_decl(decl, &|offset| self.position_of(offset));
                found.extend(diags.into_iter().map(|d| (index, d)));
            }
        }
        for (index, diag) in found {
            if let Some(file) = pkg.files.get_mut(index) {
                file.had_errors = true;
            }
            self.report(diag);
        }
    }
}

fn synthesized_func(name: &str, body: Block) -> FuncDecl {
    let span = body.span;
    FuncDecl {
        recv: None,
        name: Spanned::new(name.to_string(), span),
        ty: FuncType::default(),
        body: Some(body),
    }
}

/// File stem of an input name: `dir/tool.gopp` → `tool`.
fn source_stem(name: &str) -> &str {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    match base.rfind('.') {
        Some(0) | None => base,
        Some(dot) => &base[..dot],
    }
}
