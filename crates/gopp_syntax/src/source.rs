//! Source positions and the byte-offset to line/column map.
//!
//! Spans in the AST are byte offsets into one input. [`SourceMap`] turns them into human positions and, when
//! `//line` directives are honored, into remapped positions that point back at the text a generator started from.

use std::fmt;

/// A `file:line:column` position. Lines and columns are 1-based; line 0 means "unknown".
#[derive(Debug, Clone, PartialEq, Eq, Default, PartialOrd, Ord, Hash)]
pub struct Position {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.line > 0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = if self.file.is_empty() { "-" } else { self.file.as_str() };
        match (self.line, self.column) {
            (0, _) => write!(f, "{file}"),
            (line, 0) => write!(f, "{file}:{line}"),
            (line, column) => write!(f, "{file}:{line}:{column}"),
        }
    }
}

/// A parsed `//line file:line[:col]` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineDirective {
    /// Offset of the first byte of the line following the directive.
    pub offset: usize,
    pub file: String,
    pub line: u32,
    pub column: Option<u32>,
}

impl LineDirective {
    /// Parse the text after `//line `.
    ///
    /// Accepts `file:line` and `file:line:col`; the file may itself contain colons (`C:\x.go:3`).
    pub fn parse(text: &str, offset: usize) -> Option<LineDirective> {
        let (head, last) = text.rsplit_once(':')?;
        let last: u32 = last.trim().parse().ok()?;
        if let Some((file, line)) = head.rsplit_once(':') {
            if let Ok(line) = line.parse::<u32>() {
                if !file.is_empty() && line > 0 && last > 0 {
                    return Some(LineDirective {
                        offset,
                        file: file.to_string(),
                        line,
                        column: Some(last),
                    });
                }
            }
        }
        if head.is_empty() || last == 0 {
            return None;
        }
        Some(LineDirective {
            offset,
            file: head.to_string(),
            line: last,
            column: None,
        })
    }
}

/// Offset to position map for one input.
#[derive(Debug, Clone, Default)]
pub struct SourceMap {
    name: String,
    line_starts: Vec<usize>,
    directives: Vec<LineDirective>,
}

impl SourceMap {
    pub fn new(name: impl Into<String>, source: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(source.match_indices('\n').map(|(i, _)| i + 1));
        Self {
            name: name.into(),
            line_starts,
            directives: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a `//line` directive. Directives must arrive in source order.
    pub fn add_line_directive(&mut self, directive: LineDirective) {
        self.directives.push(directive);
    }

    pub fn has_line_directives(&self) -> bool {
        !self.directives.is_empty()
    }

    /// 1-based line of a byte offset.
    pub fn line_of(&self, offset: usize) -> u32 {
        let idx = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        (idx + 1) as u32
    }

    /// Unmapped position of a byte offset.
    pub fn position(&self, offset: usize) -> Position {
        let line = self.line_of(offset);
        let start = self.line_starts[(line - 1) as usize];
        Position::new(self.name.clone(), line, (offset - start + 1) as u32)
    }

    /// Position of a byte offset after applying the closest preceding `//line` directive, if any.
    pub fn remapped(&self, offset: usize) -> Option<Position> {
        let directive = self.directives.iter().rev().find(|d| d.offset <= offset)?;
        let here = self.position(offset);
        let base_line = self.line_of(directive.offset);
        let line = directive.line + (here.line - base_line);
        let column = match directive.column {
            Some(col) if here.line == base_line => col + here.column - 1,
            _ => here.column,
        };
        Some(Position::new(directive.file.clone(), line, column))
    }
}
