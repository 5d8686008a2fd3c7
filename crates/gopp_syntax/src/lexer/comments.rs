//! Comment capture for the gopp scanner.
//!
//! Adjacent comments are collected into a pending group. When the next token arrives the group either becomes that
//! token's lead (doc-comment candidate) or is flushed as a floating group. Directive comments never join a group.

use super::Scanner;
use crate::ast::{Comment, CommentGroup, Span};
use crate::source::LineDirective;

/// A `//line` or `//word:rest` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// Offset of the `//`.
    pub offset: usize,
    /// Comment text after `//`.
    pub text: String,
    /// Set for a well-formed `//line` directive.
    pub line: Option<LineDirective>,
}

pub(super) struct PendingComment {
    comment: Comment,
    end_line: u32,
}

impl<'a> Scanner<'a> {
    /// Scan a `//` comment up to (not including) the newline.
    pub(super) fn scan_line_comment(&mut self) {
        let start = self.current_pos;
        let start_line = self.line;
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
        let text = self.source[start..self.current_pos].trim_end_matches('\r');
        let at_line_start = start == 0 || self.source.as_bytes()[start - 1] == b'\n';
        if at_line_start {
            if let Some(directive) = self.directive(start, &text[2..]) {
                self.directives.push(directive);
                return;
            }
        }
        let comment = Comment {
            text: text.to_string(),
            span: Span::new(start, self.current_pos),
        };
        self.record_comment(comment, start_line, start_line);
    }

    /// Scan a `/* */` comment. Returns `true` if it spans more than one line.
    pub(super) fn scan_block_comment(&mut self) -> bool {
        let start = self.current_pos;
        let start_line = self.line;
        self.advance();
        self.advance();
        let mut terminated = false;
        while let Some(c) = self.advance() {
            if c == '*' && self.peek() == Some('/') {
                self.advance();
                terminated = true;
                break;
            }
        }
        if !terminated {
            self.error("comment not terminated", start);
        }
        let comment = Comment {
            text: self.source[start..self.current_pos].to_string(),
            span: Span::new(start, self.current_pos),
        };
        let end_line = self.line;
        self.record_comment(comment, start_line, end_line);
        end_line > start_line
    }

    fn directive(&self, start: usize, body: &str) -> Option<Directive> {
        if let Some(rest) = body.strip_prefix("line ") {
            let next_line = self.source[start..].find('\n').map_or(self.source.len(), |i| start + i + 1);
            return Some(Directive {
                offset: start,
                text: body.to_string(),
                line: LineDirective::parse(rest.trim(), next_line),
            });
        }
        let (word, _) = body.split_once(':')?;
        let is_word = !word.is_empty() && word.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
        is_word.then(|| Directive {
            offset: start,
            text: body.to_string(),
            line: None,
        })
    }

    fn record_comment(&mut self, comment: Comment, start_line: u32, end_line: u32) {
        if start_line == self.last_token_line {
            // Trailing comment on a token's line.
            self.flush_pending();
            self.floating.push(CommentGroup {
                comments: vec![comment],
            });
            return;
        }
        if let Some(last) = self.pending.last() {
            // Two or more blank lines end the group.
            if start_line > last.end_line + 2 {
                self.flush_pending();
            }
        }
        self.pending.push(PendingComment { comment, end_line });
    }

    /// Hand the pending group to the token starting on `token_line`, or flush it as floating.
    pub(super) fn attach_pending(&mut self, token_line: u32) {
        let Some(last) = self.pending.last() else {
            return;
        };
        let adjacent = last.end_line + 1 >= token_line;
        let group = CommentGroup {
            comments: self.pending.drain(..).map(|p| p.comment).collect(),
        };
        if adjacent {
            self.lead = Some(group);
        } else {
            self.floating.push(group);
        }
    }

    pub(super) fn flush_pending(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let group = CommentGroup {
            comments: self.pending.drain(..).map(|p| p.comment).collect(),
        };
        self.floating.push(group);
    }
}
