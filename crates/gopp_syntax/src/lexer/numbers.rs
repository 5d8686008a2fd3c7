//! Number scanning for the gopp scanner
//!
//! A literal threads through int → float → date → exponent → imaginary; each stage is only reachable from the one
//! before it. The literal keeps its source text; only its kind is decided here.

use super::Scanner;
use super::tokens::Lit;
use crate::ast::LitKind;

impl<'a> Scanner<'a> {
    /// Scan a numeric literal whose first character `first` is already consumed.
    pub(super) fn scan_number(&mut self, start: usize, first: char) -> Lit {
        let mut kind = LitKind::Int;

        if first == '.' {
            // `.5`
            kind = LitKind::Float;
            self.digits(10);
        } else if first == '0' && matches!(self.peek(), Some('x' | 'X' | 'b' | 'B' | 'o' | 'O')) {
            let prefix = self.advance().unwrap_or('x').to_ascii_lowercase();
            let base = match prefix {
                'x' => 16,
                'b' => 2,
                _ => 8,
            };
            let mut any = self.digits(base) > 0;
            if base == 16 && self.peek() == Some('.') {
                self.advance();
                any |= self.digits(16) > 0;
                kind = LitKind::Float;
            }
            if !any {
                self.error(format!("{} literal has no digits", base_name(base)), start);
            }
            if base == 16 && matches!(self.peek(), Some('p' | 'P')) {
                kind = LitKind::Float;
                self.exponent(start);
            } else if kind == LitKind::Float {
                self.error("hexadecimal mantissa requires a 'p' exponent", start);
            }
        } else {
            self.digits(10);
            // Fraction: `1.5` or `1.`, but not `1..`
            if self.peek() == Some('.') && self.peek_next() != Some('.') {
                self.advance();
                self.digits(10);
                kind = LitKind::Float;
                // Date: further `.digits` groups
                while self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
                    self.advance();
                    self.digits(10);
                    kind = LitKind::Date;
                }
            }
            if matches!(self.peek(), Some('e' | 'E')) {
                if kind == LitKind::Date {
                    self.error("date literal cannot have an exponent", start);
                    self.exponent(start);
                } else {
                    kind = LitKind::Float;
                    self.exponent(start);
                }
            }
            if kind == LitKind::Int {
                let text = &self.source[start..self.current_pos];
                if text.len() > 1 && text.starts_with('0') && text.chars().any(|c| c == '8' || c == '9') {
                    self.error(format!("invalid digit in octal literal {text}"), start);
                }
            }
        }

        if self.peek() == Some('i') {
            self.advance();
            if kind == LitKind::Date {
                self.error("date literal cannot have an imaginary suffix", start);
            } else {
                kind = LitKind::Imag;
            }
        }

        if self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
                self.advance();
            }
            let text = &self.source[start..self.current_pos];
            self.error(format!("malformed number {text}"), start);
        }

        Lit {
            kind,
            raw: self.source[start..self.current_pos].to_string(),
            escape_e: false,
        }
    }

    /// Consume digits of `base` and `_` separators; returns the number of digits.
    fn digits(&mut self, base: u32) -> usize {
        let mut count = 0;
        while let Some(c) = self.peek() {
            if c == '_' {
                self.advance();
            } else if c.is_digit(base) {
                self.advance();
                count += 1;
            } else {
                break;
            }
        }
        count
    }

    /// Consume `e`/`p`, an optional sign and the exponent digits.
    fn exponent(&mut self, start: usize) {
        self.advance();
        if matches!(self.peek(), Some('+' | '-')) {
            self.advance();
        }
        if self.digits(10) == 0 {
            self.error("exponent has no digits", start);
        }
    }
}

fn base_name(base: u32) -> &'static str {
    match base {
        16 => "hexadecimal",
        2 => "binary",
        _ => "octal",
    }
}
