//! String scanning for the gopp scanner
//!
//! Handles interpreted strings, raw strings and rune literals. Escapes are validated but not decoded: the literal
//! keeps its source text so the printer can reproduce it. The one rewrite is `\e`, which becomes `\x1b`.

use super::Scanner;
use super::tokens::Lit;
use crate::ast::LitKind;

// ============================================================================
// Escape sequence handling
// ============================================================================

/// Result of processing an escape sequence
enum EscapeResult {
    /// A valid escape, copied to the output as written
    Valid,
    /// The `\e` extension, rewritten to `\x1b`
    Esc,
    /// Invalid escape; already reported
    Invalid,
}

impl<'a> Scanner<'a> {
    /// Validate one escape sequence. The backslash is already consumed and pushed to `raw`.
    fn scan_escape(&mut self, quote: char, raw: &mut String) -> EscapeResult {
        let start = self.current_pos - 1;
        let Some(c) = self.peek() else {
            self.error("escape sequence not terminated", start);
            return EscapeResult::Invalid;
        };

        let (digits, base, max) = match c {
            'a' | 'b' | 'f' | 'n' | 'r' | 't' | 'v' | '\\' => {
                self.advance();
                raw.push(c);
                return EscapeResult::Valid;
            }
            c if c == quote => {
                self.advance();
                raw.push(c);
                return EscapeResult::Valid;
            }
            'e' => {
                self.advance();
                raw.push_str("x1b");
                return EscapeResult::Esc;
            }
            '0'..='7' => (3, 8, 255),
            'x' => {
                self.advance();
                raw.push(c);
                (2, 16, 255)
            }
            'u' => {
                self.advance();
                raw.push(c);
                (4, 16, 0x10FFFF)
            }
            'U' => {
                self.advance();
                raw.push(c);
                (8, 16, 0x10FFFF)
            }
            '\n' => {
                self.error("escape sequence not terminated", start);
                return EscapeResult::Invalid;
            }
            _ => {
                self.advance();
                raw.push(c);
                self.error("unknown escape sequence", start);
                return EscapeResult::Invalid;
            }
        };

        let mut value: u32 = 0;
        for _ in 0..digits {
            match self.peek().and_then(|d| d.to_digit(base).map(|v| (d, v))) {
                Some((d, v)) => {
                    self.advance();
                    raw.push(d);
                    value = value * base + v;
                }
                None => {
                    self.error("illegal character in escape sequence", start);
                    return EscapeResult::Invalid;
                }
            }
        }

        if value > max || (0xD800..0xE000).contains(&value) {
            let message = if max == 255 {
                "octal escape value > 255"
            } else {
                "escape sequence is invalid Unicode code point"
            };
            self.error(message, start);
            return EscapeResult::Invalid;
        }
        EscapeResult::Valid
    }

    // ========================================================================
    // String scanning
    // ========================================================================

    /// Scan an interpreted string. The opening `"` is already consumed.
    pub(super) fn scan_string(&mut self, start: usize) -> Lit {
        let mut raw = String::from('"');
        let mut escape_e = false;
        loop {
            match self.peek() {
                None | Some('\n') => {
                    self.error("string literal not terminated", start);
                    break;
                }
                Some('"') => {
                    self.advance();
                    raw.push('"');
                    break;
                }
                Some('\\') => {
                    self.advance();
                    raw.push('\\');
                    if let EscapeResult::Esc = self.scan_escape('"', &mut raw) {
                        escape_e = true;
                    }
                }
                Some(c) => {
                    self.advance();
                    raw.push(c);
                }
            }
        }
        Lit {
            kind: LitKind::String,
            raw,
            escape_e,
        }
    }

    /// Scan a raw string. The opening backquote is already consumed. Carriage returns are dropped.
    pub(super) fn scan_raw_string(&mut self, start: usize) -> Lit {
        let mut raw = String::from('`');
        loop {
            match self.advance() {
                None => {
                    self.error("raw string literal not terminated", start);
                    break;
                }
                Some('`') => {
                    raw.push('`');
                    break;
                }
                Some('\r') => {}
                Some(c) => raw.push(c),
            }
        }
        Lit {
            kind: LitKind::String,
            raw,
            escape_e: false,
        }
    }

    /// Scan a rune literal. The opening `'` is already consumed.
    pub(super) fn scan_rune(&mut self, start: usize) -> Lit {
        let mut raw = String::from('\'');
        let mut escape_e = false;
        let mut count = 0;
        let mut valid = true;
        loop {
            match self.peek() {
                None | Some('\n') => {
                    self.error("rune literal not terminated", start);
                    valid = false;
                    break;
                }
                Some('\'') => {
                    self.advance();
                    raw.push('\'');
                    break;
                }
                Some('\\') => {
                    self.advance();
                    raw.push('\\');
                    match self.scan_escape('\'', &mut raw) {
                        EscapeResult::Esc => escape_e = true,
                        EscapeResult::Invalid => valid = false,
                        EscapeResult::Valid => {}
                    }
                    count += 1;
                }
                Some(c) => {
                    self.advance();
                    raw.push(c);
                    count += 1;
                }
            }
        }
        if valid && count == 0 {
            self.error("empty rune literal or unescaped ' in rune literal", start);
        } else if valid && count > 1 {
            self.error("more than one character in rune literal", start);
        }
        Lit {
            kind: LitKind::Rune,
            raw,
            escape_e,
        }
    }
}
