// Dweve WSL - Whitespace-Separated Literals
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Lexers for bracketed string literals, plain and with escape sequences.
//!
//! A string literal is delimited by `[` and `]`. The escaping variant
//! recognizes `\[`, `\]`, `\\`, `\xHH` (two hex digits), `\uDDDD` (four
//! decimal digits) and `\UDDDDDDDD` (eight decimal digits); the latter three
//! denote code points.

use crate::error::{FormatError, LexError};

const LEXICAL_TYPE: &str = "String literal";

fn string_err(text: &str, startpos: usize, errorpos: usize, message: impl Into<String>) -> LexError {
    LexError::new(LEXICAL_TYPE, text, startpos, errorpos, message)
}

fn is_disallowed_in_string(c: char) -> bool {
    (c as u32) < 0x20 || c as u32 == 0x7f
}

/// Lex a string literal without escape sequence support.
///
/// Consumes from the opening `[` through the first `]`. Neither bracket nor
/// control characters may occur inside.
pub fn lex_string_without_escapes(text: &str, at: usize) -> Result<(usize, String), LexError> {
    if !text[at..].starts_with('[') {
        return Err(string_err(text, at, at, "did not find expected string literal"));
    }
    for (off, c) in text[at + 1..].char_indices() {
        let i = at + 1 + off;
        match c {
            ']' => return Ok((i + 1, text[at + 1..i].to_string())),
            '[' => return Err(string_err(text, at, i, "disallowed character 0x5b in string literal")),
            '\n' => return Err(string_err(text, at, i, "EOL while looking for closing quote")),
            c if is_disallowed_in_string(c) => {
                return Err(string_err(
                    text,
                    at,
                    i,
                    format!("disallowed character {:#04x} in string literal", c as u32),
                ))
            }
            _ => {}
        }
    }
    Err(string_err(text, at, text.len(), "EOL while looking for closing quote"))
}

/// Unlex a string token without escaping.
///
/// Rejects tokens containing brackets or control characters since those
/// cannot be represented without escapes.
pub fn unlex_string_without_escapes(token: &str) -> Result<String, FormatError> {
    if let Some(c) = token
        .chars()
        .find(|c| matches!(c, '[' | ']') || is_disallowed_in_string(*c))
    {
        return Err(FormatError::new(
            "String value",
            token,
            format!("cannot unlex character {:#04x} without escaping", c as u32),
        ));
    }
    Ok(format!("[{}]", token))
}

fn hex_digit(text: &str, startpos: usize, pos: usize) -> Result<u32, LexError> {
    match text.as_bytes().get(pos) {
        Some(b @ b'0'..=b'9') => Ok((b - b'0') as u32),
        Some(b @ b'a'..=b'f') => Ok((b - b'a' + 10) as u32),
        Some(&b) => Err(string_err(
            text,
            startpos,
            pos,
            format!("Not a valid hexadecimal character: {}", b as char),
        )),
        None => Err(string_err(text, startpos, pos, "EOL in escape sequence")),
    }
}

fn decimal_codepoint(
    text: &str,
    startpos: usize,
    pos: usize,
    ndigits: usize,
) -> Result<(usize, char), LexError> {
    let bytes = text.as_bytes();
    let mut n: u32 = 0;
    for k in 0..ndigits {
        match bytes.get(pos + k) {
            Some(b @ b'0'..=b'9') => n = n * 10 + (b - b'0') as u32,
            Some(&b) => {
                return Err(string_err(
                    text,
                    startpos,
                    pos + k,
                    format!("Not a valid decimal character: {}", b as char),
                ))
            }
            None => return Err(string_err(text, startpos, pos + k, "EOL in escape sequence")),
        }
    }
    let c = char::from_u32(n).ok_or_else(|| {
        string_err(text, startpos, pos, format!("not a valid code point: {}", n))
    })?;
    Ok((pos + ndigits, c))
}

/// Lex a string literal with escape sequence support.
pub fn lex_string_with_escapes(text: &str, at: usize) -> Result<(usize, String), LexError> {
    if !text[at..].starts_with('[') {
        return Err(string_err(text, at, at, "did not find expected string literal"));
    }
    let mut out = String::new();
    let mut i = at + 1;
    loop {
        let Some(c) = text[i..].chars().next() else {
            return Err(string_err(text, at, text.len(), "EOL while looking for closing quote"));
        };
        match c {
            ']' => return Ok((i + 1, out)),
            '\\' => {
                let Some(e) = text[i + 1..].chars().next() else {
                    return Err(string_err(text, at, i + 1, "EOL in escape sequence"));
                };
                match e {
                    '[' | ']' | '\\' => {
                        out.push(e);
                        i += 2;
                    }
                    'x' => {
                        let hi = hex_digit(text, at, i + 2)?;
                        let lo = hex_digit(text, at, i + 3)?;
                        let n = hi * 16 + lo;
                        let c = char::from_u32(n).ok_or_else(|| {
                            string_err(text, at, i + 2, format!("not a valid code point: {}", n))
                        })?;
                        out.push(c);
                        i += 4;
                    }
                    'u' => {
                        let (next, c) = decimal_codepoint(text, at, i + 2, 4)?;
                        out.push(c);
                        i = next;
                    }
                    'U' => {
                        let (next, c) = decimal_codepoint(text, at, i + 2, 8)?;
                        out.push(c);
                        i = next;
                    }
                    other => {
                        return Err(string_err(
                            text,
                            at,
                            i,
                            format!("Unknown escape sequence: \\{}", other),
                        ))
                    }
                }
            }
            '[' => return Err(string_err(text, at, i, "disallowed character 0x5b in string literal")),
            '\n' => return Err(string_err(text, at, i, "EOL while looking for closing quote")),
            c if is_disallowed_in_string(c) => {
                return Err(string_err(
                    text,
                    at,
                    i,
                    format!("disallowed character {:#04x} in string literal", c as u32),
                ))
            }
            c => {
                out.push(c);
                i += c.len_utf8();
            }
        }
    }
}

/// Unlex a string token with escaping.
///
/// Brackets and backslashes are escaped with a backslash; control characters
/// and DEL are written as `\xHH`.
pub fn unlex_string_with_escapes(token: &str) -> Result<String, FormatError> {
    let mut out = String::with_capacity(token.len() + 2);
    out.push('[');
    for c in token.chars() {
        match c {
            '[' | ']' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            c if is_disallowed_in_string(c) => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push(']');
    Ok(out)
}
