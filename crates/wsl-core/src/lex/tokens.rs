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

//! Lexers for unquoted tokens: identifiers, table names, integers, floats,
//! and the structural space and newline characters.

use crate::error::{FormatError, LexError};

/// Whether a character may appear in an identifier token.
///
/// Identifiers consist of characters with code points above 0x20, excluding
/// DEL (0x7f).
#[inline]
pub fn is_identifier_char(c: char) -> bool {
    c as u32 > 0x20 && c as u32 != 0x7f
}

/// Lex an identifier: a maximal non-empty run of identifier characters.
pub fn lex_identifier(text: &str, at: usize) -> Result<(usize, String), LexError> {
    let mut end = at;
    for (i, c) in text[at..].char_indices() {
        if !is_identifier_char(c) {
            break;
        }
        end = at + i + c.len_utf8();
    }
    if end == at {
        return Err(LexError::new(
            "identifier",
            text,
            at,
            at,
            "EOL or invalid character while expecting identifier",
        ));
    }
    Ok((end, text[at..end].to_string()))
}

/// Unlex an identifier token.
pub fn unlex_identifier(token: &str) -> Result<String, FormatError> {
    if token.is_empty() {
        return Err(FormatError::new(
            "identifier",
            token,
            "identifier must not be empty",
        ));
    }
    if let Some(c) = token.chars().find(|c| !is_identifier_char(*c)) {
        return Err(FormatError::new(
            "identifier",
            token,
            format!("disallowed character {:#04x} in identifier", c as u32),
        ));
    }
    Ok(token.to_string())
}

/// Lex a table name: a maximal non-empty run of ASCII letters.
pub fn lex_table_name(text: &str, at: usize) -> Result<(usize, String), LexError> {
    let bytes = text.as_bytes();
    let mut end = at;
    while end < bytes.len() && bytes[end].is_ascii_alphabetic() {
        end += 1;
    }
    if end == at {
        return Err(LexError::new("table name", text, at, at, "expected table name"));
    }
    Ok((end, text[at..end].to_string()))
}

fn int_shape_ok(token: &str) -> bool {
    let digits = token.strip_prefix('-').unwrap_or(token);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return false;
    }
    // "-0" is not a valid literal either.
    !(token.starts_with('-') && digits == "0")
}

/// Lex an integer literal matching `0 | -?[1-9][0-9]*`.
pub fn lex_int(text: &str, at: usize) -> Result<(usize, String), LexError> {
    let bytes = text.as_bytes();
    let mut end = at;
    if end < bytes.len() && bytes[end] == b'-' {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start {
        return Err(LexError::new(
            "integer literal",
            text,
            at,
            at,
            "expected integer literal",
        ));
    }
    let token = &text[at..end];
    if !int_shape_ok(token) {
        return Err(LexError::new(
            "integer literal",
            text,
            at,
            digits_start,
            format!("invalid integer literal: {}", token),
        ));
    }
    Ok((end, token.to_string()))
}

/// Unlex an integer token.
pub fn unlex_int(token: &str) -> Result<String, FormatError> {
    if !int_shape_ok(token) {
        return Err(FormatError::new(
            "integer literal",
            token,
            "not a valid integer literal",
        ));
    }
    Ok(token.to_string())
}

/// Lex a decimal float literal.
///
/// Consumes a maximal run of characters that can occur in a decimal float
/// (`[0-9+-.eE]`) and requires the result to contain at least one digit.
pub fn lex_float(text: &str, at: usize) -> Result<(usize, String), LexError> {
    let bytes = text.as_bytes();
    let mut end = at;
    while end < bytes.len()
        && matches!(bytes[end], b'0'..=b'9' | b'+' | b'-' | b'.' | b'e' | b'E')
    {
        end += 1;
    }
    let token = &text[at..end];
    if end == at || !token.bytes().any(|b| b.is_ascii_digit()) {
        return Err(LexError::new(
            "float literal",
            text,
            at,
            at,
            "expected float literal",
        ));
    }
    Ok((end, token.to_string()))
}

/// Lex exactly one space character (0x20).
pub fn lex_space(text: &str, at: usize) -> Result<usize, LexError> {
    if text.as_bytes().get(at) != Some(&b' ') {
        return Err(LexError::new("space", text, at, at, "expected space character"));
    }
    Ok(at + 1)
}

/// Lex exactly one newline character (0x0a).
pub fn lex_newline(text: &str, at: usize) -> Result<usize, LexError> {
    if text.as_bytes().get(at) != Some(&b'\n') {
        return Err(LexError::new(
            "newline",
            text,
            at,
            at,
            "expected newline (0x0a) character",
        ));
    }
    Ok(at + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Identifier tests ====================

    #[test]
    fn test_lex_identifier_simple() {
        let (end, tok) = lex_identifier("jane rest", 0).unwrap();
        assert_eq!(end, 4);
        assert_eq!(tok, "jane");
    }

    #[test]
    fn test_lex_identifier_stops_at_space() {
        let (end, tok) = lex_identifier("a b", 0).unwrap();
        assert_eq!((end, tok.as_str()), (1, "a"));
    }

    #[test]
    fn test_lex_identifier_empty_fails() {
        assert!(lex_identifier(" x", 0).is_err());
        assert!(lex_identifier("", 0).is_err());
    }

    #[test]
    fn test_lex_identifier_unicode() {
        let (end, tok) = lex_identifier("héllo x", 0).unwrap();
        assert_eq!(tok, "héllo");
        assert_eq!(end, "héllo".len());
    }

    #[test]
    fn test_unlex_identifier_rejects_space() {
        assert!(unlex_identifier("a b").is_err());
        assert!(unlex_identifier("").is_err());
        assert!(unlex_identifier("\x7f").is_err());
        assert_eq!(unlex_identifier("a-b_c").unwrap(), "a-b_c");
    }

    // ==================== Table name tests ====================

    #[test]
    fn test_lex_table_name() {
        let (end, tok) = lex_table_name("Person jane", 0).unwrap();
        assert_eq!((end, tok.as_str()), (6, "Person"));
    }

    #[test]
    fn test_lex_table_name_stops_at_digit() {
        let (end, tok) = lex_table_name("Tab1 x", 0).unwrap();
        assert_eq!((end, tok.as_str()), (3, "Tab"));
    }

    #[test]
    fn test_lex_table_name_missing() {
        assert!(lex_table_name("1abc", 0).is_err());
    }

    // ==================== Integer tests ====================

    #[test]
    fn test_lex_int_zero() {
        let (end, tok) = lex_int("0 x", 0).unwrap();
        assert_eq!((end, tok.as_str()), (1, "0"));
    }

    #[test]
    fn test_lex_int_negative() {
        let (end, tok) = lex_int("-42", 0).unwrap();
        assert_eq!((end, tok.as_str()), (3, "-42"));
    }

    #[test]
    fn test_lex_int_leading_zero_fails() {
        assert!(lex_int("0123", 0).is_err());
        assert!(lex_int("-0", 0).is_err());
        assert!(lex_int("-012", 0).is_err());
    }

    #[test]
    fn test_lex_int_missing_digits() {
        assert!(lex_int("-x", 0).is_err());
        assert!(lex_int("abc", 0).is_err());
    }

    #[test]
    fn test_unlex_int() {
        assert_eq!(unlex_int("0").unwrap(), "0");
        assert_eq!(unlex_int("-17").unwrap(), "-17");
        assert!(unlex_int("007").is_err());
        assert!(unlex_int("x").is_err());
    }

    // ==================== Float tests ====================

    #[test]
    fn test_lex_float_simple() {
        let (end, tok) = lex_float("3.25 x", 0).unwrap();
        assert_eq!((end, tok.as_str()), (4, "3.25"));
    }

    #[test]
    fn test_lex_float_exponent() {
        let (_, tok) = lex_float("-1.5e-3", 0).unwrap();
        assert_eq!(tok, "-1.5e-3");
    }

    #[test]
    fn test_lex_float_requires_digit() {
        assert!(lex_float(".e", 0).is_err());
        assert!(lex_float("x", 0).is_err());
    }

    // ==================== Space and newline tests ====================

    #[test]
    fn test_lex_space() {
        assert_eq!(lex_space(" x", 0).unwrap(), 1);
        assert!(lex_space("x", 0).is_err());
        assert!(lex_space("", 0).is_err());
    }

    #[test]
    fn test_lex_newline() {
        assert_eq!(lex_newline("\nx", 0).unwrap(), 1);
        assert!(lex_newline(" ", 0).is_err());
    }
}
