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

//! Error types for WSL parsing, formatting and integrity checking.

use crate::database::Row;
use thiserror::Error;

/// Compute 1-based line and column numbers for a byte offset into a text.
///
/// The offset is clamped to the end of the text; an offset that falls inside
/// a multi-byte character is moved back to the start of that character.
pub fn compute_line_and_column(text: &str, offset: usize) -> (usize, usize) {
    let mut offset = offset.min(text.len());
    while offset > 0 && !text.is_char_boundary(offset) {
        offset -= 1;
    }
    let upto = &text[..offset];
    let line = upto.matches('\n').count() + 1;
    let column = match upto.rfind('\n') {
        Some(nl) => upto[nl + 1..].chars().count() + 1,
        None => upto.chars().count() + 1,
    };
    (line, column)
}

fn span_message(
    activity: &str,
    what: &str,
    text: &str,
    startpos: &usize,
    errorpos: &usize,
    message: &str,
) -> String {
    let (startline, startcol) = compute_line_and_column(text, *startpos);
    let (errline, errcol) = compute_line_and_column(text, *errorpos);
    format!(
        "While {} {} (starting at {}:{}): At {}:{}: {}",
        activity, what, startline, startcol, errline, errcol, message
    )
}

/// Token-level lexing failure.
///
/// Carries the lexical type being lexed, the whole input buffer and byte
/// offsets for both the start of the token and the offending position, so
/// messages can render `line:col` locations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", span_message("lexing", .lexical_type, .text, .startpos, .errorpos, .message))]
pub struct LexError {
    /// Name of the lexical type that could not be lexed.
    pub lexical_type: String,
    /// The buffer the token was lexed from.
    pub text: String,
    /// Byte offset where lexing of the token started.
    pub startpos: usize,
    /// Byte offset where the error occurred.
    pub errorpos: usize,
    /// Description of the failure.
    pub message: String,
}

impl LexError {
    /// Create a new lex error.
    pub fn new(
        lexical_type: impl Into<String>,
        text: impl Into<String>,
        startpos: usize,
        errorpos: usize,
        message: impl Into<String>,
    ) -> Self {
        Self {
            lexical_type: lexical_type.into(),
            text: text.into(),
            startpos,
            errorpos,
            message: message.into(),
        }
    }
}

/// Higher-level syntactic failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", span_message("parsing", .context, .text, .startpos, .errorpos, .message))]
pub struct ParseError {
    /// What was being parsed (e.g. "TABLE declaration").
    pub context: String,
    /// The buffer that was parsed.
    pub text: String,
    /// Byte offset where parsing of the construct started.
    pub startpos: usize,
    /// Byte offset where the error occurred.
    pub errorpos: usize,
    /// Description of the failure.
    pub message: String,
}

impl ParseError {
    /// Create a new parse error.
    pub fn new(
        context: impl Into<String>,
        text: impl Into<String>,
        startpos: usize,
        errorpos: usize,
        message: impl Into<String>,
    ) -> Self {
        Self {
            context: context.into(),
            text: text.into(),
            startpos,
            errorpos,
            message: message.into(),
        }
    }

    /// Shorthand for an error at a single position.
    pub fn at(
        context: impl Into<String>,
        text: impl Into<String>,
        pos: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::new(context, text, pos, pos, message)
    }
}

/// A value could not be encoded to a token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Cannot format {context}: {message} (value: {value})")]
pub struct FormatError {
    /// What was being formatted.
    pub context: String,
    /// Textual rendering of the offending value.
    pub value: String,
    /// Description of the failure.
    pub message: String,
}

impl FormatError {
    /// Create a new format error.
    pub fn new(
        context: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            context: context.into(),
            value: value.into(),
            message: message.into(),
        }
    }
}

/// Database inconsistency detected by the integrity checker or by the
/// shape engine's write-once cells.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IntegrityError {
    /// A key projection occurred twice.
    #[error("row {row:?} violates key \"{key}\"")]
    UniqueConstraintViolation {
        /// Name of the violated key.
        key: String,
        /// The offending row.
        row: Row,
    },

    /// A foreign key projection has no referent.
    #[error("row {row:?} violates foreign key \"{foreignkey}\" (no matching row in table \"{reftable}\")")]
    ForeignKeyConstraintViolation {
        /// Name of the violated foreign key.
        foreignkey: String,
        /// The referenced table.
        reftable: String,
        /// The offending row.
        row: Row,
    },

    /// A write-once cell was assigned two different values.
    #[error("relational value present at two locations disagrees: variable \"{variable}\" bound to {first} and {second}")]
    ValueConflict {
        /// The variable whose cell was written twice.
        variable: String,
        /// Rendering of the first value.
        first: String,
        /// Rendering of the conflicting value.
        second: String,
    },

    /// A dict block produced the same key twice.
    #[error("key {key} used multiple times in this block")]
    DuplicateDictKey {
        /// Rendering of the duplicated key.
        key: String,
    },
}

/// The schema itself is invalid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid schema: {message}")]
pub struct ConfigurationError {
    /// Description of the failure.
    pub message: String,
}

impl ConfigurationError {
    /// Create a new configuration error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Any error produced by this library.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WslError {
    /// Token-level lexing failure.
    #[error(transparent)]
    Lex(#[from] LexError),
    /// Syntactic failure.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// Encoding failure.
    #[error(transparent)]
    Format(#[from] FormatError),
    /// Key, reference or write-once violation.
    #[error(transparent)]
    Integrity(#[from] IntegrityError),
    /// Invalid schema.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

/// Result type for WSL operations.
pub type WslResult<T> = Result<T, WslError>;
