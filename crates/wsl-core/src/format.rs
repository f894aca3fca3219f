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

//! Serialization of WSL databases to canonical text.
//!
//! Tables are emitted in sorted name order; within a table, rows are sorted
//! by their encoded token sequence.

use crate::database::{Database, Row};
use crate::domain::DomainType;
use crate::error::{FormatError, WslError, WslResult};
use crate::schema::Schema;
use std::sync::Arc;

/// Render a schema back to text.
///
/// With `escape`, each line is prefixed with `% ` for inline notation.
pub fn format_schema(schema: &Schema, escape: bool) -> String {
    if escape {
        schema
            .spec
            .lines()
            .map(|line| format!("% {}\n", line))
            .collect()
    } else {
        schema.spec.clone()
    }
}

/// Encode one row, including the leading table name and trailing newline.
pub fn format_row(table: &str, row: &Row, codecs: &[Arc<dyn DomainType>]) -> WslResult<String> {
    let tokens = row_tokens(row, codecs)?;
    let mut line = String::from(table);
    for token in tokens {
        line.push(' ');
        line.push_str(&token);
    }
    line.push('\n');
    Ok(line)
}

fn row_tokens(row: &Row, codecs: &[Arc<dyn DomainType>]) -> WslResult<Vec<String>> {
    row.iter()
        .zip(codecs)
        .map(|(value, codec)| Ok(codec.wslunlex(&codec.encode(value)?)?))
        .collect()
}

/// Serialize a whole database.
///
/// With `inline_schema`, the schema is emitted first, each line prefixed
/// with `% `.
pub fn format_database(schema: &Schema, database: &Database, inline_schema: bool) -> WslResult<String> {
    let mut out = String::new();
    if inline_schema {
        out.push_str(&format_schema(schema, true));
    }
    for (table, rows) in &database.tables {
        let codecs = schema.row_domains(table).ok_or_else(|| {
            WslError::Format(FormatError::new(
                "database",
                table,
                "no such table in schema",
            ))
        })?;
        let mut token_rows = Vec::with_capacity(rows.len());
        for row in rows {
            if row.len() != codecs.len() {
                return Err(WslError::Format(FormatError::new(
                    "database row",
                    format!("{:?}", row),
                    format!(
                        "table \"{}\" has arity {} but row has {} values",
                        table,
                        codecs.len(),
                        row.len()
                    ),
                )));
            }
            token_rows.push(row_tokens(row, &codecs)?);
        }
        token_rows.sort();
        for tokens in token_rows {
            out.push_str(table);
            for token in tokens {
                out.push(' ');
                out.push_str(&token);
            }
            out.push('\n');
        }
    }
    Ok(out)
}
