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

//! Parsers for schema declarations and database rows.
//!
//! Schema parsing is two-pass: declarations are first classified by their
//! leading keyword, then parsed with all names available for
//! cross-referencing. Database parsing reads rows line by line through the
//! per-table codec chain materialized from the schema.

use crate::database::Database;
use crate::domain::{DomainRegistry, DomainType};
use crate::error::{ParseError, WslError, WslResult};
use crate::lex;
use crate::schema::{Domain, ForeignKey, Key, Schema, Table};
use std::collections::BTreeMap;
use std::sync::Arc;

const SCHEMA_CONTEXT: &str = "schema";
const ROW_CONTEXT: &str = "database row";

/// Whether a string is a valid declaration name: `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_name(s: &str) -> bool {
    let bytes = s.as_bytes();
    match bytes.first() {
        Some(b) if b.is_ascii_alphabetic() || *b == b'_' => {}
        _ => return false,
    }
    bytes[1..].iter().all(|b| b.is_ascii_alphanumeric() || *b == b'_')
}

/// Whether a string is a valid variable: `[A-Za-z][A-Za-z0-9_]*`.
pub fn is_variable(s: &str) -> bool {
    let bytes = s.as_bytes();
    match bytes.first() {
        Some(b) if b.is_ascii_alphabetic() => {}
        _ => return false,
    }
    bytes[1..].iter().all(|b| b.is_ascii_alphanumeric() || *b == b'_')
}

/// Iterate the lines of a text together with their byte offsets.
pub(crate) fn offset_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    let mut offset = 0;
    text.split('\n').map(move |line| {
        let entry = (offset, line);
        offset += line.len() + 1;
        entry
    })
}

fn word_and_rest(s: &str) -> (&str, &str) {
    let s = s.trim();
    match s.find(|c: char| c.is_ascii_whitespace()) {
        Some(i) => (&s[..i], s[i..].trim()),
        None => (s, ""),
    }
}

fn schema_err(text: &str, offset: usize, message: impl Into<String>) -> WslError {
    WslError::Parse(ParseError::at(SCHEMA_CONTEXT, text, offset, message))
}

struct Decl<'a> {
    name: String,
    rest: &'a str,
    offset: usize,
}

/// Parse a schema specification.
///
/// The input is the raw schema text without `%` prefixes. Lines starting
/// with an unknown keyword are skipped for forward compatibility.
pub fn parse_schema(schemastr: &str, registry: &DomainRegistry) -> WslResult<Schema> {
    let mut domain_decls: Vec<Decl> = Vec::new();
    let mut table_decls: Vec<Decl> = Vec::new();
    let mut key_decls: Vec<Decl> = Vec::new();
    let mut reference_decls: Vec<Decl> = Vec::new();

    // Pass 1: classify declarations, deferring the actual parse.
    for (offset, line) in offset_lines(schemastr) {
        if line.trim().is_empty() {
            continue;
        }
        let (keyword, rest) = word_and_rest(line);
        match keyword {
            "DOMAIN" | "TABLE" => {
                let (name, rest2) = word_and_rest(rest);
                if name.is_empty() || rest2.is_empty() {
                    return Err(schema_err(
                        schemastr,
                        offset,
                        format!("failed to parse line: {}", line.trim()),
                    ));
                }
                if !is_name(name) {
                    return Err(schema_err(
                        schemastr,
                        offset,
                        format!("invalid {} name: \"{}\"", keyword, name),
                    ));
                }
                let decls = if keyword == "DOMAIN" {
                    &mut domain_decls
                } else {
                    &mut table_decls
                };
                if decls.iter().any(|d| d.name == name) {
                    return Err(schema_err(
                        schemastr,
                        offset,
                        format!("{} \"{}\" already declared", keyword, name),
                    ));
                }
                decls.push(Decl {
                    name: name.to_string(),
                    rest: rest2,
                    offset,
                });
            }
            "KEY" | "REFERENCE" => {
                let (name, rest2) = word_and_rest(rest);
                if name.is_empty() || rest2.is_empty() {
                    return Err(schema_err(
                        schemastr,
                        offset,
                        format!("failed to parse line: {}", line.trim()),
                    ));
                }
                if !is_name(name) {
                    return Err(schema_err(
                        schemastr,
                        offset,
                        format!("invalid {} name: \"{}\"", keyword, name),
                    ));
                }
                let decls = if keyword == "KEY" {
                    &mut key_decls
                } else {
                    &mut reference_decls
                };
                if decls.iter().any(|d| d.name == name) {
                    return Err(schema_err(
                        schemastr,
                        offset,
                        format!("{} \"{}\" already declared", keyword, name),
                    ));
                }
                decls.push(Decl {
                    name: name.to_string(),
                    rest: rest2,
                    offset,
                });
            }
            // Unknown leading keywords are skipped for forward compatibility.
            _ => {}
        }
    }

    // Pass 2: parse each declaration with cross-references available.
    let mut domains: BTreeMap<String, Domain> = BTreeMap::new();
    for decl in &domain_decls {
        let (parser_name, param) = word_and_rest(decl.rest);
        let parser = registry.get(parser_name).ok_or_else(|| {
            schema_err(
                schemastr,
                decl.offset,
                format!(
                    "domain parser \"{}\" not available while parsing DOMAIN declaration \"{}\"",
                    parser_name, decl.name
                ),
            )
        })?;
        let funcs = parser.as_ref()(param).map_err(|e| match e {
            WslError::Parse(p) => schema_err(
                schemastr,
                decl.offset,
                format!("in DOMAIN declaration \"{}\": {}", decl.name, p.message),
            ),
            other => other,
        })?;
        domains.insert(
            decl.name.clone(),
            Domain {
                name: decl.name.clone(),
                spec: decl.rest.to_string(),
                funcs,
            },
        );
    }

    let mut tables: BTreeMap<String, Table> = BTreeMap::new();
    for decl in &table_decls {
        let columns: Vec<String> = decl.rest.split_whitespace().map(str::to_string).collect();
        for column in &columns {
            if !domains.contains_key(column) {
                return Err(schema_err(
                    schemastr,
                    decl.offset,
                    format!(
                        "declaration of table \"{}\" references unknown domain \"{}\"",
                        decl.name, column
                    ),
                ));
            }
        }
        tables.insert(decl.name.clone(), Table::new(decl.name.clone(), columns));
    }

    let mut keys: BTreeMap<String, Key> = BTreeMap::new();
    for decl in &key_decls {
        let mut words = decl.rest.split_whitespace();
        let table = words.next().unwrap_or("");
        let vars: Vec<&str> = words.collect();
        let (table_name, columns) = parse_column_pattern(
            schemastr,
            decl.offset,
            "KEY",
            &decl.name,
            table,
            &vars,
            &tables,
        )?;
        let mut key_columns: Vec<usize> = columns.into_values().collect();
        key_columns.sort_unstable();
        keys.insert(
            decl.name.clone(),
            Key {
                name: decl.name.clone(),
                table: table_name,
                columns: key_columns,
            },
        );
    }

    let mut foreignkeys: BTreeMap<String, ForeignKey> = BTreeMap::new();
    for decl in &reference_decls {
        let parts: Vec<&str> = decl.rest.split("=>").collect();
        if parts.len() != 2 {
            return Err(schema_err(
                schemastr,
                decl.offset,
                format!("could not parse \"{}\" as REFERENCE constraint", decl.rest),
            ));
        }
        let mut sides = Vec::with_capacity(2);
        for part in parts {
            let mut words = part.split_whitespace();
            let table = words.next().unwrap_or("");
            let vars: Vec<&str> = words.collect();
            sides.push(parse_column_pattern(
                schemastr,
                decl.offset,
                "REFERENCE",
                &decl.name,
                table,
                &vars,
                &tables,
            )?);
        }
        let (reftable, refside) = sides.pop().expect("two sides");
        let (table, localside) = sides.pop().expect("two sides");
        // Shared variable names pair up the columns. Every variable on the
        // referenced side must be matched locally; local-only variables are
        // named placeholders and contribute no pair.
        for var in refside.keys() {
            if !localside.contains_key(var) {
                return Err(schema_err(
                    schemastr,
                    decl.offset,
                    format!(
                        "variable \"{}\" used on the foreign side of \"=>\" but not on the local side while parsing REFERENCE constraint \"{}\"",
                        var, decl.name
                    ),
                ));
            }
        }
        // Pairs ordered so that the referenced column indices ascend.
        let mut pairs: Vec<(usize, usize)> = refside
            .iter()
            .map(|(var, &refcol)| (refcol, localside[var]))
            .collect();
        pairs.sort();
        foreignkeys.insert(
            decl.name.clone(),
            ForeignKey {
                name: decl.name.clone(),
                table,
                columns: pairs.iter().map(|&(_, c)| c).collect(),
                reftable,
                refcolumns: pairs.iter().map(|&(rc, _)| rc).collect(),
                refkey: None,
            },
        );
    }

    Schema::new(schemastr, domains, tables, keys, foreignkeys)
}

/// Parse a `<table> (<var>|*)…` pattern, returning the table name and a map
/// from variable name to column index.
fn parse_column_pattern(
    schemastr: &str,
    offset: usize,
    kind: &str,
    decl_name: &str,
    table: &str,
    vars: &[&str],
    tables: &BTreeMap<String, Table>,
) -> WslResult<(String, BTreeMap<String, usize>)> {
    let table_decl = tables.get(table).ok_or_else(|| {
        schema_err(
            schemastr,
            offset,
            format!(
                "no such table: \"{}\" while parsing {} constraint \"{}\"",
                table, kind, decl_name
            ),
        )
    })?;
    if vars.len() != table_decl.arity() {
        return Err(schema_err(
            schemastr,
            offset,
            format!(
                "arity mismatch for table \"{}\" while parsing {} constraint \"{}\"",
                table, kind, decl_name
            ),
        ));
    }
    let mut columns: BTreeMap<String, usize> = BTreeMap::new();
    for (i, var) in vars.iter().enumerate() {
        if is_variable(var) {
            if columns.insert((*var).to_string(), i).is_some() {
                return Err(schema_err(
                    schemastr,
                    offset,
                    format!(
                        "variable \"{}\" used twice on the same side while parsing {} constraint \"{}\"",
                        var, kind, decl_name
                    ),
                ));
            }
        } else if *var != "*" {
            return Err(schema_err(
                schemastr,
                offset,
                format!(
                    "invalid variable \"{}\" while parsing {} constraint \"{}\"",
                    var, kind, decl_name
                ),
            ));
        }
    }
    Ok((table.to_string(), columns))
}

/// Split an inline database header off a text.
///
/// Leading lines that begin with `%` (with one optional space after it)
/// form the schema; the first non-blank line without the prefix starts the
/// data. Returns the collected schema text and the byte offset of the data.
pub fn split_header(text: &str) -> (String, usize) {
    let mut schema = String::new();
    for (offset, line) in offset_lines(text) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(stripped) = trimmed.strip_prefix('%') {
            schema.push_str(stripped.strip_prefix(' ').unwrap_or(stripped));
            schema.push('\n');
        } else {
            return (schema, offset);
        }
    }
    (schema, text.len())
}

/// Parse a database with an inline schema.
///
/// The schema is read off the leading `%` lines and the remaining lines are
/// parsed as rows against it.
pub fn parse_database(text: &str, registry: &DomainRegistry) -> WslResult<(Schema, Database)> {
    let (schemastr, data_start) = split_header(text);
    let schema = parse_schema(&schemastr, registry)?;
    let database = parse_rows(text, data_start, &schema)?;
    Ok((schema, database))
}

/// Parse a database against an externally supplied schema.
pub fn parse_database_with_schema(text: &str, schema: &Schema) -> WslResult<Database> {
    parse_rows(text, 0, schema)
}

fn parse_rows(text: &str, start: usize, schema: &Schema) -> WslResult<Database> {
    // Materialize the per-table codec chains once.
    let mut decoders: BTreeMap<&str, Vec<Arc<dyn DomainType>>> = BTreeMap::new();
    for name in schema.tables.keys() {
        if let Some(chain) = schema.row_domains(name) {
            decoders.insert(name.as_str(), chain);
        }
    }

    let mut database = Database::for_schema(schema);
    for (offset, line) in offset_lines(text) {
        if offset < start || line.trim().is_empty() {
            continue;
        }
        let line_end = offset + line.len();
        let (mut pos, table) = lex::lex_table_name(text, offset)?;
        let chain = decoders.get(table.as_str()).ok_or_else(|| {
            WslError::Parse(ParseError::at(
                ROW_CONTEXT,
                text,
                offset,
                format!("no such table: \"{}\"", table),
            ))
        })?;
        let mut row = Vec::with_capacity(chain.len());
        for codec in chain {
            pos = lex::lex_space(text, pos)?;
            let token_start = pos;
            let (next, token) = codec.wsllex(text, pos)?;
            let value = codec.decode(&token).map_err(|e| {
                WslError::Parse(ParseError::new(
                    e.context,
                    text,
                    token_start,
                    token_start + e.errorpos.min(next - token_start),
                    e.message,
                ))
            })?;
            row.push(value);
            pos = next;
        }
        if pos != line_end {
            return Err(WslError::Parse(ParseError::new(
                ROW_CONTEXT,
                text,
                offset,
                pos,
                "expected end of line",
            )));
        }
        database.insert(table, row);
    }
    Ok(database)
}
