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

//! Integrity checking: KEY uniqueness and REFERENCE constraints.
//!
//! Every table additionally carries the implicit all-columns key, so
//! duplicate rows are always a violation.

use crate::database::{Database, Row};
use crate::error::{ConfigurationError, IntegrityError, WslError, WslResult};
use crate::schema::{all_columns, Schema};
use std::collections::{BTreeMap, BTreeSet};

struct KeyCheck<'a> {
    name: &'a str,
    table: &'a str,
    columns: Vec<usize>,
    seen: BTreeSet<Row>,
}

fn project(row: &Row, columns: &[usize]) -> Row {
    columns.iter().map(|&c| row[c].clone()).collect()
}

/// Check KEY uniqueness and REFERENCE integrity of a database.
///
/// Fails on the first violation found; tables are visited in name order,
/// rows in their stored order.
pub fn check_database_integrity(schema: &Schema, database: &Database) -> WslResult<()> {
    // One projection index per distinct (table, columns) key. The implicit
    // all-columns key is added where no declared key covers all columns.
    let mut checks: Vec<KeyCheck> = Vec::new();
    for key in schema.keys.values() {
        checks.push(KeyCheck {
            name: &key.name,
            table: &key.table,
            columns: key.columns.clone(),
            seen: BTreeSet::new(),
        });
    }
    for table in schema.tables.values() {
        let implicit = all_columns(table.arity());
        let covered = checks
            .iter()
            .any(|c| c.table == table.name && c.columns == implicit);
        if !covered {
            checks.push(KeyCheck {
                name: &table.name,
                table: &table.name,
                columns: implicit,
                seen: BTreeSet::new(),
            });
        }
    }

    let mut checks_of_table: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (i, check) in checks.iter().enumerate() {
        checks_of_table.entry(check.table).or_default().push(i);
    }

    for (table, rows) in &database.tables {
        let decl = schema.tables.get(table).ok_or_else(|| {
            WslError::Configuration(ConfigurationError::new(format!(
                "database contains unknown table \"{}\"",
                table
            )))
        })?;
        let indices = checks_of_table.get(table.as_str()).cloned().unwrap_or_default();
        for row in rows {
            if row.len() != decl.arity() {
                return Err(WslError::Configuration(ConfigurationError::new(format!(
                    "table \"{}\" has arity {} but a row has {} values",
                    table,
                    decl.arity(),
                    row.len()
                ))));
            }
            for &i in &indices {
                let check = &mut checks[i];
                if !check.seen.insert(project(row, &check.columns)) {
                    return Err(WslError::Integrity(
                        IntegrityError::UniqueConstraintViolation {
                            key: check.name.to_string(),
                            row: row.clone(),
                        },
                    ));
                }
            }
        }
    }

    for fkey in schema.foreignkeys.values() {
        let index = checks
            .iter()
            .find(|c| c.table == fkey.reftable && c.columns == fkey.refcolumns)
            .map(|c| &c.seen);
        let index = match index {
            Some(index) => index,
            // Schema construction guarantees a matching unique key exists.
            None => {
                return Err(WslError::Configuration(ConfigurationError::new(format!(
                    "foreign key \"{}\" has no matching unique key",
                    fkey.name
                ))))
            }
        };
        for row in database.rows(&fkey.table) {
            if !index.contains(&project(row, &fkey.columns)) {
                return Err(WslError::Integrity(
                    IntegrityError::ForeignKeyConstraintViolation {
                        foreignkey: fkey.name.clone(),
                        reftable: fkey.reftable.clone(),
                        row: row.clone(),
                    },
                ));
            }
        }
    }

    Ok(())
}
