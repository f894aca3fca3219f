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

//! Schema model: domains, tables, keys and foreign keys with
//! cross-reference invariants.

use crate::domain::DomainType;
use crate::error::{ConfigurationError, WslError, WslResult};
use std::collections::BTreeMap;
use std::sync::Arc;

/// A named domain together with its codec bundle.
#[derive(Debug, Clone)]
pub struct Domain {
    /// The domain's name.
    pub name: String,
    /// The textual remainder of its `DOMAIN` declaration line.
    pub spec: String,
    /// The codec bundle.
    pub funcs: Arc<dyn DomainType>,
}

impl PartialEq for Domain {
    fn eq(&self, other: &Self) -> bool {
        // Codec bundles are opaque; two domains are equal when they were
        // declared the same way.
        self.name == other.name && self.spec == other.spec
    }
}

impl Eq for Domain {}

/// A named relation: an ordered list of column domain names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    /// The table's name.
    pub name: String,
    /// Domain name per column.
    pub columns: Vec<String>,
    /// Optional alternative name per column.
    pub colnames: Vec<Option<String>>,
}

impl Table {
    /// Create a table without column names.
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        let colnames = vec![None; columns.len()];
        Self {
            name: name.into(),
            columns,
            colnames,
        }
    }

    /// Number of columns.
    pub fn arity(&self) -> usize {
        self.columns.len()
    }
}

/// A uniqueness constraint over a set of columns of one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    /// The key's name.
    pub name: String,
    /// The constrained table.
    pub table: String,
    /// Strictly ascending 0-based column indices.
    pub columns: Vec<usize>,
}

/// A referential constraint between two tables.
///
/// `columns` and `refcolumns` pair up positionally; the pairs are stored
/// sorted by `refcolumns`, so `refcolumns` is strictly ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    /// The constraint's name.
    pub name: String,
    /// The constrained (local) table.
    pub table: String,
    /// Local column indices, aligned with `refcolumns`.
    pub columns: Vec<usize>,
    /// The referenced table.
    pub reftable: String,
    /// Referenced column indices, strictly ascending.
    pub refcolumns: Vec<usize>,
    /// Name of the unique key on `reftable` covering exactly `refcolumns`,
    /// resolved at schema construction. `None` means the implicit
    /// all-columns key is the match.
    pub refkey: Option<String>,
}

/// Schema information for a WSL database.
///
/// Construction via [`Schema::new`] validates all cross-reference
/// invariants: unique names per kind, declared domains for every column,
/// valid column indices, and a matching unique key for every foreign key.
#[derive(Debug, Clone)]
pub struct Schema {
    /// The textual representation this schema was parsed from.
    pub spec: String,
    /// Domains by name.
    pub domains: BTreeMap<String, Domain>,
    /// Tables by name.
    pub tables: BTreeMap<String, Table>,
    /// Keys by name.
    pub keys: BTreeMap<String, Key>,
    /// Foreign keys by name.
    pub foreignkeys: BTreeMap<String, ForeignKey>,
}

impl Schema {
    /// Build a schema from its parts, validating all invariants and
    /// resolving each foreign key to the unique key it targets.
    pub fn new(
        spec: impl Into<String>,
        domains: BTreeMap<String, Domain>,
        tables: BTreeMap<String, Table>,
        keys: BTreeMap<String, Key>,
        mut foreignkeys: BTreeMap<String, ForeignKey>,
    ) -> WslResult<Self> {
        for table in tables.values() {
            if table.columns.is_empty() {
                return Err(config(format!("table \"{}\" has no columns", table.name)));
            }
            if table.colnames.len() != table.columns.len() {
                return Err(config(format!(
                    "table \"{}\" has {} column names for {} columns",
                    table.name,
                    table.colnames.len(),
                    table.columns.len()
                )));
            }
            for domain in &table.columns {
                if !domains.contains_key(domain) {
                    return Err(config(format!(
                        "table \"{}\" references unknown domain \"{}\"",
                        table.name, domain
                    )));
                }
            }
        }

        for key in keys.values() {
            let table = tables.get(&key.table).ok_or_else(|| {
                config(format!("key \"{}\" references unknown table \"{}\"", key.name, key.table))
            })?;
            if !strictly_ascending(&key.columns) || key.columns.iter().any(|&c| c >= table.arity()) {
                return Err(config(format!(
                    "key \"{}\" has invalid column indices for table \"{}\"",
                    key.name, key.table
                )));
            }
        }

        for fkey in foreignkeys.values_mut() {
            let table = tables.get(&fkey.table).ok_or_else(|| {
                config(format!(
                    "foreign key \"{}\" references unknown table \"{}\"",
                    fkey.name, fkey.table
                ))
            })?;
            let reftable = tables.get(&fkey.reftable).ok_or_else(|| {
                config(format!(
                    "foreign key \"{}\" references unknown table \"{}\"",
                    fkey.name, fkey.reftable
                ))
            })?;
            if fkey.columns.len() != fkey.refcolumns.len() {
                return Err(config(format!(
                    "foreign key \"{}\" pairs {} local columns with {} referenced columns",
                    fkey.name,
                    fkey.columns.len(),
                    fkey.refcolumns.len()
                )));
            }
            if !strictly_ascending(&fkey.refcolumns)
                || fkey.columns.iter().any(|&c| c >= table.arity())
                || fkey.refcolumns.iter().any(|&c| c >= reftable.arity())
            {
                return Err(config(format!(
                    "foreign key \"{}\" has invalid column indices",
                    fkey.name
                )));
            }
            for (&c, &rc) in fkey.columns.iter().zip(&fkey.refcolumns) {
                if table.columns[c] != reftable.columns[rc] {
                    return Err(config(format!(
                        "foreign key \"{}\": column {} of table \"{}\" has domain \"{}\" but column {} of table \"{}\" has domain \"{}\"",
                        fkey.name, c, fkey.table, table.columns[c],
                        rc, fkey.reftable, reftable.columns[rc]
                    )));
                }
            }

            // Resolve the unique key this foreign key targets.
            let matched = keys
                .values()
                .find(|key| key.table == fkey.reftable && key.columns == fkey.refcolumns);
            fkey.refkey = match matched {
                Some(key) => Some(key.name.clone()),
                None if fkey.refcolumns == all_columns(reftable.arity()) => None,
                None => {
                    return Err(config(format!(
                        "foreign key \"{}\" references table \"{}\", but there is no matching unique key",
                        fkey.name, fkey.reftable
                    )))
                }
            };
        }

        Ok(Self {
            spec: spec.into(),
            domains,
            tables,
            keys,
            foreignkeys,
        })
    }

    /// The domain name of one column of a table.
    pub fn domain_of_column(&self, table: &str, column: usize) -> Option<&str> {
        self.tables
            .get(table)
            .and_then(|t| t.columns.get(column))
            .map(String::as_str)
    }

    /// Materialize the codec chain for one table's row: one codec bundle
    /// per column, in order.
    pub fn row_domains(&self, table: &str) -> Option<Vec<Arc<dyn DomainType>>> {
        let table = self.tables.get(table)?;
        table
            .columns
            .iter()
            .map(|domain| self.domains.get(domain).map(|d| d.funcs.clone()))
            .collect()
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.domains == other.domains
            && self.tables == other.tables
            && self.keys == other.keys
            && self.foreignkeys == other.foreignkeys
    }
}

impl Eq for Schema {}

fn config(message: String) -> WslError {
    WslError::Configuration(ConfigurationError::new(message))
}

fn strictly_ascending(columns: &[usize]) -> bool {
    columns.windows(2).all(|w| w[0] < w[1])
}

/// The column index tuple of the implicit all-columns key.
pub(crate) fn all_columns(arity: usize) -> Vec<usize> {
    (0..arity).collect()
}
