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

//! Database instances: bags of rows per table.

use crate::schema::Schema;
use crate::value::Value;
use std::collections::BTreeMap;

/// One database row.
pub type Row = Vec<Value>;

/// A database instance: a multiset of rows per table.
///
/// Row order within a table is not semantic; equality compares tables as
/// multisets, and a table with no rows is equal to an absent table.
#[derive(Debug, Clone, Default)]
pub struct Database {
    /// Rows per table name.
    pub tables: BTreeMap<String, Vec<Row>>,
}

impl Database {
    /// Create an empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a database with an empty row list for every table of a schema.
    pub fn for_schema(schema: &Schema) -> Self {
        let tables = schema
            .tables
            .keys()
            .map(|name| (name.clone(), Vec::new()))
            .collect();
        Self { tables }
    }

    /// Append a row to a table.
    pub fn insert(&mut self, table: impl Into<String>, row: Row) {
        self.tables.entry(table.into()).or_default().push(row);
    }

    /// The rows of a table; empty for unknown tables.
    pub fn rows(&self, table: &str) -> &[Row] {
        self.tables.get(table).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of rows across all tables.
    pub fn row_count(&self) -> usize {
        self.tables.values().map(Vec::len).sum()
    }

    fn canonical(&self) -> BTreeMap<&str, Vec<&Row>> {
        self.tables
            .iter()
            .filter(|(_, rows)| !rows.is_empty())
            .map(|(name, rows)| {
                let mut sorted: Vec<&Row> = rows.iter().collect();
                sorted.sort();
                (name.as_str(), sorted)
            })
            .collect()
    }
}

impl PartialEq for Database {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl Eq for Database {}
