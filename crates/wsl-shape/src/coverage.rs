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

//! Column coverage analysis for shape specifications.

use crate::shape::{Query, Shape};
use wsl_core::{ConfigurationError, Schema, WslError, WslResult};
use std::collections::BTreeMap;

/// Variable bindings: variable name to (table, column index).
type Bindings = BTreeMap<String, (String, usize)>;

/// Per-table column use counts.
pub type Coverage = BTreeMap<String, Vec<usize>>;

fn do_query(query: &Query, bindings: &mut Bindings) -> WslResult<()> {
    for variable in &query.fresh {
        if bindings.contains_key(variable) {
            return Err(WslError::Configuration(ConfigurationError::new(format!(
                "cannot analyze coverage with shadowed variables (\"{}\")",
                variable
            ))));
        }
        let index = query
            .variables
            .iter()
            .position(|v| v == variable)
            .ok_or_else(|| {
                WslError::Configuration(ConfigurationError::new(format!(
                    "fresh variable \"{}\" does not occur in the query",
                    variable
                )))
            })?;
        bindings.insert(variable.clone(), (query.table.clone(), index));
    }
    Ok(())
}

fn check(spec: &Shape, bindings: &Bindings, coverage: &mut Coverage) -> WslResult<()> {
    match spec {
        Shape::Value {
            variable, query, ..
        } => {
            let mut bindings = bindings.clone();
            if let Some(query) = query {
                do_query(query, &mut bindings)?;
            }
            let (table, index) = bindings.get(variable).ok_or_else(|| {
                WslError::Configuration(ConfigurationError::new(format!(
                    "variable \"{}\" not in scope",
                    variable
                )))
            })?;
            if let Some(counts) = coverage.get_mut(table) {
                counts[*index] += 1;
            }
            Ok(())
        }
        Shape::Struct { childs } => {
            for child in childs.values() {
                check(child, bindings, coverage)?;
            }
            Ok(())
        }
        Shape::Option { val, query } | Shape::Set { val, query } => {
            let mut bindings = bindings.clone();
            do_query(query, &mut bindings)?;
            check(val, &bindings, coverage)
        }
        Shape::List { idx, val, query } => {
            let mut bindings = bindings.clone();
            do_query(query, &mut bindings)?;
            check(idx, &bindings, coverage)?;
            check(val, &bindings, coverage)
        }
        Shape::Dict { key, val, query } => {
            let mut bindings = bindings.clone();
            do_query(query, &mut bindings)?;
            check(key, &bindings, coverage)?;
            check(val, &bindings, coverage)
        }
    }
}

/// Count, per table column, how many shape positions consume the column.
///
/// A shape converts between rows and objects without loss only when every
/// column is used exactly once: a zero means the column is never used, a
/// count above one means the column is consumed independently in several
/// places. Functional dependencies between queries (a value used both as
/// dict key and inside the dict value) are not recognized, so counts above
/// one do not necessarily indicate a problem for such denormalized shapes.
pub fn check_coverage(schema: &Schema, spec: &Shape) -> WslResult<Coverage> {
    let mut coverage: Coverage = schema
        .tables
        .values()
        .map(|table| (table.name.clone(), vec![0; table.arity()]))
        .collect();
    let bindings = Bindings::new();
    check(spec, &bindings, &mut coverage)?;
    Ok(coverage)
}
