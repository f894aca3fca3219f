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

//! Materializing tree objects from relational rows.
//!
//! The descent carries a scope of variable bindings. At each node with a
//! query, the rows of the queried table are scanned for rows that agree
//! with the bound variables; each match extends the scope by the query's
//! fresh variables and produces one element.

use crate::object::Object;
use crate::shape::{Query, Shape};
use wsl_core::{
    ConfigurationError, Database, FormatError, IntegrityError, Value, WslError, WslResult,
};
use std::collections::{BTreeMap, BTreeSet};

type Bindings = Vec<(String, Value)>;

fn lookup<'a>(bindings: &'a Bindings, variable: &str) -> Option<&'a Value> {
    bindings
        .iter()
        .rev()
        .find(|(v, _)| v == variable)
        .map(|(_, value)| value)
}

fn unbound(variable: &str) -> WslError {
    WslError::Configuration(ConfigurationError::new(format!(
        "variable \"{}\" not in scope",
        variable
    )))
}

/// Fresh-variable bindings for every row matching the query under the
/// current bindings, in table row order.
fn matches(query: &Query, bindings: &Bindings, database: &Database) -> WslResult<Vec<Bindings>> {
    let mut out = Vec::new();
    'rows: for row in database.rows(&query.table) {
        if row.len() != query.variables.len() {
            return Err(WslError::Configuration(ConfigurationError::new(format!(
                "table \"{}\" row arity {} does not match query arity {}",
                query.table,
                row.len(),
                query.variables.len()
            ))));
        }
        let mut fresh: Bindings = Vec::with_capacity(query.fresh.len());
        for (i, variable) in query.variables.iter().enumerate() {
            if query.is_fresh(variable) {
                match fresh.iter().find(|(v, _)| v == variable) {
                    Some((_, prev)) if prev != &row[i] => continue 'rows,
                    Some(_) => {}
                    None => fresh.push((variable.clone(), row[i].clone())),
                }
            } else {
                match lookup(bindings, variable) {
                    Some(bound) if bound == &row[i] => {}
                    Some(_) => continue 'rows,
                    None => return Err(unbound(variable)),
                }
            }
        }
        out.push(fresh);
    }
    Ok(out)
}

fn eval(spec: &Shape, bindings: &mut Bindings, database: &Database) -> WslResult<Object> {
    match spec {
        Shape::Value {
            variable,
            query: None,
            ..
        } => {
            let value = lookup(bindings, variable).ok_or_else(|| unbound(variable))?;
            Ok(Object::Value(value.clone()))
        }
        Shape::Value {
            variable,
            query: Some(query),
            ..
        } => {
            let mut result = None;
            for fresh in matches(query, bindings, database)? {
                let mark = bindings.len();
                bindings.extend(fresh);
                result = Some(
                    lookup(bindings, variable)
                        .ok_or_else(|| unbound(variable))?
                        .clone(),
                );
                bindings.truncate(mark);
            }
            result.map(Object::Value).ok_or_else(|| {
                WslError::Format(FormatError::new(
                    "shape value member",
                    variable,
                    "no row matches the query",
                ))
            })
        }
        Shape::Struct { childs } => {
            let mut out = BTreeMap::new();
            for (name, child) in childs {
                out.insert(name.clone(), eval(child, bindings, database)?);
            }
            Ok(Object::Struct(out))
        }
        Shape::Option { val, query } => {
            let mut result = Object::Null;
            for fresh in matches(query, bindings, database)? {
                let mark = bindings.len();
                bindings.extend(fresh);
                result = eval(val, bindings, database)?;
                bindings.truncate(mark);
            }
            Ok(result)
        }
        Shape::Set { val, query } => {
            let mut out = BTreeSet::new();
            for fresh in matches(query, bindings, database)? {
                let mark = bindings.len();
                bindings.extend(fresh);
                out.insert(eval(val, bindings, database)?);
                bindings.truncate(mark);
            }
            Ok(Object::Set(out))
        }
        Shape::List { idx, val, query } => {
            let mut pairs = Vec::new();
            for fresh in matches(query, bindings, database)? {
                let mark = bindings.len();
                bindings.extend(fresh);
                let index = eval(idx, bindings, database)?;
                let value = eval(val, bindings, database)?;
                bindings.truncate(mark);
                pairs.push((index, value));
            }
            pairs.sort_by(|(a, _), (b, _)| a.cmp(b));
            Ok(Object::List(pairs.into_iter().map(|(_, v)| v).collect()))
        }
        Shape::Dict { key, val, query } => {
            let mut out = BTreeMap::new();
            for fresh in matches(query, bindings, database)? {
                let mark = bindings.len();
                bindings.extend(fresh);
                let key_object = eval(key, bindings, database)?;
                let value = eval(val, bindings, database)?;
                bindings.truncate(mark);
                let Object::Value(key_value) = key_object else {
                    return Err(WslError::Configuration(ConfigurationError::new(
                        "dict _key_ must be a value member",
                    )));
                };
                let rendering = key_value.to_string();
                if out.insert(key_value, value).is_some() {
                    return Err(WslError::Integrity(IntegrityError::DuplicateDictKey {
                        key: rendering,
                    }));
                }
            }
            Ok(Object::Dict(out))
        }
    }
}

/// Convert relational rows into a tree object according to a shape.
pub fn rows2objects(spec: &Shape, database: &Database) -> WslResult<Object> {
    let mut bindings = Bindings::new();
    eval(spec, &mut bindings, database)
}
