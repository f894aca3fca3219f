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

//! Decomposing tree objects into relational rows.
//!
//! The descent mirrors the read direction. Every query scope introduces one
//! write-once cell per fresh variable; `value` members fill cells, shared
//! between all subtrees that see the variable. Rows are only materialized
//! after the whole traversal, so sibling subtrees may fill a query's cells
//! in any order. A cell written twice with different values is a conflict.

use crate::object::Object;
use crate::shape::{Query, Shape};
use wsl_core::{
    ConfigurationError, Database, FormatError, IntegrityError, Value, WslError, WslResult,
};
use std::cell::RefCell;
use std::rc::Rc;

/// A write-once slot for one variable within one query scope.
type CellRef = Rc<RefCell<Option<Value>>>;

struct PendingRow {
    table: String,
    cells: Vec<(String, CellRef)>,
}

#[derive(Default)]
struct Writer {
    scope: Vec<(String, CellRef)>,
    pending: Vec<PendingRow>,
}

impl Writer {
    /// Open a query scope: one fresh cell per fresh variable.
    fn push_query(&mut self, query: &Query) -> usize {
        let mark = self.scope.len();
        for variable in &query.fresh {
            self.scope
                .push((variable.clone(), Rc::new(RefCell::new(None))));
        }
        mark
    }

    fn cell(&self, variable: &str) -> WslResult<CellRef> {
        self.scope
            .iter()
            .rev()
            .find(|(v, _)| v == variable)
            .map(|(_, cell)| cell.clone())
            .ok_or_else(|| {
                WslError::Configuration(ConfigurationError::new(format!(
                    "variable \"{}\" not in scope",
                    variable
                )))
            })
    }

    /// Fill a variable's cell, enforcing write-once consistency.
    fn set(&mut self, variable: &str, value: &Value) -> WslResult<()> {
        let cell = self.cell(variable)?;
        let mut slot = cell.borrow_mut();
        match slot.as_ref() {
            None => {
                *slot = Some(value.clone());
                Ok(())
            }
            Some(prev) if prev == value => Ok(()),
            Some(prev) => Err(WslError::Integrity(IntegrityError::ValueConflict {
                variable: variable.to_string(),
                first: prev.to_string(),
                second: value.to_string(),
            })),
        }
    }

    /// Record one row for the query, to be materialized at the end.
    fn record(&mut self, query: &Query) -> WslResult<()> {
        let mut cells = Vec::with_capacity(query.variables.len());
        for variable in &query.variables {
            cells.push((variable.clone(), self.cell(variable)?));
        }
        self.pending.push(PendingRow {
            table: query.table.clone(),
            cells,
        });
        Ok(())
    }
}

fn expected(kind: &str, obj: &Object) -> WslError {
    WslError::Format(FormatError::new(
        "shape conversion",
        format!("{:?}", obj),
        format!("expected {} object", kind),
    ))
}

fn descend(spec: &Shape, obj: &Object, writer: &mut Writer) -> WslResult<()> {
    match spec {
        Shape::Value {
            variable, query, ..
        } => {
            let Object::Value(value) = obj else {
                return Err(expected("scalar", obj));
            };
            match query {
                None => writer.set(variable, value),
                Some(query) => {
                    let mark = writer.push_query(query);
                    writer.set(variable, value)?;
                    writer.record(query)?;
                    writer.scope.truncate(mark);
                    Ok(())
                }
            }
        }
        Shape::Struct { childs } => {
            let Object::Struct(map) = obj else {
                return Err(expected("struct", obj));
            };
            for name in map.keys() {
                if !childs.contains_key(name) {
                    return Err(WslError::Format(FormatError::new(
                        "shape conversion",
                        name,
                        "unexpected member",
                    )));
                }
            }
            for (name, child) in childs {
                let sub = map.get(name).ok_or_else(|| {
                    WslError::Format(FormatError::new(
                        "shape conversion",
                        name,
                        "expected member",
                    ))
                })?;
                descend(child, sub, writer)?;
            }
            Ok(())
        }
        Shape::Option { val, query } => {
            if obj.is_null() {
                return Ok(());
            }
            let mark = writer.push_query(query);
            descend(val, obj, writer)?;
            writer.record(query)?;
            writer.scope.truncate(mark);
            Ok(())
        }
        Shape::Set { val, query } => {
            let Object::Set(items) = obj else {
                return Err(expected("set", obj));
            };
            for item in items {
                let mark = writer.push_query(query);
                descend(val, item, writer)?;
                writer.record(query)?;
                writer.scope.truncate(mark);
            }
            Ok(())
        }
        Shape::List { idx, val, query } => {
            let Object::List(items) = obj else {
                return Err(expected("list", obj));
            };
            for (position, item) in items.iter().enumerate() {
                let mark = writer.push_query(query);
                descend(idx, &Object::Value(Value::Int(position as i64)), writer)?;
                descend(val, item, writer)?;
                writer.record(query)?;
                writer.scope.truncate(mark);
            }
            Ok(())
        }
        Shape::Dict { key, val, query } => {
            let Object::Dict(map) = obj else {
                return Err(expected("dict", obj));
            };
            for (key_value, item) in map {
                let mark = writer.push_query(query);
                descend(key, &Object::Value(key_value.clone()), writer)?;
                descend(val, item, writer)?;
                writer.record(query)?;
                writer.scope.truncate(mark);
            }
            Ok(())
        }
    }
}

/// Convert a tree object into relational rows according to a shape.
///
/// Tables come back deduplicated and sorted. List elements contribute their
/// position as the `_idx_` value.
pub fn objects2rows(spec: &Shape, objects: &Object) -> WslResult<Database> {
    let mut writer = Writer::default();
    descend(spec, objects, &mut writer)?;

    let mut database = Database::new();
    for row in &writer.pending {
        let mut values = Vec::with_capacity(row.cells.len());
        for (variable, cell) in &row.cells {
            let value = cell.borrow().clone().ok_or_else(|| {
                WslError::Format(FormatError::new(
                    "shape conversion",
                    variable,
                    "query variable was never assigned a value",
                ))
            })?;
            values.push(value);
        }
        database.insert(row.table.clone(), values);
    }
    for rows in database.tables.values_mut() {
        rows.sort();
        rows.dedup();
    }
    Ok(database)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::from_rows::rows2objects;
    use crate::parser::parse_spec;
    use wsl_core::{parse_database_with_schema, parse_schema, DomainRegistry, Schema};

    fn schema() -> Schema {
        parse_schema(
            "DOMAIN Int Int\nTABLE bar Int Int\nTABLE foo Int Int Int\n",
            &DomainRegistry::builtin(),
        )
        .unwrap()
    }

    const SPEC: &str = "\
bars: dict for (c d) (bar c d)
    _key_: value c
    _val_: struct
        c: value c
        d: value d
        s: option for (a b) (foo a b c)
            _val_: struct
                a: value a
                b: value b
";

    // ==================== Round trip ====================

    #[test]
    fn test_objects2rows_inverts_rows2objects() {
        let schema = schema();
        let spec = parse_spec(&schema, SPEC).unwrap();
        let db = parse_database_with_schema(
            "bar 3 666\nbar 6 1024\nbar 42 0\nfoo 1 2 3\nfoo 4 5 6\n",
            &schema,
        )
        .unwrap();
        let objects = rows2objects(&spec, &db).unwrap();
        let back = objects2rows(&spec, &objects).unwrap();
        assert_eq!(back, db);
    }

    #[test]
    fn test_objects2rows_set_round_trip() {
        let schema = schema();
        let spec = parse_spec(
            &schema,
            "xs: set for (c d) (bar c d)\n    _val_: struct\n        c: value c\n        d: value d\n",
        )
        .unwrap();
        let db = parse_database_with_schema("bar 1 2\nbar 3 4\n", &schema).unwrap();
        let objects = rows2objects(&spec, &db).unwrap();
        assert_eq!(objects2rows(&spec, &objects).unwrap(), db);
    }

    #[test]
    fn test_objects2rows_deduplicates() {
        let schema = schema();
        // Two members contributing the same bar row produce it once.
        let spec = parse_spec(
            &schema,
            "a: option for (c d) (bar c d)\n    _val_: struct\n        c: value c\n        d: value d\n\
             b: option for (c d) (bar c d)\n    _val_: struct\n        c: value c\n        d: value d\n",
        )
        .unwrap();
        let mut inner = std::collections::BTreeMap::new();
        inner.insert("c".to_string(), Object::int(1));
        inner.insert("d".to_string(), Object::int(2));
        let objects = Object::structure([
            ("a", Object::Struct(inner.clone())),
            ("b", Object::Struct(inner)),
        ]);
        let db = objects2rows(&spec, &objects).unwrap();
        assert_eq!(db.rows("bar"), &[vec![Value::Int(1), Value::Int(2)]]);
    }

    // ==================== Write-once conflicts ====================

    #[test]
    fn test_conflicting_values_rejected() {
        let schema = schema();
        // c is used both as dict key and inside the value struct; a tree
        // carrying different values at those places must fail.
        let spec = parse_spec(
            &schema,
            "xs: dict for (c d) (bar c d)\n    _key_: value c\n    _val_: struct\n        c: value c\n        d: value d\n",
        )
        .unwrap();
        let mut inner = std::collections::BTreeMap::new();
        inner.insert("c".to_string(), Object::int(99));
        inner.insert("d".to_string(), Object::int(0));
        let mut map = std::collections::BTreeMap::new();
        map.insert(Value::Int(1), Object::Struct(inner));
        let objects = Object::structure([("xs", Object::Dict(map))]);
        let err = objects2rows(&spec, &objects).unwrap_err();
        match err {
            WslError::Integrity(IntegrityError::ValueConflict { variable, .. }) => {
                assert_eq!(variable, "c");
            }
            other => panic!("expected value conflict, got {:?}", other),
        }
    }

    #[test]
    fn test_agreeing_values_accepted() {
        let schema = schema();
        let spec = parse_spec(
            &schema,
            "xs: dict for (c d) (bar c d)\n    _key_: value c\n    _val_: struct\n        c: value c\n        d: value d\n",
        )
        .unwrap();
        let mut inner = std::collections::BTreeMap::new();
        inner.insert("c".to_string(), Object::int(1));
        inner.insert("d".to_string(), Object::int(0));
        let mut map = std::collections::BTreeMap::new();
        map.insert(Value::Int(1), Object::Struct(inner));
        let objects = Object::structure([("xs", Object::Dict(map))]);
        let db = objects2rows(&spec, &objects).unwrap();
        assert_eq!(db.rows("bar"), &[vec![Value::Int(1), Value::Int(0)]]);
    }

    // ==================== Structural errors ====================

    #[test]
    fn test_missing_member_rejected() {
        let schema = schema();
        let spec = parse_spec(
            &schema,
            "xs: set for (c d) (bar c d)\n    _val_: struct\n        c: value c\n        d: value d\n",
        )
        .unwrap();
        let mut inner = std::collections::BTreeMap::new();
        inner.insert("c".to_string(), Object::int(1));
        let mut set = std::collections::BTreeSet::new();
        set.insert(Object::Struct(inner));
        let objects = Object::structure([("xs", Object::Set(set))]);
        assert!(objects2rows(&spec, &objects).is_err());
    }

    #[test]
    fn test_unexpected_member_rejected() {
        let schema = schema();
        let spec = parse_spec(&schema, "x: value c for (c d) (bar c d)\n").unwrap();
        // Root struct with a stray member.
        let objects = Object::structure([("x", Object::int(1)), ("y", Object::int(2))]);
        assert!(objects2rows(&spec, &objects).is_err());
    }

    #[test]
    fn test_uncovered_variable_rejected() {
        let schema = schema();
        // d is fresh but never consumed by a value member.
        let spec = parse_spec(&schema, "xs: set for (c d) (bar c d)\n    _val_: value c\n").unwrap();
        let mut set = std::collections::BTreeSet::new();
        set.insert(Object::int(1));
        let objects = Object::structure([("xs", Object::Set(set))]);
        let err = objects2rows(&spec, &objects).unwrap_err();
        assert!(format!("{}", err).contains("never assigned"));
    }

    // ==================== Option and list ====================

    #[test]
    fn test_option_null_produces_no_row() {
        let schema = schema();
        let spec = parse_spec(
            &schema,
            "x: option for (a b c) (foo a b c)\n    _val_: struct\n        a: value a\n        b: value b\n        c: value c\n",
        )
        .unwrap();
        let objects = Object::structure([("x", Object::Null)]);
        let db = objects2rows(&spec, &objects).unwrap();
        assert_eq!(db.rows("foo").len(), 0);
    }

    #[test]
    fn test_list_positions_become_indices() {
        let schema = schema();
        let spec = parse_spec(
            &schema,
            "xs: list for (c d) (bar c d)\n    _idx_: value c\n    _val_: value d\n",
        )
        .unwrap();
        let objects = Object::structure([(
            "xs",
            Object::List(vec![Object::int(10), Object::int(20)]),
        )]);
        let db = objects2rows(&spec, &objects).unwrap();
        assert_eq!(
            db.rows("bar"),
            &[
                vec![Value::Int(0), Value::Int(10)],
                vec![Value::Int(1), Value::Int(20)]
            ]
        );
    }

    #[test]
    fn test_value_member_with_query() {
        let schema = schema();
        let spec = parse_spec(&schema, "x: value c for (c d) (bar c d)\n").unwrap();
        let objects = Object::structure([("x", Object::int(7))]);
        // d is never assigned: the row cannot be materialized.
        assert!(objects2rows(&spec, &objects).is_err());
    }
}
