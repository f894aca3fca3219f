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

//! Property tests for codec round trips.

use proptest::prelude::*;
use wsl_core::{
    format_database, parse_database_with_schema, parse_schema, Database, DomainRegistry, Schema,
    Value,
};

fn schema() -> Schema {
    parse_schema(
        "DOMAIN ID ID\nDOMAIN Int Int\nDOMAIN String String escape\n\
         TABLE Entry ID Int String\n",
        &DomainRegistry::builtin(),
    )
    .unwrap()
}

fn identifier() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9_.-]{0,8}"
}

// Escaped strings can carry brackets, backslashes and control characters.
fn text_value() -> impl Strategy<Value = String> {
    proptest::collection::vec(
        prop_oneof![
            proptest::char::range('a', 'z').prop_map(|c| c.to_string()),
            Just("[".to_string()),
            Just("]".to_string()),
            Just("\\".to_string()),
            Just(" ".to_string()),
            Just("\u{1}".to_string()),
            Just("é".to_string()),
        ],
        0..12,
    )
    .prop_map(|parts| parts.concat())
}

fn row() -> impl Strategy<Value = Vec<Value>> {
    (identifier(), any::<i64>(), text_value()).prop_map(|(id, n, s)| {
        vec![Value::Id(id), Value::Int(n), Value::String(s)]
    })
}

proptest! {
    #[test]
    fn format_then_parse_is_identity(rows in proptest::collection::vec(row(), 0..8)) {
        let schema = schema();
        let mut db = Database::new();
        for r in rows {
            db.insert("Entry", r);
        }
        let text = format_database(&schema, &db, false).unwrap();
        let reparsed = parse_database_with_schema(&text, &schema).unwrap();
        prop_assert_eq!(&reparsed, &db);
        // Formatting the reparsed database is stable.
        let text2 = format_database(&schema, &reparsed, false).unwrap();
        prop_assert_eq!(text2, text);
    }

    #[test]
    fn inline_schema_round_trip(rows in proptest::collection::vec(row(), 0..5)) {
        let schema = schema();
        let mut db = Database::new();
        for r in rows {
            db.insert("Entry", r);
        }
        let text = format_database(&schema, &db, true).unwrap();
        let (schema2, db2) = wsl_core::parse_database(&text, &DomainRegistry::builtin()).unwrap();
        prop_assert_eq!(schema2, schema);
        prop_assert_eq!(db2, db);
    }
}
