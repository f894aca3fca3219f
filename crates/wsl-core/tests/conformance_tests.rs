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

//! WSL conformance tests: schema/database round trips, integrity
//! constraints and token boundary cases.

use wsl_core::{
    check_database_integrity, format_database, format_schema, parse_database,
    parse_database_with_schema, parse_schema, DomainRegistry, IntegrityError, Value, WslError,
};

fn registry() -> DomainRegistry {
    DomainRegistry::builtin()
}

// =============================================================================
// Schema round trips
// =============================================================================

#[test]
fn test_schema_round_trip() {
    let spec = "DOMAIN ID ID\nDOMAIN String String\nTABLE Person ID String\n";
    let schema = parse_schema(spec, &registry()).unwrap();
    let reparsed = parse_schema(&format_schema(&schema, false), &registry()).unwrap();
    assert_eq!(schema, reparsed);
}

#[test]
fn test_schema_round_trip_with_constraints() {
    let spec = "DOMAIN ID ID\nDOMAIN Int Int\n\
                TABLE Parent ID Int\nTABLE Child ID ID\n\
                KEY ParentId Parent p *\n\
                REFERENCE ChildParent Child p * => Parent p *\n";
    let schema = parse_schema(spec, &registry()).unwrap();
    let reparsed = parse_schema(&format_schema(&schema, false), &registry()).unwrap();
    assert_eq!(schema, reparsed);
    assert_eq!(reparsed.foreignkeys["ChildParent"].refkey, Some("ParentId".to_string()));
}

// =============================================================================
// Scenario 1: schema/database round trip
// =============================================================================

#[test]
fn test_person_database_round_trip() {
    let spec = "DOMAIN ID ID\nDOMAIN String String\nTABLE Person ID String\n";
    let schema = parse_schema(spec, &registry()).unwrap();
    let input = "Person jane [Jane Dane]\nPerson john [John Doe]\n";

    let db = parse_database_with_schema(input, &schema).unwrap();
    let rows = db.rows("Person");
    assert_eq!(rows.len(), 2);
    assert_eq!(
        rows[0],
        vec![Value::Id("jane".into()), Value::String("Jane Dane".to_string())]
    );
    assert_eq!(
        rows[1],
        vec![Value::Id("john".into()), Value::String("John Doe".to_string())]
    );

    // Formatting yields the same text (already sorted by first column).
    let formatted = format_database(&schema, &db, false).unwrap();
    assert_eq!(formatted, input);

    // parse . format . parse is the identity on databases.
    let reparsed = parse_database_with_schema(&formatted, &schema).unwrap();
    assert_eq!(reparsed, db);
}

#[test]
fn test_inline_schema_round_trip() {
    let text = "% DOMAIN ID ID\n% DOMAIN String String\n% TABLE Person ID String\n\
                Person jane [Jane Dane]\nPerson john [John Doe]\n";
    let (schema, db) = parse_database(text, &registry()).unwrap();
    let formatted = format_database(&schema, &db, true).unwrap();
    assert_eq!(formatted, text);
    let (schema2, db2) = parse_database(&formatted, &registry()).unwrap();
    assert_eq!(schema, schema2);
    assert_eq!(db, db2);
}

#[test]
fn test_format_is_canonical() {
    let spec = "DOMAIN ID ID\nTABLE B ID\nTABLE A ID\n";
    let schema = parse_schema(spec, &registry()).unwrap();
    // Unsorted input: tables and rows come out sorted.
    let db = parse_database_with_schema("B z\nB a\nA m\n", &schema).unwrap();
    let formatted = format_database(&schema, &db, false).unwrap();
    assert_eq!(formatted, "A m\nB a\nB z\n");
    // Formatting the canonical text again is stable.
    let db2 = parse_database_with_schema(&formatted, &schema).unwrap();
    assert_eq!(format_database(&schema, &db2, false).unwrap(), formatted);
}

// =============================================================================
// Scenario 2: foreign key violation
// =============================================================================

#[test]
fn test_foreign_key_violation_reported() {
    let spec = "DOMAIN ID ID\nDOMAIN Int Int\nDOMAIN String String\n\
                TABLE Parent ID Int\nTABLE Child ID String\n\
                KEY ParentId Parent p *\n\
                REFERENCE ChildParent Child p c => Parent p *\n";
    let schema = parse_schema(spec, &registry()).unwrap();
    let db = parse_database_with_schema(
        "Parent a 1\nParent b 2\nChild a [hi]\nChild z [oops]\n",
        &schema,
    )
    .unwrap();
    let err = check_database_integrity(&schema, &db).unwrap_err();
    match err {
        WslError::Integrity(IntegrityError::ForeignKeyConstraintViolation {
            foreignkey,
            row,
            ..
        }) => {
            assert_eq!(foreignkey, "ChildParent");
            assert_eq!(
                row,
                vec![Value::Id("z".into()), Value::String("oops".to_string())]
            );
        }
        other => panic!("expected foreign key violation, got {:?}", other),
    }
}

// =============================================================================
// Token boundaries
// =============================================================================

#[test]
fn test_integer_leading_zero_fails() {
    let schema = parse_schema("DOMAIN Int Int\nTABLE T Int\n", &registry()).unwrap();
    assert!(parse_database_with_schema("T 0\n", &schema).is_ok());
    assert!(parse_database_with_schema("T 0123\n", &schema).is_err());
    assert!(parse_database_with_schema("T -5\n", &schema).is_ok());
    assert!(parse_database_with_schema("T -0\n", &schema).is_err());
}

#[test]
fn test_empty_string_token() {
    let schema = parse_schema("DOMAIN String String\nTABLE T String\n", &registry()).unwrap();
    let db = parse_database_with_schema("T []\n", &schema).unwrap();
    assert_eq!(db.rows("T")[0][0], Value::String(String::new()));
    assert_eq!(format_database(&schema, &db, false).unwrap(), "T []\n");
}

#[test]
fn test_empty_string_token_escape_mode() {
    let schema =
        parse_schema("DOMAIN String String escape\nTABLE T String\n", &registry()).unwrap();
    let db = parse_database_with_schema("T []\n", &schema).unwrap();
    assert_eq!(format_database(&schema, &db, false).unwrap(), "T []\n");
}

#[test]
fn test_unknown_escape_message() {
    let schema =
        parse_schema("DOMAIN String String escape\nTABLE T String\n", &registry()).unwrap();
    let err = parse_database_with_schema("T [a\\qb]\n", &schema).unwrap_err();
    let message = format!("{}", err);
    assert!(message.contains("Unknown escape sequence: \\q"), "{}", message);
    assert!(message.contains("While lexing String literal"), "{}", message);
}

#[test]
fn test_identifier_boundaries() {
    let schema = parse_schema("DOMAIN ID ID\nTABLE T ID\n", &registry()).unwrap();
    // A missing identifier token fails.
    assert!(parse_database_with_schema("T \n", &schema).is_err());
    // Identifiers may contain any character above 0x20 except DEL.
    let db = parse_database_with_schema("T x-y.z!\n", &schema).unwrap();
    assert_eq!(db.rows("T")[0][0].as_id(), Some("x-y.z!"));
}

#[test]
fn test_double_space_rejected() {
    let schema = parse_schema("DOMAIN ID ID\nTABLE T ID ID\n", &registry()).unwrap();
    assert!(parse_database_with_schema("T a  b\n", &schema).is_err());
}

#[test]
fn test_ipv4_boundaries() {
    let schema = parse_schema("DOMAIN Addr IPv4\nTABLE T Addr\n", &registry()).unwrap();
    assert!(parse_database_with_schema("T 0.0.0.0\n", &schema).is_ok());
    assert!(parse_database_with_schema("T 255.255.255.255\n", &schema).is_ok());
    assert!(parse_database_with_schema("T 256.0.0.1\n", &schema).is_err());
    assert!(parse_database_with_schema("T 1.2.3\n", &schema).is_err());
}

#[test]
fn test_enum_database() {
    let spec = "DOMAIN Color Enum red green blue\nTABLE T Color\n";
    let schema = parse_schema(spec, &registry()).unwrap();
    let db = parse_database_with_schema("T blue\nT red\n", &schema).unwrap();
    // Enum rows sort by encoded token, not by declared index.
    assert_eq!(format_database(&schema, &db, false).unwrap(), "T blue\nT red\n");
    assert!(parse_database_with_schema("T purple\n", &schema).is_err());
}

// =============================================================================
// Schema errors
// =============================================================================

#[test]
fn test_schema_error_cases() {
    let r = registry();
    // Redeclared table.
    assert!(parse_schema("DOMAIN ID ID\nTABLE T ID\nTABLE T ID\n", &r).is_err());
    // Unknown domain in table.
    assert!(parse_schema("TABLE T Missing\n", &r).is_err());
    // Key on unknown table.
    assert!(parse_schema("DOMAIN ID ID\nKEY K T x\n", &r).is_err());
    // Reference without matching unique key.
    assert!(parse_schema(
        "DOMAIN ID ID\nDOMAIN Int Int\nTABLE P ID Int\nTABLE C ID\n\
         REFERENCE R C p => P p *\n",
        &r
    )
    .is_err());
}

#[test]
fn test_error_message_has_position() {
    let schema =
        parse_schema("DOMAIN String String escape\nTABLE T String\n", &registry()).unwrap();
    // The bad escape is on line 2 of the data text.
    let err = parse_database_with_schema("T [ok]\nT [a\\q]\n", &schema).unwrap_err();
    let message = format!("{}", err);
    assert!(message.contains("2:"), "{}", message);
}
