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

//! # WSL - Whitespace-Separated Literals
//!
//! WSL is a plain-text relational database format: a database is a set of
//! named tables, each a multiset of fixed-arity rows of typed values,
//! described by an explicit schema. This crate bundles:
//!
//! - schema and database parsing, formatting and integrity checking,
//! - the shape engine converting between tables and nested objects,
//! - text and JSON codecs for shape objects.
//!
//! ## Quick Start
//!
//! ```rust
//! use wsl::{parse_database, check_database_integrity, format_database, DomainRegistry};
//!
//! let text = "\
//! % DOMAIN ID ID
//! % DOMAIN String String
//! % TABLE Person ID String
//! Person jane [Jane Dane]
//! Person john [John Doe]
//! ";
//!
//! let (schema, db) = parse_database(text, &DomainRegistry::builtin()).expect("parse");
//! check_database_integrity(&schema, &db).expect("integrity");
//! let out = format_database(&schema, &db, true).expect("format");
//! assert_eq!(out, text);
//! ```
//!
//! ## Modules
//!
//! - [`lex`]: character-level lexers for the WSL text format
//! - [`shape`](mod@shape): shape specifications and objects⇄rows
//! - [`text`](mod@text): indented text form for shape objects
//! - [`json`](mod@json): JSON form for shape objects

// Re-export core types
pub use wsl_core::{
    // Functions
    check_database_integrity,
    compute_line_and_column,
    format_database,
    format_row,
    format_schema,
    parse_database,
    parse_database_with_schema,
    parse_schema,
    split_header,
    // Main types
    Database,
    Domain,
    DomainParser,
    DomainRegistry,
    DomainType,
    EnumBase,
    EnumValue,
    ForeignKey,
    JsonType,
    Key,
    Row,
    Schema,
    Table,
    Value,
    // Errors
    ConfigurationError,
    FormatError,
    IntegrityError,
    LexError,
    ParseError,
    WslError,
    WslResult,
};

// Re-export lexer utilities
pub mod lex {
    //! Character-level lexers and unlexers for the WSL text format.
    pub use wsl_core::lex::{
        is_identifier_char, lex_float, lex_identifier, lex_int, lex_newline, lex_space,
        lex_string_with_escapes, lex_string_without_escapes, lex_table_name, unlex_identifier,
        unlex_int, unlex_string_with_escapes, unlex_string_without_escapes,
    };
}

// Re-export the shape engine
pub mod shape {
    //! Shape specifications and objects⇄rows conversion.
    pub use wsl_shape::{
        check_coverage, objects2rows, parse_spec, rows2objects, Coverage, Object, Query, Shape,
    };
}

// Re-export the text form
pub mod text {
    //! Indented text form for shape objects.
    pub use wsl_text::{objects2text, text2objects};
}

// Re-export the JSON form
pub mod json {
    //! JSON form for shape objects.
    pub use wsl_json::{from_json_string, json2objects, objects2json, to_json_string};
}
