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

//! Core schema model and text codec for WSL databases.
//!
//! A WSL database is a set of named tables; each table is a multiset of
//! fixed-arity rows of typed values. This crate provides:
//!
//! - the schema model (`DOMAIN`/`TABLE`/`KEY`/`REFERENCE`) and its parser,
//! - the domain registry with the built-in value types,
//! - the character-level [`lex`] module for the WSL text format,
//! - the database parser and canonical formatter,
//! - the integrity checker for key and reference constraints.

mod database;
mod domain;
mod error;
mod format;
mod integrity;
pub mod lex;
mod parser;
mod schema;
mod value;

pub use database::{Database, Row};
pub use domain::{DomainParser, DomainRegistry, DomainType, JsonType};
pub use error::{
    compute_line_and_column, ConfigurationError, FormatError, IntegrityError, LexError,
    ParseError, WslError, WslResult,
};
pub use format::{format_database, format_row, format_schema};
pub use integrity::check_database_integrity;
pub use parser::{
    is_name, is_variable, parse_database, parse_database_with_schema, parse_schema, split_header,
};
pub use schema::{Domain, ForeignKey, Key, Schema, Table};
pub use value::{EnumBase, EnumValue, Value};
