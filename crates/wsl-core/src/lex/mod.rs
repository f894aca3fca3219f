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

//! Character-level lexers and unlexers for the WSL text format.
//!
//! All lexers take the whole input buffer and a byte offset and return the
//! offset of the first unconsumed byte together with the lexed token.
//! Unlexers are the inverses; they reject values that would not produce a
//! lexable token.

mod strings;
mod tokens;

pub use strings::{
    lex_string_with_escapes, lex_string_without_escapes, unlex_string_with_escapes,
    unlex_string_without_escapes,
};
pub use tokens::{
    is_identifier_char, lex_float, lex_identifier, lex_int, lex_newline, lex_space,
    lex_table_name, unlex_identifier, unlex_int,
};
