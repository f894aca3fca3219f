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

//! Shape engine: declarative conversion between WSL tables and tree
//! objects.
//!
//! A shape specification is a tree of `value`, `struct`, `option`, `set`,
//! `list` and `dict` nodes, each composite node carrying a relational query
//! with fresh and bound variables. [`rows2objects`] materializes nested
//! objects from a database; [`objects2rows`] is the inverse. For shapes
//! covering every column exactly once the two are mutually inverse; use
//! [`check_coverage`] to inspect per-column use counts.

mod coverage;
mod from_rows;
mod object;
mod parser;
mod shape;
mod to_rows;

pub use coverage::{check_coverage, Coverage};
pub use from_rows::rows2objects;
pub use object::Object;
pub use parser::parse_spec;
pub use shape::{Query, Shape};
pub use to_rows::objects2rows;
