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

//! JSON form for WSL shape objects, built on `serde_json`.
//!
//! Scalars map to the JSON primitive declared by their domain; dict keys
//! are stringified through the key domain. [`json2objects`] parses exactly
//! what [`objects2json`] emits.

mod from_json;
mod to_json;

pub use from_json::{from_json_string, json2objects};
pub use to_json::{objects2json, to_json_string};
