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

//! Tree-shaped objects produced and consumed by the shape engine.

use std::collections::{BTreeMap, BTreeSet};
use wsl_core::Value;

/// A tree-shaped object.
///
/// Collections are ordered containers so that emission is deterministic:
/// sets deduplicate and iterate in value order, dict entries iterate in key
/// order, lists keep their element order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Object {
    /// The absent option value.
    Null,
    /// A scalar.
    Value(Value),
    /// A fixed-keyed record.
    Struct(BTreeMap<String, Object>),
    /// An unordered, deduplicated collection.
    Set(BTreeSet<Object>),
    /// An ordered collection.
    List(Vec<Object>),
    /// A keyed collection with scalar keys.
    Dict(BTreeMap<Value, Object>),
}

impl Object {
    /// Whether this is the absent option value.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Try to get the object as a scalar.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get the object as a struct.
    pub fn as_struct(&self) -> Option<&BTreeMap<String, Object>> {
        match self {
            Self::Struct(map) => Some(map),
            _ => None,
        }
    }

    /// Try to get the object as a set.
    pub fn as_set(&self) -> Option<&BTreeSet<Object>> {
        match self {
            Self::Set(set) => Some(set),
            _ => None,
        }
    }

    /// Try to get the object as a list.
    pub fn as_list(&self) -> Option<&[Object]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Try to get the object as a dict.
    pub fn as_dict(&self) -> Option<&BTreeMap<Value, Object>> {
        match self {
            Self::Dict(map) => Some(map),
            _ => None,
        }
    }

    /// Build a struct object from name/object pairs.
    pub fn structure<I>(members: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, Object)>,
    {
        Self::Struct(
            members
                .into_iter()
                .map(|(name, object)| (name.to_string(), object))
                .collect(),
        )
    }

    /// Build a scalar integer object.
    pub fn int(n: i64) -> Self {
        Self::Value(Value::Int(n))
    }

    /// Build a scalar identifier object.
    pub fn id(s: &str) -> Self {
        Self::Value(Value::Id(s.to_string()))
    }
}

impl From<Value> for Object {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}
