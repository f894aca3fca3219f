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

//! Shape specifications: the tree of node kinds and their queries.

use std::collections::BTreeMap;

/// A relational pattern constraining which rows produce a subtree.
///
/// Declares that there exists a row in `table` such that positionally
/// `variables[i]` is bound there. The variables in `fresh` are newly
/// introduced by this query; all others must already be bound above.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    /// Variables introduced by this query.
    pub fresh: Vec<String>,
    /// The queried table.
    pub table: String,
    /// One variable per column of `table`.
    pub variables: Vec<String>,
}

impl Query {
    /// Whether a variable is introduced by this query.
    pub fn is_fresh(&self, variable: &str) -> bool {
        self.fresh.iter().any(|v| v == variable)
    }
}

/// One node of a shape specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    /// A leaf denoting a typed scalar drawn from an in-scope variable.
    Value {
        /// The in-scope variable holding the value.
        variable: String,
        /// Optional query binding the variable locally.
        query: Option<Query>,
        /// Domain name of the variable, inferred from the schema.
        primtype: String,
    },
    /// A fixed-keyed record. Queries are not allowed on structs.
    Struct {
        /// Named children.
        childs: BTreeMap<String, Shape>,
    },
    /// A nullable subtree; present when the query matches a row.
    Option {
        /// The `_val_` child.
        val: Box<Shape>,
        /// The query deciding presence.
        query: Query,
    },
    /// An unordered, deduplicated collection.
    Set {
        /// The `_val_` child.
        val: Box<Shape>,
        /// One element per matching row.
        query: Query,
    },
    /// An ordered collection, sorted by the `_idx_` child.
    List {
        /// The `_idx_` child.
        idx: Box<Shape>,
        /// The `_val_` child.
        val: Box<Shape>,
        /// One element per matching row.
        query: Query,
    },
    /// A keyed collection. The `_key_` child must be a `Value`.
    Dict {
        /// The `_key_` child.
        key: Box<Shape>,
        /// The `_val_` child.
        val: Box<Shape>,
        /// One entry per matching row.
        query: Query,
    },
}

impl Shape {
    /// The query attached to this node, if any.
    pub fn query(&self) -> Option<&Query> {
        match self {
            Self::Value { query, .. } => query.as_ref(),
            Self::Struct { .. } => None,
            Self::Option { query, .. }
            | Self::Set { query, .. }
            | Self::List { query, .. }
            | Self::Dict { query, .. } => Some(query),
        }
    }

    /// Whether this node is a `Value` leaf.
    pub fn is_value(&self) -> bool {
        matches!(self, Self::Value { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> Query {
        Query {
            fresh: vec!["a".to_string()],
            table: "foo".to_string(),
            variables: vec!["a".to_string(), "b".to_string()],
        }
    }

    #[test]
    fn test_query_is_fresh() {
        let q = query();
        assert!(q.is_fresh("a"));
        assert!(!q.is_fresh("b"));
    }

    #[test]
    fn test_shape_query_accessor() {
        let value = Shape::Value {
            variable: "a".to_string(),
            query: None,
            primtype: "Int".to_string(),
        };
        assert!(value.query().is_none());
        assert!(value.is_value());

        let set = Shape::Set {
            val: Box::new(value),
            query: query(),
        };
        assert_eq!(set.query().unwrap().table, "foo");
        assert!(!set.is_value());

        let strct = Shape::Struct {
            childs: BTreeMap::new(),
        };
        assert!(strct.query().is_none());
    }
}
