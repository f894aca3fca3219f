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

//! Parser for the shape specification DSL.
//!
//! The grammar is line-based with indentation increments of four spaces
//! (tabs are forbidden):
//!
//! ```text
//! INDENT name ":" SP type (SP variable | SP "for" SP "(" fresh… ")" SP "(" table var… ")")?
//! ```
//!
//! Composite nodes introduce children on deeper-indented lines using the
//! reserved child names `_val_` (option/set/list/dict), `_key_` (dict) and
//! `_idx_` (list). Variable types are inferred from the queried tables'
//! column domains.

use crate::shape::{Query, Shape};
use wsl_core::{ParseError, Schema, WslError, WslResult};
use std::collections::BTreeMap;

const CONTEXT: &str = "shape specification";
const INDENT_STEP: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MemberType {
    Value,
    Struct,
    Option,
    Set,
    List,
    Dict,
}

const MEMBER_TYPES: [(&str, MemberType); 6] = [
    ("value", MemberType::Value),
    ("struct", MemberType::Struct),
    ("option", MemberType::Option),
    ("set", MemberType::Set),
    ("list", MemberType::List),
    ("dict", MemberType::Dict),
];

struct SpecLine {
    indent: usize,
    name: String,
    membertype: MemberType,
    variable: Option<String>,
    query: Option<Query>,
    offset: usize,
}

struct Parser<'a> {
    text: &'a str,
    schema: &'a Schema,
}

/// A variable binding: name and inferred domain.
type Scope = Vec<(String, String)>;

impl<'a> Parser<'a> {
    fn err(&self, pos: usize, message: impl Into<String>) -> WslError {
        WslError::Parse(ParseError::at(CONTEXT, self.text, pos, message))
    }

    // ---- Character-level helpers. `pos` is absolute; `end` is the line end.

    fn expect_char(&self, pos: usize, end: usize, c: char, desc: &str) -> WslResult<usize> {
        if pos < end && self.text[pos..].starts_with(c) {
            Ok(pos + c.len_utf8())
        } else {
            Err(self.err(pos, format!("expected {}", desc)))
        }
    }

    fn parse_space(&self, pos: usize, end: usize) -> WslResult<usize> {
        self.expect_char(pos, end, ' ', "space character")
    }

    fn scan_word(&self, pos: usize, end: usize, first: fn(u8) -> bool, more: fn(u8) -> bool) -> usize {
        let bytes = self.text.as_bytes();
        let mut i = pos;
        if i < end && first(bytes[i]) {
            i += 1;
            while i < end && more(bytes[i]) {
                i += 1;
            }
        }
        i
    }

    fn parse_identifier(&self, pos: usize, end: usize) -> WslResult<(usize, String)> {
        let i = self.scan_word(
            pos,
            end,
            |b| b.is_ascii_alphabetic() || b == b'_',
            |b| b.is_ascii_alphanumeric() || b == b'_',
        );
        if i == pos {
            return Err(self.err(pos, "expected identifier token"));
        }
        Ok((i, self.text[pos..i].to_string()))
    }

    fn parse_variable(&self, pos: usize, end: usize) -> WslResult<(usize, String)> {
        let i = self.scan_word(
            pos,
            end,
            |b| b.is_ascii_alphabetic(),
            |b| b.is_ascii_alphanumeric() || b == b'_',
        );
        if i == pos {
            return Err(self.err(pos, "expected variable name"));
        }
        Ok((i, self.text[pos..i].to_string()))
    }

    /// Parse a parenthesized variable list like `(a b c)`.
    fn parse_variable_list(
        &self,
        pos: usize,
        end: usize,
        empty_allowed: bool,
    ) -> WslResult<(usize, Vec<String>)> {
        let mut i = self.expect_char(pos, end, '(', "\"(\" character")?;
        let mut vars = Vec::new();
        loop {
            if i < end && self.text.as_bytes()[i] == b')' {
                if vars.is_empty() && !empty_allowed {
                    return Err(self.err(i, "empty identifier list not allowed"));
                }
                return Ok((i + 1, vars));
            }
            if !vars.is_empty() {
                i = self.parse_space(i, end)?;
            }
            let (next, var) = self.parse_variable(i, end)?;
            vars.push(var);
            i = next;
        }
    }

    fn parse_query(&self, pos: usize, end: usize) -> WslResult<(usize, Query)> {
        let (i, keyword) = self.parse_identifier(pos, end)?;
        if keyword != "for" {
            return Err(self.err(pos, format!("expected \"for\" keyword but found \"{}\"", keyword)));
        }
        let i = self.parse_space(i, end)?;
        let (i, fresh) = self.parse_variable_list(i, end, true)?;
        let i = self.parse_space(i, end)?;
        let (i, mut clause) = self.parse_variable_list(i, end, false)?;
        let table = clause.remove(0);
        Ok((
            i,
            Query {
                fresh,
                table,
                variables: clause,
            },
        ))
    }

    fn parse_line(&self, offset: usize, line: &str) -> WslResult<SpecLine> {
        let end = offset + line.len();
        let bytes = self.text.as_bytes();

        // Indentation: spaces only, tabs forbidden.
        let mut i = offset;
        while i < end && bytes[i] == b' ' {
            i += 1;
        }
        if i < end && bytes[i] == b'\t' {
            return Err(self.err(i, "tabs not allowed for indent"));
        }
        let indent = i - offset;

        let (i, name) = self
            .parse_identifier(i, end)
            .map_err(|_| self.err(offset, "expected a \"member: declaration\" line"))?;
        let i = self.expect_char(i, end, ':', "\":\" after member name")?;
        let mut i = self.parse_space(i, end)?;

        let (next, word) = self.parse_identifier(i, end)?;
        let membertype = MEMBER_TYPES
            .iter()
            .find(|(w, _)| *w == word)
            .map(|(_, t)| *t)
            .ok_or_else(|| {
                let valid: Vec<&str> = MEMBER_TYPES.iter().map(|(w, _)| *w).collect();
                self.err(
                    i,
                    format!(
                        "not a valid member type: \"{}\"; valid types are: {}",
                        word,
                        valid.join(" ")
                    ),
                )
            })?;
        i = next;

        let variable = if membertype == MemberType::Value {
            let j = self.parse_space(i, end)?;
            let (j, var) = self
                .parse_variable(j, end)
                .map_err(|_| self.err(j, "failed to parse member variable"))?;
            i = j;
            Some(var)
        } else {
            None
        };

        let query = if i < end {
            let j = self.parse_space(i, end)?;
            let (j, query) = self.parse_query(j, end)?;
            i = j;
            Some(query)
        } else {
            None
        };

        if i != end {
            return Err(self.err(i, "trailing characters after member declaration"));
        }

        Ok(SpecLine {
            indent,
            name,
            membertype,
            variable,
            query,
            offset,
        })
    }

    /// Type inference for a query: fresh variables bind to column domains,
    /// non-fresh variables must already be bound with a matching domain.
    fn infer_types(&self, line: &SpecLine, query: &Query, scope: &mut Scope) -> WslResult<()> {
        let table = self.schema.tables.get(&query.table).ok_or_else(|| {
            self.err(line.offset, format!("no such table: \"{}\"", query.table))
        })?;
        if query.variables.len() != table.arity() {
            return Err(self.err(
                line.offset,
                format!(
                    "query on table \"{}\": expected {} variables, got {}",
                    query.table,
                    table.arity(),
                    query.variables.len()
                ),
            ));
        }
        for fresh in &query.fresh {
            if !query.variables.iter().any(|v| v == fresh) {
                return Err(self.err(
                    line.offset,
                    format!("fresh variable \"{}\" does not occur in the query", fresh),
                ));
            }
        }
        let mark = scope.len();
        for (i, var) in query.variables.iter().enumerate() {
            let typ = &table.columns[i];
            if query.is_fresh(var) {
                // A fresh variable occurring at several positions must name
                // columns of one domain.
                match scope[mark..].iter().find(|(v, _)| v == var) {
                    Some((_, prev)) if prev != typ => {
                        return Err(self.err(
                            line.offset,
                            format!(
                                "type mismatch: variable \"{}\" bound to both \"{}\" and \"{}\"",
                                var, prev, typ
                            ),
                        ))
                    }
                    Some(_) => {}
                    None => scope.push((var.clone(), typ.clone())),
                }
            } else {
                match scope.iter().rev().find(|(v, _)| v == var) {
                    Some((_, bound)) if bound == typ => {}
                    Some((_, bound)) => {
                        return Err(self.err(
                            line.offset,
                            format!(
                                "type mismatch: usage of variable \"{}\" in this place of the query requires type \"{}\", but it was inferred to be of type \"{}\"",
                                var, typ, bound
                            ),
                        ))
                    }
                    None => {
                        return Err(self.err(
                            line.offset,
                            format!("variable not in scope: \"{}\"", var),
                        ))
                    }
                }
            }
        }
        Ok(())
    }

    fn parse_tree(
        &self,
        lines: &[SpecLine],
        mut li: usize,
        curindent: usize,
        scope: &mut Scope,
    ) -> WslResult<(usize, BTreeMap<String, Shape>)> {
        let mut tree: BTreeMap<String, Shape> = BTreeMap::new();
        while li < lines.len() {
            let line = &lines[li];
            if line.indent < curindent {
                break;
            }
            if line.indent > curindent {
                return Err(self.err(
                    line.offset,
                    format!("wrong amount of indentation (need {})", curindent),
                ));
            }

            let mark = scope.len();
            if let Some(query) = &line.query {
                self.infer_types(line, query, scope)?;
            }

            let shape = match line.membertype {
                MemberType::Value => {
                    let variable = line.variable.clone().expect("value member has a variable");
                    let primtype = scope
                        .iter()
                        .rev()
                        .find(|(v, _)| *v == variable)
                        .map(|(_, t)| t.clone())
                        .ok_or_else(|| {
                            self.err(line.offset, format!("variable not in scope: \"{}\"", variable))
                        })?;
                    li += 1;
                    Shape::Value {
                        variable,
                        query: line.query.clone(),
                        primtype,
                    }
                }
                MemberType::Struct => {
                    if line.query.is_some() {
                        return Err(self.err(line.offset, "queries not allowed for \"struct\" elements"));
                    }
                    let (next, childs) = self.parse_tree(lines, li + 1, curindent + INDENT_STEP, scope)?;
                    li = next;
                    for child in childs.keys() {
                        if child.starts_with('_') {
                            return Err(self.err(
                                line.offset,
                                format!("struct member child \"{}\" must not start with underscore", child),
                            ));
                        }
                    }
                    Shape::Struct { childs }
                }
                MemberType::Option | MemberType::Set | MemberType::List | MemberType::Dict => {
                    let query = line.query.clone().ok_or_else(|| {
                        self.err(line.offset, "this member type requires a query")
                    })?;
                    let (next, mut childs) =
                        self.parse_tree(lines, li + 1, curindent + INDENT_STEP, scope)?;
                    li = next;
                    match line.membertype {
                        MemberType::Option | MemberType::Set => {
                            let val = self.take_child(&mut childs, line, "_val_")?;
                            self.no_extra_childs(&childs, line)?;
                            if line.membertype == MemberType::Option {
                                Shape::Option { val: Box::new(val), query }
                            } else {
                                Shape::Set { val: Box::new(val), query }
                            }
                        }
                        MemberType::List => {
                            let idx = self.take_child(&mut childs, line, "_idx_")?;
                            let val = self.take_child(&mut childs, line, "_val_")?;
                            self.no_extra_childs(&childs, line)?;
                            Shape::List {
                                idx: Box::new(idx),
                                val: Box::new(val),
                                query,
                            }
                        }
                        MemberType::Dict => {
                            let key = self.take_child(&mut childs, line, "_key_")?;
                            let val = self.take_child(&mut childs, line, "_val_")?;
                            self.no_extra_childs(&childs, line)?;
                            if !key.is_value() {
                                return Err(self.err(
                                    line.offset,
                                    "dict member: _key_ must be a \"value\" member",
                                ));
                            }
                            Shape::Dict {
                                key: Box::new(key),
                                val: Box::new(val),
                                query,
                            }
                        }
                        _ => unreachable!(),
                    }
                }
            };

            if tree.insert(line.name.clone(), shape).is_some() {
                return Err(self.err(line.offset, format!("duplicate member \"{}\"", line.name)));
            }
            scope.truncate(mark);
        }
        Ok((li, tree))
    }

    fn take_child(
        &self,
        childs: &mut BTreeMap<String, Shape>,
        line: &SpecLine,
        name: &str,
    ) -> WslResult<Shape> {
        childs.remove(name).ok_or_else(|| {
            self.err(
                line.offset,
                format!("member \"{}\": need {} child", line.name, name),
            )
        })
    }

    fn no_extra_childs(&self, childs: &BTreeMap<String, Shape>, line: &SpecLine) -> WslResult<()> {
        if let Some(extra) = childs.keys().next() {
            return Err(self.err(
                line.offset,
                format!("member \"{}\": unexpected child \"{}\"", line.name, extra),
            ));
        }
        Ok(())
    }
}

/// Parse a shape specification against a schema.
///
/// Returns the root [`Shape::Struct`] holding the top-level members.
pub fn parse_spec(schema: &Schema, spec: &str) -> WslResult<Shape> {
    let parser = Parser { text: spec, schema };

    let mut lines = Vec::new();
    let mut offset = 0;
    for line in spec.split('\n') {
        if !line.trim().is_empty() {
            lines.push(parser.parse_line(offset, line)?);
        }
        offset += line.len() + 1;
    }

    let mut scope = Scope::new();
    let (li, childs) = parser.parse_tree(&lines, 0, 0, &mut scope)?;
    if li != lines.len() {
        return Err(parser.err(lines[li].offset, "wrong amount of indentation at top level"));
    }
    Ok(Shape::Struct { childs })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wsl_core::{parse_schema, DomainRegistry};

    fn schema() -> Schema {
        parse_schema(
            "DOMAIN Int Int\nDOMAIN ID ID\n\
             TABLE bar Int Int\nTABLE foo Int Int Int\n",
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

    // ==================== Happy path ====================

    #[test]
    fn test_parse_spec_structure() {
        let spec = parse_spec(&schema(), SPEC).unwrap();
        let Shape::Struct { childs } = &spec else {
            panic!("root must be a struct")
        };
        let Shape::Dict { key, val, query } = &childs["bars"] else {
            panic!("bars must be a dict")
        };
        assert_eq!(query.table, "bar");
        assert_eq!(query.fresh, vec!["c", "d"]);
        assert!(key.is_value());
        let Shape::Struct { childs: inner } = val.as_ref() else {
            panic!("_val_ must be a struct")
        };
        assert!(matches!(&inner["s"], Shape::Option { .. }));
    }

    #[test]
    fn test_type_inference() {
        let spec = parse_spec(&schema(), SPEC).unwrap();
        let Shape::Struct { childs } = &spec else { unreachable!() };
        let Shape::Dict { val, .. } = &childs["bars"] else { unreachable!() };
        let Shape::Struct { childs } = val.as_ref() else { unreachable!() };
        let Shape::Value { primtype, .. } = &childs["c"] else { unreachable!() };
        assert_eq!(primtype, "Int");
    }

    #[test]
    fn test_empty_fresh_list() {
        let text = "present: option for () (bar c d)\n    _val_: value c\n";
        // c and d are not in scope: they must be fresh.
        assert!(parse_spec(&schema(), text).is_err());
        let text2 = "xs: set for (c d) (bar c d)\n    _val_: value c\n";
        assert!(parse_spec(&schema(), text2).is_ok());
    }

    // ==================== Error cases ====================

    fn expect_error(spec_text: &str, needle: &str) {
        let err = parse_spec(&schema(), spec_text).unwrap_err();
        let message = format!("{}", err);
        assert!(message.contains(needle), "missing {:?} in {}", needle, message);
    }

    #[test]
    fn test_tab_indent_rejected() {
        expect_error("\tx: value c\n", "tabs not allowed");
    }

    #[test]
    fn test_wrong_indent_rejected() {
        expect_error(
            "xs: set for (c d) (bar c d)\n      _val_: value c\n",
            "indentation",
        );
    }

    #[test]
    fn test_dedented_child_means_missing_child() {
        // A child indented less than one full step falls out of the block.
        expect_error("xs: set for (c d) (bar c d)\n  _val_: value c\n", "need _val_ child");
    }

    #[test]
    fn test_unknown_member_type() {
        expect_error("x: vector c\n", "not a valid member type");
    }

    #[test]
    fn test_unknown_table() {
        expect_error("xs: set for (c) (nope c)\n    _val_: value c\n", "no such table");
    }

    #[test]
    fn test_arity_mismatch() {
        expect_error("xs: set for (c) (bar c)\n    _val_: value c\n", "expected 2 variables");
    }

    #[test]
    fn test_variable_not_in_scope() {
        expect_error("x: value nope\n", "variable not in scope");
    }

    #[test]
    fn test_query_on_struct_rejected() {
        expect_error(
            "x: struct for (c d) (bar c d)\n    a: value c\n",
            "not allowed for \"struct\"",
        );
    }

    #[test]
    fn test_missing_val_child() {
        expect_error("xs: set for (c d) (bar c d)\n    nope: value c\n", "need _val_ child");
    }

    #[test]
    fn test_extra_child_rejected() {
        expect_error(
            "xs: set for (c d) (bar c d)\n    _val_: value c\n    extra: value d\n",
            "unexpected child",
        );
    }

    #[test]
    fn test_list_needs_idx() {
        expect_error(
            "xs: list for (c d) (bar c d)\n    _val_: value c\n",
            "need _idx_ child",
        );
    }

    #[test]
    fn test_dict_key_must_be_value() {
        expect_error(
            "xs: dict for (c d) (bar c d)\n    _key_: struct\n        k: value c\n    _val_: value d\n",
            "_key_ must be a \"value\" member",
        );
    }

    #[test]
    fn test_struct_child_underscore_rejected() {
        expect_error(
            "x: struct\n    _bad: value c\n",
            "must not start with underscore",
        );
    }

    #[test]
    fn test_type_mismatch() {
        let schema = parse_schema(
            "DOMAIN Int Int\nDOMAIN ID ID\nTABLE a Int\nTABLE b ID\n",
            &DomainRegistry::builtin(),
        )
        .unwrap();
        // x is Int via table a, then used as ID via table b.
        let text = "xs: set for (x) (a x)\n    _val_: struct\n        y: option for () (b x)\n            _val_: value x\n";
        let err = parse_spec(&schema, text).unwrap_err();
        assert!(format!("{}", err).contains("type mismatch"));
    }

    #[test]
    fn test_sibling_bindings_do_not_leak() {
        // c is fresh inside the first sibling; the second sibling cannot
        // reference it.
        let text = "xs: set for (c d) (bar c d)\n    _val_: value c\nx: value c\n";
        expect_error(text, "variable not in scope");
    }

    #[test]
    fn test_error_position_reported() {
        let err = parse_spec(&schema(), "x: value nope\n").unwrap_err();
        let wsl_core::WslError::Parse(p) = err else { panic!() };
        let (line, _) = wsl_core::compute_line_and_column(&p.text, p.errorpos);
        assert_eq!(line, 1);
    }

    #[test]
    fn test_composite_without_query_rejected() {
        expect_error("xs: set\n    _val_: value c\n", "requires a query");
    }
}
