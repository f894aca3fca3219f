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

//! Reader for the indented text form of shape objects.
//!
//! Mirrors the writer exactly: struct members may appear in any order;
//! duplicate, missing and unknown members fail. Blocks terminate at a
//! dedent; blank lines between entries are skipped.

use wsl_core::{ParseError, Schema, Value, WslError, WslResult};
use wsl_shape::{Object, Shape};
use std::collections::{BTreeMap, BTreeSet};

const CONTEXT: &str = "text form";
const INDENT: usize = 4;

struct TextReader<'a> {
    schema: &'a Schema,
    text: &'a str,
}

impl<'a> TextReader<'a> {
    fn err(&self, pos: usize, message: impl Into<String>) -> WslError {
        WslError::Parse(ParseError::at(CONTEXT, self.text, pos, message))
    }

    fn read_scalar(&self, spec: &Shape, pos: usize) -> WslResult<(usize, Value)> {
        let Shape::Value { primtype, .. } = spec else {
            unreachable!("read_scalar is only called for value shapes");
        };
        let domain = self.schema.domains.get(primtype).ok_or_else(|| {
            self.err(pos, format!("no reader for type \"{}\"", primtype))
        })?;
        let (next, token) = domain.funcs.wsllex(self.text, pos)?;
        let value = domain.funcs.decode(&token).map_err(|e| {
            WslError::Parse(ParseError::new(e.context, self.text, pos, pos + e.errorpos, e.message))
        })?;
        Ok((next, value))
    }

    fn expect_newline(&self, pos: usize) -> WslResult<usize> {
        if pos == self.text.len() {
            return Ok(pos);
        }
        if self.text.as_bytes()[pos] == b'\n' {
            return Ok(pos + 1);
        }
        Err(self.err(pos, "end of line expected"))
    }

    fn expect_space(&self, pos: usize) -> WslResult<usize> {
        if self.text.as_bytes().get(pos) == Some(&b' ') {
            return Ok(pos + 1);
        }
        Err(self.err(pos, "space character expected"))
    }

    fn read_keyword(&self, pos: usize) -> WslResult<(usize, &'a str)> {
        let bytes = self.text.as_bytes();
        let mut i = pos;
        if i < bytes.len() && (bytes[i].is_ascii_alphabetic() || bytes[i] == b'_') {
            i += 1;
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                i += 1;
            }
        }
        if i == pos {
            return Err(self.err(pos, "keyword expected"));
        }
        Ok((i, &self.text[pos..i]))
    }

    /// Skip newlines; return the position after the indent if the next line
    /// belongs to a block at this indent, else `None`.
    fn block_entry(&self, mut pos: usize, indent: usize) -> (usize, Option<usize>) {
        let bytes = self.text.as_bytes();
        while pos < bytes.len() && bytes[pos] == b'\n' {
            pos += 1;
        }
        if pos == bytes.len() {
            return (pos, None);
        }
        let prefix_ok = self.text[pos..].len() >= indent
            && self.text.as_bytes()[pos..pos + indent].iter().all(|&b| b == b' ');
        if prefix_ok {
            (pos, Some(pos + indent))
        } else {
            (pos, None)
        }
    }

    /// Read the glue and subtree of a member whose keyword was consumed:
    /// scalars follow after a space, options hang off the line, composites
    /// start a deeper block on the next line.
    fn read_glued(&self, spec: &Shape, indent: usize, pos: usize) -> WslResult<(usize, Object)> {
        match spec {
            Shape::Value { .. } => {
                let pos = self.expect_space(pos)?;
                let (pos, value) = self.read_scalar(spec, pos)?;
                let pos = self.expect_newline(pos)?;
                Ok((pos, Object::Value(value)))
            }
            Shape::Option { .. } => {
                let pos = self.expect_space(pos)?;
                self.read_option(spec, indent, pos)
            }
            _ => {
                let pos = self.expect_newline(pos)?;
                self.read_block(spec, indent, pos)
            }
        }
    }

    fn read_option(&self, spec: &Shape, indent: usize, pos: usize) -> WslResult<(usize, Object)> {
        let Shape::Option { val, .. } = spec else {
            unreachable!("read_option is only called for option shapes");
        };
        match self.text.as_bytes().get(pos) {
            Some(b'?') => {
                let pos = self.expect_newline(pos + 1)?;
                Ok((pos, Object::Null))
            }
            Some(b'!') => self.read_glued(val, indent, pos + 1),
            _ => Err(self.err(pos, "expected option (\"?\", or \"!\" followed by value)")),
        }
    }

    fn read_block(&self, spec: &Shape, indent: usize, pos: usize) -> WslResult<(usize, Object)> {
        match spec {
            Shape::Struct { childs } => self.read_struct(childs, indent, pos),
            Shape::Set { val, .. } => {
                let mut out = BTreeSet::new();
                let mut pos = pos;
                loop {
                    let (skipped, entry) = self.block_entry(pos, indent);
                    let Some(entry) = entry else {
                        pos = skipped;
                        break;
                    };
                    let (next, keyword) = self.read_keyword(entry)?;
                    if keyword != "val" {
                        return Err(self.err(entry, format!("found unexpected field \"{}\"", keyword)));
                    }
                    let (next, value) = self.read_glued(val, indent + INDENT, next)?;
                    out.insert(value);
                    pos = next;
                }
                Ok((pos, Object::Set(out)))
            }
            Shape::List { val, .. } => {
                let mut out = Vec::new();
                let mut pos = pos;
                loop {
                    let (skipped, entry) = self.block_entry(pos, indent);
                    let Some(entry) = entry else {
                        pos = skipped;
                        break;
                    };
                    let (next, keyword) = self.read_keyword(entry)?;
                    if keyword != "val" {
                        return Err(self.err(entry, format!("found unexpected field \"{}\"", keyword)));
                    }
                    let (next, value) = self.read_glued(val, indent + INDENT, next)?;
                    out.push(value);
                    pos = next;
                }
                Ok((pos, Object::List(out)))
            }
            Shape::Dict { key, val, .. } => {
                let mut out = BTreeMap::new();
                let mut pos = pos;
                loop {
                    let (skipped, entry) = self.block_entry(pos, indent);
                    let Some(entry) = entry else {
                        pos = skipped;
                        break;
                    };
                    let (next, keyword) = self.read_keyword(entry)?;
                    if keyword != "val" {
                        return Err(self.err(entry, format!("found unexpected field \"{}\"", keyword)));
                    }
                    let next = self.expect_space(next)?;
                    let (next, key_value) = self.read_scalar(key, next)?;
                    let (next, value) = self.read_glued(val, indent + INDENT, next)?;
                    if out.contains_key(&key_value) {
                        return Err(self.err(
                            entry,
                            format!("key \"{}\" used multiple times in this block", key_value),
                        ));
                    }
                    out.insert(key_value, value);
                    pos = next;
                }
                Ok((pos, Object::Dict(out)))
            }
            Shape::Value { .. } | Shape::Option { .. } => {
                unreachable!("scalar shapes are read through read_glued()")
            }
        }
    }

    fn read_struct(
        &self,
        childs: &BTreeMap<String, Shape>,
        indent: usize,
        pos: usize,
    ) -> WslResult<(usize, Object)> {
        let mut out: BTreeMap<String, Object> = BTreeMap::new();
        let mut pos = pos;
        loop {
            let (skipped, entry) = self.block_entry(pos, indent);
            let Some(entry) = entry else {
                pos = skipped;
                break;
            };
            let (next, keyword) = self.read_keyword(entry)?;
            let child = childs.get(keyword).ok_or_else(|| {
                self.err(entry, format!("found unexpected field \"{}\"", keyword))
            })?;
            if out.contains_key(keyword) {
                return Err(self.err(entry, format!("duplicate member \"{}\"", keyword)));
            }
            let (next, value) = self.read_glued(child, indent + INDENT, next)?;
            out.insert(keyword.to_string(), value);
            pos = next;
        }
        for name in childs.keys() {
            if !out.contains_key(name) {
                return Err(self.err(pos, format!("missing member \"{}\"", name)));
            }
        }
        Ok((pos, Object::Struct(out)))
    }
}

/// Parse the indented text form of a shape object.
pub fn text2objects(schema: &Schema, spec: &Shape, text: &str) -> WslResult<Object> {
    let reader = TextReader { schema, text };
    let (pos, object) = match spec {
        Shape::Value { .. } => {
            let (pos, value) = reader.read_scalar(spec, 0)?;
            let pos = reader.expect_newline(pos)?;
            (pos, Object::Value(value))
        }
        Shape::Option { .. } => reader.read_option(spec, 0, 0)?,
        _ => reader.read_block(spec, 0, 0)?,
    };
    let mut pos = pos;
    while pos < text.len() && text.as_bytes()[pos] == b'\n' {
        pos += 1;
    }
    if pos != text.len() {
        return Err(reader.err(pos, "unconsumed text"));
    }
    Ok(object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::objects2text;
    use wsl_core::{parse_database_with_schema, parse_schema, DomainRegistry};
    use wsl_shape::{parse_spec, rows2objects};

    fn schema() -> Schema {
        parse_schema(
            "DOMAIN Int Int\nTABLE bar Int Int\nTABLE foo Int Int Int\n",
            &DomainRegistry::builtin(),
        )
        .unwrap()
    }

    #[test]
    fn test_read_simple_set() {
        let schema = schema();
        let spec = parse_spec(&schema, "xs: set for (c d) (bar c d)\n    _val_: value c\n").unwrap();
        let object = text2objects(&schema, &spec, "xs\n    val 1\n    val 2\n").unwrap();
        let xs = object.as_struct().unwrap()["xs"].as_set().unwrap();
        assert_eq!(xs.len(), 2);
    }

    #[test]
    fn test_members_in_any_order() {
        let schema = schema();
        let spec = parse_spec(
            &schema,
            "xs: set for (c d) (bar c d)\n    _val_: struct\n        c: value c\n        d: value d\n",
        )
        .unwrap();
        let a = text2objects(&schema, &spec, "xs\n    val\n        c 1\n        d 2\n").unwrap();
        let b = text2objects(&schema, &spec, "xs\n    val\n        d 2\n        c 1\n").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_unknown_member_fails() {
        let schema = schema();
        let spec = parse_spec(&schema, "xs: set for (c d) (bar c d)\n    _val_: value c\n").unwrap();
        let err = text2objects(&schema, &spec, "ys\n    val 1\n").unwrap_err();
        assert!(format!("{}", err).contains("unexpected field"));
    }

    #[test]
    fn test_duplicate_member_fails() {
        let schema = schema();
        let spec = parse_spec(
            &schema,
            "xs: set for (c d) (bar c d)\n    _val_: struct\n        c: value c\n        d: value d\n",
        )
        .unwrap();
        let err = text2objects(
            &schema,
            &spec,
            "xs\n    val\n        c 1\n        c 2\n        d 3\n",
        )
        .unwrap_err();
        assert!(format!("{}", err).contains("duplicate member"));
    }

    #[test]
    fn test_missing_member_fails() {
        let schema = schema();
        let spec = parse_spec(
            &schema,
            "xs: set for (c d) (bar c d)\n    _val_: struct\n        c: value c\n        d: value d\n",
        )
        .unwrap();
        let err = text2objects(&schema, &spec, "xs\n    val\n        c 1\n").unwrap_err();
        assert!(format!("{}", err).contains("missing member"));
    }

    #[test]
    fn test_option_sentinels() {
        let schema = schema();
        let spec = parse_spec(&schema, "x: option for (c d) (bar c d)\n    _val_: value c\n").unwrap();
        assert!(text2objects(&schema, &spec, "x ?\n")
            .unwrap()
            .as_struct()
            .unwrap()["x"]
            .is_null());
        let object = text2objects(&schema, &spec, "x ! 5\n").unwrap();
        assert_eq!(object.as_struct().unwrap()["x"], Object::int(5));
        assert!(text2objects(&schema, &spec, "x 5\n").is_err());
    }

    #[test]
    fn test_duplicate_dict_key_fails() {
        let schema = schema();
        let spec = parse_spec(
            &schema,
            "xs: dict for (c d) (bar c d)\n    _key_: value c\n    _val_: value d\n",
        )
        .unwrap();
        let err = text2objects(&schema, &spec, "xs\n    val 1 2\n    val 1 3\n").unwrap_err();
        assert!(format!("{}", err).contains("used multiple times"));
    }

    #[test]
    fn test_unconsumed_text_fails() {
        let schema = schema();
        let spec = parse_spec(&schema, "xs: set for (c d) (bar c d)\n    _val_: value c\n").unwrap();
        let err = text2objects(&schema, &spec, "xs\n    val 1\nstray\n").unwrap_err();
        assert!(format!("{}", err).contains("unexpected field"));
    }

    #[test]
    fn test_error_position() {
        let schema = schema();
        let spec = parse_spec(&schema, "xs: set for (c d) (bar c d)\n    _val_: value c\n").unwrap();
        let err = text2objects(&schema, &spec, "xs\n    val x\n").unwrap_err();
        let message = format!("{}", err);
        assert!(message.contains("2:"), "{}", message);
    }

    #[test]
    fn test_round_trip() {
        let schema = schema();
        let spec = parse_spec(
            &schema,
            "bars: dict for (c d) (bar c d)\n    _key_: value c\n    _val_: struct\n        c: value c\n        d: value d\n        s: option for (a b) (foo a b c)\n            _val_: struct\n                a: value a\n                b: value b\n",
        )
        .unwrap();
        let db = parse_database_with_schema(
            "bar 3 666\nbar 6 1024\nbar 42 0\nfoo 1 2 3\nfoo 4 5 6\n",
            &schema,
        )
        .unwrap();
        let objects = rows2objects(&spec, &db).unwrap();
        let text = objects2text(&schema, &spec, &objects).unwrap();
        let back = text2objects(&schema, &spec, &text).unwrap();
        assert_eq!(back, objects);
        // Emission of the re-parsed object is stable.
        assert_eq!(objects2text(&schema, &spec, &back).unwrap(), text);
    }
}
