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

//! Writer for the indented text form of shape objects.
//!
//! Indentation is four spaces per level. Scalars continue on the same line
//! after a space; composite subtrees start on the next line one level
//! deeper. Options render as `?` (null) or `!` followed by the value;
//! set and list elements as `val …`; dict entries as `val <key> …`.
//! At the top level a blank line separates struct members.

use wsl_core::{FormatError, Schema, Value, WslError, WslResult};
use wsl_shape::{Object, Shape};

const INDENT: usize = 4;

struct TextWriter<'a> {
    schema: &'a Schema,
    out: String,
}

impl<'a> TextWriter<'a> {
    fn token(&self, primtype: &str, value: &Value) -> WslResult<String> {
        let domain = self.schema.domains.get(primtype).ok_or_else(|| {
            WslError::Format(FormatError::new(
                "text form",
                primtype,
                "no formatter for this type",
            ))
        })?;
        Ok(domain.funcs.wslunlex(&domain.funcs.encode(value)?)?)
    }

    fn scalar(&self, spec: &Shape, obj: &Object) -> WslResult<String> {
        let Shape::Value { primtype, .. } = spec else {
            unreachable!("scalar() is only called for value shapes");
        };
        let Object::Value(value) = obj else {
            return Err(WslError::Format(FormatError::new(
                "text form",
                format!("{:?}", obj),
                "expected scalar value",
            )));
        };
        self.token(primtype, value)
    }

    fn indent(&mut self, levels: usize) {
        for _ in 0..levels {
            self.out.push(' ');
        }
    }

    /// Write the whitespace glue and the subtree for a member whose keyword
    /// is already on the line: scalars continue after a space, options hang
    /// off the line, composites start a deeper block on the next line.
    fn glue(&mut self, spec: &Shape, obj: &Object, indent: usize) -> WslResult<()> {
        match spec {
            Shape::Value { .. } => {
                let token = self.scalar(spec, obj)?;
                self.out.push(' ');
                self.out.push_str(&token);
                self.out.push('\n');
                Ok(())
            }
            Shape::Option { .. } => {
                self.out.push(' ');
                self.write_option(spec, obj, indent)
            }
            _ => {
                self.out.push('\n');
                self.write_block(spec, obj, indent)
            }
        }
    }

    fn write_option(&mut self, spec: &Shape, obj: &Object, indent: usize) -> WslResult<()> {
        let Shape::Option { val, .. } = spec else {
            unreachable!("write_option is only called for option shapes");
        };
        if obj.is_null() {
            self.out.push_str("?\n");
            return Ok(());
        }
        self.out.push('!');
        self.glue(val, obj, indent)
    }

    /// Write a composite node's block lines at the given indent.
    fn write_block(&mut self, spec: &Shape, obj: &Object, indent: usize) -> WslResult<()> {
        match spec {
            Shape::Struct { childs } => self.write_struct(childs, obj, indent, false),
            Shape::Set { val, .. } => {
                let Object::Set(items) = obj else {
                    return Err(self.type_error("set", obj));
                };
                for item in items {
                    self.indent(indent);
                    self.out.push_str("val");
                    self.glue(val, item, indent + INDENT)?;
                }
                Ok(())
            }
            Shape::List { val, .. } => {
                let Object::List(items) = obj else {
                    return Err(self.type_error("list", obj));
                };
                for item in items {
                    self.indent(indent);
                    self.out.push_str("val");
                    self.glue(val, item, indent + INDENT)?;
                }
                Ok(())
            }
            Shape::Dict { key, val, .. } => {
                let Object::Dict(map) = obj else {
                    return Err(self.type_error("dict", obj));
                };
                let Shape::Value { primtype, .. } = key.as_ref() else {
                    return Err(WslError::Format(FormatError::new(
                        "text form",
                        "_key_",
                        "dict keys must be value members",
                    )));
                };
                for (key_value, item) in map {
                    self.indent(indent);
                    self.out.push_str("val ");
                    let token = self.token(primtype, key_value)?;
                    self.out.push_str(&token);
                    self.glue(val, item, indent + INDENT)?;
                }
                Ok(())
            }
            Shape::Value { .. } | Shape::Option { .. } => {
                unreachable!("scalar shapes are written through glue()")
            }
        }
    }

    fn write_struct(
        &mut self,
        childs: &std::collections::BTreeMap<String, Shape>,
        obj: &Object,
        indent: usize,
        top: bool,
    ) -> WslResult<()> {
        let Object::Struct(map) = obj else {
            return Err(self.type_error("struct", obj));
        };
        for name in map.keys() {
            if !childs.contains_key(name) {
                return Err(WslError::Format(FormatError::new(
                    "text form",
                    name,
                    "unexpected member",
                )));
            }
        }
        for (i, (name, child)) in childs.iter().enumerate() {
            let sub = map.get(name).ok_or_else(|| {
                WslError::Format(FormatError::new("text form", name, "expected member"))
            })?;
            if top && i > 0 {
                self.out.push('\n');
            }
            self.indent(indent);
            self.out.push_str(name);
            self.glue(child, sub, indent + INDENT)?;
        }
        Ok(())
    }

    fn type_error(&self, kind: &str, obj: &Object) -> WslError {
        WslError::Format(FormatError::new(
            "text form",
            format!("{:?}", obj),
            format!("expected {} object", kind),
        ))
    }
}

/// Render a shape object to its indented text form.
pub fn objects2text(schema: &Schema, spec: &Shape, objects: &Object) -> WslResult<String> {
    let mut writer = TextWriter {
        schema,
        out: String::new(),
    };
    match spec {
        Shape::Struct { childs } => writer.write_struct(childs, objects, 0, true)?,
        Shape::Value { .. } => {
            let token = writer.scalar(spec, objects)?;
            writer.out.push_str(&token);
            writer.out.push('\n');
        }
        Shape::Option { .. } => writer.write_option(spec, objects, 0)?,
        _ => writer.write_block(spec, objects, 0)?,
    }
    Ok(writer.out)
}

#[cfg(test)]
mod tests {
    use super::*;
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
    fn test_scalar_members_inline() {
        let schema = schema();
        let spec = parse_spec(
            &schema,
            "xs: set for (c d) (bar c d)\n    _val_: struct\n        c: value c\n        d: value d\n",
        )
        .unwrap();
        let db = parse_database_with_schema("bar 1 2\n", &schema).unwrap();
        let objects = rows2objects(&spec, &db).unwrap();
        let text = objects2text(&schema, &spec, &objects).unwrap();
        assert_eq!(text, "xs\n    val\n        c 1\n        d 2\n");
    }

    #[test]
    fn test_top_level_blank_line_between_members() {
        let schema = schema();
        let spec = parse_spec(
            &schema,
            "xs: set for (c d) (bar c d)\n    _val_: value c\nys: set for (a b z) (foo a b z)\n    _val_: value a\n",
        )
        .unwrap();
        let db = parse_database_with_schema("bar 1 2\nfoo 3 4 5\n", &schema).unwrap();
        let objects = rows2objects(&spec, &db).unwrap();
        let text = objects2text(&schema, &spec, &objects).unwrap();
        assert_eq!(text, "xs\n    val 1\n\nys\n    val 3\n");
    }

    #[test]
    fn test_option_rendering() {
        let schema = schema();
        let spec = parse_spec(
            &schema,
            "x: option for (c d) (bar c d)\n    _val_: value c\n",
        )
        .unwrap();
        let empty = wsl_core::Database::new();
        let objects = rows2objects(&spec, &empty).unwrap();
        assert_eq!(objects2text(&schema, &spec, &objects).unwrap(), "x ?\n");

        let db = parse_database_with_schema("bar 7 8\n", &schema).unwrap();
        let objects = rows2objects(&spec, &db).unwrap();
        assert_eq!(objects2text(&schema, &spec, &objects).unwrap(), "x ! 7\n");
    }

    #[test]
    fn test_missing_member_rejected() {
        let schema = schema();
        let spec = parse_spec(
            &schema,
            "xs: set for (c d) (bar c d)\n    _val_: value c\nys: set for (a b z) (foo a b z)\n    _val_: value a\n",
        )
        .unwrap();
        let objects = Object::structure([("xs", Object::Set(Default::default()))]);
        assert!(objects2text(&schema, &spec, &objects).is_err());
    }
}
