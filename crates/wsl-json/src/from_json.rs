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

//! JSON to shape objects conversion.
//!
//! Mirrors the emitter: struct members may appear in any order; missing and
//! unknown members fail. Options accept JSON null. Dict keys are decoded
//! through the key domain from their string form.

use serde_json::Value as JsonValue;
use wsl_core::{JsonType, ParseError, Schema, Value, WslError, WslResult};
use wsl_shape::{Object, Shape};
use std::collections::{BTreeMap, BTreeSet};

fn parse_err(message: impl Into<String>) -> WslError {
    WslError::Parse(ParseError::at("JSON form", "", 0, message))
}

fn json_kind(json: &JsonValue) -> &'static str {
    match json {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

fn decode_token(schema: &Schema, primtype: &str, token: &str) -> WslResult<Value> {
    let domain = schema
        .domains
        .get(primtype)
        .ok_or_else(|| parse_err(format!("no reader for type \"{}\"", primtype)))?;
    Ok(domain.funcs.decode(token)?)
}

fn scalar_from_json(schema: &Schema, primtype: &str, json: &JsonValue) -> WslResult<Value> {
    let domain = schema
        .domains
        .get(primtype)
        .ok_or_else(|| parse_err(format!("no reader for type \"{}\"", primtype)))?;
    let token = match (domain.funcs.jsontype(), json) {
        (JsonType::String, JsonValue::String(s)) => s.clone(),
        (JsonType::Int, JsonValue::Number(n)) if n.is_i64() => n.to_string(),
        (JsonType::Float, JsonValue::Number(n)) => n.to_string(),
        (expected, other) => {
            return Err(parse_err(format!(
                "cannot parse JSON {} as {:?} token",
                json_kind(other),
                expected
            )))
        }
    };
    decode_token(schema, primtype, &token)
}

fn convert(schema: &Schema, spec: &Shape, json: &JsonValue) -> WslResult<Object> {
    match spec {
        Shape::Value { primtype, .. } => {
            Ok(Object::Value(scalar_from_json(schema, primtype, json)?))
        }
        Shape::Struct { childs } => {
            let JsonValue::Object(map) = json else {
                return Err(parse_err(format!(
                    "cannot parse JSON {} as struct: expected JSON object",
                    json_kind(json)
                )));
            };
            for name in map.keys() {
                if !childs.contains_key(name) {
                    return Err(parse_err(format!("unexpected member \"{}\"", name)));
                }
            }
            let mut out = BTreeMap::new();
            for (name, child) in childs {
                let sub = map
                    .get(name)
                    .ok_or_else(|| parse_err(format!("missing member \"{}\"", name)))?;
                out.insert(name.clone(), convert(schema, child, sub)?);
            }
            Ok(Object::Struct(out))
        }
        Shape::Option { val, .. } => {
            if json.is_null() {
                Ok(Object::Null)
            } else {
                convert(schema, val, json)
            }
        }
        Shape::Set { val, .. } => {
            let JsonValue::Array(items) = json else {
                return Err(parse_err(format!(
                    "cannot parse JSON {} as set: expected JSON array",
                    json_kind(json)
                )));
            };
            let mut out = BTreeSet::new();
            for item in items {
                out.insert(convert(schema, val, item)?);
            }
            Ok(Object::Set(out))
        }
        Shape::List { val, .. } => {
            let JsonValue::Array(items) = json else {
                return Err(parse_err(format!(
                    "cannot parse JSON {} as list: expected JSON array",
                    json_kind(json)
                )));
            };
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(convert(schema, val, item)?);
            }
            Ok(Object::List(out))
        }
        Shape::Dict { key, val, .. } => {
            let JsonValue::Object(map) = json else {
                return Err(parse_err(format!(
                    "cannot parse JSON {} as dict: expected JSON object",
                    json_kind(json)
                )));
            };
            let Shape::Value { primtype, .. } = key.as_ref() else {
                return Err(parse_err("JSON does not support composite dictionary keys"));
            };
            let mut out = BTreeMap::new();
            for (key_string, item) in map {
                let key_value = decode_token(schema, primtype, key_string)
                    .map_err(|e| parse_err(format!("cannot parse dict key \"{}\": {}", key_string, e)))?;
                let value = convert(schema, val, item)?;
                if out.insert(key_value, value).is_some() {
                    return Err(parse_err(format!(
                        "key \"{}\" used multiple times",
                        key_string
                    )));
                }
            }
            Ok(Object::Dict(out))
        }
    }
}

/// Convert a JSON value into a shape object.
pub fn json2objects(schema: &Schema, spec: &Shape, json: &JsonValue) -> WslResult<Object> {
    convert(schema, spec, json)
}

/// Parse JSON text into a shape object.
pub fn from_json_string(schema: &Schema, spec: &Shape, text: &str) -> WslResult<Object> {
    let json: JsonValue = serde_json::from_str(text)
        .map_err(|e| parse_err(format!("invalid JSON: {}", e)))?;
    json2objects(schema, spec, &json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wsl_core::{parse_schema, DomainRegistry};
    use wsl_shape::parse_spec;

    fn schema() -> Schema {
        parse_schema(
            "DOMAIN Int Int\nDOMAIN ID ID\nTABLE bar Int Int\nTABLE tag ID Int\n",
            &DomainRegistry::builtin(),
        )
        .unwrap()
    }

    #[test]
    fn test_read_struct_members_any_order() {
        let schema = schema();
        let spec = parse_spec(
            &schema,
            "xs: set for (c d) (bar c d)\n    _val_: struct\n        c: value c\n        d: value d\n",
        )
        .unwrap();
        let object = json2objects(&schema, &spec, &json!({"xs": [{"d": 2, "c": 1}]})).unwrap();
        let xs = object.as_struct().unwrap()["xs"].as_set().unwrap();
        assert_eq!(xs.len(), 1);
    }

    #[test]
    fn test_missing_member_fails() {
        let schema = schema();
        let spec = parse_spec(
            &schema,
            "xs: set for (c d) (bar c d)\n    _val_: struct\n        c: value c\n        d: value d\n",
        )
        .unwrap();
        let err = json2objects(&schema, &spec, &json!({"xs": [{"c": 1}]})).unwrap_err();
        assert!(format!("{}", err).contains("missing member"));
    }

    #[test]
    fn test_unknown_member_fails() {
        let schema = schema();
        let spec = parse_spec(&schema, "xs: set for (c d) (bar c d)\n    _val_: value c\n").unwrap();
        let err = json2objects(&schema, &spec, &json!({"ys": []})).unwrap_err();
        assert!(format!("{}", err).contains("unexpected member"));
    }

    #[test]
    fn test_dict_keys_decoded() {
        let schema = schema();
        let spec = parse_spec(
            &schema,
            "xs: dict for (c d) (bar c d)\n    _key_: value c\n    _val_: value d\n",
        )
        .unwrap();
        let object = json2objects(&schema, &spec, &json!({"xs": {"3": 666, "42": 0}})).unwrap();
        let xs = object.as_struct().unwrap()["xs"].as_dict().unwrap();
        assert_eq!(xs[&Value::Int(3)], Object::int(666));
        assert_eq!(xs[&Value::Int(42)], Object::int(0));
    }

    #[test]
    fn test_bad_dict_key_fails() {
        let schema = schema();
        let spec = parse_spec(
            &schema,
            "xs: dict for (c d) (bar c d)\n    _key_: value c\n    _val_: value d\n",
        )
        .unwrap();
        let err = json2objects(&schema, &spec, &json!({"xs": {"not-an-int": 0}})).unwrap_err();
        assert!(format!("{}", err).contains("dict key"));
    }

    #[test]
    fn test_option_accepts_null() {
        let schema = schema();
        let spec = parse_spec(&schema, "x: option for (c d) (bar c d)\n    _val_: value c\n").unwrap();
        assert!(json2objects(&schema, &spec, &json!({"x": null})).unwrap()
            .as_struct()
            .unwrap()["x"]
            .is_null());
    }

    #[test]
    fn test_type_mismatch_fails() {
        let schema = schema();
        let spec = parse_spec(&schema, "xs: set for (c d) (bar c d)\n    _val_: value c\n").unwrap();
        let err = json2objects(&schema, &spec, &json!({"xs": ["one"]})).unwrap_err();
        assert!(format!("{}", err).contains("cannot parse JSON string"));
    }

    #[test]
    fn test_from_json_string() {
        let schema = schema();
        let spec = parse_spec(&schema, "xs: set for (c d) (bar c d)\n    _val_: value c\n").unwrap();
        let object = from_json_string(&schema, &spec, "{\"xs\": [1, 2]}").unwrap();
        assert_eq!(object.as_struct().unwrap()["xs"].as_set().unwrap().len(), 2);
        assert!(from_json_string(&schema, &spec, "{nope").is_err());
    }
}
