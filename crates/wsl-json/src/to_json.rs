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

//! Shape objects to JSON conversion.
//!
//! Scalars map to the JSON primitive of their domain: structs to objects,
//! options to value-or-null, sets and lists to arrays (sets sorted), dicts
//! to objects whose keys are the stringified key tokens. Dict keys must be
//! `value` members since JSON object keys are strings.

use serde_json::{Map, Number, Value as JsonValue};
use wsl_core::{FormatError, JsonType, Schema, Value, WslError, WslResult};
use wsl_shape::{Object, Shape};

fn format_err(value: impl Into<String>, message: impl Into<String>) -> WslError {
    WslError::Format(FormatError::new("JSON form", value, message))
}

fn scalar_to_json(schema: &Schema, primtype: &str, value: &Value) -> WslResult<JsonValue> {
    let domain = schema
        .domains
        .get(primtype)
        .ok_or_else(|| format_err(primtype, "no formatter for this type"))?;
    let token = domain.funcs.encode(value)?;
    match domain.funcs.jsontype() {
        JsonType::String => Ok(JsonValue::String(token)),
        JsonType::Int => {
            let n: i64 = token
                .parse()
                .map_err(|_| format_err(&*token, "token is not a JSON integer"))?;
            Ok(JsonValue::Number(Number::from(n)))
        }
        JsonType::Float => {
            let x: f64 = token
                .parse()
                .map_err(|_| format_err(&*token, "token is not a JSON number"))?;
            Number::from_f64(x)
                .map(JsonValue::Number)
                .ok_or_else(|| format_err(token, "non-finite numbers have no JSON form"))
        }
    }
}

/// The stringified form of a dict key: always a JSON string, whatever the
/// key domain's JSON type.
fn key_to_json_string(schema: &Schema, key_spec: &Shape, key: &Value) -> WslResult<String> {
    let Shape::Value { primtype, .. } = key_spec else {
        return Err(format_err("_key_", "JSON does not support composite dictionary keys"));
    };
    let domain = schema
        .domains
        .get(primtype)
        .ok_or_else(|| format_err(primtype.as_str(), "no formatter for this type"))?;
    Ok(domain.funcs.encode(key)?)
}

fn convert(schema: &Schema, spec: &Shape, obj: &Object) -> WslResult<JsonValue> {
    match spec {
        Shape::Value { primtype, .. } => {
            let Object::Value(value) = obj else {
                return Err(format_err(format!("{:?}", obj), "expected scalar value"));
            };
            scalar_to_json(schema, primtype, value)
        }
        Shape::Struct { childs } => {
            let Object::Struct(map) = obj else {
                return Err(format_err(format!("{:?}", obj), "expected struct object"));
            };
            let mut out = Map::with_capacity(childs.len());
            for name in map.keys() {
                if !childs.contains_key(name) {
                    return Err(format_err(name, "unexpected member"));
                }
            }
            for (name, child) in childs {
                let sub = map
                    .get(name)
                    .ok_or_else(|| format_err(name, "expected member"))?;
                out.insert(name.clone(), convert(schema, child, sub)?);
            }
            Ok(JsonValue::Object(out))
        }
        Shape::Option { val, .. } => {
            if obj.is_null() {
                Ok(JsonValue::Null)
            } else {
                convert(schema, val, obj)
            }
        }
        Shape::Set { val, .. } => {
            let Object::Set(items) = obj else {
                return Err(format_err(format!("{:?}", obj), "expected set object"));
            };
            items.iter().map(|item| convert(schema, val, item)).collect()
        }
        Shape::List { val, .. } => {
            let Object::List(items) = obj else {
                return Err(format_err(format!("{:?}", obj), "expected list object"));
            };
            items.iter().map(|item| convert(schema, val, item)).collect()
        }
        Shape::Dict { key, val, .. } => {
            let Object::Dict(map) = obj else {
                return Err(format_err(format!("{:?}", obj), "expected dict object"));
            };
            let mut out = Map::with_capacity(map.len());
            for (key_value, item) in map {
                let key_string = key_to_json_string(schema, key, key_value)?;
                if out.contains_key(&key_string) {
                    return Err(format_err(key_string, "duplicate dict key"));
                }
                out.insert(key_string, convert(schema, val, item)?);
            }
            Ok(JsonValue::Object(out))
        }
    }
}

/// Convert a shape object to a JSON value.
pub fn objects2json(schema: &Schema, spec: &Shape, objects: &Object) -> WslResult<JsonValue> {
    convert(schema, spec, objects)
}

/// Convert a shape object to canonical JSON text (sorted keys, pretty).
pub fn to_json_string(schema: &Schema, spec: &Shape, objects: &Object) -> WslResult<String> {
    let value = objects2json(schema, spec, objects)?;
    serde_json::to_string_pretty(&value)
        .map_err(|e| format_err("document", format!("JSON serialization error: {}", e)))
}
