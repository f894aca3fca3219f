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

//! Built-in WSL domains and the domain registry.
//!
//! A domain parser consumes the remainder of a `DOMAIN` declaration line
//! (e.g. `String escape`) and produces the codec bundle for that domain.
//! Users can add their own domains by registering a parser next to the
//! built-in ones.

use crate::error::{FormatError, LexError, ParseError, WslError, WslResult};
use crate::lex;
use crate::value::{EnumBase, EnumValue, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// JSON primitive a domain's tokens map to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonType {
    /// Tokens render as JSON strings.
    String,
    /// Tokens render as JSON integers.
    Int,
    /// Tokens render as JSON numbers.
    Float,
}

/// The codec bundle of a domain.
///
/// `wsllex`/`wslunlex` move between the WSL text format and tokens;
/// `decode`/`encode` move between tokens and values. `decode(encode(v))` is
/// the identity on domain values, and `encode(decode(t))` is the identity on
/// tokens that decode successfully.
pub trait DomainType: fmt::Debug + Send + Sync {
    /// Lex one token of this domain out of the text.
    fn wsllex(&self, text: &str, at: usize) -> Result<(usize, String), LexError>;

    /// Render a token back to WSL text.
    fn wslunlex(&self, token: &str) -> Result<String, FormatError>;

    /// Decode a token into a value.
    fn decode(&self, token: &str) -> Result<Value, ParseError>;

    /// Encode a value into a token.
    fn encode(&self, value: &Value) -> Result<String, FormatError>;

    /// The JSON primitive this domain's tokens map to.
    fn jsontype(&self) -> JsonType {
        JsonType::String
    }
}

fn decode_err(context: &str, token: &str, message: impl Into<String>) -> ParseError {
    ParseError::new(context, token, 0, token.len(), message)
}

fn type_mismatch(context: &str, value: &Value) -> FormatError {
    FormatError::new(context, value.to_string(), "value does not belong to this domain")
}

// ==================== ID ====================

#[derive(Debug)]
struct IdDomain;

impl DomainType for IdDomain {
    fn wsllex(&self, text: &str, at: usize) -> Result<(usize, String), LexError> {
        lex::lex_identifier(text, at)
    }

    fn wslunlex(&self, token: &str) -> Result<String, FormatError> {
        lex::unlex_identifier(token)
    }

    fn decode(&self, token: &str) -> Result<Value, ParseError> {
        Ok(Value::Id(token.to_string()))
    }

    fn encode(&self, value: &Value) -> Result<String, FormatError> {
        match value {
            Value::Id(s) => Ok(s.clone()),
            other => Err(type_mismatch("ID value", other)),
        }
    }
}

// ==================== String ====================

#[derive(Debug)]
struct StringDomain {
    escape: bool,
}

impl DomainType for StringDomain {
    fn wsllex(&self, text: &str, at: usize) -> Result<(usize, String), LexError> {
        if self.escape {
            lex::lex_string_with_escapes(text, at)
        } else {
            lex::lex_string_without_escapes(text, at)
        }
    }

    fn wslunlex(&self, token: &str) -> Result<String, FormatError> {
        if self.escape {
            lex::unlex_string_with_escapes(token)
        } else {
            lex::unlex_string_without_escapes(token)
        }
    }

    fn decode(&self, token: &str) -> Result<Value, ParseError> {
        Ok(Value::String(token.to_string()))
    }

    fn encode(&self, value: &Value) -> Result<String, FormatError> {
        match value {
            Value::String(s) => Ok(s.clone()),
            other => Err(type_mismatch("String value", other)),
        }
    }
}

// ==================== Int ====================

#[derive(Debug)]
struct IntDomain;

impl DomainType for IntDomain {
    fn wsllex(&self, text: &str, at: usize) -> Result<(usize, String), LexError> {
        lex::lex_int(text, at)
    }

    fn wslunlex(&self, token: &str) -> Result<String, FormatError> {
        lex::unlex_int(token)
    }

    fn decode(&self, token: &str) -> Result<Value, ParseError> {
        let n: i64 = token
            .parse()
            .map_err(|_| decode_err("Int value", token, "failed to parse integer"))?;
        Ok(Value::Int(n))
    }

    fn encode(&self, value: &Value) -> Result<String, FormatError> {
        match value {
            Value::Int(n) => Ok(n.to_string()),
            other => Err(type_mismatch("Int value", other)),
        }
    }

    fn jsontype(&self) -> JsonType {
        JsonType::Int
    }
}

// ==================== Float ====================

#[derive(Debug)]
struct FloatDomain;

impl DomainType for FloatDomain {
    fn wsllex(&self, text: &str, at: usize) -> Result<(usize, String), LexError> {
        lex::lex_float(text, at)
    }

    fn wslunlex(&self, token: &str) -> Result<String, FormatError> {
        if token.parse::<f64>().map(|x| x.is_finite()) != Ok(true) {
            return Err(FormatError::new("float literal", token, "not a valid float literal"));
        }
        Ok(token.to_string())
    }

    fn decode(&self, token: &str) -> Result<Value, ParseError> {
        let x: f64 = token
            .parse()
            .map_err(|_| decode_err("Float value", token, "failed to parse float"))?;
        if !x.is_finite() {
            return Err(decode_err("Float value", token, "float literal must be finite"));
        }
        Ok(Value::Float(x))
    }

    fn encode(&self, value: &Value) -> Result<String, FormatError> {
        match value {
            Value::Float(x) if x.is_finite() => Ok(format!("{}", x)),
            Value::Float(x) => Err(FormatError::new(
                "Float value",
                format!("{}", x),
                "cannot encode non-finite float",
            )),
            other => Err(type_mismatch("Float value", other)),
        }
    }

    fn jsontype(&self) -> JsonType {
        JsonType::Float
    }
}

// ==================== Enum ====================

#[derive(Debug)]
struct EnumDomain {
    base: Arc<EnumBase>,
}

impl DomainType for EnumDomain {
    fn wsllex(&self, text: &str, at: usize) -> Result<(usize, String), LexError> {
        lex::lex_identifier(text, at)
    }

    fn wslunlex(&self, token: &str) -> Result<String, FormatError> {
        lex::unlex_identifier(token)
    }

    fn decode(&self, token: &str) -> Result<Value, ParseError> {
        let index = self.base.index_of(token).ok_or_else(|| {
            decode_err(
                "Enum value",
                token,
                format!(
                    "invalid option \"{}\"; valid options are: {}",
                    token,
                    self.base.options.join(", ")
                ),
            )
        })?;
        Ok(Value::Enum(EnumValue::new(self.base.clone(), index)))
    }

    fn encode(&self, value: &Value) -> Result<String, FormatError> {
        match value {
            Value::Enum(e) if e.has_base(&self.base) => Ok(e.as_str().to_string()),
            Value::Enum(e) => Err(FormatError::new(
                "Enum value",
                e.as_str(),
                "enum value belongs to a different enum base",
            )),
            other => Err(type_mismatch("Enum value", other)),
        }
    }
}

// ==================== IPv4 ====================

#[derive(Debug)]
struct Ipv4Domain;

impl DomainType for Ipv4Domain {
    fn wsllex(&self, text: &str, at: usize) -> Result<(usize, String), LexError> {
        lex::lex_identifier(text, at)
    }

    fn wslunlex(&self, token: &str) -> Result<String, FormatError> {
        lex::unlex_identifier(token)
    }

    fn decode(&self, token: &str) -> Result<Value, ParseError> {
        let mut octets = [0u8; 4];
        let parts: Vec<&str> = token.split('.').collect();
        if parts.len() == 4 {
            let mut ok = true;
            for (slot, part) in octets.iter_mut().zip(&parts) {
                match part.parse::<u8>() {
                    Ok(b) => *slot = b,
                    Err(_) => {
                        ok = false;
                        break;
                    }
                }
            }
            if ok {
                return Ok(Value::Ipv4(octets));
            }
        }
        Err(decode_err(
            "IPv4 value",
            token,
            "IPv4 address must be 4 dot-separated integers in [0,255]",
        ))
    }

    fn encode(&self, value: &Value) -> Result<String, FormatError> {
        match value {
            Value::Ipv4([a, b, c, d]) => Ok(format!("{}.{}.{}.{}", a, b, c, d)),
            other => Err(type_mismatch("IPv4 value", other)),
        }
    }
}

// ==================== Domain parsers ====================

/// A domain parser: consumes the remainder of a `DOMAIN` declaration line
/// and produces the codec bundle.
pub type DomainParser = Arc<dyn Fn(&str) -> WslResult<Arc<dyn DomainType>> + Send + Sync>;

fn no_args(name: &'static str, rest: &str) -> WslResult<()> {
    if !rest.trim().is_empty() {
        return Err(WslError::Parse(ParseError::at(
            "DOMAIN declaration",
            rest,
            0,
            format!("construction of {} domain does not receive any arguments", name),
        )));
    }
    Ok(())
}

fn parse_id_domain(rest: &str) -> WslResult<Arc<dyn DomainType>> {
    no_args("ID", rest)?;
    Ok(Arc::new(IdDomain))
}

fn parse_string_domain(rest: &str) -> WslResult<Arc<dyn DomainType>> {
    let mut escape = false;
    for word in rest.split_whitespace() {
        if word == "escape" {
            escape = true;
        } else {
            return Err(WslError::Parse(ParseError::at(
                "DOMAIN declaration",
                rest,
                0,
                format!("did not understand String parameterization: {}", word),
            )));
        }
    }
    Ok(Arc::new(StringDomain { escape }))
}

fn parse_int_domain(rest: &str) -> WslResult<Arc<dyn DomainType>> {
    no_args("Int", rest)?;
    Ok(Arc::new(IntDomain))
}

fn parse_float_domain(rest: &str) -> WslResult<Arc<dyn DomainType>> {
    no_args("Float", rest)?;
    Ok(Arc::new(FloatDomain))
}

fn parse_enum_domain(rest: &str) -> WslResult<Arc<dyn DomainType>> {
    let options: Vec<String> = rest.split_whitespace().map(str::to_string).collect();
    let base = Arc::new(EnumBase::new(options));
    Ok(Arc::new(EnumDomain { base }))
}

fn parse_ipv4_domain(rest: &str) -> WslResult<Arc<dyn DomainType>> {
    no_args("IPv4", rest)?;
    Ok(Arc::new(Ipv4Domain))
}

/// Registry of domain parsers available to the schema parser.
///
/// Freshly created registries hold the built-in parsers; additional parsers
/// can be registered at startup.
#[derive(Clone)]
pub struct DomainRegistry {
    parsers: BTreeMap<String, DomainParser>,
}

impl DomainRegistry {
    /// Create a registry holding the built-in domain parsers
    /// (`ID`, `String`, `Int`, `Float`, `Enum`, `IPv4`).
    pub fn builtin() -> Self {
        let mut registry = Self {
            parsers: BTreeMap::new(),
        };
        registry.register("ID", Arc::new(parse_id_domain));
        registry.register("String", Arc::new(parse_string_domain));
        registry.register("Int", Arc::new(parse_int_domain));
        registry.register("Float", Arc::new(parse_float_domain));
        registry.register("Enum", Arc::new(parse_enum_domain));
        registry.register("IPv4", Arc::new(parse_ipv4_domain));
        registry
    }

    /// Register a domain parser under a name, replacing any previous one.
    pub fn register(&mut self, name: impl Into<String>, parser: DomainParser) {
        self.parsers.insert(name.into(), parser);
    }

    /// Look up a domain parser by name.
    pub fn get(&self, name: &str) -> Option<&DomainParser> {
        self.parsers.get(name)
    }

    /// Names of all registered parsers.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.parsers.keys().map(String::as_str)
    }
}

impl Default for DomainRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for DomainRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomainRegistry")
            .field("parsers", &self.parsers.keys().collect::<Vec<_>>())
            .finish()
    }
}
