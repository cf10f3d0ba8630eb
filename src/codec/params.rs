//! Call parameter decoding
//!
//! Transactions carry their call arguments as a JSON array of
//! `{"name", "type", "value"}` objects with string values. Decoding turns
//! that text into a tagged argument vector, validated per declared type.

use crate::core::Address;
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Reasons an encoded parameter list is rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Malformed params: {0}")]
    InvalidJson(String),
    #[error("Malformed params: not a JSON array")]
    NotAnArray,
    #[error("Malformed params: member {0} is not an object")]
    NotAnObject(usize),
    #[error("Malformed params: member {index} has {size} fields, expected 3")]
    InvalidMemberSize { index: usize, size: usize },
    #[error("Malformed params: member {0} is missing name, type or value")]
    IncompleteMember(usize),
    #[error("Malformed params: unknown type '{0}'")]
    UnknownType(String),
    #[error("Malformed params: cannot parse '{value}' as {param_type}")]
    InvalidValue { param_type: ParamType, value: String },
}

/// Recognised parameter type tags
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamType {
    Address,
    Str,
    Int,
    Bool,
    Bytes,
}

impl ParamType {
    /// Parse a type tag as it appears on the wire
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "Address" => Some(ParamType::Address),
            "str" => Some(ParamType::Str),
            "int" => Some(ParamType::Int),
            "bool" => Some(ParamType::Bool),
            "bytes" => Some(ParamType::Bytes),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            ParamType::Address => "Address",
            ParamType::Str => "str",
            ParamType::Int => "int",
            ParamType::Bool => "bool",
            ParamType::Bytes => "bytes",
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A decoded, strongly-typed call argument
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamValue {
    Address(Address),
    Str(String),
    Int(BigInt),
    Bool(bool),
    Bytes(Vec<u8>),
}

impl ParamValue {
    pub fn param_type(&self) -> ParamType {
        match self {
            ParamValue::Address(_) => ParamType::Address,
            ParamValue::Str(_) => ParamType::Str,
            ParamValue::Int(_) => ParamType::Int,
            ParamValue::Bool(_) => ParamType::Bool,
            ParamValue::Bytes(_) => ParamType::Bytes,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Address(address) => write!(f, "{}", address),
            ParamValue::Str(s) => write!(f, "{:?}", s),
            ParamValue::Int(n) => write!(f, "{}", n),
            ParamValue::Bool(b) => write!(f, "{}", b),
            ParamValue::Bytes(bytes) => write!(f, "0x{}", hex::encode(bytes)),
        }
    }
}

/// Decode an encoded parameter list
///
/// An empty or absent encoding yields no arguments.
pub fn decode_params(encoded: Option<&str>) -> Result<Vec<ParamValue>, CodecError> {
    let text = match encoded {
        Some(text) if !text.is_empty() => text,
        _ => return Ok(Vec::new()),
    };

    let json: Value =
        serde_json::from_str(text).map_err(|e| CodecError::InvalidJson(e.to_string()))?;
    let members = json.as_array().ok_or(CodecError::NotAnArray)?;

    members
        .iter()
        .enumerate()
        .map(|(index, member)| decode_member(index, member))
        .collect()
}

fn decode_member(index: usize, member: &Value) -> Result<ParamValue, CodecError> {
    let fields = member.as_object().ok_or(CodecError::NotAnObject(index))?;
    if fields.len() != 3 {
        return Err(CodecError::InvalidMemberSize {
            index,
            size: fields.len(),
        });
    }

    let field = |key: &str| fields.get(key).and_then(Value::as_str);
    match (field("name"), field("type"), field("value")) {
        (Some(_), Some(tag), Some(value)) => {
            let param_type =
                ParamType::from_tag(tag).ok_or_else(|| CodecError::UnknownType(tag.to_string()))?;
            convert_param(param_type, value)
        }
        _ => Err(CodecError::IncompleteMember(index)),
    }
}

/// Convert a single textual value under its declared type
pub fn convert_param(param_type: ParamType, value: &str) -> Result<ParamValue, CodecError> {
    let invalid = || CodecError::InvalidValue {
        param_type,
        value: value.to_string(),
    };

    match param_type {
        ParamType::Address => value
            .parse::<Address>()
            .map(ParamValue::Address)
            .map_err(|_| invalid()),
        ParamType::Str => Ok(ParamValue::Str(value.to_string())),
        ParamType::Int => parse_int(value).map(ParamValue::Int).ok_or_else(invalid),
        ParamType::Bool => match value {
            "0x0" | "false" => Ok(ParamValue::Bool(false)),
            "0x1" | "true" => Ok(ParamValue::Bool(true)),
            _ => Err(invalid()),
        },
        ParamType::Bytes => {
            let digits = value.strip_prefix("0x").ok_or_else(invalid)?;
            if digits.len() % 2 != 0 {
                return Err(invalid());
            }
            hex::decode(digits).map(ParamValue::Bytes).map_err(|_| invalid())
        }
    }
}

/// Parse an integer of any width, hexadecimal when `0x`-prefixed and
/// decimal otherwise
pub fn parse_int(value: &str) -> Option<BigInt> {
    let (digits, radix) = match value.strip_prefix("0x") {
        Some(digits) => (digits, 16),
        None => (value, 10),
    };

    // A sign, then plain digits only
    let magnitude = digits
        .strip_prefix(|c: char| c == '-' || c == '+')
        .unwrap_or(digits);
    if magnitude.is_empty() || !magnitude.chars().all(|c| c.is_digit(radix)) {
        return None;
    }

    BigInt::parse_bytes(digits.as_bytes(), radix)
}

/// Render an amount the way transaction summaries show it (`0x`-prefixed hex)
pub fn format_hex(value: u128) -> String {
    format!("{:#x}", value)
}
