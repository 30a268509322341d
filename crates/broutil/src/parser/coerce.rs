//! Coerce — declared Bro type tokens and the numeric conversions shared by
//! every format's coercer.
//!
//! Format-specific rules (the ASCII `-` marker, DataSeries time ticks) live in
//! the handlers; this module only knows how to turn text into numbers and how
//! to fail loudly when it can't.

use super::model::{FieldSpec, ParseError, Value};

/// Coercion class of a declared type token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// `double`
    Double,
    /// `time` / `interval`, seconds as floating point
    Time,
    /// `int` / `port`
    Integer,
    /// `count` / `counter`, unsigned 64-bit
    Unsigned,
    /// Anything else is passed through as text
    Text,
}

impl FieldType {
    pub fn from_token(token: &str) -> Self {
        match token {
            "double" => FieldType::Double,
            "time" | "interval" => FieldType::Time,
            "int" | "port" => FieldType::Integer,
            "count" | "counter" => FieldType::Unsigned,
            _ => FieldType::Text,
        }
    }
}

pub fn parse_float(field: &FieldSpec, raw: &str) -> Result<f64, ParseError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| invalid_value(field, raw))
}

pub fn parse_int(field: &FieldSpec, raw: &str) -> Result<i64, ParseError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| invalid_value(field, raw))
}

pub fn parse_uint(field: &FieldSpec, raw: &str) -> Result<u64, ParseError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| invalid_value(field, raw))
}

/// Coerce a raw cell by its declared type, without empty-marker handling.
///
/// `time_scale` divides `time`/`interval` values; pass `1.0` for formats that
/// already store seconds.
pub fn coerce_scaled(field: &FieldSpec, raw: &str, time_scale: f64) -> Result<Value, ParseError> {
    match FieldType::from_token(&field.type_name) {
        FieldType::Double => parse_float(field, raw).map(Value::Float),
        FieldType::Time => parse_float(field, raw).map(|v| Value::Float(v / time_scale)),
        FieldType::Integer => parse_int(field, raw).map(Value::Int),
        // Counts that fit stay `Int`; only the top half of the range needs `UInt`.
        FieldType::Unsigned => {
            parse_uint(field, raw).map(|v| i64::try_from(v).map_or(Value::UInt(v), Value::Int))
        }
        FieldType::Text => Ok(Value::Text(raw.to_string())),
    }
}

fn invalid_value(field: &FieldSpec, raw: &str) -> ParseError {
    ParseError::InvalidValue {
        field: field.name.clone(),
        type_name: field.type_name.clone(),
        value: raw.to_string(),
    }
}
