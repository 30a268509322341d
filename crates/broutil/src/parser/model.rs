use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::serde_utils::serialize_fields_as_map;
use crate::client::DecodeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogKind {
    /// Tab-separated ASCII logs with a `#`-prefixed header
    Ascii,
    /// DataSeries binary containers, decoded through `ds2txt`
    DataSeries,
}

impl LogKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogKind::Ascii => "ascii",
            LogKind::DataSeries => "dataseries",
        }
    }
}

/// One declared column: field name plus the Bro type token (`count`, `addr`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FieldSpec {
    pub name: String,
    pub type_name: String,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// Discovered layout of a log file.
///
/// Two schemas are interchangeable when their [`Schema::id`] matches, i.e.
/// same logical log path and same ordered field list.
#[derive(Debug, Clone)]
pub struct Schema {
    log_path: String,
    fields: Vec<FieldSpec>,
    id: String,
}

impl Schema {
    pub fn new(log_path: impl Into<String>, fields: Vec<FieldSpec>) -> Result<Self, SchemaError> {
        let log_path = log_path.into();
        if log_path.is_empty() {
            return Err(SchemaError::MissingLogPath);
        }
        if fields.is_empty() {
            return Err(SchemaError::NoFields);
        }
        for (i, field) in fields.iter().enumerate() {
            if fields[..i].iter().any(|f| f.name == field.name) {
                return Err(SchemaError::DuplicateField(field.name.clone()));
            }
        }

        let id = schema_digest(&log_path, &fields);
        Ok(Self { log_path, fields, id })
    }

    /// Logical log path (e.g. `conn`), independent of where the file lives.
    pub fn log_path(&self) -> &str {
        &self.log_path
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Hex digest over the logical path and the ordered field list.
    pub fn id(&self) -> &str {
        &self.id
    }
}

fn schema_digest(log_path: &str, fields: &[FieldSpec]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(log_path.as_bytes());
    hasher.update([0u8]);
    for field in fields {
        hasher.update(field.name.as_bytes());
        hasher.update([b'=']);
        hasher.update(field.type_name.as_bytes());
        hasher.update([0u8]);
    }
    format!("{:x}", hasher.finalize())
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Schema {}

impl Hash for Schema {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {} -- [", self.id, self.log_path)?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "({}, {})", field.name, field.type_name)?;
        }
        f.write_str("]")
    }
}

/// A coerced cell value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// The log's empty-field marker; no value was recorded
    Absent,
    Float(f64),
    Int(i64),
    /// A `count`/`counter` above `i64::MAX`
    UInt(u64),
    /// Types without a numeric mapping (`string`, `addr`, `bool`, sets, ...)
    Text(String),
}

impl Value {
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Any non-negative integer value.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Int(v) => u64::try_from(*v).ok(),
            Value::UInt(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Absent => f.write_str("None"),
            Value::Float(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::UInt(v) => write!(f, "{}", v),
            Value::Text(v) => f.write_str(v),
        }
    }
}

/// One typed row, values in schema order.
///
/// Serializes as a JSON object keyed by field name.
#[derive(Debug, Clone)]
pub struct TypedRecord {
    schema: Arc<Schema>,
    values: Vec<Value>,
}

impl TypedRecord {
    pub(crate) fn new(schema: Arc<Schema>, values: Vec<Value>) -> Self {
        debug_assert_eq!(schema.len(), values.len());
        Self { schema, values }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Look up a value by field name.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.schema
            .fields()
            .iter()
            .position(|f| f.name == field)
            .and_then(|i| self.values.get(i))
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Iterate `(field name, value)` pairs in schema order.
    pub fn fields(&self) -> impl ExactSizeIterator<Item = (&str, &Value)> + '_ {
        self.schema
            .fields()
            .iter()
            .map(|f| f.name.as_str())
            .zip(self.values.iter())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl PartialEq for TypedRecord {
    fn eq(&self, other: &Self) -> bool {
        self.schema == other.schema && self.values == other.values
    }
}

impl Serialize for TypedRecord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serialize_fields_as_map(self.fields(), serializer)
    }
}

impl fmt::Display for TypedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("( ")?;
        for (name, value) in self.fields() {
            write!(f, "({}, {}) ", name, value)?;
        }
        f.write_str(")")
    }
}

/// Discovery-time failures. These only ever mark a file invalid.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("No log path declaration found")]
    MissingLogPath,

    #[error("No separator declaration found")]
    MissingSeparator,

    #[error("Field list not found or malformed: {0}")]
    MalformedFields(String),

    #[error("No fields declared")]
    NoFields,

    #[error("Duplicate field name: {0}")]
    DuplicateField(String),

    #[error("Decoder produced no output")]
    EmptyDecoderOutput,

    #[error("Invalid header pattern: {0}")]
    Pattern(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decoder error: {0}")]
    Decode(#[from] DecodeError),
}

/// Row-level failures surfaced to whoever is consuming records.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid {type_name} value for field '{field}': {value:?}")]
    InvalidValue {
        field: String,
        type_name: String,
        value: String,
    },

    #[error("Row has {found} cells, schema declares {expected} fields")]
    FieldCount { expected: usize, found: usize },

    #[error("Malformed decoder row: {0}")]
    Csv(#[from] csv::Error),

    #[error("File has no valid schema: {0}")]
    InvalidFile(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decoder error: {0}")]
    Decode(#[from] DecodeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn_fields() -> Vec<FieldSpec> {
        vec![FieldSpec::new("ts", "time"), FieldSpec::new("uid", "string")]
    }

    #[test]
    fn test_schema_identity_matches_for_same_path_and_fields() {
        let a = Schema::new("conn", conn_fields()).unwrap();
        let b = Schema::new("conn", conn_fields()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.id(), b.id());
    }

    #[test]
    fn test_schema_identity_differs_by_path() {
        let a = Schema::new("conn", conn_fields()).unwrap();
        let b = Schema::new("dns", conn_fields()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_schema_identity_depends_on_field_order() {
        let a = Schema::new("conn", conn_fields()).unwrap();
        let mut reversed = conn_fields();
        reversed.reverse();
        let b = Schema::new("conn", reversed).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_schema_identity_depends_on_type() {
        let a = Schema::new("conn", conn_fields()).unwrap();
        let b = Schema::new(
            "conn",
            vec![FieldSpec::new("ts", "double"), FieldSpec::new("uid", "string")],
        )
        .unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_schema_rejects_empty_and_duplicates() {
        assert!(matches!(Schema::new("conn", vec![]), Err(SchemaError::NoFields)));
        assert!(matches!(Schema::new("", conn_fields()), Err(SchemaError::MissingLogPath)));

        let dup = vec![FieldSpec::new("ts", "time"), FieldSpec::new("ts", "double")];
        assert!(matches!(Schema::new("conn", dup), Err(SchemaError::DuplicateField(f)) if f == "ts"));
    }

    #[test]
    fn test_schema_display() {
        let schema = Schema::new("conn", conn_fields()).unwrap();
        let shown = schema.to_string();
        assert!(shown.starts_with(schema.id()));
        assert!(shown.ends_with("conn -- [(ts, time), (uid, string)]"));
    }

    #[test]
    fn test_record_accessors_and_display() {
        let schema = Arc::new(Schema::new("conn", conn_fields()).unwrap());
        let record = TypedRecord::new(
            schema,
            vec![Value::Float(1.5), Value::Text("ABC123".to_string())],
        );

        assert_eq!(record.get("ts"), Some(&Value::Float(1.5)));
        assert_eq!(record.get("uid").and_then(Value::as_str), Some("ABC123"));
        assert_eq!(record.get("missing"), None);
        assert_eq!(record.to_string(), "( (ts, 1.5) (uid, ABC123) )");
    }

    #[test]
    fn test_unsigned_value_accessors() {
        assert_eq!(Value::UInt(u64::MAX).as_u64(), Some(u64::MAX));
        assert_eq!(Value::UInt(u64::MAX).as_i64(), None);
        assert_eq!(Value::Int(7).as_u64(), Some(7));
        assert_eq!(Value::Int(-7).as_u64(), None);
        assert_eq!(Value::UInt(u64::MAX).to_string(), "18446744073709551615");
    }

    #[test]
    fn test_absent_value_display() {
        assert_eq!(Value::Absent.to_string(), "None");
        assert!(Value::Absent.is_absent());
        assert!(!Value::Text(String::new()).is_absent());
    }
}
