use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

pub fn serialize_fields_as_map<'a, S, I, V>(fields: I, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    I: ExactSizeIterator<Item = (&'a str, &'a V)>,
    V: Serialize + 'a,
{
    let mut map = serializer.serialize_map(Some(fields.len()))?;
    for (k, v) in fields {
        map.serialize_entry(k, v)?;
    }
    map.end()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::parser::model::{FieldSpec, Schema, TypedRecord, Value};

    fn record(values: Vec<Value>) -> TypedRecord {
        let schema = Schema::new(
            "conn",
            vec![
                FieldSpec::new("ts", "time"),
                FieldSpec::new("uid", "string"),
                FieldSpec::new("orig_bytes", "count"),
            ],
        )
        .unwrap();
        TypedRecord::new(Arc::new(schema), values)
    }

    #[test]
    fn test_serialize_record_as_object() {
        let rec = record(vec![
            Value::Float(1.0),
            Value::Text("ABC123".to_string()),
            Value::Int(42),
        ]);
        let json = serde_json::to_string(&rec).unwrap();
        assert_eq!(json, r#"{"ts":1.0,"uid":"ABC123","orig_bytes":42}"#);
    }

    #[test]
    fn test_serialize_absent_as_null() {
        let rec = record(vec![Value::Float(2.5), Value::Absent, Value::Absent]);
        let json = serde_json::to_string(&rec).unwrap();
        assert_eq!(json, r#"{"ts":2.5,"uid":null,"orig_bytes":null}"#);
    }

    #[test]
    fn test_serialize_large_count() {
        let rec = record(vec![Value::Float(1.0), Value::Text("C".to_string()), Value::UInt(u64::MAX)]);
        let json = serde_json::to_string(&rec).unwrap();
        assert_eq!(json, r#"{"ts":1.0,"uid":"C","orig_bytes":18446744073709551615}"#);
    }

    #[test]
    fn test_serialize_special_characters() {
        let rec = record(vec![
            Value::Float(0.0),
            Value::Text("line with \"quotes\" and \\backslashes".to_string()),
            Value::Int(-1),
        ]);
        let json = serde_json::to_string(&rec).unwrap();
        // Should be valid JSON
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["orig_bytes"], -1);
    }
}
