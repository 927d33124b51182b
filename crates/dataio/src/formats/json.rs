//! JSON: an array of flat objects, one per record.

use homologset_core::{AttrValue, Fields, TaggedRecord};
use serde_json::{Map, Number, Value};

use crate::error::DataIoError;
use crate::format::Format;
use crate::traits::{FormatAdapter, restrict_fields};

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonAdapter;

pub fn value_to_attr(key: &str, value: Value) -> Result<AttrValue, DataIoError> {
    match value {
        Value::Null => Ok(AttrValue::Null),
        Value::Bool(b) => Ok(AttrValue::Boolean(b)),
        Value::String(s) => Ok(AttrValue::Text(s)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(AttrValue::Integer(i)),
            None => n.as_f64().map(AttrValue::Float).ok_or_else(|| {
                DataIoError::format(Format::Json, format!("unrepresentable number for {key:?}"))
            }),
        },
        Value::Array(_) | Value::Object(_) => Err(DataIoError::format(
            Format::Json,
            format!("attribute {key:?} is not a scalar"),
        )),
    }
}

/// Non-finite floats have no JSON form and are written as `null`.
pub fn attr_to_value(value: &AttrValue) -> Value {
    match value {
        AttrValue::Null => Value::Null,
        AttrValue::Text(s) => Value::String(s.clone()),
        AttrValue::Integer(i) => Value::Number((*i).into()),
        AttrValue::Float(x) => Number::from_f64(*x).map(Value::Number).unwrap_or(Value::Null),
        AttrValue::Boolean(b) => Value::Bool(*b),
    }
}

fn object_to_fields(object: Map<String, Value>) -> Result<Fields, DataIoError> {
    object
        .into_iter()
        .map(|(key, value)| -> Result<(String, AttrValue), DataIoError> {
            let attr = value_to_attr(&key, value)?;
            Ok((key, attr))
        })
        .collect()
}

impl FormatAdapter for JsonAdapter {
    fn format(&self) -> Format {
        Format::Json
    }

    /// Accepts an array of objects, or a single object as a one-record batch.
    fn read(&self, raw: &str, tags: &[String]) -> Result<Vec<TaggedRecord>, DataIoError> {
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        let parsed: Value =
            serde_json::from_str(raw).map_err(|e| DataIoError::format(Format::Json, e))?;
        let objects = match parsed {
            Value::Array(items) => items,
            object @ Value::Object(_) => vec![object],
            _ => {
                return Err(DataIoError::format(
                    Format::Json,
                    "expected an array of objects",
                ));
            }
        };

        let records = objects
            .into_iter()
            .enumerate()
            .map(|(i, item)| -> Result<TaggedRecord, DataIoError> {
                match item {
                    Value::Object(object) => Ok(restrict_fields(
                        TaggedRecord::Named(object_to_fields(object)?),
                        tags,
                    )),
                    _ => Err(DataIoError::format(
                        Format::Json,
                        format!("record {i} is not an object"),
                    )),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(records = records.len(), "parsed json");
        Ok(records)
    }

    fn write_records(&self, records: &[TaggedRecord]) -> Result<String, DataIoError> {
        let objects = records
            .iter()
            .cloned()
            .map(|record| -> Result<Value, DataIoError> {
                let fields = record.into_fields()?;
                Ok(Value::Object(
                    fields
                        .iter()
                        .map(|(k, v)| (k.clone(), attr_to_value(v)))
                        .collect(),
                ))
            })
            .collect::<Result<Vec<_>, _>>()?;
        serde_json::to_string_pretty(&Value::Array(objects))
            .map_err(|e| DataIoError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_scalar_types() {
        let raw = r#"[{"id": "XX00000001", "length": 120, "score": 0.5, "reviewed": true, "note": null}]"#;
        let records = JsonAdapter.read(raw, &[]).unwrap();
        let TaggedRecord::Named(fields) = &records[0] else {
            panic!("expected named record");
        };
        assert_eq!(fields.get("id"), Some(&AttrValue::from("XX00000001")));
        assert_eq!(fields.get("length"), Some(&AttrValue::Integer(120)));
        assert_eq!(fields.get("score"), Some(&AttrValue::Float(0.5)));
        assert_eq!(fields.get("reviewed"), Some(&AttrValue::Boolean(true)));
        assert_eq!(fields.get("note"), Some(&AttrValue::Null));
    }

    #[test]
    fn single_object_is_one_record() {
        let records = JsonAdapter.read(r#"{"accver": "ACC1"}"#, &[]).unwrap();
        assert_eq!(records, vec![TaggedRecord::named([("accver", "ACC1")])]);
    }

    #[test]
    fn nested_values_are_rejected() {
        let err = JsonAdapter.read(r#"[{"tags": ["a"]}]"#, &[]).unwrap_err();
        assert!(matches!(err, DataIoError::Format { format: Format::Json, .. }));
    }

    #[test]
    fn non_object_records_are_rejected() {
        assert!(JsonAdapter.read("[1, 2]", &[]).is_err());
        assert!(JsonAdapter.read("\"text\"", &[]).is_err());
        assert!(JsonAdapter.read("[{", &[]).is_err());
    }

    #[test]
    fn roundtrip_preserves_types() {
        let records = vec![TaggedRecord::Named(Fields::from([
            ("id".to_string(), AttrValue::from("XX00000001")),
            ("length".to_string(), AttrValue::Integer(3)),
            ("sequence".to_string(), AttrValue::from("ASH")),
        ]))];
        let text = JsonAdapter.write(&records).unwrap();
        assert_eq!(JsonAdapter.read(&text, &[]).unwrap(), records);
    }

    #[test]
    fn nan_is_written_as_null() {
        assert_eq!(attr_to_value(&AttrValue::Float(f64::NAN)), Value::Null);
    }
}
