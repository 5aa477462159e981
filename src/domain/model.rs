use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One row of a record set. Key order is the order fields were first inserted,
/// which is also the column order used for CSV output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    pub data: Map<String, Value>,
}

impl Record {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.data.insert(field.into(), value)
    }

    /// Ticket id rendered for log and error messages.
    pub fn id_label(&self) -> String {
        match self.data.get("id") {
            Some(Value::String(id)) => id.clone(),
            Some(other) => other.to_string(),
            None => "<no id>".to_string(),
        }
    }
}

/// Union of the record keys in first-seen order.
pub fn columns(records: &[Record]) -> Vec<String> {
    let mut seen = Map::new();
    for record in records {
        for key in record.data.keys() {
            if !seen.contains_key(key) {
                seen.insert(key.clone(), Value::Null);
            }
        }
    }
    seen.into_iter().map(|(key, _)| key).collect()
}

/// Threaded and flattened views of the same filtered tickets.
#[derive(Debug, Clone, Default)]
pub struct TransformResult {
    pub threaded: Vec<Record>,
    pub flattened: Vec<Record>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(data) => Record { data },
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn test_columns_keep_first_seen_order() {
        let records = vec![
            record(json!({"id": 1, "comments": []})),
            record(json!({"id": 2, "customer": "Acme", "comments": []})),
        ];
        assert_eq!(columns(&records), vec!["id", "comments", "customer"]);
    }

    #[test]
    fn test_id_label() {
        assert_eq!(record(json!({"id": 42})).id_label(), "42");
        assert_eq!(record(json!({"id": "T-7"})).id_label(), "T-7");
        assert_eq!(record(json!({"other": 1})).id_label(), "<no id>");
    }

    #[test]
    fn test_record_serializes_as_plain_object() {
        let rec = record(json!({"id": 1, "comments": "a"}));
        assert_eq!(serde_json::to_string(&rec).unwrap(), r#"{"id":1,"comments":"a"}"#);
    }
}
