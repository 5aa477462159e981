use crate::domain::model::Record;
use crate::utils::error::{EtlError, Result};
use crate::utils::select::which;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Lookup column carrying the ticket id in the customer export.
pub const LOOKUP_ID_COLUMN: &str = "Id";
/// Lookup column carrying the customer display name.
pub const LOOKUP_CUSTOMER_COLUMN: &str = "Customer [list]";

pub const JOIN_KEY: &str = "id";
pub const CUSTOMER_FIELD: &str = "customer";

/// Rename the lookup's `Id`/`Customer [list]` columns to `id`/`customer` and
/// drop every other column.
pub fn prepare_lookup(rows: Vec<Record>) -> Result<Vec<Record>> {
    rows.into_iter()
        .enumerate()
        .map(|(row, mut record)| {
            let mut take = |column: &str| {
                record
                    .data
                    .remove(column)
                    .ok_or_else(|| EtlError::MissingField {
                        record: format!("lookup row {}", row + 1),
                        field: column.to_string(),
                    })
            };
            let id = take(LOOKUP_ID_COLUMN)?;
            // 客戶名稱一律以文字保存，例如 "1999"
            let customer = match take(LOOKUP_CUSTOMER_COLUMN)? {
                Value::Null => Value::Null,
                other => Value::String(value_text(&other).unwrap_or_default()),
            };

            let mut data = Map::new();
            data.insert(JOIN_KEY.to_string(), id);
            data.insert(CUSTOMER_FIELD.to_string(), customer);
            Ok(Record { data })
        })
        .collect()
}

/// Text form of a cell, so that `1` in the ticket export matches `"1"` or
/// `1.0` in the lookup. Null never matches.
fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.is_f64() => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => Some(format!("{}", f as i64)),
            _ => Some(n.to_string()),
        },
        other => Some(other.to_string()),
    }
}

fn join_key(value: &Value) -> Option<String> {
    value_text(value)
}

/// Inner join on `id`. Rows follow ticket order; a ticket matching several
/// lookup rows is repeated once per match. The lookup's `customer` replaces
/// any `customer` the ticket already carries.
pub fn merge(tickets: &[Record], lookup: &[Record]) -> Vec<Record> {
    let mut index: HashMap<String, Vec<&Record>> = HashMap::new();
    for row in lookup {
        if let Some(key) = row.get(JOIN_KEY).and_then(join_key) {
            index.entry(key).or_default().push(row);
        }
    }

    let mut merged = Vec::new();
    for ticket in tickets {
        let Some(matches) = ticket
            .get(JOIN_KEY)
            .and_then(join_key)
            .and_then(|key| index.get(&key))
        else {
            continue;
        };
        for row in matches {
            merged.push(join_pair(ticket, row));
        }
    }
    merged
}

fn join_pair(ticket: &Record, row: &Record) -> Record {
    let mut data = Map::new();
    for (key, value) in &ticket.data {
        if key == CUSTOMER_FIELD && row.data.contains_key(key) {
            continue;
        }
        let name = if key != JOIN_KEY && row.data.contains_key(key) {
            format!("{}_x", key)
        } else {
            key.clone()
        };
        data.insert(name, value.clone());
    }
    for (key, value) in &row.data {
        if key == JOIN_KEY {
            continue;
        }
        let name = if key != CUSTOMER_FIELD && ticket.data.contains_key(key) {
            format!("{}_y", key)
        } else {
            key.clone()
        };
        data.insert(name, value.clone());
    }
    Record { data }
}

/// Keep rows whose `customer`, read as text, equals `customer` exactly. An
/// empty name keeps everything.
pub fn filter_customer(records: Vec<Record>, customer: &str) -> Vec<Record> {
    if customer.is_empty() {
        return records;
    }

    let names: Vec<Option<String>> = records
        .iter()
        .map(|r| r.get(CUSTOMER_FIELD).and_then(value_text))
        .collect();
    let keep = which(&names, &Some(customer.to_string()));

    let mut keep = keep.into_iter().peekable();
    records
        .into_iter()
        .enumerate()
        .filter_map(|(i, record)| {
            if keep.peek() == Some(&i) {
                keep.next();
                Some(record)
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(value: Value) -> Vec<Record> {
        serde_json::from_value(value).unwrap()
    }

    fn ids(records: &[Record]) -> Vec<Value> {
        records.iter().map(|r| r.get("id").cloned().unwrap()).collect()
    }

    #[test]
    fn test_prepare_lookup_renames_and_projects() {
        let rows = records(json!([
            {"Id": 1, "Customer [list]": "Acme", "Region": "EU"}
        ]));
        let lookup = prepare_lookup(rows).unwrap();
        assert_eq!(lookup, records(json!([{"id": 1, "customer": "Acme"}])));
    }

    #[test]
    fn test_prepare_lookup_requires_columns() {
        let rows = records(json!([{"Id": 1, "Name": "Acme"}]));
        assert!(matches!(
            prepare_lookup(rows),
            Err(EtlError::MissingField { .. })
        ));
    }

    #[test]
    fn test_merge_is_inner_join() {
        let tickets = records(json!([
            {"id": 1, "comments": []},
            {"id": 2, "comments": []},
            {"id": 3, "comments": []}
        ]));
        let lookup = records(json!([
            {"id": 3, "customer": "Initech"},
            {"id": 1, "customer": "Acme"},
            {"id": 9, "customer": "Nobody"}
        ]));

        let merged = merge(&tickets, &lookup);
        assert_eq!(ids(&merged), vec![json!(1), json!(3)]);
        assert_eq!(merged[0].get("customer"), Some(&json!("Acme")));
        assert_eq!(merged[1].get("customer"), Some(&json!("Initech")));
    }

    #[test]
    fn test_merge_with_empty_lookup_is_empty() {
        let tickets = records(json!([{"id": 1, "comments": []}]));
        assert!(merge(&tickets, &[]).is_empty());
    }

    #[test]
    fn test_merge_matches_string_and_numeric_ids() {
        let tickets = records(json!([{"id": 7, "comments": []}]));
        let lookup = records(json!([{"id": "7", "customer": "Acme"}]));
        assert_eq!(merge(&tickets, &lookup).len(), 1);
    }

    #[test]
    fn test_merge_repeats_ticket_per_lookup_match() {
        let tickets = records(json!([
            {"id": 1, "comments": ["a"]},
            {"id": 2, "comments": ["b"]}
        ]));
        let lookup = records(json!([
            {"id": 1, "customer": "Acme"},
            {"id": 2, "customer": "Globex"},
            {"id": 1, "customer": "Acme Europe"}
        ]));

        let merged = merge(&tickets, &lookup);
        assert_eq!(ids(&merged), vec![json!(1), json!(1), json!(2)]);
        let customers: Vec<&Value> = merged.iter().map(|r| r.get("customer").unwrap()).collect();
        assert_eq!(customers, vec!["Acme", "Acme Europe", "Globex"]);
    }

    #[test]
    fn test_merge_matches_integral_float_ids() {
        let tickets = records(json!([{"id": 1, "comments": []}, {"id": 2, "comments": []}]));
        let lookup = records(json!([
            {"id": 1.0, "customer": "Acme"},
            {"id": 2.5, "customer": "Globex"}
        ]));
        assert_eq!(ids(&merge(&tickets, &lookup)), vec![json!(1)]);
    }

    #[test]
    fn test_merge_suffixes_shared_columns() {
        let tickets = records(json!([{"id": 1, "plan": "free"}]));
        let lookup = records(json!([{"id": 1, "plan": "gold", "customer": "Acme"}]));
        let merged = merge(&tickets, &lookup);
        assert_eq!(
            merged,
            records(json!([{"id": 1, "plan_x": "free", "plan_y": "gold", "customer": "Acme"}]))
        );
    }

    #[test]
    fn test_lookup_customer_replaces_ticket_customer() {
        let tickets = records(json!([
            {"id": 1, "customer": "old name", "comments": []},
            {"id": 2, "customer": "Acme", "comments": []}
        ]));
        let lookup = records(json!([
            {"id": 1, "customer": "Acme"},
            {"id": 2, "customer": "Globex"}
        ]));

        let merged = merge(&tickets, &lookup);
        assert!(merged.iter().all(|r| r.get("customer_x").is_none()));
        let acme = filter_customer(merged, "Acme");
        assert_eq!(ids(&acme), vec![json!(1)]);
    }

    #[test]
    fn test_numeric_customer_names_can_be_filtered() {
        let rows = records(json!([
            {"Id": 1, "Customer [list]": "Acme"},
            {"Id": 2, "Customer [list]": 1999},
            {"Id": 3, "Customer [list]": null}
        ]));
        let lookup = prepare_lookup(rows).unwrap();
        assert_eq!(lookup[1].get("customer"), Some(&json!("1999")));
        assert_eq!(lookup[2].get("customer"), Some(&Value::Null));

        let tickets = records(json!([
            {"id": 1, "comments": []},
            {"id": 2, "comments": []},
            {"id": 3, "comments": []}
        ]));
        let kept = filter_customer(merge(&tickets, &lookup), "1999");
        assert_eq!(ids(&kept), vec![json!(2)]);
    }

    #[test]
    fn test_filter_customer() {
        let rows = records(json!([
            {"id": 1, "customer": "Acme"},
            {"id": 2, "customer": "Globex"},
            {"id": 3, "customer": "Acme"},
            {"id": 4}
        ]));

        let acme = filter_customer(rows.clone(), "Acme");
        assert_eq!(ids(&acme), vec![json!(1), json!(3)]);

        assert!(filter_customer(rows.clone(), "acme").is_empty());
        let numeric = records(json!([{"id": 5, "customer": 1999}]));
        assert_eq!(filter_customer(numeric, "1999").len(), 1);
        assert_eq!(filter_customer(rows, "").len(), 4);
    }
}
