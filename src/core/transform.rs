use crate::domain::model::Record;
use crate::utils::error::{EtlError, Result};
use serde_json::{Map, Value};

pub const COMMENTS_FIELD: &str = "comments";
pub const DEFAULT_COMMENT_FIELD: &str = "body";

fn comments_of(record: &Record) -> Result<&Vec<Value>> {
    match record.get(COMMENTS_FIELD) {
        Some(Value::Array(comments)) => Ok(comments),
        Some(_) => Err(EtlError::ProcessingError {
            message: format!(
                "Record {}: '{}' is not a list",
                record.id_label(),
                COMMENTS_FIELD
            ),
        }),
        None => Err(EtlError::MissingField {
            record: record.id_label(),
            field: COMMENTS_FIELD.to_string(),
        }),
    }
}

/// Replace every comment in every record with its `field` value. The input is
/// left as it was.
pub fn trim_comments(records: &[Record], field: &str) -> Result<Vec<Record>> {
    records
        .iter()
        .map(|record| {
            let trimmed = comments_of(record)?
                .iter()
                .map(|comment| {
                    comment
                        .get(field)
                        .cloned()
                        .ok_or_else(|| EtlError::MissingField {
                            record: record.id_label(),
                            field: format!("{}.{}", COMMENTS_FIELD, field),
                        })
                })
                .collect::<Result<Vec<_>>>()?;

            let mut out = record.clone();
            out.insert(COMMENTS_FIELD, Value::Array(trimmed));
            Ok(out)
        })
        .collect()
}

/// One `{id, comments}` row per comment, in ticket order and then comment order.
pub fn flatten_comments(records: &[Record]) -> Result<Vec<Record>> {
    let mut rows = Vec::new();
    for record in records {
        let id = record
            .get("id")
            .cloned()
            .ok_or_else(|| EtlError::MissingField {
                record: record.id_label(),
                field: "id".to_string(),
            })?;

        for comment in comments_of(record)? {
            let mut data = Map::new();
            data.insert("id".to_string(), id.clone());
            data.insert(COMMENTS_FIELD.to_string(), comment.clone());
            rows.push(Record { data });
        }
    }
    Ok(rows)
}

/// Project every record onto `columns`; columns a record lacks are skipped.
pub fn select_columns(records: &[Record], columns: &[&str]) -> Vec<Record> {
    records
        .iter()
        .map(|record| {
            let mut data = Map::new();
            for column in columns {
                if let Some(value) = record.get(column) {
                    data.insert(column.to_string(), value.clone());
                }
            }
            Record { data }
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

    fn tickets() -> Vec<Record> {
        records(json!([
            {"id": 1, "customer": "Acme", "comments": [
                {"body": "first", "author_id": 10},
                {"body": "second", "author_id": 11}
            ]},
            {"id": 2, "customer": "Acme", "comments": []},
            {"id": 3, "customer": "Acme", "comments": [{"body": "third", "public": false}]}
        ]))
    }

    #[test]
    fn test_trim_comments_keeps_only_body() {
        let input = tickets();
        let trimmed = trim_comments(&input, "body").unwrap();

        assert_eq!(trimmed[0].get("comments"), Some(&json!(["first", "second"])));
        assert_eq!(trimmed[1].get("comments"), Some(&json!([])));
        assert_eq!(trimmed[2].get("customer"), Some(&json!("Acme")));
        // input untouched
        assert_eq!(input, tickets());
    }

    #[test]
    fn test_trim_comments_with_other_field() {
        let trimmed = trim_comments(&tickets()[..1], "author_id").unwrap();
        assert_eq!(trimmed[0].get("comments"), Some(&json!([10, 11])));
    }

    #[test]
    fn test_trim_comments_missing_field() {
        let err = trim_comments(&tickets(), "author_id").unwrap_err();
        match err {
            EtlError::MissingField { record, field } => {
                assert_eq!(record, "3");
                assert_eq!(field, "comments.author_id");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_trim_comments_requires_list() {
        let input = records(json!([{"id": 1, "comments": "not a list"}]));
        assert!(trim_comments(&input, "body").is_err());
        let input = records(json!([{"id": 1}]));
        assert!(trim_comments(&input, "body").is_err());
    }

    #[test]
    fn test_flatten_after_trim_counts_and_orders_rows() {
        let input = tickets();
        let flat = flatten_comments(&trim_comments(&input, "body").unwrap()).unwrap();

        let expected_rows: usize = input
            .iter()
            .map(|r| r.get("comments").unwrap().as_array().unwrap().len())
            .sum();
        assert_eq!(flat.len(), expected_rows);
        assert_eq!(
            flat,
            records(json!([
                {"id": 1, "comments": "first"},
                {"id": 1, "comments": "second"},
                {"id": 3, "comments": "third"}
            ]))
        );
    }

    #[test]
    fn test_select_columns() {
        let selected = select_columns(&tickets(), &["id", "comments"]);
        assert_eq!(selected.len(), 3);
        assert!(selected.iter().all(|r| r.get("customer").is_none()));
        assert_eq!(selected[1], records(json!([{"id": 2, "comments": []}]))[0]);
    }
}
