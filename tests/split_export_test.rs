use serde_json::json;
use std::fs;
use tempfile::TempDir;
use ticket_splitter::core::export::{ExportFormat, Exporter};
use ticket_splitter::core::loader::load_json;
use ticket_splitter::core::merge::{filter_customer, merge};
use ticket_splitter::core::transform::{flatten_comments, trim_comments};
use ticket_splitter::{LocalStorage, Record};

fn records(value: serde_json::Value) -> Vec<Record> {
    serde_json::from_value(value).unwrap()
}

fn storage_in(dir: &TempDir) -> LocalStorage {
    LocalStorage::new(dir.path().to_string_lossy().into_owned())
}

#[test]
fn test_filter_trim_flatten_worked_example() {
    let tickets = records(json!([
        {"id": 1, "comments": [{"body": "a"}]},
        {"id": 2, "comments": [{"body": "b"}, {"body": "c"}]}
    ]));
    let lookup = records(json!([
        {"id": 1, "customer": "X"},
        {"id": 2, "customer": "Y"}
    ]));

    let filtered = filter_customer(merge(&tickets, &lookup), "X");
    let flat = flatten_comments(&trim_comments(&filtered, "body").unwrap()).unwrap();

    assert_eq!(flat, records(json!([{"id": 1, "comments": "a"}])));
}

#[tokio::test]
async fn test_jsonl_export_round_trips() {
    let dir = TempDir::new().unwrap();
    let exporter = Exporter::new(storage_in(&dir));
    let original = records(json!([
        {"id": 1, "customer": "Ünïcode GmbH", "comments": ["hello", "wörld"], "score": 2.5},
        {"id": "T-2", "comments": [], "tags": {"vip": true}},
        {"id": 3, "comments": null}
    ]));

    let path = exporter
        .export(&original, "round_trip", ExportFormat::Json)
        .await
        .unwrap();

    assert!(path.ends_with("round_trip.json"));
    assert_eq!(load_json(&path).unwrap(), original);
}

#[tokio::test]
async fn test_split_data_partitions_every_record_once() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("previous.json"), "{}\n").unwrap();
    let exporter = Exporter::new(storage_in(&dir));
    let original: Vec<Record> = (0..12)
        .map(|i| records(json!([{"id": i, "comments": [format!("comment {}", i)]}])).remove(0))
        .collect();

    let written = exporter.split_data(&original, 4).await.unwrap();
    assert_eq!(written.len(), 4);

    let mut rebuilt = Vec::new();
    for i in 1..=4 {
        let chunk = load_json(dir.path().join(format!("split{}.json", i))).unwrap();
        assert_eq!(chunk.len(), 3);
        rebuilt.extend(chunk);
    }
    assert_eq!(rebuilt, original);
    assert!(!dir.path().join("previous.json").exists());
}

#[tokio::test]
async fn test_split_data_last_chunk_takes_remainder() {
    let dir = TempDir::new().unwrap();
    let exporter = Exporter::new(storage_in(&dir));
    let original: Vec<Record> = (0..7)
        .map(|i| records(json!([{"id": i}])).remove(0))
        .collect();

    exporter.split_data(&original, 3).await.unwrap();

    let sizes: Vec<usize> = (1..=3)
        .map(|i| load_json(dir.path().join(format!("split{}.json", i))).unwrap().len())
        .collect();
    assert_eq!(sizes, vec![2, 2, 3]);
}

#[tokio::test]
async fn test_split_by_size_respects_cap() {
    let dir = TempDir::new().unwrap();
    let exporter = Exporter::new(storage_in(&dir));
    let original: Vec<Record> = (0..20)
        .map(|i| records(json!([{"id": i, "comments": ["x".repeat(40)]}])).remove(0))
        .collect();

    let written = exporter.split_by_size(&original, 256).await.unwrap();
    assert!(written.len() > 1);

    let mut rebuilt = Vec::new();
    for path in &written {
        assert!(fs::metadata(path).unwrap().len() <= 256);
        rebuilt.extend(load_json(path).unwrap());
    }
    assert_eq!(rebuilt, original);
}
