use crate::domain::model::Record;
use crate::utils::error::{EtlError, Result};
use serde_json::{Map, Number, Value};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

fn parse_line(path: &Path, line_number: usize, line: &str) -> Result<Record> {
    match serde_json::from_str::<Value>(line) {
        Ok(Value::Object(data)) => Ok(Record { data }),
        Ok(other) => Err(EtlError::MalformedLine {
            path: path.to_path_buf(),
            line: line_number,
            message: format!("expected a JSON object, found {}", json_kind(&other)),
        }),
        Err(e) => Err(EtlError::MalformedLine {
            path: path.to_path_buf(),
            line: line_number,
            message: e.to_string(),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Read a whole line-delimited JSON file into memory.
pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Vec<Record>> {
    let path = path.as_ref();
    let mut records = Vec::new();
    for chunk in load_json_stream(path, usize::MAX)? {
        records.extend(chunk?);
    }
    tracing::debug!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Open a line-delimited JSON file as a forward-only sequence of chunks.
pub fn load_json_stream<P: AsRef<Path>>(path: P, chunk_size: usize) -> Result<JsonChunks> {
    if chunk_size == 0 {
        return Err(EtlError::InvalidConfigValueError {
            field: "chunk_size".to_string(),
            value: chunk_size.to_string(),
            reason: "Chunk size must be at least 1".to_string(),
        });
    }

    let path = path.as_ref().to_path_buf();
    let file = File::open(&path)?;
    Ok(JsonChunks {
        lines: Some(BufReader::new(file).lines()),
        path,
        chunk_size,
        line_number: 0,
    })
}

/// Chunks of at most `chunk_size` records, in file order. The file handle is
/// released once the last line has been read, or when the iterator is dropped.
pub struct JsonChunks {
    lines: Option<Lines<BufReader<File>>>,
    path: PathBuf,
    chunk_size: usize,
    line_number: usize,
}

impl Iterator for JsonChunks {
    type Item = Result<Vec<Record>>;

    fn next(&mut self) -> Option<Self::Item> {
        let lines = self.lines.as_mut()?;
        let mut chunk = Vec::new();

        while chunk.len() < self.chunk_size {
            let line = match lines.next() {
                Some(Ok(line)) => line,
                Some(Err(e)) => {
                    self.lines = None;
                    return Some(Err(e.into()));
                }
                None => {
                    self.lines = None;
                    break;
                }
            };
            self.line_number += 1;

            if line.trim().is_empty() {
                continue;
            }

            match parse_line(&self.path, self.line_number, &line) {
                Ok(record) => chunk.push(record),
                Err(e) => {
                    self.lines = None;
                    return Some(Err(e));
                }
            }
        }

        if chunk.is_empty() {
            None
        } else {
            Some(Ok(chunk))
        }
    }
}

fn infer_cell(cell: &str) -> Value {
    if cell.is_empty() {
        return Value::Null;
    }
    if let Ok(int) = cell.parse::<i64>() {
        return Value::Number(int.into());
    }
    if let Some(number) = cell.parse::<f64>().ok().and_then(Number::from_f64) {
        return Value::Number(number);
    }
    Value::String(cell.to_string())
}

/// Read a headed comma-separated file. Cells become numbers where they parse as
/// one, empty cells become null.
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Record>> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;
    let headers = reader.headers()?.clone();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let mut data = Map::new();
        for (header, cell) in headers.iter().zip(row.iter()) {
            data.insert(header.to_string(), infer_cell(cell));
        }
        records.push(Record { data });
    }

    tracing::debug!("Loaded {} lookup rows from {}", records.len(), path.display());
    Ok(records)
}

fn extension_of(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

/// The `index`-th file in `dir` whose extension is `extension`, by file name.
pub fn get_filepath_by_type<P: AsRef<Path>>(dir: P, extension: &str, index: usize) -> Result<PathBuf> {
    let dir = dir.as_ref();
    let mut matches = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if extension_of(&name) == extension {
            matches.push(entry.path());
        }
    }
    matches.sort();

    matches
        .into_iter()
        .nth(index)
        .ok_or_else(|| EtlError::MissingInputFile {
            dir: dir.to_path_buf(),
            extension: extension.to_string(),
            index,
        })
}
