use crate::core::transform::{select_columns, COMMENTS_FIELD};
use crate::domain::model::{columns, Record};
use crate::domain::ports::Storage;
use crate::utils::error::{EtlError, Result};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// One JSON object per line, non-ASCII left unescaped.
    Json,
    /// Comma-separated with a leading positional index column.
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn render(&self, records: &[Record]) -> Result<Vec<u8>> {
        match self {
            ExportFormat::Json => to_jsonl(records),
            ExportFormat::Csv => to_csv(records),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = EtlError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(EtlError::UnsupportedFileType {
                filetype: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// How `export_comments` spreads a record set over files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitPolicy {
    Single,
    Even(usize),
    MaxBytes(u64),
}

impl SplitPolicy {
    pub fn from_settings(splits: usize, max_split_bytes: Option<u64>) -> Self {
        match (splits, max_split_bytes) {
            (0, None) => SplitPolicy::Single,
            (0, Some(bytes)) => SplitPolicy::MaxBytes(bytes),
            (n, _) => SplitPolicy::Even(n),
        }
    }
}

pub fn to_jsonl(records: &[Record]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for record in records {
        serde_json::to_writer(&mut out, record)?;
        out.push(b'\n');
    }
    Ok(out)
}

fn csv_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

pub fn to_csv(records: &[Record]) -> Result<Vec<u8>> {
    let header = columns(records);
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(std::iter::once("").chain(header.iter().map(String::as_str)))?;
    for (index, record) in records.iter().enumerate() {
        let row = std::iter::once(index.to_string())
            .chain(header.iter().map(|column| csv_cell(record.get(column))));
        writer.write_record(row)?;
    }

    writer
        .into_inner()
        .map_err(|e| EtlError::IoError(e.into_error()))
}

/// Contiguous chunks: `n - 1` chunks of `len / n` records, the last one takes
/// the rest.
pub fn even_chunks(records: &[Record], n: usize) -> Result<Vec<&[Record]>> {
    if n <= 1 {
        return Err(EtlError::InvalidSplitCount { splits: n });
    }

    let split_length = records.len() / n;
    let mut chunks = Vec::with_capacity(n);
    for i in 0..n - 1 {
        chunks.push(&records[i * split_length..(i + 1) * split_length]);
    }
    chunks.push(&records[(n - 1) * split_length..]);
    Ok(chunks)
}

/// Contiguous chunks whose JSONL size stays within `max_bytes`. A record larger
/// than the cap gets a chunk to itself.
pub fn size_capped_chunks(records: &[Record], max_bytes: u64) -> Result<Vec<&[Record]>> {
    if max_bytes == 0 {
        return Err(EtlError::InvalidConfigValueError {
            field: "max_split_bytes".to_string(),
            value: max_bytes.to_string(),
            reason: "Byte cap must be at least 1".to_string(),
        });
    }

    let mut chunks = Vec::new();
    let mut start = 0;
    let mut size = 0u64;
    for (i, record) in records.iter().enumerate() {
        let line = serde_json::to_vec(record)?.len() as u64 + 1;
        if i > start && size + line > max_bytes {
            chunks.push(&records[start..i]);
            start = i;
            size = 0;
        }
        size += line;
    }
    if start < records.len() {
        chunks.push(&records[start..]);
    }
    Ok(chunks)
}

pub struct Exporter<S: Storage> {
    storage: S,
}

impl<S: Storage> Exporter<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Write the whole record set to `<name>.<ext>`.
    pub async fn export(&self, records: &[Record], name: &str, format: ExportFormat) -> Result<String> {
        let file_name = format!("{}.{}", name, format.extension());
        let data = format.render(records)?;

        tracing::debug!("Writing {} records to {}", records.len(), file_name);
        self.storage.write_file(&file_name, &data).await?;
        Ok(self.storage.location(&file_name))
    }

    /// Clear the output directory, then write `split1.json` .. `split<n>.json`.
    pub async fn split_data(&self, records: &[Record], n: usize) -> Result<Vec<String>> {
        let chunks = even_chunks(records, n)?;
        self.storage.clear().await?;
        self.write_chunks(&chunks, "split").await
    }

    /// Clear the output directory, then write `split<i>.json` files of at most
    /// `max_bytes` each.
    pub async fn split_by_size(&self, records: &[Record], max_bytes: u64) -> Result<Vec<String>> {
        let chunks = size_capped_chunks(records, max_bytes)?;
        self.storage.clear().await?;
        self.write_chunks(&chunks, "split").await
    }

    async fn write_chunks(&self, chunks: &[&[Record]], prefix: &str) -> Result<Vec<String>> {
        let mut written = Vec::with_capacity(chunks.len());
        for (i, chunk) in chunks.iter().enumerate() {
            let file_name = format!("{}{}.json", prefix, i + 1);
            self.storage.write_file(&file_name, &to_jsonl(chunk)?).await?;
            tracing::debug!("Wrote {} records to {}", chunk.len(), file_name);
            written.push(self.storage.location(&file_name));
        }
        Ok(written)
    }

    /// Write the `id` and `comments` columns. Split output is always JSONL and
    /// named `<target>_split<i>.json`; the output directory is not cleared here.
    pub async fn export_comments(
        &self,
        records: &[Record],
        target: &str,
        format: ExportFormat,
        policy: SplitPolicy,
    ) -> Result<Vec<String>> {
        let selected = select_columns(records, &["id", COMMENTS_FIELD]);
        let prefix = format!("{}_split", target);

        match policy {
            SplitPolicy::Single => Ok(vec![self.export(&selected, target, format).await?]),
            SplitPolicy::Even(n) => {
                let chunks = even_chunks(&selected, n)?;
                self.write_chunks(&chunks, &prefix).await
            }
            SplitPolicy::MaxBytes(max_bytes) => {
                let chunks = size_capped_chunks(&selected, max_bytes)?;
                self.write_chunks(&chunks, &prefix).await
            }
        }
    }
}
