use crate::core::export::{ExportFormat, Exporter, SplitPolicy};
use crate::core::loader::{get_filepath_by_type, load_csv, load_json_stream};
use crate::core::merge::{filter_customer, merge, prepare_lookup};
use crate::core::transform::{flatten_comments, trim_comments};
use crate::core::{ConfigProvider, Pipeline, Record, Storage, TransformResult};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use std::path::{Path, PathBuf};

/// Single-customer comment report: stream the ticket export in chunks, join
/// each chunk against the customer lookup, then write the threaded and
/// flattened comment sets.
pub struct ReportPipeline<S: Storage, C: ConfigProvider> {
    pub(crate) exporter: Exporter<S>,
    pub(crate) config: C,
    monitor: SystemMonitor,
}

impl<S: Storage, C: ConfigProvider> ReportPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self::new_with_monitoring(storage, config, false)
    }

    pub fn new_with_monitoring(storage: S, config: C, monitor_enabled: bool) -> Self {
        Self {
            exporter: Exporter::new(storage),
            config,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    fn resolve_input(&self, explicit: Option<&str>, extension: &str) -> Result<PathBuf> {
        match explicit {
            Some(path) => Ok(PathBuf::from(path)),
            None => get_filepath_by_type(Path::new(self.config.input_dir()), extension, 0),
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ReportPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<Record>> {
        let json_path = self.resolve_input(self.config.json_file(), "json")?;
        let csv_path = self.resolve_input(self.config.csv_file(), "csv")?;
        tracing::info!("🎫 Tickets: {}", json_path.display());
        tracing::info!("👥 Lookup: {}", csv_path.display());

        let lookup = prepare_lookup(load_csv(&csv_path)?)?;
        tracing::debug!("Lookup holds {} customer rows", lookup.len());

        let customer = self.config.customer();
        if customer.is_empty() {
            tracing::info!("No customer filter, keeping every matched ticket");
        } else {
            tracing::info!("Filtering to customer '{}'", customer);
        }

        let mut kept = Vec::new();
        let mut seen = 0usize;
        for (index, chunk) in load_json_stream(&json_path, self.config.chunk_size())?.enumerate() {
            let chunk = chunk?;
            seen += chunk.len();

            let matched = filter_customer(merge(&chunk, &lookup), customer);
            tracing::debug!(
                "Chunk {}: {} tickets, {} kept",
                index + 1,
                chunk.len(),
                matched.len()
            );
            kept.extend(matched);
            self.monitor.log_stats(&format!("Chunk {}", index + 1));
        }

        tracing::info!("Read {} tickets, kept {}", seen, kept.len());
        Ok(kept)
    }

    async fn transform(&self, data: Vec<Record>) -> Result<TransformResult> {
        let threaded = trim_comments(&data, self.config.comment_field())?;
        let flattened = flatten_comments(&threaded)?;
        tracing::debug!(
            "{} tickets flattened into {} comment rows",
            threaded.len(),
            flattened.len()
        );

        Ok(TransformResult {
            threaded,
            flattened,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let format: ExportFormat = self.config.output_format().parse()?;
        let policy = SplitPolicy::from_settings(self.config.splits(), self.config.max_split_bytes());

        self.exporter.storage().clear().await?;

        let threaded = self
            .exporter
            .export_comments(&result.threaded, self.config.threaded_name(), format, policy)
            .await?;
        let flattened = self
            .exporter
            .export_comments(&result.flattened, self.config.flattened_name(), format, policy)
            .await?;

        for path in threaded.iter().chain(&flattened) {
            tracing::debug!("Wrote {}", path);
        }
        tracing::info!("Wrote {} output files", threaded.len() + flattened.len());

        Ok(self.config.output_dir().to_string())
    }
}
