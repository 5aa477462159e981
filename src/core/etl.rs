use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting report run");

        tracing::info!("Extracting tickets...");
        let raw_data = self.pipeline.extract().await?;
        tracing::info!("Extracted {} tickets", raw_data.len());
        self.monitor.log_stats("Extract");

        tracing::info!("Transforming comments...");
        let transformed = self.pipeline.transform(raw_data).await?;
        tracing::info!(
            "Transformed {} tickets into {} comment rows",
            transformed.threaded.len(),
            transformed.flattened.len()
        );
        self.monitor.log_stats("Transform");

        tracing::info!("Writing output...");
        let output_path = self.pipeline.load(transformed).await?;
        tracing::info!("Output saved to: {}", output_path);
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        Ok(output_path)
    }
}
