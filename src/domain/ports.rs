use crate::domain::model::{Record, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Output side of the pipeline: a flat directory of named files.
pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Delete every file in the output directory. Sub-directories are an error.
    fn clear(&self) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Display path of a file in this storage.
    fn location(&self, path: &str) -> String;
}

pub trait ConfigProvider: Send + Sync {
    fn input_dir(&self) -> &str;
    fn output_dir(&self) -> &str;
    fn json_file(&self) -> Option<&str>;
    fn csv_file(&self) -> Option<&str>;
    fn customer(&self) -> &str;
    fn chunk_size(&self) -> usize;
    fn splits(&self) -> usize;
    fn max_split_bytes(&self) -> Option<u64>;
    fn output_format(&self) -> &str;
    fn threaded_name(&self) -> &str;
    fn flattened_name(&self) -> &str;
    fn comment_field(&self) -> &str;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<Record>>;
    async fn transform(&self, data: Vec<Record>) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
