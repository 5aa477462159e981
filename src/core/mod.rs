pub mod etl;
pub mod export;
pub mod loader;
pub mod merge;
pub mod pipeline;
pub mod transform;

pub use crate::domain::model::{Record, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
