pub mod cli;
pub mod toml_config;

use crate::core::export::ExportFormat;
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation;
#[cfg(feature = "cli")]
use crate::utils::validation::Validate;
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

pub const DEFAULT_INPUT_DIR: &str = "data/parser_input";
pub const DEFAULT_OUTPUT_DIR: &str = "data/parser_output";
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "ticket-splitter")]
#[command(about = "Filter a ticket export to one customer and extract its comment threads")]
pub struct CliConfig {
    /// Directory holding the ticket export (.json) and customer lookup (.csv)
    #[arg(long, default_value = DEFAULT_INPUT_DIR)]
    pub input_dir: String,

    /// Directory that receives the report files; cleared on every run
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: String,

    /// Ticket export to read instead of the first .json in the input directory
    #[arg(long)]
    pub json_file: Option<String>,

    /// Customer lookup to read instead of the first .csv in the input directory
    #[arg(long)]
    pub csv_file: Option<String>,

    /// Keep only tickets of this customer; empty keeps all
    #[arg(long, default_value = "")]
    pub customer: String,

    /// Tickets read per chunk
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Split each output into this many JSON files (0 disables)
    #[arg(long, default_value = "0")]
    pub splits: usize,

    /// Split each output into JSON files of at most this many bytes
    #[arg(long)]
    pub max_split_bytes: Option<u64>,

    /// Output format for unsplit files: json or csv
    #[arg(long = "format", default_value = "json")]
    pub output_format: String,

    #[arg(long, default_value = "threaded")]
    pub threaded_name: String,

    #[arg(long, default_value = "flattened")]
    pub flattened_name: String,

    /// Comment field kept when trimming threads
    #[arg(long, default_value = "body")]
    pub comment_field: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log process CPU and memory per phase")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn input_dir(&self) -> &str {
        &self.input_dir
    }

    fn output_dir(&self) -> &str {
        &self.output_dir
    }

    fn json_file(&self) -> Option<&str> {
        self.json_file.as_deref()
    }

    fn csv_file(&self) -> Option<&str> {
        self.csv_file.as_deref()
    }

    fn customer(&self) -> &str {
        &self.customer
    }

    fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    fn splits(&self) -> usize {
        self.splits
    }

    fn max_split_bytes(&self) -> Option<u64> {
        self.max_split_bytes
    }

    fn output_format(&self) -> &str {
        &self.output_format
    }

    fn threaded_name(&self) -> &str {
        &self.threaded_name
    }

    fn flattened_name(&self) -> &str {
        &self.flattened_name
    }

    fn comment_field(&self) -> &str {
        &self.comment_field
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_report_config(self)
    }
}

/// Checks shared by every configuration source.
pub fn validate_report_config<C: ConfigProvider + ?Sized>(config: &C) -> Result<()> {
    validation::validate_path("input_dir", config.input_dir())?;
    validation::validate_path("output_dir", config.output_dir())?;
    if let Some(path) = config.json_file() {
        validation::validate_path("json_file", path)?;
    }
    if let Some(path) = config.csv_file() {
        validation::validate_path("csv_file", path)?;
        validation::validate_file_extension("csv_file", path, &["csv"])?;
    }
    validation::validate_positive_number("chunk_size", config.chunk_size(), 1)?;
    validation::validate_split_count("splits", config.splits())?;
    if let Some(bytes) = config.max_split_bytes() {
        validation::validate_positive_number("max_split_bytes", bytes as usize, 1)?;
    }
    validation::validate_non_empty_string("threaded_name", config.threaded_name())?;
    validation::validate_non_empty_string("flattened_name", config.flattened_name())?;
    validation::validate_non_empty_string("comment_field", config.comment_field())?;
    config.output_format().parse::<ExportFormat>()?;
    Ok(())
}
