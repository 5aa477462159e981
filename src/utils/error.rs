use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("No .{extension} file at index {index} in {}", dir.display())]
    MissingInputFile {
        dir: PathBuf,
        extension: String,
        index: usize,
    },

    #[error("Malformed JSON on line {line} of {}: {message}", path.display())]
    MalformedLine {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Record {record} has no '{field}' field")]
    MissingField { record: String, field: String },

    #[error("Unsupported export file type: {filetype}")]
    UnsupportedFileType { filetype: String },

    #[error("Split count must be greater than 1, got {splits}")]
    InvalidSplitCount { splits: usize },

    #[error("Output directory {} contains sub-directories", path.display())]
    OutputDirNotFlat { path: PathBuf },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Processing,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::UnsupportedFileType { .. }
            | EtlError::InvalidSplitCount { .. } => ErrorCategory::Configuration,
            EtlError::CsvError(_)
            | EtlError::MissingInputFile { .. }
            | EtlError::MalformedLine { .. } => ErrorCategory::Input,
            EtlError::IoError(_) | EtlError::OutputDirNotFlat { .. } => ErrorCategory::Output,
            EtlError::SerializationError(_)
            | EtlError::MissingField { .. }
            | EtlError::ProcessingError { .. } => ErrorCategory::Processing,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Output => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::MissingInputFile { .. } => {
                "Place the ticket export (.json) and customer lookup (.csv) in the input directory, or pass --json-file/--csv-file"
            }
            EtlError::MalformedLine { .. } => {
                "The ticket export must hold exactly one JSON object per line"
            }
            EtlError::CsvError(_) => "Check that the lookup file is a comma-separated file with a header row",
            EtlError::MissingField { .. } => {
                "Every ticket needs 'id' and 'comments', and every comment needs the configured comment field"
            }
            EtlError::UnsupportedFileType { .. } => "Use 'json' or 'csv' as the output format",
            EtlError::InvalidSplitCount { .. } => "Use 0 to disable splitting, or a split count of 2 or more",
            EtlError::OutputDirNotFlat { .. } => {
                "Remove sub-directories from the output directory before running"
            }
            EtlError::IoError(_) => "Check that the input and output directories exist and are writable",
            EtlError::ConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::ConfigValidationError { .. } => "Review the configuration values and try again",
            EtlError::SerializationError(_) | EtlError::ProcessingError { .. } => "Inspect the input data for unexpected shapes",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Input => format!("Could not read input: {}", self),
            ErrorCategory::Processing => format!("Could not process records: {}", self),
            ErrorCategory::Output => format!("Could not write output: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_count_is_configuration_error() {
        let err = EtlError::InvalidSplitCount { splits: 1 };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.to_string().contains("got 1"));
    }

    #[test]
    fn test_non_flat_output_is_critical() {
        let err = EtlError::OutputDirNotFlat {
            path: PathBuf::from("data/parser_output"),
        };
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.user_friendly_message().starts_with("Could not write output"));
    }
}
