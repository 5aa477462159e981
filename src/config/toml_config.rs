use crate::config::{validate_report_config, DEFAULT_CHUNK_SIZE, DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_DIR};
use crate::core::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub output: OutputConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(default = "default_input_dir")]
    pub dir: String,
    pub json_file: Option<String>,
    pub csv_file: Option<String>,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub customer: String,
    #[serde(default = "default_comment_field")]
    pub comment_field: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: String,
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default)]
    pub splits: usize,
    pub max_split_bytes: Option<u64>,
    #[serde(default = "default_threaded_name")]
    pub threaded_name: String,
    #[serde(default = "default_flattened_name")]
    pub flattened_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_level: Option<String>,
}

fn default_input_dir() -> String {
    DEFAULT_INPUT_DIR.to_string()
}

fn default_output_dir() -> String {
    DEFAULT_OUTPUT_DIR.to_string()
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_comment_field() -> String {
    "body".to_string()
}

fn default_format() -> String {
    "json".to_string()
}

fn default_threaded_name() -> String {
    "threaded".to_string()
}

fn default_flattened_name() -> String {
    "flattened".to_string()
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            dir: default_input_dir(),
            json_file: None,
            csv_file: None,
            chunk_size: default_chunk_size(),
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            customer: String::new(),
            comment_field: default_comment_field(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            format: default_format(),
            splits: 0,
            max_split_bytes: None,
            threaded_name: default_threaded_name(),
            flattened_name: default_flattened_name(),
        }
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${CUSTOMER}); 未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn log_level(&self) -> Option<&str> {
        self.monitoring.as_ref().and_then(|m| m.log_level.as_deref())
    }
}

impl ConfigProvider for TomlConfig {
    fn input_dir(&self) -> &str {
        &self.input.dir
    }

    fn output_dir(&self) -> &str {
        &self.output.dir
    }

    fn json_file(&self) -> Option<&str> {
        self.input.json_file.as_deref()
    }

    fn csv_file(&self) -> Option<&str> {
        self.input.csv_file.as_deref()
    }

    fn customer(&self) -> &str {
        &self.filter.customer
    }

    fn chunk_size(&self) -> usize {
        self.input.chunk_size
    }

    fn splits(&self) -> usize {
        self.output.splits
    }

    fn max_split_bytes(&self) -> Option<u64> {
        self.output.max_split_bytes
    }

    fn output_format(&self) -> &str {
        &self.output.format
    }

    fn threaded_name(&self) -> &str {
        &self.output.threaded_name
    }

    fn flattened_name(&self) -> &str {
        &self.output.flattened_name
    }

    fn comment_field(&self) -> &str {
        &self.filter.comment_field
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_report_config(self)
    }
}
