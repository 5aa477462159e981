use crate::utils::error::{EtlError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

/// 0 關閉切分，其餘必須至少切成兩份
pub fn validate_split_count(field_name: &str, splits: usize) -> Result<()> {
    if splits == 1 {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: splits.to_string(),
            reason: "Use 0 to disable splitting or at least 2 splits".to_string(),
        });
    }
    Ok(())
}

pub fn validate_file_extension(field_name: &str, file: &str, allowed_extensions: &[&str]) -> Result<()> {
    match std::path::Path::new(file)
        .extension()
        .and_then(|ext| ext.to_str())
    {
        Some(extension) if allowed_extensions.contains(&extension) => Ok(()),
        Some(extension) => Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: file.to_string(),
            reason: format!(
                "Unsupported file extension: {}. Allowed extensions: {}",
                extension,
                allowed_extensions.join(", ")
            ),
        }),
        None => Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: file.to_string(),
            reason: "File has no extension or invalid filename".to_string(),
        }),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("input_dir", "data/parser_input").is_ok());
        assert!(validate_path("input_dir", "").is_err());
        assert!(validate_path("input_dir", "bad\0path").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("chunk_size", 5, 1).is_ok());
        assert!(validate_positive_number("chunk_size", 0, 1).is_err());
    }

    #[test]
    fn test_validate_split_count() {
        assert!(validate_split_count("splits", 0).is_ok());
        assert!(validate_split_count("splits", 1).is_err());
        assert!(validate_split_count("splits", 4).is_ok());
    }

    #[test]
    fn test_validate_file_extension() {
        assert!(validate_file_extension("json_file", "tickets.json", &["json"]).is_ok());
        assert!(validate_file_extension("csv_file", "lookup.txt", &["csv"]).is_err());
        assert!(validate_file_extension("csv_file", "lookup", &["csv"]).is_err());
    }
}
