use crate::core::Storage;
use crate::utils::error::{EtlError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Output directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }

    fn full_path(&self, path: &str) -> PathBuf {
        Path::new(&self.base_path).join(path)
    }
}

impl Storage for LocalStorage {
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.full_path(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let base = Path::new(&self.base_path);
        if !base.exists() {
            fs::create_dir_all(base)?;
            return Ok(());
        }

        // 先確認沒有子目錄，避免刪到一半才失敗
        let mut files = Vec::new();
        for entry in fs::read_dir(base)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                return Err(EtlError::OutputDirNotFlat {
                    path: base.to_path_buf(),
                });
            }
            files.push(entry.path());
        }

        for file in &files {
            fs::remove_file(file)?;
        }
        tracing::debug!("Cleared {} files from {}", files.len(), self.base_path);
        Ok(())
    }

    fn location(&self, path: &str) -> String {
        self.full_path(path).to_string_lossy().into_owned()
    }
}
