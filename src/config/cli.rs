use crate::core::Storage;
use crate::utils::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// 本機檔案系統：輸出寫到 `base_path` 之下
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    // 資料檔先照原路徑找，找不到才相對於 base_path
    fn resolve_input(&self, path: &str) -> PathBuf {
        let given = Path::new(path);
        if given.is_absolute() || given.exists() {
            given.to_path_buf()
        } else {
            Path::new(&self.base_path).join(path)
        }
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = self.resolve_input(path);
        tracing::debug!("Reading {}", full_path.display());
        let data = tokio::fs::read(full_path).await?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_creates_nested_directories() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("reports");
        let storage = LocalStorage::new(base.to_string_lossy().to_string());

        storage.write_file("pages/home.md", b"# Home").await.unwrap();

        let written = std::fs::read(base.join("pages/home.md")).unwrap();
        assert_eq!(written, b"# Home");
    }

    #[tokio::test]
    async fn test_read_falls_back_to_base_path() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("orders_fixture.csv"), b"order_id\n").unwrap();
        let storage = LocalStorage::new(temp_dir.path().to_string_lossy().to_string());

        let data = storage.read_file("orders_fixture.csv").await.unwrap();
        assert_eq!(data, b"order_id\n");
    }

    #[tokio::test]
    async fn test_read_missing_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().to_string_lossy().to_string());

        assert!(storage.read_file("does_not_exist.csv").await.is_err());
    }
}
