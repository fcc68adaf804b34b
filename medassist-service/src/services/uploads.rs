//! Scoped temporary storage for uploaded prescription images.
//!
//! Files are named by a fresh UUID, so concurrent uploads that share a client
//! file name never overwrite each other.

use service_core::error::AppError;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

/// Longest extension carried over from the client's file name.
const MAX_EXTENSION_LEN: usize = 8;

#[derive(Debug, Clone)]
pub struct UploadStore {
    base_path: PathBuf,
}

impl UploadStore {
    pub async fn new(base_path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path).await?;
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Writes `data` under a generated name and returns its path.
    ///
    /// The directory is re-created if something removed it after startup.
    pub async fn save(&self, original_name: Option<&str>, data: &[u8]) -> Result<PathBuf, AppError> {
        fs::create_dir_all(&self.base_path).await?;

        let path = self
            .base_path
            .join(format!("{}.{}", Uuid::new_v4(), extension(original_name)));
        fs::write(&path, data).await?;

        Ok(path)
    }

    pub async fn remove(&self, path: &Path) -> Result<(), AppError> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn extension(original_name: Option<&str>) -> String {
    original_name
        .map(Path::new)
        .and_then(|name| name.extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| {
            !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_LEN
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_else(|| "bin".to_string())
}
