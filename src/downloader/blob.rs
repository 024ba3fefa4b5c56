use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use crate::errors::{AppError, Result};

const BLOB_PREFIX: &str = "blob:unistream/";

pub fn is_blob_reference(url: &str) -> bool {
    url.starts_with(BLOB_PREFIX)
}

/// Bytes held for one direct download
#[derive(Debug, Clone)]
pub struct BlobEntry {
    pub data: Arc<Vec<u8>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl BlobEntry {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Session-scoped store for downloaded media. References are only valid
/// for the lifetime of the process.
#[derive(Debug, Clone, Default)]
pub struct BlobStore {
    blobs: Arc<RwLock<HashMap<String, BlobEntry>>>,
}

impl BlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `data` and returns a fresh `blob:` reference to it.
    pub async fn register(&self, data: Vec<u8>) -> String {
        let reference = format!("{}{}", BLOB_PREFIX, uuid::Uuid::new_v4());
        let entry = BlobEntry {
            data: Arc::new(data),
            created_at: chrono::Utc::now(),
        };
        let mut blobs = self.blobs.write().await;
        blobs.insert(reference.clone(), entry);
        reference
    }

    pub async fn get(&self, reference: &str) -> Option<BlobEntry> {
        let blobs = self.blobs.read().await;
        blobs.get(reference).cloned()
    }

    /// Releases a reference. Returns false if it was unknown.
    pub async fn revoke(&self, reference: &str) -> bool {
        let mut blobs = self.blobs.write().await;
        blobs.remove(reference).is_some()
    }

    pub async fn size(&self) -> usize {
        let blobs = self.blobs.read().await;
        blobs.len()
    }

    pub async fn total_bytes(&self) -> u64 {
        let blobs = self.blobs.read().await;
        blobs.values().map(|entry| entry.len() as u64).sum()
    }

    /// Writes a blob to `path`, returning the number of bytes written.
    pub async fn persist(&self, reference: &str, path: &Path) -> Result<u64> {
        let entry = self
            .get(reference)
            .await
            .ok_or_else(|| AppError::NotFound(format!("blob {}", reference)))?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        tokio::fs::write(path, entry.data.as_slice()).await?;
        log::info!("💾 [BLOB] Wrote {} bytes to {:?}", entry.len(), path);
        Ok(entry.len() as u64)
    }
}
