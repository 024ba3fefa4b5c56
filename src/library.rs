use std::sync::Arc;
use tokio::sync::Mutex;
use crate::downloader::blob::BlobStore;
use crate::downloader::ResolvedMedia;
use crate::errors::{AppError, Result};

/// In-memory list of everything resolved during this session, newest first.
#[derive(Debug, Clone)]
pub struct MediaLibrary {
    items: Arc<Mutex<Vec<ResolvedMedia>>>,
    blobs: BlobStore,
}

impl MediaLibrary {
    pub fn new(blobs: BlobStore) -> Self {
        Self {
            items: Arc::new(Mutex::new(Vec::new())),
            blobs,
        }
    }

    pub async fn add(&self, media: ResolvedMedia) {
        let mut items = self.items.lock().await;
        items.insert(0, media);
    }

    pub async fn list(&self) -> Vec<ResolvedMedia> {
        let items = self.items.lock().await;
        items.clone()
    }

    pub async fn get(&self, id: &str) -> Option<ResolvedMedia> {
        let items = self.items.lock().await;
        items.iter().find(|m| m.id == id).cloned()
    }

    /// Drops an entry and releases its downloaded bytes, if any.
    pub async fn remove(&self, id: &str) -> Result<ResolvedMedia> {
        let removed = {
            let mut items = self.items.lock().await;
            let index = items
                .iter()
                .position(|m| m.id == id)
                .ok_or_else(|| AppError::NotFound(format!("media {}", id)))?;
            items.remove(index)
        };

        if removed.is_local() {
            self.blobs.revoke(&removed.url).await;
        }
        log::info!("🗑️ [LIBRARY] Removed {} ({})", removed.title, removed.id);
        Ok(removed)
    }

    pub async fn len(&self) -> usize {
        let items = self.items.lock().await;
        items.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn clear(&self) {
        let drained: Vec<ResolvedMedia> = {
            let mut items = self.items.lock().await;
            items.drain(..).collect()
        };
        for media in drained.iter().filter(|m| m.is_local()) {
            self.blobs.revoke(&media.url).await;
        }
    }
}
