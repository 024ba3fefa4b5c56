use super::blob::BlobStore;
use super::http_pool::HttpPool;
use super::{ProgressCallback, ProgressEvent, ResolvedMedia, UNKNOWN_DURATION};
use crate::source::MediaSource;
use crate::utils::{filename_from_url, format_progress_mb, format_size_mb, generate_media_id};

const FIRST_BYTE_PERCENT: u8 = 20;
const LAST_BYTE_PERCENT: u8 = 90;
/// Shown while the server did not announce a length.
const INDETERMINATE_PERCENT: u8 = 50;

/// Maps received/declared bytes into the 20..=90 band of the overall progress.
pub fn download_percent(received: u64, total: u64) -> u8 {
    if total == 0 {
        return INDETERMINATE_PERCENT;
    }
    let span = (LAST_BYTE_PERCENT - FIRST_BYTE_PERCENT) as f64;
    let percent = FIRST_BYTE_PERCENT as f64 + (received as f64 / total as f64 * span).round();
    percent.clamp(FIRST_BYTE_PERCENT as f64, LAST_BYTE_PERCENT as f64) as u8
}

/// Downloads raw media files into the session blob store.
#[derive(Debug, Clone)]
pub struct DirectLinkFetcher {
    http: HttpPool,
    blobs: BlobStore,
}

impl DirectLinkFetcher {
    pub fn new(http: HttpPool, blobs: BlobStore) -> Self {
        Self { http, blobs }
    }

    /// Best effort: any failure is logged and reported as `None` so the caller
    /// can move on.
    pub async fn fetch(&self, url: &str, on_progress: ProgressCallback<'_>) -> Option<ResolvedMedia> {
        on_progress(ProgressEvent::new("Checking file availability...", 10));
        log::info!("🚀 [DIRECT] Fetching {}", url);

        let data = match self
            .http
            .download_with_progress(url, |received, total| {
                let event = match total {
                    Some(total) => ProgressEvent::new(
                        format!("Downloading... {}", format_progress_mb(received)),
                        download_percent(received, total),
                    ),
                    None => ProgressEvent::new(
                        format!("Receiving data stream... {} downloaded", format_progress_mb(received)),
                        INDETERMINATE_PERCENT,
                    ),
                };
                on_progress(event);
            })
            .await
        {
            Ok(data) => data,
            Err(e) => {
                log::warn!("⚠️ [DIRECT] Direct download failed, passing through: {}", e);
                return None;
            }
        };

        let size = format_size_mb(data.len() as u64);
        log::info!("✅ [DIRECT] Received {} from {}", size, url);
        let reference = self.blobs.register(data).await;
        on_progress(ProgressEvent::new("Assembling file...", 100));

        Some(ResolvedMedia {
            id: generate_media_id(),
            url: reference,
            original_url: url.to_string(),
            title: filename_from_url(url).unwrap_or_else(|| "Untitled video".to_string()),
            source: MediaSource::DirectLink,
            size,
            duration: UNKNOWN_DURATION.to_string(),
            thumbnail: None,
            created_at: chrono::Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{test_config, MockResponse, MockServer};
    use std::sync::Mutex;

    fn fetcher() -> (DirectLinkFetcher, BlobStore) {
        let blobs = BlobStore::new();
        let http = HttpPool::new(&test_config()).unwrap();
        (DirectLinkFetcher::new(http, blobs.clone()), blobs)
    }

    #[test]
    fn percent_band() {
        assert_eq!(download_percent(0, 100), 20);
        assert_eq!(download_percent(50, 100), 55);
        assert_eq!(download_percent(100, 100), 90);
        assert_eq!(download_percent(500, 100), 90);
        assert_eq!(download_percent(10, 0), 50);
    }

    #[tokio::test]
    async fn downloads_into_blob_store() {
        let body = vec![0u8; 3 * 1024 * 1024 / 2];
        let server = MockServer::start(vec![(
            "/media/clip.mp4".to_string(),
            vec![MockResponse::bytes(200, body)],
        )])
        .await;
        let (fetcher, blobs) = fetcher();
        let events = Mutex::new(Vec::new());

        let media = fetcher
            .fetch(&server.url("/media/clip.mp4"), &|e: ProgressEvent| events.lock().unwrap().push(e))
            .await
            .unwrap();

        assert_eq!(media.size, "1.50 MB");
        assert_eq!(media.title, "clip.mp4");
        assert_eq!(media.source, MediaSource::DirectLink);
        assert_eq!(media.duration, "unknown");
        assert!(media.is_local());
        assert_eq!(blobs.get(&media.url).await.unwrap().len(), 1_572_864);

        let events = events.into_inner().unwrap();
        assert_eq!(events.first().unwrap().percent, 10);
        assert_eq!(events.last().unwrap().percent, 100);
        assert!(events.windows(2).all(|w| w[0].percent <= w[1].percent));
        assert!(events.iter().all(|e| e.percent <= 100));
        assert!(events.iter().any(|e| e.message.starts_with("Downloading...")));
    }

    #[tokio::test]
    async fn unknown_length_reports_fixed_percent() {
        let server = MockServer::start(vec![(
            "/live.webm".to_string(),
            vec![MockResponse::bytes(200, vec![1u8; 5000]).chunked()],
        )])
        .await;
        let (fetcher, _) = fetcher();
        let events = Mutex::new(Vec::new());

        let media = fetcher
            .fetch(&server.url("/live.webm"), &|e: ProgressEvent| events.lock().unwrap().push(e))
            .await
            .unwrap();
        assert_eq!(media.size, "0.00 MB");

        let events = events.into_inner().unwrap();
        let streaming: Vec<_> = events.iter().filter(|e| e.message.starts_with("Receiving data stream")).collect();
        assert!(!streaming.is_empty());
        assert!(streaming.iter().all(|e| e.percent == 50));
    }

    #[tokio::test]
    async fn http_errors_fall_through_silently() {
        let server = MockServer::start(vec![(
            "/missing.mp4".to_string(),
            vec![MockResponse::status(404)],
        )])
        .await;
        let (fetcher, blobs) = fetcher();
        assert!(fetcher.fetch(&server.url("/missing.mp4"), &|_: ProgressEvent| {}).await.is_none());
        assert_eq!(blobs.size().await, 0);
    }
}
