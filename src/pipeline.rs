//! Turns a link into a [`ResolvedMedia`] by dispatching on its platform.

use crate::config::AppConfig;
use crate::downloader::blob::BlobStore;
use crate::downloader::direct::DirectLinkFetcher;
use crate::downloader::http_pool::HttpPool;
use crate::downloader::resolver::MultiProviderResolver;
use crate::downloader::{
    DownloadRequest, ProgressCallback, ProgressEvent, ResolvedMedia, STREAMING_MARKER, UNKNOWN_DURATION,
};
use crate::errors::{AppError, Result};
use crate::metadata::SocialResolver;
use crate::source::{determine_source, extract_content_id, is_video_file, MediaSource};
use crate::utils::{generate_media_id, truncate_title};

/// Progress reported for every provider attempt.
const PROVIDER_PERCENT: u8 = 40;

pub struct Pipeline {
    direct: DirectLinkFetcher,
    social: SocialResolver,
    resolver: MultiProviderResolver,
    blobs: BlobStore,
    thumbnail_base: String,
}

impl Pipeline {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let http = HttpPool::new(config)?;
        let resolver = MultiProviderResolver::from_config(config, &http)?;
        Ok(Self::with_resolver(config, http, resolver))
    }

    /// Builds a pipeline around an existing resolver, e.g. one with custom providers.
    pub fn with_resolver(config: &AppConfig, http: HttpPool, resolver: MultiProviderResolver) -> Self {
        let blobs = BlobStore::new();
        Self {
            direct: DirectLinkFetcher::new(http.clone(), blobs.clone()),
            social: SocialResolver::new(http.get_client().clone(), &config.social_api_base),
            resolver,
            blobs,
            thumbnail_base: config.thumbnail_base.trim_end_matches('/').to_string(),
        }
    }

    /// Store holding the bytes behind `blob:` references this pipeline hands out.
    pub fn blobs(&self) -> &BlobStore {
        &self.blobs
    }

    /// Resolves one request. Only "unsupported link format" and "cannot resolve"
    /// failures reach the caller; everything else is handled on the way.
    pub async fn process_download(
        &self,
        request: &DownloadRequest,
        on_progress: ProgressCallback<'_>,
    ) -> Result<ResolvedMedia> {
        on_progress(ProgressEvent::new("Initializing connection...", 5));

        let source = determine_source(&request.url);
        let content_id = extract_content_id(&request.url, source);
        log::info!(
            "🔍 [PIPELINE] {} classified as {} (content id: {})",
            request.url,
            source,
            content_id.as_deref().unwrap_or("none")
        );

        let media = self.dispatch(request, source, content_id.as_deref(), on_progress).await?;

        on_progress(ProgressEvent::new("Completed", 100));
        log::info!("🎉 [PIPELINE] Resolved {} -> {}", request.url, media.url);
        Ok(media)
    }

    async fn dispatch(
        &self,
        request: &DownloadRequest,
        source: MediaSource,
        content_id: Option<&str>,
        on_progress: ProgressCallback<'_>,
    ) -> Result<ResolvedMedia> {
        if source == MediaSource::DirectLink && is_video_file(&request.url) {
            if let Some(media) = self.direct.fetch(&request.url, on_progress).await {
                return Ok(media);
            }
            log::warn!("⚠️ [PIPELINE] Direct download failed, passing through as link");
        }

        if source == MediaSource::Twitter {
            if let Some(tweet_id) = content_id {
                on_progress(ProgressEvent::new("Connecting to X (Twitter)...", 20));

                if let Some(video) = self.social.fetch_video(tweet_id).await {
                    on_progress(ProgressEvent::new("Resolved!", 100));
                    return Ok(ResolvedMedia {
                        id: generate_media_id(),
                        url: video.url,
                        original_url: request.url.clone(),
                        title: video
                            .text
                            .as_deref()
                            .map(truncate_title)
                            .unwrap_or_else(|| format!("X video {}", tweet_id)),
                        source,
                        size: STREAMING_MARKER.to_string(),
                        duration: UNKNOWN_DURATION.to_string(),
                        thumbnail: video.thumbnail,
                        created_at: chrono::Utc::now(),
                    });
                }
            }
        }

        if source.uses_providers() {
            on_progress(ProgressEvent::new("Initializing resolver engine...", 10));

            let report = |message: String| on_progress(ProgressEvent::new(message, PROVIDER_PERCENT));
            return match self.resolver.resolve(&request.url, request, &report).await {
                Ok(stream) => {
                    on_progress(ProgressEvent::new("Resolved! Preparing download...", 90));
                    let created_at = chrono::Utc::now();
                    let title = stream.filename.clone().unwrap_or_else(|| match content_id {
                        Some(id) => format!("Video {}", id),
                        None => format!("Video {}", created_at.timestamp_millis()),
                    });
                    let thumbnail = match (source, content_id) {
                        (MediaSource::YouTube, Some(id)) => {
                            Some(format!("{}/{}/mqdefault.jpg", self.thumbnail_base, id))
                        }
                        _ => None,
                    };

                    Ok(ResolvedMedia {
                        id: generate_media_id(),
                        url: stream.url,
                        original_url: request.url.clone(),
                        title,
                        source,
                        size: STREAMING_MARKER.to_string(),
                        duration: UNKNOWN_DURATION.to_string(),
                        thumbnail,
                        created_at,
                    })
                }
                Err(e) => {
                    log::error!("❌ [PIPELINE] Resolver failed for {}: {}", request.url, e);
                    Err(AppError::CannotResolve)
                }
            };
        }

        Err(AppError::UnsupportedFormat)
    }
}
