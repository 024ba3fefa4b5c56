pub mod cobalt;

pub use cobalt::CobaltProvider;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use crate::downloader::DownloadRequest;
use crate::errors::Result;

/// Request body sent to every resolver provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderPayload {
    pub url: String,
    pub video_quality: String,
    pub youtube_video_codec: String,
    pub filename_style: String,
    /// Some origins refuse direct redirects, so the provider must relay the bytes.
    pub always_proxy: bool,
    pub is_audio_only: bool,
}

impl ProviderPayload {
    pub fn new(normalized_url: String, request: &DownloadRequest) -> Self {
        Self {
            url: normalized_url,
            video_quality: request.quality.provider_value().to_string(),
            youtube_video_codec: "h264".to_string(),
            filename_style: "basic".to_string(),
            always_proxy: true,
            is_audio_only: request.format.is_audio_only(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PickerItem {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub url: String,
}

/// Raw provider reply; only `status` is always present.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ProviderResponse {
    #[serde(default)]
    pub status: String,
    pub url: Option<String>,
    pub picker: Option<Vec<PickerItem>>,
    pub text: Option<String>,
    pub filename: Option<String>,
}

/// A usable stream returned by a provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderStream {
    pub url: String,
    pub filename: Option<String>,
    pub provider: String,
}

#[async_trait::async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    /// Resolves the payload to a stream. Must stop and fail promptly once
    /// `cancel` fires.
    async fn resolve(&self, payload: &ProviderPayload, cancel: &CancellationToken) -> Result<ProviderStream>;
}
