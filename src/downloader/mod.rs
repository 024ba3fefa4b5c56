pub mod blob;
pub mod direct;
pub mod http_pool;
pub mod resolver;
pub mod strategies;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use crate::errors::AppError;
use crate::source::MediaSource;

/// Size marker for media that was linked rather than downloaded.
pub const STREAMING_MARKER: &str = "streaming";
/// Duration marker; no path inspects the media itself.
pub const UNKNOWN_DURATION: &str = "unknown";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MediaFormat {
    #[default]
    Mp4,
    Mp3,
}

impl MediaFormat {
    pub fn is_audio_only(&self) -> bool {
        matches!(self, MediaFormat::Mp3)
    }
}

impl fmt::Display for MediaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaFormat::Mp4 => f.write_str("mp4"),
            MediaFormat::Mp3 => f.write_str("mp3"),
        }
    }
}

impl FromStr for MediaFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mp4" => Ok(MediaFormat::Mp4),
            "mp3" => Ok(MediaFormat::Mp3),
            other => Err(AppError::Validation(format!("Unknown format: {} (expected mp4 or mp3)", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Quality {
    #[serde(rename = "1080p")]
    P1080,
    #[serde(rename = "720p")]
    P720,
    #[serde(rename = "480p")]
    P480,
    #[default]
    #[serde(rename = "best")]
    Best,
}

impl Quality {
    /// Value understood by the resolver providers: "max" or the bare line count.
    pub fn provider_value(&self) -> &'static str {
        match self {
            Quality::P1080 => "1080",
            Quality::P720 => "720",
            Quality::P480 => "480",
            Quality::Best => "max",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quality::P1080 => f.write_str("1080p"),
            Quality::P720 => f.write_str("720p"),
            Quality::P480 => f.write_str("480p"),
            Quality::Best => f.write_str("best"),
        }
    }
}

impl FromStr for Quality {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1080p" | "1080" => Ok(Quality::P1080),
            "720p" | "720" => Ok(Quality::P720),
            "480p" | "480" => Ok(Quality::P480),
            "best" | "max" => Ok(Quality::Best),
            other => Err(AppError::Validation(format!("Unknown quality: {} (expected 1080p, 720p, 480p or best)", other))),
        }
    }
}

/// Immutable input to the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: String,
    pub format: MediaFormat,
    pub quality: Quality,
}

impl DownloadRequest {
    pub fn new(url: impl Into<String>, format: MediaFormat, quality: Quality) -> Self {
        Self {
            url: url.into(),
            format,
            quality,
        }
    }
}

/// A successfully resolved link. Created once, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedMedia {
    pub id: String,
    /// Blob reference for direct downloads, external stream URL otherwise.
    pub url: String,
    pub original_url: String,
    pub title: String,
    pub source: MediaSource,
    pub size: String,
    pub duration: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl ResolvedMedia {
    pub fn is_local(&self) -> bool {
        blob::is_blob_reference(&self.url)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProgressEvent {
    pub message: String,
    pub percent: u8,
}

impl ProgressEvent {
    pub fn new(message: impl Into<String>, percent: u8) -> Self {
        Self {
            message: message.into(),
            percent: percent.min(100),
        }
    }
}

/// Progress sink handed to every pipeline stage. Must not block.
pub type ProgressCallback<'a> = &'a (dyn Fn(ProgressEvent) + Send + Sync);

/// Coarse state shown next to the progress bar.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DownloadStatus {
    Idle,
    Resolving,
    FetchingInfo,
    Downloading,
    Processing,
    Completed,
    Error,
}

impl DownloadStatus {
    pub fn from_progress(percent: u8) -> Self {
        if percent > 90 {
            DownloadStatus::Processing
        } else if percent > 40 {
            DownloadStatus::Downloading
        } else if percent > 20 {
            DownloadStatus::FetchingInfo
        } else {
            DownloadStatus::Resolving
        }
    }

    pub fn is_busy(&self) -> bool {
        !matches!(self, DownloadStatus::Idle | DownloadStatus::Completed | DownloadStatus::Error)
    }
}
