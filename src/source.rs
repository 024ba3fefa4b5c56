//! Platform classification and content-id extraction.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Platform a link belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaSource {
    #[serde(rename = "YouTube")]
    YouTube,
    #[serde(rename = "X (Twitter)")]
    Twitter,
    #[serde(rename = "Instagram")]
    Instagram,
    #[serde(rename = "Unknown")]
    Unknown,
    #[serde(rename = "Direct Link")]
    DirectLink,
}

impl MediaSource {
    pub fn label(&self) -> &'static str {
        match self {
            MediaSource::YouTube => "YouTube",
            MediaSource::Twitter => "X (Twitter)",
            MediaSource::Instagram => "Instagram",
            MediaSource::Unknown => "Unknown",
            MediaSource::DirectLink => "Direct Link",
        }
    }

    /// Sources handled by the multi-provider resolver.
    pub fn uses_providers(&self) -> bool {
        matches!(self, MediaSource::YouTube | MediaSource::Instagram | MediaSource::Unknown)
    }
}

impl fmt::Display for MediaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// Matches x.com/user/status/12345 and the legacy twitter.com/#!/ form, query params allowed.
static TWITTER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:twitter\.com|x\.com)/(?:#!/)?\w+/status(?:es)?/(\d+)")
        .expect("twitter pattern is valid")
});

static YOUTUBE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:youtube\.com/(?:watch\?v=|shorts/)|youtu\.be/)([a-zA-Z0-9_-]{11})")
        .expect("youtube pattern is valid")
});

static INSTAGRAM_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"instagram\.com/(?:p|reel)/([a-zA-Z0-9_-]+)")
        .expect("instagram pattern is valid")
});

static VIDEO_FILE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\.(mp4|webm|mov)$").expect("video extension pattern is valid")
});

/// Classifies a raw URL. Never fails; anything unrecognized is a direct link.
pub fn determine_source(url: &str) -> MediaSource {
    let lower = url.to_lowercase();
    if lower.contains("youtube.com") || lower.contains("youtu.be") {
        MediaSource::YouTube
    } else if lower.contains("twitter.com") || lower.contains("x.com") {
        MediaSource::Twitter
    } else if lower.contains("instagram.com") {
        MediaSource::Instagram
    } else if lower.contains("tiktok.com") {
        MediaSource::Unknown
    } else {
        MediaSource::DirectLink
    }
}

/// Pulls the platform's canonical id out of `url`. `None` is an expected outcome.
pub fn extract_content_id(url: &str, source: MediaSource) -> Option<String> {
    let pattern: &Regex = match source {
        MediaSource::Twitter => &TWITTER_PATTERN,
        MediaSource::YouTube => &YOUTUBE_PATTERN,
        MediaSource::Instagram => &INSTAGRAM_PATTERN,
        MediaSource::Unknown | MediaSource::DirectLink => return None,
    };

    pattern
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// True when the URL path ends in a video file extension we can stream directly.
pub fn is_video_file(url: &str) -> bool {
    match url::Url::parse(url) {
        Ok(parsed) => VIDEO_FILE_PATTERN.is_match(parsed.path()),
        Err(_) => VIDEO_FILE_PATTERN.is_match(url),
    }
}
