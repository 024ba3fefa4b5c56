use reqwest::Client;
use serde::Deserialize;
use crate::errors::{AppError, Result};

#[derive(Debug, Deserialize)]
struct StatusResponse {
    tweet: Option<Tweet>,
}

#[derive(Debug, Deserialize)]
struct Tweet {
    text: Option<String>,
    media: Option<TweetMedia>,
}

#[derive(Debug, Deserialize, Default)]
struct TweetMedia {
    #[serde(default)]
    videos: Vec<MediaItem>,
    #[serde(default)]
    photos: Vec<MediaItem>,
}

#[derive(Debug, Deserialize)]
struct MediaItem {
    url: String,
}

/// Playable video found for a tweet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocialVideo {
    pub url: String,
    pub text: Option<String>,
    pub thumbnail: Option<String>,
}

/// Looks up tweets through an fxtwitter-compatible metadata API.
#[derive(Debug, Clone)]
pub struct SocialResolver {
    client: Client,
    api_base: String,
}

impl SocialResolver {
    pub fn new(client: Client, api_base: &str) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    /// Returns `None` whenever the tweet cannot be turned into a video; every
    /// failure is recoverable.
    pub async fn fetch_video(&self, tweet_id: &str) -> Option<SocialVideo> {
        match self.try_fetch(tweet_id).await {
            Ok(Some(video)) => {
                log::info!("✅ [X] Found video for tweet {}", tweet_id);
                Some(video)
            }
            Ok(None) => {
                log::info!("🔍 [X] Tweet {} has no video", tweet_id);
                None
            }
            Err(e) => {
                log::warn!("⚠️ [X] Lookup for tweet {} failed: {}", tweet_id, e);
                None
            }
        }
    }

    async fn try_fetch(&self, tweet_id: &str) -> Result<Option<SocialVideo>> {
        let url = format!("{}/status/{}", self.api_base, tweet_id);
        log::debug!("🌐 [X] GET {}", url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(AppError::Provider(format!("HTTP {}", response.status().as_u16())));
        }

        let body: StatusResponse = response.json().await?;
        let tweet = match body.tweet {
            Some(tweet) => tweet,
            None => return Ok(None),
        };
        let media = tweet.media.unwrap_or_default();

        // last entry is the highest quality encoding
        Ok(media.videos.last().map(|video| SocialVideo {
            url: video.url.clone(),
            text: tweet.text.clone(),
            thumbnail: media.photos.first().map(|photo| photo.url.clone()),
        }))
    }
}
