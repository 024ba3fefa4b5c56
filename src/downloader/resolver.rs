//! Single pass over the configured resolver providers, first success wins.

use std::sync::Arc;
use std::time::Duration;
use once_cell::sync::Lazy;
use regex::Regex;
use tokio_util::sync::CancellationToken;
use url::Url;
use super::http_pool::HttpPool;
use super::strategies::{CobaltProvider, Provider, ProviderPayload, ProviderStream};
use super::DownloadRequest;
use crate::config::AppConfig;
use crate::errors::{AppError, Result};

const ALL_BUSY: &str = "All resolution nodes are busy";

static SHORTS_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/shorts/([a-zA-Z0-9_-]+)").expect("shorts pattern is valid")
});

/// Rewrites YouTube watch and shorts links into their canonical form, dropping
/// tracking parameters. Anything else is returned untouched.
pub fn normalize_url(target: &str) -> String {
    let parsed = match Url::parse(target) {
        Ok(parsed) => parsed,
        Err(_) => return target.to_string(),
    };

    if parsed.path().contains("/shorts/") {
        return match SHORTS_PATH.captures(parsed.path()).and_then(|caps| caps.get(1)) {
            Some(id) => format!("https://www.youtube.com/shorts/{}", id.as_str()),
            None => target.to_string(),
        };
    }

    if let Some((_, video)) = parsed.query_pairs().find(|(key, _)| key == "v") {
        return format!("https://www.youtube.com/watch?v={}", video);
    }

    target.to_string()
}

pub struct MultiProviderResolver {
    providers: Vec<Arc<dyn Provider>>,
    timeout: Duration,
}

impl MultiProviderResolver {
    pub fn new(providers: Vec<Arc<dyn Provider>>, timeout: Duration) -> Self {
        Self { providers, timeout }
    }

    /// One cobalt provider per configured endpoint, in configured order.
    pub fn from_config(config: &AppConfig, http: &HttpPool) -> Result<Self> {
        let providers = config
            .providers
            .iter()
            .map(|endpoint| {
                CobaltProvider::new(http.get_client().clone(), endpoint)
                    .map(|provider| Arc::new(provider) as Arc<dyn Provider>)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::new(providers, config.provider_timeout()))
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    pub async fn resolve(
        &self,
        url: &str,
        request: &DownloadRequest,
        on_progress: &(dyn Fn(String) + Send + Sync),
    ) -> Result<ProviderStream> {
        let payload = ProviderPayload::new(normalize_url(url), request);
        log::debug!("🧹 [RESOLVER] Normalized {} -> {}", url, payload.url);

        let mut last_error: Option<AppError> = None;

        for provider in &self.providers {
            on_progress(format!("Requesting resolver: {}...", provider.name()));
            log::info!("🔗 [RESOLVER] Trying provider {}", provider.name());

            match self.attempt(provider.as_ref(), &payload).await {
                Ok(stream) => {
                    log::info!("✅ [RESOLVER] {} returned a stream", provider.name());
                    return Ok(stream);
                }
                Err(e) => {
                    log::warn!("⚠️ [RESOLVER] Provider {} failed: {}", provider.name(), e);
                    last_error = Some(e);
                }
            }
        }

        let reason = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| ALL_BUSY.to_string());
        log::error!("❌ [RESOLVER] All {} providers failed: {}", self.providers.len(), reason);
        Err(AppError::ProvidersExhausted(reason))
    }

    async fn attempt(&self, provider: &dyn Provider, payload: &ProviderPayload) -> Result<ProviderStream> {
        let cancel = CancellationToken::new();
        let deadline = {
            let cancel = cancel.clone();
            let timeout = self.timeout;
            tokio::spawn(async move {
                tokio::time::sleep(timeout).await;
                cancel.cancel();
            })
        };

        let outcome = provider.resolve(payload, &cancel).await;
        deadline.abort();

        match outcome {
            Err(AppError::Cancelled) => Err(AppError::Timeout(self.timeout)),
            other => other,
        }
    }
}
