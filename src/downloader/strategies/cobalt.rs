use reqwest::header::ACCEPT;
use reqwest::Client;
use tokio_util::sync::CancellationToken;
use url::Url;
use super::{Provider, ProviderPayload, ProviderResponse, ProviderStream};
use crate::errors::{AppError, Result};

/// One cobalt-compatible resolver instance.
#[derive(Debug, Clone)]
pub struct CobaltProvider {
    client: Client,
    endpoint: String,
    host: String,
}

impl CobaltProvider {
    pub fn new(client: Client, endpoint: &str) -> Result<Self> {
        let host = Url::parse(endpoint)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_string()))
            .ok_or_else(|| AppError::Validation(format!("Provider endpoint '{}' has no host", endpoint)))?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            host,
        })
    }

    async fn request(&self, payload: &ProviderPayload) -> Result<ProviderStream> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(ACCEPT, "application/json")
            .json(payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::Provider(format!("HTTP {}", response.status().as_u16())));
        }

        let body: ProviderResponse = response.json().await?;
        interpret_response(body, &self.host)
    }
}

#[async_trait::async_trait]
impl Provider for CobaltProvider {
    fn name(&self) -> &str {
        &self.host
    }

    async fn resolve(&self, payload: &ProviderPayload, cancel: &CancellationToken) -> Result<ProviderStream> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(AppError::Cancelled),
            result = self.request(payload) => result,
        }
    }
}

/// Maps a provider reply onto a stream or a failure reason.
pub fn interpret_response(body: ProviderResponse, provider: &str) -> Result<ProviderStream> {
    if body.status == "picker" {
        if let Some(item) = body.picker.as_ref().and_then(|items| items.iter().find(|p| p.kind == "video")) {
            return Ok(ProviderStream {
                url: item.url.clone(),
                filename: body.filename.clone(),
                provider: provider.to_string(),
            });
        }
    }

    if body.status == "stream" || body.status == "redirect" {
        if let Some(url) = body.url.filter(|u| !u.is_empty()) {
            return Ok(ProviderStream {
                url,
                filename: body.filename,
                provider: provider.to_string(),
            });
        }
    }

    if body.status == "error" {
        return Err(AppError::Provider(
            body.text.unwrap_or_else(|| "Server returned error status".to_string()),
        ));
    }

    Err(AppError::Provider("Invalid response format".to_string()))
}
