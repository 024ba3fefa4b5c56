use std::time::Duration;
use futures_util::StreamExt;
use reqwest::{Client, ClientBuilder, Proxy};
use crate::config::AppConfig;
use crate::errors::Result;

/// Shared HTTP client for every outbound call of the pipeline
#[derive(Debug, Clone)]
pub struct HttpPool {
    client: Client,
}

impl HttpPool {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let mut builder = ClientBuilder::new()
            .pool_idle_timeout(Some(Duration::from_secs(30)))
            .connect_timeout(config.connect_timeout())
            .user_agent(config.user_agent.as_str())
            .gzip(true)
            .brotli(true)
            .tcp_keepalive(Duration::from_secs(60))
            .tcp_nodelay(true);

        if let Some(proxy_url) = &config.proxy {
            log::info!("🌐 [HTTP] Routing requests through proxy: {}", proxy_url);
            builder = builder.proxy(Proxy::all(proxy_url)?);
        } else if !config.use_system_proxy {
            builder = builder.no_proxy();
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    pub fn get_client(&self) -> &Client {
        &self.client
    }

    /// Streams the body of `url` into memory. The callback receives the running
    /// byte count and the declared length, when the server sent one.
    pub async fn download_with_progress<F>(
        &self,
        url: &str,
        mut progress_callback: F,
    ) -> Result<Vec<u8>>
    where
        F: FnMut(u64, Option<u64>),
    {
        let response = self.client.get(url).send().await?.error_for_status()?;

        let total_size = response.content_length().filter(|len| *len > 0);
        let mut downloaded = 0u64;
        let mut data = match total_size {
            Some(len) => Vec::with_capacity(len.min(64 * 1024 * 1024) as usize),
            None => Vec::new(),
        };
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            downloaded += chunk.len() as u64;
            data.extend_from_slice(&chunk);
            progress_callback(downloaded, total_size);
        }

        log::debug!("🌐 [HTTP] Received {} bytes from {}", downloaded, url);
        Ok(data)
    }
}
