use crate::downloader::{MediaFormat, ResolvedMedia};
use crate::errors::{AppError, Result};
use crate::utils;
use std::path::{Component, Path};
use url::Url;

const MAX_FILENAME_CHARS: usize = 200;

#[derive(Debug, Default)]
pub struct InputValidator;

impl InputValidator {
    pub fn new() -> Self {
        Self
    }

    /// Front-end check before a link enters the pipeline. Returns the trimmed URL.
    pub fn validate_url(&self, url: &str) -> Result<String> {
        let url = url.trim();
        if url.is_empty() {
            return Err(AppError::Validation("URL cannot be empty".to_string()));
        }

        let parsed = Url::parse(url)
            .map_err(|e| AppError::Validation(format!("Invalid URL: {}", e)))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AppError::Validation(format!(
                "Unsupported URL scheme: {}",
                parsed.scheme()
            )));
        }

        if parsed.host_str().is_none() {
            return Err(AppError::Validation("URL must have a host".to_string()));
        }

        Ok(url.to_string())
    }

    pub fn validate_download_path(&self, path: &Path) -> Result<()> {
        if path.as_os_str().is_empty() {
            return Err(AppError::Validation("Download path cannot be empty".to_string()));
        }

        if path.components().any(|component| matches!(component, Component::ParentDir)) {
            return Err(AppError::Validation("Path traversal detected".to_string()));
        }

        if path.to_string_lossy().contains('\0') {
            return Err(AppError::Validation("Null bytes not allowed in file path".to_string()));
        }

        if path.exists() && !path.is_dir() {
            return Err(AppError::Validation("Download path is not a directory".to_string()));
        }

        Ok(())
    }

    pub fn sanitize_filename(&self, filename: &str) -> Result<String> {
        let sanitized = utils::sanitize_filename(filename);

        // Remove leading/trailing dots and spaces
        let sanitized = sanitized.trim_matches(|c: char| c == '.' || c.is_whitespace());

        if sanitized.is_empty() {
            return Err(AppError::Validation("Filename becomes empty after sanitization".to_string()));
        }

        if sanitized.chars().count() > MAX_FILENAME_CHARS {
            Ok(sanitized.chars().take(MAX_FILENAME_CHARS).collect())
        } else {
            Ok(sanitized.to_string())
        }
    }

    /// Filename for a downloaded blob: the last path segment of the source URL
    /// (query and fragment dropped), else the title, else `unistream-<id>`. The
    /// format's extension is appended when the name has none.
    pub fn output_filename(&self, media: &ResolvedMedia, format: MediaFormat) -> String {
        let from_path = Url::parse(&media.original_url).ok().and_then(|parsed| {
            parsed
                .path_segments()
                .and_then(|mut segments| segments.next_back().map(|s| s.to_string()))
        });

        let name = from_path
            .iter()
            .chain(std::iter::once(&media.title))
            .find_map(|candidate| self.sanitize_filename(candidate).ok())
            .unwrap_or_else(|| format!("unistream-{}", media.id));

        let has_extension = Path::new(&name)
            .extension()
            .map(|ext| !ext.is_empty())
            .unwrap_or(false);

        if has_extension {
            name
        } else {
            format!("{}.{}", name, format)
        }
    }
}
