//! Resolves links from video platforms, tweets and raw file URLs into playable media.

pub mod config;
pub mod downloader;
pub mod errors;
pub mod library;
pub mod metadata;
pub mod pipeline;
pub mod security;
pub mod source;
pub mod utils;

#[cfg(test)]
mod test_support;

pub use crate::config::AppConfig;
pub use crate::downloader::{DownloadRequest, DownloadStatus, MediaFormat, ProgressEvent, Quality, ResolvedMedia};
pub use crate::errors::{AppError, Result};
pub use crate::library::MediaLibrary;
pub use crate::pipeline::Pipeline;
pub use crate::source::MediaSource;
