use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

use unistream::config::AppConfig;
use unistream::downloader::{DownloadRequest, DownloadStatus, MediaFormat, ProgressEvent, Quality, ResolvedMedia};
use unistream::library::MediaLibrary;
use unistream::pipeline::Pipeline;
use unistream::security::InputValidator;
use unistream::utils::format_size_mb;

#[derive(Debug, Parser)]
#[command(name = "unistream")]
#[command(about = "Resolve video links into playable streams or local files", long_about = None)]
pub struct Cli {
    /// Log at debug level.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Resolve one or more links, in order.
    Resolve {
        #[arg(required = true)]
        urls: Vec<String>,

        /// mp4 or mp3
        #[arg(long)]
        format: Option<MediaFormat>,

        /// 1080p, 720p, 480p or best
        #[arg(long)]
        quality: Option<Quality>,

        /// Write direct downloads into the configured save directory.
        #[arg(long)]
        save: bool,

        /// Write direct downloads into this directory instead.
        #[arg(long)]
        save_dir: Option<PathBuf>,

        /// Print records as JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Show the resolver providers in the order they are tried.
    Providers,

    /// Print the effective configuration.
    Config {
        /// Write the effective configuration to the user config file.
        #[arg(long)]
        init: bool,
    },
}

pub async fn run(cli: Cli, config: AppConfig) -> Result<()> {
    match cli.command {
        Commands::Resolve { urls, format, quality, save, save_dir, json } => {
            let format = format.unwrap_or(config.default_format);
            let quality = quality.unwrap_or(config.default_quality);
            let target = output_dir(&config, save, save_dir);
            resolve_links(&config, &urls, format, quality, target.as_deref(), json).await
        }
        Commands::Providers => list_providers(&config),
        Commands::Config { init } => show_config(&config, init),
    }
}

/// `--save-dir` wins; `--save` alone falls back to the configured directory.
fn output_dir(config: &AppConfig, save: bool, save_dir: Option<PathBuf>) -> Option<PathBuf> {
    match save_dir {
        Some(dir) => Some(dir),
        None if save => Some(config.save_dir.clone()),
        None => None,
    }
}

async fn resolve_links(
    config: &AppConfig,
    urls: &[String],
    format: MediaFormat,
    quality: Quality,
    save_dir: Option<&Path>,
    json: bool,
) -> Result<()> {
    let pipeline = Pipeline::new(config).context("failed to set up the resolver pipeline")?;
    let library = MediaLibrary::new(pipeline.blobs().clone());
    let validator = InputValidator::new();

    if let Some(dir) = save_dir {
        validator.validate_download_path(dir)?;
    }

    let mut failures = 0usize;

    for raw in urls {
        let url = match validator.validate_url(raw) {
            Ok(url) => url,
            Err(e) => {
                eprintln!("✗ {}: {}", raw, e);
                failures += 1;
                continue;
            }
        };

        let request = DownloadRequest::new(url, format, quality);
        let bar = progress_bar(json)?;
        let on_progress = |event: ProgressEvent| {
            bar.set_position(event.percent as u64);
            bar.set_prefix(format!("{:?}", DownloadStatus::from_progress(event.percent)));
            bar.set_message(event.message);
        };

        match pipeline.process_download(&request, &on_progress).await {
            Ok(media) => {
                bar.finish_with_message(format!("✓ {}", media.title));
                print_media(&media, json)?;
                let saved = match save_dir {
                    Some(dir) => save_media(&pipeline, &validator, &media, dir, format).await,
                    None => Ok(()),
                };
                library.add(media).await;
                if let Err(e) = saved {
                    log::error!("❌ [CLI] {:#}", e);
                    eprintln!("✗ {}: {:#}", request.url, e);
                    failures += 1;
                }
            }
            Err(e) => {
                if e.is_terminal_resolution() {
                    log::warn!("⚠️ [CLI] {} not resolved: {}", request.url, e);
                } else {
                    log::error!("❌ [CLI] {} failed: {}", request.url, e);
                }
                bar.abandon_with_message(format!("✗ {}", e.user_message()));
                if bar.is_hidden() {
                    eprintln!("✗ {}: {}", request.url, e.user_message());
                }
                failures += 1;
            }
        }
    }

    if !json {
        let items = library.list().await;
        println!(
            "\nSession library ({} item{}, {} held in memory):",
            items.len(),
            if items.len() == 1 { "" } else { "s" },
            format_size_mb(pipeline.blobs().total_bytes().await)
        );
        for media in &items {
            println!("  [{}] {} ({}, {})", media.source, media.title, media.size, media.created_at.format("%H:%M:%S"));
        }
    }

    if failures > 0 {
        bail!("{} of {} links failed", failures, urls.len());
    }
    Ok(())
}

fn progress_bar(hidden: bool) -> Result<ProgressBar> {
    if hidden {
        return Ok(ProgressBar::hidden());
    }
    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("{prefix:>12} [{bar:30.cyan/blue}] {pos:>3}% {msg}")?
            .progress_chars("=> "),
    );
    Ok(bar)
}

async fn save_media(
    pipeline: &Pipeline,
    validator: &InputValidator,
    media: &ResolvedMedia,
    dir: &Path,
    format: MediaFormat,
) -> Result<()> {
    if !media.is_local() {
        log::debug!("🔗 [CLI] {} is a remote stream, nothing to save", media.title);
        return Ok(());
    }

    let filename = validator.output_filename(media, format);
    let target = dir.join(filename);
    let written = pipeline
        .blobs()
        .persist(&media.url, &target)
        .await
        .with_context(|| format!("failed to save {}", target.display()))?;
    println!("💾 Saved {} bytes to {}", written, target.display());
    Ok(())
}

fn print_media(media: &ResolvedMedia, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(media)?);
        return Ok(());
    }

    println!("  title:     {}", media.title);
    println!("  source:    {}", media.source);
    println!("  url:       {}", media.url);
    println!("  size:      {}", media.size);
    println!("  duration:  {}", media.duration);
    if let Some(thumbnail) = &media.thumbnail {
        println!("  thumbnail: {}", thumbnail);
    }
    Ok(())
}

fn list_providers(config: &AppConfig) -> Result<()> {
    if config.providers.is_empty() {
        println!("No providers configured");
        return Ok(());
    }
    for (index, endpoint) in config.providers.iter().enumerate() {
        println!("{}. {}", index + 1, endpoint);
    }
    Ok(())
}

fn show_config(config: &AppConfig, init: bool) -> Result<()> {
    if init {
        let path = config.save()?;
        println!("Configuration written to {}", path.display());
    }
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_resolve_arguments() {
        let cli = Cli::parse_from([
            "unistream", "resolve", "https://youtu.be/dQw4w9WgXcQ", "https://x.com/a/status/1",
            "--format", "mp3", "--quality", "720p", "--json",
        ]);
        match cli.command {
            Commands::Resolve { urls, format, quality, save, save_dir, json } => {
                assert_eq!(urls.len(), 2);
                assert!(!save);
                assert_eq!(format, Some(MediaFormat::Mp3));
                assert_eq!(quality, Some(Quality::P720));
                assert_eq!(save_dir, None);
                assert!(json);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn rejects_unknown_quality() {
        let parsed = Cli::try_parse_from(["unistream", "resolve", "https://youtu.be/x", "--quality", "4k"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn verbose_is_global() {
        let cli = Cli::parse_from(["unistream", "providers", "--verbose"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Providers));
    }

    #[test]
    fn save_flag_uses_configured_directory() {
        let config = AppConfig {
            save_dir: PathBuf::from("/tmp/unistream-saves"),
            ..AppConfig::default()
        };

        assert_eq!(output_dir(&config, false, None), None);
        assert_eq!(output_dir(&config, true, None), Some(PathBuf::from("/tmp/unistream-saves")));
        assert_eq!(
            output_dir(&config, true, Some(PathBuf::from("elsewhere"))),
            Some(PathBuf::from("elsewhere"))
        );

        let cli = Cli::parse_from(["unistream", "resolve", "https://cdn.example.org/a.mp4", "--save"]);
        assert!(matches!(cli.command, Commands::Resolve { save: true, save_dir: None, .. }));
    }

    /// Serves the same small body for every path.
    async fn serve_video_bytes() -> String {
        use hyper::service::{make_service_fn, service_fn};
        use hyper::{Body, Request, Response, Server};
        use std::convert::Infallible;

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let make_svc = make_service_fn(|_conn| async {
            Ok::<_, Infallible>(service_fn(|_req: Request<Body>| async {
                Ok::<_, Infallible>(Response::new(Body::from(vec![9u8; 64])))
            }))
        });
        let server = Server::from_tcp(listener).unwrap().serve(make_svc);
        tokio::spawn(server);
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn failed_save_does_not_stop_remaining_links() {
        let base = serve_video_bytes().await;
        let dir = tempfile::tempdir().unwrap();
        // a directory where the first file should go makes that write fail
        std::fs::create_dir(dir.path().join("first.mp4")).unwrap();

        let config = AppConfig {
            providers: Vec::new(),
            use_system_proxy: false,
            ..AppConfig::default()
        };
        let urls = vec![format!("{}/first.mp4", base), format!("{}/second.mp4", base)];

        let result = resolve_links(&config, &urls, MediaFormat::Mp4, Quality::Best, Some(dir.path()), true).await;

        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "1 of 2 links failed");
        assert_eq!(std::fs::read(dir.path().join("second.mp4")).unwrap(), vec![9u8; 64]);
    }
}
