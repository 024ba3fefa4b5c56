mod commands;

use clap::Parser;
use log::info;
use unistream::config::AppConfig;

use crate::commands::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logger
    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    info!("Starting unistream {}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = match AppConfig::load() {
        Ok(config) => {
            info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            log::error!("Failed to load configuration: {}", e);
            AppConfig::default()
        }
    };

    if let Err(e) = commands::run(cli, config).await {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}
