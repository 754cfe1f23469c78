// src/main.rs - Kubo Pods client entry point

use std::sync::Arc;

use clap::Parser;

use kubo::api::HttpBackend;
use kubo::cli::{Cli, Commands};
use kubo::infra::config::Config;
use kubo::infra::logger;
use kubo::store::AppStore;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load config (falls back to defaults if no config.toml), then CLI overrides
    let mut config = if let Some(ref path) = cli.config {
        let mut config = Config::load_from(std::path::Path::new(path))?;
        config.apply_env(|key| std::env::var(key).ok());
        config
    } else {
        Config::load()?
    };
    if let Some(ref url) = cli.api_url {
        config.api.base_url = url.clone();
    }
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    config.validate()?;

    // Initialize logging (respects RUST_LOG)
    logger::init_logging(&config.logging.level);

    match cli.command {
        Some(Commands::Config) => {
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
        Some(Commands::Shell) | None => {
            let backend = HttpBackend::from_config(&config.api)?;
            tracing::info!("using backend {}", backend.base_url());
            let store = AppStore::with_config(Arc::new(backend), &config.booking);
            kubo::cli::shell::run_shell(&store, cli.email.as_deref()).await
        }
    }
}
