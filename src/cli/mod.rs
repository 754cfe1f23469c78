// src/cli/mod.rs - CLI definition (clap derive)

pub mod render;
pub mod shell;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "kubo",
    about = "Browse and book Kubo workspace pods, and talk to the concierge",
    version
)]
pub struct Cli {
    /// Backend base URL (overrides config.toml and KUBO_API_URL)
    #[arg(long)]
    pub api_url: Option<String>,

    /// Config file path
    #[arg(long)]
    pub config: Option<String>,

    /// Email to pre-fill at the login prompt
    #[arg(long)]
    pub email: Option<String>,

    /// Log level used when RUST_LOG is unset
    #[arg(long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Clone, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Interactive session (the default)
    Shell,
    /// Print the effective configuration as TOML
    Config,
}
