//! # vaultpub CLI
//!
//! Command-line interface for the vaultpub publishing pipeline.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "vaultpub")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, global = true, default_value = "vaultpub.yml", env = "VAULTPUB_CONFIG")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish notes, posts and attachments and write the site artifacts
    Sync,

    /// Resolve everything without writing and report what a sync would do
    Check {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Write a default vaultpub.yml
    Init {
        /// Target directory (defaults to current directory)
        path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(if cli.verbose {
                tracing::Level::DEBUG.into()
            } else {
                tracing::Level::INFO.into()
            }),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Sync => commands::sync_site(&cli.config).await,
        Commands::Check { json } => commands::check_site(&cli.config, json).await,
        Commands::Init { path } => commands::init_project(path.as_deref()),
    }
}
