use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod config;
mod domain;
mod error;
mod infrastructure;
mod services;
mod tools;
mod ui;

use cli::{Cli, Commands};
use config::Overrides;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging with LOGGING env var support
    // LOGGING=debug,info,warn,error or just LOGGING=debug
    let log_level = std::env::var("LOGGING")
        .or_else(|_| std::env::var("LOG_LEVEL"))
        .unwrap_or_else(|_| {
            if cli.verbose {
                "debug".to_string()
            } else {
                "info".to_string()
            }
        });

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_ansi(false)
        .init();

    let (settings_path, required) = cli.settings_path();

    match cli.command {
        Commands::Deploy {
            target,
            timeout,
            message,
            no_verify,
            site_url,
        } => {
            let overrides = Overrides {
                message,
                deploy_timeout: timeout,
                site_url,
                no_verify,
                ..target.into()
            };
            commands::deploy::execute(&settings_path, required, overrides).await?;
        }
        Commands::Init { target } => {
            commands::init::execute(&settings_path, required, target.into()).await?;
        }
        Commands::Verify { url, timeout } => {
            commands::verify::execute(&settings_path, required, url, timeout).await?;
        }
    }

    Ok(())
}
