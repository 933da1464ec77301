use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::sync::Arc;
use surveyor_cli::app;
use surveyor_cli::cli::Args;
use surveyor_cli::logging;
use surveyor_cli::{HttpSessionClient, SessionController};
use surveyor_core::SessionServiceRef;
use tracing::{error, info};

/// Main function - Connects to the session service and runs the terminal front-end
#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    // Defaults < config file < environment (.env included) < flags
    let config = args
        .resolve_config()
        .context("Failed to load configuration")?;

    logging::init(config.log_level());

    if args.show_config {
        let rendered = toml::to_string_pretty(&config).context("Failed to render configuration")?;
        println!("{}", rendered);
        return Ok(());
    }

    if args.save_config {
        let path = args.config_path().context("Failed to locate the config file")?;
        config
            .save_to_file(&path)
            .context("Failed to save configuration")?;
        println!("Configuration written to {}", path.display());
        return Ok(());
    }

    let client = match HttpSessionClient::new(&config) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Failed to initialize session client");
            eprintln!("{}", format!("Error initializing session client: {}", e).red());
            return Err(e.into());
        }
    };
    let client_url = client.base_url().to_string();
    let service: SessionServiceRef = Arc::new(client);
    let mut controller = SessionController::new(service, config.poll_interval());

    if args.list_sessions {
        app::run_list_sessions(&controller).await;
        return Ok(());
    }

    info!("Starting interactive session");
    println!("{}", format!("Connected to {}", client_url).dimmed());
    app::run_interactive(&mut controller).await
}
