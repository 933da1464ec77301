use clap::Parser;
use std::path::PathBuf;
use surveyor_core::{get_default_config_file, ClientConfig, SurveyorResult};

/// Terminal client for interest-survey sessions
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Base URL of the session service
    #[arg(long)]
    pub api_url: Option<String>,

    /// Path to the configuration file (defaults to ~/.config/surveyor/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Interest refresh period in milliseconds
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Print the session list and exit
    #[arg(long, default_value_t = false)]
    pub list_sessions: bool,

    /// Print the effective configuration and exit
    #[arg(long, default_value_t = false)]
    pub show_config: bool,

    /// Write the effective configuration to the config file and exit
    #[arg(long, default_value_t = false)]
    pub save_config: bool,
}

impl Args {
    /// Overlay built from the command-line flags
    fn as_config(&self) -> ClientConfig {
        ClientConfig {
            api_url: self.api_url.clone(),
            poll_interval_ms: self.poll_interval_ms,
            log_level: self.log_level.clone(),
            ..ClientConfig::empty()
        }
    }

    /// The `--config` path, or the default location
    pub fn config_path(&self) -> SurveyorResult<PathBuf> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => get_default_config_file("surveyor"),
        }
    }

    /// Defaults, then the config file, then the environment, then the flags
    pub fn resolve_config(&self) -> SurveyorResult<ClientConfig> {
        let file_config = ClientConfig::load_from_file(&self.config_path()?)?;
        Ok(file_config
            .merge(&ClientConfig::from_env())
            .merge(&self.as_config()))
    }
}
