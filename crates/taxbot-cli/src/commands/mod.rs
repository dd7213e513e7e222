//! CLI sub-commands.

pub mod batch;
pub mod config;
pub mod extract;
pub mod recommend;
pub mod train;

use std::path::{Path, PathBuf};

use taxbot_core::TaxbotConfig;
use tracing::debug;

/// Output format for extraction and recommendation results.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

/// Location of the user configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("taxbot")
        .join("config.json")
}

/// Load the configuration from `path`, else the user file, else defaults.
pub fn load_config(path: Option<&str>) -> anyhow::Result<TaxbotConfig> {
    if let Some(path) = path {
        debug!("Loading config from {}", path);
        return TaxbotConfig::from_file(Path::new(path))
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {}", path, e));
    }

    let user_path = default_config_path();
    if user_path.exists() {
        debug!("Loading config from {}", user_path.display());
        return Ok(TaxbotConfig::from_file(&user_path)?);
    }

    Ok(TaxbotConfig::default())
}
