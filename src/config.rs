use clap::{Parser, ValueEnum};
use serde::Deserialize;
use std::path::PathBuf;

use crate::auth::session::SESSION_FILE;
use crate::commands::Command;

#[derive(Parser, Debug)]
#[command(name = "pixelhub", about = "PixelHub forum client")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Base URL of the PixelHub API
    #[arg(long)]
    pub api_url: Option<String>,

    /// Which backend to talk to
    #[arg(long, value_enum)]
    pub backend: Option<BackendMode>,

    /// Path to data directory
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    #[default]
    Http,
    /// Seeded fixtures held in process memory
    Memory,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub backend: BackendConfig,
    pub donation: DonationConfig,
    pub session: SessionConfig,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct BackendConfig {
    pub mode: BackendMode,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct DonationConfig {
    /// Simulated payment time of the in-memory backend
    pub processing_delay_ms: u64,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct SessionConfig {
    pub path: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for DonationConfig {
    fn default() -> Self {
        Self {
            processing_delay_ms: 2000,
        }
    }
}

impl Config {
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let data_dir = Self::data_dir(cli);
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| data_dir.join("config.toml"));

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Config::default()
        };

        // CLI overrides
        if let Some(ref api_url) = cli.api_url {
            config.api.base_url = api_url.clone();
        }
        if let Some(mode) = cli.backend {
            config.backend.mode = mode;
        }

        // Resolve paths relative to data dir
        if config.session.path.is_none() {
            config.session.path = Some(data_dir.join(SESSION_FILE));
        }

        Ok(config)
    }

    pub fn data_dir(cli: &Cli) -> PathBuf {
        cli.data_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .map(|home| home.join(".pixelhub"))
                .unwrap_or_else(|| PathBuf::from(".pixelhub"))
        })
    }

    pub fn session_path(&self) -> PathBuf {
        self.session
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from(SESSION_FILE))
    }
}
