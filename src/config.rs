//! Command line and configuration file settings.

use crate::alpha_vantage::{OutputSize, DEFAULT_BASE_URL};
use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Fetch a year of daily prices for a ticker and plot the closing prices
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "stock_chart")]
#[command(about = "Plot one year of daily closing prices for a stock ticker", long_about = None)]
pub struct Cli {
    /// Ticker symbol; read from standard input when omitted
    #[arg(short, long)]
    pub ticker: Option<String>,

    /// Alpha Vantage API key
    #[arg(long, env = "ALPHAVANTAGE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory the chart is written to
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Alpha Vantage output size: compact (100 days) or full
    #[arg(long)]
    pub output_size: Option<OutputSize>,

    /// Quote provider base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Contents of the optional TOML configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub output_dir: Option<PathBuf>,

    #[serde(default)]
    pub alpha_vantage: AlphaVantageConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AlphaVantageConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub output_size: Option<OutputSize>,
}

impl FileConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file '{}'", path.display()))?;
        let config: FileConfig = toml::from_str(&content)
            .with_context(|| format!("cannot parse config file '{}'", path.display()))?;
        Ok(config)
    }
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_key: String,
    pub base_url: String,
    pub output_size: OutputSize,
    pub output_dir: PathBuf,
}

impl Settings {
    /// Merge command line values over file values over defaults.
    ///
    /// There is no default API key; one must come from the command line, the
    /// environment or the file.
    pub fn resolve(cli: &Cli, file: FileConfig) -> Result<Self> {
        let api_key = cli
            .api_key
            .clone()
            .or(file.alpha_vantage.api_key)
            .filter(|key| !key.trim().is_empty())
            .context(
                "no API key given; use --api-key, ALPHAVANTAGE_API_KEY or [alpha_vantage] api_key",
            )?;

        Ok(Self {
            api_key,
            base_url: cli
                .base_url
                .clone()
                .or(file.alpha_vantage.base_url)
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            output_size: cli
                .output_size
                .or(file.alpha_vantage.output_size)
                .unwrap_or_default(),
            output_dir: cli
                .output_dir
                .clone()
                .or(file.output_dir)
                .unwrap_or_else(|| PathBuf::from(".")),
        })
    }

    /// Load the file named by `--config`, if any, and resolve.
    pub fn load(cli: &Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => FileConfig::from_file(path)?,
            None => FileConfig::default(),
        };
        Self::resolve(cli, file)
    }
}
