//! Error kinds for the fetch → normalize → render pipeline.

use crate::candles::Status;
use std::process::ExitCode;
use thiserror::Error;

/// Every fatal failure of a run. Field-parse problems are not errors; they
/// travel as [`crate::candles::FieldWarning`]s on the series.
#[derive(Error, Debug)]
pub enum ChartError {
    #[error("request to quote provider failed: {0}")]
    Provider(String),

    #[error("API returned status {status}{}", detail(.message))]
    ProviderStatus {
        status: Status,
        message: Option<String>,
    },

    #[error("no data available for the ticker {0}")]
    EmptySeries(String),

    #[error("failed to render chart: {0}")]
    Render(String),

    #[error("configuration error: {0:#}")]
    Config(anyhow::Error),

    #[error("invalid input: {0}")]
    Input(String),
}

fn detail(message: &Option<String>) -> String {
    message.as_deref().map(|m| format!(": {m}")).unwrap_or_default()
}

impl ChartError {
    /// Process exit code for this error kind. Zero is reserved for success.
    pub fn exit_code(&self) -> u8 {
        match self {
            ChartError::Provider(_) => 2,
            ChartError::ProviderStatus { .. } => 3,
            ChartError::EmptySeries(_) => 4,
            ChartError::Render(_) => 5,
            ChartError::Config(_) => 6,
            ChartError::Input(_) => 7,
        }
    }
}

impl From<&ChartError> for ExitCode {
    fn from(err: &ChartError) -> Self {
        ExitCode::from(err.exit_code())
    }
}

impl From<reqwest::Error> for ChartError {
    fn from(err: reqwest::Error) -> Self {
        ChartError::Provider(err.to_string())
    }
}
