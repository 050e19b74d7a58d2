//! Fetch → normalize → render for a single ticker.

use crate::alpha_vantage::QuoteSource;
use crate::candles::{normalize, FieldWarning};
use crate::error::ChartError;
use crate::visualization::render;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::info;

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub chart_path: PathBuf,
    pub candles: usize,
    pub warnings: Vec<FieldWarning>,
}

/// Reject tickers that are empty or would escape the output directory once
/// used in the chart file name.
pub fn validate_ticker(ticker: &str) -> Result<(), ChartError> {
    if ticker.is_empty() {
        return Err(ChartError::Input("ticker must not be empty".to_string()));
    }
    if ticker.contains(['/', '\\']) || ticker.contains("..") {
        return Err(ChartError::Input(format!(
            "ticker '{}' must not contain path separators or '..'",
            ticker
        )));
    }
    Ok(())
}

/// Chart one ticker. `now` anchors the trailing one-year window.
///
/// Each stage runs only after the previous one succeeded: a provider status
/// other than `ok` stops the run before normalization and an empty series
/// stops it before anything is written.
pub async fn run<S, P>(
    source: &S,
    ticker: &str,
    now: DateTime<Utc>,
    output_dir: P,
) -> Result<RunReport, ChartError>
where
    S: QuoteSource,
    P: AsRef<Path>,
{
    validate_ticker(ticker)?;
    let response = source.daily_entries(ticker).await?;
    if !response.status.is_ok() {
        return Err(ChartError::ProviderStatus {
            status: response.status,
            message: response.message,
        });
    }
    info!(ticker, entries = response.entries.len(), "received daily entries");

    let series = normalize(ticker, &response.entries, now);
    if series.timestamps().is_empty() || series.closes().is_empty() {
        return Err(ChartError::EmptySeries(ticker.to_string()));
    }
    info!(ticker, candles = series.len(), warnings = series.warnings().len(), "normalized series");

    let chart_path = render(&series, output_dir)?;

    Ok(RunReport {
        chart_path,
        candles: series.len(),
        warnings: series.warnings().to_vec(),
    })
}
