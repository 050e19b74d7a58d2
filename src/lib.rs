//! Library for the `stock_chart` tool.
//!
//! Fetches a ticker's daily prices from Alpha Vantage, keeps the trailing
//! year and plots the closing prices to `<ticker>_chart.png`.
//!
//! # Modules
//!
//! - `alpha_vantage` - Quote provider client and the `QuoteSource` trait
//! - `candles` - Normalization of raw daily entries into a `CandleSeries`
//! - `visualization` - Closing-price line chart rendering
//! - `pipeline` - The fetch → normalize → render run
//! - `config` - Command line and TOML settings
//! - `error` - Error kinds and their exit codes

pub mod alpha_vantage;
pub mod candles;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod visualization;

pub use alpha_vantage::{AlphaVantageClient, OutputSize, QuoteResponse, QuoteSource};
pub use candles::{normalize, Candle, CandleSeries, Field, FieldWarning, RawDailyEntry, Status};
pub use config::{Cli, Settings};
pub use error::ChartError;
pub use pipeline::{run, validate_ticker, RunReport};
pub use visualization::{chart_file_name, render};
