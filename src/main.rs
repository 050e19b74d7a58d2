use chrono::Utc;
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use stock_chart::{run, validate_ticker, AlphaVantageClient, ChartError, Cli, Settings};

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// First whitespace-separated token of one line of standard input.
fn prompt_ticker() -> Result<String, ChartError> {
    println!("Enter stock ticker:");
    io::stdout().flush().ok();

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| ChartError::Input(format!("cannot read ticker: {}", e)))?;
    Ok(line.split_whitespace().next().unwrap_or_default().to_string())
}

async fn chart(cli: Cli) -> Result<(), ChartError> {
    let settings = Settings::load(&cli).map_err(ChartError::Config)?;

    let ticker = match cli.ticker {
        Some(ticker) => ticker.trim().to_string(),
        None => prompt_ticker()?,
    };
    validate_ticker(&ticker)?;

    let client = AlphaVantageClient::new(settings.api_key)
        .with_base_url(settings.base_url)
        .with_output_size(settings.output_size);

    let report = run(&client, &ticker, Utc::now(), &settings.output_dir).await?;

    if !report.warnings.is_empty() {
        eprintln!(
            "Warning: {} field(s) could not be parsed and were set to 0",
            report.warnings.len()
        );
    }
    println!(
        "Chart saved as {} ({} trading days)",
        report.chart_path.display(),
        report.candles
    );
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match chart(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(&e)
        }
    }
}
