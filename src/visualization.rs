//! Closing-price line chart rendering.

use crate::candles::CandleSeries;
use crate::error::ChartError;
use chrono::{DateTime, Duration, Utc};
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use tracing::info;

const CHART_SIZE: (u32, u32) = (1280, 720);

/// File name the chart for `ticker` is written to.
pub fn chart_file_name(ticker: &str) -> String {
    format!("{}_chart.png", ticker)
}

fn render_error<E: std::fmt::Display>(e: E) -> ChartError {
    ChartError::Render(e.to_string())
}

/// Plot the closing prices of `series` against date and save it as
/// `<ticker>_chart.png` inside `output_dir`, replacing any existing file.
///
/// The series must have status `ok` and at least one candle.
pub fn render<P: AsRef<Path>>(series: &CandleSeries, output_dir: P) -> Result<PathBuf, ChartError> {
    if !series.status().is_ok() {
        return Err(ChartError::Render(format!(
            "series status is {}, refusing to render",
            series.status()
        )));
    }
    if series.is_empty() {
        return Err(ChartError::Render("series has no data points".to_string()));
    }
    if let Some(bad) = series.closes().iter().find(|c| !c.is_finite()) {
        return Err(ChartError::Render(format!("close price {} cannot be plotted", bad)));
    }

    let points: Vec<(DateTime<Utc>, f64)> = series
        .timestamps()
        .iter()
        .zip(series.closes())
        .map(|(&ts, &close)| {
            DateTime::<Utc>::from_timestamp(ts, 0)
                .map(|dt| (dt, close))
                .ok_or_else(|| ChartError::Render(format!("timestamp {} is out of range", ts)))
        })
        .collect::<Result<_, _>>()?;

    let output_path = output_dir.as_ref().join(chart_file_name(series.ticker()));
    draw_chart(&output_path, series.ticker(), &points)?;
    info!(path = %output_path.display(), points = points.len(), "chart written");

    Ok(output_path)
}

/// The backend owns the output file; it is flushed by `present` and released
/// when this function returns, on success or error.
fn draw_chart(
    output_path: &Path,
    ticker: &str,
    points: &[(DateTime<Utc>, f64)],
) -> Result<(), ChartError> {
    let (x_range, y_range) = axis_ranges(points);

    let root = BitMapBackend::new(output_path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("{} Stock Price", ticker), ("sans-serif", 30).into_font())
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range, y_range)
        .map_err(render_error)?;

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("Price")
        .x_label_formatter(&|dt| dt.format("%Y-%m-%d").to_string())
        .draw()
        .map_err(render_error)?;

    chart
        .draw_series(LineSeries::new(points.iter().copied(), &BLUE))
        .map_err(render_error)?
        .label("Closing Price")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));

    chart
        .configure_series_labels()
        .background_style(&WHITE)
        .border_style(&BLACK)
        .draw()
        .map_err(render_error)?;

    root.present().map_err(render_error)?;
    Ok(())
}

/// Axis ranges covering `points`, widened when every point shares the same
/// date or price so plotters never gets an empty range.
fn axis_ranges(
    points: &[(DateTime<Utc>, f64)],
) -> (std::ops::Range<DateTime<Utc>>, std::ops::Range<f64>) {
    let first = points.first().map(|p| p.0).unwrap_or_default();
    let last = points.last().map(|p| p.0).unwrap_or_default();
    let x_range = if first < last {
        first..last
    } else {
        (first - Duration::days(1))..(last + Duration::days(1))
    };

    let min = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
    let max = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
    let y_range = if min < max {
        let pad = (max - min) * 0.05;
        (min - pad)..(max + pad)
    } else {
        let pad = if min.abs() > 0.0 { min.abs() * 0.05 } else { 1.0 };
        (min - pad)..(max + pad)
    };

    (x_range, y_range)
}
