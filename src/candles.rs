//! Candle normalization: raw daily quotes into a time-ordered OHLCV series.
//!
//! Raw entries arrive as strings in no particular order. [`normalize`] parses
//! them, keeps the ones inside the trailing one-year window and lays them out
//! as six parallel columns sorted by timestamp.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::fmt;
use tracing::{debug, warn};

/// Date format used by the quote provider.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Length of the trailing window kept by [`normalize`].
pub const WINDOW_DAYS: i64 = 365;

/// One day as delivered by the quote source. Nothing here is validated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawDailyEntry {
    pub date: String,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub volume: String,
}

/// Status of a series or of a provider response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Ok,
    Error,
    /// Provider-specific code, e.g. `rate_limited`.
    Other(String),
}

impl Status {
    pub fn is_ok(&self) -> bool {
        matches!(self, Status::Ok)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Status::Ok => "ok",
            Status::Error => "error",
            Status::Other(code) => code,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Numeric column of a candle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Open => "open",
            Field::High => "high",
            Field::Low => "low",
            Field::Close => "close",
            Field::Volume => "volume",
        };
        f.write_str(name)
    }
}

/// A numeric field that failed to parse, or parsed to a non-finite value,
/// and was stored as zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldWarning {
    pub date: NaiveDate,
    pub field: Field,
    /// The text that failed to parse.
    pub raw: String,
}

impl fmt::Display for FieldWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} value {:?} is not a number, using 0",
            self.date, self.field, self.raw
        )
    }
}

/// One day of the normalized series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candle {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

/// OHLCV history of one ticker as parallel columns.
///
/// All columns have the same length and index `i` of every column is the
/// same day. Timestamps are Unix seconds and never decrease. The series has
/// no mutating methods; build a new one instead.
#[derive(Debug, Clone, PartialEq)]
pub struct CandleSeries {
    ticker: String,
    open: Vec<f64>,
    high: Vec<f64>,
    low: Vec<f64>,
    close: Vec<f64>,
    timestamp: Vec<i64>,
    volume: Vec<i64>,
    status: Status,
    warnings: Vec<FieldWarning>,
}

impl CandleSeries {
    /// Project time-ordered candles into columns.
    fn from_sorted(
        ticker: String,
        candles: &[Candle],
        status: Status,
        warnings: Vec<FieldWarning>,
    ) -> Self {
        Self {
            ticker,
            open: candles.iter().map(|c| c.open).collect(),
            high: candles.iter().map(|c| c.high).collect(),
            low: candles.iter().map(|c| c.low).collect(),
            close: candles.iter().map(|c| c.close).collect(),
            timestamp: candles.iter().map(|c| c.timestamp).collect(),
            volume: candles.iter().map(|c| c.volume).collect(),
            status,
            warnings,
        }
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn len(&self) -> usize {
        self.timestamp.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamp.is_empty()
    }

    pub fn opens(&self) -> &[f64] {
        &self.open
    }

    pub fn highs(&self) -> &[f64] {
        &self.high
    }

    pub fn lows(&self) -> &[f64] {
        &self.low
    }

    pub fn closes(&self) -> &[f64] {
        &self.close
    }

    pub fn timestamps(&self) -> &[i64] {
        &self.timestamp
    }

    pub fn volumes(&self) -> &[i64] {
        &self.volume
    }

    /// Fields that were defaulted during normalization, in input order.
    pub fn warnings(&self) -> &[FieldWarning] {
        &self.warnings
    }

    pub fn get(&self, index: usize) -> Option<Candle> {
        Some(Candle {
            timestamp: *self.timestamp.get(index)?,
            open: self.open[index],
            high: self.high[index],
            low: self.low[index],
            close: self.close[index],
            volume: self.volume[index],
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = Candle> + '_ {
        (0..self.len()).filter_map(|i| self.get(i))
    }
}

/// Strict `YYYY-MM-DD`. chrono alone also takes `2023-6-1`, a leading
/// space or a `+` sign, so the text must round-trip through the format.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let date = NaiveDate::parse_from_str(raw, DATE_FORMAT).ok()?;
    (date.format(DATE_FORMAT).to_string() == raw).then_some(date)
}

/// Parse, window-filter and sort raw daily entries into a [`CandleSeries`].
///
/// Entries with an unparsable date, and entries outside
/// `[now - 365 days, now]`, are dropped. A numeric field that fails to parse
/// is stored as zero and reported in [`CandleSeries::warnings`]. The result
/// always has status `ok`, even when it is empty.
pub fn normalize<'a, I>(ticker: &str, entries: I, now: DateTime<Utc>) -> CandleSeries
where
    I: IntoIterator<Item = &'a RawDailyEntry>,
{
    let from = (now - Duration::days(WINDOW_DAYS)).timestamp();
    let to = now.timestamp();

    let mut candles = Vec::new();
    let mut warnings = Vec::new();

    for entry in entries {
        let Some(date) = parse_date(&entry.date) else {
            debug!(ticker, date = %entry.date, "dropping entry with bad date");
            continue;
        };

        let timestamp = date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc().timestamp());
        let Some(timestamp) = timestamp.filter(|ts| (from..=to).contains(ts)) else {
            debug!(ticker, %date, "dropping entry outside trailing window");
            continue;
        };

        let mut number = |field: Field, raw: &str| -> f64 {
            let parsed = raw.parse::<f64>().ok().filter(|v| v.is_finite());
            parsed.unwrap_or_else(|| {
                warnings.push(FieldWarning {
                    date,
                    field,
                    raw: raw.to_string(),
                });
                0.0
            })
        };
        let open = number(Field::Open, &entry.open);
        let high = number(Field::High, &entry.high);
        let low = number(Field::Low, &entry.low);
        let close = number(Field::Close, &entry.close);

        let volume = entry.volume.parse::<i64>().unwrap_or_else(|_| {
            warnings.push(FieldWarning {
                date,
                field: Field::Volume,
                raw: entry.volume.clone(),
            });
            0
        });

        candles.push(Candle {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        });
    }

    // Vec::sort_by_key is stable: duplicate dates keep their input order.
    candles.sort_by_key(|c| c.timestamp);

    for warning in &warnings {
        warn!(ticker, "{}", warning);
    }

    CandleSeries::from_sorted(ticker.to_string(), &candles, Status::Ok, warnings)
}
