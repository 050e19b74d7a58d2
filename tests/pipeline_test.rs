//! Integration tests for the fetch → normalize → render run

use chrono::{TimeZone, Utc};
use stock_chart::{
    run, validate_ticker, ChartError, Field, QuoteResponse, QuoteSource, RawDailyEntry, Status,
};

/// Quote source replaying a canned response.
struct FakeSource {
    response: Result<QuoteResponse, String>,
}

impl FakeSource {
    fn ok(entries: Vec<RawDailyEntry>) -> Self {
        Self {
            response: Ok(QuoteResponse {
                status: Status::Ok,
                message: None,
                entries,
            }),
        }
    }
}

impl QuoteSource for FakeSource {
    async fn daily_entries(&self, _ticker: &str) -> Result<QuoteResponse, ChartError> {
        self.response.clone().map_err(ChartError::Provider)
    }
}

fn day(date: &str, close: &str) -> RawDailyEntry {
    RawDailyEntry {
        date: date.to_string(),
        open: close.to_string(),
        high: close.to_string(),
        low: close.to_string(),
        close: close.to_string(),
        volume: "1000".to_string(),
    }
}

#[tokio::test]
async fn test_provider_failure_stops_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let source = FakeSource {
        response: Err("connection refused".to_string()),
    };
    let now = Utc.with_ymd_and_hms(2023, 6, 15, 0, 0, 0).unwrap();

    let err = run(&source, "ABC", now, dir.path()).await.unwrap_err();
    assert!(matches!(err, ChartError::Provider(_)));
    assert_eq!(err.exit_code(), 2);
    assert!(!dir.path().join("ABC_chart.png").exists());
}

#[tokio::test]
async fn test_provider_status_stops_before_normalization() {
    let dir = tempfile::tempdir().unwrap();
    let source = FakeSource {
        response: Ok(QuoteResponse {
            status: Status::Other("rate_limited".to_string()),
            message: Some("slow down".to_string()),
            // Would render fine if the status were ignored.
            entries: vec![day("2023-06-01", "11"), day("2023-06-02", "12")],
        }),
    };
    let now = Utc.with_ymd_and_hms(2023, 6, 15, 0, 0, 0).unwrap();

    let err = run(&source, "ABC", now, dir.path()).await.unwrap_err();
    match &err {
        ChartError::ProviderStatus { status, message } => {
            assert_eq!(status.as_str(), "rate_limited");
            assert_eq!(message.as_deref(), Some("slow down"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.exit_code(), 3);
    assert!(!dir.path().join("ABC_chart.png").exists());
}

#[tokio::test]
async fn test_nothing_in_window_is_empty_result() {
    let dir = tempfile::tempdir().unwrap();
    let source = FakeSource::ok(vec![
        day("2019-01-02", "50"),
        day("not-a-date", "51"),
        day("2030-01-01", "52"),
    ]);
    let now = Utc.with_ymd_and_hms(2023, 6, 15, 0, 0, 0).unwrap();

    let err = run(&source, "ABC", now, dir.path()).await.unwrap_err();
    assert!(matches!(err, ChartError::EmptySeries(ref t) if t == "ABC"));
    assert_eq!(err.exit_code(), 4);
    assert_eq!(err.to_string(), "no data available for the ticker ABC");
    assert!(!dir.path().join("ABC_chart.png").exists());
}

#[tokio::test]
async fn test_no_entries_at_all_is_empty_result() {
    let dir = tempfile::tempdir().unwrap();
    let source = FakeSource::ok(Vec::new());
    let now = Utc.with_ymd_and_hms(2023, 6, 15, 0, 0, 0).unwrap();

    let err = run(&source, "XYZ", now, dir.path()).await.unwrap_err();
    assert!(matches!(err, ChartError::EmptySeries(_)));
}

#[tokio::test]
async fn test_render_failure_is_reported_after_processing() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("no_such_dir");
    let source = FakeSource::ok(vec![day("2023-06-01", "11"), day("2023-05-01", "bad")]);
    let now = Utc.with_ymd_and_hms(2023, 6, 15, 0, 0, 0).unwrap();

    let err = run(&source, "ABC", now, &missing).await.unwrap_err();
    assert!(matches!(err, ChartError::Render(_)));
    assert_eq!(err.exit_code(), 5);
}

#[tokio::test]
async fn test_successful_run_writes_chart_and_reports() {
    let dir = tempfile::tempdir().unwrap();
    let mut bad_open = day("2023-05-01", "7.5");
    bad_open.open = "bad".to_string();
    let source = FakeSource::ok(vec![
        day("2023-06-01", "11"),
        bad_open,
        day("2020-01-01", "3"),
    ]);
    let now = Utc.with_ymd_and_hms(2023, 6, 15, 0, 0, 0).unwrap();

    let report = run(&source, "ABC", now, dir.path()).await.unwrap();
    assert_eq!(report.chart_path, dir.path().join("ABC_chart.png"));
    assert!(std::fs::metadata(&report.chart_path).unwrap().len() > 0);
    assert_eq!(report.candles, 2);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].field, Field::Open);
    assert_eq!(report.warnings[0].raw, "bad");
}

#[tokio::test]
async fn test_ticker_with_path_separator_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let source = FakeSource::ok(vec![day("2023-06-01", "11")]);
    let now = Utc.with_ymd_and_hms(2023, 6, 15, 0, 0, 0).unwrap();

    for ticker in ["../x", "a/b", "a\\b", ".."] {
        let err = run(&source, ticker, now, dir.path()).await.unwrap_err();
        assert!(matches!(err, ChartError::Input(_)), "{ticker}");
        assert_eq!(err.exit_code(), 7);
    }
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_validate_ticker() {
    assert!(validate_ticker("IBM").is_ok());
    assert!(validate_ticker("BRK.B").is_ok());
    assert!(validate_ticker("").is_err());
    assert!(validate_ticker("../etc").is_err());
}
