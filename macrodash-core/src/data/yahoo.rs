//! Yahoo Finance adapter.
//!
//! Fetches daily bars from Yahoo's v8 chart API with exponential backoff on
//! rate limits and server errors. A 403 means the client has been banned, so
//! the adapter opens the Yahoo circuit on the shared breaker at once.
//!
//! Serves market and semiconductor series either as full OHLCV tables or as
//! `Close`-only time-value tables, depending on the series shape.
//!
//! Yahoo Finance has no official API and is subject to unannounced format
//! changes; anything unexpected surfaces as a malformed response so the
//! orchestrator falls back instead of storing garbage.

use super::circuit_breaker::CircuitBreaker;
use super::source::{FetchRequest, SourceAdapter, SourceError};
use crate::registry::{Provider, SeriesSpec};
use crate::series::SeriesShape;
use crate::table::{OhlcvBar, SeriesTable};
use chrono::{Duration as Days, Local, NaiveDate};
use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const CHART_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart/";

/// Span of a full fetch.
const FULL_HISTORY_DAYS: i64 = 5 * 365;

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

/// Yahoo Finance chart adapter.
pub struct YahooAdapter {
    client: Client,
    breaker: Arc<CircuitBreaker>,
    max_retries: u32,
    base_delay: Duration,
}

impl YahooAdapter {
    /// `breaker` should be the one attached to the adapter set serving Yahoo.
    pub fn new(client: Client, breaker: Arc<CircuitBreaker>) -> Self {
        Self {
            client,
            breaker,
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        }
    }

    /// Chart API URL for a ticker and date range. The ticker goes in a path
    /// segment so `^` and `=` are escaped.
    fn chart_url(symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Url, SourceError> {
        let start_ts = start.and_hms_opt(0, 0, 0).map(|t| t.and_utc().timestamp());
        let end_ts = end.and_hms_opt(23, 59, 59).map(|t| t.and_utc().timestamp());
        let (Some(start_ts), Some(end_ts)) = (start_ts, end_ts) else {
            return Err(SourceError::MalformedResponse(format!(
                "invalid date range {start}..{end}"
            )));
        };

        let mut url = Url::parse(CHART_URL)
            .map_err(|e| SourceError::MalformedResponse(format!("bad chart URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| SourceError::MalformedResponse("chart URL cannot be a base".into()))?
            .pop_if_empty()
            .push(symbol);
        url.query_pairs_mut()
            .append_pair("period1", &start_ts.to_string())
            .append_pair("period2", &end_ts.to_string())
            .append_pair("interval", "1d");
        Ok(url)
    }

    /// Execute a request, retrying 429, 5xx, connect and timeout failures.
    fn fetch_with_retry(&self, symbol: &str, url: &Url) -> Result<ChartResponse, SourceError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                std::thread::sleep(delay);
            }

            // Another worker may have been banned in the meantime
            self.breaker.check(Provider::Yahoo)?;

            match self.client.get(url.clone()).send() {
                Ok(resp) => {
                    let status = resp.status();

                    if status == StatusCode::FORBIDDEN {
                        self.breaker.trip(Provider::Yahoo);
                        warn!(symbol, "Yahoo returned 403");
                        return Err(SourceError::Unavailable(format!(
                            "HTTP 403 for {symbol}; Yahoo circuit opened"
                        )));
                    }

                    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                        last_error = Some(SourceError::Unavailable(format!(
                            "HTTP {status} for {symbol}"
                        )));
                        continue;
                    }

                    if !status.is_success() {
                        return Err(SourceError::Unavailable(format!("HTTP {status} for {symbol}")));
                    }

                    return resp.json().map_err(|e| {
                        SourceError::MalformedResponse(format!(
                            "failed to parse response for {symbol}: {e}"
                        ))
                    });
                }
                Err(e) => {
                    if e.is_connect() || e.is_timeout() {
                        last_error = Some(SourceError::Unavailable(e.to_string()));
                        continue;
                    }
                    return Err(SourceError::Unavailable(e.to_string()));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            SourceError::Unavailable(format!("max retries exceeded for {symbol}"))
        }))
    }
}

/// Parse a chart response into daily bars, skipping all-empty rows.
fn parse_response(symbol: &str, resp: ChartResponse) -> Result<Vec<OhlcvBar>, SourceError> {
    let result = match resp.chart.result {
        Some(result) => result,
        None => {
            return Err(match resp.chart.error {
                Some(err) if err.code == "Not Found" => {
                    SourceError::EmptyResult(format!("symbol not found: {symbol}"))
                }
                Some(err) => {
                    SourceError::MalformedResponse(format!("{}: {}", err.code, err.description))
                }
                None => SourceError::MalformedResponse("empty result with no error".into()),
            })
        }
    };

    let Some(data) = result.into_iter().next() else {
        return Err(SourceError::MalformedResponse("result array is empty".into()));
    };
    // Yahoo omits timestamps when the range holds no trading days
    let timestamps = data.timestamp.unwrap_or_default();
    let quote = data.indicators.quote.into_iter().next();
    let Some(quote) = quote else {
        if timestamps.is_empty() {
            return Ok(Vec::new());
        }
        return Err(SourceError::MalformedResponse("no quote data".into()));
    };

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let date = chrono::DateTime::from_timestamp(ts, 0)
            .map(|dt| dt.naive_utc().date())
            .ok_or_else(|| SourceError::MalformedResponse(format!("invalid timestamp: {ts}")))?;

        let open = quote.open.get(i).copied().flatten();
        let high = quote.high.get(i).copied().flatten();
        let low = quote.low.get(i).copied().flatten();
        let close = quote.close.get(i).copied().flatten();
        let volume = quote.volume.get(i).copied().flatten();

        // Holidays and halted sessions come back as all-null rows
        let Some(close) = close else {
            continue;
        };

        bars.push(OhlcvBar {
            date,
            open: open.unwrap_or(close),
            high: high.unwrap_or(close),
            low: low.unwrap_or(close),
            close,
            volume: volume.unwrap_or(0),
        });
    }
    Ok(bars)
}

impl SourceAdapter for YahooAdapter {
    fn name(&self) -> &str {
        "yahoo"
    }

    fn fetch(&self, spec: &SeriesSpec, request: &FetchRequest) -> Result<SeriesTable, SourceError> {
        let end = Local::now().date_naive();
        let start = request
            .start_date()
            .unwrap_or(end - Days::days(FULL_HISTORY_DAYS));
        let symbol = spec.remote_id.as_str();

        let url = Self::chart_url(symbol, start, end)?;
        let bars = parse_response(symbol, self.fetch_with_retry(symbol, &url)?)?;
        debug!(key = %spec.key, start = %start, rows = bars.len(), "fetched Yahoo chart");

        if bars.is_empty() && !request.tolerates_empty() {
            return Err(SourceError::EmptyResult(format!("no bars for {symbol} since {start}")));
        }

        match spec.shape {
            SeriesShape::Ohlcv => Ok(SeriesTable::Ohlcv(bars)),
            SeriesShape::TimeValue => Ok(SeriesTable::time_value(
                spec.key.category.value_column(),
                bars.into_iter().map(|b| (b.date, b.close)).collect(),
            )),
            other => Err(SourceError::MalformedResponse(format!(
                "Yahoo cannot serve {other} series {}",
                spec.key
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{"chart":{"result":[{
        "meta":{"symbol":"^GSPC"},
        "timestamp":[1704205800,1704292200,1704378600],
        "indicators":{"quote":[{
            "open":[4745.2,null,4697.4],
            "high":[4754.3,null,4726.8],
            "low":[4722.7,null,4687.5],
            "close":[4742.8,null,4704.8],
            "volume":[3743050000,null,3950760000]}]}}],"error":null}}"#;

    #[test]
    fn parses_bars_and_skips_null_rows() {
        let resp: ChartResponse = serde_json::from_str(SAMPLE).unwrap();
        let bars = parse_response("^GSPC", resp).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(bars[1].close, 4704.8);
        assert_eq!(bars[1].volume, 3_950_760_000);
    }

    #[test]
    fn not_found_is_empty_result() {
        let resp: ChartResponse = serde_json::from_str(
            r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#,
        )
        .unwrap();
        let err = parse_response("NOPE", resp).unwrap_err();
        assert!(matches!(err, SourceError::EmptyResult(_)));
    }

    #[test]
    fn chart_url_escapes_symbols() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let url = YahooAdapter::chart_url("EURUSD=X", start, end).unwrap();
        let path = url.path();
        assert!(path.ends_with("/chart/EURUSD=X") || path.ends_with("/chart/EURUSD%3DX"));
        assert!(url.query().unwrap().contains("period1=1704067200"));
        assert!(url.query().unwrap().contains("interval=1d"));
    }
}
