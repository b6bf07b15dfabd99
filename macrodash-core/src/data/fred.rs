//! FRED observations API adapter.

use super::source::{transport_error, FetchRequest, SourceAdapter, SourceError};
use crate::registry::SeriesSpec;
use crate::table::SeriesTable;
use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

const BASE_URL: &str = "https://api.stlouisfed.org/fred/series/observations";

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    date: String,
    value: String,
}

/// Serves `fred/*` series as a `date` + `value` table.
pub struct FredAdapter {
    client: Client,
    api_key: String,
    history_start: NaiveDate,
}

impl FredAdapter {
    pub fn new(client: Client, api_key: impl Into<String>, history_start: NaiveDate) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            history_start,
        }
    }

    fn fetch_observations(
        &self,
        series_id: &str,
        start: NaiveDate,
    ) -> Result<Vec<(NaiveDate, f64)>, SourceError> {
        let start = start.format("%Y-%m-%d").to_string();
        let resp = self
            .client
            .get(BASE_URL)
            .query(&[
                ("series_id", series_id),
                ("api_key", self.api_key.as_str()),
                ("file_type", "json"),
                ("observation_start", start.as_str()),
            ])
            .send()
            .map_err(|e| transport_error(&format!("FRED request for {series_id}"), e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::Unavailable(format!(
                "FRED request for {series_id} failed with status {status}"
            )));
        }

        let body: ObservationsResponse = resp.json().map_err(|e| {
            SourceError::MalformedResponse(format!(
                "failed to parse FRED response for {series_id}: {e}"
            ))
        })?;
        parse_observations(series_id, body.observations)
    }
}

fn parse_observations(
    series_id: &str,
    observations: Vec<Observation>,
) -> Result<Vec<(NaiveDate, f64)>, SourceError> {
    let mut out = Vec::with_capacity(observations.len());
    for obs in observations {
        // FRED marks missing observations with "."
        let Some(value) = parse_value(&obs.value) else {
            continue;
        };
        let date = NaiveDate::parse_from_str(&obs.date, "%Y-%m-%d").map_err(|e| {
            SourceError::MalformedResponse(format!(
                "invalid FRED date '{}' for {series_id}: {e}",
                obs.date
            ))
        })?;
        out.push((date, value));
    }
    Ok(out)
}

fn parse_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed == "." || trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

impl SourceAdapter for FredAdapter {
    fn name(&self) -> &str {
        "fred"
    }

    fn fetch(&self, spec: &SeriesSpec, request: &FetchRequest) -> Result<SeriesTable, SourceError> {
        let start = request.start_date().unwrap_or(self.history_start);
        let points = self.fetch_observations(&spec.remote_id, start)?;
        debug!(key = %spec.key, start = %start, rows = points.len(), "fetched FRED observations");

        if points.is_empty() && !request.tolerates_empty() {
            return Err(SourceError::EmptyResult(format!(
                "no FRED observations for {} since {start}",
                spec.remote_id
            )));
        }
        Ok(SeriesTable::time_value(spec.key.category.value_column(), points))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(date: &str, value: &str) -> Observation {
        Observation {
            date: date.into(),
            value: value.into(),
        }
    }

    #[test]
    fn missing_values_are_skipped() {
        let points = parse_observations(
            "DFF",
            vec![obs("2024-01-01", "5.33"), obs("2024-01-02", "."), obs("2024-01-03", "5.32")],
        )
        .unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[1].1, 5.32);
    }

    #[test]
    fn bad_dates_are_malformed() {
        let err = parse_observations("DFF", vec![obs("01/02/2024", "5.33")]).unwrap_err();
        assert!(matches!(err, SourceError::MalformedResponse(_)));
    }

    #[test]
    fn response_json_deserializes() {
        let body: ObservationsResponse = serde_json::from_str(
            r#"{"realtime_start":"2024-01-05","count":2,"observations":[
                {"realtime_start":"2024-01-05","date":"2024-01-03","value":"4.00"},
                {"realtime_start":"2024-01-05","date":"2024-01-04","value":"."}]}"#,
        )
        .unwrap();
        let points = parse_observations("DGS10", body.observations).unwrap();
        assert_eq!(points, vec![(NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(), 4.0)]);
    }
}
