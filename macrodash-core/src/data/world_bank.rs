//! World Bank indicators API adapter.
//!
//! One request per indicator covers every tracked economy; the flat
//! observation list is pivoted into an annual panel with one column per
//! World Bank country code.

use super::source::{transport_error, FetchRequest, SourceAdapter, SourceError};
use crate::registry::countries::{by_wb_code, COUNTRIES};
use crate::registry::SeriesSpec;
use crate::series::{IndexKey, PanelAxis};
use crate::table::{PanelRow, PanelTable, SeriesTable};
use chrono::{Datelike, Local};
use reqwest::blocking::Client;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

const BASE_URL: &str = "https://api.worldbank.org/v2/country";
const FIRST_YEAR: i32 = 2000;
const PER_PAGE: usize = 2000;

pub struct WorldBankAdapter {
    client: Client,
}

impl WorldBankAdapter {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn fetch_json(&self, indicator: &str, first: i32, last: i32) -> Result<Value, SourceError> {
        let codes: Vec<&str> = COUNTRIES.iter().map(|c| c.wb_code).collect();
        let url = format!("{BASE_URL}/{}/indicator/{indicator}", codes.join(";"));
        let resp = self
            .client
            .get(url)
            .query(&[
                ("format", "json".to_string()),
                ("date", format!("{first}:{last}")),
                ("per_page", PER_PAGE.to_string()),
            ])
            .send()
            .map_err(|e| transport_error(&format!("World Bank request for {indicator}"), e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::Unavailable(format!(
                "World Bank request for {indicator} failed with status {status}"
            )));
        }
        resp.json().map_err(|e| {
            SourceError::MalformedResponse(format!(
                "failed to parse World Bank response for {indicator}: {e}"
            ))
        })
    }
}

/// Pivot a `[meta, observations]` response into an annual panel.
fn pivot(indicator: &str, body: &Value) -> Result<PanelTable, SourceError> {
    let malformed = |msg: &str| SourceError::MalformedResponse(format!("{indicator}: {msg}"));

    let parts = body.as_array().ok_or_else(|| malformed("expected a JSON array"))?;
    if let Some(message) = parts.first().and_then(|m| m.get("message")) {
        return Err(malformed(&format!("API error {message}")));
    }

    let columns: Vec<String> = COUNTRIES.iter().map(|c| c.wb_code.to_string()).collect();
    let mut by_year: BTreeMap<i32, Vec<f64>> = BTreeMap::new();

    let observations = match parts.get(1) {
        Some(Value::Array(obs)) => obs.as_slice(),
        // An empty date range comes back as `[meta, null]`
        Some(Value::Null) | None => &[][..],
        Some(_) => return Err(malformed("observations are not an array")),
    };

    for obs in observations {
        let Some(value) = obs.get("value").and_then(Value::as_f64) else {
            continue;
        };
        let code = obs
            .get("countryiso3code")
            .and_then(Value::as_str)
            .ok_or_else(|| malformed("observation without country code"))?;
        let year = obs
            .get("date")
            .and_then(Value::as_str)
            .and_then(|d| d.parse::<i32>().ok())
            .ok_or_else(|| malformed("observation without a numeric year"))?;

        let Some(pos) =
            by_wb_code(code).and_then(|c| columns.iter().position(|col| col == c.wb_code))
        else {
            continue;
        };
        by_year.entry(year).or_insert_with(|| vec![f64::NAN; columns.len()])[pos] = value;
    }

    Ok(PanelTable {
        axis: PanelAxis::Annual,
        columns,
        rows: by_year
            .into_iter()
            .map(|(year, values)| PanelRow {
                key: IndexKey::Year(year),
                values,
            })
            .collect(),
    })
}

impl SourceAdapter for WorldBankAdapter {
    fn name(&self) -> &str {
        "world_bank"
    }

    fn fetch(&self, spec: &SeriesSpec, request: &FetchRequest) -> Result<SeriesTable, SourceError> {
        let last = Local::now().year() - 1;
        let first = request.start_date().map_or(FIRST_YEAR, |d| d.year()).min(last);

        let body = self.fetch_json(&spec.remote_id, first, last)?;
        let panel = pivot(&spec.remote_id, &body)?;
        debug!(
            key = %spec.key,
            first,
            last,
            rows = panel.rows.len(),
            "fetched World Bank indicator"
        );

        if panel.rows.is_empty() && !request.tolerates_empty() {
            return Err(SourceError::EmptyResult(format!(
                "no World Bank observations for {} in {first}..{last}",
                spec.remote_id
            )));
        }
        Ok(SeriesTable::Panel(panel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pivots_observations_by_year_and_country() {
        let body: Value = serde_json::from_str(
            r#"[{"page":1,"pages":1,"per_page":2000,"total":4},[
                {"indicator":{"id":"NY.GDP.MKTP.KD.ZG"},"country":{"id":"US"},"countryiso3code":"USA","date":"2023","value":2.5},
                {"indicator":{"id":"NY.GDP.MKTP.KD.ZG"},"country":{"id":"US"},"countryiso3code":"USA","date":"2022","value":1.9},
                {"indicator":{"id":"NY.GDP.MKTP.KD.ZG"},"country":{"id":"XC"},"countryiso3code":"EMU","date":"2023","value":0.4},
                {"indicator":{"id":"NY.GDP.MKTP.KD.ZG"},"country":{"id":"DE"},"countryiso3code":"DEU","date":"2023","value":null}
            ]]"#,
        )
        .unwrap();
        let panel = pivot("NY.GDP.MKTP.KD.ZG", &body).unwrap();
        assert_eq!(panel.columns.len(), 13);
        assert_eq!(panel.rows.len(), 2);
        assert_eq!(panel.rows[0].key, IndexKey::Year(2022));
        assert_eq!(panel.rows[1].values[0], 2.5);
        assert_eq!(panel.rows[1].values[1], 0.4);
        assert!(panel.rows[1].values[12].is_nan());
    }

    #[test]
    fn api_errors_are_malformed() {
        let body: Value = serde_json::from_str(
            r#"[{"message":[{"id":"120","key":"Invalid value","value":"The provided parameter value is not valid"}]}]"#,
        )
        .unwrap();
        assert!(matches!(pivot("BAD", &body), Err(SourceError::MalformedResponse(_))));
    }

    #[test]
    fn null_page_is_empty() {
        let body: Value = serde_json::from_str(r#"[{"page":0,"pages":0,"total":0},null]"#).unwrap();
        assert!(pivot("FI.RES.TOTL.CD", &body).unwrap().rows.is_empty());
    }
}
