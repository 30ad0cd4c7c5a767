//! Banxico SIE API integration.
//!
//! One GET per series against `{base}/{id}/datos`, authenticated with the
//! `Bmx-Token` header. Payload decoding lives in `parse_series_payload` so it
//! can be tested without a network.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use reqwest::blocking::{Client, ClientBuilder};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::{FetchConfig, Observation, SeriesData, SeriesDescriptor};
use crate::error::{AppError, error_chain};

pub const TOKEN_ENV: &str = "BANXICO_TOKEN";
const TOKEN_HEADER: &str = "Bmx-Token";
const DATE_FORMAT: &str = "%d/%m/%Y";

/// Anything that can produce a series by descriptor.
///
/// The pipeline only talks to this trait, so tests can swap in canned data.
pub trait SeriesSource {
    fn fetch_series(&self, series: &SeriesDescriptor) -> Result<SeriesData, AppError>;
}

pub struct BanxicoClient {
    client: Client,
    base_url: String,
    token: String,
}

impl BanxicoClient {
    /// Build a client using `BANXICO_TOKEN` from the environment (or `.env`).
    pub fn from_env(config: &FetchConfig) -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let token = resolve_token(std::env::var(TOKEN_ENV).ok())?;
        Self::new(token, config)
    }

    pub fn new(token: String, config: &FetchConfig) -> Result<Self, AppError> {
        Self::with_builder(token, config, client_builder(config))
    }

    fn with_builder(token: String, config: &FetchConfig, builder: ClientBuilder) -> Result<Self, AppError> {
        let client = builder
            .build()
            .map_err(|e| AppError::config(format!("Failed to build HTTP client: {}", error_chain(&e))))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn series_url(&self, series_id: &str) -> String {
        format!("{}/{series_id}/datos", self.base_url)
    }
}

impl SeriesSource for BanxicoClient {
    fn fetch_series(&self, series: &SeriesDescriptor) -> Result<SeriesData, AppError> {
        let url = self.series_url(series.id);
        debug!(%url, "requesting series");

        let resp = self
            .client
            .get(&url)
            .header(TOKEN_HEADER, &self.token)
            .send()
            .map_err(|e| AppError::fetch(format!("Request for {} failed: {}", series.id, error_chain(&e))))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AppError::fetch(format!(
                "Request for {} failed with status {status}.",
                series.id
            )));
        }

        let body = resp
            .text()
            .map_err(|e| AppError::fetch(format!("Failed to read response for {}: {}", series.id, error_chain(&e))))?;

        parse_series_payload(series, &body)
    }
}

fn client_builder(config: &FetchConfig) -> ClientBuilder {
    Client::builder()
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
}

/// Validate the token value read from the environment.
pub fn resolve_token(raw: Option<String>) -> Result<String, AppError> {
    match raw.map(|t| t.trim().to_string()) {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(AppError::config(format!(
            "{TOKEN_ENV} not found. Set it in the environment (or a .env file)."
        ))),
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    bmx: Option<BmxBody>,
}

#[derive(Debug, Deserialize)]
struct BmxBody {
    series: Option<Vec<SeriesPayload>>,
}

#[derive(Debug, Deserialize)]
struct SeriesPayload {
    datos: Option<Vec<RawObservation>>,
}

#[derive(Debug, Deserialize)]
struct RawObservation {
    fecha: String,
    #[serde(default)]
    dato: serde_json::Value,
}

/// Decode a `/datos` response body into a date-sorted series.
///
/// Structural problems (bad JSON, missing `bmx.series[0].datos`, empty
/// observation list, unparseable dates) fail the series. Non-numeric values
/// do not: they become `None`.
pub fn parse_series_payload(series: &SeriesDescriptor, body: &str) -> Result<SeriesData, AppError> {
    let envelope: Envelope = serde_json::from_str(body)
        .map_err(|e| AppError::fetch(format!("Failed to parse response for {}: {e}", series.id)))?;

    let payload = envelope
        .bmx
        .and_then(|b| b.series)
        .and_then(|s| s.into_iter().next())
        .ok_or_else(|| AppError::fetch(format!("Response for {} is missing `bmx.series`.", series.id)))?;

    let datos = payload
        .datos
        .ok_or_else(|| AppError::fetch(format!("Response for {} has no `datos`.", series.id)))?;

    if datos.is_empty() {
        return Err(AppError::fetch(format!(
            "No observations returned for series {}.",
            series.id
        )));
    }

    let mut by_date: BTreeMap<NaiveDate, Option<f64>> = BTreeMap::new();
    let mut duplicates = 0usize;
    for raw in &datos {
        let date = NaiveDate::parse_from_str(raw.fecha.trim(), DATE_FORMAT).map_err(|e| {
            AppError::fetch(format!("Invalid date '{}' in series {}: {e}", raw.fecha, series.id))
        })?;
        if by_date.insert(date, coerce_value(&raw.dato)).is_some() {
            duplicates += 1;
        }
    }

    if duplicates > 0 {
        warn!(series = series.id, duplicates, "duplicate dates in payload, keeping last value");
    }

    Ok(SeriesData {
        id: series.id.to_string(),
        name: series.name.to_string(),
        observations: by_date
            .into_iter()
            .map(|(date, value)| Observation { date, value })
            .collect(),
    })
}

fn coerce_value(raw: &serde_json::Value) -> Option<f64> {
    match raw {
        serde_json::Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        serde_json::Value::String(s) => parse_value(s),
        _ => None,
    }
}

fn parse_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let v = trimmed.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}
