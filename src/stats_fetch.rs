use anyhow::Context;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::http_client::http_client;

const STATS_URL: &str = "https://api2.foldingathome.org/uid/";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid user id: {0}")]
    InvalidInput(String),
    #[error("user not found: {0}")]
    NotFound(String),
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("http {status}: {message}")]
    Upstream { status: u16, message: String },
}

/// One user's stats as reported by the donor API. Every field is optional;
/// absent keys deserialize to `None` and get defaulted at display time.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserStats {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub score: Option<u64>,
    #[serde(default)]
    pub wus: Option<u64>,
    #[serde(default)]
    pub rank: Option<u64>,
    #[serde(default)]
    pub active_50: Option<u64>,
    #[serde(default)]
    pub active_7: Option<u64>,
    #[serde(default)]
    pub last: Option<Timestamp>,
    #[serde(default)]
    pub users: Option<u64>,
    #[serde(default)]
    pub teams: Vec<TeamStats>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeamStats {
    #[serde(default)]
    pub team: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub trank: Option<u64>,
    #[serde(default)]
    pub tscore: Option<u64>,
    #[serde(default)]
    pub twus: Option<u64>,
    #[serde(default)]
    pub founder: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
    // Contribution attributable to the user within this team, not team totals.
    #[serde(default)]
    pub score: Option<u64>,
    #[serde(default)]
    pub wus: Option<u64>,
    #[serde(default)]
    pub last: Option<Timestamp>,
    #[serde(default)]
    pub active_50: Option<u64>,
    #[serde(default)]
    pub active_7: Option<u64>,
}

/// The API reports `last` either as `"2025-11-17 16:14:37"` or as unix
/// seconds depending on endpoint revision; accept both.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Seconds(i64),
    Text(String),
}

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

impl Timestamp {
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        match self {
            Timestamp::Seconds(secs) => Utc.timestamp_opt(*secs, 0).single(),
            Timestamp::Text(raw) => parse_datetime(raw),
        }
    }
}

fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(Utc.from_utc_datetime(&dt));
        }
    }
    None
}

pub fn validate_user_id(raw: &str) -> Result<&str, FetchError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FetchError::InvalidInput(
            "user id must be numeric (e.g. 123456789)".to_string(),
        ));
    }
    Ok(trimmed)
}

pub fn fetch_user_stats(user_id: &str) -> Result<UserStats, FetchError> {
    let user_id = validate_user_id(user_id)?;
    let client = http_client().map_err(|err| FetchError::Network(err.to_string()))?;

    let url = format!("{STATS_URL}{user_id}");
    let resp = client.get(&url).send().map_err(map_transport_error)?;

    let status = resp.status();
    let body = resp.text().map_err(map_transport_error)?;

    if status == StatusCode::BAD_REQUEST {
        return Err(FetchError::InvalidInput(body_error_message(
            &body,
            "bad request - invalid user id format",
        )));
    }
    if status == StatusCode::NOT_FOUND {
        return Err(FetchError::NotFound(body_error_message(
            &body,
            "user not found",
        )));
    }
    if !status.is_success() {
        return Err(FetchError::Upstream {
            status: status.as_u16(),
            message: body_error_message(&body, &format!("http {status}")),
        });
    }

    parse_user_stats_json(&body).map_err(|err| FetchError::Upstream {
        status: status.as_u16(),
        message: format!("{err:#}"),
    })
}

fn map_transport_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Network(err.to_string())
    }
}

// Error bodies are either a bare string or `{"error": "..."}`.
fn body_error_message(body: &str, fallback: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return fallback.to_string();
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::String(msg)) if !msg.trim().is_empty() => msg.trim().to_string(),
        Ok(value) => value
            .get("error")
            .and_then(|v| v.as_str())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| fallback.to_string()),
        Err(_) => trimmed.to_string(),
    }
}

pub fn parse_user_stats_json(raw: &str) -> anyhow::Result<UserStats> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(UserStats::default());
    }
    serde_json::from_str(trimmed).context("invalid stats json")
}
