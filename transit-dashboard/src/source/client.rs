//! HTTP client for the dashboard backend.
//!
//! One request per call; no retries, no caching. All state ownership lives
//! in the resource slots that drive this client.

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::domain::{AirQuality, Departure, Station, StationId, Weather};

use super::DataSource;
use super::convert::{convert_air_quality, convert_departures, convert_stations, convert_weather};
use super::error::SourceError;
use super::types::{AirQualityDto, DeparturesResponse, ErrorBody, StationsResponse, WeatherDto};

/// Default backend base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// How much of an unparsable body to keep in errors.
const BODY_EXCERPT_CHARS: usize = 500;

/// Configuration for the API client.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL for the backend
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// User-Agent header value
    pub user_agent: String,
}

impl ApiConfig {
    /// Create a config for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: concat!("transit-dashboard/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the User-Agent header value.
    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Backend API client.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client with the given configuration.
    pub fn new(config: ApiConfig) -> Result<Self, SourceError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let agent = HeaderValue::from_str(&config.user_agent).map_err(|_| SourceError::Api {
            status: 0,
            message: "Invalid user agent format".to_string(),
        })?;
        headers.insert(USER_AGENT, agent);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }

    /// The base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET a path and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, SourceError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self.http.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Api {
                status: status.as_u16(),
                message: error_message(status, &body),
            });
        }

        let body = response.text().await?;
        debug!(url = %url, bytes = body.len(), "Fetched");

        serde_json::from_str(&body).map_err(|e| SourceError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(BODY_EXCERPT_CHARS).collect()),
        })
    }
}

impl DataSource for ApiClient {
    async fn stations(&self) -> Result<Vec<Station>, SourceError> {
        let response: StationsResponse = self.get_json("/api/stations").await?;
        Ok(convert_stations(response.stations))
    }

    async fn departures(&self, station: &StationId) -> Result<Vec<Departure>, SourceError> {
        let path = format!("/api/departures/{}", station.as_str());
        let response: DeparturesResponse = self.get_json(&path).await?;
        Ok(convert_departures(response.departures)?)
    }

    async fn weather(&self) -> Result<Weather, SourceError> {
        let dto: WeatherDto = self.get_json("/api/weather").await?;
        Ok(convert_weather(dto))
    }

    async fn air_quality(&self) -> Result<AirQuality, SourceError> {
        let dto: AirQualityDto = self.get_json("/api/aqi").await?;
        Ok(convert_air_quality(dto)?)
    }
}

/// Pick the most useful message from an error response.
///
/// Prefers a JSON `detail` field, then a short body, then the status reason.
fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return parsed.detail;
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() && !trimmed.starts_with('<') {
        return trimmed.chars().take(BODY_EXCERPT_CHARS).collect();
    }

    status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string()
}
