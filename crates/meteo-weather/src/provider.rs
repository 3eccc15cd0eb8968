//! Weather proxy client.
//!
//! The proxy (`GET {base}/weather?lat=..&lon=..` or `?city=..`) keeps the
//! provider credential server-side and forwards the upstream JSON body
//! verbatim, with the upstream status on failure.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use crate::types::{Coordinates, FetchError, ProviderPayload, WeatherSnapshot};

const WEATHER_ROUTE: &str = "weather";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// What to fetch. Coordinates and city are mutually exclusive by construction.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherQuery {
    Coordinates(Coordinates),
    City(String),
}

/// Rejections for raw query parameters, mirroring the proxy's 400 answers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("Fournissez lat & lon, ou city.")]
    Missing,
    #[error("lat et lon doivent être fournis ensemble.")]
    UnpairedCoordinates,
    #[error("Coordonnée invalide : {0}")]
    InvalidNumber(String),
}

impl WeatherQuery {
    pub fn city(name: impl Into<String>) -> Self {
        Self::City(name.into())
    }

    /// Validate raw `lat`/`lon`/`city` parameters. Empty values count as absent;
    /// a complete coordinate pair takes precedence over a city.
    pub fn from_params(
        lat: Option<&str>,
        lon: Option<&str>,
        city: Option<&str>,
    ) -> Result<Self, QueryError> {
        fn present(value: Option<&str>) -> Option<&str> {
            value.map(str::trim).filter(|s| !s.is_empty())
        }
        let (lat, lon, city) = (present(lat), present(lon), present(city));

        match (lat, lon) {
            (Some(lat), Some(lon)) => {
                let parse = |raw: &str| {
                    raw.parse::<f64>()
                        .map_err(|_| QueryError::InvalidNumber(raw.to_string()))
                };
                Ok(Self::Coordinates(Coordinates::new(parse(lat)?, parse(lon)?)))
            }
            (Some(_), None) | (None, Some(_)) => Err(QueryError::UnpairedCoordinates),
            (None, None) => city
                .map(|c| Self::City(c.to_string()))
                .ok_or(QueryError::Missing),
        }
    }

    /// Query-string pairs for the proxy route.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::Coordinates(c) => vec![
                ("lat", c.latitude.to_string()),
                ("lon", c.longitude.to_string()),
            ],
            Self::City(name) => vec![("city", name.clone())],
        }
    }
}

impl std::fmt::Display for WeatherQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Coordinates(c) => write!(f, "{:.4}, {:.4}", c.latitude, c.longitude),
            Self::City(name) => write!(f, "{}", name),
        }
    }
}

/// A source of current-conditions snapshots.
pub trait WeatherSource: Send + Sync + 'static {
    /// True when answers come from the real provider (the "Live" badge).
    fn is_live(&self) -> bool;

    fn fetch(
        &self,
        query: &WeatherQuery,
    ) -> impl Future<Output = Result<WeatherSnapshot, FetchError>> + Send;
}

/// Error body shape: the proxy wraps failures as `{"error": ..}`, the
/// upstream provider uses `{"message": ..}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

/// Best-effort message extraction from a failed response body.
pub(crate) fn error_message_from_body(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    parsed
        .error
        .or(parsed.message)
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
}

#[derive(Debug, Clone)]
pub struct ProxyClient {
    client: Arc<Client>,
    base_url: String,
}

impl ProxyClient {
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch current conditions through the proxy.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_weather(&self, query: &WeatherQuery) -> Result<WeatherSnapshot, FetchError> {
        let url = format!("{}/{}", self.base_url, WEATHER_ROUTE);

        let response = self
            .client
            .get(&url)
            .query(&query.to_params())
            .send()
            .await?;

        let status = response.status();

        if let Some(age) = response.headers().get(reqwest::header::AGE) {
            tracing::debug!("Proxy served cached weather (age {:?})", age);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message_from_body(&body);
            tracing::warn!("Weather proxy returned {} for {}: {:?}", status, query, message);
            return Err(FetchError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let payload: ProviderPayload = response
            .json()
            .await
            .map_err(|e| FetchError::Parse(e.to_string()))?;

        let snapshot = WeatherSnapshot::try_from(payload)?;
        tracing::info!(
            "Fetched weather for {} ({})",
            snapshot.location_name,
            snapshot.condition_code()
        );
        Ok(snapshot)
    }
}

impl WeatherSource for ProxyClient {
    fn is_live(&self) -> bool {
        true
    }

    async fn fetch(&self, query: &WeatherQuery) -> Result<WeatherSnapshot, FetchError> {
        self.fetch_weather(query).await
    }
}
