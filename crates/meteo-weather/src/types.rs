use chrono::{DateTime, FixedOffset, Offset, Utc};
use meteo_core::{NetworkError, ReqwestErrorExt};
use serde::{Deserialize, Serialize};

/// Provider condition code (2xx thunderstorm … 8xx clouds).
/// See: https://openweathermap.org/weather-conditions
pub type ConditionCode = i32;

/// Geographic coordinates in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Primary weather condition reported by the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub code: ConditionCode,
    /// Localized description ("ciel dégagé")
    pub description: String,
    /// Provider icon hint ("01d")
    pub icon: String,
}

/// Temperatures in Celsius
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Temperatures {
    pub current: f64,
    pub feels_like: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    /// Meters per second
    pub speed: f64,
    /// Meteorological degrees (direction the wind blows from)
    pub direction: f64,
}

/// One complete observation as returned by the provider.
///
/// Immutable once built; the controller replaces it wholesale on every
/// successful fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub coordinates: Coordinates,
    pub condition: Condition,
    pub temperature: Temperatures,
    pub pressure_hpa: f64,
    pub humidity: u8,
    pub visibility_meters: Option<u32>,
    pub wind: Wind,
    /// Unix timestamps
    pub sunrise: i64,
    pub sunset: i64,
    pub location_name: String,
    pub country: String,
    pub observed_at: i64,
    /// Shift from UTC in seconds
    pub utc_offset_secs: i32,
}

impl WeatherSnapshot {
    pub fn condition_code(&self) -> ConditionCode {
        self.condition.code
    }

    /// Offset of the observed location; falls back to UTC for nonsense offsets.
    pub fn local_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_secs).unwrap_or_else(|| Utc.fix())
    }

    pub fn observed_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.observed_at, 0)
    }
}

/// Raw current-weather payload forwarded verbatim by the proxy.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ProviderPayload {
    coord: ProviderCoord,
    weather: Vec<ProviderCondition>,
    main: ProviderMain,
    visibility: Option<u32>,
    wind: ProviderWind,
    dt: i64,
    sys: ProviderSys,
    #[serde(default)]
    timezone: i32,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ProviderCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct ProviderCondition {
    id: ConditionCode,
    #[serde(default)]
    description: String,
    #[serde(default)]
    icon: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ProviderMain {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    pressure: f64,
    humidity: u8,
}

#[derive(Debug, Clone, Deserialize)]
struct ProviderWind {
    speed: f64,
    #[serde(default)]
    deg: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct ProviderSys {
    #[serde(default)]
    country: String,
    sunrise: i64,
    sunset: i64,
}

impl TryFrom<ProviderPayload> for WeatherSnapshot {
    type Error = FetchError;

    fn try_from(payload: ProviderPayload) -> Result<Self, Self::Error> {
        let primary = payload
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::Parse("payload has no weather condition".to_string()))?;

        Ok(Self {
            coordinates: Coordinates::new(payload.coord.lat, payload.coord.lon),
            condition: Condition {
                code: primary.id,
                description: primary.description,
                icon: primary.icon,
            },
            temperature: Temperatures {
                current: payload.main.temp,
                feels_like: payload.main.feels_like,
                min: payload.main.temp_min,
                max: payload.main.temp_max,
            },
            pressure_hpa: payload.main.pressure,
            humidity: payload.main.humidity,
            visibility_meters: payload.visibility,
            wind: Wind {
                speed: payload.wind.speed,
                direction: payload.wind.deg,
            },
            sunrise: payload.sys.sunrise,
            sunset: payload.sys.sunset,
            location_name: payload.name,
            country: payload.sys.country,
            observed_at: payload.dt,
            utc_offset_secs: payload.timezone,
        })
    }
}

/// Position provider errors.
///
/// Codes 1/2/3 follow the platform-standard geolocation failure codes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location position unavailable")]
    PositionUnavailable,
    #[error("Location request timed out")]
    Timeout,
    #[error("Geolocation not supported on this platform")]
    Unsupported,
    #[error("Location error ({code}): {message}")]
    Other { code: u16, message: String },
}

impl LocationError {
    pub const PERMISSION_DENIED: u16 = 1;
    pub const POSITION_UNAVAILABLE: u16 = 2;
    pub const TIMEOUT: u16 = 3;

    /// Build from a platform failure code and its message.
    pub fn from_code(code: u16, message: impl Into<String>) -> Self {
        match code {
            Self::PERMISSION_DENIED => Self::PermissionDenied,
            Self::POSITION_UNAVAILABLE => Self::PositionUnavailable,
            Self::TIMEOUT => Self::Timeout,
            _ => Self::Other {
                code,
                message: message.into(),
            },
        }
    }
}

/// Weather fetch errors
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Non-2xx answer from the proxy, with the payload's message if any.
    #[error("Proxy returned HTTP {status}")]
    Status { status: u16, message: Option<String> },
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        Self::Network(e.into_network_error())
    }
}
