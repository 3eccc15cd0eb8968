//! Built-in observation served when no proxy is configured.

use chrono::Utc;

use crate::provider::{WeatherQuery, WeatherSource};
use crate::types::{
    Condition, Coordinates, FetchError, Temperatures, WeatherSnapshot, Wind,
};

/// Clear-sky Paris observation anchored at `now` (unix seconds).
pub fn demo_snapshot(now: i64) -> WeatherSnapshot {
    WeatherSnapshot {
        coordinates: Coordinates::new(48.8534, 2.3488),
        condition: Condition {
            code: 800,
            description: "ciel dégagé".to_string(),
            icon: "01d".to_string(),
        },
        temperature: Temperatures {
            current: 22.0,
            feels_like: 21.0,
            min: 18.0,
            max: 25.0,
        },
        pressure_hpa: 1018.0,
        humidity: 45,
        visibility_meters: Some(10_000),
        wind: Wind {
            speed: 3.5,
            direction: 180.0,
        },
        sunrise: now - 4 * 3600,
        sunset: now + 4 * 3600,
        location_name: "Paris".to_string(),
        country: "FR".to_string(),
        observed_at: now,
        utc_offset_secs: 3600,
    }
}

/// Answers every query with [`demo_snapshot`]; never live.
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoSource;

impl WeatherSource for DemoSource {
    fn is_live(&self) -> bool {
        false
    }

    async fn fetch(&self, query: &WeatherQuery) -> Result<WeatherSnapshot, FetchError> {
        tracing::info!("Serving demo weather for {}", query);
        Ok(demo_snapshot(Utc::now().timestamp()))
    }
}
