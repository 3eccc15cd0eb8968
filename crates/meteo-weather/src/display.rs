//! Presentation helpers: turn a snapshot into the strings shown on the card.

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;

use crate::theme::{classify, requires_protection, ThemeDescriptor};
use crate::types::{Coordinates, WeatherSnapshot};

const WIND_DIRS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SO", "O", "NO"];
const ICON_BASE_URL: &str = "https://openweathermap.org/img/wn";

pub const PRESSURE_GAUGE_MIN_HPA: f64 = 950.0;
pub const PRESSURE_GAUGE_SPAN_HPA: f64 = 100.0;

/// Round half up (2.5 → 3, -2.5 → -2), the way the card has always rounded.
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Wind speed in km/h from m/s.
pub fn wind_kmh(speed_ms: f64) -> i64 {
    round_half_up(speed_ms * 3.6)
}

/// 8-point compass label (French abbreviations).
pub fn compass_point(degrees: f64) -> &'static str {
    let index = round_half_up(degrees / 45.0).rem_euclid(8) as usize;
    WIND_DIRS[index]
}

pub fn visibility_label(meters: Option<u32>) -> String {
    match meters {
        Some(m) => format!("{}km", round_half_up(f64::from(m) / 1000.0)),
        None => "-".to_string(),
    }
}

/// Fill of the 950–1050 hPa gauge, in percent.
pub fn pressure_gauge_percent(hpa: f64) -> f64 {
    ((hpa - PRESSURE_GAUGE_MIN_HPA) / PRESSURE_GAUGE_SPAN_HPA * 100.0).clamp(0.0, 100.0)
}

fn at_offset(timestamp: i64, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    DateTime::<Utc>::from_timestamp(timestamp, 0).map(|t| t.with_timezone(&offset))
}

/// `HH:MM` wall-clock time at the observed location.
pub fn local_clock(timestamp: i64, offset: FixedOffset) -> String {
    at_offset(timestamp, offset)
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_default()
}

pub fn coordinates_label(coordinates: &Coordinates) -> String {
    format!("{:.2}°, {:.2}°", coordinates.latitude, coordinates.longitude)
}

pub fn icon_url(icon: &str) -> String {
    format!("{}/{}@4x.png", ICON_BASE_URL, icon)
}

/// Everything the card renders, pre-formatted.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardCard {
    pub location: String,
    pub country: String,
    pub coordinates: String,
    pub description: String,
    pub icon_url: String,
    pub temperature: i64,
    pub feels_like: i64,
    pub min: i64,
    pub max: i64,
    pub humidity: String,
    pub wind: String,
    pub wind_direction: &'static str,
    pub visibility: String,
    pub pressure: String,
    pub pressure_gauge_percent: f64,
    pub sunrise: String,
    pub sunset: String,
    pub observed_at: String,
    pub requires_protection: bool,
    pub theme: ThemeDescriptor,
}

impl DashboardCard {
    pub fn new(snapshot: &WeatherSnapshot) -> Self {
        let offset = snapshot.local_offset();
        let observed_at = at_offset(snapshot.observed_at, offset)
            .map(|t| t.format("%d/%m/%Y %H:%M").to_string())
            .unwrap_or_default();

        Self {
            location: snapshot.location_name.clone(),
            country: snapshot.country.clone(),
            coordinates: coordinates_label(&snapshot.coordinates),
            description: snapshot.condition.description.clone(),
            icon_url: icon_url(&snapshot.condition.icon),
            temperature: round_half_up(snapshot.temperature.current),
            feels_like: round_half_up(snapshot.temperature.feels_like),
            min: round_half_up(snapshot.temperature.min),
            max: round_half_up(snapshot.temperature.max),
            humidity: format!("{}%", snapshot.humidity),
            wind: format!("{}km/h", wind_kmh(snapshot.wind.speed)),
            wind_direction: compass_point(snapshot.wind.direction),
            visibility: visibility_label(snapshot.visibility_meters),
            pressure: format!("{} hPa", snapshot.pressure_hpa),
            pressure_gauge_percent: pressure_gauge_percent(snapshot.pressure_hpa),
            sunrise: local_clock(snapshot.sunrise, offset),
            sunset: local_clock(snapshot.sunset, offset),
            observed_at,
            requires_protection: requires_protection(snapshot.condition_code()),
            theme: *classify(snapshot.condition_code()),
        }
    }
}

impl std::fmt::Display for DashboardCard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{} ({}) · {}", self.location, self.country, self.coordinates)?;
        writeln!(f, "{}°  {}", self.temperature, self.description)?;
        writeln!(
            f,
            "Ressenti {}° · {}° / {}°",
            self.feels_like, self.min, self.max
        )?;
        writeln!(
            f,
            "Humidité {} · Vent {} {} · Visib. {}",
            self.humidity, self.wind, self.wind_direction, self.visibility
        )?;
        writeln!(
            f,
            "Pression {} ({:.0}%)",
            self.pressure, self.pressure_gauge_percent
        )?;
        writeln!(f, "Lever {} · Coucher {}", self.sunrise, self.sunset)?;
        writeln!(f, "{} · {}", self.theme.label, self.theme.advisory)?;
        write!(f, "Données du {}", self.observed_at)
    }
}
