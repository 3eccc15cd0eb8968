//! Position providers.
//!
//! The controller only needs a single-shot "current position" call plus an
//! availability probe; platform integrations implement [`Geolocator`].

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::types::{Coordinates, LocationError};

/// Limits passed with every position request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    /// Maximum wait for a fix
    pub timeout: Duration,
    /// Oldest cached reading the caller accepts
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            maximum_age: Duration::from_secs(300),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub coordinates: Coordinates,
    pub timestamp: DateTime<Utc>,
}

pub trait Geolocator: Send + Sync + 'static {
    /// False when the platform has no position API at all.
    fn is_available(&self) -> bool {
        true
    }

    fn current_position(
        &self,
        options: PositionOptions,
    ) -> impl Future<Output = Result<Position, LocationError>> + Send;
}

/// Reports a configured position. Stands in for a device provider on
/// headless hosts and in tests.
#[derive(Debug, Clone)]
pub struct FixedGeolocator {
    coordinates: Coordinates,
}

impl FixedGeolocator {
    pub fn new(coordinates: Coordinates) -> Self {
        Self { coordinates }
    }
}

impl Geolocator for FixedGeolocator {
    async fn current_position(&self, _options: PositionOptions) -> Result<Position, LocationError> {
        tracing::debug!(
            "Reporting fixed position {}, {}",
            self.coordinates.latitude,
            self.coordinates.longitude
        );
        Ok(Position {
            coordinates: self.coordinates,
            timestamp: Utc::now(),
        })
    }
}

/// Platform without any position API.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedGeolocator;

impl Geolocator for UnsupportedGeolocator {
    fn is_available(&self) -> bool {
        false
    }

    async fn current_position(&self, _options: PositionOptions) -> Result<Position, LocationError> {
        Err(LocationError::Unsupported)
    }
}
