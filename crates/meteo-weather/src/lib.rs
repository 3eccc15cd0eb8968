//! Weather domain for Meteo
//!
//! Condition-code theming, the provider snapshot model, the weather proxy
//! client and the position provider abstraction.

pub mod types;
pub mod theme;
pub mod location;
pub mod provider;
pub mod demo;
pub mod display;

pub use types::*;
pub use theme::{advice_for, classify, requires_protection, IconId, ThemeDescriptor};
pub use location::{FixedGeolocator, Geolocator, Position, PositionOptions, UnsupportedGeolocator};
pub use provider::{ProxyClient, QueryError, WeatherQuery, WeatherSource};
pub use demo::DemoSource;
pub use display::DashboardCard;
