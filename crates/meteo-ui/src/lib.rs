//! Presentation-side state for the Meteo dashboard.
//!
//! [`WeatherController`] owns the acquisition state machine. Geolocation and
//! network work run on the tokio runtime; results come back over a channel and
//! are applied when the owner polls.

pub mod controller;
pub mod error_mapping;
pub mod service;
pub mod state;

pub use controller::{ControllerOptions, SubscriptionId, WeatherController};
pub use state::{AcquisitionError, AcquisitionState, ErrorKind, Phase};
