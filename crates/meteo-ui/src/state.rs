//! Acquisition state.
//!
//! A snapshot slot plus one activity: idle, busy in a phase, or failed. Phase
//! and error live in the same enum, so both can never be set at once.

use meteo_weather::WeatherSnapshot;
use serde::Serialize;

/// What the controller is waiting on. Absent means idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Locating,
    Fetching,
}

impl Phase {
    /// Caption shown under the spinner.
    pub fn caption(self) -> &'static str {
        match self {
            Phase::Locating => "Détection position…",
            Phase::Fetching => "Chargement données…",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    GeoDenied,
    GeoUnavailable,
    CityNotFound,
    Network,
    Unknown,
}

impl ErrorKind {
    pub fn is_geolocation(self) -> bool {
        matches!(self, ErrorKind::GeoDenied | ErrorKind::GeoUnavailable)
    }
}

/// Error banner content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AcquisitionError {
    pub kind: ErrorKind,
    pub message: String,
}

impl AcquisitionError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn title(&self) -> &'static str {
        match self.kind {
            ErrorKind::CityNotFound => "Ville introuvable",
            ErrorKind::GeoDenied | ErrorKind::GeoUnavailable => "Localisation refusée",
            ErrorKind::Network | ErrorKind::Unknown => "Erreur réseau",
        }
    }

    /// Only geolocation failures offer a retry action.
    pub fn is_retryable(&self) -> bool {
        self.kind.is_geolocation()
    }
}

impl std::fmt::Display for AcquisitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} : {}", self.title(), self.message)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Activity {
    Idle,
    Busy(Phase),
    Failed(AcquisitionError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AcquisitionState {
    activity: Activity,
    snapshot: Option<WeatherSnapshot>,
}

impl Default for AcquisitionState {
    fn default() -> Self {
        Self {
            activity: Activity::Busy(Phase::Locating),
            snapshot: None,
        }
    }
}

impl AcquisitionState {
    pub fn phase(&self) -> Option<Phase> {
        match self.activity {
            Activity::Busy(phase) => Some(phase),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&AcquisitionError> {
        match &self.activity {
            Activity::Failed(error) => Some(error),
            _ => None,
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error().map(|e| e.kind)
    }

    pub fn snapshot(&self) -> Option<&WeatherSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.activity, Activity::Idle)
    }

    pub fn is_loading(&self) -> bool {
        self.phase().is_some()
    }

    /// The last snapshot is still shown, but an error banner sits over it.
    pub fn is_stale(&self) -> bool {
        self.snapshot.is_some() && self.error().is_some()
    }

    pub fn loading_caption(&self) -> Option<&'static str> {
        self.phase().map(Phase::caption)
    }

    pub(crate) fn begin(&mut self, phase: Phase) {
        self.activity = Activity::Busy(phase);
    }

    pub(crate) fn fail(&mut self, error: AcquisitionError) {
        self.activity = Activity::Failed(error);
    }

    /// Install a fresh snapshot; clears any previous error.
    pub(crate) fn install(&mut self, snapshot: WeatherSnapshot) {
        self.snapshot = Some(snapshot);
        self.activity = Activity::Idle;
    }

    /// Returns false when there was no error to clear.
    pub(crate) fn dismiss(&mut self) -> bool {
        if self.error().is_none() {
            return false;
        }
        self.activity = Activity::Idle;
        true
    }
}
