//! Weather acquisition controller.
//!
//! Owns [`AcquisitionState`] and drives it from user actions and from results
//! delivered by the service tasks. All state changes happen on the owner's
//! thread, inside [`WeatherController::poll`] or the async drain helpers.
//!
//! Every geolocation or fetch issue bumps a request sequence. With
//! `discard_stale_responses` set, a result whose sequence is no longer the
//! latest is dropped; otherwise the last result to arrive wins.

use std::sync::Arc;

use meteo_core::Config;
use meteo_weather::{
    classify, Geolocator, LocationError, PositionOptions, ThemeDescriptor, WeatherQuery,
    WeatherSource,
};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::error_mapping::fetch_error;
use crate::service::{self, AcquisitionMessage};
use crate::state::{AcquisitionError, AcquisitionState, Phase};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerOptions {
    pub position: PositionOptions,
    pub discard_stale_responses: bool,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            position: PositionOptions::default(),
            discard_stale_responses: true,
        }
    }
}

impl ControllerOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            position: PositionOptions {
                timeout: config.geolocation.timeout(),
                maximum_age: config.geolocation.maximum_age(),
            },
            discard_stale_responses: config.controller.discard_stale_responses,
        }
    }
}

/// Handle returned by [`WeatherController::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type ThemeCallback = Box<dyn FnMut(&ThemeDescriptor) + Send>;

pub struct WeatherController<G, S> {
    geolocator: Arc<G>,
    source: Arc<S>,
    options: ControllerOptions,
    runtime: Handle,
    tx: UnboundedSender<AcquisitionMessage>,
    rx: UnboundedReceiver<AcquisitionMessage>,
    state: AcquisitionState,
    /// Sequence of the most recently issued request
    latest_seq: u64,
    /// Sequence the outstanding geolocation call answers for
    location_seq: Option<u64>,
    /// Spawned tasks whose result has not been received yet
    in_flight: usize,
    theme: Option<&'static ThemeDescriptor>,
    subscribers: Vec<(SubscriptionId, ThemeCallback)>,
    next_subscription: u64,
}

impl<G: Geolocator, S: WeatherSource> WeatherController<G, S> {
    /// Create the controller and request the device position once.
    pub fn new(geolocator: G, source: S, options: ControllerOptions, runtime: Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut controller = Self {
            geolocator: Arc::new(geolocator),
            source: Arc::new(source),
            options,
            runtime,
            tx,
            rx,
            state: AcquisitionState::default(),
            latest_seq: 0,
            location_seq: None,
            in_flight: 0,
            theme: None,
            subscribers: Vec::new(),
            next_subscription: 0,
        };
        controller.start_locating();
        controller
    }

    pub fn state(&self) -> &AcquisitionState {
        &self.state
    }

    /// Last emitted theme; `None` until the first snapshot.
    pub fn current_theme(&self) -> Option<&'static ThemeDescriptor> {
        self.theme
    }

    /// Whether snapshots come from the live provider ("Live" vs "Démo" badge).
    pub fn is_live(&self) -> bool {
        self.source.is_live()
    }

    /// True while any spawned request has not reported back.
    pub fn has_pending_work(&self) -> bool {
        self.in_flight > 0
    }

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&ThemeDescriptor) + Send + 'static,
    {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Fetch by city name. Whitespace-only terms are ignored.
    pub fn search_city(&mut self, term: &str) -> bool {
        let city = term.trim();
        if city.is_empty() {
            tracing::debug!("Ignoring empty city search");
            return false;
        }
        self.start_fetch(WeatherQuery::city(city));
        true
    }

    /// Ask for the device position again.
    pub fn use_current_location(&mut self) -> bool {
        self.start_locating();
        true
    }

    /// Re-attempt geolocation after a geolocation error. Ignored otherwise.
    pub fn retry(&mut self) -> bool {
        match self.state.error() {
            Some(error) if error.is_retryable() => {
                self.start_locating();
                true
            }
            _ => {
                tracing::debug!("Retry ignored: no geolocation error");
                false
            }
        }
    }

    /// Clear the error banner; the snapshot is untouched.
    pub fn dismiss_error(&mut self) -> bool {
        self.state.dismiss()
    }

    /// Apply every result already delivered. Returns how many were handled.
    pub fn poll(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(message) = self.rx.try_recv() {
            self.handle_message(message);
            handled += 1;
        }
        handled
    }

    /// Wait for the next result and apply it. Returns false when nothing is
    /// in flight.
    pub async fn process_next(&mut self) -> bool {
        if self.in_flight == 0 {
            return false;
        }
        match self.rx.recv().await {
            Some(message) => {
                self.handle_message(message);
                true
            }
            None => false,
        }
    }

    /// Apply results until no request is outstanding.
    pub async fn run_until_idle(&mut self) {
        while self.process_next().await {}
    }

    fn next_seq(&mut self) -> u64 {
        self.latest_seq += 1;
        self.latest_seq
    }

    fn is_stale(&self, seq: u64) -> bool {
        self.options.discard_stale_responses && seq != self.latest_seq
    }

    fn start_locating(&mut self) {
        let seq = self.next_seq();

        if !self.geolocator.is_available() {
            tracing::warn!("Geolocation not available on this platform");
            self.state.fail(AcquisitionError::from(LocationError::Unsupported));
            return;
        }

        self.state.begin(Phase::Locating);

        if self.location_seq.is_some() {
            // One device request at a time; the pending one now answers for `seq`.
            tracing::debug!("Geolocation already pending, re-targeting to #{}", seq);
            self.location_seq = Some(seq);
            return;
        }

        tracing::info!("Requesting device position (#{})", seq);
        self.location_seq = Some(seq);
        self.in_flight += 1;
        service::request_location(
            &self.runtime,
            &self.tx,
            Arc::clone(&self.geolocator),
            self.options.position,
        );
    }

    fn start_fetch(&mut self, query: WeatherQuery) {
        let seq = self.next_seq();
        tracing::info!("Fetching weather for {} (#{})", query, seq);
        self.state.begin(Phase::Fetching);
        self.in_flight += 1;
        service::request_fetch(&self.runtime, &self.tx, Arc::clone(&self.source), seq, query);
    }

    fn handle_message(&mut self, message: AcquisitionMessage) {
        self.in_flight = self.in_flight.saturating_sub(1);

        match message {
            AcquisitionMessage::LocationResolved(result) => {
                let Some(seq) = self.location_seq.take() else {
                    tracing::debug!("Geolocation result with no pending request");
                    return;
                };
                if self.is_stale(seq) {
                    tracing::debug!("Discarding superseded geolocation result #{}", seq);
                    return;
                }
                match result {
                    Ok(position) => {
                        self.start_fetch(WeatherQuery::Coordinates(position.coordinates));
                    }
                    Err(e) => self.state.fail(AcquisitionError::from(e)),
                }
            }
            AcquisitionMessage::FetchDone { seq, query, result } => {
                if self.is_stale(seq) {
                    tracing::debug!("Discarding superseded weather result #{} ({})", seq, query);
                    return;
                }
                match result {
                    Ok(snapshot) => {
                        let theme = classify(snapshot.condition_code());
                        tracing::info!(
                            "Installed weather for {} ({})",
                            snapshot.location_name,
                            theme.label
                        );
                        self.state.install(snapshot);
                        self.emit_theme(theme);
                    }
                    Err(e) => self.state.fail(fetch_error(&query, e)),
                }
            }
        }
    }

    fn emit_theme(&mut self, theme: &'static ThemeDescriptor) {
        self.theme = Some(theme);
        for (_, callback) in self.subscribers.iter_mut() {
            callback(theme);
        }
    }
}
