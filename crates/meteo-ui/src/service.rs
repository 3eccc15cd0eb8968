//! Acquisition backend: geolocation and weather fetches.
//! Work runs on the tokio runtime; results are sent back via mpsc.

use std::sync::Arc;

use meteo_core::NetworkError;
use meteo_weather::{
    FetchError, Geolocator, LocationError, Position, PositionOptions, WeatherQuery,
    WeatherSnapshot, WeatherSource,
};
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;

const TASK_FAILED_MESSAGE: &str = "Erreur de géolocalisation inattendue.";

/// Messages sent from async operations back to the controller
#[derive(Debug)]
pub enum AcquisitionMessage {
    /// The outstanding geolocation call finished
    LocationResolved(Result<Position, LocationError>),
    /// A weather fetch finished; `seq` is the sequence it was issued under
    FetchDone {
        seq: u64,
        query: WeatherQuery,
        result: Result<WeatherSnapshot, FetchError>,
    },
}

/// Request the current position, bounded by `options.timeout`.
/// Sends `LocationResolved` on the channel when complete.
pub fn request_location<G: Geolocator>(
    runtime: &Handle,
    tx: &UnboundedSender<AcquisitionMessage>,
    geolocator: Arc<G>,
    options: PositionOptions,
) {
    let tx = tx.clone();

    let work = runtime.spawn(async move {
        match tokio::time::timeout(options.timeout, geolocator.current_position(options)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!("Geolocation gave no answer within {:?}", options.timeout);
                Err(LocationError::Timeout)
            }
        }
    });

    // Report even when the provider task panics.
    runtime.spawn(async move {
        let result = match work.await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("Geolocation task failed: {}", e);
                Err(LocationError::Other {
                    code: 0,
                    message: TASK_FAILED_MESSAGE.to_string(),
                })
            }
        };

        match &result {
            Ok(position) => tracing::info!(
                "Got location: {}, {}",
                position.coordinates.latitude,
                position.coordinates.longitude
            ),
            Err(e) => tracing::warn!("Geolocation failed: {}", e),
        }

        let _ = tx.send(AcquisitionMessage::LocationResolved(result));
    });
}

/// Fetch weather for `query`. Sends `FetchDone` on the channel when complete.
pub fn request_fetch<S: WeatherSource>(
    runtime: &Handle,
    tx: &UnboundedSender<AcquisitionMessage>,
    source: Arc<S>,
    seq: u64,
    query: WeatherQuery,
) {
    let tx = tx.clone();

    let work = {
        let query = query.clone();
        runtime.spawn(async move { source.fetch(&query).await })
    };

    runtime.spawn(async move {
        let result = match work.await {
            Ok(result) => result,
            Err(e) => Err(FetchError::Network(NetworkError::InvalidResponse(format!(
                "fetch task failed: {}",
                e
            )))),
        };
        if let Err(e) = &result {
            tracing::warn!("Weather fetch #{} for {} failed: {}", seq, query, e);
        }
        let _ = tx.send(AcquisitionMessage::FetchDone { seq, query, result });
    });
}
