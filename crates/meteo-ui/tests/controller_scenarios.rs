//! End-to-end controller scenarios against a mocked weather proxy.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use meteo_ui::{ControllerOptions, ErrorKind, Phase, WeatherController};
use meteo_weather::demo::demo_snapshot;
use meteo_weather::{
    Coordinates, FetchError, FixedGeolocator, Geolocator, LocationError, Position,
    PositionOptions, ProxyClient, ThemeDescriptor, UnsupportedGeolocator, WeatherQuery,
    WeatherSnapshot, WeatherSource,
};
use tokio::runtime::Handle;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct DeniedGeolocator;

impl Geolocator for DeniedGeolocator {
    async fn current_position(&self, _options: PositionOptions) -> Result<Position, LocationError> {
        Err(LocationError::from_code(1, "User denied Geolocation"))
    }
}

struct SilentGeolocator;

impl Geolocator for SilentGeolocator {
    async fn current_position(&self, _options: PositionOptions) -> Result<Position, LocationError> {
        std::future::pending().await
    }
}

struct CrashingGeolocator;

impl Geolocator for CrashingGeolocator {
    async fn current_position(&self, _options: PositionOptions) -> Result<Position, LocationError> {
        panic!("position backend crashed")
    }
}

struct CrashingSource;

impl WeatherSource for CrashingSource {
    fn is_live(&self) -> bool {
        true
    }

    async fn fetch(&self, _query: &WeatherQuery) -> Result<WeatherSnapshot, FetchError> {
        panic!("weather backend crashed")
    }
}

/// Answers city lookups with a clear-sky snapshot named after the city,
/// taking longer for cities listed as slow.
struct ScriptedSource {
    slow: &'static str,
}

impl WeatherSource for ScriptedSource {
    fn is_live(&self) -> bool {
        false
    }

    async fn fetch(&self, query: &WeatherQuery) -> Result<WeatherSnapshot, FetchError> {
        let name = query.to_string();
        if name == self.slow {
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
        let mut snapshot = demo_snapshot(0);
        snapshot.location_name = name;
        Ok(snapshot)
    }
}

fn paris() -> FixedGeolocator {
    FixedGeolocator::new(Coordinates::new(48.8534, 2.3488))
}

fn weather_body(name: &str, code: i32, description: &str) -> serde_json::Value {
    serde_json::json!({
        "coord": { "lon": 4.8467, "lat": 45.7485 },
        "weather": [{ "id": code, "main": "", "description": description, "icon": "10d" }],
        "main": {
            "temp": 14.2, "feels_like": 13.6, "temp_min": 12.0, "temp_max": 15.5,
            "pressure": 1009, "humidity": 82
        },
        "visibility": 8000,
        "wind": { "speed": 5.1, "deg": 200 },
        "dt": 1792146000,
        "sys": { "country": "FR", "sunrise": 1792130400, "sunset": 1792169400 },
        "timezone": 7200,
        "name": name,
        "cod": 200
    })
}

/// Records every emitted theme.
fn record_themes<G: Geolocator, S: WeatherSource>(
    controller: &mut WeatherController<G, S>,
) -> Arc<Mutex<Vec<ThemeDescriptor>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    controller.subscribe(move |theme| sink.lock().unwrap().push(*theme));
    seen
}

#[tokio::test]
async fn denied_location_then_city_search() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("city", "Lyon"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(weather_body("Lyon", 500, "pluie modérée")),
        )
        .mount(&server)
        .await;

    let source = ProxyClient::new(&server.uri()).unwrap();
    let mut controller = WeatherController::new(
        DeniedGeolocator,
        source,
        ControllerOptions::default(),
        Handle::current(),
    );
    let themes = record_themes(&mut controller);

    controller.run_until_idle().await;
    assert_eq!(controller.state().phase(), None);
    assert_eq!(controller.state().error_kind(), Some(ErrorKind::GeoDenied));
    assert!(controller.state().error().unwrap().is_retryable());

    assert!(controller.search_city("  Lyon "));
    assert_eq!(controller.state().phase(), Some(Phase::Fetching));
    assert!(controller.state().error().is_none());

    controller.run_until_idle().await;
    let state = controller.state();
    assert!(state.is_idle());
    assert_eq!(state.snapshot().unwrap().location_name, "Lyon");

    let themes = themes.lock().unwrap();
    assert_eq!(themes.len(), 1);
    assert_eq!(themes[0].label, "Pluie");
    assert!(themes[0].advisory.starts_with("N'oublie pas ton parapluie"));
    assert_eq!(controller.current_theme().unwrap().label, "Pluie");
}

#[tokio::test]
async fn unknown_city_keeps_previous_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("lat", "48.8534"))
        .and(query_param("lon", "2.3488"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(weather_body("Paris", 803, "nuageux")),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("city", "Xyzzyx"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "cod": "404",
            "message": "city not found"
        })))
        .mount(&server)
        .await;

    let source = ProxyClient::new(&server.uri()).unwrap();
    let mut controller =
        WeatherController::new(paris(), source, ControllerOptions::default(), Handle::current());
    let themes = record_themes(&mut controller);

    controller.run_until_idle().await;
    let before = controller.state().snapshot().cloned().unwrap();
    assert_eq!(before.location_name, "Paris");

    controller.search_city("Xyzzyx");
    controller.run_until_idle().await;

    let state = controller.state();
    let error = state.error().unwrap();
    assert_eq!(error.kind, ErrorKind::CityNotFound);
    assert_eq!(error.title(), "Ville introuvable");
    assert_eq!(error.message, "\"Xyzzyx\" introuvable.");
    assert!(!error.is_retryable());
    assert_eq!(state.snapshot(), Some(&before));
    assert!(state.is_stale());

    // No theme change on errors
    assert_eq!(themes.lock().unwrap().len(), 1);
    assert_eq!(controller.current_theme().unwrap().label, "Nuageux");

    assert!(controller.dismiss_error());
    assert!(controller.state().is_idle());
    assert_eq!(controller.state().snapshot(), Some(&before));
}

#[tokio::test]
async fn current_location_clear_sky() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("lat", "48.8534"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(weather_body("Paris", 800, "ciel dégagé")),
        )
        .expect(2)
        .mount(&server)
        .await;

    let source = ProxyClient::new(&server.uri()).unwrap();
    let mut controller =
        WeatherController::new(paris(), source, ControllerOptions::default(), Handle::current());
    controller.run_until_idle().await;

    let themes = record_themes(&mut controller);
    assert!(controller.use_current_location());
    assert_eq!(controller.state().phase(), Some(Phase::Locating));
    controller.run_until_idle().await;

    let themes = themes.lock().unwrap();
    assert_eq!(themes.len(), 1);
    assert!(themes[0].advisory.contains("lunettes de soleil"));
    assert!(controller.is_live());
}

#[tokio::test]
async fn proxy_failure_uses_payload_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "error": "Clé API manquante côté serveur."
        })))
        .mount(&server)
        .await;

    let source = ProxyClient::new(&server.uri()).unwrap();
    let mut controller =
        WeatherController::new(paris(), source, ControllerOptions::default(), Handle::current());
    controller.run_until_idle().await;

    let error = controller.state().error().unwrap();
    assert_eq!(error.kind, ErrorKind::Network);
    assert_eq!(error.message, "Clé API manquante côté serveur.");
    assert!(controller.state().snapshot().is_none());
    assert!(controller.current_theme().is_none());

    assert!(!controller.retry());
    assert_eq!(controller.state().error_kind(), Some(ErrorKind::Network));
}

#[tokio::test]
async fn silent_geolocation_times_out() {
    let options = ControllerOptions {
        position: PositionOptions {
            timeout: Duration::from_millis(30),
            ..PositionOptions::default()
        },
        ..ControllerOptions::default()
    };
    let mut controller = WeatherController::new(
        SilentGeolocator,
        ScriptedSource { slow: "" },
        options,
        Handle::current(),
    );

    controller.run_until_idle().await;
    let error = controller.state().error().unwrap();
    assert_eq!(error.kind, ErrorKind::GeoUnavailable);
    assert_eq!(error.message, "Délai dépassé.");
}

#[tokio::test]
async fn newer_search_wins_when_fencing() {
    let mut controller = WeatherController::new(
        DeniedGeolocator,
        ScriptedSource { slow: "Brest" },
        ControllerOptions::default(),
        Handle::current(),
    );
    controller.run_until_idle().await;
    let themes = record_themes(&mut controller);

    controller.search_city("Brest");
    controller.search_city("Nice");
    controller.run_until_idle().await;

    assert_eq!(controller.state().snapshot().unwrap().location_name, "Nice");
    assert_eq!(themes.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn last_resolved_wins_without_fencing() {
    let options = ControllerOptions {
        discard_stale_responses: false,
        ..ControllerOptions::default()
    };
    let mut controller = WeatherController::new(
        DeniedGeolocator,
        ScriptedSource { slow: "Brest" },
        options,
        Handle::current(),
    );
    controller.run_until_idle().await;
    let themes = record_themes(&mut controller);

    controller.search_city("Brest");
    controller.search_city("Nice");
    controller.run_until_idle().await;

    assert_eq!(controller.state().snapshot().unwrap().location_name, "Brest");
    assert_eq!(themes.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn search_supersedes_pending_location() {
    let mut controller = WeatherController::new(
        paris(),
        ScriptedSource { slow: "" },
        ControllerOptions::default(),
        Handle::current(),
    );

    controller.search_city("Nantes");
    assert_eq!(controller.state().phase(), Some(Phase::Fetching));
    controller.run_until_idle().await;

    assert_eq!(controller.state().snapshot().unwrap().location_name, "Nantes");
}

#[tokio::test]
async fn phase_and_error_never_coexist() {
    let mut controller = WeatherController::new(
        DeniedGeolocator,
        ScriptedSource { slow: "" },
        ControllerOptions::default(),
        Handle::current(),
    );

    let check = |c: &WeatherController<DeniedGeolocator, ScriptedSource>| {
        let state = c.state();
        assert!(!(state.phase().is_some() && state.error().is_some()));
    };

    check(&controller);
    while controller.process_next().await {
        check(&controller);
    }
    controller.retry();
    check(&controller);
    while controller.process_next().await {
        check(&controller);
    }
    controller.search_city("Rennes");
    check(&controller);
    while controller.process_next().await {
        check(&controller);
    }
    controller.dismiss_error();
    check(&controller);
}

#[tokio::test]
async fn poll_applies_delivered_results() {
    let mut controller = WeatherController::new(
        paris(),
        ScriptedSource { slow: "" },
        ControllerOptions::default(),
        Handle::current(),
    );

    let mut rounds = 0;
    while controller.has_pending_work() && rounds < 100 {
        controller.poll();
        tokio::time::sleep(Duration::from_millis(10)).await;
        rounds += 1;
    }

    assert!(controller.state().is_idle());
    assert!(controller.state().snapshot().is_some());
}

#[tokio::test]
async fn crashing_source_ends_in_network_error() {
    let mut controller = WeatherController::new(
        DeniedGeolocator,
        CrashingSource,
        ControllerOptions::default(),
        Handle::current(),
    );
    controller.run_until_idle().await;

    assert!(controller.search_city("Lyon"));
    tokio::time::timeout(Duration::from_secs(2), controller.run_until_idle())
        .await
        .expect("controller kept waiting on a crashed fetch");

    let state = controller.state();
    assert_eq!(state.phase(), None);
    assert_eq!(state.error_kind(), Some(ErrorKind::Network));
    assert!(!controller.has_pending_work());
}

#[tokio::test]
async fn crashing_geolocator_ends_in_unknown_error() {
    let mut controller = WeatherController::new(
        CrashingGeolocator,
        ScriptedSource { slow: "" },
        ControllerOptions::default(),
        Handle::current(),
    );

    tokio::time::timeout(Duration::from_secs(2), controller.run_until_idle())
        .await
        .expect("controller kept waiting on a crashed geolocation");

    assert_eq!(controller.state().phase(), None);
    assert_eq!(controller.state().error_kind(), Some(ErrorKind::Unknown));
}

#[tokio::test]
async fn unsupported_location_supersedes_pending_fetch() {
    let mut controller = WeatherController::new(
        UnsupportedGeolocator,
        ScriptedSource { slow: "Brest" },
        ControllerOptions::default(),
        Handle::current(),
    );
    assert_eq!(controller.state().error_kind(), Some(ErrorKind::GeoUnavailable));
    let themes = record_themes(&mut controller);

    controller.search_city("Brest");
    assert_eq!(controller.state().phase(), Some(Phase::Fetching));

    assert!(controller.use_current_location());
    let error = controller.state().error().unwrap();
    assert_eq!(error.kind, ErrorKind::GeoUnavailable);
    assert_eq!(error.message, "Géolocalisation non supportée.");

    controller.run_until_idle().await;
    assert_eq!(controller.state().error_kind(), Some(ErrorKind::GeoUnavailable));
    assert!(controller.state().snapshot().is_none());
    assert!(themes.lock().unwrap().is_empty());
}

#[tokio::test]
async fn retry_after_timeout_locates_again() {
    let options = ControllerOptions {
        position: PositionOptions {
            timeout: Duration::from_millis(30),
            ..PositionOptions::default()
        },
        ..ControllerOptions::default()
    };
    let mut controller = WeatherController::new(
        SilentGeolocator,
        ScriptedSource { slow: "" },
        options,
        Handle::current(),
    );
    controller.run_until_idle().await;
    assert_eq!(controller.state().error_kind(), Some(ErrorKind::GeoUnavailable));

    assert!(controller.retry());
    assert_eq!(controller.state().phase(), Some(Phase::Locating));
    assert!(controller.state().error().is_none());
    assert!(controller.has_pending_work());

    controller.run_until_idle().await;
    assert_eq!(controller.state().error().unwrap().message, "Délai dépassé.");
}
