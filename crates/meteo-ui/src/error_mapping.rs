//! Maps geolocation and fetch failures to banner errors.

use meteo_weather::{FetchError, LocationError, WeatherQuery};

use crate::state::{AcquisitionError, ErrorKind};

const NOT_FOUND: u16 = 404;
const GENERIC_NETWORK_MESSAGE: &str = "Erreur réseau.";

impl From<LocationError> for AcquisitionError {
    fn from(e: LocationError) -> Self {
        match e {
            LocationError::PermissionDenied => AcquisitionError::new(
                ErrorKind::GeoDenied,
                "Accès refusé. Cherchez une ville dans la barre.",
            ),
            LocationError::PositionUnavailable => {
                AcquisitionError::new(ErrorKind::GeoUnavailable, "Position indisponible.")
            }
            LocationError::Timeout => {
                AcquisitionError::new(ErrorKind::GeoUnavailable, "Délai dépassé.")
            }
            LocationError::Unsupported => AcquisitionError::new(
                ErrorKind::GeoUnavailable,
                "Géolocalisation non supportée.",
            ),
            LocationError::Other { message, .. } => {
                AcquisitionError::new(ErrorKind::Unknown, message)
            }
        }
    }
}

/// Classify a failed fetch. Not-found only exists for city lookups.
pub fn fetch_error(query: &WeatherQuery, e: FetchError) -> AcquisitionError {
    match (query, e) {
        (WeatherQuery::City(city), FetchError::Status { status: NOT_FOUND, .. }) => {
            AcquisitionError::new(ErrorKind::CityNotFound, format!("\"{}\" introuvable.", city))
        }
        (_, FetchError::Status { status, message }) => AcquisitionError::new(
            ErrorKind::Network,
            message.unwrap_or_else(|| format!("HTTP {}", status)),
        ),
        (_, FetchError::Network(e)) => AcquisitionError::new(ErrorKind::Network, e.user_message()),
        (_, FetchError::Parse(_)) => {
            AcquisitionError::new(ErrorKind::Network, GENERIC_NETWORK_MESSAGE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meteo_core::NetworkError;
    use meteo_weather::Coordinates;

    #[test]
    fn location_codes() {
        let denied = AcquisitionError::from(LocationError::from_code(1, "User denied"));
        assert_eq!(denied.kind, ErrorKind::GeoDenied);
        assert!(denied.message.contains("Cherchez une ville"));

        let unavailable = AcquisitionError::from(LocationError::from_code(2, ""));
        assert_eq!(unavailable.kind, ErrorKind::GeoUnavailable);
        assert_eq!(unavailable.message, "Position indisponible.");

        let timeout = AcquisitionError::from(LocationError::from_code(3, ""));
        assert_eq!(timeout.kind, ErrorKind::GeoUnavailable);
        assert_eq!(timeout.message, "Délai dépassé.");
    }

    #[test]
    fn unknown_location_code_passes_message_through() {
        let e = AcquisitionError::from(LocationError::from_code(7, "capteur en panne"));
        assert_eq!(e.kind, ErrorKind::Unknown);
        assert_eq!(e.message, "capteur en panne");
    }

    #[test]
    fn unsupported_is_unavailable() {
        let e = AcquisitionError::from(LocationError::Unsupported);
        assert_eq!(e.kind, ErrorKind::GeoUnavailable);
    }

    #[test]
    fn city_not_found() {
        let e = fetch_error(
            &WeatherQuery::city("Xyzzyx"),
            FetchError::Status {
                status: 404,
                message: Some("city not found".into()),
            },
        );
        assert_eq!(e.kind, ErrorKind::CityNotFound);
        assert_eq!(e.message, "\"Xyzzyx\" introuvable.");
    }

    #[test]
    fn coordinate_404_is_network() {
        let query = WeatherQuery::Coordinates(Coordinates::new(0.0, 0.0));
        let e = fetch_error(
            &query,
            FetchError::Status {
                status: 404,
                message: None,
            },
        );
        assert_eq!(e.kind, ErrorKind::Network);
        assert_eq!(e.message, "HTTP 404");
    }

    #[test]
    fn status_message_from_payload() {
        let e = fetch_error(
            &WeatherQuery::city("Paris"),
            FetchError::Status {
                status: 500,
                message: Some("Clé API manquante côté serveur.".into()),
            },
        );
        assert_eq!(e.kind, ErrorKind::Network);
        assert_eq!(e.message, "Clé API manquante côté serveur.");
    }

    #[test]
    fn transport_and_parse_failures() {
        let e = fetch_error(
            &WeatherQuery::city("Paris"),
            FetchError::Network(NetworkError::ConnectionFailed("refused".into())),
        );
        assert_eq!(e.kind, ErrorKind::Network);
        assert_eq!(e.message, "Impossible de joindre le serveur.");

        let e = fetch_error(&WeatherQuery::city("Paris"), FetchError::Parse("eof".into()));
        assert_eq!(e.kind, ErrorKind::Network);
        assert_eq!(e.message, "Erreur réseau.");
    }
}
