//! One-shot device location lookup.
//!
//! The position is requested once at startup. Whatever comes back, a fix or
//! an error string, is kept for the rest of the session.

use std::time::Duration;

use async_trait::async_trait;
use careermate_core::prompts::{location_error_message, LOCATION_UNSUPPORTED};
use careermate_core::Coordinates;
use serde::Deserialize;
use thiserror::Error;

pub const PERMISSION_DENIED: u16 = 1;
pub const POSITION_UNAVAILABLE: u16 = 2;
pub const TIMEOUT: u16 = 3;

const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    #[error("Geolocation is not supported")]
    Unsupported,

    #[error("{message}")]
    Position { code: u16, message: String },
}

impl LocationError {
    pub fn position(code: u16, message: impl Into<String>) -> Self {
        Self::Position {
            code,
            message: message.into(),
        }
    }

    pub fn code(&self) -> Option<u16> {
        match self {
            Self::Unsupported => None,
            Self::Position { code, .. } => Some(*code),
        }
    }
}

#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_position(&self) -> Result<Coordinates, LocationError>;
}

/// Outcome of the startup lookup. At most one of the two fields is set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationState {
    pub coordinates: Option<Coordinates>,
    pub error: Option<String>,
}

impl LocationState {
    pub fn known(coordinates: Coordinates) -> Self {
        Self {
            coordinates: Some(coordinates),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            coordinates: None,
            error: Some(error.into()),
        }
    }
}

/// Ask `provider` for a position once. No retry.
pub async fn acquire_location(provider: &dyn LocationProvider) -> LocationState {
    match provider.current_position().await {
        Ok(coordinates) => {
            log::info!(
                "Location acquired: {:.4}, {:.4}",
                coordinates.latitude,
                coordinates.longitude
            );
            LocationState::known(coordinates)
        }
        Err(LocationError::Unsupported) => {
            log::info!("Location lookup disabled");
            LocationState::failed(LOCATION_UNSUPPORTED)
        }
        Err(err) => {
            log::error!("Geolocation error (code {:?}): {}", err.code(), err);
            LocationState::failed(location_error_message(&err.to_string()))
        }
    }
}

/// Position fixed by configuration.
pub struct StaticLocation(pub Coordinates);

#[async_trait]
impl LocationProvider for StaticLocation {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        Ok(self.0)
    }
}

/// No location capability on this client.
pub struct NoLocation;

#[async_trait]
impl LocationProvider for NoLocation {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        Err(LocationError::Unsupported)
    }
}

/// Approximate position from an IP geolocation service.
///
/// Expects an `ip-api.com` style body:
/// `{"status": "success", "lat": 40.7, "lon": -74.0}` or
/// `{"status": "fail", "message": "private range"}`.
pub struct IpLocation {
    client: reqwest::Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl IpLocation {
    pub fn new(url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(LOOKUP_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                log::warn!("Falling back to default HTTP client for location lookup: {}", e);
                reqwest::Client::new()
            });
        Self {
            client,
            url: url.into(),
        }
    }
}

fn request_error(err: reqwest::Error) -> LocationError {
    if err.is_timeout() {
        LocationError::position(TIMEOUT, "Timeout expired")
    } else {
        LocationError::position(POSITION_UNAVAILABLE, err.to_string())
    }
}

#[async_trait]
impl LocationProvider for IpLocation {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        log::debug!("Looking up location via {}", self.url);

        let response = self.client.get(&self.url).send().await.map_err(request_error)?;

        let status = response.status();
        if status == 401 || status == 403 {
            return Err(LocationError::position(
                PERMISSION_DENIED,
                format!("Location service refused the request (HTTP {})", status.as_u16()),
            ));
        }
        if !status.is_success() {
            return Err(LocationError::position(
                POSITION_UNAVAILABLE,
                format!("Location service returned HTTP {}", status.as_u16()),
            ));
        }

        let body: IpLookupResponse = response.json().await.map_err(request_error)?;

        if let Some(state) = body.status.as_deref() {
            if state != "success" {
                let reason = body.message.unwrap_or_else(|| state.to_string());
                return Err(LocationError::position(POSITION_UNAVAILABLE, reason));
            }
        }

        match (body.lat, body.lon) {
            (Some(lat), Some(lon)) => Ok(Coordinates::new(lat, lon)),
            _ => Err(LocationError::position(
                POSITION_UNAVAILABLE,
                "Location service response had no coordinates",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct Denied;

    #[async_trait]
    impl LocationProvider for Denied {
        async fn current_position(&self) -> Result<Coordinates, LocationError> {
            Err(LocationError::position(PERMISSION_DENIED, "User denied Geolocation"))
        }
    }

    #[tokio::test]
    async fn static_location_is_acquired() {
        let state = acquire_location(&StaticLocation(Coordinates::new(40.0, -74.0))).await;
        assert_eq!(state, LocationState::known(Coordinates::new(40.0, -74.0)));
    }

    #[tokio::test]
    async fn missing_capability_records_unsupported() {
        let state = acquire_location(&NoLocation).await;
        assert!(state.coordinates.is_none());
        assert_eq!(state.error.as_deref(), Some(LOCATION_UNSUPPORTED));
    }

    #[tokio::test]
    async fn provider_error_is_formatted() {
        let state = acquire_location(&Denied).await;
        assert!(state.coordinates.is_none());
        assert_eq!(
            state.error.as_deref(),
            Some("Error: User denied Geolocation. Location-based features will be unavailable.")
        );
    }

    #[tokio::test]
    async fn ip_lookup_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "lat": 40.7128,
                "lon": -74.006,
                "city": "New York"
            })))
            .mount(&server)
            .await;

        let provider = IpLocation::new(format!("{}/json/", server.uri()));
        let coords = provider.current_position().await.unwrap();
        assert_eq!(coords, Coordinates::new(40.7128, -74.006));
    }

    #[tokio::test]
    async fn ip_lookup_failure_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "fail",
                "message": "private range"
            })))
            .mount(&server)
            .await;

        let provider = IpLocation::new(server.uri());
        let err = provider.current_position().await.unwrap_err();
        assert_eq!(err, LocationError::position(POSITION_UNAVAILABLE, "private range"));
    }

    #[tokio::test]
    async fn ip_lookup_forbidden_is_permission_denied() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let provider = IpLocation::new(server.uri());
        let err = provider.current_position().await.unwrap_err();
        assert_eq!(err.code(), Some(PERMISSION_DENIED));
    }
}
