//! Address geocoding against a Nominatim-compatible search endpoint.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::errors::SyncError;
use crate::models::Coordinates;

/// Centre of Paris, used when an address cannot be resolved.
pub const DEFAULT_COORDINATES: Coordinates = Coordinates {
    lat: 48.8566,
    lng: 2.3522,
};

/// Public Nominatim search endpoint.
pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";

#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

/// Best-effort address to coordinates lookup.
pub struct NominatimGeocoder {
    http: Client,
    endpoint: String,
}

impl NominatimGeocoder {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, SyncError> {
        let http = Client::builder()
            .user_agent(concat!("carnet/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    /// First match for `address`, if any.
    pub async fn lookup(&self, address: &str) -> Result<Option<Coordinates>, SyncError> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SyncError::Transient(format!(
                "Geocoder returned HTTP {}",
                response.status()
            )));
        }

        let places: Vec<Place> = response.json().await?;
        Ok(places.into_iter().next().and_then(|place| {
            let lat = place.lat.parse().ok()?;
            let lng = place.lon.parse().ok()?;
            Some(Coordinates { lat, lng })
        }))
    }

    /// Coordinates for `address`, falling back to [`DEFAULT_COORDINATES`].
    pub async fn resolve(&self, address: &str) -> Coordinates {
        match self.lookup(address).await {
            Ok(Some(coordinates)) => coordinates,
            Ok(None) => {
                tracing::info!("No geocoding match for '{}'; using default position", address);
                DEFAULT_COORDINATES
            }
            Err(e) => {
                tracing::warn!("Geocoding '{}' failed: {}", address, e);
                DEFAULT_COORDINATES
            }
        }
    }
}
