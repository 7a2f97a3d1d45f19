///! Reverse geocoding of the ground point under the station
///!
///! Uses the Nominatim `reverse` endpoint (OpenStreetMap). Lookups that fail
///! for any reason degrade to [`NOT_FOUND`].

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::error::TrackerError;

/// Returned when no address exists for a point (open ocean) or the lookup failed.
pub const NOT_FOUND: &str = "not found";

const ZOOM: u8 = 15;
const LANGUAGE: &str = "en";

#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    /// Human-readable address for a point, `None` when there is none.
    async fn reverse(&self, latitude: f64, longitude: f64) -> Result<Option<String>, TrackerError>;
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn reverse_url(&self, latitude: f64, longitude: f64) -> String {
        format!(
            "{}/reverse?format=jsonv2&lat={}&lon={}&zoom={}&accept-language={}",
            self.base_url, latitude, longitude, ZOOM, LANGUAGE
        )
    }
}

#[async_trait]
impl ReverseGeocoder for NominatimGeocoder {
    async fn reverse(&self, latitude: f64, longitude: f64) -> Result<Option<String>, TrackerError> {
        let response = self
            .client
            .get(self.reverse_url(latitude, longitude))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TrackerError::UpstreamStatus(response.status().as_u16()));
        }

        let body: ReverseResponse = response.json().await?;
        if let Some(reason) = &body.error {
            tracing::debug!("No address at ({}, {}): {}", latitude, longitude, reason);
        }

        Ok(body.display_name.filter(|name| !name.is_empty()))
    }
}

/// Address for a point, or [`NOT_FOUND`]. Failures are logged, never returned.
pub async fn describe_location(geocoder: &dyn ReverseGeocoder, latitude: f64, longitude: f64) -> String {
    match geocoder.reverse(latitude, longitude).await {
        Ok(Some(address)) => address,
        Ok(None) => NOT_FOUND.to_string(),
        Err(e) => {
            tracing::error!("Reverse geocoding of ({}, {}) failed: {}", latitude, longitude, e);
            NOT_FOUND.to_string()
        }
    }
}
