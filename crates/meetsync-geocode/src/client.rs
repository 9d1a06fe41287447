//! Nominatim geocoding client.
//!
//! One query in, at most one coordinate pair out (`limit=1`). Nominatim
//! serialises `lat`/`lon` as strings, so the wire type parses them
//! explicitly. Callers own the politeness delay between lookups.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::error::GeocodeError;

const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

/// Client for the Nominatim `/search` endpoint.
pub struct NominatimClient {
    client: Client,
    base_url: String,
}

impl NominatimClient {
    /// Creates a client against the public Nominatim instance.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, GeocodeError> {
        Self::with_base_url(timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_base_url(
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Geocodes a free-form address query. `Ok(None)` means Nominatim had
    /// no match.
    ///
    /// # Errors
    ///
    /// - [`GeocodeError::UnexpectedStatus`] on a non-2xx answer.
    /// - [`GeocodeError::Deserialize`] if the body is not a place list.
    /// - [`GeocodeError::InvalidCoordinate`] if `lat`/`lon` do not parse.
    /// - [`GeocodeError::Http`] on network failure.
    pub async fn geocode(&self, query: &str) -> Result<Option<(f64, f64)>, GeocodeError> {
        let url = format!("{}/search", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let places: Vec<NominatimPlace> =
            serde_json::from_str(&body).map_err(|e| GeocodeError::Deserialize {
                context: format!("search({query})"),
                source: e,
            })?;

        let Some(place) = places.first() else {
            return Ok(None);
        };
        let lat = place
            .lat
            .parse::<f64>()
            .map_err(|_| GeocodeError::InvalidCoordinate {
                field: "lat",
                value: place.lat.clone(),
            })?;
        let lon = place
            .lon
            .parse::<f64>()
            .map_err(|_| GeocodeError::InvalidCoordinate {
                field: "lon",
                value: place.lon.clone(),
            })?;
        Ok(Some((lat, lon)))
    }
}
