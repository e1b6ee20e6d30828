//! OpenStreetMap Nominatim backend

use log::{debug, info};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;

use super::{Coordinates, GeocodeError, Geocoder};
use crate::config::GeocoderSettings;

/// One entry of a Nominatim search response; coordinates come as strings
#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

/// Geocoder calling a Nominatim search endpoint over HTTP
///
/// The HTTP client is built on the first request and reused afterwards.
pub struct NominatimGeocoder {
    endpoint: String,
    user_agent: String,
    timeout: Duration,
    client: OnceCell<Client>,
}

impl NominatimGeocoder {
    pub fn new(endpoint: &str, user_agent: &str, timeout: Duration) -> Self {
        NominatimGeocoder {
            endpoint: endpoint.to_string(),
            user_agent: user_agent.to_string(),
            timeout,
            client: OnceCell::new(),
        }
    }

    pub fn from_settings(settings: &GeocoderSettings) -> Self {
        Self::new(&settings.endpoint, &settings.user_agent, Duration::from_secs(settings.timeout_secs))
    }

    fn client(&self) -> Result<&Client, GeocodeError> {
        self.client.get_or_try_init(|| {
            debug!("Creating HTTP client for {}", self.endpoint);
            Client::builder()
                .user_agent(self.user_agent.clone())
                .timeout(self.timeout)
                .build()
                .map_err(|e| GeocodeError::Request(e.to_string()))
        })
    }

    fn search_url(&self, address: &str) -> Result<Url, GeocodeError> {
        Url::parse_with_params(&self.endpoint, &[("q", address), ("format", "json"), ("limit", "1")])
            .map_err(|e| GeocodeError::Request(format!("invalid endpoint {}: {}", self.endpoint, e)))
    }
}

/// First place of a search response
fn parse_places(address: &str, places: Vec<Place>) -> Result<Coordinates, GeocodeError> {
    let place = places.into_iter().next()
        .ok_or_else(|| GeocodeError::NotFound(address.to_string()))?;

    let lat = place.lat.parse::<f64>()
        .map_err(|_| GeocodeError::InvalidResponse(format!("bad latitude {:?}", place.lat)))?;
    let lon = place.lon.parse::<f64>()
        .map_err(|_| GeocodeError::InvalidResponse(format!("bad longitude {:?}", place.lon)))?;

    if let Some(name) = &place.display_name {
        debug!("{:?} matched {}", address, name);
    }
    Ok(Coordinates::new(lat, lon))
}

impl Geocoder for NominatimGeocoder {
    fn geocode(&self, address: &str) -> Result<Coordinates, GeocodeError> {
        let url = self.search_url(address)?;
        info!("Geocoding {:?} via {}", address, self.endpoint);

        let response = self.client()?
            .get(url)
            .send()
            .map_err(|e| GeocodeError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GeocodeError::Request(format!("HTTP request failed: {}", response.status())));
        }

        let places: Vec<Place> = response.json()
            .map_err(|e| GeocodeError::InvalidResponse(e.to_string()))?;
        parse_places(address, places)
    }

    fn name(&self) -> &'static str {
        "nominatim"
    }
}
