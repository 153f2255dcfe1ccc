use crate::common::GeocodeError;
use crate::config::GeocoderConfig;
use crate::domains::navigation::ports::Geocoder;
use crate::domains::navigation::types::{GeoPoint, GeocodeCandidate};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

const USER_AGENT: &str = concat!("stepmap-nav/", env!("CARGO_PKG_VERSION"));

/// Address search against a Nominatim instance.
#[derive(Clone)]
pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
    country_codes: Option<String>,
    limit: u32,
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: String,
}

impl NominatimGeocoder {
    pub fn new(base_url: impl Into<String>, country_codes: Option<String>, limit: u32) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            base_url: base_url.into(),
            country_codes,
            limit,
        }
    }

    pub fn from_config(config: &GeocoderConfig) -> Self {
        Self::new(config.base_url.clone(), config.country_codes.clone(), config.limit)
    }

    fn query_params(&self, text: &str) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("format", "json".to_string()),
            ("q", text.to_string()),
            ("addressdetails", "1".to_string()),
            ("limit", self.limit.to_string()),
        ];
        if let Some(codes) = &self.country_codes {
            params.push(("countrycodes", codes.clone()));
        }
        params
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn search(&self, text: &str) -> Result<Vec<GeocodeCandidate>, GeocodeError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        let url = format!("{}/search", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(url)
            .query(&self.query_params(text))
            .send()
            .await
            .map_err(|e| GeocodeError::NetworkFailure(e.to_string()))?;
        if !response.status().is_success() {
            return Err(GeocodeError::NetworkFailure(format!(
                "geocoder returned status {}",
                response.status()
            )));
        }
        let body = response
            .text()
            .await
            .map_err(|e| GeocodeError::NetworkFailure(e.to_string()))?;
        parse_search_response(&body)
    }
}

/// Parses a Nominatim `format=json` answer. Entries with unparsable coordinates are skipped.
pub fn parse_search_response(body: &str) -> Result<Vec<GeocodeCandidate>, GeocodeError> {
    let places: Vec<NominatimPlace> = serde_json::from_str(body)
        .map_err(|e| GeocodeError::NetworkFailure(format!("malformed geocoder response: {}", e)))?;
    Ok(places
        .into_iter()
        .filter_map(|place| {
            let lat = place.lat.parse::<f64>().ok()?;
            let lng = place.lon.parse::<f64>().ok()?;
            Some(GeocodeCandidate {
                coord: GeoPoint::new(lat, lng),
                label: place.display_name,
            })
        })
        .collect())
}
