use crate::common::RouteError;
use crate::config::RoutingConfig;
use crate::domains::navigation::ports::RoutingBackend;
use crate::domains::navigation::types::{BoundingBox, GeoPoint, RouteRequest, RouteResult};
use async_trait::async_trait;
use geojson::{FeatureCollection, GeoJson, Value};
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde::Serialize;

/// Routing backend speaking the openrouteservice directions API (GeoJSON flavour).
#[derive(Clone)]
pub struct OrsRoutingBackend {
    client: Client,
    base_url: String,
    profile: String,
    api_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct DirectionsRequest {
    coordinates: Vec<[f64; 2]>,
}

impl OrsRoutingBackend {
    pub fn new(
        base_url: impl Into<String>,
        profile: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            profile: profile.into(),
            api_key,
        }
    }

    pub fn from_config(config: &RoutingConfig) -> Self {
        Self::new(config.base_url.clone(), config.profile.clone(), config.api_key.clone())
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}/v2/directions/{}/geojson",
            self.base_url.trim_end_matches('/'),
            self.profile
        )
    }
}

#[async_trait]
impl RoutingBackend for OrsRoutingBackend {
    async fn route(&self, request: &RouteRequest) -> Result<RouteResult, RouteError> {
        let body = directions_body(request);
        let mut builder = self.client.post(self.endpoint()).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.header(AUTHORIZATION, key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| RouteError::NetworkFailure(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| RouteError::NetworkFailure(e.to_string()))?;

        if !status.is_success() {
            return Err(RouteError::BackendRejected {
                status: status.as_u16(),
                body: text,
            });
        }
        parse_route_response(&text)
    }
}

fn directions_body(request: &RouteRequest) -> DirectionsRequest {
    DirectionsRequest {
        coordinates: request.coordinates().iter().map(GeoPoint::to_lng_lat).collect(),
    }
}

/// JSON body posted to the backend: `{"coordinates": [[lng, lat], ...]}`.
pub fn encode_route_request(request: &RouteRequest) -> serde_json::Value {
    serde_json::json!({ "coordinates": directions_body(request).coordinates })
}

/// Parses a directions response into route geometry and its bounds.
pub fn parse_route_response(body: &str) -> Result<RouteResult, RouteError> {
    let geojson: GeoJson = body
        .parse()
        .map_err(|e: geojson::Error| RouteError::MalformedResponse(e.to_string()))?;
    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        _ => {
            return Err(RouteError::MalformedResponse(
                "expected a FeatureCollection".to_string(),
            ))
        }
    };

    let points = line_points(&collection);
    if points.is_empty() {
        return Err(RouteError::MalformedResponse(
            "response contains no route line".to_string(),
        ));
    }

    let bounds = collection
        .bbox
        .as_deref()
        .and_then(bbox_from_slice)
        .or_else(|| BoundingBox::enclosing(&points))
        .ok_or_else(|| RouteError::MalformedResponse("route has no extent".to_string()))?;

    Ok(RouteResult {
        geometry: collection,
        bounds,
    })
}

fn line_points(collection: &FeatureCollection) -> Vec<GeoPoint> {
    let mut points = Vec::new();
    for feature in &collection.features {
        let Some(geometry) = &feature.geometry else {
            continue;
        };
        match &geometry.value {
            Value::LineString(line) => {
                points.extend(line.iter().filter_map(|p| GeoPoint::from_lng_lat(p)));
            }
            Value::MultiLineString(lines) => {
                for line in lines {
                    points.extend(line.iter().filter_map(|p| GeoPoint::from_lng_lat(p)));
                }
            }
            _ => {}
        }
    }
    points
}

/// GeoJSON bbox, 2D `[w, s, e, n]` or 3D `[w, s, zmin, e, n, zmax]`.
fn bbox_from_slice(bbox: &[f64]) -> Option<BoundingBox> {
    let (w, s, e, n) = match bbox {
        [w, s, e, n] => (*w, *s, *e, *n),
        [w, s, _, e, n, _] => (*w, *s, *e, *n),
        _ => return None,
    };
    Some(BoundingBox {
        south_west: GeoPoint::new(s, w),
        north_east: GeoPoint::new(n, e),
    })
}
