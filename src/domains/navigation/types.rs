use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// `[lng, lat]` order, as used by GeoJSON and the routing backend.
    pub fn to_lng_lat(&self) -> [f64; 2] {
        [self.lng, self.lat]
    }

    pub fn from_lng_lat(position: &[f64]) -> Option<Self> {
        match position {
            [lng, lat, ..] => Some(Self { lat: *lat, lng: *lng }),
            _ => None,
        }
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub south_west: GeoPoint,
    pub north_east: GeoPoint,
}

impl BoundingBox {
    /// Smallest box containing every point; `None` for an empty input.
    pub fn enclosing<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a GeoPoint>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bbox = BoundingBox { south_west: *first, north_east: *first };
        for p in iter {
            bbox.south_west.lat = bbox.south_west.lat.min(p.lat);
            bbox.south_west.lng = bbox.south_west.lng.min(p.lng);
            bbox.north_east.lat = bbox.north_east.lat.max(p.lat);
            bbox.north_east.lng = bbox.north_east.lng.max(p.lng);
        }
        Some(bbox)
    }

    pub fn contains(&self, p: &GeoPoint) -> bool {
        p.lat >= self.south_west.lat
            && p.lat <= self.north_east.lat
            && p.lng >= self.south_west.lng
            && p.lng <= self.north_east.lng
    }
}

/// Stable identity of a destination slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WaypointId(Uuid);

impl WaypointId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WaypointId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WaypointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle to a marker owned by the map renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarkerRef(pub u64);

/// Handle to a route layer owned by the map renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerRef(pub u64);

/// A geocoder candidate the user can pick for a waypoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeCandidate {
    pub coord: GeoPoint,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaypointState {
    Pending,
    Placed,
    Arrived,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub id: WaypointId,
    pub query: String,
    pub selected: Option<GeocodeCandidate>,
    pub suggestions: Vec<GeocodeCandidate>,
    pub coord: Option<GeoPoint>,
    pub marker: Option<MarkerRef>,
    pub state: WaypointState,
}

impl Waypoint {
    pub fn new(id: WaypointId) -> Self {
        Self {
            id,
            query: String::new(),
            selected: None,
            suggestions: Vec::new(),
            coord: None,
            marker: None,
            state: WaypointState::Pending,
        }
    }

    pub fn is_placed(&self) -> bool {
        self.state == WaypointState::Placed && self.coord.is_some()
    }

    /// Text shown in the marker popup and in arrival notices.
    pub fn label(&self) -> String {
        match &self.selected {
            Some(candidate) => candidate.label.clone(),
            None => "Destination".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionUpdate {
    pub coord: GeoPoint,
    pub captured_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OriginState {
    pub coord: Option<GeoPoint>,
    pub marker: Option<MarkerRef>,
    pub last_updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub origin: GeoPoint,
    pub waypoints: Vec<GeoPoint>,
}

impl RouteRequest {
    /// Origin followed by the waypoints, in visiting order.
    pub fn coordinates(&self) -> Vec<GeoPoint> {
        std::iter::once(self.origin)
            .chain(self.waypoints.iter().copied())
            .collect()
    }
}

/// Route geometry returned by the routing backend.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteResult {
    pub geometry: geojson::FeatureCollection,
    pub bounds: BoundingBox,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionMode {
    Idle,
    AwaitingMapClick(WaypointId),
    Tracking,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackingState {
    Idle,
    Tracking,
    /// Tracking ended by a terminal position error.
    Degraded,
}
