#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use stepmap_nav::adapters::inbound::ChannelPositionSource;
use stepmap_nav::adapters::outbound::InMemoryMapRenderer;
use stepmap_nav::common::RouteError;
use stepmap_nav::domains::logger::DomainLogger;
use stepmap_nav::domains::navigation::*;

pub struct CaptureLogger {
    pub messages: Arc<Mutex<Vec<String>>>,
}

impl CaptureLogger {
    pub fn new() -> Self {
        Self { messages: Arc::new(Mutex::new(Vec::new())) }
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.messages.lock().unwrap().iter().any(|m| m.contains(needle))
    }
}

impl DomainLogger for CaptureLogger {
    fn info(&self, msg: &str) { self.messages.lock().unwrap().push(format!("INFO:{}", msg)); }
    fn warn(&self, msg: &str) { self.messages.lock().unwrap().push(format!("WARN:{}", msg)); }
    fn error(&self, msg: &str) { self.messages.lock().unwrap().push(format!("ERR:{}", msg)); }
}

/// Answers every request with a straight line through its coordinates.
pub struct EchoRoutingBackend {
    calls: AtomicUsize,
    fail: AtomicBool,
    pub requests: Mutex<Vec<RouteRequest>>,
}

impl EchoRoutingBackend {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl RoutingBackend for EchoRoutingBackend {
    async fn route(&self, request: &RouteRequest) -> Result<RouteResult, RouteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        if self.fail.load(Ordering::SeqCst) {
            return Err(RouteError::BackendRejected { status: 500, body: "boom".to_string() });
        }
        Ok(route_through(&request.coordinates()))
    }
}

pub fn route_through(points: &[GeoPoint]) -> RouteResult {
    let line: Vec<Vec<f64>> = points.iter().map(|p| p.to_lng_lat().to_vec()).collect();
    let feature = geojson::Feature {
        bbox: None,
        geometry: Some(geojson::Geometry::new(geojson::Value::LineString(line))),
        id: None,
        properties: None,
        foreign_members: None,
    };
    RouteResult {
        geometry: geojson::FeatureCollection {
            bbox: None,
            features: vec![feature],
            foreign_members: None,
        },
        bounds: BoundingBox::enclosing(points).unwrap(),
    }
}

/// Coordinates of the first LineString in a drawn route.
pub fn line_of(route: &RouteResult) -> Vec<GeoPoint> {
    route
        .geometry
        .features
        .iter()
        .filter_map(|f| f.geometry.as_ref())
        .find_map(|g| match &g.value {
            geojson::Value::LineString(line) => {
                Some(line.iter().filter_map(|p| GeoPoint::from_lng_lat(p)).collect())
            }
            _ => None,
        })
        .unwrap_or_default()
}

pub const ORIGIN: GeoPoint = GeoPoint { lat: -7.1654, lng: -34.8631 };
/// About 22 m east of `ORIGIN`.
pub const NEAR: GeoPoint = GeoPoint { lat: -7.1654, lng: -34.8629 };
/// About 5 km north of `ORIGIN`.
pub const FAR: GeoPoint = GeoPoint { lat: -7.1200, lng: -34.8631 };
pub const FARTHER: GeoPoint = GeoPoint { lat: -7.1000, lng: -34.8400 };

pub struct Fixture {
    pub session: NavigationSession,
    pub renderer: Arc<InMemoryMapRenderer>,
    pub source: Arc<ChannelPositionSource>,
    pub backend: Arc<EchoRoutingBackend>,
    pub logger: Arc<CaptureLogger>,
}

pub fn fixture() -> Fixture {
    fixture_with_source(Arc::new(ChannelPositionSource::new()))
}

pub fn fixture_with_source(source: Arc<ChannelPositionSource>) -> Fixture {
    let renderer = Arc::new(InMemoryMapRenderer::new());
    let backend = Arc::new(EchoRoutingBackend::new());
    let logger = Arc::new(CaptureLogger::new());
    let session = NavigationSession::new(
        PositionTracker::new(source.clone(), TrackingOptions::default()),
        WaypointStore::new(),
        ProximityMonitor::default(),
        RouteOrchestrator::new(backend.clone()),
        renderer.clone(),
        logger.clone(),
    );
    Fixture { session, renderer, source, backend, logger }
}

pub fn candidate(coord: GeoPoint, label: &str) -> GeocodeCandidate {
    GeocodeCandidate { coord, label: label.to_string() }
}

/// Adds a waypoint and places it through the address-select + map-click flow.
pub fn place_waypoint(session: &mut NavigationSession, coord: GeoPoint, label: &str) -> WaypointId {
    let id = session.add_waypoint();
    session.on_address_selected(id, candidate(coord, label)).unwrap();
    assert!(session.on_map_click(coord));
    id
}
