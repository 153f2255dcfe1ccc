use crate::domains::navigation::types::{GeoPoint, Waypoint, WaypointId};
use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

pub const DEFAULT_ARRIVAL_THRESHOLD_M: f64 = 30.0;

/// Great-circle distance between two points in meters.
pub fn haversine_distance(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlng = (b.lng - a.lng).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArrivalEvent {
    pub id: WaypointId,
    pub distance_m: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityMonitor {
    threshold_m: f64,
}

impl Default for ProximityMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_ARRIVAL_THRESHOLD_M)
    }
}

impl ProximityMonitor {
    pub fn new(threshold_m: f64) -> Self {
        Self { threshold_m }
    }

    pub fn threshold_m(&self) -> f64 {
        self.threshold_m
    }

    /// First waypoint in store order within the threshold, if any.
    /// At most one arrival per call; the next position tick picks up the rest.
    pub fn check(&self, origin: &GeoPoint, waypoints: &[Waypoint]) -> Option<ArrivalEvent> {
        waypoints
            .iter()
            .filter(|w| w.is_placed())
            .find_map(|w| {
                let coord = w.coord?;
                let distance_m = haversine_distance(origin, &coord);
                (distance_m <= self.threshold_m).then_some(ArrivalEvent { id: w.id, distance_m })
            })
    }
}
