use crate::common::LocalValidationError;
use crate::domains::navigation::ports::MapRenderer;
use crate::domains::navigation::types::{
    GeoPoint, GeocodeCandidate, MarkerRef, Waypoint, WaypointId, WaypointState,
};

/// Ordered destination slots. Order is insertion order; removal is the only reordering.
#[derive(Debug, Clone, Default)]
pub struct WaypointStore {
    waypoints: Vec<Waypoint>,
}

impl WaypointStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self) -> WaypointId {
        let id = WaypointId::new();
        self.waypoints.push(Waypoint::new(id));
        id
    }

    /// Removes the waypoint and releases its marker. Unknown ids are a no-op.
    pub fn remove(&mut self, id: WaypointId, renderer: &dyn MapRenderer) -> Option<Waypoint> {
        let index = self.position(id)?;
        let mut waypoint = self.waypoints.remove(index);
        if let Some(marker) = waypoint.marker.take() {
            renderer.remove_marker(marker);
        }
        Some(waypoint)
    }

    /// Marks the waypoint as reached and removes it.
    pub fn retire(&mut self, id: WaypointId, renderer: &dyn MapRenderer) -> Option<Waypoint> {
        let mut waypoint = self.remove(id, renderer)?;
        waypoint.state = WaypointState::Arrived;
        Some(waypoint)
    }

    /// Binds a coordinate and a fresh marker. Any previous marker is released first.
    pub fn set_coordinate(
        &mut self,
        id: WaypointId,
        coord: GeoPoint,
        renderer: &dyn MapRenderer,
    ) -> Result<MarkerRef, LocalValidationError> {
        let waypoint = self.get_mut(id)?;
        if let Some(old) = waypoint.marker.take() {
            renderer.remove_marker(old);
        }
        let label = waypoint.label();
        let marker = renderer.place_marker(coord, Some(&label));
        waypoint.coord = Some(coord);
        waypoint.marker = Some(marker);
        waypoint.state = WaypointState::Placed;
        Ok(marker)
    }

    pub fn set_query(&mut self, id: WaypointId, text: &str) -> Result<(), LocalValidationError> {
        self.get_mut(id)?.query = text.to_string();
        Ok(())
    }

    pub fn set_suggestions(
        &mut self,
        id: WaypointId,
        suggestions: Vec<GeocodeCandidate>,
    ) -> Result<(), LocalValidationError> {
        self.get_mut(id)?.suggestions = suggestions;
        Ok(())
    }

    pub fn select_candidate(
        &mut self,
        id: WaypointId,
        candidate: GeocodeCandidate,
    ) -> Result<(), LocalValidationError> {
        let waypoint = self.get_mut(id)?;
        waypoint.query = candidate.label.clone();
        waypoint.selected = Some(candidate);
        Ok(())
    }

    pub fn get(&self, id: WaypointId) -> Option<&Waypoint> {
        self.waypoints.iter().find(|w| w.id == id)
    }

    pub fn contains(&self, id: WaypointId) -> bool {
        self.position(id).is_some()
    }

    /// Snapshot in store order.
    pub fn list(&self) -> Vec<Waypoint> {
        self.waypoints.clone()
    }

    /// Placed waypoints in store order.
    pub fn placed(&self) -> Vec<Waypoint> {
        self.waypoints.iter().filter(|w| w.is_placed()).cloned().collect()
    }

    pub fn has_placed(&self) -> bool {
        self.waypoints.iter().any(Waypoint::is_placed)
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Drops every waypoint and releases all markers.
    pub fn clear(&mut self, renderer: &dyn MapRenderer) {
        for waypoint in self.waypoints.drain(..) {
            if let Some(marker) = waypoint.marker {
                renderer.remove_marker(marker);
            }
        }
    }

    fn position(&self, id: WaypointId) -> Option<usize> {
        self.waypoints.iter().position(|w| w.id == id)
    }

    fn get_mut(&mut self, id: WaypointId) -> Result<&mut Waypoint, LocalValidationError> {
        self.waypoints
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or_else(|| LocalValidationError::UnknownWaypointId { id: id.to_string() })
    }
}
