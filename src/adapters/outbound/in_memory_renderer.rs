use crate::domains::logger::DynLogger;
use crate::domains::navigation::ports::MapRenderer;
use crate::domains::navigation::types::{BoundingBox, GeoPoint, LayerRef, MarkerRef, RouteResult};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedMarker {
    pub coord: GeoPoint,
    pub popup: Option<String>,
}

#[derive(Debug, Default)]
struct RendererState {
    next_handle: u64,
    markers: HashMap<MarkerRef, RenderedMarker>,
    layers: HashMap<LayerRef, RouteResult>,
    view: Option<(GeoPoint, u8)>,
    bounds: Option<BoundingBox>,
}

impl RendererState {
    fn issue(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }
}

/// Map renderer that keeps markers and route layers in an arena keyed by handle.
/// Stands in for the map widget in headless runs and tests.
#[derive(Default)]
pub struct InMemoryMapRenderer {
    state: Mutex<RendererState>,
    logger: Option<DynLogger>,
}

impl InMemoryMapRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also reports every drawing operation to `logger`.
    pub fn with_logger(logger: DynLogger) -> Self {
        Self {
            state: Mutex::new(RendererState::default()),
            logger: Some(logger),
        }
    }

    pub fn marker(&self, marker: MarkerRef) -> Option<RenderedMarker> {
        self.state().markers.get(&marker).cloned()
    }

    pub fn marker_count(&self) -> usize {
        self.state().markers.len()
    }

    pub fn layer_count(&self) -> usize {
        self.state().layers.len()
    }

    /// The route currently on the map, if exactly one is drawn.
    pub fn active_route(&self) -> Option<RouteResult> {
        let state = self.state();
        if state.layers.len() != 1 {
            return None;
        }
        state.layers.values().next().cloned()
    }

    pub fn view(&self) -> Option<(GeoPoint, u8)> {
        self.state().view
    }

    pub fn last_bounds(&self) -> Option<BoundingBox> {
        self.state().bounds
    }

    fn state(&self) -> MutexGuard<'_, RendererState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn trace(&self, msg: impl FnOnce() -> String) {
        if let Some(logger) = &self.logger {
            logger.info(&msg());
        }
    }
}

impl MapRenderer for InMemoryMapRenderer {
    fn place_marker(&self, coord: GeoPoint, popup: Option<&str>) -> MarkerRef {
        let mut state = self.state();
        let marker = MarkerRef(state.issue());
        state.markers.insert(
            marker,
            RenderedMarker {
                coord,
                popup: popup.map(str::to_string),
            },
        );
        drop(state);
        self.trace(|| format!("map: marker {} placed at {}", marker.0, coord));
        marker
    }

    fn move_marker(&self, marker: MarkerRef, coord: GeoPoint, popup: Option<&str>) {
        let mut state = self.state();
        if let Some(rendered) = state.markers.get_mut(&marker) {
            rendered.coord = coord;
            if let Some(text) = popup {
                rendered.popup = Some(text.to_string());
            }
        }
    }

    fn remove_marker(&self, marker: MarkerRef) {
        self.state().markers.remove(&marker);
        self.trace(|| format!("map: marker {} removed", marker.0));
    }

    fn draw_route(&self, route: &RouteResult) -> LayerRef {
        let mut state = self.state();
        let layer = LayerRef(state.issue());
        state.layers.insert(layer, route.clone());
        drop(state);
        self.trace(|| format!("map: route layer {} drawn", layer.0));
        layer
    }

    fn remove_layer(&self, layer: LayerRef) {
        self.state().layers.remove(&layer);
        self.trace(|| format!("map: route layer {} removed", layer.0));
    }

    fn fit_bounds(&self, bounds: BoundingBox) {
        self.state().bounds = Some(bounds);
    }

    fn center_view(&self, coord: GeoPoint, zoom: u8) {
        self.state().view = Some((coord, zoom));
        self.trace(|| format!("map: view centered on {} at zoom {}", coord, zoom));
    }
}
