use crate::common::{GeocodeError, PositionError, RouteError};
use crate::domains::navigation::position_tracker::TrackingOptions;
use crate::domains::navigation::types::{
    BoundingBox, GeoPoint, GeocodeCandidate, LayerRef, MarkerRef, PositionUpdate, RouteRequest,
    RouteResult,
};
use async_trait::async_trait;
use tokio::sync::mpsc;

pub type PositionReport = Result<PositionUpdate, PositionError>;

/// Channel end a position source pushes its callbacks into.
pub type PositionSink = mpsc::UnboundedSender<PositionReport>;

/// Handle returned by a position source for one watch registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchHandle(pub u64);

/// Port for the device location provider.
pub trait PositionSource: Send + Sync {
    /// Start delivering reports into `sink` until `clear` is called with the returned handle.
    fn watch(
        &self,
        sink: PositionSink,
        options: &TrackingOptions,
    ) -> Result<WatchHandle, PositionError>;
    fn clear(&self, handle: WatchHandle);
}

/// Port for the map widget. Marker and layer objects stay inside the renderer;
/// the core only keeps the handles.
pub trait MapRenderer: Send + Sync {
    fn place_marker(&self, coord: GeoPoint, popup: Option<&str>) -> MarkerRef;
    /// Move an existing marker in place and optionally replace its popup text.
    fn move_marker(&self, marker: MarkerRef, coord: GeoPoint, popup: Option<&str>);
    fn remove_marker(&self, marker: MarkerRef);
    fn draw_route(&self, route: &RouteResult) -> LayerRef;
    fn remove_layer(&self, layer: LayerRef);
    fn fit_bounds(&self, bounds: BoundingBox);
    fn center_view(&self, coord: GeoPoint, zoom: u8);
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Ranked candidates for a free-text address.
    async fn search(&self, text: &str) -> Result<Vec<GeocodeCandidate>, GeocodeError>;
}

#[async_trait]
pub trait RoutingBackend: Send + Sync {
    async fn route(&self, request: &RouteRequest) -> Result<RouteResult, RouteError>;
}
