use crate::common::{LocalValidationError, RouteError};
use crate::domains::navigation::ports::{MapRenderer, RoutingBackend};
use crate::domains::navigation::types::{LayerRef, RouteRequest, RouteResult};
use std::sync::Arc;

/// Identifies one issued route request. Only the most recent ticket may render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteTicket(u64);

/// A routing call detached from the orchestrator so it can run while newer
/// state keeps changing.
pub struct RouteCall {
    ticket: RouteTicket,
    request: RouteRequest,
    backend: Arc<dyn RoutingBackend>,
}

impl RouteCall {
    pub fn ticket(&self) -> RouteTicket {
        self.ticket
    }

    pub fn request(&self) -> &RouteRequest {
        &self.request
    }

    pub async fn run(self) -> RouteCompletion {
        let result = self.backend.route(&self.request).await;
        RouteCompletion { ticket: self.ticket, result }
    }
}

#[derive(Debug)]
pub struct RouteCompletion {
    pub ticket: RouteTicket,
    pub result: Result<RouteResult, RouteError>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    Drawn(LayerRef),
    /// A newer request was issued (or the route cleared) before this one completed.
    Discarded,
    Failed(RouteError),
}

pub struct RouteOrchestrator {
    backend: Arc<dyn RoutingBackend>,
    latest: u64,
    in_flight: Option<RouteTicket>,
    drawn: Option<LayerRef>,
}

impl RouteOrchestrator {
    pub fn new(backend: Arc<dyn RoutingBackend>) -> Self {
        Self {
            backend,
            latest: 0,
            in_flight: None,
            drawn: None,
        }
    }

    /// Issues a new request, superseding any call still in flight.
    /// A request without waypoints is refused here and never reaches the backend.
    pub fn prepare(&mut self, request: RouteRequest) -> Result<RouteCall, LocalValidationError> {
        if request.waypoints.is_empty() {
            return Err(LocalValidationError::NoPlacedWaypoints);
        }
        self.latest += 1;
        let ticket = RouteTicket(self.latest);
        self.in_flight = Some(ticket);
        Ok(RouteCall {
            ticket,
            request,
            backend: self.backend.clone(),
        })
    }

    /// Applies a finished call. Stale completions are dropped without touching the map.
    pub fn complete(
        &mut self,
        completion: RouteCompletion,
        renderer: &dyn MapRenderer,
    ) -> RouteOutcome {
        if self.in_flight != Some(completion.ticket) {
            return RouteOutcome::Discarded;
        }
        self.in_flight = None;

        match completion.result {
            Ok(route) => {
                if let Some(old) = self.drawn.take() {
                    renderer.remove_layer(old);
                }
                let layer = renderer.draw_route(&route);
                renderer.fit_bounds(route.bounds);
                self.drawn = Some(layer);
                RouteOutcome::Drawn(layer)
            }
            Err(e) => RouteOutcome::Failed(e),
        }
    }

    /// Prepare, call and apply in one go, for callers that do not interleave requests.
    pub async fn request_route(
        &mut self,
        request: RouteRequest,
        renderer: &dyn MapRenderer,
    ) -> Result<RouteOutcome, LocalValidationError> {
        let call = self.prepare(request)?;
        let completion = call.run().await;
        Ok(self.complete(completion, renderer))
    }

    /// Removes the displayed route and invalidates any call in flight.
    /// Returns whether a layer was removed.
    pub fn clear(&mut self, renderer: &dyn MapRenderer) -> bool {
        self.in_flight = None;
        match self.drawn.take() {
            Some(layer) => {
                renderer.remove_layer(layer);
                true
            }
            None => false,
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn drawn_layer(&self) -> Option<LayerRef> {
        self.drawn
    }
}
