use crate::common::{GeocodeError, LocalValidationError, PositionError, PositionErrorKind};
use crate::domains::logger::DynLogger;
use crate::domains::navigation::events::NavigationEvent;
use crate::domains::navigation::ports::{MapRenderer, PositionReport};
use crate::domains::navigation::position_tracker::{PositionTracker, Subscription};
use crate::domains::navigation::proximity::ProximityMonitor;
use crate::domains::navigation::route_orchestrator::{
    RouteCall, RouteCompletion, RouteOrchestrator, RouteOutcome,
};
use crate::domains::navigation::types::{
    GeoPoint, GeocodeCandidate, OriginState, PositionUpdate, RouteRequest, SessionMode,
    TrackingState, Waypoint, WaypointId,
};
use crate::domains::navigation::waypoint_store::WaypointStore;
use chrono::{Local, Utc};
use std::sync::Arc;
use uuid::Uuid;

pub const DEFAULT_FOCUS_ZOOM: u8 = 16;

/// Live navigation state for one user: origin, destinations, tracking and routing.
///
/// Methods that may start a routing call return it instead of awaiting it, so the
/// caller can keep feeding events while the backend answers. Completed calls come
/// back through `on_route_completed`, where superseded results are dropped.
pub struct NavigationSession {
    id: String,
    tracker: PositionTracker,
    store: WaypointStore,
    monitor: ProximityMonitor,
    orchestrator: RouteOrchestrator,
    renderer: Arc<dyn MapRenderer>,
    logger: DynLogger,
    subscription: Option<Subscription>,
    tracking: TrackingState,
    click_target: Option<WaypointId>,
    origin: Option<OriginState>,
    follow: bool,
    focus_zoom: u8,
    events: Vec<NavigationEvent>,
}

impl NavigationSession {
    pub fn new(
        tracker: PositionTracker,
        store: WaypointStore,
        monitor: ProximityMonitor,
        orchestrator: RouteOrchestrator,
        renderer: Arc<dyn MapRenderer>,
        logger: DynLogger,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            tracker,
            store,
            monitor,
            orchestrator,
            renderer,
            logger,
            subscription: None,
            tracking: TrackingState::Idle,
            click_target: None,
            origin: None,
            follow: false,
            focus_zoom: DEFAULT_FOCUS_ZOOM,
            events: Vec::new(),
        }
    }

    pub fn with_focus_zoom(mut self, zoom: u8) -> Self {
        self.focus_zoom = zoom;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn mode(&self) -> SessionMode {
        match (self.click_target, self.tracking) {
            (Some(id), _) => SessionMode::AwaitingMapClick(id),
            (None, TrackingState::Tracking) => SessionMode::Tracking,
            (None, _) => SessionMode::Idle,
        }
    }

    pub fn tracking_state(&self) -> TrackingState {
        self.tracking
    }

    pub fn origin(&self) -> Option<&OriginState> {
        self.origin.as_ref()
    }

    pub fn click_target(&self) -> Option<WaypointId> {
        self.click_target
    }

    pub fn is_following(&self) -> bool {
        self.follow
    }

    pub fn waypoints(&self) -> Vec<Waypoint> {
        self.store.list()
    }

    pub fn waypoint(&self, id: WaypointId) -> Option<&Waypoint> {
        self.store.get(id)
    }

    pub fn route_in_flight(&self) -> bool {
        self.orchestrator.is_in_flight()
    }

    pub fn events(&self) -> &[NavigationEvent] {
        &self.events
    }

    /// Hands the recorded events to the caller and clears the outbox.
    pub fn take_events(&mut self) -> Vec<NavigationEvent> {
        std::mem::take(&mut self.events)
    }

    // ---- lifecycle ----

    pub fn start(&mut self) -> Result<(), PositionError> {
        if self.subscription.is_some() {
            return Ok(());
        }
        match self.tracker.start() {
            Ok(subscription) => {
                self.subscription = Some(subscription);
                self.tracking = TrackingState::Tracking;
                self.origin.get_or_insert_with(OriginState::default);
                self.logger.info(&format!("Session {}: tracking started", self.id));
                self.record(NavigationEvent::TrackingStarted {
                    session_id: self.id.clone(),
                    timestamp: Utc::now(),
                });
                Ok(())
            }
            Err(e) => {
                self.on_position_error(e.clone());
                Err(e)
            }
        }
    }

    /// Cancels the position watch and drops the origin. Waypoints and the drawn route stay.
    pub fn stop(&mut self) {
        let was_tracking = self.release_subscription();
        self.tracking = TrackingState::Idle;
        if let Some(origin) = self.origin.take() {
            if let Some(marker) = origin.marker {
                self.renderer.remove_marker(marker);
            }
        }
        if was_tracking {
            self.logger.info(&format!("Session {}: tracking stopped", self.id));
            self.record(NavigationEvent::TrackingStopped {
                session_id: self.id.clone(),
                timestamp: Utc::now(),
            });
        }
    }

    /// Stops tracking and releases every marker and layer the session put on the map.
    pub fn teardown(&mut self) {
        self.stop();
        self.click_target = None;
        self.store.clear(self.renderer.as_ref());
        self.orchestrator.clear(self.renderer.as_ref());
    }

    /// Waits for the next position report. Pends forever while not tracking.
    pub async fn next_position(&mut self) -> Option<PositionReport> {
        match self.subscription.as_mut() {
            Some(subscription) => match subscription.next().await {
                Some(report) => Some(report),
                None => Some(Err(PositionError::new(
                    PositionErrorKind::Unavailable,
                    "position source closed",
                ))),
            },
            None => std::future::pending().await,
        }
    }

    pub fn handle_position_report(&mut self, report: PositionReport) -> Option<RouteCall> {
        match report {
            Ok(update) => self.on_position_update(update),
            Err(e) => {
                self.on_position_error(e);
                None
            }
        }
    }

    // ---- position ----

    pub fn on_position_update(&mut self, update: PositionUpdate) -> Option<RouteCall> {
        let coord = update.coord;
        let renderer = self.renderer.clone();
        let focus_zoom = self.focus_zoom;
        let origin = self.origin.get_or_insert_with(OriginState::default);

        match origin.marker {
            Some(marker) => {
                let popup = format!(
                    "You are here (updated: {})",
                    update.captured_at.with_timezone(&Local).format("%H:%M:%S")
                );
                renderer.move_marker(marker, coord, Some(&popup));
            }
            None => {
                origin.marker = Some(renderer.place_marker(coord, Some("You are here")));
                renderer.center_view(coord, focus_zoom);
            }
        }
        origin.coord = Some(coord);
        origin.last_updated_at = Some(update.captured_at);

        if self.follow {
            renderer.center_view(coord, focus_zoom);
        }

        self.check_arrival(coord)
    }

    /// Feeds a synthetic position through the same path as real reports.
    pub fn simulate_position(&mut self, coord: GeoPoint) -> Option<RouteCall> {
        self.on_position_update(PositionUpdate {
            coord,
            captured_at: Utc::now(),
        })
    }

    pub fn on_position_error(&mut self, error: PositionError) {
        let terminal = error.kind.is_terminal();
        if terminal {
            self.logger.error(&format!("Session {}: tracking lost: {}", self.id, error));
            self.release_subscription();
            self.tracking = TrackingState::Degraded;
        } else {
            self.logger.warn(&format!("Session {}: {}", self.id, error));
        }
        self.record(NavigationEvent::PositionFailed {
            session_id: self.id.clone(),
            kind: error.kind,
            message: error.message,
            terminal,
            timestamp: Utc::now(),
        });
    }

    pub fn toggle_follow(&mut self) -> bool {
        self.follow = !self.follow;
        if self.follow {
            if let Some(coord) = self.origin.as_ref().and_then(|o| o.coord) {
                self.renderer.center_view(coord, self.focus_zoom);
            }
        }
        self.follow
    }

    fn check_arrival(&mut self, origin: GeoPoint) -> Option<RouteCall> {
        let arrival = self.monitor.check(&origin, &self.store.placed())?;
        let waypoint = self.store.retire(arrival.id, self.renderer.as_ref())?;
        if self.click_target == Some(waypoint.id) {
            self.click_target = None;
        }
        let label = waypoint.label();
        self.logger.info(&format!(
            "Session {}: arrived at {} ({:.1} m)",
            self.id, label, arrival.distance_m
        ));
        self.record(NavigationEvent::Arrived {
            session_id: self.id.clone(),
            waypoint_id: waypoint.id,
            label,
            distance_m: arrival.distance_m,
            timestamp: Utc::now(),
        });
        self.recompute_route()
    }

    // ---- waypoints ----

    pub fn add_waypoint(&mut self) -> WaypointId {
        let id = self.store.add();
        self.record(NavigationEvent::WaypointAdded {
            session_id: self.id.clone(),
            waypoint_id: id,
            timestamp: Utc::now(),
        });
        id
    }

    pub fn set_waypoint_query(
        &mut self,
        id: WaypointId,
        text: &str,
    ) -> Result<(), LocalValidationError> {
        self.store.set_query(id, text)
    }

    /// Stores a geocoder answer for a waypoint. Answers for removed waypoints, or
    /// for a query the user has since changed, are dropped.
    pub fn apply_suggestions(
        &mut self,
        id: WaypointId,
        query: &str,
        result: Result<Vec<GeocodeCandidate>, GeocodeError>,
    ) {
        let Some(waypoint) = self.store.get(id) else {
            self.logger.info(&format!(
                "Session {}: suggestions for removed waypoint {} dropped",
                self.id, id
            ));
            return;
        };
        if waypoint.query != query {
            self.logger.info(&format!(
                "Session {}: stale suggestions for \"{}\" dropped",
                self.id, query
            ));
            return;
        }
        let result = result.and_then(|candidates| {
            if candidates.is_empty() {
                Err(GeocodeError::NoResults { query: query.to_string() })
            } else {
                Ok(candidates)
            }
        });
        let (candidates, failure) = match result {
            Ok(candidates) => (candidates, None),
            Err(e) => (Vec::new(), Some(e)),
        };
        if let Err(e) = self.store.set_suggestions(id, candidates) {
            self.logger.warn(&format!("Session {}: suggestions not stored: {}", self.id, e));
            return;
        }
        if let Some(e) = failure {
            self.logger.warn(&format!("Session {}: address lookup failed: {}", self.id, e));
            self.record(NavigationEvent::SuggestionsFailed {
                session_id: self.id.clone(),
                waypoint_id: id,
                reason: e.to_string(),
                timestamp: Utc::now(),
            });
        }
    }

    /// Recenters on the chosen candidate and waits for a map click to place the marker.
    pub fn on_address_selected(
        &mut self,
        id: WaypointId,
        candidate: GeocodeCandidate,
    ) -> Result<(), LocalValidationError> {
        let coord = candidate.coord;
        self.store.select_candidate(id, candidate)?;
        self.renderer.center_view(coord, self.focus_zoom);
        self.click_target = Some(id);
        Ok(())
    }

    /// Places the awaited waypoint. Returns whether the click was consumed.
    pub fn on_map_click(&mut self, coord: GeoPoint) -> bool {
        let Some(id) = self.click_target.take() else {
            return false;
        };
        match self.store.set_coordinate(id, coord, self.renderer.as_ref()) {
            Ok(_) => {
                self.record(NavigationEvent::WaypointPlaced {
                    session_id: self.id.clone(),
                    waypoint_id: id,
                    coord,
                    timestamp: Utc::now(),
                });
                true
            }
            Err(e) => {
                self.logger.info(&format!("Session {}: map click ignored: {}", self.id, e));
                false
            }
        }
    }

    pub fn on_user_removes_waypoint(&mut self, id: WaypointId) -> Option<RouteCall> {
        self.store.remove(id, self.renderer.as_ref())?;
        if self.click_target == Some(id) {
            self.click_target = None;
        }
        self.record(NavigationEvent::WaypointRemoved {
            session_id: self.id.clone(),
            waypoint_id: id,
            timestamp: Utc::now(),
        });
        self.recompute_route()
    }

    // ---- routing ----

    /// Explicit route request from the user.
    pub fn on_route_requested(&mut self) -> Result<RouteCall, LocalValidationError> {
        let result = self.build_request().and_then(|request| self.orchestrator.prepare(request));
        match &result {
            Ok(call) => self.logger.info(&format!(
                "Session {}: route requested through {} waypoint(s)",
                self.id,
                call.request().waypoints.len()
            )),
            Err(e) => {
                self.logger.warn(&format!("Session {}: route request refused: {}", self.id, e));
                self.record(NavigationEvent::ValidationRejected {
                    session_id: self.id.clone(),
                    reason: e.to_string(),
                    timestamp: Utc::now(),
                });
            }
        }
        result
    }

    pub fn on_route_completed(&mut self, completion: RouteCompletion) -> RouteOutcome {
        let outcome = self.orchestrator.complete(completion, self.renderer.as_ref());
        match &outcome {
            RouteOutcome::Drawn(layer) => {
                self.record(NavigationEvent::RouteDrawn {
                    session_id: self.id.clone(),
                    layer: *layer,
                    timestamp: Utc::now(),
                });
            }
            RouteOutcome::Discarded => {
                self.logger.info(&format!("Session {}: stale route response discarded", self.id));
                self.record(NavigationEvent::RouteDiscarded {
                    session_id: self.id.clone(),
                    timestamp: Utc::now(),
                });
            }
            RouteOutcome::Failed(e) => {
                self.logger.error(&format!("Session {}: route failed: {}", self.id, e));
                self.record(NavigationEvent::RouteFailed {
                    session_id: self.id.clone(),
                    reason: e.to_string(),
                    timestamp: Utc::now(),
                });
            }
        }
        outcome
    }

    /// Re-routes through the remaining placed waypoints, or clears the route when none remain.
    fn recompute_route(&mut self) -> Option<RouteCall> {
        if !self.store.has_placed() {
            if self.orchestrator.clear(self.renderer.as_ref()) {
                self.record(NavigationEvent::RouteCleared {
                    session_id: self.id.clone(),
                    timestamp: Utc::now(),
                });
            }
            return None;
        }
        match self.build_request().and_then(|request| self.orchestrator.prepare(request)) {
            Ok(call) => Some(call),
            Err(e) => {
                self.logger.info(&format!("Session {}: route not recomputed: {}", self.id, e));
                None
            }
        }
    }

    fn build_request(&self) -> Result<RouteRequest, LocalValidationError> {
        let origin = self
            .origin
            .as_ref()
            .and_then(|o| o.coord)
            .ok_or(LocalValidationError::MissingOrigin)?;
        let waypoints: Vec<GeoPoint> = self.store.placed().iter().filter_map(|w| w.coord).collect();
        if waypoints.is_empty() {
            return Err(LocalValidationError::NoPlacedWaypoints);
        }
        Ok(RouteRequest { origin, waypoints })
    }

    fn release_subscription(&mut self) -> bool {
        match self.subscription.take() {
            Some(subscription) => {
                self.tracker.stop(subscription);
                true
            }
            None => false,
        }
    }

    fn record(&mut self, event: NavigationEvent) {
        self.events.push(event);
    }
}
