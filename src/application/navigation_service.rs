use crate::common::{GeocodeError, NavigationError, NavigationResult};
use crate::config::Config;
use crate::domains::logger::DynLogger;
use crate::domains::navigation::{
    GeoPoint, GeocodeCandidate, Geocoder, MapRenderer, NavigationEvent, NavigationSession,
    PositionReport, PositionSource, PositionTracker, ProximityMonitor, RouteCall,
    RouteCompletion, RouteOrchestrator, RoutingBackend, WaypointId, WaypointStore,
};
use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// UI events fed into the navigation loop.
#[derive(Debug)]
pub enum NavigationCommand {
    StartTracking,
    StopTracking,
    ToggleFollow,
    AddWaypoint {
        reply: oneshot::Sender<WaypointId>,
    },
    SearchAddress {
        id: WaypointId,
        text: String,
    },
    SelectAddress {
        id: WaypointId,
        candidate: GeocodeCandidate,
    },
    MapClicked(GeoPoint),
    RemoveWaypoint(WaypointId),
    RequestRoute,
    SimulatePosition(GeoPoint),
    Shutdown,
}

type Lookup = (WaypointId, String, Result<Vec<GeocodeCandidate>, GeocodeError>);

enum Input {
    Position(PositionReport),
    Command(NavigationCommand),
    Route(RouteCompletion),
    Lookup(Lookup),
    Closed,
}

/// Builds a session from configuration and injected collaborators.
pub fn build_session(
    config: &Config,
    source: Arc<dyn PositionSource>,
    renderer: Arc<dyn MapRenderer>,
    backend: Arc<dyn RoutingBackend>,
    logger: DynLogger,
) -> NavigationSession {
    NavigationSession::new(
        PositionTracker::new(source, config.tracking.to_options()),
        WaypointStore::new(),
        ProximityMonitor::new(config.proximity.threshold_meters),
        RouteOrchestrator::new(backend),
        renderer,
        logger,
    )
    .with_focus_zoom(config.map.focus_zoom)
}

/// Cloneable sender side used by UI glue.
#[derive(Clone)]
pub struct NavigationHandle {
    commands: mpsc::Sender<NavigationCommand>,
}

impl NavigationHandle {
    pub async fn send(&self, command: NavigationCommand) -> NavigationResult<()> {
        self.commands
            .send(command)
            .await
            .map_err(|e| NavigationError::ChannelClosed(e.to_string()))
    }

    pub async fn add_waypoint(&self) -> NavigationResult<WaypointId> {
        let (reply, answer) = oneshot::channel();
        self.send(NavigationCommand::AddWaypoint { reply }).await?;
        answer
            .await
            .map_err(|e| NavigationError::ChannelClosed(e.to_string()))
    }
}

/// Single-task event loop around a `NavigationSession`.
///
/// Position reports, UI commands, routing completions and geocoder answers are
/// handled one at a time; backend calls run concurrently and report back here.
pub struct NavigationService {
    session: NavigationSession,
    geocoder: Arc<dyn Geocoder>,
    commands: mpsc::Receiver<NavigationCommand>,
    notifications: mpsc::UnboundedSender<NavigationEvent>,
    logger: DynLogger,
}

impl NavigationService {
    pub fn new(
        session: NavigationSession,
        geocoder: Arc<dyn Geocoder>,
        logger: DynLogger,
    ) -> (Self, NavigationHandle, mpsc::UnboundedReceiver<NavigationEvent>) {
        let (command_sender, commands) = mpsc::channel(100);
        let (notifications, notification_receiver) = mpsc::unbounded_channel();
        let service = Self {
            session,
            geocoder,
            commands,
            notifications,
            logger,
        };
        (service, NavigationHandle { commands: command_sender }, notification_receiver)
    }

    /// Runs until `Shutdown` or until every handle is dropped, then tears the
    /// session down and returns it.
    pub async fn run(mut self) -> NavigationSession {
        let mut routes: FuturesUnordered<BoxFuture<'static, RouteCompletion>> =
            FuturesUnordered::new();
        let mut lookups: FuturesUnordered<BoxFuture<'static, Lookup>> = FuturesUnordered::new();

        self.logger.info(&format!("Navigation session {} running", self.session.id()));

        loop {
            let input = tokio::select! {
                Some(report) = self.session.next_position() => Input::Position(report),
                Some(done) = routes.next(), if !routes.is_empty() => Input::Route(done),
                Some(found) = lookups.next(), if !lookups.is_empty() => Input::Lookup(found),
                command = self.commands.recv() => match command {
                    Some(command) => Input::Command(command),
                    None => Input::Closed,
                },
            };

            let call = match input {
                Input::Position(report) => self.session.handle_position_report(report),
                Input::Route(done) => {
                    self.session.on_route_completed(done);
                    None
                }
                Input::Lookup((id, text, result)) => {
                    self.session.apply_suggestions(id, &text, result);
                    None
                }
                Input::Command(NavigationCommand::Shutdown) | Input::Closed => break,
                Input::Command(NavigationCommand::SearchAddress { id, text }) => {
                    if self.session.set_waypoint_query(id, &text).is_ok() {
                        let geocoder = self.geocoder.clone();
                        lookups.push(
                            async move {
                                let result = geocoder.search(&text).await;
                                (id, text, result)
                            }
                            .boxed(),
                        );
                    }
                    None
                }
                Input::Command(command) => self.handle_command(command),
            };

            if let Some(call) = call {
                routes.push(call.run().boxed());
            }
            self.flush_events();
        }

        self.session.teardown();
        self.flush_events();
        self.logger.info(&format!("Navigation session {} closed", self.session.id()));
        self.session
    }

    fn handle_command(&mut self, command: NavigationCommand) -> Option<RouteCall> {
        match command {
            NavigationCommand::StartTracking => {
                let _ = self.session.start();
                None
            }
            NavigationCommand::StopTracking => {
                self.session.stop();
                None
            }
            NavigationCommand::ToggleFollow => {
                self.session.toggle_follow();
                None
            }
            NavigationCommand::AddWaypoint { reply } => {
                let id = self.session.add_waypoint();
                let _ = reply.send(id);
                None
            }
            NavigationCommand::SelectAddress { id, candidate } => {
                if let Err(e) = self.session.on_address_selected(id, candidate) {
                    self.logger.warn(&format!("Address selection ignored: {}", e));
                }
                None
            }
            NavigationCommand::MapClicked(coord) => {
                self.session.on_map_click(coord);
                None
            }
            NavigationCommand::RemoveWaypoint(id) => self.session.on_user_removes_waypoint(id),
            NavigationCommand::RequestRoute => self.session.on_route_requested().ok(),
            NavigationCommand::SimulatePosition(coord) => self.session.simulate_position(coord),
            NavigationCommand::SearchAddress { .. } | NavigationCommand::Shutdown => None,
        }
    }

    fn flush_events(&mut self) {
        for event in self.session.take_events() {
            let _ = self.notifications.send(event);
        }
    }
}
