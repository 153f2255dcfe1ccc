use crate::common::{DomainEvent, PositionErrorKind};
use crate::domains::navigation::types::{GeoPoint, LayerRef, WaypointId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Things the user should be told about, recorded by the session in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NavigationEvent {
    TrackingStarted {
        session_id: String,
        timestamp: DateTime<Utc>,
    },
    TrackingStopped {
        session_id: String,
        timestamp: DateTime<Utc>,
    },
    /// A position error. Terminal errors also end tracking.
    PositionFailed {
        session_id: String,
        kind: PositionErrorKind,
        message: String,
        terminal: bool,
        timestamp: DateTime<Utc>,
    },
    WaypointAdded {
        session_id: String,
        waypoint_id: WaypointId,
        timestamp: DateTime<Utc>,
    },
    WaypointPlaced {
        session_id: String,
        waypoint_id: WaypointId,
        coord: GeoPoint,
        timestamp: DateTime<Utc>,
    },
    WaypointRemoved {
        session_id: String,
        waypoint_id: WaypointId,
        timestamp: DateTime<Utc>,
    },
    Arrived {
        session_id: String,
        waypoint_id: WaypointId,
        label: String,
        distance_m: f64,
        timestamp: DateTime<Utc>,
    },
    RouteDrawn {
        session_id: String,
        layer: LayerRef,
        timestamp: DateTime<Utc>,
    },
    RouteCleared {
        session_id: String,
        timestamp: DateTime<Utc>,
    },
    RouteFailed {
        session_id: String,
        reason: String,
        timestamp: DateTime<Utc>,
    },
    RouteDiscarded {
        session_id: String,
        timestamp: DateTime<Utc>,
    },
    SuggestionsFailed {
        session_id: String,
        waypoint_id: WaypointId,
        reason: String,
        timestamp: DateTime<Utc>,
    },
    ValidationRejected {
        session_id: String,
        reason: String,
        timestamp: DateTime<Utc>,
    },
}

impl NavigationEvent {
    /// Whether the UI should surface this event to the user.
    pub fn is_user_visible(&self) -> bool {
        matches!(
            self,
            NavigationEvent::PositionFailed { .. }
                | NavigationEvent::Arrived { .. }
                | NavigationEvent::RouteFailed { .. }
                | NavigationEvent::SuggestionsFailed { .. }
                | NavigationEvent::ValidationRejected { .. }
        )
    }
}

impl DomainEvent for NavigationEvent {
    fn event_type(&self) -> &'static str {
        match self {
            NavigationEvent::TrackingStarted { .. } => "TrackingStarted",
            NavigationEvent::TrackingStopped { .. } => "TrackingStopped",
            NavigationEvent::PositionFailed { .. } => "PositionFailed",
            NavigationEvent::WaypointAdded { .. } => "WaypointAdded",
            NavigationEvent::WaypointPlaced { .. } => "WaypointPlaced",
            NavigationEvent::WaypointRemoved { .. } => "WaypointRemoved",
            NavigationEvent::Arrived { .. } => "Arrived",
            NavigationEvent::RouteDrawn { .. } => "RouteDrawn",
            NavigationEvent::RouteCleared { .. } => "RouteCleared",
            NavigationEvent::RouteFailed { .. } => "RouteFailed",
            NavigationEvent::RouteDiscarded { .. } => "RouteDiscarded",
            NavigationEvent::SuggestionsFailed { .. } => "SuggestionsFailed",
            NavigationEvent::ValidationRejected { .. } => "ValidationRejected",
        }
    }

    fn aggregate_id(&self) -> &str {
        match self {
            NavigationEvent::TrackingStarted { session_id, .. } => session_id,
            NavigationEvent::TrackingStopped { session_id, .. } => session_id,
            NavigationEvent::PositionFailed { session_id, .. } => session_id,
            NavigationEvent::WaypointAdded { session_id, .. } => session_id,
            NavigationEvent::WaypointPlaced { session_id, .. } => session_id,
            NavigationEvent::WaypointRemoved { session_id, .. } => session_id,
            NavigationEvent::Arrived { session_id, .. } => session_id,
            NavigationEvent::RouteDrawn { session_id, .. } => session_id,
            NavigationEvent::RouteCleared { session_id, .. } => session_id,
            NavigationEvent::RouteFailed { session_id, .. } => session_id,
            NavigationEvent::RouteDiscarded { session_id, .. } => session_id,
            NavigationEvent::SuggestionsFailed { session_id, .. } => session_id,
            NavigationEvent::ValidationRejected { session_id, .. } => session_id,
        }
    }

    fn event_version(&self) -> u64 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            NavigationEvent::TrackingStarted { timestamp, .. } => *timestamp,
            NavigationEvent::TrackingStopped { timestamp, .. } => *timestamp,
            NavigationEvent::PositionFailed { timestamp, .. } => *timestamp,
            NavigationEvent::WaypointAdded { timestamp, .. } => *timestamp,
            NavigationEvent::WaypointPlaced { timestamp, .. } => *timestamp,
            NavigationEvent::WaypointRemoved { timestamp, .. } => *timestamp,
            NavigationEvent::Arrived { timestamp, .. } => *timestamp,
            NavigationEvent::RouteDrawn { timestamp, .. } => *timestamp,
            NavigationEvent::RouteCleared { timestamp, .. } => *timestamp,
            NavigationEvent::RouteFailed { timestamp, .. } => *timestamp,
            NavigationEvent::RouteDiscarded { timestamp, .. } => *timestamp,
            NavigationEvent::SuggestionsFailed { timestamp, .. } => *timestamp,
            NavigationEvent::ValidationRejected { timestamp, .. } => *timestamp,
        }
    }
}
