use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classification of a failed position report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionErrorKind {
    PermissionDenied,
    Unavailable,
    Timeout,
    Unknown,
}

impl PositionErrorKind {
    /// Terminal kinds end the tracking subscription; the rest wait for the next callback.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PositionErrorKind::PermissionDenied | PositionErrorKind::Unavailable)
    }

    /// Maps the numeric codes used by browser geolocation providers.
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => PositionErrorKind::PermissionDenied,
            2 => PositionErrorKind::Unavailable,
            3 => PositionErrorKind::Timeout,
            _ => PositionErrorKind::Unknown,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PositionErrorKind::PermissionDenied => "permission denied",
            PositionErrorKind::Unavailable => "position unavailable",
            PositionErrorKind::Timeout => "timed out",
            PositionErrorKind::Unknown => "unknown error",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("Position error ({}): {message}", .kind.description())]
pub struct PositionError {
    pub kind: PositionErrorKind,
    pub message: String,
}

impl PositionError {
    pub fn new(kind: PositionErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeocodeError {
    #[error("No results for address: {query}")]
    NoResults { query: String },

    #[error("Geocoder network failure: {0}")]
    NetworkFailure(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RouteError {
    #[error("Routing network failure: {0}")]
    NetworkFailure(String),

    #[error("Routing backend rejected the request with status {status}: {body}")]
    BackendRejected { status: u16, body: String },

    #[error("Malformed routing response: {0}")]
    MalformedResponse(String),
}

/// Refusals decided locally, before anything reaches the network layer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LocalValidationError {
    #[error("Origin is not known yet, waiting for the current location")]
    MissingOrigin,

    #[error("No destination has been placed on the map")]
    NoPlacedWaypoints,

    #[error("Unknown waypoint: {id}")]
    UnknownWaypointId { id: String },
}

#[derive(Error, Debug)]
pub enum NavigationError {
    #[error(transparent)]
    Position(#[from] PositionError),

    #[error(transparent)]
    Geocode(#[from] GeocodeError),

    #[error(transparent)]
    Route(#[from] RouteError),

    #[error(transparent)]
    Validation(#[from] LocalValidationError),

    #[error("Session channel closed: {0}")]
    ChannelClosed(String),
}

pub type NavigationResult<T> = Result<T, NavigationError>;
