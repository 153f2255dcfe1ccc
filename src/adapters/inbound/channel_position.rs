use crate::common::{PositionError, PositionErrorKind};
use crate::domains::navigation::ports::{PositionReport, PositionSink, PositionSource, WatchHandle};
use crate::domains::navigation::position_tracker::TrackingOptions;
use crate::domains::navigation::types::{GeoPoint, PositionUpdate};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct WatchRegistry {
    next_handle: u64,
    sinks: HashMap<WatchHandle, PositionSink>,
    cleared: Vec<WatchHandle>,
    refusal: Option<PositionError>,
    last_options: Option<TrackingOptions>,
}

/// Position source fed by explicit pushes, e.g. from platform geolocation
/// callbacks bridged into the process.
#[derive(Default)]
pub struct ChannelPositionSource {
    registry: Mutex<WatchRegistry>,
}

impl ChannelPositionSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// A source whose `watch` always fails with `error` (e.g. permission denied).
    pub fn refusing(error: PositionError) -> Self {
        let source = Self::default();
        source.registry().refusal = Some(error);
        source
    }

    /// Delivers a report to every active watch. Returns how many received it.
    pub fn push(&self, report: PositionReport) -> usize {
        let mut registry = self.registry();
        registry.sinks.retain(|_, sink| !sink.is_closed());
        registry
            .sinks
            .values()
            .filter(|sink| sink.send(report.clone()).is_ok())
            .count()
    }

    pub fn push_fix(&self, coord: GeoPoint, captured_at: DateTime<Utc>) -> usize {
        self.push(Ok(PositionUpdate { coord, captured_at }))
    }

    pub fn push_error(&self, kind: PositionErrorKind, message: &str) -> usize {
        self.push(Err(PositionError::new(kind, message)))
    }

    pub fn active_watches(&self) -> usize {
        self.registry().sinks.len()
    }

    /// Handles released through `clear`, in release order.
    pub fn cleared(&self) -> Vec<WatchHandle> {
        self.registry().cleared.clone()
    }

    pub fn last_options(&self) -> Option<TrackingOptions> {
        self.registry().last_options.clone()
    }

    fn registry(&self) -> MutexGuard<'_, WatchRegistry> {
        self.registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PositionSource for ChannelPositionSource {
    fn watch(
        &self,
        sink: PositionSink,
        options: &TrackingOptions,
    ) -> Result<WatchHandle, PositionError> {
        let mut registry = self.registry();
        if let Some(error) = &registry.refusal {
            return Err(error.clone());
        }
        registry.next_handle += 1;
        let handle = WatchHandle(registry.next_handle);
        registry.sinks.insert(handle, sink);
        registry.last_options = Some(options.clone());
        Ok(handle)
    }

    fn clear(&self, handle: WatchHandle) {
        let mut registry = self.registry();
        if registry.sinks.remove(&handle).is_some() {
            registry.cleared.push(handle);
        }
    }
}
