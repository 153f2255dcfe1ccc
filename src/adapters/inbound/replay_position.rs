use crate::common::{PositionError, PositionErrorKind};
use crate::domains::navigation::ports::{PositionSink, PositionSource, WatchHandle};
use crate::domains::navigation::position_tracker::TrackingOptions;
use crate::domains::navigation::types::{GeoPoint, PositionUpdate};
use chrono::Utc;
use geojson::{GeoJson, Geometry, Value};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;

#[derive(Error, Debug)]
pub enum TrackLoadError {
    #[error("Failed to read track: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse track: {0}")]
    Parse(String),
}

/// Replays a recorded track, one fix per interval, to simulate a moving user.
pub struct ReplayPositionSource {
    track: Vec<GeoPoint>,
    interval: Duration,
    next_handle: AtomicU64,
    tasks: Mutex<HashMap<WatchHandle, JoinHandle<()>>>,
}

impl ReplayPositionSource {
    pub fn new(track: Vec<GeoPoint>, interval: Duration) -> Self {
        Self {
            track,
            interval,
            next_handle: AtomicU64::new(0),
            tasks: Mutex::new(HashMap::new()),
        }
    }

    /// Reads the first LineString found in a GeoJSON document.
    pub fn from_geojson_str(geojson: &str, interval: Duration) -> Result<Self, TrackLoadError> {
        let parsed: GeoJson = geojson
            .parse()
            .map_err(|e: geojson::Error| TrackLoadError::Parse(e.to_string()))?;
        let track = first_line(&parsed)
            .ok_or_else(|| TrackLoadError::Parse("no LineString in document".to_string()))?;
        if track.is_empty() {
            return Err(TrackLoadError::Parse("track has no points".to_string()));
        }
        Ok(Self::new(track, interval))
    }

    pub fn from_file<P: AsRef<Path>>(path: P, interval: Duration) -> Result<Self, TrackLoadError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_geojson_str(&content, interval)
    }

    pub fn track(&self) -> &[GeoPoint] {
        &self.track
    }
}

impl PositionSource for ReplayPositionSource {
    fn watch(
        &self,
        sink: PositionSink,
        _options: &TrackingOptions,
    ) -> Result<WatchHandle, PositionError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            PositionError::new(
                PositionErrorKind::Unavailable,
                format!("no runtime to replay on: {}", e),
            )
        })?;
        let handle = WatchHandle(self.next_handle.fetch_add(1, Ordering::Relaxed) + 1);
        let track = self.track.clone();
        let interval = self.interval;

        let task = runtime.spawn(async move {
            for coord in track {
                let update = PositionUpdate { coord, captured_at: Utc::now() };
                if sink.send(Ok(update)).is_err() {
                    return;
                }
                tokio::time::sleep(interval).await;
            }
            // Hold the last fix until the watch is cleared.
            sink.closed().await;
        });

        self.tasks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(handle, task);
        Ok(handle)
    }

    fn clear(&self, handle: WatchHandle) {
        let task = self
            .tasks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&handle);
        if let Some(task) = task {
            task.abort();
        }
    }
}

fn first_line(geojson: &GeoJson) -> Option<Vec<GeoPoint>> {
    match geojson {
        GeoJson::Geometry(geometry) => line_of(geometry),
        GeoJson::Feature(feature) => feature.geometry.as_ref().and_then(line_of),
        GeoJson::FeatureCollection(collection) => collection
            .features
            .iter()
            .filter_map(|f| f.geometry.as_ref())
            .find_map(line_of),
    }
}

fn line_of(geometry: &Geometry) -> Option<Vec<GeoPoint>> {
    match &geometry.value {
        Value::LineString(line) => {
            Some(line.iter().filter_map(|p| GeoPoint::from_lng_lat(p)).collect())
        }
        _ => None,
    }
}
