use crate::common::PositionError;
use crate::domains::navigation::ports::{PositionReport, PositionSource, WatchHandle};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// Oldest cached fix the source may hand out; zero asks for a fresh fix every time.
    pub max_stale: Duration,
}

impl Default for TrackingOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_millis(10_000),
            max_stale: Duration::ZERO,
        }
    }
}

/// Turns a `PositionSource` into cancellable live-position subscriptions.
#[derive(Clone)]
pub struct PositionTracker {
    source: Arc<dyn PositionSource>,
    options: TrackingOptions,
}

impl PositionTracker {
    pub fn new(source: Arc<dyn PositionSource>, options: TrackingOptions) -> Self {
        Self { source, options }
    }

    pub fn options(&self) -> &TrackingOptions {
        &self.options
    }

    pub fn start(&self) -> Result<Subscription, PositionError> {
        let (sink, receiver) = mpsc::unbounded_channel();
        let handle = self.source.watch(sink, &self.options)?;
        Ok(Subscription {
            source: self.source.clone(),
            handle: Some(handle),
            receiver,
            last_captured_at: None,
        })
    }

    pub fn stop(&self, subscription: Subscription) {
        subscription.cancel();
    }
}

/// A live watch on the position source.
///
/// The platform watch is cleared exactly once: on `cancel`, or when the
/// subscription is dropped on any other path. Once released it yields nothing.
pub struct Subscription {
    source: Arc<dyn PositionSource>,
    handle: Option<WatchHandle>,
    receiver: mpsc::UnboundedReceiver<PositionReport>,
    last_captured_at: Option<DateTime<Utc>>,
}

impl Subscription {
    pub fn handle(&self) -> Option<WatchHandle> {
        self.handle
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    /// Next report in capture order. Updates older than the last delivered one are dropped.
    /// Returns `None` once the subscription is released or the source hangs up.
    pub async fn next(&mut self) -> Option<PositionReport> {
        if self.handle.is_none() {
            return None;
        }
        loop {
            let report = self.receiver.recv().await?;
            if let Some(report) = self.admit(report) {
                return Some(report);
            }
        }
    }

    /// Non-blocking variant of `next`.
    pub fn try_next(&mut self) -> Option<PositionReport> {
        if self.handle.is_none() {
            return None;
        }
        while let Ok(report) = self.receiver.try_recv() {
            if let Some(report) = self.admit(report) {
                return Some(report);
            }
        }
        None
    }

    pub fn cancel(mut self) {
        self.release();
    }

    fn admit(&mut self, report: PositionReport) -> Option<PositionReport> {
        match report {
            Ok(update) => {
                if matches!(self.last_captured_at, Some(last) if update.captured_at < last) {
                    return None;
                }
                self.last_captured_at = Some(update.captured_at);
                Some(Ok(update))
            }
            Err(e) => Some(Err(e)),
        }
    }

    fn release(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.source.clear(handle);
            self.receiver.close();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}
