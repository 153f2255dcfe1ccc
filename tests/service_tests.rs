mod common;

use async_trait::async_trait;
use common::*;
use std::sync::Arc;
use std::time::Duration;
use stepmap_nav::application::navigation_service::{
    build_session, NavigationCommand, NavigationHandle, NavigationService,
};
use stepmap_nav::common::{GeocodeError, PositionErrorKind};
use stepmap_nav::config::Config;
use stepmap_nav::domains::navigation::*;
use tokio::sync::mpsc::UnboundedReceiver;

struct FixedGeocoder {
    answer: Result<Vec<GeocodeCandidate>, GeocodeError>,
}

#[async_trait]
impl Geocoder for FixedGeocoder {
    async fn search(&self, _text: &str) -> Result<Vec<GeocodeCandidate>, GeocodeError> {
        self.answer.clone()
    }
}

/// Collects notifications until one matches `done`.
async fn wait_for<F>(events: &mut UnboundedReceiver<NavigationEvent>, done: F) -> Vec<NavigationEvent>
where
    F: Fn(&NavigationEvent) -> bool,
{
    let mut seen = Vec::new();
    loop {
        let event = tokio::time::timeout(Duration::from_secs(2), events.recv())
            .await
            .expect("timed out waiting for notification")
            .expect("notification channel closed");
        let matched = done(&event);
        seen.push(event);
        if matched {
            return seen;
        }
    }
}

fn service_with(
    answer: Result<Vec<GeocodeCandidate>, GeocodeError>,
) -> (
    NavigationService,
    NavigationHandle,
    UnboundedReceiver<NavigationEvent>,
    Fixture,
) {
    let f = fixture();
    let session = build_session(
        &Config::default(),
        f.source.clone(),
        f.renderer.clone(),
        f.backend.clone(),
        f.logger.clone(),
    );
    let geocoder = Arc::new(FixedGeocoder { answer });
    let (service, handle, events) = NavigationService::new(session, geocoder, f.logger.clone());
    (service, handle, events, f)
}

#[tokio::test]
async fn test_full_trip_through_the_service() {
    let (service, handle, mut events, f) = service_with(Ok(vec![candidate(FAR, "Shopping")]));
    let running = tokio::spawn(service.run());

    handle.send(NavigationCommand::StartTracking).await.unwrap();
    wait_for(&mut events, |e| matches!(e, NavigationEvent::TrackingStarted { .. })).await;
    handle.send(NavigationCommand::SimulatePosition(ORIGIN)).await.unwrap();

    let id = handle.add_waypoint().await.unwrap();
    handle
        .send(NavigationCommand::SearchAddress { id, text: "shopping".to_string() })
        .await
        .unwrap();
    handle
        .send(NavigationCommand::SelectAddress { id, candidate: candidate(FAR, "Shopping") })
        .await
        .unwrap();
    handle.send(NavigationCommand::MapClicked(FAR)).await.unwrap();
    wait_for(&mut events, |e| matches!(e, NavigationEvent::WaypointPlaced { .. })).await;

    handle.send(NavigationCommand::RequestRoute).await.unwrap();
    wait_for(&mut events, |e| matches!(e, NavigationEvent::RouteDrawn { .. })).await;
    assert_eq!(line_of(&f.renderer.active_route().unwrap()), vec![ORIGIN, FAR]);

    handle.send(NavigationCommand::SimulatePosition(FAR)).await.unwrap();
    let seen = wait_for(&mut events, |e| matches!(e, NavigationEvent::RouteCleared { .. })).await;
    assert!(seen
        .iter()
        .any(|e| matches!(e, NavigationEvent::Arrived { waypoint_id, label, .. } if *waypoint_id == id && label == "Shopping")));

    handle.send(NavigationCommand::Shutdown).await.unwrap();
    let session = running.await.unwrap();
    assert!(session.waypoints().is_empty());
    assert_eq!(f.renderer.marker_count(), 0);
    assert_eq!(f.source.active_watches(), 0);
    assert_eq!(f.backend.calls(), 1);
}

#[tokio::test]
async fn test_click_after_removal_places_nothing() {
    let (service, handle, mut events, f) = service_with(Ok(Vec::new()));
    let running = tokio::spawn(service.run());

    handle.send(NavigationCommand::SimulatePosition(ORIGIN)).await.unwrap();
    let id = handle.add_waypoint().await.unwrap();
    handle
        .send(NavigationCommand::SelectAddress { id, candidate: candidate(FAR, "Shopping") })
        .await
        .unwrap();
    handle.send(NavigationCommand::RemoveWaypoint(id)).await.unwrap();
    handle.send(NavigationCommand::MapClicked(FAR)).await.unwrap();
    handle.send(NavigationCommand::RequestRoute).await.unwrap();

    let seen = wait_for(&mut events, |e| matches!(e, NavigationEvent::ValidationRejected { .. })).await;
    assert!(!seen.iter().any(|e| matches!(e, NavigationEvent::WaypointPlaced { .. })));
    assert_eq!(f.backend.calls(), 0);
    // only the origin marker is on the map
    assert_eq!(f.renderer.marker_count(), 1);

    handle.send(NavigationCommand::Shutdown).await.unwrap();
    running.await.unwrap();
}

#[tokio::test]
async fn test_empty_search_reports_no_results() {
    let (service, handle, mut events, _f) = service_with(Ok(Vec::new()));
    let running = tokio::spawn(service.run());

    let id = handle.add_waypoint().await.unwrap();
    handle
        .send(NavigationCommand::SearchAddress { id, text: "xyzzy".to_string() })
        .await
        .unwrap();

    let seen = wait_for(&mut events, |e| matches!(e, NavigationEvent::SuggestionsFailed { .. })).await;
    match seen.last() {
        Some(NavigationEvent::SuggestionsFailed { waypoint_id, reason, .. }) => {
            assert_eq!(*waypoint_id, id);
            assert!(reason.contains("xyzzy"));
        }
        other => panic!("Expected SuggestionsFailed, got {:?}", other),
    }

    drop(handle);
    running.await.unwrap();
}

#[tokio::test]
async fn test_geocoder_outage_is_reported() {
    let (service, handle, mut events, _f) =
        service_with(Err(GeocodeError::NetworkFailure("connection refused".to_string())));
    let running = tokio::spawn(service.run());

    let id = handle.add_waypoint().await.unwrap();
    handle
        .send(NavigationCommand::SearchAddress { id, text: "centro".to_string() })
        .await
        .unwrap();
    let seen = wait_for(&mut events, |e| matches!(e, NavigationEvent::SuggestionsFailed { .. })).await;
    assert!(seen.last().unwrap().is_user_visible());

    handle.send(NavigationCommand::Shutdown).await.unwrap();
    running.await.unwrap();
}

#[tokio::test]
async fn test_source_fixes_and_terminal_error() {
    let (service, handle, mut events, f) = service_with(Ok(Vec::new()));
    let running = tokio::spawn(service.run());

    handle.send(NavigationCommand::StartTracking).await.unwrap();
    wait_for(&mut events, |e| matches!(e, NavigationEvent::TrackingStarted { .. })).await;
    assert_eq!(f.source.active_watches(), 1);

    f.source.push_error(PositionErrorKind::Timeout, "slow fix");
    let seen = wait_for(&mut events, |e| matches!(e, NavigationEvent::PositionFailed { .. })).await;
    assert!(matches!(seen.last(), Some(NavigationEvent::PositionFailed { terminal: false, .. })));

    f.source.push_error(PositionErrorKind::PermissionDenied, "revoked");
    let seen = wait_for(&mut events, |e| matches!(e, NavigationEvent::PositionFailed { .. })).await;
    assert!(matches!(seen.last(), Some(NavigationEvent::PositionFailed { terminal: true, .. })));
    assert_eq!(f.source.active_watches(), 0);

    handle.send(NavigationCommand::Shutdown).await.unwrap();
    let session = running.await.unwrap();
    assert_eq!(session.tracking_state(), TrackingState::Idle);
}

#[tokio::test]
async fn test_rejected_route_request_is_reported() {
    let (service, handle, mut events, f) = service_with(Ok(Vec::new()));
    let running = tokio::spawn(service.run());

    handle.send(NavigationCommand::SimulatePosition(ORIGIN)).await.unwrap();
    handle.send(NavigationCommand::RequestRoute).await.unwrap();
    wait_for(&mut events, |e| matches!(e, NavigationEvent::ValidationRejected { .. })).await;
    assert_eq!(f.backend.calls(), 0);

    handle.send(NavigationCommand::Shutdown).await.unwrap();
    running.await.unwrap();
}

#[tokio::test]
async fn test_dropping_every_handle_ends_the_loop() {
    let (service, handle, _events, f) = service_with(Ok(Vec::new()));
    let running = tokio::spawn(service.run());

    handle.send(NavigationCommand::StartTracking).await.unwrap();
    drop(handle);

    tokio::time::timeout(Duration::from_secs(2), running)
        .await
        .expect("loop did not stop")
        .unwrap();
    assert_eq!(f.source.active_watches(), 0);
}
