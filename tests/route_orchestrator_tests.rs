mod common;

use common::*;
use std::sync::Arc;
use stepmap_nav::adapters::outbound::InMemoryMapRenderer;
use stepmap_nav::common::{LocalValidationError, RouteError};
use stepmap_nav::domains::navigation::*;

fn request(waypoints: &[GeoPoint]) -> RouteRequest {
    RouteRequest { origin: ORIGIN, waypoints: waypoints.to_vec() }
}

#[tokio::test]
async fn test_success_draws_route_and_fits_bounds() {
    let backend = Arc::new(EchoRoutingBackend::new());
    let renderer = InMemoryMapRenderer::new();
    let mut orchestrator = RouteOrchestrator::new(backend.clone());

    let outcome = orchestrator.request_route(request(&[FAR]), &renderer).await.unwrap();

    let layer = match outcome {
        RouteOutcome::Drawn(layer) => layer,
        other => panic!("Expected Drawn, got {:?}", other),
    };
    assert_eq!(orchestrator.drawn_layer(), Some(layer));
    assert_eq!(line_of(&renderer.active_route().unwrap()), vec![ORIGIN, FAR]);
    let bounds = renderer.last_bounds().unwrap();
    assert!(bounds.contains(&ORIGIN) && bounds.contains(&FAR));
    assert_eq!(backend.calls(), 1);
}

#[tokio::test]
async fn test_stale_response_is_discarded() {
    let backend = Arc::new(EchoRoutingBackend::new());
    let renderer = InMemoryMapRenderer::new();
    let mut orchestrator = RouteOrchestrator::new(backend.clone());

    let r1 = orchestrator.prepare(request(&[FAR, FARTHER])).unwrap();
    let r2 = orchestrator.prepare(request(&[FARTHER])).unwrap();
    assert!(r1.ticket() < r2.ticket());

    // R2 answers first, R1 arrives late
    let done2 = r2.run().await;
    let done1 = r1.run().await;

    assert!(matches!(orchestrator.complete(done2, &renderer), RouteOutcome::Drawn(_)));
    assert_eq!(orchestrator.complete(done1, &renderer), RouteOutcome::Discarded);

    assert_eq!(renderer.layer_count(), 1);
    assert_eq!(line_of(&renderer.active_route().unwrap()), vec![ORIGIN, FARTHER]);
}

#[tokio::test]
async fn test_stale_response_arriving_first_is_also_discarded() {
    let backend = Arc::new(EchoRoutingBackend::new());
    let renderer = InMemoryMapRenderer::new();
    let mut orchestrator = RouteOrchestrator::new(backend.clone());

    let r1 = orchestrator.prepare(request(&[FAR])).unwrap();
    let r2 = orchestrator.prepare(request(&[FARTHER])).unwrap();

    let done1 = r1.run().await;
    assert_eq!(orchestrator.complete(done1, &renderer), RouteOutcome::Discarded);
    assert_eq!(renderer.layer_count(), 0);

    let done2 = r2.run().await;
    assert!(matches!(orchestrator.complete(done2, &renderer), RouteOutcome::Drawn(_)));
    assert_eq!(line_of(&renderer.active_route().unwrap()), vec![ORIGIN, FARTHER]);
}

#[tokio::test]
async fn test_new_route_replaces_previous_layer() {
    let backend = Arc::new(EchoRoutingBackend::new());
    let renderer = InMemoryMapRenderer::new();
    let mut orchestrator = RouteOrchestrator::new(backend);

    orchestrator.request_route(request(&[FAR]), &renderer).await.unwrap();
    orchestrator.request_route(request(&[FARTHER]), &renderer).await.unwrap();

    assert_eq!(renderer.layer_count(), 1);
    assert_eq!(line_of(&renderer.active_route().unwrap()), vec![ORIGIN, FARTHER]);
}

#[tokio::test]
async fn test_zero_waypoints_rejected_without_backend_call() {
    let backend = Arc::new(EchoRoutingBackend::new());
    let renderer = InMemoryMapRenderer::new();
    let mut orchestrator = RouteOrchestrator::new(backend.clone());

    let result = orchestrator.request_route(request(&[]), &renderer).await;
    assert_eq!(result.unwrap_err(), LocalValidationError::NoPlacedWaypoints);
    assert_eq!(backend.calls(), 0);
    assert!(!orchestrator.is_in_flight());
}

#[tokio::test]
async fn test_failure_is_reported_and_keeps_existing_route() {
    let backend = Arc::new(EchoRoutingBackend::new());
    let renderer = InMemoryMapRenderer::new();
    let mut orchestrator = RouteOrchestrator::new(backend.clone());

    orchestrator.request_route(request(&[FAR]), &renderer).await.unwrap();
    backend.set_failing(true);
    let outcome = orchestrator.request_route(request(&[FARTHER]), &renderer).await.unwrap();

    match outcome {
        RouteOutcome::Failed(RouteError::BackendRejected { status, .. }) => assert_eq!(status, 500),
        other => panic!("Expected BackendRejected, got {:?}", other),
    }
    assert_eq!(line_of(&renderer.active_route().unwrap()), vec![ORIGIN, FAR]);
    // no automatic retry
    assert_eq!(backend.calls(), 2);
}

#[tokio::test]
async fn test_clear_removes_route_and_invalidates_in_flight() {
    let backend = Arc::new(EchoRoutingBackend::new());
    let renderer = InMemoryMapRenderer::new();
    let mut orchestrator = RouteOrchestrator::new(backend);

    orchestrator.request_route(request(&[FAR]), &renderer).await.unwrap();
    let pending = orchestrator.prepare(request(&[FARTHER])).unwrap();

    assert!(orchestrator.clear(&renderer));
    assert_eq!(renderer.layer_count(), 0);

    let done = pending.run().await;
    assert_eq!(orchestrator.complete(done, &renderer), RouteOutcome::Discarded);
    assert_eq!(renderer.layer_count(), 0);
    assert!(!orchestrator.clear(&renderer));
}
