use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use stepmap_nav::adapters::inbound::{ChannelPositionSource, ReplayPositionSource};
use stepmap_nav::adapters::outbound::{
    init_buffered_logger, init_process_logging, InMemoryMapRenderer, NominatimGeocoder,
    OrsRoutingBackend,
};
use stepmap_nav::application::{build_session, NavigationCommand, NavigationService};
use stepmap_nav::common::{DomainEvent, EventEnvelope};
use stepmap_nav::domains::navigation::{MapRenderer, PositionSource};
use stepmap_nav::Config;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    let config_path =
        std::env::var("STEPMAP_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    let config = Config::load_or_default(&config_path).await?;

    let logger = init_buffered_logger(init_process_logging(config.logging.file.as_deref()), 256);
    info!("Starting StepMap navigation");
    info!("Routing backend: {} ({})", config.routing.base_url, config.routing.profile);
    info!("Geocoder: {}", config.geocoder.base_url);


    // STEPMAP_TRACK replays a GeoJSON LineString instead of waiting for pushed fixes.
    let source: Arc<dyn PositionSource> = match std::env::var("STEPMAP_TRACK") {
        Ok(path) => match ReplayPositionSource::from_file(&path, Duration::from_secs(1)) {
            Ok(replay) => {
                info!("Replaying {} fixes from {}", replay.track().len(), path);
                Arc::new(replay)
            }
            Err(e) => {
                error!("Could not load track {}: {}", path, e);
                Arc::new(ChannelPositionSource::new())
            }
        },
        Err(_) => Arc::new(ChannelPositionSource::new()),
    };

    let renderer = Arc::new(InMemoryMapRenderer::with_logger(logger.clone()));
    renderer.center_view(config.map.center(), config.map.default_zoom);
    let backend = Arc::new(OrsRoutingBackend::from_config(&config.routing));
    let geocoder = Arc::new(NominatimGeocoder::from_config(&config.geocoder));

    let session = build_session(&config, source, renderer, backend, logger.clone());
    let (service, handle, mut notifications) = NavigationService::new(session, geocoder, logger);
    let runner = tokio::spawn(service.run());

    let notifier = tokio::spawn(async move {
        while let Some(event) = notifications.recv().await {
            if !event.is_user_visible() {
                info!("{}", event.event_type());
                continue;
            }
            match EventEnvelope::new(&event) {
                Ok(envelope) => warn!("{} {}", envelope.event_type, envelope.event_data),
                Err(e) => error!("Could not encode {}: {}", event.event_type(), e),
            }
        }
    });

    handle.send(NavigationCommand::StartTracking).await?;

    tokio::signal::ctrl_c().await?;
    info!("Shutting down StepMap navigation");

    handle.send(NavigationCommand::Shutdown).await?;
    let session = runner.await?;
    info!("Session {} finished with {} waypoint(s) left", session.id(), session.waypoints().len());
    drop(session);
    notifier.await?;

    Ok(())
}
