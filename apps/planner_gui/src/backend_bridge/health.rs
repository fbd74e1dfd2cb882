//! Startup reachability check. Informational only: it never blocks the form.

use std::sync::Arc;

use client_core::ItineraryService;
use tracing::{info, warn};

pub fn spawn_reachability_check(service: Arc<dyn ItineraryService>) {
    tokio::spawn(async move {
        check_reachability(service.as_ref()).await;
    });
}

pub async fn check_reachability(service: &dyn ItineraryService) -> bool {
    let status = service.health_check().await;
    if status.healthy {
        info!(base_url = service.base_url(), "itinerary service is reachable");
    } else {
        warn!(
            base_url = service.base_url(),
            reason = status.message.as_deref().unwrap_or("unknown"),
            "itinerary service health check failed; is the service running?"
        );
    }
    status.healthy
}
