use client_core::ItineraryService;
use shared::domain::TripRequest;
use tracing::{debug, info, warn};

use crate::controller::events::{UiError, UiErrorContext, UiEvent};

pub async fn run_generation(service: &dyn ItineraryService, trip: &TripRequest) -> UiEvent {
    info!(destination = %trip.destination, "requesting itinerary");
    match service.generate_itinerary(trip).await {
        Ok(result) => {
            debug!(chars = result.raw_text.len(), "generation finished");
            UiEvent::GenerationFinished(Ok(result))
        }
        Err(err) => {
            warn!(kind = ?err.kind(), "itinerary generation failed: {err}");
            UiEvent::GenerationFinished(Err(UiError::from_client_error(
                UiErrorContext::Generation,
                &err,
                service.base_url(),
            )))
        }
    }
}
