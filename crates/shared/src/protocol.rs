use serde::{Deserialize, Serialize};

use crate::domain::{ItineraryResult, TripRequest};

pub const GENERATE_ITINERARY_PATH: &str = "generate-itinerary";
pub const EXPORT_DOCUMENT_PATH: &str = "export-pdf";
pub const HEALTH_PATH: &str = "health";

/// Body of `POST generate-itinerary`. Serializes to the bare trip fields.
pub type GenerateItineraryRequest = TripRequest;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateItineraryResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub itinerary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body of `POST export-pdf`: the trip fields plus the unmodified itinerary text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRequest {
    #[serde(flatten)]
    pub trip: TripRequest,
    pub itinerary: String,
}

impl ExportRequest {
    pub fn new(trip: TripRequest, result: &ItineraryResult) -> Self {
        Self {
            trip,
            itinerary: result.raw_text.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceErrorBody {
    pub error: String,
}
