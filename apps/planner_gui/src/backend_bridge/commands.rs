//! Backend commands queued from UI to backend worker.

use shared::{domain::TripRequest, protocol::ExportRequest};

#[derive(Debug)]
pub enum BackendCommand {
    GenerateItinerary { trip: TripRequest },
    ExportDocument { request: ExportRequest },
}
