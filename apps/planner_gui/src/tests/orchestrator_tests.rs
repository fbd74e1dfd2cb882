use super::{export::run_export, generation::run_generation, health::check_reachability};
use crate::controller::events::{UiErrorCategory, UiErrorContext, UiEvent};
use async_trait::async_trait;
use client_core::{ClientError, ExportedDocument, HealthStatus, ItineraryService};
use shared::{
    domain::{ItineraryResult, TripRequest},
    protocol::ExportRequest,
};
use std::sync::Mutex;

const BASE_URL: &str = "http://127.0.0.1:5000/api/";

#[derive(Default)]
struct FakeService {
    generation: Mutex<Option<Result<ItineraryResult, ClientError>>>,
    export: Mutex<Option<Result<ExportedDocument, ClientError>>>,
    healthy: bool,
}

#[async_trait]
impl ItineraryService for FakeService {
    fn base_url(&self) -> &str {
        BASE_URL
    }

    async fn generate_itinerary(
        &self,
        _trip: &TripRequest,
    ) -> Result<ItineraryResult, ClientError> {
        self.generation
            .lock()
            .expect("lock")
            .take()
            .expect("generation outcome configured")
    }

    async fn export_document(
        &self,
        _request: &ExportRequest,
    ) -> Result<ExportedDocument, ClientError> {
        self.export
            .lock()
            .expect("lock")
            .take()
            .expect("export outcome configured")
    }

    async fn health_check(&self) -> HealthStatus {
        HealthStatus {
            healthy: self.healthy,
            message: (!self.healthy).then(|| "connection refused".to_string()),
        }
    }
}

fn generating(outcome: Result<ItineraryResult, ClientError>) -> FakeService {
    FakeService {
        generation: Mutex::new(Some(outcome)),
        ..FakeService::default()
    }
}

fn exporting(outcome: Result<ExportedDocument, ClientError>) -> FakeService {
    FakeService {
        export: Mutex::new(Some(outcome)),
        ..FakeService::default()
    }
}

fn paris_trip() -> TripRequest {
    TripRequest {
        source: "NYC".into(),
        destination: "Paris".into(),
        dates: "2024-06-01".into(),
        travelers: 2,
        interests: "art".into(),
    }
}

fn paris_export() -> ExportRequest {
    ExportRequest::new(paris_trip(), &ItineraryResult::new("# Paris\nVisit art"))
}

fn pdf(bytes: &[u8]) -> ExportedDocument {
    ExportedDocument {
        bytes: bytes.to_vec(),
        content_type: Some("application/pdf".into()),
    }
}

#[tokio::test]
async fn generation_success_carries_raw_text() {
    let service = generating(Ok(ItineraryResult::new("# Paris\nVisit art")));

    match run_generation(&service, &paris_trip()).await {
        UiEvent::GenerationFinished(Ok(result)) => {
            assert_eq!(result.raw_text, "# Paris\nVisit art")
        }
        _ => panic!("expected generation success"),
    }
}

#[tokio::test]
async fn generation_application_error_keeps_service_message() {
    let service = generating(Err(ClientError::Application("quota exceeded".into())));

    match run_generation(&service, &paris_trip()).await {
        UiEvent::GenerationFinished(Err(err)) => {
            assert_eq!(err.category(), UiErrorCategory::Application);
            assert_eq!(err.context(), UiErrorContext::Generation);
            assert_eq!(err.message(), "Error: quota exceeded");
        }
        _ => panic!("expected generation failure"),
    }
}

#[tokio::test]
async fn generation_status_error_mentions_base_url() {
    let service = generating(Err(ClientError::HttpStatus {
        status: 500,
        detail: None,
    }));

    match run_generation(&service, &paris_trip()).await {
        UiEvent::GenerationFinished(Err(err)) => {
            assert_eq!(err.category(), UiErrorCategory::HttpStatus);
            assert!(err.message().contains("HTTP error! status: 500"));
            assert!(err.message().contains(BASE_URL));
        }
        _ => panic!("expected generation failure"),
    }
}

#[tokio::test]
async fn export_saves_document_named_after_destination() {
    let dir = tempfile::tempdir().expect("tempdir");
    let service = exporting(Ok(pdf(b"%PDF-1.4 plan")));

    let path = match run_export(&service, &paris_export(), dir.path()).await {
        UiEvent::ExportFinished(Ok(path)) => path,
        _ => panic!("expected export success"),
    };
    assert_eq!(path, dir.path().join("travel_plan_Paris.pdf"));
    assert_eq!(std::fs::read(&path).expect("saved file"), b"%PDF-1.4 plan");
}

#[tokio::test]
async fn repeated_export_keeps_earlier_file() {
    let dir = tempfile::tempdir().expect("tempdir");

    let mut saved = Vec::new();
    for body in ["%PDF first", "%PDF second", "%PDF third"] {
        let service = exporting(Ok(pdf(body.as_bytes())));
        match run_export(&service, &paris_export(), dir.path()).await {
            UiEvent::ExportFinished(Ok(path)) => saved.push(path),
            _ => panic!("expected export success"),
        }
    }

    assert_eq!(
        saved,
        vec![
            dir.path().join("travel_plan_Paris.pdf"),
            dir.path().join("travel_plan_Paris (1).pdf"),
            dir.path().join("travel_plan_Paris (2).pdf"),
        ]
    );
    assert_eq!(std::fs::read(&saved[0]).expect("first"), b"%PDF first");
    assert_eq!(std::fs::read(&saved[2]).expect("third"), b"%PDF third");
}

#[tokio::test]
async fn export_creates_missing_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let nested = dir.path().join("plans").join("2024");
    let service = exporting(Ok(pdf(b"%PDF")));

    match run_export(&service, &paris_export(), &nested).await {
        UiEvent::ExportFinished(Ok(path)) => assert!(path.starts_with(&nested)),
        _ => panic!("expected export success"),
    }
}

#[tokio::test]
async fn export_service_error_writes_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let service = exporting(Err(ClientError::HttpStatus {
        status: 500,
        detail: None,
    }));

    match run_export(&service, &paris_export(), dir.path()).await {
        UiEvent::ExportFinished(Err(err)) => {
            assert_eq!(err.context(), UiErrorContext::Export);
            assert!(err.message().starts_with("Error exporting document:"));
        }
        _ => panic!("expected export failure"),
    }
    assert_eq!(std::fs::read_dir(dir.path()).expect("read dir").count(), 0);
}

#[tokio::test]
async fn export_write_failure_is_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let blocker = dir.path().join("not_a_dir");
    std::fs::write(&blocker, b"file").expect("blocker");
    let service = exporting(Ok(pdf(b"%PDF")));

    match run_export(&service, &paris_export(), &blocker).await {
        UiEvent::ExportFinished(Err(err)) => {
            assert_eq!(err.category(), UiErrorCategory::Io);
            assert_eq!(err.context(), UiErrorContext::Export);
        }
        _ => panic!("expected export failure"),
    }
}

#[tokio::test]
async fn reachability_check_reports_health() {
    let up = FakeService {
        healthy: true,
        ..FakeService::default()
    };
    assert!(check_reachability(&up).await);
    assert!(!check_reachability(&FakeService::default()).await);
}
