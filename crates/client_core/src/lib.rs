use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client, Response};
use shared::{
    domain::{ItineraryResult, TripRequest},
    protocol::{
        ExportRequest, GenerateItineraryResponse, ServiceErrorBody, EXPORT_DOCUMENT_PATH,
        GENERATE_ITINERARY_PATH, HEALTH_PATH,
    },
};
use tracing::{debug, info, warn};
use url::Url;

pub mod error;
pub mod markup;

pub use error::{ClientError, ErrorKind};
pub use markup::{render, RenderedItinerary, RenderedLine, Span};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000/api";
const DEFAULT_GENERATION_ERROR: &str = "Failed to generate itinerary";
const DEFAULT_EXPORT_EXTENSION: &str = "pdf";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedDocument {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

impl ExportedDocument {
    pub fn extension(&self) -> &'static str {
        let essence = self
            .content_type
            .as_deref()
            .and_then(|value| value.split(';').next())
            .map(|value| value.trim().to_ascii_lowercase());

        match essence.as_deref() {
            Some("text/html") => "html",
            Some("text/plain") => "txt",
            Some("application/zip") => "zip",
            _ => DEFAULT_EXPORT_EXTENSION,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthStatus {
    pub healthy: bool,
    pub message: Option<String>,
}

#[async_trait]
pub trait ItineraryService: Send + Sync {
    fn base_url(&self) -> &str;
    async fn generate_itinerary(&self, trip: &TripRequest) -> Result<ItineraryResult, ClientError>;
    async fn export_document(
        &self,
        request: &ExportRequest,
    ) -> Result<ExportedDocument, ClientError>;
    async fn health_check(&self) -> HealthStatus;
}

pub struct PlannerClient {
    http: Client,
    base_url: Url,
}

impl PlannerClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ClientError> {
        let base_url = parse_base_url(base_url)?;
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ClientError::ClientBuild)?;
        Ok(Self { http, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|source| ClientError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                source,
            })
    }
}

#[async_trait]
impl ItineraryService for PlannerClient {
    fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    async fn generate_itinerary(&self, trip: &TripRequest) -> Result<ItineraryResult, ClientError> {
        let url = self.endpoint(GENERATE_ITINERARY_PATH)?;
        debug!(%url, destination = %trip.destination, "requesting itinerary");
        let response = self
            .http
            .post(url)
            .json(trip)
            .send()
            .await
            .map_err(ClientError::from_transport)?;
        let response = ensure_success(response).await?;
        let body: GenerateItineraryResponse = response
            .json()
            .await
            .map_err(|err| ClientError::MalformedResponse(err.to_string()))?;
        let result = interpret_generation(body)?;
        info!(
            destination = %trip.destination,
            chars = result.raw_text.len(),
            "itinerary generated"
        );
        Ok(result)
    }

    async fn export_document(
        &self,
        request: &ExportRequest,
    ) -> Result<ExportedDocument, ClientError> {
        let url = self.endpoint(EXPORT_DOCUMENT_PATH)?;
        debug!(%url, destination = %request.trip.destination, "requesting export");
        let response = self
            .http
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(ClientError::from_transport)?;
        let response = ensure_success(response).await?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .bytes()
            .await
            .map_err(ClientError::from_transport)?
            .to_vec();
        info!(bytes = bytes.len(), "export document received");
        Ok(ExportedDocument {
            bytes,
            content_type,
        })
    }

    async fn health_check(&self) -> HealthStatus {
        let url = match self.endpoint(HEALTH_PATH) {
            Ok(url) => url,
            Err(err) => {
                return HealthStatus {
                    healthy: false,
                    message: Some(err.to_string()),
                }
            }
        };

        match self.http.get(url).send().await {
            Ok(response) if response.status().is_success() => HealthStatus {
                healthy: true,
                message: None,
            },
            Ok(response) => HealthStatus {
                healthy: false,
                message: Some(format!("health endpoint returned {}", response.status())),
            },
            Err(err) => HealthStatus {
                healthy: false,
                message: Some(err.to_string()),
            },
        }
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ClientError> {
    let trimmed = raw.trim();
    // Endpoints are joined relative to the base, so the base must name a directory.
    let normalized = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };

    let url = Url::parse(&normalized).map_err(|source| ClientError::InvalidBaseUrl {
        url: raw.to_string(),
        source,
    })?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ClientError::InvalidBaseUrl {
            url: raw.to_string(),
            source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
        });
    }
    Ok(url)
}

async fn ensure_success(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let detail = match response.text().await {
        Ok(body) => serde_json::from_str::<ServiceErrorBody>(&body)
            .ok()
            .map(|body| body.error)
            .filter(|error| !error.trim().is_empty()),
        Err(err) => {
            warn!("failed to read error body for status {status}: {err}");
            None
        }
    };

    Err(ClientError::HttpStatus {
        status: status.as_u16(),
        detail,
    })
}

fn interpret_generation(body: GenerateItineraryResponse) -> Result<ItineraryResult, ClientError> {
    if !body.success {
        let message = body
            .error
            .filter(|error| !error.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_GENERATION_ERROR.to_string());
        return Err(ClientError::Application(message));
    }

    body.itinerary.map(ItineraryResult::new).ok_or_else(|| {
        ClientError::MalformedResponse("response reported success without an itinerary".into())
    })
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
