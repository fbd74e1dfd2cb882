//! Backend-to-UI events and error modeling for the planner controller.

use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use client_core::{ClientError, ErrorKind};
use shared::{domain::ItineraryResult, error::ValidationError};

pub enum UiEvent {
    Info(String),
    Error(UiError),
    GenerationFinished(Result<ItineraryResult, UiError>),
    ExportFinished(Result<PathBuf, UiError>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Validation,
    Transport,
    HttpStatus,
    Application,
    Io,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Submission,
    Generation,
    Export,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn new(
        category: UiErrorCategory,
        context: UiErrorContext,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            context,
            message: message.into(),
        }
    }

    pub fn invalid_form(err: &ValidationError) -> Self {
        Self::new(
            UiErrorCategory::Validation,
            UiErrorContext::Submission,
            format!("Please fill in all fields correctly ({err})"),
        )
    }

    pub fn no_itinerary() -> Self {
        Self::new(
            UiErrorCategory::Validation,
            UiErrorContext::Export,
            "No itinerary to export",
        )
    }

    pub fn from_client_error(context: UiErrorContext, err: &ClientError, base_url: &str) -> Self {
        let category = match err.kind() {
            ErrorKind::Transport => UiErrorCategory::Transport,
            ErrorKind::HttpStatus => UiErrorCategory::HttpStatus,
            ErrorKind::Application => UiErrorCategory::Application,
        };
        let lead = match context {
            UiErrorContext::Export => format!("Error exporting document: {err}"),
            _ => format!("Error: {err}"),
        };
        let message = if err.suggests_service_down() {
            format!(
                "{lead}. The itinerary service may be unreachable; make sure it is running at {base_url}"
            )
        } else {
            lead
        };
        Self::new(category, context, message)
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Clone)]
pub struct ErrorBanner {
    error: UiError,
    shown_at: Instant,
}

impl ErrorBanner {
    pub fn new(error: UiError, shown_at: Instant) -> Self {
        Self { error, shown_at }
    }

    pub fn error(&self) -> &UiError {
        &self.error
    }

    pub fn is_expired(&self, now: Instant, display_for: Duration) -> bool {
        now.saturating_duration_since(self.shown_at) >= display_for
    }
}
