use thiserror::Error;

/// Coarse classification used by the UI to pick wording and guidance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    HttpStatus,
    Application,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid service base url '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    #[error("service unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),
    #[error("request timed out: {0}")]
    TimedOut(#[source] reqwest::Error),
    #[error("HTTP error! status: {status}{}", status_detail(.detail))]
    HttpStatus { status: u16, detail: Option<String> },
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("{0}")]
    Application(String),
}

fn status_detail(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|detail| format!(" ({detail})"))
        .unwrap_or_default()
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::HttpStatus { .. } => ErrorKind::HttpStatus,
            Self::Application(_) => ErrorKind::Application,
            Self::InvalidBaseUrl { .. }
            | Self::ClientBuild(_)
            | Self::Unreachable(_)
            | Self::TimedOut(_)
            | Self::MalformedResponse(_) => ErrorKind::Transport,
        }
    }

    /// Whether the user should be told to check that the service is running.
    pub fn suggests_service_down(&self) -> bool {
        matches!(self.kind(), ErrorKind::Transport | ErrorKind::HttpStatus)
    }

    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::TimedOut(err)
        } else if err.is_decode() {
            Self::MalformedResponse(err.to_string())
        } else {
            Self::Unreachable(err)
        }
    }
}
