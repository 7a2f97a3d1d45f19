///! Error type shared by the fetcher, the derivations and the HTTP layer.
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("upstream returned HTTP {0}")]
    UpstreamStatus(u16),

    #[error("request to upstream failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to decode OEM document: {0}")]
    Xml(#[from] quick_xml::DeError),

    #[error("invalid epoch timestamp '{0}'")]
    InvalidEpoch(String),

    #[error("non-numeric value '{0}'")]
    NonNumeric(String),

    #[error("feed contains no state vectors")]
    EmptyFeed,

    #[error("invalid epoch index '{0}'; must be a non-negative integer")]
    InvalidIndex(String),

    #[error("epoch index {index} out of range (feed has {len} epochs)")]
    IndexOutOfRange { index: usize, len: usize },
}

impl TrackerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            TrackerError::IndexOutOfRange { .. } => StatusCode::NOT_FOUND,
            TrackerError::InvalidIndex(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for TrackerError {
    fn into_response(self) -> Response {
        match &self {
            TrackerError::IndexOutOfRange { .. } | TrackerError::InvalidIndex(_) => {
                tracing::warn!("{}", self)
            }
            _ => tracing::error!("{}", self),
        }
        (self.status_code(), self.to_string()).into_response()
    }
}
