use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Failures surfaced to HTTP callers.
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Is a directory: {0}")]
    IsADirectory(String),

    #[error("read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("page template {path}: {source}")]
    Template {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ServeError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidPath(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) | Self::IsADirectory(_) => StatusCode::NOT_FOUND,
            Self::Io { .. } | Self::Template { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServeError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}
