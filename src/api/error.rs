use reqwest::StatusCode;
use thiserror::Error;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("http error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("server responded with {status}: {message}")]
    StatusError { status: StatusCode, message: String },
    #[error("json error: {0}")]
    DecodeError(#[from] serde_json::Error),
    #[error("unexpected response shape: {0}")]
    UnexpectedShape(String),
    #[error("url error: {0}")]
    UrlError(#[from] url::ParseError),
    #[error("base url cannot hold path segments: {0}")]
    InvalidBaseUrl(String),
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::StatusError { status, .. } => Some(*status),
            Self::HttpError(e) => e.status(),
            _ => None,
        }
    }
}
