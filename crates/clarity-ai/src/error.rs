use std::path::PathBuf;

use thiserror::Error;

/// Missing or unusable configuration. Raised before any network attempt.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("API key not configured (set {var})")]
    MissingApiKey { var: &'static str },
    #[error("invalid base URL {0:?}")]
    InvalidBaseUrl(String),
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// The selected image could not be turned into an inline payload.
#[derive(Error, Debug)]
pub enum EncodingError {
    #[error("failed to read image {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("image payload is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),
}

/// Network, service, or response-shape failure from the inference service.
#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("inference service returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("inference service blocked the request: {0}")]
    Blocked(String),
    #[error("inference service returned no text")]
    EmptyResponse,
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error from an [`InferenceGateway`](crate::InferenceGateway) operation.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Inference(#[from] InferenceError),
}

impl GatewayError {
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
