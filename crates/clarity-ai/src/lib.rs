//! AI layer: image encoding and the Gemini inference gateway.

mod config;
mod error;
mod gateway;
mod image;
pub mod prompt;

pub use config::{
    API_KEY_ENV, BASE_URL_ENV, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS,
    GatewayConfig, LEGACY_API_KEY_ENV, MODEL_ENV,
};
pub use error::{ConfigError, EncodingError, GatewayError, InferenceError};
pub use gateway::{GeminiClient, InferenceGateway};
pub use image::{ImagePayload, encode_image, mime_type_for};
