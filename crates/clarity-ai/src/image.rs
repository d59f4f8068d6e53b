//! Inline image payloads for multimodal requests.

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::EncodingError;

/// Base64 image data plus its declared mime type.
///
/// Serializes as the service's `inlineData` part (`{ "mimeType", "data" }`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePayload {
    pub mime_type: String,
    pub data: String,
}

impl ImagePayload {
    /// Encode in-memory image bytes.
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: STANDARD.encode(bytes),
        }
    }

    /// Decode the payload back into raw bytes.
    pub fn decode(&self) -> Result<Vec<u8>, EncodingError> {
        Ok(STANDARD.decode(&self.data)?)
    }
}

/// Mime type guessed from the file extension, `application/octet-stream` if unknown.
pub fn mime_type_for(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Read an image file and encode it as an inline payload.
///
/// No size or type validation happens here; unreadable files fail with
/// [`EncodingError::Read`].
pub async fn encode_image(path: &Path) -> Result<ImagePayload, EncodingError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| EncodingError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    let mime_type = mime_type_for(path);
    debug!(path = %path.display(), bytes = bytes.len(), mime = %mime_type, "encoded image");
    Ok(ImagePayload::from_bytes(&bytes, mime_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    // PNG signature followed by an IHDR chunk header; enough to look like an image.
    const PNG_BYTES: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0xFF, 0x10,
    ];

    #[tokio::test]
    async fn encode_then_decode_roundtrip() {
        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        file.write_all(PNG_BYTES).unwrap();

        let payload = encode_image(file.path()).await.unwrap();
        assert_eq!(payload.mime_type, "image/png");
        assert_eq!(payload.decode().unwrap(), PNG_BYTES);
    }

    #[tokio::test]
    async fn jpeg_extension_sets_mime() {
        let mut file = tempfile::Builder::new().suffix(".jpg").tempfile().unwrap();
        file.write_all(b"\xFF\xD8\xFF\xE0").unwrap();

        let payload = encode_image(file.path()).await.unwrap();
        assert_eq!(payload.mime_type, "image/jpeg");
    }

    #[tokio::test]
    async fn unknown_extension_falls_back_to_octet_stream() {
        let mut file = tempfile::Builder::new().suffix(".zzimg").tempfile().unwrap();
        file.write_all(b"raw").unwrap();

        let payload = encode_image(file.path()).await.unwrap();
        assert_eq!(payload.mime_type, "application/octet-stream");
    }

    #[tokio::test]
    async fn missing_file_is_read_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nope.png");

        let err = encode_image(&path).await.unwrap_err();
        match err {
            EncodingError::Read { path: p, source } => {
                assert_eq!(p, path);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected Read error, got {other:?}"),
        }
    }

    #[test]
    fn empty_bytes_encode_to_empty_payload() {
        let payload = ImagePayload::from_bytes(&[], "image/webp");
        assert_eq!(payload.data, "");
        assert!(payload.decode().unwrap().is_empty());
    }

    #[test]
    fn serializes_as_inline_data() {
        let payload = ImagePayload::from_bytes(b"hi", "image/png");
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["mimeType"], "image/png");
        assert_eq!(value["data"], "aGk=");
    }

    #[test]
    fn corrupt_payload_fails_to_decode() {
        let payload = ImagePayload {
            mime_type: "image/png".into(),
            data: "not base64!!".into(),
        };
        assert!(matches!(payload.decode(), Err(EncodingError::Decode(_))));
    }
}
