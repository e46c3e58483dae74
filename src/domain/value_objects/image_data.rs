//! Inline image payloads carried as `data:` URIs

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Compose a data URI from a MIME type and base64 payload
pub fn compose_data_uri(mime_type: &str, base64_data: &str) -> String {
    format!("data:{};base64,{}", mime_type, base64_data)
}

/// A decoded `data:<mime>;base64,<payload>` image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl DecodedImage {
    /// Decode a base64 data URI back into raw image bytes
    pub fn from_data_uri(uri: &str) -> Result<Self, DataUriError> {
        let rest = uri.strip_prefix("data:").ok_or(DataUriError::NotADataUri)?;
        let (header, payload) = rest.split_once(',').ok_or(DataUriError::MissingPayload)?;
        let mime_type = header
            .strip_suffix(";base64")
            .ok_or(DataUriError::NotBase64)?;

        let bytes = STANDARD.decode(payload.trim())?;

        Ok(Self {
            mime_type: if mime_type.is_empty() {
                "application/octet-stream".to_string()
            } else {
                mime_type.to_string()
            },
            bytes,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DataUriError {
    #[error("value is not a data URI")]
    NotADataUri,
    #[error("data URI has no payload")]
    MissingPayload,
    #[error("data URI is not base64 encoded")]
    NotBase64,
    #[error("invalid base64 payload: {0}")]
    InvalidPayload(#[from] base64::DecodeError),
}

/// Download filename for an image: every non-alphanumeric character becomes
/// `-`, the result is lowercased and gets a `.png` extension
pub fn download_file_name(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    format!("{}.png", stem)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_data_uri() {
        let uri = compose_data_uri("image/png", &STANDARD.encode(b"\x89PNG fake"));
        let image = DecodedImage::from_data_uri(&uri).unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.bytes, b"\x89PNG fake");
    }

    #[test]
    fn test_decode_rejects_malformed_uris() {
        assert!(matches!(
            DecodedImage::from_data_uri("https://example.com/a.png"),
            Err(DataUriError::NotADataUri)
        ));
        assert!(matches!(
            DecodedImage::from_data_uri("data:image/png;base64"),
            Err(DataUriError::MissingPayload)
        ));
        assert!(matches!(
            DecodedImage::from_data_uri("data:text/plain,hello"),
            Err(DataUriError::NotBase64)
        ));
        assert!(matches!(
            DecodedImage::from_data_uri("data:image/png;base64,%%%"),
            Err(DataUriError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_download_file_name_is_sanitized() {
        assert_eq!(download_file_name("Tralalero Tralala"), "tralalero-tralala.png");
        assert_eq!(download_file_name("Bombardiro-Crocodilo!"), "bombardiro-crocodilo-.png");
        assert_eq!(download_file_name("Piñata 3000"), "pi-ata-3000.png");
        assert_eq!(
            download_file_name("Tung Tung-uefn-ref-sheet"),
            "tung-tung-uefn-ref-sheet.png"
        );
    }
}
