use base64::{Engine, engine::general_purpose::STANDARD};

use super::ClientError;

/// A base64 image payload with any `data:<mime>;base64,` prefix split off.
#[derive(Debug, PartialEq)]
pub struct DecodedImage {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl DecodedImage {
    pub fn extension(&self) -> &'static str {
        match self.mime.as_str() {
            "image/png" => "png",
            "image/webp" => "webp",
            _ => "jpg",
        }
    }
}

pub fn decode_image(payload: &str) -> Result<DecodedImage, ClientError> {
    let payload = payload.trim();
    let (mime, data) = match payload.strip_prefix("data:") {
        Some(rest) => {
            let (mime, data) = rest
                .split_once(";base64,")
                .ok_or_else(|| ClientError::Image("malformed data URI".into()))?;
            (mime.to_ascii_lowercase(), data)
        }
        None => ("image/jpeg".to_string(), payload),
    };

    if data.is_empty() {
        return Err(ClientError::Image("empty payload".into()));
    }

    let cleaned: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD
        .decode(cleaned.as_bytes())
        .map_err(|e| ClientError::Image(e.to_string()))?;

    Ok(DecodedImage { mime, bytes })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_data_uri_prefix() {
        let decoded = decode_image("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(decoded.mime, "image/png");
        assert_eq!(decoded.bytes, b"hello");
        assert_eq!(decoded.extension(), "png");
    }

    #[test]
    fn bare_payload_defaults_to_jpeg() {
        let decoded = decode_image("aGVsbG8=").unwrap();
        assert_eq!(decoded.mime, "image/jpeg");
        assert_eq!(decoded.extension(), "jpg");
    }

    #[test]
    fn tolerates_wrapped_lines() {
        let decoded = decode_image("aGVs\nbG8=").unwrap();
        assert_eq!(decoded.bytes, b"hello");
    }

    #[test]
    fn rejects_garbage() {
        assert!(decode_image("data:image/png;base64,").is_err());
        assert!(decode_image("data:image/png,aGVsbG8=").is_err());
        assert!(decode_image("***").is_err());
    }
}
