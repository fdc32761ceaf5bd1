//! Image encoding
//!
//! Turns an uploaded image into the base64 data URL that travels in
//! `{ "imageBase64": ... }`, and back.

use crate::error::{Error, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

/// MIME type assumed when nothing better is known
pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

static DATA_URL_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^data:(image/[a-z]+);base64,").expect("DATA_URL_PREFIX is a compile-time constant")
});

/// A base64-encoded image with its MIME type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    /// MIME type, e.g. `image/png`
    pub mime_type: String,
    /// Standard base64 payload
    pub data: String,
}

impl EncodedImage {
    /// Render as `data:<mime>;base64,<data>`
    #[must_use]
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// Encoder with an optional size limit.
///
/// Without a limit no size or format check is made; the remote model is the
/// only gatekeeper.
#[derive(Debug, Clone, Default)]
pub struct ImageEncoder {
    max_bytes: Option<usize>,
}

impl ImageEncoder {
    /// Encoder without a size limit
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject images larger than `max_bytes`
    #[must_use]
    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = Some(max_bytes);
        self
    }

    /// Encode raw bytes. The MIME type is sniffed from the content when
    /// `mime_hint` is `None`.
    pub fn encode_bytes(&self, bytes: &[u8], mime_hint: Option<&str>) -> Result<EncodedImage> {
        if bytes.is_empty() {
            return Err(Error::InvalidImage("image is empty".to_string()));
        }
        if let Some(max) = self.max_bytes {
            if bytes.len() > max {
                return Err(Error::InvalidImage(format!(
                    "image is {} bytes, limit is {} bytes",
                    bytes.len(),
                    max
                )));
            }
        }

        let mime_type = mime_hint
            .map(str::to_string)
            .or_else(|| sniff_mime(bytes).map(str::to_string))
            .unwrap_or_else(|| "application/octet-stream".to_string());

        Ok(EncodedImage {
            mime_type,
            data: STANDARD.encode(bytes),
        })
    }

    /// Read and encode an image file
    pub async fn encode_file(&self, path: impl AsRef<Path>) -> Result<EncodedImage> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let mime = sniff_mime(&bytes).or_else(|| mime_from_extension(path));
        debug!(
            path = %path.display(),
            size = bytes.len(),
            mime = mime.unwrap_or("unknown"),
            "Encoding image file"
        );
        self.encode_bytes(&bytes, mime)
    }
}

/// Detect an image MIME type from magic bytes
#[must_use]
pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some("image/png"),
        [b'G', b'I', b'F', b'8', ..] => Some("image/gif"),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some("image/webp"),
        [b'B', b'M', ..] => Some("image/bmp"),
        _ => None,
    }
}

/// Guess an image MIME type from the file extension
#[must_use]
pub fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        "heic" => Some("image/heic"),
        _ => None,
    }
}

/// Split a `data:<mime>;base64,<payload>` URL.
///
/// Returns `None` for anything that is not a base64 data URL.
#[must_use]
pub fn parse_data_url(input: &str) -> Option<EncodedImage> {
    let rest = input.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let mime_type = header.strip_suffix(";base64")?;
    Some(EncodedImage {
        mime_type: if mime_type.is_empty() {
            DEFAULT_IMAGE_MIME.to_string()
        } else {
            mime_type.to_string()
        },
        data: payload.to_string(),
    })
}

/// Split a leading `data:image/<letters>;base64,` prefix off `input`.
///
/// Returns the declared MIME type with the payload after the prefix. Input
/// without a recognised prefix comes back untouched with no MIME type; only
/// lower-case alphabetic subtypes are recognised, so `image/svg+xml` or a
/// header carrying parameters keeps its prefix.
#[must_use]
pub fn split_data_url_prefix(input: &str) -> (Option<&str>, &str) {
    DATA_URL_PREFIX
        .captures(input)
        .and_then(|caps| {
            let prefix = caps.get(0)?;
            let mime = caps.get(1)?;
            Some((Some(mime.as_str()), &input[prefix.end()..]))
        })
        .unwrap_or((None, input))
}

/// Remove a leading `data:image/<letters>;base64,` prefix, if present.
#[must_use]
pub fn strip_data_url_prefix(input: &str) -> &str {
    split_data_url_prefix(input).1
}

/// Normalise a data URL or bare base64 string into a canonical data URL.
///
/// The payload is decoded and re-encoded so that whitespace, line breaks and
/// URL-safe alphabets are folded into standard padded base64. A bare payload
/// gets its MIME type from the decoded bytes.
pub fn canonicalize(input: &str) -> Result<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidImage("image data is empty".to_string()));
    }

    let (mime_hint, payload) = match parse_data_url(trimmed) {
        Some(img) => (Some(img.mime_type), img.data),
        None if trimmed.starts_with("data:") => {
            return Err(Error::InvalidImage(
                "data URL is not base64-encoded".to_string(),
            ))
        }
        None => (None, trimmed.to_string()),
    };

    let cleaned: String = payload
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();
    let unpadded = cleaned.trim_end_matches('=');
    let bytes = base64::engine::general_purpose::STANDARD_NO_PAD
        .decode(unpadded)
        .map_err(|e| Error::InvalidImage(format!("invalid base64: {}", e)))?;

    let encoded = ImageEncoder::new().encode_bytes(&bytes, mime_hint.as_deref())?;
    let encoded = if mime_hint.is_none() && encoded.mime_type == "application/octet-stream" {
        EncodedImage {
            mime_type: DEFAULT_IMAGE_MIME.to_string(),
            ..encoded
        }
    } else {
        encoded
    };
    Ok(encoded.to_data_url())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];

    #[test]
    fn test_sniff_mime() {
        assert_eq!(sniff_mime(&[0xFF, 0xD8, 0xFF, 0xE0]), Some("image/jpeg"));
        assert_eq!(sniff_mime(PNG_HEADER), Some("image/png"));
        assert_eq!(sniff_mime(b"RIFF\0\0\0\0WEBPVP8 "), Some("image/webp"));
        assert_eq!(sniff_mime(b"GIF89a"), Some("image/gif"));
        assert_eq!(sniff_mime(b"hello"), None);
    }

    #[test]
    fn test_encode_bytes_data_url() {
        let encoded = ImageEncoder::new().encode_bytes(PNG_HEADER, None).unwrap();
        assert_eq!(encoded.mime_type, "image/png");
        let url = encoded.to_data_url();
        assert!(url.starts_with("data:image/png;base64,iVBORw0KGgo"));
    }

    #[test]
    fn test_encode_respects_hint() {
        let encoded = ImageEncoder::new()
            .encode_bytes(b"abc", Some("image/heic"))
            .unwrap();
        assert_eq!(encoded.to_data_url(), "data:image/heic;base64,YWJj");
    }

    #[test]
    fn test_size_limit() {
        let encoder = ImageEncoder::new().with_max_bytes(4);
        assert!(encoder.encode_bytes(b"1234", None).is_ok());
        assert!(matches!(
            encoder.encode_bytes(b"12345", None),
            Err(Error::InvalidImage(_))
        ));
        assert!(matches!(
            ImageEncoder::new().encode_bytes(b"", None),
            Err(Error::InvalidImage(_))
        ));
    }

    #[tokio::test]
    async fn test_encode_file() {
        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        file.write_all(PNG_HEADER).unwrap();

        let encoded = ImageEncoder::new().encode_file(file.path()).await.unwrap();
        assert_eq!(encoded.mime_type, "image/png");
        assert_eq!(encoded.data, STANDARD.encode(PNG_HEADER));
    }

    #[tokio::test]
    async fn test_encode_file_extension_fallback() {
        let mut file = tempfile::Builder::new().suffix(".webp").tempfile().unwrap();
        file.write_all(b"not really an image").unwrap();

        let encoded = ImageEncoder::new().encode_file(file.path()).await.unwrap();
        assert_eq!(encoded.mime_type, "image/webp");
    }

    #[tokio::test]
    async fn test_encode_missing_file() {
        let err = ImageEncoder::new()
            .encode_file("/definitely/not/here.jpg")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_strip_prefix() {
        assert_eq!(strip_data_url_prefix("data:image/png;base64,AAAA"), "AAAA");
        assert_eq!(strip_data_url_prefix("data:image/jpeg;base64,/9j/"), "/9j/");
        assert_eq!(strip_data_url_prefix("AAAA"), "AAAA");
        assert_eq!(
            strip_data_url_prefix("data:image/svg+xml;base64,AAAA"),
            "data:image/svg+xml;base64,AAAA"
        );
    }

    #[test]
    fn test_split_prefix_keeps_mime_and_payload_together() {
        assert_eq!(
            split_data_url_prefix("data:image/png;base64,AA"),
            (Some("image/png"), "AA")
        );
        assert_eq!(split_data_url_prefix("AA"), (None, "AA"));
        for unrecognised in [
            "data:image/svg+xml;base64,PHN2Zz4=",
            "data:image/jpeg;name=a.jpg;base64,/9j/",
            "data:text/plain;base64,aGk=",
        ] {
            assert_eq!(split_data_url_prefix(unrecognised), (None, unrecognised));
        }
    }

    #[test]
    fn test_parse_data_url() {
        let img = parse_data_url("data:image/webp;base64,UklG").unwrap();
        assert_eq!(img.mime_type, "image/webp");
        assert_eq!(img.data, "UklG");
        assert!(parse_data_url("data:text/plain,hello").is_none());
        assert!(parse_data_url("UklG").is_none());
    }

    #[test]
    fn test_canonicalize_normalises_payload() {
        let messy = "data:image/png;base64,iVBO\nRw0K\r\nGgo";
        let canonical = canonicalize(messy).unwrap();
        assert_eq!(canonical, "data:image/png;base64,iVBORw0KGgo=");
    }

    #[test]
    fn test_canonicalize_bare_base64() {
        let bare = STANDARD.encode(PNG_HEADER);
        let canonical = canonicalize(&bare).unwrap();
        assert!(canonical.starts_with("data:image/png;base64,"));

        let unknown = STANDARD.encode(b"plain bytes");
        assert!(canonicalize(&unknown)
            .unwrap()
            .starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_canonicalize_rejects_garbage() {
        assert!(matches!(canonicalize("   "), Err(Error::InvalidImage(_))));
        assert!(matches!(
            canonicalize("data:image/png;base64,@@@@"),
            Err(Error::InvalidImage(_))
        ));
        assert!(matches!(
            canonicalize("data:image/png,rawtext"),
            Err(Error::InvalidImage(_))
        ));
    }
}
