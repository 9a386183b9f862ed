use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::{CoreError, FieldValue};

const ACCEPTED_IMAGE_TYPES: &[&str] = &["image/png", "image/jpeg", "image/webp", "image/gif"];

/// A camera capture or picked file, held as a base64 `data:` URL.
///
/// The payload is otherwise opaque: it is stored verbatim as a text field
/// value or list item field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    mime: String,
    data_url: String,
    decoded_len: usize,
}

impl ImageAttachment {
    pub fn from_data_url(data_url: &str, max_bytes: usize) -> Result<Self, CoreError> {
        let rest = data_url
            .strip_prefix("data:")
            .ok_or_else(|| CoreError::InvalidAttachment("not a data URL".into()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| CoreError::InvalidAttachment("missing payload separator".into()))?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or_else(|| CoreError::InvalidAttachment("payload is not base64".into()))?;
        if !ACCEPTED_IMAGE_TYPES.contains(&mime) {
            return Err(CoreError::InvalidAttachment(format!("unsupported type {mime}")));
        }
        if payload.is_empty() {
            return Err(CoreError::InvalidAttachment("empty payload".into()));
        }
        // Cheap upper bound first so an oversized capture is never decoded.
        let estimate = base64::decoded_len_estimate(payload.len());
        if estimate > max_bytes.saturating_add(2) {
            return Err(CoreError::AttachmentTooLarge {
                size: estimate,
                max: max_bytes,
            });
        }
        let decoded = STANDARD
            .decode(payload)
            .map_err(|e| CoreError::InvalidAttachment(format!("payload is not base64: {e}")))?;
        let decoded_len = decoded.len();
        if decoded_len > max_bytes {
            return Err(CoreError::AttachmentTooLarge {
                size: decoded_len,
                max: max_bytes,
            });
        }

        Ok(Self {
            mime: mime.to_string(),
            data_url: data_url.to_string(),
            decoded_len,
        })
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn decoded_len(&self) -> usize {
        self.decoded_len
    }

    pub fn as_data_url(&self) -> &str {
        &self.data_url
    }

    pub fn into_value(self) -> FieldValue {
        FieldValue::Text(self.data_url)
    }
}
