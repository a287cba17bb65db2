use crate::clipboard::RawPayload;
use crate::error::DecodeError;
use crate::models::{ClipboardChangeEvent, ClipboardDataType, ClipboardImage};

/// Default upper bound on a single payload (50MB)
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 52_428_800;

/// Turns raw native payloads into owned, typed events
#[derive(Debug, Clone, Copy)]
pub struct PayloadDecoder {
    max_payload_bytes: usize,
}

impl Default for PayloadDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PAYLOAD_BYTES)
    }
}

impl PayloadDecoder {
    pub fn new(max_payload_bytes: usize) -> Self {
        PayloadDecoder { max_payload_bytes }
    }

    pub fn max_payload_bytes(&self) -> usize {
        self.max_payload_bytes
    }

    /// Decode a payload, copying its bytes out of the native buffer
    ///
    /// Only `Text`, `Files` and `Image` tags carry payloads; anything else is
    /// `UnknownType`. The declared length must be non-zero and fit both the
    /// buffer and the configured maximum.
    pub fn decode(&self, payload: RawPayload<'_>) -> Result<ClipboardChangeEvent, DecodeError> {
        let data_type = match ClipboardDataType::from_tag(payload.type_tag()) {
            Some(t @ (ClipboardDataType::Text | ClipboardDataType::Files | ClipboardDataType::Image)) => t,
            _ => return Err(DecodeError::UnknownType(payload.type_tag())),
        };

        let bytes = self.checked_bytes(payload)?;

        let event = match data_type {
            ClipboardDataType::Text => {
                ClipboardChangeEvent::text(String::from_utf8_lossy(bytes).into_owned())
            }
            ClipboardDataType::Files => {
                ClipboardChangeEvent::files(String::from_utf8_lossy(bytes).into_owned())
            }
            _ => ClipboardChangeEvent::image(ClipboardImage::from_bytes(bytes.to_vec())),
        };
        Ok(event)
    }

    fn checked_bytes<'a>(&self, payload: RawPayload<'a>) -> Result<&'a [u8], DecodeError> {
        let length = payload.length();
        let buffer = payload.buffer();

        if length == 0 {
            return Err(DecodeError::EmptyPayload);
        }
        if length > self.max_payload_bytes {
            return Err(DecodeError::TooLarge(length, self.max_payload_bytes));
        }
        buffer
            .get(..length)
            .ok_or(DecodeError::LengthOutOfBounds {
                length,
                capacity: buffer.len(),
            })
    }
}
