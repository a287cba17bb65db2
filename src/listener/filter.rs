use base64::{Engine, engine::general_purpose::STANDARD};
use sha2::{Digest, Sha256};

use crate::models::{ClipboardChangeEvent, ClipboardDataType};

/// Collapses repeated native notifications for unchanged content
///
/// Text and file lists are compared against the last accepted value.
/// Images are only compared (by SHA-256 of the raw bytes) when
/// `verify_new_image_data` is on, since hashing costs time proportional to
/// the image size; otherwise every image counts as new.
#[derive(Debug, Default, Clone)]
pub struct DuplicateFilter {
    last_text: Option<String>,
    last_image_hash: Option<String>,
    verify_new_image_data: bool,
}

impl DuplicateFilter {
    pub fn new(verify_new_image_data: bool) -> Self {
        DuplicateFilter {
            verify_new_image_data,
            ..Default::default()
        }
    }

    pub fn verify_new_image_data(&self) -> bool {
        self.verify_new_image_data
    }

    pub fn set_verify_new_image_data(&mut self, enabled: bool) {
        self.verify_new_image_data = enabled;
    }

    pub fn last_text(&self) -> Option<&str> {
        self.last_text.as_deref()
    }

    pub fn last_image_hash(&self) -> Option<&str> {
        self.last_image_hash.as_deref()
    }

    /// Decide whether `event` should reach subscribers, updating state if so
    pub fn accept(&mut self, event: &ClipboardChangeEvent) -> bool {
        match event.data_type() {
            ClipboardDataType::Text | ClipboardDataType::Files => {
                self.is_new_text(event.text_content().unwrap_or(""))
            }
            ClipboardDataType::Image => match event.image_content() {
                Some(image) => self.is_new_image(image.data()),
                None => false,
            },
            ClipboardDataType::None | ClipboardDataType::Cleared | ClipboardDataType::Other => true,
        }
    }

    /// Non-empty text that differs from the last accepted text is new
    pub fn is_new_text(&mut self, text: &str) -> bool {
        if text.is_empty() || self.last_text.as_deref() == Some(text) {
            return false;
        }

        self.last_text = Some(text.to_string());

        // Same image copied after this text must count as new again
        if self.verify_new_image_data {
            self.last_image_hash = None;
        }

        true
    }

    pub fn is_new_image(&mut self, data: &[u8]) -> bool {
        if self.verify_new_image_data {
            let hash = image_hash(data);
            if self.last_image_hash.as_deref() == Some(hash.as_str()) {
                return false;
            }
            self.last_image_hash = Some(hash);
        }

        // Same text copied after this image must count as new again
        self.last_text = None;
        true
    }
}

/// Base64-rendered SHA-256 of raw image bytes
pub fn image_hash(data: &[u8]) -> String {
    STANDARD.encode(Sha256::digest(data))
}
