use anyhow::{Context, Result};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_MAGIC: [u8; 3] = [0xFF, 0xD8, 0xFF];
const BMP_MAGIC: [u8; 2] = [0x42, 0x4D];

/// Image format detected from the leading bytes of a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Bmp,
    /// Unrecognised header; still a valid image payload
    Bin,
}

impl ImageFormat {
    /// Format tag, also used as the file extension
    pub fn as_str(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Bmp => "bmp",
            ImageFormat::Bin => "bin",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sniff the image format by magic number
pub fn detect_image_format(bytes: &[u8]) -> ImageFormat {
    if bytes.starts_with(&PNG_MAGIC) {
        ImageFormat::Png
    } else if bytes.starts_with(&JPEG_MAGIC) {
        ImageFormat::Jpeg
    } else if bytes.starts_with(&BMP_MAGIC) {
        ImageFormat::Bmp
    } else {
        ImageFormat::Bin
    }
}

/// Owned image bytes copied out of a clipboard payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardImage {
    data: Vec<u8>,
    format: ImageFormat,
}

impl ClipboardImage {
    /// Wrap image bytes, detecting their format
    pub fn from_bytes(data: Vec<u8>) -> Self {
        let format = detect_image_format(&data);
        ClipboardImage { data, format }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Write the image to `path`
    ///
    /// If the extension does not match the detected format it is replaced,
    /// so `shot.png` holding JPEG bytes is written as `shot.jpeg`.
    /// Returns the path actually written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();
        let ext_matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(self.format.as_str()));

        let target = if ext_matches {
            path.to_path_buf()
        } else {
            path.with_extension(self.format.as_str())
        };

        if let Some(parent) = target.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }

        fs::write(&target, &self.data)
            .with_context(|| format!("Failed to write image to {:?}", target))?;

        log::debug!("Saved {} byte {} image to {:?}", self.data.len(), self.format, target);
        Ok(target)
    }
}
