use anyhow::{Result, anyhow};
use arboard::{Clipboard, ImageData};

use super::polling::{ClipboardSnapshot, ClipboardSource};

/// Windows / macOS clipboard source backed by arboard
/// Images arrive as raw RGBA and are re-encoded to PNG.
#[derive(Debug, Default)]
pub struct ArboardSource;

impl ArboardSource {
    pub fn new() -> Self {
        ArboardSource
    }

    /// Current clipboard bitmap as PNG bytes, if any
    pub fn read_image(&self) -> Result<Option<Vec<u8>>> {
        let mut clipboard = open_clipboard()?;
        match clipboard.get_image() {
            Ok(image) => Ok(Some(encode_png(image)?)),
            Err(arboard::Error::ContentNotAvailable) => Ok(None),
            Err(e) => Err(anyhow!("Failed to get image: {}", e)),
        }
    }
}

fn open_clipboard() -> Result<Clipboard> {
    Clipboard::new().map_err(|e| anyhow!("Failed to init clipboard: {}", e))
}

/// Encode arboard's RGBA buffer as PNG
pub fn encode_png(image: ImageData<'_>) -> Result<Vec<u8>> {
    let buffer = image::RgbaImage::from_raw(
        image.width as u32,
        image.height as u32,
        image.bytes.into_owned(),
    )
    .ok_or_else(|| anyhow!("Invalid image buffer"))?;

    let mut png = Vec::new();
    buffer
        .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| anyhow!("PNG encode failed: {}", e))?;
    Ok(png)
}

impl ClipboardSource for ArboardSource {
    fn read(&self) -> Result<Option<ClipboardSnapshot>> {
        if let Some(png) = self.read_image()? {
            return Ok(Some(ClipboardSnapshot::Image(png)));
        }

        let mut clipboard = open_clipboard()?;
        match clipboard.get_text() {
            Ok(text) if !text.is_empty() => Ok(Some(ClipboardSnapshot::Text(text))),
            Ok(_) | Err(arboard::Error::ContentNotAvailable) => Ok(None),
            Err(e) => Err(anyhow!("Failed to get text: {}", e)),
        }
    }

    fn name(&self) -> &'static str {
        "arboard"
    }
}
