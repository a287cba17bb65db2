use super::data_type::ClipboardDataType;
use super::image::ClipboardImage;

/// A single accepted clipboard change, handed to every subscriber
///
/// At most one of `text` and `image` is populated, matching `data_type`:
/// `Text` and `Files` carry text, `Image` carries an image, and `None`,
/// `Cleared` and `Other` carry nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardChangeEvent {
    data_type: ClipboardDataType,
    text: Option<String>,
    image: Option<ClipboardImage>,
}

impl ClipboardChangeEvent {
    fn bare(data_type: ClipboardDataType) -> Self {
        ClipboardChangeEvent {
            data_type,
            text: None,
            image: None,
        }
    }

    /// Payload-less "clipboard changed" notification
    pub fn notification() -> Self {
        Self::bare(ClipboardDataType::None)
    }

    /// The clipboard was emptied
    pub fn cleared() -> Self {
        Self::bare(ClipboardDataType::Cleared)
    }

    pub fn text(text: String) -> Self {
        ClipboardChangeEvent {
            data_type: ClipboardDataType::Text,
            text: Some(text),
            image: None,
        }
    }

    /// File list, one path per line
    pub fn files(paths: String) -> Self {
        ClipboardChangeEvent {
            data_type: ClipboardDataType::Files,
            text: Some(paths),
            image: None,
        }
    }

    pub fn image(image: ClipboardImage) -> Self {
        ClipboardChangeEvent {
            data_type: ClipboardDataType::Image,
            text: None,
            image: Some(image),
        }
    }

    pub fn data_type(&self) -> ClipboardDataType {
        self.data_type
    }

    /// Text content, or the raw newline-delimited path list for `Files`
    pub fn text_content(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn image_content(&self) -> Option<&ClipboardImage> {
        self.image.as_ref()
    }

    /// File paths for a `Files` event, split lazily on `\n` / `\r\n`
    /// Empty entries are skipped; yields nothing for other data types.
    pub fn file_paths(&self) -> impl Iterator<Item = &str> + '_ {
        let source = match self.data_type {
            ClipboardDataType::Files => self.text.as_deref().unwrap_or(""),
            _ => "",
        };
        source
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .filter(|line| !line.is_empty())
    }

    pub fn is_notification_only(&self) -> bool {
        self.data_type == ClipboardDataType::None
    }

    pub fn is_files(&self) -> bool {
        self.data_type == ClipboardDataType::Files
    }

    /// One-line summary for logs and the CLI
    pub fn summary(&self, max_len: usize) -> String {
        match (&self.text, &self.image) {
            (Some(text), _) if self.is_files() => {
                format!("{} file(s): {}", self.file_paths().count(), truncate(text, max_len))
            }
            (Some(text), _) => truncate(text, max_len),
            (None, Some(image)) => format!("[{} image, {} bytes]", image.format(), image.len()),
            (None, None) => format!("[{}]", self.data_type),
        }
    }
}

fn truncate(text: &str, max_len: usize) -> String {
    let first = text.lines().next().unwrap_or("");
    match first.char_indices().nth(max_len) {
        Some((idx, _)) => format!("{}...", &first[..idx]),
        None => first.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_paths_split_lazily() {
        let event = ClipboardChangeEvent::files("/tmp/a.txt\r\n/tmp/b.txt\n\n/home/c\n".to_string());
        let paths: Vec<&str> = event.file_paths().collect();
        assert_eq!(paths, vec!["/tmp/a.txt", "/tmp/b.txt", "/home/c"]);
        assert!(event.is_files());
        assert!(event.image_content().is_none());
    }

    #[test]
    fn test_file_paths_empty_for_text() {
        let event = ClipboardChangeEvent::text("/tmp/a.txt\n/tmp/b.txt".to_string());
        assert_eq!(event.file_paths().count(), 0);
        assert_eq!(event.text_content(), Some("/tmp/a.txt\n/tmp/b.txt"));
    }

    #[test]
    fn test_payload_less_events() {
        for event in [ClipboardChangeEvent::notification(), ClipboardChangeEvent::cleared()] {
            assert!(event.text_content().is_none());
            assert!(event.image_content().is_none());
        }
        assert!(ClipboardChangeEvent::notification().is_notification_only());
        assert!(!ClipboardChangeEvent::cleared().is_notification_only());
    }

    #[test]
    fn test_summary() {
        let text = ClipboardChangeEvent::text("Hello, world!\nsecond".to_string());
        assert_eq!(text.summary(5), "Hello...");
        assert_eq!(text.summary(50), "Hello, world!");

        let image = ClipboardChangeEvent::image(ClipboardImage::from_bytes(vec![0x42, 0x4D, 0, 0]));
        assert_eq!(image.summary(10), "[bmp image, 4 bytes]");
        assert_eq!(ClipboardChangeEvent::cleared().summary(10), "[CLEARED]");
    }
}
