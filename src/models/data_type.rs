use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of content carried by a clipboard change
/// Numbering matches the tags used by native hook providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClipboardDataType {
    /// Notification only, no payload
    None,
    Text,
    /// Newline-delimited list of file paths
    Files,
    Image,
    Other,
    Cleared,
}

impl ClipboardDataType {
    /// Map a native type tag to a data type
    pub fn from_tag(tag: i32) -> Option<Self> {
        match tag {
            0 => Some(ClipboardDataType::None),
            1 => Some(ClipboardDataType::Text),
            2 => Some(ClipboardDataType::Files),
            3 => Some(ClipboardDataType::Image),
            4 => Some(ClipboardDataType::Other),
            5 => Some(ClipboardDataType::Cleared),
            _ => None,
        }
    }

    /// Native type tag for this data type
    pub fn tag(self) -> i32 {
        match self {
            ClipboardDataType::None => 0,
            ClipboardDataType::Text => 1,
            ClipboardDataType::Files => 2,
            ClipboardDataType::Image => 3,
            ClipboardDataType::Other => 4,
            ClipboardDataType::Cleared => 5,
        }
    }

    /// Short label for display
    pub fn label(self) -> &'static str {
        match self {
            ClipboardDataType::None => "NONE",
            ClipboardDataType::Text => "TEXT",
            ClipboardDataType::Files => "FILES",
            ClipboardDataType::Image => "IMAGE",
            ClipboardDataType::Other => "OTHER",
            ClipboardDataType::Cleared => "CLEARED",
        }
    }
}

impl fmt::Display for ClipboardDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which callback classes a listener registers with the native hook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationType {
    /// Payload-less "something changed" callback only
    ChangeNotificationOnly,
    /// Callback carrying the decoded clipboard content only
    #[default]
    ChangedWithData,
    /// Both callbacks
    All,
}

impl NotificationType {
    /// Whether the no-data callback is active under this setting
    pub fn wants_no_data(self) -> bool {
        matches!(
            self,
            NotificationType::ChangeNotificationOnly | NotificationType::All
        )
    }

    /// Whether the with-data callback is active under this setting
    pub fn wants_with_data(self) -> bool {
        matches!(self, NotificationType::ChangedWithData | NotificationType::All)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_match_native_numbering() {
        assert_eq!(ClipboardDataType::from_tag(1), Some(ClipboardDataType::Text));
        assert_eq!(ClipboardDataType::from_tag(2), Some(ClipboardDataType::Files));
        assert_eq!(ClipboardDataType::from_tag(3), Some(ClipboardDataType::Image));
        assert_eq!(ClipboardDataType::from_tag(5), Some(ClipboardDataType::Cleared));
        assert_eq!(ClipboardDataType::from_tag(42), None);
        assert_eq!(ClipboardDataType::Other.tag(), 4);
    }

    #[test]
    fn test_notification_type_kinds() {
        assert!(NotificationType::ChangeNotificationOnly.wants_no_data());
        assert!(!NotificationType::ChangeNotificationOnly.wants_with_data());
        assert!(!NotificationType::ChangedWithData.wants_no_data());
        assert!(NotificationType::ChangedWithData.wants_with_data());
        assert!(NotificationType::All.wants_no_data());
        assert!(NotificationType::All.wants_with_data());
        assert_eq!(NotificationType::default(), NotificationType::ChangedWithData);
    }
}
