//! Clipmon - cross-platform clipboard change notifications
//!
//! A [`ClipboardListener`] drives a platform clipboard hook on a background
//! worker, decodes what it reports into [`ClipboardChangeEvent`]s, drops
//! consecutive duplicates and fans the rest out to subscribers.

pub mod clipboard;
pub mod error;
pub mod listener;
pub mod logging;
pub mod models;
pub mod storage;

pub use error::{ClipboardError, DecodeError};
pub use listener::{
    ClipboardListener, ListenerFactory, ListenerOptions, Platform, PlatformListener,
    SubscriptionId, create_listener, create_listener_for,
};
pub use models::{ClipboardChangeEvent, ClipboardDataType, ClipboardImage, NotificationType};
