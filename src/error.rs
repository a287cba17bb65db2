//! Error types for the notification engine.

use thiserror::Error;

/// Result type for listener operations
pub type Result<T> = std::result::Result<T, ClipboardError>;

/// Errors raised by the listener, its factory and its extras
#[derive(Error, Debug)]
pub enum ClipboardError {
    /// The running OS has no listener implementation
    #[error("Clipboard listener not supported on this platform: {0}")]
    PlatformUnsupported(String),

    /// A typed listener was requested for a different OS than the one detected
    #[error("Unsupported platform or capability requested: {requested} (detected {detected})")]
    UnsupportedCapability {
        requested: &'static str,
        detected: &'static str,
    },

    /// A native payload could not be turned into an event
    #[error("Failed to decode clipboard payload: {0}")]
    Decode(#[from] DecodeError),

    /// An OS helper (e.g. an external clipboard utility) failed
    #[error("Native clipboard call failed: {0}")]
    NativeCallFailure(String),

    /// A subscriber's handler returned an error or panicked
    #[error("Subscriber {id} handler failed: {message}")]
    SubscriberHandler { id: u64, message: String },

    /// The background listening thread could not be launched
    #[error("Failed to spawn listener worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),
}

/// Reasons a raw native payload is dropped
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Payload is empty")]
    EmptyPayload,

    #[error("Declared length {length} exceeds buffer capacity {capacity}")]
    LengthOutOfBounds { length: usize, capacity: usize },

    #[error("Payload size {0} exceeds maximum allowed {1}")]
    TooLarge(usize, usize),

    #[error("Unknown or payload-less type tag: {0}")]
    UnknownType(i32),
}
