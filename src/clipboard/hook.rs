use std::sync::Arc;

use crate::models::ClipboardDataType;

/// Payload-less change callback
pub type ChangedCallback = Arc<dyn Fn() + Send + Sync>;

/// Change callback carrying a raw payload
pub type DataCallback = Arc<dyn Fn(RawPayload<'_>) + Send + Sync>;

/// Raw payload handed over by a native hook: buffer, declared length, type tag
///
/// The declared length is untrusted and is validated against the buffer
/// before anything is copied out.
#[derive(Debug, Clone, Copy)]
pub struct RawPayload<'a> {
    buffer: &'a [u8],
    length: usize,
    type_tag: i32,
}

impl<'a> RawPayload<'a> {
    pub fn new(buffer: &'a [u8], length: usize, type_tag: i32) -> Self {
        RawPayload {
            buffer,
            length,
            type_tag,
        }
    }

    /// Payload whose declared length is the whole buffer
    pub fn from_slice(buffer: &'a [u8], data_type: ClipboardDataType) -> Self {
        Self::new(buffer, buffer.len(), data_type.tag())
    }

    pub fn buffer(&self) -> &'a [u8] {
        self.buffer
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn type_tag(&self) -> i32 {
        self.type_tag
    }
}

/// Contract every OS clipboard hook provider satisfies
///
/// A hook holds at most one callback of each kind. Passing `None` clears
/// the slot; once cleared the hook must not invoke the old callback again
/// except for an invocation already in flight.
pub trait NativeHook: Send + Sync {
    /// Observe clipboard changes; blocks until `stop_listener` is called
    fn start_listener(&self);

    /// Make a running (or about to run) `start_listener` return. Idempotent.
    fn stop_listener(&self);

    fn set_changed_callback(&self, callback: Option<ChangedCallback>);

    fn set_changed_callback_with_data(&self, callback: Option<DataCallback>);

    /// Hook name (for logging/debugging)
    fn name(&self) -> &'static str;
}
