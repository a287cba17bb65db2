use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::decoder::PayloadDecoder;
use super::dispatch::{DispatchOutcome, EventDispatcher};
use super::filter::DuplicateFilter;
use crate::clipboard::RawPayload;
use crate::error::DecodeError;
use crate::models::ClipboardChangeEvent;

/// decode -> dedup -> dispatch, shared by the callbacks a listener registers
pub(crate) struct Pipeline {
    decoder: PayloadDecoder,
    filter: Mutex<DuplicateFilter>,
    pub(crate) dispatcher: EventDispatcher,
}

impl Pipeline {
    pub(crate) fn new(decoder: PayloadDecoder, filter: DuplicateFilter) -> Self {
        Pipeline {
            decoder,
            filter: Mutex::new(filter),
            dispatcher: EventDispatcher::new(),
        }
    }

    pub(crate) fn filter(&self) -> MutexGuard<'_, DuplicateFilter> {
        self.filter.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// No-data callback body
    pub(crate) fn on_changed(&self) -> DispatchOutcome {
        self.dispatcher.dispatch(&ClipboardChangeEvent::notification())
    }

    /// With-data callback body; returns None when the event was dropped
    pub(crate) fn on_payload(&self, payload: RawPayload<'_>) -> Option<DispatchOutcome> {
        let event = match self.decoder.decode(payload) {
            Ok(event) => event,
            Err(DecodeError::UnknownType(tag)) => {
                log::debug!("Unknown clipboard event or no data (type tag {})", tag);
                return None;
            }
            Err(e) => {
                log::warn!("Dropping clipboard event: {}", e);
                return None;
            }
        };

        if !self.filter().accept(&event) {
            log::debug!("Duplicate {} notification suppressed", event.data_type());
            return None;
        }

        log::debug!("Clipboard changed: {}", event.summary(60));
        Some(self.dispatcher.dispatch(&event))
    }
}

/// Run a callback body so that no panic escapes into the native hook
pub(crate) fn shield<F: FnOnce()>(what: &str, f: F) {
    if panic::catch_unwind(AssertUnwindSafe(f)).is_err() {
        log::error!("Panic while handling {} callback, event dropped", what);
    }
}
