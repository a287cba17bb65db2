use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::pipeline::{Pipeline, shield};
use crate::clipboard::{ChangedCallback, DataCallback, NativeHook, RawPayload};
use crate::models::NotificationType;

/// The two callback classes a native hook accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackKind {
    /// Fires on any change, no payload
    NoData,
    /// Fires with a raw payload that needs decoding
    WithData,
}

/// Which callbacks are currently handed to the native hook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegisteredCallbacks {
    pub no_data: bool,
    pub with_data: bool,
}

/// A handle given to the hook plus the switch that disarms it
///
/// A hook may have cloned the handle before its slot was cleared; once
/// `active` is false such a clone returns without touching the pipeline.
struct Registration<C> {
    // Held only to keep the callback alive
    #[allow(dead_code)]
    callback: C,
    active: Arc<AtomicBool>,
}

impl<C> Registration<C> {
    fn disarm(&self) {
        self.active.store(false, Ordering::Release);
    }
}

/// Sole owner of the callback handles given to a native hook
///
/// A handle stays alive here for as long as the hook may invoke it. On
/// unset the handle is disarmed, then the hook's slot is cleared, then the
/// local handle is released.
pub(crate) struct CallbackRegistry {
    hook: Arc<dyn NativeHook>,
    pipeline: Arc<Pipeline>,
    no_data: Option<Registration<ChangedCallback>>,
    with_data: Option<Registration<DataCallback>>,
}

impl CallbackRegistry {
    pub(crate) fn new(hook: Arc<dyn NativeHook>, pipeline: Arc<Pipeline>) -> Self {
        CallbackRegistry {
            hook,
            pipeline,
            no_data: None,
            with_data: None,
        }
    }

    pub(crate) fn set(&mut self, kind: CallbackKind) {
        let active = Arc::new(AtomicBool::new(true));
        match kind {
            CallbackKind::NoData => {
                if self.no_data.is_some() {
                    return;
                }
                let pipeline = Arc::clone(&self.pipeline);
                let armed = Arc::clone(&active);
                let callback: ChangedCallback = Arc::new(move || {
                    if !armed.load(Ordering::Acquire) {
                        return;
                    }
                    shield("change", || {
                        pipeline.on_changed();
                    })
                });
                self.no_data = Some(Registration {
                    callback: Arc::clone(&callback),
                    active,
                });
                self.hook.set_changed_callback(Some(callback));
            }
            CallbackKind::WithData => {
                if self.with_data.is_some() {
                    return;
                }
                let pipeline = Arc::clone(&self.pipeline);
                let armed = Arc::clone(&active);
                let callback: DataCallback = Arc::new(move |payload: RawPayload<'_>| {
                    if !armed.load(Ordering::Acquire) {
                        return;
                    }
                    shield("change-with-data", || {
                        pipeline.on_payload(payload);
                    })
                });
                self.with_data = Some(Registration {
                    callback: Arc::clone(&callback),
                    active,
                });
                self.hook.set_changed_callback_with_data(Some(callback));
            }
        }
        log::debug!("Registered {:?} callback with {}", kind, self.hook.name());
    }

    pub(crate) fn unset(&mut self, kind: CallbackKind) {
        match kind {
            CallbackKind::NoData => {
                if let Some(registration) = &self.no_data {
                    registration.disarm();
                }
                self.hook.set_changed_callback(None);
                self.no_data = None;
            }
            CallbackKind::WithData => {
                if let Some(registration) = &self.with_data {
                    registration.disarm();
                }
                self.hook.set_changed_callback_with_data(None);
                self.with_data = None;
            }
        }
    }

    /// Register the callback kinds `notification_type` asks for
    pub(crate) fn set_for(&mut self, notification_type: NotificationType) {
        if notification_type.wants_no_data() {
            self.set(CallbackKind::NoData);
        }
        if notification_type.wants_with_data() {
            self.set(CallbackKind::WithData);
        }
    }

    pub(crate) fn unset_all(&mut self) {
        self.unset(CallbackKind::NoData);
        self.unset(CallbackKind::WithData);
    }

    pub(crate) fn registered(&self) -> RegisteredCallbacks {
        RegisteredCallbacks {
            no_data: self.no_data.is_some(),
            with_data: self.with_data.is_some(),
        }
    }
}
