//! Clipboard listener: lifecycle state machine over a native hook
//!
//! ```text
//! Stopped --start()--> Starting --worker launched--> Monitoring --stop()--> Stopped
//! ```
//!
//! `start`, `stop` and `set_notification_type` take `&mut self`, so calls on
//! one instance are serialised by the borrow checker. The native hook's
//! blocking loop runs on a dedicated worker thread; subscriber handlers run
//! on that thread, never on the caller's.

pub mod decoder;
pub mod dispatch;
pub mod factory;
pub mod filter;
mod pipeline;
pub mod platform;
mod registry;

use anyhow::Result as AnyResult;
use std::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

pub use decoder::{DEFAULT_MAX_PAYLOAD_BYTES, PayloadDecoder};
pub use dispatch::{DispatchOutcome, EventDispatcher, EventHandler, SubscriptionId};
pub use factory::{ListenerFactory, ListenerOptions, Platform, create_listener, create_listener_for};
pub use filter::{DuplicateFilter, image_hash};
pub use platform::{
    LinuxCapability, ListenerCapability, MacCapability, PlatformListener, WindowsCapability,
};
pub use registry::{CallbackKind, RegisteredCallbacks};

use crate::clipboard::NativeHook;
use crate::error::{ClipboardError, Result};
use crate::models::{ClipboardChangeEvent, NotificationType};
use pipeline::Pipeline;
use registry::CallbackRegistry;

/// Lifecycle phase of a listener
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerPhase {
    Stopped,
    /// Registering callbacks and launching the worker. Only held inside
    /// `start`, so callers never observe it.
    Starting,
    Monitoring,
}

#[derive(Debug, Clone, Copy)]
struct ListenerState {
    phase: ListenerPhase,
    callbacks_set: bool,
    notification_type: NotificationType,
}

/// Watches the clipboard through a native hook and notifies subscribers
///
/// Duplicate-suppression state lives as long as the listener and survives
/// stop/start cycles. Dropping a monitoring listener stops it.
pub struct ClipboardListener {
    platform: Platform,
    hook: Arc<dyn NativeHook>,
    pipeline: Arc<Pipeline>,
    registry: CallbackRegistry,
    state: ListenerState,
    worker: Option<JoinHandle<()>>,
}

impl ClipboardListener {
    pub(crate) fn new(platform: Platform, hook: Arc<dyn NativeHook>, options: &ListenerOptions) -> Self {
        let pipeline = Arc::new(Pipeline::new(
            PayloadDecoder::new(options.max_payload_bytes),
            DuplicateFilter::new(options.verify_new_image_data),
        ));
        let registry = CallbackRegistry::new(Arc::clone(&hook), Arc::clone(&pipeline));

        ClipboardListener {
            platform,
            hook,
            pipeline,
            registry,
            state: ListenerState {
                phase: ListenerPhase::Stopped,
                callbacks_set: false,
                notification_type: options.notification_type,
            },
            worker: None,
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn is_monitoring(&self) -> bool {
        self.state.phase == ListenerPhase::Monitoring
    }

    pub fn phase(&self) -> ListenerPhase {
        self.state.phase
    }

    pub fn notification_type(&self) -> NotificationType {
        self.state.notification_type
    }

    /// Callback kinds currently handed to the native hook
    pub fn registered_callbacks(&self) -> RegisteredCallbacks {
        self.registry.registered()
    }

    pub fn verify_new_image_data(&self) -> bool {
        self.pipeline.filter().verify_new_image_data()
    }

    /// Compare image hashes to suppress repeated images (off by default)
    pub fn set_verify_new_image_data(&self, enabled: bool) {
        self.pipeline.filter().set_verify_new_image_data(enabled);
    }

    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&ClipboardChangeEvent) -> AnyResult<()> + Send + Sync + 'static,
    {
        self.pipeline.dispatcher.subscribe(handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.pipeline.dispatcher.unsubscribe(id)
    }

    /// Deliver an event straight to subscribers, bypassing the filter
    pub(crate) fn publish(&self, event: &ClipboardChangeEvent) -> DispatchOutcome {
        self.pipeline.dispatcher.dispatch(event)
    }

    /// Register callbacks (if needed) and launch the listening worker
    ///
    /// Returns as soon as the worker is launched. No-op while monitoring.
    pub fn start(&mut self) -> Result<()> {
        if self.state.phase == ListenerPhase::Monitoring {
            return Ok(());
        }

        self.state.phase = ListenerPhase::Starting;

        if !self.state.callbacks_set {
            self.registry.set_for(self.state.notification_type);
            self.state.callbacks_set = true;
        }

        let hook = Arc::clone(&self.hook);
        let spawned = thread::Builder::new()
            .name("clipmon-listener".to_string())
            .spawn(move || hook.start_listener());

        match spawned {
            Ok(handle) => self.worker = Some(handle),
            Err(e) => {
                self.registry.unset_all();
                self.state.callbacks_set = false;
                self.state.phase = ListenerPhase::Stopped;
                return Err(ClipboardError::WorkerSpawn(e));
            }
        }

        self.state.phase = ListenerPhase::Monitoring;
        log::info!(
            "Clipboard monitoring started ({}, {:?}, hook {})",
            self.platform,
            self.state.notification_type,
            self.hook.name()
        );
        Ok(())
    }

    /// Detach callbacks, signal the native loop to end and join the worker
    ///
    /// No-op unless monitoring. There is no timeout: if the hook's stop
    /// primitive never makes its loop return, this call does not return.
    pub fn stop(&mut self) {
        if self.state.phase != ListenerPhase::Monitoring {
            return;
        }

        self.registry.unset_all();
        self.state.callbacks_set = false;

        self.hook.stop_listener();
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            log::error!("Clipboard listener worker panicked");
        }

        self.state.phase = ListenerPhase::Stopped;
        log::info!("Clipboard monitoring stopped");
    }

    /// Switch callback classes; old callbacks are fully detached first
    ///
    /// If callbacks are currently registered they are re-registered for the
    /// new type right away, otherwise registration waits for `start`.
    pub fn set_notification_type(&mut self, notification_type: NotificationType) {
        if self.state.notification_type == notification_type {
            return;
        }

        let reregister = self.state.callbacks_set;
        if reregister {
            self.registry.unset_all();
            self.state.callbacks_set = false;
        }

        self.state.notification_type = notification_type;

        if reregister {
            self.registry.set_for(notification_type);
            self.state.callbacks_set = true;
        }

        log::debug!("Notification type set to {:?}", notification_type);
    }
}

impl fmt::Debug for ClipboardListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClipboardListener")
            .field("platform", &self.platform)
            .field("hook", &self.hook.name())
            .field("phase", &self.state.phase)
            .field("notification_type", &self.state.notification_type)
            .field("callbacks", &self.registry.registered())
            .finish_non_exhaustive()
    }
}

impl Drop for ClipboardListener {
    fn drop(&mut self) {
        self.stop();
    }
}
