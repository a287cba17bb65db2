use clipboard_rs::{ClipboardHandler, ClipboardWatcher, ClipboardWatcherContext, WatcherShutdown};
use std::sync::{Arc, Mutex};

use super::hook::{ChangedCallback, DataCallback, NativeHook, RawPayload};
use super::polling::{CallbackSlots, ClipboardSource, lock};

#[derive(Default)]
struct WatchState {
    stop_requested: bool,
    shutdown: Option<WatcherShutdown>,
}

/// Hook driven by the OS clipboard change notification (Windows / macOS)
///
/// Content is read only when the OS reports a change, and only if a
/// with-data callback is registered. Repeated notifications for unchanged
/// content are left to the listener's duplicate filter.
pub struct WatcherHook<S> {
    source: Arc<S>,
    slots: Arc<CallbackSlots>,
    state: Mutex<WatchState>,
}

impl<S: ClipboardSource + 'static> WatcherHook<S> {
    pub fn new(source: S) -> Self {
        WatcherHook {
            source: Arc::new(source),
            slots: Arc::new(CallbackSlots::default()),
            state: Mutex::new(WatchState::default()),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    fn handler(&self) -> ChangeHandler<S> {
        ChangeHandler {
            source: Arc::clone(&self.source),
            slots: Arc::clone(&self.slots),
        }
    }

    /// Consume a stop that arrived before the watch loop; true if there was one
    fn take_early_stop(&self) -> bool {
        let mut state = lock(&self.state);
        std::mem::take(&mut state.stop_requested)
    }
}

/// Runs on the watcher thread for each OS change notification
struct ChangeHandler<S> {
    source: Arc<S>,
    slots: Arc<CallbackSlots>,
}

impl<S: ClipboardSource> ChangeHandler<S> {
    fn handle_change(&self) {
        let (changed, with_data) = self.slots.current();
        if let Some(changed) = changed {
            changed();
        }

        let Some(with_data) = with_data else {
            return;
        };
        match self.source.read() {
            Ok(Some(snapshot)) => {
                with_data(RawPayload::from_slice(snapshot.bytes(), snapshot.data_type()))
            }
            Ok(None) => log::trace!("{} change carried no readable content", self.source.name()),
            Err(e) => log::debug!("{} read failed: {:#}", self.source.name(), e),
        }
    }
}

impl<S: ClipboardSource> ClipboardHandler for ChangeHandler<S> {
    fn on_clipboard_change(&mut self) {
        self.handle_change();
    }
}

impl<S: ClipboardSource + 'static> NativeHook for WatcherHook<S> {
    fn start_listener(&self) {
        if self.take_early_stop() {
            log::debug!("{} stop requested before start, not watching", self.source.name());
            return;
        }

        let mut watcher = match ClipboardWatcherContext::<ChangeHandler<S>>::new() {
            Ok(watcher) => watcher,
            Err(e) => {
                log::error!("Failed to create clipboard watcher: {}", e);
                return;
            }
        };

        {
            let mut state = lock(&self.state);
            // A stop may have landed while the watcher was being created
            if std::mem::take(&mut state.stop_requested) {
                return;
            }
            state.shutdown = Some(watcher.add_handler(self.handler()).get_shutdown_channel());
        }

        log::info!("Watching {} clipboard for change notifications", self.source.name());
        watcher.start_watch();

        let mut state = lock(&self.state);
        state.shutdown = None;
        state.stop_requested = false;
        log::info!("{} clipboard watcher stopped", self.source.name());
    }

    fn stop_listener(&self) {
        let mut state = lock(&self.state);
        match state.shutdown.take() {
            Some(shutdown) => shutdown.stop(),
            None => state.stop_requested = true,
        }
    }

    fn set_changed_callback(&self, callback: Option<ChangedCallback>) {
        self.slots.set_changed(callback);
    }

    fn set_changed_callback_with_data(&self, callback: Option<DataCallback>) {
        self.slots.set_with_data(callback);
    }

    fn name(&self) -> &'static str {
        self.source.name()
    }
}
