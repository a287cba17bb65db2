use anyhow::Result;
use sha2::{Digest, Sha256};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::hook::{ChangedCallback, DataCallback, NativeHook, RawPayload};
use crate::models::ClipboardDataType;

/// Shortest poll interval; anything lower spins the source
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Clipboard content read in one poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardSnapshot {
    Text(String),
    /// Newline-delimited local paths
    Files(String),
    /// Encoded image bytes (png, jpeg, bmp, ...)
    Image(Vec<u8>),
}

impl ClipboardSnapshot {
    pub fn data_type(&self) -> ClipboardDataType {
        match self {
            ClipboardSnapshot::Text(_) => ClipboardDataType::Text,
            ClipboardSnapshot::Files(_) => ClipboardDataType::Files,
            ClipboardSnapshot::Image(_) => ClipboardDataType::Image,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        match self {
            ClipboardSnapshot::Text(text) | ClipboardSnapshot::Files(text) => text.as_bytes(),
            ClipboardSnapshot::Image(data) => data,
        }
    }

    /// SHA-256 over type tag and content
    fn digest(&self) -> Vec<u8> {
        let mut hasher = Sha256::new();
        hasher.update(self.data_type().tag().to_le_bytes());
        hasher.update(self.bytes());
        hasher.finalize().to_vec()
    }
}

/// Something that can read the current clipboard content
pub trait ClipboardSource: Send + Sync {
    /// Read the highest-priority content (image, then files, then text)
    /// Returns `None` when the clipboard holds nothing we understand
    fn read(&self) -> Result<Option<ClipboardSnapshot>>;

    /// Source name (for logging/debugging)
    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Idle,
    Running,
    StopRequested,
}

#[derive(Default)]
struct Callbacks {
    changed: Option<ChangedCallback>,
    with_data: Option<DataCallback>,
}

/// The two callback slots a hook exposes
#[derive(Default)]
pub(crate) struct CallbackSlots {
    inner: Mutex<Callbacks>,
}

impl CallbackSlots {
    pub(crate) fn set_changed(&self, callback: Option<ChangedCallback>) {
        lock(&self.inner).changed = callback;
    }

    pub(crate) fn set_with_data(&self, callback: Option<DataCallback>) {
        lock(&self.inner).with_data = callback;
    }

    /// Clone the handles so callbacks never run under our lock
    pub(crate) fn current(&self) -> (Option<ChangedCallback>, Option<DataCallback>) {
        let callbacks = lock(&self.inner);
        (callbacks.changed.clone(), callbacks.with_data.clone())
    }

    pub(crate) fn fire(&self, snapshot: &ClipboardSnapshot) {
        let (changed, with_data) = self.current();
        if let Some(changed) = changed {
            changed();
        }
        if let Some(with_data) = with_data {
            with_data(RawPayload::from_slice(snapshot.bytes(), snapshot.data_type()));
        }
    }
}

/// Hook that polls a `ClipboardSource` and fires once per logical change
///
/// Consecutive reads with identical content produce no callbacks. Callbacks
/// run on the thread that called `start_listener`.
pub struct PollingHook<S> {
    source: S,
    interval: Duration,
    run_state: Mutex<RunState>,
    wake: Condvar,
    callbacks: CallbackSlots,
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<S: ClipboardSource> PollingHook<S> {
    pub fn new(source: S, interval: Duration) -> Self {
        PollingHook {
            source,
            interval: interval.max(MIN_POLL_INTERVAL),
            run_state: Mutex::new(RunState::Idle),
            wake: Condvar::new(),
            callbacks: CallbackSlots::default(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Sleep for one interval; returns false once a stop was requested
    fn wait_next_tick(&self) -> bool {
        let state = lock(&self.run_state);
        let (mut state, _) = self
            .wake
            .wait_timeout_while(state, self.interval, |s| *s == RunState::Running)
            .unwrap_or_else(PoisonError::into_inner);

        if *state == RunState::StopRequested {
            *state = RunState::Idle;
            return false;
        }
        true
    }
}

impl<S: ClipboardSource> NativeHook for PollingHook<S> {
    fn start_listener(&self) {
        {
            let mut state = lock(&self.run_state);
            match *state {
                RunState::StopRequested => {
                    log::debug!("{} stop requested before start, not polling", self.source.name());
                    *state = RunState::Idle;
                    return;
                }
                RunState::Running => {
                    log::warn!("{} poll loop already running", self.source.name());
                    return;
                }
                RunState::Idle => *state = RunState::Running,
            }
        }

        log::info!(
            "Polling {} clipboard every {}ms",
            self.source.name(),
            self.interval.as_millis()
        );

        let mut last_digest: Option<Vec<u8>> = None;
        loop {
            match self.source.read() {
                Ok(Some(snapshot)) => {
                    let digest = snapshot.digest();
                    if last_digest.as_ref() != Some(&digest) {
                        last_digest = Some(digest);
                        log::trace!(
                            "{} change detected: {} ({} bytes)",
                            self.source.name(),
                            snapshot.data_type(),
                            snapshot.bytes().len()
                        );
                        self.callbacks.fire(&snapshot);
                    }
                }
                Ok(None) => {}
                Err(e) => log::debug!("{} read failed: {:#}", self.source.name(), e),
            }

            if !self.wait_next_tick() {
                break;
            }
        }

        log::info!("{} poll loop stopped", self.source.name());
    }

    fn stop_listener(&self) {
        let mut state = lock(&self.run_state);
        if *state != RunState::StopRequested {
            *state = RunState::StopRequested;
            self.wake.notify_all();
        }
    }

    fn set_changed_callback(&self, callback: Option<ChangedCallback>) {
        self.callbacks.set_changed(callback);
    }

    fn set_changed_callback_with_data(&self, callback: Option<DataCallback>) {
        self.callbacks.set_with_data(callback);
    }

    fn name(&self) -> &'static str {
        self.source.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    /// Replays a fixed script, then keeps returning the last item
    struct ScriptedSource {
        script: Mutex<VecDeque<Option<ClipboardSnapshot>>>,
        last: Mutex<Option<ClipboardSnapshot>>,
        reads: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(script: Vec<Option<ClipboardSnapshot>>) -> Self {
            ScriptedSource {
                script: Mutex::new(script.into()),
                last: Mutex::new(None),
                reads: AtomicUsize::new(0),
            }
        }
    }

    impl ClipboardSource for ScriptedSource {
        fn read(&self) -> Result<Option<ClipboardSnapshot>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            let mut last = self.last.lock().unwrap();
            if let Some(next) = self.script.lock().unwrap().pop_front() {
                *last = next;
            }
            Ok(last.clone())
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    fn wait_for(reads: &AtomicUsize, at_least: usize) {
        for _ in 0..500 {
            if reads.load(Ordering::SeqCst) >= at_least {
                return;
            }
            thread::sleep(Duration::from_millis(2));
        }
        panic!("source was not polled {} times", at_least);
    }

    #[test]
    fn test_fires_once_per_distinct_snapshot() {
        let hook = Arc::new(PollingHook::new(
            ScriptedSource::new(vec![
                Some(ClipboardSnapshot::Text("a".into())),
                Some(ClipboardSnapshot::Text("a".into())),
                None,
                Some(ClipboardSnapshot::Text("b".into())),
                Some(ClipboardSnapshot::Image(vec![0x42, 0x4D])),
            ]),
            Duration::from_millis(1),
        ));

        let changed = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(Mutex::new(Vec::new()));
        {
            let changed = Arc::clone(&changed);
            hook.set_changed_callback(Some(Arc::new(move || {
                changed.fetch_add(1, Ordering::SeqCst);
            })));
            let seen = Arc::clone(&seen);
            hook.set_changed_callback_with_data(Some(Arc::new(move |payload: RawPayload<'_>| {
                seen.lock()
                    .unwrap()
                    .push((payload.type_tag(), payload.buffer().to_vec()));
            })));
        }

        let worker = {
            let hook = Arc::clone(&hook);
            thread::spawn(move || hook.start_listener())
        };
        wait_for(&hook.source().reads, 8);
        hook.stop_listener();
        worker.join().unwrap();

        assert_eq!(changed.load(Ordering::SeqCst), 3);
        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                (1, b"a".to_vec()),
                (1, b"b".to_vec()),
                (3, vec![0x42, 0x4D]),
            ]
        );
    }

    #[test]
    fn test_stop_before_start_cancels_run() {
        let hook = PollingHook::new(ScriptedSource::new(vec![]), Duration::from_secs(60));
        hook.stop_listener();
        // Would block for a minute if the stop were lost
        hook.start_listener();
        assert_eq!(hook.source().reads.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_stop_wakes_sleeping_loop() {
        let hook = Arc::new(PollingHook::new(
            ScriptedSource::new(vec![]),
            Duration::from_secs(60),
        ));
        let worker = {
            let hook = Arc::clone(&hook);
            thread::spawn(move || hook.start_listener())
        };
        wait_for(&hook.source().reads, 1);
        hook.stop_listener();
        hook.stop_listener();
        worker.join().unwrap();
    }

    #[test]
    fn test_cleared_callback_not_invoked() {
        let hook = PollingHook::new(
            ScriptedSource::new(vec![Some(ClipboardSnapshot::Text("x".into()))]),
            Duration::from_millis(1),
        );
        let changed = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&changed);
        hook.set_changed_callback(Some(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })));
        hook.set_changed_callback(None);

        hook.callbacks.fire(&ClipboardSnapshot::Text("x".into()));
        assert_eq!(changed.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_interval_clamped_to_minimum() {
        let hook = PollingHook::new(ScriptedSource::new(vec![]), Duration::ZERO);
        assert_eq!(hook.interval, MIN_POLL_INTERVAL);

        let hook = PollingHook::new(ScriptedSource::new(vec![]), Duration::from_millis(250));
        assert_eq!(hook.interval, Duration::from_millis(250));
    }
}
