use anyhow::Result;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::ClipboardError;
use crate::models::ClipboardChangeEvent;

/// Subscriber callback; returning an error reports it without stopping dispatch
pub type EventHandler = Arc<dyn Fn(&ClipboardChangeEvent) -> Result<()> + Send + Sync>;

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Result of delivering one event
#[derive(Debug, Default)]
pub struct DispatchOutcome {
    /// Handlers that completed successfully
    pub delivered: usize,
    /// One entry per failing handler
    pub failures: Vec<ClipboardError>,
}

/// Fans accepted events out to subscribers, in subscription order
pub struct EventDispatcher {
    handlers: RwLock<Vec<(SubscriptionId, EventHandler)>>,
    next_id: AtomicU64,
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl EventDispatcher {
    pub fn new() -> Self {
        EventDispatcher {
            handlers: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&ClipboardChangeEvent) -> Result<()> + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(handler)));
        log::debug!("Subscriber {} added", id);
        id
    }

    /// Returns false if `id` was not subscribed
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        let before = handlers.len();
        handlers.retain(|(sid, _)| *sid != id);
        let removed = handlers.len() != before;
        if removed {
            log::debug!("Subscriber {} removed", id);
        }
        removed
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Invoke every handler on the calling thread
    ///
    /// Handlers run against a snapshot of the subscriber list, so a handler
    /// may subscribe or unsubscribe without deadlocking. Errors and panics
    /// are logged and collected; remaining handlers still run.
    pub fn dispatch(&self, event: &ClipboardChangeEvent) -> DispatchOutcome {
        let snapshot: Vec<(SubscriptionId, EventHandler)> = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let mut outcome = DispatchOutcome::default();
        for (id, handler) in snapshot {
            let message = match panic::catch_unwind(AssertUnwindSafe(|| handler(event))) {
                Ok(Ok(())) => {
                    outcome.delivered += 1;
                    continue;
                }
                Ok(Err(e)) => format!("{:#}", e),
                Err(payload) => format!("panicked: {}", panic_message(payload.as_ref())),
            };

            let error = ClipboardError::SubscriberHandler { id: id.0, message };
            log::error!("{} ({} event)", error, event.data_type());
            outcome.failures.push(error);
        }
        outcome
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::sync::Mutex;

    #[test]
    fn test_dispatch_in_subscription_order() {
        let dispatcher = EventDispatcher::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        for name in ["first", "second", "third"] {
            let seen = Arc::clone(&seen);
            dispatcher.subscribe(move |_| {
                seen.lock().unwrap().push(name);
                Ok(())
            });
        }

        let outcome = dispatcher.dispatch(&ClipboardChangeEvent::notification());
        assert_eq!(outcome.delivered, 3);
        assert!(outcome.failures.is_empty());
        assert_eq!(*seen.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_failing_handlers_are_isolated() {
        let dispatcher = EventDispatcher::new();
        let reached = Arc::new(Mutex::new(0));

        dispatcher.subscribe(|_| Err(anyhow!("disk full")));
        dispatcher.subscribe(|_| panic!("handler bug"));
        {
            let reached = Arc::clone(&reached);
            dispatcher.subscribe(move |_| {
                *reached.lock().unwrap() += 1;
                Ok(())
            });
        }

        let outcome = dispatcher.dispatch(&ClipboardChangeEvent::text("x".to_string()));
        assert_eq!(outcome.delivered, 1);
        assert_eq!(outcome.failures.len(), 2);
        assert_eq!(*reached.lock().unwrap(), 1);
        assert!(outcome.failures[0].to_string().contains("disk full"));
        assert!(outcome.failures[1].to_string().contains("handler bug"));
    }

    #[test]
    fn test_unsubscribe() {
        let dispatcher = EventDispatcher::new();
        let id = dispatcher.subscribe(|_| Ok(()));
        dispatcher.subscribe(|_| Ok(()));
        assert_eq!(dispatcher.subscriber_count(), 2);

        assert!(dispatcher.unsubscribe(id));
        assert!(!dispatcher.unsubscribe(id));
        assert_eq!(dispatcher.dispatch(&ClipboardChangeEvent::cleared()).delivered, 1);
    }

    #[test]
    fn test_handler_may_unsubscribe_itself() {
        let dispatcher = Arc::new(EventDispatcher::new());
        let own_id = Arc::new(Mutex::new(None));
        let id = {
            let inner = Arc::clone(&dispatcher);
            let own_id = Arc::clone(&own_id);
            dispatcher.subscribe(move |_| {
                if let Some(id) = *own_id.lock().unwrap() {
                    inner.unsubscribe(id);
                }
                Ok(())
            })
        };
        *own_id.lock().unwrap() = Some(id);

        assert_eq!(dispatcher.dispatch(&ClipboardChangeEvent::notification()).delivered, 1);
        assert_eq!(dispatcher.subscriber_count(), 0);
    }
}
