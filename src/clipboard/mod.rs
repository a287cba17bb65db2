//! Native clipboard hook providers
//!
//! The listener core only talks to a [`NativeHook`]:
//! - Linux: [`PollingHook`] over wl-clipboard or xclip, chosen by `WAYLAND_DISPLAY`
//! - Windows / macOS: [`WatcherHook`] on the OS change notification, reading
//!   through arboard only when a change is reported

pub mod command;
pub mod desktop;
pub mod hook;
pub mod polling;
pub mod watcher;

use std::sync::Arc;
use std::time::Duration;

pub use command::{CommandSource, CommandTool};
pub use desktop::ArboardSource;
pub use hook::{ChangedCallback, DataCallback, NativeHook, RawPayload};
pub use polling::{ClipboardSnapshot, ClipboardSource, MIN_POLL_INTERVAL, PollingHook};
pub use watcher::WatcherHook;

use crate::listener::Platform;

/// Build the default hook for `platform`
///
/// `poll_interval` only applies to polling hooks.
pub fn create_hook(platform: Platform, poll_interval: Duration) -> Arc<dyn NativeHook> {
    match platform {
        Platform::Linux => {
            let source = CommandSource::detect();
            log::info!("Using {} clipboard source", source.name());
            Arc::new(PollingHook::new(source, poll_interval))
        }
        Platform::Windows | Platform::MacOs => {
            log::info!("Using OS clipboard change notifications");
            Arc::new(WatcherHook::new(ArboardSource::new()))
        }
    }
}
