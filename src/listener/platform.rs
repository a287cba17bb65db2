use anyhow::Result;
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};

use super::ClipboardListener;
use super::factory::Platform;
use crate::clipboard::{ArboardSource, CommandSource};
use crate::error::ClipboardError;
use crate::models::{ClipboardChangeEvent, ClipboardImage};

/// Marker for an OS-specific listener capability
pub trait ListenerCapability: Send + Sync + 'static {
    const PLATFORM: Platform;
    const NAME: &'static str;
}

/// Windows listener: adds clipboard bitmap retrieval
#[derive(Debug)]
pub struct WindowsCapability;

/// Linux listener: adds clipboard clearing through an external utility
#[derive(Debug)]
pub struct LinuxCapability;

#[derive(Debug)]
pub struct MacCapability;

impl ListenerCapability for WindowsCapability {
    const PLATFORM: Platform = Platform::Windows;
    const NAME: &'static str = "Windows";
}

impl ListenerCapability for LinuxCapability {
    const PLATFORM: Platform = Platform::Linux;
    const NAME: &'static str = "Linux";
}

impl ListenerCapability for MacCapability {
    const PLATFORM: Platform = Platform::MacOs;
    const NAME: &'static str = "macOS";
}

/// A listener known to run on the platform of capability `C`
pub struct PlatformListener<C> {
    inner: ClipboardListener,
    _capability: PhantomData<C>,
}

impl<C: ListenerCapability> PlatformListener<C> {
    pub(crate) fn new(inner: ClipboardListener) -> Self {
        PlatformListener {
            inner,
            _capability: PhantomData,
        }
    }

    pub fn into_inner(self) -> ClipboardListener {
        self.inner
    }
}

impl<C: ListenerCapability> fmt::Debug for PlatformListener<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlatformListener")
            .field("capability", &C::NAME)
            .field("inner", &self.inner)
            .finish()
    }
}

impl<C> Deref for PlatformListener<C> {
    type Target = ClipboardListener;

    fn deref(&self) -> &ClipboardListener {
        &self.inner
    }
}

impl<C> DerefMut for PlatformListener<C> {
    fn deref_mut(&mut self) -> &mut ClipboardListener {
        &mut self.inner
    }
}

impl PlatformListener<LinuxCapability> {
    /// Empty the clipboard (xclip, or wl-copy on Wayland)
    ///
    /// On success subscribers receive a `Cleared` event and true is
    /// returned. A missing utility or non-zero exit returns false; listener
    /// state is unaffected either way.
    pub fn clear_clipboard(&self) -> bool {
        let source = CommandSource::detect();
        self.clear_with(|| source.clear())
    }

    fn clear_with<F: FnOnce() -> Result<()>>(&self, clear: F) -> bool {
        match clear() {
            Ok(()) => {
                self.inner.publish(&ClipboardChangeEvent::cleared());
                true
            }
            Err(e) => {
                let error = ClipboardError::NativeCallFailure(format!("{:#}", e));
                log::error!("Failed to clear clipboard: {}", error);
                false
            }
        }
    }
}

impl PlatformListener<WindowsCapability> {
    /// Current clipboard bitmap as an owned PNG image, if one is present
    pub fn current_image(&self) -> Option<ClipboardImage> {
        match ArboardSource::new().read_image() {
            Ok(image) => image.map(ClipboardImage::from_bytes),
            Err(e) => {
                log::warn!("Failed to read clipboard bitmap: {:#}", e);
                None
            }
        }
    }
}
