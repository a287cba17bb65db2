use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::ClipboardListener;
use super::decoder::DEFAULT_MAX_PAYLOAD_BYTES;
use super::platform::{ListenerCapability, PlatformListener};
use crate::clipboard::{self, MIN_POLL_INTERVAL, NativeHook};
use crate::error::{ClipboardError, Result};
use crate::models::NotificationType;
use crate::storage::Config;

/// Operating systems with a listener implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Windows,
    Linux,
    MacOs,
}

impl Platform {
    /// Platform this binary was built for
    pub fn detect() -> Result<Self> {
        Self::from_os_name(std::env::consts::OS)
    }

    /// Map a `std::env::consts::OS` style name to a platform
    pub fn from_os_name(os: &str) -> Result<Self> {
        match os {
            "windows" => Ok(Platform::Windows),
            "linux" => Ok(Platform::Linux),
            "macos" => Ok(Platform::MacOs),
            other => Err(ClipboardError::PlatformUnsupported(other.to_string())),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Platform::Windows => "Windows",
            Platform::Linux => "Linux",
            Platform::MacOs => "macOS",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Settings applied to every listener a factory builds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerOptions {
    pub notification_type: NotificationType,
    pub verify_new_image_data: bool,
    pub max_payload_bytes: usize,
    pub poll_interval: Duration,
}

impl Default for ListenerOptions {
    fn default() -> Self {
        ListenerOptions {
            notification_type: NotificationType::default(),
            verify_new_image_data: false,
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
            poll_interval: Duration::from_millis(100),
        }
    }
}

impl From<&Config> for ListenerOptions {
    fn from(config: &Config) -> Self {
        let mut poll_interval = Duration::from_millis(config.polling.interval_ms);
        if poll_interval < MIN_POLL_INTERVAL {
            log::warn!(
                "polling.interval_ms = {} is too low, using {}ms",
                config.polling.interval_ms,
                MIN_POLL_INTERVAL.as_millis()
            );
            poll_interval = MIN_POLL_INTERVAL;
        }

        ListenerOptions {
            notification_type: config.general.notification_type,
            verify_new_image_data: config.general.verify_new_image_data,
            max_payload_bytes: config.general.max_payload_bytes,
            poll_interval,
        }
    }
}

/// Builds listeners for a detected (or given) platform
#[derive(Debug, Clone)]
pub struct ListenerFactory {
    platform: Platform,
    options: ListenerOptions,
}

impl ListenerFactory {
    /// Factory for the running OS; fails with `PlatformUnsupported` elsewhere
    pub fn detect(options: ListenerOptions) -> Result<Self> {
        let platform = Platform::detect()?;
        log::debug!("Detected platform: {}", platform);
        Ok(Self::for_platform(platform, options))
    }

    pub fn for_platform(platform: Platform, options: ListenerOptions) -> Self {
        ListenerFactory { platform, options }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn options(&self) -> &ListenerOptions {
        &self.options
    }

    /// Listener using the default native hook for the platform
    pub fn create(&self) -> ClipboardListener {
        let hook = clipboard::create_hook(self.platform, self.options.poll_interval);
        self.create_with_hook(hook)
    }

    /// Listener driven by a caller-supplied hook
    pub fn create_with_hook(&self, hook: Arc<dyn NativeHook>) -> ClipboardListener {
        ClipboardListener::new(self.platform, hook, &self.options)
    }

    /// Typed listener; fails with `UnsupportedCapability` if `C` is not
    /// the capability of the detected platform
    pub fn create_for<C: ListenerCapability>(&self) -> Result<PlatformListener<C>> {
        self.check_capability::<C>()?;
        Ok(PlatformListener::new(self.create()))
    }

    pub fn create_for_with_hook<C: ListenerCapability>(
        &self,
        hook: Arc<dyn NativeHook>,
    ) -> Result<PlatformListener<C>> {
        self.check_capability::<C>()?;
        Ok(PlatformListener::new(self.create_with_hook(hook)))
    }

    fn check_capability<C: ListenerCapability>(&self) -> Result<()> {
        if C::PLATFORM != self.platform {
            return Err(ClipboardError::UnsupportedCapability {
                requested: C::NAME,
                detected: self.platform.name(),
            });
        }
        Ok(())
    }
}

/// Listener for the running OS with default options
pub fn create_listener() -> Result<ClipboardListener> {
    Ok(ListenerFactory::detect(ListenerOptions::default())?.create())
}

/// Typed listener for the running OS with default options
pub fn create_listener_for<C: ListenerCapability>() -> Result<PlatformListener<C>> {
    ListenerFactory::detect(ListenerOptions::default())?.create_for::<C>()
}
