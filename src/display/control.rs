//! Forcing the display to sleep or wake.
//!
//! This is the side effect behind the HTTP `wake`/`sleep` commands. It is
//! best effort: a failure is reported to the caller for logging, but never
//! changes the recorded awake state.

use super::screensaver::ScreenSaverProxy;
use crate::error::{BridgeError, Result};
use async_trait::async_trait;
use log::{debug, info};

/// Hardware/OS action that puts the display to sleep or wakes it.
#[async_trait]
pub trait DisplayControl: Send + Sync {
    async fn set_display_asleep(&self, asleep: bool) -> Result<()>;
}

/// Controls the display through `org.freedesktop.ScreenSaver.SetActive`.
pub struct ScreenSaverControl {
    proxy: ScreenSaverProxy<'static>,
}

impl ScreenSaverControl {
    /// Connect to the session bus and bind the screensaver proxy.
    pub async fn connect() -> Result<Self> {
        let connection = zbus::Connection::session().await?;
        let proxy = ScreenSaverProxy::new(&connection).await?;
        info!("[Display] Connected to org.freedesktop.ScreenSaver");
        Ok(Self { proxy })
    }
}

#[async_trait]
impl DisplayControl for ScreenSaverControl {
    async fn set_display_asleep(&self, asleep: bool) -> Result<()> {
        debug!("[Display] SetActive({})", asleep);
        if self.proxy.set_active(asleep).await? {
            Ok(())
        } else {
            Err(BridgeError::HardwareAction(format!(
                "screensaver refused SetActive({asleep})"
            )))
        }
    }
}

/// Stand-in used when no display control is reachable or it was disabled.
/// Every call fails with the recorded reason.
pub struct UnavailableControl {
    reason: String,
}

impl UnavailableControl {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl DisplayControl for UnavailableControl {
    async fn set_display_asleep(&self, _asleep: bool) -> Result<()> {
        Err(BridgeError::HardwareAction(format!(
            "display control unavailable: {}",
            self.reason
        )))
    }
}
