//! Listens for the desktop's own display sleep/wake notifications.
//!
//! Subscribes to `org.freedesktop.ScreenSaver.ActiveChanged` on the session
//! bus and feeds each change into the bridge. This path only observes a
//! change that already happened, so it never touches the display itself.
//!
//! If the bus connection fails or the signal stream ends, the watcher
//! reconnects up to `MAX_RESTARTS` times; after that sleep/wake detection is
//! unavailable but the HTTP surface keeps working.

use super::command::{Direction, Origin};
use super::screensaver::ScreenSaverProxy;
use crate::bridge::DisplayBridge;
use crate::error::{BridgeError, Result};
use futures_util::StreamExt;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const MAX_RESTARTS: u8 = 3;
const RESTART_DELAY: Duration = Duration::from_secs(2);

/// Map a screensaver `Active` value to the transition it represents.
pub fn direction_for_active(active: bool) -> Direction {
    if active {
        Direction::Sleep
    } else {
        Direction::Wake
    }
}

/// Background task feeding screensaver signals into the bridge.
pub struct DisplayWatcher {
    bridge: Arc<DisplayBridge>,
    shutdown: CancellationToken,
}

impl DisplayWatcher {
    pub fn new(bridge: Arc<DisplayBridge>, shutdown: CancellationToken) -> Self {
        Self { bridge, shutdown }
    }

    /// Spawn the watcher. The task ends when `shutdown` is cancelled or the
    /// restart budget is exhausted.
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    async fn run(self) {
        let mut restarts = 0u8;

        loop {
            let result = tokio::select! {
                _ = self.shutdown.cancelled() => {
                    debug!("[Display] Watcher shutting down");
                    return;
                }
                result = self.watch() => result,
            };

            if let Err(e) = result {
                warn!("[Display] Sleep/wake monitor error: {}", e);
            }

            if restarts >= MAX_RESTARTS {
                warn!("[Display] Maximum restart attempts reached for sleep/wake monitor");
                warn!("[Display] Display sleep/wake detection will not be available");
                return;
            }
            restarts += 1;
            info!(
                "[Display] Will restart sleep/wake monitor (attempt {}/{})",
                restarts, MAX_RESTARTS
            );

            tokio::select! {
                _ = self.shutdown.cancelled() => return,
                _ = tokio::time::sleep(RESTART_DELAY) => {}
            }
        }
    }

    async fn watch(&self) -> Result<()> {
        let connection = zbus::Connection::session().await?;
        let proxy = ScreenSaverProxy::new(&connection).await?;
        let mut signals = proxy.receive_active_changed().await?;

        info!("[Display] Listening for screensaver sleep/wake signals");

        while let Some(signal) = signals.next().await {
            match signal.args() {
                Ok(args) => {
                    debug!("[Display] ActiveChanged({})", args.active);
                    let direction = direction_for_active(args.active);
                    match direction {
                        Direction::Sleep => info!("[Display] Display slept"),
                        Direction::Wake => info!("[Display] Display woke"),
                    }
                    self.bridge.apply(direction, Origin::System);
                }
                Err(e) => {
                    warn!("[Display] Failed to parse ActiveChanged signal: {}", e);
                }
            }
        }

        Err(BridgeError::DisplayBus(zbus::Error::Failure(
            "ActiveChanged signal stream ended".to_string(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_for_active() {
        assert_eq!(direction_for_active(true), Direction::Sleep);
        assert_eq!(direction_for_active(false), Direction::Wake);
    }
}
