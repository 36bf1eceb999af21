//! Display state synchronization.
//!
//! [`DisplayBridge`] owns the awake flag and the sleep debounce timer behind a
//! single lock, and is the only way either ingress path (screensaver signals
//! and HTTP commands) can change them. Every transition goes through
//! [`DisplayBridge::apply`]:
//!
//! 1. record the new state; a no-op if it is unchanged
//! 2. on sleep, arm the debounce timer to queue a `sleep` notification
//! 3. on wake, cancel any pending sleep and queue a `wake` notification now
//!
//! Notifications are queued, never sent, under the lock; the remote call
//! happens on the delivery worker.

use crate::config::SharedConfig;
use crate::display::{DebounceNotifier, Direction, DisplayControl, DisplayStateStore, Origin};
use crate::remote::NotifyQueue;
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::sync::Arc;

/// Outcome of a transition request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Whether the request changed the recorded state.
    pub changed: bool,
    /// Recorded state after the request.
    pub is_awake: bool,
}

struct AwakeState {
    store: DisplayStateStore,
    debounce: DebounceNotifier,
}

/// Single owner of the display's awake state.
pub struct DisplayBridge {
    state: Mutex<AwakeState>,
    queue: NotifyQueue,
    config: SharedConfig,
    control: Arc<dyn DisplayControl>,
}

impl DisplayBridge {
    /// Create the bridge in the awake state.
    pub fn new(config: SharedConfig, control: Arc<dyn DisplayControl>, queue: NotifyQueue) -> Self {
        Self {
            state: Mutex::new(AwakeState {
                store: DisplayStateStore::new(),
                debounce: DebounceNotifier::new(),
            }),
            queue,
            config,
            control,
        }
    }

    pub fn is_awake(&self) -> bool {
        self.state.lock().store.current_state()
    }

    /// Whether a debounced sleep notification is waiting to fire.
    pub fn is_sleep_pending(&self) -> bool {
        self.state.lock().debounce.is_armed()
    }

    /// Apply a transition that has already happened (or been requested).
    pub fn apply(&self, direction: Direction, origin: Origin) -> Transition {
        let mut state = self.state.lock();

        if !state.store.set_state(direction.is_awake()) {
            debug!(
                "[Bridge] {} from {} ignored, display already {}",
                direction,
                origin,
                if direction.is_awake() { "awake" } else { "asleep" }
            );
            return Transition {
                changed: false,
                is_awake: state.store.current_state(),
            };
        }

        match direction {
            Direction::Sleep => {
                let delay = self.config.sleep_delay();
                match delay {
                    Some(delay) => info!(
                        "[Bridge] Display asleep ({}); arming timer for {}s to notify SmartApp",
                        origin,
                        delay.as_secs()
                    ),
                    None => info!(
                        "[Bridge] Display asleep ({}); notifying SmartApp now",
                        origin
                    ),
                }
                let queue = self.queue.clone();
                state
                    .debounce
                    .arm(delay, move || queue.push(Direction::Sleep));
            }
            Direction::Wake => {
                if state.debounce.cancel() {
                    info!("[Bridge] Display awake ({}); cancelled pending sleep notification", origin);
                } else {
                    info!("[Bridge] Display awake ({}); notifying SmartApp", origin);
                }
                self.queue.push(Direction::Wake);
            }
        }

        Transition {
            changed: true,
            is_awake: direction.is_awake(),
        }
    }

    /// Force the display to `direction` and record it.
    ///
    /// The display is only touched when the request differs from the recorded
    /// state. A failed display action is logged and the request is still
    /// recorded: the state tracks intent, not the panel.
    pub async fn command(&self, direction: Direction) -> Transition {
        if self.is_awake() == direction.is_awake() {
            debug!("[Bridge] {} requested, display already in that state", direction);
            return Transition {
                changed: false,
                is_awake: direction.is_awake(),
            };
        }

        // The display call happens outside the lock, so two identical
        // requests racing here may both reach the panel. Only one of them is
        // recorded and notified; `apply` de-duplicates the transition.
        if let Err(e) = self
            .control
            .set_display_asleep(!direction.is_awake())
            .await
        {
            warn!("[Bridge] Could not {} display: {}", direction, e);
        }

        self.apply(direction, Origin::Http)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SmartAppConfig;
    use crate::display::UnavailableControl;
    use crate::remote::dispatcher;
    use std::time::Duration;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn bridge(sleep_delay: Option<i64>) -> (DisplayBridge, UnboundedReceiver<Direction>) {
        let config = SharedConfig::new(SmartAppConfig {
            sleep_delay,
            ..Default::default()
        });
        let (queue, rx) = dispatcher::channel();
        let control = Arc::new(UnavailableControl::new("test"));
        (DisplayBridge::new(config, control, queue), rx)
    }

    #[test]
    fn test_starts_awake() {
        let (bridge, mut rx) = bridge(None);
        assert!(bridge.is_awake());
        assert!(!bridge.is_sleep_pending());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_wake_when_awake_is_noop() {
        let (bridge, mut rx) = bridge(Some(5));
        let transition = bridge.apply(Direction::Wake, Origin::System);
        assert_eq!(
            transition,
            Transition {
                changed: false,
                is_awake: true
            }
        );
        assert!(!bridge.is_sleep_pending());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_sleep_without_delay_notifies_immediately() {
        let (bridge, mut rx) = bridge(Some(0));
        let transition = bridge.apply(Direction::Sleep, Origin::System);
        assert!(transition.changed);
        assert!(!transition.is_awake);
        assert!(!bridge.is_sleep_pending());
        assert_eq!(rx.try_recv().unwrap(), Direction::Sleep);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleep_with_delay_is_debounced() {
        let (bridge, mut rx) = bridge(Some(5));
        bridge.apply(Direction::Sleep, Origin::System);
        assert!(bridge.is_sleep_pending());
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(rx.try_recv().unwrap(), Direction::Sleep);
        assert!(!bridge.is_sleep_pending());
        assert!(!bridge.is_awake());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wake_cancels_pending_sleep() {
        let (bridge, mut rx) = bridge(Some(5));
        bridge.apply(Direction::Sleep, Origin::System);
        tokio::time::sleep(Duration::from_secs(2)).await;

        let transition = bridge.apply(Direction::Wake, Origin::System);
        assert!(transition.changed);
        assert!(!bridge.is_sleep_pending());
        assert_eq!(rx.try_recv().unwrap(), Direction::Wake);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_command_records_intent_when_control_fails() {
        let (bridge, mut rx) = bridge(None);

        let transition = bridge.command(Direction::Sleep).await;
        assert!(transition.changed);
        assert!(!bridge.is_awake());
        assert_eq!(rx.try_recv().unwrap(), Direction::Sleep);

        // Same request again is a full no-op
        let transition = bridge.command(Direction::Sleep).await;
        assert!(!transition.changed);
        assert!(rx.try_recv().is_err());
    }
}
