//! Ordered outbound queue and its delivery worker.

use super::notifier::RemoteNotifier;
use crate::config::SharedConfig;
use crate::display::Direction;
use crate::error::{BridgeError, Result};
use log::{error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Slack on top of the transport timeout before the worker gives up on a call.
const TIMEOUT_GRACE: Duration = Duration::from_secs(1);

/// Sending half of the outbound queue.
///
/// Pushing never blocks, so it is safe to do while holding the display
/// state lock; that keeps notifications in the same order as the
/// transitions that produced them.
#[derive(Debug, Clone)]
pub struct NotifyQueue {
    tx: mpsc::UnboundedSender<Direction>,
}

impl NotifyQueue {
    pub fn push(&self, direction: Direction) {
        if self.tx.send(direction).is_err() {
            warn!(
                "[SmartApp] Delivery worker stopped, dropping {} notification",
                direction
            );
        }
    }
}

/// Create the outbound queue. The receiver goes to a
/// [`NotificationDispatcher`].
pub fn channel() -> (NotifyQueue, mpsc::UnboundedReceiver<Direction>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (NotifyQueue { tx }, rx)
}

/// Drains the outbound queue and delivers each notification in order.
///
/// Failures are logged and dropped: the local state already reflects the
/// transition, and the SmartApp's health must never affect the daemon.
pub struct NotificationDispatcher {
    notifier: Arc<dyn RemoteNotifier>,
    rx: mpsc::UnboundedReceiver<Direction>,
    config: SharedConfig,
}

impl NotificationDispatcher {
    pub fn new(
        notifier: Arc<dyn RemoteNotifier>,
        rx: mpsc::UnboundedReceiver<Direction>,
        config: SharedConfig,
    ) -> Self {
        Self {
            notifier,
            rx,
            config,
        }
    }

    /// Spawn the delivery worker. It runs until every [`NotifyQueue`] is dropped.
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    async fn run(mut self) {
        info!("[SmartApp] Delivery worker started");

        while let Some(direction) = self.rx.recv().await {
            match self.deliver(direction).await {
                Ok(()) => {}
                Err(e @ BridgeError::ConfigMissing(_)) => {
                    warn!("[SmartApp] Skipping {} notification: {}", direction, e);
                }
                Err(e) => {
                    error!("[SmartApp] Failed to send {} notification: {}", direction, e);
                }
            }
        }

        info!("[SmartApp] Delivery worker stopped");
    }

    async fn deliver(&self, direction: Direction) -> Result<()> {
        let limit = self.config.snapshot().notify_timeout() + TIMEOUT_GRACE;
        match tokio::time::timeout(limit, self.notifier.notify(direction)).await {
            Ok(result) => result,
            Err(_) => Err(BridgeError::RemoteTimeout(limit)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<Direction>>,
        fail: bool,
    }

    #[async_trait]
    impl RemoteNotifier for Recorder {
        async fn notify(&self, direction: Direction) -> Result<()> {
            self.calls.lock().push(direction);
            if self.fail {
                Err(BridgeError::RemoteDelivery("connection refused".into()))
            } else {
                Ok(())
            }
        }
    }

    struct Hang;

    #[async_trait]
    impl RemoteNotifier for Hang {
        async fn notify(&self, _direction: Direction) -> Result<()> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_delivers_in_order() {
        let recorder = Arc::new(Recorder::default());
        let (queue, rx) = channel();
        let worker =
            NotificationDispatcher::new(recorder.clone(), rx, SharedConfig::default()).start();

        queue.push(Direction::Sleep);
        queue.push(Direction::Wake);
        queue.push(Direction::Sleep);
        drop(queue);

        worker.await.unwrap();
        assert_eq!(
            *recorder.calls.lock(),
            vec![Direction::Sleep, Direction::Wake, Direction::Sleep]
        );
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_worker() {
        let recorder = Arc::new(Recorder {
            fail: true,
            ..Default::default()
        });
        let (queue, rx) = channel();
        let worker =
            NotificationDispatcher::new(recorder.clone(), rx, SharedConfig::default()).start();

        queue.push(Direction::Wake);
        queue.push(Direction::Sleep);
        drop(queue);

        worker.await.unwrap();
        assert_eq!(recorder.calls.lock().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_call_times_out() {
        let (_queue, rx) = channel();
        let dispatcher = NotificationDispatcher::new(Arc::new(Hang), rx, SharedConfig::default());

        let err = dispatcher.deliver(Direction::Wake).await.unwrap_err();
        assert!(matches!(err, BridgeError::RemoteTimeout(_)));
    }

    #[test]
    fn test_push_after_worker_gone_is_harmless() {
        let (queue, rx) = channel();
        drop(rx);
        queue.push(Direction::Wake);
    }
}
