//! Cancellable delayed notification.
//!
//! # State Machine
//!
//! ```text
//!            arm(Some(delay))            delay elapsed
//!   Idle ───────────────────► Armed ───────────────────► Idle (on_fire runs once)
//!    ▲  ▲                     │   │
//!    │  └──── cancel() ───────┘   │ arm(..) replaces the pending fire
//!    │                            ▼
//!    └──── arm(None): on_fire runs synchronously, never Armed
//! ```
//!
//! Each arm bumps a generation counter. The timer task only fires if the
//! generation it was armed with is still current when it takes the slot lock,
//! and it runs the callback before releasing that lock. `cancel()` bumps the
//! generation under the same lock, so once it returns the callback has either
//! already completed or will never run.
//!
//! The callback runs with the slot lock held: keep it short and never call
//! back into this notifier.

use log::debug;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    pending: Option<JoinHandle<()>>,
}

/// Single-slot debounce timer.
///
/// At most one fire is pending at any time; arming again restarts the delay
/// instead of stacking a second fire.
#[derive(Debug, Default)]
pub struct DebounceNotifier {
    slot: Arc<Mutex<Slot>>,
}

impl DebounceNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `on_fire` after `delay`, replacing any pending fire.
    ///
    /// With `None` the callback runs immediately on the calling thread and
    /// the notifier stays idle.
    ///
    /// # Panics
    /// Arming with a delay must happen inside a tokio runtime.
    pub fn arm<F>(&self, delay: Option<Duration>, on_fire: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut slot = self.slot.lock();
        slot.generation = slot.generation.wrapping_add(1);
        if let Some(previous) = slot.pending.take() {
            debug!("[Debounce] Replacing pending fire");
            previous.abort();
        }

        let Some(delay) = delay else {
            drop(slot);
            on_fire();
            return;
        };

        let generation = slot.generation;
        let shared = Arc::clone(&self.slot);
        // The slot lock is held until the handle is stored, so the timer
        // cannot observe a half-armed slot.
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            // on_fire runs under the slot lock so a concurrent cancel()
            // either wins outright or returns only after the fire is done.
            let mut slot = shared.lock();
            if slot.generation == generation {
                on_fire();
                slot.pending = None;
            }
        });
        slot.pending = Some(handle);
    }

    /// Drop the pending fire, if any. Returns `true` if one was pending.
    pub fn cancel(&self) -> bool {
        let mut slot = self.slot.lock();
        slot.generation = slot.generation.wrapping_add(1);
        match slot.pending.take() {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.slot.lock().pending.is_some()
    }
}
