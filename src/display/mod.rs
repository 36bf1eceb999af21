//! Display awake/asleep state and the pieces that observe or change it.
//!
//! - `command`: the wake/sleep transition value shared by every ingress path
//! - `state`: the single awake flag
//! - `debounce`: the cancellable delayed sleep notification
//! - `control`: forcing the display to sleep or wake
//! - `watcher`: listening for the desktop's own sleep/wake signals

pub mod command;
pub mod control;
pub mod debounce;
mod screensaver;
pub mod state;
pub mod watcher;

pub use command::{Direction, Origin};
pub use control::{DisplayControl, ScreenSaverControl, UnavailableControl};
pub use debounce::DebounceNotifier;
pub use state::DisplayStateStore;
pub use watcher::DisplayWatcher;
