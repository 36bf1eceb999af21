//! Outbound notifications to the home-automation SmartApp.
//!
//! Confirmed transitions are pushed onto an ordered queue
//! ([`NotifyQueue`]) and delivered one at a time by the
//! [`NotificationDispatcher`], so no remote call ever runs while the display
//! state is locked.

pub mod dispatcher;
pub mod notifier;

pub use dispatcher::{NotificationDispatcher, NotifyQueue};
pub use notifier::{RemoteNotifier, SmartAppNotifier, SmartAppRequest};
