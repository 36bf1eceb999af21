//! Display Wake Bridge library.
//!
//! Keeps a single "is the display awake" flag in sync between the desktop's
//! screensaver signals, an HTTP control surface, and a home-automation
//! SmartApp that is told about every confirmed transition. Sleeps are
//! debounced so a brief blank does not reach the SmartApp; wakes are
//! reported immediately.

pub mod bridge;
pub mod config;
pub mod display;
pub mod error;
pub mod http;
pub mod instance_lock;
pub mod remote;

pub use bridge::{DisplayBridge, Transition};
pub use error::{BridgeError, Result};
