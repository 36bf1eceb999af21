//! Transition commands.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// A requested display transition.
///
/// The string forms (`"wake"` / `"sleep"`) are the ones used on the wire,
/// both in `PUT /do` bodies and in SmartApp calls.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    Wake,
    Sleep,
}

impl Direction {
    pub fn from_awake(is_awake: bool) -> Self {
        if is_awake { Self::Wake } else { Self::Sleep }
    }

    /// The awake flag this direction leads to.
    pub fn is_awake(self) -> bool {
        matches!(self, Self::Wake)
    }
}

/// Where a transition came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Origin {
    /// Observed from the desktop's screensaver signals.
    #[strum(serialize = "system")]
    System,
    /// Requested through the HTTP control surface.
    #[strum(serialize = "http")]
    Http,
}
