//! D-Bus proxy for the freedesktop screensaver interface.

/// `org.freedesktop.ScreenSaver` on the session bus.
///
/// `Active` is the blanked/locked state of the user's screens: it flips to
/// `true` when the display sleeps and back to `false` when it wakes.
#[zbus::proxy(
    interface = "org.freedesktop.ScreenSaver",
    default_service = "org.freedesktop.ScreenSaver",
    default_path = "/org/freedesktop/ScreenSaver",
    gen_blocking = false
)]
pub(crate) trait ScreenSaver {
    /// Request the screensaver be activated (`true`) or deactivated (`false`).
    /// Returns whether the request was honoured.
    fn set_active(&self, e: bool) -> zbus::Result<bool>;

    #[zbus(signal)]
    fn active_changed(&self, active: bool) -> zbus::Result<()>;
}
