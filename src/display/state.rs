//! The single "is the display awake" flag.
//!
//! The store itself is not synchronized; the bridge keeps it behind the same
//! lock as the debounce timer so a transition and its timer update are one
//! atomic step.

/// Source of truth for the display's logical awake state.
///
/// Starts awake. Every write goes through [`set_state`](Self::set_state),
/// which is a no-op when the value does not change.
#[derive(Debug)]
pub struct DisplayStateStore {
    is_awake: bool,
}

impl DisplayStateStore {
    pub fn new() -> Self {
        Self { is_awake: true }
    }

    /// Record a new awake state. Returns `true` if it differed from the
    /// current one.
    pub fn set_state(&mut self, is_awake: bool) -> bool {
        if self.is_awake == is_awake {
            return false;
        }
        self.is_awake = is_awake;
        true
    }

    pub fn current_state(&self) -> bool {
        self.is_awake
    }
}

impl Default for DisplayStateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let store = DisplayStateStore::new();
        assert!(store.current_state());
    }

    #[test]
    fn test_set_state_reports_change() {
        let mut store = DisplayStateStore::new();

        // Already awake
        assert!(!store.set_state(true));

        assert!(store.set_state(false));
        assert!(!store.current_state());

        // Duplicate sleep
        assert!(!store.set_state(false));

        assert!(store.set_state(true));
        assert!(store.current_state());
    }
}
