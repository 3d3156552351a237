//! Application state shared across all request handlers.

use chatdraw_core::processors::CoordinatorHandle;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around; the handle wraps an mpsc
/// sender.
#[derive(Clone)]
pub struct AppState {
    /// Control commands and feed subscriptions go through the coordinator.
    pub coordinator: CoordinatorHandle,
}

impl AppState {
    pub fn new(coordinator: CoordinatorHandle) -> Self {
        Self { coordinator }
    }
}
