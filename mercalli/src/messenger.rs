//! Communication channel from the map to the application UI.

/// Notifies the application that the map state has changed and it must be redrawn.
pub trait Messenger: Send + Sync {
    /// Requests redraw of the map.
    fn request_redraw(&self);
}

/// Messenger that does nothing.
pub struct DummyMessenger {}

impl Messenger for DummyMessenger {
    fn request_redraw(&self) {}
}
