//! User interaction with the map.
//!
//! Input handling is done in several steps:
//! 1. The UI backend converts its input events into the common [`RawUserEvent`] enum.
//! 2. `RawUserEvent` is given to the [`EventProcessor`], which converts it into
//!    [`UserEvent`]s. The processor keeps track of the input state (pointer position and
//!    pressed mouse buttons) and detects gestures such as clicks and drags.
//! 3. The processor gives the events to its list of [`UserEventHandler`]s, which change
//!    the state of the application based on them.
//!
//! To add its own interaction logic, the application provides an implementation of the
//! [`UserEventHandler`] trait and adds it to the processor's handler list before the
//! [`MapController`].

use crate::cartesian::{Point2d, Vector2d};
use crate::map::Map;

mod event_processor;
mod map;

pub use event_processor::EventProcessor;
pub use map::{MapController, MapControllerConfiguration};

/// User input handler.
pub trait UserEventHandler {
    /// Handles the event.
    fn handle(&self, event: &UserEvent, map: &mut Map) -> EventPropagation;
}

impl<T: for<'a> Fn(&'a UserEvent, &'a mut Map) -> EventPropagation> UserEventHandler for T {
    fn handle(&self, event: &UserEvent, map: &mut Map) -> EventPropagation {
        self(event, map)
    }
}

/// Raw user interaction event as reported by the UI backend.
///
/// This type does not provide any input state information. The state is tracked by the
/// [`EventProcessor`], which combines it with the raw events to produce [`UserEvent`]s.
pub enum RawUserEvent {
    /// A mouse button was pressed.
    ButtonPressed(MouseButton),
    /// A mouse button was released.
    ButtonReleased(MouseButton),
    /// Mouse pointer was moved to the given screen pixel position.
    PointerMoved(Point2d),
    /// Scroll was requested by a mouse wheel or a touch pad. The number is the number of
    /// lines that the event would scroll if it was scrolling a text.
    Scroll(f64),
}

/// User interaction event. This is the type the application works with through
/// [`UserEventHandler`]s.
#[derive(Debug, Clone)]
pub enum UserEvent {
    /// A mouse button was pressed.
    ButtonPressed(MouseButton, MouseEvent),
    /// A mouse button was released.
    ButtonReleased(MouseButton, MouseEvent),
    /// A mouse button was clicked. This event is fired right after the
    /// [`UserEvent::ButtonReleased`] event if the release happened shortly after the
    /// press.
    Click(MouseButton, MouseEvent),
    /// A double click was done. This event is fired right after the second
    /// [`UserEvent::Click`] event if the second click was done shortly after the first.
    DoubleClick(MouseButton, MouseEvent),
    /// Mouse pointer moved.
    PointerMoved(MouseEvent),
    /// Drag started: a mouse button is pressed and the pointer moved without the button
    /// being released.
    DragStarted(MouseButton, MouseEvent),
    /// Mouse pointer moved after [`UserEvent::DragStarted`] was consumed. The vector is
    /// the pointer movement in screen pixels since the last drag event.
    Drag(MouseButton, Vector2d, MouseEvent),
    /// Mouse button was released while dragging.
    DragEnded(MouseButton, MouseEvent),
    /// Scroll was requested. The number is the number of text lines the scroll is
    /// requested for.
    Scroll(f64, MouseEvent),
}

/// Value returned by a [`UserEventHandler`] to indicate what to do with the event next.
pub enum EventPropagation {
    /// Event should be propagated to the next handler.
    Propagate,
    /// Event should not be propagated to the next handler.
    Stop,
    /// Event should not be propagated to the next handler, and the current handler
    /// becomes the owner of the event. This is used to take ownership of the
    /// [`UserEvent::DragStarted`] event, so that all consequent drag events are only
    /// given to this handler.
    Consume,
}

/// Mouse button.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum MouseButton {
    /// Left mouse button.
    Left,
    /// Middle mouse button.
    Middle,
    /// Right mouse button.
    Right,
    /// Any other mouse button.
    Other,
}

/// State of the mouse at the moment of the event.
#[derive(Debug, Copy, Clone)]
pub struct MouseEvent {
    /// Pointer position on the screen in pixels from the top left corner.
    pub screen_pointer_position: Point2d,
    /// State of the mouse buttons.
    pub buttons: MouseButtonsState,
}

/// State of a mouse button.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MouseButtonState {
    /// Button is pressed.
    Pressed,
    /// Button is not pressed.
    Released,
}

/// State of all mouse buttons.
#[derive(Debug, Copy, Clone)]
pub struct MouseButtonsState {
    /// State of the left mouse button.
    pub left: MouseButtonState,
    /// State of the middle mouse button.
    pub middle: MouseButtonState,
    /// State of the right mouse button.
    pub right: MouseButtonState,
}

impl MouseButtonsState {
    pub(crate) fn set_pressed(&mut self, button: MouseButton) {
        self.set_state(button, MouseButtonState::Pressed);
    }

    pub(crate) fn set_released(&mut self, button: MouseButton) {
        self.set_state(button, MouseButtonState::Released);
    }

    fn set_state(&mut self, button: MouseButton, state: MouseButtonState) {
        match button {
            MouseButton::Left => self.left = state,
            MouseButton::Middle => self.middle = state,
            MouseButton::Right => self.right = state,
            MouseButton::Other => {}
        }
    }

    pub(crate) fn single_pressed(&self) -> Option<MouseButton> {
        let mut button = None;
        if self.left == MouseButtonState::Pressed && button.replace(MouseButton::Left).is_some() {
            return None;
        }
        if self.middle == MouseButtonState::Pressed && button.replace(MouseButton::Middle).is_some()
        {
            return None;
        }
        if self.right == MouseButtonState::Pressed && button.replace(MouseButton::Right).is_some() {
            return None;
        }

        button
    }
}

impl Default for MouseButtonsState {
    fn default() -> Self {
        Self {
            left: MouseButtonState::Released,
            middle: MouseButtonState::Released,
            right: MouseButtonState::Released,
        }
    }
}
