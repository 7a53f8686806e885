use std::time::{Duration, Instant};

use crate::cartesian::Point2d;
use crate::control::{
    EventPropagation, MouseButtonsState, MouseEvent, RawUserEvent, UserEvent, UserEventHandler,
};
use crate::map::Map;

const DRAG_THRESHOLD: f64 = 3.0;
const CLICK_TIMEOUT: Duration = Duration::from_millis(200);
const DBL_CLICK_TIMEOUT: Duration = Duration::from_millis(500);

/// Converts [`RawUserEvent`]s into [`UserEvent`]s and distributes them to the registered
/// handlers.
pub struct EventProcessor {
    handlers: Vec<Box<dyn UserEventHandler>>,
    pointer_position: Point2d,
    pointer_pressed_position: Point2d,

    buttons_state: MouseButtonsState,

    last_pressed_time: Option<Instant>,
    last_click_time: Option<Instant>,

    drag_target: Option<usize>,
}

impl Default for EventProcessor {
    fn default() -> Self {
        Self {
            handlers: vec![],
            pointer_position: Point2d::new(0.0, 0.0),
            pointer_pressed_position: Point2d::new(0.0, 0.0),
            buttons_state: Default::default(),
            last_pressed_time: None,
            last_click_time: None,
            drag_target: None,
        }
    }
}

impl EventProcessor {
    /// Adds a handler to the end of the handler list.
    pub fn add_handler(&mut self, handler: impl UserEventHandler + 'static) {
        self.handlers.push(Box::new(handler));
    }

    /// Adds an already boxed handler to the end of the handler list.
    pub fn add_handler_boxed(&mut self, handler: Box<dyn UserEventHandler>) {
        self.handlers.push(handler);
    }

    /// Returns true if a drag is currently in progress.
    pub fn is_dragging(&self) -> bool {
        self.drag_target.is_some()
    }

    /// Processes the raw event and gives the resulting user events to the handlers.
    pub fn handle(&mut self, event: RawUserEvent, map: &mut Map) {
        let Some(user_events) = self.process(event) else {
            return;
        };

        for user_event in user_events {
            let mut drag_start_target = None;

            let delta = self.pointer_position - self.pointer_pressed_position;
            let mouse_event = self.get_mouse_event();

            for (index, handler) in self.handlers.iter_mut().enumerate() {
                if matches!(user_event, UserEvent::Drag(..) | UserEvent::DragEnded(..)) {
                    if let Some(target) = &self.drag_target {
                        if index != *target {
                            continue;
                        }
                    } else {
                        continue;
                    }
                }

                match handler.handle(&user_event, map) {
                    EventPropagation::Propagate => {}
                    EventPropagation::Stop => break,
                    EventPropagation::Consume => {
                        if let UserEvent::DragStarted(button, _) = user_event {
                            drag_start_target = Some(index);
                            // The pointer has already moved past the drag threshold, so
                            // give the owner the movement it would otherwise lose.
                            handler.handle(&UserEvent::Drag(button, delta, mouse_event), map);
                        }

                        break;
                    }
                }
            }

            if drag_start_target.is_some() {
                self.drag_target = drag_start_target;
            }

            if matches!(user_event, UserEvent::DragEnded(..)) {
                self.drag_target = None;
            }
        }
    }

    fn process(&mut self, event: RawUserEvent) -> Option<Vec<UserEvent>> {
        let now = Instant::now();
        match event {
            RawUserEvent::ButtonPressed(button) => {
                self.buttons_state.set_pressed(button);
                self.last_pressed_time = Some(now);
                self.pointer_pressed_position = self.pointer_position;

                Some(vec![UserEvent::ButtonPressed(
                    button,
                    self.get_mouse_event(),
                )])
            }
            RawUserEvent::ButtonReleased(button) => {
                self.buttons_state.set_released(button);
                let mut events = vec![UserEvent::ButtonReleased(
                    button,
                    self.get_mouse_event(),
                )];

                let is_click = self
                    .last_pressed_time
                    .is_some_and(|pressed| now.duration_since(pressed) < CLICK_TIMEOUT);
                if is_click {
                    events.push(UserEvent::Click(button, self.get_mouse_event()));

                    if self
                        .last_click_time
                        .is_some_and(|clicked| now.duration_since(clicked) < DBL_CLICK_TIMEOUT)
                    {
                        events.push(UserEvent::DoubleClick(button, self.get_mouse_event()));
                    }

                    self.last_click_time = Some(now);
                }

                if self.drag_target.is_some() {
                    events.push(UserEvent::DragEnded(button, self.get_mouse_event()));
                }

                Some(events)
            }
            RawUserEvent::PointerMoved(position) => {
                let prev_position = self.pointer_position;
                self.pointer_position = position;

                let mut events = vec![UserEvent::PointerMoved(self.get_mouse_event())];
                if let Some(button) = self.buttons_state.single_pressed() {
                    let press_delta = position - self.pointer_pressed_position;
                    if self.drag_target.is_none()
                        && press_delta.x.abs() + press_delta.y.abs() > DRAG_THRESHOLD
                    {
                        events.push(UserEvent::DragStarted(
                            button,
                            self.get_mouse_event_pos(self.pointer_pressed_position),
                        ));
                    }

                    if self.drag_target.is_some() {
                        events.push(UserEvent::Drag(
                            button,
                            position - prev_position,
                            self.get_mouse_event(),
                        ));
                    }
                }

                Some(events)
            }
            RawUserEvent::Scroll(delta) => {
                Some(vec![UserEvent::Scroll(delta, self.get_mouse_event())])
            }
        }
    }

    fn get_mouse_event(&self) -> MouseEvent {
        self.get_mouse_event_pos(self.pointer_position)
    }

    fn get_mouse_event_pos(&self, screen_pointer_position: Point2d) -> MouseEvent {
        MouseEvent {
            screen_pointer_position,
            buttons: self.buttons_state,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::cartesian::Size;
    use crate::control::MouseButton;
    use crate::view::MapView;

    fn test_map() -> Map {
        let view = MapView::new_projected(Point2d::new(0.0, 0.0), 1.0)
            .with_size(Size::new(100.0, 100.0));
        Map::new(view, vec![], None)
    }

    struct Recorder {
        events: Rc<RefCell<Vec<&'static str>>>,
        consume_drags: bool,
    }

    impl Recorder {
        fn new(consume_drags: bool) -> (Self, Rc<RefCell<Vec<&'static str>>>) {
            let events = Rc::new(RefCell::new(vec![]));
            (
                Self {
                    events: events.clone(),
                    consume_drags,
                },
                events,
            )
        }
    }

    impl UserEventHandler for Recorder {
        fn handle(&self, event: &UserEvent, _map: &mut Map) -> EventPropagation {
            let name = match event {
                UserEvent::ButtonPressed(..) => "pressed",
                UserEvent::ButtonReleased(..) => "released",
                UserEvent::Click(..) => "click",
                UserEvent::DoubleClick(..) => "double_click",
                UserEvent::PointerMoved(..) => "moved",
                UserEvent::DragStarted(..) => "drag_started",
                UserEvent::Drag(..) => "drag",
                UserEvent::DragEnded(..) => "drag_ended",
                UserEvent::Scroll(..) => "scroll",
            };
            self.events.borrow_mut().push(name);

            if self.consume_drags && matches!(event, UserEvent::DragStarted(..)) {
                EventPropagation::Consume
            } else {
                EventPropagation::Propagate
            }
        }
    }

    #[test]
    fn click_is_fired_on_fast_release() {
        let mut processor = EventProcessor::default();
        let (recorder, events) = Recorder::new(false);
        processor.add_handler(recorder);

        let mut map = test_map();
        processor.handle(RawUserEvent::ButtonPressed(MouseButton::Left), &mut map);
        processor.handle(RawUserEvent::ButtonReleased(MouseButton::Left), &mut map);

        assert_eq!(*events.borrow(), vec!["pressed", "released", "click"]);
    }

    #[test]
    fn second_fast_click_is_a_double_click() {
        let mut processor = EventProcessor::default();
        let (recorder, events) = Recorder::new(false);
        processor.add_handler(recorder);

        let mut map = test_map();
        for _ in 0..2 {
            processor.handle(RawUserEvent::ButtonPressed(MouseButton::Left), &mut map);
            processor.handle(RawUserEvent::ButtonReleased(MouseButton::Left), &mut map);
        }

        assert_eq!(
            *events.borrow(),
            vec![
                "pressed",
                "released",
                "click",
                "pressed",
                "released",
                "click",
                "double_click"
            ]
        );
    }

    #[test]
    fn small_pointer_movement_does_not_start_drag() {
        let mut processor = EventProcessor::default();
        let (recorder, events) = Recorder::new(true);
        processor.add_handler(recorder);

        let mut map = test_map();
        processor.handle(RawUserEvent::ButtonPressed(MouseButton::Left), &mut map);
        processor.handle(
            RawUserEvent::PointerMoved(Point2d::new(1.0, 1.0)),
            &mut map,
        );
        assert!(!events.borrow().contains(&"drag_started"));

        processor.handle(
            RawUserEvent::PointerMoved(Point2d::new(5.0, 5.0)),
            &mut map,
        );
        assert!(events.borrow().contains(&"drag_started"));
    }

    #[test]
    fn drag_ends_on_button_release() {
        let mut processor = EventProcessor::default();
        let (recorder, events) = Recorder::new(true);
        processor.add_handler(recorder);

        let mut map = test_map();
        processor.handle(RawUserEvent::ButtonPressed(MouseButton::Left), &mut map);
        processor.handle(
            RawUserEvent::PointerMoved(Point2d::new(10.0, 0.0)),
            &mut map,
        );
        processor.handle(
            RawUserEvent::PointerMoved(Point2d::new(20.0, 0.0)),
            &mut map,
        );
        processor.handle(RawUserEvent::ButtonReleased(MouseButton::Left), &mut map);

        assert!(events.borrow().contains(&"drag_ended"));

        // A pointer move after the release must not produce drag events
        events.borrow_mut().clear();
        processor.handle(
            RawUserEvent::PointerMoved(Point2d::new(30.0, 0.0)),
            &mut map,
        );
        assert_eq!(*events.borrow(), vec!["moved"]);
    }

    #[test]
    fn drag_events_are_routed_to_the_consuming_handler() {
        let mut processor = EventProcessor::default();
        let (passive, passive_events) = Recorder::new(false);
        let (owner, owner_events) = Recorder::new(true);
        processor.add_handler(passive);
        processor.add_handler(owner);

        let mut map = test_map();
        processor.handle(RawUserEvent::ButtonPressed(MouseButton::Left), &mut map);
        processor.handle(
            RawUserEvent::PointerMoved(Point2d::new(10.0, 0.0)),
            &mut map,
        );
        processor.handle(
            RawUserEvent::PointerMoved(Point2d::new(20.0, 0.0)),
            &mut map,
        );

        assert!(!passive_events.borrow().contains(&"drag"));
        assert_eq!(
            owner_events
                .borrow()
                .iter()
                .filter(|name| **name == "drag")
                .count(),
            2
        );
    }
}
