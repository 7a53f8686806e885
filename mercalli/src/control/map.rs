use std::time::Duration;

use crate::control::{EventPropagation, MouseButton, UserEvent, UserEventHandler};
use crate::map::Map;
use crate::view::MapView;

const DEFAULT_ZOOM_DURATION: Duration = Duration::from_millis(50);

/// Configuration of a [`MapController`].
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct MapControllerConfiguration {
    zoom_duration: Duration,
    zoom_speed: f64,
    min_resolution: f64,
    max_resolution: f64,
}

impl Default for MapControllerConfiguration {
    fn default() -> Self {
        Self {
            zoom_duration: DEFAULT_ZOOM_DURATION,
            zoom_speed: 0.2,
            max_resolution: 156543.03392800014 / 8.0,
            min_resolution: 156543.03392800014 / 8.0 / 2.0f64.powi(16),
        }
    }
}

impl MapControllerConfiguration {
    /// Duration of the zoom animation when mouse wheel is turned.
    pub fn zoom_duration(&self) -> Duration {
        self.zoom_duration
    }

    /// Sets duration of the zoom animation when mouse wheel is turned.
    pub fn with_zoom_duration(mut self, duration: Duration) -> Self {
        self.zoom_duration = duration;
        self
    }

    /// Sets duration of the zoom animation when mouse wheel is turned.
    pub fn set_zoom_duration(&mut self, duration: Duration) {
        self.zoom_duration = duration;
    }

    /// Magnitude of the zoom on every mouse wheel turn.
    ///
    /// For example, the value of `0.2` means that every time the mouse wheel is turned,
    /// the map will be zoomed by 0.2 times.
    pub fn zoom_speed(&self) -> f64 {
        self.zoom_speed
    }

    /// Sets magnitude of the zoom on every mouse wheel turn.
    pub fn with_zoom_speed(mut self, speed: f64) -> Self {
        self.zoom_speed = speed;
        self
    }

    /// Sets magnitude of the zoom on every mouse wheel turn.
    pub fn set_zoom_speed(&mut self, speed: f64) {
        self.zoom_speed = speed;
    }

    /// Maximum allowed resolution.
    pub fn max_resolution(&self) -> f64 {
        self.max_resolution
    }

    /// Sets maximum allowed resolution.
    pub fn with_max_resolution(mut self, resolution: f64) -> Self {
        self.max_resolution = resolution;
        self
    }

    /// Sets maximum allowed resolution.
    pub fn set_max_resolution(&mut self, resolution: f64) {
        self.max_resolution = resolution;
    }

    /// Minimum allowed resolution.
    pub fn min_resolution(&self) -> f64 {
        self.min_resolution
    }

    /// Sets minimum allowed resolution.
    pub fn with_min_resolution(mut self, resolution: f64) -> Self {
        self.min_resolution = resolution;
        self
    }

    /// Sets minimum allowed resolution.
    pub fn set_min_resolution(&mut self, resolution: f64) {
        self.min_resolution = resolution;
    }
}

/// Event handler of a map, providing panning and zooming capabilities.
#[derive(Default, Copy, Clone, PartialEq, Debug)]
pub struct MapController {
    config: MapControllerConfiguration,
}

impl MapController {
    /// Creates a new instance of `MapController` with the given configuration.
    pub fn new(config: MapControllerConfiguration) -> Self {
        Self { config }
    }

    /// Returns the current configuration of the controller.
    pub fn config(&self) -> MapControllerConfiguration {
        self.config
    }

    /// Updates the configuration of the controller.
    pub fn set_config(&mut self, config: MapControllerConfiguration) {
        self.config = config;
    }
}

impl UserEventHandler for MapController {
    fn handle(&self, event: &UserEvent, map: &mut Map) -> EventPropagation {
        match event {
            UserEvent::DragStarted(button, _)
                if *button == MouseButton::Left || *button == MouseButton::Other =>
            {
                EventPropagation::Consume
            }
            UserEvent::Drag(button, delta, e) => match button {
                MouseButton::Left | MouseButton::Other => {
                    let current_position = e.screen_pointer_position;
                    let prev_position = current_position - *delta;

                    let target = map
                        .view()
                        .translate_by_pixels(prev_position, current_position);

                    map.set_view(self.adjust_target_view(target));
                    EventPropagation::Stop
                }
                _ => EventPropagation::Propagate,
            },
            UserEvent::Scroll(delta, mouse_event) => {
                let zoom = self.get_zoom(*delta);
                let target = map
                    .target_view()
                    .zoom(zoom, mouse_event.screen_pointer_position);
                let adjusted = self.adjust_target_view(target);
                map.animate_to(adjusted, self.config.zoom_duration);

                EventPropagation::Stop
            }
            _ => EventPropagation::Propagate,
        }
    }
}

impl MapController {
    fn get_zoom(&self, delta: f64) -> f64 {
        (self.config.zoom_speed + 1.0).powf(-delta)
    }

    fn adjust_target_view(&self, mut target: MapView) -> MapView {
        if target.resolution() < self.config.min_resolution {
            target = target.with_resolution(self.config.min_resolution);
        }

        if target.resolution() > self.config.max_resolution {
            target = target.with_resolution(self.config.max_resolution);
        }

        target
    }
}
