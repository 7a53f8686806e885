//! Map state: the set of layers to render and the viewport to render them through.

use std::time::{Duration, Instant};

use crate::cartesian::Size;
use crate::layer::Layer;
use crate::messenger::Messenger;
use crate::view::MapView;

mod layer_collection;

pub use layer_collection::LayerCollection;

const FRAME_DURATION: Duration = Duration::from_millis(16);

/// Map specifies a set of layers and the view that should be rendered.
pub struct Map {
    view: MapView,
    layers: LayerCollection,
    messenger: Option<Box<dyn Messenger>>,
    animation: Option<AnimationParameters>,
}

struct AnimationParameters {
    start_view: MapView,
    end_view: MapView,
    start_time: Instant,
    duration: Duration,
}

impl Map {
    /// Creates a new map.
    pub fn new(
        view: MapView,
        layers: Vec<Box<dyn Layer>>,
        messenger: Option<Box<dyn Messenger>>,
    ) -> Self {
        Self {
            view,
            layers: layers.into(),
            messenger,
            animation: None,
        }
    }

    /// Current view of the map.
    pub fn view(&self) -> &MapView {
        &self.view
    }

    /// Returns the list of map's layers.
    pub fn layers(&self) -> &LayerCollection {
        &self.layers
    }

    /// Returns a mutable reference to the list of map's layers.
    pub fn layers_mut(&mut self) -> &mut LayerCollection {
        &mut self.layers
    }

    /// Changes the view of the map to the given one.
    pub fn set_view(&mut self, view: MapView) {
        self.view = view;
        if let Some(messenger) = &self.messenger {
            messenger.request_redraw();
        }
    }

    /// Requests redraw of the map.
    pub fn redraw(&self) {
        if let Some(messenger) = &self.messenger {
            messenger.request_redraw()
        }
    }

    /// Updates the view of the map before rendering in case [`Map::animate_to`] was
    /// called.
    pub fn animate(&mut self) {
        let Some(animation) = &self.animation else {
            return;
        };

        let k = Instant::now()
            .duration_since(animation.start_time)
            .as_millis() as f64
            / animation.duration.as_millis() as f64;

        if k >= 1.0 {
            if let Some(animation) = self.animation.take() {
                self.view = animation.end_view;
            }
        } else {
            self.view = animation.start_view.interpolate(animation.end_view, k);
        }

        self.redraw();
    }

    /// Target view of the current animation, or the current view if no animation is in
    /// progress.
    pub fn target_view(&self) -> &MapView {
        self.animation
            .as_ref()
            .map(|animation| &animation.end_view)
            .unwrap_or(&self.view)
    }

    /// Requests a gradual change of the map view to the specified view.
    pub fn animate_to(&mut self, target: MapView, duration: Duration) {
        // Start the animation one frame in the past so that the first call to
        // `animate()` already moves the view.
        let now = Instant::now();
        self.animation = Some(AnimationParameters {
            start_view: self.view,
            end_view: target,
            start_time: now.checked_sub(FRAME_DURATION).unwrap_or(now),
            duration,
        });
    }

    /// Sets the size of the map viewport.
    pub fn set_size(&mut self, new_size: Size) {
        self.view = self.view.with_size(new_size);
    }

    /// Starts loading the data the visible layers need to display the current view.
    pub fn load_layers(&self) {
        for layer in self.layers.iter_visible() {
            layer.prepare(&self.view);
        }
    }

    /// Sets the new event messenger for the map.
    pub fn set_messenger(&mut self, messenger: Option<impl Messenger + 'static>) {
        self.messenger = match messenger {
            Some(messenger) => Some(Box::new(messenger)),
            None => None,
        };
    }
}
