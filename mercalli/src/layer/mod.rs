//! Map layers.
//!
//! A map consists of a set of layers, rendered one over another in their order in the
//! [`LayerCollection`](crate::map::LayerCollection). Layers that load their data
//! asynchronously are usually put into an `Arc<RwLock<_>>` so that the application can
//! keep a handle to them after they are added to the map.

use std::sync::Arc;

use parking_lot::RwLock;

mod attribution;
pub mod data_provider;
mod feature;
pub mod feature_layer;
pub mod raster_tile;
pub mod symbol;

pub use attribution::Attribution;
pub use feature::Feature;
pub use feature_layer::FeatureLayer;
pub use raster_tile::RasterTileLayer;

use crate::messenger::Messenger;
use crate::render::Canvas;
use crate::view::MapView;

/// A layer of the map.
pub trait Layer: Send + Sync {
    /// Renders the layer to the given canvas.
    fn render(&self, view: &MapView, canvas: &mut dyn Canvas);

    /// Prepares the layer for rendering with the given view, e.g. starts loading the
    /// data the layer needs.
    fn prepare(&self, view: &MapView);

    /// Sets the messenger the layer uses to notify the application that it needs to be
    /// redrawn.
    fn set_messenger(&mut self, messenger: Box<dyn Messenger>);

    /// Attribution of the layer data source, if any.
    fn attribution(&self) -> Option<Attribution>;
}

impl<T: Layer> Layer for Arc<RwLock<T>> {
    fn render(&self, view: &MapView, canvas: &mut dyn Canvas) {
        self.read().render(view, canvas)
    }

    fn prepare(&self, view: &MapView) {
        self.read().prepare(view)
    }

    fn set_messenger(&mut self, messenger: Box<dyn Messenger>) {
        self.write().set_messenger(messenger)
    }

    fn attribution(&self) -> Option<Attribution> {
        self.read().attribution()
    }
}

/// Layer that does nothing. Used in tests and documentation examples.
///
/// Reports its name as the attribution text so that it can be identified through a
/// `dyn Layer` reference.
#[cfg(feature = "_tests")]
pub struct TestLayer(pub &'static str);

#[cfg(feature = "_tests")]
impl Layer for TestLayer {
    fn render(&self, _view: &MapView, _canvas: &mut dyn Canvas) {}

    fn prepare(&self, _view: &MapView) {}

    fn set_messenger(&mut self, _messenger: Box<dyn Messenger>) {}

    fn attribution(&self) -> Option<Attribution> {
        Some(Attribution::new(self.0.to_string(), None))
    }
}
