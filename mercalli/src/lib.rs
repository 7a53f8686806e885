//! Mercalli is a map rendering engine for interactive geographic applications. It
//! supports raster tile layers and feature layers with flexible styling, and renders
//! through a painter abstraction so it can be embedded into any UI toolkit that can
//! draw images, circles and lines.
//!
//! # Quick start
//!
//! A map with an OSM base layer and one blue marker:
//!
//! ```no_run
//! use mercalli::geo::Geom;
//! use mercalli::layer::data_provider::UrlImageProvider;
//! use mercalli::layer::symbol::CirclePointSymbol;
//! use mercalli::layer::{FeatureLayer, RasterTileLayer};
//! use mercalli::tile_schema::TileIndex;
//! use mercalli::{latlon, Color, Map, MapView, TileSchema};
//!
//! let schema = TileSchema::web(18);
//! let provider = UrlImageProvider::new(|index: &TileIndex| {
//!     format!(
//!         "https://tile.openstreetmap.org/{}/{}/{}.png",
//!         index.z, index.x, index.y
//!     )
//! });
//! let tiles = RasterTileLayer::new(schema.clone(), provider, None);
//!
//! let markers = FeatureLayer::new(
//!     vec![Geom::Point(latlon!(37.566, 126.9784))],
//!     CirclePointSymbol::new(Color::BLUE, 5.0),
//! );
//!
//! let resolution = schema.lod_resolution(8).unwrap_or(1000.0);
//! let map = Map::new(
//!     MapView::new(latlon!(37.566, 126.9784), resolution),
//!     vec![Box::new(tiles), Box::new(markers)],
//!     None,
//! );
//! ```
//!
//! The map by itself does not create a window or process user input. Embedding it into
//! an `egui` application, including window creation and input handling, is done by the
//! `mercalli-egui` crate.
//!
//! # Main components
//!
//! Everything in a mapping library revolves around the
//!
//! * [`Map`] struct, which is quite simple by itself and contains only the currently
//!   displayed [`MapView`], inner state such as animation parameters, and a set of
//! * [`layers`](layer) that actually contain data and know how it should be displayed.
//!   The layers draw themselves to a
//! * [`Canvas`](render::Canvas), which is implemented by the embedding application over
//!   whatever drawing facilities its UI stack provides.
//!
//! Nothing of the above deals with user interactions. You can think of the map with its
//! layers as a map you hang on your wall. In case the user is supposed to interact with
//! the map, you would also need the
//!
//! * [`EventProcessor`](control::EventProcessor) to convert raw UI events into a more
//!   convenient representation, and some
//! * [`controls`](control) that change the state of the map or layers based on the user
//!   input.

#![warn(clippy::unwrap_used)]
#![warn(missing_docs)]

pub mod cartesian;
mod color;
pub mod control;
pub mod error;
pub mod geo;
#[cfg(feature = "geojson")]
pub mod geojson;
pub mod layer;
mod lod;
pub mod map;
mod messenger;
pub mod render;
pub mod tile_schema;
mod view;

pub use color::Color;
pub use layer::symbol;
pub use lod::Lod;
pub use map::{LayerCollection, Map};
pub use messenger::{DummyMessenger, Messenger};
pub use tile_schema::TileSchema;
pub use view::MapView;
