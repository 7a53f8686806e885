//! Interactive map of the earthquakes reported by the USGS over the last day, shown
//! over Mapbox base tiles together with the tectonic plate boundaries.
//!
//! The crate is a library with two binaries on top of it:
//!
//! * `quake-map` loads both data sets in the background and provides the full UI: a
//!   base tile selector, overlay toggles, a magnitude color legend and popups with
//!   earthquake details.
//! * `quake-map-basic` displays only the earthquake markers over grayscale tiles.
//!
//! The map itself is rendered by the `mercalli` engine through the `mercalli-egui`
//! widget. This crate adds the earthquake domain on top of it: feed parsing
//! ([`feed`]), magnitude styling ([`classify`], [`style`], [`legend`]), document
//! loading ([`loader`]) and the session state that keeps the UI consistent while the
//! user changes the map ([`session`]).

#![warn(clippy::unwrap_used)]
#![warn(missing_docs)]

pub mod app;
pub mod classify;
pub mod config;
pub mod feed;
pub mod legend;
pub mod loader;
pub mod popup;
pub mod session;
pub mod style;
pub mod tiles;
