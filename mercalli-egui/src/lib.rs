//! This crate provides an egui widget displaying an interactive [mercalli](mercalli) map.
//!
//! Create an [`EguiMapState`] with the map you want to show, and call
//! [`EguiMapState::render`] from your application's `update` method. The widget draws
//! the map through the UI's painter and feeds pointer events back into the map
//! controls.
//!
//! With the `init` feature (enabled by default) the [`InitBuilder`] sets up logging, a
//! tokio runtime and an application window, so a complete map viewer takes just a few
//! lines:
//!
//! ```no_run
//! # fn map() -> mercalli::Map { unimplemented!() }
//! mercalli_egui::InitBuilder::new(map())
//!     .init()
//!     .expect("failed to initialize");
//! ```

#![warn(clippy::unwrap_used)]
#![warn(missing_docs)]

mod egui_map;

pub use egui_map::{EguiMap, EguiMapOptions, EguiMapState, MapStateMessenger};

#[cfg(feature = "init")]
mod init;

#[cfg(feature = "init")]
pub use init::InitBuilder;
