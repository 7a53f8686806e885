//! Composition of the map and the state of one map session.
//!
//! [`compose`] builds the [`Map`] and a [`QuakeSession`] that owns handles to the data
//! layers in it. All later changes (switching base tiles, toggling overlays, opening
//! popups) go through the session, which keeps the dependent state consistent: the
//! legend follows the earthquake overlay, and the fault lines are recolored to stay
//! visible over the selected base tiles. Interested parties can
//! [`subscribe`](QuakeSession::subscribe) to be notified about these changes.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use mercalli::cartesian::Point2d;
use mercalli::control::{MapController, MapControllerConfiguration};
use mercalli::geo::{GeoPoint2d, Geom};
use mercalli::layer::data_provider::file_cache::{remove_parameters_modifier, FileCacheController};
use mercalli::layer::data_provider::UrlImageProvider;
use mercalli::layer::symbol::SimpleContourSymbol;
use mercalli::layer::{FeatureLayer, Layer, RasterTileLayer};
use mercalli::tile_schema::TileIndex;
use mercalli::{latlon, Color, Map, MapView, Messenger, TileSchema};
use parking_lot::RwLock;

use crate::config::QuakeMapConfig;
use crate::feed::Earthquake;
use crate::legend::{legend_entries, LegendEntry};
use crate::loader::LoadedData;
use crate::style::{marker_style, QuakeSymbol};
use crate::tiles::BaseTileSet;

const INITIAL_ZOOM: u32 = 3;
const MAX_ZOOM: u32 = 18;
const LOD_COUNT: u32 = MAX_ZOOM + 1;
const FAULT_LINE_WIDTH: f64 = 2.0;

type QuakeLayer = FeatureLayer<Earthquake, QuakeSymbol>;
type FaultLayer = FeatureLayer<Geom<GeoPoint2d>, SimpleContourSymbol>;
type BaseLayer = RasterTileLayer<UrlImageProvider<TileIndex>>;
type Subscriber = Box<dyn Fn(&SessionEvent) + Send + Sync>;

/// Data overlay that can be toggled on and off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    /// Tectonic plate boundary lines.
    FaultLines,
    /// Earthquake markers.
    Earthquakes,
}

/// Change applied to the map by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The base tile set was replaced.
    BaseTileSelected(BaseTileSet),
    /// An overlay became visible.
    OverlayShown(Overlay),
    /// An overlay was hidden.
    OverlayHidden(Overlay),
}

/// State of one earthquake map.
///
/// Holds typed handles to the layers created by [`compose`] and applies all user-driven
/// changes to the map. No-op requests (selecting the already active tile set, hiding a
/// hidden overlay) are ignored and do not notify subscribers.
pub struct QuakeSession {
    quake_layer: Arc<RwLock<QuakeLayer>>,
    fault_layer: Option<Arc<RwLock<FaultLayer>>>,
    base_index: usize,
    fault_index: Option<usize>,
    quake_index: usize,
    current_base: BaseTileSet,
    tile_schema: TileSchema,
    access_token: String,
    tile_cache_dir: PathBuf,
    legend: Vec<LegendEntry>,
    legend_visible: Arc<AtomicBool>,
    popup: Option<Earthquake>,
    messenger: Option<Arc<dyn Messenger>>,
    subscribers: Vec<Subscriber>,
}

/// Builds the full map: base tiles, fault lines and earthquake markers.
pub fn compose(data: LoadedData, config: &QuakeMapConfig) -> (Map, QuakeSession) {
    compose_with(
        data.earthquakes,
        Some(data.boundaries),
        BaseTileSet::Satellite,
        config,
    )
}

/// Builds the reduced map with earthquake markers over grayscale tiles.
pub fn compose_basic(earthquakes: Vec<Earthquake>, config: &QuakeMapConfig) -> (Map, QuakeSession) {
    compose_with(earthquakes, None, BaseTileSet::Grayscale, config)
}

fn compose_with(
    earthquakes: Vec<Earthquake>,
    boundaries: Option<Vec<Geom<GeoPoint2d>>>,
    base: BaseTileSet,
    config: &QuakeMapConfig,
) -> (Map, QuakeSession) {
    let tile_schema = TileSchema::web(LOD_COUNT);
    let resolution = tile_schema.lod_resolution(INITIAL_ZOOM).unwrap_or(1000.0);
    let view = MapView::new(latlon!(15.0, -15.0), resolution);

    let mut layers: Vec<Box<dyn Layer>> = vec![Box::new(build_base_tiles(
        base,
        &config.mapbox_access_token,
        &config.tile_cache_dir,
        tile_schema.clone(),
        None,
    ))];

    let fault_layer = boundaries.map(|lines| {
        Arc::new(RwLock::new(FeatureLayer::new(
            lines,
            SimpleContourSymbol::new(base.fault_line_color(), FAULT_LINE_WIDTH),
        )))
    });
    let mut fault_index = None;
    if let Some(layer) = &fault_layer {
        fault_index = Some(layers.len());
        layers.push(Box::new(layer.clone()));
    }

    let quake_layer = Arc::new(RwLock::new(FeatureLayer::new(earthquakes, QuakeSymbol)));
    let quake_index = layers.len();
    layers.push(Box::new(quake_layer.clone()));

    let map = Map::new(view, layers, None);

    let mut session = QuakeSession {
        quake_layer,
        fault_layer,
        base_index: 0,
        fault_index,
        quake_index,
        current_base: base,
        tile_schema,
        access_token: config.mapbox_access_token.clone(),
        tile_cache_dir: config.tile_cache_dir.clone(),
        legend: legend_entries(),
        legend_visible: Arc::new(AtomicBool::new(true)),
        popup: None,
        messenger: None,
        subscribers: vec![],
    };

    session.subscribe(legend_rule(session.legend_visible.clone()));
    if let Some(layer) = session.fault_layer.clone() {
        session.subscribe(fault_color_rule(layer));
    }

    (map, session)
}

/// The legend is only meaningful while the markers it describes are on the screen.
fn legend_rule(visible: Arc<AtomicBool>) -> impl Fn(&SessionEvent) + Send + Sync {
    move |event| match event {
        SessionEvent::OverlayShown(Overlay::Earthquakes) => visible.store(true, Ordering::Relaxed),
        SessionEvent::OverlayHidden(Overlay::Earthquakes) => {
            visible.store(false, Ordering::Relaxed)
        }
        _ => {}
    }
}

/// Fault lines use a contrast color matched to the base tiles.
fn fault_color_rule(layer: Arc<RwLock<FaultLayer>>) -> impl Fn(&SessionEvent) + Send + Sync {
    move |event| {
        if let SessionEvent::BaseTileSelected(set) = event {
            let mut fault_layer = layer.write();
            fault_layer.symbol_mut().color = set.fault_line_color();
            fault_layer.request_redraw();
        }
    }
}

fn build_base_tiles(
    set: BaseTileSet,
    access_token: &str,
    cache_dir: &Path,
    tile_schema: TileSchema,
    messenger: Option<Arc<dyn Messenger>>,
) -> BaseLayer {
    let token = access_token.to_string();
    let url_source = move |index: &TileIndex| set.tile_url(*index, &token);

    // Tile URLs contain the access token, so cached file names are stripped of
    // query parameters.
    let provider =
        match FileCacheController::new(cache_dir, Some(Box::new(remove_parameters_modifier))) {
            Ok(cache) => UrlImageProvider::new_cached(url_source, cache),
            Err(error) => {
                log::warn!("Failed to create tile cache in {cache_dir:?}: {error}");
                UrlImageProvider::new(url_source)
            }
        };

    RasterTileLayer::new(tile_schema, provider, messenger).with_attribution(set.attribution())
}

impl QuakeSession {
    /// Registers a callback invoked after every change the session applies to the map.
    pub fn subscribe(&mut self, subscriber: impl Fn(&SessionEvent) + Send + Sync + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Sets the messenger given to layers the session creates when the map changes.
    pub fn set_messenger(&mut self, messenger: Arc<dyn Messenger>) {
        self.messenger = Some(messenger);
    }

    /// Map controller with zoom limits matching the tile schema.
    pub fn controller(&self) -> MapController {
        let mut config = MapControllerConfiguration::default();
        if let Some(resolution) = self.tile_schema.lod_resolution(INITIAL_ZOOM) {
            config.set_max_resolution(resolution);
        }
        if let Some(resolution) = self.tile_schema.lod_resolution(MAX_ZOOM) {
            config.set_min_resolution(resolution);
        }

        MapController::new(config)
    }

    /// The currently selected base tile set.
    pub fn base_tiles(&self) -> BaseTileSet {
        self.current_base
    }

    /// Replaces the base tile layer with the given tile set.
    pub fn select_base_tiles(&mut self, map: &mut Map, set: BaseTileSet) {
        if set == self.current_base {
            return;
        }

        let layer = build_base_tiles(
            set,
            &self.access_token,
            &self.tile_cache_dir,
            self.tile_schema.clone(),
            self.messenger.clone(),
        );
        map.layers_mut().remove(self.base_index);
        map.layers_mut().insert(self.base_index, layer);

        self.current_base = set;
        self.emit(SessionEvent::BaseTileSelected(set));
        map.redraw();
    }

    /// Returns `true` if the map contains the fault line overlay.
    pub fn has_fault_lines(&self) -> bool {
        self.fault_index.is_some()
    }

    /// Current color of the fault lines, if the map has them.
    pub fn fault_line_color(&self) -> Option<Color> {
        self.fault_layer
            .as_ref()
            .map(|layer| layer.read().symbol().color)
    }

    /// Shows or hides an overlay.
    pub fn set_overlay_visible(&mut self, map: &mut Map, overlay: Overlay, visible: bool) {
        let Some(index) = self.overlay_index(overlay) else {
            return;
        };

        if map.layers().is_visible(index) == visible {
            return;
        }

        if visible {
            map.layers_mut().show(index);
            self.emit(SessionEvent::OverlayShown(overlay));
        } else {
            map.layers_mut().hide(index);
            self.emit(SessionEvent::OverlayHidden(overlay));
        }

        map.redraw();
    }

    /// Returns `true` if the overlay is present on the map and not hidden.
    pub fn overlay_visible(&self, map: &Map, overlay: Overlay) -> bool {
        self.overlay_index(overlay)
            .is_some_and(|index| map.layers().is_visible(index))
    }

    fn overlay_index(&self, overlay: Overlay) -> Option<usize> {
        match overlay {
            Overlay::FaultLines => self.fault_index,
            Overlay::Earthquakes => Some(self.quake_index),
        }
    }

    /// Entries of the magnitude color legend.
    pub fn legend(&self) -> &[LegendEntry] {
        &self.legend
    }

    /// Returns `true` if the legend should be displayed.
    pub fn legend_visible(&self) -> bool {
        self.legend_visible.load(Ordering::Relaxed)
    }

    /// Finds the topmost earthquake marker under the given screen point.
    ///
    /// A marker is hit when the point is within its drawn radius, including the
    /// stroke. When markers overlap, the one drawn last wins.
    pub fn hit_test(&self, view: &MapView, screen_point: Point2d) -> Option<usize> {
        let layer = self.quake_layer.read();

        let max_radius = layer
            .features()
            .iter()
            .map(|quake| {
                let style = marker_style(quake.magnitude());
                style.radius + style.stroke_weight
            })
            .fold(0.0_f64, f64::max);

        layer
            .features_at(view, screen_point, max_radius)
            .into_iter()
            .filter(|hit| {
                let style = marker_style(hit.feature.magnitude());
                hit.distance <= style.radius + style.stroke_weight
            })
            .last()
            .map(|hit| hit.index)
    }

    /// Opens the popup for the earthquake at the given position in the feature list.
    pub fn open_popup(&mut self, index: usize) {
        self.popup = self.quake_layer.read().features().get(index).cloned();
    }

    /// Closes the earthquake popup.
    pub fn close_popup(&mut self) {
        self.popup = None;
    }

    /// The earthquake the popup is displayed for, if any.
    pub fn popup(&self) -> Option<&Earthquake> {
        self.popup.as_ref()
    }

    fn emit(&self, event: SessionEvent) {
        for subscriber in &self.subscribers {
            subscriber(&event);
        }
    }
}
