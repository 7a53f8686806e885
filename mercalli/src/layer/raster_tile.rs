//! Layer displaying a prerendered tile set.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use quick_cache::sync::Cache;

use crate::cartesian::{Point2d, Rect};
use crate::layer::data_provider::DataProvider;
use crate::layer::{Attribution, Layer};
use crate::messenger::Messenger;
use crate::render::{Canvas, DecodedImage};
use crate::tile_schema::{TileIndex, TileSchema};
use crate::view::MapView;

const TILE_CACHE_CAPACITY: usize = 5000;

/// Raster tile layers load prerendered tile sets using a [`DataProvider`] and render
/// them to the map.
///
/// Tiles are loaded in background tasks. While a tile is being loaded, the layer
/// substitutes it with already loaded tiles of other zoom levels covering the same
/// area, so zooming does not leave holes in the map.
pub struct RasterTileLayer<P>
where
    P: DataProvider<TileIndex, DecodedImage>,
{
    tile_provider: Arc<P>,
    tile_schema: TileSchema,
    fade_in_duration: Duration,
    tiles: Arc<Cache<TileIndex, Arc<TileState>>>,
    prev_drawn_tiles: Mutex<Vec<TileIndex>>,
    messenger: Option<Arc<dyn Messenger>>,
    attribution: Option<Attribution>,
}

enum TileState {
    Loading,
    Loaded(LoadedTile),
    Error,
}

struct LoadedTile {
    image: DecodedImage,
    first_drawn: Mutex<Option<Instant>>,
}

impl<P> RasterTileLayer<P>
where
    P: DataProvider<TileIndex, DecodedImage>,
{
    /// Creates a new layer.
    pub fn new(
        tile_schema: TileSchema,
        tile_provider: P,
        messenger: Option<Arc<dyn Messenger>>,
    ) -> Self {
        Self {
            tile_provider: Arc::new(tile_provider),
            tile_schema,
            fade_in_duration: Duration::from_millis(300),
            tiles: Arc::new(Cache::new(TILE_CACHE_CAPACITY)),
            prev_drawn_tiles: Mutex::new(vec![]),
            messenger,
            attribution: None,
        }
    }

    /// Sets the attribution to be displayed for the layer.
    pub fn with_attribution(mut self, attribution: Attribution) -> Self {
        self.attribution = Some(attribution);
        self
    }

    /// Sets fade in duration for newly loaded tiles.
    pub fn set_fade_in_duration(&mut self, duration: Duration) {
        self.fade_in_duration = duration;
    }

    /// Tile schema of the layer.
    pub fn tile_schema(&self) -> &TileSchema {
        &self.tile_schema
    }

    fn get_tiles_to_draw(&self, view: &MapView) -> Vec<(TileIndex, Arc<TileState>)> {
        let mut tiles = vec![];
        let Some(tile_iter) = self.tile_schema.iter_tiles(view) else {
            return vec![];
        };

        let now = Instant::now();
        let mut to_substitute = vec![];
        for index in tile_iter {
            match self.tiles.get(&index) {
                None => to_substitute.push(index),
                Some(tile_state) => match &*tile_state {
                    TileState::Loaded(tile) => {
                        if !self.is_opaque(tile, now) {
                            to_substitute.push(index);
                        }

                        tiles.push((index, tile_state.clone()));
                    }
                    _ => to_substitute.push(index),
                },
            }
        }

        let prev_drawn = self.prev_drawn_tiles.lock();
        let mut substitute_indices: HashSet<_> = tiles.iter().map(|(index, _)| *index).collect();
        let mut substitute_tiles = vec![];
        for index in to_substitute {
            let mut substituted = false;
            let mut current = index;

            while let Some(subst) = self.tile_schema.get_substitutes(current) {
                let mut all_loaded = true;
                for substitute_index in subst {
                    current = substitute_index;

                    match self.tiles.get(&substitute_index) {
                        Some(state) if matches!(&*state, TileState::Loaded(_)) => {
                            if substitute_indices.insert(substitute_index) {
                                substitute_tiles.push((substitute_index, state));
                            }
                        }
                        _ => all_loaded = false,
                    }
                }

                if all_loaded {
                    substituted = true;
                    break;
                }
            }

            if !substituted {
                let Some(required_bbox) = self.tile_schema.tile_bbox(index) else {
                    continue;
                };
                for prev in prev_drawn.iter() {
                    let Some(prev_bbox) = self.tile_schema.tile_bbox(*prev) else {
                        continue;
                    };
                    if substitute_indices.contains(prev) || !prev_bbox.intersects(required_bbox) {
                        continue;
                    }

                    let Some(state) = self.tiles.get(prev) else {
                        continue;
                    };
                    if matches!(&*state, TileState::Loaded(_)) {
                        substitute_indices.insert(*prev);
                        substitute_tiles.push((*prev, state));
                    }
                }
            }
        }

        substitute_tiles.sort_unstable_by(|(index_a, _), (index_b, _)| index_a.z.cmp(&index_b.z));
        substitute_tiles.append(&mut tiles);
        substitute_tiles.dedup_by(|a, b| a.0 == b.0);
        substitute_tiles
    }

    fn is_opaque(&self, tile: &LoadedTile, now: Instant) -> bool {
        self.tile_opacity(tile, now) == 255
    }

    fn tile_opacity(&self, tile: &LoadedTile, now: Instant) -> u8 {
        if self.fade_in_duration.is_zero() {
            return 255;
        }

        match *tile.first_drawn.lock() {
            None => 0,
            Some(first_drawn) => {
                let elapsed = now.duration_since(first_drawn).as_secs_f64();
                ((elapsed / self.fade_in_duration.as_secs_f64()).min(1.0) * 255.0) as u8
            }
        }
    }

    fn screen_rect(&self, view: &MapView, index: TileIndex) -> Option<Rect> {
        let tile_bbox = self.tile_schema.tile_bbox(index)?;
        let top_left = view.map_to_screen(Point2d::new(tile_bbox.x_min(), tile_bbox.y_max()));
        let bottom_right = view.map_to_screen(Point2d::new(tile_bbox.x_max(), tile_bbox.y_min()));

        if top_left.x.is_finite()
            && top_left.y.is_finite()
            && bottom_right.x.is_finite()
            && bottom_right.y.is_finite()
        {
            Some(Rect::new(
                top_left.x,
                top_left.y,
                bottom_right.x,
                bottom_right.y,
            ))
        } else {
            None
        }
    }

    async fn load_tile(
        index: TileIndex,
        tile_provider: Arc<P>,
        tiles: &Cache<TileIndex, Arc<TileState>>,
        messenger: Option<Arc<dyn Messenger>>,
    ) {
        match tiles.get_value_or_guard_async(&index).await {
            Ok(_) => {}
            Err(guard) => {
                let _ = guard.insert(Arc::new(TileState::Loading));
                let load_result = tile_provider.load(&index).await;

                match load_result {
                    Ok(decoded_image) => {
                        tiles.insert(
                            index,
                            Arc::new(TileState::Loaded(LoadedTile {
                                image: decoded_image,
                                first_drawn: Mutex::new(None),
                            })),
                        );

                        if let Some(messenger) = messenger {
                            messenger.request_redraw();
                        }
                    }
                    Err(_) => tiles.insert(index, Arc::new(TileState::Error)),
                }
            }
        }
    }

    /// Preload tiles for the given `view`.
    pub async fn load_tiles(&self, view: &MapView) {
        if let Some(iter) = self.tile_schema.iter_tiles(view) {
            for index in iter {
                let tile_provider = self.tile_provider.clone();
                let tiles = self.tiles.clone();
                let messenger = self.messenger.clone();
                Self::load_tile(index, tile_provider, &tiles, messenger).await;
            }
        }
    }
}

impl<P> Layer for RasterTileLayer<P>
where
    P: DataProvider<TileIndex, DecodedImage> + 'static,
{
    fn render(&self, view: &MapView, canvas: &mut dyn Canvas) {
        let tiles = self.get_tiles_to_draw(view);

        let now = Instant::now();
        let mut requires_redraw = false;
        for (index, state) in &tiles {
            let TileState::Loaded(tile) = &**state else {
                continue;
            };
            let Some(rect) = self.screen_rect(view, *index) else {
                continue;
            };

            tile.first_drawn.lock().get_or_insert(now);

            let opacity = self.tile_opacity(tile, now);
            if opacity < 255 {
                requires_redraw = true;
            }

            canvas.draw_image(&tile.image, rect, opacity);
        }

        *self.prev_drawn_tiles.lock() = tiles.iter().map(|(index, _)| *index).collect();

        if requires_redraw {
            if let Some(messenger) = &self.messenger {
                messenger.request_redraw();
            }
        }
    }

    fn prepare(&self, view: &MapView) {
        if let Some(iter) = self.tile_schema.iter_tiles(view) {
            for index in iter {
                if self.tiles.get(&index).is_some() {
                    continue;
                }

                let tile_provider = self.tile_provider.clone();
                let tiles = self.tiles.clone();
                let messenger = self.messenger.clone();
                tokio::spawn(async move {
                    Self::load_tile(index, tile_provider, &tiles, messenger).await;
                });
            }
        }
    }

    fn set_messenger(&mut self, messenger: Box<dyn Messenger>) {
        self.messenger = Some(Arc::from(messenger));
    }

    fn attribution(&self) -> Option<Attribution> {
        self.attribution.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::cartesian::Size;
    use crate::error::MercalliError;
    use crate::latlon;
    use crate::render::{CirclePaint, LinePaint};

    struct TestProvider {
        load_count: AtomicUsize,
        fail: bool,
    }

    impl TestProvider {
        fn new() -> Self {
            Self {
                load_count: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                load_count: AtomicUsize::new(0),
                fail: true,
            }
        }
    }

    impl DataProvider<TileIndex, DecodedImage> for TestProvider {
        async fn load(&self, _key: &TileIndex) -> Result<DecodedImage, MercalliError> {
            self.load_count.fetch_add(1, Ordering::Relaxed);
            if self.fail {
                Err(MercalliError::Io)
            } else {
                DecodedImage::from_rgba8(vec![0; 256 * 256 * 4], 256, 256)
            }
        }
    }

    struct TestCanvas {
        images: Vec<(u64, Rect, u8)>,
    }

    impl TestCanvas {
        fn new() -> Self {
            Self { images: vec![] }
        }
    }

    impl Canvas for TestCanvas {
        fn size(&self) -> Size {
            Size::new(512.0, 512.0)
        }

        fn draw_image(&mut self, image: &DecodedImage, rect: Rect, opacity: u8) {
            self.images.push((image.id(), rect, opacity));
        }

        fn draw_circle(&mut self, _center: Point2d, _paint: CirclePaint) {}

        fn draw_contour(&mut self, _points: &[Point2d], _paint: LinePaint) {}
    }

    fn test_layer(provider: TestProvider) -> RasterTileLayer<TestProvider> {
        let mut layer = RasterTileLayer::new(TileSchema::web(10), provider, None);
        layer.set_fade_in_duration(Duration::ZERO);
        layer
    }

    fn test_view() -> MapView {
        // Z level 1 of the web schema, 4 tiles over the whole map
        MapView::new(latlon!(0.0, 0.0), 156543.03392800014 / 2.0)
            .with_size(Size::new(512.0, 512.0))
    }

    #[tokio::test]
    async fn loaded_tiles_are_drawn_opaque() {
        let layer = test_layer(TestProvider::new());
        let view = test_view();
        layer.load_tiles(&view).await;

        let mut canvas = TestCanvas::new();
        layer.render(&view, &mut canvas);

        assert_eq!(canvas.images.len(), 4);
        for (_, _, opacity) in &canvas.images {
            assert_eq!(*opacity, 255);
        }
    }

    #[tokio::test]
    async fn tiles_are_loaded_only_once() {
        let layer = test_layer(TestProvider::new());
        let view = test_view();
        layer.load_tiles(&view).await;
        layer.load_tiles(&view).await;

        assert_eq!(layer.tile_provider.load_count.load(Ordering::Relaxed), 4);
    }

    #[tokio::test]
    async fn failed_tiles_are_not_drawn_and_not_retried() {
        let layer = test_layer(TestProvider::failing());
        let view = test_view();
        layer.load_tiles(&view).await;
        layer.load_tiles(&view).await;

        let mut canvas = TestCanvas::new();
        layer.render(&view, &mut canvas);

        assert!(canvas.images.is_empty());
        assert_eq!(layer.tile_provider.load_count.load(Ordering::Relaxed), 4);
    }

    #[tokio::test]
    async fn missing_tiles_are_substituted_with_parents() {
        let layer = test_layer(TestProvider::new());

        // Load the single z0 tile, then look at the map at z1 without loading
        let z0_view = MapView::new(latlon!(0.0, 0.0), 156543.03392800014)
            .with_size(Size::new(256.0, 256.0));
        layer.load_tiles(&z0_view).await;

        let mut canvas = TestCanvas::new();
        layer.render(&test_view(), &mut canvas);

        assert_eq!(canvas.images.len(), 1);
    }
}
