//! Tile pyramid description used by tile layers.

use std::collections::BTreeSet;

use crate::cartesian::{Point2d, Rect};
use crate::lod::Lod;
use crate::view::MapView;

const RESOLUTION_TOLERANCE: f64 = 0.01;

/// Direction of the Y tile indices.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VerticalDirection {
    /// Tile with y index 0 is at the top of the map.
    TopToBottom,
    /// Tile with y index 0 is at the bottom of the map.
    BottomToTop,
}

/// Index of a tile in a tile pyramid.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileIndex {
    /// Z index (zoom level).
    pub z: u32,
    /// Horizontal index.
    pub x: i64,
    /// Vertical index.
    pub y: i64,
}

impl TileIndex {
    /// Creates a new index.
    pub fn new(z: u32, x: i64, y: i64) -> Self {
        Self { z, x, y }
    }
}

/// Description of a tile pyramid: which tiles exist and what part of the map each covers.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileSchema {
    /// Point of the map the tile indexing starts from.
    pub origin: Point2d,
    /// Bounds of the tiled area. No tiles are produced outside of it.
    pub bounds: Rect,
    /// Levels of detail the tiles exist at.
    pub lods: BTreeSet<Lod>,
    /// Width of a single tile in pixels.
    pub tile_width: u32,
    /// Height of a single tile in pixels.
    pub tile_height: u32,
    /// Direction of the Y indexing.
    pub y_direction: VerticalDirection,
    /// Maximum ratio between the view resolution and a lod resolution at which the lod
    /// can still be selected for rendering.
    pub max_tile_scale: f64,
}

impl TileSchema {
    /// Standard Web Mercator tile pyramid with the given number of zoom levels.
    pub fn web(lods_count: u32) -> Self {
        const ORIGIN: Point2d = Point2d::new(-20037508.342787, 20037508.342787);
        const TOP_RESOLUTION: f64 = 156543.03392800014;

        let mut lods = BTreeSet::new();
        let mut resolution = TOP_RESOLUTION;
        for z in 0..lods_count {
            if let Some(lod) = Lod::new(resolution, z) {
                lods.insert(lod);
            }
            resolution /= 2.0;
        }

        TileSchema {
            origin: ORIGIN,
            bounds: Rect::new(
                -20037508.342787,
                -20037508.342787,
                20037508.342787,
                20037508.342787,
            ),
            lods,
            tile_width: 256,
            tile_height: 256,
            y_direction: VerticalDirection::TopToBottom,
            max_tile_scale: 1024.0,
        }
    }

    /// Resolution of the level with the given z index.
    pub fn lod_resolution(&self, z: u32) -> Option<f64> {
        for lod in &self.lods {
            if lod.z_index() == z {
                return Some(lod.resolution());
            }
        }

        None
    }

    /// Selects the best lod to display the map at the given resolution.
    pub fn select_lod(&self, resolution: f64) -> Option<Lod> {
        if !resolution.is_finite() {
            return None;
        }

        let mut prev_lod = self.lods.iter().next()?;

        for lod in self.lods.iter().skip(1) {
            if lod.resolution() * (1.0 - RESOLUTION_TOLERANCE) > resolution {
                break;
            }

            prev_lod = lod;
        }

        if prev_lod.resolution() / resolution > self.max_tile_scale
            || resolution / prev_lod.resolution() > self.max_tile_scale
        {
            None
        } else {
            Some(*prev_lod)
        }
    }

    /// Iterates over indices of the tiles that are needed to render the given view.
    pub fn iter_tiles(&self, view: &MapView) -> Option<impl Iterator<Item = TileIndex>> {
        let resolution = view.resolution();
        let bounding_box = view.get_bbox()?;
        self.iter_tiles_over_bbox(resolution, bounding_box)
    }

    fn iter_tiles_over_bbox(
        &self,
        resolution: f64,
        bounding_box: Rect,
    ) -> Option<impl Iterator<Item = TileIndex>> {
        let lod = self.select_lod(resolution)?;

        let tile_w = lod.resolution() * self.tile_width as f64;
        let tile_h = lod.resolution() * self.tile_height as f64;

        let x_min = (self.x_adj(bounding_box.x_min()) / tile_w) as i64;
        let x_min = x_min.max(self.min_x_index(lod.resolution()));

        let x_max_adj = self.x_adj(bounding_box.x_max());
        let x_add_one = if (x_max_adj % tile_w) < 0.001 { -1 } else { 0 };

        let x_max = (x_max_adj / tile_w) as i64 + x_add_one;
        let x_max = x_max.min(self.max_x_index(lod.resolution()));

        let (top, bottom) = if self.y_direction == VerticalDirection::TopToBottom {
            (bounding_box.y_min(), bounding_box.y_max())
        } else {
            (bounding_box.y_max(), bounding_box.y_min())
        };

        let y_min = (self.y_adj(bottom) / tile_h) as i64;
        let y_min = y_min.max(self.min_y_index(lod.resolution()));

        let y_max_adj = self.y_adj(top);
        let y_add_one = if (y_max_adj % tile_h) < 0.001 { -1 } else { 0 };

        let y_max = (y_max_adj / tile_h) as i64 + y_add_one;
        let y_max = y_max.min(self.max_y_index(lod.resolution()));

        Some((x_min..=x_max).flat_map(move |x| {
            (y_min..=y_max).map(move |y| TileIndex {
                x,
                y,
                z: lod.z_index(),
            })
        }))
    }

    /// Iterates over tiles of the level above that cover the given tile.
    ///
    /// These tiles can be displayed while the request tile itself is being loaded.
    pub fn get_substitutes(&self, index: TileIndex) -> Option<impl Iterator<Item = TileIndex>> {
        let lod = self.lod_over(index.z)?;
        self.iter_tiles_over_bbox(lod.resolution(), self.tile_bbox(index)?)
    }

    /// Bounding rectangle of the tile with the given index in map coordinates.
    pub fn tile_bbox(&self, index: TileIndex) -> Option<Rect> {
        let resolution = self.lod_resolution(index.z)?;
        let x_min = self.origin.x + (index.x as f64) * self.tile_width as f64 * resolution;
        let y_min = match self.y_direction {
            VerticalDirection::TopToBottom => {
                self.origin.y - (index.y + 1) as f64 * self.tile_height as f64 * resolution
            }
            VerticalDirection::BottomToTop => {
                self.origin.y + (index.y as f64) * self.tile_height as f64 * resolution
            }
        };

        Some(Rect::new(
            x_min,
            y_min,
            x_min + self.tile_width as f64 * resolution,
            y_min + self.tile_height as f64 * resolution,
        ))
    }

    /// Returns lod one z-level over the given.
    fn lod_over(&self, z: u32) -> Option<&Lod> {
        let mut lod_iter = self.lods.iter();
        for lod in lod_iter.by_ref() {
            if lod.z_index() == z {
                break;
            }
        }

        lod_iter.next()
    }

    fn x_adj(&self, x: f64) -> f64 {
        x - self.origin.x
    }

    fn y_adj(&self, y: f64) -> f64 {
        match self.y_direction {
            VerticalDirection::TopToBottom => self.origin.y - y,
            VerticalDirection::BottomToTop => y - self.origin.y,
        }
    }

    fn min_x_index(&self, resolution: f64) -> i64 {
        ((self.bounds.x_min() - self.origin.x) / resolution / self.tile_width as f64).floor() as i64
    }

    fn max_x_index(&self, resolution: f64) -> i64 {
        let pix_bound = (self.bounds.x_max() - self.origin.x) / resolution;
        let floored = pix_bound.floor();
        if (pix_bound - floored).abs() < 0.1 {
            (floored / self.tile_width as f64) as i64 - 1
        } else {
            (floored / self.tile_width as f64) as i64
        }
    }

    fn min_y_index(&self, resolution: f64) -> i64 {
        let offset = match self.y_direction {
            VerticalDirection::TopToBottom => self.origin.y - self.bounds.y_max(),
            VerticalDirection::BottomToTop => self.bounds.y_min() - self.origin.y,
        };
        (offset / resolution / self.tile_height as f64).floor() as i64
    }

    fn max_y_index(&self, resolution: f64) -> i64 {
        let pix_bound = match self.y_direction {
            VerticalDirection::TopToBottom => (self.origin.y - self.bounds.y_min()) / resolution,
            VerticalDirection::BottomToTop => (self.bounds.y_max() - self.origin.y) / resolution,
        };
        let floored = pix_bound.floor();
        if (pix_bound - floored).abs() < 0.1 {
            (floored / self.tile_height as f64) as i64 - 1
        } else {
            (floored / self.tile_height as f64) as i64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartesian::Size;

    fn simple_schema() -> TileSchema {
        TileSchema {
            origin: Point2d::new(0.0, 0.0),
            bounds: Rect::new(0.0, 0.0, 2048.0, 2048.0),
            lods: [
                Lod::new(8.0, 0).unwrap(),
                Lod::new(4.0, 1).unwrap(),
                Lod::new(2.0, 2).unwrap(),
            ]
            .into(),
            tile_width: 256,
            tile_height: 256,
            y_direction: VerticalDirection::BottomToTop,
            max_tile_scale: 2.0,
        }
    }

    fn get_view(resolution: f64, bbox: Rect) -> MapView {
        MapView::new_projected(bbox.center(), resolution).with_size(Size::new(
            bbox.width() / resolution,
            bbox.height() / resolution,
        ))
    }

    #[test]
    fn web_schema_resolutions() {
        let schema = TileSchema::web(10);
        assert_eq!(schema.lods.len(), 10);
        assert_eq!(schema.lod_resolution(0), Some(156543.03392800014));
        assert_eq!(schema.lod_resolution(3), Some(156543.03392800014 / 8.0));
        assert_eq!(schema.lod_resolution(10), None);
    }

    #[test]
    fn select_lod() {
        let schema = simple_schema();
        assert_eq!(schema.select_lod(8.0).unwrap().z_index(), 0);
        assert_eq!(schema.select_lod(9.0).unwrap().z_index(), 0);
        assert_eq!(schema.select_lod(16.0).unwrap().z_index(), 0);
        assert_eq!(schema.select_lod(7.99).unwrap().z_index(), 0);
        assert_eq!(schema.select_lod(7.5).unwrap().z_index(), 1);
        assert_eq!(schema.select_lod(4.1).unwrap().z_index(), 1);
        assert_eq!(schema.select_lod(4.0).unwrap().z_index(), 1);
        assert_eq!(schema.select_lod(1.5).unwrap().z_index(), 2);
        assert_eq!(schema.select_lod(1.0).unwrap().z_index(), 2);
        assert_eq!(schema.select_lod(0.5), None);
        assert_eq!(schema.select_lod(0.0), None);
        assert_eq!(schema.select_lod(100500.0), None);
        assert_eq!(schema.select_lod(f64::INFINITY), None);
        assert_eq!(schema.select_lod(f64::NEG_INFINITY), None);
        assert_eq!(schema.select_lod(f64::NAN), None);
    }

    #[test]
    fn select_lod_considers_max_tile_scale() {
        let mut schema = simple_schema();
        assert!(schema.select_lod(16.0).is_some());
        assert!(schema.select_lod(1.0).is_some());
        assert!(schema.select_lod(17.0).is_none());
        assert!(schema.select_lod(0.9).is_none());

        schema.max_tile_scale = 1.5;
        assert!(schema.select_lod(16.0).is_none());
        assert!(schema.select_lod(1.0).is_none());
        assert!(schema.select_lod(17.0).is_none());
        assert!(schema.select_lod(0.9).is_none());

        schema.max_tile_scale = 2.5;
        assert!(schema.select_lod(16.0).is_some());
        assert!(schema.select_lod(1.0).is_some());
        assert!(schema.select_lod(17.0).is_some());
        assert!(schema.select_lod(0.9).is_some());
    }

    #[test]
    fn iter_indices_full_bbox() {
        let schema = simple_schema();
        let bbox = Rect::new(0.0, 0.0, 2048.0, 2048.0);
        let view = get_view(8.0, bbox);
        assert_eq!(schema.iter_tiles(&view).unwrap().count(), 1);
        for tile in schema.iter_tiles(&view).unwrap() {
            assert_eq!(tile.x, 0);
            assert_eq!(tile.y, 0);
            assert_eq!(tile.z, 0);
        }

        let view = get_view(4.0, bbox);
        let mut tiles: Vec<TileIndex> = schema.iter_tiles(&view).unwrap().collect();
        tiles.dedup();
        assert_eq!(tiles.len(), 4);
        for tile in tiles {
            assert!(tile.x >= 0 && tile.x <= 1);
            assert!(tile.y >= 0 && tile.y <= 1);
            assert_eq!(tile.z, 1);
        }

        let view = get_view(2.0, bbox);
        let mut tiles: Vec<TileIndex> = schema.iter_tiles(&view).unwrap().collect();
        tiles.dedup();
        assert_eq!(tiles.len(), 16);
        for tile in tiles {
            assert!(tile.x >= 0 && tile.x <= 3);
            assert!(tile.y >= 0 && tile.y <= 3);
            assert_eq!(tile.z, 2);
        }
    }

    #[test]
    fn iter_indices_part_bbox() {
        let schema = simple_schema();
        let bbox = Rect::new(200.0, 700.0, 1200.0, 1100.0);
        let view = get_view(8.0, bbox);
        assert_eq!(schema.iter_tiles(&view).unwrap().count(), 1);
        for tile in schema.iter_tiles(&view).unwrap() {
            assert_eq!(tile.x, 0);
            assert_eq!(tile.y, 0);
            assert_eq!(tile.z, 0);
        }

        let view = get_view(4.0, bbox);
        let mut tiles: Vec<TileIndex> = schema.iter_tiles(&view).unwrap().collect();
        tiles.dedup();
        assert_eq!(tiles.len(), 4);
        for tile in tiles {
            assert!(tile.x >= 0 && tile.x <= 1);
            assert!(tile.y >= 0 && tile.y <= 1);
            assert_eq!(tile.z, 1);
        }

        let view = get_view(2.0, bbox);
        let mut tiles: Vec<TileIndex> = schema.iter_tiles(&view).unwrap().collect();
        tiles.dedup();
        assert_eq!(tiles.len(), 6);
        for tile in tiles {
            assert!(tile.x >= 0 && tile.x <= 2);
            assert!(tile.y >= 1 && tile.y <= 2);
            assert_eq!(tile.z, 2);
        }
    }

    #[test]
    fn iter_tiles_outside_of_bbox() {
        let schema = simple_schema();
        let bbox = Rect::new(-100.0, -100.0, -50.0, -50.0);
        let view = get_view(8.0, bbox);
        assert_eq!(schema.iter_tiles(&view).unwrap().count(), 0);
        let view = get_view(2.0, bbox);
        assert_eq!(schema.iter_tiles(&view).unwrap().count(), 0);

        let bbox = Rect::new(2100.0, 0.0, 2500.0, 2048.0);
        let view = get_view(8.0, bbox);
        assert_eq!(schema.iter_tiles(&view).unwrap().count(), 0);
        let view = get_view(2.0, bbox);
        assert_eq!(schema.iter_tiles(&view).unwrap().count(), 0);
    }

    #[test]
    fn iter_tiles_does_not_include_tiles_outside_bbox() {
        let schema = simple_schema();
        let bbox = Rect::new(-2048.0, -2048.0, 4096.0, 4096.0);
        let view = get_view(8.0, bbox);
        assert_eq!(schema.iter_tiles(&view).unwrap().count(), 1);
        let view = get_view(2.0, bbox);
        assert_eq!(schema.iter_tiles(&view).unwrap().count(), 16);
    }

    #[test]
    fn lod_over() {
        let schema = simple_schema();
        assert_eq!(schema.lod_over(0), None);
        assert_eq!(schema.lod_over(1).unwrap().z_index(), 0);
        assert_eq!(schema.lod_over(2).unwrap().z_index(), 1);
        assert_eq!(schema.lod_over(3), None);
    }

    #[test]
    fn substitutes_cover_tile_bbox() {
        let schema = simple_schema();
        let substitutes: Vec<_> = schema
            .get_substitutes(TileIndex::new(2, 3, 3))
            .unwrap()
            .collect();
        assert_eq!(substitutes, vec![TileIndex::new(1, 1, 1)]);

        assert!(schema.get_substitutes(TileIndex::new(0, 0, 0)).is_none());
    }
}
