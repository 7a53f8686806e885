//! State of the map viewport.

use crate::cartesian::{Point2d, Rect, Size, Vector2d};
use crate::geo::{GeoPoint2d, WebMercator};

/// Position and resolution of the map inside the viewport.
///
/// Resolution is the size of a single screen pixel in map units. The view does not
/// validate its state, so the position, resolution and size can contain any values.
/// Methods return NaN coordinates instead of panicking when the view cannot be used
/// for coordinate conversion.
#[derive(Debug, Clone, Copy)]
pub struct MapView {
    position: Point2d,
    resolution: f64,
    size: Size,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            position: Point2d::new(0.0, 0.0),
            resolution: 1.0,
            size: Size::default(),
        }
    }
}

impl MapView {
    /// Creates a new view centered at the given geographic point.
    ///
    /// If the point cannot be projected, the view is centered at the origin of the map.
    pub fn new(position: GeoPoint2d, resolution: f64) -> Self {
        let projected = WebMercator::default()
            .project(&position)
            .unwrap_or(Point2d::new(0.0, 0.0));
        Self::new_projected(projected, resolution)
    }

    /// Creates a new view centered at the given point in map coordinates.
    pub fn new_projected(position: Point2d, resolution: f64) -> Self {
        Self {
            position,
            resolution,
            ..Default::default()
        }
    }

    /// Center of the view in geographic coordinates.
    pub fn position(&self) -> Option<GeoPoint2d> {
        WebMercator::default().unproject(&self.position)
    }

    /// Center of the view in map coordinates.
    pub fn projected_position(&self) -> Point2d {
        self.position
    }

    /// Resolution of the view.
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Copy of the view with the given resolution.
    pub fn with_resolution(&self, resolution: f64) -> Self {
        Self {
            resolution,
            ..*self
        }
    }

    /// Size of the viewport in pixels.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Copy of the view with the given viewport size.
    pub fn with_size(&self, new_size: Size) -> Self {
        Self {
            size: new_size,
            ..*self
        }
    }

    /// Copy of the view centered at the given geographic point.
    ///
    /// If the point cannot be projected, the view is returned unchanged.
    pub fn with_position(&self, position: GeoPoint2d) -> Self {
        match WebMercator::default().project(&position) {
            Some(projected) => Self {
                position: projected,
                ..*self
            },
            None => *self,
        }
    }

    /// Converts a point in screen pixels into map coordinates.
    ///
    /// The screen coordinate system starts at the top left corner of the viewport with
    /// the Y axis pointing down. Returns NaN coordinates if the viewport has zero size.
    pub fn screen_to_map(&self, px_position: Point2d) -> Point2d {
        if self.size.is_zero() {
            return Point2d::new(f64::NAN, f64::NAN);
        }

        let x = self.position.x + (px_position.x - self.size.half_width()) * self.resolution;
        let y = self.position.y + (self.size.half_height() - px_position.y) * self.resolution;
        Point2d::new(x, y)
    }

    /// Converts a point in map coordinates into screen pixels.
    ///
    /// Returns NaN coordinates if the viewport has zero size.
    pub fn map_to_screen(&self, map_position: Point2d) -> Point2d {
        if self.size.is_zero() {
            return Point2d::new(f64::NAN, f64::NAN);
        }

        let x = (map_position.x - self.position.x) / self.resolution + self.size.half_width();
        let y = self.size.half_height() - (map_position.y - self.position.y) / self.resolution;
        Point2d::new(x, y)
    }

    /// Rectangle of the map that is visible through the viewport.
    ///
    /// Returns `None` if the view state does not correspond to any map region.
    pub fn get_bbox(&self) -> Option<Rect> {
        if self.size.is_zero() || !self.resolution.is_finite() {
            return None;
        }

        let half_width = self.size.half_width() * self.resolution;
        let half_height = self.size.half_height() * self.resolution;
        let bbox = Rect::new(
            self.position.x - half_width,
            self.position.y - half_height,
            self.position.x + half_width,
            self.position.y + half_height,
        );

        if bbox.x_min().is_finite() && bbox.y_min().is_finite() {
            Some(bbox)
        } else {
            None
        }
    }

    /// Copy of the view moved so that the map point under the `from` screen position
    /// moves under the `to` screen position.
    pub fn translate_by_pixels(&self, from: Point2d, to: Point2d) -> Self {
        let from_projected = self.screen_to_map(from);
        let to_projected = self.screen_to_map(to);
        let delta = to_projected - from_projected;
        if delta.x.is_finite() && delta.y.is_finite() {
            self.translate(delta)
        } else {
            *self
        }
    }

    /// Copy of the view with the map moved by the given map-coordinates vector.
    pub fn translate(&self, delta: Vector2d) -> Self {
        Self {
            position: self.position - delta,
            ..*self
        }
    }

    pub(crate) fn zoom(&self, zoom: f64, base_point: Point2d) -> Self {
        let base_point = self.screen_to_map(base_point);
        if !base_point.x.is_finite() || !base_point.y.is_finite() {
            return Self {
                resolution: self.resolution * zoom,
                ..*self
            };
        }

        let resolution = self.resolution * zoom;
        let new_position = base_point + (self.position - base_point) * zoom;
        Self {
            position: new_position,
            resolution,
            ..*self
        }
    }

    pub(crate) fn interpolate(&self, target: MapView, k: f64) -> Self {
        Self {
            position: self.position + (target.position - self.position) * k,
            resolution: self.resolution + (target.resolution - self.resolution) * k,
            ..*self
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::latlon;

    #[test]
    fn screen_to_map_size() {
        let view = MapView::default().with_size(Size::new(100.0, 100.0));

        assert_abs_diff_eq!(
            view.screen_to_map(Point2d::new(0.0, 0.0)),
            Point2d::new(-50.0, 50.0),
            epsilon = 0.0001,
        );
        assert_abs_diff_eq!(
            view.screen_to_map(Point2d::new(50.0, 50.0)),
            Point2d::new(0.0, 0.0),
            epsilon = 0.0001,
        );

        let view = MapView::default().with_size(Size::new(200.0, 50.0));

        assert_abs_diff_eq!(
            view.screen_to_map(Point2d::new(0.0, 0.0)),
            Point2d::new(-100.0, 25.0),
            epsilon = 0.0001,
        );
        assert_abs_diff_eq!(
            view.screen_to_map(Point2d::new(25.0, 49.0)),
            Point2d::new(-75.0, -24.0),
            epsilon = 0.0001,
        );
    }

    #[test]
    fn screen_to_map_zero_size() {
        let view = MapView::default().with_size(Size::new(0.0, 0.0));
        let projected = view.screen_to_map(Point2d::new(0.0, 0.0));
        assert!(projected.x.is_nan());
        assert!(projected.y.is_nan());
    }

    #[test]
    fn screen_to_map_position() {
        let view = MapView::new_projected(Point2d::new(-100.0, -100.0), 1.0)
            .with_size(Size::new(100.0, 100.0));

        assert_abs_diff_eq!(
            view.screen_to_map(Point2d::new(0.0, 0.0)),
            Point2d::new(-150.0, -50.0),
            epsilon = 0.0001,
        );
        assert_abs_diff_eq!(
            view.screen_to_map(Point2d::new(50.0, 50.0)),
            Point2d::new(-100.0, -100.0),
            epsilon = 0.0001,
        );
        assert_abs_diff_eq!(
            view.screen_to_map(Point2d::new(100.0, 100.0)),
            Point2d::new(-50.0, -150.0),
            epsilon = 0.0001,
        );
    }

    #[test]
    fn screen_to_map_resolution() {
        let view = MapView::default()
            .with_resolution(2.0)
            .with_size(Size::new(100.0, 100.0));

        assert_abs_diff_eq!(
            view.screen_to_map(Point2d::new(0.0, 0.0)),
            Point2d::new(-100.0, 100.0),
            epsilon = 0.0001,
        );
        assert_abs_diff_eq!(
            view.screen_to_map(Point2d::new(100.0, 100.0)),
            Point2d::new(100.0, -100.0),
            epsilon = 0.0001,
        );
    }

    #[test]
    fn map_to_screen_inverts_screen_to_map() {
        let view = MapView::new_projected(Point2d::new(100.0, -100.0), 2.5)
            .with_size(Size::new(200.0, 100.0));

        for px in [
            Point2d::new(0.0, 0.0),
            Point2d::new(100.0, 50.0),
            Point2d::new(173.0, 21.0),
        ] {
            let roundtrip = view.map_to_screen(view.screen_to_map(px));
            assert_abs_diff_eq!(roundtrip, px, epsilon = 0.0001);
        }
    }

    #[test]
    fn translate_by_pixels() {
        let view = MapView::default()
            .with_resolution(2.0)
            .with_size(Size::new(100.0, 100.0));

        let translated =
            view.translate_by_pixels(Point2d::new(0.0, 0.0), Point2d::new(10.0, 10.0));
        assert_abs_diff_eq!(
            translated.projected_position(),
            Point2d::new(-20.0, 20.0),
            epsilon = 0.0001,
        );
    }

    #[test]
    fn zoom_preserves_base_point() {
        let view = MapView::new_projected(Point2d::new(100.0, 200.0), 2.0)
            .with_size(Size::new(100.0, 100.0));

        let base_px = Point2d::new(25.0, 75.0);
        let base_map = view.screen_to_map(base_px);

        let zoomed = view.zoom(0.5, base_px);
        assert_abs_diff_eq!(zoomed.resolution(), 1.0, epsilon = 0.0001);
        assert_abs_diff_eq!(zoomed.screen_to_map(base_px), base_map, epsilon = 0.0001);
    }

    #[test]
    fn interpolation() {
        let view = MapView::new_projected(Point2d::new(0.0, 0.0), 1.0);
        let target = MapView::new_projected(Point2d::new(100.0, -100.0), 3.0);

        let half = view.interpolate(target, 0.5);
        assert_abs_diff_eq!(
            half.projected_position(),
            Point2d::new(50.0, -50.0),
            epsilon = 0.0001,
        );
        assert_abs_diff_eq!(half.resolution(), 2.0, epsilon = 0.0001);

        let full = view.interpolate(target, 1.0);
        assert_abs_diff_eq!(
            full.projected_position(),
            Point2d::new(100.0, -100.0),
            epsilon = 0.0001,
        );
    }

    #[test]
    fn view_from_geographic_position() {
        let view = MapView::new(latlon!(0.0, 0.0), 10.0);
        assert_abs_diff_eq!(
            view.projected_position(),
            Point2d::new(0.0, 0.0),
            epsilon = 0.0001,
        );

        let position = view.position().unwrap();
        assert_abs_diff_eq!(position.lat(), 0.0, epsilon = 0.0001);
        assert_abs_diff_eq!(position.lon(), 0.0, epsilon = 0.0001);
    }
}
