//! Cartesian primitives used for projected map coordinates and screen coordinates.

/// Point in a cartesian coordinate system (projected map units or screen pixels).
pub type Point2d = nalgebra::Point2<f64>;

/// Displacement between two [`Point2d`]s.
pub type Vector2d = nalgebra::Vector2<f64>;

/// Size of a rectangular area.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    width: f64,
    height: f64,
}

impl Size {
    /// Creates a new size.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Horizontal dimension.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Half of the horizontal dimension.
    pub fn half_width(&self) -> f64 {
        self.width / 2.0
    }

    /// Vertical dimension.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Half of the vertical dimension.
    pub fn half_height(&self) -> f64 {
        self.height / 2.0
    }

    /// Returns true if either of the dimensions is zero.
    pub fn is_zero(&self) -> bool {
        self.width == 0.0 || self.height == 0.0
    }
}

/// Axis-aligned rectangle.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    x_min: f64,
    y_min: f64,
    x_max: f64,
    y_max: f64,
}

impl Rect {
    /// Creates a new rectangle.
    pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// Left boundary.
    pub fn x_min(&self) -> f64 {
        self.x_min
    }

    /// Right boundary.
    pub fn x_max(&self) -> f64 {
        self.x_max
    }

    /// Lower boundary.
    pub fn y_min(&self) -> f64 {
        self.y_min
    }

    /// Upper boundary.
    pub fn y_max(&self) -> f64 {
        self.y_max
    }

    /// Horizontal dimension.
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    /// Vertical dimension.
    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// Center point.
    pub fn center(&self) -> Point2d {
        Point2d::new(
            (self.x_min + self.x_max) / 2.0,
            (self.y_min + self.y_max) / 2.0,
        )
    }

    /// Moves all sides of the rectangle towards the center by the given amount.
    pub fn shrink(&self, amount: f64) -> Self {
        Self {
            x_min: self.x_min + amount,
            x_max: self.x_max - amount,
            y_min: self.y_min + amount,
            y_max: self.y_max - amount,
        }
    }

    /// Scales the rectangle around its center.
    pub fn magnify(&self, factor: f64) -> Self {
        let center = self.center();
        let half_width = self.width() / 2.0 * factor;
        let half_height = self.height() / 2.0 * factor;
        Self {
            x_min: center.x - half_width,
            x_max: center.x + half_width,
            y_min: center.y - half_height,
            y_max: center.y + half_height,
        }
    }

    /// Returns the smallest rectangle containing both `self` and `other`.
    pub fn merge(&self, other: Self) -> Self {
        Self {
            x_min: self.x_min.min(other.x_min),
            y_min: self.y_min.min(other.y_min),
            x_max: self.x_max.max(other.x_max),
            y_max: self.y_max.max(other.y_max),
        }
    }

    /// Returns the part of `self` that lies inside `other`.
    pub fn limit(&self, other: Self) -> Self {
        Self {
            x_min: self.x_min.max(other.x_min),
            y_min: self.y_min.max(other.y_min),
            x_max: self.x_max.min(other.x_max),
            y_max: self.y_max.min(other.y_max),
        }
    }

    /// Bounding rectangle of a set of points. Returns `None` for an empty iterator.
    pub fn from_points<'a>(mut points: impl Iterator<Item = &'a Point2d>) -> Option<Self> {
        let first = points.next()?;
        let mut rect = Self {
            x_min: first.x,
            y_min: first.y,
            x_max: first.x,
            y_max: first.y,
        };

        for p in points {
            if rect.x_min > p.x {
                rect.x_min = p.x;
            }
            if rect.y_min > p.y {
                rect.y_min = p.y;
            }
            if rect.x_max < p.x {
                rect.x_max = p.x;
            }
            if rect.y_max < p.y {
                rect.y_max = p.y;
            }
        }

        Some(rect)
    }

    /// Returns true if the point lies inside the rectangle or on its boundary.
    pub fn contains(&self, point: Point2d) -> bool {
        self.x_min <= point.x
            && self.x_max >= point.x
            && self.y_min <= point.y
            && self.y_max >= point.y
    }

    /// Returns true if the rectangles have at least one common point.
    pub fn intersects(&self, other: Self) -> bool {
        self.x_min <= other.x_max
            && self.x_max >= other.x_min
            && self.y_min <= other.y_max
            && self.y_max >= other.y_min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_from_points() {
        let points = [
            Point2d::new(1.0, 5.0),
            Point2d::new(-3.0, 2.0),
            Point2d::new(4.0, -1.0),
        ];
        let rect = Rect::from_points(points.iter()).unwrap();
        assert_eq!(rect, Rect::new(-3.0, -1.0, 4.0, 5.0));

        assert!(Rect::from_points([].iter()).is_none());
    }

    #[test]
    fn rect_magnify_keeps_center() {
        let rect = Rect::new(0.0, 0.0, 10.0, 20.0);
        let magnified = rect.magnify(2.0);
        assert_eq!(magnified.center(), rect.center());
        assert_eq!(magnified.width(), 20.0);
        assert_eq!(magnified.height(), 40.0);
    }

    #[test]
    fn rect_limit() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        let other = Rect::new(5.0, -5.0, 15.0, 5.0);
        assert_eq!(rect.limit(other), Rect::new(5.0, 0.0, 10.0, 5.0));
    }
}
