//! Symbols define how feature layers render their features.

use crate::cartesian::Point2d;
use crate::color::Color;
use crate::geo::Geom;
use crate::render::{CirclePaint, LinePaint};

/// Drawing operation produced by a symbol.
///
/// Coordinates are in map units. Widths and radiuses are in screen pixels, so markers
/// keep their size when the map is zoomed.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderPrimitive {
    /// Circle marker of a fixed pixel size.
    Circle {
        /// Center of the circle in map coordinates.
        center: Point2d,
        /// Style of the circle.
        paint: CirclePaint,
    },
    /// Polyline.
    Contour {
        /// Points of the line in map coordinates.
        points: Vec<Point2d>,
        /// Style of the line.
        paint: LinePaint,
    },
}

/// Converts features into drawing operations.
pub trait Symbol<F> {
    /// Returns the primitives to draw for the given feature.
    ///
    /// `geometry` is the feature geometry projected into map coordinates.
    fn render(&self, feature: &F, geometry: &Geom<Point2d>) -> Vec<RenderPrimitive>;
}

/// Renders any point geometry as a circle of the fixed color and size.
#[derive(Debug, Clone, Copy)]
pub struct CirclePointSymbol {
    /// Fill color of the circles.
    pub color: Color,
    /// Diameter of the circles in pixels.
    pub size: f64,
}

impl CirclePointSymbol {
    /// Creates a new symbol.
    pub fn new(color: Color, size: f64) -> Self {
        Self { color, size }
    }
}

impl<F> Symbol<F> for CirclePointSymbol {
    fn render(&self, _feature: &F, geometry: &Geom<Point2d>) -> Vec<RenderPrimitive> {
        let paint = CirclePaint {
            fill: self.color,
            radius: self.size / 2.0,
            outline: None,
        };

        match geometry {
            Geom::Point(p) => vec![RenderPrimitive::Circle { center: *p, paint }],
            Geom::MultiPoint(points) => points
                .iter()
                .map(|p| RenderPrimitive::Circle { center: *p, paint })
                .collect(),
            _ => vec![],
        }
    }
}

/// Renders any line geometry as a solid line of the fixed color and width.
///
/// Polygons are rendered as their rims without fill.
#[derive(Debug, Clone, Copy)]
pub struct SimpleContourSymbol {
    /// Color of the lines.
    pub color: Color,
    /// Width of the lines in pixels.
    pub width: f64,
}

impl SimpleContourSymbol {
    /// Creates a new symbol.
    pub fn new(color: Color, width: f64) -> Self {
        Self { color, width }
    }
}

impl<F> Symbol<F> for SimpleContourSymbol {
    fn render(&self, _feature: &F, geometry: &Geom<Point2d>) -> Vec<RenderPrimitive> {
        let paint = LinePaint {
            color: self.color,
            width: self.width,
        };

        contours_of(geometry)
            .into_iter()
            .map(|points| RenderPrimitive::Contour {
                points: points.clone(),
                paint,
            })
            .collect()
    }
}

fn contours_of(geometry: &Geom<Point2d>) -> Vec<&Vec<Point2d>> {
    match geometry {
        Geom::Point(_) | Geom::MultiPoint(_) => vec![],
        Geom::Contour(points) => vec![points],
        Geom::MultiContour(contours) => contours.iter().collect(),
        Geom::Polygon(rings) => rings.iter().collect(),
        Geom::MultiPolygon(polygons) => polygons.iter().flatten().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_symbol_ignores_lines() {
        let symbol = CirclePointSymbol::new(Color::RED, 10.0);
        let geometry = Geom::Contour(vec![Point2d::new(0.0, 0.0), Point2d::new(1.0, 1.0)]);
        assert!(Symbol::<()>::render(&symbol, &(), &geometry).is_empty());

        let geometry = Geom::Point(Point2d::new(3.0, 4.0));
        let primitives = Symbol::<()>::render(&symbol, &(), &geometry);
        assert_eq!(primitives.len(), 1);
        match &primitives[0] {
            RenderPrimitive::Circle { center, paint } => {
                assert_eq!(*center, Point2d::new(3.0, 4.0));
                assert_eq!(paint.radius, 5.0);
                assert_eq!(paint.fill, Color::RED);
            }
            other => panic!("unexpected primitive: {other:?}"),
        }
    }

    #[test]
    fn contour_symbol_renders_polygon_rims() {
        let symbol = SimpleContourSymbol::new(Color::BLUE, 2.0);
        let geometry = Geom::Polygon(vec![
            vec![
                Point2d::new(0.0, 0.0),
                Point2d::new(1.0, 0.0),
                Point2d::new(1.0, 1.0),
                Point2d::new(0.0, 0.0),
            ],
            vec![
                Point2d::new(0.2, 0.2),
                Point2d::new(0.8, 0.2),
                Point2d::new(0.2, 0.8),
                Point2d::new(0.2, 0.2),
            ],
        ]);

        let primitives = Symbol::<()>::render(&symbol, &(), &geometry);
        assert_eq!(primitives.len(), 2);
    }
}
