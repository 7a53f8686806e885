//! Styling of earthquake markers.

use mercalli::cartesian::Point2d;
use mercalli::geo::Geom;
use mercalli::layer::symbol::{RenderPrimitive, Symbol};
use mercalli::render::{CirclePaint, LinePaint};
use mercalli::Color;

use crate::classify::magnitude_color;
use crate::feed::Earthquake;

/// Stroke color shared by all markers.
const STROKE_COLOR: Color = Color::from_hex("#888400");
/// Stroke width of the markers in pixels.
const STROKE_WEIGHT: f64 = 1.0;
/// Marker radius in pixels per unit of magnitude.
const RADIUS_SCALE: f64 = 4.0;

/// Visual style of an earthquake marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerStyle {
    /// Outline color.
    pub stroke_color: Color,
    /// Outline width in pixels.
    pub stroke_weight: f64,
    /// Fill color.
    pub fill_color: Color,
    /// Opacity of the fill, from 0.0 to 1.0.
    pub fill_opacity: f64,
    /// Radius of the marker in pixels.
    pub radius: f64,
}

/// Returns the marker style for an earthquake of the given magnitude.
///
/// The fill color comes from [`magnitude_color`] and the radius grows linearly with
/// the magnitude, so stronger earthquakes are drawn larger. Negative magnitudes
/// produce negative radii; the renderer skips such markers.
pub fn marker_style(magnitude: f64) -> MarkerStyle {
    MarkerStyle {
        stroke_color: STROKE_COLOR,
        stroke_weight: STROKE_WEIGHT,
        fill_color: magnitude_color(magnitude),
        fill_opacity: 1.0,
        radius: magnitude * RADIUS_SCALE,
    }
}

/// Symbol rendering earthquakes as circle markers styled by their magnitude.
#[derive(Debug, Default, Clone, Copy)]
pub struct QuakeSymbol;

impl Symbol<Earthquake> for QuakeSymbol {
    fn render(&self, feature: &Earthquake, geometry: &Geom<Point2d>) -> Vec<RenderPrimitive> {
        let Geom::Point(center) = geometry else {
            return vec![];
        };

        let style = marker_style(feature.magnitude());
        let paint = CirclePaint {
            fill: style
                .fill_color
                .with_alpha((style.fill_opacity * 255.0) as u8),
            radius: style.radius,
            outline: Some(LinePaint {
                color: style.stroke_color,
                width: style.stroke_weight,
            }),
        };

        vec![RenderPrimitive::Circle {
            center: *center,
            paint,
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mercalli::latlon;

    #[test]
    fn style_follows_the_magnitude() {
        let style = marker_style(2.5);
        assert_eq!(style.fill_color, Color::from_hex("#d4ee00"));
        assert_eq!(style.stroke_color, Color::from_hex("#888400"));
        assert_eq!(style.stroke_weight, 1.0);
        assert_eq!(style.fill_opacity, 1.0);
        assert_eq!(style.radius, 10.0);
    }

    #[test]
    fn radius_is_linear_in_magnitude() {
        assert_eq!(marker_style(0.0).radius, 0.0);
        assert_eq!(marker_style(7.75).radius, 31.0);
        // Negative magnitudes are passed through unguarded.
        assert_eq!(marker_style(-1.0).radius, -4.0);
    }

    #[test]
    fn symbol_renders_a_styled_circle() {
        let quake = Earthquake::new(5.0, "somewhere", 0, "http://x", latlon!(10.0, 20.0));
        let geometry = Geom::Point(Point2d::new(100.0, 200.0));

        let primitives = QuakeSymbol.render(&quake, &geometry);
        assert_eq!(primitives.len(), 1);
        match &primitives[0] {
            RenderPrimitive::Circle { center, paint } => {
                assert_eq!(*center, Point2d::new(100.0, 200.0));
                assert_eq!(paint.radius, 20.0);
                assert_eq!(paint.fill, Color::from_hex("#ea822c"));
                let outline = paint.outline.unwrap();
                assert_eq!(outline.color, Color::from_hex("#888400"));
                assert_eq!(outline.width, 1.0);
            }
            other => panic!("unexpected primitive: {other:?}"),
        }
    }

    #[test]
    fn symbol_ignores_non_point_geometries() {
        let quake = Earthquake::new(5.0, "somewhere", 0, "http://x", latlon!(10.0, 20.0));
        let geometry = Geom::Contour(vec![Point2d::new(0.0, 0.0), Point2d::new(1.0, 1.0)]);
        assert!(QuakeSymbol.render(&quake, &geometry).is_empty());
    }
}
