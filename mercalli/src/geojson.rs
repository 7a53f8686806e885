//! Conversion of GeoJSON geometries into the engine geometry types.

use geojson::{LineStringType, PolygonType, Position, Value};

use crate::geo::{GeoPoint2d, Geom};

/// Converts a GeoJSON geometry into a [`Geom`].
///
/// Returns `None` if any of the coordinates is incomplete or if the geometry type is
/// not supported. Note that GeoJSON positions are `[longitude, latitude]` pairs.
pub fn geometry_to_geom(geometry: &geojson::Geometry) -> Option<Geom<GeoPoint2d>> {
    match &geometry.value {
        Value::Point(p) => Some(Geom::Point(convert_point(p)?)),
        Value::MultiPoint(points) => Some(Geom::MultiPoint(
            points.iter().map(convert_point).collect::<Option<_>>()?,
        )),
        Value::LineString(points) => Some(Geom::Contour(convert_contour(points)?)),
        Value::MultiLineString(lines) => Some(Geom::MultiContour(
            lines.iter().map(convert_contour).collect::<Option<_>>()?,
        )),
        Value::Polygon(polygon) => Some(Geom::Polygon(convert_polygon(polygon)?)),
        Value::MultiPolygon(mp) => Some(Geom::MultiPolygon(
            mp.iter().map(convert_polygon).collect::<Option<_>>()?,
        )),
        Value::GeometryCollection(_) => None,
    }
}

fn convert_point(position: &Position) -> Option<GeoPoint2d> {
    if position.len() < 2 {
        return None;
    }

    Some(GeoPoint2d::latlon(position[1], position[0]))
}

fn convert_contour(line_string: &LineStringType) -> Option<Vec<GeoPoint2d>> {
    line_string.iter().map(convert_point).collect()
}

fn convert_polygon(polygon: &PolygonType) -> Option<Vec<Vec<GeoPoint2d>>> {
    polygon.iter().map(convert_contour).collect()
}
