//! Geographic coordinates and projections between them and the map coordinate system.

use crate::cartesian::Point2d;

/// Geographic point specified by latitude and longitude in degrees.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint2d {
    lat: f64,
    lon: f64,
}

impl GeoPoint2d {
    /// Creates a new point.
    pub fn latlon(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Latitude in degrees.
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees.
    pub fn lon(&self) -> f64 {
        self.lon
    }
}

/// Constructs a [`GeoPoint2d`](crate::geo::GeoPoint2d) from a latitude and longitude pair.
#[macro_export]
macro_rules! latlon {
    ($lat:expr, $lon:expr) => {
        $crate::geo::GeoPoint2d::latlon($lat, $lon)
    };
}

/// Reference ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Datum {
    semimajor: f64,
    inv_flattening: f64,
}

impl Datum {
    /// WGS84 datum used by Web Mercator maps.
    pub const WGS84: Self = Self {
        semimajor: 6_378_137.0,
        inv_flattening: 298.257223563,
    };

    /// Semimajor axis of the ellipsoid in meters.
    pub fn semimajor(&self) -> f64 {
        self.semimajor
    }

    /// Inverse flattening of the ellipsoid.
    pub fn inv_flattening(&self) -> f64 {
        self.inv_flattening
    }
}

impl Default for Datum {
    fn default() -> Self {
        Self::WGS84
    }
}

/// Web Mercator projection (EPSG:3857) over the given datum.
///
/// This is the projection used by most web tile services. It treats the datum as a
/// sphere with the radius of the semimajor axis.
#[derive(Debug, Default, Clone, Copy)]
pub struct WebMercator {
    datum: Datum,
}

impl WebMercator {
    /// Creates a projection over the given datum.
    pub fn new(datum: Datum) -> Self {
        Self { datum }
    }

    /// Projects a geographic point into map coordinates.
    ///
    /// Returns `None` if the result is not finite (the poles cannot be projected).
    pub fn project(&self, point: &GeoPoint2d) -> Option<Point2d> {
        let radius = self.datum.semimajor();
        let x = radius * point.lon().to_radians();
        let y = radius
            * (std::f64::consts::FRAC_PI_4 + point.lat().to_radians() / 2.0)
                .tan()
                .ln();

        if x.is_finite() && y.is_finite() {
            Some(Point2d::new(x, y))
        } else {
            None
        }
    }

    /// Converts a point in map coordinates back into latitude and longitude.
    pub fn unproject(&self, point: &Point2d) -> Option<GeoPoint2d> {
        let radius = self.datum.semimajor();
        let lon = (point.x / radius).to_degrees();
        let lat = ((point.y / radius).exp().atan() * 2.0 - std::f64::consts::FRAC_PI_2).to_degrees();

        if lon.is_finite() && lat.is_finite() {
            Some(GeoPoint2d::latlon(lat, lon))
        } else {
            None
        }
    }
}

/// Geometry of a map feature, generic over the point type.
#[derive(Debug, Clone, PartialEq)]
pub enum Geom<P> {
    /// Single point.
    Point(P),
    /// Set of points sharing one set of attributes.
    MultiPoint(Vec<P>),
    /// Polyline.
    Contour(Vec<P>),
    /// Set of polylines.
    MultiContour(Vec<Vec<P>>),
    /// Polygon given by its outer ring followed by inner rings.
    Polygon(Vec<Vec<P>>),
    /// Set of polygons.
    MultiPolygon(Vec<Vec<Vec<P>>>),
}

impl<P> Geom<P> {
    /// Maps every point of the geometry with the given projection function.
    ///
    /// Returns `None` if any of the points cannot be projected.
    pub fn project<Q>(&self, mut projection: impl FnMut(&P) -> Option<Q>) -> Option<Geom<Q>> {
        fn points<P, Q>(
            points: &[P],
            projection: &mut impl FnMut(&P) -> Option<Q>,
        ) -> Option<Vec<Q>> {
            points.iter().map(projection).collect()
        }

        fn contours<P, Q>(
            contours: &[Vec<P>],
            projection: &mut impl FnMut(&P) -> Option<Q>,
        ) -> Option<Vec<Vec<Q>>> {
            contours.iter().map(|c| points(c, projection)).collect()
        }

        Some(match self {
            Geom::Point(p) => Geom::Point(projection(p)?),
            Geom::MultiPoint(ps) => Geom::MultiPoint(points(ps, &mut projection)?),
            Geom::Contour(c) => Geom::Contour(points(c, &mut projection)?),
            Geom::MultiContour(cs) => Geom::MultiContour(contours(cs, &mut projection)?),
            Geom::Polygon(rings) => Geom::Polygon(contours(rings, &mut projection)?),
            Geom::MultiPolygon(polygons) => Geom::MultiPolygon(
                polygons
                    .iter()
                    .map(|rings| contours(rings, &mut projection))
                    .collect::<Option<_>>()?,
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn project_unproject_roundtrip() {
        let projection = WebMercator::default();
        let points = [
            latlon!(0.0, 0.0),
            latlon!(55.7558, 37.6173),
            latlon!(-33.4489, -70.6693),
            latlon!(80.0, 179.0),
        ];

        for point in points {
            let projected = projection.project(&point).unwrap();
            let back = projection.unproject(&projected).unwrap();
            assert_abs_diff_eq!(back.lat(), point.lat(), epsilon = 1e-6);
            assert_abs_diff_eq!(back.lon(), point.lon(), epsilon = 1e-6);
        }
    }

    #[test]
    fn project_known_values() {
        let projection = WebMercator::default();

        let projected = projection.project(&latlon!(0.0, 180.0)).unwrap();
        assert_abs_diff_eq!(projected.x, 20037508.342789244, epsilon = 1e-6);
        assert_abs_diff_eq!(projected.y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn poles_are_not_projected() {
        let projection = WebMercator::default();
        assert!(projection.project(&latlon!(90.0, 0.0)).is_none());
        assert!(projection.project(&latlon!(-90.0, 0.0)).is_none());
    }

    #[test]
    fn geom_projection_fails_if_any_point_fails() {
        let projection = WebMercator::default();
        let geom = Geom::Contour(vec![latlon!(0.0, 0.0), latlon!(90.0, 0.0)]);
        assert!(geom.project(|p| projection.project(p)).is_none());

        let geom = Geom::Contour(vec![latlon!(0.0, 0.0), latlon!(10.0, 10.0)]);
        assert!(geom.project(|p| projection.project(p)).is_some());
    }
}
