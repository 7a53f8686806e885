//! Data model of the earthquake feed and the plate boundary document.
//!
//! Both documents are GeoJSON `FeatureCollection`s. Parsing is tolerant: unknown
//! properties are ignored, features with broken coordinates are skipped, and missing
//! attribute values degrade to `NaN` or empty strings so that a single bad record
//! never fails the whole feed.

use geojson::FeatureCollection;
use mercalli::geo::{GeoPoint2d, Geom};
use mercalli::geojson::geometry_to_geom;
use mercalli::layer::Feature;

use crate::loader::QuakeMapError;

/// One earthquake record of the feed.
#[derive(Debug, Clone)]
pub struct Earthquake {
    magnitude: f64,
    place: String,
    time_ms: i64,
    detail_url: String,
    location: Geom<GeoPoint2d>,
}

impl Earthquake {
    /// Creates a new record.
    pub fn new(
        magnitude: f64,
        place: impl Into<String>,
        time_ms: i64,
        detail_url: impl Into<String>,
        location: GeoPoint2d,
    ) -> Self {
        Self {
            magnitude,
            place: place.into(),
            time_ms,
            detail_url: detail_url.into(),
            location: Geom::Point(location),
        }
    }

    /// Magnitude of the earthquake. `NaN` if the feed does not provide one.
    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    /// Human-readable description of the location.
    pub fn place(&self) -> &str {
        &self.place
    }

    /// Time of the event in milliseconds since the Unix epoch.
    pub fn time_ms(&self) -> i64 {
        self.time_ms
    }

    /// URL of the event detail page.
    pub fn detail_url(&self) -> &str {
        &self.detail_url
    }
}

impl Feature for Earthquake {
    fn geometry(&self) -> &Geom<GeoPoint2d> {
        &self.location
    }
}

/// Parses the earthquake feed document.
pub fn parse_earthquakes(json: &str) -> Result<Vec<Earthquake>, QuakeMapError> {
    let collection = parse_collection(json)?;
    Ok(collection
        .features
        .iter()
        .filter_map(feature_to_earthquake)
        .collect())
}

/// Parses the tectonic plate boundaries document into fault-line geometries.
pub fn parse_boundaries(json: &str) -> Result<Vec<Geom<GeoPoint2d>>, QuakeMapError> {
    let collection = parse_collection(json)?;
    Ok(collection
        .features
        .iter()
        .filter_map(|feature| feature.geometry.as_ref())
        .filter_map(geometry_to_geom)
        .collect())
}

fn parse_collection(json: &str) -> Result<FeatureCollection, QuakeMapError> {
    json.parse()
        .map_err(|error: geojson::Error| QuakeMapError::Decode(error.to_string()))
}

fn feature_to_earthquake(feature: &geojson::Feature) -> Option<Earthquake> {
    let location = geometry_to_geom(feature.geometry.as_ref()?)?;

    Some(Earthquake {
        magnitude: property_f64(feature, "mag").unwrap_or(f64::NAN),
        place: property_string(feature, "place"),
        time_ms: property_i64(feature, "time").unwrap_or(0),
        detail_url: property_string(feature, "url"),
        location,
    })
}

fn property_f64(feature: &geojson::Feature, name: &str) -> Option<f64> {
    feature.property(name)?.as_f64()
}

fn property_i64(feature: &geojson::Feature, name: &str) -> Option<i64> {
    feature.property(name)?.as_i64()
}

fn property_string(feature: &geojson::Feature, name: &str) -> String {
    feature
        .property(name)
        .and_then(|value| value.as_str())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mercalli::latlon;

    const FEED: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"mag": 2.5, "place": "10km N of Testville", "time": 0, "url": "http://x", "status": "reviewed"},
                "geometry": {"type": "Point", "coordinates": [-15.0, 15.0, 10.2]}
            },
            {
                "type": "Feature",
                "properties": {"mag": null, "time": 1700000000000},
                "geometry": {"type": "Point", "coordinates": [100.0, -30.0]}
            },
            {
                "type": "Feature",
                "properties": {"mag": 4.1, "place": "nowhere", "time": 1, "url": "http://y"},
                "geometry": null
            }
        ]
    }"#;

    #[test]
    fn parse_feed_features() {
        let earthquakes = parse_earthquakes(FEED).unwrap();
        assert_eq!(earthquakes.len(), 2);

        let first = &earthquakes[0];
        assert_eq!(first.magnitude(), 2.5);
        assert_eq!(first.place(), "10km N of Testville");
        assert_eq!(first.time_ms(), 0);
        assert_eq!(first.detail_url(), "http://x");
        assert_eq!(first.geometry(), &Geom::Point(latlon!(15.0, -15.0)));
    }

    #[test]
    fn missing_properties_degrade_per_feature() {
        let earthquakes = parse_earthquakes(FEED).unwrap();

        let second = &earthquakes[1];
        assert!(second.magnitude().is_nan());
        assert_eq!(second.place(), "");
        assert_eq!(second.time_ms(), 1700000000000);
        assert_eq!(second.detail_url(), "");
    }

    #[test]
    fn features_without_geometry_are_skipped() {
        let earthquakes = parse_earthquakes(FEED).unwrap();
        assert!(earthquakes.iter().all(|quake| quake.magnitude() != 4.1));
    }

    #[test]
    fn invalid_json_is_a_decode_error() {
        assert_matches::assert_matches!(
            parse_earthquakes("not geojson"),
            Err(QuakeMapError::Decode(_))
        );
    }

    #[test]
    fn parse_boundary_lines() {
        let json = r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": {"Name": "AF-AN"},
                    "geometry": {"type": "LineString", "coordinates": [[0.0, 0.0], [10.0, 10.0]]}
                }
            ]
        }"#;

        let boundaries = parse_boundaries(json).unwrap();
        assert_eq!(boundaries.len(), 1);
        assert_eq!(
            boundaries[0],
            Geom::Contour(vec![latlon!(0.0, 0.0), latlon!(10.0, 10.0)])
        );
    }
}
