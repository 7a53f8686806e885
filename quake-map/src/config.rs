//! Application configuration.

use std::path::PathBuf;

/// USGS feed with all earthquakes of the last 24 hours.
const DEFAULT_QUAKE_FEED_URL: &str =
    "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_day.geojson";

/// PB2002 tectonic plate boundaries.
const DEFAULT_PLATE_BOUNDARIES_URL: &str =
    "https://raw.githubusercontent.com/fraxen/tectonicplates/master/GeoJSON/PB2002_boundaries.json";

/// Runtime configuration of the earthquake map.
///
/// [`QuakeMapConfig::from_env`] fills it from environment variables, falling
/// back to the defaults below for everything that is not set. The data source
/// values accept either a URL or a local file path (see
/// [`DataSource`](crate::loader::DataSource)).
#[derive(Debug, Clone)]
pub struct QuakeMapConfig {
    /// Access token sent with every Mapbox tile request.
    pub mapbox_access_token: String,
    /// Where to load the earthquake GeoJSON feed from.
    pub quake_feed_url: String,
    /// Where to load the tectonic plate boundaries GeoJSON from.
    pub plate_boundaries_url: String,
    /// Directory for the tile cache.
    pub tile_cache_dir: PathBuf,
}

impl Default for QuakeMapConfig {
    fn default() -> Self {
        Self {
            mapbox_access_token: String::new(),
            quake_feed_url: DEFAULT_QUAKE_FEED_URL.to_string(),
            plate_boundaries_url: DEFAULT_PLATE_BOUNDARIES_URL.to_string(),
            tile_cache_dir: ".tile_cache".into(),
        }
    }
}

impl QuakeMapConfig {
    /// Reads the configuration from the environment.
    ///
    /// Recognized variables are `MAPBOX_ACCESS_TOKEN`, `QUAKE_FEED_URL`,
    /// `PLATE_BOUNDARIES_URL` and `TILE_CACHE_DIR`. A missing access token is
    /// not an error, but tile requests will be rejected by the server until
    /// one is provided.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        match std::env::var("MAPBOX_ACCESS_TOKEN") {
            Ok(token) if !token.is_empty() => config.mapbox_access_token = token,
            _ => log::warn!(
                "MAPBOX_ACCESS_TOKEN is not set, base tiles will not be available"
            ),
        }

        if let Ok(url) = std::env::var("QUAKE_FEED_URL") {
            config.quake_feed_url = url;
        }

        if let Ok(url) = std::env::var("PLATE_BOUNDARIES_URL") {
            config.plate_boundaries_url = url;
        }

        if let Ok(dir) = std::env::var("TILE_CACHE_DIR") {
            config.tile_cache_dir = dir.into();
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_sources_are_the_public_feeds() {
        let config = QuakeMapConfig::default();
        assert!(config.quake_feed_url.contains("earthquake.usgs.gov"));
        assert!(config.quake_feed_url.ends_with("all_day.geojson"));
        assert!(config.plate_boundaries_url.ends_with("PB2002_boundaries.json"));
        assert_eq!(config.tile_cache_dir, PathBuf::from(".tile_cache"));
        assert!(config.mapbox_access_token.is_empty());
    }
}
