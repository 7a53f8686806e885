//! Loading of the GeoJSON documents the map is built from.

use std::path::PathBuf;

use mercalli::geo::{GeoPoint2d, Geom};
use thiserror::Error;

use crate::config::QuakeMapConfig;
use crate::feed::{self, Earthquake};

/// Error that can be returned when loading the map data.
#[derive(Debug, Error)]
pub enum QuakeMapError {
    /// Failed to download a document.
    #[error("failed to load {url}: {reason}")]
    Fetch {
        /// URL the document was requested from.
        url: String,
        /// What went wrong with the request.
        reason: String,
    },
    /// Failed to read a local document.
    #[error("failed to read {}", .path.display())]
    File {
        /// Path of the document.
        path: PathBuf,
        /// Underlying file system error.
        #[source]
        source: std::io::Error,
    },
    /// A document is not valid GeoJSON.
    #[error("failed to decode GeoJSON: {0}")]
    Decode(String),
}

/// Where a GeoJSON document is loaded from.
///
/// Configuration values starting with an HTTP scheme are downloaded, anything
/// else is treated as a path in the local file system. Local files make it
/// possible to run the map without network access or against captured feeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// Download the document over HTTP.
    Url(String),
    /// Read the document from a local file.
    File(PathBuf),
}

impl DataSource {
    /// Classifies a configuration value as a URL or a file path.
    pub fn from_config_value(value: &str) -> Self {
        if value.starts_with("http://") || value.starts_with("https://") {
            DataSource::Url(value.to_string())
        } else {
            DataSource::File(value.into())
        }
    }
}

/// Both documents the full map needs, loaded and parsed.
#[derive(Debug)]
pub struct LoadedData {
    /// Tectonic plate boundary lines.
    pub boundaries: Vec<Geom<GeoPoint2d>>,
    /// Earthquakes from the feed.
    pub earthquakes: Vec<Earthquake>,
}

/// Loads the plate boundaries and the earthquake feed.
///
/// The boundaries are loaded first, and the feed is not requested at all if
/// they fail. The caller gets either a complete data set or an error.
pub async fn load(
    client: &reqwest::Client,
    config: &QuakeMapConfig,
) -> Result<LoadedData, QuakeMapError> {
    let boundaries = load_boundaries(
        client,
        &DataSource::from_config_value(&config.plate_boundaries_url),
    )
    .await?;
    let earthquakes = load_earthquakes(
        client,
        &DataSource::from_config_value(&config.quake_feed_url),
    )
    .await?;

    Ok(LoadedData {
        boundaries,
        earthquakes,
    })
}

/// Loads and parses the earthquake feed.
pub async fn load_earthquakes(
    client: &reqwest::Client,
    source: &DataSource,
) -> Result<Vec<Earthquake>, QuakeMapError> {
    let json = fetch_document(client, source).await?;
    feed::parse_earthquakes(&json)
}

/// Loads and parses the plate boundaries document.
pub async fn load_boundaries(
    client: &reqwest::Client,
    source: &DataSource,
) -> Result<Vec<Geom<GeoPoint2d>>, QuakeMapError> {
    let json = fetch_document(client, source).await?;
    feed::parse_boundaries(&json)
}

async fn fetch_document(
    client: &reqwest::Client,
    source: &DataSource,
) -> Result<String, QuakeMapError> {
    match source {
        DataSource::Url(url) => {
            log::info!("Loading {url}");
            let response = client
                .get(url)
                .send()
                .await
                .map_err(|error| QuakeMapError::Fetch {
                    url: url.clone(),
                    reason: error.to_string(),
                })?;

            if !response.status().is_success() {
                return Err(QuakeMapError::Fetch {
                    url: url.clone(),
                    reason: format!("server returned status {}", response.status()),
                });
            }

            response.text().await.map_err(|error| QuakeMapError::Fetch {
                url: url.clone(),
                reason: error.to_string(),
            })
        }
        DataSource::File(path) => {
            log::info!("Loading {}", path.display());
            std::fs::read_to_string(path).map_err(|source| QuakeMapError::File {
                path: path.clone(),
                source,
            })
        }
    }
}

/// Creates the HTTP client used for the feed requests.
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(concat!("quake-map/", env!("CARGO_PKG_VERSION")))
        .build()
        .expect("Failed to initialize http client")
}
