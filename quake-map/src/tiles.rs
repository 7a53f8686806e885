//! Base tile sets the map can draw under the data layers.
//!
//! All three sets are Mapbox styles served through the static tiles API. The
//! fault line overlay is recolored per set so it stays readable over both the
//! dark satellite imagery and the light street styles.

use mercalli::layer::Attribution;
use mercalli::tile_schema::TileIndex;
use mercalli::Color;

/// Attribution text shown for every base tile set.
const TILE_ATTRIBUTION: &str =
    "Map data © OpenStreetMap contributors, CC-BY-SA, Imagery © Mapbox";

/// A selectable base tile style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseTileSet {
    /// Satellite imagery.
    Satellite,
    /// Light grayscale street map.
    Grayscale,
    /// Terrain-oriented street map.
    Outdoors,
}

impl BaseTileSet {
    /// All selectable tile sets, in the order they are listed in the layer control.
    pub const ALL: [BaseTileSet; 3] = [
        BaseTileSet::Satellite,
        BaseTileSet::Grayscale,
        BaseTileSet::Outdoors,
    ];

    /// Human-readable name for the layer control.
    pub fn name(&self) -> &'static str {
        match self {
            BaseTileSet::Satellite => "Satellite",
            BaseTileSet::Grayscale => "Grayscale",
            BaseTileSet::Outdoors => "Outdoors",
        }
    }

    /// Mapbox style id of the tile set.
    pub fn style_id(&self) -> &'static str {
        match self {
            BaseTileSet::Satellite => "mapbox/satellite-v9",
            BaseTileSet::Grayscale => "mapbox/light-v10",
            BaseTileSet::Outdoors => "mapbox/outdoors-v11",
        }
    }

    /// Color of the tectonic fault lines drawn over this tile set.
    pub fn fault_line_color(&self) -> Color {
        match self {
            BaseTileSet::Satellite => Color::ORANGE,
            BaseTileSet::Grayscale => Color::YELLOW,
            BaseTileSet::Outdoors => Color::WHITE,
        }
    }

    /// URL of one 256 px tile of this set.
    pub fn tile_url(&self, index: TileIndex, access_token: &str) -> String {
        format!(
            "https://api.mapbox.com/styles/v1/{}/tiles/256/{}/{}/{}?access_token={}",
            self.style_id(),
            index.z,
            index.x,
            index.y,
            access_token
        )
    }

    /// Attribution of the tile set.
    pub fn attribution(&self) -> Attribution {
        Attribution::new(
            TILE_ATTRIBUTION.to_string(),
            Some("https://www.mapbox.com/".to_string()),
        )
    }
}
