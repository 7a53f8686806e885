//! Levels of detail of a tile pyramid.

/// Level of detail of a layer or map.
///
/// Resolution is the size of a screen pixel in map units at this level.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Lod {
    resolution: f64,
    z_index: u32,
}

impl Lod {
    /// Creates a new level of detail.
    ///
    /// Returns `None` if the resolution is zero or not finite.
    pub fn new(resolution: f64, z_index: u32) -> Option<Lod> {
        if resolution.is_finite() && resolution != 0.0 {
            Some(Self {
                resolution,
                z_index,
            })
        } else {
            None
        }
    }

    /// Z-index associated with this LOD.
    pub fn z_index(&self) -> u32 {
        self.z_index
    }

    /// Resolution of the LOD.
    pub fn resolution(&self) -> f64 {
        self.resolution
    }
}

impl PartialEq for Lod {
    fn eq(&self, other: &Self) -> bool {
        self.resolution == other.resolution
    }
}

impl Eq for Lod {}

impl PartialOrd for Lod {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Lod {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.resolution
            .partial_cmp(&other.resolution)
            .unwrap_or_else(|| self.z_index.cmp(&other.z_index))
    }
}
