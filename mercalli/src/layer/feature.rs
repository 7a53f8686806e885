use crate::geo::{GeoPoint2d, Geom};

/// An object displayed by a feature layer.
///
/// Features combine a geometry with the attributes a [`Symbol`](super::symbol::Symbol)
/// may use to style it.
pub trait Feature {
    /// Geometry of the feature in geographic coordinates.
    fn geometry(&self) -> &Geom<GeoPoint2d>;
}

impl Feature for Geom<GeoPoint2d> {
    fn geometry(&self) -> &Geom<GeoPoint2d> {
        self
    }
}
