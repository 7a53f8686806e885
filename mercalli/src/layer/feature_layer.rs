//! Layer rendering a set of features with a common symbol.

use parking_lot::RwLock;

use crate::cartesian::Point2d;
use crate::geo::{Geom, WebMercator};
use crate::layer::symbol::{RenderPrimitive, Symbol};
use crate::layer::{Attribution, Feature, Layer};
use crate::messenger::Messenger;
use crate::render::Canvas;
use crate::view::MapView;

/// Feature found by [`FeatureLayer::features_at`].
#[derive(Debug)]
pub struct FeatureHit<'a, F> {
    /// Position of the feature in the layer's feature list.
    pub index: usize,
    /// The feature itself.
    pub feature: &'a F,
    /// Distance from the query point to the feature in screen pixels.
    pub distance: f64,
}

/// Layer displaying a set of features styled by a single symbol.
///
/// Feature geometries are projected into map coordinates once and cached, so the set
/// of features cannot change after the layer is created. The symbol can be changed at
/// any time through [`symbol_mut`](FeatureLayer::symbol_mut).
pub struct FeatureLayer<F, S> {
    features: Vec<F>,
    symbol: S,
    projected: RwLock<Option<Vec<Option<Geom<Point2d>>>>>,
    messenger: RwLock<Option<Box<dyn Messenger>>>,
    attribution: Option<Attribution>,
}

impl<F, S> FeatureLayer<F, S>
where
    F: Feature,
    S: Symbol<F>,
{
    /// Creates a new layer.
    pub fn new(features: Vec<F>, symbol: S) -> Self {
        Self {
            features,
            symbol,
            projected: RwLock::new(None),
            messenger: RwLock::new(None),
            attribution: None,
        }
    }

    /// Sets the attribution to be displayed for the layer.
    pub fn with_attribution(mut self, attribution: Attribution) -> Self {
        self.attribution = Some(attribution);
        self
    }

    /// Features of the layer.
    pub fn features(&self) -> &[F] {
        &self.features
    }

    /// Symbol used to render the features.
    pub fn symbol(&self) -> &S {
        &self.symbol
    }

    /// Mutable reference to the symbol used to render the features.
    pub fn symbol_mut(&mut self) -> &mut S {
        &mut self.symbol
    }

    /// Requests redraw of the map through the messenger given to the layer.
    pub fn request_redraw(&self) {
        if let Some(messenger) = &(*self.messenger.read()) {
            messenger.request_redraw();
        }
    }

    /// Returns point features of the layer closer to the given screen point than
    /// `tolerance` pixels, in the layer order.
    ///
    /// Line and polygon features are not considered.
    pub fn features_at(
        &self,
        view: &MapView,
        screen_point: Point2d,
        tolerance: f64,
    ) -> Vec<FeatureHit<'_, F>> {
        self.ensure_projected();

        let mut hits = vec![];
        let projected = self.projected.read();
        let Some(projected) = &(*projected) else {
            return hits;
        };

        for (index, geom) in projected.iter().enumerate() {
            let Some(Geom::Point(map_position)) = geom else {
                continue;
            };

            let px_position = view.map_to_screen(*map_position);
            let distance = (px_position - screen_point).norm();
            if distance.is_finite() && distance <= tolerance {
                hits.push(FeatureHit {
                    index,
                    feature: &self.features[index],
                    distance,
                });
            }
        }

        hits
    }

    fn ensure_projected(&self) {
        if self.projected.read().is_some() {
            return;
        }

        let projection = WebMercator::default();
        let projected = self
            .features
            .iter()
            .map(|feature| {
                feature
                    .geometry()
                    .project(|point| projection.project(point))
            })
            .collect();

        *self.projected.write() = Some(projected);
    }
}

impl<F, S> Layer for FeatureLayer<F, S>
where
    F: Feature + Send + Sync,
    S: Symbol<F> + Send + Sync,
{
    fn render(&self, view: &MapView, canvas: &mut dyn Canvas) {
        self.ensure_projected();

        let projected = self.projected.read();
        let Some(projected) = &(*projected) else {
            return;
        };

        for (feature, geom) in self.features.iter().zip(projected.iter()) {
            let Some(geom) = geom else {
                continue;
            };

            for primitive in self.symbol.render(feature, geom) {
                match primitive {
                    RenderPrimitive::Circle { center, paint } => {
                        canvas.draw_circle(view.map_to_screen(center), paint);
                    }
                    RenderPrimitive::Contour { points, paint } => {
                        let px_points: Vec<Point2d> =
                            points.iter().map(|p| view.map_to_screen(*p)).collect();
                        canvas.draw_contour(&px_points, paint);
                    }
                }
            }
        }
    }

    fn prepare(&self, _view: &MapView) {
        self.ensure_projected();
    }

    fn set_messenger(&mut self, messenger: Box<dyn Messenger>) {
        *self.messenger.write() = Some(messenger);
    }

    fn attribution(&self) -> Option<Attribution> {
        self.attribution.clone()
    }
}
