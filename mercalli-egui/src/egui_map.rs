use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use egui::{Color32, Event, Pos2, Sense, Stroke, TextureHandle, TextureOptions, Ui};
use mercalli::cartesian::{Point2d, Rect, Size};
use mercalli::control::{
    EventProcessor, MapController, MouseButton, RawUserEvent, UserEventHandler,
};
use mercalli::geo::GeoPoint2d;
use mercalli::layer::Attribution;
use mercalli::render::{Canvas, CirclePaint, DecodedImage, LinePaint};
use mercalli::{Map, Messenger};

/// Map widget with optional bindings to the application state.
///
/// The widget renders the map through the given [`EguiMapState`] and synchronizes the
/// map position and resolution with the bound variables in both directions.
pub struct EguiMap<'a> {
    state: &'a mut EguiMapState,
    position: Option<&'a mut GeoPoint2d>,
    resolution: Option<&'a mut f64>,
}

impl<'a> EguiMap<'a> {
    /// Creates a new widget.
    pub fn new(state: &'a mut EguiMapState) -> Self {
        Self {
            state,
            position: None,
            resolution: None,
        }
    }

    /// Binds the center position of the map to the given variable.
    pub fn with_position(&'a mut self, position: &'a mut GeoPoint2d) -> &'a mut Self {
        let curr_view = *self.state.map.view();
        if curr_view.position() != Some(*position) {
            self.state.map.set_view(curr_view.with_position(*position));
        }

        self.position = Some(position);
        self
    }

    /// Binds the resolution of the map to the given variable.
    pub fn with_resolution(&'a mut self, resolution: &'a mut f64) -> &'a mut Self {
        let curr_view = *self.state.map.view();
        if curr_view.resolution() != *resolution {
            self.state
                .map
                .set_view(curr_view.with_resolution(*resolution));
        }

        self.resolution = Some(resolution);
        self
    }

    /// Renders the map into the available space of the UI.
    pub fn show_ui(&mut self, ui: &mut Ui) {
        self.state.render(ui);

        let updated_view = self.state.map.view();
        if let Some(resolution) = &mut self.resolution {
            **resolution = updated_view.resolution();
        }

        if let Some(position) = &mut self.position {
            if let Some(view_position) = updated_view.position() {
                **position = view_position;
            }
        }
    }
}

/// Configuration of an [`EguiMapState`].
#[derive(Default)]
pub struct EguiMapOptions {
    /// Controller handling user interactions with the map.
    pub controller: MapController,
}

/// State of the map widget.
///
/// The state owns the [`Map`] and everything needed to render it into an egui UI and to
/// feed user input back into it. Call [`EguiMapState::render`] every frame to display
/// the map.
pub struct EguiMapState {
    map: Map,
    messenger: MapStateMessenger,
    requires_redraw: Arc<AtomicBool>,
    event_processor: EventProcessor,
    textures: TextureStore,
}

impl EguiMapState {
    /// Creates a new state.
    ///
    /// Sets up messengers for the map and all its layers, so that data loaded in
    /// background tasks triggers a repaint of the UI.
    pub fn new(
        mut map: Map,
        ctx: egui::Context,
        handlers: impl IntoIterator<Item = Box<dyn UserEventHandler>>,
        options: EguiMapOptions,
    ) -> Self {
        let requires_redraw = Arc::new(AtomicBool::new(true));
        let messenger = MapStateMessenger {
            context: ctx.clone(),
            requires_redraw: requires_redraw.clone(),
        };

        map.set_messenger(Some(messenger.clone()));
        for layer in map.layers_mut().iter_mut() {
            layer.set_messenger(Box::new(messenger.clone()));
        }

        // Make the view usable before the first frame. The actual size is set by the UI
        // when the map is first rendered.
        map.set_size(Size::new(1.0, 1.0));

        let mut event_processor = EventProcessor::default();
        for handler in handlers {
            event_processor.add_handler_boxed(handler);
        }
        event_processor.add_handler(options.controller);

        Self {
            map,
            messenger,
            requires_redraw,
            event_processor,
            textures: TextureStore::default(),
        }
    }

    /// Requests redraw of the map.
    pub fn request_redraw(&self) {
        self.map.redraw();
    }

    /// Messenger connected to this state.
    ///
    /// Give a clone of it to layers added to the map after the state was created, so
    /// that they can request repaints of the UI.
    pub fn messenger(&self) -> &MapStateMessenger {
        &self.messenger
    }

    /// The map displayed by the widget.
    pub fn map(&self) -> &Map {
        &self.map
    }

    /// Mutable reference to the map displayed by the widget.
    pub fn map_mut(&mut self) -> &mut Map {
        &mut self.map
    }

    /// Renders the map into the available space of the UI and processes the user input.
    pub fn render(&mut self, ui: &mut Ui) {
        self.requires_redraw.store(false, Ordering::Relaxed);

        let available_size = ui.available_size().floor();
        let (rect, response) = ui.allocate_exact_size(available_size, Sense::click_and_drag());

        if self.event_processor.is_dragging() || response.contains_pointer() {
            let events = ui.input(|input_state| input_state.events.clone());
            self.process_events(&events, [-rect.left(), -rect.top()]);
        }

        self.map.animate();

        let size = Size::new(available_size.x as f64, available_size.y as f64);
        if self.map.view().size() != size {
            log::trace!("Resizing map to size: {size:?}");
            self.map.set_size(size);
        }

        self.map.load_layers();

        let view = *self.map.view();
        let mut canvas = EguiCanvas::new(ui.painter_at(rect), rect, size, &mut self.textures);
        for layer in self.map.layers().iter_visible() {
            layer.render(&view, &mut canvas);
        }
        canvas.finish();

        self.show_attributions(ui);
    }

    fn show_attributions(&self, ui: &Ui) {
        let attributions: Vec<Attribution> = self
            .map
            .layers()
            .iter_visible()
            .filter_map(|layer| layer.attribution())
            .collect();
        if attributions.is_empty() {
            return;
        }

        egui::Window::new("Attributions")
            .collapsible(false)
            .title_bar(false)
            .resizable(false)
            .anchor(egui::Align2::LEFT_BOTTOM, [10.0, -10.0])
            .show(ui.ctx(), |ui| {
                ui.horizontal_wrapped(|ui| {
                    for (index, attribution) in attributions.iter().enumerate() {
                        if index > 0 {
                            ui.label("|");
                        }

                        match attribution.get_url() {
                            Some(url) => {
                                ui.hyperlink_to(attribution.get_text(), url);
                            }
                            None => {
                                ui.label(attribution.get_text());
                            }
                        }
                    }
                });
            });
    }

    fn process_events(&mut self, events: &[Event], offset: [f32; 2]) {
        for event in events {
            if let Some(raw_event) = Self::convert_event(event, offset) {
                self.event_processor.handle(raw_event, &mut self.map);
            }
        }
    }

    fn convert_event(event: &Event, offset: [f32; 2]) -> Option<RawUserEvent> {
        match event {
            Event::PointerButton {
                button, pressed, ..
            } => {
                let button = match button {
                    egui::PointerButton::Primary => MouseButton::Left,
                    egui::PointerButton::Secondary => MouseButton::Right,
                    egui::PointerButton::Middle => MouseButton::Middle,
                    _ => MouseButton::Other,
                };

                Some(match pressed {
                    true => RawUserEvent::ButtonPressed(button),
                    false => RawUserEvent::ButtonReleased(button),
                })
            }
            Event::PointerMoved(position) => {
                let pointer_position = Point2d::new(
                    (position.x + offset[0]) as f64,
                    (position.y + offset[1]) as f64,
                );
                Some(RawUserEvent::PointerMoved(pointer_position))
            }
            Event::MouseWheel { delta, .. } => {
                let zoom = delta[1] as f64;

                if zoom.abs() < 0.0001 {
                    return None;
                }

                Some(RawUserEvent::Scroll(zoom))
            }
            _ => None,
        }
    }
}

/// Textures created for the images drawn to the map.
///
/// Images are identified by their [`DecodedImage::id`], so every image is uploaded to
/// the GPU only once. Textures that were not used during a frame are dropped.
#[derive(Default)]
struct TextureStore {
    textures: HashMap<u64, TextureHandle>,
    used: HashSet<u64>,
}

impl TextureStore {
    fn texture(&mut self, ctx: &egui::Context, image: &DecodedImage) -> TextureHandle {
        self.used.insert(image.id());
        self.textures
            .entry(image.id())
            .or_insert_with(|| {
                let color_image = egui::ColorImage::from_rgba_unmultiplied(
                    [image.width() as usize, image.height() as usize],
                    image.bytes(),
                );
                ctx.load_texture(
                    format!("mercalli-image-{}", image.id()),
                    color_image,
                    TextureOptions::LINEAR,
                )
            })
            .clone()
    }

    fn sweep(&mut self) {
        let used = std::mem::take(&mut self.used);
        self.textures.retain(|id, _| used.contains(id));
    }
}

/// [`Canvas`] drawing through an [`egui::Painter`] clipped to the map widget area.
struct EguiCanvas<'a> {
    painter: egui::Painter,
    origin: Pos2,
    size: Size,
    textures: &'a mut TextureStore,
}

impl<'a> EguiCanvas<'a> {
    fn new(
        painter: egui::Painter,
        rect: egui::Rect,
        size: Size,
        textures: &'a mut TextureStore,
    ) -> Self {
        Self {
            painter,
            origin: rect.min,
            size,
            textures,
        }
    }

    fn to_screen(&self, point: Point2d) -> Pos2 {
        Pos2::new(
            self.origin.x + point.x as f32,
            self.origin.y + point.y as f32,
        )
    }

    fn finish(self) {
        self.textures.sweep();
    }
}

impl Canvas for EguiCanvas<'_> {
    fn size(&self) -> Size {
        self.size
    }

    fn draw_image(&mut self, image: &DecodedImage, rect: Rect, opacity: u8) {
        if !rect.x_min().is_finite()
            || !rect.y_min().is_finite()
            || !rect.x_max().is_finite()
            || !rect.y_max().is_finite()
        {
            return;
        }

        let texture = self.textures.texture(self.painter.ctx(), image);
        let egui_rect = egui::Rect::from_min_max(
            self.to_screen(Point2d::new(rect.x_min(), rect.y_min())),
            self.to_screen(Point2d::new(rect.x_max(), rect.y_max())),
        );
        let uv = egui::Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(1.0, 1.0));

        self.painter.image(
            texture.id(),
            egui_rect,
            uv,
            Color32::from_white_alpha(opacity),
        );
    }

    fn draw_circle(&mut self, center: Point2d, paint: CirclePaint) {
        if !center.x.is_finite() || !center.y.is_finite() {
            return;
        }
        if !paint.radius.is_finite() || paint.radius <= 0.0 {
            return;
        }

        let stroke = match paint.outline {
            Some(outline) => Stroke::new(outline.width as f32, to_color32(outline.color)),
            None => Stroke::NONE,
        };

        self.painter.circle(
            self.to_screen(center),
            paint.radius as f32,
            to_color32(paint.fill),
            stroke,
        );
    }

    fn draw_contour(&mut self, points: &[Point2d], paint: LinePaint) {
        let points: Vec<Pos2> = points
            .iter()
            .filter(|p| p.x.is_finite() && p.y.is_finite())
            .map(|p| self.to_screen(*p))
            .collect();
        if points.len() < 2 {
            return;
        }

        self.painter.add(egui::Shape::line(
            points,
            Stroke::new(paint.width as f32, to_color32(paint.color)),
        ));
    }
}

fn to_color32(color: mercalli::Color) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), color.a())
}

/// Messenger that requests a repaint of the egui context when the map needs to be
/// redrawn.
#[derive(Debug, Clone)]
pub struct MapStateMessenger {
    /// Flag set when a redraw was requested since the start of the last frame.
    pub requires_redraw: Arc<AtomicBool>,
    /// Context of the UI to request repaints of.
    pub context: egui::Context,
}

impl Messenger for MapStateMessenger {
    fn request_redraw(&self) {
        log::trace!("Redraw requested");
        if !self.requires_redraw.swap(true, Ordering::Relaxed) {
            self.context.request_repaint();
        }
    }
}
