//! The egui application around the map: loading screen, layer control, legend and
//! earthquake popups.

use std::sync::Arc;

use egui::{Align2, Color32, RichText, Sense, Spinner, Vec2};
use mercalli::cartesian::Point2d;
use mercalli::control::{EventPropagation, MouseButton, UserEvent, UserEventHandler};
use mercalli::Map;
use mercalli_egui::{EguiMap, EguiMapOptions, EguiMapState};
use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::config::QuakeMapConfig;
use crate::loader::{self, LoadedData, QuakeMapError};
use crate::popup::format_time;
use crate::session::{self, Overlay, QuakeSession};
use crate::tiles::BaseTileSet;

/// Map widget together with the earthquake UI drawn around it.
///
/// Clicks on the map are recorded by the handler returned from
/// [`MapUi::click_handler`] and resolved against the earthquake markers on the next
/// frame, opening or closing the popup.
pub struct MapUi {
    map: EguiMapState,
    session: QuakeSession,
    pending_click: Arc<Mutex<Option<Point2d>>>,
}

impl MapUi {
    /// Creates the widget state for a freshly composed map.
    pub fn new(ctx: egui::Context, map: Map, session: QuakeSession) -> Self {
        let pending_click = Arc::new(Mutex::new(None));
        let controller = session.controller();
        let state = EguiMapState::new(
            map,
            ctx,
            [Box::new(Self::click_handler(pending_click.clone())) as Box<dyn UserEventHandler>],
            EguiMapOptions { controller },
        );

        Self::from_state(state, session, pending_click)
    }

    /// Creates the widget state over an already initialized map state.
    ///
    /// `pending_click` must be the slot given to the [`MapUi::click_handler`] the state
    /// was created with.
    pub fn from_state(
        state: EguiMapState,
        mut session: QuakeSession,
        pending_click: Arc<Mutex<Option<Point2d>>>,
    ) -> Self {
        session.set_messenger(Arc::new(state.messenger().clone()));

        Self {
            map: state,
            session,
            pending_click,
        }
    }

    /// Handler that records left button clicks into the given slot.
    ///
    /// The clicks are matched against the markers when the map is next rendered.
    pub fn click_handler(slot: Arc<Mutex<Option<Point2d>>>) -> impl UserEventHandler {
        move |event: &UserEvent, _: &mut Map| match event {
            UserEvent::Click(MouseButton::Left, mouse_event) => {
                *slot.lock() = Some(mouse_event.screen_pointer_position);
                EventPropagation::Stop
            }
            _ => EventPropagation::Propagate,
        }
    }

    /// Renders the map and resolves the recorded clicks.
    pub fn show_map(&mut self, ui: &mut egui::Ui) {
        EguiMap::new(&mut self.map).show_ui(ui);

        if let Some(click) = self.pending_click.lock().take() {
            let view = *self.map.map().view();
            match self.session.hit_test(&view, click) {
                Some(index) => self.session.open_popup(index),
                None => self.session.close_popup(),
            }
        }
    }

    /// Renders the layer control with the base tile selector and overlay toggles.
    pub fn show_layer_control(&mut self, ctx: &egui::Context) {
        egui::Window::new("Layers")
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::RIGHT_TOP, [-10.0, 10.0])
            .show(ctx, |ui| {
                let mut selected = self.session.base_tiles();
                for set in BaseTileSet::ALL {
                    ui.radio_value(&mut selected, set, set.name());
                }
                if selected != self.session.base_tiles() {
                    self.session.select_base_tiles(self.map.map_mut(), selected);
                }

                ui.separator();

                if self.session.has_fault_lines() {
                    let mut visible = self
                        .session
                        .overlay_visible(self.map.map(), Overlay::FaultLines);
                    if ui.checkbox(&mut visible, "Fault Lines").changed() {
                        self.session.set_overlay_visible(
                            self.map.map_mut(),
                            Overlay::FaultLines,
                            visible,
                        );
                    }
                }

                let mut visible = self
                    .session
                    .overlay_visible(self.map.map(), Overlay::Earthquakes);
                if ui.checkbox(&mut visible, "Earthquakes").changed() {
                    self.session.set_overlay_visible(
                        self.map.map_mut(),
                        Overlay::Earthquakes,
                        visible,
                    );
                }
            });
    }

    /// Renders the magnitude color legend.
    pub fn show_legend(&mut self, ctx: &egui::Context) {
        if !self.session.legend_visible() {
            return;
        }

        egui::Window::new("Legend")
            .collapsible(false)
            .title_bar(false)
            .resizable(false)
            .anchor(Align2::RIGHT_BOTTOM, [-10.0, -10.0])
            .show(ctx, |ui| {
                for entry in self.session.legend() {
                    ui.horizontal(|ui| {
                        let (rect, _) =
                            ui.allocate_exact_size(Vec2::new(16.0, 16.0), Sense::hover());
                        ui.painter().rect_filled(rect, 2, to_color32(entry.color));
                        ui.label(&entry.label);
                    });
                }
            });
    }

    /// Renders the popup of the selected earthquake.
    pub fn show_popup(&mut self, ctx: &egui::Context) {
        let Some(quake) = self.session.popup().cloned() else {
            return;
        };

        let mut open = true;
        egui::Window::new("Earthquake")
            .collapsible(false)
            .resizable(false)
            .open(&mut open)
            .show(ctx, |ui| {
                ui.label(RichText::new(format!("Magnitude: {}", quake.magnitude())).strong());
                ui.hyperlink_to(quake.place(), quake.detail_url());
                ui.label(format_time(quake.time_ms()));
            });

        if !open {
            self.session.close_popup();
        }
    }
}

enum AppState {
    Loading {
        result: oneshot::Receiver<Result<LoadedData, QuakeMapError>>,
    },
    Ready(Box<MapUi>),
    Failed(String),
}

/// Application that loads the map data in the background and then displays the map.
///
/// While the data is loading, a spinner is shown. If loading fails, the application
/// stays up and displays the error instead of the map.
pub struct QuakeMapApp {
    config: QuakeMapConfig,
    state: AppState,
}

impl QuakeMapApp {
    /// Creates the application and starts loading the map data.
    pub fn new(cc: &eframe::CreationContext<'_>, config: QuakeMapConfig) -> Self {
        let (sender, receiver) = oneshot::channel();
        let ctx = cc.egui_ctx.clone();
        let load_config = config.clone();

        tokio::spawn(async move {
            let client = loader::http_client();
            let result = loader::load(&client, &load_config).await;
            if sender.send(result).is_err() {
                log::warn!("Loaded map data discarded: the UI is gone");
            }

            ctx.request_repaint();
        });

        Self {
            config,
            state: AppState::Loading { result: receiver },
        }
    }

    fn poll_loader(&mut self, ctx: &egui::Context) {
        let AppState::Loading { result } = &mut self.state else {
            return;
        };

        match result.try_recv() {
            Ok(Ok(data)) => {
                let (map, session) = session::compose(data, &self.config);
                self.state = AppState::Ready(Box::new(MapUi::new(ctx.clone(), map, session)));
            }
            Ok(Err(error)) => {
                log::error!("Failed to load map data: {error}");
                self.state = AppState::Failed(error.to_string());
            }
            Err(oneshot::error::TryRecvError::Empty) => {}
            Err(oneshot::error::TryRecvError::Closed) => {
                self.state = AppState::Failed("data loading was interrupted".to_string());
            }
        }
    }
}

impl eframe::App for QuakeMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_loader(ctx);

        match &mut self.state {
            AppState::Loading { .. } => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.centered_and_justified(|ui| {
                        ui.add(Spinner::new().size(48.0));
                    });
                });
            }
            AppState::Ready(map_ui) => {
                egui::CentralPanel::default().show(ctx, |ui| map_ui.show_map(ui));
                map_ui.show_layer_control(ctx);
                map_ui.show_legend(ctx);
                map_ui.show_popup(ctx);
            }
            AppState::Failed(message) => {
                egui::CentralPanel::default().show(ctx, |_| {});
                egui::Modal::new(egui::Id::new("load_error")).show(ctx, |ui| {
                    ui.heading("Failed to load map data");
                    ui.label(message.as_str());
                });
            }
        }
    }
}

fn to_color32(color: mercalli::Color) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), color.a())
}
