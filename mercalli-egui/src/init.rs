use std::time::Duration;

use eframe::AppCreator;
use mercalli::control::UserEventHandler;
use mercalli::Map;
use tokio::runtime::Runtime;

use crate::{EguiMapOptions, EguiMapState};

struct MapApp {
    map: EguiMapState,
}

impl eframe::App for MapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            self.map.render(ui);
        });
    }
}

type AppBuilder = Box<dyn FnOnce(EguiMapState) -> Box<dyn eframe::App>>;

/// Builder for a basic map application.
///
/// Initializes logging, an async runtime and an `eframe` window, and then runs the
/// application displaying the given map. By default the whole window is covered by the
/// map widget. Use [`InitBuilder::with_app_builder`] to construct an application with
/// custom UI around the map instead.
pub struct InitBuilder {
    map: Map,
    app_name: String,
    handlers: Vec<Box<dyn UserEventHandler>>,
    options: EguiMapOptions,
    native_options: Option<eframe::NativeOptions>,
    app_builder: Option<AppBuilder>,
    logging: bool,
}

impl InitBuilder {
    /// Creates a new builder.
    pub fn new(map: Map) -> Self {
        Self {
            map,
            app_name: "Mercalli Map".into(),
            handlers: Vec::new(),
            options: EguiMapOptions::default(),
            native_options: None,
            app_builder: None,
            logging: true,
        }
    }

    /// Sets the title of the application window.
    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }

    /// Adds custom user event handlers.
    ///
    /// The handlers are called in the order they were added, before the default map
    /// controller.
    pub fn with_handlers(
        mut self,
        handlers: impl IntoIterator<Item = Box<dyn UserEventHandler>>,
    ) -> Self {
        self.handlers.extend(handlers);
        self
    }

    /// Sets the options for the map widget state.
    pub fn with_options(mut self, options: EguiMapOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the options for the application window.
    pub fn with_native_options(mut self, options: eframe::NativeOptions) -> Self {
        self.native_options = Some(options);
        self
    }

    /// Replaces the default application with one built by the given function.
    pub fn with_app_builder(
        mut self,
        app_builder: impl FnOnce(EguiMapState) -> Box<dyn eframe::App> + 'static,
    ) -> Self {
        self.app_builder = Some(Box::new(app_builder));
        self
    }

    /// Skips logger initialization. Use when the application configures logging itself
    /// before building the map.
    pub fn without_logging(mut self) -> Self {
        self.logging = false;
        self
    }

    /// Initializes the environment and runs the application until its window is closed.
    pub fn init(self) -> eframe::Result {
        if self.logging {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
                .init();
        }

        let rt = Runtime::new().expect("Unable to create Runtime");
        let _enter = rt.enter();

        // Keep the runtime alive for the duration of the application so that layers can
        // spawn loading tasks from the UI thread.
        std::thread::spawn(move || {
            rt.block_on(async {
                loop {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                }
            })
        });

        let native_options = self.native_options.unwrap_or_default();

        let app_creator: AppCreator<'static> = app_creator(
            self.map,
            self.handlers,
            self.options,
            self.app_builder,
        );

        eframe::run_native(&self.app_name, native_options, app_creator)
    }
}

fn app_creator<'app>(
    map: Map,
    handlers: Vec<Box<dyn UserEventHandler>>,
    options: EguiMapOptions,
    app_builder: Option<AppBuilder>,
) -> AppCreator<'app> {
    Box::new(move |cc: &eframe::CreationContext<'_>| {
        let ctx = cc.egui_ctx.clone();
        let egui_map_state = EguiMapState::new(map, ctx, handlers, options);
        let app = app_builder.unwrap_or_else(|| {
            Box::new(|egui_map_state: EguiMapState| {
                Box::new(MapApp {
                    map: egui_map_state,
                })
            })
        })(egui_map_state);
        Ok(app)
    })
}
