//! Reduced variant of the earthquake map: markers over grayscale tiles, without the
//! fault lines and the layer control.

use std::sync::Arc;

use mercalli::cartesian::Point2d;
use mercalli::control::UserEventHandler;
use mercalli_egui::{EguiMapOptions, InitBuilder};
use parking_lot::Mutex;
use quake_map::app::MapUi;
use quake_map::config::QuakeMapConfig;
use quake_map::loader::{self, DataSource};
use quake_map::session;
use tokio::runtime::Runtime;

struct BasicApp {
    map_ui: MapUi,
}

impl eframe::App for BasicApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| self.map_ui.show_map(ui));
        self.map_ui.show_legend(ctx);
        self.map_ui.show_popup(ctx);
    }
}

fn main() -> eframe::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = QuakeMapConfig::from_env();

    let rt = Runtime::new().expect("Unable to create Runtime");
    let earthquakes = rt.block_on(loader::load_earthquakes(
        &loader::http_client(),
        &DataSource::from_config_value(&config.quake_feed_url),
    ));
    drop(rt);

    let earthquakes = match earthquakes {
        Ok(earthquakes) => earthquakes,
        Err(error) => {
            log::error!("Failed to load earthquakes: {error}");
            return Ok(());
        }
    };

    let (map, session) = session::compose_basic(earthquakes, &config);

    let pending_click = Arc::new(Mutex::new(None::<Point2d>));
    let controller = session.controller();
    let handler = MapUi::click_handler(pending_click.clone());

    InitBuilder::new(map)
        .with_app_name("Earthquake Map (basic)")
        .with_handlers([Box::new(handler) as Box<dyn UserEventHandler>])
        .with_options(EguiMapOptions { controller })
        .with_app_builder(move |state| {
            Box::new(BasicApp {
                map_ui: MapUi::from_state(state, session, pending_click),
            })
        })
        .without_logging()
        .init()
}
