//! Interactive map of the earthquakes reported by the USGS during the last day.

use std::time::Duration;

use quake_map::app::QuakeMapApp;
use quake_map::config::QuakeMapConfig;
use tokio::runtime::Runtime;

fn main() -> eframe::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = QuakeMapConfig::from_env();

    let rt = Runtime::new().expect("Unable to create Runtime");
    let _enter = rt.enter();

    // Keep the runtime alive for the duration of the application so that the data and
    // tile loading tasks spawned from the UI thread keep running.
    std::thread::spawn(move || {
        rt.block_on(async {
            loop {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
        })
    });

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1024.0, 768.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Earthquake Map",
        native_options,
        Box::new(move |cc| Ok(Box::new(QuakeMapApp::new(cc, config)))),
    )
}
