mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use app::PitchScopeApp;
use config::AppConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = AppConfig::resolve(std::env::args().skip(1)).unwrap_or_else(|e| {
        log::error!("Falling back to default configuration: {e:#}");
        AppConfig::default()
    });

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Pitch Scope – Pitch Explorer",
        options,
        Box::new(move |cc| Ok(Box::new(PitchScopeApp::new(cc, config)))),
    )
}
