use eframe::egui;

use geovis_galaxy::config::AppConfig;

mod app;
mod ui;

use app::GalleryApp;

fn main() -> eframe::Result {
    env_logger::init();

    let config = AppConfig::from_env();
    log::info!("GeoVis Galaxy starting against {}", config.api_base);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "GeoVis Galaxy",
        options,
        Box::new(move |cc| {
            cc.egui_ctx.set_visuals(egui::Visuals::dark());
            Ok(Box::new(GalleryApp::new(&cc.egui_ctx, config)))
        }),
    )
}
