//! `GalleryApp`, the top-level egui application state.
//!
//! This module declares the `GalleryApp` struct, its constructor and the
//! `eframe::App` impl. The drawing and polling methods are split across the
//! sibling sub-modules:
//!
//! - `loading` : initial load, stats refresh, media polling
//! - `toolbar` : search field and category buttons
//! - `grid`    : card grid and the aggregate cube section
//! - `detail`  : the item detail window
//! - `lightbox`: the full-screen media viewer
//! - `hero`    : particle field and globe banner
//! - `contact` : about section and contact form

pub mod contact;
pub mod detail;
pub mod grid;
pub mod hero;
pub mod lightbox;
pub mod loading;
pub mod toolbar;

use std::collections::HashMap;
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

use eframe::egui;

use geovis_galaxy::anim::LoopRegistry;
use geovis_galaxy::config::AppConfig;
use geovis_galaxy::cube::paint::CubeWidget;
use geovis_galaxy::cube::CubeVariant;
use geovis_galaxy::gallery::GalleryController;
use geovis_galaxy::model::Stats;
use geovis_galaxy::net::fetch::{ApiClient, InitialData};
use geovis_galaxy::net::image::ImageLoader;
use geovis_galaxy::store::{HintStore, JsonFileStore, MemoryHintStore};
use geovis_galaxy::viewer::thumbs::{FfmpegExtractor, ThumbnailCache};
use geovis_galaxy::viewer::Viewer;
use geovis_galaxy::Result;

use self::contact::ContactState;
use self::hero::Hero;

/// Interval between `/api/stats` refreshes.
pub const STATS_REFRESH: Duration = Duration::from_secs(30);

// ─── Application state ───────────────────────────────────────────────────────

/// Page-level load state of the gallery data.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Loading,
    Ready,
    Failed(String),
}

pub struct GalleryApp {
    pub config: AppConfig,
    /// `None` when the configured base URL is unusable
    pub client: Option<ApiClient>,
    pub gallery: GalleryController,
    pub load: LoadState,
    pub load_rx: Option<mpsc::Receiver<Result<InitialData>>>,
    pub stats: Stats,
    pub stats_rx: Option<mpsc::Receiver<Result<Stats>>>,
    pub stats_due: Instant,
    // Image loading
    pub image_loader: ImageLoader,
    pub image_textures: HashMap<String, egui::TextureHandle>,
    // Frame loops
    pub loops: LoopRegistry,
    /// Mounted while the detail window is open
    pub detail_cube: Option<CubeWidget>,
    pub global_cube: CubeWidget,
    pub viewer: Viewer,
    pub thumbs: ThumbnailCache,
    pub thumb_textures: HashMap<String, egui::TextureHandle>,
    pub hero: Hero,
    pub contact: ContactState,
}

impl GalleryApp {
    pub fn new(ctx: &egui::Context, config: AppConfig) -> Self {
        let hints: Box<dyn HintStore> = match &config.hints_file {
            Some(path) => Box::new(JsonFileStore::open(path.clone())),
            None => Box::new(MemoryHintStore::default()),
        };
        let client = match ApiClient::new(&config.api_base) {
            Ok(c) => Some(c),
            Err(e) => {
                log::error!("API client unavailable: {}", e);
                None
            }
        };
        let loops = LoopRegistry::new();
        let extractor = Arc::new(FfmpegExtractor::new(config.ffmpeg.clone()));

        let mut app = Self {
            client,
            gallery: GalleryController::new(hints),
            load: LoadState::Loading,
            load_rx: None,
            stats: Stats::default(),
            stats_rx: None,
            stats_due: Instant::now() + STATS_REFRESH,
            image_loader: ImageLoader::new(),
            image_textures: HashMap::new(),
            detail_cube: None,
            global_cube: CubeWidget::new(CubeVariant::Aggregate, &loops),
            viewer: Viewer::with_registry(&loops),
            thumbs: ThumbnailCache::new(extractor, config.thumb_timeout),
            thumb_textures: HashMap::new(),
            hero: Hero::new(config.particles, &loops),
            contact: ContactState::default(),
            loops,
            config,
        };
        app.start_load(ctx);
        app
    }

    /// Absolute URL for a media or preview path.
    pub fn media_url(&self, href: &str) -> String {
        match &self.client {
            Some(c) => geovis_galaxy::net::fetch::resolve_url(c.base(), href),
            None => href.to_string(),
        }
    }

    /// Open the detail window for `id` and mount its cube.
    pub fn open_detail(&mut self, id: &str) {
        if self.gallery.open_detail(id) {
            self.detail_cube = Some(CubeWidget::new(CubeVariant::Compact, &self.loops));
        }
    }

    /// Close the detail window. The viewer opened from it closes too.
    pub fn close_detail(&mut self) {
        self.viewer.close();
        self.gallery.close_detail();
        if let Some(mut cube) = self.detail_cube.take() {
            cube.release();
        }
        log::debug!("detail closed, {} frame loops live", self.loops.live());
    }

    /// Release every frame loop and transient state.
    fn teardown(&mut self) {
        self.close_detail();
        self.gallery.reset();
        self.global_cube.release();
        self.hero.stop();
        log::info!("teardown complete, {} frame loops live", self.loops.live());
    }
}

impl Drop for GalleryApp {
    fn drop(&mut self) {
        self.teardown();
    }
}

// ─── eframe::App ─────────────────────────────────────────────────────────────

impl eframe::App for GalleryApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load();
        self.check_stats(ctx);
        self.poll_media(ctx);
        self.check_contact();
        self.handle_keys(ctx);

        egui::TopBottomPanel::top("toolbar")
            .exact_height(44.0)
            .show(ctx, |ui| {
                self.draw_toolbar(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .id_salt("page")
                .auto_shrink([false, false])
                .enable_scrolling(!self.gallery.scroll_locked())
                .show(ui, |ui| {
                    self.draw_hero(ui);
                    ui.add_space(16.0);
                    match self.load.clone() {
                        LoadState::Loading => {
                            ui.vertical_centered(|ui| {
                                ui.add_space(40.0);
                                ui.spinner();
                                ui.label("Chargement des cartes...");
                            });
                        }
                        LoadState::Failed(msg) => {
                            ui.vertical_centered(|ui| {
                                ui.add_space(40.0);
                                ui.label(
                                    egui::RichText::new(&msg)
                                        .color(crate::ui::ERROR_RED)
                                        .size(16.0),
                                );
                            });
                        }
                        LoadState::Ready => {
                            self.draw_grid(ui);
                            ui.add_space(24.0);
                            self.draw_global_cube(ui);
                        }
                    }
                    ui.add_space(24.0);
                    self.draw_about(ui);
                    ui.add_space(24.0);
                    self.draw_contact(ui, ctx);
                });
        });

        self.draw_detail(ctx);
        self.draw_lightbox(ctx);
    }
}
