//! Background data lifecycle for `GalleryApp`.
//!
//! Covers the initial three-endpoint load (`start_load`, `check_load`), the
//! periodic stats refresh and per-frame polling of the image and thumbnail
//! loaders.

use std::sync::mpsc;
use std::time::{Duration, Instant};

use eframe::egui;

use geovis_galaxy::net::fetch::load_initial;

use super::{GalleryApp, LoadState, STATS_REFRESH};

/// The one page-level error shown when the initial load fails.
pub const LOAD_ERROR: &str = "Erreur lors du chargement des données";

impl GalleryApp {
    /// Fetch maps, categories and stats on a worker thread.
    pub fn start_load(&mut self, ctx: &egui::Context) {
        let Some(client) = self.client.clone() else {
            self.load = LoadState::Failed(LOAD_ERROR.to_string());
            return;
        };
        self.load = LoadState::Loading;

        let (tx, rx) = mpsc::channel();
        self.load_rx = Some(rx);
        let ctx = ctx.clone();
        std::thread::spawn(move || {
            let _ = tx.send(load_initial(&client));
            ctx.request_repaint();
        });
    }

    /// Poll the initial load and install its result.
    pub fn check_load(&mut self) {
        let Some(rx) = &self.load_rx else {
            return;
        };
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(mpsc::TryRecvError::Empty) => return,
            Err(mpsc::TryRecvError::Disconnected) => {
                Err(geovis_galaxy::GalleryError::Api("loader thread vanished".into()))
            }
        };
        self.load_rx = None;

        match result {
            Ok(data) => {
                self.stats = data.stats;
                self.gallery.set_items(data.items, data.categories);
                let previews: Vec<String> = self
                    .gallery
                    .items()
                    .iter()
                    .map(|item| self.media_url(item.preview_url()))
                    .collect();
                for url in previews {
                    self.image_loader.request(&url);
                }
                self.stats_due = Instant::now() + STATS_REFRESH;
                self.load = LoadState::Ready;
            }
            Err(e) => {
                log::error!("initial load failed: {}", e);
                self.load = LoadState::Failed(LOAD_ERROR.to_string());
            }
        }
    }

    /// Refresh `/api/stats` every [`STATS_REFRESH`] once the gallery is up.
    /// A failed refresh keeps the previous numbers.
    pub fn check_stats(&mut self, ctx: &egui::Context) {
        if let Some(rx) = &self.stats_rx {
            match rx.try_recv() {
                Ok(Ok(stats)) => {
                    self.stats = stats;
                    self.stats_rx = None;
                }
                Ok(Err(e)) => {
                    log::warn!("stats refresh failed: {}", e);
                    self.stats_rx = None;
                }
                Err(mpsc::TryRecvError::Disconnected) => self.stats_rx = None,
                Err(mpsc::TryRecvError::Empty) => {}
            }
        }
        if self.load != LoadState::Ready || self.stats_rx.is_some() {
            return;
        }
        let Some(client) = self.client.clone() else {
            return;
        };

        let now = Instant::now();
        if now < self.stats_due {
            ctx.request_repaint_after(self.stats_due - now);
            return;
        }
        self.stats_due = now + STATS_REFRESH;
        let (tx, rx) = mpsc::channel();
        self.stats_rx = Some(rx);
        let ctx = ctx.clone();
        std::thread::spawn(move || {
            let _ = tx.send(client.stats());
            ctx.request_repaint();
        });
    }

    /// Turn finished downloads and thumbnails into textures.
    pub fn poll_media(&mut self, ctx: &egui::Context) {
        for url in self.image_loader.poll() {
            if let Some(data) = self.image_loader.get(&url) {
                let tex = crate::ui::upload(ctx, &url, data);
                self.image_textures.insert(url, tex);
            }
        }
        if self.image_loader.pending_count() > 0 {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        for url in self.thumbs.poll() {
            if let Some(data) = self.thumbs.get(&url) {
                let tex = crate::ui::upload(ctx, &format!("thumb:{url}"), data);
                self.thumb_textures.insert(url, tex);
            }
        }
        if self.thumbs.pending_count() > 0 {
            ctx.request_repaint_after(Duration::from_millis(50));
        }
    }

    /// Texture for an image URL, requesting it on first sight.
    pub fn texture_for(&mut self, url: &str) -> Option<egui::TextureHandle> {
        if let Some(tex) = self.image_textures.get(url) {
            return Some(tex.clone());
        }
        self.image_loader.request(url);
        None
    }
}
