//! Hero banner: drifting particle field with the rotating globe on top.
//!
//! Both animations run on their own frame loop. The loops start while the
//! banner is on screen and uncovered, and stop as soon as it scrolls away
//! or the detail window covers it.

use std::time::Instant;

use eframe::egui;

use geovis_galaxy::anim::globe::{self, GlobeMotion};
use geovis_galaxy::anim::particles::{ParticleField, PARTICLE_COLOR};
use geovis_galaxy::anim::{FrameLoop, LoopRegistry};
use geovis_galaxy::net::image::ImageData;

use super::GalleryApp;
use crate::ui;

const HERO_HEIGHT: f32 = 320.0;
const GLOBE_PX: u32 = 240;
const SURFACE_SIZE: (u32, u32) = (512, 256);

pub struct Hero {
    pub particles: ParticleField,
    particle_loop: FrameLoop,
    pub globe: GlobeMotion,
    globe_loop: FrameLoop,
    surface: ImageData,
    globe_frame: Option<ImageData>,
    globe_texture: Option<egui::TextureHandle>,
}

impl Hero {
    pub fn new(count: usize, registry: &LoopRegistry) -> Self {
        let mut rng = rand::thread_rng();
        Self {
            particles: ParticleField::new(count, 1200.0, HERO_HEIGHT, &mut rng),
            particle_loop: FrameLoop::new("particles", registry),
            globe: GlobeMotion::new(),
            globe_loop: FrameLoop::new("globe", registry),
            surface: globe::surface_texture(SURFACE_SIZE.0, SURFACE_SIZE.1),
            globe_frame: None,
            globe_texture: None,
        }
    }

    pub fn start(&mut self) {
        self.particle_loop.start();
        self.globe_loop.start();
    }

    pub fn stop(&mut self) {
        self.particle_loop.stop();
        self.globe_loop.stop();
    }

    pub fn is_running(&self) -> bool {
        self.particle_loop.is_running() || self.globe_loop.is_running()
    }

    /// Start or stop both loops to match on-screen visibility.
    pub fn set_visible(&mut self, visible: bool) {
        if visible {
            self.start();
        } else {
            self.stop();
        }
    }

    /// Step both animations to `now`. `pointer` is normalized to [-1, 1]
    /// with +y up. Re-renders the globe when it moved.
    pub fn advance(&mut self, now: Instant, size: egui::Vec2, pointer: Option<[f32; 2]>) {
        if self.particles.size() != (size.x.max(1.0), size.y.max(1.0)) {
            self.particles.resize(size.x, size.y);
        }
        if let Some(frames) = self.particle_loop.tick(now) {
            self.particles.step(frames);
        }
        if let Some(frames) = self.globe_loop.tick(now) {
            if let Some([nx, ny]) = pointer {
                self.globe.set_pointer(nx, ny);
            }
            self.globe.step(frames);
            let (pitch, yaw) = self.globe.angles();
            self.globe_frame = Some(globe::render(&self.surface, GLOBE_PX, pitch, yaw));
        }
    }

    fn globe_texture(&mut self, ctx: &egui::Context) -> Option<&egui::TextureHandle> {
        if let Some(frame) = self.globe_frame.take() {
            let img = egui::ColorImage::from_rgba_unmultiplied(
                [frame.width as usize, frame.height as usize],
                &frame.rgba,
            );
            match &mut self.globe_texture {
                Some(tex) => tex.set(img, egui::TextureOptions::LINEAR),
                None => {
                    self.globe_texture = Some(ctx.load_texture("hero_globe", img, egui::TextureOptions::LINEAR));
                }
            }
        }
        self.globe_texture.as_ref()
    }
}

/// Pointer position over `screen`, normalized to [-1, 1] with +y up.
pub fn normalized_pointer(pos: egui::Pos2, screen: egui::Rect) -> [f32; 2] {
    let w = screen.width().max(1.0);
    let h = screen.height().max(1.0);
    [
        ((pos.x - screen.min.x) / w) * 2.0 - 1.0,
        -(((pos.y - screen.min.y) / h) * 2.0 - 1.0),
    ]
}

impl GalleryApp {
    pub fn draw_hero(&mut self, ui: &mut egui::Ui) {
        let size = egui::vec2(ui.available_width(), HERO_HEIGHT);
        let (rect, _) = ui.allocate_exact_size(size, egui::Sense::hover());
        let visible = ui.is_rect_visible(rect) && self.gallery.selected().is_none();
        self.hero.set_visible(visible);
        if !ui.is_rect_visible(rect) {
            return;
        }

        let ctx = ui.ctx().clone();
        let screen = ctx.screen_rect();
        let pointer = ctx.pointer_hover_pos().map(|p| normalized_pointer(p, screen));
        self.hero.advance(Instant::now(), size, pointer);

        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, egui::Color32::from_rgb(10, 15, 30));

        let [r, g, b] = PARTICLE_COLOR;
        let at = |x: f32, y: f32| rect.min + egui::vec2(x, y);
        let particles = self.hero.particles.particles();
        for link in self.hero.particles.links() {
            let (a, c) = (particles[link.a], particles[link.b]);
            let color = egui::Color32::from_rgba_unmultiplied(r, g, b, (link.alpha * 255.0) as u8);
            painter.line_segment([at(a.x, a.y), at(c.x, c.y)], egui::Stroke::new(0.5, color));
        }
        for p in particles {
            let color = egui::Color32::from_rgba_unmultiplied(r, g, b, (p.opacity * 255.0) as u8);
            painter.circle_filled(at(p.x, p.y), p.radius, color);
        }

        if let Some(tex) = self.hero.globe_texture(&ctx) {
            let side = (HERO_HEIGHT - 40.0).min(rect.width() * 0.4);
            let centre = egui::pos2(rect.max.x - side * 0.5 - 32.0, rect.center().y);
            let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
            painter.image(
                tex.id(),
                egui::Rect::from_center_size(centre, egui::vec2(side, side)),
                uv,
                egui::Color32::WHITE,
            );
        }

        painter.text(
            rect.left_center() + egui::vec2(40.0, -24.0),
            egui::Align2::LEFT_CENTER,
            "GeoVis Galaxy",
            egui::FontId::proportional(40.0),
            egui::Color32::WHITE,
        );
        painter.text(
            rect.left_center() + egui::vec2(42.0, 20.0),
            egui::Align2::LEFT_CENTER,
            "Explorez des cartes et visualisations géographiques",
            egui::FontId::proportional(18.0),
            ui::ACCENT,
        );

        if self.hero.is_running() {
            ctx.request_repaint();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn hidden_banner_releases_both_loops() {
        let reg = LoopRegistry::new();
        let mut hero = Hero::new(5, &reg);
        assert_eq!(reg.live(), 0);
        hero.set_visible(true);
        assert_eq!(reg.live(), 2);
        hero.set_visible(true);
        assert_eq!(reg.live(), 2);
        hero.set_visible(false);
        assert_eq!(reg.live(), 0);
        hero.set_visible(true);
        drop(hero);
        assert_eq!(reg.live(), 0);
    }

    #[test]
    fn stopped_hero_does_not_move() {
        let reg = LoopRegistry::new();
        let mut hero = Hero::new(5, &reg);
        let before = hero.particles.particles().to_vec();
        hero.advance(Instant::now(), egui::vec2(1200.0, HERO_HEIGHT), None);
        assert_eq!(hero.particles.particles(), &before[..]);
        assert_eq!(hero.globe.spin, 0.0);

        hero.start();
        let t0 = Instant::now();
        hero.advance(t0, egui::vec2(1200.0, HERO_HEIGHT), Some([1.0, 0.0]));
        hero.advance(t0 + Duration::from_millis(16), egui::vec2(1200.0, HERO_HEIGHT), None);
        assert!(hero.globe.spin > 0.0);
        assert!(hero.globe.offset[1] > 0.0);
    }

    #[test]
    fn pointer_normalization() {
        let screen = egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(200.0, 100.0));
        assert_eq!(normalized_pointer(egui::pos2(100.0, 50.0), screen), [0.0, 0.0]);
        assert_eq!(normalized_pointer(egui::pos2(200.0, 0.0), screen), [1.0, 1.0]);
        assert_eq!(normalized_pointer(egui::pos2(0.0, 100.0), screen), [-1.0, -1.0]);
    }
}
