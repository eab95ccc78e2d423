//! Full-screen media viewer overlay.
//!
//! Input is read only while the viewer is open, so closing it by any path
//! also stops keyboard and pointer handling. Videos are shown as their
//! derived still and handed to the system player.

use std::time::Instant;

use eframe::egui;

use geovis_galaxy::model::MediaRef;
use geovis_galaxy::viewer::ViewerKey;

use super::GalleryApp;
use crate::ui;

const STRIP_HEIGHT: f32 = 92.0;
const STRIP_THUMB: egui::Vec2 = egui::vec2(104.0, 68.0);
const EDGE: f32 = 64.0;

/// Viewer key for an egui key, if it is one the viewer handles.
pub fn viewer_key(key: egui::Key) -> Option<ViewerKey> {
    match key {
        egui::Key::ArrowRight => Some(ViewerKey::ArrowRight),
        egui::Key::ArrowLeft => Some(ViewerKey::ArrowLeft),
        egui::Key::Escape => Some(ViewerKey::Escape),
        egui::Key::Plus => Some(ViewerKey::Plus),
        egui::Key::Equals => Some(ViewerKey::Equals),
        egui::Key::Minus => Some(ViewerKey::Minus),
        egui::Key::Num0 => Some(ViewerKey::Zero),
        _ => None,
    }
}

/// Whether a stage click closes the viewer. Only clicks outside shown
/// media do, and nothing closes while the media is still loading.
pub fn stage_click_closes(shown: Option<egui::Rect>, click: Option<egui::Pos2>) -> bool {
    match (shown, click) {
        (Some(shown), Some(p)) => !shown.contains(p),
        _ => false,
    }
}

/// Where a pan starts: the press position, not the point where the drag
/// threshold was crossed.
pub fn pan_anchor(press_origin: Option<egui::Pos2>, pointer: Option<egui::Pos2>) -> Option<egui::Pos2> {
    press_origin.or(pointer)
}

fn full_uv() -> egui::Rect {
    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0))
}

impl GalleryApp {
    /// Route key presses to the viewer while it is open, otherwise let
    /// Escape close the detail window.
    pub fn handle_keys(&mut self, ctx: &egui::Context) {
        let keys: Vec<egui::Key> = ctx.input(|i| {
            i.events
                .iter()
                .filter_map(|e| match e {
                    egui::Event::Key {
                        key, pressed: true, ..
                    } => Some(*key),
                    _ => None,
                })
                .collect()
        });
        if keys.is_empty() {
            return;
        }

        if self.viewer.is_open() {
            for key in keys.into_iter().filter_map(viewer_key) {
                self.viewer.handle_key(key);
            }
            return;
        }
        if self.gallery.selected().is_some() && keys.contains(&egui::Key::Escape) {
            self.close_detail();
        }
    }

    pub fn draw_lightbox(&mut self, ctx: &egui::Context) {
        if !self.viewer.is_open() {
            return;
        }
        self.viewer.tick(Instant::now());
        if let Some(url) = self.viewer.take_autoplay() {
            if self.config.autoplay {
                log::info!("handing {} to the system player", url);
                ctx.open_url(egui::OpenUrl::new_tab(&url));
            }
        }

        let screen = ctx.screen_rect();
        let media: Vec<MediaRef> = self.viewer.media().to_vec();
        let area = egui::Area::new(egui::Id::new("lightbox"))
            .order(egui::Order::Foreground)
            .fixed_pos(screen.min);
        let layer = area.layer();

        area.show(ctx, |ui| {
            let painter = ui.painter().clone();
            painter.rect_filled(screen, 0.0, egui::Color32::from_black_alpha(235));
            let backdrop = ui.allocate_rect(screen, egui::Sense::click());

            let strip = if self.viewer.shows_thumbnail_strip() {
                STRIP_HEIGHT
            } else {
                0.0
            };
            let stage = egui::Rect::from_min_max(
                screen.min + egui::vec2(EDGE, EDGE),
                screen.max - egui::vec2(EDGE, EDGE + strip),
            );
            let mut close = backdrop.clicked();

            if let Some(current) = self.viewer.current().cloned() {
                close |= self.draw_stage(ui, stage, &current);
            }
            self.draw_viewer_controls(ui, screen, stage, &mut close);
            if strip > 0.0 {
                let strip_rect = egui::Rect::from_min_max(
                    egui::pos2(screen.min.x + EDGE, stage.max.y + 12.0),
                    egui::pos2(screen.max.x - EDGE, screen.max.y - 8.0),
                );
                self.draw_thumbnail_strip(ui, strip_rect, &media);
            }

            if close {
                self.viewer.close();
            }
        });
        ctx.move_to_top(layer);

        if !self.viewer.is_open() {
            log::debug!("viewer closed, {} frame loops live", self.loops.live());
        }
    }

    /// Current media inside `stage`. Returns true when a click outside the
    /// media asks to close.
    fn draw_stage(&mut self, ui: &mut egui::Ui, stage: egui::Rect, current: &MediaRef) -> bool {
        let response = ui.interact(stage, egui::Id::new("lightbox_stage"), egui::Sense::click_and_drag());
        let painter = ui.painter_at(stage);

        let texture = if current.is_video() {
            self.thumbs.request(&current.url);
            self.thumb_textures.get(&current.url).cloned()
        } else {
            self.texture_for(&current.url)
        };
        let Some(tex) = texture else {
            ui.put(egui::Rect::from_center_size(stage.center(), egui::vec2(32.0, 32.0)), egui::Spinner::new());
            return stage_click_closes(None, response.interact_pointer_pos());
        };

        let zoom = self.viewer.zoom();
        let [px, py] = self.viewer.pan();
        let size = ui::fit_size(tex.size_vec2(), stage.size()) * zoom;
        let shown = egui::Rect::from_center_size(stage.center() + egui::vec2(px, py), size);
        painter.image(tex.id(), shown, full_uv(), egui::Color32::WHITE);

        if current.is_video() {
            let play = ui.put(
                egui::Rect::from_center_size(stage.center(), egui::vec2(180.0, 44.0)),
                egui::Button::new(egui::RichText::new("▶ Lire la vidéo").size(18.0))
                    .fill(egui::Color32::from_black_alpha(180)),
            );
            if play.clicked() {
                ui.ctx().open_url(egui::OpenUrl::new_tab(&current.url));
            }
            return response.clicked() && stage_click_closes(Some(shown), response.interact_pointer_pos());
        }

        // Pan
        if response.drag_started() {
            let origin = ui.input(|i| i.pointer.press_origin());
            if let Some(p) = pan_anchor(origin, response.interact_pointer_pos()) {
                self.viewer.pointer_down(p.x, p.y);
            }
        }
        if response.dragged() {
            if let Some(p) = response.interact_pointer_pos() {
                self.viewer.pointer_move(p.x, p.y);
            }
        }
        if response.drag_stopped() {
            self.viewer.pointer_up();
        }
        if self.viewer.is_panning() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::Grabbing);
        } else if self.viewer.can_pan() && response.hovered() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::Grab);
        }

        response.clicked() && stage_click_closes(Some(shown), response.interact_pointer_pos())
    }

    fn draw_viewer_controls(&mut self, ui: &mut egui::Ui, screen: egui::Rect, stage: egui::Rect, close: &mut bool) {
        let painter = ui.painter().clone();
        let big = |s: &str| egui::RichText::new(s).size(28.0).color(egui::Color32::WHITE);

        let close_rect = egui::Rect::from_min_size(
            egui::pos2(screen.max.x - 56.0, screen.min.y + 12.0),
            egui::vec2(44.0, 44.0),
        );
        if ui
            .put(close_rect, egui::Button::new(big("×")).frame(false))
            .on_hover_text("Fermer (Esc)")
            .clicked()
        {
            *close = true;
        }

        if self.viewer.shows_navigation() {
            let left = egui::Rect::from_center_size(
                egui::pos2(screen.min.x + EDGE * 0.5, stage.center().y),
                egui::vec2(44.0, 64.0),
            );
            let right = egui::Rect::from_center_size(
                egui::pos2(screen.max.x - EDGE * 0.5, stage.center().y),
                egui::vec2(44.0, 64.0),
            );
            if ui.put(left, egui::Button::new(big("❮")).frame(false)).clicked() {
                self.viewer.prev();
            }
            if ui.put(right, egui::Button::new(big("❯")).frame(false)).clicked() {
                self.viewer.next();
            }
        }

        if self.viewer.shows_zoom_controls() {
            let bar = egui::Rect::from_center_size(
                egui::pos2(screen.center().x, screen.min.y + 32.0),
                egui::vec2(260.0, 36.0),
            );
            ui.allocate_new_ui(egui::UiBuilder::new().max_rect(bar), |ui| {
                ui.horizontal_centered(|ui| {
                    if ui.button("−").on_hover_text("Zoom arrière (-)").clicked() {
                        self.viewer.zoom_out();
                    }
                    ui.label(
                        egui::RichText::new(format!("{:.0}%", self.viewer.zoom() * 100.0))
                            .color(egui::Color32::WHITE),
                    );
                    if ui.button("+").on_hover_text("Zoom avant (+)").clicked() {
                        self.viewer.zoom_in();
                    }
                    if ui.button("⟲").on_hover_text("Réinitialiser (0)").clicked() {
                        self.viewer.reset();
                    }
                });
            });
        }

        if let Some(counter) = self.viewer.counter() {
            painter.text(
                screen.min + egui::vec2(20.0, 24.0),
                egui::Align2::LEFT_CENTER,
                counter,
                egui::FontId::proportional(16.0),
                egui::Color32::WHITE,
            );
        }
        if let Some(caption) = self.viewer.caption() {
            painter.text(
                egui::pos2(stage.center().x, stage.max.y + 4.0),
                egui::Align2::CENTER_TOP,
                caption,
                egui::FontId::proportional(16.0),
                egui::Color32::LIGHT_GRAY,
            );
        }
    }

    fn draw_thumbnail_strip(&mut self, ui: &mut egui::Ui, rect: egui::Rect, media: &[MediaRef]) {
        let current = self.viewer.index();
        let mut jump = None;
        ui.allocate_new_ui(egui::UiBuilder::new().max_rect(rect), |ui| {
            egui::ScrollArea::horizontal()
                .id_salt("lightbox_strip")
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        for (i, m) in media.iter().enumerate() {
                            let (r, resp) = ui.allocate_exact_size(STRIP_THUMB, egui::Sense::click());
                            let painter = ui.painter_at(r);
                            painter.rect_filled(r, 4.0, ui::TAG_BG);
                            let tex = if m.is_video() {
                                self.thumb_textures.get(&m.url).cloned()
                            } else {
                                self.texture_for(&m.url)
                            };
                            if let Some(tex) = tex {
                                let size = ui::fit_size(tex.size_vec2(), r.size());
                                painter.image(
                                    tex.id(),
                                    egui::Rect::from_center_size(r.center(), size),
                                    full_uv(),
                                    egui::Color32::WHITE,
                                );
                            }
                            if m.is_video() {
                                painter.text(
                                    r.center(),
                                    egui::Align2::CENTER_CENTER,
                                    "▶",
                                    egui::FontId::proportional(14.0),
                                    egui::Color32::WHITE,
                                );
                            }
                            let stroke = if current == Some(i) {
                                egui::Stroke::new(2.0, ui::ACCENT)
                            } else {
                                egui::Stroke::new(1.0, egui::Color32::from_gray(90))
                            };
                            painter.rect_stroke(r, 4.0, stroke);
                            if resp.clicked() {
                                jump = Some(i);
                            }
                        }
                    });
                });
        });
        if let Some(i) = jump {
            self.viewer.jump(i);
        }
    }
}
