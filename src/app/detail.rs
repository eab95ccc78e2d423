//! Detail window for the selected gallery item.
//!
//! Drawn over a dimmed backdrop; a backdrop click, the window's close
//! button, "Fermer" and Escape all go through `GalleryApp::close_detail`.

use eframe::egui;

use geovis_galaxy::cube::paint::legend;
use geovis_galaxy::cube::CubeVariant;
use geovis_galaxy::gallery::HintState;
use geovis_galaxy::model::{DisplayMode, GalleryItem, MediaRef};
use geovis_galaxy::store::HintKey;

use super::GalleryApp;
use crate::ui::{self, badge, section_heading};

const GALLERY_THUMB: egui::Vec2 = egui::vec2(128.0, 84.0);

/// Body text of the first-time hint for `key`.
pub fn hint_text(key: HintKey) -> &'static str {
    match key {
        HintKey::Viewer2D => {
            "Utilisez le bouton \"🔍 Agrandir\" ci-dessous pour voir la carte en très grand écran !"
        }
        HintKey::ViewerInteractive => {
            "Cliquez sur les images dans la galerie pour les agrandir et les parcourir en plein écran !"
        }
    }
}

/// What the user did inside the detail window this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DetailAction {
    Close,
    OpenViewer(usize),
    HintOk,
    HintNever,
}

impl GalleryApp {
    pub fn draw_detail(&mut self, ctx: &egui::Context) {
        let Some(item) = self.gallery.selected().cloned() else {
            return;
        };
        let screen = ctx.screen_rect();
        let mut actions = Vec::new();

        // Backdrop
        let backdrop = egui::Area::new(egui::Id::new("detail_backdrop"))
            .order(egui::Order::Middle)
            .fixed_pos(screen.min)
            .show(ctx, |ui| {
                ui.painter()
                    .rect_filled(screen, 0.0, egui::Color32::from_black_alpha(170));
                ui.allocate_rect(screen, egui::Sense::click())
            });
        if backdrop.inner.clicked() && !self.viewer.is_open() {
            actions.push(DetailAction::Close);
        }

        let mut open = true;
        let max = (screen.size() - egui::vec2(80.0, 80.0)).max(egui::vec2(320.0, 240.0));
        egui::Window::new(egui::RichText::new(&item.title).strong())
            .id(egui::Id::new("detail_window"))
            .order(egui::Order::Foreground)
            .open(&mut open)
            .collapsible(false)
            .resizable(true)
            .default_size([780.0_f32.min(max.x), 680.0_f32.min(max.y)])
            .max_size(max)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .id_salt("detail_body")
                    .auto_shrink([false, false])
                    .max_height(max.y - 90.0)
                    .show(ui, |ui| self.draw_detail_body(ui, &item, &mut actions));
                ui.separator();
                ui.horizontal(|ui| {
                    let view = ui.add_enabled(
                        item.url.is_some(),
                        egui::Button::new("Voir la Carte").fill(ui::BADGE_BG),
                    );
                    if view.clicked() {
                        if let Some(url) = &item.url {
                            ctx.open_url(egui::OpenUrl::new_tab(url));
                        }
                    }
                    if ui.button("Fermer").clicked() {
                        actions.push(DetailAction::Close);
                    }
                });
            });
        if !open {
            actions.push(DetailAction::Close);
        }

        for action in actions {
            match action {
                DetailAction::Close => {
                    self.close_detail();
                    return;
                }
                DetailAction::OpenViewer(index) => self.open_viewer(&item, index),
                DetailAction::HintOk => self.gallery.dismiss_hint(),
                DetailAction::HintNever => self.gallery.dismiss_hint_forever(),
            }
        }
    }

    /// Open the lightbox on `item`'s viewer sequence with resolved URLs.
    fn open_viewer(&mut self, item: &GalleryItem, index: usize) {
        let media: Vec<MediaRef> = item
            .viewer_media()
            .into_iter()
            .map(|m| MediaRef {
                url: self.media_url(&m.url),
                ..m
            })
            .collect();
        if self.viewer.open(media, item.mode, index) {
            let videos: Vec<String> = self.viewer.video_urls().map(str::to_string).collect();
            for url in videos {
                self.thumbs.request(&url);
            }
        }
    }

    fn draw_detail_body(&mut self, ui: &mut egui::Ui, item: &GalleryItem, actions: &mut Vec<DetailAction>) {
        if let HintState::Showing(key) = self.gallery.hint() {
            draw_hint(ui, key, actions);
            ui.add_space(8.0);
        }

        if !item.difficulty.is_empty() {
            badge(ui, &item.difficulty, ui::BADGE_BG);
            ui.add_space(6.0);
        }

        let preview = self.media_url(item.preview_url());
        if let Some(tex) = self.texture_for(&preview) {
            let size = ui::fit_size(tex.size_vec2(), egui::vec2(ui.available_width(), 360.0));
            ui.add(egui::Image::new(&tex).fit_to_exact_size(size).rounding(8.0));
        } else if !self.image_loader.is_failed(&preview) {
            ui.spinner();
        }

        if item.mode == DisplayMode::TwoD && item.thumbnail.is_some() {
            ui.add_space(6.0);
            if ui
                .button("🔍 Agrandir")
                .on_hover_text("Voir la carte en plus grand")
                .clicked()
            {
                actions.push(DetailAction::OpenViewer(0));
            }
        }

        if item.has_media() {
            section_heading(ui, "Galerie");
            ui.horizontal_wrapped(|ui| {
                for (i, media) in item.media.iter().enumerate() {
                    if self.draw_gallery_thumb(ui, media, i, &item.title).clicked() {
                        actions.push(DetailAction::OpenViewer(i));
                    }
                }
            });
        }

        section_heading(ui, "Description");
        for paragraph in &item.description {
            ui.label(paragraph);
            ui.add_space(4.0);
        }

        section_heading(ui, "Catégorie");
        ui.label(&item.category);

        if let Some(auteur) = &item.auteur {
            section_heading(ui, "Auteur");
            ui.label(egui::RichText::new(auteur).italics());
        }
        if !item.sources.is_empty() {
            section_heading(ui, "Sources");
            ui.horizontal_wrapped(|ui| {
                for source in &item.sources {
                    badge(ui, source, ui::TAG_BG);
                }
            });
        }
        if !item.fonctionalites.is_empty() {
            section_heading(ui, "Fonctionnalités");
            for feature in &item.fonctionalites {
                ui.label(format!("• {feature}"));
            }
        }
        if let Some(analyse) = &item.analyse {
            section_heading(ui, "Analyse");
            ui.label(analyse);
        }
        if !item.avis.is_empty() {
            section_heading(ui, "Avis");
            for paragraph in &item.avis {
                ui.label(paragraph);
                ui.add_space(4.0);
            }
        }

        section_heading(ui, "Tags");
        ui.horizontal_wrapped(|ui| {
            for tag in &item.tags {
                badge(ui, tag, ui::TAG_BG);
            }
        });

        ui.add_space(12.0);
        let triple = item.metrics.unwrap_or_default();
        let [w, h] = CubeVariant::Compact.params().default_size;
        ui.horizontal_top(|ui| {
            if let Some(cube) = &mut self.detail_cube {
                cube.show(ui, &triple, egui::vec2(w, h));
            }
            ui.add_space(12.0);
            ui.vertical(|ui| legend(ui, CubeVariant::Compact, &triple));
        });
    }

    fn draw_gallery_thumb(&mut self, ui: &mut egui::Ui, media: &MediaRef, index: usize, title: &str) -> egui::Response {
        let url = self.media_url(&media.url);
        let (rect, response) = ui.allocate_exact_size(GALLERY_THUMB, egui::Sense::click());
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 6.0, ui::TAG_BG);

        let texture = if media.is_video() {
            self.thumbs.request(&url);
            self.thumb_textures.get(&url).cloned()
        } else {
            self.texture_for(&url)
        };
        if let Some(tex) = texture {
            let size = ui::fit_size(tex.size_vec2(), rect.size());
            let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
            painter.image(tex.id(), egui::Rect::from_center_size(rect.center(), size), uv, egui::Color32::WHITE);
        }
        if media.is_video() {
            painter.circle_filled(rect.center(), 16.0, egui::Color32::from_black_alpha(150));
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "▶",
                egui::FontId::proportional(16.0),
                egui::Color32::WHITE,
            );
        }
        if response.hovered() {
            painter.rect_stroke(rect, 6.0, egui::Stroke::new(2.0, ui::ACCENT));
        }
        let hover = if media.is_video() {
            "Cliquer pour voir la vidéo".to_string()
        } else {
            format!("{} - Image {}", title, index + 1)
        };
        response.on_hover_text(hover).on_hover_cursor(egui::CursorIcon::PointingHand)
    }
}

fn draw_hint(ui: &mut egui::Ui, key: HintKey, actions: &mut Vec<DetailAction>) {
    egui::Frame::group(ui.style())
        .fill(egui::Color32::from_rgb(30, 41, 59))
        .stroke(egui::Stroke::new(1.0, ui::ACCENT))
        .inner_margin(egui::Margin::same(12.0))
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new("🖼️ Visualiseur d'images").strong().size(16.0));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.small_button("×").clicked() {
                        actions.push(DetailAction::HintOk);
                    }
                });
            });
            ui.label(hint_text(key));
            ui.horizontal(|ui| {
                if ui.button("D'accord").clicked() {
                    actions.push(DetailAction::HintOk);
                }
                if ui.button("Ne plus me le rappeler").clicked() {
                    actions.push(DetailAction::HintNever);
                }
            });
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hint_text_per_mode() {
        assert!(hint_text(HintKey::Viewer2D).contains("🔍 Agrandir"));
        assert!(hint_text(HintKey::ViewerInteractive).contains("galerie"));
    }
}
