//! Card grid and the aggregate cube section for `GalleryApp`.

use eframe::egui;

use geovis_galaxy::cube::paint::legend;
use geovis_galaxy::cube::CubeVariant;
use geovis_galaxy::gallery::result_heading;
use geovis_galaxy::model::GalleryItem;

use super::GalleryApp;
use crate::ui::{self, badge, maybe_highlight, truncate_str};

const CARD_WIDTH: f32 = 300.0;
const CARD_HEIGHT: f32 = 400.0;
const CARD_IMAGE_HEIGHT: f32 = 170.0;
const CARD_GAP: f32 = 16.0;
/// Characters of the first description paragraph shown on a card.
pub const CARD_DESCRIPTION_CHARS: usize = 80;

/// What a card needs, detached from the controller borrow.
#[derive(Debug, Clone, PartialEq)]
pub struct CardView {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub tags: Vec<String>,
    pub difficulty: String,
    pub preview: String,
    pub url: Option<String>,
}

impl CardView {
    pub fn from_item(item: &GalleryItem, preview: String) -> Self {
        Self {
            id: item.id.clone(),
            title: item.title.clone(),
            summary: truncate_str(item.first_paragraph(), CARD_DESCRIPTION_CHARS),
            tags: item.tags.clone(),
            difficulty: item.difficulty.clone(),
            preview,
            url: item.url.clone(),
        }
    }
}

/// Columns that fit in `width`, at least one.
pub fn column_count(width: f32) -> usize {
    (((width + CARD_GAP) / (CARD_WIDTH + CARD_GAP)).floor() as usize).max(1)
}

impl GalleryApp {
    /// Category filter, result heading and the cards of the filtered set.
    pub fn draw_grid(&mut self, ui: &mut egui::Ui) {
        self.draw_category_filter(ui);
        ui.add_space(12.0);

        let cards: Vec<CardView> = self
            .gallery
            .filtered()
            .into_iter()
            .map(|item| CardView::from_item(item, self.media_url(item.preview_url())))
            .collect();

        ui.heading(result_heading(cards.len()));
        ui.add_space(8.0);

        let query = self.gallery.filter.query.clone();
        let highlight = Some(query.as_str()).filter(|q| !q.trim().is_empty());
        let cols = column_count(ui.available_width());
        let mut open = None;

        for row in cards.chunks(cols) {
            ui.horizontal(|ui| {
                for card in row {
                    if self.draw_card(ui, card, highlight) {
                        open = Some(card.id.clone());
                    }
                    ui.add_space(CARD_GAP);
                }
            });
            ui.add_space(CARD_GAP);
        }

        if let Some(id) = open {
            self.open_detail(&id);
        }
    }

    /// One card. Returns true when "Plus d'Infos" was clicked.
    fn draw_card(&mut self, ui: &mut egui::Ui, card: &CardView, highlight: Option<&str>) -> bool {
        let texture = self.texture_for(&card.preview);
        let mut more = false;

        ui.allocate_ui(egui::vec2(CARD_WIDTH, CARD_HEIGHT), |ui| {
            egui::Frame::none()
                .fill(ui::CARD_BG)
                .rounding(12.0)
                .inner_margin(egui::Margin::same(10.0))
                .show(ui, |ui| {
                    ui.set_width(CARD_WIDTH - 20.0);
                    ui.set_min_height(CARD_HEIGHT - 20.0);

                    let size = egui::vec2(CARD_WIDTH - 20.0, CARD_IMAGE_HEIGHT);
                    match &texture {
                        Some(tex) => {
                            ui.add(egui::Image::new(tex).fit_to_exact_size(size).rounding(8.0));
                        }
                        None => {
                            let (rect, _) = ui.allocate_exact_size(size, egui::Sense::hover());
                            ui.painter().rect_filled(rect, 8.0, ui::TAG_BG);
                            if !self.image_loader.is_failed(&card.preview) {
                                ui.put(rect, egui::Spinner::new());
                            }
                        }
                    }
                    if !card.difficulty.is_empty() {
                        ui.add_space(4.0);
                        badge(ui, &card.difficulty, ui::BADGE_BG);
                    }

                    ui.add_space(4.0);
                    ui.label(maybe_highlight(
                        egui::RichText::new(&card.title).strong().size(17.0),
                        &card.title,
                        highlight,
                    ));
                    ui.label(egui::RichText::new(&card.summary).color(egui::Color32::LIGHT_GRAY));

                    ui.horizontal_wrapped(|ui| {
                        for tag in &card.tags {
                            badge(ui, tag, ui::TAG_BG);
                        }
                    });

                    ui.add_space(6.0);
                    ui.horizontal(|ui| {
                        let view = ui.add_enabled(
                            card.url.is_some(),
                            egui::Button::new("Voir la Carte").fill(ui::BADGE_BG),
                        );
                        if view.clicked() {
                            if let Some(url) = &card.url {
                                ui.ctx().open_url(egui::OpenUrl::new_tab(url));
                            }
                        }
                        if ui.button("Plus d'Infos").clicked() {
                            more = true;
                        }
                    });
                });
        });
        more
    }

    /// Aggregate cube over the filtered set, beside its legend.
    pub fn draw_global_cube(&mut self, ui: &mut egui::Ui) {
        let aggregate = self.gallery.aggregate();
        let params = CubeVariant::Aggregate.params();

        ui.heading("Cube de MacEachren");
        ui.add_space(8.0);
        ui.horizontal_top(|ui| {
            let [w, h] = params.default_size;
            let w = w.min(ui.available_width() * 0.6).max(200.0);
            self.global_cube.show(ui, &aggregate, egui::vec2(w, h));
            ui.add_space(16.0);
            ui.vertical(|ui| legend(ui, CubeVariant::Aggregate, &aggregate));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_fit_width() {
        assert_eq!(column_count(100.0), 1);
        assert_eq!(column_count(300.0), 1);
        assert_eq!(column_count(616.0), 2);
        assert_eq!(column_count(1260.0), 3);
    }

    #[test]
    fn card_view_truncates_first_paragraph() {
        let item: GalleryItem = serde_json::from_value(serde_json::json!({
            "id": 4,
            "title": "Séismes",
            "description": ["x".repeat(120), "second"],
            "tags": ["geo"],
        }))
        .unwrap();
        let card = CardView::from_item(&item, "http://h/p.png".into());
        assert_eq!(card.id, "4");
        assert_eq!(card.summary, format!("{}...", "x".repeat(80)));
        assert_eq!(card.url, None);
    }
}
