//! Toolbar rendering for `GalleryApp`.
//!
//! Draws the title strip with the search field, and the category filter row
//! shown above the card grid.

use eframe::egui;

use geovis_galaxy::gallery::is_all_categories;

use super::GalleryApp;
use crate::ui;

impl GalleryApp {
    /// Render the top toolbar strip.
    pub fn draw_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal_centered(|ui| {
            ui.add_space(4.0);
            ui.label(
                egui::RichText::new("🌌 GeoVis Galaxy")
                    .strong()
                    .size(18.0)
                    .color(ui::ACCENT),
            );
            ui.add_space(16.0);

            let width = (ui.available_width() - 120.0).clamp(160.0, 520.0);
            ui.add_sized(
                [width, 26.0],
                egui::TextEdit::singleline(&mut self.gallery.filter.query)
                    .hint_text("Rechercher des cartes..."),
            );
            if !self.gallery.filter.query.is_empty() && ui.small_button("✕").clicked() {
                self.gallery.filter.query.clear();
            }
        });
    }

    /// One toggle button per category; the sentinel clears the filter.
    pub fn draw_category_filter(&mut self, ui: &mut egui::Ui) {
        ui.label(egui::RichText::new("Catégories").strong().size(16.0));
        ui.add_space(4.0);
        let mut picked = None;
        ui.horizontal_wrapped(|ui| {
            for category in self.gallery.categories() {
                let active = category == &self.gallery.filter.category
                    || (is_all_categories(category) && is_all_categories(&self.gallery.filter.category));
                if ui.selectable_label(active, category.as_str()).clicked() {
                    picked = Some(category.clone());
                }
            }
        });
        if let Some(category) = picked {
            log::debug!("category filter: {}", category);
            self.gallery.filter.category = category;
        }
    }
}
