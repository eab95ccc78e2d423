//! Stateless egui helpers shared by the gallery views: text shortening,
//! search highlighting, badges and texture upload.

use eframe::egui;
use geovis_galaxy::net::image::ImageData;

// ─── Palette ──────────────────────────────────────────────────────────────────

pub const ACCENT: egui::Color32 = egui::Color32::from_rgb(79, 172, 254);
pub const BADGE_BG: egui::Color32 = egui::Color32::from_rgb(102, 126, 234);
pub const TAG_BG: egui::Color32 = egui::Color32::from_rgb(45, 55, 72);
pub const CARD_BG: egui::Color32 = egui::Color32::from_rgb(26, 32, 44);
pub const ERROR_RED: egui::Color32 = egui::Color32::from_rgb(239, 68, 68);
pub const OK_GREEN: egui::Color32 = egui::Color32::from_rgb(16, 185, 129);
const HIGHLIGHT: egui::Color32 = egui::Color32::from_rgb(255, 255, 100);

// ─── Text helpers ─────────────────────────────────────────────────────────────

/// Keep the first `max_chars` characters (trailing whitespace dropped) and
/// append `"..."` when anything was cut.
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let t: String = s.chars().take(max_chars).collect();
        format!("{}...", t.trim_end())
    }
}

/// Check if `text` contains the highlight query (case-insensitive).
pub fn text_matches(text: &str, highlight: Option<&str>) -> bool {
    match highlight {
        Some(q) if !q.trim().is_empty() => text.to_lowercase().contains(&q.trim().to_lowercase()),
        _ => false,
    }
}

/// Apply a yellow highlight background to `rt` if it matches the search query.
pub fn maybe_highlight(rt: egui::RichText, text: &str, highlight: Option<&str>) -> egui::RichText {
    if text_matches(text, highlight) {
        rt.background_color(HIGHLIGHT).color(egui::Color32::BLACK)
    } else {
        rt
    }
}

// ─── Widgets ──────────────────────────────────────────────────────────────────

/// Rounded filled label.
pub fn badge(ui: &mut egui::Ui, text: &str, fill: egui::Color32) -> egui::Response {
    egui::Frame::none()
        .fill(fill)
        .rounding(10.0)
        .inner_margin(egui::Margin::symmetric(8.0, 2.0))
        .show(ui, |ui| {
            ui.label(egui::RichText::new(text).small().color(egui::Color32::WHITE));
        })
        .response
}

/// Bold section title followed by a little spacing.
pub fn section_heading(ui: &mut egui::Ui, text: &str) {
    ui.add_space(8.0);
    ui.label(egui::RichText::new(text).strong().size(16.0).color(ACCENT));
    ui.add_space(2.0);
}

/// Upload decoded pixels as a linear-filtered texture.
pub fn upload(ctx: &egui::Context, name: &str, data: &ImageData) -> egui::TextureHandle {
    let img = egui::ColorImage::from_rgba_unmultiplied(
        [data.width as usize, data.height as usize],
        &data.rgba,
    );
    ctx.load_texture(name, img, egui::TextureOptions::LINEAR)
}

/// Largest size with `image`'s aspect ratio that fits in `bounds`.
pub fn fit_size(image: egui::Vec2, bounds: egui::Vec2) -> egui::Vec2 {
    if image.x <= 0.0 || image.y <= 0.0 {
        return egui::Vec2::ZERO;
    }
    let scale = (bounds.x / image.x).min(bounds.y / image.y);
    image * scale.max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_keeps_eighty_chars() {
        let short = "Carte des séismes";
        assert_eq!(truncate_str(short, 80), short);

        let long = "é".repeat(100);
        let out = truncate_str(&long, 80);
        assert_eq!(out.chars().count(), 83);
        assert!(out.ends_with("..."));

        let spaced = format!("{} suite", "a".repeat(79));
        assert_eq!(truncate_str(&spaced, 80), format!("{}...", "a".repeat(79)));
    }

    #[test]
    fn highlight_matches_case_insensitively() {
        assert!(text_matches("Carte des Volcans", Some("volcan")));
        assert!(!text_matches("Carte des Volcans", Some("  ")));
        assert!(!text_matches("Carte des Volcans", None));
    }

    #[test]
    fn fit_preserves_aspect() {
        let s = fit_size(egui::vec2(1600.0, 800.0), egui::vec2(800.0, 800.0));
        assert_eq!(s, egui::vec2(800.0, 400.0));
        assert_eq!(fit_size(egui::Vec2::ZERO, egui::vec2(10.0, 10.0)), egui::Vec2::ZERO);
    }
}
