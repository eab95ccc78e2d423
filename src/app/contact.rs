//! About section with live stats, and the contact form.

use std::sync::mpsc;
use std::time::{Duration, Instant};

use eframe::egui;

use geovis_galaxy::model::ContactForm;
use geovis_galaxy::{GalleryError, Result};

use super::GalleryApp;
use crate::ui;

pub const CONTACT_EMAIL: &str = "contact@geovisgalaxy.fr";
const COPY_FEEDBACK: Duration = Duration::from_secs(3);

/// A one-shot message shown after a submission settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub text: String,
    pub ok: bool,
}

/// Alert for a settled submission. Only an error reported by the API is
/// shown verbatim; anything else is a connection problem.
pub fn alert_for(result: &Result<String>) -> Alert {
    match result {
        Ok(message) => Alert {
            text: format!("✅ {message}"),
            ok: true,
        },
        Err(GalleryError::Api(message)) => Alert {
            text: format!("❌ Erreur: {message}"),
            ok: false,
        },
        Err(_) => Alert {
            text: "❌ Erreur de connexion. Veuillez réessayer plus tard.".to_string(),
            ok: false,
        },
    }
}

#[derive(Default)]
pub struct ContactState {
    pub form: ContactForm,
    pub rx: Option<mpsc::Receiver<Result<String>>>,
    pub alert: Option<Alert>,
    pub copied_at: Option<Instant>,
}

impl ContactState {
    pub fn is_sending(&self) -> bool {
        self.rx.is_some()
    }

    /// Apply a settled submission: the form is cleared on success and kept
    /// as typed on failure.
    pub fn settle(&mut self, result: Result<String>) {
        if let Err(e) = &result {
            log::warn!("contact submission failed: {}", e);
        }
        let alert = alert_for(&result);
        if alert.ok {
            self.form = ContactForm::default();
        }
        self.alert = Some(alert);
        self.rx = None;
    }
}

impl GalleryApp {
    /// Post the form on a worker thread.
    pub fn submit_contact(&mut self, ctx: &egui::Context) {
        if self.contact.is_sending() {
            return;
        }
        let Some(client) = self.client.clone() else {
            self.contact
                .settle(Err(GalleryError::Api("API indisponible".to_string())));
            return;
        };
        let form = self.contact.form.clone();
        let (tx, rx) = mpsc::channel();
        self.contact.rx = Some(rx);
        let ctx = ctx.clone();
        std::thread::spawn(move || {
            let _ = tx.send(client.submit_contact(&form));
            ctx.request_repaint();
        });
    }

    /// Poll the submission channel.
    pub fn check_contact(&mut self) {
        let Some(rx) = &self.contact.rx else {
            return;
        };
        match rx.try_recv() {
            Ok(result) => self.contact.settle(result),
            Err(mpsc::TryRecvError::Empty) => {}
            Err(mpsc::TryRecvError::Disconnected) => self
                .contact
                .settle(Err(GalleryError::Api("envoi interrompu".to_string()))),
        }
    }

    pub fn draw_about(&mut self, ui: &mut egui::Ui) {
        ui.heading("À propos");
        ui.add_space(4.0);
        ui.label(
            "GeoVis Galaxy rassemble des cartes et visualisations géographiques, \
             classées selon le cube de MacEachren.",
        );
        ui.add_space(8.0);
        ui.horizontal(|ui| {
            stat_box(ui, &self.stats.total_maps.to_string(), "Cartes");
            let categories = self
                .stats
                .total_categories
                .unwrap_or_else(|| self.gallery.categories().len().saturating_sub(1) as u64);
            stat_box(ui, &categories.to_string(), "Catégories");
            if let Some(views) = self.stats.total_views {
                stat_box(ui, &views.to_string(), "Vues");
            }
        });
    }

    pub fn draw_contact(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.heading("Contact");
        ui.add_space(4.0);

        ui.horizontal(|ui| {
            ui.label(egui::RichText::new(CONTACT_EMAIL).color(ui::ACCENT));
            if ui.button("📋 Copier").clicked() {
                ctx.output_mut(|o| o.copied_text = CONTACT_EMAIL.to_string());
                self.contact.copied_at = Some(Instant::now());
            }
            if let Some(at) = self.contact.copied_at {
                let elapsed = at.elapsed();
                if elapsed < COPY_FEEDBACK {
                    ui.label(egui::RichText::new("Email copié dans le presse-papiers !").color(ui::OK_GREEN));
                    ctx.request_repaint_after(COPY_FEEDBACK - elapsed);
                } else {
                    self.contact.copied_at = None;
                }
            }
        });
        ui.add_space(8.0);

        let sending = self.contact.is_sending();
        egui::Grid::new("contact_form")
            .num_columns(2)
            .spacing([12.0, 8.0])
            .show(ui, |ui| {
                let form = &mut self.contact.form;
                ui.label("Nom");
                ui.add_enabled(!sending, egui::TextEdit::singleline(&mut form.name).desired_width(320.0));
                ui.end_row();
                ui.label("Email");
                ui.add_enabled(!sending, egui::TextEdit::singleline(&mut form.email).desired_width(320.0));
                ui.end_row();
                ui.label("Sujet");
                ui.add_enabled(!sending, egui::TextEdit::singleline(&mut form.subject).desired_width(320.0));
                ui.end_row();
                ui.label("Message");
                ui.add_enabled(
                    !sending,
                    egui::TextEdit::multiline(&mut form.message)
                        .desired_rows(5)
                        .desired_width(320.0),
                );
                ui.end_row();
            });

        ui.add_space(6.0);
        let complete = self.contact.form.missing_field().is_none();
        let label = if sending { "Envoi en cours..." } else { "Envoyer" };
        if ui
            .add_enabled(!sending && complete, egui::Button::new(label).fill(ui::BADGE_BG))
            .clicked()
        {
            self.submit_contact(ctx);
        }

        if let Some(alert) = self.contact.alert.clone() {
            let mut dismissed = false;
            egui::Window::new("GeoVis Galaxy")
                .id(egui::Id::new("contact_alert"))
                .order(egui::Order::Foreground)
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
                .show(ctx, |ui| {
                    let color = if alert.ok { ui::OK_GREEN } else { ui::ERROR_RED };
                    ui.label(egui::RichText::new(&alert.text).color(color));
                    ui.add_space(6.0);
                    if ui.button("OK").clicked() {
                        dismissed = true;
                    }
                });
            if dismissed {
                self.contact.alert = None;
            }
        }
    }
}

fn stat_box(ui: &mut egui::Ui, number: &str, label: &str) {
    egui::Frame::none()
        .fill(ui::CARD_BG)
        .rounding(10.0)
        .inner_margin(egui::Margin::symmetric(18.0, 10.0))
        .show(ui, |ui| {
            ui.vertical_centered(|ui| {
                ui.label(egui::RichText::new(number).size(26.0).strong().color(ui::ACCENT));
                ui.label(label);
            });
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> ContactForm {
        ContactForm {
            name: "Ada".into(),
            email: "ada@example.org".into(),
            subject: "Question".into(),
            message: "Bonjour".into(),
        }
    }

    #[test]
    fn alert_texts() {
        assert_eq!(alert_for(&Ok("Merci !".into())).text, "✅ Merci !");
        let api = alert_for(&Err(GalleryError::Api("Email invalide".into())));
        assert_eq!(api.text, "❌ Erreur: Email invalide");
        assert!(!api.ok);
        let io = alert_for(&Err(GalleryError::Io(std::io::Error::other("reset"))));
        assert_eq!(io.text, "❌ Erreur de connexion. Veuillez réessayer plus tard.");
    }

    #[test]
    fn success_clears_form_and_failure_keeps_it() {
        let mut state = ContactState {
            form: filled(),
            ..Default::default()
        };
        state.settle(Err(GalleryError::Api("Une erreur inconnue est survenue".into())));
        assert_eq!(state.form, filled());
        assert!(!state.is_sending());

        state.settle(Ok("Message envoyé".into()));
        assert_eq!(state.form, ContactForm::default());
        assert_eq!(state.alert.as_ref().map(|a| a.ok), Some(true));
    }
}
