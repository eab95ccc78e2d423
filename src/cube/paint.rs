//! egui rendering of a [`CubeScene`] plus its legend panel.
//!
//! The widget owns the rotation state and its frame loop; the scene is
//! rebuilt from the triple every frame, so a new triple moves the marker
//! without resetting the rotation.

use std::time::Instant;

use eframe::egui;

use super::projection::{rotate_xy, Camera, Projected, Vec3};
use super::rotation::DragRotation;
use super::{CubeScene, CubeVariant, Rgb, CORNER_COLOR, EDGES, FACES, MARKER_COLOR};
use crate::anim::{FrameLoop, LoopRegistry};
use crate::model::MetricTriple;

const FOV_Y_DEG: f32 = 60.0;

/// Radial falloff of the glow halo as (radius fraction, alpha) stops.
const GLOW_STOPS: [(f32, f32); 4] = [(1.0, 0.0), (0.7, 0.18), (0.35, 0.35), (0.1, 0.7)];

#[inline]
fn rgb(c: Rgb) -> egui::Color32 {
    egui::Color32::from_rgb(c[0], c[1], c[2])
}

#[inline]
fn rgba(c: Rgb, alpha: f32) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(c[0], c[1], c[2], (alpha.clamp(0.0, 1.0) * 255.0) as u8)
}

fn unit_rgb(c: [f32; 3]) -> Rgb {
    c.map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
}

/// Interactive cube. Keep one per mounted cube across frames; the frame
/// loop starts on the first `show` and stops on `release` or drop.
pub struct CubeWidget {
    variant: CubeVariant,
    rotation: DragRotation,
    frame: FrameLoop,
}

impl CubeWidget {
    pub fn new(variant: CubeVariant, registry: &LoopRegistry) -> Self {
        let name = match variant {
            CubeVariant::Compact => "cube",
            CubeVariant::Aggregate => "global-cube",
        };
        Self {
            variant,
            rotation: DragRotation::new(variant.params().drag_rate),
            frame: FrameLoop::new(name, registry),
        }
    }

    /// Stop the frame loop. The next `show` restarts it.
    pub fn release(&mut self) {
        self.frame.stop();
        self.rotation.pointer_up();
    }

    pub fn is_running(&self) -> bool {
        self.frame.is_running()
    }

    pub fn variant(&self) -> CubeVariant {
        self.variant
    }

    pub fn rotation(&self) -> (f32, f32) {
        (self.rotation.pitch, self.rotation.yaw)
    }

    /// Allocate `size` and draw the cube for `triple`.
    pub fn show(&mut self, ui: &mut egui::Ui, triple: &MetricTriple, size: egui::Vec2) -> egui::Response {
        self.frame.start();
        self.frame.tick(Instant::now());
        let (rect, response) = ui.allocate_exact_size(size, egui::Sense::drag());

        if response.drag_started() {
            if let Some(pos) = response.interact_pointer_pos() {
                self.rotation.pointer_down(pos.x, pos.y);
            }
        }
        if response.dragged() {
            if let Some(pos) = response.interact_pointer_pos() {
                if self.rotation.pointer_move(pos.x, pos.y) {
                    ui.ctx().request_repaint();
                }
            }
        }
        if response.drag_stopped() {
            self.rotation.pointer_up();
        }

        if ui.is_rect_visible(rect) {
            let scene = CubeScene::build(*triple, self.variant);
            paint_scene(ui.painter_at(rect), rect, &scene, self.rotation.pitch, self.rotation.yaw);
        }

        response.on_hover_cursor(egui::CursorIcon::Grab)
    }
}

/// A drawable element sorted back to front.
enum Item {
    Sphere { at: Projected, radius: f32, color: egui::Color32 },
    Glow { at: Projected, radius: f32, color: Rgb },
}

impl Item {
    fn depth(&self) -> f32 {
        match self {
            Item::Sphere { at, .. } | Item::Glow { at, .. } => at.depth,
        }
    }
}

/// Draw `scene` into `rect`. Draws nothing when the surface is unusable.
pub fn paint_scene(painter: egui::Painter, rect: egui::Rect, scene: &CubeScene, pitch: f32, yaw: f32) {
    let size = [rect.width(), rect.height()];
    if !(size[0].is_finite() && size[1].is_finite()) || size[0] < 1.0 || size[1] < 1.0 {
        return;
    }
    let params = scene.variant.params();
    let Some(camera) = Camera::look_at_origin(params.camera, FOV_Y_DEG) else {
        log::debug!("cube camera is degenerate, skipping paint");
        return;
    };
    let origin = [rect.min.x, rect.min.y];
    let project = |p: Vec3| camera.project(rotate_xy(p, pitch, yaw), origin, size);
    let to_pos = |p: Projected| egui::pos2(p.x, p.y);
    let radius = |r: f32, at: &Projected| camera.project_radius(r, at.depth, size[1]);

    painter.rect_filled(rect, 8.0, rgb(params.background));

    let corners: Vec<Option<Projected>> = scene.corners.iter().map(|&c| project(c)).collect();

    // ─── Faces, far first ─────────────────────────────────────────────
    let mut faces: Vec<(f32, Vec<egui::Pos2>)> = FACES
        .iter()
        .filter_map(|quad| {
            let pts: Option<Vec<Projected>> = quad.iter().map(|&i| corners[i]).collect();
            let pts = pts?;
            let depth = pts.iter().map(|p| p.depth).sum::<f32>() / 4.0;
            Some((depth, pts.into_iter().map(to_pos).collect()))
        })
        .collect();
    faces.sort_by(|a, b| b.0.total_cmp(&a.0));
    let face_fill = egui::Color32::from_rgba_unmultiplied(
        params.face_color[0],
        params.face_color[1],
        params.face_color[2],
        params.face_alpha,
    );
    for (_, pts) in faces {
        painter.add(egui::Shape::convex_polygon(pts, face_fill, egui::Stroke::NONE));
    }

    // ─── Edges and axes ───────────────────────────────────────────────
    let edge_stroke = egui::Stroke::new(1.0, rgba(params.edge_color, 0.6));
    for (a, b) in EDGES {
        if let (Some(pa), Some(pb)) = (corners[a], corners[b]) {
            painter.line_segment([to_pos(pa), to_pos(pb)], edge_stroke);
        }
    }
    for axis in &scene.axes {
        if let (Some(a), Some(b)) = (project(axis.from), project(axis.to)) {
            painter.line_segment([to_pos(a), to_pos(b)], egui::Stroke::new(params.axis_width, rgb(axis.color)));
        }
    }

    let glow = unit_rgb(scene.glow);
    if let Some((from, to)) = scene.beam {
        if let (Some(a), Some(b)) = (project(from), project(to)) {
            painter.line_segment([to_pos(a), to_pos(b)], egui::Stroke::new(3.0, rgba(glow, 0.45)));
        }
    }

    // ─── Spheres, depth sorted ────────────────────────────────────────
    let mut items = Vec::with_capacity(16);
    for axis in &scene.axes {
        for (end, color) in [(axis.from, axis.color), (axis.to, axis.far_color)] {
            if let Some(at) = project(end) {
                items.push(Item::Sphere {
                    at,
                    radius: radius(params.endpoint_radius, &at),
                    color: rgb(color),
                });
            }
        }
    }
    for at in corners.iter().flatten() {
        items.push(Item::Sphere {
            at: *at,
            radius: radius(params.corner_radius, at),
            color: rgba(CORNER_COLOR, 0.85),
        });
    }
    if let Some(at) = project(scene.marker) {
        items.push(Item::Glow {
            at,
            radius: radius(params.glow_radius, &at),
            color: glow,
        });
        items.push(Item::Sphere {
            at,
            radius: radius(params.marker_radius, &at),
            color: rgb(MARKER_COLOR),
        });
    }
    // Stable sort keeps the marker sphere above its own glow
    items.sort_by(|a, b| b.depth().total_cmp(&a.depth()));

    for item in items {
        match item {
            Item::Sphere { at, radius, color } => {
                painter.circle_filled(to_pos(at), radius.max(1.0), color);
            }
            Item::Glow { at, radius, color } => {
                for (frac, alpha) in GLOW_STOPS {
                    painter.circle_filled(to_pos(at), radius * frac, rgba(color, alpha * 0.5));
                }
            }
        }
    }
}

// ─── Legend ───────────────────────────────────────────────────────────

/// Axis rows as (colour, description, value label).
fn legend_rows(variant: CubeVariant) -> [(Rgb, &'static str, &'static str); 3] {
    let aggregate = variant == CubeVariant::Aggregate;
    [
        (
            if aggregate { [0xff, 0x44, 0x44] } else { super::AXIS_X_COLOR },
            "Interaction (faible -> forte)",
            "Interaction",
        ),
        (
            if aggregate { [0x22, 0xc5, 0x5e] } else { super::AXIS_Y_COLOR },
            "Communication / Audience (privé -> public)",
            "Communication",
        ),
        (
            if aggregate { [0xa8, 0x55, 0xf7] } else { super::AXIS_Z_COLOR },
            "Tâche (révéler l'inconnu -> présenter le connu)",
            "Tâche",
        ),
    ]
}

/// Clamped value shown as a whole percentage.
pub fn percent(v: f64) -> String {
    format!("{}%", crate::model::clamp_metric(v).round() as i64)
}

/// Title and legend panel shown beside the cube.
pub fn legend(ui: &mut egui::Ui, variant: CubeVariant, triple: &MetricTriple) {
    let values = [triple.interaction, triple.communication, triple.task];
    let rows = legend_rows(variant);

    ui.label(egui::RichText::new(variant.params().title).strong().size(16.0));
    if variant == CubeVariant::Aggregate {
        ui.label(
            egui::RichText::new("Vue d'ensemble des caractéristiques moyennes")
                .color(egui::Color32::GRAY),
        );
    }
    ui.add_space(6.0);

    if variant == CubeVariant::Compact {
        ui.label(egui::RichText::new("Dimensions").strong());
        for (color, text, _) in rows {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new("\u{25CF}").color(rgb(color)));
                ui.label(text);
            });
        }
        ui.add_space(4.0);
        ui.label(egui::RichText::new("Valeurs").strong());
    }

    egui::Grid::new(("cube-values", variant == CubeVariant::Aggregate))
        .num_columns(2)
        .spacing([12.0, 2.0])
        .show(ui, |ui| {
            // Communication, task, interaction: the order values are listed in
            for idx in [1usize, 2, 0] {
                let (color, _, label) = rows[idx];
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new("\u{25CF}").color(rgb(color)));
                    ui.label(label);
                });
                ui.label(egui::RichText::new(percent(values[idx])).strong());
                ui.end_row();
            }
        });

    ui.add_space(4.0);
    if variant == CubeVariant::Aggregate {
        ui.label(egui::RichText::new("Informations").strong());
        ui.label("Ces valeurs représentent la moyenne des dimensions pour toutes les cartes affichées.");
        ui.small("Faites glisser pour explorer le cube en 3D");
    } else {
        ui.small("Astuce : cliquez-glissez pour tourner le cube");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_clamps_values() {
        assert_eq!(percent(80.0), "80%");
        assert_eq!(percent(140.0), "100%");
        assert_eq!(percent(-3.0), "0%");
        assert_eq!(percent(f64::NAN), "50%");
    }

    #[test]
    fn glow_colour_quantises() {
        assert_eq!(unit_rgb([1.0, 0.0, 0.5]), [255, 0, 128]);
        assert_eq!(unit_rgb([2.0, -1.0, 0.0]), [255, 0, 0]);
    }

    #[test]
    fn widget_uses_variant_drag_rate() {
        let reg = LoopRegistry::new();
        let compact = CubeWidget::new(CubeVariant::Compact, &reg);
        assert_eq!(compact.rotation.rate(), 0.01);
        assert_eq!(compact.rotation(), super::super::rotation::INITIAL_ROTATION);
        let agg = CubeWidget::new(CubeVariant::Aggregate, &reg);
        assert_eq!(agg.rotation.rate(), 0.008);
        assert!(!agg.is_running());
    }

    #[test]
    fn shown_widgets_release_their_loop() {
        let reg = LoopRegistry::new();
        let ctx = egui::Context::default();
        let mut keep = CubeWidget::new(CubeVariant::Aggregate, &reg);
        for _ in 0..3 {
            let mut detail = CubeWidget::new(CubeVariant::Compact, &reg);
            let _ = ctx.run(egui::RawInput::default(), |ctx| {
                egui::CentralPanel::default().show(ctx, |ui| {
                    detail.show(ui, &MetricTriple::NEUTRAL, egui::vec2(200.0, 160.0));
                    keep.show(ui, &MetricTriple::NEUTRAL, egui::vec2(200.0, 160.0));
                });
            });
            assert!(detail.is_running());
            assert_eq!(reg.live(), 2);
        }
        assert_eq!(reg.live(), 1);
        keep.release();
        assert_eq!(reg.live(), 0);
    }

    #[test]
    fn degenerate_rect_draws_nothing() {
        let ctx = egui::Context::default();
        let scene = CubeScene::build(MetricTriple::new(80.0, 20.0, 60.0), CubeVariant::Compact);
        let rect = egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(0.0, 0.0));
        let layer = egui::LayerId::background();
        let painter = egui::Painter::new(ctx.clone(), layer, rect);
        paint_scene(painter, rect, &scene, 0.35, 0.45);
        let nan = egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(f32::NAN, 10.0));
        paint_scene(egui::Painter::new(ctx, layer, nan), nan, &scene, 0.35, 0.45);
    }
}
