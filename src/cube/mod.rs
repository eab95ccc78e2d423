//! MacEachren cube: plots a metric triple as a point inside a cube.
//!
//! Axis assignment is fixed: X = interaction, Y = communication, Z = task.
//! Each value `v` maps to `u = (clamp(v) - 50) / 50`, so 0 → -1, 50 → 0
//! and 100 → +1. Both presentation variants share this module; they only
//! differ in the parameters returned by [`CubeVariant::params`].

pub mod paint;
pub mod projection;
pub mod rotation;

use crate::model::{clamp_metric, MetricTriple};
use projection::{length, Vec3};

/// Map a metric in [0, 100] to [-1, 1]. Out-of-range input is clamped,
/// NaN is treated as 50.
#[inline]
pub fn to_unit(v: f64) -> f64 {
    (clamp_metric(v) - 50.0) / 50.0
}

/// Marker position in unit-cube coordinates.
pub fn unit_position(t: &MetricTriple) -> [f64; 3] {
    [to_unit(t.interaction), to_unit(t.communication), to_unit(t.task)]
}

/// Glow/beam colour: R = interaction, G = communication, B = task, each the
/// fraction `v / 100`, blended toward white by `blend`.
pub fn glow_color(t: &MetricTriple, blend: f32) -> [f32; 3] {
    let t = t.clamped();
    let base = [
        (t.interaction / 100.0) as f32,
        (t.communication / 100.0) as f32,
        (t.task / 100.0) as f32,
    ];
    base.map(|c| c + (1.0 - c) * blend)
}

pub type Rgb = [u8; 3];

pub const AXIS_X_COLOR: Rgb = [0xef, 0x44, 0x44];
pub const AXIS_Y_COLOR: Rgb = [0x10, 0xb9, 0x81];
pub const AXIS_Z_COLOR: Rgb = [0x8b, 0x5c, 0xf6];
pub const CORNER_COLOR: Rgb = [0xfb, 0xbf, 0x24];
pub const MARKER_COLOR: Rgb = [0xf5, 0x9e, 0x0b];

/// Which cube is being drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CubeVariant {
    /// Per-item cube in the detail view
    Compact,
    /// Larger cube over the filtered set's aggregate
    Aggregate,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariantParams {
    /// Half edge length of the cube in world units
    pub scale: f32,
    pub camera: Vec3,
    pub drag_rate: f32,
    pub glow_blend: f32,
    /// World-space radius of the glow halo
    pub glow_radius: f32,
    pub marker_radius: f32,
    pub endpoint_radius: f32,
    pub corner_radius: f32,
    pub axis_width: f32,
    pub edge_color: Rgb,
    pub face_color: Rgb,
    pub face_alpha: u8,
    pub background: Rgb,
    pub default_size: [f32; 2],
    pub title: &'static str,
}

impl CubeVariant {
    pub fn params(self) -> VariantParams {
        match self {
            Self::Compact => VariantParams {
                scale: 1.0,
                camera: [4.0, 3.0, 4.0],
                drag_rate: 0.01,
                glow_blend: 0.35,
                glow_radius: 1.1,
                marker_radius: 0.12,
                endpoint_radius: 0.12,
                corner_radius: 0.08,
                axis_width: 3.0,
                edge_color: [0x64, 0x74, 0x8b],
                face_color: [0x1e, 0x29, 0x3b],
                face_alpha: 31,
                background: [0x0f, 0x17, 0x2a],
                default_size: [320.0, 260.0],
                title: "CARTOGRAPHY³",
            },
            Self::Aggregate => VariantParams {
                scale: 1.2,
                camera: [4.5, 3.5, 4.5],
                drag_rate: 0.008,
                glow_blend: 0.30,
                glow_radius: 1.4,
                marker_radius: 0.15,
                endpoint_radius: 0.15,
                corner_radius: 0.1,
                axis_width: 4.0,
                edge_color: [0x7d, 0xd3, 0xfc],
                face_color: [0x1e, 0x3a, 0x5f],
                face_alpha: 38,
                background: [0x0a, 0x0f, 0x1e],
                default_size: [500.0, 400.0],
                title: "PROFIL GLOBAL",
            },
        }
    }
}

/// An axis line with its two endpoint markers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Axis {
    pub from: Vec3,
    pub to: Vec3,
    pub color: Rgb,
    pub far_color: Rgb,
}

/// Cube edges as pairs of indices into [`CubeScene::corners`].
pub const EDGES: [(usize, usize); 12] = [
    (0, 1), (2, 3), (4, 5), (6, 7), // along X
    (0, 2), (1, 3), (4, 6), (5, 7), // along Y
    (0, 4), (1, 5), (2, 6), (3, 7), // along Z
];

/// Faces as corner index quads, wound consistently.
pub const FACES: [[usize; 4]; 6] = [
    [0, 1, 3, 2], // z = -s
    [4, 5, 7, 6], // z = +s
    [0, 1, 5, 4], // y = -s
    [2, 3, 7, 6], // y = +s
    [0, 2, 6, 4], // x = -s
    [1, 3, 7, 5], // x = +s
];

/// Every geometric element of one cube, in unrotated world space.
#[derive(Debug, Clone, PartialEq)]
pub struct CubeScene {
    pub variant: CubeVariant,
    pub triple: MetricTriple,
    pub marker: Vec3,
    pub glow: [f32; 3],
    /// Origin → marker; `None` when the marker sits at the centre
    pub beam: Option<(Vec3, Vec3)>,
    pub corners: [Vec3; 8],
    pub axes: [Axis; 3],
}

impl CubeScene {
    pub fn build(triple: MetricTriple, variant: CubeVariant) -> Self {
        let p = variant.params();
        let s = p.scale;
        let u = unit_position(&triple);
        let marker = [u[0] as f32 * s, u[1] as f32 * s, u[2] as f32 * s];

        let beam = if length(marker) > 0.001 {
            Some(([0.0; 3], marker))
        } else {
            None
        };

        let mut corners = [[0.0f32; 3]; 8];
        for (i, c) in corners.iter_mut().enumerate() {
            *c = [
                if i & 1 == 0 { -s } else { s },
                if i & 2 == 0 { -s } else { s },
                if i & 4 == 0 { -s } else { s },
            ];
        }

        // Axes run along the (-s, -s, -s) edges and overshoot by half a unit
        let reach = 1.5 * s;
        let axes = [
            Axis {
                from: [-reach, -s, -s],
                to: [reach, -s, -s],
                color: AXIS_X_COLOR,
                far_color: [0xff, 0x88, 0x88],
            },
            Axis {
                from: [-s, -reach, -s],
                to: [-s, reach, -s],
                color: AXIS_Y_COLOR,
                far_color: [0x6e, 0xe7, 0xb7],
            },
            Axis {
                from: [-s, -s, -reach],
                to: [-s, -s, reach],
                color: AXIS_Z_COLOR,
                far_color: [0xc4, 0xb5, 0xfd],
            },
        ];

        Self {
            variant,
            triple,
            marker,
            glow: glow_color(&triple, p.glow_blend),
            beam,
            corners,
            axes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_unit_fixed_points() {
        assert_eq!(to_unit(0.0), -1.0);
        assert_eq!(to_unit(50.0), 0.0);
        assert_eq!(to_unit(100.0), 1.0);
        assert_eq!(to_unit(25.0), -0.5);
    }

    #[test]
    fn to_unit_clamps_and_defaults() {
        assert_eq!(to_unit(-40.0), -1.0);
        assert_eq!(to_unit(250.0), 1.0);
        assert_eq!(to_unit(f64::NAN), 0.0);
    }

    #[test]
    fn to_unit_is_monotonic() {
        let mut prev = to_unit(0.0);
        for i in 1..=1000 {
            let cur = to_unit(i as f64 * 0.1);
            assert!(cur >= prev);
            prev = cur;
        }
    }

    #[test]
    fn marker_uses_fixed_axis_assignment() {
        let t = MetricTriple::new(100.0, 0.0, 75.0); // comm, task, interaction
        let scene = CubeScene::build(t, CubeVariant::Compact);
        assert_eq!(scene.marker, [0.5, 1.0, -1.0]);

        let agg = CubeScene::build(t, CubeVariant::Aggregate);
        assert!((agg.marker[0] - 0.6).abs() < 1e-6);
        assert!((agg.marker[1] - 1.2).abs() < 1e-6);
        assert!((agg.marker[2] + 1.2).abs() < 1e-6);
    }

    #[test]
    fn neutral_marker_has_no_beam() {
        let scene = CubeScene::build(MetricTriple::NEUTRAL, CubeVariant::Compact);
        assert_eq!(scene.marker, [0.0, 0.0, 0.0]);
        assert!(scene.beam.is_none());
        let off = CubeScene::build(MetricTriple::new(60.0, 50.0, 50.0), CubeVariant::Compact);
        assert!(off.beam.is_some());
    }

    #[test]
    fn glow_stays_visible_near_zero() {
        let c = glow_color(&MetricTriple::new(0.0, 0.0, 0.0), 0.35);
        for ch in c {
            assert!((ch - 0.35).abs() < 1e-6);
        }
        let c = glow_color(&MetricTriple::new(100.0, 0.0, 100.0), 0.3);
        assert!((c[0] - 1.0).abs() < 1e-6); // interaction → R
        assert!((c[1] - 1.0).abs() < 1e-6); // communication → G
        assert!((c[2] - 0.3).abs() < 1e-6); // task → B
    }

    #[test]
    fn corners_span_the_cube() {
        let scene = CubeScene::build(MetricTriple::NEUTRAL, CubeVariant::Aggregate);
        assert_eq!(scene.corners[0], [-1.2, -1.2, -1.2]);
        assert_eq!(scene.corners[7], [1.2, 1.2, 1.2]);
        for (a, b) in EDGES {
            let d: Vec<f32> = (0..3)
                .map(|i| (scene.corners[a][i] - scene.corners[b][i]).abs())
                .collect();
            // Exactly one coordinate differs on every edge
            assert_eq!(d.iter().filter(|&&x| x > 0.0).count(), 1);
        }
    }
}
