//! Rotating globe for the hero banner.
//!
//! The surface is a procedural equirectangular texture (ocean, a handful of
//! elliptical landmasses and polar caps) generated once. Each frame the
//! visible disc is ray-cast on the CPU, one rayon task per row, and shaded
//! with a Lambert term from a fixed sun plus a faint blue back light.

use rayon::prelude::*;

use crate::net::image::ImageData;

/// Spin about Y per reference frame, in radians.
pub const SPIN_PER_FRAME: f32 = 0.002;
/// Pointer offset at the window edge, in radians.
pub const POINTER_INFLUENCE: f32 = 0.2;
/// Fraction of the remaining distance covered each reference frame.
pub const POINTER_EASING: f32 = 0.05;

const OCEAN: [u8; 3] = [0x1e, 0x40, 0xaf];
const LAND: [u8; 3] = [0x22, 0xc5, 0x5e];
const ICE: [u8; 3] = [0xff, 0xff, 0xff];

/// Landmasses as (centre u, centre v, radius u, radius v), all fractions of
/// the texture size.
const LANDMASSES: [(f32, f32, f32, f32); 6] = [
    (0.52, 0.50, 80.0 / 1024.0, 160.0 / 512.0),  // Africa
    (0.51, 0.35, 50.0 / 1024.0, 40.0 / 512.0),   // Europe
    (0.70, 0.40, 150.0 / 1024.0, 80.0 / 512.0),  // Asia
    (0.20, 0.35, 100.0 / 1024.0, 120.0 / 512.0), // North America
    (0.25, 0.65, 60.0 / 1024.0, 140.0 / 512.0),  // South America
    (0.80, 0.75, 80.0 / 1024.0, 40.0 / 512.0),   // Australia
];

/// Polar caps cover this fraction of the height at each end.
const ICE_CAP: f32 = 0.1;

fn surface_at(u: f32, v: f32) -> [u8; 3] {
    if v < ICE_CAP || v >= 1.0 - ICE_CAP {
        return ICE;
    }
    let land = LANDMASSES.iter().any(|&(cu, cv, ru, rv)| {
        let du = (u - cu) / ru;
        let dv = (v - cv) / rv;
        du * du + dv * dv <= 1.0
    });
    if land {
        LAND
    } else {
        OCEAN
    }
}

/// Equirectangular surface texture, rasterized in parallel rows.
pub fn surface_texture(width: u32, height: u32) -> ImageData {
    let (w, h) = (width.max(1), height.max(1));
    let mut rgba = vec![0u8; (w * h * 4) as usize];
    rgba.par_chunks_exact_mut((w * 4) as usize)
        .enumerate()
        .for_each(|(y, row)| {
            let v = (y as f32 + 0.5) / h as f32;
            for (x, px) in row.chunks_exact_mut(4).enumerate() {
                let u = (x as f32 + 0.5) / w as f32;
                let [r, g, b] = surface_at(u, v);
                px.copy_from_slice(&[r, g, b, 255]);
            }
        });
    ImageData {
        width: w,
        height: h,
        rgba,
    }
}

/// Spin plus pointer-driven tilt.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobeMotion {
    /// Accumulated spin about Y
    pub spin: f32,
    /// Eased pointer offset as (about X, about Y)
    pub offset: [f32; 2],
    target: [f32; 2],
}

impl Default for GlobeMotion {
    fn default() -> Self {
        Self::new()
    }
}

impl GlobeMotion {
    pub fn new() -> Self {
        Self {
            spin: 0.0,
            offset: [0.0, 0.0],
            target: [0.0, 0.0],
        }
    }

    /// Pointer position normalized to [-1, 1] on both axes, +y up.
    pub fn set_pointer(&mut self, nx: f32, ny: f32) {
        let nx = nx.clamp(-1.0, 1.0);
        let ny = ny.clamp(-1.0, 1.0);
        self.target = [ny * POINTER_INFLUENCE, nx * POINTER_INFLUENCE];
    }

    pub fn target(&self) -> [f32; 2] {
        self.target
    }

    pub fn step(&mut self, frames: f32) {
        self.spin = (self.spin + SPIN_PER_FRAME * frames) % std::f32::consts::TAU;
        // Same result as applying the per-frame easing `frames` times
        let k = 1.0 - (1.0 - POINTER_EASING).powf(frames);
        for i in 0..2 {
            self.offset[i] += (self.target[i] - self.offset[i]) * k;
        }
    }

    /// (pitch, yaw) to render with.
    pub fn angles(&self) -> (f32, f32) {
        (self.offset[0], self.spin + self.offset[1])
    }
}

fn normalize(v: [f32; 3]) -> [f32; 3] {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    [v[0] / len, v[1] / len, v[2] / len]
}

/// Render the globe into a `size`×`size` RGBA buffer. Pixels outside the
/// disc are fully transparent.
pub fn render(texture: &ImageData, size: u32, pitch: f32, yaw: f32) -> ImageData {
    let n = size.max(1);
    let sun = normalize([5.0, 3.0, 5.0]);
    let back = normalize([-5.0, -3.0, -5.0]);
    let back_color = [0x4a as f32 / 255.0, 0x90 as f32 / 255.0, 0xe2 as f32 / 255.0];
    let ambient = 0.25;
    let (sp, cp) = pitch.sin_cos();
    let (sy, cy) = yaw.sin_cos();
    let (tw, th) = (texture.width.max(1), texture.height.max(1));

    let mut rgba = vec![0u8; (n * n * 4) as usize];
    rgba.par_chunks_exact_mut((n * 4) as usize)
        .enumerate()
        .for_each(|(py, row)| {
            let y = 1.0 - (py as f32 + 0.5) / n as f32 * 2.0;
            for (px, out) in row.chunks_exact_mut(4).enumerate() {
                let x = (px as f32 + 0.5) / n as f32 * 2.0 - 1.0;
                let r2 = x * x + y * y;
                if r2 > 1.0 {
                    continue;
                }
                let z = (1.0 - r2).sqrt();
                let normal = [x, y, z];

                // Undo Rx(pitch) then Ry(yaw) to reach the sphere's own frame
                let ly = y * cp + z * sp;
                let lz = -y * sp + z * cp;
                let lx = x * cy - lz * sy;
                let lz = x * sy + lz * cy;

                let theta = ly.clamp(-1.0, 1.0).acos();
                let mut phi = lz.atan2(-lx);
                if phi < 0.0 {
                    phi += std::f32::consts::TAU;
                }
                let tu = ((phi / std::f32::consts::TAU * tw as f32) as u32).min(tw - 1);
                let tv = ((theta / std::f32::consts::PI * th as f32) as u32).min(th - 1);
                let ti = ((tv * tw + tu) * 4) as usize;
                let base = texture.rgba.get(ti..ti + 3).unwrap_or(&[0u8, 0, 0][..]);

                let lambert = (normal[0] * sun[0] + normal[1] * sun[1] + normal[2] * sun[2]).max(0.0);
                let rim = (normal[0] * back[0] + normal[1] * back[1] + normal[2] * back[2]).max(0.0) * 0.5;
                for c in 0..3 {
                    let lit = base[c] as f32 / 255.0 * (ambient + lambert) + back_color[c] * rim;
                    out[c] = (lit.clamp(0.0, 1.0) * 255.0) as u8;
                }
                // Soft edge on the last pixel ring
                let edge = ((1.0 - r2.sqrt()) * n as f32 * 0.5).clamp(0.0, 1.0);
                out[3] = (edge * 255.0) as u8;
            }
        });
    ImageData {
        width: n,
        height: n,
        rgba,
    }
}
