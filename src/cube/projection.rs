//! Perspective projection of cube-space points onto a screen rect.

pub type Vec3 = [f32; 3];

#[inline]
pub fn sub(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
pub fn dot(a: Vec3, b: Vec3) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
pub fn cross(a: Vec3, b: Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[inline]
pub fn length(a: Vec3) -> f32 {
    dot(a, a).sqrt()
}

pub fn normalize(a: Vec3) -> Option<Vec3> {
    let len = length(a);
    if len > 1e-6 && len.is_finite() {
        let inv = 1.0 / len;
        Some([a[0] * inv, a[1] * inv, a[2] * inv])
    } else {
        None
    }
}

/// Rotate by Euler angles in XYZ order with z = 0: `Rx(pitch) * Ry(yaw) * p`.
pub fn rotate_xy(p: Vec3, pitch: f32, yaw: f32) -> Vec3 {
    let (sy, cy) = yaw.sin_cos();
    let x = p[0] * cy + p[2] * sy;
    let z = -p[0] * sy + p[2] * cy;

    let (sx, cx) = pitch.sin_cos();
    let y = p[1] * cx - z * sx;
    let z = p[1] * sx + z * cx;
    [x, y, z]
}

/// Pinhole camera looking at the origin with +Y up.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    eye: Vec3,
    right: Vec3,
    up: Vec3,
    forward: Vec3,
    /// 1 / tan(fov_y / 2)
    focal: f32,
}

/// A projected point: screen position and view depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    pub x: f32,
    pub y: f32,
    pub depth: f32,
}

const NEAR: f32 = 0.1;

impl Camera {
    /// `None` when the eye sits on the origin or straight above/below it.
    pub fn look_at_origin(eye: Vec3, fov_y_deg: f32) -> Option<Self> {
        let forward = normalize(sub([0.0; 3], eye))?;
        let right = normalize(cross(forward, [0.0, 1.0, 0.0]))?;
        let up = cross(right, forward);
        let focal = 1.0 / (fov_y_deg.to_radians() * 0.5).tan();
        Some(Self {
            eye,
            right,
            up,
            forward,
            focal,
        })
    }

    /// Project into a viewport with top-left `origin` and `size`. Points
    /// behind the near plane yield `None`.
    pub fn project(&self, p: Vec3, origin: [f32; 2], size: [f32; 2]) -> Option<Projected> {
        let d = sub(p, self.eye);
        let depth = dot(d, self.forward);
        if depth < NEAR {
            return None;
        }
        let aspect = size[0] / size[1];
        let ndc_x = dot(d, self.right) * self.focal / (depth * aspect);
        let ndc_y = dot(d, self.up) * self.focal / depth;
        Some(Projected {
            x: origin[0] + (ndc_x + 1.0) * 0.5 * size[0],
            y: origin[1] + (1.0 - ndc_y) * 0.5 * size[1],
            depth,
        })
    }

    /// On-screen radius of a sphere of `radius` seen at `depth`.
    pub fn project_radius(&self, radius: f32, depth: f32, viewport_height: f32) -> f32 {
        radius * self.focal / depth.max(NEAR) * viewport_height * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (0..3).all(|i| (a[i] - b[i]).abs() < 1e-5)
    }

    #[test]
    fn zero_rotation_is_identity() {
        assert!(approx(rotate_xy([0.3, -0.2, 0.9], 0.0, 0.0), [0.3, -0.2, 0.9]));
    }

    #[test]
    fn yaw_quarter_turn_maps_x_to_minus_z() {
        let r = rotate_xy([1.0, 0.0, 0.0], 0.0, std::f32::consts::FRAC_PI_2);
        assert!(approx(r, [0.0, 0.0, -1.0]));
    }

    #[test]
    fn pitch_quarter_turn_maps_y_to_z() {
        let r = rotate_xy([0.0, 1.0, 0.0], std::f32::consts::FRAC_PI_2, 0.0);
        assert!(approx(r, [0.0, 0.0, 1.0]));
    }

    #[test]
    fn origin_projects_to_viewport_center() {
        let cam = Camera::look_at_origin([4.0, 3.0, 4.0], 60.0).unwrap();
        let p = cam.project([0.0; 3], [10.0, 20.0], [320.0, 260.0]).unwrap();
        assert!((p.x - 170.0).abs() < 1e-3);
        assert!((p.y - 150.0).abs() < 1e-3);
        assert!((p.depth - length([4.0, 3.0, 4.0])).abs() < 1e-4);
    }

    #[test]
    fn higher_points_project_higher_on_screen() {
        let cam = Camera::look_at_origin([4.0, 3.0, 4.0], 60.0).unwrap();
        let lo = cam.project([0.0, -1.0, 0.0], [0.0, 0.0], [100.0, 100.0]).unwrap();
        let hi = cam.project([0.0, 1.0, 0.0], [0.0, 0.0], [100.0, 100.0]).unwrap();
        assert!(hi.y < lo.y);
    }

    #[test]
    fn points_behind_camera_are_culled() {
        let cam = Camera::look_at_origin([4.0, 3.0, 4.0], 60.0).unwrap();
        assert!(cam.project([8.0, 6.0, 8.0], [0.0, 0.0], [100.0, 100.0]).is_none());
    }

    #[test]
    fn degenerate_camera_is_rejected() {
        assert!(Camera::look_at_origin([0.0, 0.0, 0.0], 60.0).is_none());
        assert!(Camera::look_at_origin([0.0, 5.0, 0.0], 60.0).is_none());
    }
}
