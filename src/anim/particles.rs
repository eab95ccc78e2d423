//! Drifting particle field with proximity links.

use rand::Rng;

pub const DEFAULT_COUNT: usize = 50;
pub const PARTICLE_COLOR: [u8; 3] = [79, 172, 254];
/// Particles closer than this (px) are joined by a line.
pub const LINK_DISTANCE: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    /// px per reference frame
    pub vx: f32,
    pub vy: f32,
    pub radius: f32,
    pub opacity: f32,
}

/// A line between two particles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    pub a: usize,
    pub b: usize,
    pub alpha: f32,
}

/// Line alpha for two particles `distance` px apart.
pub fn link_alpha(distance: f32) -> Option<f32> {
    (distance < LINK_DISTANCE).then(|| 0.2 * (1.0 - distance / LINK_DISTANCE))
}

#[derive(Debug, Clone)]
pub struct ParticleField {
    particles: Vec<Particle>,
    width: f32,
    height: f32,
}

impl ParticleField {
    pub fn new<R: Rng>(count: usize, width: f32, height: f32, rng: &mut R) -> Self {
        let (w, h) = (width.max(1.0), height.max(1.0));
        let particles = (0..count)
            .map(|_| Particle {
                x: rng.gen_range(0.0..w),
                y: rng.gen_range(0.0..h),
                vx: rng.gen_range(-0.5..0.5),
                vy: rng.gen_range(-0.5..0.5),
                radius: rng.gen_range(0.5..2.0),
                opacity: rng.gen_range(0.2..0.5),
            })
            .collect();
        Self {
            particles,
            width: w,
            height: h,
        }
    }

    pub fn from_particles(particles: Vec<Particle>, width: f32, height: f32) -> Self {
        Self {
            particles,
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    /// New surface bounds; particles keep their positions and wrap on the
    /// next step if they are now outside.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width.max(1.0);
        self.height = height.max(1.0);
    }

    /// Move every particle by `frames` reference frames, wrapping at edges.
    pub fn step(&mut self, frames: f32) {
        let (w, h) = (self.width, self.height);
        for p in &mut self.particles {
            p.x += p.vx * frames;
            p.y += p.vy * frames;
            if p.x < 0.0 {
                p.x = w;
            } else if p.x > w {
                p.x = 0.0;
            }
            if p.y < 0.0 {
                p.y = h;
            } else if p.y > h {
                p.y = 0.0;
            }
        }
    }

    pub fn links(&self) -> Vec<Link> {
        let mut out = Vec::new();
        for (i, a) in self.particles.iter().enumerate() {
            for (j, b) in self.particles.iter().enumerate().skip(i + 1) {
                let d = (a.x - b.x).hypot(a.y - b.y);
                if let Some(alpha) = link_alpha(d) {
                    out.push(Link { a: i, b: j, alpha });
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn particle(x: f32, y: f32, vx: f32, vy: f32) -> Particle {
        Particle {
            x,
            y,
            vx,
            vy,
            radius: 1.0,
            opacity: 0.3,
        }
    }

    #[test]
    fn random_field_respects_ranges() {
        let mut rng = StdRng::seed_from_u64(7);
        let field = ParticleField::new(DEFAULT_COUNT, 800.0, 600.0, &mut rng);
        assert_eq!(field.particles().len(), 50);
        for p in field.particles() {
            assert!((0.0..800.0).contains(&p.x) && (0.0..600.0).contains(&p.y));
            assert!((-0.5..0.5).contains(&p.vx) && (-0.5..0.5).contains(&p.vy));
            assert!((0.5..2.0).contains(&p.radius));
            assert!((0.2..0.5).contains(&p.opacity));
        }
    }

    #[test]
    fn particles_wrap_at_edges() {
        let mut field = ParticleField::from_particles(
            vec![particle(0.2, 50.0, -0.5, 0.0), particle(99.9, 99.9, 0.5, 0.5)],
            100.0,
            100.0,
        );
        field.step(1.0);
        assert_eq!(field.particles()[0].x, 100.0);
        assert_eq!(field.particles()[1].x, 0.0);
        assert_eq!(field.particles()[1].y, 0.0);
    }

    #[test]
    fn links_fade_with_distance() {
        assert_eq!(link_alpha(0.0), Some(0.2));
        assert!((link_alpha(50.0).unwrap() - 0.1).abs() < 1e-6);
        assert_eq!(link_alpha(100.0), None);

        let field = ParticleField::from_particles(
            vec![
                particle(0.0, 0.0, 0.0, 0.0),
                particle(30.0, 40.0, 0.0, 0.0),
                particle(500.0, 500.0, 0.0, 0.0),
            ],
            1000.0,
            1000.0,
        );
        let links = field.links();
        assert_eq!(links.len(), 1);
        assert_eq!((links[0].a, links[0].b), (0, 1));
        assert!((links[0].alpha - 0.2 * 0.5).abs() < 1e-6);
    }
}
