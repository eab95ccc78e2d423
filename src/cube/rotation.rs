//! Drag-to-rotate state for the cube scene.
//!
//! Pointer down starts a gesture, every move while the gesture is active
//! adds `delta * rate` to the angles, pointer up ends it. No inertia, no
//! clamping.

/// Initial (pitch, yaw) of every cube.
pub const INITIAL_ROTATION: (f32, f32) = (0.35, 0.45);

#[derive(Debug, Clone, PartialEq)]
pub struct DragRotation {
    /// Rotation about X, driven by vertical drag
    pub pitch: f32,
    /// Rotation about Y, driven by horizontal drag
    pub yaw: f32,
    rate: f32,
    last: Option<[f32; 2]>,
}

impl DragRotation {
    pub fn new(rate: f32) -> Self {
        Self {
            pitch: INITIAL_ROTATION.0,
            yaw: INITIAL_ROTATION.1,
            rate,
            last: None,
        }
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn is_dragging(&self) -> bool {
        self.last.is_some()
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        self.last = Some([x, y]);
    }

    /// Returns true when the angles changed.
    pub fn pointer_move(&mut self, x: f32, y: f32) -> bool {
        let Some([px, py]) = self.last else {
            return false;
        };
        let (dx, dy) = (x - px, y - py);
        self.yaw += dx * self.rate;
        self.pitch += dy * self.rate;
        self.last = Some([x, y]);
        dx != 0.0 || dy != 0.0
    }

    pub fn pointer_up(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moves_without_drag_are_ignored() {
        let mut r = DragRotation::new(0.01);
        assert!(!r.pointer_move(50.0, 50.0));
        assert_eq!((r.pitch, r.yaw), INITIAL_ROTATION);
    }

    #[test]
    fn drag_accumulates_at_constant_rate() {
        let mut r = DragRotation::new(0.01);
        r.pointer_down(0.0, 0.0);
        assert!(r.is_dragging());
        r.pointer_move(10.0, 0.0);
        r.pointer_move(30.0, -20.0);
        r.pointer_up();
        assert!(!r.is_dragging());
        assert!((r.yaw - (0.45 + 0.30)).abs() < 1e-5);
        assert!((r.pitch - (0.35 - 0.20)).abs() < 1e-5);

        // Movement after release does nothing
        r.pointer_move(500.0, 500.0);
        assert!((r.yaw - 0.75).abs() < 1e-5);
    }

    #[test]
    fn new_gesture_starts_from_its_own_anchor() {
        let mut r = DragRotation::new(0.008);
        r.pointer_down(100.0, 100.0);
        r.pointer_move(110.0, 100.0);
        r.pointer_up();
        r.pointer_down(0.0, 0.0);
        r.pointer_move(10.0, 0.0);
        assert!((r.yaw - (0.45 + 2.0 * 10.0 * 0.008)).abs() < 1e-5);
    }
}
