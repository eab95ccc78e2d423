//! Decorative hero animations and the frame-loop handles that drive them.

pub mod globe;
pub mod lifecycle;
pub mod particles;

pub use lifecycle::{FrameLoop, LoopRegistry};
