pub mod config;
pub mod error;
pub mod model;
pub mod net;
pub mod store;

// Gallery state: filtering, aggregation, detail selection and hints
pub mod gallery;

// Presentation engines, UI-toolkit agnostic except for the painters
pub mod cube;
pub mod viewer;
pub mod anim;

pub use error::{GalleryError, Result};
