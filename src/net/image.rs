//! Asynchronous image fetcher.
//!
//! Spawns background threads to download preview and media images and
//! decode them into RGBA pixel buffers ready for egui texture creation.
//! Each URL is fetched at most once per loader.

use std::collections::{HashMap, HashSet};
use std::sync::mpsc;

use crate::error::Result;

/// Widest image kept in memory; larger images are scaled down.
pub const MAX_IMAGE_WIDTH: u32 = 1280;

/// Decoded image data (RGBA).
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl ImageData {
    /// Decode encoded bytes, capping the width at `max_width`.
    pub fn decode(bytes: &[u8], max_width: u32) -> Result<Self> {
        let img = image::load_from_memory(bytes)?;
        let rgba = img.to_rgba8();
        let (w, h) = rgba.dimensions();

        let (w, h, pixels) = if w > max_width {
            let ratio = max_width as f32 / w as f32;
            let new_h = ((h as f32 * ratio) as u32).max(1);
            let resized = image::imageops::resize(
                &rgba,
                max_width,
                new_h,
                image::imageops::FilterType::Triangle,
            );
            let (rw, rh) = resized.dimensions();
            (rw, rh, resized.into_raw())
        } else {
            (w, h, rgba.into_raw())
        };

        Ok(Self {
            width: w,
            height: h,
            rgba: pixels,
        })
    }

    /// Fixed still shown where a video frame could not be derived: dark
    /// slate with a light play triangle.
    pub fn video_placeholder() -> Self {
        const W: u32 = 160;
        const H: u32 = 90;
        let mut rgba = Vec::with_capacity((W * H * 4) as usize);
        let (cx, cy) = (W as f32 * 0.5, H as f32 * 0.5);
        for y in 0..H {
            for x in 0..W {
                let dx = x as f32 - (cx - 10.0);
                let dy = (y as f32 - cy).abs();
                // Triangle pointing right, 24 px wide, 28 px tall
                let inside = dx >= 0.0 && dx <= 24.0 && dy <= 14.0 * (1.0 - dx / 24.0);
                let px = if inside {
                    [226, 232, 240, 255]
                } else {
                    [30, 41, 59, 255]
                };
                rgba.extend_from_slice(&px);
            }
        }
        Self {
            width: W,
            height: H,
            rgba,
        }
    }
}

/// Manages background image fetching and decoding.
pub struct ImageLoader {
    pending: HashMap<String, mpsc::Receiver<Option<ImageData>>>,
    loaded: HashMap<String, ImageData>,
    failed: HashSet<String>,
}

impl Default for ImageLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageLoader {
    pub fn new() -> Self {
        Self {
            pending: HashMap::new(),
            loaded: HashMap::new(),
            failed: HashSet::new(),
        }
    }

    /// Request an image to be fetched in the background.
    pub fn request(&mut self, url: &str) {
        if self.loaded.contains_key(url)
            || self.pending.contains_key(url)
            || self.failed.contains(url)
        {
            return;
        }

        let (tx, rx) = mpsc::channel();
        let url_owned = url.to_string();

        std::thread::spawn(move || {
            let result = match fetch_and_decode(&url_owned) {
                Ok(data) => Some(data),
                Err(e) => {
                    log::debug!("image {} failed: {}", url_owned, e);
                    None
                }
            };
            let _ = tx.send(result);
        });

        self.pending.insert(url.to_string(), rx);
    }

    /// Poll for completed downloads. Call every frame. Returns the URLs that
    /// finished loading during this poll.
    pub fn poll(&mut self) -> Vec<String> {
        let mut completed = Vec::new();
        let mut newly_loaded = Vec::new();
        for (url, rx) in &self.pending {
            match rx.try_recv() {
                Ok(Some(data)) => {
                    self.loaded.insert(url.clone(), data);
                    newly_loaded.push(url.clone());
                    completed.push(url.clone());
                }
                Ok(None) | Err(mpsc::TryRecvError::Disconnected) => {
                    self.failed.insert(url.clone());
                    completed.push(url.clone());
                }
                Err(mpsc::TryRecvError::Empty) => {}
            }
        }
        for url in completed {
            self.pending.remove(&url);
        }
        newly_loaded
    }

    /// Get a loaded image's data.
    pub fn get(&self, url: &str) -> Option<&ImageData> {
        self.loaded.get(url)
    }

    pub fn is_failed(&self, url: &str) -> bool {
        self.failed.contains(url)
    }

    /// Number of images still being fetched.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

fn fetch_and_decode(url: &str) -> Result<ImageData> {
    let bytes = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()?
        .get(url)
        .send()?
        .error_for_status()?
        .bytes()?;
    ImageData::decode(&bytes, MAX_IMAGE_WIDTH)
}
