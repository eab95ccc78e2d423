//! Runtime configuration, read from `GEOVIS_*` environment variables.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:5000";
pub const DEFAULT_FFMPEG: &str = "ffmpeg";
pub const DEFAULT_THUMB_TIMEOUT: Duration = Duration::from_millis(4000);
pub const DEFAULT_PARTICLES: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Root the `/api/*` endpoints and relative media paths resolve against
    pub api_base: String,
    /// Binary used to pull first frames out of videos
    pub ffmpeg: PathBuf,
    /// Bounded wait for one frame-extraction attempt
    pub thumb_timeout: Duration,
    /// Hint flag file; `None` keeps hints in memory only
    pub hints_file: Option<PathBuf>,
    pub particles: usize,
    /// Hand a video to the system player as soon as it becomes current
    pub autoplay: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            ffmpeg: PathBuf::from(DEFAULT_FFMPEG),
            thumb_timeout: DEFAULT_THUMB_TIMEOUT,
            hints_file: default_hints_file(),
            particles: DEFAULT_PARTICLES,
            autoplay: true,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Build from an arbitrary variable lookup. Unparseable values keep the
    /// default and log a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        let get = |k: &str| lookup(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(base) = get("GEOVIS_API_BASE") {
            cfg.api_base = base.trim_end_matches('/').to_string();
        }
        if let Some(ffmpeg) = get("GEOVIS_FFMPEG") {
            cfg.ffmpeg = PathBuf::from(ffmpeg);
        }
        if let Some(ms) = get("GEOVIS_THUMB_TIMEOUT_MS") {
            match ms.parse::<u64>() {
                Ok(ms) if ms > 0 => cfg.thumb_timeout = Duration::from_millis(ms),
                _ => log::warn!("GEOVIS_THUMB_TIMEOUT_MS={:?} is not a positive integer", ms),
            }
        }
        if let Some(path) = get("GEOVIS_HINTS_FILE") {
            cfg.hints_file = Some(PathBuf::from(path));
        }
        if let Some(n) = get("GEOVIS_PARTICLES") {
            match n.parse::<usize>() {
                Ok(n) => cfg.particles = n,
                Err(_) => log::warn!("GEOVIS_PARTICLES={:?} is not a count", n),
            }
        }
        if let Some(flag) = get("GEOVIS_AUTOPLAY") {
            match flag.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => cfg.autoplay = true,
                "0" | "false" | "no" | "off" => cfg.autoplay = false,
                _ => log::warn!("GEOVIS_AUTOPLAY={:?} is not a boolean", flag),
            }
        }
        cfg
    }
}

fn default_hints_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("geovis-galaxy").join("hints.json"))
}
