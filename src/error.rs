//! Crate-wide error type.
//!
//! Every variant records the phase it happened in so the UI can show a
//! short `[phase] message` line.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GalleryError>;

#[derive(Debug, Error)]
pub enum GalleryError {
    /// Bad base URL or endpoint path
    #[error("[fetch] invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Transport-level failure (connect, timeout, non-2xx)
    #[error("[fetch] {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the JSON we expected
    #[error("[decode] {0}")]
    Json(#[from] serde_json::Error),

    /// Image bytes could not be decoded
    #[error("[decode] image: {0}")]
    Image(#[from] image::ImageError),

    /// The API answered but reported a failure
    #[error("[api] {0}")]
    Api(String),

    /// Video frame extraction failed or was cancelled
    #[error("[extract] {0}")]
    Extract(String),

    /// Hint store could not be read or written
    #[error("[store] {0}")]
    Io(#[from] std::io::Error),
}

impl GalleryError {
    /// Short phase tag for log lines and banners.
    pub fn phase(&self) -> &'static str {
        match self {
            Self::InvalidUrl(_) | Self::Http(_) => "fetch",
            Self::Json(_) | Self::Image(_) => "decode",
            Self::Api(_) => "api",
            Self::Extract(_) => "extract",
            Self::Io(_) => "store",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_displays_phase() {
        let err = GalleryError::Api("Le champ email est requis".into());
        assert_eq!(err.phase(), "api");
        assert_eq!(err.to_string(), "[api] Le champ email est requis");
    }

    #[test]
    fn json_error_is_decode_phase() {
        let err: GalleryError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert_eq!(err.phase(), "decode");
    }
}
