//! First-frame stills for video entries, used as navigation thumbnails.
//!
//! Extraction runs on a background thread per attempt and reports through
//! a channel polled once per frame. An attempt that outlives the timeout is
//! cancelled and retried once from time zero; a second failure settles the
//! URL on the placeholder. Results are cached by URL for the life of the
//! cache, so a video is decoded at most once.

use std::collections::HashMap;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

use crate::error::{GalleryError, Result};
use crate::net::image::ImageData;

/// Widest thumbnail kept in memory.
pub const THUMB_WIDTH: u32 = 320;

const MAX_ATTEMPTS: u8 = 2;

/// Produces the first decodable frame at or after `seek_secs`.
///
/// Implementations must return promptly once `cancel` is set.
pub trait FrameExtractor: Send + Sync {
    fn extract(&self, url: &str, seek_secs: f64, cancel: &AtomicBool) -> Result<ImageData>;
}

// ─── ffmpeg ───────────────────────────────────────────────────────────────

/// Extracts a frame by piping a single PNG out of an `ffmpeg` child process.
#[derive(Debug, Clone)]
pub struct FfmpegExtractor {
    binary: PathBuf,
    poll_interval: Duration,
}

impl FfmpegExtractor {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            poll_interval: Duration::from_millis(20),
        }
    }

    fn command(&self, url: &str, seek_secs: f64) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("-hide_banner")
            .arg("-loglevel")
            .arg("error")
            .arg("-ss")
            .arg(format!("{seek_secs:.3}"))
            .arg("-i")
            .arg(url)
            .arg("-frames:v")
            .arg("1")
            .arg("-f")
            .arg("image2pipe")
            .arg("-vcodec")
            .arg("png")
            .arg("-")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());
        cmd
    }
}

impl FrameExtractor for FfmpegExtractor {
    fn extract(&self, url: &str, seek_secs: f64, cancel: &AtomicBool) -> Result<ImageData> {
        let mut child = self.command(url, seek_secs).spawn().map_err(|e| {
            GalleryError::Extract(format!("cannot start {}: {e}", self.binary.display()))
        })?;

        // Drain stdout on its own thread so a full pipe never stalls ffmpeg
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| GalleryError::Extract("ffmpeg stdout unavailable".into()))?;
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let mut buf = Vec::new();
            let res = stdout.read_to_end(&mut buf).map(|_| buf);
            let _ = tx.send(res);
        });

        let status = loop {
            if cancel.load(Ordering::Relaxed) {
                let _ = child.kill();
                let _ = child.wait();
                return Err(GalleryError::Extract("cancelled".into()));
            }
            match child.try_wait()? {
                Some(status) => break status,
                None => std::thread::sleep(self.poll_interval),
            }
        };
        if !status.success() {
            return Err(GalleryError::Extract(format!("ffmpeg exited with {status}")));
        }

        let bytes = rx
            .recv()
            .map_err(|_| GalleryError::Extract("ffmpeg output lost".into()))??;
        if bytes.is_empty() {
            return Err(GalleryError::Extract("no frame decoded".into()));
        }
        ImageData::decode(&bytes, THUMB_WIDTH)
    }
}

// ─── Cache ────────────────────────────────────────────────────────────────

/// Public view of one URL's thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbStatus {
    Pending,
    Ready,
    Placeholder,
}

enum Entry {
    Pending {
        rx: mpsc::Receiver<Result<ImageData>>,
        attempt: u8,
        started: Instant,
        cancel: Arc<AtomicBool>,
    },
    Ready(ImageData),
    Placeholder,
}

pub struct ThumbnailCache {
    extractor: Arc<dyn FrameExtractor>,
    timeout: Duration,
    entries: HashMap<String, Entry>,
    placeholder: ImageData,
}

impl ThumbnailCache {
    pub fn new(extractor: Arc<dyn FrameExtractor>, timeout: Duration) -> Self {
        Self {
            extractor,
            timeout,
            entries: HashMap::new(),
            placeholder: ImageData::video_placeholder(),
        }
    }

    /// Start deriving a thumbnail for `url` unless one is cached or running.
    pub fn request(&mut self, url: &str) {
        self.request_at(url, Instant::now());
    }

    pub fn request_at(&mut self, url: &str, now: Instant) {
        if self.entries.contains_key(url) {
            return;
        }
        log::debug!("thumbnail miss: {url}");
        let entry = self.spawn_attempt(url, 1, now);
        self.entries.insert(url.to_string(), entry);
    }

    fn spawn_attempt(&self, url: &str, attempt: u8, now: Instant) -> Entry {
        let (tx, rx) = mpsc::channel();
        let cancel = Arc::new(AtomicBool::new(false));
        let extractor = Arc::clone(&self.extractor);
        let flag = Arc::clone(&cancel);
        let url = url.to_string();
        std::thread::spawn(move || {
            let _ = tx.send(extractor.extract(&url, 0.0, &flag));
        });
        Entry::Pending {
            rx,
            attempt,
            started: now,
            cancel,
        }
    }

    /// Settle finished and timed-out attempts. Returns the URLs whose
    /// thumbnail became available (frame or placeholder) in this call.
    pub fn poll(&mut self) -> Vec<String> {
        self.poll_at(Instant::now())
    }

    pub fn poll_at(&mut self, now: Instant) -> Vec<String> {
        let mut settled = Vec::new();
        let mut retries = Vec::new();

        for (url, entry) in self.entries.iter_mut() {
            let Entry::Pending {
                rx,
                attempt,
                started,
                cancel,
            } = entry
            else {
                continue;
            };
            match rx.try_recv() {
                Ok(Ok(image)) => {
                    *entry = Entry::Ready(image);
                    settled.push(url.clone());
                    continue;
                }
                Ok(Err(e)) => {
                    log::debug!("thumbnail attempt {attempt} for {url} failed: {e}");
                }
                Err(mpsc::TryRecvError::Disconnected) => {}
                Err(mpsc::TryRecvError::Empty) => {
                    if now.saturating_duration_since(*started) < self.timeout {
                        continue;
                    }
                    log::debug!("thumbnail attempt {attempt} for {url} timed out");
                    cancel.store(true, Ordering::Relaxed);
                }
            }
            if *attempt < MAX_ATTEMPTS {
                retries.push((url.clone(), *attempt + 1));
            } else {
                log::info!("thumbnail for {url} fell back to placeholder");
                *entry = Entry::Placeholder;
                settled.push(url.clone());
            }
        }

        for (url, attempt) in retries {
            log::debug!("retrying thumbnail for {url} from the start");
            let entry = self.spawn_attempt(&url, attempt, now);
            self.entries.insert(url, entry);
        }
        settled
    }

    pub fn status(&self, url: &str) -> Option<ThumbStatus> {
        self.entries.get(url).map(|e| match e {
            Entry::Pending { .. } => ThumbStatus::Pending,
            Entry::Ready(_) => ThumbStatus::Ready,
            Entry::Placeholder => ThumbStatus::Placeholder,
        })
    }

    /// Frame or placeholder; `None` while still pending or never requested.
    pub fn get(&self, url: &str) -> Option<&ImageData> {
        match self.entries.get(url)? {
            Entry::Ready(image) => Some(image),
            Entry::Placeholder => Some(&self.placeholder),
            Entry::Pending { .. } => None,
        }
    }

    pub fn pending_count(&self) -> usize {
        self.entries
            .values()
            .filter(|e| matches!(e, Entry::Pending { .. }))
            .count()
    }
}

impl Drop for ThumbnailCache {
    fn drop(&mut self) {
        for entry in self.entries.values() {
            if let Entry::Pending { cancel, .. } = entry {
                cancel.store(true, Ordering::Relaxed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn frame() -> ImageData {
        ImageData {
            width: 1,
            height: 1,
            rgba: vec![1, 2, 3, 255],
        }
    }

    /// Fails or hangs for the first `bad` calls, then succeeds.
    struct Scripted {
        calls: AtomicUsize,
        bad: usize,
        hang: bool,
        cancelled: AtomicUsize,
    }

    impl Scripted {
        fn new(bad: usize, hang: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                bad,
                hang,
                cancelled: AtomicUsize::new(0),
            })
        }
    }

    impl FrameExtractor for Scripted {
        fn extract(&self, _url: &str, seek: f64, cancel: &AtomicBool) -> Result<ImageData> {
            assert_eq!(seek, 0.0);
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n >= self.bad {
                return Ok(frame());
            }
            if self.hang {
                while !cancel.load(Ordering::Relaxed) {
                    std::thread::sleep(Duration::from_millis(1));
                }
                self.cancelled.fetch_add(1, Ordering::SeqCst);
                return Err(GalleryError::Extract("cancelled".into()));
            }
            Err(GalleryError::Extract("broken stream".into()))
        }
    }

    /// Poll until nothing is pending, advancing the fake clock by `step`.
    fn settle(cache: &mut ThumbnailCache, start: Instant, step: Duration) -> Vec<String> {
        let mut out = Vec::new();
        let mut now = start;
        for _ in 0..2000 {
            out.extend(cache.poll_at(now));
            if cache.pending_count() == 0 {
                return out;
            }
            std::thread::sleep(Duration::from_millis(1));
            now += step;
        }
        panic!("thumbnail never settled");
    }

    #[test]
    fn successful_frame_is_cached() {
        let ex = Scripted::new(0, false);
        let timeout = Duration::from_secs(3600);
        let mut cache = ThumbnailCache::new(ex.clone(), timeout);
        let t0 = Instant::now();
        cache.request_at("a.mp4", t0);
        cache.request_at("a.mp4", t0);

        let mut settled = Vec::new();
        for _ in 0..2000 {
            settled.extend(cache.poll_at(t0));
            if cache.pending_count() == 0 {
                break;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(settled, vec!["a.mp4".to_string()]);
        assert_eq!(cache.status("a.mp4"), Some(ThumbStatus::Ready));
        assert_eq!(cache.get("a.mp4"), Some(&frame()));

        cache.request("a.mp4");
        assert_eq!(ex.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn one_failure_is_retried() {
        let ex = Scripted::new(1, false);
        let mut cache = ThumbnailCache::new(ex.clone(), Duration::from_secs(3600));
        let t0 = Instant::now();
        cache.request_at("b.webm", t0);
        settle(&mut cache, t0, Duration::ZERO);
        assert_eq!(cache.status("b.webm"), Some(ThumbStatus::Ready));
        assert_eq!(ex.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn two_failures_fall_back_to_placeholder() {
        let ex = Scripted::new(usize::MAX, false);
        let mut cache = ThumbnailCache::new(ex.clone(), Duration::from_secs(3600));
        let t0 = Instant::now();
        cache.request_at("c.mov", t0);
        let settled = settle(&mut cache, t0, Duration::ZERO);
        assert_eq!(settled, vec!["c.mov".to_string()]);
        assert_eq!(cache.status("c.mov"), Some(ThumbStatus::Placeholder));
        assert_eq!(cache.get("c.mov"), Some(&ImageData::video_placeholder()));
        assert_eq!(ex.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn hung_attempts_are_cancelled_on_timeout() {
        let ex = Scripted::new(usize::MAX, true);
        let timeout = Duration::from_millis(50);
        let mut cache = ThumbnailCache::new(ex.clone(), timeout);
        let t0 = Instant::now();
        cache.request_at("d.avi", t0);
        assert_eq!(cache.status("d.avi"), Some(ThumbStatus::Pending));
        assert!(cache.get("d.avi").is_none());

        settle(&mut cache, t0, timeout / 4);
        assert_eq!(cache.status("d.avi"), Some(ThumbStatus::Placeholder));

        // Both stale workers observe their cancel flag and exit
        for _ in 0..2000 {
            if ex.cancelled.load(Ordering::SeqCst) == 2 {
                break;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(ex.cancelled.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn missing_binary_reports_extract_error() {
        let ex = FfmpegExtractor::new("/nonexistent/ffmpeg-for-tests");
        let err = ex
            .extract("clip.mp4", 0.0, &AtomicBool::new(false))
            .unwrap_err();
        assert_eq!(err.phase(), "extract");
    }
}
