//! Full-screen media viewer state machine.
//!
//! `closed` or `open(index, zoom, pan)`. All transitions are plain methods
//! so the lightbox UI only translates input into calls and draws whatever
//! state results.
//!
//! A viewer built with [`Viewer::with_registry`] holds a frame loop that
//! runs exactly while it is open. Every exit (close button, Escape,
//! backdrop click, drop) goes through [`Viewer::close`] or `Drop`, so the
//! loop never outlives the open state.

pub mod thumbs;

use std::time::Instant;

use crate::anim::{FrameLoop, LoopRegistry};
use crate::model::{DisplayMode, MediaRef};

pub const ZOOM_STEP: f32 = 0.25;
pub const MIN_ZOOM: f32 = 1.0;
pub const MAX_ZOOM: f32 = 3.0;

/// Keys the viewer reacts to while open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerKey {
    ArrowRight,
    ArrowLeft,
    Escape,
    Plus,
    Equals,
    Minus,
    Zero,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerAction {
    Next,
    Prev,
    Close,
    ZoomIn,
    ZoomOut,
    Reset,
}

impl ViewerKey {
    pub fn action(self) -> ViewerAction {
        match self {
            Self::ArrowRight => ViewerAction::Next,
            Self::ArrowLeft => ViewerAction::Prev,
            Self::Escape => ViewerAction::Close,
            Self::Plus | Self::Equals => ViewerAction::ZoomIn,
            Self::Minus => ViewerAction::ZoomOut,
            Self::Zero => ViewerAction::Reset,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PanDrag {
    start: [f32; 2],
    pan_at_start: [f32; 2],
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpenState {
    pub index: usize,
    pub zoom: f32,
    pub pan: [f32; 2],
    drag: Option<PanDrag>,
    /// Set when a video became current and nobody has consumed it yet
    autoplay_pending: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ViewerState {
    #[default]
    Closed,
    Open(OpenState),
}

#[derive(Debug, Default)]
pub struct Viewer {
    media: Vec<MediaRef>,
    mode: DisplayMode,
    state: ViewerState,
    frame: Option<FrameLoop>,
}

impl Viewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(registry: &LoopRegistry) -> Self {
        Self {
            frame: Some(FrameLoop::new("viewer", registry)),
            ..Self::default()
        }
    }

    /// Advance the viewer's frame loop. `None` while closed.
    pub fn tick(&mut self, now: Instant) -> Option<f32> {
        self.frame.as_mut().and_then(|f| f.tick(now))
    }

    pub fn is_looping(&self) -> bool {
        self.frame.as_ref().is_some_and(FrameLoop::is_running)
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, ViewerState::Open(_))
    }

    pub fn media(&self) -> &[MediaRef] {
        &self.media
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    /// Open on `index`. An empty sequence is refused and the viewer stays
    /// closed; an index past the end lands on the last entry.
    pub fn open(&mut self, media: Vec<MediaRef>, mode: DisplayMode, index: usize) -> bool {
        if media.is_empty() {
            log::debug!("viewer: refusing to open an empty media list");
            return false;
        }
        let index = index.min(media.len() - 1);
        self.media = media;
        self.mode = mode;
        self.state = ViewerState::Open(OpenState {
            index,
            zoom: MIN_ZOOM,
            pan: [0.0, 0.0],
            drag: None,
            autoplay_pending: false,
        });
        self.enter_current();
        if let Some(f) = &mut self.frame {
            f.start();
        }
        true
    }

    pub fn close(&mut self) {
        self.state = ViewerState::Closed;
        self.media.clear();
        if let Some(f) = &mut self.frame {
            f.stop();
        }
    }

    pub fn index(&self) -> Option<usize> {
        match &self.state {
            ViewerState::Open(s) => Some(s.index),
            ViewerState::Closed => None,
        }
    }

    pub fn current(&self) -> Option<&MediaRef> {
        self.index().and_then(|i| self.media.get(i))
    }

    pub fn zoom(&self) -> f32 {
        match &self.state {
            ViewerState::Open(s) => s.zoom,
            ViewerState::Closed => MIN_ZOOM,
        }
    }

    pub fn pan(&self) -> [f32; 2] {
        match &self.state {
            ViewerState::Open(s) => s.pan,
            ViewerState::Closed => [0.0, 0.0],
        }
    }

    pub fn current_is_video(&self) -> bool {
        self.current().is_some_and(MediaRef::is_video)
    }

    /// Reset zoom/pan and arm autoplay for whatever is now current.
    fn enter_current(&mut self) {
        let video = self.current_is_video();
        if let ViewerState::Open(s) = &mut self.state {
            s.zoom = MIN_ZOOM;
            s.pan = [0.0, 0.0];
            s.drag = None;
            s.autoplay_pending = video;
        }
    }

    /// Jump straight to `index`, as from a thumbnail click.
    pub fn jump(&mut self, index: usize) {
        let n = self.media.len();
        if let ViewerState::Open(s) = &mut self.state {
            if n == 0 {
                return;
            }
            s.index = index.min(n - 1);
        } else {
            return;
        }
        self.enter_current();
    }

    pub fn next(&mut self) {
        let n = self.media.len();
        if let Some(i) = self.index() {
            self.jump((i + 1) % n);
        }
    }

    pub fn prev(&mut self) {
        let n = self.media.len();
        if let Some(i) = self.index() {
            self.jump((i + n - 1) % n);
        }
    }

    pub fn zoom_in(&mut self) {
        if self.current_is_video() {
            return;
        }
        if let ViewerState::Open(s) = &mut self.state {
            s.zoom = (s.zoom + ZOOM_STEP).min(MAX_ZOOM);
        }
    }

    pub fn zoom_out(&mut self) {
        if self.current_is_video() {
            return;
        }
        if let ViewerState::Open(s) = &mut self.state {
            s.zoom = (s.zoom - ZOOM_STEP).max(MIN_ZOOM);
            if s.zoom <= MIN_ZOOM {
                s.pan = [0.0, 0.0];
                s.drag = None;
            }
        }
    }

    pub fn reset(&mut self) {
        if let ViewerState::Open(s) = &mut self.state {
            s.zoom = MIN_ZOOM;
            s.pan = [0.0, 0.0];
            s.drag = None;
        }
    }

    // ─── Panning ──────────────────────────────────────────────────────

    pub fn can_pan(&self) -> bool {
        !self.current_is_video() && self.zoom() > MIN_ZOOM
    }

    pub fn is_panning(&self) -> bool {
        matches!(&self.state, ViewerState::Open(s) if s.drag.is_some())
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        if !self.can_pan() {
            return;
        }
        if let ViewerState::Open(s) = &mut self.state {
            s.drag = Some(PanDrag {
                start: [x, y],
                pan_at_start: s.pan,
            });
        }
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        if let ViewerState::Open(s) = &mut self.state {
            if let Some(d) = s.drag {
                s.pan = [
                    d.pan_at_start[0] + (x - d.start[0]),
                    d.pan_at_start[1] + (y - d.start[1]),
                ];
            }
        }
    }

    pub fn pointer_up(&mut self) {
        if let ViewerState::Open(s) = &mut self.state {
            s.drag = None;
        }
    }

    // ─── Input ────────────────────────────────────────────────────────

    pub fn apply(&mut self, action: ViewerAction) {
        match action {
            ViewerAction::Next => self.next(),
            ViewerAction::Prev => self.prev(),
            ViewerAction::Close => self.close(),
            ViewerAction::ZoomIn => self.zoom_in(),
            ViewerAction::ZoomOut => self.zoom_out(),
            ViewerAction::Reset => self.reset(),
        }
    }

    /// Returns false when the viewer is closed and the key was not consumed.
    pub fn handle_key(&mut self, key: ViewerKey) -> bool {
        if !self.is_open() {
            return false;
        }
        self.apply(key.action());
        true
    }

    // ─── Presentation queries ─────────────────────────────────────────

    pub fn shows_zoom_controls(&self) -> bool {
        self.is_open() && !self.current_is_video()
    }

    pub fn shows_thumbnail_strip(&self) -> bool {
        self.is_open() && self.media.len() > 1 && self.mode == DisplayMode::Interactive
    }

    /// Prev/next arrows are only useful with more than one entry.
    pub fn shows_navigation(&self) -> bool {
        self.is_open() && self.media.len() > 1
    }

    /// `Figure i : title` in interactive mode when the entry has a title.
    pub fn caption(&self) -> Option<String> {
        if self.mode != DisplayMode::Interactive {
            return None;
        }
        let i = self.index()?;
        let title = self.current()?.title.as_deref()?;
        Some(format!("Figure {} : {}", i + 1, title))
    }

    pub fn counter(&self) -> Option<String> {
        if self.mode != DisplayMode::Interactive {
            return None;
        }
        self.index().map(|i| format!("{} / {}", i + 1, self.media.len()))
    }

    /// URL of a video that just became current, once per transition.
    pub fn take_autoplay(&mut self) -> Option<String> {
        let url = self.current().filter(|m| m.is_video()).map(|m| m.url.clone());
        match &mut self.state {
            ViewerState::Open(s) if s.autoplay_pending => {
                s.autoplay_pending = false;
                url
            }
            _ => None,
        }
    }

    /// Every video URL in the sequence, for thumbnail derivation.
    pub fn video_urls(&self) -> impl Iterator<Item = &str> {
        self.media.iter().filter(|m| m.is_video()).map(|m| m.url.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn images(n: usize) -> Vec<MediaRef> {
        (0..n)
            .map(|i| MediaRef::new(format!("/img/{i}.png"), Some(format!("Vue {i}"))))
            .collect()
    }

    fn opened(n: usize, index: usize) -> Viewer {
        let mut v = Viewer::new();
        assert!(v.open(images(n), DisplayMode::Interactive, index));
        v
    }

    #[test]
    fn open_resets_zoom_and_pan() {
        let v = opened(3, 1);
        assert_eq!(v.index(), Some(1));
        assert_eq!(v.zoom(), 1.0);
        assert_eq!(v.pan(), [0.0, 0.0]);
    }

    #[test]
    fn n_nexts_return_to_start() {
        for n in 1..6 {
            for start in 0..n {
                let mut v = opened(n, start);
                for _ in 0..n {
                    v.next();
                }
                assert_eq!(v.index(), Some(start));
            }
        }
    }

    #[test]
    fn prev_undoes_next() {
        let mut v = opened(4, 2);
        v.next();
        v.prev();
        assert_eq!(v.index(), Some(2));
        v.prev();
        v.next();
        assert_eq!(v.index(), Some(2));
    }

    #[test]
    fn arrow_left_wraps_from_first_to_last() {
        let mut v = opened(3, 0);
        assert!(v.handle_key(ViewerKey::ArrowLeft));
        assert_eq!(v.index(), Some(2));
    }

    #[test]
    fn zoom_caps_at_three() {
        let mut v = opened(2, 0);
        for _ in 0..5 {
            v.zoom_in();
        }
        assert_eq!(v.zoom(), 2.25);
        for _ in 0..10 {
            v.handle_key(ViewerKey::Plus);
        }
        assert_eq!(v.zoom(), MAX_ZOOM);
        for _ in 0..20 {
            v.handle_key(ViewerKey::Minus);
        }
        assert_eq!(v.zoom(), MIN_ZOOM);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut v = opened(2, 0);
        v.zoom_in();
        v.pointer_down(10.0, 10.0);
        v.pointer_move(60.0, -20.0);
        v.pointer_up();
        assert_eq!(v.pan(), [50.0, -30.0]);
        v.handle_key(ViewerKey::Zero);
        assert_eq!(v.zoom(), 1.0);
        assert_eq!(v.pan(), [0.0, 0.0]);
    }

    #[test]
    fn pan_is_cumulative_from_drag_start() {
        let mut v = opened(1, 0);
        v.zoom_in();
        v.pointer_down(0.0, 0.0);
        v.pointer_move(10.0, 10.0);
        v.pointer_move(25.0, 5.0);
        assert_eq!(v.pan(), [25.0, 5.0]);
        v.pointer_up();
        v.pointer_down(100.0, 100.0);
        v.pointer_move(90.0, 100.0);
        assert_eq!(v.pan(), [15.0, 5.0]);
    }

    #[test]
    fn pan_requires_zoom() {
        let mut v = opened(1, 0);
        v.pointer_down(0.0, 0.0);
        v.pointer_move(40.0, 40.0);
        assert_eq!(v.pan(), [0.0, 0.0]);
        assert!(!v.is_panning());
    }

    #[test]
    fn zooming_out_to_one_snaps_pan() {
        let mut v = opened(1, 0);
        v.zoom_in();
        v.pointer_down(0.0, 0.0);
        v.pointer_move(30.0, 30.0);
        v.pointer_up();
        v.zoom_out();
        assert_eq!(v.zoom(), 1.0);
        assert_eq!(v.pan(), [0.0, 0.0]);
    }

    #[test]
    fn navigation_resets_zoom() {
        let mut v = opened(3, 0);
        v.zoom_in();
        v.zoom_in();
        v.next();
        assert_eq!(v.zoom(), 1.0);
        v.zoom_in();
        v.jump(0);
        assert_eq!(v.zoom(), 1.0);
        assert_eq!(v.index(), Some(0));
    }

    #[test]
    fn escape_closes() {
        let mut v = opened(2, 1);
        assert!(v.handle_key(ViewerKey::Escape));
        assert!(!v.is_open());
        assert!(!v.handle_key(ViewerKey::ArrowRight));
        assert_eq!(v.index(), None);
    }

    #[test]
    fn empty_sequence_is_refused_and_index_clamps() {
        let mut v = Viewer::new();
        assert!(!v.open(Vec::new(), DisplayMode::Interactive, 0));
        assert!(!v.is_open());
        assert!(v.open(images(3), DisplayMode::Interactive, 9));
        assert_eq!(v.index(), Some(2));
    }

    #[test]
    fn video_hides_zoom_and_autoplays_once() {
        let media = vec![
            MediaRef::new("/img/a.png", None),
            MediaRef::new("/vid/tour.MP4?v=2", Some("Tour".into())),
        ];
        let mut v = Viewer::new();
        v.open(media, DisplayMode::Interactive, 0);
        assert!(v.shows_zoom_controls());
        assert!(!v.current_is_video());
        assert_eq!(v.take_autoplay(), None);

        v.next();
        assert!(!v.shows_zoom_controls());
        assert!(v.current_is_video());
        assert_eq!(v.take_autoplay().as_deref(), Some("/vid/tour.MP4?v=2"));
        assert_eq!(v.take_autoplay(), None);

        v.zoom_in();
        assert_eq!(v.zoom(), 1.0);
        v.prev();
        v.next();
        assert!(v.take_autoplay().is_some());
        assert_eq!(v.video_urls().count(), 1);
    }

    #[test]
    fn strip_only_in_interactive_mode_with_several_entries() {
        let mut v = opened(3, 0);
        assert!(v.shows_thumbnail_strip());
        assert_eq!(v.caption().as_deref(), Some("Figure 1 : Vue 0"));
        assert_eq!(v.counter().as_deref(), Some("1 / 3"));

        v.open(images(3), DisplayMode::TwoD, 0);
        assert!(!v.shows_thumbnail_strip());
        assert_eq!(v.caption(), None);

        v.open(images(1), DisplayMode::Interactive, 0);
        assert!(!v.shows_thumbnail_strip());
        assert!(!v.shows_navigation());
    }

    #[test]
    fn every_exit_path_stops_the_frame_loop() {
        let reg = LoopRegistry::new();
        let mut v = Viewer::with_registry(&reg);
        assert!(!v.open(Vec::new(), DisplayMode::Interactive, 0));
        assert_eq!(reg.live(), 0);

        assert!(v.open(images(3), DisplayMode::Interactive, 0));
        assert!(v.is_looping());
        assert_eq!(v.tick(Instant::now()), Some(1.0));
        v.close();
        assert_eq!(reg.live(), 0);
        assert_eq!(v.tick(Instant::now()), None);

        v.open(images(3), DisplayMode::Interactive, 1);
        v.handle_key(ViewerKey::Escape);
        assert_eq!(reg.live(), 0);

        for _ in 0..5 {
            v.open(images(2), DisplayMode::TwoD, 0);
            v.open(images(2), DisplayMode::TwoD, 1);
            assert_eq!(reg.live(), 1);
        }
        drop(v);
        assert_eq!(reg.live(), 0);
    }
}
