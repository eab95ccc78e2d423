//! Gallery controller: item list, filter state and the values derived from
//! them.
//!
//! The filtered subset and the aggregate triple are recomputed from scratch
//! on every read. The item list is never mutated after `set_items`.

use crate::model::{DisplayMode, GalleryItem, MetricTriple};
use crate::store::{HintKey, HintStore};

/// Category value meaning "no filter", as served first by `/api/categories`.
pub const ALL_CATEGORIES: &str = "Toutes";

/// Whether a category value is one of the "no filter" sentinels.
pub fn is_all_categories(category: &str) -> bool {
    let c = category.trim();
    c.is_empty() || c == ALL_CATEGORIES || c.eq_ignore_ascii_case("all categories")
}

/// Free-text query plus selected category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub query: String,
    pub category: String,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            query: String::new(),
            category: ALL_CATEGORIES.to_string(),
        }
    }
}

impl FilterState {
    /// The filter predicate: category gate AND text gate.
    pub fn matches(&self, item: &GalleryItem) -> bool {
        let category_ok = is_all_categories(&self.category) || item.category == self.category;
        category_ok && matches_query(item, &self.query)
    }
}

/// Case-insensitive substring match against title, every description
/// paragraph and every tag. An empty query matches everything.
pub fn matches_query(item: &GalleryItem, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let q = query.to_lowercase();
    item.title.to_lowercase().contains(&q)
        || item.description.iter().any(|p| p.to_lowercase().contains(&q))
        || item.tags.iter().any(|t| t.to_lowercase().contains(&q))
}

/// Items passing `filter`, in source order.
pub fn filter_items<'a>(items: &'a [GalleryItem], filter: &FilterState) -> Vec<&'a GalleryItem> {
    items.iter().filter(|item| filter.matches(item)).collect()
}

/// Per-axis mean of the triples carried by `items`, rounded per axis.
/// Items without a triple do not dilute the mean. Neutral when none carry
/// one.
pub fn aggregate<'a, I>(items: I) -> MetricTriple
where
    I: IntoIterator<Item = &'a GalleryItem>,
{
    let mut sum = [0.0f64; 3];
    let mut n = 0usize;
    for t in items.into_iter().filter_map(|item| item.metrics) {
        let t = t.clamped();
        sum[0] += t.communication;
        sum[1] += t.task;
        sum[2] += t.interaction;
        n += 1;
    }
    if n == 0 {
        return MetricTriple::NEUTRAL;
    }
    let inv = 1.0 / n as f64;
    MetricTriple::new(
        (sum[0] * inv).round(),
        (sum[1] * inv).round(),
        (sum[2] * inv).round(),
    )
}

/// `"3 Cartes Trouvées"` / `"1 Carte Trouvée"`.
pub fn result_heading(count: usize) -> String {
    let s = if count == 1 { "" } else { "s" };
    format!("{count} Carte{s} Trouvée{s}")
}

/// Which one-time hint the detail view is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HintState {
    Hidden,
    Showing(HintKey),
}

/// Owns the fetched items, the filter state and the open-detail state.
pub struct GalleryController {
    items: Vec<GalleryItem>,
    categories: Vec<String>,
    pub filter: FilterState,
    selected: Option<usize>,
    hint: HintState,
    hints: Box<dyn HintStore>,
}

impl GalleryController {
    pub fn new(hints: Box<dyn HintStore>) -> Self {
        Self {
            items: Vec::new(),
            categories: vec![ALL_CATEGORIES.to_string()],
            filter: FilterState::default(),
            selected: None,
            hint: HintState::Hidden,
            hints,
        }
    }

    /// Install the fetched data. Called once after the initial load.
    pub fn set_items(&mut self, items: Vec<GalleryItem>, categories: Vec<String>) {
        log::info!("gallery: {} items, {} categories", items.len(), categories.len());
        self.items = items;
        self.categories = if categories.is_empty() {
            vec![ALL_CATEGORIES.to_string()]
        } else {
            categories
        };
        self.selected = None;
    }

    pub fn items(&self) -> &[GalleryItem] {
        &self.items
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn filtered(&self) -> Vec<&GalleryItem> {
        filter_items(&self.items, &self.filter)
    }

    pub fn aggregate(&self) -> MetricTriple {
        aggregate(self.filtered())
    }

    /// Reset transient state on teardown.
    pub fn reset(&mut self) {
        self.filter = FilterState::default();
        self.close_detail();
    }

    // ── Detail view ──────────────────────────────────────────────────────────

    /// Open the detail view for the item with `id`. Returns false when no
    /// such item exists.
    pub fn open_detail(&mut self, id: &str) -> bool {
        let Some(idx) = self.items.iter().position(|m| m.id == id) else {
            return false;
        };
        self.selected = Some(idx);
        let item = &self.items[idx];
        let key = match item.mode {
            DisplayMode::TwoD => Some(HintKey::Viewer2D),
            DisplayMode::Interactive if item.has_media() => Some(HintKey::ViewerInteractive),
            DisplayMode::Interactive => None,
        };
        self.hint = match key {
            Some(k) if !self.hints.has_seen(k) => HintState::Showing(k),
            _ => HintState::Hidden,
        };
        log::debug!("detail open: {} (hint {:?})", id, self.hint);
        true
    }

    pub fn close_detail(&mut self) {
        self.selected = None;
        self.hint = HintState::Hidden;
    }

    pub fn selected(&self) -> Option<&GalleryItem> {
        self.selected.and_then(|i| self.items.get(i))
    }

    /// Background scrolling is suppressed while the detail view is open.
    pub fn scroll_locked(&self) -> bool {
        self.selected.is_some()
    }

    pub fn hint(&self) -> HintState {
        self.hint
    }

    /// Hide the hint for this opening only.
    pub fn dismiss_hint(&mut self) {
        self.hint = HintState::Hidden;
    }

    /// Hide the hint and never show it again.
    pub fn dismiss_hint_forever(&mut self) {
        if let HintState::Showing(key) = self.hint {
            if let Err(e) = self.hints.mark_seen(key) {
                log::warn!("could not persist hint flag {}: {}", key.as_str(), e);
            }
        }
        self.hint = HintState::Hidden;
    }
}
