//! API payload types.
//!
//! The gallery API is loosely typed: descriptions come as a string or a list
//! of paragraphs, media entries as bare URLs or objects, metric values as
//! numbers, numeric strings or garbage. Everything here deserializes
//! leniently so a malformed optional field never rejects the whole item.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Neutral value of every metric axis.
pub const NEUTRAL_METRIC: f64 = 50.0;

/// Preview used when an item carries none.
pub const DEFAULT_PREVIEW: &str = "/static/images/default-map.svg";

/// File extensions treated as video when the media kind is not explicit.
pub const VIDEO_EXTENSIONS: [&str; 5] = ["mp4", "webm", "ogg", "mov", "avi"];

/// Clamp a metric value into [0, 100]. NaN counts as non-numeric → 50.
#[inline]
pub fn clamp_metric(v: f64) -> f64 {
    if v.is_nan() {
        NEUTRAL_METRIC
    } else {
        v.clamp(0.0, 100.0)
    }
}

/// Interpret a raw JSON value as a metric. Missing, null, non-numeric or
/// non-finite values become 50.
pub fn metric_from_value(v: Option<&Value>) -> f64 {
    let raw = match v {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match raw {
        Some(x) if x.is_finite() => clamp_metric(x),
        _ => NEUTRAL_METRIC,
    }
}

// ─── Metric triple ───────────────────────────────────────────────────────────

/// (communication, task, interaction), each in [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricTriple {
    pub communication: f64,
    pub task: f64,
    pub interaction: f64,
}

impl MetricTriple {
    pub const NEUTRAL: Self = Self {
        communication: NEUTRAL_METRIC,
        task: NEUTRAL_METRIC,
        interaction: NEUTRAL_METRIC,
    };

    pub fn new(communication: f64, task: f64, interaction: f64) -> Self {
        Self {
            communication,
            task,
            interaction,
        }
    }

    /// Copy with every axis clamped into [0, 100].
    pub fn clamped(self) -> Self {
        Self {
            communication: clamp_metric(self.communication),
            task: clamp_metric(self.task),
            interaction: clamp_metric(self.interaction),
        }
    }

    /// Build from a JSON object, defaulting every missing axis to 50.
    pub fn from_json(v: &Value) -> Option<Self> {
        let obj = v.as_object()?;
        Some(Self {
            communication: metric_from_value(obj.get("communication")),
            task: metric_from_value(obj.get("task")),
            interaction: metric_from_value(obj.get("interaction")),
        })
    }
}

impl Default for MetricTriple {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

impl<'de> Deserialize<'de> for MetricTriple {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let v = Value::deserialize(d)?;
        Ok(Self::from_json(&v).unwrap_or_default())
    }
}

// ─── Media ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Infer the kind from the URL's file extension.
    pub fn infer(url: &str) -> Self {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        let file = path.rsplit('/').next().unwrap_or(path);
        let ext = match file.rsplit_once('.') {
            Some((_, ext)) => ext.to_ascii_lowercase(),
            None => return Self::Image,
        };
        if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Self::Video
        } else {
            Self::Image
        }
    }
}

/// One entry of an item's media list.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRef {
    pub url: String,
    pub title: Option<String>,
    pub kind: MediaKind,
}

impl MediaRef {
    pub fn new(url: impl Into<String>, title: Option<String>) -> Self {
        let url = url.into();
        let kind = MediaKind::infer(&url);
        Self { url, title, kind }
    }

    pub fn is_video(&self) -> bool {
        self.kind == MediaKind::Video
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawMedia {
    Url(String),
    Entry {
        url: String,
        #[serde(default)]
        title: Option<String>,
        #[serde(default, rename = "type")]
        kind: Option<String>,
    },
}

impl<'de> Deserialize<'de> for MediaRef {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        Ok(match RawMedia::deserialize(d)? {
            RawMedia::Url(url) => MediaRef::new(url, None),
            RawMedia::Entry { url, title, kind } => {
                let kind = match kind.as_deref().map(str::to_ascii_lowercase).as_deref() {
                    Some("video") => MediaKind::Video,
                    Some("image") => MediaKind::Image,
                    _ => MediaKind::infer(&url),
                };
                MediaRef { url, title, kind }
            }
        })
    }
}

// ─── Gallery item ────────────────────────────────────────────────────────────

/// Anything other than `"interactive"` (including a missing mode) is 2D.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    #[default]
    TwoD,
    Interactive,
}

impl<'de> Deserialize<'de> for DisplayMode {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        Ok(match Option::<String>::deserialize(d)?.as_deref() {
            Some(m) if m.eq_ignore_ascii_case("interactive") => Self::Interactive,
            _ => Self::TwoD,
        })
    }
}

impl DisplayMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TwoD => "2d",
            Self::Interactive => "interactive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GalleryItem {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
    #[serde(default, deserialize_with = "one_or_many")]
    pub description: Vec<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub preview: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default, rename = "images", deserialize_with = "nullable_vec")]
    pub media: Vec<MediaRef>,
    #[serde(default)]
    pub mode: DisplayMode,
    #[serde(default, rename = "maceachren", deserialize_with = "lenient_metrics")]
    pub metrics: Option<MetricTriple>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub auteur: Option<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub sources: Vec<String>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub fonctionalites: Vec<String>,
    #[serde(default)]
    pub analyse: Option<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub avis: Vec<String>,
    #[serde(default)]
    pub views: Option<u64>,
    #[serde(default)]
    pub rating: Option<f64>,
}

impl GalleryItem {
    pub fn preview_url(&self) -> &str {
        self.preview.as_deref().unwrap_or(DEFAULT_PREVIEW)
    }

    pub fn first_paragraph(&self) -> &str {
        self.description.first().map(String::as_str).unwrap_or("")
    }

    pub fn has_media(&self) -> bool {
        !self.media.is_empty()
    }

    /// The sequence the lightbox opens on: the full-size static image in 2D
    /// mode, the media list otherwise.
    pub fn viewer_media(&self) -> Vec<MediaRef> {
        match self.mode {
            DisplayMode::TwoD => {
                let src = self
                    .thumbnail
                    .clone()
                    .unwrap_or_else(|| self.preview_url().to_string());
                vec![MediaRef::new(src, Some(self.title.clone()))]
            }
            DisplayMode::Interactive => self.media.clone(),
        }
    }
}

// ─── Endpoint payloads ───────────────────────────────────────────────────────

/// `GET /api/maps`
#[derive(Debug, Clone, Deserialize)]
pub struct MapsResponse {
    #[serde(default, deserialize_with = "nullable_vec")]
    pub maps: Vec<GalleryItem>,
    #[serde(default)]
    pub total: Option<usize>,
}

/// `GET /api/stats`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Stats {
    #[serde(default)]
    pub total_maps: u64,
    #[serde(default)]
    pub total_categories: Option<u64>,
    #[serde(default)]
    pub total_views: Option<u64>,
    #[serde(default)]
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub technology_distribution: std::collections::BTreeMap<String, u64>,
    #[serde(default)]
    pub category_distribution: std::collections::BTreeMap<String, u64>,
}

/// `POST /api/contact` body
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactForm {
    /// Trimmed copy, the way the form is submitted.
    pub fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            subject: self.subject.clone(),
            message: self.message.trim().to_string(),
        }
    }

    /// Name of the first empty required field, if any.
    pub fn missing_field(&self) -> Option<&'static str> {
        [
            ("name", &self.name),
            ("email", &self.email),
            ("subject", &self.subject),
            ("message", &self.message),
        ]
        .into_iter()
        .find(|(_, v)| v.trim().is_empty())
        .map(|(k, _)| k)
    }
}

/// `POST /api/contact` reply
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ContactReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

// ─── Lenient field helpers ───────────────────────────────────────────────────

fn nullable_vec<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(d)?.unwrap_or_default())
}

fn one_or_many<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }
    Ok(match Option::<OneOrMany>::deserialize(d)? {
        Some(OneOrMany::One(s)) if s.is_empty() => Vec::new(),
        Some(OneOrMany::One(s)) => vec![s],
        Some(OneOrMany::Many(v)) => v,
        None => Vec::new(),
    })
}

fn lenient_metrics<'de, D: Deserializer<'de>>(d: D) -> Result<Option<MetricTriple>, D::Error> {
    let v = Option::<Value>::deserialize(d)?;
    Ok(v.as_ref().and_then(MetricTriple::from_json))
}

fn string_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_handles_out_of_range_and_nan() {
        assert_eq!(clamp_metric(-20.0), 0.0);
        assert_eq!(clamp_metric(140.0), 100.0);
        assert_eq!(clamp_metric(f64::NAN), 50.0);
        assert_eq!(clamp_metric(37.5), 37.5);
    }

    #[test]
    fn metric_values_default_to_neutral() {
        let v: Value = serde_json::json!({
            "communication": "abc",
            "task": null,
            "interaction": "80"
        });
        let t = MetricTriple::from_json(&v).unwrap();
        assert_eq!(t.communication, 50.0);
        assert_eq!(t.task, 50.0);
        assert_eq!(t.interaction, 80.0);
    }

    #[test]
    fn infer_video_by_extension() {
        assert_eq!(MediaKind::infer("/static/v/demo.MP4"), MediaKind::Video);
        assert_eq!(MediaKind::infer("https://x.org/a.webm?t=3#frag"), MediaKind::Video);
        assert_eq!(MediaKind::infer("/img/map.png"), MediaKind::Image);
        assert_eq!(MediaKind::infer("/img/noext"), MediaKind::Image);
        assert_eq!(MediaKind::infer("https://host.mov/pic"), MediaKind::Image);
    }

    #[test]
    fn item_parses_loose_payload() {
        let json = r#"{
            "id": 7,
            "title": "Flux migratoires",
            "description": ["Premier paragraphe.", "Second."],
            "category": "Démographie",
            "tags": ["flux", "Europe"],
            "difficulty": "Intermédiaire",
            "mode": "interactive",
            "images": ["/static/a.png", {"url": "/static/b.mp4", "title": "Animation"},
                       {"url": "/static/c", "type": "video"}],
            "maceachren": {"communication": 80, "task": 20},
            "sources": "INSEE"
        }"#;
        let item: GalleryItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, "7");
        assert_eq!(item.description.len(), 2);
        assert_eq!(item.mode, DisplayMode::Interactive);
        assert_eq!(item.media[0].kind, MediaKind::Image);
        assert_eq!(item.media[1].kind, MediaKind::Video);
        assert_eq!(item.media[1].title.as_deref(), Some("Animation"));
        assert_eq!(item.media[2].kind, MediaKind::Video);
        assert_eq!(item.metrics, Some(MetricTriple::new(80.0, 20.0, 50.0)));
        assert_eq!(item.sources, vec!["INSEE".to_string()]);
        assert_eq!(item.preview_url(), DEFAULT_PREVIEW);
    }

    #[test]
    fn missing_optional_sections_are_absent() {
        let item: GalleryItem =
            serde_json::from_str(r#"{"id": "a", "title": "T", "description": "Seul", "images": null, "maceachren": null}"#)
                .unwrap();
        assert_eq!(item.description, vec!["Seul".to_string()]);
        assert!(item.media.is_empty());
        assert!(item.metrics.is_none());
        assert!(item.auteur.is_none());
        assert_eq!(item.mode, DisplayMode::TwoD);
    }

    #[test]
    fn two_d_viewer_uses_thumbnail() {
        let item: GalleryItem = serde_json::from_str(
            r#"{"id": "a", "title": "Carte", "mode": "2d", "thumbnail": "/static/full.jpg",
                "images": ["/static/other.png"]}"#,
        )
        .unwrap();
        let media = item.viewer_media();
        assert_eq!(media.len(), 1);
        assert_eq!(media[0].url, "/static/full.jpg");
        assert_eq!(media[0].title.as_deref(), Some("Carte"));
    }

    #[test]
    fn contact_form_reports_missing_field() {
        let form = ContactForm {
            name: "Ada".into(),
            email: "  ".into(),
            subject: "Question".into(),
            message: "Bonjour".into(),
        };
        assert_eq!(form.missing_field(), Some("email"));
    }
}
