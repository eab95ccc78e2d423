//! Blocking client for the gallery JSON API.
//!
//! Calls run on background threads; the UI thread only ever polls channels.

use std::sync::mpsc;

use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{GalleryError, Result};
use crate::model::{ContactForm, ContactReply, GalleryItem, MapsResponse, Stats};

const USER_AGENT: &str = concat!("GeoVis-Galaxy/", env!("CARGO_PKG_VERSION"));

/// Everything the gallery needs before it can render.
#[derive(Debug, Clone)]
pub struct InitialData {
    pub items: Vec<GalleryItem>,
    pub categories: Vec<String>,
    pub stats: Stats,
}

#[derive(Clone)]
pub struct ApiClient {
    base: Url,
    client: reqwest::blocking::Client,
}

impl ApiClient {
    pub fn new(base: &str) -> Result<Self> {
        let base = normalize_base(base)?;
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(15))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self { base, client })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path.trim_start_matches('/'))?)
    }

    /// `GET /api/maps`
    pub fn maps(&self) -> Result<Vec<GalleryItem>> {
        let resp: MapsResponse = self.get_json("api/maps")?;
        Ok(resp.maps)
    }

    /// `GET /api/categories`
    pub fn categories(&self) -> Result<Vec<String>> {
        self.get_json("api/categories")
    }

    /// `GET /api/stats`
    pub fn stats(&self) -> Result<Stats> {
        self.get_json("api/stats")
    }

    /// `POST /api/contact`. Returns the server's confirmation text.
    pub fn submit_contact(&self, form: &ContactForm) -> Result<String> {
        let url = self.endpoint("api/contact")?;
        let response = self.client.post(url).json(&form.trimmed()).send()?;
        let status = response.status();
        let body = response.text()?;
        match serde_json::from_str::<ContactReply>(&body) {
            Ok(reply) => interpret_contact_reply(reply),
            Err(e) if status.is_success() => Err(e.into()),
            Err(_) => Err(GalleryError::Api(format!("HTTP {}", status.as_u16()))),
        }
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path)?;
        log::debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()?
            .error_for_status()?;
        let body = response.text()?;
        Ok(serde_json::from_str(&body)?)
    }
}

enum Part {
    Maps(Vec<GalleryItem>),
    Categories(Vec<String>),
    Stats(Stats),
}

/// Fetch items, categories and stats in parallel. Resolves when all three
/// succeed and fails as soon as any one fails, without waiting for the rest.
pub fn load_initial(client: &ApiClient) -> Result<InitialData> {
    let (tx, rx) = mpsc::channel();
    let requests: [fn(&ApiClient) -> Result<Part>; 3] = [
        |c| c.maps().map(Part::Maps),
        |c| c.categories().map(Part::Categories),
        |c| c.stats().map(Part::Stats),
    ];
    for request in requests {
        let client = client.clone();
        let tx = tx.clone();
        std::thread::spawn(move || {
            let _ = tx.send(request(&client));
        });
    }
    drop(tx);

    let (mut items, mut categories, mut stats) = (None, None, None);
    for _ in 0..requests.len() {
        match rx.recv() {
            Ok(Ok(Part::Maps(v))) => items = Some(v),
            Ok(Ok(Part::Categories(v))) => categories = Some(v),
            Ok(Ok(Part::Stats(v))) => stats = Some(v),
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(GalleryError::Api("loader thread panicked".into())),
        }
    }
    match (items, categories, stats) {
        (Some(items), Some(categories), Some(stats)) => {
            log::info!("loaded {} maps from API", items.len());
            Ok(InitialData {
                items,
                categories,
                stats,
            })
        }
        _ => Err(GalleryError::Api("incomplete initial load".into())),
    }
}

/// Map a contact reply to the success message or the API-reported error.
pub fn interpret_contact_reply(reply: ContactReply) -> Result<String> {
    if reply.success {
        Ok(reply
            .message
            .unwrap_or_else(|| "Votre message a été envoyé avec succès !".to_string()))
    } else {
        Err(GalleryError::Api(
            reply
                .error
                .unwrap_or_else(|| "Une erreur inconnue est survenue".to_string()),
        ))
    }
}

/// Resolve a possibly relative media path against the API base.
pub fn resolve_url(base: &Url, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") || href.starts_with("file://") {
        return href.to_string();
    }
    if let Some(rest) = href.strip_prefix("//") {
        return format!("{}://{}", base.scheme(), rest);
    }
    match base.join(href) {
        Ok(u) => u.to_string(),
        Err(_) => href.to_string(),
    }
}

fn normalize_base(base: &str) -> Result<Url> {
    let with_scheme = if base.starts_with("http://") || base.starts_with("https://") {
        base.to_string()
    } else {
        format!("http://{}", base)
    };
    let mut url = Url::parse(&with_scheme)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::time::{Duration, Instant};

    /// Serve `route(path)` as `(status, delay, body)` on a local port.
    fn serve(route: fn(&str) -> (u16, Duration, &'static str)) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { continue };
                std::thread::spawn(move || {
                    let mut req = Vec::new();
                    let mut buf = [0u8; 1024];
                    while !req.windows(4).any(|w| w == b"\r\n\r\n") {
                        match stream.read(&mut buf) {
                            Ok(0) | Err(_) => return,
                            Ok(n) => req.extend_from_slice(&buf[..n]),
                        }
                    }
                    let head = String::from_utf8_lossy(&req);
                    let path = head.split_whitespace().nth(1).unwrap_or("/").to_string();
                    let (status, delay, body) = route(&path);
                    std::thread::sleep(delay);
                    let _ = write!(
                        stream,
                        "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        body.len()
                    );
                });
            }
        });
        format!("http://{addr}/")
    }

    #[test]
    fn initial_load_fails_without_waiting_for_slow_requests() {
        let base = serve(|path| match path {
            "/api/maps" => (500, Duration::ZERO, "{}"),
            "/api/stats" => (200, Duration::from_secs(6), "{}"),
            _ => (200, Duration::ZERO, "[]"),
        });
        let client = ApiClient::new(&base).unwrap();
        let started = Instant::now();
        assert!(load_initial(&client).is_err());
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[test]
    fn initial_load_collects_all_three() {
        let base = serve(|path| match path {
            "/api/maps" => (200, Duration::from_millis(50), r#"{"maps":[{"id":"1","title":"Carte"}]}"#),
            "/api/categories" => (200, Duration::ZERO, r#"["Climat","Transport"]"#),
            _ => (200, Duration::ZERO, r#"{"total_maps":1}"#),
        });
        let client = ApiClient::new(&base).unwrap();
        let data = load_initial(&client).unwrap();
        assert_eq!(data.items.len(), 1);
        assert_eq!(data.categories, vec!["Climat", "Transport"]);
        assert_eq!(data.stats.total_maps, 1);
    }

    #[test]
    fn endpoints_join_under_base_path() {
        let c = ApiClient::new("https://host.example/gallery").unwrap();
        assert_eq!(
            c.endpoint("/api/maps").unwrap().as_str(),
            "https://host.example/gallery/api/maps"
        );
        let c = ApiClient::new("localhost:5000").unwrap();
        assert_eq!(c.endpoint("api/stats").unwrap().as_str(), "http://localhost:5000/api/stats");
    }

    #[test]
    fn relative_media_resolves_against_base() {
        let base = Url::parse("http://127.0.0.1:5000/").unwrap();
        assert_eq!(
            resolve_url(&base, "/static/images/a.png"),
            "http://127.0.0.1:5000/static/images/a.png"
        );
        assert_eq!(resolve_url(&base, "https://cdn.x/a.png"), "https://cdn.x/a.png");
        assert_eq!(resolve_url(&base, "//cdn.x/a.png"), "http://cdn.x/a.png");
    }

    #[test]
    fn contact_reply_maps_to_result() {
        let ok = ContactReply {
            success: true,
            message: Some("Merci".into()),
            error: None,
        };
        assert_eq!(interpret_contact_reply(ok).unwrap(), "Merci");

        let err = ContactReply {
            success: false,
            message: None,
            error: Some("Le champ name est requis".into()),
        };
        let e = interpret_contact_reply(err).unwrap_err();
        assert_eq!(e.phase(), "api");
        assert!(e.to_string().contains("name est requis"));

        let bare = interpret_contact_reply(ContactReply::default()).unwrap_err();
        assert!(bare.to_string().contains("inconnue"));
    }
}
