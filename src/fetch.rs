use std::fs;
use std::path::Path;
#[cfg(feature = "network")]
use std::sync::atomic::{AtomicU64, Ordering};
#[cfg(feature = "network")]
use std::time::Duration;

use serde_json::Value;

use crate::error::FetchError;

/// Transport for manifest and source documents. Every call must observe the
/// current content at `location`; implementations never serve cached data.
pub trait Fetcher {
    fn fetch_json(&self, location: &str) -> Result<Value, FetchError>;
}

impl<F: Fetcher + ?Sized> Fetcher for &F {
    fn fetch_json(&self, location: &str) -> Result<Value, FetchError> {
        (**self).fetch_json(location)
    }
}

pub fn is_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Resolve a source `path` against the manifest location it was declared in.
pub fn resolve_location(base: &str, path: &str) -> String {
    if is_url(path) {
        return path.to_string();
    }

    if is_url(base) {
        return join_url(base, path);
    }

    if Path::new(path).is_absolute() {
        return path.to_string();
    }

    let relative = path.trim_start_matches("./");
    match Path::new(base).parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(relative).to_string_lossy().to_string(),
        _ => relative.to_string(),
    }
}

#[cfg(feature = "network")]
fn join_url(base: &str, path: &str) -> String {
    match reqwest::Url::parse(base).and_then(|b| b.join(path)) {
        Ok(joined) => joined.to_string(),
        Err(_) => join_url_naive(base, path),
    }
}

#[cfg(not(feature = "network"))]
fn join_url(base: &str, path: &str) -> String {
    join_url_naive(base, path)
}

fn join_url_naive(base: &str, path: &str) -> String {
    if let Some(rooted) = path.strip_prefix('/') {
        let after_scheme = base.find("://").map_or(0, |i| i + 3);
        let origin = match base[after_scheme..].find('/') {
            Some(idx) => &base[..after_scheme + idx],
            None => base,
        };
        return format!("{origin}/{rooted}");
    }
    let dir = match base.rfind('/') {
        Some(idx) => &base[..=idx],
        None => base,
    };
    format!("{dir}{}", path.trim_start_matches("./"))
}

/// Reads JSON documents from the local filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct FileFetcher;

impl Fetcher for FileFetcher {
    fn fetch_json(&self, location: &str) -> Result<Value, FetchError> {
        let content = fs::read_to_string(location).map_err(|source| FetchError::Io {
            location: location.to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[cfg(feature = "network")]
static CACHE_BUST_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Append a per-request `_ts` query parameter so intermediaries can never
/// answer from a stale cached copy.
#[cfg(feature = "network")]
fn cache_busted(url: &str) -> String {
    let n = CACHE_BUST_COUNTER.fetch_add(1, Ordering::Relaxed);
    let stamp = chrono::Utc::now().timestamp_millis();
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{url}{sep}_ts={stamp}-{n}")
}

#[cfg(feature = "network")]
fn http_error(e: reqwest::Error) -> FetchError {
    FetchError::Http(e.to_string())
}

#[cfg(feature = "network")]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

#[cfg(feature = "network")]
impl HttpFetcher {
    /// `timeout` of `None` waits indefinitely.
    pub fn new(timeout: Option<Duration>) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(http_error)?;
        Ok(Self { client })
    }
}

#[cfg(feature = "network")]
impl Fetcher for HttpFetcher {
    fn fetch_json(&self, location: &str) -> Result<Value, FetchError> {
        let url = cache_busted(location);
        tracing::debug!(%url, "fetching");
        let response = self
            .client
            .get(&url)
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .header(reqwest::header::PRAGMA, "no-cache")
            .send()
            .map_err(http_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let body = response.text().map_err(http_error)?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Dispatches URLs to HTTP and everything else to the filesystem.
pub struct AutoFetcher {
    file: FileFetcher,
    #[cfg(feature = "network")]
    http: HttpFetcher,
}

impl AutoFetcher {
    pub fn new(timeout_secs: Option<u64>) -> Result<Self, FetchError> {
        #[cfg(not(feature = "network"))]
        let _ = timeout_secs;
        Ok(Self {
            file: FileFetcher,
            #[cfg(feature = "network")]
            http: HttpFetcher::new(timeout_secs.map(Duration::from_secs))?,
        })
    }

    #[cfg(feature = "network")]
    fn fetch_url(&self, location: &str) -> Result<Value, FetchError> {
        self.http.fetch_json(location)
    }

    #[cfg(not(feature = "network"))]
    fn fetch_url(&self, location: &str) -> Result<Value, FetchError> {
        Err(FetchError::Location(format!(
            "{location} (built without network support)"
        )))
    }
}

impl Fetcher for AutoFetcher {
    fn fetch_json(&self, location: &str) -> Result<Value, FetchError> {
        if is_url(location) {
            return self.fetch_url(location);
        }
        self.file.fetch_json(location)
    }
}
