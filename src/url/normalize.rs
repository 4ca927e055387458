use crate::UrlError;
use serde::Serialize;
use std::fmt;
use url::Url;

/// Query parameters dropped during canonicalization (any `utm_*` key is dropped as well)
const TRACKING_PARAMS: &[&str] = &[
    "fbclid",
    "gclid",
    "msclkid",
    "ref",
    "source",
    "mc_cid",
    "mc_eid",
    "_ga",
    "_gl",
    "share",
    "replytocom",
];

/// Normalized string identity of a URL
///
/// Two URLs that point at the same page canonicalize to the same value, which makes
/// this the only key used for deduplication and lookup during a crawl.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CanonicalUrl(String);

impl CanonicalUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Host of the canonical URL (already lowercase, without `www.`)
    pub fn host(&self) -> Option<String> {
        Url::parse(&self.0)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
    }

    /// Path of the canonical URL, `/` for the root
    pub fn path(&self) -> String {
        Url::parse(&self.0)
            .map(|url| url.path().to_string())
            .unwrap_or_default()
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Canonicalizes a raw URL string
///
/// # Canonicalization Steps
///
/// 1. Parse the URL; reject empty, malformed, or non-HTTP(S) input
/// 2. Lowercase the scheme and host
/// 3. Remove the `www.` prefix from the host
/// 4. Collapse duplicate slashes and strip trailing slashes (the root path becomes empty)
/// 5. Drop tracking query parameters and sort the rest by their raw `key=value` text
/// 6. Keep the fragment only when `keep_fragment` is set
///
/// The result is idempotent: canonicalizing a canonical URL returns it unchanged.
///
/// # Examples
///
/// ```
/// use linkrot::url::canonicalize;
///
/// let url = canonicalize("HTTP://WWW.Example.com/a/", false).unwrap();
/// assert_eq!(url.as_str(), "http://example.com/a");
/// ```
pub fn canonicalize(raw: &str, keep_fragment: bool) -> Result<CanonicalUrl, UrlError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(UrlError::Empty);
    }

    let url = Url::parse(raw).map_err(|e| UrlError::Parse(e.to_string()))?;

    let scheme = url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(UrlError::InvalidScheme(scheme.to_string()));
    }

    let host = url.host_str().ok_or(UrlError::MissingHost)?.to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    if host.is_empty() {
        return Err(UrlError::MissingHost);
    }

    let mut canonical = format!("{}://{}", scheme, host);
    if let Some(port) = url.port() {
        canonical.push_str(&format!(":{}", port));
    }

    canonical.push_str(&normalize_path(url.path()));

    if let Some(query) = url.query() {
        let query = filter_and_sort_query(query);
        if !query.is_empty() {
            canonical.push('?');
            canonical.push_str(&query);
        }
    }

    if keep_fragment {
        if let Some(fragment) = url.fragment().filter(|f| !f.is_empty()) {
            canonical.push('#');
            canonical.push_str(fragment);
        }
    }

    Ok(CanonicalUrl(canonical))
}

/// Collapses empty path segments; trailing slashes disappear with them
fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    if segments.is_empty() {
        String::new()
    } else {
        format!("/{}", segments.join("/"))
    }
}

fn filter_and_sort_query(query: &str) -> String {
    let mut params: Vec<&str> = query
        .split('&')
        .filter(|param| !param.is_empty())
        .filter(|param| {
            let key = param.split_once('=').map_or(*param, |(key, _)| key);
            !is_tracking_param(key)
        })
        .collect();

    params.sort_unstable();
    params.join("&")
}

fn is_tracking_param(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key.as_str())
}
