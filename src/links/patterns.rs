//! Classification data tables
//!
//! Resource extensions, skip patterns, archive patterns and boilerplate selectors are
//! kept as ordered tables so they can be tested and extended independently of the
//! classification code that consults them.

use crate::url::CanonicalUrl;
use regex::Regex;
use scraper::Selector;
use std::sync::LazyLock;

/// File extensions of non-HTML targets (checked, never crawled)
pub const RESOURCE_EXTENSIONS: &[&str] = &[
    // documents
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "odt", "ods", "odp", "rtf", "txt",
    "csv", "epub",
    // archives
    "zip", "rar", "7z", "tar", "gz", "tgz", "bz2", "xz", "dmg", "exe", "msi", "apk", "iso",
    // audio / video
    "mp3", "wav", "ogg", "flac", "aac", "m4a", "mp4", "m4v", "avi", "mov", "wmv", "mkv",
    "webm", "flv",
    // images
    "jpg", "jpeg", "png", "gif", "bmp", "svg", "webp", "ico", "tif", "tiff", "avif",
    // stylesheets / scripts
    "css", "js", "mjs", "map",
    // fonts
    "woff", "woff2", "ttf", "otf", "eot",
];

/// Low-value URLs never enqueued for crawling
pub const SKIP_PATTERNS: &[&str] = &[
    // paginated listings
    r"/page/\d+(/|$|\?)",
    r"[?&](page|paged|pg)=\d+",
    r"/comment-page-\d+",
    // feeds
    r"/feed(/|$|\?)",
    r"/rss(/|$|\?)",
    r"/atom(/|$|\?)",
    r"\.(rss|atom)$",
    // CMS admin and API endpoints
    r"/wp-admin(/|$|\?)",
    r"/wp-json(/|$|\?)",
    r"/wp-login\.php",
    r"/xmlrpc\.php",
    r"/wp-content/uploads/",
    r"/admin(/|$|\?)",
    r"/api/",
    // attachment pages
    r"/attachment/",
    r"[?&]attachment_id=",
    // print views
    r"/print(/|$|\?)",
    r"[?&]print=",
    // share endpoints
    r"/share(/|$|\?)",
    r"/sharer",
    r"[?&]shared?=",
];

/// Taxonomy and date listings that are crawlable but do not consume depth budget
pub const ARCHIVE_PATTERNS: &[&str] = &[
    r"/(tag|tags|category|categories|author|topic|topics)/[^/?]+($|\?)",
    r"/\d{4}/\d{2}(/\d{2})?($|\?)",
    r"/archives?($|/|\?)",
];

/// Structural containers whose anchors are treated as boilerplate
pub const BOILERPLATE_SELECTORS: &[&str] = &[
    "nav",
    "header",
    "footer",
    "aside",
    "[role='navigation']",
    "[role='banner']",
    "[role='contentinfo']",
    "[role='complementary']",
    ".nav",
    ".navbar",
    ".navigation",
    ".menu",
    ".main-menu",
    ".site-header",
    ".site-footer",
    ".sidebar",
    "#sidebar",
    ".widget-area",
    ".breadcrumb",
    ".breadcrumbs",
    ".pagination",
    ".pager",
    ".nav-links",
    ".comments",
    "#comments",
    ".comment-list",
    ".share",
    ".sharing",
    ".social-share",
    ".share-buttons",
    ".ad",
    ".ads",
    ".advert",
    ".advertisement",
    ".sponsored",
];

static SKIP_REGEXES: LazyLock<Vec<Regex>> = LazyLock::new(|| compile(SKIP_PATTERNS));

static ARCHIVE_REGEXES: LazyLock<Vec<Regex>> = LazyLock::new(|| compile(ARCHIVE_PATTERNS));

static BOILERPLATE: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    BOILERPLATE_SELECTORS
        .iter()
        .filter_map(|selector| Selector::parse(selector).ok())
        .collect()
});

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|pattern| match Regex::new(pattern) {
            Ok(regex) => Some(regex),
            Err(e) => {
                tracing::error!("Invalid URL pattern {}: {}", pattern, e);
                None
            }
        })
        .collect()
}

/// Compiled boilerplate selectors
pub fn boilerplate_selectors() -> &'static [Selector] {
    &BOILERPLATE
}

/// Lowercase file extension of the URL's last path segment, if any
pub fn extension(url: &CanonicalUrl) -> Option<String> {
    let path = url.path();
    let last_segment = path.rsplit('/').next()?;
    let (stem, ext) = last_segment.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Returns true if the URL points at a non-HTML resource
pub fn is_resource(url: &CanonicalUrl) -> bool {
    extension(url).is_some_and(|ext| RESOURCE_EXTENSIONS.contains(&ext.as_str()))
}

/// Returns true if the URL must never be enqueued for crawling
pub fn is_skipped(url: &CanonicalUrl) -> bool {
    let target = path_and_query(url);
    SKIP_REGEXES.iter().any(|regex| regex.is_match(&target))
}

/// Returns true if the URL is a taxonomy or date archive listing
pub fn is_archive(url: &CanonicalUrl) -> bool {
    let target = path_and_query(url);
    ARCHIVE_REGEXES.iter().any(|regex| regex.is_match(&target))
}

fn path_and_query(url: &CanonicalUrl) -> String {
    let raw = url.as_str();
    let after_scheme = raw.split_once("://").map_or(raw, |(_, rest)| rest);
    match after_scheme.find(['/', '?']) {
        Some(index) => after_scheme[index..].to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url::canonicalize;

    fn url(raw: &str) -> CanonicalUrl {
        canonicalize(raw, false).unwrap()
    }

    #[test]
    fn test_tables_compile() {
        assert_eq!(SKIP_REGEXES.len(), SKIP_PATTERNS.len());
        assert_eq!(ARCHIVE_REGEXES.len(), ARCHIVE_PATTERNS.len());
        assert_eq!(boilerplate_selectors().len(), BOILERPLATE_SELECTORS.len());
    }

    #[test]
    fn test_extension() {
        assert_eq!(extension(&url("https://x.com/files/Report.PDF")), Some("pdf".into()));
        assert_eq!(extension(&url("https://x.com/a.b/page")), None);
        assert_eq!(extension(&url("https://x.com/.hidden")), None);
        assert_eq!(extension(&url("https://x.com")), None);
    }

    #[test]
    fn test_is_resource() {
        assert!(is_resource(&url("https://x.com/doc.pdf")));
        assert!(is_resource(&url("https://cdn.other.com/img/logo.png?v=3")));
        assert!(is_resource(&url("https://x.com/font.woff2")));
        assert!(!is_resource(&url("https://x.com/about")));
        assert!(!is_resource(&url("https://x.com/index.html")));
    }

    #[test]
    fn test_skip_patterns() {
        assert!(is_skipped(&url("https://x.com/blog/page/2")));
        assert!(is_skipped(&url("https://x.com/tag/rust/page/3/")));
        assert!(is_skipped(&url("https://x.com/blog?page=4")));
        assert!(is_skipped(&url("https://x.com/feed/")));
        assert!(is_skipped(&url("https://x.com/post/comments/feed")));
        assert!(is_skipped(&url("https://x.com/wp-admin/options.php")));
        assert!(is_skipped(&url("https://x.com/wp-json/wp/v2/posts")));
        assert!(is_skipped(&url("https://x.com/post/attachment/photo")));
        assert!(is_skipped(&url("https://x.com/post?print=1")));
        assert!(is_skipped(&url("https://x.com/post/share")));

        assert!(!is_skipped(&url("https://x.com/blog/my-post")));
        assert!(!is_skipped(&url("https://x.com/pages/about")));
        assert!(!is_skipped(&url("https://x.com/tag/rust")));
    }

    #[test]
    fn test_archive_patterns() {
        assert!(is_archive(&url("https://x.com/tag/rust")));
        assert!(is_archive(&url("https://x.com/category/news/")));
        assert!(is_archive(&url("https://x.com/author/jane")));
        assert!(is_archive(&url("https://x.com/2024/05")));
        assert!(is_archive(&url("https://x.com/2024/05/17")));
        assert!(is_archive(&url("https://x.com/archive")));

        assert!(!is_archive(&url("https://x.com/tag/rust/some-post")));
        assert!(!is_archive(&url("https://x.com/2024/05/17/my-post")));
        assert!(!is_archive(&url("https://x.com/about")));
    }

    #[test]
    fn test_host_does_not_leak_into_patterns() {
        assert!(!is_skipped(&url("https://admin.x.com/welcome")));
        assert!(!is_archive(&url("https://tag.x.com/rust")));
    }
}
