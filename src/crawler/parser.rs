//! HTML parser producing a document snapshot
//!
//! `scraper::Html` is not `Send`, so each page is parsed once into an owned
//! [`ParsedDocument`] that can cross await points and worker tasks. The snapshot holds
//! everything the link classifier and the resolver need:
//! - the page title
//! - every `<a href>` anchor with its text, image information and boilerplate flag
//! - the set of addressable fragment identifiers (`id` attributes and `<a name>`)

use crate::links::patterns::boilerplate_selectors;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;

static TITLE: LazyLock<Option<Selector>> = LazyLock::new(|| Selector::parse("title").ok());
static ANCHOR: LazyLock<Option<Selector>> = LazyLock::new(|| Selector::parse("a[href]").ok());
static IMAGE: LazyLock<Option<Selector>> = LazyLock::new(|| Selector::parse("img").ok());
static WITH_ID: LazyLock<Option<Selector>> = LazyLock::new(|| Selector::parse("[id]").ok());
static NAMED_ANCHOR: LazyLock<Option<Selector>> =
    LazyLock::new(|| Selector::parse("a[name]").ok());

/// One `<a href>` occurrence on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// Raw `href` attribute value, untrimmed
    pub href: String,

    /// Whitespace-collapsed text content (may be empty)
    pub text: String,

    /// `alt` of the first image inside the anchor, if any
    pub image_alt: Option<String>,

    /// True if the anchor wraps an `<img>`
    pub has_image: bool,

    /// True if an ancestor matches one of the boilerplate selectors
    pub in_boilerplate: bool,
}

/// Owned, thread-safe snapshot of a parsed HTML page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDocument {
    pub title: Option<String>,
    pub anchors: Vec<Anchor>,
    pub fragment_ids: HashSet<String>,
}

/// Parses HTML content into a [`ParsedDocument`]
///
/// Malformed markup never fails: html5ever recovers the same way a browser does, and
/// whatever structure survives is captured.
///
/// # Example
///
/// ```
/// use linkrot::crawler::parse_html;
///
/// let html = r#"<html><head><title>Test</title></head>
///     <body><h2 id="intro">Intro</h2><a href="/page">Link</a></body></html>"#;
/// let doc = parse_html(html);
/// assert_eq!(doc.title, Some("Test".to_string()));
/// assert_eq!(doc.anchors.len(), 1);
/// assert!(doc.fragment_ids.contains("intro"));
/// ```
pub fn parse_html(html: &str) -> ParsedDocument {
    let document = Html::parse_document(html);

    ParsedDocument {
        title: extract_title(&document),
        anchors: extract_anchors(&document),
        fragment_ids: extract_fragment_ids(&document),
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let selector = TITLE.as_ref()?;

    document
        .select(selector)
        .next()
        .map(|element| collapse_whitespace(&element.text().collect::<String>()))
        .filter(|s| !s.is_empty())
}

fn extract_anchors(document: &Html) -> Vec<Anchor> {
    let Some(selector) = ANCHOR.as_ref() else {
        return Vec::new();
    };

    document
        .select(selector)
        .filter_map(|element| {
            let href = element.value().attr("href")?.to_string();
            let image = IMAGE
                .as_ref()
                .and_then(|img| element.select(img).next());

            Some(Anchor {
                href,
                text: collapse_whitespace(&element.text().collect::<Vec<_>>().join(" ")),
                image_alt: image
                    .and_then(|img| img.value().attr("alt"))
                    .map(collapse_whitespace)
                    .filter(|alt| !alt.is_empty()),
                has_image: image.is_some(),
                in_boilerplate: has_boilerplate_ancestor(&element),
            })
        })
        .collect()
}

fn has_boilerplate_ancestor(element: &ElementRef) -> bool {
    let selectors = boilerplate_selectors();

    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| selectors.iter().any(|selector| selector.matches(&ancestor)))
}

fn extract_fragment_ids(document: &Html) -> HashSet<String> {
    let mut ids = HashSet::new();

    if let Some(selector) = WITH_ID.as_ref() {
        ids.extend(
            document
                .select(selector)
                .filter_map(|element| element.value().attr("id"))
                .filter(|id| !id.is_empty())
                .map(str::to_string),
        );
    }

    if let Some(selector) = NAMED_ANCHOR.as_ref() {
        ids.extend(
            document
                .select(selector)
                .filter_map(|element| element.value().attr("name"))
                .filter(|name| !name.is_empty())
                .map(str::to_string),
        );
    }

    ids
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
