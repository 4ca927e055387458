//! URL handling module for linkrot
//!
//! This module provides URL canonicalization, domain extraction, and the crawl scope
//! that decides which hosts belong to the crawled site.

mod domain;
mod normalize;

pub use domain::{is_within, registrable_domain};
pub use normalize::{canonicalize, CanonicalUrl};

use crate::UrlError;

/// The set of hosts treated as part of the crawled site
///
/// The base host always belongs to the scope. When subdomain crawling is enabled,
/// every host under the base host's registrable root belongs to it as well.
#[derive(Debug, Clone)]
pub struct CrawlScope {
    base: CanonicalUrl,
    base_host: String,
    root: String,
    include_subdomains: bool,
}

impl CrawlScope {
    /// Builds a scope from the raw base URL
    ///
    /// # Examples
    ///
    /// ```
    /// use linkrot::url::CrawlScope;
    ///
    /// let scope = CrawlScope::new("https://www.example.com/", true).unwrap();
    /// assert!(scope.contains_host("example.com"));
    /// assert!(scope.contains_host("docs.example.com"));
    /// assert!(!scope.contains_host("example.org"));
    /// ```
    pub fn new(base_url: &str, include_subdomains: bool) -> Result<Self, UrlError> {
        let base = canonicalize(base_url, false)?;
        let base_host = base.host().ok_or(UrlError::MissingHost)?;
        let root = registrable_domain(&base_host);

        Ok(Self {
            base,
            base_host,
            root,
            include_subdomains,
        })
    }

    /// Canonical form of the base URL
    pub fn base(&self) -> &CanonicalUrl {
        &self.base
    }

    /// Canonical host of the base URL
    pub fn base_host(&self) -> &str {
        &self.base_host
    }

    /// Registrable root of the base host
    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn includes_subdomains(&self) -> bool {
        self.include_subdomains
    }

    /// Returns true if the (canonical, `www.`-less) host belongs to the crawled site
    pub fn contains_host(&self, host: &str) -> bool {
        host == self.base_host || (self.include_subdomains && is_within(host, &self.root))
    }

    /// Returns true if the canonical URL's host belongs to the crawled site
    pub fn contains(&self, url: &CanonicalUrl) -> bool {
        url.host().is_some_and(|host| self.contains_host(&host))
    }
}
