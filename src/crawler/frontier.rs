//! Crawl frontier with atomic admission
//!
//! The frontier owns the per-URL admission state and the FIFO queue of entries waiting
//! to be fetched. Admission is a single check-and-set under one lock, so a canonical URL
//! discovered concurrently by two workers is admitted exactly once, at the depth of
//! whichever discovery got there first.
//!
//! Both limits are hard ceilings:
//! - no entry deeper than `max_depth` is ever admitted
//! - at most `max_pages` entries are ever handed out by [`Frontier::next_entry`]
//!
//! Check leaves (external links, resources and internal URLs matching a skip pattern)
//! share the queue with crawl entries, so they count toward `max_pages` and obey
//! `max_depth` the same way.

use crate::links::{link_type, patterns, LinkType};
use crate::state::UrlState;
use crate::url::{canonicalize, CanonicalUrl, CrawlScope};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// What happens to an entry once it has been fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Internal page: links are extracted and followed
    Crawl,
    /// External, resource or skipped internal leaf: fetched for liveness and fragment ids only
    Check,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Crawl => "crawl",
            EntryKind::Check => "check",
        }
    }
}

/// A URL waiting in (or dispatched from) the frontier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    /// Canonical identity (no fragment)
    pub url: CanonicalUrl,

    /// The absolute URL as discovered, used for the actual request
    pub requested_url: String,

    /// Crawl depth (the base URL is depth 0)
    pub depth: u32,

    /// Page on which this URL was first discovered
    pub referrer: Option<CanonicalUrl>,

    pub kind: EntryKind,
}

#[derive(Debug, Default)]
struct FrontierInner {
    states: HashMap<CanonicalUrl, UrlState>,
    queue: VecDeque<FrontierEntry>,
    dispatched: usize,
}

/// Shared crawl frontier
#[derive(Debug)]
pub struct Frontier {
    scope: CrawlScope,
    max_depth: u32,
    max_pages: usize,
    inner: Mutex<FrontierInner>,
}

impl Frontier {
    /// Creates an empty frontier
    ///
    /// # Arguments
    ///
    /// * `scope` - Crawl scope used to decide which URLs may be crawled
    /// * `max_depth` - Maximum crawl depth (inclusive)
    /// * `max_pages` - Maximum number of entries ever dispatched
    pub fn new(scope: CrawlScope, max_depth: u32, max_pages: usize) -> Self {
        Self {
            scope,
            max_depth,
            max_pages,
            inner: Mutex::new(FrontierInner::default()),
        }
    }

    /// Admits the base URL at depth 0
    pub fn seed(&self) -> bool {
        let base = self.scope.base().clone();
        let requested = base.as_str().to_string();
        self.admit_canonical(base, requested, 0, None, EntryKind::Crawl)
    }

    /// Attempts to admit a discovered URL
    ///
    /// Returns true if the URL was newly enqueued. Every rejection is a silent no-op:
    /// - the URL does not canonicalize
    /// - `depth` exceeds the maximum crawl depth
    /// - a `Crawl` entry is not internal, or matches a skip pattern
    /// - a `Check` entry is internal (internal pages are crawled, never merely checked)
    /// - the URL was already admitted
    pub fn admit(
        &self,
        raw_url: &str,
        depth: u32,
        referrer: Option<&CanonicalUrl>,
        kind: EntryKind,
    ) -> bool {
        let Ok(canonical) = canonicalize(raw_url, false) else {
            tracing::trace!("Rejecting non-canonicalizable URL {}", raw_url);
            return false;
        };

        let requested = match raw_url.split_once('#') {
            Some((before, _)) => before.to_string(),
            None => raw_url.to_string(),
        };

        self.admit_canonical(canonical, requested, depth, referrer.cloned(), kind)
    }

    fn admit_canonical(
        &self,
        url: CanonicalUrl,
        requested_url: String,
        depth: u32,
        referrer: Option<CanonicalUrl>,
        kind: EntryKind,
    ) -> bool {
        if depth > self.max_depth {
            tracing::trace!("Depth {} exceeds limit for {}", depth, url);
            return false;
        }

        let target_type = link_type(&url, &self.scope);
        let eligible = match kind {
            EntryKind::Crawl => target_type == LinkType::Internal && !patterns::is_skipped(&url),
            EntryKind::Check => match target_type {
                LinkType::External | LinkType::Resource => true,
                LinkType::Internal => patterns::is_skipped(&url),
                LinkType::Unknown => false,
            },
        };
        if !eligible {
            tracing::trace!("{} is not eligible as a {} entry", url, kind.as_str());
            return false;
        }

        let mut inner = self.lock();
        let state = inner.states.entry(url.clone()).or_insert(UrlState::Unseen);
        if !state.can_transition_to(UrlState::Enqueued) {
            return false;
        }
        *state = UrlState::Enqueued;

        tracing::debug!("Admitted {} at depth {} ({})", url, depth, kind.as_str());
        inner.queue.push_back(FrontierEntry {
            url,
            requested_url,
            depth,
            referrer,
            kind,
        });
        true
    }

    /// Takes the next entry in FIFO order
    ///
    /// Returns `None` when the queue is empty or the page budget has been spent. The
    /// budget only stops new dispatch; entries already handed out are unaffected.
    pub fn next_entry(&self) -> Option<FrontierEntry> {
        let mut inner = self.lock();
        if inner.dispatched >= self.max_pages {
            return None;
        }

        let entry = inner.queue.pop_front()?;
        inner.dispatched += 1;
        Some(entry)
    }

    /// Marks a dispatched URL as observed
    pub fn mark_observed(&self, url: &CanonicalUrl) {
        let mut inner = self.lock();
        if let Some(state) = inner.states.get_mut(url) {
            if state.can_transition_to(UrlState::Observed) {
                *state = UrlState::Observed;
            }
        }
    }

    /// Current admission state of a canonical URL
    pub fn state(&self, url: &CanonicalUrl) -> UrlState {
        self.lock()
            .states
            .get(url)
            .copied()
            .unwrap_or(UrlState::Unseen)
    }

    /// Number of entries waiting in the queue
    pub fn queued(&self) -> usize {
        self.lock().queue.len()
    }

    /// Number of entries handed out so far
    pub fn dispatched(&self) -> usize {
        self.lock().dispatched
    }

    /// Returns true once the page budget has been spent
    pub fn budget_exhausted(&self) -> bool {
        self.lock().dispatched >= self.max_pages
    }

    pub fn scope(&self) -> &CrawlScope {
        &self.scope
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn max_pages(&self) -> usize {
        self.max_pages
    }

    fn lock(&self) -> MutexGuard<'_, FrontierInner> {
        // The inner state is consistent after every statement, so a poisoned lock is usable
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
