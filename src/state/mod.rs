//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `UrlState`: Admission state of a canonical URL in the frontier (unseen, enqueued, observed)
//! - `FetchState`: Per-fetch retry state machine (pending, fetching, retrying, succeeded, permanently failed)

mod fetch_state;
mod url_state;

// Re-export main types
pub use fetch_state::FetchState;
pub use url_state::UrlState;
