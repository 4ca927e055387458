/// Admission state definitions for the crawl frontier
///
/// Every canonical URL moves forward through these states at most once.
use std::fmt;

/// Represents the admission state of a canonical URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UrlState {
    /// Never admitted
    Unseen,

    /// Admitted and waiting in (or dispatched from) the frontier queue
    Enqueued,

    /// A terminal observation has been recorded
    Observed,
}

impl UrlState {
    /// Returns true if moving to `next` is a legal forward step
    ///
    /// Only `Unseen -> Enqueued` and `Enqueued -> Observed` are allowed.
    pub fn can_transition_to(&self, next: UrlState) -> bool {
        matches!(
            (self, next),
            (Self::Unseen, Self::Enqueued) | (Self::Enqueued, Self::Observed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unseen => "unseen",
            Self::Enqueued => "enqueued",
            Self::Observed => "observed",
        }
    }
}

impl fmt::Display for UrlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions() {
        assert!(UrlState::Unseen.can_transition_to(UrlState::Enqueued));
        assert!(UrlState::Enqueued.can_transition_to(UrlState::Observed));
    }

    #[test]
    fn test_no_backward_or_skipping_transitions() {
        assert!(!UrlState::Enqueued.can_transition_to(UrlState::Unseen));
        assert!(!UrlState::Observed.can_transition_to(UrlState::Enqueued));
        assert!(!UrlState::Observed.can_transition_to(UrlState::Unseen));
        assert!(!UrlState::Unseen.can_transition_to(UrlState::Observed));
        assert!(!UrlState::Enqueued.can_transition_to(UrlState::Enqueued));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", UrlState::Enqueued), "enqueued");
        assert_eq!(UrlState::Observed.to_string(), "observed");
    }
}
