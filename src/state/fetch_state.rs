/// Retry state machine for a single fetch
///
/// One loop drives a fetch through these states. Any HTTP response, whatever its status,
/// ends the machine; only transport errors lead to another attempt.
use std::fmt;

/// Represents the state of one frontier entry's fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchState {
    /// No attempt made yet
    Pending,

    /// Attempt `attempt` (1-based) is in flight
    Fetching { attempt: u32 },

    /// Attempt `attempt` failed with a transport error and another attempt will follow
    Retrying { attempt: u32, last_error: String },

    /// A response was received on attempt `attempts`
    Succeeded { attempts: u32 },

    /// Retries are exhausted; `error` is the last transport error
    PermanentlyFailed { attempts: u32, error: String },
}

impl FetchState {
    /// Starts the next attempt
    ///
    /// Valid from `Pending` and `Retrying`; terminal and in-flight states are returned
    /// unchanged.
    pub fn start(self) -> Self {
        match self {
            Self::Pending => Self::Fetching { attempt: 1 },
            Self::Retrying { attempt, .. } => Self::Fetching {
                attempt: attempt + 1,
            },
            other => other,
        }
    }

    /// Records an HTTP response (any status code, 4xx and 5xx included)
    pub fn on_response(self) -> Self {
        match self {
            Self::Fetching { attempt } => Self::Succeeded { attempts: attempt },
            other => other,
        }
    }

    /// Records a transport error (timeout, DNS failure, refused or reset connection)
    ///
    /// # Arguments
    ///
    /// * `error` - Description of the failure
    /// * `max_retries` - Number of retries allowed after the first attempt
    pub fn on_transport_error(self, error: String, max_retries: u32) -> Self {
        match self {
            Self::Fetching { attempt } if attempt <= max_retries => Self::Retrying {
                attempt,
                last_error: error,
            },
            Self::Fetching { attempt } => Self::PermanentlyFailed {
                attempts: attempt,
                error,
            },
            other => other,
        }
    }

    /// Number of attempts started so far
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Pending => 0,
            Self::Fetching { attempt } | Self::Retrying { attempt, .. } => *attempt,
            Self::Succeeded { attempts } | Self::PermanentlyFailed { attempts, .. } => *attempts,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fetching { .. } => "fetching",
            Self::Retrying { .. } => "retrying",
            Self::Succeeded { .. } => "succeeded",
            Self::PermanentlyFailed { .. } => "permanently_failed",
        }
    }
}

impl fmt::Display for FetchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
