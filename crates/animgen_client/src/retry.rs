use std::time::Duration;

use serde::{Deserialize, Serialize};

/// What to do when a status poll fails at the transport level.
///
/// Submission, feedback and explicit `failed` statuses are never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RetryPolicy {
    /// Any poll failure ends the job.
    #[default]
    None,
    /// Retry transient failures with exponential backoff.
    Bounded {
        max_retries: u32,
        initial_backoff: Duration,
        max_backoff: Duration,
    },
}

impl RetryPolicy {
    /// Delay before retry number `retry` (zero-based), or `None` once exhausted.
    pub fn backoff(&self, retry: u32) -> Option<Duration> {
        match *self {
            RetryPolicy::None => None,
            RetryPolicy::Bounded {
                max_retries,
                initial_backoff,
                max_backoff,
            } => {
                if retry >= max_retries {
                    return None;
                }
                let factor = 1u32.checked_shl(retry).unwrap_or(u32::MAX);
                Some(initial_backoff.saturating_mul(factor).min(max_backoff))
            }
        }
    }
}
