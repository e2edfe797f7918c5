use thiserror::Error;

/// Message shown when the service reports failure without a reason.
pub const DEFAULT_FAILURE_MESSAGE: &str = "Generation failed";

/// Reasons an attempt ends early. All of them end in the same ready-to-retry posture.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("Failed to start generation: {0}")]
    Submission(String),
    #[error("Failed to get generation status: {0}")]
    Poll(String),
    #[error("{}", job_failure_message(.0))]
    JobFailed(Option<String>),
}

impl GenerationError {
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

fn job_failure_message(reason: &Option<String>) -> &str {
    match reason.as_deref().map(str::trim) {
        Some(reason) if !reason.is_empty() => reason,
        _ => DEFAULT_FAILURE_MESSAGE,
    }
}

#[cfg(test)]
mod tests {
    use super::{GenerationError, DEFAULT_FAILURE_MESSAGE};

    #[test]
    fn job_failure_defaults_when_reason_missing_or_blank() {
        assert_eq!(
            GenerationError::JobFailed(None).user_message(),
            DEFAULT_FAILURE_MESSAGE
        );
        assert_eq!(
            GenerationError::JobFailed(Some("  ".into())).user_message(),
            DEFAULT_FAILURE_MESSAGE
        );
        assert_eq!(
            GenerationError::JobFailed(Some("Manim error: bad scene".into())).user_message(),
            "Manim error: bad scene"
        );
    }
}
