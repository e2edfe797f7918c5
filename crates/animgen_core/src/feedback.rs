use crate::TaskId;

/// One of the two exclusive feedback controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackChoice {
    Positive,
    Negative,
}

impl FeedbackChoice {
    pub fn is_positive(self) -> bool {
        matches!(self, FeedbackChoice::Positive)
    }
}

/// Stored preference for one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedbackValue {
    #[default]
    Unset,
    Positive,
    Negative,
}

impl From<FeedbackChoice> for FeedbackValue {
    fn from(choice: FeedbackChoice) -> Self {
        match choice {
            FeedbackChoice::Positive => FeedbackValue::Positive,
            FeedbackChoice::Negative => FeedbackValue::Negative,
        }
    }
}

/// A single request to the feedback store. Switching sides is one request
/// with `remove = false`; re-pressing the active side sends `remove = true`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackRequest {
    pub task_id: TaskId,
    pub choice: FeedbackChoice,
    pub remove: bool,
}

impl FeedbackRequest {
    /// Value the controller holds once the store accepts this request.
    pub fn resulting_value(&self) -> FeedbackValue {
        if self.remove {
            FeedbackValue::Unset
        } else {
            self.choice.into()
        }
    }
}

/// Transient message shown after a toggle settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Submitted,
    Removed,
    Error(String),
}

impl Notice {
    pub fn text(&self) -> String {
        match self {
            Notice::Submitted => "Feedback submitted successfully!".to_string(),
            Notice::Removed => "Feedback removed".to_string(),
            Notice::Error(message) => format!("Failed to submit feedback: {message}"),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }
}
