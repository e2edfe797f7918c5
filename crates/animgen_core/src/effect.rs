use crate::{AttemptId, FeedbackRequest, FeedbackValue, GenerationJob, Notice, TaskId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationEffect {
    /// Every transition publishes the new snapshot, in order.
    JobUpdated(GenerationJob),
    CreateJob { attempt: AttemptId, prompt: String },
    /// Poll again after the configured interval.
    SchedulePoll { attempt: AttemptId, task_id: TaskId },
    /// Stop the loop of a superseded or torn-down attempt.
    CancelAttempt { attempt: AttemptId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackEffect {
    SendFeedback(FeedbackRequest),
    /// Show the notice and expire it after the display window.
    ShowNotice { notice_id: u64, notice: Notice },
    NotifyObserver(FeedbackValue),
}
