use crate::{AttemptId, FeedbackChoice, StatusReport, TaskId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationMsg {
    /// User submitted the prompt form.
    PromptSubmitted(String),
    /// Creation request returned a job identifier.
    JobCreated {
        attempt: AttemptId,
        task_id: TaskId,
        code: Option<String>,
    },
    /// Creation request failed at transport or HTTP level.
    SubmissionFailed { attempt: AttemptId, message: String },
    /// A status poll answered.
    StatusReceived {
        attempt: AttemptId,
        task_id: TaskId,
        report: StatusReport,
    },
    /// A status poll failed at transport or HTTP level.
    PollFailed {
        attempt: AttemptId,
        task_id: TaskId,
        message: String,
    },
    /// The presentation shell tore the orchestrator down.
    TornDown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackMsg {
    /// User pressed one of the two controls.
    Toggled(FeedbackChoice),
    /// The in-flight request was accepted by the store.
    RequestSucceeded,
    /// The in-flight request failed; the message is shown to the user.
    RequestFailed { message: String },
    /// The display window of the notice with this id elapsed.
    NoticeExpired { notice_id: u64 },
}
