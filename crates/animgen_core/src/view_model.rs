use crate::{FeedbackValue, GenerationError, GenerationJob, Notice, Stage};

/// Status line shown while waiting for the first code payload.
pub const WAITING_FOR_CODE: &str =
    "Generating code and animation... This may take a few moments.";

/// Acknowledgement shown next to the controls while a value is set.
pub const FEEDBACK_ACKNOWLEDGEMENT: &str = "Thanks for your feedback!";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GenerationView {
    pub stage: Stage,
    /// Submit control should be disabled.
    pub busy: bool,
    pub progress_percent: u8,
    pub status_line: Option<&'static str>,
    pub code: Option<String>,
    pub artifact_url: Option<String>,
    pub error: Option<String>,
}

impl GenerationView {
    pub(crate) fn from_state(job: &GenerationJob, error: Option<&GenerationError>) -> Self {
        let stage = job.stage();
        let busy = stage.is_busy();
        Self {
            stage,
            busy,
            progress_percent: progress_percent(stage),
            status_line: (busy && job.code().is_none()).then_some(WAITING_FOR_CODE),
            code: job.code().map(ToOwned::to_owned),
            artifact_url: job.artifact_url().map(ToOwned::to_owned),
            error: error.map(GenerationError::user_message),
        }
    }
}

fn progress_percent(stage: Stage) -> u8 {
    match stage {
        Stage::Idle | Stage::Failed => 0,
        Stage::GeneratingCode => 25,
        Stage::RenderingVideo => 66,
        Stage::Completed => 100,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeedbackView {
    pub value: FeedbackValue,
    pub positive_selected: bool,
    pub negative_selected: bool,
    pub controls_enabled: bool,
    pub notice: Option<String>,
    pub notice_is_error: bool,
    pub acknowledgement: Option<&'static str>,
}

impl FeedbackView {
    pub(crate) fn from_state(value: FeedbackValue, in_flight: bool, notice: Option<&Notice>) -> Self {
        Self {
            value,
            positive_selected: value == FeedbackValue::Positive,
            negative_selected: value == FeedbackValue::Negative,
            controls_enabled: !in_flight,
            notice: notice.map(Notice::text),
            notice_is_error: notice.is_some_and(Notice::is_error),
            acknowledgement: (value != FeedbackValue::Unset).then_some(FEEDBACK_ACKNOWLEDGEMENT),
        }
    }
}
