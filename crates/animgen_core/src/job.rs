use std::fmt;

/// Local counter distinguishing successive submissions from one orchestrator.
pub type AttemptId = u64;

/// Server-issued job identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Client-inferred phase of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    #[default]
    Idle,
    GeneratingCode,
    RenderingVideo,
    Completed,
    Failed,
}

impl Stage {
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Completed | Stage::Failed)
    }

    /// True while a poll loop owns the job.
    pub fn is_busy(self) -> bool {
        matches!(self, Stage::GeneratingCode | Stage::RenderingVideo)
    }
}

/// Immutable snapshot of one generation attempt.
///
/// Every transition builds a new value; the orchestrator swaps it in whole.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GenerationJob {
    attempt: AttemptId,
    task_id: Option<TaskId>,
    prompt: String,
    stage: Stage,
    code: Option<String>,
    artifact_url: Option<String>,
    failure_reason: Option<String>,
}

impl GenerationJob {
    pub fn attempt(&self) -> AttemptId {
        self.attempt
    }

    pub fn task_id(&self) -> Option<&TaskId> {
        self.task_id.as_ref()
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn artifact_url(&self) -> Option<&str> {
        self.artifact_url.as_deref()
    }

    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    /// True once the attempt reached Completed or Failed, including after the
    /// post-failure reset to Idle.
    pub fn is_finished(&self) -> bool {
        self.artifact_url.is_some() || self.failure_reason.is_some()
    }

    pub(crate) fn submitted(attempt: AttemptId, prompt: String) -> Self {
        Self {
            attempt,
            prompt,
            stage: Stage::GeneratingCode,
            ..Self::default()
        }
    }

    pub(crate) fn with_task_id(&self, task_id: TaskId) -> Self {
        Self {
            task_id: Some(task_id),
            ..self.clone()
        }
    }

    /// Returns `None` when code is already set or the payload is empty.
    pub(crate) fn with_first_code(&self, code: &str) -> Option<Self> {
        if self.code.is_some() || code.is_empty() {
            return None;
        }
        Some(Self {
            code: Some(code.to_string()),
            stage: Stage::RenderingVideo,
            ..self.clone()
        })
    }

    pub(crate) fn completed(&self, artifact_url: String) -> Self {
        Self {
            stage: Stage::Completed,
            artifact_url: Some(artifact_url),
            failure_reason: None,
            ..self.clone()
        }
    }

    pub(crate) fn failed(&self, reason: String) -> Self {
        Self {
            stage: Stage::Failed,
            artifact_url: None,
            failure_reason: Some(reason),
            ..self.clone()
        }
    }

    pub(crate) fn reset_to_idle(&self) -> Self {
        Self {
            stage: Stage::Idle,
            ..self.clone()
        }
    }
}
