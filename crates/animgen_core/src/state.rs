use url::Url;

use crate::view_model::{FeedbackView, GenerationView};
use crate::{FeedbackRequest, FeedbackValue, GenerationError, GenerationJob, Notice, TaskId};

/// State owned by the generation orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationState {
    origin: Url,
    job: GenerationJob,
    last_attempt: u64,
    error: Option<GenerationError>,
    torn_down: bool,
    dirty: bool,
}

impl GenerationState {
    /// `origin` is the resolved API origin used to absolutize artifact paths.
    pub fn new(origin: Url) -> Self {
        Self {
            origin,
            job: GenerationJob::default(),
            last_attempt: 0,
            error: None,
            torn_down: false,
            dirty: false,
        }
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    pub fn job(&self) -> &GenerationJob {
        &self.job
    }

    pub fn error(&self) -> Option<&GenerationError> {
        self.error.as_ref()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn view(&self) -> GenerationView {
        GenerationView::from_state(&self.job, self.error.as_ref())
    }

    /// Returns whether anything changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn next_attempt(&mut self) -> u64 {
        self.last_attempt += 1;
        self.last_attempt
    }

    pub(crate) fn replace_job(&mut self, job: GenerationJob) {
        self.job = job;
        self.dirty = true;
    }

    pub(crate) fn set_error(&mut self, error: Option<GenerationError>) {
        self.error = error;
        self.dirty = true;
    }

    pub(crate) fn tear_down(&mut self) {
        self.torn_down = true;
    }
}

/// State owned by one mounted feedback control pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackState {
    task_id: TaskId,
    value: FeedbackValue,
    in_flight: Option<FeedbackRequest>,
    notice: Option<Notice>,
    notice_id: u64,
    dirty: bool,
}

impl FeedbackState {
    pub fn new(task_id: TaskId) -> Self {
        Self {
            task_id,
            value: FeedbackValue::Unset,
            in_flight: None,
            notice: None,
            notice_id: 0,
            dirty: false,
        }
    }

    pub fn task_id(&self) -> &TaskId {
        &self.task_id
    }

    pub fn value(&self) -> FeedbackValue {
        self.value
    }

    pub fn in_flight(&self) -> Option<&FeedbackRequest> {
        self.in_flight.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn view(&self) -> FeedbackView {
        FeedbackView::from_state(self.value, self.in_flight.is_some(), self.notice.as_ref())
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn begin_request(&mut self, request: FeedbackRequest) {
        self.in_flight = Some(request);
        self.dirty = true;
    }

    pub(crate) fn finish_request(&mut self) -> Option<FeedbackRequest> {
        let request = self.in_flight.take();
        if request.is_some() {
            self.dirty = true;
        }
        request
    }

    pub(crate) fn set_value(&mut self, value: FeedbackValue) {
        self.value = value;
        self.dirty = true;
    }

    /// Replaces any pending notice and returns the id that restarts its window.
    pub(crate) fn show_notice(&mut self, notice: Notice) -> u64 {
        self.notice_id += 1;
        self.notice = Some(notice);
        self.dirty = true;
        self.notice_id
    }

    pub(crate) fn expire_notice(&mut self, notice_id: u64) {
        if notice_id == self.notice_id && self.notice.is_some() {
            self.notice = None;
            self.dirty = true;
        }
    }
}
