use std::sync::{mpsc, Arc, Mutex, PoisonError};

use animgen_core::{
    update_generation, AttemptId, GenerationEffect, GenerationJob, GenerationMsg,
    GenerationState, GenerationView, Stage, StatusReport, TaskId,
};
use animgen_logging::{anim_debug, anim_info, anim_warn};
use tokio::sync::{oneshot, watch};
use tokio_util::sync::CancellationToken;

use crate::{ApiSettings, GenerationService, ReqwestApi, RequestError, RetryPolicy, SubmitError};

/// Receives every published job snapshot, in transition order.
///
/// Called while the orchestrator state is locked: implementations must be
/// quick and must not call back into the orchestrator.
pub trait JobObserver: Send + Sync {
    fn job_updated(&self, job: &GenerationJob);
}

/// Forwards snapshots over a std channel, for shells with their own event loop.
pub struct ChannelJobObserver {
    tx: mpsc::Sender<GenerationJob>,
}

impl ChannelJobObserver {
    pub fn new(tx: mpsc::Sender<GenerationJob>) -> Self {
        Self { tx }
    }
}

impl JobObserver for ChannelJobObserver {
    fn job_updated(&self, job: &GenerationJob) {
        let _ = self.tx.send(job.clone());
    }
}

/// How one attempt ended, as seen by whoever submitted it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Completed(GenerationJob),
    /// The attempt failed; the job is back in Idle with its failure reason.
    Failed(GenerationJob),
    /// A newer submission replaced this attempt.
    Superseded,
    /// The orchestrator was torn down first.
    Abandoned,
}

/// Returned by [`Orchestrator::submit`]; tracks one attempt.
///
/// The outcome is settled when the attempt ends, so it stays available even
/// if a newer submission replaces the job before the handle is awaited.
#[derive(Debug)]
pub struct JobHandle {
    attempt: AttemptId,
    outcome: oneshot::Receiver<JobOutcome>,
}

impl JobHandle {
    pub fn attempt(&self) -> AttemptId {
        self.attempt
    }

    /// Waits until this attempt reaches a terminal stage or is replaced.
    pub async fn finished(self) -> JobOutcome {
        self.outcome.await.unwrap_or(JobOutcome::Abandoned)
    }
}

/// Outcome carried by a published snapshot, if it ends its attempt.
fn terminal_outcome(job: &GenerationJob) -> Option<JobOutcome> {
    match job.stage() {
        Stage::Completed => Some(JobOutcome::Completed(job.clone())),
        Stage::Idle if job.failure_reason().is_some() => Some(JobOutcome::Failed(job.clone())),
        _ => None,
    }
}

/// Drives generation attempts against a [`GenerationService`].
///
/// Each attempt gets its own poll task and cancellation token. A new
/// submission cancels the previous task, and the core state machine drops any
/// response that still slips through. Must be used inside a tokio runtime.
pub struct Orchestrator {
    inner: Arc<Inner>,
}

struct Inner {
    state: Mutex<GenerationState>,
    updates: watch::Sender<GenerationState>,
    service: Arc<dyn GenerationService>,
    observer: Option<Arc<dyn JobObserver>>,
    settings: ApiSettings,
    active: Mutex<Option<(AttemptId, CancellationToken)>>,
    unsettled: Mutex<Option<(AttemptId, oneshot::Sender<JobOutcome>)>>,
    shutdown: CancellationToken,
}

impl Orchestrator {
    pub fn new(service: Arc<dyn GenerationService>, settings: ApiSettings) -> Self {
        Self::build(service, settings, None)
    }

    pub fn with_observer(
        service: Arc<dyn GenerationService>,
        settings: ApiSettings,
        observer: Arc<dyn JobObserver>,
    ) -> Self {
        Self::build(service, settings, Some(observer))
    }

    /// Builds an orchestrator talking HTTP to `settings.origin`.
    pub fn connect(settings: ApiSettings) -> Result<Self, RequestError> {
        let api = ReqwestApi::new(&settings)?;
        Ok(Self::new(Arc::new(api), settings))
    }

    fn build(
        service: Arc<dyn GenerationService>,
        settings: ApiSettings,
        observer: Option<Arc<dyn JobObserver>>,
    ) -> Self {
        let state = GenerationState::new(settings.origin.clone());
        let (updates, _) = watch::channel(state.clone());
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(state),
                updates,
                service,
                observer,
                settings,
                active: Mutex::new(None),
                unsettled: Mutex::new(None),
                shutdown: CancellationToken::new(),
            }),
        }
    }

    /// Starts a new attempt, superseding any attempt still in progress.
    ///
    /// Network failures are not returned here; they end the job and show up in
    /// its snapshot.
    pub fn submit(&self, prompt: &str) -> Result<JobHandle, SubmitError> {
        if prompt.trim().is_empty() {
            return Err(SubmitError::EmptyPrompt);
        }
        if self.inner.shutdown.is_cancelled() {
            return Err(SubmitError::ShutDown);
        }

        let effects = self
            .inner
            .dispatch(GenerationMsg::PromptSubmitted(prompt.to_string()));
        let mut handle = None;
        for effect in effects {
            match effect {
                GenerationEffect::CancelAttempt { attempt } => self.inner.cancel(attempt),
                GenerationEffect::CreateJob { attempt, prompt } => {
                    let outcome = self.inner.expect_outcome(attempt);
                    let token = self.inner.register(attempt);
                    let inner = self.inner.clone();
                    tokio::spawn(async move {
                        drive_attempt(inner, attempt, prompt, token).await;
                    });
                    handle = Some(JobHandle { attempt, outcome });
                }
                GenerationEffect::JobUpdated(_) | GenerationEffect::SchedulePoll { .. } => {}
            }
        }
        handle.ok_or(SubmitError::ShutDown)
    }

    /// Current job snapshot.
    pub fn job(&self) -> GenerationJob {
        self.inner.lock_state().job().clone()
    }

    pub fn view(&self) -> GenerationView {
        self.inner.lock_state().view()
    }

    pub fn subscribe(&self) -> watch::Receiver<GenerationState> {
        self.inner.updates.subscribe()
    }

    /// Stops the active poll loop; later responses and submissions are ignored.
    pub fn shutdown(&self) {
        if self.inner.shutdown.is_cancelled() {
            return;
        }
        for effect in self.inner.dispatch(GenerationMsg::TornDown) {
            if let GenerationEffect::CancelAttempt { attempt } = effect {
                self.inner.cancel(attempt);
            }
        }
        self.inner.shutdown.cancel();
        self.inner.settle_pending(JobOutcome::Abandoned);
        anim_info!("Orchestrator shut down");
    }
}

impl Drop for Orchestrator {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl Inner {
    fn lock_state(&self) -> std::sync::MutexGuard<'_, GenerationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies `msg`, publishes snapshots, and returns the effects left to execute.
    fn dispatch(&self, msg: GenerationMsg) -> Vec<GenerationEffect> {
        let mut guard = self.lock_state();
        let (mut next, effects) = update_generation(guard.clone(), msg);
        let changed = next.consume_dirty();
        *guard = next;

        let mut pending = Vec::with_capacity(effects.len());
        for effect in effects {
            match effect {
                GenerationEffect::JobUpdated(job) => {
                    anim_debug!("Attempt {} -> {:?}", job.attempt(), job.stage());
                    if let Some(observer) = &self.observer {
                        observer.job_updated(&job);
                    }
                    if let Some(outcome) = terminal_outcome(&job) {
                        self.settle(job.attempt(), outcome);
                    }
                }
                other => pending.push(other),
            }
        }
        if changed || guard.is_torn_down() {
            self.updates.send_replace(guard.clone());
        }
        pending
    }

    /// Opens the outcome slot for `attempt`; an attempt still waiting on the
    /// slot is superseded.
    fn expect_outcome(&self, attempt: AttemptId) -> oneshot::Receiver<JobOutcome> {
        let (tx, rx) = oneshot::channel();
        let mut unsettled = self.unsettled.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some((_, previous)) = unsettled.replace((attempt, tx)) {
            let _ = previous.send(JobOutcome::Superseded);
        }
        rx
    }

    fn settle(&self, attempt: AttemptId, outcome: JobOutcome) {
        let mut unsettled = self.unsettled.lock().unwrap_or_else(PoisonError::into_inner);
        if matches!(unsettled.as_ref(), Some((current, _)) if *current == attempt) {
            if let Some((_, tx)) = unsettled.take() {
                let _ = tx.send(outcome);
            }
        }
    }

    fn settle_pending(&self, outcome: JobOutcome) {
        let pending = self
            .unsettled
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some((_, tx)) = pending {
            let _ = tx.send(outcome);
        }
    }

    fn register(&self, attempt: AttemptId) -> CancellationToken {
        let token = self.shutdown.child_token();
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some((previous, previous_token)) = active.replace((attempt, token.clone())) {
            anim_debug!("Cancelling attempt {} on register of {}", previous, attempt);
            previous_token.cancel();
        }
        token
    }

    fn cancel(&self, attempt: AttemptId) {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if matches!(active.as_ref(), Some((current, _)) if *current == attempt) {
            if let Some((_, token)) = active.take() {
                token.cancel();
            }
        }
    }

    fn release(&self, attempt: AttemptId) {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if matches!(active.as_ref(), Some((current, _)) if *current == attempt) {
            active.take();
        }
    }
}

async fn drive_attempt(
    inner: Arc<Inner>,
    attempt: AttemptId,
    prompt: String,
    cancel: CancellationToken,
) {
    let created = tokio::select! {
        biased;
        _ = cancel.cancelled() => return,
        result = inner.service.create_job(&prompt, &inner.settings.options) => result,
    };
    let msg = match created {
        Ok(created) => GenerationMsg::JobCreated {
            attempt,
            task_id: created.task_id,
            code: created.code,
        },
        Err(err) => GenerationMsg::SubmissionFailed {
            attempt,
            message: err.to_string(),
        },
    };
    let mut effects = inner.dispatch(msg);

    // One poll in flight at a time; the delay starts when the previous response lands.
    while let Some(task_id) = next_poll(&effects, attempt) {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(inner.settings.poll_interval) => {}
        }
        let polled = tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            result = poll_status(inner.service.as_ref(), &task_id, inner.settings.retry) => result,
        };
        let msg = match polled {
            Ok(report) => GenerationMsg::StatusReceived {
                attempt,
                task_id,
                report,
            },
            Err(err) => GenerationMsg::PollFailed {
                attempt,
                task_id,
                message: err.to_string(),
            },
        };
        effects = inner.dispatch(msg);
    }

    inner.release(attempt);
    anim_debug!("Poll loop for attempt {} finished", attempt);
}

fn next_poll(effects: &[GenerationEffect], attempt: AttemptId) -> Option<TaskId> {
    effects.iter().find_map(|effect| match effect {
        GenerationEffect::SchedulePoll {
            attempt: scheduled,
            task_id,
        } if *scheduled == attempt => Some(task_id.clone()),
        _ => None,
    })
}

async fn poll_status(
    service: &dyn GenerationService,
    task_id: &TaskId,
    policy: RetryPolicy,
) -> Result<StatusReport, RequestError> {
    let mut retry = 0;
    loop {
        match service.fetch_status(task_id).await {
            Ok(report) => return Ok(report),
            Err(err) if err.is_transient() => match policy.backoff(retry) {
                Some(delay) => {
                    anim_warn!(
                        "Poll for {} failed ({}); retry {} in {:?}",
                        task_id,
                        err,
                        retry + 1,
                        delay
                    );
                    retry += 1;
                    tokio::time::sleep(delay).await;
                }
                None => return Err(err),
            },
            Err(err) => return Err(err),
        }
    }
}
