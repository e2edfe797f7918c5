use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use animgen_core::{
    update_feedback, FeedbackChoice, FeedbackEffect, FeedbackMsg, FeedbackRequest, FeedbackState,
    FeedbackValue, FeedbackView, Notice, TaskId,
};
use animgen_logging::anim_debug;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::FeedbackStore;

/// Callback told about every settled value change, retractions included.
pub type FeedbackObserver = Arc<dyn Fn(FeedbackValue) + Send + Sync>;

/// Owns the feedback value for one job while its control pair is mounted.
///
/// Dropping the controller (or calling [`FeedbackController::unmount`]) stops
/// pending notice timers and silences the observer.
pub struct FeedbackController {
    inner: Arc<Inner>,
}

struct Inner {
    state: Mutex<FeedbackState>,
    updates: watch::Sender<FeedbackView>,
    store: Arc<dyn FeedbackStore>,
    observer: Mutex<Option<FeedbackObserver>>,
    notice_window: Duration,
    unmounted: CancellationToken,
}

impl FeedbackController {
    pub fn mount(task_id: TaskId, store: Arc<dyn FeedbackStore>, notice_window: Duration) -> Self {
        let state = FeedbackState::new(task_id);
        let (updates, _) = watch::channel(state.view());
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(state),
                updates,
                store,
                observer: Mutex::new(None),
                notice_window,
                unmounted: CancellationToken::new(),
            }),
        }
    }

    pub fn with_observer(self, observer: FeedbackObserver) -> Self {
        *self
            .inner
            .observer
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(observer);
        self
    }

    /// Sets, switches or retracts the stored preference.
    ///
    /// A toggle made while another request is in flight is dropped. Store
    /// failures leave the value unchanged and only surface as a notice. The
    /// request settles even if this future is dropped before it resolves.
    pub async fn toggle(&self, choice: FeedbackChoice) {
        if self.inner.unmounted.is_cancelled() {
            anim_debug!("Ignoring toggle on unmounted feedback control");
            return;
        }
        let mut requests = Vec::new();
        for effect in self.inner.dispatch(FeedbackMsg::Toggled(choice)) {
            if let Some(request) = self.inner.run_effect(effect) {
                requests.push(request);
            }
        }
        for request in requests {
            let _ = request.await;
        }
    }

    pub fn task_id(&self) -> TaskId {
        self.inner.lock_state().task_id().clone()
    }

    pub fn value(&self) -> FeedbackValue {
        self.inner.lock_state().value()
    }

    pub fn notice(&self) -> Option<Notice> {
        self.inner.lock_state().notice().cloned()
    }

    pub fn view(&self) -> FeedbackView {
        self.inner.lock_state().view()
    }

    /// Receives a fresh view whenever the value, the in-flight flag or the
    /// notice changes.
    pub fn subscribe(&self) -> watch::Receiver<FeedbackView> {
        self.inner.updates.subscribe()
    }

    pub fn unmount(&self) {
        self.inner.unmounted.cancel();
    }
}

impl Drop for FeedbackController {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl Inner {
    fn lock_state(&self) -> MutexGuard<'_, FeedbackState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn dispatch(&self, msg: FeedbackMsg) -> Vec<FeedbackEffect> {
        let mut guard = self.lock_state();
        let (mut next, effects) = update_feedback(guard.clone(), msg);
        let changed = next.consume_dirty();
        *guard = next;
        if changed {
            self.updates.send_replace(guard.view());
        }
        effects
    }

    /// Executes one effect. Store requests run on their own task and are
    /// returned so the caller may wait for them.
    fn run_effect(self: &Arc<Self>, effect: FeedbackEffect) -> Option<JoinHandle<()>> {
        match effect {
            FeedbackEffect::SendFeedback(request) => return Some(self.spawn_request(request)),
            FeedbackEffect::ShowNotice { notice_id, .. } => self.schedule_notice_expiry(notice_id),
            FeedbackEffect::NotifyObserver(value) => self.notify(value),
        }
        None
    }

    fn spawn_request(self: &Arc<Self>, request: FeedbackRequest) -> JoinHandle<()> {
        let inner = self.clone();
        tokio::spawn(async move {
            let msg = match inner.store.send_feedback(&request).await {
                Ok(()) => FeedbackMsg::RequestSucceeded,
                Err(err) => FeedbackMsg::RequestFailed {
                    message: err.message,
                },
            };
            for effect in inner.dispatch(msg) {
                // Settlements never issue another request.
                let _ = inner.run_effect(effect);
            }
        })
    }

    fn notify(&self, value: FeedbackValue) {
        if self.unmounted.is_cancelled() {
            anim_debug!("Not reporting {:?} to observer of unmounted control", value);
            return;
        }
        let observer = self
            .observer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(observer) = observer {
            observer(value);
        }
    }

    fn schedule_notice_expiry(self: &Arc<Self>, notice_id: u64) {
        if self.unmounted.is_cancelled() {
            return;
        }
        let inner = self.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = inner.unmounted.cancelled() => {}
                _ = tokio::time::sleep(inner.notice_window) => {
                    inner.dispatch(FeedbackMsg::NoticeExpired { notice_id });
                }
            }
        });
    }
}
