use animgen_logging::{anim_debug, anim_info, anim_warn};

use crate::{
    resolve_artifact_url, AttemptId, FeedbackEffect, FeedbackMsg, FeedbackRequest, FeedbackState,
    FeedbackValue, GenerationEffect, GenerationError, GenerationJob, GenerationMsg,
    GenerationState, Notice, StatusReport, TaskId,
};

/// Pure update function for the generation orchestrator.
///
/// Responses are tagged with the attempt (and task id) they were issued for;
/// anything that does not match the current busy attempt is dropped, so a
/// superseded poll loop can never overwrite the newer job.
pub fn update_generation(
    mut state: GenerationState,
    msg: GenerationMsg,
) -> (GenerationState, Vec<GenerationEffect>) {
    if state.is_torn_down() {
        anim_debug!("Ignoring {:?} after teardown", msg);
        return (state, Vec::new());
    }

    let effects = match msg {
        GenerationMsg::PromptSubmitted(prompt) => {
            if prompt.trim().is_empty() {
                anim_warn!("Rejecting empty prompt");
                return (state, Vec::new());
            }

            let mut effects = Vec::with_capacity(3);
            let previous = state.job();
            if previous.stage().is_busy() {
                anim_info!(
                    "Attempt {} superseded while {:?}",
                    previous.attempt(),
                    previous.stage()
                );
                effects.push(GenerationEffect::CancelAttempt {
                    attempt: previous.attempt(),
                });
            }

            let attempt = state.next_attempt();
            let job = GenerationJob::submitted(attempt, prompt.clone());
            anim_info!("Attempt {} submitted (prompt_len={})", attempt, prompt.len());
            state.set_error(None);
            state.replace_job(job.clone());
            effects.push(GenerationEffect::JobUpdated(job));
            effects.push(GenerationEffect::CreateJob { attempt, prompt });
            effects
        }
        GenerationMsg::JobCreated {
            attempt,
            task_id,
            code,
        } => {
            let current = state.job();
            if !is_current(current, attempt) || current.task_id().is_some() {
                anim_debug!("Dropping stale creation response for attempt {}", attempt);
                return (state, Vec::new());
            }

            anim_info!("Attempt {} created task {}", attempt, task_id);
            let job = current.with_task_id(task_id.clone());
            state.replace_job(job.clone());
            let mut effects = vec![GenerationEffect::JobUpdated(job)];
            if let Some(code) = code.as_deref() {
                apply_first_code(&mut state, code, &mut effects);
            }
            effects.push(GenerationEffect::SchedulePoll { attempt, task_id });
            effects
        }
        GenerationMsg::SubmissionFailed { attempt, message } => {
            if !is_current(state.job(), attempt) || state.job().task_id().is_some() {
                anim_debug!("Dropping stale submission failure for attempt {}", attempt);
                return (state, Vec::new());
            }
            fail(&mut state, GenerationError::Submission(message))
        }
        GenerationMsg::StatusReceived {
            attempt,
            task_id,
            report,
        } => {
            if !is_current_task(state.job(), attempt, &task_id) {
                anim_debug!(
                    "Dropping stale status for attempt {} task {}",
                    attempt,
                    task_id
                );
                return (state, Vec::new());
            }
            apply_status(&mut state, attempt, task_id, report)
        }
        GenerationMsg::PollFailed {
            attempt,
            task_id,
            message,
        } => {
            if !is_current_task(state.job(), attempt, &task_id) {
                anim_debug!("Dropping stale poll failure for attempt {}", attempt);
                return (state, Vec::new());
            }
            fail(&mut state, GenerationError::Poll(message))
        }
        GenerationMsg::TornDown => {
            state.tear_down();
            let job = state.job();
            if job.stage().is_busy() {
                anim_info!("Torn down while attempt {} was active", job.attempt());
                vec![GenerationEffect::CancelAttempt {
                    attempt: job.attempt(),
                }]
            } else {
                Vec::new()
            }
        }
    };

    (state, effects)
}

fn is_current(job: &GenerationJob, attempt: AttemptId) -> bool {
    job.attempt() == attempt && job.stage().is_busy()
}

fn is_current_task(job: &GenerationJob, attempt: AttemptId, task_id: &TaskId) -> bool {
    is_current(job, attempt) && job.task_id() == Some(task_id)
}

fn apply_first_code(state: &mut GenerationState, code: &str, effects: &mut Vec<GenerationEffect>) {
    if let Some(job) = state.job().with_first_code(code) {
        anim_info!(
            "Attempt {} received code ({} bytes), rendering",
            job.attempt(),
            code.len()
        );
        state.replace_job(job.clone());
        effects.push(GenerationEffect::JobUpdated(job));
    }
}

fn apply_status(
    state: &mut GenerationState,
    attempt: AttemptId,
    task_id: TaskId,
    report: StatusReport,
) -> Vec<GenerationEffect> {
    let mut effects = Vec::new();
    if let Some(code) = report.code() {
        apply_first_code(state, code, &mut effects);
    }

    match report {
        StatusReport::Pending { .. } => {
            effects.push(GenerationEffect::SchedulePoll { attempt, task_id });
        }
        StatusReport::Completed { video_url, .. } => {
            let artifact_url = resolve_artifact_url(state.origin(), &video_url);
            anim_info!("Attempt {} completed: {}", attempt, artifact_url);
            let job = state.job().completed(artifact_url);
            state.replace_job(job.clone());
            effects.push(GenerationEffect::JobUpdated(job));
        }
        StatusReport::Failed { error, .. } => {
            effects.extend(fail(state, GenerationError::JobFailed(error)));
        }
    }
    effects
}

/// Records the terminal failure, then returns the job to Idle so the shell is
/// ready for another submission. Both snapshots are published.
fn fail(state: &mut GenerationState, error: GenerationError) -> Vec<GenerationEffect> {
    let message = error.user_message();
    anim_warn!("Attempt {} failed: {}", state.job().attempt(), message);

    let failed = state.job().failed(message);
    let idle = failed.reset_to_idle();
    state.set_error(Some(error));
    state.replace_job(idle.clone());
    vec![
        GenerationEffect::JobUpdated(failed),
        GenerationEffect::JobUpdated(idle),
    ]
}

/// Pure update function for the feedback toggle controller.
///
/// At most one request is in flight; toggles arriving meanwhile are dropped.
pub fn update_feedback(
    mut state: FeedbackState,
    msg: FeedbackMsg,
) -> (FeedbackState, Vec<FeedbackEffect>) {
    let effects = match msg {
        FeedbackMsg::Toggled(choice) => {
            if state.in_flight().is_some() {
                anim_debug!("Dropping {:?} toggle while a request is in flight", choice);
                return (state, Vec::new());
            }
            let request = FeedbackRequest {
                task_id: state.task_id().clone(),
                choice,
                remove: state.value() == FeedbackValue::from(choice),
            };
            anim_info!(
                "Feedback for task {}: {:?} (remove={})",
                request.task_id,
                choice,
                request.remove
            );
            state.begin_request(request.clone());
            vec![FeedbackEffect::SendFeedback(request)]
        }
        FeedbackMsg::RequestSucceeded => {
            let Some(request) = state.finish_request() else {
                return (state, Vec::new());
            };
            let value = request.resulting_value();
            state.set_value(value);
            let notice = if request.remove {
                Notice::Removed
            } else {
                Notice::Submitted
            };
            let notice_id = state.show_notice(notice.clone());
            vec![
                FeedbackEffect::ShowNotice { notice_id, notice },
                FeedbackEffect::NotifyObserver(value),
            ]
        }
        FeedbackMsg::RequestFailed { message } => {
            if state.finish_request().is_none() {
                return (state, Vec::new());
            }
            anim_warn!("Feedback for task {} failed: {}", state.task_id(), message);
            let notice = Notice::Error(message);
            let notice_id = state.show_notice(notice.clone());
            vec![FeedbackEffect::ShowNotice { notice_id, notice }]
        }
        FeedbackMsg::NoticeExpired { notice_id } => {
            state.expire_notice(notice_id);
            Vec::new()
        }
    };

    (state, effects)
}
