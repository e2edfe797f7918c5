use std::sync::Once;

use animgen_core::{
    update_generation, GenerationEffect, GenerationJob, GenerationMsg, GenerationState, Stage,
    StatusReport, TaskId, DEFAULT_FAILURE_MESSAGE, WAITING_FOR_CODE,
};
use pretty_assertions::assert_eq;
use url::Url;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(animgen_logging::initialize_for_tests);
}

fn new_state(origin: &str) -> GenerationState {
    GenerationState::new(Url::parse(origin).unwrap())
}

fn published(effects: &[GenerationEffect]) -> Vec<GenerationJob> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            GenerationEffect::JobUpdated(job) => Some(job.clone()),
            _ => None,
        })
        .collect()
}

fn stages(effects: &[GenerationEffect]) -> Vec<Stage> {
    published(effects).iter().map(GenerationJob::stage).collect()
}

fn status(attempt: u64, task: &str, report: StatusReport) -> GenerationMsg {
    GenerationMsg::StatusReceived {
        attempt,
        task_id: TaskId::from(task),
        report,
    }
}

fn pending() -> StatusReport {
    StatusReport::Pending { code: None }
}

/// Submits a prompt and answers the creation request with `task`.
fn submit_and_create(state: GenerationState, prompt: &str, task: &str) -> (GenerationState, u64) {
    let (state, effects) = update_generation(state, GenerationMsg::PromptSubmitted(prompt.into()));
    let attempt = effects
        .iter()
        .find_map(|effect| match effect {
            GenerationEffect::CreateJob { attempt, .. } => Some(*attempt),
            _ => None,
        })
        .expect("create effect");
    let (state, _) = update_generation(
        state,
        GenerationMsg::JobCreated {
            attempt,
            task_id: TaskId::from(task),
            code: None,
        },
    );
    (state, attempt)
}

#[test]
fn circle_to_square_walks_through_all_stages() {
    init_logging();
    let mut all_effects = Vec::new();

    let (state, effects) = update_generation(
        new_state("http://x"),
        GenerationMsg::PromptSubmitted("Draw a circle that turns into a square".into()),
    );
    assert_eq!(state.job().stage(), Stage::GeneratingCode);
    assert_eq!(
        effects.last(),
        Some(&GenerationEffect::CreateJob {
            attempt: 1,
            prompt: "Draw a circle that turns into a square".into(),
        })
    );
    all_effects.extend(effects);

    let (state, effects) = update_generation(
        state,
        GenerationMsg::JobCreated {
            attempt: 1,
            task_id: TaskId::from("t1"),
            code: None,
        },
    );
    assert_eq!(
        effects.last(),
        Some(&GenerationEffect::SchedulePoll {
            attempt: 1,
            task_id: TaskId::from("t1"),
        })
    );
    all_effects.extend(effects);

    let (state, effects) = update_generation(state, status(1, "t1", pending()));
    assert_eq!(state.job().stage(), Stage::GeneratingCode);
    assert!(matches!(effects.as_slice(), [GenerationEffect::SchedulePoll { .. }]));
    all_effects.extend(effects);

    let (state, effects) = update_generation(
        state,
        status(1, "t1", StatusReport::Pending { code: Some("...".into()) }),
    );
    assert_eq!(state.job().stage(), Stage::RenderingVideo);
    assert_eq!(state.job().code(), Some("..."));
    all_effects.extend(effects);

    let (state, effects) = update_generation(
        state,
        status(
            1,
            "t1",
            StatusReport::Completed {
                code: Some("...".into()),
                video_url: "/static/a.mp4".into(),
            },
        ),
    );
    assert!(!effects
        .iter()
        .any(|effect| matches!(effect, GenerationEffect::SchedulePoll { .. })));
    all_effects.extend(effects);

    let job = state.job();
    assert_eq!(job.stage(), Stage::Completed);
    assert_eq!(job.artifact_url(), Some("http://x/static/a.mp4"));
    assert_eq!(job.failure_reason(), None);

    let mut sequence = stages(&all_effects);
    sequence.dedup();
    assert_eq!(
        sequence,
        vec![Stage::GeneratingCode, Stage::RenderingVideo, Stage::Completed]
    );
}

#[test]
fn absolute_video_url_is_used_verbatim() {
    init_logging();
    let (state, attempt) = submit_and_create(new_state("http://localhost:8000"), "a dot", "t9");
    let (state, _) = update_generation(
        state,
        status(
            attempt,
            "t9",
            StatusReport::Completed {
                code: None,
                video_url: "https://cdn.example.com/t9/animation.mp4".into(),
            },
        ),
    );
    assert_eq!(
        state.job().artifact_url(),
        Some("https://cdn.example.com/t9/animation.mp4")
    );
}

#[test]
fn failed_status_records_failure_then_returns_to_idle() {
    init_logging();
    let (state, attempt) = submit_and_create(new_state("http://x"), "a dot", "t1");
    let (state, effects) = update_generation(
        state,
        status(
            attempt,
            "t1",
            StatusReport::Failed {
                code: None,
                error: Some("Manim error: NameError".into()),
            },
        ),
    );

    assert_eq!(stages(&effects), vec![Stage::Failed, Stage::Idle]);
    let failed = &published(&effects)[0];
    assert_eq!(failed.failure_reason(), Some("Manim error: NameError"));
    assert_eq!(failed.artifact_url(), None);

    assert_eq!(state.job().stage(), Stage::Idle);
    let view = state.view();
    assert!(!view.busy);
    assert_eq!(view.error.as_deref(), Some("Manim error: NameError"));
}

#[test]
fn failed_status_without_reason_uses_generic_message() {
    init_logging();
    let (state, attempt) = submit_and_create(new_state("http://x"), "a dot", "t1");
    let (state, _) = update_generation(
        state,
        status(attempt, "t1", StatusReport::Failed { code: None, error: None }),
    );
    assert_eq!(state.job().failure_reason(), Some(DEFAULT_FAILURE_MESSAGE));
    assert_eq!(state.view().error.as_deref(), Some(DEFAULT_FAILURE_MESSAGE));
}

#[test]
fn submission_and_poll_failures_surface_like_job_failures() {
    init_logging();
    let (state, effects) =
        update_generation(new_state("http://x"), GenerationMsg::PromptSubmitted("p".into()));
    assert_eq!(effects.len(), 2);
    let (state, effects) = update_generation(
        state,
        GenerationMsg::SubmissionFailed {
            attempt: 1,
            message: "http status 500".into(),
        },
    );
    assert_eq!(stages(&effects), vec![Stage::Failed, Stage::Idle]);
    assert_eq!(
        state.view().error.as_deref(),
        Some("Failed to start generation: http status 500")
    );

    let (state, attempt) = submit_and_create(state, "again", "t2");
    assert_eq!(attempt, 2);
    assert_eq!(state.view().error, None);
    let (state, effects) = update_generation(
        state,
        GenerationMsg::PollFailed {
            attempt,
            task_id: TaskId::from("t2"),
            message: "network error".into(),
        },
    );
    assert_eq!(stages(&effects), vec![Stage::Failed, Stage::Idle]);
    assert_eq!(
        state.job().failure_reason(),
        Some("Failed to get generation status: network error")
    );
}

#[test]
fn blank_prompt_is_ignored() {
    init_logging();
    let state = new_state("http://x");
    let (mut next, effects) =
        update_generation(state.clone(), GenerationMsg::PromptSubmitted("  \n\t ".into()));
    assert!(effects.is_empty());
    assert!(!next.consume_dirty());
    assert_eq!(next, state);
}

#[test]
fn creation_code_advances_to_rendering() {
    init_logging();
    let (state, _) =
        update_generation(new_state("http://x"), GenerationMsg::PromptSubmitted("p".into()));
    let (state, effects) = update_generation(
        state,
        GenerationMsg::JobCreated {
            attempt: 1,
            task_id: TaskId::from("t1"),
            code: Some("class A(Scene): pass".into()),
        },
    );
    assert_eq!(stages(&effects), vec![Stage::GeneratingCode, Stage::RenderingVideo]);
    assert_eq!(state.job().code(), Some("class A(Scene): pass"));
}

#[test]
fn code_is_set_once_per_job() {
    init_logging();
    let (state, attempt) = submit_and_create(new_state("http://x"), "p", "t1");
    let (state, _) = update_generation(
        state,
        status(attempt, "t1", StatusReport::Pending { code: Some("first".into()) }),
    );
    let (state, effects) = update_generation(
        state,
        status(attempt, "t1", StatusReport::Pending { code: Some("second".into()) }),
    );
    assert_eq!(state.job().code(), Some("first"));
    assert!(published(&effects).is_empty());
}

#[test]
fn superseded_attempt_cannot_mutate_new_job() {
    init_logging();
    let (state, first) = submit_and_create(new_state("http://x"), "first", "old");
    let (state, effects) =
        update_generation(state, GenerationMsg::PromptSubmitted("second".into()));
    assert_eq!(effects[0], GenerationEffect::CancelAttempt { attempt: first });
    let snapshot = state.clone();

    let late = [
        status(
            first,
            "old",
            StatusReport::Completed {
                code: Some("old code".into()),
                video_url: "/videos/old.mp4".into(),
            },
        ),
        GenerationMsg::PollFailed {
            attempt: first,
            task_id: TaskId::from("old"),
            message: "boom".into(),
        },
        GenerationMsg::JobCreated {
            attempt: first,
            task_id: TaskId::from("old"),
            code: None,
        },
    ];
    let mut state = state;
    for msg in late {
        let (next, effects) = update_generation(state, msg);
        assert!(effects.is_empty());
        state = next;
    }
    assert_eq!(state, snapshot);
    assert_eq!(state.job().prompt(), "second");
    assert_eq!(state.job().stage(), Stage::GeneratingCode);
    assert_eq!(state.job().code(), None);
}

#[test]
fn status_for_other_task_is_dropped() {
    init_logging();
    let (state, attempt) = submit_and_create(new_state("http://x"), "p", "t1");
    let (state, effects) = update_generation(
        state,
        status(
            attempt,
            "someone-else",
            StatusReport::Completed {
                code: None,
                video_url: "/x.mp4".into(),
            },
        ),
    );
    assert!(effects.is_empty());
    assert_eq!(state.job().stage(), Stage::GeneratingCode);
}

#[test]
fn resubmitting_after_completion_starts_a_fresh_job() {
    init_logging();
    let (state, attempt) = submit_and_create(new_state("http://x"), "p", "t1");
    let (state, _) = update_generation(
        state,
        status(
            attempt,
            "t1",
            StatusReport::Completed {
                code: Some("c".into()),
                video_url: "/a.mp4".into(),
            },
        ),
    );
    let (state, effects) = update_generation(state, GenerationMsg::PromptSubmitted("q".into()));
    assert!(!effects
        .iter()
        .any(|effect| matches!(effect, GenerationEffect::CancelAttempt { .. })));
    let job = state.job();
    assert_eq!(job.attempt(), 2);
    assert_eq!(job.task_id(), None);
    assert_eq!(job.code(), None);
    assert_eq!(job.artifact_url(), None);
    assert_eq!(job.failure_reason(), None);
}

#[test]
fn teardown_cancels_and_ignores_later_messages() {
    init_logging();
    let (state, attempt) = submit_and_create(new_state("http://x"), "p", "t1");
    let (state, effects) = update_generation(state, GenerationMsg::TornDown);
    assert_eq!(effects, vec![GenerationEffect::CancelAttempt { attempt }]);
    assert!(state.is_torn_down());

    let snapshot = state.clone();
    let (state, effects) = update_generation(
        state,
        status(attempt, "t1", StatusReport::Pending { code: Some("c".into()) }),
    );
    assert!(effects.is_empty());
    let (state, effects) = update_generation(state, GenerationMsg::PromptSubmitted("x".into()));
    assert!(effects.is_empty());
    assert_eq!(state, snapshot);
}

#[test]
fn view_tracks_progress_and_waiting_line() {
    init_logging();
    let state = new_state("http://x");
    let view = state.view();
    assert_eq!(view.stage, Stage::Idle);
    assert!(!view.busy);
    assert_eq!(view.progress_percent, 0);

    let (state, attempt) = submit_and_create(state, "p", "t1");
    let view = state.view();
    assert!(view.busy);
    assert_eq!(view.status_line, Some(WAITING_FOR_CODE));

    let (state, _) = update_generation(
        state,
        status(attempt, "t1", StatusReport::Pending { code: Some("c".into()) }),
    );
    let view = state.view();
    assert_eq!(view.stage, Stage::RenderingVideo);
    assert_eq!(view.status_line, None);
    assert_eq!(view.code.as_deref(), Some("c"));
    assert!(view.progress_percent > 25 && view.progress_percent < 100);

    let (state, _) = update_generation(
        state,
        status(
            attempt,
            "t1",
            StatusReport::Completed {
                code: None,
                video_url: "/a.mp4".into(),
            },
        ),
    );
    let view = state.view();
    assert_eq!(view.progress_percent, 100);
    assert!(!view.busy);
    assert_eq!(view.artifact_url.as_deref(), Some("http://x/a.mp4"));
}
