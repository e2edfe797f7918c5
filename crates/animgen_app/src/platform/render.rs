//! Turns core view models into terminal lines.

use animgen_core::{FeedbackView, GenerationJob, GenerationView, Stage};

const BAR_WIDTH: usize = 20;

pub fn stage_label(stage: Stage) -> &'static str {
    match stage {
        Stage::Idle => "Ready",
        Stage::GeneratingCode => "Generating code",
        Stage::RenderingVideo => "Rendering video",
        Stage::Completed => "Completed",
        Stage::Failed => "Failed",
    }
}

pub fn progress_bar(percent: u8) -> String {
    let percent = usize::from(percent.min(100));
    let filled = percent * BAR_WIDTH / 100;
    format!(
        "[{}{}] {:>3}%",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        percent
    )
}

/// One line per published snapshot; the code block is printed when it first shows up.
pub fn render_transition(previous: Option<&GenerationJob>, job: &GenerationJob) -> Vec<String> {
    let mut lines = Vec::new();
    let stage_changed = previous.is_none_or(|prev| prev.stage() != job.stage());
    if stage_changed && job.stage() != Stage::Idle {
        lines.push(format!("* {}", stage_label(job.stage())));
    }
    let code_appeared = job.code().is_some() && previous.is_none_or(|prev| prev.code().is_none());
    if let Some(code) = job.code().filter(|_| code_appeared) {
        lines.push("Generated code:".to_string());
        lines.extend(code.lines().map(|line| format!("    {line}")));
    }
    lines
}

pub fn render_generation(view: &GenerationView) -> Vec<String> {
    let mut lines = vec![format!(
        "{} {}",
        progress_bar(view.progress_percent),
        stage_label(view.stage)
    )];
    if let Some(status) = view.status_line {
        lines.push(status.to_string());
    }
    if let Some(url) = &view.artifact_url {
        lines.push(format!("Animation: {url}"));
    }
    if let Some(error) = &view.error {
        lines.push(format!("Error: {error}"));
    }
    lines
}

pub fn render_feedback(view: &FeedbackView) -> Vec<String> {
    let mark = |selected: bool| if selected { "x" } else { " " };
    let mut lines = vec![format!(
        "Was this animation helpful? [{}] yes  [{}] no",
        mark(view.positive_selected),
        mark(view.negative_selected)
    )];
    if let Some(ack) = view.acknowledgement {
        lines.push(ack.to_string());
    }
    if let Some(notice) = &view.notice {
        let prefix = if view.notice_is_error { "!" } else { ">" };
        lines.push(format!("{prefix} {notice}"));
    }
    lines
}
