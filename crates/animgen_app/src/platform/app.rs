use std::io::{self, BufRead, Write};
use std::sync::{mpsc, Arc};
use std::time::Duration;

use animgen_client::{
    ApiSettings, ChannelJobObserver, FeedbackController, JobOutcome, Orchestrator, ReqwestApi,
};
use animgen_core::{FeedbackChoice, GenerationJob, TaskId};
use animgen_logging::{anim_info, anim_warn};
use anyhow::Context;
use clap::Parser;
use tokio::runtime::Runtime;

use super::cli::Args;
use super::config::{build_settings, load_config, resolve_origin};
use super::{logging, render};

const DRAIN_INTERVAL: Duration = Duration::from_millis(50);

pub fn run_app() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::initialize(args.log, args.verbose);

    let config = load_config(&args.config);
    let origin = resolve_origin(args.api_base.as_deref(), config.api_base.as_deref())?;
    let mut settings = build_settings(&config, origin);
    if let Some(quality) = &args.quality {
        settings.options.quality = quality.clone();
    }
    if let Some(resolution) = &args.resolution {
        settings.options.resolution = resolution.clone();
    }
    anim_info!(
        "Using API origin {} ({} / {})",
        settings.origin,
        settings.options.quality,
        settings.options.resolution
    );

    let runtime = Runtime::new().context("failed to start async runtime")?;
    let shell = Shell::new(&runtime, settings, !args.no_feedback)?;

    match args.prompt {
        Some(prompt) => shell.run_once(&prompt),
        None => shell.run_interactive(),
    }
}

/// Terminal presentation of one orchestrator session.
struct Shell<'rt> {
    runtime: &'rt Runtime,
    api: Arc<ReqwestApi>,
    orchestrator: Orchestrator,
    updates: mpsc::Receiver<GenerationJob>,
    settings: ApiSettings,
    ask_feedback: bool,
}

impl<'rt> Shell<'rt> {
    fn new(runtime: &'rt Runtime, settings: ApiSettings, ask_feedback: bool) -> anyhow::Result<Self> {
        let api = Arc::new(ReqwestApi::new(&settings).context("failed to build HTTP client")?);
        let (tx, updates) = mpsc::channel();
        let orchestrator = Orchestrator::with_observer(
            api.clone(),
            settings.clone(),
            Arc::new(ChannelJobObserver::new(tx)),
        );
        Ok(Self {
            runtime,
            api,
            orchestrator,
            updates,
            settings,
            ask_feedback,
        })
    }

    fn run_once(&self, prompt: &str) -> anyhow::Result<()> {
        if let Some(task_id) = self.generate(prompt)? {
            self.collect_feedback(task_id)?;
        }
        Ok(())
    }

    fn run_interactive(&self) -> anyhow::Result<()> {
        loop {
            let Some(prompt) =
                read_line("Describe the animation you want to create (empty to quit): ")?
            else {
                return Ok(());
            };
            if prompt.trim().is_empty() {
                return Ok(());
            }
            self.run_once(&prompt)?;
        }
    }

    /// Runs one attempt to the end. Returns the task id when it completed.
    fn generate(&self, prompt: &str) -> anyhow::Result<Option<TaskId>> {
        let (outcome, previous) = self.runtime.block_on(async {
            let finished = self.orchestrator.submit(prompt)?.finished();
            tokio::pin!(finished);
            let mut previous = None;
            loop {
                tokio::select! {
                    outcome = &mut finished => break anyhow::Ok((outcome, previous)),
                    _ = tokio::time::sleep(DRAIN_INTERVAL) => {
                        previous = self.drain_updates(previous.take());
                    }
                }
            }
        })?;
        self.drain_updates(previous);

        for line in render::render_generation(&self.orchestrator.view()) {
            println!("{line}");
        }
        match outcome {
            JobOutcome::Completed(job) => Ok(job.task_id().cloned()),
            JobOutcome::Failed(job) => {
                anim_warn!("Attempt {} failed", job.attempt());
                Ok(None)
            }
            JobOutcome::Superseded | JobOutcome::Abandoned => Ok(None),
        }
    }

    /// Prints every queued snapshot, returning the last one for diffing.
    fn drain_updates(&self, mut previous: Option<GenerationJob>) -> Option<GenerationJob> {
        while let Ok(job) = self.updates.try_recv() {
            for line in render::render_transition(previous.as_ref(), &job) {
                println!("{line}");
            }
            previous = Some(job);
        }
        previous
    }

    fn collect_feedback(&self, task_id: TaskId) -> anyhow::Result<()> {
        if !self.ask_feedback {
            return Ok(());
        }
        let controller =
            FeedbackController::mount(task_id, self.api.clone(), self.settings.notice_window);

        loop {
            for line in render::render_feedback(&controller.view()) {
                println!("{line}");
            }
            let Some(answer) = read_line("[y]es / [n]o / Enter to continue: ")? else {
                break;
            };
            let choice = match answer.trim().to_ascii_lowercase().as_str() {
                "" => break,
                "y" | "yes" => FeedbackChoice::Positive,
                "n" | "no" => FeedbackChoice::Negative,
                other => {
                    println!("Unknown answer {other:?}");
                    continue;
                }
            };
            self.runtime.block_on(controller.toggle(choice));
        }
        controller.unmount();
        Ok(())
    }
}

/// Returns `None` on end of input.
fn read_line(prompt: &str) -> anyhow::Result<Option<String>> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut line = String::new();
    let read = io::stdin().lock().read_line(&mut line)?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}
