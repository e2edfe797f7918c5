use std::path::PathBuf;

use clap::Parser;

use super::config::API_BASE_ENV;
use super::logging::LogDestination;

#[derive(Debug, Parser)]
#[command(name = "animgen", version, about = "Generate animations from a text prompt")]
pub struct Args {
    /// Prompt to run once. Without it the shell asks for prompts until an empty line.
    pub prompt: Option<String>,

    /// API origin, e.g. http://localhost:8000.
    #[arg(long, env = API_BASE_ENV)]
    pub api_base: Option<String>,

    /// Settings file (RON).
    #[arg(long, default_value = "animgen.ron")]
    pub config: PathBuf,

    #[arg(long)]
    pub quality: Option<String>,

    #[arg(long)]
    pub resolution: Option<String>,

    /// Skip the helpful / not helpful question after a successful run.
    #[arg(long)]
    pub no_feedback: bool,

    #[arg(long, value_enum, default_value_t = LogDestination::File)]
    pub log: LogDestination,

    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::Args;
    use crate::platform::logging::LogDestination;

    #[test]
    fn parses_one_shot_prompt_and_overrides() {
        let args = Args::try_parse_from([
            "animgen",
            "Draw a circle",
            "--api-base",
            "http://x",
            "--quality",
            "high",
            "--log",
            "both",
        ])
        .unwrap();
        assert_eq!(args.prompt.as_deref(), Some("Draw a circle"));
        assert_eq!(args.api_base.as_deref(), Some("http://x"));
        assert_eq!(args.quality.as_deref(), Some("high"));
        assert_eq!(args.log, LogDestination::Both);
        assert!(!args.no_feedback);
    }
}
