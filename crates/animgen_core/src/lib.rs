//! Animgen core: pure generation and feedback state machines plus view-model helpers.
mod artifact;
mod effect;
mod error;
mod feedback;
mod job;
mod msg;
mod state;
mod status;
mod update;
mod view_model;

pub use artifact::resolve_artifact_url;
pub use effect::{FeedbackEffect, GenerationEffect};
pub use error::{GenerationError, DEFAULT_FAILURE_MESSAGE};
pub use feedback::{FeedbackChoice, FeedbackRequest, FeedbackValue, Notice};
pub use job::{AttemptId, GenerationJob, Stage, TaskId};
pub use msg::{FeedbackMsg, GenerationMsg};
pub use state::{FeedbackState, GenerationState};
pub use status::StatusReport;
pub use update::{update_feedback, update_generation};
pub use view_model::{FeedbackView, GenerationView, FEEDBACK_ACKNOWLEDGEMENT, WAITING_FOR_CODE};
