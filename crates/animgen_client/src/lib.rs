//! Animgen client: HTTP access to the generation service and feedback store,
//! plus the tokio runtimes that execute the core state machines.
mod api;
mod feedback;
mod orchestrator;
mod retry;
mod settings;
mod types;
mod wire;

pub use api::{CreatedJob, FeedbackStore, GenerationService, ReqwestApi};
pub use feedback::{FeedbackController, FeedbackObserver};
pub use orchestrator::{ChannelJobObserver, JobHandle, JobObserver, JobOutcome, Orchestrator};
pub use retry::RetryPolicy;
pub use settings::{ApiSettings, RenderOptions, DEFAULT_API_ORIGIN};
pub use types::{FailureKind, RequestError, SubmitError};
