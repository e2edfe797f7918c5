//! JSON bodies exchanged with the generation service and feedback store.

use animgen_core::StatusReport;
use animgen_logging::anim_warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::RenderOptions;

#[derive(Debug, Serialize)]
pub(crate) struct GenerateBody<'a> {
    pub prompt: &'a str,
    pub options: &'a RenderOptions,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateReply {
    pub task_id: String,
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusReply {
    #[serde(default)]
    pub task_id: Option<String>,
    pub status: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl StatusReply {
    /// Folds the loosely-typed reply into the status union. Unknown statuses
    /// (including `processing`) and completions without a locator stay pending.
    pub fn into_report(self) -> StatusReport {
        let code = self.code.filter(|code| !code.is_empty());
        match self.status.as_str() {
            "completed" => match self.video_url.filter(|url| !url.trim().is_empty()) {
                Some(video_url) => StatusReport::Completed { code, video_url },
                None => {
                    anim_warn!("Completed status without video_url; still polling");
                    StatusReport::Pending { code }
                }
            },
            "failed" => StatusReport::Failed {
                code,
                error: self.error,
            },
            _ => StatusReport::Pending { code },
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct FeedbackBody<'a> {
    pub task_id: &'a str,
    pub is_positive: bool,
    pub remove: bool,
}

/// Success body of `POST /feedback`; every field is informational.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct FeedbackAck {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub feedback_type: Option<String>,
}

/// Extracts the human-readable part of an error body.
///
/// FastAPI-style `{"detail": "..."}` yields the detail; other JSON details are
/// rendered compactly; non-JSON bodies are returned trimmed.
pub(crate) fn error_detail(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => match map.get("detail") {
            Some(Value::String(detail)) => Some(detail.clone()),
            Some(other) => Some(other.to_string()),
            None => Some(body.to_string()),
        },
        _ => Some(body.to_string()),
    }
}
