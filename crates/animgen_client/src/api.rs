use animgen_core::{FeedbackRequest, StatusReport, TaskId};
use animgen_logging::{anim_debug, anim_info};
use reqwest::header::CONTENT_TYPE;
use serde::{de::DeserializeOwned, Serialize};
use url::Url;

use crate::wire::{
    error_detail, FeedbackAck, FeedbackBody, GenerateBody, GenerateReply, StatusReply,
};
use crate::{ApiSettings, FailureKind, RenderOptions, RequestError};

/// Result of a successful creation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedJob {
    pub task_id: TaskId,
    /// Some services return code straight away.
    pub code: Option<String>,
}

#[async_trait::async_trait]
pub trait GenerationService: Send + Sync {
    async fn create_job(
        &self,
        prompt: &str,
        options: &RenderOptions,
    ) -> Result<CreatedJob, RequestError>;

    async fn fetch_status(&self, task_id: &TaskId) -> Result<StatusReport, RequestError>;
}

#[async_trait::async_trait]
pub trait FeedbackStore: Send + Sync {
    async fn send_feedback(&self, request: &FeedbackRequest) -> Result<(), RequestError>;
}

/// HTTP implementation of both remote collaborators.
#[derive(Debug, Clone)]
pub struct ReqwestApi {
    client: reqwest::Client,
    origin: Url,
}

impl ReqwestApi {
    pub fn new(settings: &ApiSettings) -> Result<Self, RequestError> {
        if settings.origin.cannot_be_a_base() {
            return Err(RequestError::new(
                FailureKind::InvalidUrl,
                format!("origin {} cannot carry paths", settings.origin),
            ));
        }
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| RequestError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            client,
            origin: settings.origin.clone(),
        })
    }

    /// Appends percent-encoded path segments to the origin, keeping any path prefix.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, RequestError> {
        let mut url = self.origin.clone();
        url.path_segments_mut()
            .map_err(|_| RequestError::new(FailureKind::InvalidUrl, "origin cannot be a base"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn post_json<B: Serialize>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<reqwest::Response, RequestError> {
        let payload = serde_json::to_vec(body)
            .map_err(|err| RequestError::new(FailureKind::Decode, err.to_string()))?;
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        ensure_success(response).await
    }

    async fn get(&self, url: Url) -> Result<reqwest::Response, RequestError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        ensure_success(response).await
    }
}

#[async_trait::async_trait]
impl GenerationService for ReqwestApi {
    async fn create_job(
        &self,
        prompt: &str,
        options: &RenderOptions,
    ) -> Result<CreatedJob, RequestError> {
        let url = self.endpoint(&["generate"])?;
        let response = self.post_json(url, &GenerateBody { prompt, options }).await?;
        let reply: GenerateReply = decode(response).await?;
        if reply.task_id.is_empty() {
            return Err(RequestError::new(FailureKind::Decode, "empty task_id"));
        }
        Ok(CreatedJob {
            task_id: TaskId::from(reply.task_id),
            code: reply.code.filter(|code| !code.is_empty()),
        })
    }

    async fn fetch_status(&self, task_id: &TaskId) -> Result<StatusReport, RequestError> {
        let url = self.endpoint(&["status", task_id.as_str()])?;
        let response = self.get(url).await?;
        let reply: StatusReply = decode(response).await?;
        if let Some(echoed) = reply.task_id.as_deref() {
            if echoed != task_id.as_str() {
                return Err(RequestError::new(
                    FailureKind::Decode,
                    format!("status for task {echoed} returned while polling {task_id}"),
                ));
            }
        }
        anim_debug!("Status for {}: {}", task_id, reply.status);
        Ok(reply.into_report())
    }
}

#[async_trait::async_trait]
impl FeedbackStore for ReqwestApi {
    async fn send_feedback(&self, request: &FeedbackRequest) -> Result<(), RequestError> {
        let url = self.endpoint(&["feedback"])?;
        let body = FeedbackBody {
            task_id: request.task_id.as_str(),
            is_positive: request.choice.is_positive(),
            remove: request.remove,
        };
        let response = self.post_json(url, &body).await?;
        let text = response.text().await.map_err(map_reqwest_error)?;
        let ack: FeedbackAck = serde_json::from_str(&text).unwrap_or_default();
        anim_info!(
            "Feedback stored for {}: {} ({})",
            request.task_id,
            ack.message.as_deref().unwrap_or("ok"),
            ack.feedback_type.as_deref().unwrap_or("unknown")
        );
        Ok(())
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, RequestError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = error_detail(&body).unwrap_or_else(|| status.to_string());
    Err(RequestError::new(
        FailureKind::HttpStatus(status.as_u16()),
        message,
    ))
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, RequestError> {
    let text = response.text().await.map_err(map_reqwest_error)?;
    serde_json::from_str(&text).map_err(|err| RequestError::new(FailureKind::Decode, err.to_string()))
}

fn map_reqwest_error(err: reqwest::Error) -> RequestError {
    if err.is_timeout() {
        return RequestError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_builder() {
        return RequestError::new(FailureKind::InvalidUrl, err.to_string());
    }
    RequestError::new(FailureKind::Network, err.to_string())
}
