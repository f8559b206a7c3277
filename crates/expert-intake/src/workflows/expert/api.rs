use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use reqwest::Url;
use tracing::debug;

use super::domain::{ApplicationDraft, ApplicationId};
use crate::config::ApiConfig;

/// Shown when the API gives no usable explanation for a failure.
pub const GENERIC_SUBMISSION_MESSAGE: &str =
    "We couldn't submit your application. Please try again.";

/// Phase 1 body: minimal identity plus the whole draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateApplicationRequest {
    pub email: String,
    pub full_name: String,
    pub application_data: ApplicationDraft,
}

/// Phase 2 body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitApplicationRequest {
    pub application_data: ApplicationDraft,
}

/// Application representation returned by both endpoints; fields other than `id` are echoed
/// back as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationResource {
    pub id: ApplicationId,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ApplicationResource {
    pub fn new(id: impl Into<ApplicationId>) -> Self {
        Self {
            id: id.into(),
            status: None,
            fields: Map::new(),
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}

/// Failure talking to the expert applications API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("api responded with status {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Status { status: u16, detail: Option<String> },
    #[error("api request failed: {0}")]
    Transport(String),
    #[error("api response could not be decoded: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn rejected(status: u16, detail: impl Into<String>) -> Self {
        ApiError::Status {
            status,
            detail: Some(detail.into()),
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Status { detail, .. } => detail.as_deref(),
            ApiError::Transport(_) | ApiError::Decode(_) => None,
        }
    }

    /// Server-provided detail when present, otherwise the generic message.
    pub fn user_message(&self) -> String {
        self.detail()
            .map(str::trim)
            .filter(|detail| !detail.is_empty())
            .unwrap_or(GENERIC_SUBMISSION_MESSAGE)
            .to_string()
    }
}

/// Pull a human readable message out of an error payload.
///
/// `detail` may be a plain string or a list of `{ "msg": ... }` objects; lists are joined
/// with `"; "`.
pub fn detail_from_body(body: &Value) -> Option<String> {
    let detail = body.get("detail")?;
    let message = match detail {
        Value::String(text) => text.trim().to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(text) => Some(text.trim().to_string()),
                Value::Object(fields) => fields
                    .get("msg")
                    .or_else(|| fields.get("message"))
                    .and_then(Value::as_str)
                    .map(|text| text.trim().to_string()),
                _ => None,
            })
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("; "),
        Value::Object(fields) => fields
            .get("msg")
            .or_else(|| fields.get("message"))
            .and_then(Value::as_str)?
            .trim()
            .to_string(),
        _ => return None,
    };

    if message.is_empty() {
        None
    } else {
        Some(message)
    }
}

/// The two calls the wizard makes against the expert applications API.
#[async_trait]
pub trait ApplicationApi: Send + Sync {
    async fn create_draft(
        &self,
        request: &CreateApplicationRequest,
    ) -> Result<ApplicationResource, ApiError>;

    async fn submit_draft(
        &self,
        id: &ApplicationId,
        request: &SubmitApplicationRequest,
    ) -> Result<ApplicationResource, ApiError>;
}

#[async_trait]
impl<T> ApplicationApi for Arc<T>
where
    T: ApplicationApi + ?Sized,
{
    async fn create_draft(
        &self,
        request: &CreateApplicationRequest,
    ) -> Result<ApplicationResource, ApiError> {
        (**self).create_draft(request).await
    }

    async fn submit_draft(
        &self,
        id: &ApplicationId,
        request: &SubmitApplicationRequest,
    ) -> Result<ApplicationResource, ApiError> {
        (**self).submit_draft(id, request).await
    }
}

/// JSON-over-HTTP client for the expert applications API.
#[derive(Debug, Clone)]
pub struct HttpApplicationApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpApplicationApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ApiError::Transport(err.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Appends `segments` to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|err| ApiError::Transport(format!("invalid base url: {err}")))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::Transport("base url cannot take a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn post_json<B>(&self, url: Url, body: &B) -> Result<ApplicationResource, ApiError>
    where
        B: Serialize + Sync + ?Sized,
    {
        debug!(%url, "posting to expert applications api");

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|err| ApiError::Transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<ApplicationResource>()
                .await
                .map_err(|err| ApiError::Decode(err.to_string()));
        }

        let text = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|body| detail_from_body(&body));

        Err(ApiError::Status {
            status: status.as_u16(),
            detail,
        })
    }
}

#[async_trait]
impl ApplicationApi for HttpApplicationApi {
    async fn create_draft(
        &self,
        request: &CreateApplicationRequest,
    ) -> Result<ApplicationResource, ApiError> {
        let url = self.endpoint(&["expert-applications"])?;
        self.post_json(url, request).await
    }

    async fn submit_draft(
        &self,
        id: &ApplicationId,
        request: &SubmitApplicationRequest,
    ) -> Result<ApplicationResource, ApiError> {
        let url = self.endpoint(&["expert-applications", id.0.as_str(), "submit"])?;
        self.post_json(url, request).await
    }
}
