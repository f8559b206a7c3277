//! In-process stand-in for the expert applications API.
//!
//! Backs the CLI `sandbox` command and the integration tests. It stores applications in
//! memory and applies the same checks the real service documents: identity fields on
//! creation, one application per email, and a complete draft on submission.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use super::api::{CreateApplicationRequest, SubmitApplicationRequest};
use super::domain::ApplicationDraft;
use super::validation::{validate_for_submission, FieldError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SandboxStatus {
    Draft,
    Submitted,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredApplication {
    pub id: u64,
    pub email: String,
    pub full_name: String,
    pub status: SandboxStatus,
    pub application_data: ApplicationDraft,
    pub created_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    #[error("{0}")]
    Invalid(String),
    #[error("email already used")]
    DuplicateEmail,
    #[error("application not found")]
    NotFound,
    #[error("application already submitted")]
    AlreadySubmitted,
    #[error("application is incomplete")]
    Incomplete(Vec<FieldError>),
    #[error("sandbox state unavailable")]
    Unavailable,
}

impl IntoResponse for SandboxError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            SandboxError::Invalid(message) => (StatusCode::UNPROCESSABLE_ENTITY, json!(message)),
            SandboxError::DuplicateEmail | SandboxError::AlreadySubmitted => {
                (StatusCode::CONFLICT, json!(self.to_string()))
            }
            SandboxError::NotFound => (StatusCode::NOT_FOUND, json!(self.to_string())),
            SandboxError::Incomplete(errors) => {
                let items: Vec<_> = errors
                    .iter()
                    .map(|error| json!({ "loc": error.field, "msg": error.message }))
                    .collect();
                (StatusCode::UNPROCESSABLE_ENTITY, json!(items))
            }
            SandboxError::Unavailable => {
                (StatusCode::INTERNAL_SERVER_ERROR, json!(self.to_string()))
            }
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

/// Malformed bodies and ids get the same `{"detail": ...}` shape as domain errors.
impl From<JsonRejection> for SandboxError {
    fn from(rejection: JsonRejection) -> Self {
        SandboxError::Invalid(rejection.body_text())
    }
}

impl From<PathRejection> for SandboxError {
    fn from(rejection: PathRejection) -> Self {
        SandboxError::Invalid(rejection.body_text())
    }
}

#[derive(Debug, Default)]
struct SandboxState {
    last_id: u64,
    applications: BTreeMap<u64, StoredApplication>,
}

/// Shared in-memory application store.
#[derive(Debug, Clone, Default)]
pub struct SandboxBackend {
    state: Arc<Mutex<SandboxState>>,
}

impl SandboxBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, SandboxState>, SandboxError> {
        self.state.lock().map_err(|_| SandboxError::Unavailable)
    }

    pub fn create(
        &self,
        request: CreateApplicationRequest,
    ) -> Result<StoredApplication, SandboxError> {
        let email = request.email.trim().to_string();
        let full_name = request.full_name.trim().to_string();
        if email.is_empty() {
            return Err(SandboxError::Invalid("email is required".to_string()));
        }
        if full_name.is_empty() {
            return Err(SandboxError::Invalid("full_name is required".to_string()));
        }

        let mut state = self.state()?;
        if state
            .applications
            .values()
            .any(|existing| existing.email.eq_ignore_ascii_case(&email))
        {
            return Err(SandboxError::DuplicateEmail);
        }

        state.last_id += 1;
        let application = StoredApplication {
            id: state.last_id,
            email,
            full_name,
            status: SandboxStatus::Draft,
            application_data: request.application_data,
            created_at: Utc::now(),
            submitted_at: None,
        };
        state
            .applications
            .insert(application.id, application.clone());

        info!(application_id = application.id, "sandbox application created");
        Ok(application)
    }

    pub fn submit(
        &self,
        id: u64,
        request: SubmitApplicationRequest,
    ) -> Result<StoredApplication, SandboxError> {
        let mut state = self.state()?;
        let application = state
            .applications
            .get_mut(&id)
            .ok_or(SandboxError::NotFound)?;

        if application.status == SandboxStatus::Submitted {
            return Err(SandboxError::AlreadySubmitted);
        }

        let validation = validate_for_submission(&request.application_data);
        if !validation.valid {
            return Err(SandboxError::Incomplete(validation.errors));
        }

        application.application_data = request.application_data;
        application.status = SandboxStatus::Submitted;
        application.submitted_at = Some(Utc::now());

        info!(application_id = id, "sandbox application submitted");
        Ok(application.clone())
    }

    pub fn get(&self, id: u64) -> Option<StoredApplication> {
        self.state()
            .ok()
            .and_then(|state| state.applications.get(&id).cloned())
    }

    pub fn len(&self) -> usize {
        self.state()
            .map(|state| state.applications.len())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Router serving the two expert application endpoints plus a health probe.
pub fn sandbox_router(backend: SandboxBackend) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/expert-applications", post(create_handler))
        .route("/expert-applications/:id/submit", post(submit_handler))
        .with_state(backend)
}

pub(crate) async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn create_handler(
    State(backend): State<SandboxBackend>,
    payload: Result<Json<CreateApplicationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<StoredApplication>), SandboxError> {
    let Json(request) = payload?;
    let application = backend.create(request)?;
    Ok((StatusCode::CREATED, Json(application)))
}

pub(crate) async fn submit_handler(
    State(backend): State<SandboxBackend>,
    id: Result<Path<u64>, PathRejection>,
    payload: Result<Json<SubmitApplicationRequest>, JsonRejection>,
) -> Result<Json<StoredApplication>, SandboxError> {
    let Path(id) = id?;
    let Json(request) = payload?;
    let application = backend.submit(id, request)?;
    Ok(Json(application))
}
