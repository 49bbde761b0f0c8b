//! Proposal API endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use swapchain_core::{DraftField, SwapchainError};
use swapchain_flow::ProposalView;
use tracing::debug;
use uuid::Uuid;

use crate::engine::spawn_execution;
use crate::state::{AppState, Session};

type ApiError = (StatusCode, String);

/// Request to edit one field of a draft.
#[derive(Debug, Deserialize)]
pub struct UpdateFieldRequest {
    /// Wire name of the field, e.g. `amountToSend`.
    pub field: String,

    /// Raw input as typed by the user.
    pub value: String,
}

/// A proposal and how it should be displayed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalResponse {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub view: ProposalView,
}

impl ProposalResponse {
    async fn from_session(session: &Session) -> Self {
        let view = session.proposal.read().await.view();
        Self {
            id: session.id,
            created_at: session.created_at,
            view,
        }
    }
}

/// Map a core error to an HTTP status.
pub fn error_response(err: SwapchainError) -> ApiError {
    let status = match &err {
        SwapchainError::InvalidFieldValue { .. }
        | SwapchainError::FieldTypeMismatch { .. }
        | SwapchainError::MissingField(_) => StatusCode::BAD_REQUEST,
        SwapchainError::ValidationFailed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        SwapchainError::DraftLocked { .. }
        | SwapchainError::SubmitNotAllowed { .. }
        | SwapchainError::InvalidTransition { .. } => StatusCode::CONFLICT,
        SwapchainError::NotFound { .. } => StatusCode::NOT_FOUND,
    };
    (status, err.to_string())
}

async fn find_session(state: &AppState, id: Uuid) -> Result<Session, ApiError> {
    state
        .get_session(id)
        .await
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("Proposal {} not found", id)))
}

/// Start a new proposal with a default draft.
pub async fn create_proposal(State(state): State<AppState>) -> (StatusCode, Json<ProposalResponse>) {
    let session = state.create_session().await;
    (
        StatusCode::CREATED,
        Json(ProposalResponse::from_session(&session).await),
    )
}

/// Get a proposal by ID.
pub async fn get_proposal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProposalResponse>, ApiError> {
    let session = find_session(&state, id).await?;
    Ok(Json(ProposalResponse::from_session(&session).await))
}

/// List all proposals.
pub async fn list_proposals(State(state): State<AppState>) -> Json<Vec<ProposalResponse>> {
    let mut responses = Vec::new();
    for session in state.list_sessions().await {
        responses.push(ProposalResponse::from_session(&session).await);
    }
    Json(responses)
}

/// Edit one field of the draft.
pub async fn update_field(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateFieldRequest>,
) -> Result<Json<ProposalResponse>, ApiError> {
    let field: DraftField = req
        .field
        .parse()
        .map_err(|_| (StatusCode::BAD_REQUEST, format!("Unknown field: {}", req.field)))?;

    let session = find_session(&state, id).await?;
    {
        let mut proposal = session.proposal.write().await;
        proposal.update_raw(field, &req.value).map_err(error_response)?;
        debug!("Proposal {} updated {} (v{})", id, field, proposal.draft_version());
    }

    Ok(Json(ProposalResponse::from_session(&session).await))
}

/// Submit the draft.
///
/// Answers as soon as the proposal is Running; the swap itself finishes in
/// the background and is reported on the proposal's WebSocket stream.
pub async fn submit_proposal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<ProposalResponse>), ApiError> {
    let session = find_session(&state, id).await?;

    let submission = {
        let mut proposal = session.proposal.write().await;
        let submission = proposal.begin_submit().map_err(error_response)?;
        spawn_execution(session.clone(), proposal.executor(), submission.clone());
        submission
    };
    debug!("Proposal {} running draft v{}", id, submission.draft_version());

    Ok((
        StatusCode::ACCEPTED,
        Json(ProposalResponse::from_session(&session).await),
    ))
}

/// Discard a proposal.
pub async fn delete_proposal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state
        .remove_session(id)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("Proposal {} not found", id)))
}
