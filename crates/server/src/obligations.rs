//! Split, obligation review and closure endpoints.

use api_types::obligation::{ObligationVerify, ObligationView, VerifyAction};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{Obligation, ObligationList, SettlementSummary, SplitOutcome, VerifyDecision};
use uuid::Uuid;

use crate::{
    ServerError, convert,
    server::{Identity, ServerState},
};

fn view(obligation: Obligation) -> ObligationView {
    ObligationView {
        id: obligation.id,
        session_id: obligation.session_id,
        payer_id: obligation.payer_id,
        amount_minor: obligation.amount_minor,
        status: convert::wire_obligation_status(obligation.status),
    }
}

pub async fn split(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path(session_id): Path<Uuid>,
) -> Result<(StatusCode, Json<SplitOutcome>), ServerError> {
    let outcome = state
        .engine
        .generate_split(session_id, identity.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

pub async fn list(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<ObligationList>, ServerError> {
    let list = state
        .engine
        .list_obligations(session_id, identity.user_id)
        .await?;
    Ok(Json(list))
}

pub async fn mark_paid(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path((session_id, player_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ObligationView>, ServerError> {
    let obligation = state
        .engine
        .mark_player_paid(session_id, player_id, identity.user_id)
        .await?;
    Ok(Json(view(obligation)))
}

pub async fn verify(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path((session_id, obligation_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<ObligationVerify>,
) -> Result<Json<ObligationView>, ServerError> {
    let decision = match payload.action {
        VerifyAction::Approve => VerifyDecision::Approve,
        VerifyAction::Reject => VerifyDecision::Reject {
            reason: payload.reason.unwrap_or_default(),
        },
    };
    let obligation = state
        .engine
        .verify_obligation(session_id, obligation_id, identity.user_id, decision)
        .await?;
    Ok(Json(view(obligation)))
}

pub async fn close(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SettlementSummary>, ServerError> {
    let summary = state
        .engine
        .close_session(session_id, identity.user_id)
        .await?;
    Ok(Json(summary))
}
