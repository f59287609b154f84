//! Payer-side endpoints. The acting player is the one linked to the caller's
//! account.

use api_types::{
    payment::{PaymentCreated, PaymentReport, ProofAttach, ProofCreated},
    player::{PlayerObligations as ObligationsQuery, PlayerSessions},
    user::ProfileUpdate,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{
    PaymentStatusView, PaymentSummary, Player, PlayerObligationDetail, PlayerObligations,
    PlayerSessionFilter, PlayerSessionItem, ReportPaymentCmd,
};
use uuid::Uuid;

use crate::{
    ServerError, convert,
    server::{Identity, ServerState},
    users::profile_cmd,
};

pub async fn profile(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
) -> Result<Json<Player>, ServerError> {
    let player = state.engine.player_profile(identity.player_id).await?;
    Ok(Json(player))
}

/// Changes the caller's player record without touching the account.
pub async fn update_profile(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Json(payload): Json<ProfileUpdate>,
) -> Result<Json<Player>, ServerError> {
    let cmd = profile_cmd(payload)?;
    let player = state.engine.update_player(identity.player_id, cmd).await?;
    Ok(Json(player))
}

pub async fn obligations(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Query(params): Query<ObligationsQuery>,
) -> Result<Json<PlayerObligations>, ServerError> {
    let obligations = state
        .engine
        .player_obligations(identity.player_id, params.status.map(convert::obligation_status))
        .await?;
    Ok(Json(obligations))
}

pub async fn obligation(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path(obligation_id): Path<Uuid>,
) -> Result<Json<PlayerObligationDetail>, ServerError> {
    let detail = state
        .engine
        .player_obligation(obligation_id, identity.player_id)
        .await?;
    Ok(Json(detail))
}

pub async fn report_payment(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path(obligation_id): Path<Uuid>,
    Json(payload): Json<PaymentReport>,
) -> Result<(StatusCode, Json<PaymentCreated>), ServerError> {
    let mut cmd = ReportPaymentCmd::new(convert::payment_method(payload.method));
    if let Some(reference) = payload.reference_number {
        cmd = cmd.reference_number(reference);
    }
    if let Some(notes) = payload.notes {
        cmd = cmd.notes(notes);
    }
    if let Some(paid_at) = payload.paid_at {
        cmd = cmd.paid_at(convert::utc(paid_at));
    }

    let payment = state
        .engine
        .report_payment(obligation_id, identity.player_id, cmd)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(PaymentCreated {
            id: payment.id,
            attempt: payment.attempt,
            amount_minor: payment.amount_minor,
        }),
    ))
}

pub async fn payment_status(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path(payment_id): Path<Uuid>,
) -> Result<Json<PaymentStatusView>, ServerError> {
    let status = state
        .engine
        .payment_status(payment_id, identity.player_id)
        .await?;
    Ok(Json(status))
}

pub async fn attach_proof(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path(payment_id): Path<Uuid>,
    Json(payload): Json<ProofAttach>,
) -> Result<(StatusCode, Json<ProofCreated>), ServerError> {
    let proof = state
        .engine
        .attach_payment_proof(payment_id, identity.player_id, &payload.media_ref)
        .await?;
    Ok((StatusCode::CREATED, Json(ProofCreated { id: proof.id })))
}

pub async fn sessions(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Query(params): Query<PlayerSessions>,
) -> Result<Json<Vec<PlayerSessionItem>>, ServerError> {
    let filter = params
        .filter
        .map_or(PlayerSessionFilter::All, convert::player_session_filter);
    let sessions = state
        .engine
        .player_sessions(identity.player_id, filter)
        .await?;
    Ok(Json(sessions))
}

pub async fn summary(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
) -> Result<Json<PaymentSummary>, ServerError> {
    let summary = state.engine.payment_summary(identity.user_id).await?;
    Ok(Json(summary))
}
