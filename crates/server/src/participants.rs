//! Roster API endpoints.

use api_types::participant::{ParticipantView, PlayersAdd, PlayersAdded};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{NewPlayerCmd, Session};
use uuid::Uuid;

use crate::{
    ServerError,
    server::{Identity, ServerState},
};

pub async fn add(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<PlayersAdd>,
) -> Result<(StatusCode, Json<PlayersAdded>), ServerError> {
    let players = payload
        .players
        .into_iter()
        .map(|p| NewPlayerCmd {
            name: p.name,
            email: p.email,
            phone: p.phone,
        })
        .collect();

    let added = state
        .engine
        .add_players(session_id, identity.user_id, players)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PlayersAdded {
            added: added
                .into_iter()
                .map(|p| ParticipantView {
                    id: p.id,
                    player_id: p.player_id,
                })
                .collect(),
        }),
    ))
}

pub async fn remove(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path((session_id, player_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .remove_player(session_id, player_id, identity.user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn start_roster(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Session>, ServerError> {
    let session = state
        .engine
        .start_roster_confirmation(session_id, identity.user_id)
        .await?;
    Ok(Json(session))
}

pub async fn confirm_roster(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Session>, ServerError> {
    let session = state
        .engine
        .confirm_roster(session_id, identity.user_id)
        .await?;
    Ok(Json(session))
}
