//! Account bootstrap and lifecycle.

use api_types::user::{ProfileUpdate, UserCreated, UserNew};
use axum::{Extension, Json, extract::State, http::StatusCode};
use engine::{UpdateProfileCmd, UserProfile};

use crate::{
    ServerError,
    server::{Identity, ServerState},
};

/// Creates an account together with its linked player record.
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<UserNew>,
) -> Result<(StatusCode, Json<UserCreated>), ServerError> {
    let (user, player) = state
        .engine
        .create_user(&payload.name, payload.email.as_deref())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(UserCreated {
            user_id: user.id,
            player_id: player.id,
        }),
    ))
}

pub async fn profile(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
) -> Result<Json<UserProfile>, ServerError> {
    let profile = state.engine.user_profile(identity.user_id).await?;
    Ok(Json(profile))
}

pub async fn update_profile(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Json(payload): Json<ProfileUpdate>,
) -> Result<Json<UserProfile>, ServerError> {
    let cmd = profile_cmd(payload)?;
    let profile = state.engine.update_user(identity.user_id, cmd).await?;
    Ok(Json(profile))
}

pub async fn remove(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_user(identity.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) fn profile_cmd(payload: ProfileUpdate) -> Result<UpdateProfileCmd, ServerError> {
    let cmd = UpdateProfileCmd {
        name: payload.name,
        email: payload.email,
        phone: payload.phone,
    };
    if cmd.is_empty() {
        return Err(ServerError::Generic(
            "provide at least one of name, email or phone".to_string(),
        ));
    }
    Ok(cmd)
}
