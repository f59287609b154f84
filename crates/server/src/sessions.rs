//! Session API endpoints.

use api_types::session::{SessionCreated, SessionList, SessionNew, SessionUpdate};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{NewSessionCmd, Session, SessionDetail, SessionListQuery, SessionPage, UpdateSessionCmd};
use uuid::Uuid;

use crate::{
    ServerError, convert,
    server::{Identity, ServerState},
};

pub async fn create(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Json(payload): Json<SessionNew>,
) -> Result<(StatusCode, Json<SessionCreated>), ServerError> {
    let mut cmd = NewSessionCmd::new(payload.name, convert::utc(payload.event_date));
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }
    let session = state
        .engine
        .create_session(identity.user_id, cmd)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SessionCreated {
            id: session.id,
            status: convert::wire_session_status(session.status),
        }),
    ))
}

pub async fn list(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Query(params): Query<SessionList>,
) -> Result<Json<SessionPage>, ServerError> {
    let defaults = SessionListQuery::default();
    let query = SessionListQuery {
        role: params.role.map_or(defaults.role, convert::role_filter),
        status: params.status.map(convert::session_status),
        sort: params.sort.map_or(defaults.sort, convert::session_sort),
        order: params.order.map_or(defaults.order, convert::sort_order),
        page: params.page.unwrap_or(defaults.page),
        limit: params.limit.unwrap_or(defaults.limit),
    };

    let page = state.engine.list_sessions(identity.user_id, query).await?;
    Ok(Json(page))
}

pub async fn detail(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionDetail>, ServerError> {
    let detail = state
        .engine
        .session_detail(session_id, identity.user_id)
        .await?;
    Ok(Json(detail))
}

pub async fn update(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<SessionUpdate>,
) -> Result<Json<Session>, ServerError> {
    if payload.name.is_none() && payload.description.is_none() && payload.event_date.is_none() {
        return Err(ServerError::Generic(
            "provide at least one of name, description or event_date".to_string(),
        ));
    }
    let cmd = UpdateSessionCmd {
        name: payload.name,
        description: payload.description,
        event_date: payload.event_date.map(convert::utc),
    };

    let session = state
        .engine
        .update_session(session_id, identity.user_id, cmd)
        .await?;
    Ok(Json(session))
}

pub async fn remove(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_session(session_id, identity.user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
