use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, patch, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Error as AxumError, Header},
};
use uuid::Uuid;

use std::sync::Arc;

use crate::{expenses, obligations, participants, player, sessions, users};
use engine::{Engine, EngineError};

static USER_HEADER: axum::http::HeaderName = axum::http::HeaderName::from_static("x-user-id");

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// The acting account, resolved once per request.
#[derive(Clone, Copy, Debug)]
pub struct Identity {
    pub user_id: Uuid,
    /// Player record linked to the account.
    pub player_id: Uuid,
}

/// `TypedHeader` for the acting user.
///
/// Authentication happens upstream; requests carry the authenticated account
/// id in "x-user-id".
#[derive(Debug)]
struct UserHeader(Uuid);

impl Header for UserHeader {
    fn name() -> &'static axum::http::HeaderName {
        &USER_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, AxumError>
    where
        Self: Sized,
        I: Iterator<Item = &'i axum::http::HeaderValue>,
    {
        let value = values.next().ok_or_else(AxumError::invalid)?;
        let Ok(value) = value.to_str() else {
            return Err(AxumError::invalid());
        };
        let Ok(value) = Uuid::parse_str(value.trim()) else {
            return Err(AxumError::invalid());
        };

        Ok(UserHeader(value))
    }

    fn encode<E: Extend<axum::http::HeaderValue>>(&self, values: &mut E) {
        let as_string = self.0.to_string();
        match axum::http::HeaderValue::from_str(&as_string) {
            Ok(value) => values.extend(std::iter::once(value)),
            Err(_) => tracing::error!("failed to encode x-user-id header"),
        }
    }
}

async fn identify(
    user_header: TypedHeader<UserHeader>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let user_id = user_header.0.0;
    let player = match state.engine.user_player(user_id).await {
        Ok(player) => player,
        Err(EngineError::Database(err)) => {
            tracing::error!("database error: {err}");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
        Err(_) => return Err(StatusCode::UNAUTHORIZED),
    };

    request.extensions_mut().insert(Identity {
        user_id,
        player_id: player.id,
    });
    Ok(next.run(request).await)
}

fn router(state: ServerState) -> Router {
    let authenticated = Router::new()
        .route(
            "/users/me",
            get(users::profile)
                .patch(users::update_profile)
                .delete(users::remove),
        )
        .route("/sessions", get(sessions::list).post(sessions::create))
        .route(
            "/sessions/{session_id}",
            get(sessions::detail)
                .patch(sessions::update)
                .delete(sessions::remove),
        )
        .route("/sessions/{session_id}/players", post(participants::add))
        .route(
            "/sessions/{session_id}/players/{player_id}",
            delete(participants::remove),
        )
        .route(
            "/sessions/{session_id}/players/{player_id}/mark-paid",
            post(obligations::mark_paid),
        )
        .route(
            "/sessions/{session_id}/roster/start",
            post(participants::start_roster),
        )
        .route(
            "/sessions/{session_id}/roster/confirm",
            post(participants::confirm_roster),
        )
        .route(
            "/sessions/{session_id}/expenses",
            get(expenses::summary).post(expenses::add),
        )
        .route(
            "/sessions/{session_id}/expenses/{expense_id}",
            patch(expenses::update).delete(expenses::remove),
        )
        .route("/sessions/{session_id}/split", post(obligations::split))
        .route("/sessions/{session_id}/obligations", get(obligations::list))
        .route(
            "/sessions/{session_id}/obligations/{obligation_id}/verify",
            post(obligations::verify),
        )
        .route("/sessions/{session_id}/close", post(obligations::close))
        .route(
            "/player/me",
            get(player::profile).patch(player::update_profile),
        )
        .route("/player/obligations", get(player::obligations))
        .route("/player/obligations/{obligation_id}", get(player::obligation))
        .route(
            "/player/obligations/{obligation_id}/payments",
            post(player::report_payment),
        )
        .route("/player/payments/{payment_id}", get(player::payment_status))
        .route(
            "/player/payments/{payment_id}/proofs",
            post(player::attach_proof),
        )
        .route("/player/sessions", get(player::sessions))
        .route("/summary", get(player::summary))
        .route_layer(middleware::from_fn_with_state(state.clone(), identify));

    Router::new()
        .route("/users", post(users::create))
        .merge(authenticated)
        .with_state(state)
}

/// The HTTP application over `engine`.
pub fn app(engine: Engine) -> Router {
    router(ServerState {
        engine: Arc::new(engine),
    })
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app(engine)).await
}
