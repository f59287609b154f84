use api_types::error::ErrorBody;
use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::{EngineError, ErrorKind};

pub use server::{ServerState, app, run_with_listener};

mod convert;
mod expenses;
mod obligations;
mod participants;
mod player;
mod server;
mod sessions;
mod users;

pub mod types {
    pub mod user {
        pub use api_types::user::{ProfileUpdate, UserCreated, UserNew};
        pub use engine::UserProfile;
    }

    pub mod session {
        pub use api_types::session::{SessionCreated, SessionList, SessionNew, SessionUpdate};
        pub use engine::{SessionDetail, SessionPage};
    }

    pub mod participant {
        pub use api_types::participant::{ParticipantView, PlayerNew, PlayersAdd, PlayersAdded};
    }

    pub mod expense {
        pub use api_types::expense::{ExpenseNew, ExpenseUpdate, ExpensesAdd};
        pub use engine::{ExpenseItem, ExpenseSummary};
    }

    pub mod obligation {
        pub use api_types::obligation::{ObligationVerify, ObligationView, VerifyAction};
        pub use engine::{ObligationList, SettlementSummary, SplitOutcome};
    }

    pub mod player {
        pub use api_types::payment::{PaymentCreated, PaymentReport, ProofAttach, ProofCreated};
        pub use api_types::player::{PlayerObligations, PlayerSessions};
        pub use engine::{PaymentStatusView, PaymentSummary, Player, PlayerObligationDetail};
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err.kind() {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::PermissionDenied => StatusCode::FORBIDDEN,
        ErrorKind::InvalidState | ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Validation | ErrorKind::NoParticipants => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            ServerError::Engine(err) => {
                let pending_count = match err {
                    EngineError::PendingObligations { count } => Some(count),
                    _ => None,
                };
                let status = status_for_engine_error(&err);
                let error = message_for_engine_error(err);
                (status, ErrorBody { error, pending_count })
            }
            ServerError::Generic(error) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error,
                    pending_count: None,
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use engine::{ObligationStatus, SessionStatus};

    use super::*;

    #[test]
    fn engine_forbidden_maps_to_403() {
        let res = ServerError::from(EngineError::Forbidden("forbidden".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        let res = ServerError::from(EngineError::NotPayer("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_invalid_state_maps_to_409() {
        let res = ServerError::from(EngineError::SessionLocked(SessionStatus::Closed)).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
        let res = ServerError::from(EngineError::AlreadySettled(ObligationStatus::Verified))
            .into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
        let res = ServerError::from(EngineError::Conflict("stale".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
        let res = ServerError::from(EngineError::HostingUnsettled { sessions: 2 }).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_validation_maps_to_422() {
        let res = ServerError::from(EngineError::InvalidAmount("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let res = ServerError::from(EngineError::NoParticipants).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
