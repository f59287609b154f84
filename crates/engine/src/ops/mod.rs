use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    DatabaseConnection, DatabaseTransaction, QueryFilter, prelude::*, sea_query::Expr,
};
use tracing::warn;
use uuid::Uuid;

use crate::{
    EngineError, KeepRoster, ObligationStatus, ResultEngine, RosterConfirmer, SessionStatus,
};

mod access;
mod expenses;
mod obligations;
mod participants;
mod payments;
mod reports;
mod roster;
mod sessions;
mod settlement;
mod users;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    roster: Arc<dyn RosterConfirmer>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Moves a session from `from` to `to`, failing with
    /// [`EngineError::Conflict`] when another request changed the status
    /// first.
    async fn set_session_status(
        &self,
        db: &DatabaseTransaction,
        session_id: Uuid,
        from: SessionStatus,
        to: SessionStatus,
    ) -> ResultEngine<()> {
        let result = crate::sessions::Entity::update_many()
            .col_expr(crate::sessions::Column::Status, Expr::value(to.as_str()))
            .col_expr(crate::sessions::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(crate::sessions::Column::Id.eq(session_id.to_string()))
            .filter(crate::sessions::Column::Status.eq(from.as_str()))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            warn!(%session_id, %from, %to, "stale session status update");
            return Err(EngineError::Conflict(format!(
                "session {session_id} is no longer {from}"
            )));
        }
        Ok(())
    }

    /// Conditional obligation status update, see [`Self::set_session_status`].
    async fn set_obligation_status(
        &self,
        db: &DatabaseTransaction,
        obligation_id: Uuid,
        from: ObligationStatus,
        to: ObligationStatus,
    ) -> ResultEngine<()> {
        let result = crate::obligations::Entity::update_many()
            .col_expr(crate::obligations::Column::Status, Expr::value(to.as_str()))
            .col_expr(crate::obligations::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(crate::obligations::Column::Id.eq(obligation_id.to_string()))
            .filter(crate::obligations::Column::Status.eq(from.as_str()))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            warn!(%obligation_id, %from, %to, "stale obligation status update");
            return Err(EngineError::Conflict(format!(
                "obligation {obligation_id} is no longer {from}"
            )));
        }
        Ok(())
    }
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

fn normalize_email(value: Option<&str>) -> Option<String> {
    normalize_optional_text(value).map(|email| email.to_lowercase())
}

fn ensure_max_len(value: Option<&str>, label: &str, max: usize) -> ResultEngine<()> {
    if let Some(text) = value
        && text.chars().count() > max
    {
        return Err(EngineError::InvalidInput(format!(
            "{label} must be at most {max} characters"
        )));
    }
    Ok(())
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    roster: Option<Arc<dyn RosterConfirmer>>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Plug the roster-confirmation collaborator. Defaults to [`KeepRoster`].
    pub fn roster_confirmer(mut self, confirmer: Arc<dyn RosterConfirmer>) -> EngineBuilder {
        self.roster = Some(confirmer);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            roster: self.roster.unwrap_or_else(|| Arc::new(KeepRoster)),
        })
    }
}
