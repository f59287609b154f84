//! Sessions and their lifecycle.
//!
//! A `Session` is one shared-cost event owned by a host. Its [`SessionStatus`]
//! decides which operations are legal:
//!
//! ```text
//! DRAFT ─► PROCESSING_FACES ─► READY_TO_SPLIT ─► SPLIT_CONFIRMED ─► CLOSED
//!   └──────────────────────────────────────────────┘
//!                 (split generation may skip ahead)
//! ```
//!
//! Expense and roster edits are accepted only in the editable states
//! (`DRAFT`, `PROCESSING_FACES`, `READY_TO_SPLIT`).

use std::fmt;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Draft,
    ProcessingFaces,
    ReadyToSplit,
    SplitConfirmed,
    Closed,
}

/// A requested move of the session state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionTransition {
    /// Hand the roster to the roster-confirmation collaborator.
    StartRosterConfirmation,
    /// The collaborator returned a confirmed roster.
    ConfirmRoster,
    /// Obligations were materialized; the total is frozen.
    ConfirmSplit,
    /// Every obligation is verified.
    Close,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::ProcessingFaces => "processing_faces",
            Self::ReadyToSplit => "ready_to_split",
            Self::SplitConfirmed => "split_confirmed",
            Self::Closed => "closed",
        }
    }

    /// `true` while expenses and participants may still change.
    pub fn is_editable(self) -> bool {
        matches!(
            self,
            Self::Draft | Self::ProcessingFaces | Self::ReadyToSplit
        )
    }

    pub fn ensure_editable(self) -> ResultEngine<()> {
        if self.is_editable() {
            Ok(())
        } else {
            Err(EngineError::SessionLocked(self))
        }
    }

    /// Returns the status reached by applying `transition`, or the reason it
    /// is illegal from `self`.
    pub fn apply(self, transition: SessionTransition) -> ResultEngine<SessionStatus> {
        match (self, transition) {
            (Self::Draft, SessionTransition::StartRosterConfirmation) => {
                Ok(Self::ProcessingFaces)
            }
            (Self::ProcessingFaces, SessionTransition::ConfirmRoster) => Ok(Self::ReadyToSplit),
            (status, SessionTransition::ConfirmSplit) if status.is_editable() => {
                Ok(Self::SplitConfirmed)
            }
            (Self::SplitConfirmed, SessionTransition::Close) => Ok(Self::Closed),
            (status, _) if !status.is_editable() && transition != SessionTransition::Close => {
                Err(EngineError::SessionLocked(status))
            }
            (status, transition) => Err(EngineError::InvalidTransition(format!(
                "cannot apply {transition:?} to a session in status {status}"
            ))),
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.as_str().to_ascii_uppercase())
    }
}

impl TryFrom<&str> for SessionStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_ascii_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "processing_faces" => Ok(Self::ProcessingFaces),
            "ready_to_split" => Ok(Self::ReadyToSplit),
            "split_confirmed" => Ok(Self::SplitConfirmed),
            "closed" => Ok(Self::Closed),
            other => Err(EngineError::InvalidInput(format!(
                "invalid session status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub host_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub event_date: DateTime<Utc>,
    pub status: SessionStatus,
    /// Sum of active expense subtotals; `None` until expenses exist. Frozen
    /// once the split is confirmed.
    pub total_amount_minor: Option<i64>,
    pub is_active: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(
        host_id: Uuid,
        name: String,
        description: Option<String>,
        event_date: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            host_id,
            name,
            description,
            event_date,
            status: SessionStatus::Draft,
            total_amount_minor: None,
            is_active: true,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub host_id: String,
    pub name: String,
    pub description: Option<String>,
    pub event_date: DateTimeUtc,
    pub status: String,
    pub total_amount_minor: Option<i64>,
    pub is_active: bool,
    pub deleted_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::participants::Entity")]
    Participants,
    #[sea_orm(has_many = "super::expense_items::Entity")]
    ExpenseItems,
    #[sea_orm(has_many = "super::obligations::Entity")]
    Obligations,
}

impl Related<super::participants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Participants.def()
    }
}

impl Related<super::expense_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExpenseItems.def()
    }
}

impl Related<super::obligations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Obligations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Session> for ActiveModel {
    fn from(session: &Session) -> Self {
        Self {
            id: ActiveValue::Set(session.id.to_string()),
            host_id: ActiveValue::Set(session.host_id.to_string()),
            name: ActiveValue::Set(session.name.clone()),
            description: ActiveValue::Set(session.description.clone()),
            event_date: ActiveValue::Set(session.event_date),
            status: ActiveValue::Set(session.status.as_str().to_string()),
            total_amount_minor: ActiveValue::Set(session.total_amount_minor),
            is_active: ActiveValue::Set(session.is_active),
            deleted_at: ActiveValue::Set(session.deleted_at),
            created_at: ActiveValue::Set(session.created_at),
            updated_at: ActiveValue::Set(session.updated_at),
        }
    }
}

impl TryFrom<Model> for Session {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "session")?,
            host_id: parse_uuid(&model.host_id, "host")?,
            name: model.name,
            description: model.description,
            event_date: model.event_date,
            status: SessionStatus::try_from(model.status.as_str())?,
            total_amount_minor: model.total_amount_minor,
            is_active: model.is_active,
            deleted_at: model.deleted_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_can_skip_roster_confirmation() {
        assert_eq!(
            SessionStatus::Draft.apply(SessionTransition::ConfirmSplit),
            Ok(SessionStatus::SplitConfirmed)
        );
        assert_eq!(
            SessionStatus::ReadyToSplit.apply(SessionTransition::ConfirmSplit),
            Ok(SessionStatus::SplitConfirmed)
        );
    }

    #[test]
    fn roster_confirmation_path() {
        let status = SessionStatus::Draft
            .apply(SessionTransition::StartRosterConfirmation)
            .unwrap();
        assert_eq!(status, SessionStatus::ProcessingFaces);
        let status = status.apply(SessionTransition::ConfirmRoster).unwrap();
        assert_eq!(status, SessionStatus::ReadyToSplit);
        assert!(status.is_editable());
    }

    #[test]
    fn locked_states_refuse_edits_and_resplit() {
        for status in [SessionStatus::SplitConfirmed, SessionStatus::Closed] {
            assert_eq!(
                status.ensure_editable(),
                Err(EngineError::SessionLocked(status))
            );
            assert_eq!(
                status.apply(SessionTransition::ConfirmSplit),
                Err(EngineError::SessionLocked(status))
            );
        }
    }

    #[test]
    fn close_only_from_split_confirmed() {
        assert_eq!(
            SessionStatus::SplitConfirmed.apply(SessionTransition::Close),
            Ok(SessionStatus::Closed)
        );
        assert!(matches!(
            SessionStatus::Draft.apply(SessionTransition::Close),
            Err(EngineError::InvalidTransition(_))
        ));
        assert!(matches!(
            SessionStatus::Closed.apply(SessionTransition::Close),
            Err(EngineError::InvalidTransition(_))
        ));
    }

    #[test]
    fn roster_steps_out_of_order_are_invalid() {
        assert!(matches!(
            SessionStatus::ReadyToSplit.apply(SessionTransition::StartRosterConfirmation),
            Err(EngineError::InvalidTransition(_))
        ));
        assert!(matches!(
            SessionStatus::Draft.apply(SessionTransition::ConfirmRoster),
            Err(EngineError::InvalidTransition(_))
        ));
    }

    #[test]
    fn status_round_trips_through_storage_form() {
        for status in [
            SessionStatus::Draft,
            SessionStatus::ProcessingFaces,
            SessionStatus::ReadyToSplit,
            SessionStatus::SplitConfirmed,
            SessionStatus::Closed,
        ] {
            assert_eq!(SessionStatus::try_from(status.as_str()), Ok(status));
        }
        assert_eq!(SessionStatus::SplitConfirmed.to_string(), "SPLIT_CONFIRMED");
    }

    #[test]
    fn parses_upper_and_lower_case() {
        assert_eq!(
            SessionStatus::try_from("READY_TO_SPLIT"),
            Ok(SessionStatus::ReadyToSplit)
        );
        assert_eq!(SessionStatus::try_from("closed"), Ok(SessionStatus::Closed));
        assert!(SessionStatus::try_from("open").is_err());
        assert_eq!(format!("{:<8}|", SessionStatus::Draft), "DRAFT   |");
    }
}
