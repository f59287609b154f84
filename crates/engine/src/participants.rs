//! Session roster.
//!
//! A participant row links a player to a session with a role. Each session
//! has exactly one `Host` participant (the host's own player record). A
//! removed participant is deactivated, never deleted, and the row is reused
//! when the player is added again.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParticipantRole {
    Host,
    Player,
}

impl ParticipantRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Host => "host",
            Self::Player => "player",
        }
    }
}

impl TryFrom<&str> for ParticipantRole {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "host" => Ok(Self::Host),
            "player" => Ok(Self::Player),
            other => Err(EngineError::InvalidInput(format!(
                "invalid participant role: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: Uuid,
    pub session_id: Uuid,
    pub player_id: Uuid,
    pub role: ParticipantRole,
    pub is_active: bool,
    pub joined_at: DateTime<Utc>,
}

impl Participant {
    pub fn new(session_id: Uuid, player_id: Uuid, role: ParticipantRole) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id,
            player_id,
            role,
            is_active: true,
            joined_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "session_participants")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub session_id: String,
    pub player_id: String,
    pub role: String,
    pub is_active: bool,
    pub joined_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sessions::Entity",
        from = "Column::SessionId",
        to = "super::sessions::Column::Id"
    )]
    Session,
    #[sea_orm(
        belongs_to = "super::players::Entity",
        from = "Column::PlayerId",
        to = "super::players::Column::Id"
    )]
    Player,
}

impl Related<super::sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Session.def()
    }
}

impl Related<super::players::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Player.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Participant> for ActiveModel {
    fn from(participant: &Participant) -> Self {
        Self {
            id: ActiveValue::Set(participant.id.to_string()),
            session_id: ActiveValue::Set(participant.session_id.to_string()),
            player_id: ActiveValue::Set(participant.player_id.to_string()),
            role: ActiveValue::Set(participant.role.as_str().to_string()),
            is_active: ActiveValue::Set(participant.is_active),
            joined_at: ActiveValue::Set(participant.joined_at),
        }
    }
}

impl TryFrom<Model> for Participant {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "participant")?,
            session_id: parse_uuid(&model.session_id, "session")?,
            player_id: parse_uuid(&model.player_id, "player")?,
            role: ParticipantRole::try_from(model.role.as_str())?,
            is_active: model.is_active,
            joined_at: model.joined_at,
        })
    }
}
