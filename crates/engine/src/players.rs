//! Players: anyone who can take part in a session.
//!
//! A host's own player record is linked through `user_id`; ad-hoc players
//! added to a roster have no user.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub user_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Player {
    pub fn new(name: String, email: Option<String>, phone: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            phone,
            user_id: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn linked_to(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "players")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    /// Accent- and case-folded name used for find-or-create lookups.
    pub name_key: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[sea_orm(unique)]
    pub user_id: Option<String>,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::participants::Entity")]
    Participants,
}

impl Related<super::participants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Participants.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Player> for ActiveModel {
    fn from(player: &Player) -> Self {
        Self {
            id: ActiveValue::Set(player.id.to_string()),
            name: ActiveValue::Set(player.name.clone()),
            name_key: ActiveValue::Set(crate::util::normalize_key(&player.name)),
            email: ActiveValue::Set(player.email.clone()),
            phone: ActiveValue::Set(player.phone.clone()),
            user_id: ActiveValue::Set(player.user_id.map(|id| id.to_string())),
            is_active: ActiveValue::Set(player.is_active),
            created_at: ActiveValue::Set(player.created_at),
        }
    }
}

impl TryFrom<Model> for Player {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "player")?,
            name: model.name,
            email: model.email,
            phone: model.phone,
            user_id: model
                .user_id
                .as_deref()
                .map(|id| parse_uuid(id, "user"))
                .transpose()?,
            is_active: model.is_active,
            created_at: model.created_at,
        })
    }
}
