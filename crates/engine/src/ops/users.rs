use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, DatabaseTransaction, PaginatorTrait, QueryFilter,
    TransactionTrait, prelude::*,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    EngineError, ObligationStatus, Player, ResultEngine, SessionStatus, UpdateProfileCmd, User,
    UserProfile, obligations, players, sessions, users, util::bounded_text,
};

use super::{Engine, ensure_max_len, normalize_email, normalize_optional_text, with_tx};

/// Validated profile patch. `Some(None)` clears an optional field.
struct ProfilePatch {
    name: Option<String>,
    email: Option<Option<String>>,
    phone: Option<Option<String>>,
}

impl ProfilePatch {
    fn validate(cmd: UpdateProfileCmd) -> ResultEngine<Self> {
        if cmd.is_empty() {
            return Err(EngineError::InvalidInput("nothing to update".to_string()));
        }
        let name = cmd
            .name
            .as_deref()
            .map(|name| bounded_text(name, "name", 2, 255))
            .transpose()?;
        let email = cmd.email.as_deref().map(|email| normalize_email(Some(email)));
        ensure_max_len(email.as_ref().and_then(|e| e.as_deref()), "email", 255)?;
        let phone = cmd
            .phone
            .as_deref()
            .map(|phone| normalize_optional_text(Some(phone)));
        ensure_max_len(phone.as_ref().and_then(|p| p.as_deref()), "phone", 50)?;
        Ok(Self { name, email, phone })
    }
}

impl Engine {
    /// Creates a host account together with its linked player record.
    pub async fn create_user(&self, name: &str, email: Option<&str>) -> ResultEngine<(User, Player)> {
        let name = bounded_text(name, "name", 2, 255)?;
        let email = normalize_email(email);
        with_tx!(self, |db_tx| {
            let user = User {
                id: Uuid::new_v4(),
                name: name.clone(),
                email: email.clone(),
                is_active: true,
                created_at: Utc::now(),
            };
            users::ActiveModel::from(&user).insert(&db_tx).await?;

            let player = Player::new(name, email, None).linked_to(user.id);
            players::ActiveModel::from(&player).insert(&db_tx).await?;

            info!(user_id = %user.id, player_id = %player.id, "user created");
            Ok((user, player))
        })
    }

    /// Returns the player record linked to `user_id`.
    pub async fn user_player(&self, user_id: Uuid) -> ResultEngine<Player> {
        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, user_id).await?;
            self.require_user_player(&db_tx, user_id).await
        })
    }

    pub async fn user_profile(&self, user_id: Uuid) -> ResultEngine<UserProfile> {
        with_tx!(self, |db_tx| {
            let user = self.require_user(&db_tx, user_id).await?;
            let player = self.require_user_player(&db_tx, user_id).await?;
            Ok(UserProfile { user, player })
        })
    }

    /// Updates the account and mirrors the change onto its linked player.
    /// `phone` only exists on the player record.
    pub async fn update_user(
        &self,
        user_id: Uuid,
        cmd: UpdateProfileCmd,
    ) -> ResultEngine<UserProfile> {
        let patch = ProfilePatch::validate(cmd)?;
        with_tx!(self, |db_tx| {
            let mut user = self.require_user(&db_tx, user_id).await?;
            let player = self.require_user_player(&db_tx, user_id).await?;

            if patch.name.is_some() || patch.email.is_some() {
                let mut active = users::ActiveModel {
                    id: ActiveValue::Unchanged(user.id.to_string()),
                    ..Default::default()
                };
                if let Some(name) = &patch.name {
                    active.name = ActiveValue::Set(name.clone());
                }
                if let Some(email) = &patch.email {
                    active.email = ActiveValue::Set(email.clone());
                }
                user = User::try_from(active.update(&db_tx).await?)?;
            }
            let player = self.patch_player(&db_tx, player, &patch).await?;

            info!(%user_id, "user profile updated");
            Ok(UserProfile { user, player })
        })
    }

    /// Soft-deletes an account and its linked player.
    ///
    /// Refused while the user hosts an open session that still has
    /// unverified obligations. Obligations the linked player owes elsewhere
    /// stay in the other hosts' ledgers.
    pub async fn delete_user(&self, user_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let user = self.require_user(&db_tx, user_id).await?;

            let open_sessions = sessions::Entity::find()
                .filter(sessions::Column::HostId.eq(user.id.to_string()))
                .filter(sessions::Column::IsActive.eq(true))
                .filter(sessions::Column::Status.ne(SessionStatus::Closed.as_str()))
                .all(&db_tx)
                .await?;
            let mut unsettled = 0;
            for session in &open_sessions {
                let open = obligations::Entity::find()
                    .filter(obligations::Column::SessionId.eq(session.id.as_str()))
                    .filter(obligations::Column::Status.ne(ObligationStatus::Verified.as_str()))
                    .count(&db_tx)
                    .await?;
                if open > 0 {
                    unsettled += 1;
                }
            }
            if unsettled > 0 {
                warn!(%user_id, sessions = unsettled, "account deletion refused");
                return Err(EngineError::HostingUnsettled {
                    sessions: unsettled,
                });
            }

            users::ActiveModel {
                id: ActiveValue::Unchanged(user.id.to_string()),
                is_active: ActiveValue::Set(false),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            let player = self.require_user_player(&db_tx, user_id).await?;
            players::ActiveModel {
                id: ActiveValue::Unchanged(player.id.to_string()),
                is_active: ActiveValue::Set(false),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;

            info!(%user_id, player_id = %player.id, "user deleted");
            Ok(())
        })
    }

    pub async fn player_profile(&self, player_id: Uuid) -> ResultEngine<Player> {
        with_tx!(self, |db_tx| self.require_player(&db_tx, player_id).await)
    }

    /// Updates a player record only; the linked account keeps its own name
    /// and email.
    pub async fn update_player(
        &self,
        player_id: Uuid,
        cmd: UpdateProfileCmd,
    ) -> ResultEngine<Player> {
        let patch = ProfilePatch::validate(cmd)?;
        with_tx!(self, |db_tx| {
            let player = self.require_player(&db_tx, player_id).await?;
            let player = self.patch_player(&db_tx, player, &patch).await?;
            info!(%player_id, "player profile updated");
            Ok(player)
        })
    }

    async fn patch_player(
        &self,
        db: &DatabaseTransaction,
        player: Player,
        patch: &ProfilePatch,
    ) -> ResultEngine<Player> {
        let mut active = players::ActiveModel {
            id: ActiveValue::Unchanged(player.id.to_string()),
            ..Default::default()
        };
        let mut changed = false;
        if let Some(name) = &patch.name {
            active.name = ActiveValue::Set(name.clone());
            active.name_key = ActiveValue::Set(crate::util::normalize_key(name));
            changed = true;
        }
        if let Some(email) = &patch.email {
            active.email = ActiveValue::Set(email.clone());
            changed = true;
        }
        if let Some(phone) = &patch.phone {
            active.phone = ActiveValue::Set(phone.clone());
            changed = true;
        }
        if !changed {
            return Ok(player);
        }
        Player::try_from(active.update(db).await?)
    }
}
