use sea_orm::{
    ActiveModelTrait, ActiveValue, DatabaseTransaction, QueryFilter, TransactionTrait,
    prelude::*,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    EngineError, NewPlayerCmd, Participant, ParticipantRole, Player, ResultEngine,
    participants, players,
    util::{bounded_text, normalize_key},
};

use super::{Engine, ensure_max_len, normalize_email, normalize_optional_text, with_tx};

impl Engine {
    /// Adds players to a session roster, creating unknown players on the fly.
    ///
    /// Returns the participants that were added or reactivated; players that
    /// are already on the roster are skipped.
    pub async fn add_players(
        &self,
        session_id: Uuid,
        host_id: Uuid,
        new_players: Vec<NewPlayerCmd>,
    ) -> ResultEngine<Vec<Participant>> {
        if new_players.is_empty() {
            return Err(EngineError::InvalidInput(
                "at least one player is required".to_string(),
            ));
        }
        let mut validated = Vec::with_capacity(new_players.len());
        for cmd in new_players {
            let name = bounded_text(&cmd.name, "player name", 1, 255)?;
            let email = normalize_email(cmd.email.as_deref());
            let phone = normalize_optional_text(cmd.phone.as_deref());
            ensure_max_len(email.as_deref(), "email", 255)?;
            ensure_max_len(phone.as_deref(), "phone", 50)?;
            validated.push(NewPlayerCmd { name, email, phone });
        }

        with_tx!(self, |db_tx| {
            let session = self.require_session_host(&db_tx, session_id, host_id).await?;
            session.status.ensure_editable()?;

            let mut added = Vec::new();
            for cmd in &validated {
                let player = self.find_or_create_player(&db_tx, cmd).await?;
                match self.find_participant(&db_tx, session.id, player.id).await? {
                    Some(existing) if existing.is_active => {
                        debug!(%session_id, player_id = %player.id, "player already on roster");
                    }
                    Some(existing) => {
                        let model = participants::ActiveModel {
                            id: ActiveValue::Unchanged(existing.id.to_string()),
                            is_active: ActiveValue::Set(true),
                            ..Default::default()
                        }
                        .update(&db_tx)
                        .await?;
                        added.push(Participant::try_from(model)?);
                    }
                    None => {
                        let participant =
                            Participant::new(session.id, player.id, ParticipantRole::Player);
                        participants::ActiveModel::from(&participant)
                            .insert(&db_tx)
                            .await?;
                        added.push(participant);
                    }
                }
            }

            info!(%session_id, added = added.len(), "players added");
            Ok(added)
        })
    }

    /// Deactivates a player's participation. The host cannot be removed.
    pub async fn remove_player(
        &self,
        session_id: Uuid,
        player_id: Uuid,
        host_id: Uuid,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let session = self.require_session_host(&db_tx, session_id, host_id).await?;
            session.status.ensure_editable()?;

            let participant = self
                .find_participant(&db_tx, session.id, player_id)
                .await?
                .filter(|p| p.is_active)
                .ok_or_else(|| EngineError::KeyNotFound("participant not exists".to_string()))?;
            if participant.role == ParticipantRole::Host {
                return Err(EngineError::Forbidden(
                    "the host cannot be removed from a session".to_string(),
                ));
            }

            participants::ActiveModel {
                id: ActiveValue::Unchanged(participant.id.to_string()),
                is_active: ActiveValue::Set(false),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;

            info!(%session_id, %player_id, "player removed");
            Ok(())
        })
    }

    /// Matches by email when one is given, otherwise by normalized name among
    /// players without email; creates the player when nothing matches.
    async fn find_or_create_player(
        &self,
        db: &DatabaseTransaction,
        cmd: &NewPlayerCmd,
    ) -> ResultEngine<Player> {
        let existing = match cmd.email.as_deref() {
            Some(email) => {
                players::Entity::find()
                    .filter(players::Column::Email.eq(email))
                    .filter(players::Column::IsActive.eq(true))
                    .one(db)
                    .await?
            }
            None => {
                players::Entity::find()
                    .filter(players::Column::NameKey.eq(normalize_key(&cmd.name)))
                    .filter(players::Column::Email.is_null())
                    .filter(players::Column::IsActive.eq(true))
                    .one(db)
                    .await?
            }
        };
        if let Some(model) = existing {
            return Player::try_from(model);
        }

        let player = Player::new(cmd.name.clone(), cmd.email.clone(), cmd.phone.clone());
        players::ActiveModel::from(&player).insert(db).await?;
        debug!(player_id = %player.id, "player created");
        Ok(player)
    }
}
