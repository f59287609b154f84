use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, Obligation, Participant, ParticipantRole, Player, ResultEngine, Session, User,
    obligations, participants, players, sessions, users,
};

use super::Engine;

impl Engine {
    /// Loads an active (not soft-deleted) session.
    pub(super) async fn require_session(
        &self,
        db: &DatabaseTransaction,
        session_id: Uuid,
    ) -> ResultEngine<Session> {
        let model = sessions::Entity::find_by_id(session_id.to_string())
            .filter(sessions::Column::IsActive.eq(true))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("session not exists".to_string()))?;
        Session::try_from(model)
    }

    /// Loads an active session owned by `user_id`.
    pub(super) async fn require_session_host(
        &self,
        db: &DatabaseTransaction,
        session_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<Session> {
        let session = self.require_session(db, session_id).await?;
        if session.host_id != user_id {
            return Err(EngineError::Forbidden(
                "only the host can change this session".to_string(),
            ));
        }
        Ok(session)
    }

    /// Loads an active (not deleted) account.
    pub(super) async fn require_user(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
    ) -> ResultEngine<User> {
        let model = users::Entity::find_by_id(user_id.to_string())
            .filter(users::Column::IsActive.eq(true))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
        User::try_from(model)
    }

    pub(super) async fn require_user_exists(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
    ) -> ResultEngine<()> {
        self.require_user(db, user_id).await.map(|_| ())
    }

    /// The player record linked to a user account.
    pub(super) async fn require_user_player(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
    ) -> ResultEngine<Player> {
        let model = players::Entity::find()
            .filter(players::Column::UserId.eq(user_id.to_string()))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("player not exists".to_string()))?;
        Player::try_from(model)
    }

    pub(super) async fn require_player(
        &self,
        db: &DatabaseTransaction,
        player_id: Uuid,
    ) -> ResultEngine<Player> {
        let model = players::Entity::find_by_id(player_id.to_string())
            .filter(players::Column::IsActive.eq(true))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("player not exists".to_string()))?;
        Player::try_from(model)
    }

    /// Active roster of a session, host included.
    pub(super) async fn active_participants(
        &self,
        db: &DatabaseTransaction,
        session_id: Uuid,
    ) -> ResultEngine<Vec<Participant>> {
        participants::Entity::find()
            .filter(participants::Column::SessionId.eq(session_id.to_string()))
            .filter(participants::Column::IsActive.eq(true))
            .all(db)
            .await?
            .into_iter()
            .map(Participant::try_from)
            .collect()
    }

    /// Active non-host participants: the people who owe.
    pub(super) async fn active_payers(
        &self,
        db: &DatabaseTransaction,
        session_id: Uuid,
    ) -> ResultEngine<Vec<Participant>> {
        Ok(self
            .active_participants(db, session_id)
            .await?
            .into_iter()
            .filter(|p| p.role == ParticipantRole::Player)
            .collect())
    }

    pub(super) async fn find_participant(
        &self,
        db: &DatabaseTransaction,
        session_id: Uuid,
        player_id: Uuid,
    ) -> ResultEngine<Option<Participant>> {
        participants::Entity::find()
            .filter(participants::Column::SessionId.eq(session_id.to_string()))
            .filter(participants::Column::PlayerId.eq(player_id.to_string()))
            .one(db)
            .await?
            .map(Participant::try_from)
            .transpose()
    }

    /// Role of `user_id` in a session it may view, or `KeyNotFound` when the
    /// user is neither the host nor an active participant.
    pub(super) async fn require_session_viewer(
        &self,
        db: &DatabaseTransaction,
        session: &Session,
        user_id: Uuid,
    ) -> ResultEngine<ParticipantRole> {
        if session.host_id == user_id {
            return Ok(ParticipantRole::Host);
        }
        let player = self.require_user_player(db, user_id).await?;
        match self.find_participant(db, session.id, player.id).await? {
            Some(participant) if participant.is_active => Ok(participant.role),
            _ => Err(EngineError::KeyNotFound("session not exists".to_string())),
        }
    }

    pub(super) async fn require_obligation(
        &self,
        db: &DatabaseTransaction,
        obligation_id: Uuid,
    ) -> ResultEngine<Obligation> {
        let model = obligations::Entity::find_by_id(obligation_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("obligation not exists".to_string()))?;
        Obligation::try_from(model)
    }

    /// Loads an obligation and checks that `player_id` is its payer.
    pub(super) async fn require_payer_obligation(
        &self,
        db: &DatabaseTransaction,
        obligation_id: Uuid,
        player_id: Uuid,
    ) -> ResultEngine<Obligation> {
        let obligation = self.require_obligation(db, obligation_id).await?;
        if obligation.payer_id != player_id {
            return Err(EngineError::NotPayer(
                "obligation belongs to another player".to_string(),
            ));
        }
        Ok(obligation)
    }

    pub(super) async fn session_obligations(
        &self,
        db: &DatabaseTransaction,
        session_id: Uuid,
    ) -> ResultEngine<Vec<Obligation>> {
        obligations::Entity::find()
            .filter(obligations::Column::SessionId.eq(session_id.to_string()))
            .all(db)
            .await?
            .into_iter()
            .map(Obligation::try_from)
            .collect()
    }
}
