use std::collections::HashSet;

use sea_orm::{ActiveModelTrait, ActiveValue, TransactionTrait};
use tracing::info;
use uuid::Uuid;

use crate::{
    EngineError, Participant, ParticipantRole, ResultEngine, Session, SessionStatus,
    SessionTransition, participants,
};

use super::{Engine, with_tx};

impl Engine {
    /// `DRAFT → PROCESSING_FACES`: the roster is handed to the confirmation
    /// collaborator.
    pub async fn start_roster_confirmation(
        &self,
        session_id: Uuid,
        host_id: Uuid,
    ) -> ResultEngine<Session> {
        with_tx!(self, |db_tx| {
            let session = self.require_session_host(&db_tx, session_id, host_id).await?;
            let next = session
                .status
                .apply(SessionTransition::StartRosterConfirmation)?;
            self.set_session_status(&db_tx, session.id, session.status, next)
                .await?;
            info!(%session_id, "roster confirmation started");
            self.require_session(&db_tx, session.id).await
        })
    }

    /// `PROCESSING_FACES → READY_TO_SPLIT`: awaits the collaborator and adds
    /// the confirmed players missing from the roster.
    pub async fn confirm_roster(&self, session_id: Uuid, host_id: Uuid) -> ResultEngine<Session> {
        let roster: Vec<Uuid> = with_tx!(self, |db_tx| {
            let session = self.require_session_host(&db_tx, session_id, host_id).await?;
            session.status.apply(SessionTransition::ConfirmRoster)?;
            let roster = self.active_participants(&db_tx, session.id).await?;
            Ok::<_, EngineError>(roster.into_iter().map(|p| p.player_id).collect())
        })?;

        // No transaction is held while the collaborator works; the status
        // update below is conditioned on PROCESSING_FACES instead.
        let confirmed = self.roster.confirm(session_id, &roster).await?;

        with_tx!(self, |db_tx| {
            let session = self.require_session_host(&db_tx, session_id, host_id).await?;
            let next = session.status.apply(SessionTransition::ConfirmRoster)?;

            let known: HashSet<Uuid> = roster.iter().copied().collect();
            let mut added = 0usize;
            for player_id in confirmed.into_iter().filter(|id| !known.contains(id)) {
                self.require_player(&db_tx, player_id).await?;
                match self.find_participant(&db_tx, session.id, player_id).await? {
                    Some(existing) if existing.is_active => {}
                    Some(existing) => {
                        participants::ActiveModel {
                            id: ActiveValue::Unchanged(existing.id.to_string()),
                            is_active: ActiveValue::Set(true),
                            ..Default::default()
                        }
                        .update(&db_tx)
                        .await?;
                        added += 1;
                    }
                    None => {
                        let participant =
                            Participant::new(session.id, player_id, ParticipantRole::Player);
                        participants::ActiveModel::from(&participant)
                            .insert(&db_tx)
                            .await?;
                        added += 1;
                    }
                }
            }

            self.set_session_status(&db_tx, session.id, SessionStatus::ProcessingFaces, next)
                .await?;
            info!(%session_id, added, "roster confirmed");
            self.require_session(&db_tx, session.id).await
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::Utc;
    use sea_orm::Database;

    use migration::MigratorTrait;

    use super::*;
    use crate::{NewSessionCmd, RosterConfirmer};

    #[derive(Debug)]
    struct AddPlayer(Uuid);

    #[async_trait]
    impl RosterConfirmer for AddPlayer {
        async fn confirm(&self, _session_id: Uuid, roster: &[Uuid]) -> ResultEngine<Vec<Uuid>> {
            let mut confirmed = roster.to_vec();
            confirmed.push(self.0);
            Ok(confirmed)
        }
    }

    #[tokio::test]
    async fn confirmed_players_join_the_roster() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        let bootstrap = Engine::builder().database(db.clone()).build().await.unwrap();
        let (host, _) = bootstrap.create_user("Hana", None).await.unwrap();
        let (_, guest) = bootstrap.create_user("Gita", None).await.unwrap();

        let engine = Engine::builder()
            .database(db)
            .roster_confirmer(Arc::new(AddPlayer(guest.id)))
            .build()
            .await
            .unwrap();
        let session = engine
            .create_session(host.id, NewSessionCmd::new("Badminton", Utc::now()))
            .await
            .unwrap();

        let session = engine
            .start_roster_confirmation(session.id, host.id)
            .await
            .unwrap();
        assert_eq!(session.status, SessionStatus::ProcessingFaces);

        let session = engine.confirm_roster(session.id, host.id).await.unwrap();
        assert_eq!(session.status, SessionStatus::ReadyToSplit);

        let db_tx = engine.database.begin().await.unwrap();
        let payers = engine.active_payers(&db_tx, session.id).await.unwrap();
        assert_eq!(payers.len(), 1);
        assert_eq!(payers[0].player_id, guest.id);
    }

    #[tokio::test]
    async fn confirm_requires_processing_faces() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        let engine = Engine::builder().database(db).build().await.unwrap();
        let (host, _) = engine.create_user("Hana", None).await.unwrap();
        let session = engine
            .create_session(host.id, NewSessionCmd::new("Badminton", Utc::now()))
            .await
            .unwrap();

        let err = engine.confirm_roster(session.id, host.id).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidTransition(_)));
    }
}
