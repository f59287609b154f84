use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, DatabaseTransaction, DbErr, QueryFilter, QueryOrder,
    TransactionTrait, prelude::*, sea_query::OnConflict,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    EngineError, Obligation, ObligationAction, ObligationEntry, ObligationList,
    ObligationStatus, ProofStatus, ResultEngine, Session, SessionStatus,
    SplitCalculator, StatusCounts, VerifyDecision, obligations, payment_proofs, payments,
    players,
};

use super::{Engine, with_tx};

impl Engine {
    /// Returns the obligation of `payer_id` in `session_id`, creating it in
    /// `PENDING` when absent.
    ///
    /// The insert relies on the unique idempotency key: a concurrent insert of
    /// the same key is swallowed and the stored row is returned instead. The
    /// flag is `true` when this call created the row.
    pub(super) async fn create_or_get_obligation(
        &self,
        db: &DatabaseTransaction,
        session_id: Uuid,
        payer_id: Uuid,
        payee_id: Uuid,
        amount_minor: i64,
    ) -> ResultEngine<(Obligation, bool)> {
        let candidate = Obligation::new(session_id, payer_id, payee_id, amount_minor)?;

        let insert = obligations::Entity::insert(obligations::ActiveModel::from(&candidate))
            .on_conflict(
                OnConflict::column(obligations::Column::IdempotencyKey)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await;
        match insert {
            Ok(_) | Err(DbErr::RecordNotInserted) => {}
            Err(err) => return Err(err.into()),
        }

        let stored = obligations::Entity::find()
            .filter(obligations::Column::IdempotencyKey.eq(candidate.idempotency_key.clone()))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("obligation not exists".to_string()))?;
        let stored = Obligation::try_from(stored)?;
        let created = stored.id == candidate.id;
        if !created {
            debug!(
                obligation_id = %stored.id,
                key = %stored.idempotency_key,
                "obligation already exists"
            );
        }
        Ok((stored, created))
    }

    /// Applies `action` to `obligation`, conditioned on the status it was
    /// read with. Returns the obligation as stored afterwards.
    pub(super) async fn transition_obligation(
        &self,
        db: &DatabaseTransaction,
        obligation: Obligation,
        action: ObligationAction,
    ) -> ResultEngine<Obligation> {
        let next = obligation.status.apply(action)?;
        if next == obligation.status {
            debug!(obligation_id = %obligation.id, status = %next, "obligation unchanged");
            return Ok(obligation);
        }
        self.set_obligation_status(db, obligation.id, obligation.status, next)
            .await?;
        Ok(Obligation {
            status: next,
            updated_at: Utc::now(),
            ..obligation
        })
    }

    /// Obligations of a session with payer names and per-status counts.
    pub async fn list_obligations(
        &self,
        session_id: Uuid,
        host_id: Uuid,
    ) -> ResultEngine<ObligationList> {
        with_tx!(self, |db_tx| {
            let session = self.require_session_host(&db_tx, session_id, host_id).await?;
            let models = obligations::Entity::find()
                .filter(obligations::Column::SessionId.eq(session.id.to_string()))
                .order_by_asc(obligations::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            let payer_ids: Vec<String> = models.iter().map(|m| m.payer_id.clone()).collect();
            let names: HashMap<String, String> = players::Entity::find()
                .filter(players::Column::Id.is_in(payer_ids))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|p| (p.id, p.name))
                .collect();

            let mut items = Vec::with_capacity(models.len());
            for model in models {
                let payer_name = names.get(&model.payer_id).cloned().unwrap_or_default();
                items.push(ObligationEntry {
                    obligation: Obligation::try_from(model)?,
                    payer_name,
                });
            }
            let counts = StatusCounts::tally(items.iter().map(|i| &i.obligation.status));
            Ok(ObligationList { items, counts })
        })
    }

    /// Host shortcut: marks a payer as paid, creating the obligation if the
    /// split has not materialized it yet.
    pub async fn mark_player_paid(
        &self,
        session_id: Uuid,
        player_id: Uuid,
        host_id: Uuid,
    ) -> ResultEngine<Obligation> {
        with_tx!(self, |db_tx| {
            let session = self.require_session_host(&db_tx, session_id, host_id).await?;
            if session.status == SessionStatus::Closed {
                return Err(EngineError::SessionLocked(session.status));
            }
            let payers = self.active_payers(&db_tx, session.id).await?;
            if !payers.iter().any(|p| p.player_id == player_id) {
                return Err(EngineError::KeyNotFound("participant not exists".to_string()));
            }

            let amount_minor = self.current_share(&db_tx, &session, payers.len()).await?;
            let payee = self.require_user_player(&db_tx, session.host_id).await?;
            let (obligation, _) = self
                .create_or_get_obligation(&db_tx, session.id, player_id, payee.id, amount_minor)
                .await?;
            let obligation = self
                .transition_obligation(&db_tx, obligation, ObligationAction::HostForceVerify)
                .await?;

            info!(%session_id, %player_id, obligation_id = %obligation.id, "player marked as paid");
            Ok(obligation)
        })
    }

    /// Host review of a `MARKED_PAID` obligation. Rejection needs a reason and
    /// is mirrored on the latest payment's proof.
    pub async fn verify_obligation(
        &self,
        session_id: Uuid,
        obligation_id: Uuid,
        host_id: Uuid,
        decision: VerifyDecision,
    ) -> ResultEngine<Obligation> {
        let (action, proof_status, reason) = match decision {
            VerifyDecision::Approve => (ObligationAction::HostApprove, ProofStatus::Verified, None),
            VerifyDecision::Reject { reason } => {
                let reason = reason.trim().to_string();
                if reason.is_empty() {
                    return Err(EngineError::InvalidInput(
                        "a rejection reason is required".to_string(),
                    ));
                }
                (ObligationAction::HostReject, ProofStatus::Rejected, Some(reason))
            }
        };

        with_tx!(self, |db_tx| {
            let session = self.require_session_host(&db_tx, session_id, host_id).await?;
            let obligation = self.require_obligation(&db_tx, obligation_id).await?;
            if obligation.session_id != session.id {
                return Err(EngineError::KeyNotFound("obligation not exists".to_string()));
            }

            let obligation = self.transition_obligation(&db_tx, obligation, action).await?;
            self.review_latest_proof(&db_tx, obligation.id, proof_status, reason, host_id)
                .await?;

            info!(
                %session_id,
                %obligation_id,
                status = %obligation.status,
                "obligation reviewed"
            );
            Ok(obligation)
        })
    }

    /// Amount one payer owes right now: the frozen split once confirmed,
    /// otherwise the live ledger share.
    async fn current_share(
        &self,
        db: &DatabaseTransaction,
        session: &Session,
        payer_count: usize,
    ) -> ResultEngine<i64> {
        let total = match session.status {
            SessionStatus::SplitConfirmed | SessionStatus::Closed => session.total_amount_minor,
            _ => self.session_ledger(db, session.id).await?.total_minor()?,
        };
        SplitCalculator::per_person(total.unwrap_or(0), payer_count)
            .ok_or(EngineError::NoParticipants)
    }

    async fn review_latest_proof(
        &self,
        db: &DatabaseTransaction,
        obligation_id: Uuid,
        status: ProofStatus,
        reason: Option<String>,
        reviewer: Uuid,
    ) -> ResultEngine<()> {
        let Some(payment) = payments::Entity::find()
            .filter(payments::Column::ObligationId.eq(obligation_id.to_string()))
            .order_by_desc(payments::Column::Attempt)
            .one(db)
            .await?
        else {
            return Ok(());
        };
        let Some(proof) = payment_proofs::Entity::find()
            .filter(payment_proofs::Column::PaymentId.eq(payment.id))
            .order_by_desc(payment_proofs::Column::CreatedAt)
            .one(db)
            .await?
        else {
            return Ok(());
        };

        payment_proofs::ActiveModel {
            id: ActiveValue::Unchanged(proof.id),
            status: ActiveValue::Set(status.as_str().to_string()),
            rejection_reason: ActiveValue::Set(reason),
            verified_by: ActiveValue::Set(Some(reviewer.to_string())),
            verified_at: ActiveValue::Set(Some(Utc::now())),
            ..Default::default()
        }
        .update(db)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use sea_orm::{Database, TransactionTrait};

    use migration::MigratorTrait;

    use super::*;
    use crate::{NewPlayerCmd, NewSessionCmd};

    async fn engine() -> Engine {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        Engine::builder().database(db).build().await.unwrap()
    }

    async fn pending_obligation(engine: &Engine) -> Obligation {
        let (host, host_player) = engine.create_user("Hana", None).await.unwrap();
        let session = engine
            .create_session(host.id, NewSessionCmd::new("Futsal", Utc::now()))
            .await
            .unwrap();
        let added = engine
            .add_players(session.id, host.id, vec![NewPlayerCmd::new("Budi")])
            .await
            .unwrap();
        let db_tx = engine.database.begin().await.unwrap();
        let (obligation, created) = engine
            .create_or_get_obligation(&db_tx, session.id, added[0].player_id, host_player.id, 10)
            .await
            .unwrap();
        db_tx.commit().await.unwrap();
        assert!(created);
        obligation
    }

    #[tokio::test]
    async fn create_or_get_is_idempotent() {
        let engine = engine().await;
        let first = pending_obligation(&engine).await;

        let db_tx = engine.database.begin().await.unwrap();
        let (again, created) = engine
            .create_or_get_obligation(&db_tx, first.session_id, first.payer_id, first.payee_id, 999)
            .await
            .unwrap();
        db_tx.commit().await.unwrap();

        assert!(!created);
        assert_eq!(again.id, first.id);
        assert_eq!(again.amount_minor, 10);
    }

    #[tokio::test]
    async fn stale_transition_is_a_conflict() {
        let engine = engine().await;
        let stale = pending_obligation(&engine).await;
        let obligation_id = stale.id;

        let db_tx = engine.database.begin().await.unwrap();
        engine
            .transition_obligation(&db_tx, stale.clone(), ObligationAction::PayerReport)
            .await
            .unwrap();
        // `stale` still believes the obligation is PENDING.
        let err = engine
            .transition_obligation(&db_tx, stale, ObligationAction::HostForceVerify)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Conflict);

        let stored = engine.require_obligation(&db_tx, obligation_id).await.unwrap();
        assert_eq!(stored.status, ObligationStatus::MarkedPaid);
    }
}
