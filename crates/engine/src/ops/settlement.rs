use std::num::NonZeroUsize;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, TransactionTrait};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    EngineError, ObligationStatus, ResultEngine, Session, SessionStatus, SessionTransition,
    SettlementSummary, SplitCalculator, SplitOutcome, StatusCounts, sessions,
};

use super::{Engine, with_tx};

impl Engine {
    /// Materializes one obligation per active non-host participant, then
    /// confirms the split and freezes the session total.
    ///
    /// Obligations that already exist (for example from
    /// [`Engine::mark_player_paid`]) are kept as they are.
    pub async fn generate_split(&self, session_id: Uuid, host_id: Uuid) -> ResultEngine<SplitOutcome> {
        with_tx!(self, |db_tx| {
            let session = self.require_session_host(&db_tx, session_id, host_id).await?;
            let next = session.status.apply(SessionTransition::ConfirmSplit)?;

            let payers = self.active_payers(&db_tx, session.id).await?;
            let payer_count = NonZeroUsize::new(payers.len()).ok_or(EngineError::NoParticipants)?;
            let total_minor = self
                .session_ledger(&db_tx, session.id)
                .await?
                .total_minor()?
                .unwrap_or(0);
            let plan = SplitCalculator::plan(total_minor, payer_count)?;
            let payee = self.require_user_player(&db_tx, session.host_id).await?;

            let mut obligations = Vec::with_capacity(payers.len());
            for payer in &payers {
                let (obligation, _) = self
                    .create_or_get_obligation(
                        &db_tx,
                        session.id,
                        payer.player_id,
                        payee.id,
                        plan.per_person_minor,
                    )
                    .await?;
                obligations.push(obligation);
            }

            self.set_session_status(&db_tx, session.id, session.status, next)
                .await?;
            let model = sessions::ActiveModel {
                id: ActiveValue::Unchanged(session.id.to_string()),
                total_amount_minor: ActiveValue::Set(Some(total_minor)),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            let session = Session::try_from(model)?;

            if plan.remainder_minor != 0 {
                warn!(
                    %session_id,
                    remainder_minor = plan.remainder_minor,
                    "split does not divide evenly"
                );
            }
            info!(
                %session_id,
                payers = plan.payer_count,
                per_person_minor = plan.per_person_minor,
                total_minor,
                "split generated"
            );
            Ok(SplitOutcome {
                session,
                plan,
                obligations,
            })
        })
    }

    /// Closes a split-confirmed session once every obligation is verified.
    pub async fn close_session(
        &self,
        session_id: Uuid,
        host_id: Uuid,
    ) -> ResultEngine<SettlementSummary> {
        with_tx!(self, |db_tx| {
            let session = self.require_session_host(&db_tx, session_id, host_id).await?;
            let next = session.status.apply(SessionTransition::Close)?;

            let obligations = self.session_obligations(&db_tx, session.id).await?;
            let counts = StatusCounts::tally(obligations.iter().map(|o| &o.status));
            if counts.unverified() > 0 {
                return Err(EngineError::PendingObligations {
                    count: counts.unverified(),
                });
            }

            self.set_session_status(&db_tx, session.id, session.status, next)
                .await?;
            let total_collected_minor = obligations
                .iter()
                .filter(|o| o.status == ObligationStatus::Verified)
                .try_fold(0i64, |acc, o| acc.checked_add(o.amount_minor))
                .ok_or_else(|| EngineError::InvalidAmount("collected total overflow".to_string()))?;
            let participant_count = self.active_payers(&db_tx, session.id).await?.len() as u64;

            info!(%session_id, total_collected_minor, "session closed");
            Ok(SettlementSummary {
                session: Session {
                    status: SessionStatus::Closed,
                    updated_at: Utc::now(),
                    ..session
                },
                total_collected_minor,
                participant_count,
            })
        })
    }
}
