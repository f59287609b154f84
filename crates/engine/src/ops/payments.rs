use sea_orm::{
    ActiveModelTrait, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
};
use tracing::info;
use uuid::Uuid;

use crate::{
    EngineError, Obligation, ObligationAction, ObligationStatus, Payment, PaymentProof,
    PaymentStatusView, PlayerObligationDetail, PlayerObligationItem, PlayerObligationTotals,
    PlayerObligations, ReportPaymentCmd, ResultEngine, Session, SplitCalculator,
    obligations, payment_proofs, payments, sessions, users,
};

use super::{Engine, ensure_max_len, normalize_optional_text, with_tx};

impl Engine {
    /// Obligations owed by `player_id`, newest first, with a summary.
    ///
    /// Obligations of soft-deleted sessions are included: they are history.
    pub async fn player_obligations(
        &self,
        player_id: Uuid,
        status: Option<ObligationStatus>,
    ) -> ResultEngine<PlayerObligations> {
        with_tx!(self, |db_tx| {
            self.require_player(&db_tx, player_id).await?;
            let mut select = obligations::Entity::find()
                .filter(obligations::Column::PayerId.eq(player_id.to_string()));
            if let Some(status) = status {
                select = select.filter(obligations::Column::Status.eq(status.as_str()));
            }
            let models = select
                .order_by_desc(obligations::Column::CreatedAt)
                .all(&db_tx)
                .await?;

            let mut items = Vec::with_capacity(models.len());
            let mut summary = PlayerObligationTotals::default();
            for model in models {
                let obligation = Obligation::try_from(model)?;
                match obligation.status {
                    ObligationStatus::Pending => summary.pending_count += 1,
                    _ => summary.paid_count += 1,
                }
                if !obligation.status.is_verified() {
                    summary.total_owed_minor += obligation.amount_minor;
                }
                items.push(self.player_obligation_item(&db_tx, obligation).await?);
            }
            Ok(PlayerObligations { items, summary })
        })
    }

    /// One obligation of `player_id` with the session's expenses and payment
    /// history.
    pub async fn player_obligation(
        &self,
        obligation_id: Uuid,
        player_id: Uuid,
    ) -> ResultEngine<PlayerObligationDetail> {
        with_tx!(self, |db_tx| {
            let obligation = self
                .require_payer_obligation(&db_tx, obligation_id, player_id)
                .await?;
            let ledger = self.session_ledger(&db_tx, obligation.session_id).await?;
            let total_minor = ledger.total_minor()?;
            let payer_count = self.active_payers(&db_tx, obligation.session_id).await?.len();
            let session = self.session_any(&db_tx, obligation.session_id).await?;
            let per_person_minor = SplitCalculator::per_person(
                session.total_amount_minor.or(total_minor).unwrap_or(0),
                payer_count,
            );
            let payments = self.obligation_payments(&db_tx, obligation.id).await?;
            let item = self.player_obligation_item(&db_tx, obligation).await?;

            Ok(PlayerObligationDetail {
                item,
                expenses: ledger.into_items(),
                total_minor,
                per_person_minor,
                payments,
            })
        })
    }

    /// Payer self-report: `PENDING | REJECTED → MARKED_PAID` and a new
    /// payment attempt for the full obligation amount.
    pub async fn report_payment(
        &self,
        obligation_id: Uuid,
        player_id: Uuid,
        cmd: ReportPaymentCmd,
    ) -> ResultEngine<Payment> {
        let reference_number = normalize_optional_text(cmd.reference_number.as_deref());
        let notes = normalize_optional_text(cmd.notes.as_deref());
        ensure_max_len(reference_number.as_deref(), "reference number", 255)?;
        ensure_max_len(notes.as_deref(), "notes", 500)?;

        with_tx!(self, |db_tx| {
            let obligation = self
                .require_payer_obligation(&db_tx, obligation_id, player_id)
                .await?;
            let attempt = self
                .obligation_payments(&db_tx, obligation.id)
                .await?
                .last()
                .map_or(1, |p| p.attempt + 1);
            let obligation = self
                .transition_obligation(&db_tx, obligation, ObligationAction::PayerReport)
                .await?;

            let payment = Payment {
                id: Uuid::new_v4(),
                obligation_id: obligation.id,
                attempt,
                method: cmd.method,
                amount_minor: obligation.amount_minor,
                reference_number,
                notes,
                paid_at: cmd.paid_at,
            };
            payments::ActiveModel::from(&payment).insert(&db_tx).await?;

            info!(
                %obligation_id,
                %player_id,
                attempt,
                method = %payment.method,
                "payment reported"
            );
            Ok(payment)
        })
    }

    /// A payment of `player_id` with its obligation status and latest proof.
    pub async fn payment_status(
        &self,
        payment_id: Uuid,
        player_id: Uuid,
    ) -> ResultEngine<PaymentStatusView> {
        with_tx!(self, |db_tx| {
            let payment = self.require_payment(&db_tx, payment_id).await?;
            let obligation = self
                .require_payer_obligation(&db_tx, payment.obligation_id, player_id)
                .await?;
            let latest_proof = self.latest_proof(&db_tx, payment.id).await?;
            Ok(PaymentStatusView {
                payment,
                obligation_status: obligation.status,
                latest_proof,
            })
        })
    }

    /// Attaches evidence to the latest payment of a `MARKED_PAID` obligation.
    /// `media_ref` is opaque to the engine.
    pub async fn attach_payment_proof(
        &self,
        payment_id: Uuid,
        player_id: Uuid,
        media_ref: &str,
    ) -> ResultEngine<PaymentProof> {
        let media_ref = media_ref.trim().to_string();
        if media_ref.is_empty() {
            return Err(EngineError::InvalidInput(
                "media reference must not be empty".to_string(),
            ));
        }
        ensure_max_len(Some(media_ref.as_str()), "media reference", 1024)?;

        with_tx!(self, |db_tx| {
            let payment = self.require_payment(&db_tx, payment_id).await?;
            let obligation = self
                .require_payer_obligation(&db_tx, payment.obligation_id, player_id)
                .await?;
            if obligation.status != ObligationStatus::MarkedPaid {
                return Err(EngineError::InvalidTransition(format!(
                    "proofs are accepted only while MARKED_PAID, obligation is {}",
                    obligation.status
                )));
            }
            let latest = self
                .obligation_payments(&db_tx, obligation.id)
                .await?
                .last()
                .map(|p| p.id);
            if latest != Some(payment.id) {
                return Err(EngineError::InvalidTransition(
                    "proofs are accepted only on the latest payment".to_string(),
                ));
            }

            let proof = PaymentProof::new(payment.id, media_ref);
            payment_proofs::ActiveModel::from(&proof)
                .insert(&db_tx)
                .await?;
            info!(%payment_id, proof_id = %proof.id, "payment proof attached");
            Ok(proof)
        })
    }

    async fn player_obligation_item(
        &self,
        db: &DatabaseTransaction,
        obligation: Obligation,
    ) -> ResultEngine<PlayerObligationItem> {
        let session = self.session_any(db, obligation.session_id).await?;
        let host_name = users::Entity::find_by_id(session.host_id.to_string())
            .one(db)
            .await?
            .map(|u| u.name)
            .unwrap_or_default();
        let latest_payment = self.obligation_payments(db, obligation.id).await?.pop();
        let latest_proof = match &latest_payment {
            Some(payment) => self.latest_proof(db, payment.id).await?,
            None => None,
        };
        Ok(PlayerObligationItem {
            obligation,
            session_name: session.name,
            session_date: session.event_date,
            host_name,
            latest_payment,
            latest_proof,
        })
    }

    /// Loads a session whether or not it is soft-deleted.
    pub(super) async fn session_any(
        &self,
        db: &DatabaseTransaction,
        session_id: Uuid,
    ) -> ResultEngine<Session> {
        let model = sessions::Entity::find_by_id(session_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("session not exists".to_string()))?;
        Session::try_from(model)
    }

    /// Payments of an obligation by ascending attempt.
    async fn obligation_payments(
        &self,
        db: &DatabaseTransaction,
        obligation_id: Uuid,
    ) -> ResultEngine<Vec<Payment>> {
        payments::Entity::find()
            .filter(payments::Column::ObligationId.eq(obligation_id.to_string()))
            .order_by_asc(payments::Column::Attempt)
            .all(db)
            .await?
            .into_iter()
            .map(Payment::try_from)
            .collect()
    }

    async fn require_payment(
        &self,
        db: &DatabaseTransaction,
        payment_id: Uuid,
    ) -> ResultEngine<Payment> {
        let model = payments::Entity::find_by_id(payment_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("payment not exists".to_string()))?;
        Payment::try_from(model)
    }

    async fn latest_proof(
        &self,
        db: &DatabaseTransaction,
        payment_id: Uuid,
    ) -> ResultEngine<Option<PaymentProof>> {
        payment_proofs::Entity::find()
            .filter(payment_proofs::Column::PaymentId.eq(payment_id.to_string()))
            .order_by_desc(payment_proofs::Column::CreatedAt)
            .one(db)
            .await?
            .map(PaymentProof::try_from)
            .transpose()
    }
}
