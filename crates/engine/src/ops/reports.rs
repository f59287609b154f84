use sea_orm::{PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    HostSummary, Obligation, ObligationStatus, ParticipantRole, PayerSummary, PaymentSummary,
    PlayerSessionFilter, PlayerSessionItem, ResultEngine, Session, SessionStatus, obligations,
    participants, sessions, users,
};

use super::{Engine, with_tx};

/// Splits obligation amounts into (verified, not verified) sums.
fn settled_and_open(obligations: &[Obligation]) -> (i64, i64) {
    obligations.iter().fold((0, 0), |(settled, open), o| {
        if o.status == ObligationStatus::Verified {
            (settled + o.amount_minor, open)
        } else {
            (settled, open + o.amount_minor)
        }
    })
}

impl Engine {
    /// Money collected as host and paid as player by `user_id`.
    pub async fn payment_summary(&self, user_id: Uuid) -> ResultEngine<PaymentSummary> {
        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, user_id).await?;

            let hosted = sessions::Entity::find()
                .filter(sessions::Column::HostId.eq(user_id.to_string()))
                .filter(sessions::Column::IsActive.eq(true))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Session::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;
            let mut as_host = HostSummary {
                total_sessions: hosted.len() as u64,
                active_sessions: hosted
                    .iter()
                    .filter(|s| s.status != SessionStatus::Closed)
                    .count() as u64,
                ..HostSummary::default()
            };
            for session in &hosted {
                let (collected, pending) =
                    settled_and_open(&self.session_obligations(&db_tx, session.id).await?);
                as_host.total_collected_minor += collected;
                as_host.pending_minor += pending;
            }

            let player = self.require_user_player(&db_tx, user_id).await?;
            let joined = participants::Entity::find()
                .filter(participants::Column::PlayerId.eq(player.id.to_string()))
                .filter(participants::Column::IsActive.eq(true))
                .filter(participants::Column::Role.eq(ParticipantRole::Player.as_str()))
                .count(&db_tx)
                .await?;
            let owed = obligations::Entity::find()
                .filter(obligations::Column::PayerId.eq(player.id.to_string()))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Obligation::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;
            let (total_paid_minor, pending_minor) = settled_and_open(&owed);

            Ok(PaymentSummary {
                as_host,
                as_player: PayerSummary {
                    total_sessions: joined,
                    total_paid_minor,
                    pending_minor,
                },
            })
        })
    }

    /// Sessions `player_id` takes part in, with the player's own obligation.
    pub async fn player_sessions(
        &self,
        player_id: Uuid,
        filter: PlayerSessionFilter,
    ) -> ResultEngine<Vec<PlayerSessionItem>> {
        with_tx!(self, |db_tx| {
            self.require_player(&db_tx, player_id).await?;
            let participations = participants::Entity::find()
                .filter(participants::Column::PlayerId.eq(player_id.to_string()))
                .filter(participants::Column::IsActive.eq(true))
                .filter(participants::Column::Role.eq(ParticipantRole::Player.as_str()))
                .order_by_desc(participants::Column::JoinedAt)
                .all(&db_tx)
                .await?;

            let mut items = Vec::with_capacity(participations.len());
            for participation in participations {
                let session_id = crate::util::parse_uuid(&participation.session_id, "session")?;
                let session = self.session_any(&db_tx, session_id).await?;
                let my_obligation = obligations::Entity::find()
                    .filter(obligations::Column::SessionId.eq(session.id.to_string()))
                    .filter(obligations::Column::PayerId.eq(player_id.to_string()))
                    .one(&db_tx)
                    .await?
                    .map(Obligation::try_from)
                    .transpose()?;
                if let Some(wanted) = filter.status()
                    && my_obligation.as_ref().map(|o| o.status) != Some(wanted)
                {
                    continue;
                }
                let host_name = users::Entity::find_by_id(session.host_id.to_string())
                    .one(&db_tx)
                    .await?
                    .map(|u| u.name)
                    .unwrap_or_default();
                items.push(PlayerSessionItem {
                    session,
                    host_name,
                    my_obligation,
                });
            }
            Ok(items)
        })
    }
}
