use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, Condition, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait, prelude::*, sea_query::Order,
};
use tracing::info;
use uuid::Uuid;

use crate::{
    EngineError, NewSessionCmd, ObligationStatus, Participant, ParticipantRole,
    ParticipantStatus, ResultEngine, RoleFilter, Session, SessionDetail, SessionListItem,
    SessionListQuery, SessionPage, SessionSort, SessionStatus, SortOrder, SplitCalculator,
    UpdateSessionCmd, obligations, participants, players, sessions, util::bounded_text,
};

use super::{Engine, ensure_max_len, normalize_optional_text, with_tx};

const MAX_DESCRIPTION: usize = 1000;

impl Engine {
    /// Creates a `DRAFT` session with the host's player as its only
    /// participant.
    pub async fn create_session(&self, host_id: Uuid, cmd: NewSessionCmd) -> ResultEngine<Session> {
        let name = bounded_text(&cmd.name, "session name", 2, 255)?;
        let description = normalize_optional_text(cmd.description.as_deref());
        ensure_max_len(description.as_deref(), "description", MAX_DESCRIPTION)?;

        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, host_id).await?;
            let host_player = self.require_user_player(&db_tx, host_id).await?;

            let session = Session::new(host_id, name, description, cmd.event_date);
            sessions::ActiveModel::from(&session).insert(&db_tx).await?;

            let host = Participant::new(session.id, host_player.id, ParticipantRole::Host);
            participants::ActiveModel::from(&host).insert(&db_tx).await?;

            info!(session_id = %session.id, %host_id, "session created");
            Ok(session)
        })
    }

    /// Lists the sessions `user_id` hosts or takes part in.
    pub async fn list_sessions(
        &self,
        user_id: Uuid,
        query: SessionListQuery,
    ) -> ResultEngine<SessionPage> {
        if !(1..=100).contains(&query.limit) {
            return Err(EngineError::InvalidInput(
                "limit must be between 1 and 100".to_string(),
            ));
        }
        if query.page == 0 {
            return Err(EngineError::InvalidInput("page must be >= 1".to_string()));
        }
        let offset = (query.page - 1)
            .checked_mul(query.limit)
            .filter(|offset| i64::try_from(*offset).is_ok())
            .ok_or_else(|| EngineError::InvalidInput("page out of range".to_string()))?;

        with_tx!(self, |db_tx| {
            let player = self.require_user_player(&db_tx, user_id).await?;
            let joined: Vec<String> = participants::Entity::find()
                .filter(participants::Column::PlayerId.eq(player.id.to_string()))
                .filter(participants::Column::IsActive.eq(true))
                .filter(participants::Column::Role.eq(ParticipantRole::Player.as_str()))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|p| p.session_id)
                .collect();

            let hosted = sessions::Column::HostId.eq(user_id.to_string());
            let as_player = sessions::Column::Id.is_in(joined);
            let mut select = sessions::Entity::find()
                .filter(sessions::Column::IsActive.eq(true))
                .filter(match query.role {
                    RoleFilter::Host => Condition::all().add(hosted),
                    RoleFilter::Player => Condition::all().add(as_player),
                    RoleFilter::All => Condition::any().add(hosted).add(as_player),
                });
            if let Some(status) = query.status {
                select = select.filter(sessions::Column::Status.eq(status.as_str()));
            }

            let total_items = select.clone().count(&db_tx).await?;

            let column = match query.sort {
                SessionSort::Date => sessions::Column::EventDate,
                SessionSort::CreatedAt => sessions::Column::CreatedAt,
                SessionSort::Name => sessions::Column::Name,
            };
            let order = match query.order {
                SortOrder::Asc => Order::Asc,
                SortOrder::Desc => Order::Desc,
            };
            let models = select
                .order_by(column, order)
                .order_by_asc(sessions::Column::Id)
                .offset(offset)
                .limit(query.limit)
                .all(&db_tx)
                .await?;

            let mut items = Vec::with_capacity(models.len());
            for model in models {
                let session = Session::try_from(model)?;
                let roster = self.active_participants(&db_tx, session.id).await?;
                let payer_count = roster
                    .iter()
                    .filter(|p| p.role == ParticipantRole::Player)
                    .count() as u64;
                let verified_count = obligations::Entity::find()
                    .filter(obligations::Column::SessionId.eq(session.id.to_string()))
                    .filter(obligations::Column::Status.eq(ObligationStatus::Verified.as_str()))
                    .count(&db_tx)
                    .await?;
                let my_role = if session.host_id == user_id {
                    ParticipantRole::Host
                } else {
                    ParticipantRole::Player
                };
                items.push(SessionListItem {
                    session,
                    my_role,
                    participant_count: roster.len() as u64,
                    payer_count,
                    verified_count,
                });
            }

            Ok(SessionPage {
                items,
                page: query.page,
                limit: query.limit,
                total_items,
            })
        })
    }

    /// Full view of a session for its host or one of its active participants.
    pub async fn session_detail(&self, session_id: Uuid, user_id: Uuid) -> ResultEngine<SessionDetail> {
        with_tx!(self, |db_tx| {
            let session = self.require_session(&db_tx, session_id).await?;
            let my_role = self.require_session_viewer(&db_tx, &session, user_id).await?;

            let roster = self.active_participants(&db_tx, session.id).await?;
            let player_ids: Vec<String> = roster.iter().map(|p| p.player_id.to_string()).collect();
            let mut players_by_id: HashMap<String, players::Model> = players::Entity::find()
                .filter(players::Column::Id.is_in(player_ids))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|p| (p.id.clone(), p))
                .collect();
            let by_payer: HashMap<Uuid, (Uuid, ObligationStatus)> = self
                .session_obligations(&db_tx, session.id)
                .await?
                .into_iter()
                .map(|o| (o.payer_id, (o.id, o.status)))
                .collect();

            let mut participants = Vec::with_capacity(roster.len());
            let mut paid_count = 0;
            for participant in &roster {
                let Some(model) = players_by_id.remove(&participant.player_id.to_string()) else {
                    continue;
                };
                let obligation = match participant.role {
                    ParticipantRole::Host => None,
                    ParticipantRole::Player => by_payer.get(&participant.player_id).copied(),
                };
                if matches!(obligation, Some((_, ObligationStatus::Verified))) {
                    paid_count += 1;
                }
                participants.push(ParticipantStatus {
                    player: model.try_into()?,
                    role: participant.role,
                    obligation_status: obligation.map(|(_, status)| status),
                    obligation_id: obligation.map(|(id, _)| id),
                });
            }

            let ledger = self.session_ledger(&db_tx, session.id).await?;
            let payer_count = roster
                .iter()
                .filter(|p| p.role == ParticipantRole::Player)
                .count();
            let per_person_minor = SplitCalculator::per_person(
                session
                    .total_amount_minor
                    .or(ledger.total_minor()?)
                    .unwrap_or(0),
                payer_count,
            );

            Ok(SessionDetail {
                session,
                my_role,
                participants,
                expenses: ledger.into_items(),
                per_person_minor,
                paid_count,
            })
        })
    }

    /// Patches name, description or date. Refused once the session is closed.
    pub async fn update_session(
        &self,
        session_id: Uuid,
        host_id: Uuid,
        cmd: UpdateSessionCmd,
    ) -> ResultEngine<Session> {
        let name = cmd
            .name
            .as_deref()
            .map(|name| bounded_text(name, "session name", 2, 255))
            .transpose()?;
        let description = cmd.description.as_deref().map(|d| normalize_optional_text(Some(d)));
        ensure_max_len(
            description.as_ref().and_then(|d| d.as_deref()),
            "description",
            MAX_DESCRIPTION,
        )?;

        with_tx!(self, |db_tx| {
            let session = self.require_session_host(&db_tx, session_id, host_id).await?;
            if session.status == SessionStatus::Closed {
                return Err(EngineError::SessionLocked(session.status));
            }

            let mut active = sessions::ActiveModel {
                id: ActiveValue::Unchanged(session.id.to_string()),
                updated_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            };
            if let Some(name) = name {
                active.name = ActiveValue::Set(name);
            }
            if let Some(description) = description {
                active.description = ActiveValue::Set(description);
            }
            if let Some(event_date) = cmd.event_date {
                active.event_date = ActiveValue::Set(event_date);
            }
            let model = active.update(&db_tx).await?;
            Session::try_from(model)
        })
    }

    /// Soft-deletes a session. Its obligations stay in the payers' history.
    pub async fn delete_session(&self, session_id: Uuid, host_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let session = self.require_session_host(&db_tx, session_id, host_id).await?;
            let now = Utc::now();
            sessions::ActiveModel {
                id: ActiveValue::Unchanged(session.id.to_string()),
                is_active: ActiveValue::Set(false),
                deleted_at: ActiveValue::Set(Some(now)),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            info!(%session_id, "session deleted");
            Ok(())
        })
    }
}
