use chrono::{Duration, Utc};
use sea_orm::{Database, DatabaseConnection};

use engine::{
    Engine, EngineError, ErrorKind, NewExpenseCmd, NewPlayerCmd, NewSessionCmd, ObligationStatus,
    PaymentMethod, PlayerSessionFilter, ProofStatus, ReportPaymentCmd, RoleFilter,
    SessionListQuery, SessionStatus, UpdateExpenseCmd, UpdateProfileCmd, User, VerifyDecision,
};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

/// A host with a draft session, `players` payers and `amounts` as expenses.
async fn session_with(engine: &Engine, players: &[&str], amounts: &[i64]) -> (User, Uuid, Vec<Uuid>) {
    let (host, _) = engine.create_user("Hana Host", None).await.unwrap();
    let session = engine
        .create_session(host.id, NewSessionCmd::new("Futsal Kamis", Utc::now()))
        .await
        .unwrap();
    let mut player_ids = Vec::new();
    if !players.is_empty() {
        let added = engine
            .add_players(
                session.id,
                host.id,
                players.iter().map(|name| NewPlayerCmd::new(*name)).collect(),
            )
            .await
            .unwrap();
        player_ids.extend(added.into_iter().map(|p| p.player_id));
    }
    if !amounts.is_empty() {
        engine
            .add_expenses(
                session.id,
                host.id,
                amounts
                    .iter()
                    .map(|amount| NewExpenseCmd::new("Court", *amount))
                    .collect(),
            )
            .await
            .unwrap();
    }
    (host, session.id, player_ids)
}

#[tokio::test]
async fn split_creates_one_obligation_per_payer_and_locks() {
    let (engine, _db) = engine_with_db().await;
    let (host, session_id, _) = session_with(&engine, &["Adi", "Budi", "Caca"], &[90_000]).await;

    let outcome = engine.generate_split(session_id, host.id).await.unwrap();
    assert_eq!(outcome.obligations.len(), 3);
    assert_eq!(outcome.plan.per_person_minor, 30_000);
    assert_eq!(outcome.session.status, SessionStatus::SplitConfirmed);
    assert_eq!(outcome.session.total_amount_minor, Some(90_000));
    assert!(
        outcome
            .obligations
            .iter()
            .all(|o| o.status == ObligationStatus::Pending)
    );

    let err = engine.generate_split(session_id, host.id).await.unwrap_err();
    assert_eq!(err, EngineError::SessionLocked(SessionStatus::SplitConfirmed));

    let list = engine.list_obligations(session_id, host.id).await.unwrap();
    assert_eq!(list.items.len(), 3);
    assert_eq!(list.counts.pending, 3);
}

#[tokio::test]
async fn split_sums_to_the_total_when_it_divides() {
    let (engine, _db) = engine_with_db().await;
    let (host, session_id, _) =
        session_with(&engine, &["Adi", "Budi", "Caca", "Dodi"], &[150_000, 50_000]).await;

    let outcome = engine.generate_split(session_id, host.id).await.unwrap();
    assert_eq!(outcome.plan.per_person_minor, 50_000);
    assert_eq!(outcome.plan.remainder_minor, 0);
    let sum: i64 = outcome.obligations.iter().map(|o| o.amount_minor).sum();
    assert_eq!(sum, 200_000);
}

#[tokio::test]
async fn split_of_quantities() {
    let (engine, _db) = engine_with_db().await;
    let (host, session_id, _) = session_with(&engine, &["Adi", "Budi", "Caca", "Dodi"], &[]).await;
    engine
        .add_expenses(
            session_id,
            host.id,
            vec![
                NewExpenseCmd::new("Court", 100_000),
                NewExpenseCmd::new("Shuttlecock", 7_000).quantity(5),
            ],
        )
        .await
        .unwrap();

    let summary = engine.expense_summary(session_id, host.id).await.unwrap();
    assert_eq!(summary.total_minor, Some(135_000));
    assert_eq!(summary.payer_count, 4);
    assert_eq!(summary.per_person_minor, Some(33_750));

    let outcome = engine.generate_split(session_id, host.id).await.unwrap();
    assert!(outcome.obligations.iter().all(|o| o.amount_minor == 33_750));
}

#[tokio::test]
async fn split_without_payers_is_refused() {
    let (engine, _db) = engine_with_db().await;
    let (host, _) = engine.create_user("Hana Host", None).await.unwrap();
    let session = engine
        .create_session(host.id, NewSessionCmd::new("Solo", Utc::now()))
        .await
        .unwrap();

    let err = engine.generate_split(session.id, host.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoParticipants);
}

#[tokio::test]
async fn mark_paid_before_split_survives_the_split() {
    let (engine, _db) = engine_with_db().await;
    let (host, session_id, players) = session_with(&engine, &["Adi", "Budi"], &[40_000]).await;

    let early = engine
        .mark_player_paid(session_id, players[0], host.id)
        .await
        .unwrap();
    assert_eq!(early.status, ObligationStatus::Verified);
    assert_eq!(early.amount_minor, 20_000);

    let outcome = engine.generate_split(session_id, host.id).await.unwrap();
    assert_eq!(outcome.obligations.len(), 2);
    let same = outcome
        .obligations
        .iter()
        .find(|o| o.payer_id == players[0])
        .unwrap();
    assert_eq!(same.id, early.id);
    assert_eq!(same.status, ObligationStatus::Verified);

    // Marking again is a no-op.
    let again = engine
        .mark_player_paid(session_id, players[0], host.id)
        .await
        .unwrap();
    assert_eq!(again.id, early.id);
    assert_eq!(again.status, ObligationStatus::Verified);
}

#[tokio::test]
async fn close_needs_every_obligation_verified() {
    let (engine, _db) = engine_with_db().await;
    let (host, session_id, players) = session_with(&engine, &["Adi", "Budi"], &[50_000]).await;
    engine.generate_split(session_id, host.id).await.unwrap();
    engine
        .mark_player_paid(session_id, players[0], host.id)
        .await
        .unwrap();

    let err = engine.close_session(session_id, host.id).await.unwrap_err();
    assert_eq!(err, EngineError::PendingObligations { count: 1 });

    engine
        .mark_player_paid(session_id, players[1], host.id)
        .await
        .unwrap();
    let summary = engine.close_session(session_id, host.id).await.unwrap();
    assert_eq!(summary.session.status, SessionStatus::Closed);
    assert_eq!(summary.total_collected_minor, 50_000);
    assert_eq!(summary.participant_count, 2);

    let err = engine
        .mark_player_paid(session_id, players[0], host.id)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::SessionLocked(SessionStatus::Closed));
}

#[tokio::test]
async fn close_before_split_is_an_invalid_transition() {
    let (engine, _db) = engine_with_db().await;
    let (host, session_id, _) = session_with(&engine, &["Adi"], &[10_000]).await;

    let err = engine.close_session(session_id, host.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
}

#[tokio::test]
async fn reject_then_resubmit_keeps_payment_history() {
    let (engine, _db) = engine_with_db().await;
    let (host, session_id, players) = session_with(&engine, &["Adi"], &[25_000]).await;
    let outcome = engine.generate_split(session_id, host.id).await.unwrap();
    let obligation = outcome.obligations[0].clone();
    let payer = players[0];

    let first = engine
        .report_payment(
            obligation.id,
            payer,
            ReportPaymentCmd::new(PaymentMethod::Transfer).reference_number("TRX-1"),
        )
        .await
        .unwrap();
    assert_eq!(first.attempt, 1);
    assert_eq!(first.amount_minor, 25_000);
    let proof = engine
        .attach_payment_proof(first.id, payer, "media/receipt-1.jpg")
        .await
        .unwrap();
    assert_eq!(proof.status, ProofStatus::Pending);

    let err = engine
        .verify_obligation(
            session_id,
            obligation.id,
            host.id,
            VerifyDecision::Reject {
                reason: "  ".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let rejected = engine
        .verify_obligation(
            session_id,
            obligation.id,
            host.id,
            VerifyDecision::Reject {
                reason: "amount does not match".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(rejected.status, ObligationStatus::Rejected);
    let status = engine.payment_status(first.id, payer).await.unwrap();
    let reviewed = status.latest_proof.unwrap();
    assert_eq!(reviewed.status, ProofStatus::Rejected);
    assert_eq!(reviewed.rejection_reason.as_deref(), Some("amount does not match"));
    assert_eq!(reviewed.verified_by, Some(host.id));

    let second = engine
        .report_payment(obligation.id, payer, ReportPaymentCmd::new(PaymentMethod::Cash))
        .await
        .unwrap();
    assert_eq!(second.attempt, 2);

    // Only the latest payment takes proofs.
    let err = engine
        .attach_payment_proof(first.id, payer, "media/late.jpg")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);

    let verified = engine
        .verify_obligation(session_id, obligation.id, host.id, VerifyDecision::Approve)
        .await
        .unwrap();
    assert_eq!(verified.status, ObligationStatus::Verified);

    let detail = engine.player_obligation(obligation.id, payer).await.unwrap();
    assert_eq!(detail.payments.len(), 2);
    assert_eq!(detail.item.obligation.status, ObligationStatus::Verified);

    let err = engine
        .report_payment(obligation.id, payer, ReportPaymentCmd::new(PaymentMethod::Cash))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::AlreadySettled(ObligationStatus::Verified));
}

#[tokio::test]
async fn approve_requires_a_reported_payment() {
    let (engine, _db) = engine_with_db().await;
    let (host, session_id, _) = session_with(&engine, &["Adi"], &[25_000]).await;
    let outcome = engine.generate_split(session_id, host.id).await.unwrap();

    let err = engine
        .verify_obligation(
            session_id,
            outcome.obligations[0].id,
            host.id,
            VerifyDecision::Approve,
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
}

#[tokio::test]
async fn only_the_host_manages_a_session() {
    let (engine, _db) = engine_with_db().await;
    let (host, session_id, players) = session_with(&engine, &["Adi"], &[25_000]).await;
    let (stranger, _) = engine.create_user("Sara Stranger", None).await.unwrap();

    let err = engine.generate_split(session_id, stranger.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);
    let err = engine
        .add_expenses(session_id, stranger.id, vec![NewExpenseCmd::new("Drinks", 1)])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);

    let outcome = engine.generate_split(session_id, host.id).await.unwrap();
    let obligation = &outcome.obligations[0];
    engine
        .report_payment(obligation.id, players[0], ReportPaymentCmd::new(PaymentMethod::Cash))
        .await
        .unwrap();
    let err = engine
        .verify_obligation(session_id, obligation.id, stranger.id, VerifyDecision::Approve)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);

    // Another player cannot report on someone else's obligation.
    let (_, other_player) = engine.create_user("Oki Other", None).await.unwrap();
    let err = engine
        .report_payment(obligation.id, other_player.id, ReportPaymentCmd::new(PaymentMethod::Cash))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotPayer(_)));
}

#[tokio::test]
async fn removed_participant_is_not_split() {
    let (engine, _db) = engine_with_db().await;
    let (host, session_id, players) =
        session_with(&engine, &["Adi", "Budi", "Caca"], &[60_000]).await;
    engine
        .remove_player(session_id, players[2], host.id)
        .await
        .unwrap();

    let outcome = engine.generate_split(session_id, host.id).await.unwrap();
    assert_eq!(outcome.obligations.len(), 2);
    assert!(outcome.obligations.iter().all(|o| o.payer_id != players[2]));
    assert!(outcome.obligations.iter().all(|o| o.amount_minor == 30_000));
}

#[tokio::test]
async fn host_cannot_be_removed() {
    let (engine, _db) = engine_with_db().await;
    let (host, session_id, _) = session_with(&engine, &["Adi"], &[]).await;
    let host_player = engine.user_player(host.id).await.unwrap();

    let err = engine
        .remove_player(session_id, host_player.id, host.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);
}

#[tokio::test]
async fn readding_a_player_reuses_the_record() {
    let (engine, _db) = engine_with_db().await;
    let (host, session_id, players) = session_with(&engine, &["Adi"], &[]).await;
    engine
        .remove_player(session_id, players[0], host.id)
        .await
        .unwrap();

    let again = engine
        .add_players(session_id, host.id, vec![NewPlayerCmd::new("  adi ")])
        .await
        .unwrap();
    assert_eq!(again.len(), 1);
    assert_eq!(again[0].player_id, players[0]);

    let skipped = engine
        .add_players(session_id, host.id, vec![NewPlayerCmd::new("Adi")])
        .await
        .unwrap();
    assert!(skipped.is_empty());
}

#[tokio::test]
async fn expenses_are_frozen_after_split() {
    let (engine, _db) = engine_with_db().await;
    let (host, session_id, _) = session_with(&engine, &["Adi", "Budi"], &[]).await;
    let items = engine
        .add_expenses(session_id, host.id, vec![NewExpenseCmd::new("Court", 80_000)])
        .await
        .unwrap();
    engine
        .update_expense(
            session_id,
            items[0].id,
            host.id,
            UpdateExpenseCmd::default().amount_minor(100_000),
        )
        .await
        .unwrap();
    engine.generate_split(session_id, host.id).await.unwrap();

    let err = engine
        .add_expenses(session_id, host.id, vec![NewExpenseCmd::new("Drinks", 5_000)])
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::SessionLocked(SessionStatus::SplitConfirmed));
    let err = engine
        .delete_expense(session_id, items[0].id, host.id)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::SessionLocked(SessionStatus::SplitConfirmed));
    let err = engine
        .add_players(session_id, host.id, vec![NewPlayerCmd::new("Late")])
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::SessionLocked(SessionStatus::SplitConfirmed));

    let list = engine.list_obligations(session_id, host.id).await.unwrap();
    assert!(list.items.iter().all(|i| i.obligation.amount_minor == 50_000));
}

#[tokio::test]
async fn negative_amounts_are_rejected() {
    let (engine, _db) = engine_with_db().await;
    let (host, session_id, _) = session_with(&engine, &["Adi"], &[]).await;

    let err = engine
        .add_expenses(session_id, host.id, vec![NewExpenseCmd::new("Refund", -1)])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    let err = engine
        .add_expenses(
            session_id,
            host.id,
            vec![NewExpenseCmd::new("Court", 1).quantity(0)],
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn deleted_session_stays_in_player_history() {
    let (engine, _db) = engine_with_db().await;
    let (host, session_id, players) = session_with(&engine, &["Adi"], &[12_000]).await;
    engine.generate_split(session_id, host.id).await.unwrap();
    engine.delete_session(session_id, host.id).await.unwrap();

    let err = engine.session_detail(session_id, host.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let history = engine.player_obligations(players[0], None).await.unwrap();
    assert_eq!(history.items.len(), 1);
    assert_eq!(history.items[0].session_name, "Futsal Kamis");
    assert_eq!(history.items[0].host_name, "Hana Host");
    assert_eq!(history.summary.total_owed_minor, 12_000);
    assert_eq!(history.summary.pending_count, 1);
}

#[tokio::test]
async fn session_listing_filters_and_pages() {
    let (engine, _db) = engine_with_db().await;
    let (host, _) = engine.create_user("Hana Host", None).await.unwrap();
    let now = Utc::now();
    for day in 0..3 {
        engine
            .create_session(
                host.id,
                NewSessionCmd::new(format!("Session {day}"), now - Duration::days(day)),
            )
            .await
            .unwrap();
    }

    let page = engine
        .list_sessions(host.id, SessionListQuery::default().page(1, 2))
        .await
        .unwrap();
    assert_eq!(page.total_items, 3);
    assert_eq!(page.total_pages(), 2);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].session.name, "Session 0");

    let page = engine
        .list_sessions(host.id, SessionListQuery::default().page(2, 2))
        .await
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].session.name, "Session 2");

    let page = engine
        .list_sessions(host.id, SessionListQuery::default().role(RoleFilter::Player))
        .await
        .unwrap();
    assert_eq!(page.total_items, 0);

    let page = engine
        .list_sessions(
            host.id,
            SessionListQuery::default().status(SessionStatus::Closed),
        )
        .await
        .unwrap();
    assert!(page.items.is_empty());

    let err = engine
        .list_sessions(host.id, SessionListQuery::default().page(1, 101))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn session_listing_rejects_unreachable_pages() {
    let (engine, _db) = engine_with_db().await;
    let (host, _) = engine.create_user("Hana Host", None).await.unwrap();

    for page in [u64::MAX, (i64::MAX as u64) / 20 + 2] {
        let err = engine
            .list_sessions(host.id, SessionListQuery::default().page(page, 20))
            .await
            .unwrap_err();
        assert_eq!(err, EngineError::InvalidInput("page out of range".to_string()));
    }

    let page = engine
        .list_sessions(host.id, SessionListQuery::default().page(1_000, 100))
        .await
        .unwrap();
    assert!(page.items.is_empty());
}

#[tokio::test]
async fn concurrent_split_retries_create_one_set() {
    let (engine, _db) = engine_with_db().await;
    let (host, session_id, _) = session_with(&engine, &["Adi", "Budi", "Caca"], &[60_000]).await;

    let (first, second) = tokio::join!(
        engine.generate_split(session_id, host.id),
        engine.generate_split(session_id, host.id),
    );
    let results = [first, second];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results.iter().any(|r| matches!(
        r,
        Err(EngineError::SessionLocked(SessionStatus::SplitConfirmed))
    )));

    let list = engine.list_obligations(session_id, host.id).await.unwrap();
    assert_eq!(list.items.len(), 3);
}

#[tokio::test]
async fn concurrent_mark_paid_retries_share_one_obligation() {
    let (engine, _db) = engine_with_db().await;
    let (host, session_id, players) = session_with(&engine, &["Adi", "Budi"], &[40_000]).await;

    let (first, second) = tokio::join!(
        engine.mark_player_paid(session_id, players[0], host.id),
        engine.mark_player_paid(session_id, players[0], host.id),
    );
    let (first, second) = (first.unwrap(), second.unwrap());
    assert_eq!(first.id, second.id);
    assert_eq!(second.status, ObligationStatus::Verified);

    let outcome = engine.generate_split(session_id, host.id).await.unwrap();
    assert_eq!(outcome.obligations.len(), 2);
    assert_eq!(
        outcome
            .obligations
            .iter()
            .filter(|o| o.payer_id == players[0])
            .count(),
        1
    );
}

#[tokio::test]
async fn summaries_follow_verification() {
    let (engine, _db) = engine_with_db().await;
    let (host, session_id, _) = session_with(&engine, &[], &[30_000]).await;
    let (payer_user, payer) = engine.create_user("Budi Payer", None).await.unwrap();
    engine
        .add_players(session_id, host.id, vec![NewPlayerCmd::new("Adi")])
        .await
        .unwrap();
    let db_payer = engine
        .add_players(session_id, host.id, vec![NewPlayerCmd::new("Budi Payer")])
        .await
        .unwrap();
    // A host-typed name matches the existing player record.
    assert_eq!(db_payer[0].player_id, payer.id);

    engine.generate_split(session_id, host.id).await.unwrap();
    engine
        .mark_player_paid(session_id, payer.id, host.id)
        .await
        .unwrap();

    let host_view = engine.payment_summary(host.id).await.unwrap();
    assert_eq!(host_view.as_host.total_sessions, 1);
    assert_eq!(host_view.as_host.active_sessions, 1);
    assert_eq!(host_view.as_host.total_collected_minor, 15_000);
    assert_eq!(host_view.as_host.pending_minor, 15_000);

    let payer_view = engine.payment_summary(payer_user.id).await.unwrap();
    assert_eq!(payer_view.as_player.total_sessions, 1);
    assert_eq!(payer_view.as_player.total_paid_minor, 15_000);
    assert_eq!(payer_view.as_player.pending_minor, 0);

    let verified = engine
        .player_sessions(payer.id, PlayerSessionFilter::Verified)
        .await
        .unwrap();
    assert_eq!(verified.len(), 1);
    assert_eq!(verified[0].host_name, "Hana Host");
    let pending = engine
        .player_sessions(payer.id, PlayerSessionFilter::Pending)
        .await
        .unwrap();
    assert!(pending.is_empty());
}

#[tokio::test]
async fn account_deletion_waits_for_hosted_settlement() {
    let (engine, _db) = engine_with_db().await;
    let (host, session_id, players) = session_with(&engine, &["Adi", "Budi"], &[20_000]).await;
    // A draft without obligations does not hold the account back.
    engine
        .create_session(host.id, NewSessionCmd::new("Later", Utc::now()))
        .await
        .unwrap();
    engine.generate_split(session_id, host.id).await.unwrap();
    engine
        .mark_player_paid(session_id, players[0], host.id)
        .await
        .unwrap();

    let err = engine.delete_user(host.id).await.unwrap_err();
    assert_eq!(err, EngineError::HostingUnsettled { sessions: 1 });
    assert_eq!(err.kind(), ErrorKind::InvalidState);

    engine
        .mark_player_paid(session_id, players[1], host.id)
        .await
        .unwrap();
    let host_player = engine.user_player(host.id).await.unwrap();
    engine.delete_user(host.id).await.unwrap();

    let err = engine.user_profile(host.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    let err = engine.player_profile(host_player.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    let err = engine
        .create_session(host.id, NewSessionCmd::new("Again", Utc::now()))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    let err = engine.delete_user(host.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn profile_updates_reach_the_linked_player() {
    let (engine, _db) = engine_with_db().await;
    let (user, player) = engine
        .create_user("Budi", Some("budi@example.com"))
        .await
        .unwrap();

    let profile = engine
        .update_user(
            user.id,
            UpdateProfileCmd::default()
                .name("Budi Santoso")
                .email(" Budi.S@Example.com ")
                .phone("0812"),
        )
        .await
        .unwrap();
    assert_eq!(profile.user.name, "Budi Santoso");
    assert_eq!(profile.user.email.as_deref(), Some("budi.s@example.com"));
    assert_eq!(profile.player.id, player.id);
    assert_eq!(profile.player.name, "Budi Santoso");
    assert_eq!(profile.player.phone.as_deref(), Some("0812"));

    let updated = engine
        .update_player(player.id, UpdateProfileCmd::default().name("Budi S").phone(""))
        .await
        .unwrap();
    assert_eq!(updated.name, "Budi S");
    assert_eq!(updated.phone, None);
    let profile = engine.user_profile(user.id).await.unwrap();
    assert_eq!(profile.user.name, "Budi Santoso");
    assert_eq!(profile.player.name, "Budi S");

    let err = engine
        .update_user(user.id, UpdateProfileCmd::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    let err = engine
        .update_player(player.id, UpdateProfileCmd::default().name("B"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}
