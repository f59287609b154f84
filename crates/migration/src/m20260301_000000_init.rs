//! Initial schema migration.
//!
//! Creates the settlement schema:
//!
//! - `users`: host accounts
//! - `players`: people who can take part in a session (a user links to one)
//! - `sessions`: shared-cost events owned by a host
//! - `session_participants`: roster of a session (one HOST, many PLAYER)
//! - `expense_items`: itemized costs of a session
//! - `obligations`: one debt per (session, payer), keyed by a deterministic
//!   idempotency key
//! - `payments`: payer self-reported settlement attempts

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    IsActive,
    CreatedAt,
}

#[derive(Iden)]
enum Players {
    Table,
    Id,
    Name,
    NameKey,
    Email,
    Phone,
    UserId,
    IsActive,
    CreatedAt,
}

#[derive(Iden)]
enum Sessions {
    Table,
    Id,
    HostId,
    Name,
    Description,
    EventDate,
    Status,
    TotalAmountMinor,
    IsActive,
    DeletedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum SessionParticipants {
    Table,
    Id,
    SessionId,
    PlayerId,
    Role,
    IsActive,
    JoinedAt,
}

#[derive(Iden)]
enum ExpenseItems {
    Table,
    Id,
    SessionId,
    Description,
    AmountMinor,
    Quantity,
    IsActive,
    CreatedAt,
}

#[derive(Iden)]
enum Obligations {
    Table,
    Id,
    SessionId,
    PayerId,
    PayeeId,
    AmountMinor,
    Status,
    IdempotencyKey,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Payments {
    Table,
    Id,
    ObligationId,
    Attempt,
    Method,
    AmountMinor,
    ReferenceNumber,
    Notes,
    PaidAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::Email).string())
                    .col(
                        ColumnDef::new(Users::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Users::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Players
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Players::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Players::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Players::Name).string().not_null())
                    .col(ColumnDef::new(Players::NameKey).string().not_null())
                    .col(ColumnDef::new(Players::Email).string())
                    .col(ColumnDef::new(Players::Phone).string())
                    .col(ColumnDef::new(Players::UserId).string())
                    .col(
                        ColumnDef::new(Players::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Players::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-players-user_id")
                            .from(Players::Table, Players::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uidx-players-user_id")
                    .table(Players::Table)
                    .col(Players::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-players-email")
                    .table(Players::Table)
                    .col(Players::Email)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-players-name_key")
                    .table(Players::Table)
                    .col(Players::NameKey)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Sessions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Sessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Sessions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Sessions::HostId).string().not_null())
                    .col(ColumnDef::new(Sessions::Name).string().not_null())
                    .col(ColumnDef::new(Sessions::Description).string())
                    .col(ColumnDef::new(Sessions::EventDate).timestamp().not_null())
                    .col(
                        ColumnDef::new(Sessions::Status)
                            .string()
                            .not_null()
                            .default("draft"),
                    )
                    .col(ColumnDef::new(Sessions::TotalAmountMinor).big_integer())
                    .col(
                        ColumnDef::new(Sessions::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Sessions::DeletedAt).timestamp())
                    .col(ColumnDef::new(Sessions::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Sessions::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-sessions-host_id")
                            .from(Sessions::Table, Sessions::HostId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-sessions-host_id")
                    .table(Sessions::Table)
                    .col(Sessions::HostId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Session participants
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(SessionParticipants::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SessionParticipants::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SessionParticipants::SessionId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SessionParticipants::PlayerId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SessionParticipants::Role).string().not_null())
                    .col(
                        ColumnDef::new(SessionParticipants::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(SessionParticipants::JoinedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-session_participants-session_id")
                            .from(SessionParticipants::Table, SessionParticipants::SessionId)
                            .to(Sessions::Table, Sessions::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-session_participants-player_id")
                            .from(SessionParticipants::Table, SessionParticipants::PlayerId)
                            .to(Players::Table, Players::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // One row per (session, player); removal flips `is_active`.
        manager
            .create_index(
                Index::create()
                    .name("uidx-session_participants-session_id-player_id")
                    .table(SessionParticipants::Table)
                    .col(SessionParticipants::SessionId)
                    .col(SessionParticipants::PlayerId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-session_participants-player_id")
                    .table(SessionParticipants::Table)
                    .col(SessionParticipants::PlayerId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Expense items
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ExpenseItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExpenseItems::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ExpenseItems::SessionId).string().not_null())
                    .col(ColumnDef::new(ExpenseItems::Description).string().not_null())
                    .col(
                        ColumnDef::new(ExpenseItems::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExpenseItems::Quantity)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(ExpenseItems::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(ExpenseItems::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expense_items-session_id")
                            .from(ExpenseItems::Table, ExpenseItems::SessionId)
                            .to(Sessions::Table, Sessions::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expense_items-session_id")
                    .table(ExpenseItems::Table)
                    .col(ExpenseItems::SessionId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Obligations
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Obligations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Obligations::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Obligations::SessionId).string().not_null())
                    .col(ColumnDef::new(Obligations::PayerId).string().not_null())
                    .col(ColumnDef::new(Obligations::PayeeId).string().not_null())
                    .col(
                        ColumnDef::new(Obligations::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Obligations::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Obligations::IdempotencyKey)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Obligations::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Obligations::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-obligations-session_id")
                            .from(Obligations::Table, Obligations::SessionId)
                            .to(Sessions::Table, Sessions::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-obligations-payer_id")
                            .from(Obligations::Table, Obligations::PayerId)
                            .to(Players::Table, Players::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-obligations-payee_id")
                            .from(Obligations::Table, Obligations::PayeeId)
                            .to(Players::Table, Players::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Closes the check-then-insert race of split generation.
        manager
            .create_index(
                Index::create()
                    .name("uidx-obligations-idempotency_key")
                    .table(Obligations::Table)
                    .col(Obligations::IdempotencyKey)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-obligations-session_id")
                    .table(Obligations::Table)
                    .col(Obligations::SessionId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-obligations-payer_id")
                    .table(Obligations::Table)
                    .col(Obligations::PayerId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 7. Payments
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Payments::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Payments::ObligationId).string().not_null())
                    .col(ColumnDef::new(Payments::Attempt).integer().not_null())
                    .col(ColumnDef::new(Payments::Method).string().not_null())
                    .col(
                        ColumnDef::new(Payments::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Payments::ReferenceNumber).string())
                    .col(ColumnDef::new(Payments::Notes).string())
                    .col(ColumnDef::new(Payments::PaidAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-payments-obligation_id")
                            .from(Payments::Table, Payments::ObligationId)
                            .to(Obligations::Table, Obligations::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uidx-payments-obligation_id-attempt")
                    .table(Payments::Table)
                    .col(Payments::ObligationId)
                    .col(Payments::Attempt)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(Payments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Obligations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ExpenseItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SessionParticipants::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Sessions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Players::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
