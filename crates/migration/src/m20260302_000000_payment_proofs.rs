use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Payments {
    Table,
    Id,
}

#[derive(Iden)]
enum PaymentProofs {
    Table,
    Id,
    PaymentId,
    MediaRef,
    Status,
    RejectionReason,
    VerifiedBy,
    VerifiedAt,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PaymentProofs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PaymentProofs::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PaymentProofs::PaymentId).string().not_null())
                    .col(ColumnDef::new(PaymentProofs::MediaRef).string().not_null())
                    .col(
                        ColumnDef::new(PaymentProofs::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(PaymentProofs::RejectionReason).string())
                    .col(ColumnDef::new(PaymentProofs::VerifiedBy).string())
                    .col(ColumnDef::new(PaymentProofs::VerifiedAt).timestamp())
                    .col(
                        ColumnDef::new(PaymentProofs::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-payment_proofs-payment_id")
                            .from(PaymentProofs::Table, PaymentProofs::PaymentId)
                            .to(Payments::Table, Payments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-payment_proofs-payment_id")
                    .table(PaymentProofs::Table)
                    .col(PaymentProofs::PaymentId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx-payment_proofs-payment_id")
                    .table(PaymentProofs::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(PaymentProofs::Table).to_owned())
            .await?;

        Ok(())
    }
}
