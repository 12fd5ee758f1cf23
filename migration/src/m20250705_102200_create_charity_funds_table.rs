use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CharityFunds::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CharityFunds::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CharityFunds::Name).string().not_null())
                    .col(ColumnDef::new(CharityFunds::Description).text().not_null())
                    .col(ColumnDef::new(CharityFunds::ImageUrl).string().null())
                    .col(ColumnDef::new(CharityFunds::Website).string().not_null().default(""))
                    .col(ColumnDef::new(CharityFunds::ContactEmail).string().not_null().default(""))
                    .col(ColumnDef::new(CharityFunds::CreatorId).big_integer().not_null())
                    .col(ColumnDef::new(CharityFunds::Status).string().not_null().default("pending"))
                    .col(
                        ColumnDef::new(CharityFunds::RejectionReason)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(CharityFunds::IsActive).boolean().not_null().default(true))
                    .col(
                        ColumnDef::new(CharityFunds::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(CharityFunds::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_charity_funds_creator")
                            .from(CharityFunds::Table, CharityFunds::CreatorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CharityFunds::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CharityFunds {
    Table,
    Id,
    Name,
    Description,
    ImageUrl,
    Website,
    ContactEmail,
    CreatorId,
    Status,
    RejectionReason,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
