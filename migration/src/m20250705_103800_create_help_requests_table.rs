use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(HelpRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(HelpRequests::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(HelpRequests::Title).string().not_null())
                    .col(ColumnDef::new(HelpRequests::Description).text().not_null())
                    .col(ColumnDef::new(HelpRequests::Category).string().not_null())
                    .col(ColumnDef::new(HelpRequests::Urgency).string().not_null().default("medium"))
                    .col(ColumnDef::new(HelpRequests::Address).string().not_null())
                    .col(ColumnDef::new(HelpRequests::Latitude).double().not_null())
                    .col(ColumnDef::new(HelpRequests::Longitude).double().not_null())
                    .col(ColumnDef::new(HelpRequests::ContactName).string().not_null())
                    .col(ColumnDef::new(HelpRequests::ContactPhone).string().not_null())
                    .col(
                        ColumnDef::new(HelpRequests::ContactEmail)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(HelpRequests::IsActive).boolean().not_null().default(true))
                    .col(
                        ColumnDef::new(HelpRequests::IsFulfilled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(HelpRequests::UserId).big_integer().null())
                    .col(
                        ColumnDef::new(HelpRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(HelpRequests::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_help_requests_user")
                            .from(HelpRequests::Table, HelpRequests::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(HelpRequests::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum HelpRequests {
    Table,
    Id,
    Title,
    Description,
    Category,
    Urgency,
    Address,
    Latitude,
    Longitude,
    ContactName,
    ContactPhone,
    ContactEmail,
    IsActive,
    IsFulfilled,
    UserId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
