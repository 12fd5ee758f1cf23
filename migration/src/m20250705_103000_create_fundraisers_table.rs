use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Fundraisers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Fundraisers::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Fundraisers::FundId).big_integer().not_null())
                    .col(ColumnDef::new(Fundraisers::Title).string().not_null())
                    .col(ColumnDef::new(Fundraisers::Description).text().not_null())
                    .col(ColumnDef::new(Fundraisers::GoalAmount).double().not_null())
                    .col(
                        ColumnDef::new(Fundraisers::CurrentAmount)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(Fundraisers::ImageUrl).string().null())
                    .col(ColumnDef::new(Fundraisers::Status).string().not_null().default("active"))
                    .col(
                        ColumnDef::new(Fundraisers::StartDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Fundraisers::EndDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Fundraisers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_fundraisers_fund")
                            .from(Fundraisers::Table, Fundraisers::FundId)
                            .to(CharityFunds::Table, CharityFunds::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Fundraisers::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Fundraisers {
    Table,
    Id,
    FundId,
    Title,
    Description,
    GoalAmount,
    CurrentAmount,
    ImageUrl,
    Status,
    StartDate,
    EndDate,
    CreatedAt,
}

#[derive(DeriveIden)]
enum CharityFunds {
    Table,
    Id,
}
