use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UsdRates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UsdRates::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(UsdRates::Rate)
                            .decimal_len(12, 4)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UsdRates::Date)
                            .date()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UsdRates::Time)
                            .time()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UsdRates::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UsdRates::CreatedAt)
                            .timestamp()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .to_owned(),
            )
            .await?;

        // Range queries filter on timestamp, the gate filters on date
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_usd_rates_timestamp")
                    .table(UsdRates::Table)
                    .col(UsdRates::Timestamp)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_usd_rates_date")
                    .table(UsdRates::Table)
                    .col(UsdRates::Date)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UsdRates::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum UsdRates {
    Table,
    Id,
    Rate,
    Date,
    Time,
    Timestamp,
    CreatedAt,
}
