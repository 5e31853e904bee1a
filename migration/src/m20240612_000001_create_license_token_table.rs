use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LicenseToken::Table)
                    .if_not_exists()
                    .col(pk_auto(LicenseToken::Id))
                    .col(string_uniq(LicenseToken::Token))
                    .col(string(LicenseToken::DiscordId))
                    .col(string(LicenseToken::ClientIp))
                    .col(string(LicenseToken::ScriptName))
                    .col(
                        timestamp_with_time_zone(LicenseToken::CreatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .col(timestamp_with_time_zone(LicenseToken::ExpirationDate))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LicenseToken::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum LicenseToken {
    Table,
    Id,
    Token,
    DiscordId,
    ClientIp,
    ScriptName,
    CreatedAt,
    ExpirationDate,
}
