use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Employees::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Employees::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Employees::Name).string_len(120).not_null())
                    .col(ColumnDef::new(Employees::Category).string_len(8).not_null())
                    .col(
                        ColumnDef::new(Employees::Performance)
                            .integer()
                            .not_null()
                            .default(100),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_employees_category")
                    .table(Employees::Table)
                    .col(Employees::Category)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DayEntries::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(DayEntries::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(DayEntries::WorkDay).date().not_null())
                    .col(ColumnDef::new(DayEntries::Category).string_len(8).not_null())
                    .col(ColumnDef::new(DayEntries::Title).string_len(200))
                    .col(
                        ColumnDef::new(DayEntries::WorkText)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(DayEntries::DropOff).string_len(5))
                    .col(ColumnDef::new(DayEntries::PickUp).string_len(5))
                    .col(ColumnDef::new(DayEntries::Aw).integer().not_null().default(0))
                    .col(ColumnDef::new(DayEntries::CreatedBy).uuid())
                    .col(
                        ColumnDef::new(DayEntries::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Capacity checks and week views filter by bucket.
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_day_entries_bucket")
                    .table(DayEntries::Table)
                    .col(DayEntries::WorkDay)
                    .col(DayEntries::Category)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Settings::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Settings::Id).integer().not_null().primary_key())
                    .col(ColumnDef::new(Settings::Timezone).string_len(64).not_null())
                    .col(ColumnDef::new(Settings::Opening).json_binary().not_null())
                    .col(
                        ColumnDef::new(Settings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Users::Email)
                            .string_len(254)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::Name).string_len(120))
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::Role).string_len(8).not_null())
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            Users::Table.into_iden(),
            Settings::Table.into_iden(),
            DayEntries::Table.into_iden(),
            Employees::Table.into_iden(),
        ] {
            manager
                .drop_table(Table::drop().table(table).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Employees {
    Table,
    Id,
    Name,
    Category,
    Performance,
}

#[derive(DeriveIden)]
enum DayEntries {
    Table,
    Id,
    WorkDay,
    Category,
    Title,
    WorkText,
    DropOff,
    PickUp,
    Aw,
    CreatedBy,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Settings {
    Table,
    Id,
    Timezone,
    Opening,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Email,
    Name,
    PasswordHash,
    Role,
    CreatedAt,
}
