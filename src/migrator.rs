use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_supplies_table::Migration),
            Box::new(m20250601_000002_create_usage_history_table::Migration),
            Box::new(m20250601_000003_create_users_table::Migration),
        ]
    }
}

// Migration implementations

mod m20250601_000001_create_supplies_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250601_000001_create_supplies_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Supplies::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Supplies::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Supplies::Name).string().not_null())
                        .col(ColumnDef::new(Supplies::Category).string().not_null())
                        .col(ColumnDef::new(Supplies::Quantity).integer().not_null())
                        .col(ColumnDef::new(Supplies::Unit).string().not_null())
                        .col(
                            ColumnDef::new(Supplies::ExpirationDate)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Supplies::PrimarySupplier)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Supplies::CostPerUnit).decimal().null())
                        .col(
                            ColumnDef::new(Supplies::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Supplies::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_supplies_category")
                        .table(Supplies::Table)
                        .col(Supplies::Category)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Supplies::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Supplies {
        Table,
        Id,
        Name,
        Category,
        Quantity,
        Unit,
        ExpirationDate,
        PrimarySupplier,
        CostPerUnit,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250601_000002_create_usage_history_table {
    use sea_orm_migration::prelude::*;

    use super::m20250601_000001_create_supplies_table::Supplies;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250601_000002_create_usage_history_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(UsageHistory::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(UsageHistory::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(UsageHistory::SupplyId).integer().not_null())
                        .col(
                            ColumnDef::new(UsageHistory::QuantityUsed)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(UsageHistory::Timestamp)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_usage_history_supply")
                                .from(UsageHistory::Table, UsageHistory::SupplyId)
                                .to(Supplies::Table, Supplies::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_usage_history_supply_id")
                        .table(UsageHistory::Table)
                        .col(UsageHistory::SupplyId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_usage_history_timestamp")
                        .table(UsageHistory::Table)
                        .col(UsageHistory::Timestamp)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(UsageHistory::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum UsageHistory {
        Table,
        Id,
        SupplyId,
        QuantityUsed,
        Timestamp,
    }
}

mod m20250601_000003_create_users_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250601_000003_create_users_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Users::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Users::Username)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                        .col(ColumnDef::new(Users::Role).string().not_null())
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
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Users {
        Table,
        Id,
        Username,
        PasswordHash,
        Role,
        CreatedAt,
    }
}
