use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Enable foreign keys for SQLite
        if manager.get_database_backend() == sea_orm::DatabaseBackend::Sqlite {
            manager
                .get_connection()
                .execute_unprepared("PRAGMA foreign_keys = ON")
                .await?;
        }

        // Create auth_group table
        manager
            .create_table(
                Table::create()
                    .table(AuthGroup::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AuthGroup::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(big_integer_null(AuthGroup::Pid))
                    .col(string(AuthGroup::Name))
                    .col(string(AuthGroup::Rules))
                    .col(
                        ColumnDef::new(AuthGroup::Status)
                            .string()
                            .not_null()
                            .default("active"),
                    )
                    .to_owned(),
            )
            .await?;

        // Create auth_group_access table (user <-> group, many-to-many)
        manager
            .create_table(
                Table::create()
                    .table(AuthGroupAccess::Table)
                    .if_not_exists()
                    .col(big_integer(AuthGroupAccess::Uid))
                    .col(big_integer(AuthGroupAccess::GroupId))
                    .primary_key(
                        Index::create()
                            .col(AuthGroupAccess::Uid)
                            .col(AuthGroupAccess::GroupId),
                    )
                    .to_owned(),
            )
            .await?;

        // Create auth_rule table
        manager
            .create_table(
                Table::create()
                    .table(AuthRule::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AuthRule::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(big_integer_null(AuthRule::Pid))
                    .col(
                        ColumnDef::new(AuthRule::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(string(AuthRule::Title))
                    .col(
                        ColumnDef::new(AuthRule::RuleType)
                            .big_integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(AuthRule::Status)
                            .string()
                            .not_null()
                            .default("active"),
                    )
                    .col(string_null(AuthRule::Condition))
                    .col(string_null(AuthRule::Icon))
                    .col(string_null(AuthRule::MenuType))
                    .to_owned(),
            )
            .await?;

        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Uid)
                            .big_integer()
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
                    .col(string_null(Users::Email))
                    .col(
                        ColumnDef::new(Users::Score)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Users::Level)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(big_integer(Users::CreatedAt))
                    .to_owned(),
            )
            .await?;

        // Create properties table (session-backed rule list persistence)
        manager
            .create_table(
                Table::create()
                    .table(Properties::Table)
                    .if_not_exists()
                    .col(string(Properties::Owner))
                    .col(string(Properties::Key))
                    .col(string(Properties::Value))
                    .col(big_integer(Properties::UpdatedAt))
                    .primary_key(Index::create().col(Properties::Owner).col(Properties::Key))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Properties::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AuthRule::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AuthGroupAccess::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AuthGroup::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum AuthGroup {
    Table,
    Id,
    Pid,
    Name,
    Rules,
    Status,
}

#[derive(DeriveIden)]
enum AuthGroupAccess {
    Table,
    Uid,
    GroupId,
}

#[derive(DeriveIden)]
enum AuthRule {
    Table,
    Id,
    Pid,
    Name,
    Title,
    RuleType,
    Status,
    Condition,
    Icon,
    MenuType,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Uid,
    Username,
    Email,
    Score,
    Level,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Properties {
    Table,
    Owner,
    Key,
    Value,
    UpdatedAt,
}
