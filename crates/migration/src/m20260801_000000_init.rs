//! Initial schema migration - creates all tables from scratch.
//!
//! Tables:
//!
//! - `category_types`: the closed Necessity/Want/Savings set, seeded here
//! - `categories`: user-owned spending categories (mutable)
//! - `transactions`: the expense ledger, with a denormalized category
//!   snapshot captured at insert time
//! - `user_balances`: current wallet balance and reference balance per user

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum CategoryTypes {
    Table,
    Id,
    Label,
}

#[derive(Iden)]
enum Categories {
    Table,
    Id,
    UserId,
    Name,
    Icon,
    ImagePath,
    Color,
    CategoryType,
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    UserId,
    AmountMinor,
    EntryDate,
    Comment,
    CategoryName,
    CategoryIcon,
    CategoryImagePath,
    CategoryColor,
    CategoryType,
    CategoryTypeLabel,
}

#[derive(Iden)]
enum UserBalances {
    Table,
    UserId,
    CurrentMinor,
    ReferenceMinor,
    Currency,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Category types (closed set, seeded below)
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(CategoryTypes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CategoryTypes::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CategoryTypes::Label).string().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Categories
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Categories::UserId).string().not_null())
                    .col(ColumnDef::new(Categories::Name).string().not_null())
                    .col(ColumnDef::new(Categories::Icon).string().not_null())
                    .col(ColumnDef::new(Categories::ImagePath).string())
                    .col(ColumnDef::new(Categories::Color).integer())
                    .col(ColumnDef::new(Categories::CategoryType).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-categories-category_type")
                            .from(Categories::Table, Categories::CategoryType)
                            .to(CategoryTypes::Table, CategoryTypes::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-categories-user_id")
                    .table(Categories::Table)
                    .col(Categories::UserId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Transactions (ledger rows with the category snapshot inlined)
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::UserId).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    // Plain `YYYY-MM-DD` text: lexicographic order equals
                    // chronological order, and range queries compare strings.
                    .col(ColumnDef::new(Transactions::EntryDate).string().not_null())
                    .col(ColumnDef::new(Transactions::Comment).string())
                    .col(
                        ColumnDef::new(Transactions::CategoryName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::CategoryIcon)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::CategoryImagePath).string())
                    .col(ColumnDef::new(Transactions::CategoryColor).integer())
                    .col(
                        ColumnDef::new(Transactions::CategoryType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::CategoryTypeLabel)
                            .string()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-category_type")
                            .from(Transactions::Table, Transactions::CategoryType)
                            .to(CategoryTypes::Table, CategoryTypes::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-user_id-entry_date")
                    .table(Transactions::Table)
                    .col(Transactions::UserId)
                    .col(Transactions::EntryDate)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. User balances
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(UserBalances::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserBalances::UserId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(UserBalances::CurrentMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UserBalances::ReferenceMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UserBalances::Currency)
                            .string()
                            .not_null()
                            .default("USD"),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Seed the closed category-type set
        // ───────────────────────────────────────────────────────────────────
        let seed = Query::insert()
            .into_table(CategoryTypes::Table)
            .columns([CategoryTypes::Id, CategoryTypes::Label])
            .values_panic(["necessity".into(), "Necesidad".into()])
            .values_panic(["want".into(), "Deseo".into()])
            .values_panic(["savings".into(), "Ahorro".into()])
            .to_owned();
        manager.exec_stmt(seed).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserBalances::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CategoryTypes::Table).to_owned())
            .await?;
        Ok(())
    }
}
