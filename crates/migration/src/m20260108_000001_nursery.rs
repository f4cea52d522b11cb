//! Nursery inventory ledger.
//!
//! - `nursery_plants`: current stock per (name, spec, unit) with its
//!   weighted-average unit price
//! - `nursery_transactions`: immutable snapshot of every in/out movement
//!
//! Quantities and prices are stored as hundredths (`BIGINT`).

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum NurseryPlants {
    Table,
    Id,
    Name,
    Category,
    Spec,
    Unit,
    Quantity,
    Price,
    Location,
    Remark,
    CreateAt,
    UpdateAt,
}

#[derive(Iden)]
enum NurseryTransactions {
    Table,
    Id,
    OrderNo,
    Kind,
    PlantId,
    PlantName,
    Spec,
    Unit,
    Quantity,
    Price,
    TotalPrice,
    Operator,
    Destination,
    Location,
    Remark,
    CreateAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(NurseryPlants::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(NurseryPlants::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(NurseryPlants::Name).string().not_null())
                    .col(ColumnDef::new(NurseryPlants::Category).string())
                    .col(
                        ColumnDef::new(NurseryPlants::Spec)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(NurseryPlants::Unit)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(NurseryPlants::Quantity)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(NurseryPlants::Price)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(NurseryPlants::Location).string())
                    .col(ColumnDef::new(NurseryPlants::Remark).text())
                    .col(
                        ColumnDef::new(NurseryPlants::CreateAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(NurseryPlants::UpdateAt)
                            .timestamp()
                            .not_null(),
                    )
                    .check(Expr::col(NurseryPlants::Quantity).gte(0))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uidx-nursery_plants-name-spec-unit")
                    .table(NurseryPlants::Table)
                    .col(NurseryPlants::Name)
                    .col(NurseryPlants::Spec)
                    .col(NurseryPlants::Unit)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Rows keep plant_id without a foreign key: the snapshot columns stay
        // meaningful after a plant row is gone.
        manager
            .create_table(
                Table::create()
                    .table(NurseryTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(NurseryTransactions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(NurseryTransactions::OrderNo)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(NurseryTransactions::Kind).string().not_null())
                    .col(ColumnDef::new(NurseryTransactions::PlantId).integer())
                    .col(
                        ColumnDef::new(NurseryTransactions::PlantName)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(NurseryTransactions::Spec).string())
                    .col(ColumnDef::new(NurseryTransactions::Unit).string())
                    .col(
                        ColumnDef::new(NurseryTransactions::Quantity)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(NurseryTransactions::Price)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(NurseryTransactions::TotalPrice)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(NurseryTransactions::Operator).string())
                    .col(ColumnDef::new(NurseryTransactions::Destination).string())
                    .col(ColumnDef::new(NurseryTransactions::Location).string())
                    .col(ColumnDef::new(NurseryTransactions::Remark).text())
                    .col(
                        ColumnDef::new(NurseryTransactions::CreateAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-nursery_transactions-order_no")
                    .table(NurseryTransactions::Table)
                    .col(NurseryTransactions::OrderNo)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-nursery_transactions-kind-create_at")
                    .table(NurseryTransactions::Table)
                    .col(NurseryTransactions::Kind)
                    .col(NurseryTransactions::CreateAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(NurseryTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(NurseryPlants::Table).to_owned())
            .await?;
        Ok(())
    }
}
