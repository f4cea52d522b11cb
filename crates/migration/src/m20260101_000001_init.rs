//! Initial schema migration.
//!
//! Creates the back-office tables:
//!
//! - `users`: API logins
//! - `suppliers`: companies we buy from (payees)
//! - `payers`: paying entities (organisations or individuals)
//! - `projects` / `attachments`: projects and their uploaded files
//! - `orders`: material orders placed with suppliers
//! - `pays`: payments against orders
//! - `dictionaries` / `dictionary_details`: code/value lookup tables

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Username,
    PasswordHash,
    CreateAt,
}

#[derive(Iden)]
enum Suppliers {
    Table,
    Id,
    TypeId,
    Name,
    ContactPerson,
    Phone,
    Email,
    BankName,
    AccountNumber,
    Address,
    Remark,
    CreateAt,
}

#[derive(Iden)]
enum Payers {
    Table,
    Id,
    TypeId,
    Name,
    BankName,
    AccountNumber,
    Remark,
    CreateAt,
}

#[derive(Iden)]
enum Projects {
    Table,
    Id,
    ProjectName,
    ProjectFullName,
    ProjectScale,
    StartDate,
    EndDate,
    ProjectStatus,
    ProjectAmount,
    CreateAt,
}

#[derive(Iden)]
enum Attachments {
    Table,
    Id,
    ProjectId,
    AttachmentCode,
    Filename,
    OriginalFilename,
    FilePath,
    FileSize,
    CreateAt,
}

#[derive(Iden)]
enum Orders {
    Table,
    Id,
    OrderNumber,
    MaterialName,
    ProjectName,
    SupplierId,
    ContactPhone,
    CuttingTime,
    EstimatedArrivalTime,
    MaterialDetails,
    OrderAmount,
    MaterialManager,
    SubProjectManager,
    Attachments,
    CreateAt,
}

#[derive(Iden)]
enum Pays {
    Table,
    Id,
    PayNumber,
    OrderId,
    PayerSupplierId,
    PayeeSupplierId,
    PaymentPurpose,
    CurrentPaymentAmount,
    InvoiceAmount,
    PaymentStatus,
    Handler,
    CreateAt,
}

#[derive(Iden)]
enum Dictionaries {
    Table,
    Id,
    Code,
    Name,
    ValidMark,
    CreateUser,
    CreateTime,
    UpdateUser,
    UpdateTime,
}

#[derive(Iden)]
enum DictionaryDetails {
    Table,
    Id,
    DicId,
    Code,
    Value,
    OrderNo,
    ValidMark,
    CreateUser,
    CreateTime,
    UpdateUser,
    UpdateTime,
}

fn id_col<T: Iden + 'static>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::CreateAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Suppliers
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Suppliers::Table)
                    .if_not_exists()
                    .col(id_col(Suppliers::Id))
                    .col(ColumnDef::new(Suppliers::TypeId).integer().not_null())
                    .col(ColumnDef::new(Suppliers::Name).string().not_null())
                    .col(ColumnDef::new(Suppliers::ContactPerson).string().not_null())
                    .col(ColumnDef::new(Suppliers::Phone).string().not_null())
                    .col(ColumnDef::new(Suppliers::Email).string())
                    .col(ColumnDef::new(Suppliers::BankName).string().not_null())
                    .col(ColumnDef::new(Suppliers::AccountNumber).string().not_null())
                    .col(ColumnDef::new(Suppliers::Address).text())
                    .col(ColumnDef::new(Suppliers::Remark).text())
                    .col(ColumnDef::new(Suppliers::CreateAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Payers
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Payers::Table)
                    .if_not_exists()
                    .col(id_col(Payers::Id))
                    .col(ColumnDef::new(Payers::TypeId).integer().not_null())
                    .col(ColumnDef::new(Payers::Name).string().not_null())
                    .col(ColumnDef::new(Payers::BankName).string())
                    .col(ColumnDef::new(Payers::AccountNumber).string())
                    .col(ColumnDef::new(Payers::Remark).text())
                    .col(ColumnDef::new(Payers::CreateAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Projects + attachments
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Projects::Table)
                    .if_not_exists()
                    .col(id_col(Projects::Id))
                    .col(ColumnDef::new(Projects::ProjectName).string().not_null())
                    .col(ColumnDef::new(Projects::ProjectFullName).string())
                    .col(ColumnDef::new(Projects::ProjectScale).string())
                    .col(ColumnDef::new(Projects::StartDate).date())
                    .col(ColumnDef::new(Projects::EndDate).date())
                    .col(ColumnDef::new(Projects::ProjectStatus).string())
                    .col(ColumnDef::new(Projects::ProjectAmount).big_integer())
                    .col(ColumnDef::new(Projects::CreateAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Attachments::Table)
                    .if_not_exists()
                    .col(id_col(Attachments::Id))
                    .col(ColumnDef::new(Attachments::ProjectId).integer().not_null())
                    .col(
                        ColumnDef::new(Attachments::AttachmentCode)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Attachments::Filename).string().not_null())
                    .col(
                        ColumnDef::new(Attachments::OriginalFilename)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Attachments::FilePath).string().not_null())
                    .col(
                        ColumnDef::new(Attachments::FileSize)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Attachments::CreateAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-attachments-project_id")
                            .from(Attachments::Table, Attachments::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-attachments-project_id")
                    .table(Attachments::Table)
                    .col(Attachments::ProjectId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Orders
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(id_col(Orders::Id))
                    .col(ColumnDef::new(Orders::OrderNumber).string().not_null())
                    .col(ColumnDef::new(Orders::MaterialName).string().not_null())
                    .col(ColumnDef::new(Orders::ProjectName).string())
                    .col(ColumnDef::new(Orders::SupplierId).integer())
                    .col(ColumnDef::new(Orders::ContactPhone).string())
                    .col(ColumnDef::new(Orders::CuttingTime).date())
                    .col(ColumnDef::new(Orders::EstimatedArrivalTime).date())
                    .col(ColumnDef::new(Orders::MaterialDetails).text())
                    .col(ColumnDef::new(Orders::OrderAmount).big_integer())
                    .col(ColumnDef::new(Orders::MaterialManager).string())
                    .col(ColumnDef::new(Orders::SubProjectManager).string())
                    .col(ColumnDef::new(Orders::Attachments).text())
                    .col(ColumnDef::new(Orders::CreateAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-orders-supplier_id")
                            .from(Orders::Table, Orders::SupplierId)
                            .to(Suppliers::Table, Suppliers::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uidx-orders-order_number")
                    .table(Orders::Table)
                    .col(Orders::OrderNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Payments
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Pays::Table)
                    .if_not_exists()
                    .col(id_col(Pays::Id))
                    .col(ColumnDef::new(Pays::PayNumber).string().not_null())
                    .col(ColumnDef::new(Pays::OrderId).integer())
                    .col(ColumnDef::new(Pays::PayerSupplierId).integer())
                    .col(ColumnDef::new(Pays::PayeeSupplierId).integer())
                    .col(ColumnDef::new(Pays::PaymentPurpose).text())
                    .col(ColumnDef::new(Pays::CurrentPaymentAmount).big_integer())
                    .col(ColumnDef::new(Pays::InvoiceAmount).big_integer())
                    .col(ColumnDef::new(Pays::PaymentStatus).string())
                    .col(ColumnDef::new(Pays::Handler).string())
                    .col(ColumnDef::new(Pays::CreateAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-pays-order_id")
                            .from(Pays::Table, Pays::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-pays-payer_supplier_id")
                            .from(Pays::Table, Pays::PayerSupplierId)
                            .to(Payers::Table, Payers::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-pays-payee_supplier_id")
                            .from(Pays::Table, Pays::PayeeSupplierId)
                            .to(Suppliers::Table, Suppliers::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uidx-pays-pay_number")
                    .table(Pays::Table)
                    .col(Pays::PayNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-pays-order_id")
                    .table(Pays::Table)
                    .col(Pays::OrderId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 7. Dictionaries
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Dictionaries::Table)
                    .if_not_exists()
                    .col(id_col(Dictionaries::Id))
                    .col(ColumnDef::new(Dictionaries::Code).string().not_null())
                    .col(ColumnDef::new(Dictionaries::Name).string().not_null())
                    .col(
                        ColumnDef::new(Dictionaries::ValidMark)
                            .string()
                            .not_null()
                            .default("Y"),
                    )
                    .col(ColumnDef::new(Dictionaries::CreateUser).string())
                    .col(ColumnDef::new(Dictionaries::CreateTime).timestamp())
                    .col(ColumnDef::new(Dictionaries::UpdateUser).string())
                    .col(ColumnDef::new(Dictionaries::UpdateTime).timestamp())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uidx-dictionaries-code")
                    .table(Dictionaries::Table)
                    .col(Dictionaries::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DictionaryDetails::Table)
                    .if_not_exists()
                    .col(id_col(DictionaryDetails::Id))
                    .col(ColumnDef::new(DictionaryDetails::DicId).integer().not_null())
                    .col(ColumnDef::new(DictionaryDetails::Code).string().not_null())
                    .col(ColumnDef::new(DictionaryDetails::Value).string().not_null())
                    .col(
                        ColumnDef::new(DictionaryDetails::OrderNo)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(DictionaryDetails::ValidMark)
                            .string()
                            .not_null()
                            .default("Y"),
                    )
                    .col(ColumnDef::new(DictionaryDetails::CreateUser).string())
                    .col(ColumnDef::new(DictionaryDetails::CreateTime).timestamp())
                    .col(ColumnDef::new(DictionaryDetails::UpdateUser).string())
                    .col(ColumnDef::new(DictionaryDetails::UpdateTime).timestamp())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-dictionary_details-dic_id")
                            .from(DictionaryDetails::Table, DictionaryDetails::DicId)
                            .to(Dictionaries::Table, Dictionaries::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-dictionary_details-dic_id-order_no")
                    .table(DictionaryDetails::Table)
                    .col(DictionaryDetails::DicId)
                    .col(DictionaryDetails::OrderNo)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DictionaryDetails::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Dictionaries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Pays::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Orders::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Attachments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Projects::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Payers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Suppliers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
