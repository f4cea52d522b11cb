//! Seeds the lookup dictionaries the UI expects to exist:
//!
//! - `gyslx` supplier/payer type (1 organisation, 2 individual)
//! - `fkzt` payment status

use sea_orm::{ConnectionTrait, DbErr, Statement};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Dictionaries {
    Table,
    Id,
    Code,
    Name,
    ValidMark,
}

#[derive(Iden)]
enum DictionaryDetails {
    Table,
    DicId,
    Code,
    Value,
    OrderNo,
    ValidMark,
}

const SEEDS: &[(&str, &str, &[(&str, &str)])] = &[
    ("gyslx", "Supplier type", &[("1", "organisation"), ("2", "individual")]),
    (
        "fkzt",
        "Payment status",
        &[
            ("unpaid", "unpaid"),
            ("partially_paid", "partially paid"),
            ("paid", "paid"),
        ],
    ),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        let backend = db.get_database_backend();

        for (code, name, details) in SEEDS {
            let existing = db
                .query_one(Statement::from_sql_and_values(
                    backend,
                    "SELECT id FROM dictionaries WHERE code = ? LIMIT 1;",
                    [(*code).into()],
                ))
                .await?;
            if existing.is_some() {
                continue;
            }

            let insert = Query::insert()
                .into_table(Dictionaries::Table)
                .columns([Dictionaries::Code, Dictionaries::Name, Dictionaries::ValidMark])
                .values_panic([(*code).into(), (*name).into(), "Y".into()])
                .to_owned();
            db.execute(backend.build(&insert)).await?;

            let lookup = Query::select()
                .column(Dictionaries::Id)
                .from(Dictionaries::Table)
                .and_where(Expr::col(Dictionaries::Code).eq(*code))
                .to_owned();
            let row = db
                .query_one(backend.build(&lookup))
                .await?
                .ok_or_else(|| DbErr::Custom(format!("dictionary {code} missing after insert")))?;
            let dic_id: i32 = row.try_get("", "id")?;

            for (order_no, (detail_code, value)) in details.iter().enumerate() {
                let order_no = <i32 as TryFrom<usize>>::try_from(order_no + 1)
                    .map_err(|_| DbErr::Custom("too many seed details".to_string()))?;
                let insert = Query::insert()
                    .into_table(DictionaryDetails::Table)
                    .columns([
                        DictionaryDetails::DicId,
                        DictionaryDetails::Code,
                        DictionaryDetails::Value,
                        DictionaryDetails::OrderNo,
                        DictionaryDetails::ValidMark,
                    ])
                    .values_panic([
                        dic_id.into(),
                        (*detail_code).into(),
                        (*value).into(),
                        order_no.into(),
                        "Y".into(),
                    ])
                    .to_owned();
                db.execute(backend.build(&insert)).await?;
            }
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        let backend = db.get_database_backend();

        for (code, _, _) in SEEDS {
            db.execute(Statement::from_sql_and_values(
                backend,
                "DELETE FROM dictionary_details WHERE dic_id IN (SELECT id FROM dictionaries WHERE code = ?);",
                [(*code).into()],
            ))
            .await?;
            db.execute(Statement::from_sql_and_values(
                backend,
                "DELETE FROM dictionaries WHERE code = ?;",
                [(*code).into()],
            ))
            .await?;
        }
        Ok(())
    }
}
