use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, Condition, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait, prelude::*, sea_query::Expr,
};

use crate::{
    EngineError, Page, PageRequest, ResultEngine, Supplier, SupplierNew, SupplierUpdate, orders,
    pays, suppliers,
    util::{normalize_optional_text, normalize_required},
};

use super::{Engine, apply_optional, apply_required, like_filter, with_tx};

/// Filters for listing suppliers. Text filters match substrings.
#[derive(Clone, Debug, Default)]
pub struct SupplierFilter {
    pub type_id: Option<i32>,
    pub name: Option<String>,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
    pub address: Option<String>,
    pub remark: Option<String>,
}

impl SupplierFilter {
    fn condition(&self) -> Condition {
        let mut cond = Condition::all();
        if let Some(type_id) = self.type_id {
            cond = cond.add(suppliers::Column::TypeId.eq(type_id));
        }
        cond = like_filter(cond, suppliers::Column::Name, self.name.as_deref());
        cond = like_filter(
            cond,
            suppliers::Column::ContactPerson,
            self.contact_person.as_deref(),
        );
        cond = like_filter(cond, suppliers::Column::Phone, self.phone.as_deref());
        cond = like_filter(cond, suppliers::Column::Email, self.email.as_deref());
        cond = like_filter(cond, suppliers::Column::BankName, self.bank_name.as_deref());
        cond = like_filter(
            cond,
            suppliers::Column::AccountNumber,
            self.account_number.as_deref(),
        );
        cond = like_filter(cond, suppliers::Column::Address, self.address.as_deref());
        like_filter(cond, suppliers::Column::Remark, self.remark.as_deref())
    }
}

fn validate_type_id(type_id: i32) -> ResultEngine<()> {
    if type_id <= 0 {
        return Err(EngineError::InvalidInput(format!(
            "invalid supplier type_id: {type_id}"
        )));
    }
    Ok(())
}

fn build_supplier(cmd: &SupplierNew, create_at: DateTime<Utc>) -> ResultEngine<Supplier> {
    validate_type_id(cmd.type_id)?;
    Ok(Supplier {
        id: 0,
        type_id: cmd.type_id,
        name: normalize_required(&cmd.name, "name")?,
        contact_person: normalize_required(&cmd.contact_person, "contact_person")?,
        phone: normalize_required(&cmd.phone, "phone")?,
        email: normalize_optional_text(cmd.email.as_deref()),
        bank_name: normalize_required(&cmd.bank_name, "bank_name")?,
        account_number: normalize_required(&cmd.account_number, "account_number")?,
        address: normalize_optional_text(cmd.address.as_deref()),
        remark: normalize_optional_text(cmd.remark.as_deref()),
        create_at,
    })
}

impl Engine {
    /// Return a supplier.
    pub async fn supplier(&self, id: i32) -> ResultEngine<Supplier> {
        let model = suppliers::Entity::find_by_id(id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("supplier {id}")))?;
        Ok(model.into())
    }

    /// Add a new supplier.
    pub async fn new_supplier(&self, cmd: SupplierNew) -> ResultEngine<Supplier> {
        let supplier = build_supplier(&cmd, Utc::now())?;
        with_tx!(self, |db_tx| {
            let model = suppliers::ActiveModel::from(&supplier)
                .insert(&db_tx)
                .await?;
            Ok(Supplier::from(model))
        })
    }

    /// Insert many suppliers at once. Either every row is stored or none.
    ///
    /// Returns the number of inserted rows.
    pub async fn import_suppliers(&self, rows: Vec<SupplierNew>) -> ResultEngine<usize> {
        let now = Utc::now();
        let records = rows
            .iter()
            .enumerate()
            .map(|(idx, cmd)| {
                build_supplier(cmd, now).map_err(|err| {
                    EngineError::InvalidInput(format!("row {}: {err}", idx + 1))
                })
            })
            .collect::<ResultEngine<Vec<_>>>()?;

        with_tx!(self, |db_tx| {
            for supplier in &records {
                suppliers::ActiveModel::from(supplier).insert(&db_tx).await?;
            }
            Ok(records.len())
        })
    }

    /// Partially update a supplier.
    pub async fn update_supplier(&self, id: i32, cmd: SupplierUpdate) -> ResultEngine<Supplier> {
        with_tx!(self, |db_tx| {
            let model = suppliers::Entity::find_by_id(id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(format!("supplier {id}")))?;
            let mut supplier = Supplier::from(model);

            if let Some(type_id) = cmd.type_id {
                validate_type_id(type_id)?;
                supplier.type_id = type_id;
            }
            apply_required(&mut supplier.name, cmd.name.as_deref(), "name")?;
            apply_required(
                &mut supplier.contact_person,
                cmd.contact_person.as_deref(),
                "contact_person",
            )?;
            apply_required(&mut supplier.phone, cmd.phone.as_deref(), "phone")?;
            apply_optional(&mut supplier.email, cmd.email.as_deref());
            apply_required(&mut supplier.bank_name, cmd.bank_name.as_deref(), "bank_name")?;
            apply_required(
                &mut supplier.account_number,
                cmd.account_number.as_deref(),
                "account_number",
            )?;
            apply_optional(&mut supplier.address, cmd.address.as_deref());
            apply_optional(&mut supplier.remark, cmd.remark.as_deref());

            let mut active = suppliers::ActiveModel::from(&supplier);
            active.id = ActiveValue::Unchanged(id);
            let model = active.update(&db_tx).await?;
            Ok(Supplier::from(model))
        })
    }

    /// Delete a supplier, detaching it from orders and payments first.
    pub async fn delete_supplier(&self, id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            suppliers::Entity::find_by_id(id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(format!("supplier {id}")))?;

            orders::Entity::update_many()
                .col_expr(orders::Column::SupplierId, Expr::value(Option::<i32>::None))
                .filter(orders::Column::SupplierId.eq(id))
                .exec(&db_tx)
                .await?;
            pays::Entity::update_many()
                .col_expr(
                    pays::Column::PayeeSupplierId,
                    Expr::value(Option::<i32>::None),
                )
                .filter(pays::Column::PayeeSupplierId.eq(id))
                .exec(&db_tx)
                .await?;

            suppliers::Entity::delete_by_id(id).exec(&db_tx).await?;
            Ok(())
        })
    }

    /// List suppliers, newest first.
    pub async fn list_suppliers(
        &self,
        filter: &SupplierFilter,
        page: PageRequest,
    ) -> ResultEngine<Page<Supplier>> {
        with_tx!(self, |db_tx| {
            let query = suppliers::Entity::find().filter(filter.condition());
            let total = query.clone().count(&db_tx).await?;
            let items = query
                .order_by_desc(suppliers::Column::Id)
                .offset(page.offset())
                .limit(page.limit)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Supplier::from)
                .collect();
            Ok(Page { items, total })
        })
    }

    /// Every supplier ordered by id (used for exports).
    pub async fn all_suppliers(&self) -> ResultEngine<Vec<Supplier>> {
        let models = suppliers::Entity::find()
            .order_by_asc(suppliers::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Supplier::from).collect())
    }
}
