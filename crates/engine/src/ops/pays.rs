use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveValue, Condition, ConnectionTrait, DatabaseTransaction, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait, prelude::*, sea_query::Query,
};

use crate::{
    EngineError, Page, PageRequest, Pay, PayDetail, PayNew, PayUpdate, ResultEngine, orders,
    payers, pays, suppliers,
    util::{ensure_non_negative, normalize_optional_text, normalize_required},
};

use super::{
    Engine, apply_nullable, apply_optional, apply_required, day_filter, like_filter, with_tx,
};

/// Filters for listing payments.
///
/// Ids match exactly, text fields match substrings, `create_at` matches a
/// `YYYY-MM-DD` day (malformed values are ignored).
#[derive(Clone, Debug, Default)]
pub struct PayFilter {
    pub id: Option<i32>,
    pub order_id: Option<i32>,
    pub payer_supplier_id: Option<i32>,
    pub payee_supplier_id: Option<i32>,
    pub pay_number: Option<String>,
    pub payment_status: Option<String>,
    pub handler: Option<String>,
    pub order_number: Option<String>,
    pub payer_supplier_name: Option<String>,
    pub payee_supplier_name: Option<String>,
    pub create_at: Option<String>,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl PayFilter {
    fn condition(&self) -> Condition {
        let mut cond = Condition::all();
        if let Some(id) = self.id {
            cond = cond.add(pays::Column::Id.eq(id));
        }
        if let Some(order_id) = self.order_id {
            cond = cond.add(pays::Column::OrderId.eq(order_id));
        }
        if let Some(payer_id) = self.payer_supplier_id {
            cond = cond.add(pays::Column::PayerSupplierId.eq(payer_id));
        }
        if let Some(payee_id) = self.payee_supplier_id {
            cond = cond.add(pays::Column::PayeeSupplierId.eq(payee_id));
        }
        cond = like_filter(cond, pays::Column::PayNumber, self.pay_number.as_deref());
        cond = like_filter(
            cond,
            pays::Column::PaymentStatus,
            self.payment_status.as_deref(),
        );
        cond = like_filter(cond, pays::Column::Handler, self.handler.as_deref());

        if let Some(number) = non_blank(self.order_number.as_deref()) {
            cond = cond.add(
                pays::Column::OrderId.in_subquery(
                    Query::select()
                        .column(orders::Column::Id)
                        .from(orders::Entity)
                        .and_where(orders::Column::OrderNumber.contains(number))
                        .to_owned(),
                ),
            );
        }
        if let Some(name) = non_blank(self.payer_supplier_name.as_deref()) {
            cond = cond.add(
                pays::Column::PayerSupplierId.in_subquery(
                    Query::select()
                        .column(payers::Column::Id)
                        .from(payers::Entity)
                        .and_where(payers::Column::Name.contains(name))
                        .to_owned(),
                ),
            );
        }
        if let Some(name) = non_blank(self.payee_supplier_name.as_deref()) {
            cond = cond.add(
                pays::Column::PayeeSupplierId.in_subquery(
                    Query::select()
                        .column(suppliers::Column::Id)
                        .from(suppliers::Entity)
                        .and_where(suppliers::Column::Name.contains(name))
                        .to_owned(),
                ),
            );
        }
        day_filter(cond, pays::Column::CreateAt, self.create_at.as_deref())
    }
}

/// Resolve order numbers and payer/payee names for a batch of payments.
pub(super) async fn load_pay_details<C: ConnectionTrait>(
    db: &C,
    models: Vec<pays::Model>,
) -> ResultEngine<Vec<PayDetail>> {
    let order_ids: Vec<i32> = models.iter().filter_map(|m| m.order_id).collect();
    let payer_ids: Vec<i32> = models.iter().filter_map(|m| m.payer_supplier_id).collect();
    let payee_ids: Vec<i32> = models.iter().filter_map(|m| m.payee_supplier_id).collect();

    let order_numbers: HashMap<i32, String> = if order_ids.is_empty() {
        HashMap::new()
    } else {
        orders::Entity::find()
            .filter(orders::Column::Id.is_in(order_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|o| (o.id, o.order_number))
            .collect()
    };
    let payer_names: HashMap<i32, String> = if payer_ids.is_empty() {
        HashMap::new()
    } else {
        payers::Entity::find()
            .filter(payers::Column::Id.is_in(payer_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|p| (p.id, p.name))
            .collect()
    };
    let payee_names: HashMap<i32, String> = if payee_ids.is_empty() {
        HashMap::new()
    } else {
        suppliers::Entity::find()
            .filter(suppliers::Column::Id.is_in(payee_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|s| (s.id, s.name))
            .collect()
    };

    Ok(models
        .into_iter()
        .map(|model| {
            let pay = Pay::from(model);
            PayDetail {
                order_number: pay.order_id.and_then(|id| order_numbers.get(&id).cloned()),
                payer_name: pay
                    .payer_supplier_id
                    .and_then(|id| payer_names.get(&id).cloned()),
                payee_name: pay
                    .payee_supplier_id
                    .and_then(|id| payee_names.get(&id).cloned()),
                pay,
            }
        })
        .collect())
}

impl Engine {
    /// Check that every referenced row of a payment exists.
    async fn check_pay_references(
        &self,
        db_tx: &DatabaseTransaction,
        pay: &Pay,
    ) -> ResultEngine<()> {
        if let Some(order_id) = pay.order_id
            && orders::Entity::find_by_id(order_id).one(db_tx).await?.is_none()
        {
            return Err(EngineError::KeyNotFound(format!("order {order_id}")));
        }
        if let Some(payer_id) = pay.payer_supplier_id
            && payers::Entity::find_by_id(payer_id).one(db_tx).await?.is_none()
        {
            return Err(EngineError::KeyNotFound(format!("payer {payer_id}")));
        }
        if let Some(supplier_id) = pay.payee_supplier_id
            && suppliers::Entity::find_by_id(supplier_id)
                .one(db_tx)
                .await?
                .is_none()
        {
            return Err(EngineError::KeyNotFound(format!("supplier {supplier_id}")));
        }
        Ok(())
    }

    async fn ensure_pay_number_free(
        &self,
        db_tx: &DatabaseTransaction,
        pay_number: &str,
        except_id: Option<i32>,
    ) -> ResultEngine<()> {
        let mut query = pays::Entity::find().filter(pays::Column::PayNumber.eq(pay_number));
        if let Some(id) = except_id {
            query = query.filter(pays::Column::Id.ne(id));
        }
        if query.one(db_tx).await?.is_some() {
            return Err(EngineError::ExistingKey(pay_number.to_string()));
        }
        Ok(())
    }

    async fn pay_detail_tx(&self, db_tx: &DatabaseTransaction, id: i32) -> ResultEngine<PayDetail> {
        let model = pays::Entity::find_by_id(id)
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("pay {id}")))?;
        load_pay_details(db_tx, vec![model])
            .await?
            .pop()
            .ok_or_else(|| EngineError::KeyNotFound(format!("pay {id}")))
    }

    /// Return a payment with its order number and payer/payee names.
    pub async fn pay(&self, id: i32) -> ResultEngine<PayDetail> {
        with_tx!(self, |db_tx| self.pay_detail_tx(&db_tx, id).await)
    }

    /// Record a new payment.
    pub async fn new_pay(&self, cmd: PayNew) -> ResultEngine<PayDetail> {
        ensure_non_negative(cmd.current_payment_amount, "current_payment_amount")?;
        ensure_non_negative(cmd.invoice_amount, "invoice_amount")?;
        let pay = Pay {
            id: 0,
            pay_number: normalize_required(&cmd.pay_number, "pay_number")?,
            order_id: cmd.order_id,
            payer_supplier_id: cmd.payer_supplier_id,
            payee_supplier_id: cmd.payee_supplier_id,
            payment_purpose: normalize_optional_text(cmd.payment_purpose.as_deref()),
            current_payment_amount: cmd.current_payment_amount,
            invoice_amount: cmd.invoice_amount,
            payment_status: normalize_optional_text(cmd.payment_status.as_deref()),
            handler: normalize_optional_text(cmd.handler.as_deref()),
            create_at: cmd.create_at.unwrap_or_else(Utc::now),
        };

        with_tx!(self, |db_tx| {
            self.ensure_pay_number_free(&db_tx, &pay.pay_number, None)
                .await?;
            self.check_pay_references(&db_tx, &pay).await?;
            let model = pays::ActiveModel::from(&pay).insert(&db_tx).await?;
            self.pay_detail_tx(&db_tx, model.id).await
        })
    }

    /// Partially update a payment.
    pub async fn update_pay(&self, id: i32, cmd: PayUpdate) -> ResultEngine<PayDetail> {
        ensure_non_negative(
            cmd.current_payment_amount.flatten(),
            "current_payment_amount",
        )?;
        ensure_non_negative(cmd.invoice_amount.flatten(), "invoice_amount")?;
        with_tx!(self, |db_tx| {
            let model = pays::Entity::find_by_id(id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(format!("pay {id}")))?;
            let mut pay = Pay::from(model);

            apply_required(&mut pay.pay_number, cmd.pay_number.as_deref(), "pay_number")?;
            apply_nullable(&mut pay.order_id, cmd.order_id);
            apply_nullable(&mut pay.payer_supplier_id, cmd.payer_supplier_id);
            apply_nullable(&mut pay.payee_supplier_id, cmd.payee_supplier_id);
            apply_optional(&mut pay.payment_purpose, cmd.payment_purpose.as_deref());
            apply_nullable(&mut pay.current_payment_amount, cmd.current_payment_amount);
            apply_nullable(&mut pay.invoice_amount, cmd.invoice_amount);
            apply_optional(&mut pay.payment_status, cmd.payment_status.as_deref());
            apply_optional(&mut pay.handler, cmd.handler.as_deref());
            if let Some(create_at) = cmd.create_at {
                pay.create_at = create_at;
            }

            self.ensure_pay_number_free(&db_tx, &pay.pay_number, Some(id))
                .await?;
            self.check_pay_references(&db_tx, &pay).await?;

            let mut active = pays::ActiveModel::from(&pay);
            active.id = ActiveValue::Unchanged(id);
            active.update(&db_tx).await?;
            self.pay_detail_tx(&db_tx, id).await
        })
    }

    /// Delete a payment.
    pub async fn delete_pay(&self, id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let result = pays::Entity::delete_by_id(id).exec(&db_tx).await?;
            if result.rows_affected == 0 {
                return Err(EngineError::KeyNotFound(format!("pay {id}")));
            }
            Ok(())
        })
    }

    /// List payments, newest first.
    pub async fn list_pays(
        &self,
        filter: &PayFilter,
        page: PageRequest,
    ) -> ResultEngine<Page<PayDetail>> {
        with_tx!(self, |db_tx| {
            let query = pays::Entity::find().filter(filter.condition());
            let total = query.clone().count(&db_tx).await?;
            let models = query
                .order_by_desc(pays::Column::Id)
                .offset(page.offset())
                .limit(page.limit)
                .all(&db_tx)
                .await?;
            let items = load_pay_details(&db_tx, models).await?;
            Ok(Page { items, total })
        })
    }
}
