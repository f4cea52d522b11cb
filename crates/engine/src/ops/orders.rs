use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveValue, Condition, ConnectionTrait, DatabaseTransaction, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait, prelude::*, sea_query::Expr, sea_query::Query,
};

use crate::{
    EngineError, MoneyCents, Order, OrderDetail, OrderNew, OrderUpdate, Page, PageRequest,
    PayDetail, ResultEngine, orders, pays, suppliers,
    util::{ensure_non_negative, normalize_optional_text, normalize_required},
};

use super::{
    Engine, amount_like_filter, apply_nullable, apply_optional, apply_required, date_filter,
    day_filter, like_filter, pays::load_pay_details, with_tx,
};

/// Filters for listing orders.
///
/// Ids match exactly and text fields match substrings. Date filters take
/// `YYYY-MM-DD`; malformed values are ignored.
#[derive(Clone, Debug, Default)]
pub struct OrderFilter {
    pub id: Option<i32>,
    pub supplier_id: Option<i32>,
    pub order_number: Option<String>,
    pub material_name: Option<String>,
    pub project_name: Option<String>,
    pub contact_phone: Option<String>,
    pub order_amount: Option<String>,
    pub material_manager: Option<String>,
    pub sub_project_manager: Option<String>,
    pub supplier_name: Option<String>,
    pub supplier_contact_person: Option<String>,
    pub cutting_time: Option<String>,
    pub estimated_arrival_time: Option<String>,
    pub create_at: Option<String>,
}

impl OrderFilter {
    fn condition(&self) -> Condition {
        let mut cond = Condition::all();
        if let Some(id) = self.id {
            cond = cond.add(orders::Column::Id.eq(id));
        }
        if let Some(supplier_id) = self.supplier_id {
            cond = cond.add(orders::Column::SupplierId.eq(supplier_id));
        }
        cond = like_filter(cond, orders::Column::OrderNumber, self.order_number.as_deref());
        cond = like_filter(
            cond,
            orders::Column::MaterialName,
            self.material_name.as_deref(),
        );
        cond = like_filter(cond, orders::Column::ProjectName, self.project_name.as_deref());
        cond = like_filter(
            cond,
            orders::Column::ContactPhone,
            self.contact_phone.as_deref(),
        );
        cond = amount_like_filter(cond, "orders.order_amount", self.order_amount.as_deref());
        cond = like_filter(
            cond,
            orders::Column::MaterialManager,
            self.material_manager.as_deref(),
        );
        cond = like_filter(
            cond,
            orders::Column::SubProjectManager,
            self.sub_project_manager.as_deref(),
        );

        let supplier_cond = like_filter(
            like_filter(
                Condition::all(),
                suppliers::Column::Name,
                self.supplier_name.as_deref(),
            ),
            suppliers::Column::ContactPerson,
            self.supplier_contact_person.as_deref(),
        );
        if !supplier_cond.is_empty() {
            cond = cond.add(
                orders::Column::SupplierId.in_subquery(
                    Query::select()
                        .column(suppliers::Column::Id)
                        .from(suppliers::Entity)
                        .cond_where(supplier_cond)
                        .to_owned(),
                ),
            );
        }

        cond = date_filter(cond, orders::Column::CuttingTime, self.cutting_time.as_deref());
        cond = date_filter(
            cond,
            orders::Column::EstimatedArrivalTime,
            self.estimated_arrival_time.as_deref(),
        );
        day_filter(cond, orders::Column::CreateAt, self.create_at.as_deref())
    }
}

/// Join orders with their supplier and payments.
async fn load_order_details<C: ConnectionTrait>(
    db: &C,
    models: Vec<orders::Model>,
) -> ResultEngine<Vec<OrderDetail>> {
    let order_ids: Vec<i32> = models.iter().map(|m| m.id).collect();
    let supplier_ids: Vec<i32> = models.iter().filter_map(|m| m.supplier_id).collect();

    let suppliers_by_id: HashMap<i32, suppliers::Model> = if supplier_ids.is_empty() {
        HashMap::new()
    } else {
        suppliers::Entity::find()
            .filter(suppliers::Column::Id.is_in(supplier_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect()
    };

    let mut pays_by_order: HashMap<i32, Vec<PayDetail>> = HashMap::new();
    if !order_ids.is_empty() {
        let pay_models = pays::Entity::find()
            .filter(pays::Column::OrderId.is_in(order_ids))
            .order_by_asc(pays::Column::Id)
            .all(db)
            .await?;
        for detail in load_pay_details(db, pay_models).await? {
            if let Some(order_id) = detail.pay.order_id {
                pays_by_order.entry(order_id).or_default().push(detail);
            }
        }
    }

    models
        .into_iter()
        .map(|model| -> ResultEngine<OrderDetail> {
            let supplier = model.supplier_id.and_then(|id| suppliers_by_id.get(&id));
            let supplier_name = supplier.map(|s| s.name.clone());
            let supplier_contact_person = supplier.map(|s| s.contact_person.clone());
            let payments = pays_by_order.remove(&model.id).unwrap_or_default();
            let order = Order::from(model);

            let paid_total = payments
                .iter()
                .filter_map(|p| p.pay.current_payment_amount)
                .try_fold(MoneyCents::ZERO, MoneyCents::checked_add)
                .ok_or_else(|| EngineError::InvalidAmount("paid total too large".to_string()))?;
            let order_balance = order
                .order_amount
                .unwrap_or_default()
                .checked_sub(paid_total)
                .ok_or_else(|| EngineError::InvalidAmount("order balance too large".to_string()))?;

            Ok(OrderDetail {
                order,
                supplier_name,
                supplier_contact_person,
                payments,
                paid_total,
                order_balance,
            })
        })
        .collect()
}

impl Engine {
    async fn order_detail_tx(
        &self,
        db_tx: &DatabaseTransaction,
        id: i32,
    ) -> ResultEngine<OrderDetail> {
        let model = orders::Entity::find_by_id(id)
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("order {id}")))?;
        load_order_details(db_tx, vec![model])
            .await?
            .pop()
            .ok_or_else(|| EngineError::KeyNotFound(format!("order {id}")))
    }

    async fn check_order(
        &self,
        db_tx: &DatabaseTransaction,
        order: &Order,
        except_id: Option<i32>,
    ) -> ResultEngine<()> {
        let mut query = orders::Entity::find()
            .filter(orders::Column::OrderNumber.eq(order.order_number.as_str()));
        if let Some(id) = except_id {
            query = query.filter(orders::Column::Id.ne(id));
        }
        if query.one(db_tx).await?.is_some() {
            return Err(EngineError::ExistingKey(order.order_number.clone()));
        }

        if let Some(supplier_id) = order.supplier_id
            && suppliers::Entity::find_by_id(supplier_id)
                .one(db_tx)
                .await?
                .is_none()
        {
            return Err(EngineError::KeyNotFound(format!("supplier {supplier_id}")));
        }
        Ok(())
    }

    /// Return an order with supplier, payments and balance.
    pub async fn order(&self, id: i32) -> ResultEngine<OrderDetail> {
        with_tx!(self, |db_tx| self.order_detail_tx(&db_tx, id).await)
    }

    /// Add a new order. `order_number` must be unique.
    pub async fn new_order(&self, cmd: OrderNew) -> ResultEngine<OrderDetail> {
        ensure_non_negative(cmd.order_amount, "order_amount")?;
        let order = Order {
            id: 0,
            order_number: normalize_required(&cmd.order_number, "order_number")?,
            material_name: normalize_required(&cmd.material_name, "material_name")?,
            project_name: normalize_optional_text(cmd.project_name.as_deref()),
            supplier_id: cmd.supplier_id,
            contact_phone: normalize_optional_text(cmd.contact_phone.as_deref()),
            cutting_time: cmd.cutting_time,
            estimated_arrival_time: cmd.estimated_arrival_time,
            material_details: normalize_optional_text(cmd.material_details.as_deref()),
            order_amount: cmd.order_amount,
            material_manager: normalize_optional_text(cmd.material_manager.as_deref()),
            sub_project_manager: normalize_optional_text(cmd.sub_project_manager.as_deref()),
            attachments: normalize_optional_text(cmd.attachments.as_deref()),
            create_at: Utc::now(),
        };

        with_tx!(self, |db_tx| {
            self.check_order(&db_tx, &order, None).await?;
            let model = orders::ActiveModel::from(&order).insert(&db_tx).await?;
            self.order_detail_tx(&db_tx, model.id).await
        })
    }

    /// Partially update an order.
    pub async fn update_order(&self, id: i32, cmd: OrderUpdate) -> ResultEngine<OrderDetail> {
        ensure_non_negative(cmd.order_amount.flatten(), "order_amount")?;
        with_tx!(self, |db_tx| {
            let model = orders::Entity::find_by_id(id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(format!("order {id}")))?;
            let mut order = Order::from(model);

            apply_required(
                &mut order.order_number,
                cmd.order_number.as_deref(),
                "order_number",
            )?;
            apply_required(
                &mut order.material_name,
                cmd.material_name.as_deref(),
                "material_name",
            )?;
            apply_optional(&mut order.project_name, cmd.project_name.as_deref());
            apply_nullable(&mut order.supplier_id, cmd.supplier_id);
            apply_optional(&mut order.contact_phone, cmd.contact_phone.as_deref());
            apply_nullable(&mut order.cutting_time, cmd.cutting_time);
            apply_nullable(&mut order.estimated_arrival_time, cmd.estimated_arrival_time);
            apply_optional(&mut order.material_details, cmd.material_details.as_deref());
            apply_nullable(&mut order.order_amount, cmd.order_amount);
            apply_optional(&mut order.material_manager, cmd.material_manager.as_deref());
            apply_optional(
                &mut order.sub_project_manager,
                cmd.sub_project_manager.as_deref(),
            );
            apply_optional(&mut order.attachments, cmd.attachments.as_deref());

            self.check_order(&db_tx, &order, Some(id)).await?;

            let mut active = orders::ActiveModel::from(&order);
            active.id = ActiveValue::Unchanged(id);
            active.update(&db_tx).await?;
            self.order_detail_tx(&db_tx, id).await
        })
    }

    /// Delete an order, detaching its payments first.
    pub async fn delete_order(&self, id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            orders::Entity::find_by_id(id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(format!("order {id}")))?;

            pays::Entity::update_many()
                .col_expr(pays::Column::OrderId, Expr::value(Option::<i32>::None))
                .filter(pays::Column::OrderId.eq(id))
                .exec(&db_tx)
                .await?;

            orders::Entity::delete_by_id(id).exec(&db_tx).await?;
            Ok(())
        })
    }

    /// List orders, newest id first.
    pub async fn list_orders(
        &self,
        filter: &OrderFilter,
        page: PageRequest,
    ) -> ResultEngine<Page<OrderDetail>> {
        with_tx!(self, |db_tx| {
            let query = orders::Entity::find().filter(filter.condition());
            let total = query.clone().count(&db_tx).await?;
            let models = query
                .order_by_desc(orders::Column::Id)
                .offset(page.offset())
                .limit(page.limit)
                .all(&db_tx)
                .await?;
            let items = load_order_details(&db_tx, models).await?;
            Ok(Page { items, total })
        })
    }
}
