use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use sea_orm::{
    ActiveValue, Condition, DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    EngineError, InboundCmd, LedgerEntry, LedgerKind, MoneyCents, OutboundCmd, OutboundItem,
    Page, PageRequest, Plant, ResultEngine, UpdateOutboundCmd, nursery_transactions, plants,
    util::{normalize_key, normalize_optional_text, normalize_required},
};

use super::{Engine, like_filter, with_tx};

const DEFAULT_OPERATOR: &str = "Admin";
const NON_INVENTORY_SPEC: &str = "-";
const NON_INVENTORY_UNIT: &str = "pcs";
const NON_INVENTORY_LOCATION: &str = "non-inventory";
const NON_INVENTORY_TAG: &str = "[non-inventory]";
const UNCATEGORIZED: &str = "uncategorized";

/// Result of an inbound delivery.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InboundReceipt {
    pub order_no: String,
    pub plant_id: i32,
    pub transaction_id: i32,
}

/// Result of an outbound order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundReceipt {
    pub order_no: String,
    pub transaction_ids: Vec<i32>,
    pub total_price: MoneyCents,
}

/// The `out` ledger rows sharing one order number.
#[derive(Clone, Debug, PartialEq)]
pub struct OutboundOrder {
    pub order_no: String,
    pub total_price: MoneyCents,
    /// Latest creation time among the rows.
    pub create_at: DateTime<Utc>,
    pub operator: Option<String>,
    pub destination: Option<String>,
    pub item_count: usize,
    pub items: Vec<LedgerEntry>,
}

impl OutboundOrder {
    fn from_entries(order_no: String, mut items: Vec<LedgerEntry>) -> ResultEngine<Self> {
        items.sort_by_key(|item| item.id);
        let total_price = items
            .iter()
            .map(|item| item.total_price)
            .try_fold(MoneyCents::ZERO, MoneyCents::checked_add)
            .ok_or_else(|| EngineError::InvalidAmount("order total too large".to_string()))?;
        let latest = items
            .iter()
            .max_by_key(|item| (item.create_at, item.id))
            .ok_or_else(|| EngineError::KeyNotFound(format!("outbound order {order_no}")))?;
        Ok(Self {
            create_at: latest.create_at,
            operator: latest.operator.clone(),
            destination: latest.destination.clone(),
            total_price,
            item_count: items.len(),
            order_no,
            items,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryCount {
    pub category: String,
    pub count: u64,
}

/// Figures shown on the nursery dashboard.
#[derive(Clone, Debug, PartialEq)]
pub struct NurseryStats {
    pub varieties_in_stock: u64,
    pub outbound_this_month: u64,
    pub categories_in_stock: u64,
    pub low_stock: u64,
    pub category_distribution: Vec<CategoryCount>,
    pub top_plants: Vec<Plant>,
    pub recent_transactions: Vec<LedgerEntry>,
}

const ORDER_NO_SUFFIX_LEN: usize = 8;

fn new_order_no(kind: LedgerKind, now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "{}{}-{}",
        kind.prefix(),
        now.format("%Y%m%d%H%M%S"),
        &suffix[..ORDER_NO_SUFFIX_LEN]
    )
}

fn non_inventory_remark(remark: Option<&str>) -> String {
    match remark {
        Some(remark) => format!("{remark} {NON_INVENTORY_TAG}"),
        None => NON_INVENTORY_TAG.to_string(),
    }
}

fn is_non_inventory_row(entry: &LedgerEntry) -> bool {
    entry.plant_id.is_none() && entry.location.as_deref() == Some(NON_INVENTORY_LOCATION)
}

fn month_start(now: DateTime<Utc>) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(now.year(), now.month(), 1)
        .unwrap_or_else(|| now.date_naive())
        .and_time(chrono::NaiveTime::MIN)
        .and_utc()
}

impl Engine {
    async fn save_plant(&self, db_tx: &DatabaseTransaction, plant: &Plant) -> ResultEngine<()> {
        let mut active = plants::ActiveModel::from(plant);
        active.id = ActiveValue::Unchanged(plant.id);
        active.update(db_tx).await?;
        Ok(())
    }

    async fn insert_entry(
        &self,
        db_tx: &DatabaseTransaction,
        entry: &LedgerEntry,
    ) -> ResultEngine<i32> {
        let model = nursery_transactions::ActiveModel::from(entry)
            .insert(db_tx)
            .await?;
        Ok(model.id)
    }

    /// An order number no ledger row carries yet.
    async fn unique_order_no(
        &self,
        db_tx: &DatabaseTransaction,
        kind: LedgerKind,
        now: DateTime<Utc>,
    ) -> ResultEngine<String> {
        loop {
            let order_no = new_order_no(kind, now);
            let taken = nursery_transactions::Entity::find()
                .filter(nursery_transactions::Column::OrderNo.eq(order_no.as_str()))
                .count(db_tx)
                .await?;
            if taken == 0 {
                return Ok(order_no);
            }
            tracing::warn!(order_no = %order_no, "order number collision, drawing again");
        }
    }

    async fn outbound_entries(
        &self,
        db_tx: &DatabaseTransaction,
        order_no: &str,
    ) -> ResultEngine<Vec<LedgerEntry>> {
        let entries = nursery_transactions::Entity::find()
            .filter(nursery_transactions::Column::OrderNo.eq(order_no))
            .filter(nursery_transactions::Column::Kind.eq(LedgerKind::Out.as_str()))
            .order_by_asc(nursery_transactions::Column::Id)
            .all(db_tx)
            .await?
            .into_iter()
            .map(LedgerEntry::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;
        if entries.is_empty() {
            return Err(EngineError::KeyNotFound(format!(
                "outbound order {order_no}"
            )));
        }
        Ok(entries)
    }

    /// Receive stock.
    ///
    /// Merges into the plant with the same `(name, spec, unit)` key,
    /// re-pricing it at the weighted average, or creates a new plant. One
    /// `in` ledger row is written either way.
    pub async fn inbound(&self, cmd: InboundCmd) -> ResultEngine<InboundReceipt> {
        let name = normalize_key(&normalize_required(&cmd.name, "name")?);
        let spec = normalize_key(cmd.spec.as_deref().unwrap_or_default());
        let unit = normalize_key(cmd.unit.as_deref().unwrap_or_default());
        if !cmd.quantity.is_positive() {
            return Err(EngineError::InvalidAmount(
                "quantity must be greater than 0".to_string(),
            ));
        }
        if cmd.price.is_negative() {
            return Err(EngineError::InvalidAmount("price must not be negative".to_string()));
        }
        let location = normalize_optional_text(cmd.location.as_deref());
        let remark = normalize_optional_text(cmd.remark.as_deref());
        let operator = normalize_optional_text(cmd.operator.as_deref())
            .unwrap_or_else(|| DEFAULT_OPERATOR.to_string());
        let total_price = cmd.quantity.total(cmd.price)?;
        let now = Utc::now();

        with_tx!(self, |db_tx| {
            let existing = plants::Entity::find()
                .filter(plants::Column::Name.eq(name.as_str()))
                .filter(plants::Column::Spec.eq(spec.as_str()))
                .filter(plants::Column::Unit.eq(unit.as_str()))
                .one(&db_tx)
                .await?;

            let plant = match existing {
                Some(model) => {
                    let mut plant = Plant::from(model);
                    plant.receive(cmd.quantity, cmd.price)?;
                    if location.is_some() {
                        plant.location = location.clone();
                    }
                    plant.update_at = now;
                    self.save_plant(&db_tx, &plant).await?;
                    plant
                }
                None => {
                    let plant = Plant {
                        id: 0,
                        name: name.clone(),
                        category: normalize_optional_text(cmd.category.as_deref()),
                        spec: spec.clone(),
                        unit: unit.clone(),
                        quantity: cmd.quantity,
                        price: cmd.price,
                        location: location.clone(),
                        remark: remark.clone(),
                        create_at: now,
                        update_at: now,
                    };
                    let model = plants::ActiveModel::from(&plant).insert(&db_tx).await?;
                    Plant::from(model)
                }
            };

            let order_no = self.unique_order_no(&db_tx, LedgerKind::In, now).await?;
            let entry = LedgerEntry {
                id: 0,
                order_no: order_no.clone(),
                kind: LedgerKind::In,
                plant_id: Some(plant.id),
                plant_name: plant.name.clone(),
                spec: Some(plant.spec.clone()),
                unit: Some(plant.unit.clone()),
                quantity: cmd.quantity,
                price: cmd.price,
                total_price,
                operator: Some(operator.clone()),
                destination: None,
                location: location.clone().or_else(|| plant.location.clone()),
                remark: remark.clone(),
                create_at: now,
            };
            let transaction_id = self.insert_entry(&db_tx, &entry).await?;

            tracing::info!(
                order_no = %order_no,
                plant_id = plant.id,
                quantity = %cmd.quantity,
                price = %plant.price,
                "nursery inbound"
            );
            Ok(InboundReceipt {
                order_no,
                plant_id: plant.id,
                transaction_id,
            })
        })
    }

    /// Issue an outbound order.
    ///
    /// Lines with a zero or negative quantity are skipped. Stock lines are
    /// checked against the stock left by earlier lines of the same order.
    /// Either every line is written or none is.
    pub async fn outbound(&self, cmd: OutboundCmd) -> ResultEngine<OutboundReceipt> {
        let items: Vec<&OutboundItem> = cmd
            .items
            .iter()
            .filter(|item| item.quantity.is_positive())
            .collect();
        if items.is_empty() {
            return Err(EngineError::InvalidInput(
                "outbound order has no item with a positive quantity".to_string(),
            ));
        }
        if items.iter().any(|item| item.price.is_negative()) {
            return Err(EngineError::InvalidAmount("price must not be negative".to_string()));
        }
        let destination = normalize_optional_text(cmd.destination.as_deref());
        let remark = normalize_optional_text(cmd.remark.as_deref());
        let operator = normalize_optional_text(cmd.operator.as_deref())
            .unwrap_or_else(|| DEFAULT_OPERATOR.to_string());
        let now = Utc::now();

        with_tx!(self, |db_tx| {
            let order_no = self.unique_order_no(&db_tx, LedgerKind::Out, now).await?;
            let mut transaction_ids = Vec::with_capacity(items.len());
            let mut order_total = MoneyCents::ZERO;

            for item in &items {
                let total_price = item.quantity.total(item.price)?;
                let entry = match item.plant_id.filter(|_| !item.is_non_inventory) {
                    Some(plant_id) => {
                        let model = plants::Entity::find_by_id(plant_id)
                            .one(&db_tx)
                            .await?
                            .ok_or_else(|| {
                                EngineError::KeyNotFound(format!("plant {plant_id}"))
                            })?;
                        let mut plant = Plant::from(model);
                        if let Err(err) = plant.issue(item.quantity) {
                            tracing::warn!(order_no = %order_no, plant_id, "outbound rejected: {err}");
                            return Err(err);
                        }
                        plant.update_at = now;
                        self.save_plant(&db_tx, &plant).await?;

                        LedgerEntry {
                            id: 0,
                            order_no: order_no.clone(),
                            kind: LedgerKind::Out,
                            plant_id: Some(plant.id),
                            plant_name: plant.name,
                            spec: Some(plant.spec),
                            unit: Some(plant.unit),
                            quantity: item.quantity,
                            price: item.price,
                            total_price,
                            operator: Some(operator.clone()),
                            destination: destination.clone(),
                            location: plant.location,
                            remark: remark.clone(),
                            create_at: now,
                        }
                    }
                    None => LedgerEntry {
                        id: 0,
                        order_no: order_no.clone(),
                        kind: LedgerKind::Out,
                        plant_id: None,
                        plant_name: normalize_required(&item.name, "item name")?,
                        spec: Some(
                            normalize_optional_text(item.spec.as_deref())
                                .unwrap_or_else(|| NON_INVENTORY_SPEC.to_string()),
                        ),
                        unit: Some(
                            normalize_optional_text(item.unit.as_deref())
                                .unwrap_or_else(|| NON_INVENTORY_UNIT.to_string()),
                        ),
                        quantity: item.quantity,
                        price: item.price,
                        total_price,
                        operator: Some(operator.clone()),
                        destination: destination.clone(),
                        location: Some(NON_INVENTORY_LOCATION.to_string()),
                        remark: Some(non_inventory_remark(remark.as_deref())),
                        create_at: now,
                    },
                };

                transaction_ids.push(self.insert_entry(&db_tx, &entry).await?);
                order_total = order_total
                    .checked_add(total_price)
                    .ok_or_else(|| EngineError::InvalidAmount("order total too large".to_string()))?;
            }

            tracing::info!(
                order_no = %order_no,
                lines = transaction_ids.len(),
                total = %order_total,
                "nursery outbound"
            );
            Ok(OutboundReceipt {
                order_no: order_no.clone(),
                transaction_ids,
                total_price: order_total,
            })
        })
    }

    /// Cancel an outbound order: stock lines go back to their plant (when it
    /// still exists) and every row of the order is removed.
    pub async fn delete_outbound_order(&self, order_no: &str) -> ResultEngine<()> {
        let order_no = order_no.trim();
        with_tx!(self, |db_tx| {
            let entries = self.outbound_entries(&db_tx, order_no).await?;
            let now = Utc::now();

            for entry in &entries {
                let Some(plant_id) = entry.plant_id else {
                    continue;
                };
                if let Some(model) = plants::Entity::find_by_id(plant_id).one(&db_tx).await? {
                    let mut plant = Plant::from(model);
                    plant.restock(entry.quantity)?;
                    plant.update_at = now;
                    self.save_plant(&db_tx, &plant).await?;
                }
            }

            nursery_transactions::Entity::delete_many()
                .filter(nursery_transactions::Column::OrderNo.eq(order_no))
                .filter(nursery_transactions::Column::Kind.eq(LedgerKind::Out.as_str()))
                .exec(&db_tx)
                .await?;

            tracing::info!(order_no, lines = entries.len(), "outbound order deleted");
            Ok(())
        })
    }

    /// Edit an outbound order in place.
    ///
    /// Header fields apply to every row. A quantity change on a stock line
    /// moves the difference between the plant and the order.
    pub async fn update_outbound_order(
        &self,
        order_no: &str,
        cmd: UpdateOutboundCmd,
    ) -> ResultEngine<OutboundOrder> {
        let order_no = order_no.trim();
        let operator = normalize_optional_text(cmd.operator.as_deref());
        let destination = cmd.destination.as_deref().map(|d| normalize_optional_text(Some(d)));
        let remark = cmd.remark.as_deref().map(|r| normalize_optional_text(Some(r)));

        with_tx!(self, |db_tx| {
            let mut entries = self.outbound_entries(&db_tx, order_no).await?;
            let now = Utc::now();

            for entry in &mut entries {
                if let Some(operator) = &operator {
                    entry.operator = Some(operator.clone());
                }
                if let Some(destination) = &destination {
                    entry.destination = destination.clone();
                }
                if let Some(remark) = &remark {
                    entry.remark = if is_non_inventory_row(entry) {
                        Some(non_inventory_remark(remark.as_deref()))
                    } else {
                        remark.clone()
                    };
                }
            }

            for change in &cmd.items {
                let Some(entry) = entries.iter_mut().find(|e| e.id == change.id) else {
                    continue;
                };

                if let Some(new_qty) = change.quantity {
                    if !new_qty.is_positive() {
                        return Err(EngineError::InvalidAmount(
                            "quantity must be greater than 0".to_string(),
                        ));
                    }
                    if let Some(plant_id) = entry.plant_id
                        && let Some(model) =
                            plants::Entity::find_by_id(plant_id).one(&db_tx).await?
                    {
                        let mut plant = Plant::from(model);
                        if new_qty > entry.quantity {
                            let extra = new_qty.checked_sub(entry.quantity).ok_or_else(|| {
                                EngineError::InvalidAmount("quantity too large".to_string())
                            })?;
                            if let Err(err) = plant.issue(extra) {
                                tracing::warn!(order_no, plant_id, "outbound update rejected: {err}");
                                return Err(err);
                            }
                        } else {
                            let back = entry.quantity.checked_sub(new_qty).ok_or_else(|| {
                                EngineError::InvalidAmount("quantity too large".to_string())
                            })?;
                            plant.restock(back)?;
                        }
                        plant.update_at = now;
                        self.save_plant(&db_tx, &plant).await?;
                    }
                    entry.quantity = new_qty;
                }
                if let Some(price) = change.price {
                    if price.is_negative() {
                        return Err(EngineError::InvalidAmount(
                            "price must not be negative".to_string(),
                        ));
                    }
                    entry.price = price;
                }
                entry.total_price = entry.quantity.total(entry.price)?;
            }

            for entry in &entries {
                let mut active = nursery_transactions::ActiveModel::from(entry);
                active.id = ActiveValue::Unchanged(entry.id);
                active.update(&db_tx).await?;
            }

            tracing::info!(order_no, "outbound order updated");
            OutboundOrder::from_entries(order_no.to_string(), entries)
        })
    }

    /// Plants currently in stock, most recently touched first.
    pub async fn list_inventory(
        &self,
        name: Option<&str>,
        page: PageRequest,
    ) -> ResultEngine<Page<Plant>> {
        let cond = like_filter(
            Condition::all().add(plants::Column::Quantity.gt(0)),
            plants::Column::Name,
            name,
        );
        with_tx!(self, |db_tx| {
            let query = plants::Entity::find().filter(cond);
            let total = query.clone().count(&db_tx).await?;
            let items = query
                .order_by_desc(plants::Column::UpdateAt)
                .order_by_desc(plants::Column::Id)
                .offset(page.offset())
                .limit(page.limit)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Plant::from)
                .collect();
            Ok(Page { items, total })
        })
    }

    /// Every plant, including empty ones, ordered by name.
    pub async fn all_plants(&self) -> ResultEngine<Vec<Plant>> {
        let plants = plants::Entity::find()
            .order_by_asc(plants::Column::Name)
            .order_by_asc(plants::Column::Spec)
            .order_by_asc(plants::Column::Unit)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Plant::from)
            .collect();
        Ok(plants)
    }

    /// Ledger rows, newest first.
    pub async fn list_transactions(
        &self,
        kind: Option<LedgerKind>,
        page: PageRequest,
    ) -> ResultEngine<Page<LedgerEntry>> {
        with_tx!(self, |db_tx| {
            let mut query = nursery_transactions::Entity::find();
            if let Some(kind) = kind {
                query = query.filter(nursery_transactions::Column::Kind.eq(kind.as_str()));
            }
            let total = query.clone().count(&db_tx).await?;
            let items = query
                .order_by_desc(nursery_transactions::Column::CreateAt)
                .order_by_desc(nursery_transactions::Column::Id)
                .offset(page.offset())
                .limit(page.limit)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(LedgerEntry::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;
            Ok(Page { items, total })
        })
    }

    /// Outbound rows grouped by order number, newest order first.
    pub async fn list_outbound_orders(&self) -> ResultEngine<Vec<OutboundOrder>> {
        with_tx!(self, |db_tx| {
            let models = nursery_transactions::Entity::find()
                .filter(nursery_transactions::Column::Kind.eq(LedgerKind::Out.as_str()))
                .order_by_desc(nursery_transactions::Column::CreateAt)
                .order_by_desc(nursery_transactions::Column::Id)
                .all(&db_tx)
                .await?;

            let mut groups: Vec<(String, Vec<LedgerEntry>)> = Vec::new();
            for model in models {
                let entry = LedgerEntry::try_from(model)?;
                match groups.iter_mut().find(|(no, _)| *no == entry.order_no) {
                    Some((_, items)) => items.push(entry),
                    None => groups.push((entry.order_no.clone(), vec![entry])),
                }
            }

            groups
                .into_iter()
                .map(|(order_no, items)| OutboundOrder::from_entries(order_no, items))
                .collect()
        })
    }

    /// Dashboard figures for the nursery as of `now`.
    pub async fn nursery_stats(&self, now: DateTime<Utc>) -> ResultEngine<NurseryStats> {
        with_tx!(self, |db_tx| {
            let mut in_stock: Vec<Plant> = plants::Entity::find()
                .filter(plants::Column::Quantity.gt(0))
                .order_by_desc(plants::Column::Quantity)
                .order_by_asc(plants::Column::Id)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Plant::from)
                .collect();

            let outbound_this_month = nursery_transactions::Entity::find()
                .filter(nursery_transactions::Column::Kind.eq(LedgerKind::Out.as_str()))
                .filter(nursery_transactions::Column::CreateAt.gte(month_start(now)))
                .count(&db_tx)
                .await?;

            let mut buckets: BTreeMap<String, u64> = BTreeMap::new();
            for plant in &in_stock {
                let category = plant
                    .category
                    .clone()
                    .unwrap_or_else(|| UNCATEGORIZED.to_string());
                *buckets.entry(category).or_default() += 1;
            }
            let categories_in_stock = in_stock
                .iter()
                .filter_map(|plant| plant.category.as_deref())
                .collect::<BTreeSet<_>>()
                .len() as u64;
            let low_stock = in_stock.iter().filter(|plant| plant.is_low_stock()).count() as u64;
            let varieties_in_stock = in_stock.len() as u64;
            let category_distribution = buckets
                .into_iter()
                .map(|(category, count)| CategoryCount { category, count })
                .collect();
            in_stock.truncate(5);
            let top_plants = in_stock;

            let recent_transactions = nursery_transactions::Entity::find()
                .order_by_desc(nursery_transactions::Column::CreateAt)
                .order_by_desc(nursery_transactions::Column::Id)
                .limit(10)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(LedgerEntry::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;

            Ok(NurseryStats {
                varieties_in_stock,
                outbound_this_month,
                categories_in_stock,
                low_stock,
                category_distribution,
                top_plants,
                recent_transactions,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn order_numbers_carry_kind_and_timestamp() {
        let at = Utc.with_ymd_and_hms(2026, 3, 9, 14, 5, 7).unwrap();
        let order_no = new_order_no(LedgerKind::Out, at);
        assert!(order_no.starts_with("OUT20260309140507-"));
        assert_eq!(order_no.len(), "OUT20260309140507-".len() + 8);
        assert_ne!(order_no, new_order_no(LedgerKind::Out, at));
        assert!(new_order_no(LedgerKind::In, at).starts_with("IN20260309140507-"));
    }

    #[test]
    fn non_inventory_remark_is_tagged() {
        assert_eq!(non_inventory_remark(None), "[non-inventory]");
        assert_eq!(
            non_inventory_remark(Some("direct delivery")),
            "direct delivery [non-inventory]"
        );
    }

    #[test]
    fn month_start_is_first_day_midnight() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap();
        assert_eq!(
            month_start(now),
            Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap()
        );
    }
}
