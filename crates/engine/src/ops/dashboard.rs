use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use sea_orm::{PaginatorTrait, QueryFilter, TransactionTrait, prelude::*};

use crate::{EngineError, MoneyCents, ResultEngine, orders, payers, pays, suppliers};

use super::{Engine, with_tx};

const UNSET_STATUS: &str = "unset";
const TREND_MONTHS: u32 = 12;
const TOP_SUPPLIERS: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DashboardOverview {
    pub order_total: MoneyCents,
    pub paid_total: MoneyCents,
    /// `order_total - paid_total`
    pub pending: MoneyCents,
    pub order_count: u64,
    pub pay_count: u64,
    pub supplier_count: u64,
    pub payer_count: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaymentStatusBucket {
    pub status: String,
    pub count: u64,
    pub amount: MoneyCents,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MonthlyTrendPoint {
    /// `YYYY-MM`
    pub month: String,
    pub order_count: u64,
    pub order_amount: MoneyCents,
    pub pay_count: u64,
    pub pay_amount: MoneyCents,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopSupplier {
    pub supplier_id: i32,
    pub name: String,
    pub order_count: u64,
    pub order_amount: MoneyCents,
}

fn add_money(total: MoneyCents, amount: Option<MoneyCents>) -> ResultEngine<MoneyCents> {
    total
        .checked_add(amount.unwrap_or_default())
        .ok_or_else(|| EngineError::InvalidAmount("sum too large".to_string()))
}

fn month_key(at: DateTime<Utc>) -> String {
    at.format("%Y-%m").to_string()
}

/// First day of the month `back` months before the month of `now`.
fn months_back(now: DateTime<Utc>, back: u32) -> NaiveDate {
    let index = now.year() * 12 + now.month0() as i32 - back as i32;
    NaiveDate::from_ymd_opt(index.div_euclid(12), index.rem_euclid(12) as u32 + 1, 1)
        .unwrap_or_else(|| now.date_naive())
}

impl Engine {
    /// Totals across orders and payments.
    pub async fn dashboard_overview(&self) -> ResultEngine<DashboardOverview> {
        with_tx!(self, |db_tx| {
            let order_models = orders::Entity::find().all(&db_tx).await?;
            let pay_models = pays::Entity::find().all(&db_tx).await?;

            let mut order_total = MoneyCents::ZERO;
            for model in &order_models {
                order_total = add_money(order_total, model.order_amount.map(MoneyCents::new))?;
            }
            let mut paid_total = MoneyCents::ZERO;
            for model in &pay_models {
                paid_total = add_money(
                    paid_total,
                    model.current_payment_amount.map(MoneyCents::new),
                )?;
            }
            let pending = order_total
                .checked_sub(paid_total)
                .ok_or_else(|| EngineError::InvalidAmount("pending too large".to_string()))?;

            Ok(DashboardOverview {
                order_total,
                paid_total,
                pending,
                order_count: order_models.len() as u64,
                pay_count: pay_models.len() as u64,
                supplier_count: suppliers::Entity::find().count(&db_tx).await?,
                payer_count: payers::Entity::find().count(&db_tx).await?,
            })
        })
    }

    /// Payment count and amount per payment status, ordered by status.
    pub async fn payment_status_distribution(&self) -> ResultEngine<Vec<PaymentStatusBucket>> {
        with_tx!(self, |db_tx| {
            let mut buckets: BTreeMap<String, (u64, MoneyCents)> = BTreeMap::new();
            for model in pays::Entity::find().all(&db_tx).await? {
                let status = model
                    .payment_status
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| UNSET_STATUS.to_string());
                let bucket = buckets.entry(status).or_insert((0, MoneyCents::ZERO));
                bucket.0 += 1;
                bucket.1 = add_money(bucket.1, model.current_payment_amount.map(MoneyCents::new))?;
            }
            Ok(buckets
                .into_iter()
                .map(|(status, (count, amount))| PaymentStatusBucket {
                    status,
                    count,
                    amount,
                })
                .collect())
        })
    }

    /// Orders and payments per month for the twelve months ending with the
    /// month of `now`, oldest first. Months without activity are included.
    pub async fn monthly_trend(&self, now: DateTime<Utc>) -> ResultEngine<Vec<MonthlyTrendPoint>> {
        let start = months_back(now, TREND_MONTHS - 1)
            .and_time(NaiveTime::MIN)
            .and_utc();

        let mut points: BTreeMap<String, MonthlyTrendPoint> = (0..TREND_MONTHS)
            .map(|back| {
                let month = months_back(now, back).format("%Y-%m").to_string();
                let point = MonthlyTrendPoint {
                    month: month.clone(),
                    ..MonthlyTrendPoint::default()
                };
                (month, point)
            })
            .collect();

        with_tx!(self, |db_tx| {
            let order_models = orders::Entity::find()
                .filter(orders::Column::CreateAt.gte(start))
                .all(&db_tx)
                .await?;
            for model in order_models {
                if let Some(point) = points.get_mut(&month_key(model.create_at)) {
                    point.order_count += 1;
                    point.order_amount =
                        add_money(point.order_amount, model.order_amount.map(MoneyCents::new))?;
                }
            }

            let pay_models = pays::Entity::find()
                .filter(pays::Column::CreateAt.gte(start))
                .all(&db_tx)
                .await?;
            for model in pay_models {
                if let Some(point) = points.get_mut(&month_key(model.create_at)) {
                    point.pay_count += 1;
                    point.pay_amount = add_money(
                        point.pay_amount,
                        model.current_payment_amount.map(MoneyCents::new),
                    )?;
                }
            }

            Ok(points.into_values().collect())
        })
    }

    /// The ten suppliers with the largest total order amount.
    pub async fn top_suppliers(&self) -> ResultEngine<Vec<TopSupplier>> {
        with_tx!(self, |db_tx| {
            let order_models = orders::Entity::find()
                .filter(orders::Column::SupplierId.is_not_null())
                .all(&db_tx)
                .await?;

            let mut totals: HashMap<i32, (u64, MoneyCents)> = HashMap::new();
            for model in order_models {
                let Some(supplier_id) = model.supplier_id else {
                    continue;
                };
                let entry = totals.entry(supplier_id).or_insert((0, MoneyCents::ZERO));
                entry.0 += 1;
                entry.1 = add_money(entry.1, model.order_amount.map(MoneyCents::new))?;
            }
            if totals.is_empty() {
                return Ok(Vec::new());
            }

            let names: HashMap<i32, String> = suppliers::Entity::find()
                .filter(suppliers::Column::Id.is_in(totals.keys().copied().collect::<Vec<_>>()))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|s| (s.id, s.name))
                .collect();

            let mut top: Vec<TopSupplier> = totals
                .into_iter()
                .filter_map(|(supplier_id, (order_count, order_amount))| {
                    names.get(&supplier_id).map(|name| TopSupplier {
                        supplier_id,
                        name: name.clone(),
                        order_count,
                        order_amount,
                    })
                })
                .collect();
            top.sort_by(|a, b| {
                b.order_amount
                    .cmp(&a.order_amount)
                    .then(a.supplier_id.cmp(&b.supplier_id))
            });
            top.truncate(TOP_SUPPLIERS);
            Ok(top)
        })
    }
}
