use sea_orm::{ColumnTrait, Condition, DatabaseConnection, sea_query::Expr};

use crate::{
    ResultEngine,
    util::{day_bounds, parse_date_filter},
};

mod dashboard;
mod dictionaries;
mod nursery;
mod orders;
mod payers;
mod pays;
mod projects;
mod suppliers;
mod users;

pub use dashboard::{DashboardOverview, MonthlyTrendPoint, PaymentStatusBucket, TopSupplier};
pub use nursery::{CategoryCount, InboundReceipt, NurseryStats, OutboundOrder, OutboundReceipt};
pub use orders::OrderFilter;
pub use payers::PayerFilter;
pub use pays::PayFilter;
pub use projects::ProjectFilter;
pub use suppliers::SupplierFilter;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// Add a substring match on `column` when `value` is non-blank.
///
/// Compiles to SQLite `LIKE`, so ASCII letters match case-insensitively.
fn like_filter<C: ColumnTrait>(condition: Condition, column: C, value: Option<&str>) -> Condition {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) => condition.add(column.contains(value)),
        None => condition,
    }
}

/// Substring match on a cents column rendered as `12.34`.
///
/// `column` is the qualified SQL column name, e.g. `orders.order_amount`.
fn amount_like_filter(condition: Condition, column: &str, value: Option<&str>) -> Condition {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) => condition.add(Expr::cust_with_values(
            format!("({column} IS NOT NULL AND printf('%.2f', {column} / 100.0) LIKE ?)"),
            [format!("%{value}%")],
        )),
        None => condition,
    }
}

/// Restrict a timestamp column to one calendar day; malformed dates are ignored.
fn day_filter<C: ColumnTrait>(condition: Condition, column: C, value: Option<&str>) -> Condition {
    match parse_date_filter(value) {
        Some(date) => {
            let (start, end) = day_bounds(date);
            condition.add(column.gte(start)).add(column.lt(end))
        }
        None => condition,
    }
}

/// Exact match on a calendar-date column; malformed dates are ignored.
fn date_filter<C: ColumnTrait>(condition: Condition, column: C, value: Option<&str>) -> Condition {
    match parse_date_filter(value) {
        Some(date) => condition.add(column.eq(date)),
        None => condition,
    }
}

/// Apply a partial text update to a required column.
fn apply_required(
    target: &mut String,
    value: Option<&str>,
    label: &str,
) -> ResultEngine<()> {
    if let Some(value) = value {
        *target = crate::util::normalize_required(value, label)?;
    }
    Ok(())
}

/// Apply a partial text update to an optional column; blank clears it.
fn apply_optional(target: &mut Option<String>, value: Option<&str>) {
    if let Some(value) = value {
        *target = crate::util::normalize_optional_text(Some(value));
    }
}

/// Apply a partial update to a clearable column.
fn apply_nullable<T>(target: &mut Option<T>, value: Option<Option<T>>) {
    if let Some(value) = value {
        *target = value;
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}
