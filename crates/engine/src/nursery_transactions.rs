//! Ledger rows of the nursery.
//!
//! Every inbound or outbound line writes one immutable snapshot. Rows keep
//! the plant name/spec/unit they were written with, so history survives a
//! plant being renamed or removed.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};

use crate::{EngineError, MoneyCents, Quantity, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LedgerKind {
    In,
    Out,
}

impl LedgerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
        }
    }

    /// Order number prefix for the kind.
    pub(crate) fn prefix(self) -> &'static str {
        match self {
            Self::In => "IN",
            Self::Out => "OUT",
        }
    }
}

impl TryFrom<&str> for LedgerKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "in" => Ok(Self::In),
            "out" => Ok(Self::Out),
            other => Err(EngineError::InvalidInput(format!(
                "invalid ledger kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LedgerEntry {
    pub id: i32,
    pub order_no: String,
    pub kind: LedgerKind,
    /// `None` for non-inventory lines.
    pub plant_id: Option<i32>,
    pub plant_name: String,
    pub spec: Option<String>,
    pub unit: Option<String>,
    pub quantity: Quantity,
    pub price: MoneyCents,
    pub total_price: MoneyCents,
    pub operator: Option<String>,
    pub destination: Option<String>,
    pub location: Option<String>,
    pub remark: Option<String>,
    pub create_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "nursery_transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub order_no: String,
    pub kind: String,
    pub plant_id: Option<i32>,
    pub plant_name: String,
    pub spec: Option<String>,
    pub unit: Option<String>,
    pub quantity: i64,
    pub price: i64,
    pub total_price: i64,
    pub operator: Option<String>,
    pub destination: Option<String>,
    pub location: Option<String>,
    pub remark: Option<String>,
    pub create_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&LedgerEntry> for ActiveModel {
    fn from(entry: &LedgerEntry) -> Self {
        Self {
            id: ActiveValue::NotSet,
            order_no: ActiveValue::Set(entry.order_no.clone()),
            kind: ActiveValue::Set(entry.kind.as_str().to_string()),
            plant_id: ActiveValue::Set(entry.plant_id),
            plant_name: ActiveValue::Set(entry.plant_name.clone()),
            spec: ActiveValue::Set(entry.spec.clone()),
            unit: ActiveValue::Set(entry.unit.clone()),
            quantity: ActiveValue::Set(entry.quantity.hundredths()),
            price: ActiveValue::Set(entry.price.cents()),
            total_price: ActiveValue::Set(entry.total_price.cents()),
            operator: ActiveValue::Set(entry.operator.clone()),
            destination: ActiveValue::Set(entry.destination.clone()),
            location: ActiveValue::Set(entry.location.clone()),
            remark: ActiveValue::Set(entry.remark.clone()),
            create_at: ActiveValue::Set(entry.create_at),
        }
    }
}

impl TryFrom<Model> for LedgerEntry {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: model.id,
            order_no: model.order_no,
            kind: LedgerKind::try_from(model.kind.as_str())?,
            plant_id: model.plant_id,
            plant_name: model.plant_name,
            spec: model.spec,
            unit: model.unit,
            quantity: Quantity::new(model.quantity),
            price: MoneyCents::new(model.price),
            total_price: MoneyCents::new(model.total_price),
            operator: model.operator,
            destination: model.destination,
            location: model.location,
            remark: model.remark,
            create_at: model.create_at,
        })
    }
}
