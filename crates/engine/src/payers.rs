//! The module contains `Payer` struct and its persistence model.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};

use crate::{EngineError, ResultEngine};

/// Kind of paying entity, stored as `type_id`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PayerType {
    Organisation,
    Individual,
}

impl PayerType {
    pub fn id(self) -> i32 {
        match self {
            Self::Organisation => 1,
            Self::Individual => 2,
        }
    }
}

impl TryFrom<i32> for PayerType {
    type Error = EngineError;

    fn try_from(value: i32) -> ResultEngine<Self> {
        match value {
            1 => Ok(Self::Organisation),
            2 => Ok(Self::Individual),
            other => Err(EngineError::InvalidInput(format!(
                "invalid payer type_id: {other} (expected 1 or 2)"
            ))),
        }
    }
}

/// The entity a payment is made from.
#[derive(Clone, Debug, PartialEq)]
pub struct Payer {
    pub id: i32,
    pub payer_type: PayerType,
    pub name: String,
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
    pub remark: Option<String>,
    pub create_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "payers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub type_id: i32,
    pub name: String,
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
    pub remark: Option<String>,
    pub create_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::pays::Entity")]
    Pays,
}

impl Related<super::pays::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pays.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Payer> for ActiveModel {
    fn from(value: &Payer) -> Self {
        Self {
            id: ActiveValue::NotSet,
            type_id: ActiveValue::Set(value.payer_type.id()),
            name: ActiveValue::Set(value.name.clone()),
            bank_name: ActiveValue::Set(value.bank_name.clone()),
            account_number: ActiveValue::Set(value.account_number.clone()),
            remark: ActiveValue::Set(value.remark.clone()),
            create_at: ActiveValue::Set(value.create_at),
        }
    }
}

impl TryFrom<Model> for Payer {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: model.id,
            payer_type: PayerType::try_from(model.type_id)?,
            name: model.name,
            bank_name: model.bank_name,
            account_number: model.account_number,
            remark: model.remark,
            create_at: model.create_at,
        })
    }
}
