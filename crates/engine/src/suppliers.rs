//! The module contains `Supplier` struct and its persistence model.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};

/// A company (or person) we buy material from.
///
/// Suppliers are the payees of payments and are referenced by orders.
#[derive(Clone, Debug, PartialEq)]
pub struct Supplier {
    pub id: i32,
    pub type_id: i32,
    pub name: String,
    pub contact_person: String,
    pub phone: String,
    pub email: Option<String>,
    pub bank_name: String,
    /// Kept verbatim: account numbers may carry leading zeros.
    pub account_number: String,
    pub address: Option<String>,
    pub remark: Option<String>,
    pub create_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "suppliers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub type_id: i32,
    pub name: String,
    pub contact_person: String,
    pub phone: String,
    pub email: Option<String>,
    pub bank_name: String,
    pub account_number: String,
    pub address: Option<String>,
    pub remark: Option<String>,
    pub create_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::orders::Entity")]
    Orders,
    #[sea_orm(has_many = "super::pays::Entity")]
    Pays,
}

impl Related<super::orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl Related<super::pays::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pays.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Supplier> for ActiveModel {
    fn from(value: &Supplier) -> Self {
        Self {
            id: ActiveValue::NotSet,
            type_id: ActiveValue::Set(value.type_id),
            name: ActiveValue::Set(value.name.clone()),
            contact_person: ActiveValue::Set(value.contact_person.clone()),
            phone: ActiveValue::Set(value.phone.clone()),
            email: ActiveValue::Set(value.email.clone()),
            bank_name: ActiveValue::Set(value.bank_name.clone()),
            account_number: ActiveValue::Set(value.account_number.clone()),
            address: ActiveValue::Set(value.address.clone()),
            remark: ActiveValue::Set(value.remark.clone()),
            create_at: ActiveValue::Set(value.create_at),
        }
    }
}

impl From<Model> for Supplier {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            type_id: model.type_id,
            name: model.name,
            contact_person: model.contact_person,
            phone: model.phone,
            email: model.email,
            bank_name: model.bank_name,
            account_number: model.account_number,
            address: model.address,
            remark: model.remark,
            create_at: model.create_at,
        }
    }
}
