//! The module contains `Pay` struct, its detailed view and its persistence
//! model.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};

use crate::MoneyCents;

/// A payment made by a payer to a supplier, optionally against an order.
#[derive(Clone, Debug, PartialEq)]
pub struct Pay {
    pub id: i32,
    pub pay_number: String,
    pub order_id: Option<i32>,
    /// References a [`Payer`](crate::Payer), despite the column name.
    pub payer_supplier_id: Option<i32>,
    pub payee_supplier_id: Option<i32>,
    pub payment_purpose: Option<String>,
    pub current_payment_amount: Option<MoneyCents>,
    pub invoice_amount: Option<MoneyCents>,
    pub payment_status: Option<String>,
    pub handler: Option<String>,
    pub create_at: DateTime<Utc>,
}

/// A payment with the display names of the rows it points to.
#[derive(Clone, Debug, PartialEq)]
pub struct PayDetail {
    pub pay: Pay,
    pub order_number: Option<String>,
    pub payer_name: Option<String>,
    pub payee_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "pays")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub pay_number: String,
    pub order_id: Option<i32>,
    pub payer_supplier_id: Option<i32>,
    pub payee_supplier_id: Option<i32>,
    pub payment_purpose: Option<String>,
    pub current_payment_amount: Option<i64>,
    pub invoice_amount: Option<i64>,
    pub payment_status: Option<String>,
    pub handler: Option<String>,
    pub create_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::orders::Entity",
        from = "Column::OrderId",
        to = "super::orders::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Orders,
    #[sea_orm(
        belongs_to = "super::payers::Entity",
        from = "Column::PayerSupplierId",
        to = "super::payers::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Payers,
    #[sea_orm(
        belongs_to = "super::suppliers::Entity",
        from = "Column::PayeeSupplierId",
        to = "super::suppliers::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Suppliers,
}

impl Related<super::orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl Related<super::payers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payers.def()
    }
}

impl Related<super::suppliers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Suppliers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Pay> for ActiveModel {
    fn from(value: &Pay) -> Self {
        Self {
            id: ActiveValue::NotSet,
            pay_number: ActiveValue::Set(value.pay_number.clone()),
            order_id: ActiveValue::Set(value.order_id),
            payer_supplier_id: ActiveValue::Set(value.payer_supplier_id),
            payee_supplier_id: ActiveValue::Set(value.payee_supplier_id),
            payment_purpose: ActiveValue::Set(value.payment_purpose.clone()),
            current_payment_amount: ActiveValue::Set(
                value.current_payment_amount.map(MoneyCents::cents),
            ),
            invoice_amount: ActiveValue::Set(value.invoice_amount.map(MoneyCents::cents)),
            payment_status: ActiveValue::Set(value.payment_status.clone()),
            handler: ActiveValue::Set(value.handler.clone()),
            create_at: ActiveValue::Set(value.create_at),
        }
    }
}

impl From<Model> for Pay {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            pay_number: model.pay_number,
            order_id: model.order_id,
            payer_supplier_id: model.payer_supplier_id,
            payee_supplier_id: model.payee_supplier_id,
            payment_purpose: model.payment_purpose,
            current_payment_amount: model.current_payment_amount.map(MoneyCents::new),
            invoice_amount: model.invoice_amount.map(MoneyCents::new),
            payment_status: model.payment_status,
            handler: model.handler,
            create_at: model.create_at,
        }
    }
}
