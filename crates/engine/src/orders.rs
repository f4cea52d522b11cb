//! The module contains `Order` struct, its detailed view and its persistence
//! model.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};

use crate::{MoneyCents, PayDetail};

/// A material order placed with a supplier.
#[derive(Clone, Debug, PartialEq)]
pub struct Order {
    pub id: i32,
    pub order_number: String,
    pub material_name: String,
    pub project_name: Option<String>,
    pub supplier_id: Option<i32>,
    pub contact_phone: Option<String>,
    pub cutting_time: Option<NaiveDate>,
    pub estimated_arrival_time: Option<NaiveDate>,
    pub material_details: Option<String>,
    pub order_amount: Option<MoneyCents>,
    pub material_manager: Option<String>,
    pub sub_project_manager: Option<String>,
    /// Opaque JSON text owned by the client.
    pub attachments: Option<String>,
    pub create_at: DateTime<Utc>,
}

/// An order joined with its supplier and payments.
#[derive(Clone, Debug, PartialEq)]
pub struct OrderDetail {
    pub order: Order,
    pub supplier_name: Option<String>,
    pub supplier_contact_person: Option<String>,
    pub payments: Vec<PayDetail>,
    pub paid_total: MoneyCents,
    /// `order_amount - paid_total`; a missing order amount counts as zero.
    pub order_balance: MoneyCents,
}

impl OrderDetail {
    pub fn payment_count(&self) -> usize {
        self.payments.len()
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub order_number: String,
    pub material_name: String,
    pub project_name: Option<String>,
    pub supplier_id: Option<i32>,
    pub contact_phone: Option<String>,
    pub cutting_time: Option<Date>,
    pub estimated_arrival_time: Option<Date>,
    pub material_details: Option<String>,
    pub order_amount: Option<i64>,
    pub material_manager: Option<String>,
    pub sub_project_manager: Option<String>,
    pub attachments: Option<String>,
    pub create_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::suppliers::Entity",
        from = "Column::SupplierId",
        to = "super::suppliers::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Suppliers,
    #[sea_orm(has_many = "super::pays::Entity")]
    Pays,
}

impl Related<super::suppliers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Suppliers.def()
    }
}

impl Related<super::pays::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pays.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Order> for ActiveModel {
    fn from(value: &Order) -> Self {
        Self {
            id: ActiveValue::NotSet,
            order_number: ActiveValue::Set(value.order_number.clone()),
            material_name: ActiveValue::Set(value.material_name.clone()),
            project_name: ActiveValue::Set(value.project_name.clone()),
            supplier_id: ActiveValue::Set(value.supplier_id),
            contact_phone: ActiveValue::Set(value.contact_phone.clone()),
            cutting_time: ActiveValue::Set(value.cutting_time),
            estimated_arrival_time: ActiveValue::Set(value.estimated_arrival_time),
            material_details: ActiveValue::Set(value.material_details.clone()),
            order_amount: ActiveValue::Set(value.order_amount.map(MoneyCents::cents)),
            material_manager: ActiveValue::Set(value.material_manager.clone()),
            sub_project_manager: ActiveValue::Set(value.sub_project_manager.clone()),
            attachments: ActiveValue::Set(value.attachments.clone()),
            create_at: ActiveValue::Set(value.create_at),
        }
    }
}

impl From<Model> for Order {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            order_number: model.order_number,
            material_name: model.material_name,
            project_name: model.project_name,
            supplier_id: model.supplier_id,
            contact_phone: model.contact_phone,
            cutting_time: model.cutting_time,
            estimated_arrival_time: model.estimated_arrival_time,
            material_details: model.material_details,
            order_amount: model.order_amount.map(MoneyCents::new),
            material_manager: model.material_manager,
            sub_project_manager: model.sub_project_manager,
            attachments: model.attachments,
            create_at: model.create_at,
        }
    }
}
