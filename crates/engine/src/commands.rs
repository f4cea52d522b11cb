//! Command structs for engine write operations.
//!
//! These types group parameters for create/update operations, keeping call
//! sites readable and avoiding long argument lists.
//!
//! Update commands are partial: `None` leaves a field untouched. For optional
//! text fields `Some("")` clears the stored value; other optional columns are
//! `Option<Option<T>>`, where `Some(None)` clears them.

use chrono::{DateTime, NaiveDate, Utc};

use crate::{MoneyCents, Quantity};

// suppliers / payers

#[derive(Clone, Debug, Default)]
pub struct SupplierNew {
    pub type_id: i32,
    pub name: String,
    pub contact_person: String,
    pub phone: String,
    pub email: Option<String>,
    pub bank_name: String,
    pub account_number: String,
    pub address: Option<String>,
    pub remark: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct SupplierUpdate {
    pub type_id: Option<i32>,
    pub name: Option<String>,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
    pub address: Option<String>,
    pub remark: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct PayerNew {
    pub type_id: i32,
    pub name: String,
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
    pub remark: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct PayerUpdate {
    pub type_id: Option<i32>,
    pub name: Option<String>,
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
    pub remark: Option<String>,
}

// projects / attachments

/// An attachment reference carried by a project create/update.
///
/// With `id`: re-link (or keep) an existing attachment, optionally changing
/// its code. Without `id`: create a new row from `filename` or `url`.
#[derive(Clone, Debug, Default)]
pub struct AttachmentInput {
    pub id: Option<i32>,
    pub attachment_code: Option<String>,
    pub filename: Option<String>,
    pub original_filename: Option<String>,
    pub url: Option<String>,
    pub file_size: Option<i64>,
}

/// A file already stored on disk that should be recorded against a project.
#[derive(Clone, Debug)]
pub struct AttachmentNew {
    pub project_id: i32,
    pub attachment_code: String,
    pub filename: String,
    pub original_filename: String,
    pub file_path: String,
    pub file_size: i64,
}

#[derive(Clone, Debug, Default)]
pub struct ProjectNew {
    pub project_name: String,
    pub project_full_name: Option<String>,
    pub project_scale: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub project_status: Option<String>,
    pub project_amount: Option<MoneyCents>,
    pub attachments: Option<Vec<AttachmentInput>>,
}

#[derive(Clone, Debug, Default)]
pub struct ProjectUpdate {
    pub project_name: Option<String>,
    pub project_full_name: Option<String>,
    pub project_scale: Option<String>,
    pub start_date: Option<Option<NaiveDate>>,
    pub end_date: Option<Option<NaiveDate>>,
    pub project_status: Option<String>,
    pub project_amount: Option<Option<MoneyCents>>,
    /// `Some(list)` replaces the project's attachments; `None` keeps them.
    pub attachments: Option<Vec<AttachmentInput>>,
}

// orders / payments

#[derive(Clone, Debug, Default)]
pub struct OrderNew {
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
    pub attachments: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct OrderUpdate {
    pub order_number: Option<String>,
    pub material_name: Option<String>,
    pub project_name: Option<String>,
    pub supplier_id: Option<Option<i32>>,
    pub contact_phone: Option<String>,
    pub cutting_time: Option<Option<NaiveDate>>,
    pub estimated_arrival_time: Option<Option<NaiveDate>>,
    pub material_details: Option<String>,
    pub order_amount: Option<Option<MoneyCents>>,
    pub material_manager: Option<String>,
    pub sub_project_manager: Option<String>,
    pub attachments: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct PayNew {
    pub pay_number: String,
    pub order_id: Option<i32>,
    pub payer_supplier_id: Option<i32>,
    pub payee_supplier_id: Option<i32>,
    pub payment_purpose: Option<String>,
    pub current_payment_amount: Option<MoneyCents>,
    pub invoice_amount: Option<MoneyCents>,
    pub payment_status: Option<String>,
    pub handler: Option<String>,
    /// Defaults to now.
    pub create_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default)]
pub struct PayUpdate {
    pub pay_number: Option<String>,
    pub order_id: Option<Option<i32>>,
    pub payer_supplier_id: Option<Option<i32>>,
    pub payee_supplier_id: Option<Option<i32>>,
    pub payment_purpose: Option<String>,
    pub current_payment_amount: Option<Option<MoneyCents>>,
    pub invoice_amount: Option<Option<MoneyCents>>,
    pub payment_status: Option<String>,
    pub handler: Option<String>,
    pub create_at: Option<DateTime<Utc>>,
}

// dictionaries

#[derive(Clone, Debug, Default)]
pub struct DictionaryNew {
    pub code: String,
    pub name: String,
}

#[derive(Clone, Debug, Default)]
pub struct DictionaryUpdate {
    pub code: Option<String>,
    pub name: Option<String>,
    pub valid_mark: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct DictionaryDetailNew {
    pub dic_id: i32,
    pub code: String,
    pub value: String,
    /// Defaults to one past the current last entry.
    pub order_no: Option<i32>,
}

#[derive(Clone, Debug, Default)]
pub struct DictionaryDetailUpdate {
    pub code: Option<String>,
    pub value: Option<String>,
    pub order_no: Option<i32>,
    pub valid_mark: Option<String>,
}

// nursery

/// Receive stock into the nursery.
#[derive(Clone, Debug)]
pub struct InboundCmd {
    pub name: String,
    pub category: Option<String>,
    pub spec: Option<String>,
    pub unit: Option<String>,
    pub quantity: Quantity,
    pub price: MoneyCents,
    pub location: Option<String>,
    pub operator: Option<String>,
    pub remark: Option<String>,
}

impl InboundCmd {
    #[must_use]
    pub fn new(name: impl Into<String>, quantity: Quantity, price: MoneyCents) -> Self {
        Self {
            name: name.into(),
            category: None,
            spec: None,
            unit: None,
            quantity,
            price,
            location: None,
            operator: None,
            remark: None,
        }
    }

    #[must_use]
    pub fn spec(mut self, spec: impl Into<String>) -> Self {
        self.spec = Some(spec.into());
        self
    }

    #[must_use]
    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    #[must_use]
    pub fn operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = Some(operator.into());
        self
    }
}

/// One line of an outbound order.
#[derive(Clone, Debug)]
pub struct OutboundItem {
    pub plant_id: Option<i32>,
    pub name: String,
    pub spec: Option<String>,
    pub unit: Option<String>,
    pub quantity: Quantity,
    pub price: MoneyCents,
    /// Recorded in the ledger without touching stock.
    pub is_non_inventory: bool,
}

impl OutboundItem {
    /// A line drawn from stock.
    #[must_use]
    pub fn inventory(plant_id: i32, quantity: Quantity, price: MoneyCents) -> Self {
        Self {
            plant_id: Some(plant_id),
            name: String::new(),
            spec: None,
            unit: None,
            quantity,
            price,
            is_non_inventory: false,
        }
    }

    /// A passthrough line (bought in and delivered directly).
    #[must_use]
    pub fn non_inventory(name: impl Into<String>, quantity: Quantity, price: MoneyCents) -> Self {
        Self {
            plant_id: None,
            name: name.into(),
            spec: None,
            unit: None,
            quantity,
            price,
            is_non_inventory: true,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct OutboundCmd {
    pub items: Vec<OutboundItem>,
    pub destination: Option<String>,
    pub operator: Option<String>,
    pub remark: Option<String>,
}

#[derive(Clone, Debug)]
pub struct UpdateOutboundItem {
    /// Ledger row id; rows outside the order are ignored.
    pub id: i32,
    pub quantity: Option<Quantity>,
    pub price: Option<MoneyCents>,
}

#[derive(Clone, Debug, Default)]
pub struct UpdateOutboundCmd {
    pub operator: Option<String>,
    pub destination: Option<String>,
    pub remark: Option<String>,
    pub items: Vec<UpdateOutboundItem>,
}
