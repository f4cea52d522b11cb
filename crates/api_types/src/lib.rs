//! JSON request and response bodies of the Greenyard HTTP API.
//!
//! Money and quantities travel as fixed two-decimal strings (`"12.30"`).
//! Timestamps are `YYYY-MM-DD HH:MM:SS` (UTC) and calendar dates
//! `YYYY-MM-DD`.

use serde::{Deserialize, Serialize};

/// Success envelope: `{"code":0,"msg":...,"data":...,"count":...}`.
///
/// `count` is only present on paginated lists and carries the total number
/// of matching rows.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub msg: String,
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            code: 0,
            msg: "ok".to_string(),
            data: Some(data),
            count: None,
        }
    }

    pub fn page(data: T, count: u64) -> Self {
        Self {
            code: 0,
            msg: "ok".to_string(),
            data: Some(data),
            count: Some(count),
        }
    }

    pub fn with_msg(mut self, msg: impl Into<String>) -> Self {
        self.msg = msg.into();
        self
    }
}

/// Failure envelope: `{"code":-1,"msg":...}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub code: i32,
    pub msg: String,
}

impl ApiError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            code: -1,
            msg: msg.into(),
        }
    }
}

/// A decimal sent either as a JSON string or a JSON number.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Decimal {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Decimal {
    /// Textual form, ready for exact decimal parsing.
    pub fn to_text(&self) -> String {
        match self {
            Self::Integer(value) => value.to_string(),
            Self::Float(value) => value.to_string(),
            Self::Text(value) => value.trim().to_string(),
        }
    }
}

impl From<&str> for Decimal {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Field of a partial update that may be cleared.
///
/// Use with `#[serde(default, deserialize_with = "nullable")]`: an absent
/// key stays `None`, `null` becomes `Some(None)` and a value `Some(Some(_))`.
pub type Nullable<T> = Option<Option<T>>;

pub fn nullable<'de, D, T>(deserializer: D) -> Result<Nullable<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

pub mod supplier {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct SupplierQuery {
        pub page: Option<u64>,
        pub limit: Option<u64>,
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

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SupplierNew {
        pub type_id: i32,
        pub name: String,
        pub contact_person: String,
        pub phone: String,
        pub email: Option<String>,
        pub bank_name: String,
        /// Kept verbatim; long account numbers must not go through a number.
        pub account_number: String,
        pub address: Option<String>,
        pub remark: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
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

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SupplierView {
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
        pub create_at: String,
    }
}

pub mod payer {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct PayerQuery {
        pub page: Option<u64>,
        pub limit: Option<u64>,
        pub type_id: Option<i32>,
        pub name: Option<String>,
        pub bank_name: Option<String>,
        pub account_number: Option<String>,
        pub remark: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PayerNew {
        /// 1 organisation, 2 individual.
        pub type_id: i32,
        pub name: String,
        pub bank_name: Option<String>,
        pub account_number: Option<String>,
        pub remark: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct PayerUpdate {
        pub type_id: Option<i32>,
        pub name: Option<String>,
        pub bank_name: Option<String>,
        pub account_number: Option<String>,
        pub remark: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PayerView {
        pub id: i32,
        pub type_id: i32,
        /// `organisation` or `individual`.
        pub type_name: String,
        pub name: String,
        pub bank_name: Option<String>,
        pub account_number: Option<String>,
        pub remark: Option<String>,
        pub create_at: String,
    }
}

pub mod project {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ProjectQuery {
        pub page: Option<u64>,
        pub limit: Option<u64>,
        pub project_name: Option<String>,
        pub project_full_name: Option<String>,
        pub project_scale: Option<String>,
        pub project_status: Option<String>,
        pub project_amount: Option<String>,
    }

    /// Attachment reference inside a project create/update body.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct AttachmentRef {
        pub id: Option<i32>,
        #[serde(alias = "code")]
        pub attachment_code: Option<String>,
        pub filename: Option<String>,
        pub original_filename: Option<String>,
        pub url: Option<String>,
        pub file_size: Option<i64>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ProjectNew {
        pub project_name: String,
        pub project_full_name: Option<String>,
        pub project_scale: Option<String>,
        pub start_date: Option<String>,
        pub end_date: Option<String>,
        pub project_status: Option<String>,
        pub project_amount: Option<Decimal>,
        pub attachments: Option<Vec<AttachmentRef>>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ProjectUpdate {
        pub project_name: Option<String>,
        pub project_full_name: Option<String>,
        pub project_scale: Option<String>,
        #[serde(
            default,
            deserialize_with = "nullable",
            skip_serializing_if = "Option::is_none"
        )]
        pub start_date: Nullable<String>,
        #[serde(
            default,
            deserialize_with = "nullable",
            skip_serializing_if = "Option::is_none"
        )]
        pub end_date: Nullable<String>,
        pub project_status: Option<String>,
        #[serde(
            default,
            deserialize_with = "nullable",
            skip_serializing_if = "Option::is_none"
        )]
        pub project_amount: Nullable<Decimal>,
        /// When present, the complete attachment list of the project.
        pub attachments: Option<Vec<AttachmentRef>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AttachmentView {
        pub id: i32,
        pub project_id: i32,
        pub attachment_code: String,
        pub filename: String,
        pub original_filename: String,
        pub file_path: String,
        pub file_size: i64,
        pub create_at: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProjectView {
        pub id: i32,
        pub project_name: String,
        pub project_full_name: Option<String>,
        pub project_scale: Option<String>,
        pub start_date: Option<String>,
        pub end_date: Option<String>,
        pub project_status: Option<String>,
        pub project_amount: Option<String>,
        pub create_at: String,
        pub attachments: Vec<AttachmentView>,
    }
}

pub mod upload {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UploadView {
        /// Stored name, `<stem>_<yyyymmdd_HHMMSS>.<ext>`.
        pub filename: String,
        pub original_filename: String,
        /// Public path, `/uploads/<filename>`.
        pub url: String,
        #[serde(rename = "size")]
        pub file_size: u64,
        /// Attachment row id, set when the upload was recorded against a
        /// project.
        #[serde(rename = "id")]
        pub attachment_id: Option<i32>,
    }
}

pub mod order {
    use super::*;
    use crate::pay::PayView;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct OrderQuery {
        pub page: Option<u64>,
        pub limit: Option<u64>,
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

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct OrderNew {
        pub order_number: String,
        pub material_name: String,
        pub project_name: Option<String>,
        pub supplier_id: Option<i32>,
        pub contact_phone: Option<String>,
        pub cutting_time: Option<String>,
        pub estimated_arrival_time: Option<String>,
        pub material_details: Option<String>,
        pub order_amount: Option<Decimal>,
        pub material_manager: Option<String>,
        pub sub_project_manager: Option<String>,
        /// Opaque JSON text kept for the UI.
        pub attachments: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct OrderUpdate {
        pub order_number: Option<String>,
        pub material_name: Option<String>,
        pub project_name: Option<String>,
        #[serde(
            default,
            deserialize_with = "nullable",
            skip_serializing_if = "Option::is_none"
        )]
        pub supplier_id: Nullable<i32>,
        pub contact_phone: Option<String>,
        #[serde(
            default,
            deserialize_with = "nullable",
            skip_serializing_if = "Option::is_none"
        )]
        pub cutting_time: Nullable<String>,
        #[serde(
            default,
            deserialize_with = "nullable",
            skip_serializing_if = "Option::is_none"
        )]
        pub estimated_arrival_time: Nullable<String>,
        pub material_details: Option<String>,
        #[serde(
            default,
            deserialize_with = "nullable",
            skip_serializing_if = "Option::is_none"
        )]
        pub order_amount: Nullable<Decimal>,
        pub material_manager: Option<String>,
        pub sub_project_manager: Option<String>,
        pub attachments: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct OrderView {
        pub id: i32,
        pub order_number: String,
        pub material_name: String,
        pub project_name: Option<String>,
        pub supplier_id: Option<i32>,
        pub supplier_name: Option<String>,
        pub supplier_contact_person: Option<String>,
        pub contact_phone: Option<String>,
        pub cutting_time: Option<String>,
        pub estimated_arrival_time: Option<String>,
        pub material_details: Option<String>,
        pub order_amount: Option<String>,
        pub material_manager: Option<String>,
        pub sub_project_manager: Option<String>,
        pub attachments: Option<String>,
        pub create_at: String,
        pub payments: Vec<PayView>,
        pub payment_count: usize,
        pub paid_total: String,
        /// `order_amount` minus the sum of linked payments.
        pub order_balance: String,
    }
}

pub mod pay {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct PayQuery {
        pub page: Option<u64>,
        pub limit: Option<u64>,
        pub id: Option<i32>,
        pub order_id: Option<i32>,
        pub payer_supplier_id: Option<i32>,
        pub payee_supplier_id: Option<i32>,
        pub pay_number: Option<String>,
        pub payment_status: Option<String>,
        pub handler: Option<String>,
        pub order_number: Option<String>,
        pub payer_supplier_name: Option<String>,
        pub payee_supplier_name: Option<String>,
        pub create_at: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct PayNew {
        pub pay_number: String,
        pub order_id: Option<i32>,
        pub payer_supplier_id: Option<i32>,
        pub payee_supplier_id: Option<i32>,
        pub payment_purpose: Option<String>,
        pub current_payment_amount: Option<Decimal>,
        pub invoice_amount: Option<Decimal>,
        pub payment_status: Option<String>,
        pub handler: Option<String>,
        /// `YYYY-MM-DD HH:MM:SS` or `YYYY-MM-DD`; defaults to now.
        pub create_at: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct PayUpdate {
        pub pay_number: Option<String>,
        #[serde(
            default,
            deserialize_with = "nullable",
            skip_serializing_if = "Option::is_none"
        )]
        pub order_id: Nullable<i32>,
        #[serde(
            default,
            deserialize_with = "nullable",
            skip_serializing_if = "Option::is_none"
        )]
        pub payer_supplier_id: Nullable<i32>,
        #[serde(
            default,
            deserialize_with = "nullable",
            skip_serializing_if = "Option::is_none"
        )]
        pub payee_supplier_id: Nullable<i32>,
        pub payment_purpose: Option<String>,
        #[serde(
            default,
            deserialize_with = "nullable",
            skip_serializing_if = "Option::is_none"
        )]
        pub current_payment_amount: Nullable<Decimal>,
        #[serde(
            default,
            deserialize_with = "nullable",
            skip_serializing_if = "Option::is_none"
        )]
        pub invoice_amount: Nullable<Decimal>,
        pub payment_status: Option<String>,
        pub handler: Option<String>,
        pub create_at: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PayView {
        pub id: i32,
        pub pay_number: String,
        pub order_id: Option<i32>,
        pub order_number: Option<String>,
        pub payer_supplier_id: Option<i32>,
        pub payer_name: Option<String>,
        pub payee_supplier_id: Option<i32>,
        pub payee_name: Option<String>,
        pub payment_purpose: Option<String>,
        pub current_payment_amount: Option<String>,
        pub invoice_amount: Option<String>,
        pub payment_status: Option<String>,
        pub handler: Option<String>,
        pub create_at: String,
    }
}

pub mod dictionary {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct DictionaryQuery {
        pub page: Option<u64>,
        pub limit: Option<u64>,
        /// Substring of the code or the name.
        pub keyword: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct DetailQuery {
        pub page: Option<u64>,
        pub limit: Option<u64>,
        pub dic_id: Option<i32>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DictionaryNew {
        pub code: String,
        pub name: String,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct DictionaryUpdate {
        pub code: Option<String>,
        pub name: Option<String>,
        pub valid_mark: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DetailNew {
        pub dic_id: i32,
        pub code: String,
        pub value: String,
        pub order_no: Option<i32>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct DetailUpdate {
        pub code: Option<String>,
        pub value: Option<String>,
        pub order_no: Option<i32>,
        pub valid_mark: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DictionaryView {
        pub id: i32,
        pub code: String,
        pub name: String,
        pub valid_mark: String,
        pub create_user: Option<String>,
        pub create_time: Option<String>,
        pub update_user: Option<String>,
        pub update_time: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DetailView {
        pub id: i32,
        pub dic_id: i32,
        pub code: String,
        pub value: String,
        pub order_no: i32,
        pub valid_mark: String,
        pub create_user: Option<String>,
        pub create_time: Option<String>,
        pub update_user: Option<String>,
        pub update_time: Option<String>,
    }
}

pub mod nursery {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum LedgerKind {
        In,
        Out,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct InventoryQuery {
        pub page: Option<u64>,
        pub limit: Option<u64>,
        pub name: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionQuery {
        pub page: Option<u64>,
        pub limit: Option<u64>,
        #[serde(rename = "type")]
        pub kind: Option<LedgerKind>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InboundRequest {
        pub name: String,
        pub category: Option<String>,
        pub spec: Option<String>,
        pub unit: Option<String>,
        pub quantity: Decimal,
        /// Unit purchase price; defaults to 0.
        pub price: Option<Decimal>,
        pub location: Option<String>,
        pub operator: Option<String>,
        pub remark: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InboundResponse {
        pub order_no: String,
        pub plant_id: i32,
        pub transaction_id: i32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct OutboundItemRequest {
        pub plant_id: Option<i32>,
        #[serde(default)]
        pub name: String,
        pub spec: Option<String>,
        pub unit: Option<String>,
        pub quantity: Decimal,
        pub price: Option<Decimal>,
        #[serde(default)]
        pub is_non_inventory: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct OutboundRequest {
        pub items: Vec<OutboundItemRequest>,
        pub destination: Option<String>,
        pub operator: Option<String>,
        pub remark: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct OutboundResponse {
        pub order_no: String,
        pub transaction_ids: Vec<i32>,
        pub total_price: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct OrderItemUpdate {
        /// Ledger row id.
        pub id: i32,
        pub quantity: Option<Decimal>,
        pub price: Option<Decimal>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct OutboundOrderUpdate {
        pub operator: Option<String>,
        pub destination: Option<String>,
        pub remark: Option<String>,
        #[serde(default)]
        pub items: Vec<OrderItemUpdate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PlantView {
        pub id: i32,
        pub name: String,
        pub category: Option<String>,
        pub spec: String,
        pub unit: String,
        pub quantity: String,
        /// Weighted-average unit cost.
        pub price: String,
        pub location: Option<String>,
        pub remark: Option<String>,
        pub low_stock: bool,
        pub create_at: String,
        pub update_at: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LedgerEntryView {
        pub id: i32,
        pub order_no: String,
        #[serde(rename = "type")]
        pub kind: LedgerKind,
        pub plant_id: Option<i32>,
        pub plant_name: String,
        pub spec: Option<String>,
        pub unit: Option<String>,
        pub quantity: String,
        pub price: String,
        pub total_price: String,
        pub operator: Option<String>,
        pub destination: Option<String>,
        pub location: Option<String>,
        pub remark: Option<String>,
        pub create_at: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct OutboundOrderView {
        pub order_no: String,
        pub total_price: String,
        pub create_at: String,
        pub operator: Option<String>,
        pub destination: Option<String>,
        pub item_count: usize,
        pub items: Vec<LedgerEntryView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryCountView {
        pub category: String,
        pub count: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TopPlantView {
        pub name: String,
        pub quantity: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct NurseryStatsView {
        pub total_varieties: u64,
        pub month_outbound: u64,
        pub category_count: u64,
        pub low_stock: u64,
        pub category_distribution: Vec<CategoryCountView>,
        pub top5: Vec<TopPlantView>,
        pub recent_activities: Vec<LedgerEntryView>,
    }
}

pub mod dashboard {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct OverviewView {
        pub total_order_amount: String,
        pub total_paid_amount: String,
        pub pending_amount: String,
        pub order_count: u64,
        pub pay_count: u64,
        pub supplier_count: u64,
        pub payer_count: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct StatusBucketView {
        pub status: String,
        pub count: u64,
        pub amount: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TrendPointView {
        /// `YYYY-MM`
        pub month: String,
        pub order_count: u64,
        pub order_amount: String,
        pub pay_count: u64,
        pub pay_amount: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TopSupplierView {
        pub id: i32,
        pub name: String,
        pub order_count: u64,
        pub total_amount: String,
    }
}
