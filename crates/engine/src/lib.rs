//! Business engine of the Greenyard back office.
//!
//! All reads and writes go through [`Engine`]. Every mutating operation runs
//! inside a single database transaction.

pub use attachments::Attachment;
pub use commands::{
    AttachmentInput, AttachmentNew, DictionaryDetailNew, DictionaryDetailUpdate, DictionaryNew,
    DictionaryUpdate, InboundCmd, OrderNew, OrderUpdate, OutboundCmd, OutboundItem, PayNew,
    PayUpdate, PayerNew, PayerUpdate, ProjectNew, ProjectUpdate, SupplierNew, SupplierUpdate,
    UpdateOutboundCmd, UpdateOutboundItem,
};
pub use dictionaries::Dictionary;
pub use dictionary_details::DictionaryDetail;
pub use error::EngineError;
pub use money::MoneyCents;
pub use nursery_transactions::{LedgerEntry, LedgerKind};
pub use ops::{
    CategoryCount, DashboardOverview, Engine, EngineBuilder, InboundReceipt, MonthlyTrendPoint,
    NurseryStats, OrderFilter, OutboundOrder, OutboundReceipt, PayFilter, PayerFilter,
    PaymentStatusBucket, ProjectFilter, SupplierFilter, TopSupplier,
};
pub use orders::{Order, OrderDetail};
pub use page::{Page, PageRequest};
pub use payers::{Payer, PayerType};
pub use pays::{Pay, PayDetail};
pub use plants::{LOW_STOCK_THRESHOLD, Plant};
pub use projects::Project;
pub use quantity::Quantity;
pub use suppliers::Supplier;
pub use users::User;
pub use util::parse_date;

mod attachments;
mod commands;
mod dictionaries;
mod dictionary_details;
mod error;
mod money;
mod nursery_transactions;
mod ops;
mod orders;
mod page;
mod payers;
mod pays;
mod plants;
mod projects;
mod quantity;
mod suppliers;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
