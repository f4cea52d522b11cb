use api_types::ApiError;
use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

pub use server::{ServerConfig, ServerState, router, run, run_with_listener};

mod dashboard;
mod dictionary;
mod nursery;
mod order;
mod pay;
mod payer;
mod project;
mod server;
mod supplier;
mod upload;
mod views;

pub mod types {
    pub use api_types::{ApiError, ApiResponse, Decimal};

    pub mod supplier {
        pub use api_types::supplier::{SupplierNew, SupplierQuery, SupplierUpdate, SupplierView};
    }

    pub mod payer {
        pub use api_types::payer::{PayerNew, PayerQuery, PayerUpdate, PayerView};
    }

    pub mod project {
        pub use api_types::project::{
            AttachmentRef, AttachmentView, ProjectNew, ProjectQuery, ProjectUpdate, ProjectView,
        };
        pub use api_types::upload::UploadView;
    }

    pub mod order {
        pub use api_types::order::{OrderNew, OrderQuery, OrderUpdate, OrderView};
        pub use api_types::pay::{PayNew, PayQuery, PayUpdate, PayView};
    }

    pub mod dictionary {
        pub use api_types::dictionary::{
            DetailNew, DetailQuery, DetailUpdate, DetailView, DictionaryNew, DictionaryQuery,
            DictionaryUpdate, DictionaryView,
        };
    }

    pub mod nursery {
        pub use api_types::nursery::{
            InboundRequest, InboundResponse, InventoryQuery, LedgerEntryView, LedgerKind,
            NurseryStatsView, OrderItemUpdate, OutboundItemRequest, OutboundOrderUpdate,
            OutboundOrderView, OutboundRequest, OutboundResponse, PlantView, TransactionQuery,
        };
    }

    pub mod dashboard {
        pub use api_types::dashboard::{
            OverviewView, StatusBucketView, TopSupplierView, TrendPointView,
        };
    }
}

#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    Generic(String),
    Io(std::io::Error),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Unauthorized => StatusCode::UNAUTHORIZED,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) | EngineError::InUse(_) => StatusCode::CONFLICT,
        EngineError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InvalidAmount(_) | EngineError::InsufficientStock(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, msg) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
            ServerError::Io(err) => {
                tracing::error!("io error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ApiError::new(msg))).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<std::io::Error> for ServerError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_unauthorized_maps_to_401() {
        let res = ServerError::from(EngineError::Unauthorized).into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflict_maps_to_409() {
        let res = ServerError::from(EngineError::ExistingKey("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
        let res = ServerError::from(EngineError::InUse("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_invalid_input_maps_to_400() {
        let res = ServerError::from(EngineError::InvalidInput("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn engine_stock_and_amount_map_to_422() {
        let res = ServerError::from(EngineError::InvalidAmount("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let res =
            ServerError::from(EngineError::InsufficientStock("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn io_maps_to_500() {
        let err = std::io::Error::other("disk full");
        let res = ServerError::from(err).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
