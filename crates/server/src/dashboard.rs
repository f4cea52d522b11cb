//! Purchasing dashboard endpoints.

use api_types::{
    ApiResponse,
    dashboard::{OverviewView, StatusBucketView, TopSupplierView, TrendPointView},
};
use axum::{Json, extract::State};
use chrono::Utc;

use crate::{ServerError, server::ServerState};

pub async fn overview(
    State(state): State<ServerState>,
) -> Result<Json<ApiResponse<OverviewView>>, ServerError> {
    let overview = state.engine.dashboard_overview().await?;

    Ok(Json(ApiResponse::ok(OverviewView {
        total_order_amount: overview.order_total.to_string(),
        total_paid_amount: overview.paid_total.to_string(),
        pending_amount: overview.pending.to_string(),
        order_count: overview.order_count,
        pay_count: overview.pay_count,
        supplier_count: overview.supplier_count,
        payer_count: overview.payer_count,
    })))
}

pub async fn payment_status(
    State(state): State<ServerState>,
) -> Result<Json<ApiResponse<Vec<StatusBucketView>>>, ServerError> {
    let buckets = state.engine.payment_status_distribution().await?;

    Ok(Json(ApiResponse::ok(
        buckets
            .into_iter()
            .map(|b| StatusBucketView {
                status: b.status,
                count: b.count,
                amount: b.amount.to_string(),
            })
            .collect(),
    )))
}

pub async fn monthly_trend(
    State(state): State<ServerState>,
) -> Result<Json<ApiResponse<Vec<TrendPointView>>>, ServerError> {
    let trend = state.engine.monthly_trend(Utc::now()).await?;

    Ok(Json(ApiResponse::ok(
        trend
            .into_iter()
            .map(|p| TrendPointView {
                month: p.month,
                order_count: p.order_count,
                order_amount: p.order_amount.to_string(),
                pay_count: p.pay_count,
                pay_amount: p.pay_amount.to_string(),
            })
            .collect(),
    )))
}

pub async fn top_suppliers(
    State(state): State<ServerState>,
) -> Result<Json<ApiResponse<Vec<TopSupplierView>>>, ServerError> {
    let suppliers = state.engine.top_suppliers().await?;

    Ok(Json(ApiResponse::ok(
        suppliers
            .into_iter()
            .map(|s| TopSupplierView {
                id: s.supplier_id,
                name: s.name,
                order_count: s.order_count,
                total_amount: s.order_amount.to_string(),
            })
            .collect(),
    )))
}
