//! Payments API endpoints.

use api_types::{
    ApiResponse,
    pay::{PayNew, PayQuery, PayUpdate, PayView},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{PayDetail, PayFilter};

use crate::{ServerError, server::ServerState, views};

pub(crate) fn view(detail: PayDetail) -> PayView {
    let pay = detail.pay;
    PayView {
        id: pay.id,
        pay_number: pay.pay_number,
        order_id: pay.order_id,
        order_number: detail.order_number,
        payer_supplier_id: pay.payer_supplier_id,
        payer_name: detail.payer_name,
        payee_supplier_id: pay.payee_supplier_id,
        payee_name: detail.payee_name,
        payment_purpose: pay.payment_purpose,
        current_payment_amount: pay.current_payment_amount.map(|a| a.to_string()),
        invoice_amount: pay.invoice_amount.map(|a| a.to_string()),
        payment_status: pay.payment_status,
        handler: pay.handler,
        create_at: views::timestamp(pay.create_at),
    }
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<PayQuery>,
) -> Result<Json<ApiResponse<Vec<PayView>>>, ServerError> {
    let filter = PayFilter {
        id: query.id,
        order_id: query.order_id,
        payer_supplier_id: query.payer_supplier_id,
        payee_supplier_id: query.payee_supplier_id,
        pay_number: query.pay_number,
        payment_status: query.payment_status,
        handler: query.handler,
        order_number: query.order_number,
        payer_supplier_name: query.payer_supplier_name,
        payee_supplier_name: query.payee_supplier_name,
        create_at: query.create_at,
    };
    let page = state
        .engine
        .list_pays(&filter, views::page(query.page, query.limit))
        .await?
        .map(view);

    Ok(Json(ApiResponse::page(page.items, page.total)))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<PayView>>, ServerError> {
    let pay = state.engine.pay(id).await?;
    Ok(Json(ApiResponse::ok(view(pay))))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<PayNew>,
) -> Result<(StatusCode, Json<ApiResponse<PayView>>), ServerError> {
    let cmd = engine::PayNew {
        pay_number: payload.pay_number,
        order_id: payload.order_id,
        payer_supplier_id: payload.payer_supplier_id,
        payee_supplier_id: payload.payee_supplier_id,
        payment_purpose: payload.payment_purpose,
        current_payment_amount: views::optional_money(payload.current_payment_amount.as_ref())?,
        invoice_amount: views::optional_money(payload.invoice_amount.as_ref())?,
        payment_status: payload.payment_status,
        handler: payload.handler,
        create_at: views::optional_timestamp(payload.create_at.as_deref(), "create_at")?,
    };
    let pay = state.engine.new_pay(cmd).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(view(pay)).with_msg("created")),
    ))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<PayUpdate>,
) -> Result<Json<ApiResponse<PayView>>, ServerError> {
    let cmd = engine::PayUpdate {
        pay_number: payload.pay_number,
        order_id: payload.order_id,
        payer_supplier_id: payload.payer_supplier_id,
        payee_supplier_id: payload.payee_supplier_id,
        payment_purpose: payload.payment_purpose,
        current_payment_amount: views::patch_money(payload.current_payment_amount)?,
        invoice_amount: views::patch_money(payload.invoice_amount)?,
        payment_status: payload.payment_status,
        handler: payload.handler,
        create_at: views::optional_timestamp(payload.create_at.as_deref(), "create_at")?,
    };
    let pay = state.engine.update_pay(id, cmd).await?;

    Ok(Json(ApiResponse::ok(view(pay)).with_msg("updated")))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, ServerError> {
    state.engine.delete_pay(id).await?;
    Ok(Json(ApiResponse::ok(()).with_msg("deleted")))
}
