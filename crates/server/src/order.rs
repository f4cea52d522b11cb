//! Purchase orders API endpoints.

use api_types::{
    ApiResponse,
    order::{OrderNew, OrderQuery, OrderUpdate, OrderView},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{OrderDetail, OrderFilter};

use crate::{ServerError, pay, server::ServerState, views};

fn view(detail: OrderDetail) -> OrderView {
    let payment_count = detail.payment_count();
    let order = detail.order;
    OrderView {
        id: order.id,
        order_number: order.order_number,
        material_name: order.material_name,
        project_name: order.project_name,
        supplier_id: order.supplier_id,
        supplier_name: detail.supplier_name,
        supplier_contact_person: detail.supplier_contact_person,
        contact_phone: order.contact_phone,
        cutting_time: order.cutting_time.map(views::date),
        estimated_arrival_time: order.estimated_arrival_time.map(views::date),
        material_details: order.material_details,
        order_amount: order.order_amount.map(|a| a.to_string()),
        material_manager: order.material_manager,
        sub_project_manager: order.sub_project_manager,
        attachments: order.attachments,
        create_at: views::timestamp(order.create_at),
        payments: detail.payments.into_iter().map(pay::view).collect(),
        payment_count,
        paid_total: detail.paid_total.to_string(),
        order_balance: detail.order_balance.to_string(),
    }
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<OrderQuery>,
) -> Result<Json<ApiResponse<Vec<OrderView>>>, ServerError> {
    let filter = OrderFilter {
        id: query.id,
        supplier_id: query.supplier_id,
        order_number: query.order_number,
        material_name: query.material_name,
        project_name: query.project_name,
        contact_phone: query.contact_phone,
        order_amount: query.order_amount,
        material_manager: query.material_manager,
        sub_project_manager: query.sub_project_manager,
        supplier_name: query.supplier_name,
        supplier_contact_person: query.supplier_contact_person,
        cutting_time: query.cutting_time,
        estimated_arrival_time: query.estimated_arrival_time,
        create_at: query.create_at,
    };
    let page = state
        .engine
        .list_orders(&filter, views::page(query.page, query.limit))
        .await?
        .map(view);

    Ok(Json(ApiResponse::page(page.items, page.total)))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<OrderView>>, ServerError> {
    let order = state.engine.order(id).await?;
    Ok(Json(ApiResponse::ok(view(order))))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<OrderNew>,
) -> Result<(StatusCode, Json<ApiResponse<OrderView>>), ServerError> {
    let cmd = engine::OrderNew {
        order_number: payload.order_number,
        material_name: payload.material_name,
        project_name: payload.project_name,
        supplier_id: payload.supplier_id,
        contact_phone: payload.contact_phone,
        cutting_time: views::optional_date(payload.cutting_time.as_deref(), "cutting_time")?,
        estimated_arrival_time: views::optional_date(
            payload.estimated_arrival_time.as_deref(),
            "estimated_arrival_time",
        )?,
        material_details: payload.material_details,
        order_amount: views::optional_money(payload.order_amount.as_ref())?,
        material_manager: payload.material_manager,
        sub_project_manager: payload.sub_project_manager,
        attachments: payload.attachments,
    };
    let order = state.engine.new_order(cmd).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(view(order)).with_msg("created")),
    ))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<OrderUpdate>,
) -> Result<Json<ApiResponse<OrderView>>, ServerError> {
    let cmd = engine::OrderUpdate {
        order_number: payload.order_number,
        material_name: payload.material_name,
        project_name: payload.project_name,
        supplier_id: payload.supplier_id,
        contact_phone: payload.contact_phone,
        cutting_time: views::patch_date(payload.cutting_time, "cutting_time")?,
        estimated_arrival_time: views::patch_date(
            payload.estimated_arrival_time,
            "estimated_arrival_time",
        )?,
        material_details: payload.material_details,
        order_amount: views::patch_money(payload.order_amount)?,
        material_manager: payload.material_manager,
        sub_project_manager: payload.sub_project_manager,
        attachments: payload.attachments,
    };
    let order = state.engine.update_order(id, cmd).await?;

    Ok(Json(ApiResponse::ok(view(order)).with_msg("updated")))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, ServerError> {
    state.engine.delete_order(id).await?;
    Ok(Json(ApiResponse::ok(()).with_msg("deleted")))
}
