//! Payers API endpoints.

use api_types::{
    ApiResponse,
    payer::{PayerNew, PayerQuery, PayerUpdate, PayerView},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{Payer, PayerFilter, PayerType};

use crate::{ServerError, server::ServerState, views};

fn view(payer: Payer) -> PayerView {
    let type_name = match payer.payer_type {
        PayerType::Organisation => "organisation",
        PayerType::Individual => "individual",
    };
    PayerView {
        id: payer.id,
        type_id: payer.payer_type.id(),
        type_name: type_name.to_string(),
        name: payer.name,
        bank_name: payer.bank_name,
        account_number: payer.account_number,
        remark: payer.remark,
        create_at: views::timestamp(payer.create_at),
    }
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<PayerQuery>,
) -> Result<Json<ApiResponse<Vec<PayerView>>>, ServerError> {
    let filter = PayerFilter {
        type_id: query.type_id,
        name: query.name,
        bank_name: query.bank_name,
        account_number: query.account_number,
        remark: query.remark,
    };
    let page = state
        .engine
        .list_payers(&filter, views::page(query.page, query.limit))
        .await?
        .map(view);

    Ok(Json(ApiResponse::page(page.items, page.total)))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<PayerView>>, ServerError> {
    let payer = state.engine.payer(id).await?;
    Ok(Json(ApiResponse::ok(view(payer))))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<PayerNew>,
) -> Result<(StatusCode, Json<ApiResponse<PayerView>>), ServerError> {
    let payer = state
        .engine
        .new_payer(engine::PayerNew {
            type_id: payload.type_id,
            name: payload.name,
            bank_name: payload.bank_name,
            account_number: payload.account_number,
            remark: payload.remark,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(view(payer)).with_msg("created")),
    ))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<PayerUpdate>,
) -> Result<Json<ApiResponse<PayerView>>, ServerError> {
    let payer = state
        .engine
        .update_payer(
            id,
            engine::PayerUpdate {
                type_id: payload.type_id,
                name: payload.name,
                bank_name: payload.bank_name,
                account_number: payload.account_number,
                remark: payload.remark,
            },
        )
        .await?;

    Ok(Json(ApiResponse::ok(view(payer)).with_msg("updated")))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, ServerError> {
    state.engine.delete_payer(id).await?;
    Ok(Json(ApiResponse::ok(()).with_msg("deleted")))
}
