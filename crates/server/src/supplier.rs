//! Suppliers API endpoints.

use api_types::{
    ApiResponse,
    supplier::{SupplierNew, SupplierQuery, SupplierUpdate, SupplierView},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{Supplier, SupplierFilter};

use crate::{ServerError, server::ServerState, views};

fn view(supplier: Supplier) -> SupplierView {
    SupplierView {
        id: supplier.id,
        type_id: supplier.type_id,
        name: supplier.name,
        contact_person: supplier.contact_person,
        phone: supplier.phone,
        email: supplier.email,
        bank_name: supplier.bank_name,
        account_number: supplier.account_number,
        address: supplier.address,
        remark: supplier.remark,
        create_at: views::timestamp(supplier.create_at),
    }
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<SupplierQuery>,
) -> Result<Json<ApiResponse<Vec<SupplierView>>>, ServerError> {
    let filter = SupplierFilter {
        type_id: query.type_id,
        name: query.name,
        contact_person: query.contact_person,
        phone: query.phone,
        email: query.email,
        bank_name: query.bank_name,
        account_number: query.account_number,
        address: query.address,
        remark: query.remark,
    };
    let page = state
        .engine
        .list_suppliers(&filter, views::page(query.page, query.limit))
        .await?
        .map(view);

    Ok(Json(ApiResponse::page(page.items, page.total)))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<SupplierView>>, ServerError> {
    let supplier = state.engine.supplier(id).await?;
    Ok(Json(ApiResponse::ok(view(supplier))))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<SupplierNew>,
) -> Result<(StatusCode, Json<ApiResponse<SupplierView>>), ServerError> {
    let supplier = state
        .engine
        .new_supplier(engine::SupplierNew {
            type_id: payload.type_id,
            name: payload.name,
            contact_person: payload.contact_person,
            phone: payload.phone,
            email: payload.email,
            bank_name: payload.bank_name,
            account_number: payload.account_number,
            address: payload.address,
            remark: payload.remark,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(view(supplier)).with_msg("created")),
    ))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<SupplierUpdate>,
) -> Result<Json<ApiResponse<SupplierView>>, ServerError> {
    let supplier = state
        .engine
        .update_supplier(
            id,
            engine::SupplierUpdate {
                type_id: payload.type_id,
                name: payload.name,
                contact_person: payload.contact_person,
                phone: payload.phone,
                email: payload.email,
                bank_name: payload.bank_name,
                account_number: payload.account_number,
                address: payload.address,
                remark: payload.remark,
            },
        )
        .await?;

    Ok(Json(ApiResponse::ok(view(supplier)).with_msg("updated")))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, ServerError> {
    state.engine.delete_supplier(id).await?;
    Ok(Json(ApiResponse::ok(()).with_msg("deleted")))
}
