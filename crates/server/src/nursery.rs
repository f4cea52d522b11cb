//! Nursery inventory API endpoints.

use api_types::{
    ApiResponse,
    nursery::{
        CategoryCountView, InboundRequest, InboundResponse, InventoryQuery, LedgerEntryView,
        LedgerKind, NurseryStatsView, OutboundOrderUpdate, OutboundOrderView, OutboundRequest,
        OutboundResponse, PlantView, TopPlantView, TransactionQuery,
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use engine::{
    InboundCmd, LedgerEntry, MoneyCents, OutboundCmd, OutboundItem, OutboundOrder, Plant,
    UpdateOutboundCmd, UpdateOutboundItem,
};

use crate::{ServerError, server::ServerState, views};

fn kind_view(kind: engine::LedgerKind) -> LedgerKind {
    match kind {
        engine::LedgerKind::In => LedgerKind::In,
        engine::LedgerKind::Out => LedgerKind::Out,
    }
}

fn plant_view(plant: Plant) -> PlantView {
    let low_stock = plant.is_low_stock();
    PlantView {
        id: plant.id,
        name: plant.name,
        category: plant.category,
        spec: plant.spec,
        unit: plant.unit,
        quantity: plant.quantity.to_string(),
        price: plant.price.to_string(),
        location: plant.location,
        remark: plant.remark,
        low_stock,
        create_at: views::timestamp(plant.create_at),
        update_at: views::timestamp(plant.update_at),
    }
}

fn entry_view(entry: LedgerEntry) -> LedgerEntryView {
    LedgerEntryView {
        id: entry.id,
        order_no: entry.order_no,
        kind: kind_view(entry.kind),
        plant_id: entry.plant_id,
        plant_name: entry.plant_name,
        spec: entry.spec,
        unit: entry.unit,
        quantity: entry.quantity.to_string(),
        price: entry.price.to_string(),
        total_price: entry.total_price.to_string(),
        operator: entry.operator,
        destination: entry.destination,
        location: entry.location,
        remark: entry.remark,
        create_at: views::timestamp(entry.create_at),
    }
}

fn order_view(order: OutboundOrder) -> OutboundOrderView {
    OutboundOrderView {
        order_no: order.order_no,
        total_price: order.total_price.to_string(),
        create_at: views::timestamp(order.create_at),
        operator: order.operator,
        destination: order.destination,
        item_count: order.item_count,
        items: order.items.into_iter().map(entry_view).collect(),
    }
}

pub async fn inventory(
    State(state): State<ServerState>,
    Query(query): Query<InventoryQuery>,
) -> Result<Json<ApiResponse<Vec<PlantView>>>, ServerError> {
    let page = state
        .engine
        .list_inventory(query.name.as_deref(), views::page(query.page, query.limit))
        .await?
        .map(plant_view);

    Ok(Json(ApiResponse::page(page.items, page.total)))
}

pub async fn transactions(
    State(state): State<ServerState>,
    Query(query): Query<TransactionQuery>,
) -> Result<Json<ApiResponse<Vec<LedgerEntryView>>>, ServerError> {
    let kind = query.kind.map(|kind| match kind {
        LedgerKind::In => engine::LedgerKind::In,
        LedgerKind::Out => engine::LedgerKind::Out,
    });
    let page = state
        .engine
        .list_transactions(kind, views::page(query.page, query.limit))
        .await?
        .map(entry_view);

    Ok(Json(ApiResponse::page(page.items, page.total)))
}

pub async fn orders(
    State(state): State<ServerState>,
) -> Result<Json<ApiResponse<Vec<OutboundOrderView>>>, ServerError> {
    let orders = state.engine.list_outbound_orders().await?;
    Ok(Json(ApiResponse::ok(
        orders.into_iter().map(order_view).collect(),
    )))
}

pub async fn inbound(
    State(state): State<ServerState>,
    Json(payload): Json<InboundRequest>,
) -> Result<(StatusCode, Json<ApiResponse<InboundResponse>>), ServerError> {
    let cmd = InboundCmd {
        name: payload.name,
        category: payload.category,
        spec: payload.spec,
        unit: payload.unit,
        quantity: views::quantity(&payload.quantity)?,
        price: views::optional_money(payload.price.as_ref())?.unwrap_or(MoneyCents::ZERO),
        location: payload.location,
        operator: payload.operator,
        remark: payload.remark,
    };
    let receipt = state.engine.inbound(cmd).await?;

    Ok((
        StatusCode::CREATED,
        Json(
            ApiResponse::ok(InboundResponse {
                order_no: receipt.order_no,
                plant_id: receipt.plant_id,
                transaction_id: receipt.transaction_id,
            })
            .with_msg("inbound recorded"),
        ),
    ))
}

pub async fn outbound(
    State(state): State<ServerState>,
    Json(payload): Json<OutboundRequest>,
) -> Result<(StatusCode, Json<ApiResponse<OutboundResponse>>), ServerError> {
    let items = payload
        .items
        .into_iter()
        .map(|item| {
            Ok(OutboundItem {
                plant_id: item.plant_id,
                name: item.name,
                spec: item.spec,
                unit: item.unit,
                quantity: views::quantity(&item.quantity)?,
                price: views::optional_money(item.price.as_ref())?.unwrap_or(MoneyCents::ZERO),
                is_non_inventory: item.is_non_inventory,
            })
        })
        .collect::<Result<Vec<_>, ServerError>>()?;
    let receipt = state
        .engine
        .outbound(OutboundCmd {
            items,
            destination: payload.destination,
            operator: payload.operator,
            remark: payload.remark,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(
            ApiResponse::ok(OutboundResponse {
                order_no: receipt.order_no,
                transaction_ids: receipt.transaction_ids,
                total_price: receipt.total_price.to_string(),
            })
            .with_msg("outbound recorded"),
        ),
    ))
}

pub async fn update_order(
    State(state): State<ServerState>,
    Path(order_no): Path<String>,
    Json(payload): Json<OutboundOrderUpdate>,
) -> Result<Json<ApiResponse<OutboundOrderView>>, ServerError> {
    let items = payload
        .items
        .into_iter()
        .map(|item| {
            Ok(UpdateOutboundItem {
                id: item.id,
                quantity: item.quantity.as_ref().map(views::quantity).transpose()?,
                price: views::optional_money(item.price.as_ref())?,
            })
        })
        .collect::<Result<Vec<_>, ServerError>>()?;
    let order = state
        .engine
        .update_outbound_order(
            &order_no,
            UpdateOutboundCmd {
                operator: payload.operator,
                destination: payload.destination,
                remark: payload.remark,
                items,
            },
        )
        .await?;

    Ok(Json(ApiResponse::ok(order_view(order)).with_msg("updated")))
}

pub async fn delete_order(
    State(state): State<ServerState>,
    Path(order_no): Path<String>,
) -> Result<Json<ApiResponse<()>>, ServerError> {
    state.engine.delete_outbound_order(&order_no).await?;
    Ok(Json(ApiResponse::ok(()).with_msg("deleted")))
}

pub async fn stats(
    State(state): State<ServerState>,
) -> Result<Json<ApiResponse<NurseryStatsView>>, ServerError> {
    let stats = state.engine.nursery_stats(Utc::now()).await?;

    Ok(Json(ApiResponse::ok(NurseryStatsView {
        total_varieties: stats.varieties_in_stock,
        month_outbound: stats.outbound_this_month,
        category_count: stats.categories_in_stock,
        low_stock: stats.low_stock,
        category_distribution: stats
            .category_distribution
            .into_iter()
            .map(|c| CategoryCountView {
                category: c.category,
                count: c.count,
            })
            .collect(),
        top5: stats
            .top_plants
            .into_iter()
            .map(|p| TopPlantView {
                name: p.name,
                quantity: p.quantity.to_string(),
            })
            .collect(),
        recent_activities: stats
            .recent_transactions
            .into_iter()
            .map(entry_view)
            .collect(),
    })))
}
