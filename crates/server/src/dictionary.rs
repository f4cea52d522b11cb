//! Dictionary API endpoints.
//!
//! Writes record the authenticated user in the audit columns.

use api_types::{
    ApiResponse,
    dictionary::{
        DetailNew, DetailQuery, DetailUpdate, DetailView, DictionaryNew, DictionaryQuery,
        DictionaryUpdate, DictionaryView,
    },
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{Dictionary, DictionaryDetail, User};

use crate::{ServerError, server::ServerState, views};

fn view(dictionary: Dictionary) -> DictionaryView {
    DictionaryView {
        id: dictionary.id,
        code: dictionary.code,
        name: dictionary.name,
        valid_mark: dictionary.valid_mark,
        create_user: dictionary.create_user,
        create_time: dictionary.create_time.map(views::timestamp),
        update_user: dictionary.update_user,
        update_time: dictionary.update_time.map(views::timestamp),
    }
}

fn detail_view(detail: DictionaryDetail) -> DetailView {
    DetailView {
        id: detail.id,
        dic_id: detail.dic_id,
        code: detail.code,
        value: detail.value,
        order_no: detail.order_no,
        valid_mark: detail.valid_mark,
        create_user: detail.create_user,
        create_time: detail.create_time.map(views::timestamp),
        update_user: detail.update_user,
        update_time: detail.update_time.map(views::timestamp),
    }
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<DictionaryQuery>,
) -> Result<Json<ApiResponse<Vec<DictionaryView>>>, ServerError> {
    let page = state
        .engine
        .list_dictionaries(
            query.keyword.as_deref(),
            views::page(query.page, query.limit),
        )
        .await?
        .map(view);

    Ok(Json(ApiResponse::page(page.items, page.total)))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<DictionaryNew>,
) -> Result<(StatusCode, Json<ApiResponse<DictionaryView>>), ServerError> {
    let dictionary = state
        .engine
        .new_dictionary(
            engine::DictionaryNew {
                code: payload.code,
                name: payload.name,
            },
            &user.username,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(view(dictionary)).with_msg("created")),
    ))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<DictionaryUpdate>,
) -> Result<Json<ApiResponse<DictionaryView>>, ServerError> {
    let dictionary = state
        .engine
        .update_dictionary(
            id,
            engine::DictionaryUpdate {
                code: payload.code,
                name: payload.name,
                valid_mark: payload.valid_mark,
            },
            &user.username,
        )
        .await?;

    Ok(Json(ApiResponse::ok(view(dictionary)).with_msg("updated")))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, ServerError> {
    state.engine.delete_dictionary(id).await?;
    Ok(Json(ApiResponse::ok(()).with_msg("deleted")))
}

pub async fn details_by_code(
    State(state): State<ServerState>,
    Path(code): Path<String>,
) -> Result<Json<ApiResponse<Vec<DetailView>>>, ServerError> {
    let details = state.engine.dictionary_details_by_code(&code).await?;
    Ok(Json(ApiResponse::ok(
        details.into_iter().map(detail_view).collect(),
    )))
}

pub async fn list_details(
    State(state): State<ServerState>,
    Query(query): Query<DetailQuery>,
) -> Result<Json<ApiResponse<Vec<DetailView>>>, ServerError> {
    let page = state
        .engine
        .list_dictionary_details(query.dic_id, views::page(query.page, query.limit))
        .await?
        .map(detail_view);

    Ok(Json(ApiResponse::page(page.items, page.total)))
}

pub async fn create_detail(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<DetailNew>,
) -> Result<(StatusCode, Json<ApiResponse<DetailView>>), ServerError> {
    let detail = state
        .engine
        .new_dictionary_detail(
            engine::DictionaryDetailNew {
                dic_id: payload.dic_id,
                code: payload.code,
                value: payload.value,
                order_no: payload.order_no,
            },
            &user.username,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(detail_view(detail)).with_msg("created")),
    ))
}

pub async fn update_detail(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<DetailUpdate>,
) -> Result<Json<ApiResponse<DetailView>>, ServerError> {
    let detail = state
        .engine
        .update_dictionary_detail(
            id,
            engine::DictionaryDetailUpdate {
                code: payload.code,
                value: payload.value,
                order_no: payload.order_no,
                valid_mark: payload.valid_mark,
            },
            &user.username,
        )
        .await?;

    Ok(Json(
        ApiResponse::ok(detail_view(detail)).with_msg("updated"),
    ))
}

pub async fn delete_detail(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, ServerError> {
    state.engine.delete_dictionary_detail(id).await?;
    Ok(Json(ApiResponse::ok(()).with_msg("deleted")))
}
