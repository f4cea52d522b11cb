use axum::{
    Router,
    extract::{DefaultBodyLimit, Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use std::{path::PathBuf, sync::Arc};

use crate::{
    ServerError, dashboard, dictionary, nursery, order, pay, payer, project, supplier, upload,
};
use engine::{Engine, EngineError};

/// 50 MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Runtime knobs of the HTTP server.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    /// Directory uploaded files are written to and served from.
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 3000,
            upload_dir: PathBuf::from("uploads"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub upload_dir: PathBuf,
}

async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(TypedHeader(auth_header)) = auth_header else {
        return Err(EngineError::Unauthorized.into());
    };
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(EngineError::Unauthorized.into());
    }

    let user = state
        .engine
        .authenticate(auth_header.username(), auth_header.password())
        .await?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn api(state: ServerState) -> Router<ServerState> {
    Router::new()
        .route("/supplier", get(supplier::list).post(supplier::create))
        .route(
            "/supplier/{id}",
            get(supplier::get)
                .put(supplier::update)
                .delete(supplier::delete),
        )
        .route("/payer", get(payer::list).post(payer::create))
        .route(
            "/payer/{id}",
            get(payer::get).put(payer::update).delete(payer::delete),
        )
        .route("/project", get(project::list).post(project::create))
        .route(
            "/project/{id}",
            get(project::get)
                .put(project::update)
                .delete(project::delete),
        )
        .route("/attachment/project/{id}", get(project::attachments))
        .route(
            "/attachment/{id}",
            axum::routing::delete(project::delete_attachment),
        )
        .route("/upload", post(upload::upload))
        .route("/order", get(order::list).post(order::create))
        .route(
            "/order/{id}",
            get(order::get).put(order::update).delete(order::delete),
        )
        .route("/pay", get(pay::list).post(pay::create))
        .route(
            "/pay/{id}",
            get(pay::get).put(pay::update).delete(pay::delete),
        )
        .route(
            "/dictionary",
            get(dictionary::list).post(dictionary::create),
        )
        .route(
            "/dictionary/{id}",
            put(dictionary::update).delete(dictionary::delete),
        )
        .route(
            "/dictionary/code/{code}/details",
            get(dictionary::details_by_code),
        )
        .route(
            "/dictionary/detail",
            get(dictionary::list_details).post(dictionary::create_detail),
        )
        .route(
            "/dictionary/detail/{id}",
            put(dictionary::update_detail).delete(dictionary::delete_detail),
        )
        .route("/nursery/inventory", get(nursery::inventory))
        .route("/nursery/transactions", get(nursery::transactions))
        .route("/nursery/orders", get(nursery::orders))
        .route("/nursery/inbound", post(nursery::inbound))
        .route("/nursery/outbound", post(nursery::outbound))
        .route("/nursery/dashboard/stats", get(nursery::stats))
        .route(
            "/nursery/order/{order_no}",
            put(nursery::update_order).delete(nursery::delete_order),
        )
        .route("/dashboard/overview", get(dashboard::overview))
        .route("/dashboard/payment-status", get(dashboard::payment_status))
        .route("/dashboard/monthly-trend", get(dashboard::monthly_trend))
        .route("/dashboard/top-suppliers", get(dashboard::top_suppliers))
        .route_layer(middleware::from_fn_with_state(state, auth))
}

/// Build the application: `/api/v1` behind Basic auth, `/uploads` served
/// from disk.
pub fn router(state: ServerState, max_upload_bytes: usize) -> Router {
    let uploads = ServeDir::new(&state.upload_dir);
    Router::new()
        .nest("/api/v1", api(state.clone()))
        .nest_service("/uploads", uploads)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(engine: Engine, config: ServerConfig) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind((config.bind.as_str(), config.port)).await?;
    run_with_listener(engine, config, listener).await
}

pub async fn run_with_listener(
    engine: Engine,
    config: ServerConfig,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    tokio::fs::create_dir_all(&config.upload_dir).await?;
    let state = ServerState {
        engine: Arc::new(engine),
        upload_dir: config.upload_dir,
    };

    axum::serve(listener, router(state, config.max_upload_bytes)).await
}
