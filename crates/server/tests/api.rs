use std::{path::PathBuf, sync::Arc};

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use http_body_util::BodyExt;
use migration::MigratorTrait;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Engine;
use server::ServerState;

const BOUNDARY: &str = "greenyard-test-boundary";

async fn app() -> (Router, PathBuf) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    engine.new_user("admin", "secret-password").await.unwrap();

    let upload_dir = std::env::temp_dir().join(format!("greenyard-{}", uuid::Uuid::new_v4()));
    let state = ServerState {
        engine: Arc::new(engine),
        upload_dir: upload_dir.clone(),
    };
    (server::router(state, 1024 * 1024), upload_dir)
}

fn basic(user: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{user}:{password}")))
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, basic("admin", "secret-password"));
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, read_json(response).await)
}

fn multipart_body(filename: &str, content: &str, fields: &[(&str, &str)]) -> String {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
         Content-Type: application/octet-stream\r\n\r\n{content}\r\n--{BOUNDARY}--\r\n"
    ));
    body
}

async fn upload(app: &Router, body: String) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/upload")
        .header(header::AUTHORIZATION, basic("admin", "secret-password"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, read_json(response).await)
}

fn supplier_body(name: &str) -> Value {
    json!({
        "type_id": 1,
        "name": name,
        "contact_person": "Li Wei",
        "phone": "13800000000",
        "bank_name": "ICBC",
        "account_number": "6222020200112233445",
    })
}

#[tokio::test]
async fn requests_without_valid_credentials_are_rejected() {
    let (app, _) = app().await;

    let request = Request::builder()
        .uri("/api/v1/supplier")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(read_json(response).await["code"], -1);

    let request = Request::builder()
        .uri("/api/v1/supplier")
        .header(header::AUTHORIZATION, basic("admin", "wrong-password"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn supplier_lifecycle_uses_envelope() {
    let (app, _) = app().await;

    let (status, body) = call(&app, "POST", "/api/v1/supplier", Some(supplier_body("Green Co"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["account_number"], "6222020200112233445");
    let id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = call(&app, "GET", "/api/v1/supplier?name=Green&page=1&limit=5", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["name"], "Green Co");

    let (status, body) = call(
        &app,
        "PUT",
        &format!("/api/v1/supplier/{id}"),
        Some(json!({ "remark": "preferred" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["remark"], "preferred");

    let (status, _) = call(&app, "DELETE", &format!("/api/v1/supplier/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(&app, "GET", &format!("/api/v1/supplier/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], -1);
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn blank_required_field_is_a_bad_request() {
    let (app, _) = app().await;

    let mut body = supplier_body("Green Co");
    body["phone"] = json!("  ");
    let (status, body) = call(&app, "POST", "/api/v1/supplier", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], -1);
}

#[tokio::test]
async fn order_view_reports_balance() {
    let (app, _) = app().await;
    let (_, supplier) = call(&app, "POST", "/api/v1/supplier", Some(supplier_body("Green Co"))).await;
    let supplier_id = supplier["data"]["id"].clone();

    let (status, order) = call(
        &app,
        "POST",
        "/api/v1/order",
        Some(json!({
            "order_number": "PO-001",
            "material_name": "Topsoil",
            "supplier_id": supplier_id,
            "order_amount": "1000.00",
            "cutting_time": "2026-03-01",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let order_id = order["data"]["id"].clone();

    let (status, _) = call(
        &app,
        "POST",
        "/api/v1/pay",
        Some(json!({
            "pay_number": "PAY-001",
            "order_id": order_id,
            "payee_supplier_id": supplier_id,
            "current_payment_amount": 250.5,
            "payment_status": "partially_paid",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = call(&app, "GET", &format!("/api/v1/order/{order_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["supplier_name"], "Green Co");
    assert_eq!(data["cutting_time"], "2026-03-01");
    assert_eq!(data["payment_count"], 1);
    assert_eq!(data["payments"][0]["payee_name"], "Green Co");
    assert_eq!(data["order_balance"], "749.50");

    let (status, _) = call(
        &app,
        "POST",
        "/api/v1/order",
        Some(json!({
            "order_number": "PO-002",
            "material_name": "Gravel",
            "cutting_time": "01/03/2026",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(&app, "GET", "/api/v1/dashboard/overview", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["pending_amount"], "749.50");
}

#[tokio::test]
async fn updates_clear_dates_and_amounts() {
    let (app, _) = app().await;
    let (_, supplier) = call(&app, "POST", "/api/v1/supplier", Some(supplier_body("Green Co"))).await;
    let (_, order) = call(
        &app,
        "POST",
        "/api/v1/order",
        Some(json!({
            "order_number": "PO-001",
            "material_name": "Topsoil",
            "supplier_id": supplier["data"]["id"],
            "order_amount": "100.00",
            "cutting_time": "2026-01-05",
        })),
    )
    .await;
    let order_uri = format!("/api/v1/order/{}", order["data"]["id"]);

    let (status, body) = call(
        &app,
        "PUT",
        &order_uri,
        Some(json!({ "cutting_time": "", "order_amount": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["cutting_time"].is_null());
    assert!(body["data"]["order_amount"].is_null());
    assert_eq!(body["data"]["supplier_name"], "Green Co");

    let (_, body) = call(&app, "PUT", &order_uri, Some(json!({ "supplier_id": null }))).await;
    assert!(body["data"]["supplier_id"].is_null());
    assert_eq!(body["data"]["material_name"], "Topsoil");

    let (_, project) = call(
        &app,
        "POST",
        "/api/v1/project",
        Some(json!({
            "project_name": "Riverside park",
            "start_date": "2026-01-01",
            "project_amount": 5000,
        })),
    )
    .await;
    let project_uri = format!("/api/v1/project/{}", project["data"]["id"]);
    let (status, body) = call(&app, "PUT", &project_uri, Some(json!({ "start_date": "" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["start_date"].is_null());
    assert_eq!(body["data"]["project_amount"], "5000.00");
}

#[tokio::test]
async fn nursery_stock_moves_through_the_api() {
    let (app, _) = app().await;

    let (status, body) = call(
        &app,
        "POST",
        "/api/v1/nursery/inbound",
        Some(json!({
            "name": "Rose",
            "spec": "P15",
            "unit": "pot",
            "quantity": 100,
            "price": "10.00",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let plant_id = body["data"]["plant_id"].clone();

    let (status, body) = call(
        &app,
        "POST",
        "/api/v1/nursery/outbound",
        Some(json!({
            "destination": "Riverside park",
            "items": [{ "plant_id": plant_id, "quantity": "30", "price": "12.00" }],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["total_price"], "360.00");
    let order_no = body["data"]["order_no"].as_str().unwrap().to_string();

    let (status, body) = call(
        &app,
        "POST",
        "/api/v1/nursery/outbound",
        Some(json!({ "items": [{ "plant_id": plant_id, "quantity": 500 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], -1);

    let (_, body) = call(&app, "GET", "/api/v1/nursery/inventory?name=Rose", None).await;
    assert_eq!(body["data"][0]["quantity"], "70.00");

    let (status, body) = call(&app, "GET", "/api/v1/nursery/orders", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["order_no"], order_no.as_str());
    assert_eq!(body["data"][0]["item_count"], 1);

    let (status, body) = call(&app, "GET", "/api/v1/nursery/transactions?type=out", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["type"], "out");

    let (status, _) = call(
        &app,
        "DELETE",
        &format!("/api/v1/nursery/order/{order_no}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = call(&app, "GET", "/api/v1/nursery/inventory", None).await;
    assert_eq!(body["data"][0]["quantity"], "100.00");

    let (status, body) = call(&app, "GET", "/api/v1/nursery/dashboard/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_varieties"], 1);
    assert_eq!(body["data"]["top5"][0]["name"], "Rose");
}

#[tokio::test]
async fn dictionary_details_by_code_and_audit_user() {
    let (app, _) = app().await;

    let (status, body) = call(&app, "GET", "/api/v1/dictionary/code/fkzt/details", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);

    let (status, body) = call(
        &app,
        "POST",
        "/api/v1/dictionary",
        Some(json!({ "code": "unit", "name": "Units" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["create_user"], "admin");
    let dic_id = body["data"]["id"].clone();

    let (status, _) = call(
        &app,
        "POST",
        "/api/v1/dictionary/detail",
        Some(json!({ "dic_id": dic_id, "code": "pot", "value": "Pot" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = call(&app, "GET", &format!("/api/v1/dictionary/detail?dic_id={dic_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);

    let (status, _) = call(&app, "DELETE", &format!("/api/v1/dictionary/{dic_id}"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn upload_stores_file_and_records_attachment() {
    let (app, upload_dir) = app().await;
    let (_, project) = call(
        &app,
        "POST",
        "/api/v1/project",
        Some(json!({ "project_name": "Riverside park" })),
    )
    .await;
    let project_id = project["data"]["id"].to_string();

    let (status, body) = upload(
        &app,
        multipart_body(
            "site plan.pdf",
            "%PDF-1.4",
            &[("project_id", &project_id), ("attachment_code", "PLAN")],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let filename = body["data"]["filename"].as_str().unwrap().to_string();
    assert!(filename.starts_with("site_plan_"));
    assert!(filename.ends_with(".pdf"));
    assert_eq!(body["data"]["size"], 8);
    assert!(body["data"]["id"].is_i64());
    assert!(upload_dir.join(&filename).exists());

    let request = Request::builder()
        .uri(format!("/uploads/{filename}"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"%PDF-1.4");

    let (_, body) = call(
        &app,
        "GET",
        &format!("/api/v1/attachment/project/{project_id}"),
        None,
    )
    .await;
    assert_eq!(body["data"][0]["attachment_code"], "PLAN");

    let (status, body) = upload(&app, multipart_body("run.sh", "echo", &[])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], -1);

    let _ = std::fs::remove_dir_all(upload_dir);
}

#[tokio::test]
async fn failed_upload_keeps_earlier_file_with_same_name() {
    let (app, upload_dir) = app().await;
    let (_, project) = call(
        &app,
        "POST",
        "/api/v1/project",
        Some(json!({ "project_name": "Riverside park" })),
    )
    .await;
    let project_id = project["data"]["id"].to_string();

    let (status, body) = upload(
        &app,
        multipart_body(
            "plan.pdf",
            "first",
            &[("project_id", &project_id), ("attachment_code", "PLAN")],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let first = body["data"]["filename"].as_str().unwrap().to_string();

    let (status, _) = upload(
        &app,
        multipart_body(
            "plan.pdf",
            "second",
            &[("project_id", "9999"), ("attachment_code", "PLAN")],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    assert_eq!(std::fs::read(upload_dir.join(&first)).unwrap(), b"first");
    let stored = std::fs::read_dir(&upload_dir).unwrap().count();
    assert_eq!(stored, 1);

    let _ = std::fs::remove_dir_all(upload_dir);
}
