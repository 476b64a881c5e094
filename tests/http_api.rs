//! Router-level checks that are answered before any query runs.

mod common;

use actix_web::http::StatusCode;
use actix_web::http::header::ContentType;
use actix_web::{App, test, web};
use ems::api::health;
use ems::routes;
use serde_json::{Value, json};

macro_rules! app {
    () => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(common::lazy_pool()))
                .app_data(web::Data::new(common::test_config()))
                .service(health::index)
                .configure(|cfg| routes::configure(cfg, "/api", common::limiter()))
                .default_service(web::to(routes::not_found)),
        )
        .await
    };
}

fn peer() -> std::net::SocketAddr {
    "127.0.0.1:40000".parse().unwrap()
}

async fn error_of(resp: actix_web::dev::ServiceResponse) -> String {
    let body: Value = test::read_body_json(resp).await;
    body["error"].as_str().unwrap_or_default().to_string()
}

#[actix_web::test]
async fn health_reports_ok() {
    let app = app!();
    let req = test::TestRequest::get()
        .uri("/api/health")
        .peer_addr(peer())
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "OK");
    assert!(body["timestamp"].is_string());
}

#[actix_web::test]
async fn root_lists_endpoints_under_the_prefix() {
    let app = app!();
    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Employee Management System API");
    assert_eq!(body["endpoints"]["payroll"], "/api/payroll");
}

#[actix_web::test]
async fn unknown_route_is_json_404() {
    let app = app!();
    let req = test::TestRequest::get()
        .uri("/api/nothing-here")
        .peer_addr(peer())
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_of(resp).await, "Route not found");
}

#[actix_web::test]
async fn generate_rejects_month_out_of_range() {
    let app = app!();
    let req = test::TestRequest::post()
        .uri("/api/payroll/generate")
        .peer_addr(peer())
        .set_json(json!({ "month": 13, "year": 2025 }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_of(resp).await, "month must be between 1 and 12");
}

#[actix_web::test]
async fn malformed_json_is_bad_request() {
    let app = app!();
    let req = test::TestRequest::post()
        .uri("/api/payroll/generate")
        .peer_addr(peer())
        .insert_header(ContentType::json())
        .set_payload("{\"month\": 3,")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(error_of(resp).await.starts_with("Invalid JSON body"));
}

#[actix_web::test]
async fn non_numeric_id_is_bad_request() {
    let app = app!();
    let req = test::TestRequest::get()
        .uri("/api/payroll/abc")
        .peer_addr(peer())
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn preview_rejects_month_zero() {
    let app = app!();
    let req = test::TestRequest::get()
        .uri("/api/payroll/preview?employee_id=1&month=0&year=2025")
        .peer_addr(peer())
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn unknown_leave_status_is_rejected() {
    let app = app!();
    let req = test::TestRequest::patch()
        .uri("/api/leave/1/status")
        .peer_addr(peer())
        .set_json(json!({ "status": "Maybe" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn reversed_leave_range_is_rejected() {
    let app = app!();
    let req = test::TestRequest::post()
        .uri("/api/leave")
        .peer_addr(peer())
        .set_json(json!({
            "employee_id": 1,
            "leave_type": "Casual",
            "start_date": "2025-03-10",
            "end_date": "2025-03-08"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_of(resp).await, "start_date cannot be after end_date");
}

#[actix_web::test]
async fn negative_advance_is_rejected() {
    let app = app!();
    let req = test::TestRequest::post()
        .uri("/api/salary-advances")
        .peer_addr(peer())
        .set_json(json!({ "employee_id": 1, "amount": -5, "month": 3, "year": 2025 }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_of(resp).await, "amount must be greater than zero");
}

#[actix_web::test]
async fn schema_check_only_knows_own_tables() {
    let app = app!();
    let req = test::TestRequest::get()
        .uri("/api/admin/check-schema?table=users")
        .peer_addr(peer())
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn process_rejects_malformed_payment_date() {
    let app = app!();
    let req = test::TestRequest::patch()
        .uri("/api/payroll/1/process")
        .peer_addr(peer())
        .set_json(json!({ "payment_date": "not-a-date" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(error_of(resp).await.starts_with("Invalid JSON body"));
}

#[actix_web::test]
async fn process_and_revert_need_numeric_ids() {
    let app = app!();
    for uri in ["/api/payroll/first/process", "/api/payroll/-3/revert"] {
        let req = test::TestRequest::patch()
            .uri(uri)
            .peer_addr(peer())
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
    }
}

#[actix_web::test]
async fn leave_update_rejects_reversed_dates() {
    let app = app!();
    let req = test::TestRequest::put()
        .uri("/api/leave/1")
        .peer_addr(peer())
        .set_json(json!({ "start_date": "2025-03-10", "end_date": "2025-03-08" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_of(resp).await, "start_date cannot be after end_date");
}

#[actix_web::test]
async fn leave_update_rejects_days_off_the_range() {
    let app = app!();
    let req = test::TestRequest::put()
        .uri("/api/leave/1")
        .peer_addr(peer())
        .set_json(json!({ "start_date": "2025-03-08", "end_date": "2025-03-10", "days": 1 }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
