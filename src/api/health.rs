use actix_web::{HttpResponse, Responder, get, web};
use chrono::Utc;
use serde_json::json;

use crate::config::Config;

#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, body = Object, example = json!({
        "status": "OK",
        "message": "EMS Backend Server is running",
        "timestamp": "2026-01-05T09:00:00Z"
    }))),
    tag = "Health"
)]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "OK",
        "message": "EMS Backend Server is running",
        "timestamp": Utc::now()
    }))
}

/// Service name, version and where to find things.
#[get("/")]
pub async fn index(config: web::Data<Config>) -> impl Responder {
    let prefix = config.api_prefix.trim_end_matches('/');

    HttpResponse::Ok().json(json!({
        "message": "Employee Management System API",
        "version": env!("CARGO_PKG_VERSION"),
        "docs": "/swagger-ui/",
        "endpoints": {
            "health": format!("{prefix}/health"),
            "dashboard": format!("{prefix}/dashboard/stats"),
            "employees": format!("{prefix}/employees"),
            "departments": format!("{prefix}/departments"),
            "attendance": format!("{prefix}/attendance"),
            "leave": format!("{prefix}/leave"),
            "payroll": format!("{prefix}/payroll"),
            "salary_advances": format!("{prefix}/salary-advances"),
            "announcements": format!("{prefix}/announcements")
        }
    }))
}
