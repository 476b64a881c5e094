use crate::{
    api::{
        admin, announcement, attendance, dashboard, department, employee, health, leave_request,
        payroll, salary_advance,
    },
    error::ApiError,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{HttpRequest, HttpResponse, error, web};
use anyhow::Context;
use serde_json::json;
use std::sync::Arc;

pub type ApiLimiter = Governor<PeerIpKeyExtractor, NoOpMiddleware>;

/// Per-IP limiter shared by every worker.
pub fn build_limiter(requests_per_min: u32) -> anyhow::Result<Arc<ApiLimiter>> {
    let per_ms = if requests_per_min == 0 {
        1
    } else {
        (60_000 / requests_per_min as u64).max(1)
    };
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min.max(1))
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .context("invalid rate limiter settings")?;
    Ok(Arc::new(Governor::new(&cfg)))
}

fn json_error(err: error::JsonPayloadError, _req: &HttpRequest) -> error::Error {
    ApiError::invalid(format!("Invalid JSON body: {err}")).into()
}

fn query_error(err: error::QueryPayloadError, _req: &HttpRequest) -> error::Error {
    ApiError::invalid(format!("Invalid query string: {err}")).into()
}

fn path_error(err: error::PathError, _req: &HttpRequest) -> error::Error {
    ApiError::invalid(format!("Invalid path parameter: {err}")).into()
}

pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(json!({ "error": "Route not found" }))
}

pub fn configure(cfg: &mut web::ServiceConfig, api_prefix: &str, limiter: Arc<ApiLimiter>) {
    // Extractor failures answer with the same {"error": ...} body as handlers
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .app_data(web::PathConfig::default().error_handler(path_error));

    cfg.service(
        web::scope(api_prefix)
            .wrap(limiter)
            .service(web::resource("/health").route(web::get().to(health::health)))
            .service(
                web::scope("/employees")
                    .service(
                        web::resource("")
                            .route(web::get().to(employee::list_employees))
                            .route(web::post().to(employee::create_employee)),
                    )
                    .service(
                        web::resource("/stats/count").route(web::get().to(employee::employee_count)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(employee::get_employee))
                            .route(web::put().to(employee::update_employee))
                            .route(web::delete().to(employee::delete_employee)),
                    ),
            )
            .service(
                web::scope("/departments")
                    .service(
                        web::resource("")
                            .route(web::get().to(department::list_departments))
                            .route(web::post().to(department::create_department)),
                    )
                    .service(
                        web::resource("/stats/count")
                            .route(web::get().to(department::department_count)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(department::get_department))
                            .route(web::put().to(department::update_department))
                            .route(web::delete().to(department::delete_department)),
                    ),
            )
            .service(
                web::scope("/attendance")
                    .service(
                        web::resource("")
                            .route(web::get().to(attendance::list_attendance))
                            .route(web::post().to(attendance::mark_attendance)),
                    )
                    .service(web::resource("/today").route(web::get().to(attendance::today_attendance)))
                    .service(web::resource("/check-in").route(web::post().to(attendance::check_in)))
                    .service(web::resource("/check-out").route(web::post().to(attendance::check_out)))
                    .service(
                        web::resource("/stats/summary")
                            .route(web::get().to(attendance::attendance_summary)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(attendance::update_attendance))
                            .route(web::delete().to(attendance::delete_attendance)),
                    ),
            )
            .service(
                web::scope("/leave")
                    .service(
                        web::resource("")
                            .route(web::get().to(leave_request::leave_list))
                            .route(web::post().to(leave_request::create_leave)),
                    )
                    .service(
                        web::resource("/stats/summary")
                            .route(web::get().to(leave_request::leave_summary)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(leave_request::get_leave))
                            .route(web::put().to(leave_request::update_leave))
                            .route(web::delete().to(leave_request::delete_leave)),
                    )
                    .service(
                        web::resource("/{id}/status")
                            .route(web::patch().to(leave_request::update_leave_status)),
                    ),
            )
            .service(
                web::scope("/payroll")
                    .service(
                        web::resource("")
                            .route(web::get().to(payroll::list_payroll))
                            .route(web::post().to(payroll::create_payroll)),
                    )
                    .service(web::resource("/generate").route(web::post().to(payroll::generate_payroll)))
                    .service(web::resource("/preview").route(web::get().to(payroll::preview_payroll)))
                    .service(web::resource("/advance").route(web::post().to(payroll::pay_in_advance)))
                    .service(
                        web::resource("/stats/summary").route(web::get().to(payroll::payroll_summary)),
                    )
                    .service(web::resource("/{id}").route(web::get().to(payroll::get_payroll)))
                    .service(
                        web::resource("/{id}/process")
                            .route(web::patch().to(payroll::process_payroll)),
                    )
                    .service(
                        web::resource("/{id}/revert").route(web::patch().to(payroll::revert_payroll)),
                    ),
            )
            .service(
                web::scope("/salary-advances").service(
                    web::resource("")
                        .route(web::get().to(salary_advance::list_advances))
                        .route(web::post().to(salary_advance::create_advance)),
                ),
            )
            .service(
                web::scope("/announcements")
                    .service(
                        web::resource("")
                            .route(web::get().to(announcement::list_announcements))
                            .route(web::post().to(announcement::create_announcement)),
                    )
                    .service(
                        web::resource("/stats/count")
                            .route(web::get().to(announcement::announcement_count)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(announcement::get_announcement))
                            .route(web::put().to(announcement::update_announcement))
                            .route(web::delete().to(announcement::delete_announcement)),
                    ),
            )
            .service(
                web::scope("/dashboard")
                    .service(web::resource("/stats").route(web::get().to(dashboard::dashboard_stats)))
                    .service(
                        web::resource("/departments/distribution")
                            .route(web::get().to(dashboard::department_distribution)),
                    )
                    .service(
                        web::resource("/attendance/trends")
                            .route(web::get().to(dashboard::attendance_trends)),
                    )
                    .service(
                        web::resource("/leave/trends").route(web::get().to(dashboard::leave_trends)),
                    ),
            )
            .service(
                web::scope("/admin")
                    .service(web::resource("/migrate").route(web::post().to(admin::migrate)))
                    .service(
                        web::resource("/check-schema").route(web::get().to(admin::check_schema)),
                    ),
            ),
    );
}
