use actix_web::{HttpResponse, Responder, web};
use chrono::{Local, NaiveDate, NaiveTime, Timelike};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::MySqlPool;
use tracing::{error, info};
use utoipa::{IntoParams, ToSchema};

use crate::error::{ApiError, ApiResult, conflict_as};
use crate::model::attendance::{Attendance, AttendanceDetail, AttendanceStatus, worked_hours};
use crate::utils::db_utils::{
    Filters, Page, bind_values, build_update_sql, check_enum_field, execute_update,
};

const UPDATABLE_COLUMNS: &[&str] = &["check_in", "check_out", "status", "hours"];

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct AttendanceQuery {
    #[schema(example = "2026-01-05", format = "date", value_type = Option<String>)]
    pub date: Option<NaiveDate>,
    #[schema(example = 1)]
    pub employee_id: Option<u64>,
    /// Search by employee name
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceListResponse {
    pub data: Vec<AttendanceDetail>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MarkAttendance {
    #[schema(example = 1)]
    pub employee_id: u64,
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "09:00:00", value_type = Option<String>, format = "time")]
    pub check_in: Option<NaiveTime>,
    #[schema(example = "17:30:00", value_type = Option<String>, format = "time")]
    pub check_out: Option<NaiveTime>,
    /// Defaults to Present
    #[schema(example = "Present")]
    pub status: Option<AttendanceStatus>,
    /// Derived from check-in and check-out when omitted
    #[schema(value_type = Option<f64>, example = 8.5)]
    pub hours: Option<Decimal>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EmployeeRef {
    #[schema(example = 1)]
    pub employee_id: u64,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SummaryQuery {
    /// Defaults to today
    pub date: Option<NaiveDate>,
}

#[derive(Serialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceSummary {
    #[schema(example = 10)]
    pub total: i64,
    #[schema(example = 7)]
    pub present: i64,
    #[schema(example = 1)]
    pub absent: i64,
    #[schema(example = 1)]
    pub late: i64,
    #[schema(example = 1)]
    pub half_day: i64,
}

fn now_time() -> NaiveTime {
    let now = Local::now().time();
    now.with_nanosecond(0).unwrap_or(now)
}

async fn fetch_by_id(pool: &MySqlPool, attendance_id: u64) -> ApiResult<Attendance> {
    sqlx::query_as::<_, Attendance>("SELECT * FROM attendance WHERE id = ?")
        .bind(attendance_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Attendance record not found"))
}

async fn fetch_for_day(
    pool: &MySqlPool,
    employee_id: u64,
    date: NaiveDate,
) -> ApiResult<Option<Attendance>> {
    let record = sqlx::query_as::<_, Attendance>(
        "SELECT * FROM attendance WHERE employee_id = ? AND date = ?",
    )
    .bind(employee_id)
    .bind(date)
    .fetch_optional(pool)
    .await?;
    Ok(record)
}

#[utoipa::path(
    get,
    path = "/api/attendance",
    params(AttendanceQuery),
    responses((status = 200, body = AttendanceListResponse)),
    tag = "Attendance"
)]
pub async fn list_attendance(
    pool: web::Data<MySqlPool>,
    query: web::Query<AttendanceQuery>,
) -> ApiResult<impl Responder> {
    let page = Page::new(query.page, query.per_page);

    let mut filters = Filters::new();
    filters
        .eq("a.date = ?", query.date)
        .eq("a.employee_id = ?", query.employee_id)
        .search(&["e.name"], query.search.as_deref());
    let where_clause = filters.where_sql();

    let count_sql =
        format!("SELECT COUNT(*) FROM attendance a JOIN employees e ON e.id = a.employee_id{where_clause}");
    let total = bind_values!(sqlx::query_scalar::<_, i64>(&count_sql), &filters.values)
        .fetch_one(pool.get_ref())
        .await?;

    let data_sql = format!(
        r#"
        SELECT a.*, e.name AS employee_name, e.email
        FROM attendance a
        JOIN employees e ON e.id = a.employee_id
        {where_clause}
        ORDER BY a.date DESC, a.id DESC
        LIMIT ? OFFSET ?
        "#
    );
    let data = bind_values!(sqlx::query_as::<_, AttendanceDetail>(&data_sql), &filters.values)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch attendance");
            ApiError::from(e)
        })?;

    Ok(HttpResponse::Ok().json(AttendanceListResponse {
        data,
        page: page.page,
        per_page: page.per_page,
        total,
    }))
}

#[utoipa::path(
    get,
    path = "/api/attendance/today",
    responses((status = 200, body = [AttendanceDetail])),
    tag = "Attendance"
)]
pub async fn today_attendance(pool: web::Data<MySqlPool>) -> ApiResult<impl Responder> {
    let rows = sqlx::query_as::<_, AttendanceDetail>(
        r#"
        SELECT a.*, e.name AS employee_name, e.email
        FROM attendance a
        JOIN employees e ON e.id = a.employee_id
        WHERE a.date = ?
        ORDER BY a.id DESC
        "#,
    )
    .bind(Local::now().date_naive())
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(rows))
}

/// Mark attendance for a day, replacing any existing record for that day
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = MarkAttendance,
    responses(
        (status = 201, body = Attendance),
        (status = 404, description = "Employee not found")
    ),
    tag = "Attendance"
)]
pub async fn mark_attendance(
    pool: web::Data<MySqlPool>,
    payload: web::Json<MarkAttendance>,
) -> ApiResult<impl Responder> {
    let status = payload.status.unwrap_or(AttendanceStatus::Present);
    let hours = payload.hours.or(match (payload.check_in, payload.check_out) {
        (Some(check_in), Some(check_out)) => worked_hours(check_in, check_out),
        _ => None,
    });

    sqlx::query(
        r#"
        INSERT INTO attendance (employee_id, date, check_in, check_out, status, hours)
        VALUES (?, ?, ?, ?, ?, ?)
        ON DUPLICATE KEY UPDATE
            check_in = VALUES(check_in),
            check_out = VALUES(check_out),
            status = VALUES(status),
            hours = VALUES(hours)
        "#,
    )
    .bind(payload.employee_id)
    .bind(payload.date)
    .bind(payload.check_in)
    .bind(payload.check_out)
    .bind(status.as_ref())
    .bind(hours)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id = payload.employee_id, "Failed to mark attendance");
        ApiError::from(e)
    })?;

    let record = fetch_for_day(pool.get_ref(), payload.employee_id, payload.date)
        .await?
        .ok_or_else(|| ApiError::internal("Attendance row missing after upsert"))?;

    Ok(HttpResponse::Created().json(record))
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/check-in",
    request_body = EmployeeRef,
    responses(
        (status = 201, description = "Checked in", body = Attendance),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Already checked in today", body = Object, example = json!({
            "error": "Already checked in today"
        }))
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    pool: web::Data<MySqlPool>,
    payload: web::Json<EmployeeRef>,
) -> ApiResult<impl Responder> {
    let employee_id = payload.employee_id;
    let today = Local::now().date_naive();

    sqlx::query("INSERT INTO attendance (employee_id, date, check_in, status) VALUES (?, ?, ?, ?)")
        .bind(employee_id)
        .bind(today)
        .bind(now_time())
        .bind(AttendanceStatus::Present.as_ref())
        .execute(pool.get_ref())
        .await
        .map_err(conflict_as("Already checked in today"))?;

    let record = fetch_for_day(pool.get_ref(), employee_id, today)
        .await?
        .ok_or_else(|| ApiError::internal("Attendance row missing after check-in"))?;

    info!(employee_id, "Checked in");
    Ok(HttpResponse::Created().json(record))
}

/// Check-out endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/check-out",
    request_body = EmployeeRef,
    responses(
        (status = 200, description = "Checked out", body = Attendance),
        (status = 400, description = "No check-in found for today")
    ),
    tag = "Attendance"
)]
pub async fn check_out(
    pool: web::Data<MySqlPool>,
    payload: web::Json<EmployeeRef>,
) -> ApiResult<impl Responder> {
    let employee_id = payload.employee_id;
    let today = Local::now().date_naive();

    let record = fetch_for_day(pool.get_ref(), employee_id, today).await?;
    let (attendance_id, checked_in_at) = match record {
        Some(Attendance { check_out: Some(_), .. }) => {
            return Err(ApiError::invalid("Already checked out today"));
        }
        Some(Attendance { id, check_in: Some(check_in), .. }) => (id, check_in),
        _ => return Err(ApiError::invalid("No check-in found for today")),
    };

    let checked_out_at = now_time();
    sqlx::query("UPDATE attendance SET check_out = ?, hours = ? WHERE id = ?")
        .bind(checked_out_at)
        .bind(worked_hours(checked_in_at, checked_out_at))
        .bind(attendance_id)
        .execute(pool.get_ref())
        .await?;

    info!(employee_id, "Checked out");
    let record = fetch_by_id(pool.get_ref(), attendance_id).await?;
    Ok(HttpResponse::Ok().json(record))
}

#[utoipa::path(
    put,
    path = "/api/attendance/{attendance_id}",
    params(("attendance_id", Path, description = "Attendance ID")),
    request_body(content = Object, description = "Any of check_in, check_out, status, hours"),
    responses(
        (status = 200, body = Attendance),
        (status = 400, description = "Unknown field or invalid status"),
        (status = 404, description = "Attendance record not found")
    ),
    tag = "Attendance"
)]
pub async fn update_attendance(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> ApiResult<impl Responder> {
    let attendance_id = path.into_inner();

    check_enum_field::<AttendanceStatus>(&body, "status")?;
    let update = build_update_sql("attendance", &body, "id", attendance_id, UPDATABLE_COLUMNS)?;
    execute_update(pool.get_ref(), update).await?;

    let record = fetch_by_id(pool.get_ref(), attendance_id).await?;
    Ok(HttpResponse::Ok().json(record))
}

#[utoipa::path(
    delete,
    path = "/api/attendance/{attendance_id}",
    params(("attendance_id", Path, description = "Attendance ID")),
    responses(
        (status = 200, body = Object, example = json!({ "message": "Attendance deleted successfully" })),
        (status = 404, description = "Attendance record not found")
    ),
    tag = "Attendance"
)]
pub async fn delete_attendance(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> ApiResult<impl Responder> {
    let result = sqlx::query("DELETE FROM attendance WHERE id = ?")
        .bind(path.into_inner())
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Attendance record not found"));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Attendance deleted successfully" })))
}

#[utoipa::path(
    get,
    path = "/api/attendance/stats/summary",
    params(SummaryQuery),
    responses((status = 200, body = AttendanceSummary)),
    tag = "Attendance"
)]
pub async fn attendance_summary(
    pool: web::Data<MySqlPool>,
    query: web::Query<SummaryQuery>,
) -> ApiResult<impl Responder> {
    let date = query.date.unwrap_or_else(|| Local::now().date_naive());

    let summary = sqlx::query_as::<_, AttendanceSummary>(
        r#"
        SELECT
            COUNT(*) AS total,
            COUNT(CASE WHEN status = 'Present' THEN 1 END) AS present,
            COUNT(CASE WHEN status = 'Absent' THEN 1 END) AS absent,
            COUNT(CASE WHEN status = 'Late' THEN 1 END) AS late,
            COUNT(CASE WHEN status = 'Half Day' THEN 1 END) AS half_day
        FROM attendance
        WHERE date = ?
        "#,
    )
    .bind(date)
    .fetch_one(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(summary))
}
