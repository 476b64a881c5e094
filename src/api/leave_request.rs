use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::MySqlPool;
use tracing::{debug, error};
use utoipa::{IntoParams, ToSchema};

use crate::error::{ApiError, ApiResult};
use crate::model::leave_request::{LeaveDetail, LeaveRequest, LeaveStatus, LeaveType};
use crate::service::leave::{self, NewLeave};
use crate::utils::db_utils::{
    Filters, Page, bind_values, build_update_sql, check_enum_field, execute_update,
};

const UPDATABLE_COLUMNS: &[&str] = &["leave_type", "start_date", "end_date", "days", "reason", "status"];

#[derive(Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct LeaveFilter {
    /// Filter by leave status
    #[schema(example = "Pending")]
    pub status: Option<LeaveStatus>,
    /// Filter by employee ID
    #[schema(example = 1)]
    pub employee_id: Option<u64>,
    /// Search by employee name
    pub search: Option<String>,
    #[schema(example = 1)]
    pub page: Option<u32>,
    #[schema(example = 20)]
    pub per_page: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub data: Vec<LeaveDetail>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateLeaveStatus {
    #[schema(example = "Rejected")]
    pub status: LeaveStatus,
}

#[derive(Serialize, sqlx::FromRow, ToSchema)]
pub struct LeaveSummary {
    #[schema(example = 10)]
    pub total: i64,
    #[schema(example = 2)]
    pub pending: i64,
    #[schema(example = 7)]
    pub approved: i64,
    #[schema(example = 1)]
    pub rejected: i64,
    #[schema(example = 1)]
    pub on_leave_today: i64,
}

async fn fetch_leave(pool: &MySqlPool, leave_id: u64) -> ApiResult<LeaveRequest> {
    sqlx::query_as::<_, LeaveRequest>("SELECT * FROM leave_requests WHERE id = ?")
        .bind(leave_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Leave request not found"))
}

/* =========================
List leave requests
========================= */
#[utoipa::path(
    get,
    path = "/api/leave",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Paginated leave requests, newest first", body = LeaveListResponse)
    ),
    tag = "Leave"
)]
pub async fn leave_list(
    pool: web::Data<MySqlPool>,
    query: web::Query<LeaveFilter>,
) -> ApiResult<impl Responder> {
    let page = Page::new(query.page, query.per_page);

    let mut filters = Filters::new();
    filters
        .eq("lr.status = ?", query.status.map(|s| s.to_string()))
        .eq("lr.employee_id = ?", query.employee_id)
        .search(&["e.name"], query.search.as_deref());
    let where_clause = filters.where_sql();

    let count_sql = format!(
        "SELECT COUNT(*) FROM leave_requests lr JOIN employees e ON e.id = lr.employee_id{where_clause}"
    );
    let total = bind_values!(sqlx::query_scalar::<_, i64>(&count_sql), &filters.values)
        .fetch_one(pool.get_ref())
        .await?;

    let data_sql = format!(
        r#"
        SELECT lr.*, e.name AS employee_name, e.email, e.department_id
        FROM leave_requests lr
        JOIN employees e ON e.id = lr.employee_id
        {where_clause}
        ORDER BY lr.created_at DESC, lr.id DESC
        LIMIT ? OFFSET ?
        "#
    );
    debug!(sql = %data_sql, page = page.page, "Fetching leave requests");

    let data = bind_values!(sqlx::query_as::<_, LeaveDetail>(&data_sql), &filters.values)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch leave requests");
            ApiError::from(e)
        })?;

    Ok(HttpResponse::Ok().json(LeaveListResponse {
        data,
        page: page.page,
        per_page: page.per_page,
        total,
    }))
}

#[utoipa::path(
    get,
    path = "/api/leave/{leave_id}",
    params(("leave_id", Path, description = "Leave request ID")),
    responses(
        (status = 200, body = LeaveDetail),
        (status = 404, description = "Leave request not found")
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> ApiResult<impl Responder> {
    let leave = sqlx::query_as::<_, LeaveDetail>(
        r#"
        SELECT lr.*, e.name AS employee_name, e.email, e.department_id
        FROM leave_requests lr
        JOIN employees e ON e.id = lr.employee_id
        WHERE lr.id = ?
        "#,
    )
    .bind(path.into_inner())
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(|| ApiError::not_found("Leave request not found"))?;

    Ok(HttpResponse::Ok().json(leave))
}

/* =========================
Create leave (admin side)
========================= */
/// Records an approved leave, consuming the employee's balance for Casual
/// and Sick leave and marking each day as `Leave` in attendance.
#[utoipa::path(
    post,
    path = "/api/leave",
    request_body(
        content = NewLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Leave recorded", body = LeaveRequest),
        (status = 400, description = "Invalid dates or insufficient balance", body = Object, example = json!({
            "error": "Insufficient casual leave balance. Available: 2"
        })),
        (status = 404, description = "Employee not found")
    ),
    tag = "Leave"
)]
pub async fn create_leave(
    pool: web::Data<MySqlPool>,
    payload: web::Json<NewLeave>,
) -> ApiResult<impl Responder> {
    let leave = leave::create_leave(pool.get_ref(), &payload)
        .await
        .inspect_err(|e| {
            error!(error = %e, employee_id = payload.employee_id, "Failed to create leave");
        })?;

    Ok(HttpResponse::Created().json(leave))
}

/// Change the status only. Balances are left untouched.
#[utoipa::path(
    patch,
    path = "/api/leave/{leave_id}/status",
    params(("leave_id", Path, description = "Leave request ID")),
    request_body = UpdateLeaveStatus,
    responses(
        (status = 200, body = LeaveRequest),
        (status = 400, description = "Invalid status"),
        (status = 404, description = "Leave request not found")
    ),
    tag = "Leave"
)]
pub async fn update_leave_status(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<UpdateLeaveStatus>,
) -> ApiResult<impl Responder> {
    let leave_id = path.into_inner();

    sqlx::query("UPDATE leave_requests SET status = ? WHERE id = ?")
        .bind(payload.status.as_ref())
        .bind(leave_id)
        .execute(pool.get_ref())
        .await?;

    let leave = fetch_leave(pool.get_ref(), leave_id).await?;
    Ok(HttpResponse::Ok().json(leave))
}

#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}",
    params(("leave_id", Path, description = "Leave request ID")),
    request_body(content = Object, description = "Any of leave_type, start_date, end_date, days, reason, status"),
    responses(
        (status = 200, body = LeaveRequest),
        (status = 400, description = "Unknown field, invalid value or inconsistent dates"),
        (status = 404, description = "Leave request not found")
    ),
    tag = "Leave"
)]
pub async fn update_leave(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> ApiResult<impl Responder> {
    let leave_id = path.into_inner();
    let mut body = body.into_inner();

    check_enum_field::<LeaveType>(&body, "leave_type")?;
    check_enum_field::<LeaveStatus>(&body, "status")?;
    leave::reconcile_dates(&mut body)?;

    let update = build_update_sql("leave_requests", &body, "id", leave_id, UPDATABLE_COLUMNS)?;
    execute_update(pool.get_ref(), update).await?;

    let leave = fetch_leave(pool.get_ref(), leave_id).await?;
    Ok(HttpResponse::Ok().json(leave))
}

#[utoipa::path(
    delete,
    path = "/api/leave/{leave_id}",
    params(("leave_id", Path, description = "Leave request ID")),
    responses(
        (status = 200, description = "Leave request deleted", body = Object, example = json!({
            "message": "Leave request deleted successfully"
        })),
        (status = 404, description = "Leave request not found")
    ),
    tag = "Leave"
)]
pub async fn delete_leave(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> ApiResult<impl Responder> {
    let result = sqlx::query("DELETE FROM leave_requests WHERE id = ?")
        .bind(path.into_inner())
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Leave request not found"));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Leave request deleted successfully" })))
}

#[utoipa::path(
    get,
    path = "/api/leave/stats/summary",
    responses((status = 200, body = LeaveSummary)),
    tag = "Leave"
)]
pub async fn leave_summary(pool: web::Data<MySqlPool>) -> ApiResult<impl Responder> {
    let summary = sqlx::query_as::<_, LeaveSummary>(
        r#"
        SELECT
            COUNT(*) AS total,
            COUNT(CASE WHEN status = 'Pending' THEN 1 END) AS pending,
            COUNT(CASE WHEN status = 'Approved' THEN 1 END) AS approved,
            COUNT(CASE WHEN status = 'Rejected' THEN 1 END) AS rejected,
            COUNT(CASE WHEN status = 'Approved' AND CURDATE() BETWEEN start_date AND end_date THEN 1 END) AS on_leave_today
        FROM leave_requests
        "#,
    )
    .fetch_one(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(summary))
}
