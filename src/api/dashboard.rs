use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, Duration, Local, NaiveDate, Utc};
use serde::Serialize;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

use crate::error::{ApiError, ApiResult};
use crate::model::employee::EmployeeDetail;

#[derive(Debug, Serialize, ToSchema)]
pub struct Total {
    #[schema(example = 12)]
    pub total: i64,
}

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceToday {
    pub total: i64,
    pub present: i64,
    pub absent: i64,
    pub late: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AttendanceStats {
    pub today: AttendanceToday,
}

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaveStats {
    pub total: i64,
    pub pending: i64,
    pub approved: i64,
    pub on_leave_today: i64,
}

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct PayrollStats {
    pub total: i64,
    pub pending: i64,
    pub paid: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub employees: Total,
    pub departments: Total,
    pub attendance: AttendanceStats,
    pub leave: LeaveStats,
    pub payroll: PayrollStats,
    pub announcements: Total,
    /// Five most recently added employees
    pub recent_employees: Vec<EmployeeDetail>,
    #[schema(value_type = String, format = "date-time")]
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct DepartmentShare {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "Engineering")]
    pub name: String,
    #[schema(example = 12)]
    pub employee_count: i64,
}

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceTrend {
    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub date: NaiveDate,
    pub total: i64,
    pub present: i64,
    pub absent: i64,
    pub late: i64,
}

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct LeaveTrend {
    /// `YYYY-MM` of the leave start date
    #[schema(example = "2026-01")]
    pub month: String,
    pub total: i64,
    pub approved: i64,
    pub rejected: i64,
    pub pending: i64,
}

async fn count(pool: &MySqlPool, table: &str) -> Result<i64, sqlx::Error> {
    let sql = format!("SELECT COUNT(*) FROM {table}");
    sqlx::query_scalar::<_, i64>(&sql).fetch_one(pool).await
}

/// Headline numbers for the dashboard, gathered concurrently
#[utoipa::path(
    get,
    path = "/api/dashboard/stats",
    responses((status = 200, body = DashboardStats)),
    tag = "Dashboard"
)]
pub async fn dashboard_stats(pool: web::Data<MySqlPool>) -> ApiResult<impl Responder> {
    let pool = pool.get_ref();
    let today = Local::now().date_naive();

    let attendance_today = sqlx::query_as::<_, AttendanceToday>(
        r#"
        SELECT
            COUNT(*) AS total,
            COUNT(CASE WHEN status = 'Present' THEN 1 END) AS present,
            COUNT(CASE WHEN status = 'Absent' THEN 1 END) AS absent,
            COUNT(CASE WHEN status = 'Late' THEN 1 END) AS late
        FROM attendance
        WHERE date = ?
        "#,
    )
    .bind(today)
    .fetch_one(pool);

    let leave = sqlx::query_as::<_, LeaveStats>(
        r#"
        SELECT
            COUNT(*) AS total,
            COUNT(CASE WHEN status = 'Pending' THEN 1 END) AS pending,
            COUNT(CASE WHEN status = 'Approved' THEN 1 END) AS approved,
            COUNT(CASE WHEN status = 'Approved' AND ? BETWEEN start_date AND end_date THEN 1 END) AS on_leave_today
        FROM leave_requests
        "#,
    )
    .bind(today)
    .fetch_one(pool);

    let payroll = sqlx::query_as::<_, PayrollStats>(
        r#"
        SELECT
            COUNT(*) AS total,
            COUNT(CASE WHEN status = 'Pending' THEN 1 END) AS pending,
            COUNT(CASE WHEN status = 'Paid' THEN 1 END) AS paid
        FROM payroll
        "#,
    )
    .fetch_one(pool);

    let recent_employees = sqlx::query_as::<_, EmployeeDetail>(
        r#"
        SELECT e.*, d.name AS department_name
        FROM employees e
        LEFT JOIN departments d ON d.id = e.department_id
        ORDER BY e.created_at DESC, e.id DESC
        LIMIT 5
        "#,
    )
    .fetch_all(pool);

    let (employees, departments, attendance_today, leave, payroll, announcements, recent_employees) =
        futures::try_join!(
            count(pool, "employees"),
            count(pool, "departments"),
            attendance_today,
            leave,
            payroll,
            count(pool, "announcements"),
            recent_employees,
        )
        .map_err(|e| {
            error!(error = %e, "Failed to fetch dashboard statistics");
            ApiError::from(e)
        })?;

    Ok(HttpResponse::Ok().json(DashboardStats {
        employees: Total { total: employees },
        departments: Total { total: departments },
        attendance: AttendanceStats {
            today: attendance_today,
        },
        leave,
        payroll,
        announcements: Total {
            total: announcements,
        },
        recent_employees,
        last_updated: Utc::now(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/departments/distribution",
    responses((status = 200, description = "Employees per department, largest first", body = [DepartmentShare])),
    tag = "Dashboard"
)]
pub async fn department_distribution(pool: web::Data<MySqlPool>) -> ApiResult<impl Responder> {
    let rows = sqlx::query_as::<_, DepartmentShare>(
        r#"
        SELECT d.id, d.name, COUNT(e.id) AS employee_count
        FROM departments d
        LEFT JOIN employees e ON e.department_id = d.id
        GROUP BY d.id, d.name
        ORDER BY employee_count DESC, d.name
        "#,
    )
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(rows))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/attendance/trends",
    responses((status = 200, description = "Daily attendance over the last 7 days, newest first", body = [AttendanceTrend])),
    tag = "Dashboard"
)]
pub async fn attendance_trends(pool: web::Data<MySqlPool>) -> ApiResult<impl Responder> {
    let since = Local::now().date_naive() - Duration::days(7);

    let rows = sqlx::query_as::<_, AttendanceTrend>(
        r#"
        SELECT
            date,
            COUNT(*) AS total,
            COUNT(CASE WHEN status = 'Present' THEN 1 END) AS present,
            COUNT(CASE WHEN status = 'Absent' THEN 1 END) AS absent,
            COUNT(CASE WHEN status = 'Late' THEN 1 END) AS late
        FROM attendance
        WHERE date >= ?
        GROUP BY date
        ORDER BY date DESC
        "#,
    )
    .bind(since)
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(rows))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/leave/trends",
    responses((status = 200, description = "Leave requests per month over the last 6 months, newest first", body = [LeaveTrend])),
    tag = "Dashboard"
)]
pub async fn leave_trends(pool: web::Data<MySqlPool>) -> ApiResult<impl Responder> {
    let rows = sqlx::query_as::<_, LeaveTrend>(
        r#"
        SELECT
            CAST(DATE_FORMAT(start_date, '%Y-%m') AS CHAR) AS month,
            COUNT(*) AS total,
            COUNT(CASE WHEN status = 'Approved' THEN 1 END) AS approved,
            COUNT(CASE WHEN status = 'Rejected' THEN 1 END) AS rejected,
            COUNT(CASE WHEN status = 'Pending' THEN 1 END) AS pending
        FROM leave_requests
        WHERE start_date >= DATE_SUB(CURDATE(), INTERVAL 6 MONTH)
        GROUP BY month
        ORDER BY month DESC
        "#,
    )
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(rows))
}
