use crate::{
    api::CountResponse,
    error::{ApiError, ApiResult, conflict_as},
    model::employee::{Employee, EmployeeDetail, EmployeeOverview, STATUS_APPROVED},
    utils::db_utils::{Filters, Page, bind_values, build_update_sql, execute_update},
};
use actix_web::{HttpResponse, Responder, web};
use chrono::{Datelike, Local, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::MySqlPool;
use tracing::{debug, error, info};
use utoipa::{IntoParams, ToSchema};

const UPDATABLE_COLUMNS: &[&str] = &[
    "name",
    "email",
    "phone",
    "department_id",
    "position",
    "salary",
    "experience",
    "hire_date",
    "status",
];

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "Sumit Kumar")]
    pub name: String,
    #[schema(example = "sumit@example.com", format = "email")]
    pub email: String,
    #[schema(example = "1234567890")]
    pub phone: Option<String>,
    #[schema(example = 1)]
    pub department_id: Option<u64>,
    #[schema(example = "Developer")]
    pub position: Option<String>,
    #[schema(value_type = Option<f64>, example = 10000.0)]
    pub salary: Option<Decimal>,
    #[schema(example = "2 years")]
    pub experience: Option<String>,
    #[schema(example = "2023-01-15", format = "date", value_type = Option<String>)]
    pub hire_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct EmployeeQuery {
    /// Attendance day to report, defaults to today
    #[schema(example = "2025-03-14", format = "date", value_type = Option<String>)]
    pub date: Option<NaiveDate>,
    /// Payroll month to report, defaults to the current month
    #[schema(example = 3)]
    pub month: Option<i32>,
    #[schema(example = 2025)]
    pub year: Option<i32>,
    /// Search by name, email or position
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub data: Vec<EmployeeOverview>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 2)]
    pub total: i64,
}

async fn fetch_detail(pool: &MySqlPool, employee_id: u64) -> ApiResult<EmployeeDetail> {
    sqlx::query_as::<_, EmployeeDetail>(
        r#"
        SELECT e.*, d.name AS department_name
        FROM employees e
        LEFT JOIN departments d ON d.id = e.department_id
        WHERE e.id = ?
        "#,
    )
    .bind(employee_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| ApiError::not_found("Employee not found"))
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created", body = EmployeeDetail),
        (status = 400, description = "Missing name or email"),
        (status = 404, description = "Department does not exist"),
        (status = 409, description = "Email already exists", body = Object, example = json!({
            "error": "Email already exists"
        }))
    ),
    tag = "Employee"
)]
pub async fn create_employee(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateEmployee>,
) -> ApiResult<impl Responder> {
    if payload.name.trim().is_empty() || payload.email.trim().is_empty() {
        return Err(ApiError::invalid("name and email are required"));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO employees
        (name, email, phone, department_id, position, salary, experience, hire_date, status)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(payload.name.trim())
    .bind(payload.email.trim())
    .bind(&payload.phone)
    .bind(payload.department_id)
    .bind(&payload.position)
    .bind(payload.salary)
    .bind(&payload.experience)
    .bind(payload.hire_date)
    .bind(STATUS_APPROVED)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, email = %payload.email, "Failed to create employee");
        conflict_as("Email already exists")(e)
    })?;

    let employee = fetch_detail(pool.get_ref(), result.last_insert_id()).await?;
    info!(employee_id = employee.employee.id, "Employee created");

    Ok(HttpResponse::Created().json(employee))
}

// -------------------- Handler --------------------

#[utoipa::path(
    get,
    path = "/api/employees",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Employees with their attendance and payroll status", body = EmployeeListResponse)
    ),
    tag = "Employee"
)]
pub async fn list_employees(
    pool: web::Data<MySqlPool>,
    query: web::Query<EmployeeQuery>,
) -> ApiResult<impl Responder> {
    let page = Page::new(query.page, query.per_page);

    let today = Local::now().date_naive();
    let date = query.date.unwrap_or(today);
    let month = query.month.unwrap_or(today.month() as i32);
    let year = query.year.unwrap_or(today.year());

    // ---------- search ----------
    let mut filters = Filters::new();
    filters.search(&["e.name", "e.email", "e.position"], query.search.as_deref());
    let where_clause = filters.where_sql();

    let count_sql = format!("SELECT COUNT(*) FROM employees e{where_clause}");
    let total = bind_values!(sqlx::query_scalar::<_, i64>(&count_sql), &filters.values)
        .fetch_one(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, sql = %count_sql, "Failed to count employees");
            ApiError::from(e)
        })?;

    // ---------- data query ----------
    let data_sql = format!(
        r#"
        SELECT e.*, d.name AS department_name,
               COALESCE(a.status, 'Pending') AS attendance_status,
               COALESCE(p.status, 'Pending') AS payroll_status,
               COALESCE(p.deductions, 0) AS deductions,
               COALESCE(p.net_salary, e.salary) AS current_net_salary,
               (
                   SELECT COUNT(*) FROM leave_requests lr
                   WHERE lr.employee_id = e.id
                   AND lr.status = 'Approved'
                   AND CURDATE() BETWEEN lr.start_date AND lr.end_date
               ) AS active_leave_count
        FROM employees e
        LEFT JOIN departments d ON d.id = e.department_id
        LEFT JOIN attendance a ON a.employee_id = e.id AND a.date = ?
        LEFT JOIN payroll p ON p.employee_id = e.id AND p.month = ? AND p.year = ?
        {where_clause}
        ORDER BY e.id DESC
        LIMIT ? OFFSET ?
        "#
    );
    debug!(%date, month, year, page = page.page, per_page = page.per_page, "Fetching employees");

    let data_query = sqlx::query_as::<_, EmployeeOverview>(&data_sql)
        .bind(date)
        .bind(month)
        .bind(year);
    let employees = bind_values!(data_query, &filters.values)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch employees");
            ApiError::from(e)
        })?;

    Ok(HttpResponse::Ok().json(EmployeeListResponse {
        data: employees,
        page: page.page,
        per_page: page.per_page,
        total,
    }))
}

/// Update Employee
#[utoipa::path(
    put,
    path = "/api/employees/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    request_body(content = Object, description = "Any subset of the employee's editable fields"),
    responses(
        (status = 200, description = "Employee updated", body = EmployeeDetail),
        (status = 400, description = "Unknown field or invalid value"),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "error": "Employee not found"
        })),
        (status = 409, description = "Email already exists")
    ),
    tag = "Employee"
)]
pub async fn update_employee(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> ApiResult<impl Responder> {
    let employee_id = path.into_inner();

    let update = build_update_sql("employees", &body, "id", employee_id, UPDATABLE_COLUMNS)?;
    execute_update(pool.get_ref(), update)
        .await
        .map_err(conflict_as("Email already exists"))?;

    let employee = fetch_detail(pool.get_ref(), employee_id).await?;
    Ok(HttpResponse::Ok().json(employee))
}

/// Delete Employee
///
/// Attendance, leave, payroll and salary advances of the employee go with it.
#[utoipa::path(
    delete,
    path = "/api/employees/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted", body = Object, example = json!({
            "message": "Employee deleted successfully"
        })),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee"
)]
pub async fn delete_employee(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> ApiResult<impl Responder> {
    let employee_id = path.into_inner();

    let employee = sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = ?")
        .bind(employee_id)
        .fetch_optional(pool.get_ref())
        .await?
        .ok_or_else(|| ApiError::not_found("Employee not found"))?;

    sqlx::query("DELETE FROM employees WHERE id = ?")
        .bind(employee_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, employee_id, "Failed to delete employee");
            ApiError::from(e)
        })?;

    info!(employee_id, "Employee deleted");
    Ok(HttpResponse::Ok().json(json!({
        "message": "Employee deleted successfully",
        "employee": employee
    })))
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/api/employees/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee found", body = EmployeeDetail),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee"
)]
pub async fn get_employee(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> ApiResult<impl Responder> {
    let employee = fetch_detail(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(employee))
}

#[utoipa::path(
    get,
    path = "/api/employees/stats/count",
    responses((status = 200, body = CountResponse)),
    tag = "Employee"
)]
pub async fn employee_count(pool: web::Data<MySqlPool>) -> ApiResult<impl Responder> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM employees")
        .fetch_one(pool.get_ref())
        .await?;
    Ok(HttpResponse::Ok().json(CountResponse { count }))
}
