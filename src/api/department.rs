use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::{Value, json};
use sqlx::MySqlPool;
use tracing::{error, info};
use utoipa::ToSchema;

use crate::api::CountResponse;
use crate::error::{ApiError, ApiResult, conflict_as};
use crate::model::department::{Department, DepartmentWithCount};
use crate::utils::db_utils::{build_update_sql, execute_update};

const UPDATABLE_COLUMNS: &[&str] = &["name", "description"];
const DUPLICATE_NAME: &str = "Department name already exists";

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateDepartment {
    #[schema(example = "Engineering")]
    pub name: String,
    #[schema(example = "Software Development and IT")]
    pub description: Option<String>,
}

async fn fetch_department(pool: &MySqlPool, department_id: u64) -> ApiResult<Department> {
    sqlx::query_as::<_, Department>("SELECT * FROM departments WHERE id = ?")
        .bind(department_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Department not found"))
}

#[utoipa::path(
    get,
    path = "/api/departments",
    responses((status = 200, description = "Departments ordered by name", body = [DepartmentWithCount])),
    tag = "Department"
)]
pub async fn list_departments(pool: web::Data<MySqlPool>) -> ApiResult<impl Responder> {
    let departments = sqlx::query_as::<_, DepartmentWithCount>(
        r#"
        SELECT d.*, COUNT(e.id) AS employee_count
        FROM departments d
        LEFT JOIN employees e ON e.department_id = d.id
        GROUP BY d.id
        ORDER BY d.name
        "#,
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to fetch departments");
        ApiError::from(e)
    })?;

    Ok(HttpResponse::Ok().json(departments))
}

#[utoipa::path(
    get,
    path = "/api/departments/{department_id}",
    params(("department_id", Path, description = "Department ID")),
    responses(
        (status = 200, body = Department),
        (status = 404, description = "Department not found")
    ),
    tag = "Department"
)]
pub async fn get_department(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> ApiResult<impl Responder> {
    let department = fetch_department(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(department))
}

#[utoipa::path(
    post,
    path = "/api/departments",
    request_body = CreateDepartment,
    responses(
        (status = 201, body = Department),
        (status = 400, description = "Missing name"),
        (status = 409, description = "Department name already exists")
    ),
    tag = "Department"
)]
pub async fn create_department(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateDepartment>,
) -> ApiResult<impl Responder> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::invalid("name is required"));
    }

    let result = sqlx::query("INSERT INTO departments (name, description) VALUES (?, ?)")
        .bind(name)
        .bind(&payload.description)
        .execute(pool.get_ref())
        .await
        .map_err(conflict_as(DUPLICATE_NAME))?;

    let department = fetch_department(pool.get_ref(), result.last_insert_id()).await?;
    info!(department_id = department.id, name = %department.name, "Department created");

    Ok(HttpResponse::Created().json(department))
}

#[utoipa::path(
    put,
    path = "/api/departments/{department_id}",
    params(("department_id", Path, description = "Department ID")),
    request_body(content = Object, description = "name and/or description"),
    responses(
        (status = 200, body = Department),
        (status = 404, description = "Department not found"),
        (status = 409, description = "Department name already exists")
    ),
    tag = "Department"
)]
pub async fn update_department(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> ApiResult<impl Responder> {
    let department_id = path.into_inner();

    let update = build_update_sql("departments", &body, "id", department_id, UPDATABLE_COLUMNS)?;
    execute_update(pool.get_ref(), update)
        .await
        .map_err(conflict_as(DUPLICATE_NAME))?;

    let department = fetch_department(pool.get_ref(), department_id).await?;
    Ok(HttpResponse::Ok().json(department))
}

/// Employees of a deleted department keep working without one.
#[utoipa::path(
    delete,
    path = "/api/departments/{department_id}",
    params(("department_id", Path, description = "Department ID")),
    responses(
        (status = 200, body = Object, example = json!({ "message": "Department deleted successfully" })),
        (status = 404, description = "Department not found")
    ),
    tag = "Department"
)]
pub async fn delete_department(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> ApiResult<impl Responder> {
    let department_id = path.into_inner();

    let result = sqlx::query("DELETE FROM departments WHERE id = ?")
        .bind(department_id)
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Department not found"));
    }

    info!(department_id, "Department deleted");
    Ok(HttpResponse::Ok().json(json!({ "message": "Department deleted successfully" })))
}

#[utoipa::path(
    get,
    path = "/api/departments/stats/count",
    responses((status = 200, body = CountResponse)),
    tag = "Department"
)]
pub async fn department_count(pool: web::Data<MySqlPool>) -> ApiResult<impl Responder> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM departments")
        .fetch_one(pool.get_ref())
        .await?;
    Ok(HttpResponse::Ok().json(CountResponse { count }))
}
