use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::{error, info};
use utoipa::{IntoParams, ToSchema};

use crate::error::{ApiError, ApiResult};
use crate::schema::{self, ColumnInfo, TABLES};

#[derive(Serialize, ToSchema)]
pub struct MigrationReport {
    #[schema(example = "Migrations completed")]
    pub message: String,
    pub details: Vec<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SchemaQuery {
    /// Defaults to payroll
    pub table: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct SchemaReport {
    #[schema(example = "Schema retrieved successfully")]
    pub message: String,
    #[schema(example = "payroll")]
    pub table: String,
    pub schema: Vec<ColumnInfo>,
}

/// Run the in-place schema migrations
#[utoipa::path(
    post,
    path = "/api/admin/migrate",
    responses(
        (status = 200, body = MigrationReport),
        (status = 500, description = "Migration failed")
    ),
    tag = "Admin"
)]
pub async fn migrate(pool: web::Data<MySqlPool>) -> ApiResult<impl Responder> {
    let details = schema::run_migrations(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Migration failed");
        ApiError::internal(format!("Migration failed: {e}"))
    })?;

    info!(steps = details.len(), "Migrations completed");
    Ok(HttpResponse::Ok().json(MigrationReport {
        message: "Migrations completed".to_string(),
        details,
    }))
}

#[utoipa::path(
    get,
    path = "/api/admin/check-schema",
    params(SchemaQuery),
    responses(
        (status = 200, body = SchemaReport),
        (status = 400, description = "Unknown table")
    ),
    tag = "Admin"
)]
pub async fn check_schema(
    pool: web::Data<MySqlPool>,
    query: web::Query<SchemaQuery>,
) -> ApiResult<impl Responder> {
    let table = query.table.as_deref().unwrap_or("payroll");
    if !TABLES.contains(&table) {
        return Err(ApiError::invalid(format!(
            "Unknown table '{table}'. Expected one of: {}",
            TABLES.join(", ")
        )));
    }

    let columns = schema::check_schema(pool.get_ref(), table).await?;

    Ok(HttpResponse::Ok().json(SchemaReport {
        message: "Schema retrieved successfully".to_string(),
        table: table.to_string(),
        schema: columns,
    }))
}
