use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::{Value, json};
use sqlx::MySqlPool;
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::api::CountResponse;
use crate::error::{ApiError, ApiResult};
use crate::model::announcement::Announcement;
use crate::utils::db_utils::{Filters, bind_values, build_update_sql, execute_update};

const UPDATABLE_COLUMNS: &[&str] = &["title", "content", "priority"];

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AnnouncementQuery {
    /// e.g. High, Normal, Low
    pub priority: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAnnouncement {
    #[schema(example = "Office closed on Friday")]
    pub title: String,
    #[schema(example = "The office will be closed for maintenance.")]
    pub content: String,
    /// Defaults to Normal
    #[schema(example = "High")]
    pub priority: Option<String>,
    /// Defaults to Admin
    #[schema(example = "HR")]
    pub created_by: Option<String>,
}

async fn fetch_announcement(pool: &MySqlPool, announcement_id: u64) -> ApiResult<Announcement> {
    sqlx::query_as::<_, Announcement>("SELECT * FROM announcements WHERE id = ?")
        .bind(announcement_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Announcement not found"))
}

#[utoipa::path(
    get,
    path = "/api/announcements",
    params(AnnouncementQuery),
    responses((status = 200, description = "Announcements, newest first", body = [Announcement])),
    tag = "Announcement"
)]
pub async fn list_announcements(
    pool: web::Data<MySqlPool>,
    query: web::Query<AnnouncementQuery>,
) -> ApiResult<impl Responder> {
    let mut filters = Filters::new();
    filters.eq("priority = ?", query.priority.clone());

    let sql = format!(
        "SELECT * FROM announcements{} ORDER BY created_at DESC, id DESC",
        filters.where_sql()
    );
    let announcements = bind_values!(sqlx::query_as::<_, Announcement>(&sql), &filters.values)
        .fetch_all(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(announcements))
}

#[utoipa::path(
    get,
    path = "/api/announcements/{announcement_id}",
    params(("announcement_id", Path, description = "Announcement ID")),
    responses(
        (status = 200, body = Announcement),
        (status = 404, description = "Announcement not found")
    ),
    tag = "Announcement"
)]
pub async fn get_announcement(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> ApiResult<impl Responder> {
    let announcement = fetch_announcement(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(announcement))
}

#[utoipa::path(
    post,
    path = "/api/announcements",
    request_body = CreateAnnouncement,
    responses(
        (status = 201, body = Announcement),
        (status = 400, description = "Missing title or content")
    ),
    tag = "Announcement"
)]
pub async fn create_announcement(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateAnnouncement>,
) -> ApiResult<impl Responder> {
    if payload.title.trim().is_empty() || payload.content.trim().is_empty() {
        return Err(ApiError::invalid("title and content are required"));
    }

    let result = sqlx::query(
        "INSERT INTO announcements (title, content, priority, created_by) VALUES (?, ?, ?, ?)",
    )
    .bind(&payload.title)
    .bind(&payload.content)
    .bind(payload.priority.as_deref().unwrap_or("Normal"))
    .bind(payload.created_by.as_deref().unwrap_or("Admin"))
    .execute(pool.get_ref())
    .await?;

    let announcement = fetch_announcement(pool.get_ref(), result.last_insert_id()).await?;
    info!(announcement_id = announcement.id, "Announcement published");

    Ok(HttpResponse::Created().json(announcement))
}

#[utoipa::path(
    put,
    path = "/api/announcements/{announcement_id}",
    params(("announcement_id", Path, description = "Announcement ID")),
    request_body(content = Object, description = "Any of title, content, priority"),
    responses(
        (status = 200, body = Announcement),
        (status = 404, description = "Announcement not found")
    ),
    tag = "Announcement"
)]
pub async fn update_announcement(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> ApiResult<impl Responder> {
    let announcement_id = path.into_inner();

    let update = build_update_sql("announcements", &body, "id", announcement_id, UPDATABLE_COLUMNS)?;
    execute_update(pool.get_ref(), update).await?;

    let announcement = fetch_announcement(pool.get_ref(), announcement_id).await?;
    Ok(HttpResponse::Ok().json(announcement))
}

#[utoipa::path(
    delete,
    path = "/api/announcements/{announcement_id}",
    params(("announcement_id", Path, description = "Announcement ID")),
    responses(
        (status = 200, body = Object, example = json!({ "message": "Announcement deleted successfully" })),
        (status = 404, description = "Announcement not found")
    ),
    tag = "Announcement"
)]
pub async fn delete_announcement(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> ApiResult<impl Responder> {
    let result = sqlx::query("DELETE FROM announcements WHERE id = ?")
        .bind(path.into_inner())
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Announcement not found"));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Announcement deleted successfully" })))
}

#[utoipa::path(
    get,
    path = "/api/announcements/stats/count",
    responses((status = 200, body = CountResponse)),
    tag = "Announcement"
)]
pub async fn announcement_count(pool: web::Data<MySqlPool>) -> ApiResult<impl Responder> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM announcements")
        .fetch_one(pool.get_ref())
        .await?;
    Ok(HttpResponse::Ok().json(CountResponse { count }))
}
