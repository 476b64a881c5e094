use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Announcement {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "Welcome to EMS")]
    pub title: String,
    #[schema(example = "Welcome to our new Employee Management System!")]
    pub content: String,
    #[schema(example = "High")]
    pub priority: String,
    #[schema(example = "Admin", nullable = true)]
    pub created_by: Option<String>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub created_at: Option<DateTime<Utc>>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub updated_at: Option<DateTime<Utc>>,
}
