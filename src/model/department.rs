use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Department {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "Engineering")]
    pub name: String,
    #[schema(example = "Software Development and IT", nullable = true)]
    pub description: Option<String>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub created_at: Option<DateTime<Utc>>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Department row as listed, with the number of employees assigned to it.
#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct DepartmentWithCount {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub department: Department,
    #[schema(example = 12)]
    pub employee_count: i64,
}
