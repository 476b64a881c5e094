use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Status value that makes an employee part of payroll generation.
pub const STATUS_APPROVED: &str = "Approved";

pub const DEFAULT_CASUAL_LEAVE_BALANCE: i32 = 12;
pub const DEFAULT_SICK_LEAVE_BALANCE: i32 = 10;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "name": "Sumit Kumar",
        "email": "sumit@example.com",
        "phone": "1234567890",
        "department_id": 1,
        "position": "Developer",
        "salary": "10000.00",
        "experience": "2 years",
        "hire_date": "2023-01-15",
        "status": "Approved",
        "casual_leave_balance": 12,
        "sick_leave_balance": 10
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "Sumit Kumar")]
    pub name: String,

    #[schema(example = "sumit@example.com")]
    pub email: String,

    #[schema(example = "1234567890", nullable = true)]
    pub phone: Option<String>,

    #[schema(example = 1, nullable = true)]
    pub department_id: Option<u64>,

    #[schema(example = "Developer", nullable = true)]
    pub position: Option<String>,

    /// Monthly base salary
    #[schema(example = "10000.00", nullable = true)]
    pub salary: Option<Decimal>,

    #[schema(example = "2 years", nullable = true)]
    pub experience: Option<String>,

    #[schema(
        example = "2023-01-15",
        value_type = Option<String>,
        format = "date"
    )]
    pub hire_date: Option<NaiveDate>,

    #[schema(example = "Approved")]
    pub status: String,

    #[schema(example = 12)]
    pub casual_leave_balance: i32,

    #[schema(example = 10)]
    pub sick_leave_balance: i32,

    #[schema(value_type = Option<String>, format = "date-time")]
    pub created_at: Option<DateTime<Utc>>,

    #[schema(value_type = Option<String>, format = "date-time")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Employee joined with the name of their department.
#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct EmployeeDetail {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub employee: Employee,
    #[schema(example = "Engineering", nullable = true)]
    pub department_name: Option<String>,
}

/// Employee list row: the employee plus their attendance for a day and their
/// payroll line for a period.
#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct EmployeeOverview {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub employee: Employee,
    #[schema(example = "Engineering", nullable = true)]
    pub department_name: Option<String>,
    #[schema(example = "Present")]
    pub attendance_status: String,
    #[schema(example = "Pending")]
    pub payroll_status: String,
    #[schema(example = "0.00")]
    pub deductions: Decimal,
    #[schema(example = "10000.00", nullable = true)]
    pub current_net_salary: Option<Decimal>,
    /// Approved leaves covering today
    #[schema(example = 0)]
    pub active_leave_count: i64,
}
