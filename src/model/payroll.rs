use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, AsRefStr, Display, EnumString,
)]
pub enum PayrollStatus {
    Pending,
    Paid,
}

/// One payroll line, unique per (employee_id, month, year).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Payroll {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1)]
    pub employee_id: u64,
    #[schema(example = 3)]
    pub month: i32,
    #[schema(example = 2025)]
    pub year: i32,
    #[schema(example = "10000.00")]
    pub basic_salary: Decimal,
    #[schema(example = "0.00")]
    pub allowances: Decimal,
    #[schema(example = "2000.00")]
    pub deductions: Decimal,
    #[schema(example = "8000.00")]
    pub net_salary: Decimal,
    #[schema(example = "Pending")]
    pub status: String,
    #[schema(example = "2025-03-31", value_type = Option<String>, format = "date")]
    pub payment_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub created_at: Option<DateTime<Utc>>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Payroll line joined with employee and department details.
#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct PayrollDetail {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub payroll: Payroll,
    #[schema(example = "Sumit Kumar")]
    pub employee_name: String,
    #[schema(example = "sumit@example.com")]
    pub email: String,
    #[schema(example = "Developer", nullable = true)]
    pub position: Option<String>,
    #[schema(example = "Engineering", nullable = true)]
    pub department_name: Option<String>,
}
