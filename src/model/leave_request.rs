use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, AsRefStr, Display, EnumString,
)]
pub enum LeaveType {
    Casual,
    Sick,
    /// Carries no balance; deducted from salary at payroll time
    Unpaid,
}

impl LeaveType {
    /// Employee column holding the remaining balance for this leave type.
    pub fn balance_column(&self) -> Option<&'static str> {
        match self {
            LeaveType::Casual => Some("casual_leave_balance"),
            LeaveType::Sick => Some("sick_leave_balance"),
            LeaveType::Unpaid => None,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, AsRefStr, Display, EnumString,
)]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LeaveRequest {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1)]
    pub employee_id: u64,
    #[schema(example = "Casual")]
    pub leave_type: String,
    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-07", value_type = String, format = "date")]
    pub end_date: NaiveDate,
    #[schema(example = 3)]
    pub days: i32,
    #[schema(example = "Family event", nullable = true)]
    pub reason: Option<String>,
    #[schema(example = "Approved")]
    pub status: String,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub created_at: Option<DateTime<Utc>>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct LeaveDetail {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub leave: LeaveRequest,
    #[schema(example = "Sumit Kumar")]
    pub employee_name: String,
    #[schema(example = "sumit@example.com")]
    pub email: String,
    #[schema(example = 1, nullable = true)]
    pub department_id: Option<u64>,
}
