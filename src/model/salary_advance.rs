use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, AsRefStr, Display, EnumString,
)]
pub enum DeductionType {
    /// The whole remaining amount is recovered at once
    Full,
    /// At most `installment_amount` is recovered per payroll
    Installment,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, AsRefStr, Display, EnumString,
)]
pub enum AdvanceStatus {
    Active,
    Paid,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct SalaryAdvance {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1)]
    pub employee_id: u64,
    #[schema(example = "2000.00")]
    pub amount: Decimal,
    #[schema(example = "2025-03-02", value_type = String, format = "date")]
    pub date: NaiveDate,
    /// Payroll month this advance is recovered in
    #[schema(example = 3)]
    pub month: i32,
    #[schema(example = 2025)]
    pub year: i32,
    #[schema(example = "Full")]
    pub deduction_type: String,
    #[schema(example = "500.00", nullable = true)]
    pub installment_amount: Option<Decimal>,
    #[schema(example = "2000.00")]
    pub remaining_amount: Decimal,
    #[schema(example = "Active")]
    pub status: String,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub created_at: Option<DateTime<Utc>>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct SalaryAdvanceDetail {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub advance: SalaryAdvance,
    #[schema(example = "Sumit Kumar")]
    pub employee_name: String,
    #[schema(example = "Engineering", nullable = true)]
    pub department_name: Option<String>,
}
