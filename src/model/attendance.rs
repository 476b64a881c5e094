use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, AsRefStr, Display, EnumString,
)]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    #[serde(rename = "Half Day")]
    #[strum(serialize = "Half Day")]
    HalfDay,
    /// Written by the leave-creation flow for each day of an approved leave
    Leave,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Attendance {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1)]
    pub employee_id: u64,
    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = "09:00:00", value_type = Option<String>, format = "time")]
    pub check_in: Option<NaiveTime>,
    #[schema(example = "17:30:00", value_type = Option<String>, format = "time")]
    pub check_out: Option<NaiveTime>,
    #[schema(example = "Present")]
    pub status: String,
    #[schema(example = "8.50", nullable = true)]
    pub hours: Option<Decimal>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub created_at: Option<DateTime<Utc>>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceDetail {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub attendance: Attendance,
    #[schema(example = "Sumit Kumar")]
    pub employee_name: String,
    #[schema(example = "sumit@example.com")]
    pub email: String,
}

/// Hours between check-in and check-out, rounded to two decimals.
/// A check-out earlier than the check-in yields `None`.
pub fn worked_hours(check_in: NaiveTime, check_out: NaiveTime) -> Option<Decimal> {
    let minutes = (check_out - check_in).num_minutes();
    if minutes < 0 {
        return None;
    }
    Some((Decimal::from(minutes) / Decimal::from(60)).round_dp(2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn half_day_uses_spaced_name() {
        assert_eq!(AttendanceStatus::HalfDay.as_ref(), "Half Day");
        let parsed: AttendanceStatus = serde_json::from_str("\"Half Day\"").unwrap();
        assert_eq!(parsed, AttendanceStatus::HalfDay);
        assert_eq!("Leave".parse::<AttendanceStatus>().unwrap(), AttendanceStatus::Leave);
    }

    #[test]
    fn worked_hours_rounds_to_cents() {
        let t = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
        assert_eq!(worked_hours(t(9, 0), t(17, 30)), Some(dec!(8.50)));
        assert_eq!(worked_hours(t(9, 0), t(9, 20)), Some(dec!(0.33)));
        assert_eq!(worked_hours(t(17, 0), t(9, 0)), None);
    }
}
