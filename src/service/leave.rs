use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use sqlx::MySqlPool;
use tracing::info;
use utoipa::ToSchema;

use crate::error::{ApiError, ApiResult};
use crate::model::attendance::AttendanceStatus;
use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType};

/// Inclusive number of calendar days between `start` and `end`.
pub fn leave_days(start: NaiveDate, end: NaiveDate) -> ApiResult<i32> {
    if start > end {
        return Err(ApiError::invalid("start_date cannot be after end_date"));
    }
    i32::try_from((end - start).num_days() + 1)
        .map_err(|_| ApiError::invalid("Leave range is too long"))
}

/// Fails when `available` does not cover `requested` days.
pub fn check_balance(leave_type: LeaveType, available: i32, requested: i32) -> ApiResult<()> {
    if available < requested {
        return Err(ApiError::invalid(format!(
            "Insufficient {} leave balance. Available: {}",
            leave_type.as_ref().to_lowercase(),
            available
        )));
    }
    Ok(())
}

fn date_field(payload: &Value, field: &str) -> ApiResult<Option<NaiveDate>> {
    match payload.get(field) {
        None => Ok(None),
        Some(Value::String(s)) => s
            .parse::<NaiveDate>()
            .map(Some)
            .map_err(|_| ApiError::invalid(format!("Invalid {field}: {s}"))),
        Some(other) => Err(ApiError::invalid(format!("Invalid {field}: {other}"))),
    }
}

/// Keeps a partial update's `days` consistent with its dates.
///
/// When both `start_date` and `end_date` are present the range must be in
/// order, and `days` is either filled in or required to match it.
pub fn reconcile_dates(payload: &mut Value) -> ApiResult<()> {
    let (Some(start), Some(end)) = (
        date_field(payload, "start_date")?,
        date_field(payload, "end_date")?,
    ) else {
        return Ok(());
    };

    let days = leave_days(start, end)?;

    let Some(obj) = payload.as_object_mut() else {
        return Ok(());
    };
    match obj.get("days") {
        None | Some(Value::Null) => {
            obj.insert("days".to_string(), Value::from(days));
            Ok(())
        }
        Some(given) if given.as_i64() == Some(i64::from(days)) => Ok(()),
        Some(given) => Err(ApiError::invalid(format!(
            "days ({given}) does not match the date range ({days})"
        ))),
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NewLeave {
    #[schema(example = 1)]
    pub employee_id: u64,
    #[schema(example = "Casual")]
    pub leave_type: LeaveType,
    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-07", value_type = String, format = "date")]
    pub end_date: NaiveDate,
    #[schema(example = "Family event")]
    pub reason: Option<String>,
}

/// Records an approved leave: balance check and decrement, the request row,
/// and a `Leave` attendance row for every day of the range, all in one
/// transaction.
pub async fn create_leave(pool: &MySqlPool, input: &NewLeave) -> ApiResult<LeaveRequest> {
    let days = leave_days(input.start_date, input.end_date)?;

    let mut tx = pool.begin().await?;

    let (casual, sick) = sqlx::query_as::<_, (i32, i32)>(
        "SELECT casual_leave_balance, sick_leave_balance FROM employees WHERE id = ? FOR UPDATE",
    )
    .bind(input.employee_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| ApiError::not_found("Employee not found"))?;

    if let Some(column) = input.leave_type.balance_column() {
        let available = match input.leave_type {
            LeaveType::Casual => casual,
            _ => sick,
        };
        check_balance(input.leave_type, available, days)?;

        sqlx::query(&format!(
            "UPDATE employees SET {column} = {column} - ? WHERE id = ?"
        ))
        .bind(days)
        .bind(input.employee_id)
        .execute(&mut *tx)
        .await?;
    }

    let result = sqlx::query(
        r#"
        INSERT INTO leave_requests
            (employee_id, leave_type, start_date, end_date, days, reason, status)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(input.employee_id)
    .bind(input.leave_type.as_ref())
    .bind(input.start_date)
    .bind(input.end_date)
    .bind(days)
    .bind(&input.reason)
    .bind(LeaveStatus::Approved.as_ref())
    .execute(&mut *tx)
    .await?;

    for day in input.start_date.iter_days().take_while(|d| *d <= input.end_date) {
        sqlx::query(
            r#"
            INSERT INTO attendance (employee_id, date, status)
            VALUES (?, ?, ?)
            ON DUPLICATE KEY UPDATE status = VALUES(status)
            "#,
        )
        .bind(input.employee_id)
        .bind(day)
        .bind(AttendanceStatus::Leave.as_ref())
        .execute(&mut *tx)
        .await?;
    }

    let leave = sqlx::query_as::<_, LeaveRequest>("SELECT * FROM leave_requests WHERE id = ?")
        .bind(result.last_insert_id())
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;

    info!(
        leave_id = leave.id,
        employee_id = leave.employee_id,
        leave_type = %input.leave_type,
        days,
        "Leave recorded"
    );

    Ok(leave)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn single_day_leave_counts_one() {
        assert_eq!(leave_days(date(2026, 1, 5), date(2026, 1, 5)).unwrap(), 1);
    }

    #[test]
    fn range_is_inclusive_across_months() {
        assert_eq!(leave_days(date(2026, 1, 5), date(2026, 1, 7)).unwrap(), 3);
        assert_eq!(leave_days(date(2024, 2, 28), date(2024, 3, 1)).unwrap(), 3);
    }

    #[test]
    fn reversed_range_is_rejected() {
        let err = leave_days(date(2026, 1, 7), date(2026, 1, 5)).unwrap_err();
        assert_eq!(err, ApiError::invalid("start_date cannot be after end_date"));
    }

    #[test]
    fn balance_must_cover_request() {
        assert!(check_balance(LeaveType::Casual, 3, 3).is_ok());

        let err = check_balance(LeaveType::Casual, 2, 3).unwrap_err();
        assert_eq!(
            err,
            ApiError::invalid("Insufficient casual leave balance. Available: 2")
        );
    }

    #[test]
    fn updated_range_fills_in_days() {
        let mut body = serde_json::json!({ "start_date": "2024-02-27", "end_date": "2024-03-01" });
        reconcile_dates(&mut body).unwrap();
        assert_eq!(body["days"], 4);
    }

    #[test]
    fn updated_range_must_agree_with_days() {
        let mut matching = serde_json::json!({ "start_date": "2026-01-05", "end_date": "2026-01-07", "days": 3 });
        assert!(reconcile_dates(&mut matching).is_ok());

        let mut wrong = serde_json::json!({ "start_date": "2026-01-05", "end_date": "2026-01-07", "days": 10 });
        assert!(matches!(reconcile_dates(&mut wrong), Err(ApiError::InvalidInput(_))));
    }

    #[test]
    fn updated_range_cannot_be_reversed() {
        let mut body = serde_json::json!({ "start_date": "2026-01-07", "end_date": "2026-01-05" });
        assert_eq!(
            reconcile_dates(&mut body).unwrap_err(),
            ApiError::invalid("start_date cannot be after end_date")
        );
    }

    #[test]
    fn partial_dates_are_left_alone() {
        let mut body = serde_json::json!({ "start_date": "2026-01-07", "days": 9 });
        reconcile_dates(&mut body).unwrap();
        assert_eq!(body["days"], 9);

        let mut bad = serde_json::json!({ "start_date": "someday", "end_date": "2026-01-07" });
        assert!(matches!(reconcile_dates(&mut bad), Err(ApiError::InvalidInput(_))));
    }

    #[test]
    fn only_paid_leave_types_have_a_balance() {
        assert_eq!(LeaveType::Sick.balance_column(), Some("sick_leave_balance"));
        assert_eq!(LeaveType::Unpaid.balance_column(), None);
    }
}
