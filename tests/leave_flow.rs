//! Leave creation against a real MySQL. Set `TEST_DATABASE_URL` to run.

mod common;

use chrono::NaiveDate;
use ems::error::ApiError;
use ems::model::leave_request::LeaveType;
use ems::service::leave::{self, NewLeave};
use rust_decimal_macros::dec;
use sqlx::MySqlPool;

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

async fn balances(pool: &MySqlPool, employee_id: u64) -> (i32, i32) {
    sqlx::query_as::<_, (i32, i32)>(
        "SELECT casual_leave_balance, sick_leave_balance FROM employees WHERE id = ?",
    )
    .bind(employee_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn leave_days_in_attendance(pool: &MySqlPool, employee_id: u64) -> i64 {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM attendance WHERE employee_id = ? AND status = 'Leave'",
    )
    .bind(employee_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

#[actix_web::test]
async fn casual_leave_consumes_balance_and_marks_attendance() {
    let Some(db) = common::test_db().await else { return };
    let id = common::insert_employee(&db.pool, "casual@example.com", dec!(5000), "Approved").await;

    let request = NewLeave {
        employee_id: id,
        leave_type: LeaveType::Casual,
        start_date: date("2025-03-03"),
        end_date: date("2025-03-05"),
        reason: Some("Family event".to_string()),
    };
    let created = leave::create_leave(&db.pool, &request).await.unwrap();

    assert_eq!(created.days, 3);
    assert_eq!(created.status, "Approved");
    assert_eq!(balances(&db.pool, id).await, (9, 10));
    assert_eq!(leave_days_in_attendance(&db.pool, id).await, 3);
}

#[actix_web::test]
async fn leave_beyond_balance_changes_nothing() {
    let Some(db) = common::test_db().await else { return };
    let id = common::insert_employee(&db.pool, "greedy@example.com", dec!(5000), "Approved").await;

    let request = NewLeave {
        employee_id: id,
        leave_type: LeaveType::Casual,
        start_date: date("2025-04-01"),
        end_date: date("2025-04-20"),
        reason: None,
    };
    let err = leave::create_leave(&db.pool, &request).await.unwrap_err();

    assert_eq!(
        err,
        ApiError::invalid("Insufficient casual leave balance. Available: 12")
    );
    assert_eq!(balances(&db.pool, id).await, (12, 10));
    assert_eq!(leave_days_in_attendance(&db.pool, id).await, 0);

    let requests = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM leave_requests WHERE employee_id = ?")
        .bind(id)
        .fetch_one(&db.pool)
        .await
        .unwrap();
    assert_eq!(requests, 0);
}

#[actix_web::test]
async fn unpaid_leave_has_no_balance_and_feeds_payroll() {
    let Some(db) = common::test_db().await else { return };
    let id = common::insert_employee(&db.pool, "unpaid-flow@example.com", dec!(9000), "Approved").await;

    let request = NewLeave {
        employee_id: id,
        leave_type: LeaveType::Unpaid,
        start_date: date("2025-03-10"),
        end_date: date("2025-03-12"),
        reason: None,
    };
    leave::create_leave(&db.pool, &request).await.unwrap();
    assert_eq!(balances(&db.pool, id).await, (12, 10));

    let employee = ems::service::payroll::fetch_employee(&db.pool, id).await.unwrap();
    let period = ems::service::payroll::Period::new(3, 2025).unwrap();
    let breakdown = ems::service::payroll::compute_deductions_for_period(&db.pool, &employee, period)
        .await
        .unwrap();
    assert_eq!(breakdown.unpaid_deduction, dec!(900));
}

#[actix_web::test]
async fn leave_for_unknown_employee_is_not_found() {
    let Some(db) = common::test_db().await else { return };

    let request = NewLeave {
        employee_id: 777_777,
        leave_type: LeaveType::Sick,
        start_date: date("2025-03-10"),
        end_date: date("2025-03-10"),
        reason: None,
    };
    let err = leave::create_leave(&db.pool, &request).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}
