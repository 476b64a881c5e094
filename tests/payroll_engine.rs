//! Payroll engine against a real MySQL. Set `TEST_DATABASE_URL` to run.

mod common;

use ems::error::ApiError;
use ems::model::salary_advance::SalaryAdvance;
use ems::service::payroll::{
    self as engine, AdvancePayment, AdvancePaymentOutcome, LineOutcome, NewPayroll, Period,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

async fn advance(pool: &sqlx::MySqlPool, id: u64) -> SalaryAdvance {
    sqlx::query_as::<_, SalaryAdvance>("SELECT * FROM salary_advances WHERE id = ?")
        .bind(id)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[actix_web::test]
async fn no_deductions_means_net_equals_basic() {
    let Some(db) = common::test_db().await else { return };
    let id = common::insert_employee(&db.pool, "plain@example.com", dec!(10000), "Approved").await;

    let report = engine::generate_for_period(&db.pool, Period::new(3, 2025).unwrap())
        .await
        .unwrap();

    assert_eq!(report.created, 1);
    assert_eq!(report.errors, 0);
    let line = &report.details.created[0];
    assert_eq!(line.payroll.employee_id, id);
    assert_eq!(line.payroll.net_salary, dec!(10000));
    assert_eq!(line.payroll.net_salary, line.payroll.basic_salary + line.payroll.allowances);
}

#[actix_web::test]
async fn advances_only_hit_their_own_period() {
    let Some(db) = common::test_db().await else { return };
    let id = common::insert_employee(&db.pool, "adv@example.com", dec!(10000), "Approved").await;
    common::insert_advance(&db.pool, id, dec!(2000), (3, 2025), None).await;
    let employee = engine::fetch_employee(&db.pool, id).await.unwrap();

    let march = engine::compute_deductions_for_period(&db.pool, &employee, Period::new(3, 2025).unwrap())
        .await
        .unwrap();
    assert_eq!(march.advance_deduction, dec!(2000));
    assert_eq!(march.net_salary, dec!(8000));

    let april = engine::compute_deductions_for_period(&db.pool, &employee, Period::new(4, 2025).unwrap())
        .await
        .unwrap();
    assert_eq!(april.advance_deduction, Decimal::ZERO);
    assert_eq!(april.net_salary, dec!(10000));
}

#[actix_web::test]
async fn unpaid_leave_costs_a_thirtieth_per_day() {
    let Some(db) = common::test_db().await else { return };
    let id = common::insert_employee(&db.pool, "unpaid@example.com", dec!(9000), "Approved").await;
    common::insert_unpaid_leave(&db.pool, id, "2025-03-10", "2025-03-12", 3).await;
    let employee = engine::fetch_employee(&db.pool, id).await.unwrap();

    let breakdown = engine::compute_deductions_for_period(&db.pool, &employee, Period::new(3, 2025).unwrap())
        .await
        .unwrap();

    assert_eq!(breakdown.unpaid_days, dec!(3));
    assert_eq!(breakdown.unpaid_deduction, dec!(900));
    assert_eq!(breakdown.net_salary, dec!(8100));
}

#[actix_web::test]
async fn only_approved_unpaid_leave_inside_the_month_is_deducted() {
    let Some(db) = common::test_db().await else { return };
    let id = common::insert_employee(&db.pool, "edges@example.com", dec!(3000), "Approved").await;

    // whole of February 2024, leap day included
    common::insert_unpaid_leave(&db.pool, id, "2024-02-01", "2024-02-29", 29).await;
    // spills into March
    common::insert_unpaid_leave(&db.pool, id, "2024-02-28", "2024-03-02", 4).await;
    common::insert_leave(&db.pool, id, ("Casual", "Approved"), ("2024-02-05", "2024-02-06"), 2).await;
    common::insert_leave(&db.pool, id, ("Unpaid", "Pending"), ("2024-02-12", "2024-02-14"), 3).await;

    let employee = engine::fetch_employee(&db.pool, id).await.unwrap();
    let february = engine::compute_deductions_for_period(&db.pool, &employee, Period::new(2, 2024).unwrap())
        .await
        .unwrap();

    assert_eq!(february.unpaid_days, dec!(29));
    assert_eq!(february.unpaid_deduction, dec!(2900));
    assert_eq!(february.net_salary, dec!(100));

    let march = engine::compute_deductions_for_period(&db.pool, &employee, Period::new(3, 2024).unwrap())
        .await
        .unwrap();
    assert_eq!(march.unpaid_days, Decimal::ZERO);
}

#[actix_web::test]
async fn regenerating_updates_instead_of_duplicating() {
    let Some(db) = common::test_db().await else { return };
    let id = common::insert_employee(&db.pool, "twice@example.com", dec!(10000), "Approved").await;
    common::insert_advance(&db.pool, id, dec!(1500), (5, 2025), None).await;
    common::insert_employee(&db.pool, "pending@example.com", dec!(5000), "Pending").await;
    let period = Period::new(5, 2025).unwrap();

    let first = engine::generate_for_period(&db.pool, period).await.unwrap();
    let second = engine::generate_for_period(&db.pool, period).await.unwrap();

    assert_eq!((first.created, first.updated), (1, 0));
    assert_eq!((second.created, second.updated), (0, 1));
    assert_eq!(second.details.created[0].outcome, LineOutcome::Updated);
    assert_eq!(
        first.details.created[0].payroll.net_salary,
        second.details.created[0].payroll.net_salary
    );

    let rows = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM payroll WHERE employee_id = ?")
        .bind(id)
        .fetch_one(&db.pool)
        .await
        .unwrap();
    assert_eq!(rows, 1);
}

#[actix_web::test]
async fn employee_without_salary_is_reported_not_fatal() {
    let Some(db) = common::test_db().await else { return };
    common::insert_employee(&db.pool, "ok@example.com", dec!(4000), "Approved").await;
    let broken = sqlx::query("INSERT INTO employees (name, email, status) VALUES ('No Pay', 'nopay@example.com', 'Approved')")
        .execute(&db.pool)
        .await
        .unwrap()
        .last_insert_id();

    let report = engine::generate_for_period(&db.pool, Period::new(6, 2025).unwrap())
        .await
        .unwrap();

    assert_eq!(report.created, 1);
    assert_eq!(report.errors, 1);
    assert_eq!(report.details.errors[0].employee_id, broken);
}

#[actix_web::test]
async fn manual_entry_charges_every_active_advance_once_per_period() {
    let Some(db) = common::test_db().await else { return };
    let id = common::insert_employee(&db.pool, "manual@example.com", dec!(10000), "Approved").await;
    common::insert_advance(&db.pool, id, dec!(1000), (1, 2025), None).await;
    common::insert_advance(&db.pool, id, dec!(3000), (9, 2025), Some(dec!(500))).await;

    let input = NewPayroll {
        employee_id: id,
        month: 2,
        year: 2025,
        basic_salary: dec!(10000),
        allowances: dec!(200),
        deductions: dec!(100),
        payment_date: None,
    };
    let created = engine::create_single(&db.pool, &input).await.unwrap();

    assert_eq!(created.advance_deduction, dec!(1500));
    assert_eq!(created.payroll.deductions, dec!(1600));
    assert_eq!(created.payroll.net_salary, dec!(8600));

    let duplicate = engine::create_single(&db.pool, &input).await.unwrap_err();
    assert!(matches!(duplicate, ApiError::Conflict(_)));
}

#[actix_web::test]
async fn manual_entry_for_unknown_employee_is_not_found() {
    let Some(db) = common::test_db().await else { return };

    let input = NewPayroll {
        employee_id: 999_999,
        month: 2,
        year: 2025,
        basic_salary: dec!(1000),
        allowances: Decimal::ZERO,
        deductions: Decimal::ZERO,
        payment_date: None,
    };
    let err = engine::create_single(&db.pool, &input).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[actix_web::test]
async fn process_settles_period_advances_and_revert_keeps_them_settled() {
    let Some(db) = common::test_db().await else { return };
    let id = common::insert_employee(&db.pool, "proc@example.com", dec!(10000), "Approved").await;
    let march_advance = common::insert_advance(&db.pool, id, dec!(2000), (3, 2025), None).await;
    let april_advance = common::insert_advance(&db.pool, id, dec!(700), (4, 2025), None).await;

    let report = engine::generate_for_period(&db.pool, Period::new(3, 2025).unwrap())
        .await
        .unwrap();
    let payroll_id = report.details.created[0].payroll.id;

    let paid_on = chrono::NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
    let processed = engine::process(&db.pool, payroll_id, Some(paid_on)).await.unwrap();
    assert_eq!(processed.status, "Paid");
    assert_eq!(processed.payment_date, Some(paid_on));

    let settled = advance(&db.pool, march_advance).await;
    assert_eq!(settled.status, "Paid");
    assert_eq!(settled.remaining_amount, Decimal::ZERO);
    assert_eq!(advance(&db.pool, april_advance).await.status, "Active");

    let reverted = engine::revert(&db.pool, payroll_id).await.unwrap();
    assert_eq!(reverted.status, "Pending");
    assert_eq!(reverted.payment_date, None);
    assert_eq!(advance(&db.pool, march_advance).await.status, "Paid");
}

#[actix_web::test]
async fn process_unknown_record_is_not_found() {
    let Some(db) = common::test_db().await else { return };

    let err = engine::process(&db.pool, 424_242, None).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[actix_web::test]
async fn paying_in_advance_twice_is_refused() {
    let Some(db) = common::test_db().await else { return };
    let id = common::insert_employee(&db.pool, "early@example.com", dec!(7000), "Approved").await;

    let input = AdvancePayment {
        employee_id: id,
        month: 8,
        year: 2025,
        amount: None,
    };

    match engine::pay_in_advance(&db.pool, &input).await.unwrap() {
        AdvancePaymentOutcome::Created(payroll) => {
            assert_eq!(payroll.status, "Paid");
            assert_eq!(payroll.net_salary, dec!(7000));
            assert_eq!(payroll.basic_salary, dec!(7000));
        }
        other => panic!("expected a new record, got {other:?}"),
    }

    let err = engine::pay_in_advance(&db.pool, &input).await.unwrap_err();
    assert_eq!(err, ApiError::invalid("Salary already paid for this month"));
}

#[actix_web::test]
async fn paying_in_advance_marks_a_pending_line_paid() {
    let Some(db) = common::test_db().await else { return };
    let id = common::insert_employee(&db.pool, "pending-line@example.com", dec!(6000), "Approved").await;
    engine::generate_for_period(&db.pool, Period::new(7, 2025).unwrap())
        .await
        .unwrap();

    let input = AdvancePayment {
        employee_id: id,
        month: 7,
        year: 2025,
        amount: None,
    };
    let outcome = engine::pay_in_advance(&db.pool, &input).await.unwrap();

    assert!(matches!(outcome, AdvancePaymentOutcome::Updated(ref p) if p.status == "Paid"));
}
