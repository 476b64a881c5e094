//! Payroll engine.
//!
//! Two deduction rules live side by side:
//!
//! * bulk generation (`generate_for_period`) charges only the Active advances
//!   tagged with the period being generated, plus approved unpaid leave that
//!   starts and ends inside the month;
//! * manual entry (`create_single`) charges every Active advance of the
//!   employee whatever its period, using the Full / Installment rule.
//!
//! Processing a record settles all Active advances of the employee for the
//! record's period in full, whatever was actually deducted. Reverting does not
//! bring them back.

use chrono::{Datelike, Local, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use sqlx::{MySql, MySqlPool, Transaction};
use tracing::{debug, info, warn};
use utoipa::ToSchema;

use crate::error::{ApiError, ApiResult, conflict_as};
use crate::model::employee::{Employee, STATUS_APPROVED};
use crate::model::leave_request::{LeaveStatus, LeaveType};
use crate::model::payroll::{Payroll, PayrollStatus};
use crate::model::salary_advance::{AdvanceStatus, DeductionType, SalaryAdvance};

/// Unpaid leave is charged at `salary / 30` per day whatever the month length.
pub const PAY_DAYS_PER_MONTH: Decimal = dec!(30);

/// A payroll cycle: one calendar month of one year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub month: i32,
    pub year: i32,
    first_day: NaiveDate,
    last_day: NaiveDate,
}

impl Period {
    pub fn new(month: i32, year: i32) -> ApiResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(ApiError::invalid("month must be between 1 and 12"));
        }
        if year <= 0 {
            return Err(ApiError::invalid("year must be a positive number"));
        }

        let out_of_range = || ApiError::invalid(format!("year {year} is out of range"));
        let first_day = NaiveDate::from_ymd_opt(year, month as u32, 1).ok_or_else(out_of_range)?;
        let next_month = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month as u32 + 1, 1)
        }
        .ok_or_else(out_of_range)?;
        let last_day = next_month.pred_opt().ok_or_else(out_of_range)?;

        Ok(Self {
            month,
            year,
            first_day,
            last_day,
        })
    }

    /// Period containing `date`.
    pub fn containing(date: NaiveDate) -> ApiResult<Self> {
        Self::new(date.month() as i32, date.year())
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    pub fn last_day(&self) -> NaiveDate {
        self.last_day
    }
}

fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Deductions and net salary of one employee for one period.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DeductionBreakdown {
    #[schema(example = 1)]
    pub employee_id: u64,
    #[schema(example = 3)]
    pub month: i32,
    #[schema(example = 2025)]
    pub year: i32,
    #[schema(example = "10000.00")]
    pub basic_salary: Decimal,
    #[schema(example = "0")]
    pub allowances: Decimal,
    #[schema(example = "2000.00")]
    pub deductions: Decimal,
    #[schema(example = "8000.00")]
    pub net_salary: Decimal,
    #[schema(example = "2000.00")]
    pub advance_deduction: Decimal,
    #[schema(example = "0")]
    pub unpaid_deduction: Decimal,
    #[schema(example = "0")]
    pub unpaid_days: Decimal,
}

/// Applies the period rule to already-aggregated inputs.
///
/// `net_salary` is not floored: deductions larger than the salary produce a
/// negative value.
pub fn calculate_period(
    employee_id: u64,
    period: Period,
    salary: Decimal,
    advance_total: Decimal,
    unpaid_days: Decimal,
) -> DeductionBreakdown {
    let unpaid_deduction = if unpaid_days > Decimal::ZERO {
        let per_day_salary = salary / PAY_DAYS_PER_MONTH;
        round_money(unpaid_days * per_day_salary)
    } else {
        Decimal::ZERO
    };

    let deductions = advance_total + unpaid_deduction;

    DeductionBreakdown {
        employee_id,
        month: period.month,
        year: period.year,
        basic_salary: salary,
        allowances: Decimal::ZERO,
        deductions,
        net_salary: salary - deductions,
        advance_deduction: advance_total,
        unpaid_deduction,
        unpaid_days,
    }
}

/// Amount one Active advance contributes to a manually entered payroll.
///
/// Anything that is not `Full` follows the installment rule. An installment
/// advance without an installment amount is recovered in full.
pub fn advance_obligation(advance: &SalaryAdvance) -> Decimal {
    match advance.deduction_type.parse::<DeductionType>() {
        Ok(DeductionType::Full) => advance.remaining_amount,
        _ => advance
            .installment_amount
            .unwrap_or(advance.remaining_amount)
            .min(advance.remaining_amount),
    }
}

/// Final deductions and net salary of a manually entered payroll.
pub fn manual_totals(
    basic_salary: Decimal,
    allowances: Decimal,
    deductions: Decimal,
    advance_total: Decimal,
) -> (Decimal, Decimal) {
    let final_deductions = deductions + advance_total;
    (final_deductions, basic_salary + allowances - final_deductions)
}

// ---------------------------------------------------------------------------
// Database-backed operations
// ---------------------------------------------------------------------------

pub async fn fetch_employee(pool: &MySqlPool, employee_id: u64) -> ApiResult<Employee> {
    sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = ?")
        .bind(employee_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Employee not found"))
}

pub async fn fetch_payroll(pool: &MySqlPool, payroll_id: u64) -> ApiResult<Payroll> {
    sqlx::query_as::<_, Payroll>("SELECT * FROM payroll WHERE id = ?")
        .bind(payroll_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Payroll record not found"))
}

async fn fetch_period_record(
    pool: &MySqlPool,
    employee_id: u64,
    period: Period,
) -> ApiResult<Option<Payroll>> {
    let record = sqlx::query_as::<_, Payroll>(
        "SELECT * FROM payroll WHERE employee_id = ? AND month = ? AND year = ?",
    )
    .bind(employee_id)
    .bind(period.month)
    .bind(period.year)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}

/// Advances tagged with the period plus approved
/// unpaid leave inside the month.
pub async fn compute_deductions_for_period(
    pool: &MySqlPool,
    employee: &Employee,
    period: Period,
) -> ApiResult<DeductionBreakdown> {
    let salary = employee.salary.ok_or_else(|| {
        ApiError::invalid(format!("Employee {} has no salary on record", employee.id))
    })?;

    let advance_total = sqlx::query_scalar::<_, Option<Decimal>>(
        r#"
        SELECT SUM(remaining_amount)
        FROM salary_advances
        WHERE employee_id = ?
        AND status = ?
        AND month = ?
        AND year = ?
        "#,
    )
    .bind(employee.id)
    .bind(AdvanceStatus::Active.as_ref())
    .bind(period.month)
    .bind(period.year)
    .fetch_one(pool)
    .await?
    .unwrap_or(Decimal::ZERO);

    let unpaid_days = sqlx::query_scalar::<_, Option<Decimal>>(
        r#"
        SELECT SUM(days)
        FROM leave_requests
        WHERE employee_id = ?
        AND leave_type = ?
        AND status = ?
        AND start_date >= ?
        AND end_date <= ?
        "#,
    )
    .bind(employee.id)
    .bind(LeaveType::Unpaid.as_ref())
    .bind(LeaveStatus::Approved.as_ref())
    .bind(period.first_day())
    .bind(period.last_day())
    .fetch_one(pool)
    .await?
    .unwrap_or(Decimal::ZERO);

    debug!(
        employee_id = employee.id,
        month = period.month,
        year = period.year,
        %advance_total,
        %unpaid_days,
        "Computed period deductions"
    );

    Ok(calculate_period(
        employee.id,
        period,
        salary,
        advance_total,
        unpaid_days,
    ))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum LineOutcome {
    Created,
    Updated,
}

/// A payroll line written by bulk generation.
#[derive(Debug, Serialize, ToSchema)]
pub struct GeneratedLine {
    #[serde(flatten)]
    pub payroll: Payroll,
    pub advance_deduction: Decimal,
    pub unpaid_deduction: Decimal,
    pub outcome: LineOutcome,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GenerationFailure {
    #[schema(example = 7)]
    pub employee_id: u64,
    #[schema(example = "Employee 7 has no salary on record")]
    pub error: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GenerationDetails {
    pub created: Vec<GeneratedLine>,
    pub errors: Vec<GenerationFailure>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GenerationReport {
    #[schema(example = "Payroll generation completed")]
    pub message: String,
    /// Lines inserted by this run
    #[schema(example = 98)]
    pub created: usize,
    /// Existing lines whose deductions were recomputed
    #[schema(example = 2)]
    pub updated: usize,
    #[schema(example = 0)]
    pub errors: usize,
    pub details: GenerationDetails,
}

async fn generate_line(
    pool: &MySqlPool,
    employee: &Employee,
    period: Period,
) -> ApiResult<GeneratedLine> {
    let breakdown = compute_deductions_for_period(pool, employee, period).await?;

    let existed = fetch_period_record(pool, employee.id, period).await?.is_some();

    // Existing lines keep their basic salary and allowances.
    sqlx::query(
        r#"
        INSERT INTO payroll
            (employee_id, month, year, basic_salary, allowances, deductions, net_salary, status)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON DUPLICATE KEY UPDATE
            deductions = VALUES(deductions),
            net_salary = VALUES(net_salary)
        "#,
    )
    .bind(employee.id)
    .bind(period.month)
    .bind(period.year)
    .bind(breakdown.basic_salary)
    .bind(breakdown.allowances)
    .bind(breakdown.deductions)
    .bind(breakdown.net_salary)
    .bind(PayrollStatus::Pending.as_ref())
    .execute(pool)
    .await?;

    let payroll = fetch_period_record(pool, employee.id, period)
        .await?
        .ok_or_else(|| ApiError::internal("Payroll line missing after upsert"))?;

    Ok(GeneratedLine {
        payroll,
        advance_deduction: breakdown.advance_deduction,
        unpaid_deduction: breakdown.unpaid_deduction,
        outcome: if existed {
            LineOutcome::Updated
        } else {
            LineOutcome::Created
        },
    })
}

/// One line per Approved employee. Employees are handled
/// one after another and a failing employee is recorded, not fatal.
pub async fn generate_for_period(pool: &MySqlPool, period: Period) -> ApiResult<GenerationReport> {
    let employees = sqlx::query_as::<_, Employee>(
        "SELECT * FROM employees WHERE status = ? ORDER BY id",
    )
    .bind(STATUS_APPROVED)
    .fetch_all(pool)
    .await?;

    info!(
        month = period.month,
        year = period.year,
        employees = employees.len(),
        "Generating payroll"
    );

    let mut lines = Vec::with_capacity(employees.len());
    let mut failures = Vec::new();

    for employee in &employees {
        match generate_line(pool, employee, period).await {
            Ok(line) => lines.push(line),
            Err(e) => {
                warn!(employee_id = employee.id, error = %e, "Payroll generation failed for employee");
                failures.push(GenerationFailure {
                    employee_id: employee.id,
                    error: e.to_string(),
                });
            }
        }
    }

    let updated = lines
        .iter()
        .filter(|l| l.outcome == LineOutcome::Updated)
        .count();

    info!(
        month = period.month,
        year = period.year,
        created = lines.len() - updated,
        updated,
        errors = failures.len(),
        "Payroll generation completed"
    );

    Ok(GenerationReport {
        message: "Payroll generation completed".to_string(),
        created: lines.len() - updated,
        updated,
        errors: failures.len(),
        details: GenerationDetails {
            created: lines,
            errors: failures,
        },
    })
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NewPayroll {
    #[schema(example = 1)]
    pub employee_id: u64,
    #[schema(example = 3)]
    pub month: i32,
    #[schema(example = 2025)]
    pub year: i32,
    #[schema(value_type = f64, example = 10000.0)]
    pub basic_salary: Decimal,
    #[serde(default)]
    #[schema(value_type = f64, example = 500.0)]
    pub allowances: Decimal,
    #[serde(default)]
    #[schema(value_type = f64, example = 0.0)]
    pub deductions: Decimal,
    #[schema(example = "2025-03-31", value_type = Option<String>, format = "date")]
    pub payment_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedPayroll {
    #[serde(flatten)]
    pub payroll: Payroll,
    /// Active advances added on top of the requested deductions
    pub advance_deduction: Decimal,
}

/// Manual payroll entry. Every Active advance of the employee
/// is charged, whatever period it targets.
pub async fn create_single(pool: &MySqlPool, input: &NewPayroll) -> ApiResult<CreatedPayroll> {
    let period = Period::new(input.month, input.year)?;
    fetch_employee(pool, input.employee_id).await?;

    let advances = sqlx::query_as::<_, SalaryAdvance>(
        "SELECT * FROM salary_advances WHERE employee_id = ? AND status = ?",
    )
    .bind(input.employee_id)
    .bind(AdvanceStatus::Active.as_ref())
    .fetch_all(pool)
    .await?;

    let advance_deduction: Decimal = advances.iter().map(advance_obligation).sum();
    let (deductions, net_salary) = manual_totals(
        input.basic_salary,
        input.allowances,
        input.deductions,
        advance_deduction,
    );

    let result = sqlx::query(
        r#"
        INSERT INTO payroll
            (employee_id, month, year, basic_salary, allowances, deductions, net_salary, status, payment_date)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(input.employee_id)
    .bind(period.month)
    .bind(period.year)
    .bind(input.basic_salary)
    .bind(input.allowances)
    .bind(deductions)
    .bind(net_salary)
    .bind(PayrollStatus::Pending.as_ref())
    .bind(input.payment_date)
    .execute(pool)
    .await
    .map_err(conflict_as(
        "Payroll already exists for this employee and period",
    ))?;

    let payroll = fetch_payroll(pool, result.last_insert_id()).await?;

    info!(
        payroll_id = payroll.id,
        employee_id = payroll.employee_id,
        %advance_deduction,
        "Payroll created"
    );

    Ok(CreatedPayroll {
        payroll,
        advance_deduction,
    })
}

async fn lock_payroll(tx: &mut Transaction<'_, MySql>, payroll_id: u64) -> ApiResult<Payroll> {
    sqlx::query_as::<_, Payroll>("SELECT * FROM payroll WHERE id = ? FOR UPDATE")
        .bind(payroll_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| ApiError::not_found("Payroll record not found"))
}

/// Settles the period's Active advances and marks the record Paid,
/// both in one transaction.
pub async fn process(
    pool: &MySqlPool,
    payroll_id: u64,
    payment_date: Option<NaiveDate>,
) -> ApiResult<Payroll> {
    let mut tx = pool.begin().await?;

    let payroll = lock_payroll(&mut tx, payroll_id).await?;

    let settled = sqlx::query(
        r#"
        UPDATE salary_advances
        SET remaining_amount = 0, status = ?
        WHERE employee_id = ?
        AND month = ?
        AND year = ?
        AND status = ?
        "#,
    )
    .bind(AdvanceStatus::Paid.as_ref())
    .bind(payroll.employee_id)
    .bind(payroll.month)
    .bind(payroll.year)
    .bind(AdvanceStatus::Active.as_ref())
    .execute(&mut *tx)
    .await?
    .rows_affected();

    let payment_date = payment_date.unwrap_or_else(|| Local::now().date_naive());

    sqlx::query("UPDATE payroll SET status = ?, payment_date = ? WHERE id = ?")
        .bind(PayrollStatus::Paid.as_ref())
        .bind(payment_date)
        .bind(payroll_id)
        .execute(&mut *tx)
        .await?;

    let processed = lock_payroll(&mut tx, payroll_id).await?;

    tx.commit().await?;

    info!(
        payroll_id,
        employee_id = processed.employee_id,
        settled_advances = settled,
        %payment_date,
        "Payroll processed"
    );

    Ok(processed)
}

/// Back to Pending without a payment date. Advances settled by
/// `process` stay settled.
pub async fn revert(pool: &MySqlPool, payroll_id: u64) -> ApiResult<Payroll> {
    sqlx::query("UPDATE payroll SET status = ?, payment_date = NULL WHERE id = ?")
        .bind(PayrollStatus::Pending.as_ref())
        .bind(payroll_id)
        .execute(pool)
        .await?;

    let payroll = fetch_payroll(pool, payroll_id).await?;
    info!(payroll_id, "Payroll reverted to pending");
    Ok(payroll)
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AdvancePayment {
    #[schema(example = 1)]
    pub employee_id: u64,
    #[schema(example = 4)]
    pub month: i32,
    #[schema(example = 2025)]
    pub year: i32,
    /// Defaults to the employee's salary
    #[schema(value_type = Option<f64>, example = 10000.0)]
    pub amount: Option<Decimal>,
}

#[derive(Debug)]
pub enum AdvancePaymentOutcome {
    /// A new Paid record was written
    Created(Payroll),
    /// An existing Pending record was marked Paid
    Updated(Payroll),
}

/// Pays a period's salary ahead of the payroll run.
pub async fn pay_in_advance(
    pool: &MySqlPool,
    input: &AdvancePayment,
) -> ApiResult<AdvancePaymentOutcome> {
    let period = Period::new(input.month, input.year)?;
    let today = Local::now().date_naive();

    let mut tx = pool.begin().await?;

    let existing = sqlx::query_as::<_, Payroll>(
        "SELECT * FROM payroll WHERE employee_id = ? AND month = ? AND year = ? FOR UPDATE",
    )
    .bind(input.employee_id)
    .bind(period.month)
    .bind(period.year)
    .fetch_optional(&mut *tx)
    .await?;

    if let Some(record) = existing {
        if record.status == PayrollStatus::Paid.as_ref() {
            return Err(ApiError::invalid("Salary already paid for this month"));
        }

        sqlx::query("UPDATE payroll SET status = ?, payment_date = ? WHERE id = ?")
            .bind(PayrollStatus::Paid.as_ref())
            .bind(today)
            .bind(record.id)
            .execute(&mut *tx)
            .await?;

        let paid = lock_payroll(&mut tx, record.id).await?;
        tx.commit().await?;

        info!(payroll_id = paid.id, employee_id = paid.employee_id, "Pending payroll paid in advance");
        return Ok(AdvancePaymentOutcome::Updated(paid));
    }

    let amount = match input.amount {
        Some(amount) => amount,
        None => {
            let salary = sqlx::query_scalar::<_, Option<Decimal>>(
                "SELECT salary FROM employees WHERE id = ?",
            )
            .bind(input.employee_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| ApiError::not_found("Employee not found"))?;

            salary.ok_or_else(|| {
                ApiError::invalid(format!(
                    "Employee {} has no salary on record",
                    input.employee_id
                ))
            })?
        }
    };

    let result = sqlx::query(
        r#"
        INSERT INTO payroll
            (employee_id, month, year, basic_salary, allowances, deductions, net_salary, status, payment_date)
        VALUES (?, ?, ?, ?, 0, 0, ?, ?, ?)
        "#,
    )
    .bind(input.employee_id)
    .bind(period.month)
    .bind(period.year)
    .bind(amount)
    .bind(amount)
    .bind(PayrollStatus::Paid.as_ref())
    .bind(today)
    .execute(&mut *tx)
    .await
    .map_err(conflict_as(
        "Payroll already exists for this employee and period",
    ))?;

    let paid = lock_payroll(&mut tx, result.last_insert_id()).await?;
    tx.commit().await?;

    info!(payroll_id = paid.id, employee_id = paid.employee_id, %amount, "Salary paid in advance");
    Ok(AdvancePaymentOutcome::Created(paid))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period(month: i32, year: i32) -> Period {
        Period::new(month, year).unwrap()
    }

    fn advance(deduction_type: &str, remaining: Decimal, installment: Option<Decimal>) -> SalaryAdvance {
        SalaryAdvance {
            id: 1,
            employee_id: 1,
            amount: dec!(5000),
            date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            month: 3,
            year: 2025,
            deduction_type: deduction_type.to_string(),
            installment_amount: installment,
            remaining_amount: remaining,
            status: "Active".to_string(),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn period_bounds_cover_the_calendar_month() {
        let feb = period(2, 2024);
        assert_eq!(feb.first_day(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(feb.last_day(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());

        let dec = period(12, 2025);
        assert_eq!(dec.last_day(), NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
    }

    #[test]
    fn period_rejects_bad_month_and_year() {
        assert!(matches!(Period::new(0, 2025), Err(ApiError::InvalidInput(_))));
        assert!(matches!(Period::new(13, 2025), Err(ApiError::InvalidInput(_))));
        assert!(matches!(Period::new(5, 0), Err(ApiError::InvalidInput(_))));
        assert!(matches!(Period::new(5, i32::MAX), Err(ApiError::InvalidInput(_))));
    }

    #[test]
    fn no_deductions_means_net_equals_basic() {
        let b = calculate_period(1, period(3, 2025), dec!(10000), Decimal::ZERO, Decimal::ZERO);
        assert_eq!(b.deductions, Decimal::ZERO);
        assert_eq!(b.net_salary, b.basic_salary + b.allowances);
    }

    #[test]
    fn advance_in_period_is_deducted() {
        let b = calculate_period(1, period(3, 2025), dec!(10000), dec!(2000), Decimal::ZERO);
        assert_eq!(b.advance_deduction, dec!(2000));
        assert_eq!(b.net_salary, dec!(8000));
    }

    #[test]
    fn unpaid_leave_uses_thirty_day_divisor() {
        let b = calculate_period(1, period(2, 2025), dec!(9000), Decimal::ZERO, dec!(3));
        assert_eq!(b.unpaid_deduction, dec!(900));
        assert_eq!(b.net_salary, dec!(8100));
    }

    #[test]
    fn unpaid_deduction_rounds_to_cents() {
        let b = calculate_period(1, period(1, 2025), dec!(10000), Decimal::ZERO, dec!(3));
        assert_eq!(b.unpaid_deduction, dec!(1000.00));

        let b = calculate_period(1, period(1, 2025), dec!(1000), Decimal::ZERO, dec!(1));
        assert_eq!(b.unpaid_deduction, dec!(33.33));
    }

    #[test]
    fn net_salary_may_go_negative() {
        let b = calculate_period(1, period(3, 2025), dec!(1000), dec!(1500), dec!(30));
        assert_eq!(b.deductions, dec!(2500));
        assert_eq!(b.net_salary, dec!(-1500));
    }

    #[test]
    fn full_advance_contributes_remaining_amount() {
        assert_eq!(advance_obligation(&advance("Full", dec!(1200), Some(dec!(100)))), dec!(1200));
    }

    #[test]
    fn installment_advance_is_capped_by_remaining() {
        assert_eq!(
            advance_obligation(&advance("Installment", dec!(1200), Some(dec!(500)))),
            dec!(500)
        );
        assert_eq!(
            advance_obligation(&advance("Installment", dec!(300), Some(dec!(500)))),
            dec!(300)
        );
        assert_eq!(advance_obligation(&advance("Installment", dec!(300), None)), dec!(300));
    }

    #[test]
    fn manual_totals_add_advances_to_requested_deductions() {
        let (deductions, net) = manual_totals(dec!(10000), dec!(500), dec!(250), dec!(1000));
        assert_eq!(deductions, dec!(1250));
        assert_eq!(net, dec!(9250));

        let (deductions, net) = manual_totals(dec!(10000), dec!(500), Decimal::ZERO, Decimal::ZERO);
        assert_eq!(deductions, Decimal::ZERO);
        assert_eq!(net, dec!(10500));
    }
}
