use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::{debug, error};
use utoipa::{IntoParams, ToSchema};

use crate::error::{ApiError, ApiResult};
use crate::model::employee::STATUS_APPROVED;
use crate::model::payroll::{Payroll, PayrollDetail, PayrollStatus};
use crate::service::payroll::{
    self as engine, AdvancePayment, AdvancePaymentOutcome, CreatedPayroll, DeductionBreakdown,
    GenerationReport, NewPayroll, Period,
};
use crate::utils::db_utils::{Filters, Page, bind_values};

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct PayrollQuery {
    #[schema(example = 1)]
    pub page: Option<u32>,
    #[schema(example = 20)]
    pub per_page: Option<u32>,
    #[schema(example = 3)]
    pub month: Option<i32>,
    #[schema(example = 2025)]
    pub year: Option<i32>,
    /// Pending or Paid
    #[schema(example = "Pending")]
    pub status: Option<PayrollStatus>,
    #[schema(example = 1)]
    pub employee_id: Option<u64>,
    /// Matches employee name or email
    pub search: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct PayrollListResponse {
    pub data: Vec<PayrollDetail>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 42)]
    pub total: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct GeneratePayroll {
    #[schema(example = 3)]
    pub month: i32,
    #[schema(example = 2025)]
    pub year: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProcessPayroll {
    /// Defaults to today
    #[schema(example = "2025-03-31", value_type = Option<String>, format = "date")]
    pub payment_date: Option<NaiveDate>,
}

impl ProcessPayroll {
    /// An empty body means "pay today"; anything else must be valid JSON.
    pub fn from_body(body: &[u8]) -> ApiResult<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self { payment_date: None });
        }
        serde_json::from_slice(body)
            .map_err(|e| ApiError::invalid(format!("Invalid JSON body: {e}")))
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PreviewQuery {
    pub employee_id: u64,
    pub month: i32,
    pub year: i32,
}

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct PayrollSummary {
    /// Sum of basic salary over every payroll line
    #[schema(example = "19000.00")]
    pub total_salaries: Decimal,
    /// Sum of net salary over Pending lines
    #[schema(example = "8000.00")]
    pub pending_salary: Decimal,
    /// Approved employees
    #[schema(example = 2)]
    pub total_employees: i64,
}

const PAYROLL_FROM: &str = r#"
    FROM payroll p
    JOIN employees e ON e.id = p.employee_id
    LEFT JOIN departments d ON d.id = e.department_id
"#;

#[utoipa::path(
    get,
    path = "/api/payroll",
    params(PayrollQuery),
    responses(
        (status = 200, description = "Paginated payroll lines", body = PayrollListResponse),
        (status = 400, description = "Invalid filter")
    ),
    tag = "Payroll"
)]
pub async fn list_payroll(
    pool: web::Data<MySqlPool>,
    query: web::Query<PayrollQuery>,
) -> ApiResult<impl Responder> {
    let page = Page::new(query.page, query.per_page);

    let mut filters = Filters::new();
    filters
        .eq("p.month = ?", query.month)
        .eq("p.year = ?", query.year)
        .eq("p.status = ?", query.status.map(|s| s.to_string()))
        .eq("p.employee_id = ?", query.employee_id)
        .search(&["e.name", "e.email"], query.search.as_deref());
    let where_clause = filters.where_sql();

    let count_sql = format!("SELECT COUNT(*) {PAYROLL_FROM}{where_clause}");
    let total = bind_values!(sqlx::query_scalar::<_, i64>(&count_sql), &filters.values)
        .fetch_one(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to count payroll");
            ApiError::from(e)
        })?;

    let data_sql = format!(
        r#"
        SELECT p.*, e.name AS employee_name, e.email, e.position, d.name AS department_name
        {PAYROLL_FROM}{where_clause}
        ORDER BY p.year DESC, p.month DESC, p.id DESC
        LIMIT ? OFFSET ?
        "#
    );
    debug!(sql = %data_sql, page = page.page, per_page = page.per_page, "Fetching payroll");

    let data = bind_values!(sqlx::query_as::<_, PayrollDetail>(&data_sql), &filters.values)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch payroll");
            ApiError::from(e)
        })?;

    Ok(HttpResponse::Ok().json(PayrollListResponse {
        data,
        page: page.page,
        per_page: page.per_page,
        total,
    }))
}

#[utoipa::path(
    get,
    path = "/api/payroll/{payroll_id}",
    params(("payroll_id", Path, description = "Payroll ID")),
    responses(
        (status = 200, body = PayrollDetail),
        (status = 404, description = "Payroll record not found")
    ),
    tag = "Payroll"
)]
pub async fn get_payroll(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> ApiResult<impl Responder> {
    let payroll_id = path.into_inner();

    let sql = format!(
        r#"
        SELECT p.*, e.name AS employee_name, e.email, e.position, d.name AS department_name
        {PAYROLL_FROM}
        WHERE p.id = ?
        "#
    );
    let payroll = sqlx::query_as::<_, PayrollDetail>(&sql)
        .bind(payroll_id)
        .fetch_optional(pool.get_ref())
        .await?
        .ok_or_else(|| ApiError::not_found("Payroll record not found"))?;

    Ok(HttpResponse::Ok().json(payroll))
}

/// Manual payroll entry
#[utoipa::path(
    post,
    path = "/api/payroll",
    request_body = NewPayroll,
    responses(
        (status = 201, description = "Payroll created; every Active advance was added to the deductions", body = CreatedPayroll),
        (status = 400, description = "Invalid period"),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Payroll already exists for this employee and period")
    ),
    tag = "Payroll"
)]
pub async fn create_payroll(
    pool: web::Data<MySqlPool>,
    payload: web::Json<NewPayroll>,
) -> ApiResult<impl Responder> {
    let created = engine::create_single(pool.get_ref(), &payload)
        .await
        .inspect_err(|e| error!(error = %e, employee_id = payload.employee_id, "Failed to create payroll"))?;

    Ok(HttpResponse::Created().json(created))
}

/// Generate payroll for every approved employee
#[utoipa::path(
    post,
    path = "/api/payroll/generate",
    request_body = GeneratePayroll,
    responses(
        (status = 200, description = "Per-employee outcome of the run", body = GenerationReport),
        (status = 400, description = "Invalid period")
    ),
    tag = "Payroll"
)]
pub async fn generate_payroll(
    pool: web::Data<MySqlPool>,
    payload: web::Json<GeneratePayroll>,
) -> ApiResult<impl Responder> {
    let period = Period::new(payload.month, payload.year)?;
    let report = engine::generate_for_period(pool.get_ref(), period).await?;
    Ok(HttpResponse::Ok().json(report))
}

/// Mark a payroll line Paid and settle the period's advances
#[utoipa::path(
    patch,
    path = "/api/payroll/{payroll_id}/process",
    params(("payroll_id", Path, description = "Payroll ID")),
    request_body(content = ProcessPayroll, description = "Optional payment date"),
    responses(
        (status = 200, description = "Payroll processed", body = Payroll),
        (status = 400, description = "Malformed body or payment_date"),
        (status = 404, description = "Payroll record not found")
    ),
    tag = "Payroll"
)]
pub async fn process_payroll(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Bytes,
) -> ApiResult<impl Responder> {
    let payroll_id = path.into_inner();
    let payment_date = ProcessPayroll::from_body(&body)?.payment_date;

    let payroll = engine::process(pool.get_ref(), payroll_id, payment_date)
        .await
        .inspect_err(|e| error!(error = %e, payroll_id, "Failed to process payroll"))?;

    Ok(HttpResponse::Ok().json(payroll))
}

/// Back to Pending. Settled advances are not restored.
#[utoipa::path(
    patch,
    path = "/api/payroll/{payroll_id}/revert",
    params(("payroll_id", Path, description = "Payroll ID")),
    responses(
        (status = 200, description = "Payroll reverted", body = Payroll),
        (status = 404, description = "Payroll record not found")
    ),
    tag = "Payroll"
)]
pub async fn revert_payroll(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> ApiResult<impl Responder> {
    let payroll = engine::revert(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(payroll))
}

#[utoipa::path(
    get,
    path = "/api/payroll/stats/summary",
    responses((status = 200, body = PayrollSummary)),
    tag = "Payroll"
)]
pub async fn payroll_summary(pool: web::Data<MySqlPool>) -> ApiResult<impl Responder> {
    let summary = sqlx::query_as::<_, PayrollSummary>(
        r#"
        SELECT
            COALESCE(SUM(basic_salary), 0) AS total_salaries,
            COALESCE(SUM(CASE WHEN status = ? THEN net_salary ELSE 0 END), 0) AS pending_salary,
            (SELECT COUNT(*) FROM employees WHERE status = ?) AS total_employees
        FROM payroll
        "#,
    )
    .bind(PayrollStatus::Pending.as_ref())
    .bind(STATUS_APPROVED)
    .fetch_one(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(summary))
}

/// Deductions the next generation run would apply, without writing anything
#[utoipa::path(
    get,
    path = "/api/payroll/preview",
    params(PreviewQuery),
    responses(
        (status = 200, body = DeductionBreakdown),
        (status = 400, description = "Invalid period or employee without salary"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Payroll"
)]
pub async fn preview_payroll(
    pool: web::Data<MySqlPool>,
    query: web::Query<PreviewQuery>,
) -> ApiResult<impl Responder> {
    let period = Period::new(query.month, query.year)?;
    let employee = engine::fetch_employee(pool.get_ref(), query.employee_id).await?;
    let breakdown = engine::compute_deductions_for_period(pool.get_ref(), &employee, period).await?;
    Ok(HttpResponse::Ok().json(breakdown))
}

/// Pay a period's salary ahead of the payroll run
#[utoipa::path(
    post,
    path = "/api/payroll/advance",
    request_body = AdvancePayment,
    responses(
        (status = 201, description = "Paid payroll line created", body = Payroll),
        (status = 200, description = "Pending payroll line marked Paid", body = Payroll),
        (status = 400, description = "Salary already paid for this month"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Payroll"
)]
pub async fn pay_in_advance(
    pool: web::Data<MySqlPool>,
    payload: web::Json<AdvancePayment>,
) -> ApiResult<impl Responder> {
    let outcome = engine::pay_in_advance(pool.get_ref(), &payload).await?;

    Ok(match outcome {
        AdvancePaymentOutcome::Created(payroll) => HttpResponse::Created().json(payroll),
        AdvancePaymentOutcome::Updated(payroll) => HttpResponse::Ok().json(payroll),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_process_body_means_no_date() {
        assert_eq!(ProcessPayroll::from_body(b"").unwrap().payment_date, None);
        assert_eq!(ProcessPayroll::from_body(b"  \n").unwrap().payment_date, None);
        assert_eq!(ProcessPayroll::from_body(b"{}").unwrap().payment_date, None);
    }

    #[test]
    fn process_body_date_is_parsed() {
        let body = ProcessPayroll::from_body(br#"{"payment_date": "2025-03-31"}"#).unwrap();
        assert_eq!(body.payment_date, NaiveDate::from_ymd_opt(2025, 3, 31));
    }

    #[test]
    fn malformed_process_body_is_rejected() {
        for raw in [&br#"{"payment_date": "not-a-date"}"#[..], b"{", b"[]"] {
            assert!(matches!(
                ProcessPayroll::from_body(raw),
                Err(ApiError::InvalidInput(_))
            ));
        }
    }
}
