use actix_web::{HttpResponse, Responder, web};
use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::{error, info};
use utoipa::{IntoParams, ToSchema};

use crate::error::{ApiError, ApiResult};
use crate::model::salary_advance::{AdvanceStatus, DeductionType, SalaryAdvance, SalaryAdvanceDetail};
use crate::service::payroll::{Period, fetch_employee};
use crate::utils::db_utils::{Filters, Page, bind_values};

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct AdvanceQuery {
    #[schema(example = 1)]
    pub employee_id: Option<u64>,
    #[schema(example = "Active")]
    pub status: Option<AdvanceStatus>,
    #[schema(example = 3)]
    pub month: Option<i32>,
    #[schema(example = 2025)]
    pub year: Option<i32>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct AdvanceListResponse {
    pub data: Vec<SalaryAdvanceDetail>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 3)]
    pub total: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAdvance {
    #[schema(example = 1)]
    pub employee_id: u64,
    #[schema(value_type = f64, example = 2000.0)]
    pub amount: Decimal,
    /// Payroll month the advance is recovered in
    #[schema(example = 3)]
    pub month: i32,
    #[schema(example = 2025)]
    pub year: i32,
    /// Defaults to Full
    #[schema(example = "Full")]
    pub deduction_type: Option<DeductionType>,
    /// Required for Installment
    #[schema(value_type = Option<f64>, example = 500.0)]
    pub installment_amount: Option<Decimal>,
    /// Defaults to today
    #[schema(example = "2025-03-02", value_type = Option<String>, format = "date")]
    pub date: Option<NaiveDate>,
}

impl CreateAdvance {
    /// Checks the request and returns the period, deduction type and the
    /// installment amount to store.
    pub fn validate(&self) -> ApiResult<(Period, DeductionType, Option<Decimal>)> {
        if self.amount <= Decimal::ZERO {
            return Err(ApiError::invalid("amount must be greater than zero"));
        }
        let period = Period::new(self.month, self.year)?;

        match self.deduction_type.unwrap_or(DeductionType::Full) {
            DeductionType::Full => Ok((period, DeductionType::Full, None)),
            DeductionType::Installment => match self.installment_amount {
                Some(installment) if installment > Decimal::ZERO => {
                    Ok((period, DeductionType::Installment, Some(installment)))
                }
                _ => Err(ApiError::invalid(
                    "installment_amount must be greater than zero for Installment advances",
                )),
            },
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/salary-advances",
    params(AdvanceQuery),
    responses((status = 200, description = "Advances, newest first", body = AdvanceListResponse)),
    tag = "Salary Advance"
)]
pub async fn list_advances(
    pool: web::Data<MySqlPool>,
    query: web::Query<AdvanceQuery>,
) -> ApiResult<impl Responder> {
    let page = Page::new(query.page, query.per_page);

    let mut filters = Filters::new();
    filters
        .eq("sa.employee_id = ?", query.employee_id)
        .eq("sa.status = ?", query.status.map(|s| s.to_string()))
        .eq("sa.month = ?", query.month)
        .eq("sa.year = ?", query.year);
    let where_clause = filters.where_sql();

    let count_sql = format!("SELECT COUNT(*) FROM salary_advances sa{where_clause}");
    let total = bind_values!(sqlx::query_scalar::<_, i64>(&count_sql), &filters.values)
        .fetch_one(pool.get_ref())
        .await?;

    let data_sql = format!(
        r#"
        SELECT sa.*, e.name AS employee_name, d.name AS department_name
        FROM salary_advances sa
        JOIN employees e ON e.id = sa.employee_id
        LEFT JOIN departments d ON d.id = e.department_id
        {where_clause}
        ORDER BY sa.date DESC, sa.id DESC
        LIMIT ? OFFSET ?
        "#
    );
    let data = bind_values!(sqlx::query_as::<_, SalaryAdvanceDetail>(&data_sql), &filters.values)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch salary advances");
            ApiError::from(e)
        })?;

    Ok(HttpResponse::Ok().json(AdvanceListResponse {
        data,
        page: page.page,
        per_page: page.per_page,
        total,
    }))
}

#[utoipa::path(
    post,
    path = "/api/salary-advances",
    request_body = CreateAdvance,
    responses(
        (status = 201, description = "Active advance recorded", body = SalaryAdvance),
        (status = 400, description = "Invalid amount, period or installment"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Salary Advance"
)]
pub async fn create_advance(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateAdvance>,
) -> ApiResult<impl Responder> {
    let (period, deduction_type, installment_amount) = payload.validate()?;
    fetch_employee(pool.get_ref(), payload.employee_id).await?;

    let date = payload.date.unwrap_or_else(|| Local::now().date_naive());

    let result = sqlx::query(
        r#"
        INSERT INTO salary_advances
            (employee_id, amount, date, month, year, deduction_type, installment_amount, remaining_amount, status)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(payload.employee_id)
    .bind(payload.amount)
    .bind(date)
    .bind(period.month)
    .bind(period.year)
    .bind(deduction_type.as_ref())
    .bind(installment_amount)
    .bind(payload.amount)
    .bind(AdvanceStatus::Active.as_ref())
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id = payload.employee_id, "Failed to create salary advance");
        ApiError::from(e)
    })?;

    let advance = sqlx::query_as::<_, SalaryAdvance>("SELECT * FROM salary_advances WHERE id = ?")
        .bind(result.last_insert_id())
        .fetch_one(pool.get_ref())
        .await?;

    info!(
        advance_id = advance.id,
        employee_id = advance.employee_id,
        amount = %advance.amount,
        month = advance.month,
        year = advance.year,
        "Salary advance recorded"
    );

    Ok(HttpResponse::Created().json(advance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn request(deduction_type: Option<DeductionType>, installment: Option<Decimal>) -> CreateAdvance {
        CreateAdvance {
            employee_id: 1,
            amount: dec!(2000),
            month: 3,
            year: 2025,
            deduction_type,
            installment_amount: installment,
            date: None,
        }
    }

    #[test]
    fn full_is_the_default_and_drops_installment() {
        let (period, kind, installment) = request(None, Some(dec!(100))).validate().unwrap();
        assert_eq!((period.month, period.year), (3, 2025));
        assert_eq!(kind, DeductionType::Full);
        assert_eq!(installment, None);
    }

    #[test]
    fn installment_needs_a_positive_amount() {
        assert!(request(Some(DeductionType::Installment), None).validate().is_err());
        assert!(request(Some(DeductionType::Installment), Some(dec!(0))).validate().is_err());

        let (_, kind, installment) = request(Some(DeductionType::Installment), Some(dec!(500)))
            .validate()
            .unwrap();
        assert_eq!(kind, DeductionType::Installment);
        assert_eq!(installment, Some(dec!(500)));
    }

    #[test]
    fn amount_and_period_are_checked() {
        let mut req = request(None, None);
        req.amount = dec!(-1);
        assert!(matches!(req.validate(), Err(ApiError::InvalidInput(_))));

        let mut req = request(None, None);
        req.month = 13;
        assert!(matches!(req.validate(), Err(ApiError::InvalidInput(_))));
    }
}
