use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::MySqlPool;
use std::str::FromStr;

use crate::error::{ApiError, ApiResult};

/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    String(String),
    I64(i64),
    U64(u64),
    Decimal(Decimal),
    Bool(bool),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    Null,
}

/// Binds every `SqlValue` in order onto a `query`, `query_as` or
/// `query_scalar` builder.
macro_rules! bind_values {
    ($query:expr, $values:expr) => {{
        use $crate::utils::db_utils::SqlValue;
        let mut query = $query;
        for value in $values {
            query = match value {
                SqlValue::String(v) => query.bind(v.clone()),
                SqlValue::I64(v) => query.bind(*v),
                SqlValue::U64(v) => query.bind(*v),
                SqlValue::Decimal(v) => query.bind(*v),
                SqlValue::Bool(v) => query.bind(*v),
                SqlValue::Date(v) => query.bind(*v),
                SqlValue::Time(v) => query.bind(*v),
                SqlValue::DateTime(v) => query.bind(*v),
                SqlValue::Null => query.bind(None::<String>),
            };
        }
        query
    }};
}
pub(crate) use bind_values;

/// ===============================
/// SQL update container
/// ===============================
#[derive(Debug)]
pub struct SqlUpdate {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

/// ===============================
/// Build dynamic UPDATE SQL
/// ===============================
///
/// Only keys listed in `allowed` may appear in the payload; they are the
/// only text interpolated into the statement.
pub fn build_update_sql(
    table: &str,
    payload: &Value,
    id_column: &str,
    id_value: u64,
    allowed: &[&str],
) -> ApiResult<SqlUpdate> {
    let obj = payload
        .as_object()
        .ok_or_else(|| ApiError::invalid("Payload must be a JSON object"))?;

    if obj.is_empty() {
        return Err(ApiError::invalid("No fields provided for update"));
    }

    if let Some(unknown) = obj.keys().find(|k| !allowed.contains(&k.as_str())) {
        return Err(ApiError::invalid(format!("Field '{unknown}' cannot be updated")));
    }

    // Build SET clause
    let set_clause = obj
        .keys()
        .map(|k| format!("{} = ?", k))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!("UPDATE {} SET {} WHERE {} = ?", table, set_clause, id_column);

    let mut values = Vec::with_capacity(obj.len() + 1);

    // Convert JSON values → SqlValue
    for value in obj.values() {
        values.push(json_to_sql(value)?);
    }

    // WHERE id = ?
    values.push(SqlValue::U64(id_value));

    Ok(SqlUpdate { sql, values })
}

/// Rejects a payload whose `field` is present but does not parse as `E`.
pub fn check_enum_field<E: FromStr>(payload: &Value, field: &str) -> ApiResult<()> {
    match payload.get(field) {
        None | Some(Value::Null) => Ok(()),
        Some(Value::String(s)) if s.parse::<E>().is_ok() => Ok(()),
        Some(other) => Err(ApiError::invalid(format!("Invalid {field}: {other}"))),
    }
}

fn json_to_sql(value: &Value) -> ApiResult<SqlValue> {
    Ok(match value {
        Value::String(s) => {
            if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                SqlValue::Date(d)
            } else if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
                SqlValue::DateTime(dt)
            } else if let Ok(t) = NaiveTime::parse_from_str(s, "%H:%M:%S") {
                SqlValue::Time(t)
            } else {
                SqlValue::String(s.clone())
            }
        }
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                SqlValue::I64(i)
            } else if let Some(u) = n.as_u64() {
                SqlValue::U64(u)
            } else {
                Decimal::from_str(&n.to_string())
                    .map(SqlValue::Decimal)
                    .map_err(|_| ApiError::invalid(format!("Invalid number: {n}")))?
            }
        }
        Value::Bool(b) => SqlValue::Bool(*b),
        Value::Null => SqlValue::Null,
        _ => return Err(ApiError::invalid("Unsupported JSON value type")),
    })
}

/// ===============================
/// Execute the update
/// ===============================
pub async fn execute_update(pool: &MySqlPool, update: SqlUpdate) -> Result<u64, sqlx::Error> {
    let query = bind_values!(sqlx::query(&update.sql), &update.values);
    let result = query.execute(pool).await?;
    Ok(result.rows_affected())
}

/// ===============================
/// Dynamic WHERE clause
/// ===============================
#[derive(Debug, Default)]
pub struct Filters {
    conditions: Vec<String>,
    pub values: Vec<SqlValue>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `condition` (with a single `?`) when `value` is present.
    pub fn eq<T: Into<SqlValue>>(&mut self, condition: &str, value: Option<T>) -> &mut Self {
        if let Some(v) = value {
            self.conditions.push(condition.to_string());
            self.values.push(v.into());
        }
        self
    }

    /// Adds a `LIKE %term%` match across `columns`, OR-ed together.
    pub fn search(&mut self, columns: &[&str], term: Option<&str>) -> &mut Self {
        let Some(term) = term.map(str::trim).filter(|t| !t.is_empty()) else {
            return self;
        };
        let like = format!("%{}%", term);
        let clause = columns
            .iter()
            .map(|c| format!("{} LIKE ?", c))
            .collect::<Vec<_>>()
            .join(" OR ");
        self.conditions.push(format!("({})", clause));
        for _ in columns {
            self.values.push(SqlValue::String(like.clone()));
        }
        self
    }

    pub fn where_sql(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.conditions.join(" AND "))
        }
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::String(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::String(v.to_string())
    }
}

impl From<u64> for SqlValue {
    fn from(v: u64) -> Self {
        SqlValue::U64(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::I64(v.into())
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(v: NaiveDate) -> Self {
        SqlValue::Date(v)
    }
}

/// ===============================
/// Pagination
/// ===============================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub per_page: u32,
}

impl Page {
    pub fn new(page: Option<u32>, per_page: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(20).clamp(1, 100),
        }
    }

    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }

    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.per_page as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    const EMPLOYEE_COLUMNS: &[&str] = &["name", "salary", "hire_date", "phone"];

    #[test]
    fn update_sql_binds_values_then_id() {
        let payload = json!({ "name": "Mohan", "salary": 9500.5, "hire_date": "2022-06-20" });
        let update = build_update_sql("employees", &payload, "id", 7, EMPLOYEE_COLUMNS).unwrap();

        assert!(update.sql.starts_with("UPDATE employees SET "));
        assert!(update.sql.ends_with(" WHERE id = ?"));
        assert_eq!(update.values.len(), 4);
        assert!(update.values.contains(&SqlValue::Decimal(dec!(9500.5))));
        assert!(update.values.contains(&SqlValue::Date(
            NaiveDate::from_ymd_opt(2022, 6, 20).unwrap()
        )));
        assert_eq!(update.values.last(), Some(&SqlValue::U64(7)));
    }

    #[test]
    fn update_sql_rejects_columns_outside_whitelist() {
        let payload = json!({ "id = 1; DROP TABLE employees; --": 1 });
        let err = build_update_sql("employees", &payload, "id", 1, EMPLOYEE_COLUMNS).unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }

    #[test]
    fn update_sql_rejects_empty_and_non_objects() {
        assert!(build_update_sql("employees", &json!({}), "id", 1, EMPLOYEE_COLUMNS).is_err());
        assert!(build_update_sql("employees", &json!([1]), "id", 1, EMPLOYEE_COLUMNS).is_err());
    }

    #[test]
    fn null_clears_a_column() {
        let update =
            build_update_sql("employees", &json!({ "phone": null }), "id", 1, EMPLOYEE_COLUMNS)
                .unwrap();
        assert_eq!(update.values[0], SqlValue::Null);
    }

    #[test]
    fn enum_fields_are_checked_only_when_present() {
        use crate::model::leave_request::LeaveStatus;

        assert!(check_enum_field::<LeaveStatus>(&json!({ "reason": "x" }), "status").is_ok());
        assert!(check_enum_field::<LeaveStatus>(&json!({ "status": "Approved" }), "status").is_ok());
        assert!(check_enum_field::<LeaveStatus>(&json!({ "status": "Done" }), "status").is_err());
        assert!(check_enum_field::<LeaveStatus>(&json!({ "status": 1 }), "status").is_err());
    }

    #[test]
    fn filters_join_conditions_in_order() {
        let mut filters = Filters::new();
        filters
            .eq("p.month = ?", Some(3))
            .eq::<u64>("p.employee_id = ?", None)
            .search(&["e.name", "e.email"], Some(" kumar "));

        assert_eq!(
            filters.where_sql(),
            " WHERE p.month = ? AND (e.name LIKE ? OR e.email LIKE ?)"
        );
        assert_eq!(filters.values.len(), 3);
        assert_eq!(filters.values[1], SqlValue::String("%kumar%".into()));
    }

    #[test]
    fn blank_search_is_ignored() {
        let mut filters = Filters::new();
        filters.search(&["name"], Some("   "));
        assert_eq!(filters.where_sql(), "");
    }

    #[test]
    fn page_is_clamped() {
        let page = Page::new(Some(0), Some(1000));
        assert_eq!(page, Page { page: 1, per_page: 100 });
        assert_eq!(page.offset(), 0);
        assert_eq!(Page::new(Some(3), Some(10)).offset(), 20);
    }
}
