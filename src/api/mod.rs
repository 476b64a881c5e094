use serde::Serialize;
use utoipa::ToSchema;

pub mod admin;
pub mod announcement;
pub mod attendance;
pub mod dashboard;
pub mod department;
pub mod employee;
pub mod health;
pub mod leave_request;
pub mod payroll;
pub mod salary_advance;

#[derive(Debug, Serialize, ToSchema)]
pub struct CountResponse {
    #[schema(example = 12)]
    pub count: i64,
}
