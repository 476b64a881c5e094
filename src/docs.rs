use crate::api::CountResponse;
use crate::api::admin::{MigrationReport, SchemaReport};
use crate::api::attendance::{
    AttendanceListResponse, AttendanceQuery, AttendanceSummary, EmployeeRef, MarkAttendance,
};
use crate::api::dashboard::{
    AttendanceStats, AttendanceToday, AttendanceTrend, DashboardStats, DepartmentShare,
    LeaveStats, LeaveTrend, PayrollStats, Total,
};
use crate::api::department::CreateDepartment;
use crate::api::employee::{CreateEmployee, EmployeeListResponse, EmployeeQuery};
use crate::api::announcement::CreateAnnouncement;
use crate::api::leave_request::{LeaveFilter, LeaveListResponse, LeaveSummary, UpdateLeaveStatus};
use crate::api::payroll::{
    GeneratePayroll, PayrollListResponse, PayrollQuery, PayrollSummary, ProcessPayroll,
};
use crate::api::salary_advance::{AdvanceListResponse, AdvanceQuery, CreateAdvance};
use crate::model::announcement::Announcement;
use crate::model::attendance::{Attendance, AttendanceDetail, AttendanceStatus};
use crate::model::department::{Department, DepartmentWithCount};
use crate::model::employee::{Employee, EmployeeDetail, EmployeeOverview};
use crate::model::leave_request::{LeaveDetail, LeaveRequest, LeaveStatus, LeaveType};
use crate::model::payroll::{Payroll, PayrollDetail, PayrollStatus};
use crate::model::salary_advance::{
    AdvanceStatus, DeductionType, SalaryAdvance, SalaryAdvanceDetail,
};
use crate::schema::ColumnInfo;
use crate::service::leave::NewLeave;
use crate::service::payroll::{
    AdvancePayment, CreatedPayroll, DeductionBreakdown, GeneratedLine, GenerationDetails,
    GenerationFailure, GenerationReport, LineOutcome, NewPayroll,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Employee Management System API",
        version = "1.0.0",
        description = r#"
## Employee Management System (EMS)

Back office API for a small organisation: people, time off, attendance and pay.

### Key Features
- **Employees & Departments**
  - Create, update, list and view employees with department, leave balances and salary
- **Attendance**
  - Mark attendance, daily check-in / check-out, per-day summaries
- **Leave**
  - Leave requests that draw down the employee's casual or sick balance
- **Payroll**
  - Monthly generation with salary-advance and unpaid-leave deductions,
    preview, processing, revert and pay-in-advance
- **Dashboard**
  - Headline counts and trends

### Response Format
- JSON everywhere; errors are `{"error": "..."}`
- Pagination (`page`, `per_page`) on the larger list endpoints

---
Built with **Rust**, **Actix Web**, **SQLx** and **Utoipa**.
"#,
    ),
    paths(
        crate::api::health::health,

        crate::api::employee::list_employees,
        crate::api::employee::get_employee,
        crate::api::employee::create_employee,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,
        crate::api::employee::employee_count,

        crate::api::department::list_departments,
        crate::api::department::get_department,
        crate::api::department::create_department,
        crate::api::department::update_department,
        crate::api::department::delete_department,
        crate::api::department::department_count,

        crate::api::attendance::list_attendance,
        crate::api::attendance::today_attendance,
        crate::api::attendance::mark_attendance,
        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::update_attendance,
        crate::api::attendance::delete_attendance,
        crate::api::attendance::attendance_summary,

        crate::api::leave_request::leave_list,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::create_leave,
        crate::api::leave_request::update_leave_status,
        crate::api::leave_request::update_leave,
        crate::api::leave_request::delete_leave,
        crate::api::leave_request::leave_summary,

        crate::api::payroll::list_payroll,
        crate::api::payroll::get_payroll,
        crate::api::payroll::create_payroll,
        crate::api::payroll::generate_payroll,
        crate::api::payroll::process_payroll,
        crate::api::payroll::revert_payroll,
        crate::api::payroll::payroll_summary,
        crate::api::payroll::preview_payroll,
        crate::api::payroll::pay_in_advance,

        crate::api::salary_advance::list_advances,
        crate::api::salary_advance::create_advance,

        crate::api::announcement::list_announcements,
        crate::api::announcement::get_announcement,
        crate::api::announcement::create_announcement,
        crate::api::announcement::update_announcement,
        crate::api::announcement::delete_announcement,
        crate::api::announcement::announcement_count,

        crate::api::dashboard::dashboard_stats,
        crate::api::dashboard::department_distribution,
        crate::api::dashboard::attendance_trends,
        crate::api::dashboard::leave_trends,

        crate::api::admin::migrate,
        crate::api::admin::check_schema
    ),
    components(
        schemas(
            CountResponse,
            Employee,
            EmployeeDetail,
            EmployeeOverview,
            CreateEmployee,
            EmployeeQuery,
            EmployeeListResponse,
            Department,
            DepartmentWithCount,
            CreateDepartment,
            Attendance,
            AttendanceDetail,
            AttendanceStatus,
            AttendanceQuery,
            AttendanceListResponse,
            MarkAttendance,
            EmployeeRef,
            AttendanceSummary,
            LeaveRequest,
            LeaveDetail,
            LeaveType,
            LeaveStatus,
            NewLeave,
            LeaveFilter,
            LeaveListResponse,
            UpdateLeaveStatus,
            LeaveSummary,
            Payroll,
            PayrollDetail,
            PayrollStatus,
            PayrollQuery,
            PayrollListResponse,
            NewPayroll,
            CreatedPayroll,
            GeneratePayroll,
            GenerationReport,
            GenerationDetails,
            GeneratedLine,
            GenerationFailure,
            LineOutcome,
            ProcessPayroll,
            PayrollSummary,
            DeductionBreakdown,
            AdvancePayment,
            SalaryAdvance,
            SalaryAdvanceDetail,
            DeductionType,
            AdvanceStatus,
            AdvanceQuery,
            AdvanceListResponse,
            CreateAdvance,
            Announcement,
            CreateAnnouncement,
            DashboardStats,
            Total,
            AttendanceStats,
            AttendanceToday,
            LeaveStats,
            PayrollStats,
            DepartmentShare,
            AttendanceTrend,
            LeaveTrend,
            MigrationReport,
            SchemaReport,
            ColumnInfo
        )
    ),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Employee", description = "Employee management APIs"),
        (name = "Department", description = "Department management APIs"),
        (name = "Attendance", description = "Attendance management APIs"),
        (name = "Leave", description = "Leave management APIs"),
        (name = "Payroll", description = "Payroll management APIs"),
        (name = "Salary Advance", description = "Salary advance APIs"),
        (name = "Announcement", description = "Announcement APIs"),
        (name = "Dashboard", description = "Dashboard statistics"),
        (name = "Admin", description = "Schema maintenance"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_payroll_routes() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/api/payroll/generate"));
        assert!(paths.contains_key("/api/payroll/{payroll_id}/process"));
        assert!(paths.contains_key("/api/salary-advances"));
    }
}
