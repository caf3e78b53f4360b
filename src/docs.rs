use crate::api::attendance::{AttendanceQuery, CheckInRequest, CheckOutRequest};
use crate::api::employee::{CreateEmployee, DeactivateEmployee, EmployeeListResponse};
use crate::api::leave_request::{CreateLeave, LeaveFilter, LeaveListResponse, LeaveResponse};
use crate::api::payroll::{
    CreatePayrun, PaginatedPayrunResponse, PayrunQuery, ProcessOutcome, UpdatePayslip,
};
use crate::api::salary_structure::{
    ApplicableQuery, CreateSalaryStructure, DeriveRequest, HistoryQuery, RecomputeRequest,
};
use crate::api::settings::UpdatePayrollSettings;
use crate::engine::components::{ComponentField, SalaryComponents};
use crate::engine::reconciler::ReconcileOutcome;
use crate::model::attendance::{Attendance, AttendanceStatus};
use crate::model::employee::{Employee, EmployeeStatus};
use crate::model::leave_request::{LeaveStatus, LeaveType};
use crate::model::payroll_settings::PayrollSettings;
use crate::model::payrun::{Payrun, PayrunStatus};
use crate::model::payslip::{Payslip, PayslipStatus};
use crate::model::salary_structure::SalaryStructure;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "WorkZen API",
        version = "1.0.0",
        description = r#"
## WorkZen HR & Payroll

This API powers **WorkZen**, an HR/payroll management system.

### 🔹 Key Features
- **Employee Management**
  - Create, update, list, and view employee profiles; deactivate instead of delete
- **Attendance Management**
  - Daily check-in and check-out tracking, with scheduled reconciliation of missing checkouts
- **Leave Management**
  - Apply for leave, approve/reject requests, and view leave history
- **Salary Structures**
  - Versioned compensation records with a percentage cascade: edit any amount or percent and the dependent components follow
- **Payroll**
  - Monthly payruns producing one payslip per employee, prorated by attendance-derived payable days

### 📦 Response Format
- JSON-based RESTful responses
- Pagination supported for list endpoints

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::list_employees,
        crate::api::employee::update_employee,
        crate::api::employee::deactivate_employee,

        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::list_attendance,
        crate::api::attendance::reconcile_attendance,

        crate::api::leave_request::leave_list,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::create_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,

        crate::api::salary_structure::create_structure,
        crate::api::salary_structure::derive_components,
        crate::api::salary_structure::recompute_components,
        crate::api::salary_structure::get_applicable,
        crate::api::salary_structure::list_structures,

        crate::api::payroll::create_payrun,
        crate::api::payroll::list_payruns,
        crate::api::payroll::get_payrun,
        crate::api::payroll::process_payrun,
        crate::api::payroll::validate_payrun,
        crate::api::payroll::list_payslips,
        crate::api::payroll::get_payslip,
        crate::api::payroll::update_payslip,

        crate::api::settings::get_settings,
        crate::api::settings::update_settings
    ),
    components(
        schemas(
            Employee,
            EmployeeStatus,
            CreateEmployee,
            DeactivateEmployee,
            EmployeeListResponse,
            Attendance,
            AttendanceStatus,
            CheckInRequest,
            CheckOutRequest,
            AttendanceQuery,
            ReconcileOutcome,
            CreateLeave,
            LeaveFilter,
            LeaveResponse,
            LeaveListResponse,
            LeaveType,
            LeaveStatus,
            SalaryStructure,
            SalaryComponents,
            ComponentField,
            CreateSalaryStructure,
            DeriveRequest,
            RecomputeRequest,
            ApplicableQuery,
            HistoryQuery,
            Payrun,
            PayrunStatus,
            CreatePayrun,
            PayrunQuery,
            PaginatedPayrunResponse,
            ProcessOutcome,
            Payslip,
            PayslipStatus,
            UpdatePayslip,
            PayrollSettings,
            UpdatePayrollSettings
        )
    ),
    tags(
        (name = "Employee", description = "Employee management APIs"),
        (name = "Attendance", description = "Attendance tracking and reconciliation APIs"),
        (name = "Leave", description = "Leave management APIs"),
        (name = "SalaryStructure", description = "Salary structure and component cascade APIs"),
        (name = "Payroll", description = "Payrun and payslip APIs"),
        (name = "Settings", description = "Payroll settings APIs"),
    )
)]
pub struct ApiDoc;
