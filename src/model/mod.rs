pub mod attendance;
pub mod employee;
pub mod leave_request;
pub mod payroll_settings;
pub mod payrun;
pub mod payslip;
pub mod salary_structure;
