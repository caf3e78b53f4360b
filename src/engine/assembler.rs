//! Payslip assembly.
//!
//! Combines a resolved salary component set, an attendance-derived
//! payable-day count and the payrun-level deduction rates into one
//! payslip payload. Assembly is per-employee and independent: a failure
//! here never touches any other employee's payslip.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use crate::engine::components::{SalaryComponents, derive_default};
use crate::engine::error::EngineError;
use crate::model::attendance::{Attendance, AttendanceStatus};
use crate::model::employee::Employee;
use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType};
use crate::model::payroll_settings::PayrollSettings;
use crate::model::payrun::Payrun;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WorkedDaysBreakdown {
    /// Calendar days in the pay period.
    #[schema(example = 31)]
    pub total_days: i64,
    /// Days the employee is paid for; half days count 0.5.
    #[schema(example = 22.5)]
    pub payable_days: f64,
    /// Gross amount attributed to the payable days; filled by assembly.
    #[schema(example = 60768.0)]
    pub total_amount: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PayslipEarnings {
    pub base_salary: f64,
    pub overtime: f64,
    pub bonus: f64,
    pub allowances: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PayslipDeductions {
    pub tax: f64,
    pub insurance: f64,
    pub other: f64,
}

/// The computed payslip payload, ready to persist.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PayslipDraft {
    pub employee_id: u64,
    pub payrun_id: u64,
    pub earnings: PayslipEarnings,
    pub deductions: PayslipDeductions,
    pub gross_pay: f64,
    pub total_deductions: f64,
    pub net_pay: f64,
    pub worked_days: WorkedDaysBreakdown,
}

/// Default payable-days policy.
///
/// A calendar day in the period counts 1.0 with a present/late
/// attendance row, 0.5 for a half day, 1.0 when covered by approved paid
/// leave, and 0 for unpaid leave or a day with neither an attendance row
/// nor covering leave.
pub fn compute_worked_days(
    period_start: NaiveDate,
    period_end: NaiveDate,
    attendance: &[Attendance],
    leaves: &[LeaveRequest],
) -> WorkedDaysBreakdown {
    let by_date: HashMap<NaiveDate, AttendanceStatus> = attendance
        .iter()
        .filter_map(|a| {
            AttendanceStatus::from_str(&a.status)
                .ok()
                .map(|s| (a.date, s))
        })
        .collect();

    let approved: Vec<&LeaveRequest> = leaves
        .iter()
        .filter(|l| LeaveStatus::from_str(&l.status) == Ok(LeaveStatus::Approved))
        .collect();

    let mut total_days = 0i64;
    let mut payable_days = 0.0f64;

    let mut day = period_start;
    while day <= period_end {
        total_days += 1;

        let credit = match by_date.get(&day) {
            Some(AttendanceStatus::Present) | Some(AttendanceStatus::Late) => 1.0,
            Some(AttendanceStatus::HalfDay) => 0.5,
            Some(AttendanceStatus::Absent) => 0.0,
            None => {
                let covering = approved
                    .iter()
                    .find(|l| l.start_date <= day && l.end_date >= day);
                match covering {
                    Some(leave) => match LeaveType::from_str(&leave.leave_type) {
                        Ok(kind) if kind.is_paid() => 1.0,
                        _ => 0.0,
                    },
                    // Unexplained absence reduces payable days.
                    None => 0.0,
                }
            }
        };
        payable_days += credit;

        day = match day.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }

    WorkedDaysBreakdown {
        total_days,
        payable_days,
        total_amount: 0.0,
    }
}

/// Assemble one employee's payslip for a payrun.
///
/// The salary basis is the stored structure when one applies, otherwise
/// the default derivation from the employee's flat wage. Having neither
/// is a configuration error, not a silent zero payslip.
pub fn assemble(
    employee: &Employee,
    payrun: &Payrun,
    structure: Option<&SalaryComponents>,
    mut worked: WorkedDaysBreakdown,
    settings: &PayrollSettings,
) -> Result<PayslipDraft, EngineError> {
    let components = match structure {
        Some(c) => c.clone(),
        None if employee.salary > 0.0 => derive_default(employee.salary)?,
        None => {
            return Err(EngineError::Configuration(format!(
                "employee {} has no salary structure and no flat salary",
                employee.id
            )));
        }
    };

    if worked.total_days <= 0 {
        return Err(EngineError::Validation(format!(
            "payrun {} has an empty pay period",
            payrun.id
        )));
    }

    let total_days = worked.total_days as f64;
    let factor = if worked.payable_days < total_days {
        (worked.payable_days / total_days).max(0.0)
    } else {
        1.0
    };

    let earnings = PayslipEarnings {
        base_salary: components.basic_salary * factor,
        overtime: 0.0,
        bonus: components.performance_bonus * factor,
        allowances: (components.house_rent_allowance
            + components.standard_allowance
            + components.travel_allowance
            + components.fixed_allowance)
            * factor,
    };
    let gross_pay =
        earnings.base_salary + earnings.overtime + earnings.bonus + earnings.allowances;

    let deductions = PayslipDeductions {
        tax: gross_pay * settings.tax_rate / 100.0,
        insurance: gross_pay * settings.insurance_rate / 100.0,
        other: components.pf_employee
            + components.professional_tax
            + components.tds
            + components.other_deductions,
    };
    let total_deductions = deductions.tax + deductions.insurance + deductions.other;
    let net_pay = (gross_pay - total_deductions).max(0.0);

    worked.total_amount = gross_pay;

    Ok(PayslipDraft {
        employee_id: employee.id,
        payrun_id: payrun.id,
        earnings,
        deductions,
        gross_pay,
        total_deductions,
        net_pay,
        worked_days: worked,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::payrun::PayrunStatus;
    use crate::model::payslip::PayslipStatus;

    fn close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {expected}, got {actual}"
        );
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn employee(salary: f64) -> Employee {
        Employee {
            id: 1001,
            employee_code: "EMP-1001".into(),
            first_name: "Asha".into(),
            last_name: "Rahman".into(),
            email: "asha@workzen.test".into(),
            phone: None,
            department: "Engineering".into(),
            position: "Engineer".into(),
            hire_date: date(2024, 1, 1),
            status: "active".into(),
            salary,
        }
    }

    fn payrun() -> Payrun {
        Payrun {
            id: 7,
            reference: "PR-test".into(),
            period_start: date(2026, 1, 1),
            period_end: date(2026, 1, 30),
            pay_date: date(2026, 2, 5),
            status: "processing".into(),
            total_employees: 0,
            total_amount: 0.0,
            created_at: None,
        }
    }

    fn settings() -> PayrollSettings {
        PayrollSettings {
            id: 1,
            tax_rate: 5.0,
            insurance_rate: 2.0,
            pay_period_days: 30,
        }
    }

    fn full_period(days: i64) -> WorkedDaysBreakdown {
        WorkedDaysBreakdown {
            total_days: days,
            payable_days: days as f64,
            total_amount: 0.0,
        }
    }

    fn attendance_on(day: NaiveDate, status: &str) -> Attendance {
        Attendance {
            id: 0,
            employee_id: 1001,
            date: day,
            check_in: None,
            check_out: None,
            hours_worked: None,
            status: status.into(),
        }
    }

    fn leave(start: NaiveDate, end: NaiveDate, kind: &str, status: &str) -> LeaveRequest {
        LeaveRequest {
            id: 0,
            employee_id: 1001,
            start_date: start,
            end_date: end,
            leave_type: kind.into(),
            status: status.into(),
            created_at: None,
        }
    }

    #[test]
    fn full_attendance_is_not_prorated() {
        let draft = assemble(
            &employee(75_000.0),
            &payrun(),
            None,
            full_period(30),
            &settings(),
        )
        .unwrap();

        close(draft.earnings.base_salary, 37_500.0);
        close(draft.gross_pay, 83_752.5);
        close(draft.deductions.tax, 4_187.625);
        close(draft.deductions.insurance, 1_675.05);
        close(draft.deductions.other, 4_700.0);
        close(draft.total_deductions, 10_562.675);
        close(draft.net_pay, 73_189.825);
        close(draft.worked_days.total_amount, 83_752.5);
    }

    #[test]
    fn partial_attendance_prorates_every_earning() {
        let worked = WorkedDaysBreakdown {
            total_days: 30,
            payable_days: 15.0,
            total_amount: 0.0,
        };
        let draft = assemble(&employee(75_000.0), &payrun(), None, worked, &settings()).unwrap();

        close(draft.earnings.base_salary, 18_750.0);
        close(draft.gross_pay, 41_876.25);
        // PF and professional tax are not prorated.
        close(draft.deductions.other, 4_700.0);
    }

    #[test]
    fn missing_salary_basis_is_a_configuration_error() {
        let err = assemble(
            &employee(0.0),
            &payrun(),
            None,
            full_period(30),
            &settings(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Configuration(_)));
    }

    #[test]
    fn stored_structure_takes_precedence_over_flat_wage() {
        let structure = derive_default(100_000.0).unwrap();
        let draft = assemble(
            &employee(75_000.0),
            &payrun(),
            Some(&structure),
            full_period(30),
            &settings(),
        )
        .unwrap();

        close(draft.earnings.base_salary, 50_000.0);
    }

    #[test]
    fn payable_days_policy_covers_all_day_kinds() {
        let start = date(2026, 1, 5);
        let end = date(2026, 1, 9);
        let attendance = vec![
            attendance_on(date(2026, 1, 5), "present"),
            attendance_on(date(2026, 1, 6), "half_day"),
        ];
        let leaves = vec![
            leave(date(2026, 1, 7), date(2026, 1, 7), "sick", "approved"),
            leave(date(2026, 1, 8), date(2026, 1, 8), "unpaid", "approved"),
        ];
        // Jan 9 has neither attendance nor leave: unexplained absence.
        let worked = compute_worked_days(start, end, &attendance, &leaves);

        assert_eq!(worked.total_days, 5);
        close(worked.payable_days, 2.5);
    }

    #[test]
    fn pending_leave_does_not_cover_a_day() {
        let worked = compute_worked_days(
            date(2026, 1, 5),
            date(2026, 1, 5),
            &[],
            &[leave(date(2026, 1, 5), date(2026, 1, 5), "annual", "pending")],
        );
        close(worked.payable_days, 0.0);
    }

    #[test]
    fn payrun_status_is_monotonic() {
        assert!(PayrunStatus::Draft.transition(PayrunStatus::Processing).is_ok());
        assert!(
            PayrunStatus::Processing
                .transition(PayrunStatus::Completed)
                .is_ok()
        );
        assert!(
            PayrunStatus::Processing
                .transition(PayrunStatus::Failed)
                .is_ok()
        );

        for (from, to) in [
            (PayrunStatus::Draft, PayrunStatus::Completed),
            (PayrunStatus::Completed, PayrunStatus::Processing),
            (PayrunStatus::Failed, PayrunStatus::Completed),
            (PayrunStatus::Completed, PayrunStatus::Draft),
        ] {
            assert!(matches!(
                from.transition(to),
                Err(EngineError::InvalidTransition { .. })
            ));
        }
    }

    #[test]
    fn validated_payslip_is_terminal() {
        assert!(
            PayslipStatus::Draft
                .transition(PayslipStatus::Computed)
                .is_ok()
        );
        assert!(
            PayslipStatus::Computed
                .transition(PayslipStatus::Validated)
                .is_ok()
        );
        assert!(
            PayslipStatus::Validated
                .transition(PayslipStatus::Computed)
                .is_err()
        );
        assert!(
            PayslipStatus::Draft
                .transition(PayslipStatus::Validated)
                .is_err()
        );
    }
}
