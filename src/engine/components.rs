//! Salary component cascade.
//!
//! A component set keeps every earning/deduction amount paired with a
//! percent of its base: month wage for basic salary and the standard
//! allowance, basic salary for HRA, performance bonus, LTA and PF. The
//! functions here keep both sides of each pair consistent no matter which
//! side was edited, so the API/UI layer stays a thin caller.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::engine::error::EngineError;

/// Default allocation percentages applied when an employee has only a
/// flat monthly wage and no stored structure.
pub const DEFAULT_BASIC_PERCENT: f64 = 50.0;
pub const DEFAULT_HRA_PERCENT: f64 = 50.0;
pub const DEFAULT_STANDARD_PERCENT: f64 = 16.67;
pub const DEFAULT_BONUS_PERCENT: f64 = 8.33;
pub const DEFAULT_LTA_PERCENT: f64 = 8.33;
pub const DEFAULT_FIXED_PERCENT: f64 = 11.67;
pub const DEFAULT_PF_PERCENT: f64 = 12.0;

/// Flat statutory professional tax per month.
pub const PROFESSIONAL_TAX: f64 = 200.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SalaryComponents {
    pub month_wage: f64,
    pub yearly_wage: f64,

    pub basic_salary: f64,
    pub basic_salary_percent: f64,
    pub house_rent_allowance: f64,
    pub hra_percent: f64,
    pub standard_allowance: f64,
    pub standard_allowance_percent: f64,
    pub performance_bonus: f64,
    pub performance_bonus_percent: f64,
    pub travel_allowance: f64,
    pub lta_percent: f64,
    /// Residual allocation: absorbs whatever the other earning
    /// components leave of the month wage, clamped at zero.
    pub fixed_allowance: f64,
    pub fixed_allowance_percent: f64,
    pub gross_salary: f64,

    pub pf_employee: f64,
    pub pf_employee_percent: f64,
    pub pf_employer: f64,
    pub pf_employer_percent: f64,
    pub professional_tax: f64,
    pub tds: f64,
    pub other_deductions: f64,
    pub total_deductions: f64,

    pub net_salary: f64,
}

/// Editable components. `fixed_allowance` is absent on purpose: it is
/// derived as the residual and cannot be set directly.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Display, EnumString, Serialize, Deserialize, ToSchema)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ComponentField {
    MonthWage,
    BasicSalary,
    HouseRentAllowance,
    StandardAllowance,
    PerformanceBonus,
    TravelAllowance,
    PfEmployee,
    PfEmployer,
    ProfessionalTax,
    Tds,
    OtherDeductions,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ComponentEdit {
    Amount(f64),
    Percent(f64),
}

fn percent_of(amount: f64, base: f64) -> f64 {
    if base > 0.0 { amount / base * 100.0 } else { 0.0 }
}

fn valid_amount(field: ComponentField, value: f64) -> Result<f64, EngineError> {
    if !value.is_finite() || value < 0.0 {
        return Err(EngineError::Validation(format!(
            "{field} amount must be a non-negative number, got {value}"
        )));
    }
    Ok(value)
}

fn valid_percent(field: ComponentField, value: f64) -> Result<f64, EngineError> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(EngineError::Validation(format!(
            "{field} percent must be within [0, 100], got {value}"
        )));
    }
    Ok(value)
}

/// Recompute the basic-salary-based pairs from their stored percents and
/// re-derive the residual fixed allowance against the month wage.
fn cascade_from_basic(c: &mut SalaryComponents) {
    c.house_rent_allowance = c.basic_salary * c.hra_percent / 100.0;
    c.performance_bonus = c.basic_salary * c.performance_bonus_percent / 100.0;
    c.travel_allowance = c.basic_salary * c.lta_percent / 100.0;
    c.pf_employee = c.basic_salary * c.pf_employee_percent / 100.0;
    c.pf_employer = c.basic_salary * c.pf_employer_percent / 100.0;

    let allocated = c.basic_salary
        + c.house_rent_allowance
        + c.standard_allowance
        + c.performance_bonus
        + c.travel_allowance;
    c.fixed_allowance = (c.month_wage - allocated).max(0.0);
    c.fixed_allowance_percent = percent_of(c.fixed_allowance, c.month_wage);
}

fn refresh_totals(c: &mut SalaryComponents) {
    c.yearly_wage = c.month_wage * 12.0;
    c.gross_salary = c.basic_salary
        + c.house_rent_allowance
        + c.standard_allowance
        + c.performance_bonus
        + c.travel_allowance
        + c.fixed_allowance;
    c.total_deductions = c.pf_employee + c.professional_tax + c.tds + c.other_deductions;
    c.net_salary = (c.gross_salary - c.total_deductions).max(0.0);
}

/// Derive a full component set from a flat monthly wage using the
/// default allocation percentages. Used whenever an employee has no
/// stored salary structure.
pub fn derive_default(month_wage: f64) -> Result<SalaryComponents, EngineError> {
    let wage = valid_amount(ComponentField::MonthWage, month_wage)?;

    let mut c = SalaryComponents {
        month_wage: wage,
        basic_salary_percent: DEFAULT_BASIC_PERCENT,
        hra_percent: DEFAULT_HRA_PERCENT,
        standard_allowance_percent: DEFAULT_STANDARD_PERCENT,
        performance_bonus_percent: DEFAULT_BONUS_PERCENT,
        lta_percent: DEFAULT_LTA_PERCENT,
        fixed_allowance_percent: DEFAULT_FIXED_PERCENT,
        pf_employee_percent: DEFAULT_PF_PERCENT,
        pf_employer_percent: DEFAULT_PF_PERCENT,
        professional_tax: PROFESSIONAL_TAX,
        ..Default::default()
    };

    c.basic_salary = wage * DEFAULT_BASIC_PERCENT / 100.0;
    c.house_rent_allowance = c.basic_salary * DEFAULT_HRA_PERCENT / 100.0;
    c.standard_allowance = wage * DEFAULT_STANDARD_PERCENT / 100.0;
    c.performance_bonus = c.basic_salary * DEFAULT_BONUS_PERCENT / 100.0;
    c.travel_allowance = c.basic_salary * DEFAULT_LTA_PERCENT / 100.0;
    // The default split intentionally allocates the fixed allowance as a
    // flat share of the wage, not as the residual; gross may exceed the
    // wage. The residual rule applies to subsequent edits.
    c.fixed_allowance = wage * DEFAULT_FIXED_PERCENT / 100.0;
    c.pf_employee = c.basic_salary * DEFAULT_PF_PERCENT / 100.0;
    c.pf_employer = c.basic_salary * DEFAULT_PF_PERCENT / 100.0;

    refresh_totals(&mut c);
    Ok(c)
}

/// Re-derive every amount from the stored percents against a new monthly
/// wage. The fixed allowance becomes the residual of the wage after the
/// other earning components.
pub fn recompute_from_wage(
    current: &SalaryComponents,
    new_wage: f64,
) -> Result<SalaryComponents, EngineError> {
    let mut next = current.clone();
    next.month_wage = valid_amount(ComponentField::MonthWage, new_wage)?;

    next.basic_salary = next.month_wage * next.basic_salary_percent / 100.0;
    next.standard_allowance = next.month_wage * next.standard_allowance_percent / 100.0;
    cascade_from_basic(&mut next);
    refresh_totals(&mut next);
    Ok(next)
}

/// Apply a single-field edit, keeping the amount/percent pair consistent
/// and cascading where the edited field is a base for others.
///
/// On a validation error the input set is untouched; callers keep their
/// prior state.
pub fn recompute_from_component(
    current: &SalaryComponents,
    field: ComponentField,
    edit: ComponentEdit,
) -> Result<SalaryComponents, EngineError> {
    use ComponentEdit::{Amount, Percent};
    use ComponentField as F;

    let mut next = current.clone();

    match (field, edit) {
        (F::MonthWage, Amount(wage)) => return recompute_from_wage(current, wage),
        (F::MonthWage, Percent(_)) => {
            return Err(EngineError::Validation(
                "month_wage is a flat amount and has no percent form".into(),
            ));
        }

        (F::BasicSalary, Amount(amount)) => {
            next.basic_salary = valid_amount(field, amount)?;
            next.basic_salary_percent = percent_of(next.basic_salary, next.month_wage);
            cascade_from_basic(&mut next);
        }
        (F::BasicSalary, Percent(pct)) => {
            next.basic_salary_percent = valid_percent(field, pct)?;
            next.basic_salary = next.month_wage * next.basic_salary_percent / 100.0;
            cascade_from_basic(&mut next);
        }

        (F::HouseRentAllowance, Amount(amount)) => {
            next.house_rent_allowance = valid_amount(field, amount)?;
            next.hra_percent = percent_of(next.house_rent_allowance, next.basic_salary);
        }
        (F::HouseRentAllowance, Percent(pct)) => {
            next.hra_percent = valid_percent(field, pct)?;
            next.house_rent_allowance = next.basic_salary * next.hra_percent / 100.0;
        }

        (F::StandardAllowance, Amount(amount)) => {
            next.standard_allowance = valid_amount(field, amount)?;
            next.standard_allowance_percent = percent_of(next.standard_allowance, next.month_wage);
        }
        (F::StandardAllowance, Percent(pct)) => {
            next.standard_allowance_percent = valid_percent(field, pct)?;
            next.standard_allowance = next.month_wage * next.standard_allowance_percent / 100.0;
        }

        (F::PerformanceBonus, Amount(amount)) => {
            next.performance_bonus = valid_amount(field, amount)?;
            next.performance_bonus_percent = percent_of(next.performance_bonus, next.basic_salary);
        }
        (F::PerformanceBonus, Percent(pct)) => {
            next.performance_bonus_percent = valid_percent(field, pct)?;
            next.performance_bonus = next.basic_salary * next.performance_bonus_percent / 100.0;
        }

        (F::TravelAllowance, Amount(amount)) => {
            next.travel_allowance = valid_amount(field, amount)?;
            next.lta_percent = percent_of(next.travel_allowance, next.basic_salary);
        }
        (F::TravelAllowance, Percent(pct)) => {
            next.lta_percent = valid_percent(field, pct)?;
            next.travel_allowance = next.basic_salary * next.lta_percent / 100.0;
        }

        (F::PfEmployee, Amount(amount)) => {
            next.pf_employee = valid_amount(field, amount)?;
            next.pf_employee_percent = percent_of(next.pf_employee, next.basic_salary);
        }
        (F::PfEmployee, Percent(pct)) => {
            next.pf_employee_percent = valid_percent(field, pct)?;
            next.pf_employee = next.basic_salary * next.pf_employee_percent / 100.0;
        }

        (F::PfEmployer, Amount(amount)) => {
            next.pf_employer = valid_amount(field, amount)?;
            next.pf_employer_percent = percent_of(next.pf_employer, next.basic_salary);
        }
        (F::PfEmployer, Percent(pct)) => {
            next.pf_employer_percent = valid_percent(field, pct)?;
            next.pf_employer = next.basic_salary * next.pf_employer_percent / 100.0;
        }

        (F::ProfessionalTax, Amount(amount)) => {
            next.professional_tax = valid_amount(field, amount)?;
        }
        (F::Tds, Amount(amount)) => {
            next.tds = valid_amount(field, amount)?;
        }
        (F::OtherDeductions, Amount(amount)) => {
            next.other_deductions = valid_amount(field, amount)?;
        }
        (F::ProfessionalTax | F::Tds | F::OtherDeductions, Percent(_)) => {
            return Err(EngineError::Validation(format!(
                "{field} is a flat amount and has no percent form"
            )));
        }
    }

    refresh_totals(&mut next);
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn default_derivation_matches_worked_example() {
        let c = derive_default(75_000.0).unwrap();

        close(c.basic_salary, 37_500.0);
        close(c.house_rent_allowance, 18_750.0);
        close(c.standard_allowance, 12_502.5);
        close(c.performance_bonus, 3_123.75);
        close(c.travel_allowance, 3_123.75);
        close(c.fixed_allowance, 8_752.5);
        close(c.gross_salary, 83_752.5);
        close(c.pf_employee, 4_500.0);
        close(c.pf_employer, 4_500.0);
        close(c.professional_tax, 200.0);
        close(c.total_deductions, 4_700.0);
        close(c.net_salary, 79_052.5);
        close(c.yearly_wage, 900_000.0);
    }

    #[test]
    fn gross_is_sum_of_earning_components() {
        for wage in [1.0, 42_000.0, 75_000.0, 123_456.78] {
            let c = derive_default(wage).unwrap();
            let sum = c.basic_salary
                + c.house_rent_allowance
                + c.standard_allowance
                + c.performance_bonus
                + c.travel_allowance
                + c.fixed_allowance;
            close(c.gross_salary, sum);
        }
    }

    #[test]
    fn amount_and_percent_edits_round_trip() {
        let base = derive_default(60_000.0).unwrap();

        let edited = recompute_from_component(
            &base,
            ComponentField::HouseRentAllowance,
            ComponentEdit::Amount(20_000.0),
        )
        .unwrap();
        let back = recompute_from_component(
            &edited,
            ComponentField::HouseRentAllowance,
            ComponentEdit::Percent(edited.hra_percent),
        )
        .unwrap();

        close(back.house_rent_allowance, 20_000.0);
        close(back.hra_percent, edited.hra_percent);
    }

    #[test]
    fn wage_edit_keeps_existing_percents() {
        let base = derive_default(75_000.0).unwrap();
        let next = recompute_from_wage(&base, 90_000.0).unwrap();

        close(next.basic_salary, 45_000.0);
        close(next.house_rent_allowance, 22_500.0);
        close(next.standard_allowance, 15_003.0);
        close(next.pf_employee, 5_400.0);
        close(next.basic_salary_percent, 50.0);
        close(next.hra_percent, 50.0);
        close(next.yearly_wage, 1_080_000.0);
    }

    #[test]
    fn wage_edit_turns_fixed_allowance_into_residual() {
        let base = derive_default(75_000.0).unwrap();
        let next = recompute_from_wage(&base, 90_000.0).unwrap();

        // Default percents allocate the full wage before the residual,
        // so the fixed allowance collapses to zero on recompute.
        let allocated = next.basic_salary
            + next.house_rent_allowance
            + next.standard_allowance
            + next.performance_bonus
            + next.travel_allowance;
        close(next.fixed_allowance, (90_000.0f64 - allocated).max(0.0));
        assert!(next.fixed_allowance >= 0.0);
    }

    #[test]
    fn residual_is_clamped_at_zero() {
        let base = derive_default(50_000.0).unwrap();
        let next = recompute_from_component(
            &base,
            ComponentField::BasicSalary,
            ComponentEdit::Percent(90.0),
        )
        .unwrap();

        assert_eq!(next.fixed_allowance, 0.0);
        assert_eq!(next.fixed_allowance_percent, 0.0);
        // The clamp means gross no longer conserves the wage.
        assert!(next.gross_salary > next.month_wage);
    }

    #[test]
    fn basic_salary_edit_cascades_to_dependents() {
        let base = derive_default(75_000.0).unwrap();
        let next = recompute_from_component(
            &base,
            ComponentField::BasicSalary,
            ComponentEdit::Amount(30_000.0),
        )
        .unwrap();

        close(next.basic_salary_percent, 40.0);
        close(next.house_rent_allowance, 15_000.0);
        close(next.performance_bonus, 30_000.0 * 8.33 / 100.0);
        close(next.pf_employee, 3_600.0);
        close(next.pf_employer, 3_600.0);
    }

    #[test]
    fn out_of_range_percent_is_rejected() {
        let base = derive_default(75_000.0).unwrap();
        let err = recompute_from_component(
            &base,
            ComponentField::HouseRentAllowance,
            ComponentEdit::Percent(120.0),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn negative_amount_is_rejected() {
        let base = derive_default(75_000.0).unwrap();
        let err = recompute_from_component(
            &base,
            ComponentField::StandardAllowance,
            ComponentEdit::Amount(-1.0),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));

        assert!(derive_default(-5.0).is_err());
    }

    #[test]
    fn flat_fields_have_no_percent_form() {
        let base = derive_default(75_000.0).unwrap();
        for field in [
            ComponentField::ProfessionalTax,
            ComponentField::Tds,
            ComponentField::OtherDeductions,
            ComponentField::MonthWage,
        ] {
            let err =
                recompute_from_component(&base, field, ComponentEdit::Percent(10.0)).unwrap_err();
            assert!(matches!(err, EngineError::Validation(_)), "{field}");
        }
    }

    #[test]
    fn net_salary_never_goes_negative() {
        let c = derive_default(0.0).unwrap();
        assert_eq!(c.gross_salary, 0.0);
        close(c.professional_tax, 200.0);
        assert_eq!(c.net_salary, 0.0);
    }

    #[test]
    fn month_wage_edit_routes_through_wage_recompute() {
        let base = derive_default(75_000.0).unwrap();
        let via_component = recompute_from_component(
            &base,
            ComponentField::MonthWage,
            ComponentEdit::Amount(90_000.0),
        )
        .unwrap();
        let direct = recompute_from_wage(&base, 90_000.0).unwrap();
        assert_eq!(via_component, direct);
    }
}
