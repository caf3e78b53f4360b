use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::engine::components::SalaryComponents;

/// A versioned compensation record for one employee. Historical rows are
/// never mutated; a superseding row carries a later `effective_from`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct SalaryStructure {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1001)]
    pub employee_id: u64,

    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub effective_from: NaiveDate,

    /// Inclusive end of the validity window. Null = open-ended.
    #[schema(example = json!(null), value_type = Option<String>, format = "date", nullable = true)]
    pub effective_to: Option<NaiveDate>,

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

    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String, nullable = true)]
    pub created_at: Option<DateTime<Utc>>,
}

impl SalaryStructure {
    /// View of the stored row as an engine component set.
    pub fn components(&self) -> SalaryComponents {
        SalaryComponents {
            month_wage: self.month_wage,
            yearly_wage: self.yearly_wage,
            basic_salary: self.basic_salary,
            basic_salary_percent: self.basic_salary_percent,
            house_rent_allowance: self.house_rent_allowance,
            hra_percent: self.hra_percent,
            standard_allowance: self.standard_allowance,
            standard_allowance_percent: self.standard_allowance_percent,
            performance_bonus: self.performance_bonus,
            performance_bonus_percent: self.performance_bonus_percent,
            travel_allowance: self.travel_allowance,
            lta_percent: self.lta_percent,
            fixed_allowance: self.fixed_allowance,
            fixed_allowance_percent: self.fixed_allowance_percent,
            gross_salary: self.gross_salary,
            pf_employee: self.pf_employee,
            pf_employee_percent: self.pf_employee_percent,
            pf_employer: self.pf_employer,
            pf_employer_percent: self.pf_employer_percent,
            professional_tax: self.professional_tax,
            tds: self.tds,
            other_deductions: self.other_deductions,
            total_deductions: self.total_deductions,
            net_salary: self.net_salary,
        }
    }

    /// True when the validity window covers `as_of`.
    pub fn covers(&self, as_of: NaiveDate) -> bool {
        self.effective_from <= as_of && self.effective_to.map_or(true, |to| to >= as_of)
    }
}
