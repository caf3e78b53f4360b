//! Salary structure resolution.
//!
//! Among an employee's structure rows whose validity window covers the
//! as-of date, the one with the latest `effective_from` wins. Windows
//! are not required to be non-overlapping; superseding a structure means
//! inserting a newer row, and historical rows stay untouched for audit.

use chrono::NaiveDate;

use crate::model::salary_structure::SalaryStructure;
use crate::repo::SalaryStructureStore;

/// Most-recent-applicable-wins selection over validity windows.
pub fn select_applicable(
    rows: &[SalaryStructure],
    as_of: NaiveDate,
) -> Option<&SalaryStructure> {
    rows.iter()
        .filter(|s| s.covers(as_of))
        .max_by_key(|s| s.effective_from)
}

/// Find the structure applicable to `employee_id` on `as_of`.
///
/// Pure read; returns None when the employee has no covering structure,
/// in which case the caller falls back to the default derivation from
/// the flat wage.
pub async fn resolve<S: SalaryStructureStore>(
    store: &S,
    employee_id: u64,
    as_of: NaiveDate,
) -> Result<Option<SalaryStructure>, sqlx::Error> {
    let rows = store.history(employee_id).await?;
    Ok(select_applicable(&rows, as_of).cloned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::components::derive_default;

    fn structure(
        id: u64,
        effective_from: NaiveDate,
        effective_to: Option<NaiveDate>,
    ) -> SalaryStructure {
        let c = derive_default(50_000.0).unwrap();
        SalaryStructure {
            id,
            employee_id: 1001,
            effective_from,
            effective_to,
            month_wage: c.month_wage,
            yearly_wage: c.yearly_wage,
            basic_salary: c.basic_salary,
            basic_salary_percent: c.basic_salary_percent,
            house_rent_allowance: c.house_rent_allowance,
            hra_percent: c.hra_percent,
            standard_allowance: c.standard_allowance,
            standard_allowance_percent: c.standard_allowance_percent,
            performance_bonus: c.performance_bonus,
            performance_bonus_percent: c.performance_bonus_percent,
            travel_allowance: c.travel_allowance,
            lta_percent: c.lta_percent,
            fixed_allowance: c.fixed_allowance,
            fixed_allowance_percent: c.fixed_allowance_percent,
            gross_salary: c.gross_salary,
            pf_employee: c.pf_employee,
            pf_employee_percent: c.pf_employee_percent,
            pf_employer: c.pf_employer,
            pf_employer_percent: c.pf_employer_percent,
            professional_tax: c.professional_tax,
            tds: c.tds,
            other_deductions: c.other_deductions,
            total_deductions: c.total_deductions,
            net_salary: c.net_salary,
            created_at: None,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn latest_effective_from_not_exceeding_as_of_wins() {
        let rows = vec![
            structure(1, date(2026, 1, 1), None),
            structure(2, date(2026, 3, 1), None),
        ];

        assert_eq!(select_applicable(&rows, date(2026, 2, 15)).unwrap().id, 1);
        assert_eq!(select_applicable(&rows, date(2026, 4, 1)).unwrap().id, 2);
    }

    #[test]
    fn no_structure_before_first_effective_date() {
        let rows = vec![structure(1, date(2026, 1, 1), None)];
        assert!(select_applicable(&rows, date(2025, 12, 31)).is_none());
    }

    #[test]
    fn closed_window_excludes_later_dates() {
        let rows = vec![
            structure(1, date(2026, 1, 1), Some(date(2026, 6, 30))),
            structure(2, date(2026, 9, 1), None),
        ];

        assert_eq!(select_applicable(&rows, date(2026, 6, 30)).unwrap().id, 1);
        assert!(select_applicable(&rows, date(2026, 7, 15)).is_none());
        assert_eq!(select_applicable(&rows, date(2026, 9, 1)).unwrap().id, 2);
    }

    #[test]
    fn overlapping_windows_prefer_later_effective_from() {
        let rows = vec![
            structure(1, date(2026, 1, 1), Some(date(2026, 12, 31))),
            structure(2, date(2026, 6, 1), None),
        ];
        assert_eq!(select_applicable(&rows, date(2026, 8, 1)).unwrap().id, 2);
    }
}
