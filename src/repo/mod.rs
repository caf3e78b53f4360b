//! Store traits injected into the payroll core.
//!
//! The engine never touches a pool directly; it sees these traits, wired
//! to MySQL at process startup and to in-memory fakes in tests.

pub mod mysql;

use chrono::NaiveDate;

use crate::engine::reconciler::Imputed;
use crate::model::attendance::Attendance;
use crate::model::salary_structure::SalaryStructure;

/// Read access to an employee's salary structure history.
#[allow(async_fn_in_trait)]
pub trait SalaryStructureStore {
    async fn history(&self, employee_id: u64) -> Result<Vec<SalaryStructure>, sqlx::Error>;
}

/// Attendance rows as seen by the reconciliation job.
#[allow(async_fn_in_trait)]
pub trait AttendanceStore {
    /// Checked-in, never-checked-out rows dated on or before `through`.
    async fn open_records(&self, through: NaiveDate) -> Result<Vec<Attendance>, sqlx::Error>;

    /// Conditionally close a row with an imputed checkout. Returns false
    /// when the row was already closed by a concurrent checkout, in
    /// which case nothing was written.
    async fn close_out(
        &self,
        employee_id: u64,
        date: NaiveDate,
        imputed: &Imputed,
    ) -> Result<bool, sqlx::Error>;
}
