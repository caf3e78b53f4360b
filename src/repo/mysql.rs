use chrono::NaiveDate;
use sqlx::MySqlPool;

use crate::engine::reconciler::Imputed;
use crate::model::attendance::Attendance;
use crate::model::salary_structure::SalaryStructure;
use crate::repo::{AttendanceStore, SalaryStructureStore};

#[derive(Clone)]
pub struct MySqlSalaryStructureStore {
    pool: MySqlPool,
}

impl MySqlSalaryStructureStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

impl SalaryStructureStore for MySqlSalaryStructureStore {
    async fn history(&self, employee_id: u64) -> Result<Vec<SalaryStructure>, sqlx::Error> {
        sqlx::query_as::<_, SalaryStructure>(
            r#"
            SELECT *
            FROM salary_structures
            WHERE employee_id = ?
            ORDER BY effective_from DESC
            "#,
        )
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await
    }
}

#[derive(Clone)]
pub struct MySqlAttendanceStore {
    pool: MySqlPool,
}

impl MySqlAttendanceStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

impl AttendanceStore for MySqlAttendanceStore {
    async fn open_records(&self, through: NaiveDate) -> Result<Vec<Attendance>, sqlx::Error> {
        sqlx::query_as::<_, Attendance>(
            r#"
            SELECT *
            FROM attendance
            WHERE check_in IS NOT NULL
            AND check_out IS NULL
            AND date <= ?
            "#,
        )
        .bind(through)
        .fetch_all(&self.pool)
        .await
    }

    async fn close_out(
        &self,
        employee_id: u64,
        date: NaiveDate,
        imputed: &Imputed,
    ) -> Result<bool, sqlx::Error> {
        // Re-check check_out IS NULL in the predicate so a checkout that
        // raced us is never clobbered.
        let result = sqlx::query(
            r#"
            UPDATE attendance
            SET check_out = ?, hours_worked = ?, status = ?
            WHERE employee_id = ?
            AND date = ?
            AND check_out IS NULL
            "#,
        )
        .bind(imputed.check_out)
        .bind(imputed.hours_worked)
        .bind(imputed.status.to_string())
        .bind(employee_id)
        .bind(date)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
