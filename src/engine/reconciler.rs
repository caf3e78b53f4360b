//! Attendance reconciliation.
//!
//! Employees who check in but never check out leave open rows behind.
//! The reconciler closes them with an imputed 18:00 checkout once that
//! cutoff has passed, deriving worked hours and a present/half-day
//! status. The close is conditional on the row still being open, so a
//! checkout that lands mid-pass wins and the reconciler skips the row.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use utoipa::ToSchema;

use crate::model::attendance::AttendanceStatus;
use crate::repo::AttendanceStore;

pub const STANDARD_CHECKOUT_HOUR: u32 = 18;
pub const HALF_DAY_THRESHOLD_HOURS: f64 = 4.0;

pub fn standard_checkout() -> NaiveTime {
    NaiveTime::from_hms_opt(STANDARD_CHECKOUT_HOUR, 0, 0).expect("valid checkout time")
}

/// The values a close-out writes back to an open attendance row.
#[derive(Debug, Clone)]
pub struct Imputed {
    pub check_out: NaiveTime,
    pub hours_worked: f64,
    pub status: AttendanceStatus,
}

#[derive(Debug, Default, Serialize, ToSchema)]
pub struct ReconcileOutcome {
    /// Open rows examined.
    #[schema(example = 12)]
    pub processed: usize,
    /// Rows actually closed this pass.
    #[schema(example = 10)]
    pub updated: usize,
}

/// Hours between check-in and check-out, clamped at zero for sessions
/// that start after the imputed checkout.
pub fn session_hours(check_in: NaiveDateTime, check_out: NaiveDateTime) -> f64 {
    ((check_out - check_in).num_milliseconds() as f64 / 3_600_000.0).max(0.0)
}

pub fn session_status(hours_worked: f64) -> AttendanceStatus {
    if hours_worked >= HALF_DAY_THRESHOLD_HOURS {
        AttendanceStatus::Present
    } else {
        AttendanceStatus::HalfDay
    }
}

/// Decide the imputed close-out for one open row, or None when it is
/// still today and the employee may yet check out normally.
pub fn impute(date: NaiveDate, check_in: NaiveTime, now: NaiveDateTime) -> Option<Imputed> {
    let checkout_at = date.and_time(standard_checkout());
    if date == now.date() && now < checkout_at {
        return None;
    }

    let hours_worked = session_hours(date.and_time(check_in), checkout_at);
    Some(Imputed {
        check_out: standard_checkout(),
        hours_worked,
        status: session_status(hours_worked),
    })
}

/// Close every overdue open attendance row. One failing record is logged
/// and skipped; the batch always runs to completion. Safe to invoke on a
/// schedule: settled rows are excluded by the open-row query, so a
/// repeat pass over the same data updates nothing.
pub async fn reconcile_incomplete<S: AttendanceStore>(
    store: &S,
    now: NaiveDateTime,
) -> ReconcileOutcome {
    let records = match store.open_records(now.date()).await {
        Ok(records) => records,
        Err(e) => {
            tracing::error!(error = %e, "failed to query incomplete attendance");
            return ReconcileOutcome::default();
        }
    };

    let mut outcome = ReconcileOutcome::default();
    for record in records {
        outcome.processed += 1;

        let Some(check_in) = record.check_in else {
            continue;
        };
        let Some(imputed) = impute(record.date, check_in, now) else {
            continue;
        };

        match store.close_out(record.employee_id, record.date, &imputed).await {
            Ok(true) => {
                outcome.updated += 1;
                tracing::info!(
                    employee_id = record.employee_id,
                    date = %record.date,
                    hours_worked = imputed.hours_worked,
                    status = %imputed.status,
                    "imputed missing checkout"
                );
            }
            Ok(false) => {
                // Lost the race against a real checkout.
                tracing::debug!(
                    employee_id = record.employee_id,
                    date = %record.date,
                    "attendance row already closed, skipping"
                );
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    employee_id = record.employee_id,
                    date = %record.date,
                    "failed to close attendance row"
                );
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::Attendance;
    use chrono::NaiveDate;
    use std::sync::Mutex;

    struct MemStore {
        rows: Mutex<Vec<Attendance>>,
    }

    impl MemStore {
        fn new(rows: Vec<Attendance>) -> Self {
            Self {
                rows: Mutex::new(rows),
            }
        }

        fn row(&self, employee_id: u64, date: NaiveDate) -> Attendance {
            self.rows
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.employee_id == employee_id && r.date == date)
                .cloned()
                .unwrap()
        }
    }

    impl AttendanceStore for MemStore {
        async fn open_records(&self, through: NaiveDate) -> Result<Vec<Attendance>, sqlx::Error> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.check_in.is_some() && r.check_out.is_none() && r.date <= through)
                .cloned()
                .collect())
        }

        async fn close_out(
            &self,
            employee_id: u64,
            date: NaiveDate,
            imputed: &Imputed,
        ) -> Result<bool, sqlx::Error> {
            let mut rows = self.rows.lock().unwrap();
            match rows
                .iter_mut()
                .find(|r| r.employee_id == employee_id && r.date == date && r.check_out.is_none())
            {
                Some(row) => {
                    row.check_out = Some(imputed.check_out);
                    row.hours_worked = Some(imputed.hours_worked);
                    row.status = imputed.status.to_string();
                    Ok(true)
                }
                None => Ok(false),
            }
        }
    }

    /// Close-out always loses the race.
    struct RacedStore(MemStore);

    impl AttendanceStore for RacedStore {
        async fn open_records(&self, through: NaiveDate) -> Result<Vec<Attendance>, sqlx::Error> {
            self.0.open_records(through).await
        }

        async fn close_out(
            &self,
            _employee_id: u64,
            _date: NaiveDate,
            _imputed: &Imputed,
        ) -> Result<bool, sqlx::Error> {
            Ok(false)
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, min: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, min, 0).unwrap()
    }

    fn open_row(id: u64, employee_id: u64, on: NaiveDate, check_in: NaiveTime) -> Attendance {
        Attendance {
            id,
            employee_id,
            date: on,
            check_in: Some(check_in),
            check_out: None,
            hours_worked: None,
            status: "present".into(),
        }
    }

    #[actix_web::test]
    async fn todays_row_is_skipped_before_the_cutoff() {
        let today = date(2026, 1, 5);
        let store = MemStore::new(vec![open_row(1, 1001, today, time(9, 0))]);

        let outcome = reconcile_incomplete(&store, today.and_time(time(14, 0))).await;
        assert_eq!(outcome.processed, 1);
        assert_eq!(outcome.updated, 0);
        assert!(store.row(1001, today).check_out.is_none());
    }

    #[actix_web::test]
    async fn todays_row_is_closed_after_the_cutoff() {
        let today = date(2026, 1, 5);
        let store = MemStore::new(vec![open_row(1, 1001, today, time(9, 0))]);

        let outcome = reconcile_incomplete(&store, today.and_time(time(19, 0))).await;
        assert_eq!(outcome.updated, 1);

        let row = store.row(1001, today);
        assert_eq!(row.check_out, Some(time(18, 0)));
        assert_eq!(row.hours_worked, Some(9.0));
        assert_eq!(row.status, "present");
    }

    #[actix_web::test]
    async fn short_session_becomes_half_day() {
        let day = date(2026, 1, 4);
        let store = MemStore::new(vec![open_row(1, 1001, day, time(15, 0))]);

        reconcile_incomplete(&store, date(2026, 1, 5).and_time(time(2, 0))).await;

        let row = store.row(1001, day);
        assert_eq!(row.hours_worked, Some(3.0));
        assert_eq!(row.status, "half_day");
    }

    #[actix_web::test]
    async fn exactly_four_hours_counts_as_present() {
        let day = date(2026, 1, 4);
        let store = MemStore::new(vec![open_row(1, 1001, day, time(14, 0))]);

        reconcile_incomplete(&store, date(2026, 1, 5).and_time(time(2, 0))).await;

        let row = store.row(1001, day);
        assert_eq!(row.hours_worked, Some(4.0));
        assert_eq!(row.status, "present");
    }

    #[actix_web::test]
    async fn check_in_after_cutoff_clamps_hours_at_zero() {
        let day = date(2026, 1, 4);
        let store = MemStore::new(vec![open_row(1, 1001, day, time(19, 30))]);

        reconcile_incomplete(&store, date(2026, 1, 5).and_time(time(2, 0))).await;

        let row = store.row(1001, day);
        assert_eq!(row.hours_worked, Some(0.0));
        assert_eq!(row.status, "half_day");
    }

    #[actix_web::test]
    async fn second_pass_is_a_no_op() {
        let store = MemStore::new(vec![
            open_row(1, 1001, date(2026, 1, 2), time(9, 0)),
            open_row(2, 1002, date(2026, 1, 3), time(10, 30)),
        ]);
        let now = date(2026, 1, 5).and_time(time(1, 0));

        let first = reconcile_incomplete(&store, now).await;
        assert_eq!(first.processed, 2);
        assert_eq!(first.updated, 2);

        let second = reconcile_incomplete(&store, now).await;
        assert_eq!(second.processed, 0);
        assert_eq!(second.updated, 0);
    }

    #[actix_web::test]
    async fn losing_the_checkout_race_is_a_skip_not_an_error() {
        let store = RacedStore(MemStore::new(vec![open_row(
            1,
            1001,
            date(2026, 1, 2),
            time(9, 0),
        )]));

        let outcome = reconcile_incomplete(&store, date(2026, 1, 5).and_time(time(1, 0))).await;
        assert_eq!(outcome.processed, 1);
        assert_eq!(outcome.updated, 0);
    }
}
