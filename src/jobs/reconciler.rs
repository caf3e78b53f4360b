use std::time::Duration;

use chrono::Local;
use sqlx::MySqlPool;
use tracing::info;

use crate::engine::reconciler::reconcile_incomplete;
use crate::repo::mysql::MySqlAttendanceStore;

/// Recurring attendance reconciliation. Each tick closes out overdue
/// open rows; the pass is idempotent, so an overlapping or retried tick
/// is harmless.
pub async fn run_schedule(pool: MySqlPool, interval_secs: u64) {
    let store = MySqlAttendanceStore::new(pool);

    loop {
        actix_web::rt::time::sleep(Duration::from_secs(interval_secs)).await;

        let now = Local::now().naive_local();
        let outcome = reconcile_incomplete(&store, now).await;

        info!(
            processed = outcome.processed,
            updated = outcome.updated,
            "attendance reconciliation pass complete"
        );
    }
}
