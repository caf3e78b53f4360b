use anyhow::Result;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::time::Duration;

use crate::model::payroll_settings::PayrollSettings;

const SETTINGS_KEY: &str = "payroll";

/// Payroll settings are read for every payslip computed, so the
/// singleton row lives behind a small TTL cache.
static SETTINGS_CACHE: Lazy<Cache<&'static str, PayrollSettings>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(8)
        .time_to_live(Duration::from_secs(300)) // 5 min TTL
        .build()
});

/// Read-through fetch of the settings singleton. A missing row falls
/// back to the built-in defaults.
pub async fn get(pool: &MySqlPool) -> Result<PayrollSettings, sqlx::Error> {
    if let Some(settings) = SETTINGS_CACHE.get(SETTINGS_KEY).await {
        return Ok(settings);
    }

    let settings =
        sqlx::query_as::<_, PayrollSettings>("SELECT * FROM payroll_settings WHERE id = 1")
            .fetch_optional(pool)
            .await?
            .unwrap_or_default();

    SETTINGS_CACHE.insert(SETTINGS_KEY, settings.clone()).await;
    Ok(settings)
}

/// Drop the cached row after an update.
pub async fn invalidate() {
    SETTINGS_CACHE.invalidate(SETTINGS_KEY).await;
}

/// Prime the cache at boot so the first payrun does not pay the lookup.
pub async fn warmup(pool: &MySqlPool) -> Result<()> {
    let settings = get(pool).await?;

    log::info!(
        "Payroll settings cache warmup complete: tax {}%, insurance {}%, period {} days",
        settings.tax_rate,
        settings.insurance_rate,
        settings.pay_period_days
    );

    Ok(())
}
