use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::ToSchema;

use crate::model::payroll_settings::PayrollSettings;
use crate::utils::settings_cache;

#[derive(Deserialize, ToSchema)]
pub struct UpdatePayrollSettings {
    #[schema(example = 5.0)]
    pub tax_rate: Option<f64>,

    #[schema(example = 2.0)]
    pub insurance_rate: Option<f64>,

    #[schema(example = 30)]
    pub pay_period_days: Option<i64>,
}

/// Get payroll settings
#[utoipa::path(
    get,
    path = "/api/v1/settings/payroll",
    responses(
        (status = 200, body = PayrollSettings)
    ),
    tag = "Settings"
)]
pub async fn get_settings(pool: web::Data<MySqlPool>) -> actix_web::Result<impl Responder> {
    let settings = settings_cache::get(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to fetch payroll settings");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(settings))
}

/// Update payroll settings
#[utoipa::path(
    put,
    path = "/api/v1/settings/payroll",
    request_body = UpdatePayrollSettings,
    responses(
        (status = 200, description = "Settings updated", body = PayrollSettings),
        (status = 400, description = "Invalid rate")
    ),
    tag = "Settings"
)]
pub async fn update_settings(
    pool: web::Data<MySqlPool>,
    body: web::Json<UpdatePayrollSettings>,
) -> actix_web::Result<impl Responder> {
    let current = settings_cache::get(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to fetch payroll settings");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let tax_rate = body.tax_rate.unwrap_or(current.tax_rate);
    let insurance_rate = body.insurance_rate.unwrap_or(current.insurance_rate);
    let pay_period_days = body.pay_period_days.unwrap_or(current.pay_period_days);

    if !(0.0..=100.0).contains(&tax_rate) || !(0.0..=100.0).contains(&insurance_rate) {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Rates must be within [0, 100]"
        })));
    }
    if pay_period_days <= 0 {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "pay_period_days must be positive"
        })));
    }

    sqlx::query(
        r#"
        INSERT INTO payroll_settings (id, tax_rate, insurance_rate, pay_period_days)
        VALUES (1, ?, ?, ?)
        ON DUPLICATE KEY UPDATE
            tax_rate = VALUES(tax_rate),
            insurance_rate = VALUES(insurance_rate),
            pay_period_days = VALUES(pay_period_days)
        "#,
    )
    .bind(tax_rate)
    .bind(insurance_rate)
    .bind(pay_period_days)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to update payroll settings");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    settings_cache::invalidate().await;

    Ok(HttpResponse::Ok().json(PayrollSettings {
        id: 1,
        tax_rate,
        insurance_rate,
        pay_period_days,
    }))
}
