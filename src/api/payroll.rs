use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::api::engine_error_response;
use crate::engine::assembler::{self, PayslipDraft};
use crate::engine::resolver;
use crate::model::attendance::Attendance;
use crate::model::employee::Employee;
use crate::model::leave_request::LeaveRequest;
use crate::model::payroll_settings::PayrollSettings;
use crate::model::payrun::{Payrun, PayrunStatus};
use crate::model::payslip::Payslip;
use crate::repo::mysql::MySqlSalaryStructureStore;
use crate::utils::settings_cache;

#[derive(Deserialize, ToSchema)]
pub struct CreatePayrun {
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub period_start: NaiveDate,

    #[schema(example = "2026-01-31", format = "date", value_type = String)]
    pub period_end: NaiveDate,

    #[schema(example = "2026-02-05", format = "date", value_type = String)]
    pub pay_date: NaiveDate,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct PayrunQuery {
    #[schema(example = 1)]
    pub page: Option<u32>,

    #[schema(example = 10)]
    pub per_page: Option<u32>,

    #[schema(example = "completed")]
    pub status: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedPayrunResponse {
    pub data: Vec<Payrun>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

#[derive(Serialize, ToSchema)]
pub struct ProcessOutcome {
    #[schema(example = "Payrun processed")]
    pub message: String,
    #[schema(example = 7)]
    pub payrun_id: u64,
    #[schema(example = "completed")]
    pub status: String,
    #[schema(example = 40)]
    pub succeeded: usize,
    #[schema(example = 2)]
    pub failed: usize,
    #[schema(example = 2953000.5)]
    pub total_amount: f64,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdatePayslip {
    #[schema(example = 1500.0)]
    pub overtime: Option<f64>,

    #[schema(example = 3000.0)]
    pub bonus: Option<f64>,

    #[schema(example = 12000.0)]
    pub allowances: Option<f64>,

    #[schema(example = 500.0)]
    pub other_deductions: Option<f64>,
}

/// Create a draft payrun
#[utoipa::path(
    post,
    path = "/api/v1/payroll/runs",
    request_body = CreatePayrun,
    responses(
        (status = 201, description = "Payrun created", body = Object, example = json!({
            "message": "Payrun created",
            "id": 7,
            "reference": "PR-7f9c2d1a4b0e4f0f"
        })),
        (status = 400, description = "Invalid period")
    ),
    tag = "Payroll"
)]
pub async fn create_payrun(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreatePayrun>,
) -> actix_web::Result<impl Responder> {
    if payload.period_end < payload.period_start {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "period_end cannot be before period_start"
        })));
    }

    let reference = format!("PR-{}", Uuid::new_v4().simple());

    let result = sqlx::query(
        r#"
        INSERT INTO payruns (reference, period_start, period_end, pay_date, status)
        VALUES (?, ?, ?, ?, 'draft')
        "#,
    )
    .bind(&reference)
    .bind(payload.period_start)
    .bind(payload.period_end)
    .bind(payload.pay_date)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to create payrun");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Payrun created",
        "id": result.last_insert_id(),
        "reference": reference
    })))
}

/// List payruns
#[utoipa::path(
    get,
    path = "/api/v1/payroll/runs",
    params(PayrunQuery),
    responses(
        (status = 200, body = PaginatedPayrunResponse)
    ),
    tag = "Payroll"
)]
pub async fn list_payruns(
    pool: web::Data<MySqlPool>,
    query: web::Query<PayrunQuery>,
) -> actix_web::Result<impl Responder> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(10).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let mut where_sql = String::new();
    if query.status.is_some() {
        where_sql.push_str(" WHERE status = ?");
    }

    let count_sql = format!("SELECT COUNT(*) FROM payruns{}", where_sql);
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    if let Some(status) = &query.status {
        count_q = count_q.bind(status);
    }
    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to count payruns");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let data_sql = format!(
        "SELECT * FROM payruns{} ORDER BY period_start DESC LIMIT ? OFFSET ?",
        where_sql
    );
    let mut data_q = sqlx::query_as::<_, Payrun>(&data_sql);
    if let Some(status) = &query.status {
        data_q = data_q.bind(status);
    }
    let data = data_q
        .bind(per_page as i64)
        .bind(offset as i64)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch payrun list");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(PaginatedPayrunResponse {
        data,
        page,
        per_page,
        total,
    }))
}

/// Get a payrun
#[utoipa::path(
    get,
    path = "/api/v1/payroll/runs/{payrun_id}",
    params(
        ("payrun_id", Path, description = "Payrun ID")
    ),
    responses(
        (status = 200, body = Payrun),
        (status = 404)
    ),
    tag = "Payroll"
)]
pub async fn get_payrun(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let payrun_id = path.into_inner();

    let payrun = fetch_payrun(pool.get_ref(), payrun_id).await?;

    match payrun {
        Some(p) => Ok(HttpResponse::Ok().json(p)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Payrun not found"
        }))),
    }
}

async fn fetch_payrun(
    pool: &MySqlPool,
    payrun_id: u64,
) -> Result<Option<Payrun>, actix_web::Error> {
    sqlx::query_as::<_, Payrun>("SELECT * FROM payruns WHERE id = ?")
        .bind(payrun_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, payrun_id, "Failed to fetch payrun");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })
}

/// Compute one employee's payslip and persist it. Failures are logged
/// and isolated; they never affect the rest of the batch.
async fn compute_payslip(
    pool: MySqlPool,
    payrun: Payrun,
    settings: PayrollSettings,
    employee: Employee,
) -> Option<f64> {
    let employee_id = employee.id;

    let draft = match build_draft(&pool, &payrun, &settings, &employee).await {
        Ok(draft) => draft,
        Err(e) => {
            tracing::error!(error = %e, employee_id, payrun_id = payrun.id, "Payslip computation failed");
            return None;
        }
    };

    let inserted = sqlx::query(
        r#"
        INSERT INTO payslips
        (payrun_id, employee_id, base_salary, overtime, bonus, allowances,
         tax, insurance, other_deductions,
         gross_pay, total_deductions, net_pay,
         payable_days, period_days, status)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 'computed')
        "#,
    )
    .bind(draft.payrun_id)
    .bind(draft.employee_id)
    .bind(draft.earnings.base_salary)
    .bind(draft.earnings.overtime)
    .bind(draft.earnings.bonus)
    .bind(draft.earnings.allowances)
    .bind(draft.deductions.tax)
    .bind(draft.deductions.insurance)
    .bind(draft.deductions.other)
    .bind(draft.gross_pay)
    .bind(draft.total_deductions)
    .bind(draft.net_pay)
    .bind(draft.worked_days.payable_days)
    .bind(draft.worked_days.total_days)
    .execute(&pool)
    .await;

    match inserted {
        Ok(_) => Some(draft.net_pay),
        Err(e) => {
            tracing::error!(error = %e, employee_id, payrun_id = payrun.id, "Failed to persist payslip");
            None
        }
    }
}

async fn build_draft(
    pool: &MySqlPool,
    payrun: &Payrun,
    settings: &PayrollSettings,
    employee: &Employee,
) -> anyhow::Result<PayslipDraft> {
    let store = MySqlSalaryStructureStore::new(pool.clone());
    let structure =
        resolver::resolve(&store, employee.id, payrun.period_end).await?;

    let attendance = sqlx::query_as::<_, Attendance>(
        r#"
        SELECT *
        FROM attendance
        WHERE employee_id = ?
        AND date BETWEEN ? AND ?
        "#,
    )
    .bind(employee.id)
    .bind(payrun.period_start)
    .bind(payrun.period_end)
    .fetch_all(pool)
    .await?;

    let leaves = sqlx::query_as::<_, LeaveRequest>(
        r#"
        SELECT *
        FROM leave_requests
        WHERE employee_id = ?
        AND status = 'approved'
        AND start_date <= ?
        AND end_date >= ?
        "#,
    )
    .bind(employee.id)
    .bind(payrun.period_end)
    .bind(payrun.period_start)
    .fetch_all(pool)
    .await?;

    let worked = assembler::compute_worked_days(
        payrun.period_start,
        payrun.period_end,
        &attendance,
        &leaves,
    );

    let components = structure.as_ref().map(|s| s.components());
    let draft = assembler::assemble(employee, payrun, components.as_ref(), worked, settings)?;
    Ok(draft)
}

/// Process a payrun
///
/// Computes a payslip for every active employee. Employees are processed
/// independently: one failure is logged and counted, the rest of the run
/// completes. The payrun moves draft → processing → completed, or failed
/// when nothing could be computed.
#[utoipa::path(
    post,
    path = "/api/v1/payroll/runs/{payrun_id}/process",
    params(
        ("payrun_id", Path, description = "Payrun ID")
    ),
    responses(
        (status = 200, description = "Processing outcome", body = ProcessOutcome),
        (status = 404, description = "Payrun not found"),
        (status = 409, description = "Payrun is not in draft")
    ),
    tag = "Payroll"
)]
pub async fn process_payrun(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let payrun_id = path.into_inner();

    let Some(payrun) = fetch_payrun(pool.get_ref(), payrun_id).await? else {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Payrun not found"
        })));
    };

    let status = match payrun.status() {
        Ok(s) => s,
        Err(e) => return Ok(engine_error_response(&e)),
    };
    if let Err(e) = status.transition(PayrunStatus::Processing) {
        return Ok(engine_error_response(&e));
    }

    // Optimistic claim: only one caller gets to move draft → processing.
    let claimed = sqlx::query("UPDATE payruns SET status = 'processing' WHERE id = ? AND status = 'draft'")
        .bind(payrun_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, payrun_id, "Failed to claim payrun");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;
    if claimed.rows_affected() == 0 {
        return Ok(HttpResponse::Conflict().json(json!({
            "message": "Payrun is already being processed"
        })));
    }

    let settings = settings_cache::get(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to load payroll settings");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let employees =
        sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE status = 'active'")
            .fetch_all(pool.get_ref())
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to fetch active employees");
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            })?;

    let results = join_all(employees.into_iter().map(|employee| {
        compute_payslip(
            pool.get_ref().clone(),
            payrun.clone(),
            settings.clone(),
            employee,
        )
    }))
    .await;

    let succeeded = results.iter().filter(|r| r.is_some()).count();
    let failed = results.len() - succeeded;
    let total_amount: f64 = results.iter().flatten().sum();

    let final_status = if succeeded == 0 && failed > 0 {
        PayrunStatus::Failed
    } else {
        PayrunStatus::Completed
    };

    sqlx::query("UPDATE payruns SET status = ?, total_employees = ?, total_amount = ? WHERE id = ?")
        .bind(final_status.to_string())
        .bind(succeeded as i64)
        .bind(total_amount)
        .bind(payrun_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, payrun_id, "Failed to finalize payrun");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    tracing::info!(
        payrun_id,
        succeeded,
        failed,
        total_amount,
        status = %final_status,
        "payrun processed"
    );

    Ok(HttpResponse::Ok().json(ProcessOutcome {
        message: "Payrun processed".into(),
        payrun_id,
        status: final_status.to_string(),
        succeeded,
        failed,
        total_amount,
    }))
}

/// Validate a completed payrun
///
/// One-way transition: every computed payslip in the run becomes
/// validated and read-only.
#[utoipa::path(
    put,
    path = "/api/v1/payroll/runs/{payrun_id}/validate",
    params(
        ("payrun_id", Path, description = "Payrun ID")
    ),
    responses(
        (status = 200, description = "Payslips validated", body = Object, example = json!({
            "message": "Payrun validated",
            "validated": 42
        })),
        (status = 404, description = "Payrun not found"),
        (status = 409, description = "Payrun is not completed")
    ),
    tag = "Payroll"
)]
pub async fn validate_payrun(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let payrun_id = path.into_inner();

    let Some(payrun) = fetch_payrun(pool.get_ref(), payrun_id).await? else {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Payrun not found"
        })));
    };

    if payrun.status().ok() != Some(PayrunStatus::Completed) {
        return Ok(HttpResponse::Conflict().json(json!({
            "message": "Payrun must be completed before validation"
        })));
    }

    let result = sqlx::query(
        r#"
        UPDATE payslips
        SET status = 'validated'
        WHERE payrun_id = ?
        AND status = 'computed'
        "#,
    )
    .bind(payrun_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, payrun_id, "Failed to validate payrun");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Payrun validated",
        "validated": result.rows_affected()
    })))
}

/// Payslips of a payrun
#[utoipa::path(
    get,
    path = "/api/v1/payroll/runs/{payrun_id}/payslips",
    params(
        ("payrun_id", Path, description = "Payrun ID")
    ),
    responses(
        (status = 200, body = [Payslip])
    ),
    tag = "Payroll"
)]
pub async fn list_payslips(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let payrun_id = path.into_inner();

    let payslips = sqlx::query_as::<_, Payslip>(
        "SELECT * FROM payslips WHERE payrun_id = ? ORDER BY employee_id",
    )
    .bind(payrun_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, payrun_id, "Failed to fetch payslips");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(payslips))
}

/// Get a payslip
#[utoipa::path(
    get,
    path = "/api/v1/payslips/{payslip_id}",
    params(
        ("payslip_id", Path, description = "Payslip ID")
    ),
    responses(
        (status = 200, body = Payslip),
        (status = 404)
    ),
    tag = "Payroll"
)]
pub async fn get_payslip(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let payslip_id = path.into_inner();

    let payslip = sqlx::query_as::<_, Payslip>("SELECT * FROM payslips WHERE id = ?")
        .bind(payslip_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, payslip_id, "Failed to fetch payslip");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    match payslip {
        Some(p) => Ok(HttpResponse::Ok().json(p)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Payslip not found"
        }))),
    }
}

/// Adjust a payslip
///
/// Only computed/draft payslips are editable; validated payslips are
/// read-only. Totals are recomputed from the adjusted parts.
#[utoipa::path(
    put,
    path = "/api/v1/payslips/{payslip_id}",
    params(
        ("payslip_id", Path, description = "Payslip ID")
    ),
    request_body = UpdatePayslip,
    responses(
        (status = 200, description = "Payslip updated", body = Object, example = json!({
            "message": "Payslip updated"
        })),
        (status = 400, description = "Negative adjustment"),
        (status = 404, description = "Payslip not found"),
        (status = 409, description = "Payslip is validated and read-only")
    ),
    tag = "Payroll"
)]
pub async fn update_payslip(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<UpdatePayslip>,
) -> actix_web::Result<impl Responder> {
    let payslip_id = path.into_inner();

    let current = sqlx::query_as::<_, Payslip>("SELECT * FROM payslips WHERE id = ?")
        .bind(payslip_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, payslip_id, "Failed to fetch payslip");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let current = match current {
        Some(p) => p,
        None => {
            return Ok(HttpResponse::NotFound().json(json!({
                "message": "Payslip not found"
            })));
        }
    };

    if !current.is_editable() {
        return Ok(HttpResponse::Conflict().json(json!({
            "message": "Payslip is validated and read-only"
        })));
    }

    let overtime = body.overtime.unwrap_or(current.overtime);
    let bonus = body.bonus.unwrap_or(current.bonus);
    let allowances = body.allowances.unwrap_or(current.allowances);
    let other_deductions = body.other_deductions.unwrap_or(current.other_deductions);

    if [overtime, bonus, allowances, other_deductions]
        .iter()
        .any(|v| *v < 0.0)
    {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Adjustments must be non-negative"
        })));
    }

    let settings = settings_cache::get(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to load payroll settings");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let gross_pay = current.base_salary + overtime + bonus + allowances;
    let tax = gross_pay * settings.tax_rate / 100.0;
    let insurance = gross_pay * settings.insurance_rate / 100.0;
    let total_deductions = tax + insurance + other_deductions;
    let net_pay = (gross_pay - total_deductions).max(0.0);

    // Status re-checked in the predicate so a concurrent validation wins.
    let result = sqlx::query(
        r#"
        UPDATE payslips
        SET overtime = ?, bonus = ?, allowances = ?,
            tax = ?, insurance = ?, other_deductions = ?,
            gross_pay = ?, total_deductions = ?, net_pay = ?
        WHERE id = ?
        AND status != 'validated'
        "#,
    )
    .bind(overtime)
    .bind(bonus)
    .bind(allowances)
    .bind(tax)
    .bind(insurance)
    .bind(other_deductions)
    .bind(gross_pay)
    .bind(total_deductions)
    .bind(net_pay)
    .bind(payslip_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, payslip_id, "Failed to update payslip");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::Conflict().json(json!({
            "message": "Payslip is validated and read-only"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Payslip updated"
    })))
}
