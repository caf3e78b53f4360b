use actix_web::{HttpResponse, Responder, web};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

use crate::api::engine_error_response;
use crate::engine::components::{
    self, ComponentEdit, ComponentField, SalaryComponents,
};
use crate::engine::resolver;
use crate::model::salary_structure::SalaryStructure;
use crate::repo::mysql::MySqlSalaryStructureStore;

#[derive(Deserialize, ToSchema)]
pub struct CreateSalaryStructure {
    #[schema(example = 1001)]
    pub employee_id: u64,

    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub effective_from: NaiveDate,

    /// Inclusive end of validity; omit for open-ended.
    #[schema(example = json!(null), format = "date", value_type = Option<String>)]
    pub effective_to: Option<NaiveDate>,

    /// Derive the component set from this wage with the default split.
    #[schema(example = 75000.0)]
    pub month_wage: Option<f64>,

    /// Full component set, typically produced by the recompute preview.
    /// Takes precedence over `month_wage`.
    pub components: Option<SalaryComponents>,
}

#[derive(Deserialize, ToSchema)]
pub struct DeriveRequest {
    #[schema(example = 75000.0)]
    pub month_wage: f64,
}

/// One edit against a component set: exactly one of `amount`/`percent`.
#[derive(Deserialize, ToSchema)]
pub struct RecomputeRequest {
    pub components: SalaryComponents,

    #[schema(example = "house_rent_allowance")]
    pub field: ComponentField,

    #[schema(example = 20000.0)]
    pub amount: Option<f64>,

    #[schema(example = 50.0)]
    pub percent: Option<f64>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct ApplicableQuery {
    #[schema(example = 1001)]
    pub employee_id: u64,

    /// Defaults to today.
    #[schema(example = "2026-01-15", format = "date", value_type = Option<String>)]
    pub as_of: Option<NaiveDate>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct HistoryQuery {
    #[schema(example = 1001)]
    pub employee_id: u64,
}

/// Create a salary structure version
///
/// Historical rows are never mutated: a superseding structure is a new
/// row with a later effective_from, and payslip lookups pick the most
/// recent applicable one.
#[utoipa::path(
    post,
    path = "/api/v1/salary-structures",
    request_body = CreateSalaryStructure,
    responses(
        (status = 201, description = "Structure created", body = Object, example = json!({
            "message": "Salary structure created",
            "id": 12
        })),
        (status = 400, description = "Invalid component set"),
        (status = 404, description = "Employee not found")
    ),
    tag = "SalaryStructure"
)]
pub async fn create_structure(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateSalaryStructure>,
) -> actix_web::Result<impl Responder> {
    let payload = payload.into_inner();
    let employee_id = payload.employee_id;

    let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM employees WHERE id = ?")
        .bind(employee_id)
        .fetch_one(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, employee_id, "Failed to look up employee");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;
    if exists == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found"
        })));
    }

    let components = match (payload.components, payload.month_wage) {
        (Some(c), _) => c,
        (None, Some(wage)) => match components::derive_default(wage) {
            Ok(c) => c,
            Err(e) => return Ok(engine_error_response(&e)),
        },
        (None, None) => {
            return Ok(HttpResponse::BadRequest().json(json!({
                "message": "Provide either month_wage or a full component set"
            })));
        }
    };

    let result = sqlx::query(
        r#"
        INSERT INTO salary_structures
        (employee_id, effective_from, effective_to,
         month_wage, yearly_wage,
         basic_salary, basic_salary_percent,
         house_rent_allowance, hra_percent,
         standard_allowance, standard_allowance_percent,
         performance_bonus, performance_bonus_percent,
         travel_allowance, lta_percent,
         fixed_allowance, fixed_allowance_percent,
         gross_salary,
         pf_employee, pf_employee_percent,
         pf_employer, pf_employer_percent,
         professional_tax, tds, other_deductions,
         total_deductions, net_salary)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(employee_id)
    .bind(payload.effective_from)
    .bind(payload.effective_to)
    .bind(components.month_wage)
    .bind(components.yearly_wage)
    .bind(components.basic_salary)
    .bind(components.basic_salary_percent)
    .bind(components.house_rent_allowance)
    .bind(components.hra_percent)
    .bind(components.standard_allowance)
    .bind(components.standard_allowance_percent)
    .bind(components.performance_bonus)
    .bind(components.performance_bonus_percent)
    .bind(components.travel_allowance)
    .bind(components.lta_percent)
    .bind(components.fixed_allowance)
    .bind(components.fixed_allowance_percent)
    .bind(components.gross_salary)
    .bind(components.pf_employee)
    .bind(components.pf_employee_percent)
    .bind(components.pf_employer)
    .bind(components.pf_employer_percent)
    .bind(components.professional_tax)
    .bind(components.tds)
    .bind(components.other_deductions)
    .bind(components.total_deductions)
    .bind(components.net_salary)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Failed to create salary structure");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Salary structure created",
        "id": result.last_insert_id()
    })))
}

/// Preview the default derivation from a flat wage
#[utoipa::path(
    post,
    path = "/api/v1/salary-structures/derive",
    request_body = DeriveRequest,
    responses(
        (status = 200, description = "Derived component set", body = SalaryComponents),
        (status = 400, description = "Invalid wage")
    ),
    tag = "SalaryStructure"
)]
pub async fn derive_components(payload: web::Json<DeriveRequest>) -> impl Responder {
    match components::derive_default(payload.month_wage) {
        Ok(c) => HttpResponse::Ok().json(c),
        Err(e) => engine_error_response(&e),
    }
}

/// Preview a single-field edit against a component set
///
/// Editing an amount recomputes its percent against the field's base and
/// vice versa; wage and basic-salary edits cascade through the dependent
/// components with the fixed allowance as the residual. The stored
/// structure is untouched; persist the result via POST
/// /salary-structures when done.
#[utoipa::path(
    post,
    path = "/api/v1/salary-structures/recompute",
    request_body = RecomputeRequest,
    responses(
        (status = 200, description = "Recomputed component set", body = SalaryComponents),
        (status = 400, description = "Invalid edit; prior set remains valid")
    ),
    tag = "SalaryStructure"
)]
pub async fn recompute_components(payload: web::Json<RecomputeRequest>) -> impl Responder {
    let payload = payload.into_inner();

    let edit = match (payload.amount, payload.percent) {
        (Some(amount), None) => ComponentEdit::Amount(amount),
        (None, Some(percent)) => ComponentEdit::Percent(percent),
        _ => {
            return HttpResponse::BadRequest().json(json!({
                "message": "Provide exactly one of amount or percent"
            }));
        }
    };

    match components::recompute_from_component(&payload.components, payload.field, edit) {
        Ok(c) => HttpResponse::Ok().json(c),
        Err(e) => engine_error_response(&e),
    }
}

/// Structure applicable to an employee on a date
#[utoipa::path(
    get,
    path = "/api/v1/salary-structures/applicable",
    params(ApplicableQuery),
    responses(
        (status = 200, description = "Applicable structure", body = SalaryStructure),
        (status = 404, description = "No applicable structure", body = Object, example = json!({
            "message": "No applicable salary structure"
        }))
    ),
    tag = "SalaryStructure"
)]
pub async fn get_applicable(
    pool: web::Data<MySqlPool>,
    query: web::Query<ApplicableQuery>,
) -> actix_web::Result<impl Responder> {
    let as_of = query.as_of.unwrap_or_else(|| Local::now().date_naive());
    let store = MySqlSalaryStructureStore::new(pool.get_ref().clone());

    let structure = resolver::resolve(&store, query.employee_id, as_of)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, employee_id = query.employee_id, "Failed to resolve salary structure");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    match structure {
        Some(s) => Ok(HttpResponse::Ok().json(s)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "No applicable salary structure"
        }))),
    }
}

/// Full structure history for an employee
#[utoipa::path(
    get,
    path = "/api/v1/salary-structures",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Structure versions, newest first", body = [SalaryStructure])
    ),
    tag = "SalaryStructure"
)]
pub async fn list_structures(
    pool: web::Data<MySqlPool>,
    query: web::Query<HistoryQuery>,
) -> actix_web::Result<impl Responder> {
    let rows = sqlx::query_as::<_, SalaryStructure>(
        r#"
        SELECT *
        FROM salary_structures
        WHERE employee_id = ?
        ORDER BY effective_from DESC
        "#,
    )
    .bind(query.employee_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id = query.employee_id, "Failed to fetch salary structures");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(rows))
}
