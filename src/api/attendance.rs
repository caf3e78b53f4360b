use actix_web::{HttpResponse, Responder, web};
use chrono::{Local, NaiveDate, NaiveTime};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

use crate::engine::reconciler::{self, Imputed, ReconcileOutcome};
use crate::model::attendance::Attendance;
use crate::repo::AttendanceStore;
use crate::repo::mysql::MySqlAttendanceStore;

/// Check-ins later than this are flagged late.
const LATE_CHECK_IN: (u32, u32) = (10, 0);

#[derive(Deserialize, ToSchema)]
pub struct CheckInRequest {
    #[schema(example = 1001)]
    pub employee_id: u64,
}

#[derive(Deserialize, ToSchema)]
pub struct CheckOutRequest {
    #[schema(example = 1001)]
    pub employee_id: u64,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct AttendanceQuery {
    #[schema(example = 1001)]
    pub employee_id: u64,
    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub from: Option<NaiveDate>,
    #[schema(example = "2026-01-31", value_type = String, format = "date")]
    pub to: Option<NaiveDate>,
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/v1/attendance/check-in",
    request_body = CheckInRequest,
    responses(
        (status = 200, description = "Checked in successfully", body = Object, example = json!({
            "message": "Checked in successfully"
        })),
        (status = 400, description = "Already checked in today", body = Object, example = json!({
            "message": "Already checked in today"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CheckInRequest>,
) -> actix_web::Result<impl Responder> {
    let employee_id = payload.employee_id;
    let now = Local::now().naive_local();
    let late_after = NaiveTime::from_hms_opt(LATE_CHECK_IN.0, LATE_CHECK_IN.1, 0)
        .expect("valid late threshold");
    let status = if now.time() > late_after { "late" } else { "present" };

    let result = sqlx::query(
        r#"
        INSERT INTO attendance (employee_id, date, check_in, status)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(employee_id)
    .bind(now.date())
    .bind(now.time())
    .bind(status)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => Ok(HttpResponse::Ok().json(json!({
            "message": "Checked in successfully"
        }))),

        Err(e) => {
            // Duplicate check-in for same day
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::BadRequest().json(json!({
                        "message": "Already checked in today"
                    })));
                }
            }

            tracing::error!(error = %e, employee_id, "Check-in failed");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}

/// Check-out endpoint
#[utoipa::path(
    put,
    path = "/api/v1/attendance/check-out",
    request_body = CheckOutRequest,
    responses(
        (status = 200, description = "Checked out successfully", body = Object, example = json!({
            "message": "Checked out successfully"
        })),
        (status = 400, description = "No active check-in found for today", body = Object, example = json!({
            "message": "No active check-in found for today"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn check_out(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CheckOutRequest>,
) -> actix_web::Result<impl Responder> {
    let employee_id = payload.employee_id;
    let now = Local::now().naive_local();

    let open: Option<Attendance> = sqlx::query_as::<_, Attendance>(
        r#"
        SELECT *
        FROM attendance
        WHERE employee_id = ?
        AND date = ?
        AND check_out IS NULL
        "#,
    )
    .bind(employee_id)
    .bind(now.date())
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Check-out lookup failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let Some(open) = open else {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "No active check-in found for today"
        })));
    };

    let Some(check_in) = open.check_in else {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "No active check-in found for today"
        })));
    };

    let hours_worked =
        reconciler::session_hours(open.date.and_time(check_in), now);
    let closed = MySqlAttendanceStore::new(pool.get_ref().clone())
        .close_out(
            employee_id,
            open.date,
            &Imputed {
                check_out: now.time(),
                hours_worked,
                status: reconciler::session_status(hours_worked),
            },
        )
        .await
        .map_err(|e| {
            tracing::error!(error = %e, employee_id, "Check-out failed");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if !closed {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "No active check-in found for today"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Checked out successfully"
    })))
}

/// Attendance history for one employee
#[utoipa::path(
    get,
    path = "/api/v1/attendance",
    params(AttendanceQuery),
    responses(
        (status = 200, description = "Attendance rows", body = [Attendance])
    ),
    tag = "Attendance"
)]
pub async fn list_attendance(
    pool: web::Data<MySqlPool>,
    query: web::Query<AttendanceQuery>,
) -> actix_web::Result<impl Responder> {
    let mut sql = String::from("SELECT * FROM attendance WHERE employee_id = ?");
    if query.from.is_some() {
        sql.push_str(" AND date >= ?");
    }
    if query.to.is_some() {
        sql.push_str(" AND date <= ?");
    }
    sql.push_str(" ORDER BY date DESC");

    let mut data_query = sqlx::query_as::<_, Attendance>(&sql).bind(query.employee_id);
    if let Some(from) = query.from {
        data_query = data_query.bind(from);
    }
    if let Some(to) = query.to {
        data_query = data_query.bind(to);
    }

    let rows = data_query.fetch_all(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, employee_id = query.employee_id, "Failed to fetch attendance");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(rows))
}

/// Close out incomplete attendance now
///
/// Runs the same pass as the scheduled job: every checked-in row without
/// a checkout, dated up to today, gets an imputed 18:00 close once the
/// cutoff has passed.
#[utoipa::path(
    post,
    path = "/api/v1/attendance/reconcile",
    responses(
        (status = 200, description = "Reconciliation outcome", body = ReconcileOutcome)
    ),
    tag = "Attendance"
)]
pub async fn reconcile_attendance(pool: web::Data<MySqlPool>) -> impl Responder {
    let store = MySqlAttendanceStore::new(pool.get_ref().clone());
    let outcome = reconciler::reconcile_incomplete(&store, Local::now().naive_local()).await;

    HttpResponse::Ok().json(outcome)
}
