pub mod attendance;
pub mod employee;
pub mod leave_request;
pub mod payroll;
pub mod salary_structure;
pub mod settings;

use actix_web::HttpResponse;

use crate::engine::error::EngineError;

/// Map engine failures onto HTTP responses: validation 400,
/// configuration 422, status-machine violations 409.
pub(crate) fn engine_error_response(err: &EngineError) -> HttpResponse {
    let body = serde_json::json!({ "message": err.to_string() });
    match err {
        EngineError::Validation(_) => HttpResponse::BadRequest().json(body),
        EngineError::Configuration(_) => HttpResponse::UnprocessableEntity().json(body),
        EngineError::InvalidTransition { .. } => HttpResponse::Conflict().json(body),
    }
}
