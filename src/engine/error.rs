use thiserror::Error;

/// Typed failures surfaced by the payroll core.
///
/// Batch jobs never abort on a single unit's error; handlers map these
/// onto HTTP responses (configuration → 422, validation → 400,
/// transition → 409).
#[derive(Debug, Error)]
pub enum EngineError {
    /// No salary basis exists for an employee: no structure and no flat
    /// wage. Fatal for that employee's payslip only.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Rejected input; the caller's prior state is left unchanged.
    #[error("validation error: {0}")]
    Validation(String),

    /// Status-machine violation on a payrun or payslip.
    #[error("invalid status transition {from} -> {to}")]
    InvalidTransition { from: String, to: String },
}
