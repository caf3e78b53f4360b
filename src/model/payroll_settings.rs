use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Single-row global payroll configuration, applied to payslips lacking
/// an explicit salary structure override.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(example = json!({ "id": 1, "tax_rate": 5.0, "insurance_rate": 2.0, "pay_period_days": 30 }))]
pub struct PayrollSettings {
    pub id: u64,

    /// Percent of gross pay withheld as tax.
    #[schema(example = 5.0)]
    pub tax_rate: f64,

    /// Percent of gross pay withheld as insurance.
    #[schema(example = 2.0)]
    pub insurance_rate: f64,

    #[schema(example = 30)]
    pub pay_period_days: i64,
}

impl Default for PayrollSettings {
    fn default() -> Self {
        Self {
            id: 1,
            tax_rate: 5.0,
            insurance_rate: 2.0,
            pay_period_days: 30,
        }
    }
}
