use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::engine::error::EngineError;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Payslip {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 7)]
    pub payrun_id: u64,

    #[schema(example = 1001)]
    pub employee_id: u64,

    pub base_salary: f64,
    pub overtime: f64,
    pub bonus: f64,
    pub allowances: f64,

    pub tax: f64,
    pub insurance: f64,
    pub other_deductions: f64,

    pub gross_pay: f64,
    pub total_deductions: f64,
    pub net_pay: f64,

    #[schema(example = 22.5)]
    pub payable_days: f64,

    #[schema(example = 31)]
    pub period_days: i64,

    #[schema(example = "computed")]
    pub status: String,
}

impl Payslip {
    pub fn status(&self) -> Result<PayslipStatus, EngineError> {
        PayslipStatus::from_str(&self.status)
            .map_err(|_| EngineError::Validation(format!("unknown payslip status '{}'", self.status)))
    }

    /// Validated payslips are read-only.
    pub fn is_editable(&self) -> bool {
        !matches!(self.status(), Ok(PayslipStatus::Validated))
    }
}

/// One-way: draft → computed → validated, validated terminal.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Display, EnumString, Serialize, Deserialize, ToSchema)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PayslipStatus {
    Draft,
    Computed,
    Validated,
}

impl PayslipStatus {
    pub fn transition(self, to: PayslipStatus) -> Result<PayslipStatus, EngineError> {
        let allowed = matches!(
            (self, to),
            (PayslipStatus::Draft, PayslipStatus::Computed)
                | (PayslipStatus::Computed, PayslipStatus::Validated)
        );
        if allowed {
            Ok(to)
        } else {
            Err(EngineError::InvalidTransition {
                from: self.to_string(),
                to: to.to_string(),
            })
        }
    }
}
