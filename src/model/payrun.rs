use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::engine::error::EngineError;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Payrun {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "PR-7f9c2d1a")]
    pub reference: String,

    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub period_start: NaiveDate,

    #[schema(example = "2026-01-31", value_type = String, format = "date")]
    pub period_end: NaiveDate,

    #[schema(example = "2026-02-05", value_type = String, format = "date")]
    pub pay_date: NaiveDate,

    #[schema(example = "draft")]
    pub status: String,

    #[schema(example = 42)]
    pub total_employees: i64,

    #[schema(example = 3150000.0)]
    pub total_amount: f64,

    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String, nullable = true)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Payrun {
    pub fn status(&self) -> Result<PayrunStatus, EngineError> {
        PayrunStatus::from_str(&self.status)
            .map_err(|_| EngineError::Validation(format!("unknown payrun status '{}'", self.status)))
    }
}

/// Monotonic: draft → processing → completed, with failed terminal from
/// processing.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Display, EnumString, Serialize, Deserialize, ToSchema)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PayrunStatus {
    Draft,
    Processing,
    Completed,
    Failed,
}

impl PayrunStatus {
    pub fn transition(self, to: PayrunStatus) -> Result<PayrunStatus, EngineError> {
        let allowed = matches!(
            (self, to),
            (PayrunStatus::Draft, PayrunStatus::Processing)
                | (PayrunStatus::Processing, PayrunStatus::Completed)
                | (PayrunStatus::Processing, PayrunStatus::Failed)
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
